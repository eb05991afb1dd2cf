//! Declarative validation rules evaluated against typed records.
//!
//! Rules are boolean expressions grouped by record type and operation in a
//! [`RuleRepository`]. [`rules_for()`] merges a type's `Default` rules with
//! an operation's rules, and a [`Validator`] evaluates the result against a
//! [`Record`], producing a [`ValidationReport`] with one
//! [`ValidationResult`] per evaluated rule.
//!
//! ```
//! use ruletrail::{FieldVisitor, Record, RuleEntry, RuleRepository, Validator};
//!
//! struct User { name: String, age: i64 }
//!
//! impl Record for User {
//!     fn visit_fields(&self, v: &mut FieldVisitor<'_>) {
//!         v.field("Name", self.name.as_str()).field("Age", self.age);
//!     }
//! }
//!
//! let repo = RuleRepository::new()
//!     .with_rules("User", "Default", vec![RuleEntry::new("Name != ''")])
//!     .with_rules("User", "Create", vec![
//!         RuleEntry::new("Age >= 18").with_message("must be an adult"),
//!     ]);
//!
//! let user = User { name: "Bob".into(), age: 17 };
//! let report = Validator::new().validate_operation(&user, "Create", &repo);
//!
//! assert!(!report.passed());
//! assert_eq!(report.failure_messages(), ["must be an adult"]);
//! ```

mod compile;
mod error;
mod evaluate;
mod introspect;
pub mod parse;
mod resolve;
mod types;
mod validator;

pub use compile::{Ast, Program};
pub use error::LoadError;
pub use introspect::{flatten, type_name_of, FieldVisitor, Record};
pub use resolve::rules_for;
pub use types::{
    Activation, ArithOp, BinaryOp, CompareOp, CompileError, Environment, EnvironmentError,
    EvalError, Expr, Fields, ProgramError, RuleEntry, RuleError, RuleRepository, TypeHint,
    UnaryOp, ValidationContext, ValidationReport, ValidationResult, Value,
    DEFAULT_MAX_PROGRAM_SIZE, DEFAULT_OPERATION,
};
pub use validator::{Validator, ValidatorBuilder};
