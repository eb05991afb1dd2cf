mod activation;
mod context;
mod environment;
mod error;
mod expr;
mod fields;
mod report;
mod repository;
mod result;
mod rule;
mod value;

pub use activation::Activation;
pub use context::ValidationContext;
pub use environment::{Environment, TypeHint, DEFAULT_MAX_PROGRAM_SIZE};
pub use error::{CompileError, EnvironmentError, EvalError, ProgramError, RuleError};
pub(crate) use expr::{CompiledExpr, Function};
pub use expr::{ArithOp, BinaryOp, CompareOp, Expr, UnaryOp};
pub use fields::Fields;
pub use report::ValidationReport;
pub use repository::{RuleRepository, DEFAULT_OPERATION};
pub use result::ValidationResult;
pub use rule::RuleEntry;
pub use value::Value;
