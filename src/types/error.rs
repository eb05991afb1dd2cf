use thiserror::Error;

use crate::parse::ParseError;

/// Failure to declare a record's fields as expression variables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvironmentError {
    #[error("invalid variable name '{name}': every path segment must be an identifier")]
    InvalidName { name: String },
}

/// Failure to parse or type-check an expression against an environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] ParseError),

    #[error("undeclared reference to '{name}'")]
    UndeclaredReference { name: String },

    #[error("type '{ty}' does not support field selection '{field}'")]
    NoSuchField { ty: String, field: String },

    #[error("found no matching overload for '{op}' applied to ({})", .args.join(", "))]
    NoMatchingOverload { op: String, args: Vec<String> },

    #[error("undeclared function '{name}' taking {arity} argument(s)")]
    UnknownFunction { name: String, arity: usize },
}

/// Failure to build an executable program from a compiled expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    #[error("program has {size} nodes, exceeding the limit of {limit}")]
    TooComplex { size: usize, limit: usize },

    #[error("constant expression cannot be evaluated: {0}")]
    ConstantFolding(#[source] EvalError),
}

/// Failure while executing a program against an activation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("no such key: '{key}'")]
    NoSuchKey { key: String },

    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("found no matching overload for '{op}' applied to ({})", .args.join(", "))]
    NoMatchingOverload { op: String, args: Vec<String> },

    #[error("division by zero")]
    DivisionByZero,

    #[error("modulus by zero")]
    ModuloByZero,

    #[error("integer overflow in '{op}'")]
    Overflow { op: String },
}

/// Error attached to a single rule evaluation, or returned as the halting
/// error of a whole validation run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Program(#[from] ProgramError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl RuleError {
    /// Setup failures (environment, compile, program) can halt a run;
    /// evaluation failures never do.
    #[must_use]
    pub fn halts(&self) -> bool {
        !matches!(self, RuleError::Eval(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undeclared_reference_message() {
        let err = CompileError::UndeclaredReference {
            name: "Address.UnknownField".into(),
        };
        assert_eq!(
            err.to_string(),
            "undeclared reference to 'Address.UnknownField'"
        );
    }

    #[test]
    fn no_matching_overload_message() {
        let err = CompileError::NoMatchingOverload {
            op: ">".into(),
            args: vec!["int".into(), "string".into()],
        };
        assert_eq!(
            err.to_string(),
            "found no matching overload for '>' applied to (int, string)"
        );
    }

    #[test]
    fn too_complex_message() {
        let err = ProgramError::TooComplex {
            size: 12,
            limit: 8,
        };
        assert_eq!(
            err.to_string(),
            "program has 12 nodes, exceeding the limit of 8"
        );
    }

    #[test]
    fn constant_folding_message() {
        let err = ProgramError::ConstantFolding(EvalError::DivisionByZero);
        assert_eq!(
            err.to_string(),
            "constant expression cannot be evaluated: division by zero"
        );
    }

    #[test]
    fn no_such_key_message() {
        let err = EvalError::NoSuchKey {
            key: "target".into(),
        };
        assert_eq!(err.to_string(), "no such key: 'target'");
    }

    #[test]
    fn rule_error_is_transparent() {
        let err = RuleError::from(EvalError::DivisionByZero);
        assert_eq!(err.to_string(), "division by zero");
    }

    #[test]
    fn only_setup_errors_halt() {
        assert!(RuleError::from(CompileError::UndeclaredReference { name: "x".into() }).halts());
        assert!(RuleError::from(ProgramError::TooComplex { size: 2, limit: 1 }).halts());
        assert!(RuleError::from(EnvironmentError::InvalidName { name: "a b".into() }).halts());
        assert!(!RuleError::from(EvalError::DivisionByZero).halts());
    }
}
