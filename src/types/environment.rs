use std::collections::HashMap;
use std::fmt;

use super::activation::Activation;
use super::error::{CompileError, EnvironmentError, ProgramError};
use super::fields::Fields;
use super::value::Value;
use crate::compile::{Ast, Program};

/// Node budget applied to programs built by [`Environment::program()`]
/// unless overridden with [`Environment::with_max_program_size()`].
pub const DEFAULT_MAX_PROGRAM_SIZE: usize = 1024;

/// Declared type of an expression variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHint {
    String,
    Int,
    Double,
    Bool,
    /// Map from string keys to dynamically typed values.
    Map,
    /// Any value; checked at evaluation time.
    Dyn,
}

impl TypeHint {
    /// Infer the declared type of a flattened field from its value.
    #[must_use]
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::String(_) => TypeHint::String,
            Value::Int(_) => TypeHint::Int,
            Value::Float(_) => TypeHint::Double,
            Value::Bool(_) => TypeHint::Bool,
            Value::Map(_) => TypeHint::Map,
            Value::Null | Value::List(_) => TypeHint::Dyn,
        }
    }
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeHint::String => "string",
            TypeHint::Int => "int",
            TypeHint::Double => "double",
            TypeHint::Bool => "bool",
            TypeHint::Map => "map(string, dyn)",
            TypeHint::Dyn => "dyn",
        };
        f.write_str(name)
    }
}

/// Declared expression variables: each dotted name gets a type and a slot.
///
/// Built once per validation run from the flattened record and used to
/// compile every rule of that run.
#[derive(Debug, Clone)]
pub struct Environment {
    slots: HashMap<String, usize>,
    declarations: Vec<(String, TypeHint)>,
    max_program_size: usize,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
            declarations: Vec::new(),
            max_program_size: DEFAULT_MAX_PROGRAM_SIZE,
        }
    }
}

impl Environment {
    /// Create an environment with no variables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare every field of a flattened record with its inferred type.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::InvalidName`] if a path segment is not an
    /// identifier.
    pub fn declare(fields: &Fields) -> Result<Self, EnvironmentError> {
        let mut env = Self::new();
        for (path, value) in fields.iter() {
            env.declare_variable(path, TypeHint::infer(value))?;
        }
        Ok(env)
    }

    /// Override the node budget for programs built from this environment.
    #[must_use]
    pub fn with_max_program_size(mut self, limit: usize) -> Self {
        self.max_program_size = limit;
        self
    }

    /// Declare a variable, returning its slot. Redeclaring a name keeps its
    /// slot and replaces its type.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::InvalidName`] if a path segment is not an
    /// identifier.
    pub fn declare_variable(&mut self, name: &str, hint: TypeHint) -> Result<usize, EnvironmentError> {
        if !is_valid_name(name) {
            return Err(EnvironmentError::InvalidName {
                name: name.to_owned(),
            });
        }
        if let Some(&slot) = self.slots.get(name) {
            self.declarations[slot].1 = hint;
            return Ok(slot);
        }
        let slot = self.declarations.len();
        self.slots.insert(name.to_owned(), slot);
        self.declarations.push((name.to_owned(), hint));
        Ok(slot)
    }

    /// Look up the slot and declared type of a variable.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<(usize, TypeHint)> {
        self.slots
            .get(name)
            .map(|&slot| (slot, self.declarations[slot].1))
    }

    /// The number of declared variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether no variables are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// The node budget applied by [`program()`](Self::program).
    #[must_use]
    pub fn max_program_size(&self) -> usize {
        self.max_program_size
    }

    /// Iterate over `(name, type)` declarations in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, TypeHint)> {
        self.declarations.iter().map(|(name, hint)| (name.as_str(), *hint))
    }

    /// Parse and type-check an expression against the declared variables.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] on syntax errors, undeclared references or
    /// operand types that no operator overload accepts.
    pub fn compile(&self, source: &str) -> Result<Ast, CompileError> {
        crate::compile::compile(self, source)
    }

    /// Build an executable program from a compiled expression.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError`] if a constant subexpression fails to
    /// evaluate or the program exceeds the node budget.
    pub fn program(&self, ast: &Ast) -> Result<Program, ProgramError> {
        crate::compile::build(ast, self.max_program_size)
    }

    /// Bind field values to this environment's slots.
    #[must_use]
    pub fn activation(&self, fields: &Fields) -> Activation {
        Activation::new(self, fields)
    }
}

fn is_valid_name(name: &str) -> bool {
    name.split('.').all(|segment| {
        let mut chars = segment.chars();
        chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}
