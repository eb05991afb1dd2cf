use std::cmp::Ordering;
use std::fmt;

use super::Value;

/// Comparison operators supported in rule expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    /// Whether an ordering between two operands satisfies this operator.
    #[must_use]
    pub fn holds(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Neq => ord != Ordering::Equal,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Gte => ord != Ordering::Less,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Lte => ord != Ordering::Greater,
        }
    }
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

/// Binary operators other than the short-circuiting `&&` and `||`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Compare(CompareOp),
    Arith(ArithOp),
    In,
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Parsed expression AST. Identifiers are still names here; they are
/// resolved against an [`Environment`](super::Environment) by compilation.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Ident(String),
    List(Vec<Expr>),
    Select {
        operand: Box<Expr>,
        field: String,
    },
    Index {
        operand: Box<Expr>,
        index: Box<Expr>,
    },
    /// A global call (`size(x)`) when `target` is `None`, a method call
    /// (`Name.startsWith('A')`) otherwise.
    Call {
        function: String,
        target: Option<Box<Expr>>,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

/// Built-in functions known to the checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Function {
    Size,
    Contains,
    StartsWith,
    EndsWith,
}

impl Function {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Function::Size => "size",
            Function::Contains => "contains",
            Function::StartsWith => "startsWith",
            Function::EndsWith => "endsWith",
        }
    }
}

/// Checked expression with every variable resolved to its activation slot.
///
/// Produced by compilation and rewritten in place (constant folding) when a
/// [`Program`](super::Program) is built. Method-call targets become the
/// first argument of [`CompiledExpr::Call`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CompiledExpr {
    Const(Value),
    Var(usize),
    List(Vec<CompiledExpr>),
    Select {
        operand: Box<CompiledExpr>,
        field: String,
    },
    Index {
        operand: Box<CompiledExpr>,
        index: Box<CompiledExpr>,
    },
    Call {
        function: Function,
        args: Vec<CompiledExpr>,
    },
    Not(Box<CompiledExpr>),
    Neg(Box<CompiledExpr>),
    Binary {
        op: BinaryOp,
        lhs: Box<CompiledExpr>,
        rhs: Box<CompiledExpr>,
    },
    And(Box<CompiledExpr>, Box<CompiledExpr>),
    Or(Box<CompiledExpr>, Box<CompiledExpr>),
}

impl CompiledExpr {
    /// Number of nodes in this expression tree.
    pub(crate) fn size(&self) -> usize {
        1 + match self {
            CompiledExpr::Const(_) | CompiledExpr::Var(_) => 0,
            CompiledExpr::List(items) | CompiledExpr::Call { args: items, .. } => {
                items.iter().map(CompiledExpr::size).sum()
            }
            CompiledExpr::Select { operand, .. }
            | CompiledExpr::Not(operand)
            | CompiledExpr::Neg(operand) => operand.size(),
            CompiledExpr::Index { operand, index } => operand.size() + index.size(),
            CompiledExpr::Binary { lhs, rhs, .. }
            | CompiledExpr::And(lhs, rhs)
            | CompiledExpr::Or(lhs, rhs) => lhs.size() + rhs.size(),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::Neq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithOp::Add => write!(f, "+"),
            ArithOp::Sub => write!(f, "-"),
            ArithOp::Mul => write!(f, "*"),
            ArithOp::Div => write!(f, "/"),
            ArithOp::Rem => write!(f, "%"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Compare(op) => write!(f, "{op}"),
            BinaryOp::Arith(op) => write!(f, "{op}"),
            BinaryOp::In => write!(f, "in"),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "!"),
            UnaryOp::Neg => write!(f, "-"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{value}"),
            Expr::Ident(name) => write!(f, "{name}"),
            Expr::List(items) => {
                write!(f, "[")?;
                write_list(f, items)?;
                write!(f, "]")
            }
            Expr::Select { operand, field } => write!(f, "{operand}.{field}"),
            Expr::Index { operand, index } => write!(f, "{operand}[{index}]"),
            Expr::Call {
                function,
                target,
                args,
            } => {
                if let Some(target) = target {
                    write!(f, "{target}.")?;
                }
                write!(f, "{function}(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Expr::Unary { op, operand } => write!(f, "{op}{operand}"),
            Expr::Binary { op, lhs, rhs } => write!(f, "({lhs} {op} {rhs})"),
            Expr::And(a, b) => write!(f, "({a} && {b})"),
            Expr::Or(a, b) => write!(f, "({a} || {b})"),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
