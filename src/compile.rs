use std::borrow::Cow;
use std::fmt;

use crate::types::{CompiledExpr, Function};
use crate::{
    Activation, ArithOp, BinaryOp, CompareOp, CompileError, Environment, EvalError, Expr,
    ProgramError, TypeHint, UnaryOp, Value,
};

/// Static type used while checking an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ty {
    Null,
    Bool,
    Int,
    Double,
    String,
    List,
    Map,
    Dyn,
}

impl Ty {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => Ty::Null,
            Value::Bool(_) => Ty::Bool,
            Value::Int(_) => Ty::Int,
            Value::Float(_) => Ty::Double,
            Value::String(_) => Ty::String,
            Value::List(_) => Ty::List,
            Value::Map(_) => Ty::Map,
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, Ty::Int | Ty::Double)
    }

    /// Whether `self` may stand where `expected` is required.
    fn admits(self, expected: Ty) -> bool {
        self == Ty::Dyn || self == expected
    }
}

impl From<TypeHint> for Ty {
    fn from(hint: TypeHint) -> Self {
        match hint {
            TypeHint::String => Ty::String,
            TypeHint::Int => Ty::Int,
            TypeHint::Double => Ty::Double,
            TypeHint::Bool => Ty::Bool,
            TypeHint::Map => Ty::Map,
            TypeHint::Dyn => Ty::Dyn,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Ty::Null => "null",
            Ty::Bool => "bool",
            Ty::Int => "int",
            Ty::Double => "double",
            Ty::String => "string",
            Ty::List => "list",
            Ty::Map => "map",
            Ty::Dyn => "dyn",
        };
        f.write_str(name)
    }
}

/// A parsed and type-checked expression, ready to be built into a
/// [`Program`] by [`Environment::program()`].
#[derive(Debug, Clone)]
pub struct Ast {
    root: CompiledExpr,
    result: Ty,
}

impl Ast {
    /// Whether the checker proved this expression yields a boolean.
    /// Dynamically typed expressions return `false`.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        self.result == Ty::Bool
    }
}

/// An executable expression: variables are resolved to activation slots and
/// constant subexpressions are folded.
#[derive(Debug, Clone)]
pub struct Program {
    root: CompiledExpr,
    size: usize,
}

impl Program {
    /// Execute against the variable values of one record.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] on missing map keys, dynamic type mismatches
    /// and arithmetic failures.
    pub fn execute(&self, activation: &Activation) -> Result<Value, EvalError> {
        crate::evaluate::eval(&self.root, activation.values()).map(Cow::into_owned)
    }

    /// Number of nodes in the built program.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }
}

pub(crate) fn compile(env: &Environment, source: &str) -> Result<Ast, CompileError> {
    let expr = crate::parse::parse(source)?;
    let (root, result) = Checker { env }.check(&expr)?;
    Ok(Ast { root, result })
}

pub(crate) fn build(ast: &Ast, max_size: usize) -> Result<Program, ProgramError> {
    let root = fold(ast.root.clone())?;
    let size = root.size();
    if size > max_size {
        return Err(ProgramError::TooComplex {
            size,
            limit: max_size,
        });
    }
    Ok(Program { root, size })
}

// -- Type checking ------------------------------------------------------------

struct Checker<'a> {
    env: &'a Environment,
}

fn overload(op: impl fmt::Display, args: &[Ty]) -> CompileError {
    CompileError::NoMatchingOverload {
        op: op.to_string(),
        args: args.iter().map(ToString::to_string).collect(),
    }
}

impl Checker<'_> {
    fn check(&self, expr: &Expr) -> Result<(CompiledExpr, Ty), CompileError> {
        match expr {
            Expr::Literal(value) => Ok((CompiledExpr::Const(value.clone()), Ty::of(value))),
            Expr::Ident(name) => self.resolve(&[name.as_str()]),
            Expr::Select { operand, field } => {
                let mut segments = Vec::new();
                if qualified_segments(expr, &mut segments) {
                    return self.resolve(&segments);
                }
                let (operand, ty) = self.check(operand)?;
                let ty = select_type(ty, field)?;
                Ok((
                    CompiledExpr::Select {
                        operand: Box::new(operand),
                        field: field.clone(),
                    },
                    ty,
                ))
            }
            Expr::List(items) => {
                let items = items
                    .iter()
                    .map(|item| self.check(item).map(|(e, _)| e))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((CompiledExpr::List(items), Ty::List))
            }
            Expr::Index { operand, index } => {
                let (operand, container) = self.check(operand)?;
                let (index, key) = self.check(index)?;
                let ok = match container {
                    Ty::Map => key.admits(Ty::String),
                    Ty::List => key.admits(Ty::Int),
                    Ty::Dyn => true,
                    _ => false,
                };
                if !ok {
                    return Err(overload("_[_]", &[container, key]));
                }
                Ok((
                    CompiledExpr::Index {
                        operand: Box::new(operand),
                        index: Box::new(index),
                    },
                    Ty::Dyn,
                ))
            }
            Expr::Call {
                function,
                target,
                args,
            } => self.check_call(function, target.as_deref(), args),
            Expr::Unary { op, operand } => {
                let (operand, ty) = self.check(operand)?;
                match op {
                    UnaryOp::Not if ty.admits(Ty::Bool) => {
                        Ok((CompiledExpr::Not(Box::new(operand)), Ty::Bool))
                    }
                    UnaryOp::Neg if ty.is_numeric() || ty == Ty::Dyn => {
                        Ok((CompiledExpr::Neg(Box::new(operand)), ty))
                    }
                    _ => Err(overload(op, &[ty])),
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                let (lhs, l) = self.check(lhs)?;
                let (rhs, r) = self.check(rhs)?;
                let ty = binary_type(*op, l, r).ok_or_else(|| overload(op, &[l, r]))?;
                Ok((
                    CompiledExpr::Binary {
                        op: *op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                    ty,
                ))
            }
            Expr::And(a, b) | Expr::Or(a, b) => {
                let (a_expr, a_ty) = self.check(a)?;
                let (b_expr, b_ty) = self.check(b)?;
                let is_and = matches!(expr, Expr::And(..));
                if !a_ty.admits(Ty::Bool) || !b_ty.admits(Ty::Bool) {
                    return Err(overload(if is_and { "&&" } else { "||" }, &[a_ty, b_ty]));
                }
                let (a_expr, b_expr) = (Box::new(a_expr), Box::new(b_expr));
                let node = if is_and {
                    CompiledExpr::And(a_expr, b_expr)
                } else {
                    CompiledExpr::Or(a_expr, b_expr)
                };
                Ok((node, Ty::Bool))
            }
        }
    }

    /// Resolve a qualified name by its longest declared prefix; the remaining
    /// segments become field selections.
    fn resolve(&self, segments: &[&str]) -> Result<(CompiledExpr, Ty), CompileError> {
        for end in (1..=segments.len()).rev() {
            let name = segments[..end].join(".");
            let Some((slot, hint)) = self.env.lookup(&name) else {
                continue;
            };
            let mut node = CompiledExpr::Var(slot);
            let mut ty = Ty::from(hint);
            for field in &segments[end..] {
                ty = select_type(ty, field)?;
                node = CompiledExpr::Select {
                    operand: Box::new(node),
                    field: (*field).to_owned(),
                };
            }
            return Ok((node, ty));
        }
        Err(CompileError::UndeclaredReference {
            name: segments.join("."),
        })
    }

    fn check_call(
        &self,
        name: &str,
        target: Option<&Expr>,
        args: &[Expr],
    ) -> Result<(CompiledExpr, Ty), CompileError> {
        let function = match (name, target.is_some(), args.len()) {
            ("size", false, 1) => Function::Size,
            ("contains", true, 1) => Function::Contains,
            ("startsWith", true, 1) => Function::StartsWith,
            ("endsWith", true, 1) => Function::EndsWith,
            _ => {
                return Err(CompileError::UnknownFunction {
                    name: name.to_owned(),
                    arity: args.len() + usize::from(target.is_some()),
                })
            }
        };

        let mut checked = Vec::with_capacity(args.len() + 1);
        let mut types = Vec::with_capacity(args.len() + 1);
        for arg in target.into_iter().chain(args) {
            let (e, ty) = self.check(arg)?;
            checked.push(e);
            types.push(ty);
        }

        let result = match function {
            Function::Size => match types[0] {
                Ty::String | Ty::List | Ty::Map | Ty::Dyn => Ty::Int,
                _ => return Err(overload(function.name(), &types)),
            },
            Function::Contains | Function::StartsWith | Function::EndsWith => {
                if types.iter().all(|ty| ty.admits(Ty::String)) {
                    Ty::Bool
                } else {
                    return Err(overload(function.name(), &types));
                }
            }
        };

        Ok((
            CompiledExpr::Call {
                function,
                args: checked,
            },
            result,
        ))
    }
}

fn qualified_segments<'e>(expr: &'e Expr, out: &mut Vec<&'e str>) -> bool {
    match expr {
        Expr::Ident(name) => {
            out.push(name);
            true
        }
        Expr::Select { operand, field } => {
            if qualified_segments(operand, out) {
                out.push(field);
                true
            } else {
                false
            }
        }
        _ => false,
    }
}

fn select_type(ty: Ty, field: &str) -> Result<Ty, CompileError> {
    match ty {
        Ty::Map | Ty::Dyn => Ok(Ty::Dyn),
        other => Err(CompileError::NoSuchField {
            ty: other.to_string(),
            field: field.to_owned(),
        }),
    }
}

fn binary_type(op: BinaryOp, l: Ty, r: Ty) -> Option<Ty> {
    let dynamic = l == Ty::Dyn || r == Ty::Dyn;
    match op {
        BinaryOp::Compare(CompareOp::Eq | CompareOp::Neq) => {
            let comparable = dynamic
                || l == r
                || l == Ty::Null
                || r == Ty::Null
                || (l.is_numeric() && r.is_numeric());
            comparable.then_some(Ty::Bool)
        }
        BinaryOp::Compare(_) => {
            let orderable = |t: Ty| t.is_numeric() || matches!(t, Ty::String | Ty::Bool | Ty::Dyn);
            let comparable = (orderable(l) && orderable(r))
                && (dynamic || (l.is_numeric() && r.is_numeric()) || l == r);
            comparable.then_some(Ty::Bool)
        }
        BinaryOp::In => match r {
            Ty::List | Ty::Dyn => Some(Ty::Bool),
            Ty::Map => l.admits(Ty::String).then_some(Ty::Bool),
            _ => None,
        },
        BinaryOp::Arith(arith) => arith_type(arith, l, r),
    }
}

fn arith_type(op: ArithOp, l: Ty, r: Ty) -> Option<Ty> {
    match (l, r) {
        (Ty::Int, Ty::Int) => Some(Ty::Int),
        (Ty::Dyn, Ty::Dyn) => Some(Ty::Dyn),
        _ if op == ArithOp::Rem => (l.admits(Ty::Int) && r.admits(Ty::Int)).then_some(Ty::Dyn),
        _ if l.is_numeric() && r.is_numeric() => Some(Ty::Double),
        (Ty::Dyn, t) | (t, Ty::Dyn) if t.is_numeric() => Some(Ty::Dyn),
        (Ty::String, Ty::String) | (Ty::List, Ty::List) if op == ArithOp::Add => Some(l),
        (Ty::Dyn, Ty::String | Ty::List) | (Ty::String | Ty::List, Ty::Dyn)
            if op == ArithOp::Add =>
        {
            Some(Ty::Dyn)
        }
        _ => None,
    }
}

// -- Program building ---------------------------------------------------------

/// Replace every subtree whose operands are all constants with its value.
fn fold(expr: CompiledExpr) -> Result<CompiledExpr, ProgramError> {
    let expr = match expr {
        CompiledExpr::Const(_) | CompiledExpr::Var(_) => return Ok(expr),
        CompiledExpr::List(items) => {
            CompiledExpr::List(items.into_iter().map(fold).collect::<Result<_, _>>()?)
        }
        CompiledExpr::Select { operand, field } => CompiledExpr::Select {
            operand: Box::new(fold(*operand)?),
            field,
        },
        CompiledExpr::Index { operand, index } => CompiledExpr::Index {
            operand: Box::new(fold(*operand)?),
            index: Box::new(fold(*index)?),
        },
        CompiledExpr::Call { function, args } => CompiledExpr::Call {
            function,
            args: args.into_iter().map(fold).collect::<Result<_, _>>()?,
        },
        CompiledExpr::Not(operand) => CompiledExpr::Not(Box::new(fold(*operand)?)),
        CompiledExpr::Neg(operand) => CompiledExpr::Neg(Box::new(fold(*operand)?)),
        CompiledExpr::Binary { op, lhs, rhs } => CompiledExpr::Binary {
            op,
            lhs: Box::new(fold(*lhs)?),
            rhs: Box::new(fold(*rhs)?),
        },
        CompiledExpr::And(a, b) => CompiledExpr::And(Box::new(fold(*a)?), Box::new(fold(*b)?)),
        CompiledExpr::Or(a, b) => CompiledExpr::Or(Box::new(fold(*a)?), Box::new(fold(*b)?)),
    };

    if !operands_constant(&expr) {
        return Ok(expr);
    }
    let value = crate::evaluate::eval(&expr, &[])
        .map_err(ProgramError::ConstantFolding)?
        .into_owned();
    Ok(CompiledExpr::Const(value))
}

fn operands_constant(expr: &CompiledExpr) -> bool {
    let is_const = |e: &CompiledExpr| matches!(e, CompiledExpr::Const(_));
    match expr {
        CompiledExpr::Const(_) | CompiledExpr::Var(_) => false,
        CompiledExpr::List(items) | CompiledExpr::Call { args: items, .. } => {
            items.iter().all(is_const)
        }
        CompiledExpr::Select { operand, .. }
        | CompiledExpr::Not(operand)
        | CompiledExpr::Neg(operand) => is_const(operand),
        CompiledExpr::Index { operand, index } => is_const(operand) && is_const(index),
        CompiledExpr::Binary { lhs, rhs, .. }
        | CompiledExpr::And(lhs, rhs)
        | CompiledExpr::Or(lhs, rhs) => is_const(lhs) && is_const(rhs),
    }
}
