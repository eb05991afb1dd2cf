use std::borrow::Cow;

use crate::types::{CompiledExpr, Function};
use crate::{ArithOp, BinaryOp, EvalError, Value};

pub(crate) fn eval<'a>(
    expr: &'a CompiledExpr,
    vars: &'a [Value],
) -> Result<Cow<'a, Value>, EvalError> {
    match expr {
        CompiledExpr::Const(value) => Ok(Cow::Borrowed(value)),
        CompiledExpr::Var(slot) => Ok(vars
            .get(*slot)
            .map_or(Cow::Owned(Value::Null), Cow::Borrowed)),
        CompiledExpr::List(items) => {
            let items = items
                .iter()
                .map(|item| eval(item, vars).map(Cow::into_owned))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Cow::Owned(Value::List(items)))
        }
        CompiledExpr::Select { operand, field } => select(eval(operand, vars)?, field),
        CompiledExpr::Index { operand, index } => {
            let container = eval(operand, vars)?;
            let key = eval(index, vars)?;
            index_into(container, &key)
        }
        CompiledExpr::Call { function, args } => {
            let args = args
                .iter()
                .map(|arg| eval(arg, vars))
                .collect::<Result<Vec<_>, _>>()?;
            call(*function, &args).map(Cow::Owned)
        }
        CompiledExpr::Not(operand) => match &*eval(operand, vars)? {
            Value::Bool(b) => Ok(Cow::Owned(Value::Bool(!b))),
            other => Err(overload("!", &[other])),
        },
        CompiledExpr::Neg(operand) => match &*eval(operand, vars)? {
            Value::Int(i) => i
                .checked_neg()
                .map(|v| Cow::Owned(Value::Int(v)))
                .ok_or_else(|| EvalError::Overflow { op: "-".into() }),
            Value::Float(f) => Ok(Cow::Owned(Value::Float(-f))),
            other => Err(overload("-", &[other])),
        },
        CompiledExpr::Binary { op, lhs, rhs } => {
            let l = eval(lhs, vars)?;
            let r = eval(rhs, vars)?;
            binary(*op, &l, &r).map(Cow::Owned)
        }
        CompiledExpr::And(a, b) => logical(a, b, vars, false),
        CompiledExpr::Or(a, b) => logical(a, b, vars, true),
    }
}

fn overload(op: &str, args: &[&Value]) -> EvalError {
    EvalError::NoMatchingOverload {
        op: op.to_owned(),
        args: args.iter().map(|v| v.type_name().to_owned()).collect(),
    }
}

/// Short-circuiting `&&` (`absorbing == false`) and `||` (`absorbing == true`).
///
/// An error on one side is absorbed when the other side alone decides the
/// result, so `Details.missing == 'x' || true` is `true`.
fn logical<'a>(
    a: &'a CompiledExpr,
    b: &'a CompiledExpr,
    vars: &'a [Value],
    absorbing: bool,
) -> Result<Cow<'a, Value>, EvalError> {
    let op = if absorbing { "||" } else { "&&" };
    let decided = Cow::Owned(Value::Bool(absorbing));

    let left = match eval(a, vars) {
        Ok(value) => match &*value {
            Value::Bool(v) if *v == absorbing => return Ok(decided),
            Value::Bool(_) => None,
            other => Some(overload(op, &[other])),
        },
        Err(err) => Some(err),
    };

    let right = eval(b, vars)?;
    match (&*right, left) {
        (Value::Bool(v), _) if *v == absorbing => Ok(decided),
        (_, Some(err)) => Err(err),
        (Value::Bool(v), None) => Ok(Cow::Owned(Value::Bool(*v))),
        (other, None) => Err(overload(op, &[other])),
    }
}

fn select<'a>(operand: Cow<'a, Value>, field: &str) -> Result<Cow<'a, Value>, EvalError> {
    let missing = || EvalError::NoSuchKey {
        key: field.to_owned(),
    };
    match operand {
        Cow::Borrowed(Value::Map(map)) => map.get(field).map(Cow::Borrowed).ok_or_else(missing),
        Cow::Owned(Value::Map(mut map)) => map.remove(field).map(Cow::Owned).ok_or_else(missing),
        other => Err(overload(&format!(".{field}"), &[&*other])),
    }
}

fn index_into<'a>(container: Cow<'a, Value>, key: &Value) -> Result<Cow<'a, Value>, EvalError> {
    match (container, key) {
        (Cow::Borrowed(Value::Map(map)), Value::String(k)) => map
            .get(k)
            .map(Cow::Borrowed)
            .ok_or_else(|| EvalError::NoSuchKey { key: k.clone() }),
        (Cow::Owned(Value::Map(mut map)), Value::String(k)) => map
            .remove(k)
            .map(Cow::Owned)
            .ok_or_else(|| EvalError::NoSuchKey { key: k.clone() }),
        (Cow::Borrowed(Value::List(items)), Value::Int(i)) => {
            list_slot(items.len(), *i).map(|pos| Cow::Borrowed(&items[pos]))
        }
        (Cow::Owned(Value::List(mut items)), Value::Int(i)) => {
            list_slot(items.len(), *i).map(|pos| Cow::Owned(items.swap_remove(pos)))
        }
        (other, key) => Err(overload("_[_]", &[&*other, key])),
    }
}

fn list_slot(len: usize, index: i64) -> Result<usize, EvalError> {
    usize::try_from(index)
        .ok()
        .filter(|&pos| pos < len)
        .ok_or(EvalError::IndexOutOfRange { index, len })
}

fn call(function: Function, args: &[Cow<'_, Value>]) -> Result<Value, EvalError> {
    let args: Vec<&Value> = args.iter().map(|arg| &**arg).collect();
    match (function, args.as_slice()) {
        (Function::Size, [Value::String(s)]) => Ok(Value::Int(saturating_len(s.chars().count()))),
        (Function::Size, [Value::List(items)]) => Ok(Value::Int(saturating_len(items.len()))),
        (Function::Size, [Value::Map(map)]) => Ok(Value::Int(saturating_len(map.len()))),
        (Function::Contains, [Value::String(s), Value::String(p)]) => {
            Ok(Value::Bool(s.contains(p.as_str())))
        }
        (Function::StartsWith, [Value::String(s), Value::String(p)]) => {
            Ok(Value::Bool(s.starts_with(p.as_str())))
        }
        (Function::EndsWith, [Value::String(s), Value::String(p)]) => {
            Ok(Value::Bool(s.ends_with(p.as_str())))
        }
        _ => Err(overload(function.name(), &args)),
    }
}

fn saturating_len(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

fn binary(op: BinaryOp, l: &Value, r: &Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Compare(cmp) => l
            .compare(cmp, r)
            .map(Value::Bool)
            .ok_or_else(|| overload(&cmp.to_string(), &[l, r])),
        BinaryOp::In => match (l, r) {
            (_, Value::List(items)) => Ok(Value::Bool(items.iter().any(|item| item.equals(l)))),
            (Value::String(key), Value::Map(map)) => Ok(Value::Bool(map.contains_key(key))),
            _ => Err(overload("in", &[l, r])),
        },
        BinaryOp::Arith(arith) => arithmetic(arith, l, r),
    }
}

#[allow(clippy::cast_precision_loss)]
fn arithmetic(op: ArithOp, l: &Value, r: &Value) -> Result<Value, EvalError> {
    let overflow = || EvalError::Overflow { op: op.to_string() };
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => {
            let (a, b) = (*a, *b);
            let result = match op {
                ArithOp::Add => a.checked_add(b),
                ArithOp::Sub => a.checked_sub(b),
                ArithOp::Mul => a.checked_mul(b),
                ArithOp::Div if b == 0 => return Err(EvalError::DivisionByZero),
                ArithOp::Div => a.checked_div(b),
                ArithOp::Rem if b == 0 => return Err(EvalError::ModuloByZero),
                ArithOp::Rem => a.checked_rem(b),
            };
            result.map(Value::Int).ok_or_else(overflow)
        }
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) if op != ArithOp::Rem => {
            let as_f64 = |v: &Value| match v {
                Value::Int(i) => *i as f64,
                Value::Float(f) => *f,
                _ => f64::NAN,
            };
            let (a, b) = (as_f64(l), as_f64(r));
            Ok(Value::Float(match op {
                ArithOp::Add => a + b,
                ArithOp::Sub => a - b,
                ArithOp::Mul => a * b,
                ArithOp::Div | ArithOp::Rem => a / b,
            }))
        }
        (Value::String(a), Value::String(b)) if op == ArithOp::Add => {
            Ok(Value::String(format!("{a}{b}")))
        }
        (Value::List(a), Value::List(b)) if op == ArithOp::Add => {
            Ok(Value::List(a.iter().chain(b).cloned().collect()))
        }
        _ => Err(overload(&op.to_string(), &[l, r])),
    }
}
