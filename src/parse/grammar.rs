use winnow::ascii::dec_int;
use winnow::combinator::{alt, cut_err, delimited, not, opt, repeat, separated, terminated};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_while};

use crate::{ArithOp, BinaryOp, CompareOp, Expr, UnaryOp, Value};

// -- Whitespace -------------------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

// -- Identifiers ------------------------------------------------------------

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1, |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_ident_char),
    )
        .take()
        .parse_next(input)
}

// -- Literals ---------------------------------------------------------------

fn quoted(mut quote: char) -> impl FnMut(&mut &str) -> ModalResult<String> {
    move |input: &mut &str| {
        quote.parse_next(input)?;
        let mut s = String::new();
        loop {
            let ch = cut_err(any)
                .context(StrContext::Expected(StrContextValue::CharLiteral(quote)))
                .parse_next(input)?;
            match ch {
                c if c == quote => return Ok(s),
                '\\' => {
                    let esc = cut_err(any).parse_next(input)?;
                    match esc {
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        'r' => s.push('\r'),
                        '\\' | '\'' | '"' => s.push(esc),
                        other => {
                            s.push('\\');
                            s.push(other);
                        }
                    }
                }
                c => s.push(c),
            }
        }
    }
}

fn string_literal(input: &mut &str) -> ModalResult<String> {
    alt((quoted('\''), quoted('"'))).parse_next(input)
}

fn float_literal(input: &mut &str) -> ModalResult<f64> {
    // Only match floats that contain a decimal point
    (
        take_while(1.., |c: char| c.is_ascii_digit()),
        '.',
        take_while(1.., |c: char| c.is_ascii_digit()),
    )
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .parse_next(input)
}

fn number(input: &mut &str) -> ModalResult<Value> {
    alt((
        float_literal.map(Value::Float),
        dec_int::<_, i64, _>.map(Value::Int),
    ))
    .parse_next(input)
}

fn list_literal(input: &mut &str) -> ModalResult<Expr> {
    '['.parse_next(input)?;
    let items: Vec<Expr> = separated(0.., expr, (ws, ',')).parse_next(input)?;
    (ws, cut_err(']')).parse_next(input)?;
    Ok(Expr::List(items))
}

// -- Primary & postfix ------------------------------------------------------

fn call_args(input: &mut &str) -> ModalResult<Vec<Expr>> {
    let args: Vec<Expr> = separated(0.., expr, (ws, ',')).parse_next(input)?;
    (ws, cut_err(')')).parse_next(input)?;
    Ok(args)
}

fn ident_or_call(input: &mut &str) -> ModalResult<Expr> {
    let name = ident.parse_next(input)?;
    match name {
        "true" => return Ok(Expr::Literal(Value::Bool(true))),
        "false" => return Ok(Expr::Literal(Value::Bool(false))),
        "null" => return Ok(Expr::Literal(Value::Null)),
        _ => {}
    }
    if opt((ws, '(')).parse_next(input)?.is_some() {
        let args = call_args.parse_next(input)?;
        return Ok(Expr::Call {
            function: name.to_owned(),
            target: None,
            args,
        });
    }
    Ok(Expr::Ident(name.to_owned()))
}

fn primary(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    alt((
        delimited('(', cut_err(expr), (ws, cut_err(')'))),
        list_literal,
        string_literal.map(|s| Expr::Literal(Value::String(s))),
        number.map(Expr::Literal),
        ident_or_call,
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "expression",
    )))
    .parse_next(input)
}

fn postfix(input: &mut &str) -> ModalResult<Expr> {
    let mut operand = primary(input)?;
    loop {
        if opt((ws, '.')).parse_next(input)?.is_some() {
            let name = cut_err(ident)
                .context(StrContext::Expected(StrContextValue::Description(
                    "field or method name",
                )))
                .parse_next(input)?;
            if opt((ws, '(')).parse_next(input)?.is_some() {
                let args = call_args.parse_next(input)?;
                operand = Expr::Call {
                    function: name.to_owned(),
                    target: Some(Box::new(operand)),
                    args,
                };
            } else {
                operand = Expr::Select {
                    operand: Box::new(operand),
                    field: name.to_owned(),
                };
            }
        } else if opt((ws, '[')).parse_next(input)?.is_some() {
            let index = cut_err(expr).parse_next(input)?;
            (ws, cut_err(']')).parse_next(input)?;
            operand = Expr::Index {
                operand: Box::new(operand),
                index: Box::new(index),
            };
        } else {
            return Ok(operand);
        }
    }
}

// -- Operators (precedence: || < && < relation < additive < multiplicative < unary)

fn unary(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    let op = opt(alt(('!'.value(UnaryOp::Not), '-'.value(UnaryOp::Neg)))).parse_next(input)?;
    match op {
        Some(op) => {
            let operand = cut_err(unary).parse_next(input)?;
            Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            })
        }
        None => postfix(input),
    }
}

fn fold_binary(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
    rest.into_iter().fold(first, |lhs, (op, rhs)| Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

fn multiplicative_op(input: &mut &str) -> ModalResult<BinaryOp> {
    ws.parse_next(input)?;
    alt((
        '*'.value(BinaryOp::Arith(ArithOp::Mul)),
        '/'.value(BinaryOp::Arith(ArithOp::Div)),
        '%'.value(BinaryOp::Arith(ArithOp::Rem)),
    ))
    .parse_next(input)
}

fn multiplicative(input: &mut &str) -> ModalResult<Expr> {
    let first = unary(input)?;
    let rest: Vec<(BinaryOp, Expr)> =
        repeat(0.., (multiplicative_op, cut_err(unary))).parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn additive_op(input: &mut &str) -> ModalResult<BinaryOp> {
    ws.parse_next(input)?;
    alt((
        '+'.value(BinaryOp::Arith(ArithOp::Add)),
        '-'.value(BinaryOp::Arith(ArithOp::Sub)),
    ))
    .parse_next(input)
}

fn additive(input: &mut &str) -> ModalResult<Expr> {
    let first = multiplicative(input)?;
    let rest: Vec<(BinaryOp, Expr)> =
        repeat(0.., (additive_op, cut_err(multiplicative))).parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn relation_op(input: &mut &str) -> ModalResult<BinaryOp> {
    ws.parse_next(input)?;
    alt((
        "<=".value(BinaryOp::Compare(CompareOp::Lte)),
        "<".value(BinaryOp::Compare(CompareOp::Lt)),
        ">=".value(BinaryOp::Compare(CompareOp::Gte)),
        ">".value(BinaryOp::Compare(CompareOp::Gt)),
        "==".value(BinaryOp::Compare(CompareOp::Eq)),
        "!=".value(BinaryOp::Compare(CompareOp::Neq)),
        ("in", not(take_while(1, is_ident_char))).value(BinaryOp::In),
    ))
    .parse_next(input)
}

fn relation(input: &mut &str) -> ModalResult<Expr> {
    let first = additive(input)?;
    let rest: Vec<(BinaryOp, Expr)> =
        repeat(0.., (relation_op, cut_err(additive))).parse_next(input)?;
    Ok(fold_binary(first, rest))
}

fn and_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = relation(input)?;
    let rest: Vec<Expr> = repeat(0.., (ws, "&&", cut_err(relation)).map(|(_, _, e)| e))
        .parse_next(input)?;
    Ok(rest
        .into_iter()
        .fold(first, |acc, r| Expr::And(Box::new(acc), Box::new(r))))
}

fn or_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = and_expr(input)?;
    let rest: Vec<Expr> = repeat(0.., (ws, "||", cut_err(and_expr)).map(|(_, _, e)| e))
        .parse_next(input)?;
    Ok(rest
        .into_iter()
        .fold(first, |acc, r| Expr::Or(Box::new(acc), Box::new(r))))
}

fn expr(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    or_expr(input)
}

// -- Top-level parser -------------------------------------------------------

pub fn parse_expression(input: &mut &str) -> ModalResult<Expr> {
    terminated(expr, ws).parse_next(input)
}
