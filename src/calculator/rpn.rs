//! Shunting-yard conversion to RPN, and RPN evaluation.
//!
//! Precedence, lowest first: binary `+ -`, `* /`, unary `- +`, `^`.
//! `^` is right associative, so `2^3^2` is `2^(3^2)` and `-2^2` is `-(2^2)`.
//! A function name must be followed by a parenthesized single argument.

use super::error::{CalcError, syntax};
use super::evaluation::AngleUnit;
use super::tokens::{Function, Tok};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
            Self::Pow => 4,
        }
    }

    fn is_right_associative(self) -> bool {
        matches!(self, Self::Pow)
    }

    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => a / b,
            Self::Pow => a.powf(b),
        }
    }
}

/// Unary minus binds tighter than `* /` but looser than `^`.
const NEG_PRECEDENCE: u8 = 3;

/// One step of a postfix program.
#[derive(Clone, Debug, PartialEq)]
pub enum Rpn {
    Num(f64),
    Binary(BinOp),
    Neg,
    Call(Function),
}

/// Entries on the operator stack.
#[derive(Clone, Copy, Debug)]
enum StackOp {
    Binary(BinOp),
    Neg,
    LParen,
    Func(Function),
}

impl StackOp {
    fn precedence(self) -> Option<u8> {
        match self {
            Self::Binary(op) => Some(op.precedence()),
            Self::Neg => Some(NEG_PRECEDENCE),
            Self::LParen | Self::Func(_) => None,
        }
    }

    fn into_rpn(self) -> Option<Rpn> {
        match self {
            Self::Binary(op) => Some(Rpn::Binary(op)),
            Self::Neg => Some(Rpn::Neg),
            Self::Func(func) => Some(Rpn::Call(func)),
            Self::LParen => None,
        }
    }
}

fn binary_op(tok: &Tok) -> Option<BinOp> {
    match tok {
        Tok::Plus => Some(BinOp::Add),
        Tok::Minus => Some(BinOp::Sub),
        Tok::Star => Some(BinOp::Mul),
        Tok::Slash => Some(BinOp::Div),
        Tok::Caret => Some(BinOp::Pow),
        _ => None,
    }
}

/// Convert tokens to postfix order.
///
/// Example:
///   tokens: [Func(Sin), LParen, Num(30), RParen, Star, Num(2)]
///   rpn:    [Num(30), Call(Sin), Num(2), Binary(Mul)]
pub fn to_rpn(tokens: &[Tok]) -> Result<Vec<Rpn>, CalcError> {
    let mut out: Vec<Rpn> = Vec::new();
    let mut ops: Vec<StackOp> = Vec::new();

    // True when the next token has to start an operand (number, function,
    // '(' or a prefix sign). Drives unary minus and catches dangling operators.
    let mut expect_operand = true;
    let mut iter = tokens.iter().peekable();

    while let Some(tok) = iter.next() {
        match tok {
            Tok::Num(value) => {
                if !expect_operand {
                    return Err(syntax("missing operator before number"));
                }
                out.push(Rpn::Num(*value));
                expect_operand = false;
            }

            Tok::Func(func) => {
                if !expect_operand {
                    return Err(syntax(format!("missing operator before {func}")));
                }
                if iter.next_if(|next| **next == Tok::LParen).is_none() {
                    return Err(syntax(format!("{func} must be followed by '('")));
                }
                ops.push(StackOp::Func(*func));
                ops.push(StackOp::LParen);
            }

            Tok::LParen => {
                if !expect_operand {
                    return Err(syntax("missing operator before '('"));
                }
                ops.push(StackOp::LParen);
            }

            Tok::RParen => {
                if expect_operand {
                    return Err(syntax("unexpected ')'"));
                }
                loop {
                    match ops.pop() {
                        Some(StackOp::LParen) => break,
                        Some(op) => out.extend(op.into_rpn()),
                        None => return Err(syntax("unbalanced ')'")),
                    }
                }
                if let Some(StackOp::Func(func)) = ops.last().copied() {
                    ops.pop();
                    out.push(Rpn::Call(func));
                }
            }

            Tok::Comma => return Err(syntax("functions take a single argument")),

            Tok::Plus | Tok::Minus if expect_operand => {
                if *tok == Tok::Minus {
                    ops.push(StackOp::Neg);
                }
            }

            _ => {
                let Some(op) = binary_op(tok) else {
                    return Err(syntax(format!("unexpected token {tok:?}")));
                };
                if expect_operand {
                    return Err(syntax("operator without left operand"));
                }

                let prec = op.precedence();
                while let Some(top_prec) = ops.last().and_then(|top| top.precedence()) {
                    let should_pop = if op.is_right_associative() {
                        top_prec > prec
                    } else {
                        top_prec >= prec
                    };
                    if !should_pop {
                        break;
                    }
                    if let Some(top) = ops.pop() {
                        out.extend(top.into_rpn());
                    }
                }

                ops.push(StackOp::Binary(op));
                expect_operand = true;
            }
        }
    }

    if expect_operand {
        return Err(syntax("unexpected end of expression"));
    }

    while let Some(op) = ops.pop() {
        match op.into_rpn() {
            Some(rpn) => out.push(rpn),
            None => return Err(syntax("unclosed '('")),
        }
    }

    Ok(out)
}

/// Run a postfix program.
pub fn eval_rpn(rpn: &[Rpn], unit: AngleUnit) -> Result<f64, CalcError> {
    let mut stack: Vec<f64> = Vec::with_capacity(rpn.len());

    for step in rpn {
        match step {
            Rpn::Num(value) => stack.push(*value),
            Rpn::Binary(op) => {
                let b = stack.pop().ok_or_else(|| syntax("missing operand"))?;
                let a = stack.pop().ok_or_else(|| syntax("missing operand"))?;
                stack.push(op.apply(a, b));
            }
            Rpn::Neg => {
                let a = stack.pop().ok_or_else(|| syntax("missing operand"))?;
                stack.push(-a);
            }
            Rpn::Call(func) => {
                let x = stack.pop().ok_or_else(|| syntax("function without argument"))?;
                stack.push(apply_function(*func, x, unit));
            }
        }
    }

    match stack.as_slice() {
        [value] => Ok(*value),
        _ => Err(syntax("invalid expression")),
    }
}

fn apply_function(func: Function, x: f64, unit: AngleUnit) -> f64 {
    let x = if func.is_trig() { unit.to_radians(x) } else { x };
    match func {
        Function::Sqrt => x.sqrt(),
        Function::Log => x.log10(),
        Function::Sin => x.sin(),
        Function::Cos => x.cos(),
        Function::Tan => x.tan(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::tokens::tokenize;

    fn run(s: &str) -> Result<f64, CalcError> {
        let toks = tokenize(s)?;
        let rpn = to_rpn(&toks)?;
        eval_rpn(&rpn, AngleUnit::Degrees)
    }

    #[test]
    fn test_rpn_order() {
        let rpn = to_rpn(&tokenize("sin(30)*2").unwrap()).unwrap();
        assert_eq!(
            rpn,
            vec![
                Rpn::Num(30.0),
                Rpn::Call(Function::Sin),
                Rpn::Num(2.0),
                Rpn::Binary(BinOp::Mul),
            ]
        );
    }

    #[test]
    fn test_precedence() {
        assert_eq!(run("2+3*4").unwrap(), 14.0);
        assert_eq!(run("(2+3)*4").unwrap(), 20.0);
        assert_eq!(run("10-4-3").unwrap(), 3.0);
        assert_eq!(run("64/4/2").unwrap(), 8.0);
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(run("2^3^2").unwrap(), 512.0);
        assert_eq!(run("2^-1").unwrap(), 0.5);
    }

    #[test]
    fn test_unary_signs() {
        assert_eq!(run("-2^2").unwrap(), -4.0);
        assert_eq!(run("-2*3").unwrap(), -6.0);
        assert_eq!(run("3--2").unwrap(), 5.0);
        assert_eq!(run("+5").unwrap(), 5.0);
        assert_eq!(run("-(1+2)").unwrap(), -3.0);
    }

    #[test]
    fn test_nested_functions() {
        assert_eq!(run("sqrt(sqrt(16))").unwrap(), 2.0);
        assert_eq!(run("log(10^3)").unwrap(), 3.0);
    }

    #[test]
    fn test_syntax_errors() {
        for input in [
            "(1+2",
            "1+2)",
            "1+",
            "*2",
            "2(3)",
            "2sin(30)",
            "sqrt16",
            "sqrt()",
            "()",
            "log(10,100)",
        ] {
            assert!(
                matches!(run(input), Err(CalcError::Syntax(_))),
                "{input} should be a syntax error"
            );
        }
    }
}
