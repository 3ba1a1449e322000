//! Tokenizer for calculator expressions.

use std::fmt;

use super::error::{CalcError, syntax};

/// Unary functions available on the keypad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    /// Base-10 logarithm.
    Log,
    Sin,
    Cos,
    Tan,
}

impl Function {
    pub const ALL: [Function; 5] = [Self::Sqrt, Self::Log, Self::Sin, Self::Cos, Self::Tan];

    /// Look up a function by its exact lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sqrt" => Some(Self::Sqrt),
            "log" => Some(Self::Log),
            "sin" => Some(Self::Sin),
            "cos" => Some(Self::Cos),
            "tan" => Some(Self::Tan),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sqrt => "sqrt",
            Self::Log => "log",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
        }
    }

    /// Whether the argument is an angle.
    pub fn is_trig(self) -> bool {
        matches!(self, Self::Sin | Self::Cos | Self::Tan)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(f64),
    Func(Function),

    Plus,
    Minus,
    Star,
    Slash,
    Caret,

    LParen,
    RParen,
    Comma,
}

/// Split an expression into tokens.
///
/// Supports:
/// - decimal literals (`12`, `1.5`, `.5`, `5.`)
/// - operators `+ - * / ^`
/// - parentheses and commas
/// - the function names `sqrt log sin cos tan`
///
/// Whitespace is skipped.
pub fn tokenize(s: &str) -> Result<Vec<Tok>, CalcError> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let single = match c {
            '+' => Some(Tok::Plus),
            '-' => Some(Tok::Minus),
            '*' => Some(Tok::Star),
            '/' => Some(Tok::Slash),
            '^' => Some(Tok::Caret),
            '(' => Some(Tok::LParen),
            ')' => Some(Tok::RParen),
            ',' => Some(Tok::Comma),
            _ => None,
        };
        if let Some(tok) = single {
            out.push(tok);
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let start = i;
            let mut seen_dot = false;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                if chars[i] == '.' {
                    if seen_dot {
                        return Err(syntax("number with more than one decimal point"));
                    }
                    seen_dot = true;
                }
                i += 1;
            }
            let literal: String = chars[start..i].iter().collect();
            if literal == "." {
                return Err(syntax("lone decimal point"));
            }
            let value = literal
                .parse::<f64>()
                .map_err(|_| syntax(format!("invalid number: {literal}")))?;
            out.push(Tok::Num(value));
            continue;
        }

        if c.is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphabetic() {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let func = Function::from_name(&word).ok_or(CalcError::UnknownWord { word })?;
            out.push(Tok::Func(func));
            continue;
        }

        return Err(CalcError::Rejected { found: c });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_and_numbers() {
        let toks = tokenize("12 + 3.5*(.5-5.)^2").unwrap();
        assert_eq!(
            toks,
            vec![
                Tok::Num(12.0),
                Tok::Plus,
                Tok::Num(3.5),
                Tok::Star,
                Tok::LParen,
                Tok::Num(0.5),
                Tok::Minus,
                Tok::Num(5.0),
                Tok::RParen,
                Tok::Caret,
                Tok::Num(2.0),
            ]
        );
    }

    #[test]
    fn test_functions() {
        let toks = tokenize("sqrt(16)+log(100)").unwrap();
        assert_eq!(toks[0], Tok::Func(Function::Sqrt));
        assert_eq!(toks[5], Tok::Func(Function::Log));
    }

    #[test]
    fn test_bad_literals() {
        assert!(matches!(tokenize("1.2.3"), Err(CalcError::Syntax(_))));
        assert!(matches!(tokenize("1+."), Err(CalcError::Syntax(_))));
    }

    #[test]
    fn test_unknown_input() {
        assert!(matches!(
            tokenize("foo(1)"),
            Err(CalcError::UnknownWord { .. })
        ));
        assert!(matches!(
            tokenize("1;2"),
            Err(CalcError::Rejected { found: ';' })
        ));
    }

    #[test]
    fn test_function_names_round_trip() {
        for func in Function::ALL {
            assert_eq!(Function::from_name(func.name()), Some(func));
        }
    }
}
