//! Keypad keys and parsing of typed key sequences.

use std::fmt;

use thiserror::Error;

use crate::calculator::Function;

/// A single keypad button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Number(char),
    Operator(char),
    Decimal,
    /// Inserts `name(`.
    Function(Function),
    Paren(char),
    Clear,
    Backspace,
    Equals,
}

impl Key {
    /// The text this key appends to the expression.
    pub fn text(&self) -> String {
        match self {
            Self::Number(c) | Self::Operator(c) | Self::Paren(c) => c.to_string(),
            Self::Decimal => ".".to_string(),
            Self::Function(func) => format!("{}(", func.name()),
            Self::Clear => "C".to_string(),
            Self::Backspace => "<".to_string(),
            Self::Equals => "=".to_string(),
        }
    }

    /// Whether this key starts a fresh expression right after a result.
    pub fn starts_input(&self) -> bool {
        matches!(
            self,
            Self::Number(_) | Self::Decimal | Self::Function(_) | Self::Paren(_)
        )
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("no key for {0:?}")]
    UnknownKey(char),
    #[error("no function key named {0:?}")]
    UnknownFunction(String),
    #[error("function key {0:?} must be typed with its '('")]
    MissingParen(String),
}

/// Parse a typed line into key presses.
///
/// Each character is one key, except function keys which are typed as
/// `sin(` and so on. `C` clears, `<` is backspace, whitespace is ignored.
pub fn parse_keys(line: &str) -> Result<Vec<Key>, KeyParseError> {
    let chars: Vec<char> = line.chars().collect();
    let mut keys = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;

        let key = match c {
            c if c.is_whitespace() => continue,
            '0'..='9' => Key::Number(c),
            '+' | '-' | '*' | '/' | '^' => Key::Operator(c),
            '.' => Key::Decimal,
            '(' | ')' => Key::Paren(c),
            'C' => Key::Clear,
            '<' => Key::Backspace,
            '=' => Key::Equals,
            'a'..='z' => {
                let start = i - 1;
                while i < chars.len() && chars[i].is_ascii_lowercase() {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect();
                let func = Function::from_name(&name)
                    .ok_or_else(|| KeyParseError::UnknownFunction(name.clone()))?;
                if chars.get(i) != Some(&'(') {
                    return Err(KeyParseError::MissingParen(name));
                }
                i += 1;
                Key::Function(func)
            }
            other => return Err(KeyParseError::UnknownKey(other)),
        };
        keys.push(key);
    }

    Ok(keys)
}
