//! Allow-list gate for calculator input.
//!
//! Runs before tokenizing. Anything that is not plainly arithmetic is
//! rejected here so the parser only ever sees the calculator vocabulary.

use lazy_static::lazy_static;
use regex::Regex;

use super::error::CalcError;
use super::tokens::Function;

lazy_static! {
    /// Matches strings containing only calculator-safe characters.
    /// Allows: digits, whitespace, operators, parentheses, dots, commas and
    /// lowercase letters (for function names).
    static ref ALLOWED_CHARS: Regex = Regex::new(r"^[0-9\s\.,\+\-\*/\^()a-z]+$").unwrap();

    /// Matches each maximal run of letters.
    static ref WORD: Regex = Regex::new(r"[a-z]+").unwrap();

    /// Matches the first character outside the allow-list.
    static ref DISALLOWED_CHAR: Regex = Regex::new(r"[^0-9\s\.,\+\-\*/\^()a-z]").unwrap();
}

/// Check that `input` only uses the calculator vocabulary.
///
/// Every letter run must be a known function name, so `pi`, `sinx` or
/// `alert` are rejected even though each letter is allowed on its own.
pub fn check_allowed(input: &str) -> Result<(), CalcError> {
    if !ALLOWED_CHARS.is_match(input) {
        let found = DISALLOWED_CHAR
            .find(input)
            .and_then(|m| m.as_str().chars().next())
            .unwrap_or_default();
        return Err(CalcError::Rejected { found });
    }

    if let Some(word) = WORD
        .find_iter(input)
        .map(|m| m.as_str())
        .find(|word| Function::from_name(word).is_none())
    {
        return Err(CalcError::UnknownWord {
            word: word.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_accepted() {
        assert!(check_allowed("2+2").is_ok());
        assert!(check_allowed(" 10 / 4 ").is_ok());
        assert!(check_allowed("(1.5 - .5) * 2^3").is_ok());
        assert!(check_allowed("log(10,100)").is_ok());
    }

    #[test]
    fn test_functions_accepted() {
        assert!(check_allowed("sin(30)").is_ok());
        assert!(check_allowed("sqrt(16)+cos(60)-tan(45)*log(100)").is_ok());
    }

    #[test]
    fn test_injection_rejected() {
        assert!(matches!(
            check_allowed("2;alert(1)"),
            Err(CalcError::Rejected { found: ';' })
        ));
        assert!(matches!(
            check_allowed("Math.PI"),
            Err(CalcError::Rejected { found: 'M' })
        ));
        assert!(matches!(
            check_allowed("x => x"),
            Err(CalcError::Rejected { found: '=' })
        ));
    }

    #[test]
    fn test_unknown_words_rejected() {
        assert!(matches!(
            check_allowed("pi*2"),
            Err(CalcError::UnknownWord { word }) if word == "pi"
        ));
        assert!(matches!(
            check_allowed("sinx(1)"),
            Err(CalcError::UnknownWord { word }) if word == "sinx"
        ));
        assert!(check_allowed("SIN(30)").is_err());
    }
}
