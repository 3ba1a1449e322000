//! Expression evaluation and result formatting.

use std::fmt;

use serde::Deserialize;
use tracing::{debug, warn};

use super::detection::check_allowed;
use super::error::CalcError;
use super::rpn::{eval_rpn, to_rpn};
use super::tokens::tokenize;

/// Text shown when an expression evaluates but has no finite value.
pub const ERROR_TEXT: &str = "Error";

/// Fractional digits kept in a formatted result.
const RESULT_DECIMALS: usize = 10;

/// Enough fractional digits to print any `f64` exactly (the smallest
/// subnormal has 1074).
const EXACT_DECIMALS: usize = 1100;

/// Unit used for the argument of `sin`, `cos` and `tan`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

impl AngleUnit {
    pub fn to_radians(self, angle: f64) -> f64 {
        match self {
            Self::Degrees => angle * (std::f64::consts::PI / 180.0),
            Self::Radians => angle,
        }
    }
}

/// Outcome of evaluating an expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Evaluation {
    /// No result: the input was empty or rejected by the allow-list.
    Empty,
    /// The input was evaluated but is malformed or not a finite number.
    Error,
    /// A formatted numeric result.
    Value(String),
}

impl Evaluation {
    /// The text a display shows for this outcome, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Error => Some(ERROR_TEXT),
            Self::Value(value) => Some(value),
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}

impl From<Result<f64, CalcError>> for Evaluation {
    fn from(result: Result<f64, CalcError>) -> Self {
        match result {
            Ok(value) => Self::Value(format_result(value)),
            Err(e) if e.is_no_result() => Self::Empty,
            Err(_) => Self::Error,
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text().unwrap_or(""))
    }
}

/// Stateless evaluator for calculator expressions.
#[derive(Clone, Copy, Debug, Default)]
pub struct Evaluator {
    angle_unit: AngleUnit,
}

impl Evaluator {
    pub fn new(angle_unit: AngleUnit) -> Self {
        Self { angle_unit }
    }

    /// Evaluate an expression into a display-ready outcome.
    pub fn evaluate(&self, input: &str) -> Evaluation {
        self.compute(input).into()
    }

    /// Evaluate an expression to a finite number.
    ///
    /// Empty input and input outside the allow-list never reach the parser.
    pub fn compute(&self, input: &str) -> Result<f64, CalcError> {
        if input.trim().is_empty() {
            return Err(CalcError::Empty);
        }

        if let Err(e) = check_allowed(input) {
            warn!(expression = input, error = %e, "Rejected calculator input");
            return Err(e);
        }

        let expression: String = input.chars().filter(|c| !c.is_whitespace()).collect();

        let value = tokenize(&expression)
            .and_then(|tokens| to_rpn(&tokens))
            .and_then(|rpn| eval_rpn(&rpn, self.angle_unit))
            .inspect_err(|e| debug!(expression = %expression, error = %e, "Evaluation failed"))?;

        if !value.is_finite() {
            debug!(expression = %expression, value, "Non-finite result");
            return Err(CalcError::NonFinite(value));
        }

        Ok(value)
    }
}

/// Evaluate with the default configuration (angles in degrees).
pub fn evaluate_expression(input: &str) -> Evaluation {
    Evaluator::default().evaluate(input)
}

/// Round to ten fractional digits and print the shortest decimal form.
///
/// Ties round away from zero. Never uses exponent notation, so a result can
/// be fed back to the evaluator unchanged.
pub fn format_result(value: f64) -> String {
    let rounded: f64 = round_half_away(value, RESULT_DECIMALS)
        .parse()
        .unwrap_or(value);

    // -0 prints as "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{}", rounded)
}

/// Round on the exact decimal expansion of `value`.
///
/// `format!("{:.N}")` rounds exact ties to even, so `0.00048828125` would
/// become `0.0004882812` instead of `0.0004882813`.
fn round_half_away(value: f64, decimals: usize) -> String {
    let exact = format!("{:.*}", EXACT_DECIMALS, value.abs());
    let Some((int, frac)) = exact.split_once('.') else {
        return exact;
    };

    let mut digits: Vec<u8> = int.bytes().chain(frac.bytes().take(decimals)).collect();
    if frac.as_bytes().get(decimals).is_some_and(|d| *d >= b'5') {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let mut text: String = digits.into_iter().map(char::from).collect();
    text.insert(text.len() - decimals, '.');
    if value.is_sign_negative() {
        text.insert(0, '-');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(s: &str) -> String {
        match evaluate_expression(s) {
            Evaluation::Value(v) => v,
            other => panic!("{s} evaluated to {other:?}"),
        }
    }

    #[test]
    fn test_basic_evaluation() {
        assert_eq!(value("2+2"), "4");
        assert_eq!(value("10/4"), "2.5");
        assert_eq!(value(" 2 * ( 3 + 4 ) "), "14");
        assert_eq!(value("2^3"), "8");
    }

    #[test]
    fn test_functions() {
        assert_eq!(value("sin(30)"), "0.5");
        assert_eq!(value("cos(60)"), "0.5");
        assert_eq!(value("tan(45)"), "1");
        assert_eq!(value("sqrt(16)"), "4");
        assert_eq!(value("log(100)"), "2");
    }

    #[test]
    fn test_radians() {
        let evaluator = Evaluator::new(AngleUnit::Radians);
        assert_eq!(evaluator.evaluate("sin(0)"), Evaluation::Value("0".into()));
        assert_eq!(evaluator.evaluate("cos(0)"), Evaluation::Value("1".into()));
    }

    #[test]
    fn test_rounding() {
        assert_eq!(value("1/3"), "0.3333333333");
        assert_eq!(value("0.1+0.2"), "0.3");
        assert_eq!(value("sin(180)"), "0");
        assert_eq!(value("-0.00000000001"), "0");
        assert_eq!(value("2/3"), "0.6666666667");
    }

    #[test]
    fn test_ties_round_away_from_zero() {
        assert_eq!(value("1/2048"), "0.0004882813");
        assert_eq!(value("-1/2048"), "-0.0004882813");
        assert_eq!(value("2^-11"), "0.0004882813");
        assert_eq!(value("5/2048"), "0.0024414063");
        assert_eq!(value("0.99999999999"), "1");
        assert_eq!(value("-9.99999999999"), "-10");
    }

    #[test]
    fn test_large_results_stay_decimal() {
        assert_eq!(value("10^21"), "1000000000000000000000");
        assert_eq!(value("10^-10"), "0.0000000001");
    }

    #[test]
    fn test_empty_is_distinct_from_error() {
        assert_eq!(evaluate_expression(""), Evaluation::Empty);
        assert_eq!(evaluate_expression("   "), Evaluation::Empty);
        assert_eq!(evaluate_expression("1+"), Evaluation::Error);
        assert_ne!(evaluate_expression(""), evaluate_expression("1+"));
    }

    #[test]
    fn test_non_finite_is_error() {
        assert_eq!(evaluate_expression("5/0"), Evaluation::Error);
        assert_eq!(evaluate_expression("0/0"), Evaluation::Error);
        assert_eq!(evaluate_expression("sqrt(-1)"), Evaluation::Error);
        assert_eq!(evaluate_expression("log(0)"), Evaluation::Error);
        assert_eq!(Evaluation::Error.text(), Some("Error"));
    }

    #[test]
    fn test_disallowed_input_has_no_result() {
        for input in ["2;alert(1)", "pi", "SIN(30)", "sinx(1)", "process.exit()", "1e5"] {
            assert_eq!(evaluate_expression(input), Evaluation::Empty, "{input}");
        }
    }

    #[test]
    fn test_results_round_trip() {
        for input in ["2+2", "1/3", "-7/2", "10^21", "sin(30)", "10^-10"] {
            let first = value(input);
            assert_eq!(value(&first), first, "{input}");
        }
    }

    #[test]
    fn test_compute_reports_reason() {
        let evaluator = Evaluator::default();
        assert_eq!(evaluator.compute(""), Err(CalcError::Empty));
        assert!(matches!(evaluator.compute("(1"), Err(CalcError::Syntax(_))));
        assert!(matches!(
            evaluator.compute("1/0"),
            Err(CalcError::NonFinite(v)) if v.is_infinite()
        ));
    }
}
