use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Ways a magnitude string can fail to parse.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("No value specified")]
    Empty,

    #[error("Illegal value: {0}")]
    Illegal(String),

    #[error("Division by zero in value: {0}")]
    DivideByZero(String),
}

/// Parses a magnitude.
///
/// This function turns user (or database) text into a finite real number.
/// The following forms are accepted:
///
///   - Decimal numbers, optionally signed and with an exponent (`-1.5e3`);
///   - Fractions of two decimal numbers (`1/12`); and
///   - Any of the above with `,` or `_` digit separators (`1,000`).
///
/// Text is NFKC-normalized first, so fullwidth digits and the Unicode minus
/// sign are understood.
pub fn parse_magnitude(string: &str) -> Result<f64, ParseError> {
    enum Form {
        Decimal,
        Fraction,
    }

    lazy_static! {
        /// Possible regexes that a valid magnitude string can match with.
        static ref REGEXES: Vec<(Form, Regex)> = vec![
            // Strings of the form n.
            (Form::Decimal, Regex::new(
                r"^(?P<numerator>[+\-]?(?:\d+\.?\d*|\.\d+)(?:[Ee][+\-]?\d+)?)$"
            ).unwrap()),

            // Strings of the form n/d.
            (Form::Fraction, Regex::new(
                r"^(?P<numerator>[+\-]?(?:\d+\.?\d*|\.\d+)(?:[Ee][+\-]?\d+)?)/(?P<denominator>[+\-]?(?:\d+\.?\d*|\.\d+)(?:[Ee][+\-]?\d+)?)$"
            ).unwrap()),
        ];
    }

    let normalized = string.nfkc()
    .map(|character| if character == '\u{2212}' { '-' } else { character })
    .filter(|character| !character.is_whitespace() && *character != ',' && *character != '_')
    .collect::<String>();

    if normalized.is_empty() {
        return Err(ParseError::Empty);
    }

    let illegal = || ParseError::Illegal(string.to_string());

    for (form, regex) in REGEXES.iter() {
        let captures = match regex.captures(&normalized) {
            Some(captures) => captures,
            None => continue,
        };

        // The regexes only admit strings Rust can parse, barring overflow.
        let numerator = captures["numerator"].parse::<f64>().map_err(|_| illegal())?;

        let magnitude = match form {
            Form::Decimal => numerator,
            Form::Fraction => {
                let denominator = captures["denominator"].parse::<f64>()
                .map_err(|_| illegal())?;

                if denominator == 0.0 {
                    return Err(ParseError::DivideByZero(string.to_string()));
                }

                numerator / denominator
            }
        };

        if !magnitude.is_finite() {
            return Err(illegal());
        }

        return Ok(magnitude);
    }

    Err(illegal())
}

/// Returns whether the given string reads as a magnitude.
#[cfg(mainbuild)]
pub fn is_magnitude(string: &str) -> bool {
    parse_magnitude(string).is_ok()
}



#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(Some(1.0)       , "1")]
    #[case(Some(-1.0)      , "-1")]
    #[case(Some(1.0)       , "+1")]
    #[case(Some(0.5)       , ".5")]
    #[case(Some(5.0)       , "5.")]
    #[case(Some(1.25)      , "1.25")]
    #[case(Some(1500.0)    , "1.5e3")]
    #[case(Some(0.0015)    , "1.5E-3")]
    #[case(Some(1000.0)    , "1,000")]
    #[case(Some(1000000.0) , "1_000_000")]
    #[case(Some(0.25)      , "1/4")]
    #[case(Some(-0.5)      , "-1/2")]
    #[case(Some(-3.0)      , "\u{2212}3")]
    #[case(Some(12.0)      , "\u{FF11}\u{FF12}")]
    #[case(Some(2.0)       , " 2 ")]
    #[case(None            , "")]
    #[case(None            , "   ")]
    #[case(None            , "abc")]
    #[case(None            , "1.2.3")]
    #[case(None            , "inf")]
    #[case(None            , "NaN")]
    #[case(None            , "1/0")]
    #[case(None            , "1//2")]
    #[case(None            , "1e999")]
    #[case(None            , "--1")]
    #[trace]
    fn test_parse(#[case] expected: Option<f64>, #[case] string: &str) {
        match (expected, parse_magnitude(string)) {
            (Some(expected), Ok(actual)) => assert_eq!(expected, actual),
            (None, Err(_)) => {}
            (expected, actual) => panic!("Expected {:?}, got {:?}", expected, actual),
        }
    }

    #[rstest]
    #[case(ParseError::Empty                       , "")]
    #[case(ParseError::DivideByZero("3/0".into())  , "3/0")]
    #[case(ParseError::Illegal("meter".into())     , "meter")]
    #[trace]
    fn test_parse_errors(#[case] expected: ParseError, #[case] string: &str) {
        assert_eq!(Err(expected), parse_magnitude(string));
    }

    #[test]
    fn test_is_magnitude() {
        assert!(is_magnitude("500"));
        assert!(is_magnitude("-0.25"));
        assert!(!is_magnitude("mm"));
        assert!(!is_magnitude("u"));
    }
}
