use clap::Parser;
use std::path::PathBuf;

use crate::config::Notation;
use crate::config::Output;
use crate::number::is_magnitude;

/// The separator token allowed between a value and its output unit.
const TOKEN_SEPARATOR: &str = "to";

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "ckconv", version)]
#[command(about = "Converts lengths between metric, imperial and Creation Kit units", long_about = None)]
pub struct Arguments {
    /// Conversions, each an input unit, a value and an output unit (or "all")
    #[arg(value_name = "CONVERSION", allow_hyphen_values = true)]
    pub conversions: Vec<String>,

    /// Digits of precision to display
    #[arg(short, long, value_name = "DIGITS")]
    pub precision: Option<usize>,

    /// Display values in fixed notation
    #[arg(long, conflicts_with = "scientific")]
    pub standard: bool,

    /// Display values in scientific notation
    #[arg(long)]
    pub scientific: bool,

    /// Do not display the input value and unit
    #[arg(short, long)]
    pub quiet: bool,

    /// Do not color output
    #[arg(short, long)]
    pub no_color: bool,

    /// Display the input on every line when converting to all systems
    #[arg(short, long)]
    pub always_show_input: bool,

    /// Convert the conversions listed in a file
    #[arg(short, long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Path of the config file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the current configuration to the config file
    #[arg(long = "reset-ini", visible_alias = "ini-reset")]
    pub reset_ini: bool,
}

impl Arguments {
    /// Overrides output settings with the flags given.
    pub fn apply(&self, output: &mut Output) {
        if let Some(precision) = self.precision {
            output.precision = precision;
        }

        if self.standard {
            output.notation = Notation::Fixed;
        }

        if self.scientific {
            output.notation = Notation::Scientific;
        }

        output.quiet |= self.quiet;
        output.no_color |= self.no_color;
        output.always_show_input |= self.always_show_input;
    }

    /// Returns whether any conversion or action was requested.
    pub fn has_work(&self) -> bool {
        !self.conversions.is_empty() || !self.files.is_empty() || self.reset_ini
    }
}

/// The text of one requested conversion.
#[derive(Clone, Debug, PartialEq)]
pub struct Triple {
    pub input_unit: String,
    pub input_value: String,
    pub output_unit: String,
}

/// Groups tokens into conversions.
///
/// Separator tokens are dropped and the rest taken three at a time. A group
/// that starts with a value rather than a unit has its first two tokens
/// swapped. Trailing tokens that do not fill a group are returned as well.
pub fn group<S: AsRef<str>>(tokens: &[S]) -> (Vec<Triple>, Vec<String>) {
    let tokens = tokens.iter()
    .map(|token| token.as_ref())
    .filter(|token| !token.eq_ignore_ascii_case(TOKEN_SEPARATOR))
    .collect::<Vec<&str>>();

    let mut triples = vec![];
    let mut remainder = vec![];

    for chunk in tokens.chunks(3) {
        match *chunk {
            [first, second, output_unit] => {
                let (input_unit, input_value) = if is_magnitude(first) && !is_magnitude(second) {
                    (second, first)
                }
                else {
                    (first, second)
                };

                triples.push(Triple {
                    input_unit: input_unit.to_string(),
                    input_value: input_value.to_string(),
                    output_unit: output_unit.to_string(),
                });
            }
            _ => remainder.extend(chunk.iter().map(|token| token.to_string())),
        }
    }

    (triples, remainder)
}



#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn triple(input_unit: &str, input_value: &str, output_unit: &str) -> Triple {
        Triple {
            input_unit: input_unit.to_string(),
            input_value: input_value.to_string(),
            output_unit: output_unit.to_string(),
        }
    }

    #[rstest]
    #[case(vec![triple("m", "1", "ft")]                        , vec![]         , vec!["m", "1", "ft"])]
    #[case(vec![triple("m", "1", "ft")]                        , vec![]         , vec!["1", "m", "ft"])]
    #[case(vec![triple("m", "1", "ft")]                        , vec![]         , vec!["1", "m", "to", "ft"])]
    #[case(vec![triple("m", "1", "ft")]                        , vec![]         , vec!["1", "m", "TO", "ft"])]
    #[case(vec![triple("mm", "500", "u")]                      , vec![]         , vec!["500", "mm", "u"])]
    #[case(vec![triple("m", "1,000", "km")]                    , vec![]         , vec!["1,000", "m", "to", "km"])]
    #[case(vec![triple("m", "-2", "all")]                      , vec![]         , vec!["-2", "m", "all"])]
    #[case(vec![triple("m", "1", "ft"), triple("u", "5", "m")] , vec![]         , vec!["m", "1", "ft", "5", "u", "m"])]
    #[case(vec![triple("m", "1", "ft")]                        , vec!["u", "5"] , vec!["m", "1", "ft", "u", "5"])]
    #[case(vec![]                                              , vec!["m"]      , vec!["m"])]
    #[case(vec![]                                              , vec![]         , vec![])]
    #[case(vec![triple("1", "2", "m")]                         , vec![]         , vec!["1", "2", "m"])]
    #[trace]
    fn test_group(
        #[case] expected_triples: Vec<Triple>,
        #[case] expected_remainder: Vec<&str>,
        #[case] tokens: Vec<&str>
    ) {
        let (triples, remainder) = group(&tokens);

        assert_eq!(expected_triples, triples);
        assert_eq!(expected_remainder, remainder);
    }

    #[test]
    fn test_parse() {
        let arguments = Arguments::try_parse_from([
            "ckconv", "-p", "3", "--scientific", "-qna", "-f", "a.txt", "--file", "b.txt", "m", "-1", "ft",
        ])
        .unwrap();

        assert_eq!(Some(3), arguments.precision);
        assert!(arguments.scientific);
        assert!(arguments.quiet && arguments.no_color && arguments.always_show_input);
        assert_eq!(vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")], arguments.files);
        assert_eq!(vec!["m", "-1", "ft"], arguments.conversions);
        assert!(arguments.has_work());
    }

    #[rstest]
    #[case(vec!["m", "-1", "ft"])]
    #[case(vec!["m", "-1/2", "ft"])]
    #[case(vec!["m", "-1,000", "ft"])]
    #[case(vec!["m", "-1_000", "ft"])]
    #[case(vec!["m", "-.5", "ft"])]
    #[case(vec!["m", "-1e3", "ft"])]
    #[case(vec!["-1/2", "m", "ft"])]
    #[case(vec!["-.5", "m", "to", "ft"])]
    #[trace]
    fn test_parse_negative(#[case] conversions: Vec<&str>) {
        let arguments = Arguments::try_parse_from(["ckconv", "-n"].into_iter().chain(conversions.clone()))
        .unwrap();

        assert!(arguments.no_color);
        assert_eq!(conversions, arguments.conversions);
    }

    #[rstest]
    #[case(vec!["ckconv", "--standard", "--scientific"])]
    #[case(vec!["ckconv", "-p", "many"])]
    #[case(vec!["ckconv", "-p"])]
    #[trace]
    fn test_parse_rejected(#[case] arguments: Vec<&str>) {
        assert!(Arguments::try_parse_from(arguments).is_err());
    }

    #[test]
    fn test_reset_alias() {
        assert!(Arguments::try_parse_from(["ckconv", "--ini-reset"]).unwrap().reset_ini);
        assert!(Arguments::try_parse_from(["ckconv", "--reset-ini"]).unwrap().reset_ini);
        assert!(!Arguments::try_parse_from(["ckconv"]).unwrap().has_work());
    }

    #[test]
    fn test_apply() {
        let arguments = Arguments::try_parse_from(["ckconv", "-p", "2", "--standard", "-n"]).unwrap();

        let mut output = Output::default();
        arguments.apply(&mut output);

        assert_eq!(2, output.precision);
        assert_eq!(Notation::Fixed, output.notation);
        assert!(output.no_color);
        assert!(!output.quiet);
    }
}
