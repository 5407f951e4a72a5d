use colored::Colorize;

use crate::catalog::Unit;
use crate::config::Notation;
use crate::config::Output;
use crate::converter::Conversion;
use crate::converter::ConversionRequest;

/// Formats conversions for the terminal.
#[derive(Clone, Debug)]
pub struct Printer {
    precision: usize,
    notation: Notation,
    quiet: bool,
    always_show_input: bool,
    color: bool,
}

impl Printer {
    pub fn new(output: &Output, color: bool) -> Printer {
        Printer {
            precision: output.precision,
            notation: output.notation,
            quiet: output.quiet,
            always_show_input: output.always_show_input,
            color,
        }
    }

    /// Returns a printer for plain text in fixed notation.
    pub fn plain(precision: usize) -> Printer {
        Printer {
            precision,
            notation: Notation::Fixed,
            quiet: false,
            always_show_input: false,
            color: false,
        }
    }

    /// Formats a value in this printer's notation.
    pub fn format_value(&self, value: f64) -> String {
        match self.notation {
            Notation::Auto => format_general(value, self.precision),
            Notation::Fixed => format!("{:.*}", self.precision, value),
            Notation::Scientific => format_scientific(value, self.precision),
        }
    }

    /// Formats a value followed by its unit symbol.
    pub fn quantity(&self, value: f64, unit: &Unit) -> String {
        self.quantity_painted(value, unit, false)
    }

    /// Formats the result of a single conversion.
    pub fn conversion(&self, request: &ConversionRequest, result: f64) -> String {
        let output = self.quantity(result, &request.output_unit);

        if self.quiet {
            return output;
        }

        format!(
            "{} {} {}",
            self.quantity(request.input_value, &request.input_unit),
            self.paint_equals(),
            output
        )
    }

    /// Formats the results of a conversion to all systems, one line each.
    pub fn all(&self, input: &Unit, value: f64, conversions: &[Conversion]) -> Vec<String> {
        let prefix = format!("{} {} ", self.quantity(value, input), self.paint_equals());

        // The prefix is padded by its visible width, without escape sequences.
        let width = format!("{} {} = ", self.format_value(value), input.symbol).chars().count();
        let padding = " ".repeat(width);

        conversions.iter().enumerate().map(|(index, conversion)| {
            let mut line = String::new();

            if !self.quiet {
                if index == 0 || self.always_show_input {
                    line.push_str(&prefix);
                }
                else {
                    line.push_str(&padding);
                }
            }

            line.push_str(&self.quantity_painted(conversion.value, &conversion.unit, true));

            for (unit, value) in conversion.cascade.iter() {
                line.push_str(&format!("  ( {} )", self.quantity_painted(*value, unit, true)));
            }

            line
        })
        .collect()
    }

    fn quantity_painted(&self, value: f64, unit: &Unit, all: bool) -> String {
        let value = self.format_value(value);

        if !self.color {
            return format!("{} {}", value, unit.symbol);
        }

        let value = if all { value.yellow() } else { value.green() };

        format!("{} {}", value, unit.symbol.bold().white())
    }

    fn paint_equals(&self) -> String {
        if self.color {
            "=".white().to_string()
        }
        else {
            "=".to_string()
        }
    }
}

/// Formats a value with some significant digits, in fixed or scientific
/// notation, whichever suits its exponent. Trailing zeros are removed.
fn format_general(value: f64, precision: usize) -> String {
    let precision = precision.max(1);

    if value == 0.0 {
        return "0".to_string();
    }

    if !value.is_finite() {
        return format!("{}", value);
    }

    // Rounding to the requested digits can carry into the exponent, so the
    // exponent is read back from the rounded text.
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return scientific,
    };
    let exponent = exponent.parse::<i32>().unwrap_or_default();

    if exponent < -4 || exponent >= precision as i32 {
        return format!("{}{}", trim_zeros(mantissa), format_exponent(exponent));
    }

    let decimals = (precision as i32 - 1 - exponent).max(0) as usize;

    trim_zeros(&format!("{:.*}", decimals, value)).to_string()
}

/// Formats a value in scientific notation with a signed, two-digit exponent.
fn format_scientific(value: f64, precision: usize) -> String {
    let scientific = format!("{:.*e}", precision, value);

    match scientific.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent = exponent.parse::<i32>().unwrap_or_default();

            format!("{}{}", mantissa, format_exponent(exponent))
        }
        None => scientific,
    }
}

fn format_exponent(exponent: i32) -> String {
    let sign = if exponent < 0 { '-' } else { '+' };

    format!("e{}{:02}", sign, exponent.abs())
}

/// Removes trailing fractional zeros, and the point if nothing follows it.
fn trim_zeros(string: &str) -> &str {
    if !string.contains('.') {
        return string;
    }

    string.trim_end_matches('0').trim_end_matches('.')
}



#[cfg(test)]
mod tests {
    use super::*;

    use lazy_static::lazy_static;
    use rstest::rstest;

    use crate::catalog::factors::CrossSystemFactors;
    use crate::catalog::Catalog;
    use crate::converter::Converter;

    lazy_static! {
        static ref CATALOG: Catalog = Catalog::builtin().unwrap();
    }

    fn unit(symbol: &str) -> Unit {
        CATALOG.find(symbol).unwrap().clone()
    }

    fn printer(output: Output) -> Printer {
        Printer::new(&output, false)
    }

    #[rstest]
    #[case("3.28084"     , 1.0 / 0.3048       , 6)]
    #[case("0.0142875"   , 0.0142875313       , 6)]
    #[case("69.9911"     , 1.0 / 0.0142875313 , 6)]
    #[case("34.9955"     , 0.5 / 0.0142875313 , 6)]
    #[case("21.3333"     , 1.0 / 0.046875     , 6)]
    #[case("1"           , 1.0                , 6)]
    #[case("1000"        , 1000.0             , 6)]
    #[case("-0.3048"     , -0.3048            , 6)]
    #[case("0"           , 0.0                , 6)]
    #[case("1e-07"       , 1e-7               , 6)]
    #[case("0.0001"      , 1e-4               , 6)]
    #[case("1.23457e+06" , 1234567.0          , 6)]
    #[case("123457"      , 123456.7           , 6)]
    #[case("1e+06"       , 999999.7           , 6)]
    #[case("3.3"         , 3.28084            , 2)]
    #[case("3"           , 3.28084            , 1)]
    #[case("3"           , 3.28084            , 0)]
    #[trace]
    fn test_format_general(#[case] expected: &str, #[case] value: f64, #[case] precision: usize) {
        assert_eq!(expected, format_general(value, precision));
    }

    #[rstest]
    #[case("3.280840"    , Notation::Fixed      , 6 , 1.0 / 0.3048)]
    #[case("3.28"        , Notation::Fixed      , 2 , 1.0 / 0.3048)]
    #[case("3"           , Notation::Fixed      , 0 , 3.28084)]
    #[case("3.281e+00"   , Notation::Scientific , 3 , 1.0 / 0.3048)]
    #[case("1.500e-07"   , Notation::Scientific , 3 , 1.5e-7)]
    #[case("-1.2e+03"    , Notation::Scientific , 1 , -1234.0)]
    #[case("34.9955"     , Notation::Auto       , 6 , 0.5 / 0.0142875313)]
    #[trace]
    fn test_format_value(
        #[case] expected: &str,
        #[case] notation: Notation,
        #[case] precision: usize,
        #[case] value: f64
    ) {
        let printer = printer(Output {precision, notation, ..Output::default()});

        assert_eq!(expected, printer.format_value(value));
    }

    #[test]
    fn test_conversion() {
        let request = ConversionRequest {
            input_unit: unit("m"),
            input_value: 1.0,
            output_unit: unit("'"),
        };

        let result = 1.0 / 0.3048;

        assert_eq!("1 m = 3.28084 '", printer(Output::default()).conversion(&request, result));
        assert_eq!("3.28084 '", printer(Output {quiet: true, ..Output::default()}).conversion(&request, result));
    }

    fn conversions() -> Vec<Conversion> {
        let converter = Converter::new(Catalog::builtin().unwrap(), CrossSystemFactors::default());

        converter.convert_all(&unit("u"), 1.0).unwrap()
    }

    #[test]
    fn test_all() {
        let lines = printer(Output::default()).all(&unit("u"), 1.0, &conversions());

        assert_eq!(
            vec![
                "1 u = 0.0142875 m  ( 1.42875 cm )",
                "      0.046875 '  ( 0.5625 \" )",
            ],
            lines
        );
    }

    #[test]
    fn test_all_always_show_input() {
        let printer = printer(Output {always_show_input: true, ..Output::default()});

        let lines = printer.all(&unit("u"), 1.0, &conversions());

        assert_eq!("1 u = 0.0142875 m  ( 1.42875 cm )", lines[0]);
        assert_eq!("1 u = 0.046875 '  ( 0.5625 \" )", lines[1]);
    }

    #[test]
    fn test_all_quiet() {
        let printer = printer(Output {quiet: true, ..Output::default()});

        let lines = printer.all(&unit("u"), 1.0, &conversions());

        assert_eq!("0.0142875 m  ( 1.42875 cm )", lines[0]);
        assert_eq!("0.046875 '  ( 0.5625 \" )", lines[1]);
    }

    #[test]
    fn test_plain() {
        let printer = Printer::plain(4);

        assert_eq!("1.0000 m", printer.quantity(1.0, &unit("m")));
    }
}
