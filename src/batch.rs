use anyhow::bail;
use anyhow::Context;
use anyhow::Error;
use log::debug;
use log::warn;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::arguments::group;
use crate::converter::ConversionRequest;
use crate::converter::Converter;
use crate::display::Printer;
use crate::number::parse_magnitude;
use crate::resolver::ResolvedTarget;

/// The suffix added to the stem of converted files.
const SUFFIX_OUTPUT: &str = "-converted";

/// Inputs narrower than this get a second tab before the `=`.
const WIDTH_INPUT: usize = 12;

/// The outcome of converting a file.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Summary {
    pub lines: usize,
    pub converted: usize,
}

/// Returns the path a file's conversions are written to.
pub fn output_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
    .unwrap_or_default();

    let name = match path.extension() {
        Some(extension) => format!("{}{}.{}", stem, SUFFIX_OUTPUT, extension.to_string_lossy()),
        None => format!("{}{}", stem, SUFFIX_OUTPUT),
    };

    path.with_file_name(name)
}

/// Converts one line of a batch file.
///
/// The line must hold exactly one conversion.
pub fn convert_line(converter: &Converter, printer: &Printer, line: &str) -> Result<String, Error> {
    let line = line.replace('\r', "").replace('\t', " ");
    let tokens = line.split_whitespace().collect::<Vec<&str>>();

    let (triples, remainder) = group(&tokens);

    let triple = match (triples.as_slice(), remainder.is_empty()) {
        ([triple], true) => triple,
        _ => bail!("Not a single conversion: {:?}", line.trim()),
    };

    let resolver = converter.resolver();

    let input_unit = resolver.resolve(&triple.input_unit)?;
    let input_value = parse_magnitude(&triple.input_value)?;

    let mut input = printer.quantity(input_value, &input_unit);

    if input.chars().count() < WIDTH_INPUT {
        input.push('\t');
    }

    let outputs = match resolver.resolve_target(&triple.output_unit)? {
        ResolvedTarget::Unit(output_unit) => {
            let request = ConversionRequest {input_unit, input_value, output_unit};
            let result = converter.convert(&request)?;

            vec![printer.quantity(result, &request.output_unit)]
        }

        ResolvedTarget::AllSystems => {
            converter.convert_all(&input_unit, input_value)?
            .iter()
            .map(|conversion| printer.quantity(conversion.value, &conversion.unit))
            .collect()
        }

        ResolvedTarget::None => bail!("No output unit specified"),
    };

    Ok(format!("{}\t=  {}", input, outputs.join("\t=  ")))
}

/// Converts the lines of a batch file, keeping blank lines in place of the
/// lines that did not convert.
///
/// `name` identifies the text in log messages.
pub fn convert_text(converter: &Converter, printer: &Printer, name: &str, text: &str)
-> (String, Summary) {
    let mut summary = Summary::default();
    let mut output = String::with_capacity(text.len() * 2);

    for (line, number) in text.lines().zip(1..) {
        summary.lines += 1;

        if line.trim().is_empty() {
            output.push('\n');
            continue;
        }

        match convert_line(converter, printer, line) {
            Ok(converted) => {
                summary.converted += 1;
                output.push_str(&converted);
            }
            Err(error) => warn!("{}:{}: {:#}", name, number, error),
        }

        output.push('\n');
    }

    (output, summary)
}

/// Converts a batch file, writing the results beside it.
pub fn convert_file(converter: &Converter, precision: usize, path: &Path) -> Result<Summary, Error> {
    let text = fs::read_to_string(path)
    .with_context(|| format!("Cannot read batch file: {}", path.display()))?;

    let name = path.display().to_string();
    let (output, summary) = convert_text(converter, &Printer::plain(precision), &name, &text);

    let path_output = output_path(path);

    fs::write(&path_output, output)
    .with_context(|| format!("Cannot write converted file: {}", path_output.display()))?;

    debug!("Wrote {}", path_output.display());

    Ok(summary)
}
