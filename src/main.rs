mod arguments;
mod batch;
mod catalog;
mod config;
mod converter;
mod display;
mod number;
mod resolver;

use anyhow::bail;
use anyhow::Context;
use anyhow::Error;
use clap::CommandFactory;
use clap::Parser;
use log::error;
use log::info;
use log::warn;
use log::LevelFilter;
use std::env;
use std::io;
use std::io::IsTerminal;
use std::process::ExitCode;

use arguments::Arguments;
use arguments::Triple;
use catalog::Catalog;
use config::Config;
use converter::ConversionRequest;
use converter::Converter;
use display::Printer;
use number::parse_magnitude;
use resolver::ResolvedTarget;

fn main() -> ExitCode {
    // Install the logger immediately; its level is set from the config once
    // that is loaded, unless the environment specifies one.
    let _ = env_logger::builder()
    .filter_level(LevelFilter::Trace)
    .parse_default_env()
    .try_init();

    log::set_max_level(LevelFilter::Warn);

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match run(Arguments::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            error!("{:#}", error);
            ExitCode::FAILURE
        }
    }
}

/// Runs the program, returning whether it succeeded.
fn run(arguments: Arguments) -> Result<bool, Error> {
    if !arguments.has_work() {
        Arguments::command().print_help()?;
        return Ok(true);
    }

    let path_config = match &arguments.config {
        Some(path) => path.clone(),
        None => config::default_path()?,
    };

    let mut config = match Config::load_or_default(&path_config) {
        Ok(config) => config,

        // A broken config is what resetting is for.
        Err(error) if arguments.reset_ini => {
            warn!("{:#}", error);
            Config::default()
        }

        Err(error) => return Err(error),
    };

    if env::var_os("RUST_LOG").is_none() {
        log::set_max_level(config.log_level.as_level_filter());
    }
    else {
        log::set_max_level(LevelFilter::Trace);
    }

    arguments.apply(&mut config.output);

    let mut succeeded_actions = true;

    if arguments.reset_ini {
        match config.write(&path_config) {
            Ok(()) => println!("Successfully created/reset config: {}", path_config.display()),
            Err(error) => {
                error!("{:#}", error);
                succeeded_actions = false;
            }
        }
    }

    let catalog = Catalog::builtin()?;
    let converter = Converter::new(catalog, config.conversions);

    for path in arguments.files.iter() {
        match batch::convert_file(&converter, config.output.precision, path) {
            Ok(summary) => info!(
                "Converted {} of {} lines in {}",
                summary.converted,
                summary.lines,
                path.display()
            ),
            Err(error) => {
                error!("{:#}", error);
                succeeded_actions = false;
            }
        }
    }

    let color = !config.output.no_color && io::stdout().is_terminal();
    colored::control::set_override(color);

    let printer = Printer::new(&config.output, color);

    let (triples, remainder) = arguments::group(&arguments.conversions);

    let mut succeeded_conversions = 0;

    for triple in triples.iter() {
        match perform(&converter, &printer, triple) {
            Ok(lines) => {
                succeeded_conversions += 1;

                for line in lines {
                    println!("  {}", line);
                }
            }
            Err(error) => warn!("{:#}", error),
        }
    }

    if !remainder.is_empty() {
        warn!("Ignoring incomplete conversion: {}", remainder.join(" "));
    }

    Ok(succeeded_conversions > 0 || (arguments.conversions.is_empty() && succeeded_actions))
}

/// Performs one conversion, returning the lines to display.
fn perform(converter: &Converter, printer: &Printer, triple: &Triple) -> Result<Vec<String>, Error> {
    let resolver = converter.resolver();

    let context = || format!(
        "Cannot convert {} {} to {}",
        triple.input_value,
        triple.input_unit,
        triple.output_unit
    );

    let input_unit = resolver.resolve(&triple.input_unit).with_context(context)?;
    let input_value = parse_magnitude(&triple.input_value).with_context(context)?;

    match resolver.resolve_target(&triple.output_unit).with_context(context)? {
        ResolvedTarget::Unit(output_unit) => {
            let request = ConversionRequest {input_unit, input_value, output_unit};
            let result = converter.convert(&request).with_context(context)?;

            Ok(vec![printer.conversion(&request, result)])
        }

        ResolvedTarget::AllSystems => {
            let conversions = converter.convert_all(&input_unit, input_value)
            .with_context(context)?;

            Ok(printer.all(&input_unit, input_value, &conversions))
        }

        ResolvedTarget::None => bail!("{}: No output unit specified", context()),
    }
}
