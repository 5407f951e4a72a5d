mod catalog;
mod number;

use itertools::Itertools;
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Error;

use catalog::Catalog;

const PATH_DATABASE: &str = "src/database";
const FILENAME_DATA_CATALOG: &str = "catalog.bin";

/// Performs tasks necessary for building the converter.
fn main() -> Result<(), Error> {
    let mut path_output = PathBuf::from(env::var("OUT_DIR")?);
    path_output.push(FILENAME_DATA_CATALOG);

    // Track changes in the database directory.
    println!("cargo:rerun-if-changed={}", PATH_DATABASE);

    // Prevent compilation of parsing code in the final binary.
    println!("cargo:rustc-check-cfg=cfg(mainbuild)");
    println!("cargo:rustc-cfg=mainbuild");

    // Specify location of the catalog data.
    println!("cargo:rustc-env=PATH_DATA_CATALOG={}", path_output.display());

    let mut lines = Vec::with_capacity(100);

    // Find and open the database files. These are the files in the database
    // directory that have the .dat extension, in name order so line numbers
    // are stable.
    let paths = fs::read_dir(PATH_DATABASE)?
    .map(|entry| entry.map(|entry| entry.path()))
    .collect::<Result<Vec<PathBuf>, _>>()?
    .into_iter()
    .filter(|path| path.is_file())
    .filter(|path| path.extension() == Some(OsStr::new("dat")))
    .sorted();

    for path in paths {
        let file = File::open(&path)
        .with_context(|| format!("Cannot open {}", path.display()))?;

        for (line, number) in BufReader::new(file).lines().zip(1..) {
            lines.push((line?, format!("{}", path.display()), number));
        }
    }

    let input = lines.iter().map(|(line, _, _)| line).join("\n");

    let catalog = input.parse::<Catalog>().map_err(|error| {
        const DELIMITER: char = ':';

        let message_error_upstream = format!("{}", error);

        // Record errors carry the line number of the joined input; point them
        // back at the file they came from.
        let location = message_error_upstream.split_once(DELIMITER)
        .and_then(|(string_number_line, message_error)| {
            let number_line = string_number_line.parse::<usize>().ok()?;
            let (_, path, number_line) = lines.get(number_line.checked_sub(1)?)?;

            Some(format!("{}:{}:{}", path, number_line, message_error))
        });

        let message = location.unwrap_or(message_error_upstream);

        eprintln!();
        eprintln!("Error parsing database files:");
        eprintln!("{}", message);
        eprintln!();

        anyhow!("Error parsing database files: {}", message)
    })?;

    let data_catalog = bincode::serialize(&catalog)?;

    let mut file_output = File::create(&path_output)?;

    file_output.write_all(&data_catalog)?;

    Ok(())
}
