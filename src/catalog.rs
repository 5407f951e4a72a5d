#[cfg(mainbuild)] pub mod factors;
mod system;

#[cfg(mainbuild)] use anyhow::Context;
use anyhow::Error;
use serde::Deserialize;
use serde::Serialize;
#[cfg(any(test, not(mainbuild)))] use std::str::FromStr;

pub use crate::catalog::system::System;

/// The serialized catalog produced by the build script.
#[cfg(mainbuild)]
static DATA_CATALOG: &[u8] = include_bytes!(env!("PATH_DATA_CATALOG"));

/// A measurement unit.
///
/// `factor` is the number of base units of `system` that one of this unit
/// equals: a centimeter has factor `0.01`, a yard has factor `3`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Unit {
    pub system: System,
    pub factor: f64,

    /// The canonical display symbol.
    pub symbol: String,

    /// The canonical display name.
    pub name: String,
}

impl Unit {
    /// Creates a unit whose name is its symbol.
    #[cfg(test)]
    pub fn new(system: System, factor: f64, symbol: impl Into<String>) -> Unit {
        let symbol = symbol.into();

        Unit {system, factor, name: symbol.clone(), symbol}
    }

    /// Returns whether this unit is the base unit of its system.
    #[cfg(test)]
    pub fn is_base(&self) -> bool {
        self.factor == 1.0
    }
}

/// A unit in a catalog together with the ways it can be written.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Entry {
    pub(crate) unit: Unit,

    /// Case-sensitive symbols, canonical first.
    pub(crate) symbols: Vec<String>,

    /// Lowercase full names, canonical first.
    pub(crate) names: Vec<String>,

    /// Lowercase exact-match aliases.
    pub(crate) aliases: Vec<String>,

    /// The shortest abbreviation of a name that is accepted.
    pub(crate) min: usize,
}

/// A unit catalog.
///
/// This structure holds every unit the converter knows, organized by system.
/// Catalogs are parsed from the unit database by the build script and embedded
/// in the binary; they are never modified afterwards. Every catalog has exactly
/// one base unit per system.
#[derive(Debug, Deserialize, Serialize)]
pub struct Catalog {
    entries: Vec<Entry>,

    /// The entry index of each system's base unit, indexed by system.
    bases: [usize; 3],

    /// The small-unit cascade of each system, indexed by system.
    cascades: [Vec<usize>; 3],
}

#[cfg(mainbuild)]
impl Catalog {
    /// Returns the catalog built from the unit database.
    pub fn builtin() -> Result<Catalog, Error> {
        bincode::deserialize(DATA_CATALOG).context("Corrupt unit catalog")
    }

    /// Returns the base unit of a system.
    pub fn base(&self, system: System) -> &Unit {
        &self.entries[self.bases[system.index()]].unit
    }

    /// Returns every unit in this catalog.
    #[cfg(test)]
    pub fn units(&self) -> impl Iterator<Item = &Unit> + Clone {
        self.entries.iter().map(|entry| &entry.unit)
    }

    /// Returns the units of a system.
    #[cfg(test)]
    pub fn units_of(&self, system: System) -> impl Iterator<Item = &Unit> {
        self.units().filter(move |unit| unit.system == system)
    }

    /// Returns the small-unit cascade of a system, largest unit first.
    pub fn cascade(&self, system: System) -> impl Iterator<Item = &Unit> {
        self.cascades[system.index()].iter().map(|index| &self.entries[*index].unit)
    }

    /// Returns the unit with exactly this symbol.
    #[cfg(test)]
    pub fn find(&self, symbol: &str) -> Option<&Unit> {
        self.entries.iter()
        .find(|entry| entry.symbols.iter().any(|candidate| candidate == symbol))
        .map(|entry| &entry.unit)
    }

    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

/// Implements parsing of unit database files.
///
/// This is not available at runtime. It is meant to only be run during
/// compilation; therefore, it is not compiled into the main binary. Errors
/// concerning a specific record are prefixed with its line number and a colon.
#[cfg(any(test, not(mainbuild)))]
impl FromStr for Catalog {
    type Err = Error;

    fn from_str(input: &str) -> Result<Catalog, Error> {
        use anyhow::anyhow;
        use anyhow::bail;
        use anyhow::ensure;
        use lazy_static::lazy_static;
        use regex::Regex;
        use std::collections::HashMap;
        use unicode_normalization::UnicodeNormalization;

        use crate::number::parse_magnitude;

        const DELIMITER_COMMENT: char = '#';
        const DELIMITER_RECORD: char = '|';

        lazy_static! {
            static ref REGEX_SYMBOL: Regex = Regex::new(r"^[^\s|#]+$").unwrap();
            static ref REGEX_NAME: Regex = Regex::new(r"^[a-z]+$").unwrap();
            static ref REGEX_ALIAS: Regex = Regex::new(r#"^[a-z'"]+$"#).unwrap();
        }

        let mut records_bases = vec![];
        let mut records_prefixes = vec![];
        let mut records_units = vec![];
        let mut records_aliases = vec![];
        let mut records_cascades = vec![];

        for (line, number) in input.lines().zip(1..) {
            let mut line = line;

            // Strip comments.
            if let Some((record, _)) = line.split_once(DELIMITER_COMMENT) {
                line = record;
            }

            // Strip whitespace.
            line = line.trim();

            // Skip empty lines.
            if line.is_empty() {
                continue;
            }

            // Split line into strings and strip whitespace some more.
            let mut record = line.split(DELIMITER_RECORD).map(|string_record| {
                string_record.trim().to_string()
            });

            let type_record = record.next().unwrap_or_default();
            let record = record.collect::<Vec<String>>();

            // Sort the record.
            let records = match type_record.as_str() {
                "B" => &mut records_bases,
                "P" => &mut records_prefixes,
                "U" => &mut records_units,
                "A" => &mut records_aliases,
                "C" => &mut records_cascades,

                _ => bail!("{}: Unknown record type", number),
            };

            records.push((record, number));
        }

        /// Processes records with a record processor.
        fn process_records(
            records: Vec<(Vec<String>, usize)>,
            mut processor: impl FnMut(Vec<String>) -> Result<(), Error>)
        -> Result<(), Error> {
            for (record, number) in records {
                processor(record).map_err(|error| {
                    anyhow!("{}: {}", number, error)
                })?
            }

            Ok(())
        }

        /// Converts the given record into an array for unboxing.
        fn into_array<const N: usize>(record: Vec<String>)
        -> Result<[String; N], Error> {
            match record.try_into() {
                Ok(record) => Ok(record),
                Err(_) => bail!("Illegal argument count")
            }
        }

        /// Splits a field into its normalized, deduplicated list items.
        fn into_list(field: &str) -> Vec<String> {
            let mut items: Vec<String> = vec![];

            for item in field.split_whitespace() {
                let item = item.nfkc().collect::<String>();

                if !items.contains(&item) {
                    items.push(item);
                }
            }

            items
        }

        /// Parses and validates a list of symbols.
        fn symbols(field: &str) -> Result<Vec<String>, Error> {
            let symbols = into_list(field);

            ensure!(!symbols.is_empty(), "No symbols");

            for symbol in symbols.iter() {
                ensure!(REGEX_SYMBOL.is_match(symbol) && parse_magnitude(symbol).is_err(), "Illegal symbol: {}", symbol);
            }

            Ok(symbols)
        }

        /// Parses and validates a list of names.
        fn names(field: &str) -> Result<Vec<String>, Error> {
            let names = into_list(field);

            ensure!(!names.is_empty(), "No names");

            for name in names.iter() {
                ensure!(REGEX_NAME.is_match(name), "Illegal name: {}", name);
            }

            Ok(names)
        }

        /// Parses a strictly positive factor.
        fn factor(field: &str) -> Result<f64, Error> {
            let factor = parse_magnitude(field)?;

            ensure!(factor > 0.0, "Illegal conversion factor");

            Ok(factor)
        }

        /// Parses the minimum abbreviation length.
        fn min(field: &str) -> Result<usize, Error> {
            let min = field.parse::<usize>().map_err(|_| anyhow!("Illegal abbreviation length"))?;

            ensure!(min > 0, "Illegal abbreviation length");

            Ok(min)
        }

        /// Adds an entry to the catalog being built.
        fn insert(
            entries: &mut Vec<Entry>,
            symbols: &mut HashMap<String, usize>,
            entry: Entry)
        -> Result<usize, Error> {
            let index = entries.len();

            for symbol in entry.symbols.iter() {
                if symbols.insert(symbol.clone(), index).is_some() {
                    bail!("Duplicate symbol: {}", symbol);
                }
            }

            for name in entry.names.iter() {
                if entries.iter().any(|present| present.names.contains(name)) {
                    bail!("Duplicate name: {}", name);
                }
            }

            entries.push(entry);

            Ok(index)
        }

        let mut entries = vec![];
        let mut symbols_all = HashMap::new();
        let mut bases: [Option<usize>; 3] = [None; 3];
        let mut cascades: [Option<Vec<usize>>; 3] = Default::default();

        // Process base units (B-records).
        process_records(records_bases, |record| {
            let [string_system, string_symbols, string_names, string_min] = into_array(record)?;

            let system = string_system.parse::<System>()?;

            ensure!(bases[system.index()].is_none(), "Duplicate base unit for system {}", system);

            let symbols = symbols(&string_symbols)?;
            let names = names(&string_names)?;

            let entry = Entry {
                unit: Unit {system, factor: 1.0, symbol: symbols[0].clone(), name: names[0].clone()},
                symbols,
                names,
                aliases: vec![],
                min: min(&string_min)?,
            };

            bases[system.index()] = Some(insert(&mut entries, &mut symbols_all, entry)?);

            Ok(())
        })?;

        let mut bases_checked = [0; 3];

        for system in System::ALL {
            match bases[system.index()] {
                Some(index) => bases_checked[system.index()] = index,
                None => bail!("Missing base unit for system {}", system),
            }
        }

        // Process prefixes for base units (P-records).
        process_records(records_prefixes, |record| {
            let [string_system, string_prefixes, prefix_name, string_magnitude] = into_array(record)?;

            let system = string_system.parse::<System>()?;

            let prefixes = into_list(&string_prefixes);
            ensure!(!prefixes.is_empty(), "No prefix symbols");
            ensure!(REGEX_NAME.is_match(&prefix_name), "Illegal prefix name");

            let magnitude = factor(&string_magnitude)?;
            ensure!(magnitude != 1.0, "Illegal prefix magnitude");

            let base = entries[bases_checked[system.index()]].clone();

            // Generate the prefixed unit.
            let mut symbols = vec![];
            for prefix in prefixes.iter() {
                for symbol in base.symbols.iter() {
                    symbols.push(format!("{}{}", prefix, symbol));
                }
            }

            let names = base.names.iter()
            .map(|name| format!("{}{}", prefix_name, name))
            .collect::<Vec<String>>();

            let entry = Entry {
                unit: Unit {system, factor: magnitude, symbol: symbols[0].clone(), name: names[0].clone()},
                symbols,
                names,
                aliases: vec![],
                min: prefix_name.chars().count() + base.min,
            };

            insert(&mut entries, &mut symbols_all, entry)?;

            Ok(())
        })?;

        // Process named units (U-records).
        process_records(records_units, |record| {
            let [string_system, string_symbols, string_names, string_min, string_factor] = into_array(record)?;

            let system = string_system.parse::<System>()?;

            let factor = factor(&string_factor)?;
            ensure!(factor != 1.0, "Only base units may have a conversion factor of 1");

            let symbols = symbols(&string_symbols)?;
            let names = names(&string_names)?;

            let entry = Entry {
                unit: Unit {system, factor, symbol: symbols[0].clone(), name: names[0].clone()},
                symbols,
                names,
                aliases: vec![],
                min: min(&string_min)?,
            };

            insert(&mut entries, &mut symbols_all, entry)?;

            Ok(())
        })?;

        // Process aliases (A-records).
        process_records(records_aliases, |record| {
            let [alias, symbol] = into_array(record)?;

            let alias = alias.nfkc().collect::<String>();
            let symbol = symbol.nfkc().collect::<String>();

            ensure!(REGEX_ALIAS.is_match(&alias), "Illegal alias: {}", alias);

            let index = *symbols_all.get(&symbol).ok_or_else(||
                anyhow!("Unknown symbol: {}", symbol)
            )?;

            if entries.iter().any(|entry| entry.aliases.contains(&alias) || entry.names.contains(&alias)) {
                bail!("Duplicate alias: {}", alias);
            }

            entries[index].aliases.push(alias);

            Ok(())
        })?;

        // Process small-unit cascades (C-records).
        process_records(records_cascades, |record| {
            let [string_system, string_symbols] = into_array(record)?;

            let system = string_system.parse::<System>()?;

            ensure!(cascades[system.index()].is_none(), "Duplicate cascade for system {}", system);

            let mut cascade = vec![];
            let mut factor_previous = 1.0;

            for symbol in into_list(&string_symbols) {
                let index = *symbols_all.get(&symbol).ok_or_else(||
                    anyhow!("Unknown symbol: {}", symbol)
                )?;

                let unit = &entries[index].unit;

                ensure!(unit.system == system, "Cascade unit {} is not in system {}", symbol, system);
                ensure!(unit.factor < factor_previous, "Cascade units must be strictly decreasing");

                factor_previous = unit.factor;
                cascade.push(index);
            }

            cascades[system.index()] = Some(cascade);

            Ok(())
        })?;

        Ok(Catalog {
            entries,
            bases: bases_checked,
            cascades: cascades.map(Option::unwrap_or_default),
        })
    }
}
