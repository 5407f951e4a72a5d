use lazy_static::lazy_static;
use log::trace;
use maplit::hashset;
use std::collections::HashSet;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::catalog::Catalog;
use crate::catalog::Entry;
use crate::catalog::Unit;

lazy_static! {
    /// Tokens requesting a conversion to every system.
    static ref TOKENS_ALL: HashSet<&'static str> = hashset!["a", "all", "*"];
}

/// Ways unit text can fail to resolve.
#[derive(Debug, Error, PartialEq)]
pub enum UnitError {
    #[error("No unit specified")]
    Empty,

    #[error("Unrecognized unit: \"{0}\"")]
    Unrecognized(String),

    #[error("Ambiguous unit: \"{0}\"")]
    Ambiguous(String),
}

/// What an output unit argument asks for.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedTarget {
    Unit(Unit),

    /// Convert to the base unit of every other system.
    AllSystems,

    /// Nothing was given.
    None,
}

/// Resolves unit text against a catalog.
pub struct Resolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Resolver<'a> {
        Resolver {catalog}
    }

    /// Resolves text naming a unit.
    ///
    /// The text is NFKC-normalized and trimmed, then tried in order against:
    ///
    ///   1. Symbols, case-sensitively (`Mm` is not `mm`);
    ///   2. Symbols, names and aliases, ignoring ASCII case; and
    ///   3. Abbreviations of names no shorter than the unit allows.
    ///
    /// The first step that matches decides; it is an error for it to match
    /// more than one unit.
    pub fn resolve(&self, text: &str) -> Result<Unit, UnitError> {
        let normalized = text.nfkc().collect::<String>();
        let normalized = normalized.trim();

        if normalized.is_empty() {
            return Err(UnitError::Empty);
        }

        let unit = self.find(text, |entry| {
            entry.symbols.iter().any(|symbol| symbol == normalized)
        })?;

        if let Some(unit) = unit {
            trace!("Resolved {:?} by symbol to {}", text, unit.name);
            return Ok(unit);
        }

        let lowercase = normalized.to_ascii_lowercase();

        let unit = self.find(text, |entry| {
            entry.symbols.iter().any(|symbol| symbol.to_ascii_lowercase() == lowercase)
            || entry.names.contains(&lowercase)
            || entry.aliases.contains(&lowercase)
        })?;

        if let Some(unit) = unit {
            trace!("Resolved {:?} by name to {}", text, unit.name);
            return Ok(unit);
        }

        let length = lowercase.chars().count();

        let unit = self.find(text, |entry| {
            length >= entry.min
            && entry.names.iter().any(|name| name.starts_with(lowercase.as_str()))
        })?;

        if let Some(unit) = unit {
            trace!("Resolved {:?} by abbreviation to {}", text, unit.name);
            return Ok(unit);
        }

        Err(UnitError::Unrecognized(text.to_string()))
    }

    /// Resolves text naming a unit, falling back to a default when the text is
    /// empty or unrecognized.
    #[cfg(test)]
    pub fn resolve_or(&self, text: &str, default: &Unit) -> Result<Unit, UnitError> {
        match self.resolve(text) {
            Err(UnitError::Empty) | Err(UnitError::Unrecognized(_)) => Ok(default.clone()),
            result => result,
        }
    }

    /// Resolves text naming an output unit, which may also request every
    /// system.
    pub fn resolve_target(&self, text: &str) -> Result<ResolvedTarget, UnitError> {
        let normalized = text.nfkc().collect::<String>();
        let normalized = normalized.trim();

        if normalized.is_empty() {
            return Ok(ResolvedTarget::None);
        }

        if TOKENS_ALL.contains(normalized.to_ascii_lowercase().as_str()) {
            return Ok(ResolvedTarget::AllSystems);
        }

        self.resolve(text).map(ResolvedTarget::Unit)
    }

    /// Returns the one unit whose entry satisfies the predicate, if any.
    fn find(&self, text: &str, predicate: impl Fn(&Entry) -> bool)
    -> Result<Option<Unit>, UnitError> {
        let mut matches = self.catalog.entries().iter().filter(|entry| predicate(entry));

        match (matches.next(), matches.next()) {
            (None, _) => Ok(None),
            (Some(entry), None) => Ok(Some(entry.unit.clone())),
            (Some(_), Some(_)) => Err(UnitError::Ambiguous(text.to_string())),
        }
    }
}
