#[cfg(any(test, not(mainbuild)))] use anyhow::bail;
#[cfg(any(test, not(mainbuild)))] use anyhow::Error;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
#[cfg(any(test, not(mainbuild)))] use std::str::FromStr;

/// A measurement system.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum System {
    /// Meters and their SI prefixes.
    Metric,

    /// Feet, inches and yards.
    Imperial,

    /// The Gamebryo/Creation engine's internal length unit.
    CreationKit,
}

impl System {
    /// Every system, in display order.
    pub const ALL: [System; 3] = [System::Metric, System::Imperial, System::CreationKit];

    /// Returns the position of this system in `System::ALL`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the lowercase name used in database records.
    #[cfg(any(test, not(mainbuild)))]
    pub fn key(self) -> &'static str {
        match self {
            System::Metric => "metric",
            System::Imperial => "imperial",
            System::CreationKit => "creationkit",
        }
    }
}

impl Display for System {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        let name = match self {
            System::Metric => "Metric",
            System::Imperial => "Imperial",
            System::CreationKit => "CreationKit",
        };

        formatter.write_str(name)
    }
}

/// Implements parsing of database system names.
#[cfg(any(test, not(mainbuild)))]
impl FromStr for System {
    type Err = Error;

    fn from_str(string: &str) -> Result<System, Error> {
        for system in System::ALL {
            if system.key() == string {
                return Ok(system);
            }
        }

        bail!("Unknown system: {}", string)
    }
}
