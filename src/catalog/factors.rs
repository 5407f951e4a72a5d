use serde::Deserialize;
use serde::Serialize;
use static_assertions::const_assert;

use crate::catalog::System;
use crate::converter::divide;
use crate::converter::ConversionError;

/// One foot in meters (International Foot, 1959).
///
/// Earlier generations of the tool used the U.S. Survey Foot,
/// `0.3048006096012191857`; both are accepted through configuration.
pub const DEFAULT_FOOT_IN_METERS: f64 = 0.3048;

/// One engine unit in meters.
///
/// The tool's history carries three values for this constant:
/// `0.01428222656`, `0.01428753125` and `0.0142875313`. The most recent one is
/// the default.
pub const DEFAULT_UNIT_IN_METERS: f64 = 0.0142875313;

/// One engine unit in feet (64 units to the yard).
pub const DEFAULT_UNIT_IN_FEET: f64 = 0.046875;

const_assert!(DEFAULT_FOOT_IN_METERS > 0.0);
const_assert!(DEFAULT_UNIT_IN_METERS > 0.0);
const_assert!(DEFAULT_UNIT_IN_FEET > 0.0);

/// The three empirical constants relating the base units of different systems.
///
/// Each pair of systems is related by exactly one of these factors. They are
/// not required to be mutually consistent: `unit_in_meters` is not exactly
/// `unit_in_feet * foot_in_meters`, and conversions between two systems always
/// use the factor for that pair.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct CrossSystemFactors {
    /// Meters in one foot.
    #[serde(alias = "imperial_to_metric")]
    pub foot_in_meters: f64,

    /// Meters in one engine unit.
    #[serde(alias = "metric_to_unit")]
    pub unit_in_meters: f64,

    /// Feet in one engine unit.
    #[serde(alias = "imperial_to_unit")]
    pub unit_in_feet: f64,
}

impl CrossSystemFactors {
    /// Ensures every factor is finite and strictly positive.
    pub fn validate(&self) -> Result<(), ConversionError> {
        let named = [
            ("foot_in_meters", self.foot_in_meters),
            ("unit_in_meters", self.unit_in_meters),
            ("unit_in_feet", self.unit_in_feet),
        ];

        for (name, factor) in named {
            if !(factor.is_finite() && factor > 0.0) {
                return Err(ConversionError::IllegalFactor(name, factor));
            }
        }

        Ok(())
    }

    /// Converts a value in one system's base unit to another system's base
    /// unit.
    pub fn convert_base(&self, from: System, value: f64, to: System)
    -> Result<f64, ConversionError> {
        use System::*;

        self.validate()?;

        match (from, to) {
            _ if from == to => Ok(value),

            (Metric, Imperial) => divide(value, self.foot_in_meters),
            (Imperial, Metric) => Ok(value * self.foot_in_meters),

            (Metric, CreationKit) => divide(value, self.unit_in_meters),
            (CreationKit, Metric) => Ok(value * self.unit_in_meters),

            (Imperial, CreationKit) => divide(value, self.unit_in_feet),
            (CreationKit, Imperial) => Ok(value * self.unit_in_feet),

            // Any pair without its own factor goes through meters.
            _ => divide(value * self.meters_per_base(from), self.meters_per_base(to)),
        }
    }

    /// Returns the meters in one base unit of the given system.
    fn meters_per_base(&self, system: System) -> f64 {
        match system {
            System::Metric => 1.0,
            System::Imperial => self.foot_in_meters,
            System::CreationKit => self.unit_in_meters,
        }
    }
}

impl Default for CrossSystemFactors {
    fn default() -> CrossSystemFactors {
        CrossSystemFactors {
            foot_in_meters: DEFAULT_FOOT_IN_METERS,
            unit_in_meters: DEFAULT_UNIT_IN_METERS,
            unit_in_feet: DEFAULT_UNIT_IN_FEET,
        }
    }
}



#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(1.0 / 0.3048     , System::Metric      , System::Imperial)]
    #[case(0.3048           , System::Imperial    , System::Metric)]
    #[case(1.0 / 0.0142875313 , System::Metric    , System::CreationKit)]
    #[case(0.0142875313     , System::CreationKit , System::Metric)]
    #[case(1.0 / 0.046875   , System::Imperial    , System::CreationKit)]
    #[case(0.046875         , System::CreationKit , System::Imperial)]
    #[case(1.0              , System::Imperial    , System::Imperial)]
    #[trace]
    fn test_convert_base(#[case] expected: f64, #[case] from: System, #[case] to: System) {
        let factors = CrossSystemFactors::default();

        assert_eq!(expected, factors.convert_base(from, 1.0, to).unwrap());
    }

    #[rstest]
    #[case(0.0     , 0.01 , 0.05)]
    #[case(-0.3048 , 0.01 , 0.05)]
    #[case(0.3048  , f64::NAN , 0.05)]
    #[case(0.3048  , 0.01 , f64::INFINITY)]
    #[trace]
    fn test_illegal(#[case] foot: f64, #[case] unit_meters: f64, #[case] unit_feet: f64) {
        assert!(matches!(
            CrossSystemFactors {foot_in_meters: foot, unit_in_meters: unit_meters, unit_in_feet: unit_feet}
            .validate(),
            Err(ConversionError::IllegalFactor(_, _))
        ));
    }

    #[test]
    fn test_illegal_fails_conversion() {
        let factors = CrossSystemFactors {unit_in_feet: 0.0, ..CrossSystemFactors::default()};

        assert_eq!(
            Err(ConversionError::IllegalFactor("unit_in_feet", 0.0)),
            factors.convert_base(System::Imperial, 1.0, System::CreationKit)
        );
    }

    #[test]
    fn test_survey_foot() {
        let factors = CrossSystemFactors {
            foot_in_meters: 0.3048006096012191857,
            unit_in_meters: 0.01428753125,
            unit_in_feet: 0.046875,
        };

        let meters = factors.convert_base(System::Imperial, 1_000_000.0, System::Metric).unwrap();

        assert!((meters - 304800.6096012192).abs() < 1e-6);
    }
}
