use thiserror::Error;

use crate::catalog::factors::CrossSystemFactors;
use crate::catalog::Catalog;
use crate::catalog::System;
use crate::catalog::Unit;
use crate::resolver::Resolver;

/// Ways a conversion can fail.
#[derive(Debug, Error, PartialEq)]
pub enum ConversionError {
    /// A unit or cross-system factor is zero, negative or not finite.
    #[error("Illegal {0} conversion factor: {1}")]
    IllegalFactor(&'static str, f64),

    #[error("Cannot divide by zero")]
    DivideByZero,

    /// The converted value does not fit in a finite number.
    #[error("Converted value out of range: {0}")]
    OutOfRange(f64),
}

/// Divides, refusing a zero divisor.
pub fn divide(dividend: f64, divisor: f64) -> Result<f64, ConversionError> {
    if divisor == 0.0 {
        return Err(ConversionError::DivideByZero);
    }

    Ok(dividend / divisor)
}

/// Converts a value from one unit to another.
///
/// Units of the same system convert through their shared base unit. Units of
/// different systems convert to the input system's base unit, across to the
/// output system's base unit with the one factor relating the two systems, and
/// then into the output unit.
pub fn convert(input: &Unit, value: f64, output: &Unit, factors: &CrossSystemFactors)
-> Result<f64, ConversionError> {
    if !(input.factor.is_finite() && input.factor > 0.0) {
        return Err(ConversionError::IllegalFactor("input", input.factor));
    }

    if !(output.factor.is_finite() && output.factor > 0.0) {
        return Err(ConversionError::IllegalFactor("output", output.factor));
    }

    if value == 0.0 {
        return Ok(0.0);
    }

    let result = if input.system == output.system {
        // Identical units.
        if input.factor == output.factor {
            value
        }
        else {
            divide(value * input.factor, output.factor)?
        }
    }
    else {
        let value_base = factors.convert_base(input.system, value * input.factor, output.system)?;

        divide(value_base, output.factor)?
    };

    if !result.is_finite() {
        return Err(ConversionError::OutOfRange(value));
    }

    Ok(result)
}

/// A single requested conversion.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversionRequest {
    pub input_unit: Unit,
    pub input_value: f64,
    pub output_unit: Unit,
}

impl ConversionRequest {
    /// Performs this conversion.
    pub fn execute(&self, factors: &CrossSystemFactors) -> Result<f64, ConversionError> {
        convert(&self.input_unit, self.input_value, &self.output_unit, factors)
    }
}

/// A result of converting to all systems.
#[derive(Clone, Debug, PartialEq)]
pub struct Conversion {
    /// The base unit the value was converted to.
    pub unit: Unit,
    pub value: f64,

    /// The value in successively smaller units, while it stays below one.
    pub cascade: Vec<(Unit, f64)>,
}

/// A unit converter.
///
/// This structure pairs a unit catalog with the cross-system factors in effect
/// for the program's lifetime.
pub struct Converter {
    catalog: Catalog,
    factors: CrossSystemFactors,
}

impl Converter {
    pub fn new(catalog: Catalog, factors: CrossSystemFactors) -> Converter {
        Converter {catalog, factors}
    }

    /// Returns a resolver over this converter's catalog.
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.catalog)
    }

    /// Performs a conversion.
    pub fn convert(&self, request: &ConversionRequest) -> Result<f64, ConversionError> {
        request.execute(&self.factors)
    }

    /// Converts a value to the base unit of every other system.
    pub fn convert_all(&self, input: &Unit, value: f64)
    -> Result<Vec<Conversion>, ConversionError> {
        System::ALL.iter()
        .filter(|system| **system != input.system)
        .map(|system| {
            let unit = self.catalog.base(*system);
            let value = convert(input, value, unit, &self.factors)?;
            let cascade = self.cascade(unit, value)?;

            Ok(Conversion {unit: unit.clone(), value, cascade})
        })
        .collect()
    }

    /// Converts a value into successively smaller units of its system.
    ///
    /// Conversion continues while the magnitude is below one, following the
    /// system's cascade and stopping after its smallest unit. Zero has no
    /// cascade.
    pub fn cascade(&self, unit: &Unit, value: f64)
    -> Result<Vec<(Unit, f64)>, ConversionError> {
        let mut steps = vec![];

        if value == 0.0 {
            return Ok(steps);
        }

        let mut unit_current = unit;
        let mut value_current = value;

        for unit_next in self.catalog.cascade(unit.system)
        .filter(|unit_next| unit_next.factor < unit.factor) {
            if value_current.abs() >= 1.0 {
                break;
            }

            value_current = convert(unit_current, value_current, unit_next, &self.factors)?;
            unit_current = unit_next;

            steps.push((unit_next.clone(), value_current));
        }

        Ok(steps)
    }
}
