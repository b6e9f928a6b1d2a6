//! Length input parsing.
//!
//! Accepts a number with an optional unit suffix, e.g. `10`, `-2.5 cm`,
//! `3"`, `1,5m`. A bare number is taken in model units.

use thiserror::Error;
use zflat_scene::LengthUnit;

/// Why a length could not be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LengthError {
    #[error("empty length")]
    Empty,
    #[error("'{0}' is not a number")]
    Number(String),
    #[error("unknown unit '{0}'")]
    Unit(String),
}

/// Parse `input` and convert it to `model` units.
pub fn parse_length(input: &str, model: LengthUnit) -> Result<f64, LengthError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(LengthError::Empty);
    }

    let split = input
        .find(|c: char| c.is_alphabetic() || c == '"' || c == '\'')
        .unwrap_or(input.len());
    let (number, suffix) = input.split_at(split);

    let number = number.trim();
    // A lone comma is a decimal separator.
    let normalized = if !number.contains('.') && number.matches(',').count() == 1 {
        number.replace(',', ".")
    } else {
        number.to_string()
    };
    let value: f64 = normalized
        .parse()
        .map_err(|_| LengthError::Number(number.to_string()))?;

    let suffix = suffix.trim();
    let unit = if suffix.is_empty() {
        model
    } else {
        LengthUnit::from_suffix(suffix).ok_or_else(|| LengthError::Unit(suffix.to_string()))?
    };
    Ok(unit.convert(value, model))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_number() {
        assert_eq!(parse_length("10", LengthUnit::Millimeter), Ok(10.0));
        assert_eq!(parse_length(" -2.5 ", LengthUnit::Inch), Ok(-2.5));
    }

    #[test]
    fn test_parse_with_units() {
        let mm = parse_length("2 cm", LengthUnit::Millimeter).unwrap();
        assert!((mm - 20.0).abs() < 1e-12);
        let inches = parse_length("1'", LengthUnit::Inch).unwrap();
        assert!((inches - 12.0).abs() < 1e-12);
        let mm = parse_length("1\"", LengthUnit::Millimeter).unwrap();
        assert!((mm - 25.4).abs() < 1e-12);
        let m = parse_length("1500mm", LengthUnit::Meter).unwrap();
        assert!((m - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_parse_decimal_comma() {
        let mm = parse_length("1,5 cm", LengthUnit::Millimeter).unwrap();
        assert!((mm - 15.0).abs() < 1e-12);
        assert!(matches!(
            parse_length("1,000.5", LengthUnit::Millimeter),
            Err(LengthError::Number(_))
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_length("  ", LengthUnit::Millimeter), Err(LengthError::Empty));
        assert_eq!(
            parse_length("3 yd", LengthUnit::Millimeter),
            Err(LengthError::Unit("yd".to_string()))
        );
        assert_eq!(
            parse_length("mm", LengthUnit::Millimeter),
            Err(LengthError::Number(String::new()))
        );
    }
}
