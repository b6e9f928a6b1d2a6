//! Model length units.

use serde::{Deserialize, Serialize};

/// The length unit a scene's coordinates are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Millimetres.
    #[default]
    Millimeter,
    /// Centimetres.
    Centimeter,
    /// Metres.
    Meter,
    /// Inches.
    Inch,
    /// Feet.
    Foot,
}

impl LengthUnit {
    /// Every supported unit.
    pub const ALL: [LengthUnit; 5] = [
        LengthUnit::Millimeter,
        LengthUnit::Centimeter,
        LengthUnit::Meter,
        LengthUnit::Inch,
        LengthUnit::Foot,
    ];

    /// Short display suffix ("mm", "in", ...).
    pub fn suffix(self) -> &'static str {
        match self {
            LengthUnit::Millimeter => "mm",
            LengthUnit::Centimeter => "cm",
            LengthUnit::Meter => "m",
            LengthUnit::Inch => "in",
            LengthUnit::Foot => "ft",
        }
    }

    /// Length of one unit in millimetres.
    pub fn millimeters(self) -> f64 {
        match self {
            LengthUnit::Millimeter => 1.0,
            LengthUnit::Centimeter => 10.0,
            LengthUnit::Meter => 1000.0,
            LengthUnit::Inch => 25.4,
            LengthUnit::Foot => 304.8,
        }
    }

    /// Convert `value` expressed in `self` into `target` units.
    pub fn convert(self, value: f64, target: LengthUnit) -> f64 {
        value * self.millimeters() / target.millimeters()
    }

    /// Look up a unit by suffix or name, case-insensitively.
    ///
    /// Accepts the quote marks `"` and `'` for inches and feet.
    pub fn from_suffix(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => {
                Some(LengthUnit::Millimeter)
            }
            "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => {
                Some(LengthUnit::Centimeter)
            }
            "m" | "meter" | "meters" | "metre" | "metres" => Some(LengthUnit::Meter),
            "in" | "inch" | "inches" | "\"" => Some(LengthUnit::Inch),
            "ft" | "foot" | "feet" | "'" => Some(LengthUnit::Foot),
            _ => None,
        }
    }

    /// Format a length in this unit for user-facing messages.
    pub fn format(self, value: f64) -> String {
        // Avoid printing "-0".
        let value = if value == 0.0 { 0.0 } else { value };
        format!("{} {}", trim_float(value), self.suffix())
    }
}

fn trim_float(value: f64) -> String {
    let s = format!("{value:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_inches_to_mm() {
        let mm = LengthUnit::Inch.convert(2.0, LengthUnit::Millimeter);
        assert!((mm - 50.8).abs() < 1e-12);
        let ft = LengthUnit::Inch.convert(24.0, LengthUnit::Foot);
        assert!((ft - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_suffix_aliases() {
        assert_eq!(LengthUnit::from_suffix("MM"), Some(LengthUnit::Millimeter));
        assert_eq!(LengthUnit::from_suffix("\""), Some(LengthUnit::Inch));
        assert_eq!(LengthUnit::from_suffix("'"), Some(LengthUnit::Foot));
        assert_eq!(LengthUnit::from_suffix("metres"), Some(LengthUnit::Meter));
        assert_eq!(LengthUnit::from_suffix("yd"), None);
    }

    #[test]
    fn test_suffix_round_trips() {
        for unit in LengthUnit::ALL {
            assert_eq!(LengthUnit::from_suffix(unit.suffix()), Some(unit));
        }
    }

    #[test]
    fn test_format() {
        assert_eq!(LengthUnit::Millimeter.format(10.0), "10 mm");
        assert_eq!(LengthUnit::Meter.format(1.25), "1.25 m");
        assert_eq!(LengthUnit::Inch.format(-0.0), "0 in");
    }
}
