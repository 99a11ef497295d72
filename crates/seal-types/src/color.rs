use crate::error::SealError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Traditional seal-paste red
    pub const SEAL_RED: Rgb = Rgb::new(220, 40, 40);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`, `RRGGBB`, `0xRRGGBB` or the short `#RGB` form
    pub fn from_hex(input: &str) -> Result<Self, SealError> {
        let trimmed = input.trim();
        let hex = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SealError::validation(format!(
                "Malformed color '{}': expected hexadecimal digits",
                input
            )));
        }

        let component = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0);

        match hex.len() {
            3 => {
                let r = component(&hex[0..1]);
                let g = component(&hex[1..2]);
                let b = component(&hex[2..3]);
                Ok(Self::new(r * 17, g * 17, b * 17))
            }
            6 => Ok(Self::new(
                component(&hex[0..2]),
                component(&hex[2..4]),
                component(&hex[4..6]),
            )),
            n => Err(SealError::validation(format!(
                "Malformed color '{}': expected 3 or 6 hex digits, got {}",
                input, n
            ))),
        }
    }

    /// Parse an optional color string, using `default` when absent or blank
    pub fn parse_or(input: Option<&str>, default: Rgb) -> Result<Self, SealError> {
        match input.map(str::trim) {
            None | Some("") => Ok(default),
            Some(s) => Self::from_hex(s),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::SEAL_RED
    }
}

impl FromStr for Rgb {
    type Err = SealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_and_short_forms() {
        assert_eq!(Rgb::from_hex("#DC2828").unwrap(), Rgb::SEAL_RED);
        assert_eq!(Rgb::from_hex("dc2828").unwrap(), Rgb::SEAL_RED);
        assert_eq!(Rgb::from_hex("0xDC2828").unwrap(), Rgb::SEAL_RED);
        assert_eq!(Rgb::from_hex("#FFF").unwrap(), Rgb::new(255, 255, 255));
    }

    #[test]
    fn test_malformed_is_validation_error() {
        assert!(Rgb::from_hex("#GG0000").unwrap_err().is_validation());
        assert!(Rgb::from_hex("#12345").unwrap_err().is_validation());
        assert!(Rgb::from_hex("red").unwrap_err().is_validation());
    }

    #[test]
    fn test_blank_uses_default() {
        assert_eq!(Rgb::parse_or(None, Rgb::BLACK).unwrap(), Rgb::BLACK);
        assert_eq!(Rgb::parse_or(Some("  "), Rgb::BLACK).unwrap(), Rgb::BLACK);
    }

    #[test]
    fn test_hex_output() {
        assert_eq!(Rgb::new(1, 171, 255).to_hex(), "#01ABFF");
    }
}
