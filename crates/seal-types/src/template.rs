//! Compiled-in seal template catalog

use serde::{Deserialize, Serialize};

/// The fixed set of seal layouts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SealTemplate {
    /// Round company seal with a star and curved company name
    #[default]
    StandardCircle,
    /// Oval finance seal, two straight text lines, no star
    OvalFinance,
    /// Square legal-representative seal with vertically stacked characters
    SquareLegal,
}

impl SealTemplate {
    pub const ALL: [SealTemplate; 3] = [
        SealTemplate::StandardCircle,
        SealTemplate::OvalFinance,
        SealTemplate::SquareLegal,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            Self::StandardCircle => "standard_circle",
            Self::OvalFinance => "oval_finance",
            Self::SquareLegal => "square_legal",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::StandardCircle => "Standard round company seal",
            Self::OvalFinance => "Oval finance seal",
            Self::SquareLegal => "Square legal representative seal",
        }
    }

    /// Radius for round seals, height for ovals, side length for squares
    pub const fn base_size(self) -> u32 {
        match self {
            Self::StandardCircle => 150,
            Self::OvalFinance => 120,
            Self::SquareLegal => 80,
        }
    }

    pub const fn has_star(self) -> bool {
        matches!(self, Self::StandardCircle)
    }

    pub const fn has_border(self) -> bool {
        true
    }

    pub const fn border_width(self) -> u32 {
        2
    }

    pub const fn default_font(self) -> &'static str {
        match self {
            Self::StandardCircle | Self::OvalFinance => "SimSun",
            Self::SquareLegal => "FZXiaoZhuanTi",
        }
    }

    /// Exact lookup by code
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Lookup that never fails: blank or unknown codes fall back to
    /// [`SealTemplate::StandardCircle`].
    pub fn resolve(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            None | Some("") => Self::StandardCircle,
            Some(code) => Self::from_code(code).unwrap_or_else(|| {
                tracing::warn!(code, "Unknown seal template, using standard_circle");
                Self::StandardCircle
            }),
        }
    }
}
