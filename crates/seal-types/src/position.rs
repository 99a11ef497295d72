//! Placement and synthesis requests

use crate::color::Rgb;
use crate::error::SealError;
use crate::points::Points;
use crate::template::SealTemplate;
use serde::{Deserialize, Serialize};

/// Default placed size of a seal, in points
pub const DEFAULT_SEAL_EXTENT: Points = Points::from_hundredths(12_000);

/// Largest base size, in pixels, a seal may be synthesized at
pub const MAX_SEAL_SIZE: u32 = 2_000;

/// Where to draw one seal image, in PDF point space (origin bottom-left)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealPosition {
    /// 1-based page number
    pub page_number: u32,
    pub x: Points,
    pub y: Points,
    #[serde(default = "default_extent")]
    pub width: Points,
    #[serde(default = "default_extent")]
    pub height: Points,
}

fn default_extent() -> Points {
    DEFAULT_SEAL_EXTENT
}

fn check_user_space(name: &str, value: Points) -> Result<(), SealError> {
    if value.is_within_user_space() {
        return Ok(());
    }
    Err(SealError::validation(format!(
        "Seal {} exceeds the {}pt page limit",
        name,
        Points::MAX_USER_SPACE
    )))
}

impl SealPosition {
    pub fn new(page_number: u32, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            page_number,
            x: Points::from_f64(x),
            y: Points::from_f64(y),
            width: Points::from_f64(width),
            height: Points::from_f64(height),
        }
    }

    /// Check the invariants that do not depend on the target document
    pub fn validate(&self) -> Result<(), SealError> {
        if self.page_number == 0 {
            return Err(SealError::validation("Page numbers are 1-based"));
        }
        let fields = [
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
        ];
        for (name, value) in fields {
            check_user_space(name, value)?;
            if value.is_negative() {
                return Err(SealError::validation(format!(
                    "Seal {} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Check the page number against a document's page count
    pub fn validate_against(&self, page_count: u32) -> Result<(), SealError> {
        self.validate()?;
        if self.page_number > page_count {
            return Err(SealError::validation(format!(
                "Page {} out of range (document has {} pages)",
                self.page_number, page_count
            )));
        }
        Ok(())
    }
}

/// Input to seal synthesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealImageSpec {
    pub company_text: String,
    #[serde(default)]
    pub center_text: Option<String>,
    #[serde(default)]
    pub template: SealTemplate,
    #[serde(default)]
    pub color: Rgb,
    /// Overrides the template's base size
    #[serde(default)]
    pub size: Option<u32>,
}

impl SealImageSpec {
    pub fn new(company_text: impl Into<String>, template: SealTemplate) -> Self {
        Self {
            company_text: company_text.into(),
            center_text: None,
            template,
            color: Rgb::SEAL_RED,
            size: None,
        }
    }

    /// Build a spec from loosely typed request fields.
    ///
    /// Unknown template codes fall back to the standard circle; a malformed
    /// color or blank company text is rejected.
    pub fn from_request(
        company_text: &str,
        center_text: Option<&str>,
        template_code: Option<&str>,
        color: Option<&str>,
        size: Option<u32>,
    ) -> Result<Self, SealError> {
        let spec = Self {
            company_text: company_text.trim().to_string(),
            center_text: center_text
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            template: SealTemplate::resolve(template_code),
            color: Rgb::parse_or(color, Rgb::SEAL_RED)?,
            size,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn with_center_text(mut self, text: impl Into<String>) -> Self {
        self.center_text = Some(text.into());
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn validate(&self) -> Result<(), SealError> {
        if self.company_text.trim().is_empty() {
            return Err(SealError::validation("Company text must not be empty"));
        }
        match self.size {
            Some(0) => Err(SealError::validation("Seal size must be positive")),
            Some(size) if size > MAX_SEAL_SIZE => Err(SealError::validation(format!(
                "Seal size {} exceeds the maximum of {}",
                size, MAX_SEAL_SIZE
            ))),
            _ => Ok(()),
        }
    }

    pub fn effective_size(&self) -> u32 {
        self.size.unwrap_or_else(|| self.template.base_size())
    }
}

/// A bridge seal spread across the right edge of every page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerforationSpec {
    /// Vertical shift from the page's vertical center
    #[serde(default)]
    pub y_offset: Points,
    pub seal_width: Points,
    /// Height of the whole seal before it is split across pages
    pub seal_height: Points,
    /// Width of the slice that lies inside the page; defaults to half the seal
    #[serde(default)]
    pub edge_margin: Option<Points>,
}

impl PerforationSpec {
    pub fn new(seal_width: f64, seal_height: f64) -> Self {
        Self {
            y_offset: Points::ZERO,
            seal_width: Points::from_f64(seal_width),
            seal_height: Points::from_f64(seal_height),
            edge_margin: None,
        }
    }

    pub fn effective_edge_margin(&self) -> Points {
        self.edge_margin.unwrap_or(self.seal_width / 2)
    }

    pub fn validate(&self) -> Result<(), SealError> {
        check_user_space("y offset", self.y_offset)?;
        check_user_space("width", self.seal_width)?;
        check_user_space("height", self.seal_height)?;
        if let Some(margin) = self.edge_margin {
            check_user_space("edge margin", margin)?;
        }
        if self.seal_width.hundredths() <= 0 || self.seal_height.hundredths() <= 0 {
            return Err(SealError::validation(
                "Perforation seal width and height must be positive",
            ));
        }
        if self.edge_margin.is_some_and(Points::is_negative) {
            return Err(SealError::validation("Edge margin must be non-negative"));
        }
        Ok(())
    }
}
