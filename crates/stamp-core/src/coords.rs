//! Mapping between preview pixels (top-left origin) and PDF points
//! (bottom-left origin)

use seal_types::{Points, SealError, SealResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinateMapper {
    /// `[x, y, width, height]` of the page's media box, in points
    pub media_box: [f64; 4],
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl CoordinateMapper {
    pub fn new(media_box: [f64; 4], pixel_width: u32, pixel_height: u32) -> SealResult<Self> {
        if pixel_width == 0 || pixel_height == 0 {
            return Err(SealError::validation("Preview image has no pixels"));
        }
        if media_box[2] <= 0.0 || media_box[3] <= 0.0 {
            return Err(SealError::validation("Page has an empty media box"));
        }
        Ok(Self {
            media_box,
            pixel_width: f64::from(pixel_width),
            pixel_height: f64::from(pixel_height),
        })
    }

    /// Mapper for a page of `width × height` points with its origin at 0,0
    pub fn for_page(width_pt: f64, height_pt: f64, pixel_width: u32, pixel_height: u32) -> SealResult<Self> {
        Self::new([0.0, 0.0, width_pt, height_pt], pixel_width, pixel_height)
    }

    pub fn pixel_to_point(&self, px: f64, py: f64) -> (f64, f64) {
        let [mb_x, mb_y, mb_width, mb_height] = self.media_box;

        let x_pct = px / self.pixel_width;
        let y_pct = py / self.pixel_height;

        (mb_x + x_pct * mb_width, mb_y + (mb_height - y_pct * mb_height))
    }

    pub fn point_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let [mb_x, mb_y, mb_width, mb_height] = self.media_box;

        let x_pct = (x - mb_x) / mb_width;
        let y_pct = 1.0 - ((y - mb_y) / mb_height);

        (x_pct * self.pixel_width, y_pct * self.pixel_height)
    }

    /// Pixel location rounded to stored coordinate precision
    pub fn pixel_to_points(&self, px: f64, py: f64) -> (Points, Points) {
        let (x, y) = self.pixel_to_point(px, py);
        (Points::from_f64(x), Points::from_f64(y))
    }
}
