//! Seal, signature and perforation-slice image synthesis
//!
//! Everything here is pure in-memory raster work: nothing touches the
//! filesystem except font registration. The stamping engine consumes the
//! PNG bytes and slices produced here.

pub mod codec;
pub mod fonts;
pub mod geometry;
pub mod signature;
pub mod slicer;
pub mod surface;
pub mod synth;

pub use codec::{decode_base64_image, decode_image, encode_png, png_data_url};
pub use fonts::{FontFace, FontInfo, FontOptions, FontRegistration, FontRegistry, FontSource};
pub use signature::{SignatureMode, SignatureRenderer, TextSignature};
pub use slicer::{place_slices, slice, ImageSlice, PageSize, SlicePlacement};
pub use surface::MAX_SCALE;
pub use synth::{SealCalibration, SealSynthesizer};
