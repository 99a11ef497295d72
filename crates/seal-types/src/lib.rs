//! Shared data model for seal synthesis and PDF stamping
//!
//! Everything the renderer, the stamping engine and the command-line front end
//! exchange lives here: the template catalog, colors, fixed-point coordinates,
//! placement requests, contract state and the audit records a stamping call emits.

pub mod audit;
pub mod color;
pub mod contract;
pub mod error;
pub mod points;
pub mod position;
pub mod template;

pub use audit::{hash_document, Operator, SealRecord, SealType};
pub use color::Rgb;
pub use contract::{AssetKind, ContractFile, ContractStatus, SealAsset};
pub use error::{SealError, SealResult};
pub use points::Points;
pub use position::{PerforationSpec, SealImageSpec, SealPosition, MAX_SEAL_SIZE};
pub use template::SealTemplate;
