//! Audit records emitted by stamping calls

use crate::points::Points;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Kind of placement a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SealType {
    Normal,
    Perforation,
    PersonalSignature,
}

impl SealType {
    /// Numeric code used by persisted rows
    pub const fn code(self) -> u8 {
        match self {
            Self::Normal => 1,
            Self::Perforation => 2,
            Self::PersonalSignature => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Normal),
            2 => Some(Self::Perforation),
            3 => Some(Self::PersonalSignature),
            _ => None,
        }
    }
}

/// The user performing a stamping call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub id: i64,
    pub name: String,
}

impl Operator {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// One placed image (or one perforation slice).
///
/// Records are created by the engine and handed back to the caller, which
/// owns persistence. All records produced by one call share `seal_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealRecord {
    pub contract_id: i64,
    pub seal_or_signature_id: i64,
    pub page_number: u32,
    pub position_x: Points,
    pub position_y: Points,
    pub width: Points,
    pub height: Points,
    pub seal_type: SealType,
    pub operator_id: i64,
    pub operator_name: String,
    pub seal_time: DateTime<Utc>,
}

/// SHA-256 of a document, lowercase hex
pub fn hash_document(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn hash_is_stable_hex(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let a = hash_document(&bytes);
            prop_assert_eq!(a.len(), 64);
            prop_assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
            prop_assert_eq!(a, hash_document(&bytes));
        }
    }
}
