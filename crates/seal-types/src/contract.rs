//! Contract and asset state as seen by the stamping engine
//!
//! Both are owned by the caller's persistence layer. The engine reads them,
//! checks business state, and returns an updated [`ContractFile`] value on
//! success; it never writes rows itself.

use crate::error::SealError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    #[default]
    Pending,
    Signed,
    /// Terminal
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractFile {
    pub id: i64,
    pub file_name: String,
    pub original_path: PathBuf,
    /// Absent until the first successful stamp
    #[serde(default)]
    pub signed_path: Option<PathBuf>,
    pub page_count: u32,
    #[serde(default)]
    pub status: ContractStatus,
    /// Single-writer token, bumped on every successful stamp
    #[serde(default)]
    pub version: u64,
}

impl ContractFile {
    pub fn new(
        id: i64,
        file_name: impl Into<String>,
        original_path: impl Into<PathBuf>,
        page_count: u32,
    ) -> Self {
        Self {
            id,
            file_name: file_name.into(),
            original_path: original_path.into(),
            signed_path: None,
            page_count,
            status: ContractStatus::Pending,
            version: 0,
        }
    }

    /// The file stamping builds on: the latest signed version, else the original
    pub fn current_source(&self) -> &Path {
        self.signed_path.as_deref().unwrap_or(&self.original_path)
    }

    pub fn is_signed(&self) -> bool {
        self.signed_path.is_some()
    }

    /// Reject cancelled contracts and stale version tokens
    pub fn ensure_stampable(&self, expected_version: u64) -> Result<(), SealError> {
        if self.status == ContractStatus::Cancelled {
            return Err(SealError::state(format!(
                "Contract {} is cancelled",
                self.id
            )));
        }
        if self.version != expected_version {
            return Err(SealError::state(format!(
                "Contract {} changed concurrently (expected version {}, found {})",
                self.id, expected_version, self.version
            )));
        }
        Ok(())
    }

    /// The contract after a successful stamp wrote `signed_path`
    pub fn mark_signed(&self, signed_path: PathBuf) -> Self {
        Self {
            signed_path: Some(signed_path),
            status: ContractStatus::Signed,
            version: self.version + 1,
            ..self.clone()
        }
    }

    pub fn cancel(&self) -> Self {
        Self {
            status: ContractStatus::Cancelled,
            version: self.version + 1,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetKind {
    Seal,
    Signature,
}

/// A seal or signature image the caller has already looked up
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealAsset {
    pub id: i64,
    pub name: String,
    pub kind: AssetKind,
    pub enabled: bool,
    #[serde(skip)]
    pub image_bytes: Vec<u8>,
}

impl std::fmt::Debug for SealAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealAsset")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("enabled", &self.enabled)
            .field("image_bytes", &self.image_bytes.len())
            .finish()
    }
}

impl SealAsset {
    pub fn new(id: i64, name: impl Into<String>, kind: AssetKind, image_bytes: Vec<u8>) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            enabled: true,
            image_bytes,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn ensure_enabled(&self) -> Result<(), SealError> {
        if self.enabled {
            Ok(())
        } else {
            Err(SealError::state(format!(
                "{:?} {} ({}) is disabled",
                self.kind, self.id, self.name
            )))
        }
    }

    pub fn ensure_kind(&self, kind: AssetKind) -> Result<(), SealError> {
        if self.kind == kind {
            Ok(())
        } else {
            Err(SealError::validation(format!(
                "Asset {} is a {:?}, expected a {:?}",
                self.id, self.kind, kind
            )))
        }
    }
}
