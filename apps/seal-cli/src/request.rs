//! JSON request files for the stamping commands
//!
//! Assets are described without their image bytes; `image` points at the PNG
//! or JPEG to load. Paths inside the contract resolve against the configured
//! storage root.

use anyhow::Context;
use seal_types::{
    AssetKind, ContractFile, Operator, PerforationSpec, SealAsset, SealPosition, SealType,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRef {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub kind: AssetKind,
    #[serde(default = "enabled")]
    pub enabled: bool,
    pub image: PathBuf,
}

fn enabled() -> bool {
    true
}

impl AssetRef {
    pub fn load(&self) -> anyhow::Result<SealAsset> {
        let bytes = fs::read(&self.image)
            .with_context(|| format!("Failed to read asset image {}", self.image.display()))?;
        let mut asset = SealAsset::new(self.id, self.name.clone(), self.kind, bytes);
        asset.enabled = self.enabled;
        Ok(asset)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampItem {
    pub asset: AssetRef,
    pub positions: Vec<SealPosition>,
    #[serde(default = "normal")]
    pub seal_type: SealType,
}

fn normal() -> SealType {
    SealType::Normal
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampRequest {
    pub contract: ContractFile,
    /// Defaults to the contract's current version
    #[serde(default)]
    pub expected_version: Option<u64>,
    pub operator: Operator,
    pub items: Vec<StampItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerforationRequest {
    pub contract: ContractFile,
    #[serde(default)]
    pub expected_version: Option<u64>,
    pub operator: Operator,
    pub asset: AssetRef,
    pub spec: PerforationSpec,
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Replace the `contract` member of a request file, keeping everything else
pub fn write_back_contract(path: &Path, contract: &ContractFile) -> anyhow::Result<()> {
    let mut value: serde_json::Value = read_json(path)?;
    let object = value
        .as_object_mut()
        .with_context(|| format!("{} is not a JSON object", path.display()))?;
    object.insert("contract".to_string(), serde_json::to_value(contract)?);
    object.remove("expectedVersion");
    fs::write(path, serde_json::to_string_pretty(&value)?)
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use seal_types::Points;

    const STAMP_REQUEST: &str = r#"{
        "contract": {
            "id": 12,
            "fileName": "lease.pdf",
            "originalPath": "contracts/lease.pdf",
            "pageCount": 3
        },
        "operator": { "id": 5, "name": "Chen" },
        "items": [
            {
                "asset": { "id": 1, "kind": "SEAL", "image": "seal.png" },
                "positions": [{ "pageNumber": 3, "x": 400.5, "y": 80 }]
            },
            {
                "asset": { "id": 2, "kind": "SIGNATURE", "image": "sig.png" },
                "positions": [{ "pageNumber": 3, "x": 100, "y": 80, "width": 150, "height": 50 }],
                "sealType": "PERSONAL_SIGNATURE"
            }
        ]
    }"#;

    #[test]
    fn test_stamp_request_defaults() {
        let request: StampRequest = serde_json::from_str(STAMP_REQUEST).unwrap();
        assert_eq!(request.contract.version, 0);
        assert_eq!(request.expected_version, None);
        assert_eq!(request.items.len(), 2);

        let first = &request.items[0];
        assert!(first.asset.enabled);
        assert_eq!(first.seal_type, SealType::Normal);
        assert_eq!(first.positions[0].x, Points::from_f64(400.5));
        assert_eq!(first.positions[0].width, Points::from_f64(120.0));
        assert_eq!(request.items[1].seal_type, SealType::PersonalSignature);
    }

    #[test]
    fn test_write_back_contract() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        fs::write(&path, STAMP_REQUEST).unwrap();

        let request: StampRequest = read_json(&path).unwrap();
        let signed = request.contract.mark_signed(PathBuf::from("signed/x.pdf"));
        write_back_contract(&path, &signed).unwrap();

        let updated: StampRequest = read_json(&path).unwrap();
        assert_eq!(updated.contract, signed);
        assert_eq!(updated.items.len(), 2);
    }

    #[test]
    fn test_missing_asset_image() {
        let asset = AssetRef {
            id: 1,
            name: String::new(),
            kind: AssetKind::Seal,
            enabled: true,
            image: PathBuf::from("/nonexistent/seal.png"),
        };
        let err = asset.load().unwrap_err();
        assert!(err.to_string().contains("Failed to read asset image"));
    }
}
