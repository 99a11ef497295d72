//! Document storage

use chrono::Utc;
use seal_types::{SealError, SealResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Where contract PDFs are read from and signed versions are written to
pub trait DocumentStore {
    fn read(&self, path: &Path) -> SealResult<Vec<u8>>;

    /// Persist a new signed version and return the path to record on the
    /// contract. Earlier signed versions are left in place.
    fn write_signed(&self, contract_id: i64, bytes: &[u8]) -> SealResult<PathBuf>;
}

/// Files under a root directory; relative paths resolve against the root
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// `signed/<yyyy>/<MM>/signed_<yyyymmdd>_<12 hex>.pdf`
    fn new_signed_path() -> PathBuf {
        let now = Utc::now();
        let token = Uuid::new_v4().simple().to_string();
        PathBuf::from("signed")
            .join(now.format("%Y").to_string())
            .join(now.format("%m").to_string())
            .join(format!("signed_{}_{}.pdf", now.format("%Y%m%d"), &token[..12]))
    }
}

impl DocumentStore for FsDocumentStore {
    fn read(&self, path: &Path) -> SealResult<Vec<u8>> {
        let full = self.resolve(path);
        fs::read(&full).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                SealError::not_found(format!("Document {} does not exist", full.display()))
            } else {
                SealError::io(format!("reading {}", full.display()), e)
            }
        })
    }

    fn write_signed(&self, contract_id: i64, bytes: &[u8]) -> SealResult<PathBuf> {
        let relative = Self::new_signed_path();
        let full = self.resolve(&relative);
        let dir = full
            .parent()
            .ok_or_else(|| SealError::io("writing signed PDF", "signed path has no parent"))?;
        fs::create_dir_all(dir)
            .map_err(|e| SealError::io(format!("creating {}", dir.display()), e))?;

        // Write beside the target and rename so readers never see a partial file
        let tmp = full.with_extension("pdf.tmp");
        fs::write(&tmp, bytes)
            .map_err(|e| SealError::io(format!("writing {}", tmp.display()), e))?;
        if let Err(e) = fs::rename(&tmp, &full) {
            let _ = fs::remove_file(&tmp);
            return Err(SealError::io(format!("renaming {}", tmp.display()), e));
        }

        tracing::info!(
            contract_id,
            path = %relative.display(),
            bytes = bytes.len(),
            "Wrote signed document"
        );
        Ok(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_path_layout() {
        let path = FsDocumentStore::new_signed_path();
        let parts: Vec<String> = path
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "signed");
        assert_eq!(parts[1].len(), 4);
        assert_eq!(parts[2].len(), 2);

        let name = &parts[3];
        assert!(name.starts_with(&format!("signed_{}{}", parts[1], parts[2])));
        assert!(name.ends_with(".pdf"));
        // signed_ + yyyymmdd + _ + 12 hex + .pdf
        assert_eq!(name.len(), 7 + 8 + 1 + 12 + 4);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        let a = store.write_signed(1, b"%PDF-a").unwrap();
        let b = store.write_signed(1, b"%PDF-b").unwrap();
        assert_ne!(a, b);
        assert_eq!(store.read(&a).unwrap(), b"%PDF-a");
        assert_eq!(store.read(&b).unwrap(), b"%PDF-b");
        assert!(!store.resolve(&a).with_extension("pdf.tmp").exists());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        let err = store.read(Path::new("contracts/missing.pdf")).unwrap_err();
        assert!(matches!(err, SealError::NotFound(_)));
    }
}
