//! On-disk cache of rendered preview pages
//!
//! Layout: `<root>/preview/<contract id>/<original|signed>/<dpi>dpi/page_<n>.png`,
//! with `n` the 0-based page index. Renders at different resolutions are
//! cached side by side.

use seal_types::{SealError, SealResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewVariant {
    Original,
    Signed,
}

impl PreviewVariant {
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Signed => "signed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreviewCache {
    root: PathBuf,
}

impl PreviewCache {
    pub fn new(storage_root: impl AsRef<Path>) -> Self {
        Self {
            root: storage_root.as_ref().join("preview"),
        }
    }

    pub fn variant_dir(&self, contract_id: i64, variant: PreviewVariant) -> PathBuf {
        self.root
            .join(contract_id.to_string())
            .join(variant.dir_name())
    }

    pub fn page_path(
        &self,
        contract_id: i64,
        variant: PreviewVariant,
        page_index: u32,
        dpi: u32,
    ) -> PathBuf {
        self.variant_dir(contract_id, variant)
            .join(format!("{}dpi", dpi))
            .join(format!("page_{}.png", page_index))
    }

    /// Cached PNG bytes, if present
    pub fn get(
        &self,
        contract_id: i64,
        variant: PreviewVariant,
        page_index: u32,
        dpi: u32,
    ) -> SealResult<Option<Vec<u8>>> {
        let path = self.page_path(contract_id, variant, page_index, dpi);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SealError::io(
                format!("reading cached preview {}", path.display()),
                e,
            )),
        }
    }

    pub fn put(
        &self,
        contract_id: i64,
        variant: PreviewVariant,
        page_index: u32,
        dpi: u32,
        png: &[u8],
    ) -> SealResult<PathBuf> {
        let path = self.page_path(contract_id, variant, page_index, dpi);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                SealError::io(format!("creating preview directory {}", dir.display()), e)
            })?;
        }
        fs::write(&path, png)
            .map_err(|e| SealError::io(format!("writing preview {}", path.display()), e))?;
        Ok(path)
    }

    /// Drop cached signed previews; they no longer match the document once
    /// the signed file changes. Failures are logged, not returned.
    pub fn invalidate_signed(&self, contract_id: i64) {
        let dir = self.variant_dir(contract_id, PreviewVariant::Signed);
        match fs::remove_dir_all(&dir) {
            Ok(()) => tracing::debug!(contract_id, "Cleared signed preview cache"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                contract_id,
                dir = %dir.display(),
                "Failed to clear signed preview cache: {}",
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let cache = PreviewCache::new("/data");
        assert_eq!(
            cache.page_path(12, PreviewVariant::Signed, 0, 150),
            PathBuf::from("/data/preview/12/signed/150dpi/page_0.png")
        );
    }

    #[test]
    fn test_put_get_invalidate() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PreviewCache::new(dir.path());

        assert_eq!(cache.get(1, PreviewVariant::Signed, 0, 150).unwrap(), None);
        cache.put(1, PreviewVariant::Signed, 0, 150, b"png").unwrap();
        cache.put(1, PreviewVariant::Signed, 0, 300, b"hires").unwrap();
        cache.put(1, PreviewVariant::Original, 0, 150, b"orig").unwrap();
        assert_eq!(
            cache.get(1, PreviewVariant::Signed, 0, 150).unwrap(),
            Some(b"png".to_vec())
        );
        assert_eq!(
            cache.get(1, PreviewVariant::Signed, 0, 300).unwrap(),
            Some(b"hires".to_vec())
        );
        assert_eq!(cache.get(1, PreviewVariant::Signed, 0, 72).unwrap(), None);

        cache.invalidate_signed(1);
        assert_eq!(cache.get(1, PreviewVariant::Signed, 0, 150).unwrap(), None);
        assert_eq!(cache.get(1, PreviewVariant::Signed, 0, 300).unwrap(), None);
        assert_eq!(
            cache.get(1, PreviewVariant::Original, 0, 150).unwrap(),
            Some(b"orig".to_vec())
        );

        // clearing an empty cache is a no-op
        cache.invalidate_signed(2);
    }
}
