//! PDF loading, page lookup and saving on top of lopdf

use lopdf::{Dictionary, Document, Object, ObjectId};
use seal_render::PageSize;
use seal_types::{SealError, SealResult};

/// Page boxes are inherited through at most this many `/Parent` hops
const MAX_INHERITANCE_DEPTH: usize = 32;

/// US Letter, used when no page box can be found
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

#[derive(Debug)]
pub struct PdfDocument {
    pub(crate) doc: Document,
}

impl PdfDocument {
    pub fn from_bytes(bytes: &[u8]) -> SealResult<Self> {
        if bytes.is_empty() {
            return Err(SealError::validation("PDF data is empty"));
        }
        let doc = Document::load_mem(bytes)
            .map_err(|e| SealError::io("parsing PDF", e.to_string()))?;
        Ok(Self { doc })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Object id of a 1-based page
    pub fn page_id(&self, page_number: u32) -> SealResult<ObjectId> {
        self.doc
            .get_pages()
            .get(&page_number)
            .copied()
            .ok_or_else(|| {
                SealError::validation(format!(
                    "Page {} out of range (document has {} pages)",
                    page_number,
                    self.page_count()
                ))
            })
    }

    /// Media box of a 1-based page as `[x, y, width, height]`
    pub fn media_box(&self, page_number: u32) -> SealResult<[f64; 4]> {
        let page_id = self.page_id(page_number)?;
        match self.inherited(page_id, b"MediaBox")? {
            Some(obj) => self.parse_rect(obj),
            None => Ok(DEFAULT_MEDIA_BOX),
        }
    }

    pub fn page_size(&self, page_number: u32) -> SealResult<PageSize> {
        let [_, _, width, height] = self.media_box(page_number)?;
        Ok(PageSize::new(width, height))
    }

    pub fn page_sizes(&self) -> SealResult<Vec<PageSize>> {
        (1..=self.page_count()).map(|n| self.page_size(n)).collect()
    }

    /// Look up an inheritable page attribute, walking `/Parent` links
    pub(crate) fn inherited(&self, page_id: ObjectId, key: &[u8]) -> SealResult<Option<&Object>> {
        let mut dict = self.dictionary(page_id)?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = dict.get(key) {
                return Ok(Some(value));
            }
            match dict.get(b"Parent").and_then(Object::as_reference) {
                Ok(parent_id) => dict = self.dictionary(parent_id)?,
                Err(_) => return Ok(None),
            }
        }
        Ok(None)
    }

    pub(crate) fn dictionary(&self, id: ObjectId) -> SealResult<&Dictionary> {
        self.doc
            .get_dictionary(id)
            .map_err(|e| SealError::io(format!("reading object {:?}", id), e.to_string()))
    }

    /// Follow a reference, or return the object itself
    pub(crate) fn resolve<'a>(&'a self, obj: &'a Object) -> SealResult<&'a Object> {
        match obj {
            Object::Reference(id) => self
                .doc
                .get_object(*id)
                .map_err(|e| SealError::io(format!("resolving {:?}", id), e.to_string())),
            other => Ok(other),
        }
    }

    fn parse_rect(&self, obj: &Object) -> SealResult<[f64; 4]> {
        let arr = self
            .resolve(obj)?
            .as_array()
            .map_err(|_| SealError::io("reading page box", "MediaBox is not an array"))?;

        if arr.len() != 4 {
            return Err(SealError::io(
                "reading page box",
                format!("MediaBox has {} elements, expected 4", arr.len()),
            ));
        }

        let mut values = [0.0f64; 4];
        for (value, obj) in values.iter_mut().zip(arr) {
            *value = self.extract_number(obj)?;
        }

        Ok([
            values[0],
            values[1],
            values[2] - values[0],
            values[3] - values[1],
        ])
    }

    fn extract_number(&self, obj: &Object) -> SealResult<f64> {
        match self.resolve(obj)? {
            Object::Integer(i) => Ok(*i as f64),
            Object::Real(r) => Ok(f64::from(*r)),
            _ => Err(SealError::io(
                "reading page box",
                "Expected number in rectangle",
            )),
        }
    }

    pub fn save_to_bytes(&mut self) -> SealResult<Vec<u8>> {
        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| SealError::io("saving PDF", e.to_string()))?;
        Ok(buffer)
    }
}

/// Page count of a PDF held in memory
pub fn page_count(bytes: &[u8]) -> SealResult<u32> {
    Ok(PdfDocument::from_bytes(bytes)?.page_count())
}
