//! Font registry shared by the seal and signature renderers
//!
//! The registry is built once and shared behind an `Arc`. Lookups never
//! fail: a name that cannot be resolved degrades to the fallback serif face
//! and logs a warning.
//!
//! Resolution order:
//! 1. fonts bundled with the binary (`typst-assets`) and fonts registered
//!    from configuration, by logical name or family, case-insensitively
//! 2. installed system fonts by family (when enabled)
//! 3. the fallback serif face
//!
//! [`FontRegistry::resolve_for_text`] additionally swaps in a face that has
//! glyphs for the text when the named face does not, since the bundled fonts
//! carry no CJK coverage.

use seal_types::{SealError, SealResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use ttf_parser::name_id;

/// Weight used for seal text
pub const WEIGHT_BOLD: u16 = 700;
pub const WEIGHT_REGULAR: u16 = 400;

/// Well-known handwriting-style families offered when installed
const SYSTEM_SIGNATURE_FONTS: [(&str, &str); 3] = [
    ("STXingkai", "Flowing running-script style"),
    ("KaiTi", "Regular script style"),
    ("SimSun", "Standard Song typeface"),
];

/// Families tried first when the requested face lacks glyphs for the text
const COVERAGE_FALLBACK_FONTS: [&str; 6] = [
    "SimSun",
    "Noto Serif CJK SC",
    "Source Han Serif SC",
    "Noto Sans CJK SC",
    "Source Han Sans SC",
    "WenQuanYi Zen Hei",
];

#[derive(Clone)]
enum FontData {
    Static(&'static [u8]),
    Shared(Arc<Vec<u8>>),
}

impl FontData {
    fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Static(data) => data,
            Self::Shared(data) => data.as_slice(),
        }
    }
}

/// A single parsed face: cheap to clone, font bytes are shared
#[derive(Clone)]
pub struct FontFace {
    family: String,
    weight: u16,
    italic: bool,
    index: u32,
    data: FontData,
}

impl FontFace {
    fn load(data: FontData, index: u32) -> Option<Self> {
        let face = ttf_parser::Face::parse(data.as_bytes(), index).ok()?;
        let family = family_name(&face)?;
        Some(Self {
            family,
            weight: face.weight().to_number(),
            italic: face.is_italic(),
            index,
            data,
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn weight(&self) -> u16 {
        self.weight
    }

    pub fn is_italic(&self) -> bool {
        self.italic
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_bytes()
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn parse(&self) -> SealResult<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(self.data(), self.index)
            .map_err(|e| SealError::io(format!("parsing font '{}'", self.family), e))
    }

    /// Whether every non-whitespace character of `text` has a glyph
    pub fn covers(&self, text: &str) -> bool {
        self.parse().is_ok_and(|face| face_covers(&face, text))
    }

    /// Lower is better: upright faces closest to `weight`
    fn style_distance(&self, weight: u16) -> u32 {
        let italic_penalty = if self.italic { 1000 } else { 0 };
        u32::from(self.weight.abs_diff(weight)) + italic_penalty
    }
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .field("weight", &self.weight)
            .field("italic", &self.italic)
            .field("index", &self.index)
            .field("bytes", &self.data().len())
            .finish()
    }
}

fn face_covers(face: &ttf_parser::Face<'_>, text: &str) -> bool {
    text.chars()
        .filter(|ch| !ch.is_whitespace())
        .all(|ch| face.glyph_index(ch).is_some())
}

fn family_name(face: &ttf_parser::Face<'_>) -> Option<String> {
    [name_id::FAMILY, name_id::TYPOGRAPHIC_FAMILY]
        .into_iter()
        .find_map(|id| {
            face.names()
                .into_iter()
                .filter(|name| name.name_id == id && name.is_unicode())
                .find_map(|name| name.to_string())
        })
}

/// A font file registered under a logical name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontRegistration {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub recommended: bool,
}

fn default_true() -> bool {
    true
}

/// How the registry is populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontOptions {
    /// Also look up installed system fonts
    pub system_fonts: bool,
    pub register: Vec<FontRegistration>,
}

impl Default for FontOptions {
    fn default() -> Self {
        Self {
            system_fonts: true,
            register: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSource {
    Embedded,
    Registered,
    System,
}

/// Entry in the font picker list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontInfo {
    pub name: String,
    pub family: String,
    pub source: FontSource,
    pub recommended: bool,
    pub description: String,
}

struct Entry {
    name: String,
    face: FontFace,
    source: FontSource,
    recommended: bool,
    description: String,
}

impl Entry {
    fn matches(&self, key: &str) -> bool {
        self.name.to_lowercase() == key || self.face.family.to_lowercase() == key
    }
}

pub struct FontRegistry {
    entries: Vec<Entry>,
    system: Option<fontdb::Database>,
    resolved: RwLock<HashMap<(String, u16), FontFace>>,
    /// Covering faces keyed by the characters they were needed for
    covering: RwLock<HashMap<(String, u16), Option<FontFace>>>,
    fallback: FontFace,
}

impl FontRegistry {
    /// Registry holding only the bundled fonts
    pub fn embedded() -> SealResult<Self> {
        Self::new(&FontOptions {
            system_fonts: false,
            register: Vec::new(),
        })
    }

    pub fn new(options: &FontOptions) -> SealResult<Self> {
        let mut entries = Vec::new();

        for registration in &options.register {
            Self::load_registration(registration, &mut entries);
        }

        let bundled_start = entries.len();
        for data in typst_assets::fonts() {
            let count = ttf_parser::fonts_in_collection(data).unwrap_or(1);
            for index in 0..count {
                if let Some(face) = FontFace::load(FontData::Static(data), index) {
                    entries.push(Entry {
                        name: face.family.clone(),
                        face,
                        source: FontSource::Embedded,
                        recommended: false,
                        description: String::from("Bundled font"),
                    });
                }
            }
        }

        let bundled = &entries[bundled_start..];
        let fallback = bundled
            .iter()
            .filter(|e| e.face.family.contains("Serif"))
            .min_by_key(|e| e.face.style_distance(WEIGHT_REGULAR))
            .or_else(|| bundled.first())
            .or_else(|| entries.first())
            .map(|e| e.face.clone())
            .ok_or_else(|| SealError::not_found("No usable fonts available"))?;

        let system = options.system_fonts.then(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "Loaded system font database");
            db
        });

        tracing::info!(
            "Font registry initialized with {} faces (fallback: {})",
            entries.len(),
            fallback.family
        );

        Ok(Self {
            entries,
            system,
            resolved: RwLock::new(HashMap::new()),
            covering: RwLock::new(HashMap::new()),
            fallback,
        })
    }

    fn load_registration(registration: &FontRegistration, entries: &mut Vec<Entry>) {
        let data = match std::fs::read(&registration.path) {
            Ok(data) => Arc::new(data),
            Err(e) => {
                tracing::warn!(
                    name = %registration.name,
                    path = %registration.path.display(),
                    "Skipping font registration: {}",
                    e
                );
                return;
            }
        };

        let count = ttf_parser::fonts_in_collection(&data).unwrap_or(1);
        let mut loaded = 0;
        for index in 0..count {
            if let Some(face) = FontFace::load(FontData::Shared(Arc::clone(&data)), index) {
                entries.push(Entry {
                    name: registration.name.clone(),
                    face,
                    source: FontSource::Registered,
                    recommended: registration.recommended,
                    description: registration.description.clone(),
                });
                loaded += 1;
            }
        }

        if loaded == 0 {
            tracing::warn!(
                name = %registration.name,
                path = %registration.path.display(),
                "Font file contains no usable faces"
            );
        } else {
            tracing::info!(name = %registration.name, faces = loaded, "Registered font");
        }
    }

    pub fn fallback(&self) -> &FontFace {
        &self.fallback
    }

    /// Resolve a font name at regular weight
    pub fn resolve(&self, name: &str) -> FontFace {
        self.resolve_weighted(name, WEIGHT_REGULAR)
    }

    /// Resolve a font name, preferring the upright face nearest `weight`
    pub fn resolve_weighted(&self, name: &str, weight: u16) -> FontFace {
        let name = name.trim();
        let key = name.to_lowercase();
        if key.is_empty() {
            return self.fallback.clone();
        }

        if let Some(face) = self
            .entries
            .iter()
            .filter(|e| e.matches(&key))
            .min_by_key(|e| e.face.style_distance(weight))
        {
            return face.face.clone();
        }

        let cache_key = (key, weight);
        if let Ok(cache) = self.resolved.read() {
            if let Some(face) = cache.get(&cache_key) {
                return face.clone();
            }
        }

        let face = self.query_system(name, weight).unwrap_or_else(|| {
            tracing::warn!(
                font = name,
                fallback = %self.fallback.family,
                "Font not found, using fallback"
            );
            self.fallback.clone()
        });

        if let Ok(mut cache) = self.resolved.write() {
            cache.insert(cache_key, face.clone());
        }
        face
    }

    /// Resolve `name` like [`FontRegistry::resolve_weighted`], but when that
    /// face is missing glyphs for `text` use one that has them all.
    ///
    /// Candidates are the registry's own faces, then well-known CJK system
    /// families, then any installed face. If nothing covers the text the
    /// named face is returned and the missing glyphs render as boxes.
    pub fn resolve_for_text(&self, name: &str, weight: u16, text: &str) -> FontFace {
        let face = self.resolve_weighted(name, weight);
        if face.covers(text) {
            return face;
        }

        let parsed = face.parse().ok();
        let mut missing: Vec<char> = text
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .filter(|ch| {
                parsed
                    .as_ref()
                    .map_or(true, |parsed| parsed.glyph_index(*ch).is_none())
            })
            .collect();
        missing.sort_unstable();
        missing.dedup();
        let needed: String = missing.into_iter().collect();
        let cache_key = (needed, weight);

        let cached = self
            .covering
            .read()
            .ok()
            .and_then(|cache| cache.get(&cache_key).cloned());
        let covering = match cached {
            Some(found) => found,
            None => {
                let found = self.find_covering(&cache_key.0, weight);
                if let Ok(mut cache) = self.covering.write() {
                    cache.insert(cache_key, found.clone());
                }
                found
            }
        };

        match covering {
            Some(covering) => {
                tracing::debug!(
                    font = name,
                    resolved = %covering.family,
                    "Requested font lacks glyphs, using covering face"
                );
                covering
            }
            None => {
                tracing::warn!(
                    font = name,
                    text,
                    "No available font covers the text, missing glyphs will render as boxes"
                );
                face
            }
        }
    }

    fn find_covering(&self, text: &str, weight: u16) -> Option<FontFace> {
        if let Some(entry) = self
            .entries
            .iter()
            .filter(|e| e.face.covers(text))
            .min_by_key(|e| e.face.style_distance(weight))
        {
            return Some(entry.face.clone());
        }

        let db = self.system.as_ref()?;
        if let Some(face) = COVERAGE_FALLBACK_FONTS
            .iter()
            .filter_map(|family| self.query_system(family, weight))
            .find(|face| face.covers(text))
        {
            return Some(face);
        }

        let id = db.faces().map(|info| info.id).find(|id| {
            db.with_face_data(*id, |data, index| {
                ttf_parser::Face::parse(data, index).is_ok_and(|face| face_covers(&face, text))
            })
            .unwrap_or(false)
        })?;
        let (data, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;
        FontFace::load(FontData::Shared(Arc::new(data)), index)
    }

    fn query_system(&self, family: &str, weight: u16) -> Option<FontFace> {
        let db = self.system.as_ref()?;
        let query = fontdb::Query {
            families: &[fontdb::Family::Name(family)],
            weight: fontdb::Weight(weight),
            ..fontdb::Query::default()
        };
        let id = db.query(&query)?;
        let (data, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;
        let face = FontFace::load(FontData::Shared(Arc::new(data)), index)?;
        tracing::debug!(font = family, resolved = %face.family, "Resolved system font");
        Some(face)
    }

    fn system_has_family(&self, family: &str) -> bool {
        self.system.as_ref().is_some_and(|db| {
            db.faces()
                .any(|face| face.families.iter().any(|(name, _)| name == family))
        })
    }

    /// Fonts to offer in a picker: registered fonts first, then installed
    /// handwriting-style system fonts, then the bundled families.
    pub fn list_fonts(&self) -> Vec<FontInfo> {
        let mut seen: Vec<String> = Vec::new();
        let mut fonts = Vec::new();

        let mut push = |info: FontInfo, fonts: &mut Vec<FontInfo>| {
            let key = info.name.to_lowercase();
            if !seen.contains(&key) {
                seen.push(key);
                fonts.push(info);
            }
        };

        for entry in self
            .entries
            .iter()
            .filter(|e| e.source == FontSource::Registered)
        {
            push(
                FontInfo {
                    name: entry.name.clone(),
                    family: entry.face.family.clone(),
                    source: entry.source,
                    recommended: entry.recommended,
                    description: entry.description.clone(),
                },
                &mut fonts,
            );
        }

        for (family, description) in SYSTEM_SIGNATURE_FONTS {
            if self.system_has_family(family) {
                push(
                    FontInfo {
                        name: family.to_string(),
                        family: family.to_string(),
                        source: FontSource::System,
                        recommended: false,
                        description: description.to_string(),
                    },
                    &mut fonts,
                );
            }
        }

        for entry in self
            .entries
            .iter()
            .filter(|e| e.source == FontSource::Embedded)
        {
            push(
                FontInfo {
                    name: entry.face.family.clone(),
                    family: entry.face.family.clone(),
                    source: entry.source,
                    recommended: entry.face.family == self.fallback.family,
                    description: entry.description.clone(),
                },
                &mut fonts,
            );
        }

        fonts
    }
}

impl fmt::Debug for FontRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontRegistry")
            .field("faces", &self.entries.len())
            .field("system_fonts", &self.system.is_some())
            .field("fallback", &self.fallback.family)
            .finish()
    }
}
