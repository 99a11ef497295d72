//! Image XObjects and page content wrapping

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbaImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use seal_types::{Points, SealError, SealResult};
use std::io::Write;

use crate::document::PdfDocument;

fn deflate(data: &[u8]) -> SealResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| SealError::io("compressing image data", e))?;
    encoder
        .finish()
        .map_err(|e| SealError::io("compressing image data", e))
}

/// Embed an RGBA image as a FlateDecode RGB image with a grayscale soft mask.
/// Fully opaque images get no mask.
pub fn embed_image(doc: &mut Document, image: &RgbaImage) -> SealResult<ObjectId> {
    let (width, height) = image.dimensions();
    let pixels = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixels * 3);
    let mut alpha = Vec::with_capacity(pixels);
    for px in image.pixels() {
        rgb.extend_from_slice(&px.0[..3]);
        alpha.push(px.0[3]);
    }

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(width),
        "Height" => i64::from(height),
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };

    if alpha.iter().any(|&a| a != u8::MAX) {
        let mask = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            deflate(&alpha)?,
        );
        let mask_id = doc.add_object(mask);
        dict.set("SMask", mask_id);
    }

    Ok(doc.add_object(Stream::new(dict, deflate(&rgb)?)))
}

/// One image draw in PDF user space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageDraw {
    pub image: ObjectId,
    pub x: Points,
    pub y: Points,
    pub width: Points,
    pub height: Points,
}

fn real(value: Points) -> Object {
    Object::Real(value.to_f32())
}

fn encode(operations: Vec<Operation>) -> SealResult<Vec<u8>> {
    Content { operations }
        .encode()
        .map_err(|e| SealError::io("encoding content stream", e.to_string()))
}

/// Resource name for an image, unique within `xobjects`
fn xobject_name(xobjects: &Dictionary, image: ObjectId) -> Vec<u8> {
    let base = format!("Seal{}", image.0);
    let mut name = base.clone();
    let mut suffix = 1;
    while xobjects.has(name.as_bytes()) {
        name = format!("{}_{}", base, suffix);
        suffix += 1;
    }
    name.into_bytes()
}

impl PdfDocument {
    /// The page's effective resources, copied so they can be edited in place
    fn owned_resources(&self, page_id: ObjectId) -> SealResult<Dictionary> {
        match self.inherited(page_id, b"Resources")? {
            Some(obj) => Ok(self
                .resolve(obj)?
                .as_dict()
                .map_err(|_| SealError::io("reading page resources", "Resources is not a dictionary"))?
                .clone()),
            None => Ok(Dictionary::new()),
        }
    }

    /// Existing content streams of a page, as references or inline objects
    fn content_parts(&self, page_id: ObjectId) -> SealResult<Vec<Object>> {
        let page = self.dictionary(page_id)?;
        let Ok(contents) = page.get(b"Contents") else {
            return Ok(Vec::new());
        };
        let parts = match contents {
            Object::Array(items) => items.clone(),
            Object::Reference(id) => match self.resolve(contents)? {
                Object::Array(items) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            other => vec![other.clone()],
        };
        Ok(parts)
    }

    /// Draw images over a page's existing content.
    ///
    /// Prior content is wrapped in `q … Q` so its graphics state cannot leak
    /// into the new draws, which land on top of everything already there.
    pub fn draw_images(&mut self, page_id: ObjectId, draws: &[ImageDraw]) -> SealResult<()> {
        if draws.is_empty() {
            return Ok(());
        }

        let mut resources = self.owned_resources(page_id)?;
        let mut xobjects = match resources.get(b"XObject") {
            Ok(obj) => self
                .resolve(obj)?
                .as_dict()
                .map_err(|_| SealError::io("reading page resources", "XObject is not a dictionary"))?
                .clone(),
            Err(_) => Dictionary::new(),
        };

        let mut operations = vec![Operation::new("Q", vec![])];
        for draw in draws {
            let name = xobject_name(&xobjects, draw.image);
            xobjects.set(name.clone(), draw.image);
            operations.extend([
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        real(draw.width),
                        0.into(),
                        0.into(),
                        real(draw.height),
                        real(draw.x),
                        real(draw.y),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(name)]),
                Operation::new("Q", vec![]),
            ]);
        }
        resources.set("XObject", xobjects);

        let mut contents = self.content_parts(page_id)?;
        let prefix = self
            .doc
            .add_object(Stream::new(Dictionary::new(), encode(vec![Operation::new("q", vec![])])?));
        let suffix = self
            .doc
            .add_object(Stream::new(Dictionary::new(), encode(operations)?));
        contents.insert(0, Object::Reference(prefix));
        contents.push(Object::Reference(suffix));

        let page = self
            .doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| SealError::io(format!("updating page {:?}", page_id), e.to_string()))?;
        page.set("Resources", resources);
        page.set("Contents", contents);
        Ok(())
    }
}
