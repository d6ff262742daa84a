//! PDF document writer

use crate::content::{DrawOp, Page};
use crate::font::StandardFont;
use crate::graphics::{line_operators, rect_operators};
use crate::image::{generate_image_operators, ImageXObject};
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{PdfError, Result};
use image::GrayImage;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::Path;

/// Page size in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// A4 (595.28 x 841.89 points)
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };

    /// US Letter (612 x 792 points)
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };

    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(PdfError::InvalidPageSize(width, height));
        }
        Ok(Self { width, height })
    }
}

/// Builds a new PDF from [`Page`]s
///
/// Output is deterministic: the same pages, title and creation date always
/// produce the same bytes.
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    size: PageSize,
    /// Id reserved for the page tree root
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    /// Font dictionaries (created on first use)
    font_ids: BTreeMap<StandardFont, ObjectId>,
    /// Embedded images (pixel hash -> PDF object ID)
    embedded_images: HashMap<u64, ObjectId>,
    /// Resource names of embedded images
    image_names: HashMap<ObjectId, String>,
    /// Next image resource number
    next_image_resource: u32,
    info: Dictionary,
}

impl PdfDocument {
    /// Create an empty document whose pages all share `size`
    pub fn new(size: PageSize) -> Self {
        let mut inner = Document::with_version("1.5");
        let pages_id = inner.new_object_id();
        let catalog_id = inner.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        inner.trailer.set("Root", catalog_id);

        Self {
            inner,
            size,
            pages_id,
            page_ids: Vec::new(),
            font_ids: BTreeMap::new(),
            embedded_images: HashMap::new(),
            image_names: HashMap::new(),
            next_image_resource: 1,
            info: Dictionary::new(),
        }
    }

    /// Page size shared by every page
    pub fn page_size(&self) -> PageSize {
        self.size
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Set the document title (Info dictionary)
    pub fn set_title(&mut self, title: &str) {
        self.info.set("Title", Object::string_literal(title));
    }

    /// Set the producer application (Info dictionary)
    pub fn set_producer(&mut self, producer: &str) {
        self.info.set("Producer", Object::string_literal(producer));
    }

    /// Set the creation date, formatted as a PDF date (e.g., "D:20250315093000")
    pub fn set_creation_date(&mut self, pdf_date: &str) {
        self.info.set("CreationDate", Object::string_literal(pdf_date));
    }

    /// Append a page
    ///
    /// # Returns
    /// New page number (1-indexed)
    pub fn add_page(&mut self, page: &Page) -> Result<usize> {
        let height = self.size.height;
        let mut content: Vec<u8> = Vec::new();
        let mut used_fonts: BTreeSet<StandardFont> = BTreeSet::new();
        let mut used_images: BTreeMap<String, ObjectId> = BTreeMap::new();

        for op in page.ops() {
            match op {
                DrawOp::Text(text) => {
                    if text.text.is_empty() {
                        continue;
                    }
                    used_fonts.insert(text.font);
                    let ctx = TextRenderContext {
                        font_name: text.font.resource_name().to_string(),
                        font_size: text.size,
                        text_width: text.width(),
                        color: text.color,
                    };
                    let hex = text.font.encode_text_hex(&text.text);
                    content.extend(generate_text_operators(
                        &hex,
                        text.x,
                        height - text.y,
                        text.align,
                        &ctx,
                    ));
                }
                DrawOp::Rect { rect, stroke, fill } => {
                    content.extend(rect_operators(
                        rect.x,
                        height - rect.bottom(),
                        rect.width,
                        rect.height,
                        stroke.as_ref(),
                        *fill,
                    ));
                }
                DrawOp::Line { from, to, stroke } => {
                    content.extend(line_operators(
                        from.x,
                        height - from.y,
                        to.x,
                        height - to.y,
                        stroke,
                    ));
                }
                DrawOp::Image { rect, image } => {
                    let (name, object_id) = self.get_or_create_image_ref(image)?;
                    content.extend(generate_image_operators(
                        &name,
                        rect.x,
                        height - rect.bottom(),
                        rect.width,
                        rect.height,
                    ));
                    used_images.insert(name, object_id);
                }
            }
        }

        let mut font_dict = Dictionary::new();
        for font in used_fonts {
            let font_id = self.get_or_create_font(font);
            font_dict.set(font.resource_name(), Object::Reference(font_id));
        }

        let mut xobject_dict = Dictionary::new();
        for (name, object_id) in used_images {
            xobject_dict.set(name.as_bytes(), Object::Reference(object_id));
        }

        let mut resources = Dictionary::new();
        if !font_dict.is_empty() {
            resources.set("Font", Object::Dictionary(font_dict));
        }
        if !xobject_dict.is_empty() {
            resources.set("XObject", Object::Dictionary(xobject_dict));
        }

        let contents_id = self.inner.add_object(compressed_stream(&content)?);
        let page_id = self.inner.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Resources" => resources,
            "Contents" => contents_id,
        });
        self.page_ids.push(page_id);

        Ok(self.page_ids.len())
    }

    /// Save the document to a file
    ///
    /// # Arguments
    /// * `path` - Output file path
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.finalize_page_tree();

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    /// Write the page tree and the Info dictionary
    fn finalize_page_tree(&mut self) {
        let kids: Vec<Object> = self
            .page_ids
            .iter()
            .map(|id| Object::Reference(*id))
            .collect();

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(self.size.width as f32),
                Object::Real(self.size.height as f32),
            ],
        };
        self.inner
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        if !self.info.is_empty() {
            let info_id = match self.inner.trailer.get(b"Info").and_then(Object::as_reference) {
                Ok(id) => id,
                Err(_) => self.inner.new_object_id(),
            };
            self.inner
                .objects
                .insert(info_id, Object::Dictionary(self.info.clone()));
            self.inner.trailer.set("Info", info_id);
        }
    }

    fn get_or_create_font(&mut self, font: StandardFont) -> ObjectId {
        if let Some(id) = self.font_ids.get(&font) {
            return *id;
        }
        let id = self.inner.add_object(font.to_pdf_dict());
        self.font_ids.insert(font, id);
        id
    }

    /// Get or create an image reference
    ///
    /// Images are deduplicated by a hash of their pixels, so a code image
    /// repeated across pages is embedded once.
    fn get_or_create_image_ref(&mut self, image: &GrayImage) -> Result<(String, ObjectId)> {
        let mut hasher = DefaultHasher::new();
        image.dimensions().hash(&mut hasher);
        image.as_raw().hash(&mut hasher);
        let data_hash = hasher.finish();

        if let Some(object_id) = self.embedded_images.get(&data_hash) {
            let name = self
                .image_names
                .get(object_id)
                .cloned()
                .ok_or_else(|| PdfError::ImageError("Image resource name missing".to_string()))?;
            return Ok((name, *object_id));
        }

        let xobject = ImageXObject::from_gray(image)?;
        let object_id = self.inner.add_object(xobject.to_pdf_stream());
        let name = format!("Im{}", self.next_image_resource);
        self.next_image_resource += 1;

        self.embedded_images.insert(data_hash, object_id);
        self.image_names.insert(object_id, name.clone());

        Ok((name, object_id))
    }

    /// Get reference to the underlying lopdf Document
    pub fn inner(&self) -> &Document {
        &self.inner
    }
}

/// Flate-compress a content stream
fn compressed_stream(content: &[u8]) -> Result<Stream> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(content)?;
    let data = encoder.finish()?;

    let dict = dictionary! {
        "Filter" => "FlateDecode",
    };
    Ok(Stream::new(dict, data).with_compression(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Rect, Stroke, TextOp};
    use image::Luma;
    use std::sync::Arc;

    fn sample_page() -> Page {
        let mut page = Page::new();
        page.push_text(TextOp::new(
            "HALL TICKET",
            297.0,
            60.0,
            StandardFont::HelveticaBold,
            16.0,
        ));
        page.push_rect(
            Rect::new(18.0, 18.0, 559.0, 805.0),
            Some(Stroke::solid(1.0)),
            None,
        );
        page
    }

    #[test]
    fn test_page_size_validation() {
        assert!(PageSize::new(100.0, 200.0).is_ok());
        assert!(PageSize::new(0.0, 200.0).is_err());
        assert!(PageSize::new(f64::NAN, 200.0).is_err());
    }

    #[test]
    fn test_add_page_numbers() {
        let mut doc = PdfDocument::new(PageSize::A4);
        assert_eq!(doc.page_count(), 0);
        assert_eq!(doc.add_page(&sample_page()).unwrap(), 1);
        assert_eq!(doc.add_page(&Page::new()).unwrap(), 2);
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn test_to_bytes_is_deterministic() {
        let build = || {
            let mut doc = PdfDocument::new(PageSize::A4);
            doc.set_title("Hall Ticket");
            doc.set_creation_date("D:20250101090000");
            doc.add_page(&sample_page()).unwrap();
            doc.to_bytes().unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_images_are_deduplicated() {
        let image = Arc::new(GrayImage::from_pixel(8, 8, Luma([0u8])));
        let mut page = Page::new();
        page.push_image(Rect::new(10.0, 10.0, 50.0, 50.0), image.clone());
        page.push_image(Rect::new(100.0, 10.0, 50.0, 50.0), image.clone());

        let mut doc = PdfDocument::new(PageSize::A4);
        doc.add_page(&page).unwrap();
        doc.add_page(&page).unwrap();

        assert_eq!(doc.embedded_images.len(), 1);
    }
}
