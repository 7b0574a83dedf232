mod annots;
mod content;
mod layout;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::capture::capture_page_text;
use crate::error::Error;
use crate::geometry::Rect;
use crate::model::{Page, ResolvedAnnotation};
use crate::order::ReadingOrder;

use content::{Interpreter, Matrix};

/// US Letter, used when no `/MediaBox` is found in the page tree.
const DEFAULT_MEDIABOX: Rect = Rect::new(0.0, 0.0, 612.0, 792.0);

/// Reference chains longer than this are treated as unresolvable.
const MAX_REFERENCE_HOPS: usize = 16;

pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Follow indirect references to the object they point at.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    let mut current = obj;
    for _ in 0..MAX_REFERENCE_HOPS {
        match current {
            Object::Reference(id) => current = doc.get_object(*id).ok()?,
            other => return Some(other),
        }
    }
    None
}

/// Stream payload, decompressed when the stream is filtered.
pub(crate) fn stream_bytes(stream: &Stream) -> Result<Vec<u8>, Error> {
    if stream.dict.get(b"Filter").is_ok() {
        Ok(stream.decompressed_content()?)
    } else {
        Ok(stream.content.clone())
    }
}

/// Look up a page attribute, walking up the page tree through `/Parent`.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = page_id;
    for _ in 0..MAX_REFERENCE_HOPS {
        let dict = doc.get_object(current).and_then(Object::as_dict).ok()?;
        if let Ok(value) = dict.get(key) {
            return resolve(doc, value);
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

fn mediabox(doc: &Document, page_id: ObjectId) -> Result<Rect, Error> {
    let Some(array) = inherited(doc, page_id, b"MediaBox").and_then(|o| o.as_array().ok()) else {
        return Ok(DEFAULT_MEDIABOX);
    };
    let coords: Option<Vec<f32>> = array.iter().map(|o| resolve(doc, o).and_then(number)).collect();
    match coords.as_deref() {
        Some(&[x0, y0, x1, y1]) => Rect::from_corners(x0, y0, x1, y1).check(),
        _ => {
            log::warn!("unreadable /MediaBox, assuming US Letter");
            Ok(DEFAULT_MEDIABOX)
        }
    }
}

/// Concatenated content streams of a page.
fn page_content(doc: &Document, page: &Dictionary) -> Result<Vec<u8>, Error> {
    let Some(contents) = page.get(b"Contents").ok().and_then(|o| resolve(doc, o)) else {
        return Ok(Vec::new());
    };
    match contents {
        Object::Stream(stream) => stream_bytes(stream),
        Object::Array(parts) => {
            let mut content = Vec::new();
            for part in parts {
                let stream = resolve(doc, part)
                    .and_then(|o| o.as_stream().ok())
                    .ok_or_else(|| Error::InvalidPdf("/Contents entry is not a stream".into()))?;
                if !content.is_empty() {
                    content.push(b'\n');
                }
                content.extend(stream_bytes(stream)?);
            }
            Ok(content)
        }
        _ => Err(Error::InvalidPdf("/Contents is not a stream or array".into())),
    }
}

fn page_glyphs(
    doc: &Document,
    interp: &mut Interpreter,
    page_id: ObjectId,
    page: &Dictionary,
) -> Result<Vec<crate::model::Glyph>, Error> {
    let content = page_content(doc, page)?;
    let resources = inherited(doc, page_id, b"Resources").and_then(|o| o.as_dict().ok());
    let result = interp.run(&content, resources, Matrix::IDENTITY);
    let glyphs = interp.take_glyphs();
    result.map(|()| glyphs)
}

/// Extract every reviewer annotation of a PDF, with its associated text,
/// in reading order.
pub(crate) fn extract(bytes: &[u8], order: &ReadingOrder) -> Result<Vec<ResolvedAnnotation>, Error> {
    let doc = Document::load_mem(bytes)?;
    if doc.trailer.get(b"Encrypt").is_ok() {
        return Err(Error::InvalidPdf("encrypted PDFs are not supported".into()));
    }

    let mut interp = Interpreter::new(&doc);
    let mut resolved = Vec::new();
    for (index, (page_no, page_id)) in doc.get_pages().into_iter().enumerate() {
        let page_dict = doc.get_object(page_id).and_then(Object::as_dict)?;
        let annotations = annots::load_page_annotations(&doc, page_dict)?;
        if annotations.is_empty() {
            continue;
        }
        let mediabox = mediabox(&doc, page_id)?;
        let mut page = Page {
            annotations,
            ..Page::new(index, mediabox)
        };
        order.sort_page(&mut page);

        if page.annotations.iter().any(|a| !a.regions().is_empty()) {
            let glyphs = page_glyphs(&doc, &mut interp, page_id, page_dict).unwrap_or_else(|e| {
                log::warn!("page {page_no}: cannot read page text: {e}");
                Vec::new()
            });
            log::debug!("page {page_no}: {} glyphs", glyphs.len());
            let tree = layout::analyze(mediabox, glyphs);
            capture_page_text(&mut page.annotations, &tree);
        }
        log::debug!("page {page_no}: {} annotations", page.annotations.len());
        resolved.extend(page.resolve());
    }
    order.sort_resolved(&mut resolved);
    Ok(resolved)
}
