use lopdf::{Dictionary, Document, Object};

use super::{number, resolve};
use crate::error::Error;
use crate::geometry::{Rect, regions_from_quad_points};
use crate::model::{Annotation, AnnotationKind};
use crate::text::{decode_pdf_text, normalize_line_endings, substitute};

/// Decoded text string entry (`/Contents`, `/T`) of an annotation.
fn text_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    let obj = dict.get(key).ok().and_then(|o| resolve(doc, o))?;
    match obj {
        Object::String(bytes, _) => Some(substitute(&normalize_line_endings(
            &decode_pdf_text(bytes),
        ))),
        _ => None,
    }
}

fn numbers(doc: &Document, obj: &Object, what: &str) -> Result<Vec<f32>, Error> {
    let array = resolve(doc, obj)
        .and_then(|o| o.as_array().ok())
        .ok_or_else(|| Error::MalformedGeometry(format!("{what} is not an array")))?;
    array
        .iter()
        .map(|o| {
            resolve(doc, o)
                .and_then(number)
                .ok_or_else(|| Error::MalformedGeometry(format!("{what} has a non-numeric entry")))
        })
        .collect()
}

fn rect_entry(doc: &Document, dict: &Dictionary) -> Result<Option<Rect>, Error> {
    let Ok(obj) = dict.get(b"Rect") else {
        return Ok(None);
    };
    match numbers(doc, obj, "/Rect")?.as_slice() {
        &[x0, y0, x1, y1] => Rect::from_corners(x0, y0, x1, y1).check().map(Some),
        other => Err(Error::MalformedGeometry(format!(
            "/Rect has {} entries, expected 4",
            other.len()
        ))),
    }
}

/// Build one annotation from its dictionary. `Ok(None)` for subtypes that
/// are not reviewer markup.
fn load_annotation(doc: &Document, dict: &Dictionary) -> Result<Option<Annotation>, Error> {
    let Some(subtype) = dict.get(b"Subtype").ok().and_then(|o| o.as_name().ok()) else {
        log::debug!("dropping annotation without /Subtype");
        return Ok(None);
    };
    let Some(kind) = AnnotationKind::from_subtype(subtype) else {
        log::debug!(
            "dropping annotation of kind {}",
            String::from_utf8_lossy(subtype)
        );
        return Ok(None);
    };

    let rect = rect_entry(doc, dict)?;
    let quad_points = match dict.get(b"QuadPoints") {
        Ok(obj) => Some(numbers(doc, obj, "/QuadPoints")?),
        Err(_) => None,
    };
    let regions = match quad_points {
        Some(coords) if !coords.is_empty() => regions_from_quad_points(&coords)?,
        _ if kind.marks_text() => rect.into_iter().collect(),
        _ => Vec::new(),
    };

    let annot = Annotation::new(kind, regions, rect)?
        .with_comment(text_entry(doc, dict, b"Contents"))
        .with_author(text_entry(doc, dict, b"T"));
    Ok(Some(annot))
}

/// Reviewer annotations of one page, in `/Annots` order.
pub(crate) fn load_page_annotations(
    doc: &Document,
    page: &Dictionary,
) -> Result<Vec<Annotation>, Error> {
    let Some(annots) = page.get(b"Annots").ok().and_then(|o| resolve(doc, o)) else {
        return Ok(Vec::new());
    };
    let Ok(entries) = annots.as_array() else {
        log::warn!("/Annots is not an array, ignored");
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    for entry in entries {
        let dict = match entry {
            Object::Reference(id) => match doc.get_object(*id).and_then(Object::as_dict) {
                Ok(dict) => dict,
                Err(e) => {
                    log::warn!("skipping annotation {} {} R: {e}", id.0, id.1);
                    continue;
                }
            },
            Object::Dictionary(dict) => dict,
            other => {
                log::warn!("skipping annotation entry that is not a dictionary: {other:?}");
                continue;
            }
        };
        if let Some(annot) = load_annotation(doc, dict)? {
            out.push(annot);
        }
    }
    Ok(out)
}
