use std::collections::HashMap;
use std::rc::Rc;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};

use super::{number, resolve, stream_bytes};
use crate::error::Error;
use crate::fonts::PdfFont;
use crate::geometry::Rect;
use crate::model::Glyph;

/// Form XObjects nested deeper than this are not interpreted.
const MAX_FORM_DEPTH: usize = 8;

/// Affine transform `[a b c d e f]`, applied to row vectors as in the PDF
/// reference: `[x y 1] × M`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Matrix([f32; 6]);

impl Matrix {
    pub(crate) const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(tx: f32, ty: f32) -> Matrix {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    fn from_operands(ops: &[Object]) -> Option<Matrix> {
        let v: Vec<f32> = ops.iter().map(number).collect::<Option<_>>()?;
        let m: [f32; 6] = v.try_into().ok()?;
        Some(Matrix(m))
    }

    /// `self × other`: apply `self` first, then `other`.
    pub(crate) fn mul(&self, other: &Matrix) -> Matrix {
        let [a, b, c, d, e, f] = self.0;
        let [oa, ob, oc, od, oe, of] = other.0;
        Matrix([
            a * oa + b * oc,
            a * ob + b * od,
            c * oa + d * oc,
            c * ob + d * od,
            e * oa + f * oc + oe,
            e * ob + f * od + of,
        ])
    }

    pub(crate) fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }

    /// Bounding box of a rectangle after transformation.
    fn map_rect(&self, r: &Rect) -> Rect {
        let corners = [
            self.apply(r.x0, r.y0),
            self.apply(r.x1, r.y0),
            self.apply(r.x0, r.y1),
            self.apply(r.x1, r.y1),
        ];
        let (mut x0, mut y0, mut x1, mut y1) = (f32::MAX, f32::MAX, f32::MIN, f32::MIN);
        for (x, y) in corners {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        Rect::new(x0, y0, x1, y1)
    }
}

#[derive(Clone)]
struct GraphicsState {
    ctm: Matrix,
    font: Option<Rc<PdfFont>>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    h_scale: f32,
    leading: f32,
    rise: f32,
}

impl GraphicsState {
    fn new(ctm: Matrix) -> Self {
        Self {
            ctm,
            font: None,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

/// Runs content streams and collects every shown glyph in device space.
pub(crate) struct Interpreter<'a> {
    doc: &'a Document,
    fonts: HashMap<ObjectId, Rc<PdfFont>>,
    fallback_font: Option<Rc<PdfFont>>,
    glyphs: Vec<Glyph>,
}

impl<'a> Interpreter<'a> {
    pub(crate) fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            fonts: HashMap::new(),
            fallback_font: None,
            glyphs: Vec::new(),
        }
    }

    /// Glyphs collected so far, in content order. Resets the collector but
    /// keeps the font cache for the next page.
    pub(crate) fn take_glyphs(&mut self) -> Vec<Glyph> {
        std::mem::take(&mut self.glyphs)
    }

    pub(crate) fn run(
        &mut self,
        content: &[u8],
        resources: Option<&Dictionary>,
        ctm: Matrix,
    ) -> Result<(), Error> {
        self.run_at_depth(content, resources, ctm, 0)
    }

    fn run_at_depth(
        &mut self,
        content: &[u8],
        resources: Option<&Dictionary>,
        ctm: Matrix,
        depth: usize,
    ) -> Result<(), Error> {
        let content = Content::decode(content)?;
        let mut gs = GraphicsState::new(ctm);
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut tm = Matrix::IDENTITY;
        let mut tlm = Matrix::IDENTITY;

        for op in &content.operations {
            let args = &op.operands;
            let num = |i: usize| args.get(i).and_then(number);
            match op.operator.as_str() {
                "q" => stack.push(gs.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        gs = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(args) {
                        gs.ctm = m.mul(&gs.ctm);
                    }
                }
                "BT" => {
                    tm = Matrix::IDENTITY;
                    tlm = Matrix::IDENTITY;
                }
                "ET" => {}
                "Tf" => {
                    let name = args.first().and_then(|o| o.as_name().ok());
                    if let (Some(name), Some(size)) = (name, num(1)) {
                        gs.font = Some(self.font(resources, name));
                        gs.font_size = size;
                    }
                }
                "Tc" => gs.char_spacing = num(0).unwrap_or(gs.char_spacing),
                "Tw" => gs.word_spacing = num(0).unwrap_or(gs.word_spacing),
                "Tz" => gs.h_scale = num(0).map_or(gs.h_scale, |s| s / 100.0),
                "TL" => gs.leading = num(0).unwrap_or(gs.leading),
                "Ts" => gs.rise = num(0).unwrap_or(gs.rise),
                "Td" | "TD" => {
                    if let (Some(tx), Some(ty)) = (num(0), num(1)) {
                        if op.operator == "TD" {
                            gs.leading = -ty;
                        }
                        tlm = Matrix::translate(tx, ty).mul(&tlm);
                        tm = tlm;
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(args) {
                        tlm = m;
                        tm = m;
                    }
                }
                "T*" => {
                    tlm = Matrix::translate(0.0, -gs.leading).mul(&tlm);
                    tm = tlm;
                }
                "Tj" => {
                    if let Some(bytes) = args.first().and_then(string_bytes) {
                        self.show(&gs, &mut tm, bytes);
                    }
                }
                "'" => {
                    tlm = Matrix::translate(0.0, -gs.leading).mul(&tlm);
                    tm = tlm;
                    if let Some(bytes) = args.first().and_then(string_bytes) {
                        self.show(&gs, &mut tm, bytes);
                    }
                }
                "\"" => {
                    gs.word_spacing = num(0).unwrap_or(gs.word_spacing);
                    gs.char_spacing = num(1).unwrap_or(gs.char_spacing);
                    tlm = Matrix::translate(0.0, -gs.leading).mul(&tlm);
                    tm = tlm;
                    if let Some(bytes) = args.get(2).and_then(string_bytes) {
                        self.show(&gs, &mut tm, bytes);
                    }
                }
                "TJ" => {
                    let Some(items) = args.first().and_then(|o| o.as_array().ok()) else {
                        continue;
                    };
                    for item in items {
                        if let Some(bytes) = string_bytes(item) {
                            self.show(&gs, &mut tm, bytes);
                        } else if let Some(adjust) = number(item) {
                            let tx = -adjust / 1000.0 * gs.font_size * gs.h_scale;
                            tm = Matrix::translate(tx, 0.0).mul(&tm);
                        }
                    }
                }
                "Do" => {
                    if let Some(name) = args.first().and_then(|o| o.as_name().ok()) {
                        self.run_form(resources, name, gs.ctm, depth)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn run_form(
        &mut self,
        resources: Option<&Dictionary>,
        name: &[u8],
        ctm: Matrix,
        depth: usize,
    ) -> Result<(), Error> {
        let doc = self.doc;
        let Some(stream) = resources
            .and_then(|r| lookup(doc, r, b"XObject", name))
            .and_then(|o| o.as_stream().ok())
        else {
            return Ok(());
        };
        let is_form = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            == Some(b"Form".as_slice());
        if !is_form {
            return Ok(());
        }
        if depth >= MAX_FORM_DEPTH {
            log::warn!(
                "form XObject /{} nested too deeply, skipped",
                String::from_utf8_lossy(name)
            );
            return Ok(());
        }
        let matrix = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok())
            .and_then(|a| Matrix::from_operands(a))
            .unwrap_or(Matrix::IDENTITY);
        let form_resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_dict().ok())
            .or(resources);
        let bytes = stream_bytes(stream)?;
        self.run_at_depth(&bytes, form_resources, matrix.mul(&ctm), depth + 1)
    }

    fn font(&mut self, resources: Option<&Dictionary>, name: &[u8]) -> Rc<PdfFont> {
        let doc = self.doc;
        let entry = resources.and_then(|r| {
            let fonts = r.get(b"Font").ok().and_then(|o| resolve(doc, o))?;
            fonts.as_dict().ok()?.get(name).ok()
        });
        match entry {
            Some(Object::Reference(id)) => {
                if let Some(font) = self.fonts.get(id) {
                    return Rc::clone(font);
                }
                if let Some(dict) = doc.get_object(*id).ok().and_then(|o| o.as_dict().ok()) {
                    let font = Rc::new(PdfFont::load(doc, dict));
                    self.fonts.insert(*id, Rc::clone(&font));
                    return font;
                }
            }
            Some(Object::Dictionary(dict)) => return Rc::new(PdfFont::load(doc, dict)),
            _ => {}
        }
        log::warn!(
            "font /{} not found in resources, using Helvetica metrics",
            String::from_utf8_lossy(name)
        );
        self.fallback_font()
    }

    fn fallback_font(&mut self) -> Rc<PdfFont> {
        if let Some(font) = &self.fallback_font {
            return Rc::clone(font);
        }
        let mut dict = Dictionary::new();
        dict.set("Subtype", Object::Name(b"Type1".to_vec()));
        dict.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
        let font = Rc::new(PdfFont::load(self.doc, &dict));
        self.fallback_font = Some(Rc::clone(&font));
        font
    }

    /// Emit one glyph per character code and advance the text matrix.
    fn show(&mut self, gs: &GraphicsState, tm: &mut Matrix, bytes: &[u8]) {
        let font = match &gs.font {
            Some(font) => Rc::clone(font),
            None => {
                log::warn!("text shown before any font was selected, using Helvetica metrics");
                self.fallback_font()
            }
        };
        let fs = gs.font_size;
        let th = gs.h_scale;
        let scale = font.width_scale();
        let descent = font.descent / 1000.0;
        let text_space = Matrix([fs * th, 0.0, 0.0, fs, 0.0, gs.rise]);

        for ch in font.decode(bytes) {
            let w = ch.width * scale;
            let trm = text_space.mul(tm).mul(&gs.ctm);
            let [_, _, c, d, _, _] = trm.0;
            let bbox = trm.map_rect(&Rect::new(0.0, descent, w, descent + 1.0));
            if !ch.text.is_empty() {
                self.glyphs.push(Glyph {
                    bbox,
                    text: ch.text,
                    size: (c * c + d * d).sqrt(),
                });
            }
            let word_spacing = if ch.code == 32 && font.is_single_byte() {
                gs.word_spacing
            } else {
                0.0
            };
            let tx = (w * fs + gs.char_spacing + word_spacing) * th;
            *tm = Matrix::translate(tx, 0.0).mul(tm);
        }
    }
}

fn string_bytes(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::String(bytes, _) => Some(bytes),
        _ => None,
    }
}

/// `resources[category][name]`, following references.
fn lookup<'d>(
    doc: &'d Document,
    resources: &'d Dictionary,
    category: &[u8],
    name: &[u8],
) -> Option<&'d Object> {
    let group = resources.get(category).ok().and_then(|o| resolve(doc, o))?;
    let entry = group.as_dict().ok()?.get(name).ok()?;
    resolve(doc, entry)
}
