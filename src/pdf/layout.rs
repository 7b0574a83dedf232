//! Groups glyphs, in content order, into lines and text boxes.

use crate::geometry::Rect;
use crate::model::{Container, ContainerKind, Glyph, LayoutItem};

/// Minimum vertical overlap, relative to the smaller glyph, for two glyphs
/// to sit on the same line.
const LINE_OVERLAP: f32 = 0.5;
/// Maximum horizontal gap between glyphs of a line, relative to the wider one.
const CHAR_MARGIN: f32 = 2.0;
/// Gap that counts as a word break, relative to the next glyph's larger side.
const WORD_MARGIN: f32 = 0.1;
/// Maximum vertical gap between lines of a box, relative to the taller line.
const LINE_MARGIN: f32 = 0.5;

fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

fn vertical_overlap(a: &Rect, b: &Rect) -> f32 {
    a.y1.min(b.y1) - a.y0.max(b.y0)
}

fn horizontal_overlap(a: &Rect, b: &Rect) -> f32 {
    a.x1.min(b.x1) - a.x0.max(b.x0)
}

fn same_line(prev: &Rect, next: &Rect) -> bool {
    let overlap = vertical_overlap(prev, next);
    overlap > 0.0
        && overlap >= LINE_OVERLAP * prev.height().min(next.height())
        && (-horizontal_overlap(prev, next)).max(0.0)
            < CHAR_MARGIN * prev.width().max(next.width())
}

fn same_box(prev: &Rect, next: &Rect) -> bool {
    horizontal_overlap(prev, next) > 0.0
        && (-vertical_overlap(prev, next)).max(0.0)
            < LINE_MARGIN * prev.height().max(next.height())
}

struct LineBuilder {
    items: Vec<LayoutItem>,
    bbox: Rect,
    last: Glyph,
}

impl LineBuilder {
    fn start(glyph: Glyph) -> Self {
        Self {
            bbox: glyph.bbox,
            items: vec![LayoutItem::Glyph(glyph.clone())],
            last: glyph,
        }
    }

    fn accepts(&self, glyph: &Glyph) -> bool {
        same_line(&self.last.bbox, &glyph.bbox)
    }

    fn push(&mut self, glyph: Glyph) {
        let margin = WORD_MARGIN * glyph.bbox.width().max(glyph.bbox.height());
        if glyph.bbox.x0 - self.last.bbox.x1 > margin
            && !is_blank(&self.last.text)
            && !is_blank(&glyph.text)
        {
            self.items.push(LayoutItem::Space);
        }
        self.bbox = self.bbox.union(&glyph.bbox);
        self.items.push(LayoutItem::Glyph(glyph.clone()));
        self.last = glyph;
    }

    fn finish(mut self) -> Container {
        self.items.push(LayoutItem::LineBreak);
        Container {
            kind: ContainerKind::Line,
            bbox: self.bbox,
            children: self.items,
        }
    }
}

fn group_lines(glyphs: Vec<Glyph>) -> Vec<Container> {
    let mut lines = Vec::new();
    let mut current: Option<LineBuilder> = None;
    for glyph in glyphs {
        match current.as_mut() {
            Some(line) if line.accepts(&glyph) => line.push(glyph),
            _ => {
                if let Some(done) = current.replace(LineBuilder::start(glyph)) {
                    lines.push(done.finish());
                }
            }
        }
    }
    lines.extend(current.map(LineBuilder::finish));
    lines
}

fn group_boxes(lines: Vec<Container>) -> Vec<Container> {
    let mut boxes: Vec<Container> = Vec::new();
    let mut last_line: Option<Rect> = None;
    for line in lines {
        let bbox = line.bbox;
        match (boxes.last_mut(), last_line) {
            (Some(tb), Some(prev)) if same_box(&prev, &bbox) => {
                tb.bbox = tb.bbox.union(&bbox);
                tb.children.push(LayoutItem::Container(line));
            }
            _ => boxes.push(Container {
                kind: ContainerKind::TextBox,
                bbox,
                children: vec![LayoutItem::Container(line)],
            }),
        }
        last_line = Some(bbox);
    }
    boxes
}

/// Page layout tree: page, text boxes, lines, then glyphs and gap markers.
pub(crate) fn analyze(mediabox: Rect, glyphs: Vec<Glyph>) -> LayoutItem {
    let lines = group_lines(glyphs);
    let boxes = group_boxes(lines);
    log::debug!("layout: {} text boxes", boxes.len());
    LayoutItem::Container(Container {
        kind: ContainerKind::Page,
        bbox: mediabox,
        children: boxes.into_iter().map(LayoutItem::Container).collect(),
    })
}
