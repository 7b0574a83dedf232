//! Text association: walks a page's layout tree once and appends every glyph
//! to the annotations whose regions cover it.

use std::collections::BTreeSet;

use crate::geometry::Rect;
use crate::model::{Annotation, Container, LayoutItem};

/// Indices into the page's annotation list.
type HitSet = BTreeSet<usize>;

pub struct TextCapture<'a> {
    annots: &'a mut [Annotation],
    /// Annotations that matched the most recent atom.
    last_hits: HitSet,
    /// Annotations that matched anything since the last line break.
    line_hits: HitSet,
}

impl<'a> TextCapture<'a> {
    pub fn new(annots: &'a mut [Annotation]) -> Self {
        Self {
            annots,
            last_hits: HitSet::new(),
            line_hits: HitSet::new(),
        }
    }

    /// Feed one page's layout tree. State is reset first so one engine can
    /// serve a page at a time.
    pub fn run(&mut self, root: &LayoutItem) {
        self.last_hits.clear();
        self.line_hits.clear();
        self.visit(root);
    }

    fn hits(&self, bbox: &Rect) -> HitSet {
        self.annots
            .iter()
            .enumerate()
            .filter(|(_, a)| a.covers(bbox))
            .map(|(i, _)| i)
            .collect()
    }

    fn test_boxes(&mut self, bbox: &Rect) -> HitSet {
        let hits = self.hits(bbox);
        self.line_hits.extend(hits.iter().copied());
        self.last_hits = hits.clone();
        hits
    }

    /// Deliver a line break to everything seen on the current line, so text
    /// continuing on the next line is joined, even when the last glyph of
    /// this line was not covered. A line end followed by a paragraph end
    /// reaches an annotation as one break: `capture_break` ignores repeats.
    fn broadcast_break(&mut self) {
        for i in std::mem::take(&mut self.line_hits) {
            self.annots[i].capture_break();
        }
    }

    fn visit(&mut self, item: &LayoutItem) {
        match item {
            LayoutItem::Container(container) => self.visit_container(container),
            LayoutItem::Glyph(glyph) => {
                for i in self.test_boxes(&glyph.bbox) {
                    self.annots[i].capture_text(&glyph.text);
                }
            }
            LayoutItem::LineBreak => self.broadcast_break(),
            LayoutItem::Space => {
                for &i in &self.last_hits {
                    self.annots[i].capture_text(" ");
                }
            }
        }
    }

    fn visit_container(&mut self, container: &Container) {
        for child in &container.children {
            self.visit(child);
        }
        if container.kind.ends_paragraph() {
            self.test_boxes(&container.bbox);
            self.broadcast_break();
        }
    }
}

/// Associate text with a page's annotations. Annotations without regions are
/// never hit.
pub fn capture_page_text(annots: &mut [Annotation], layout: &LayoutItem) {
    if annots.iter().all(|a| a.regions().is_empty()) {
        return;
    }
    TextCapture::new(annots).run(layout);
}
