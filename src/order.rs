use std::cmp::Ordering;
use std::num::NonZeroUsize;

use crate::model::{Page, Position, ResolvedAnnotation};

pub const DEFAULT_COLUMNS: NonZeroUsize = match NonZeroUsize::new(2) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Reading order for multi-column pages: page, then column (left to right),
/// then top to bottom. Columns are equal-width slices of the mediabox.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadingOrder {
    columns: NonZeroUsize,
}

impl Default for ReadingOrder {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS)
    }
}

impl ReadingOrder {
    pub fn new(columns: NonZeroUsize) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> usize {
        self.columns.get()
    }

    /// Column index of a position, after clamping it into its page.
    pub fn column_of(&self, pos: &Position) -> usize {
        let mb = pos.mediabox;
        let width = mb.width();
        if width <= 0.0 {
            return 0;
        }
        let x = pos.x.clamp(mb.x0, mb.x1);
        let col_width = width / self.columns() as f32;
        let col = ((x - mb.x0) / col_width).floor() as usize;
        col.min(self.columns() - 1)
    }

    pub fn compare(&self, a: &Position, b: &Position) -> Ordering {
        a.page.cmp(&b.page).then_with(|| {
            let ay = a.y.clamp(a.mediabox.y0, a.mediabox.y1);
            let by = b.y.clamp(b.mediabox.y0, b.mediabox.y1);
            self.column_of(a)
                .cmp(&self.column_of(b))
                .then_with(|| by.total_cmp(&ay))
        })
    }

    /// Stable sort of a page's annotations into reading order.
    pub fn sort_page(&self, page: &mut Page) {
        let annots = std::mem::take(&mut page.annotations);
        let mut keyed: Vec<_> = annots
            .into_iter()
            .map(|a| (page.position_of(&a), a))
            .collect();
        keyed.sort_by(|x, y| self.compare(&x.0, &y.0));
        page.annotations = keyed.into_iter().map(|(_, a)| a).collect();
    }

    /// Stable sort of a whole document's records.
    pub fn sort_resolved(&self, annots: &mut [ResolvedAnnotation]) {
        annots.sort_by(|a, b| self.compare(&a.position, &b.position));
    }
}
