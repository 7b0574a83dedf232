#![allow(dead_code)]

use std::path::{Path, PathBuf};

use miniz_oxide::deflate::compress_to_vec_zlib;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

/// Courier at 10pt: every glyph advances 6pt.
pub const GLYPH_WIDTH: f32 = 6.0;
pub const FONT_SIZE: f32 = 10.0;

/// One line of text drawn with its baseline at `(x, y)`.
#[derive(Clone, Debug)]
pub struct TextLine {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

impl TextLine {
    pub fn new(x: f32, y: f32, text: &str) -> Self {
        Self {
            x,
            y,
            text: text.to_string(),
        }
    }

    /// Quad covering characters `from..to` of this line, baseline-3 to
    /// baseline+10, corners in the usual upper-left, upper-right,
    /// lower-left, lower-right order.
    pub fn quad(&self, from: usize, to: usize) -> [f32; 8] {
        let x0 = self.x + GLYPH_WIDTH * from as f32;
        let x1 = self.x + GLYPH_WIDTH * to as f32;
        let (y0, y1) = (self.y - 3.0, self.y + 10.0);
        [x0, y1, x1, y1, x0, y0, x1, y0]
    }

    /// Quad covering the first occurrence of `word`.
    pub fn quad_of(&self, word: &str) -> [f32; 8] {
        let from = self.text.find(word).expect("word on line");
        self.quad(from, from + word.len())
    }
}

#[derive(Clone, Debug)]
pub struct Markup {
    pub subtype: &'static str,
    pub quad_points: Vec<f32>,
    pub rect: Option<[f32; 4]>,
    pub contents: Option<String>,
    pub author: Option<String>,
}

impl Markup {
    pub fn new(subtype: &'static str, quads: &[[f32; 8]]) -> Self {
        let quad_points: Vec<f32> = quads.iter().flatten().copied().collect();
        let rect = bounding_rect(&quad_points);
        Self {
            subtype,
            quad_points,
            rect,
            contents: None,
            author: None,
        }
    }

    pub fn highlight(quads: &[[f32; 8]]) -> Self {
        Self::new("Highlight", quads)
    }

    pub fn underline(quads: &[[f32; 8]]) -> Self {
        Self::new("Underline", quads)
    }

    /// Sticky note with its icon at `(x, y)`.
    pub fn note(x: f32, y: f32, comment: &str) -> Self {
        Self {
            subtype: "Text",
            quad_points: Vec::new(),
            rect: Some([x, y - 20.0, x + 20.0, y]),
            contents: Some(comment.to_string()),
            author: None,
        }
    }

    pub fn comment(mut self, text: &str) -> Self {
        self.contents = Some(text.to_string());
        self
    }

    pub fn author(mut self, name: &str) -> Self {
        self.author = Some(name.to_string());
        self
    }

    pub fn raw_quad_points(mut self, coords: Vec<f32>) -> Self {
        self.quad_points = coords;
        self
    }
}

fn bounding_rect(coords: &[f32]) -> Option<[f32; 4]> {
    if coords.is_empty() {
        return None;
    }
    let xs = || coords.iter().step_by(2).copied();
    let ys = || coords.iter().skip(1).step_by(2).copied();
    Some([
        xs().fold(f32::MAX, f32::min),
        ys().fold(f32::MAX, f32::min),
        xs().fold(f32::MIN, f32::max),
        ys().fold(f32::MIN, f32::max),
    ])
}

#[derive(Clone, Debug, Default)]
pub struct PageFixture {
    pub lines: Vec<TextLine>,
    pub annots: Vec<Markup>,
    /// Also list an annotation reference that points at no object.
    pub dangling_annot: bool,
}

/// Font dictionary quirks a fixture can carry.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum FontQuirk {
    #[default]
    None,
    /// `/FirstChar` beyond the 32-bit code space, with a `/Widths` array.
    FirstCharOutOfRange,
}

impl PageFixture {
    pub fn new(lines: Vec<TextLine>, annots: Vec<Markup>) -> Self {
        Self {
            lines,
            annots,
            dangling_annot: false,
        }
    }
}

/// Build a US Letter PDF using Courier, one compressed content stream per
/// page.
pub fn build_pdf(pages: &[PageFixture]) -> Vec<u8> {
    build_pdf_with_font(pages, FontQuirk::None)
}

pub fn build_pdf_with_font(pages: &[PageFixture], quirk: FontQuirk) -> Vec<u8> {
    let _ = env_logger::try_init();

    let mut next = 1;
    let mut alloc = || {
        let r = Ref::new(next);
        next += 1;
        r
    };
    let catalog_id = alloc();
    let tree_id = alloc();
    let font_id = alloc();
    let page_ids: Vec<Ref> = pages.iter().map(|_| alloc()).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);
    let mut font = pdf.type1_font(font_id);
    font.base_font(Name(b"Courier"));
    if quirk == FontQuirk::FirstCharOutOfRange {
        font.pair(Name(b"FirstChar"), 4_294_967_295.0_f32);
        font.widths([600.0, 600.0]);
    }
    font.finish();

    for (fixture, &page_id) in pages.iter().zip(&page_ids) {
        let content_id = alloc();
        let mut annot_ids: Vec<Ref> = fixture.annots.iter().map(|_| alloc()).collect();
        if fixture.dangling_annot {
            annot_ids.insert(0, alloc());
        }

        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, 612.0, 792.0));
        page.parent(tree_id);
        page.contents(content_id);
        page.resources().fonts().pair(Name(b"F1"), font_id);
        if !annot_ids.is_empty() {
            page.annotations(annot_ids.iter().copied());
        }
        page.finish();

        let mut content = Content::new();
        for line in &fixture.lines {
            content.begin_text();
            content.set_font(Name(b"F1"), FONT_SIZE);
            content.next_line(line.x, line.y);
            content.show(Str(line.text.as_bytes()));
            content.end_text();
        }
        let compressed = compress_to_vec_zlib(&content.finish(), 6);
        pdf.stream(content_id, &compressed).filter(Filter::FlateDecode);

        let written = if fixture.dangling_annot {
            &annot_ids[1..]
        } else {
            &annot_ids[..]
        };
        for (markup, &id) in fixture.annots.iter().zip(written) {
            let mut dict = pdf.indirect(id).dict();
            dict.pair(Name(b"Type"), Name(b"Annot"));
            dict.pair(Name(b"Subtype"), Name(markup.subtype.as_bytes()));
            if let Some(rect) = markup.rect {
                dict.insert(Name(b"Rect")).array().items(rect);
            }
            if !markup.quad_points.is_empty() {
                dict.insert(Name(b"QuadPoints"))
                    .array()
                    .items(markup.quad_points.iter().copied());
            }
            if let Some(contents) = &markup.contents {
                dict.pair(Name(b"Contents"), TextStr(contents));
            }
            if let Some(author) = &markup.author {
                dict.pair(Name(b"T"), TextStr(author));
            }
            dict.finish();
        }
    }

    pdf.finish()
}

/// Write a fixture into `dir` and return its path.
pub fn write_pdf(dir: &Path, name: &str, pages: &[PageFixture]) -> PathBuf {
    write_pdf_with_font(dir, name, pages, FontQuirk::None)
}

pub fn write_pdf_with_font(
    dir: &Path,
    name: &str,
    pages: &[PageFixture],
    quirk: FontQuirk,
) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_pdf_with_font(pages, quirk)).expect("write fixture");
    path
}
