use std::fmt;

use crate::error::Error;
use crate::geometry::{Rect, overlaps_majority};
use crate::text::{collapse_whitespace, substitute};

/// Shown instead of an empty cell when an annotation has regions but no text
/// was found under them.
pub const MISSING_TEXT: &str = "[missing text]";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    /// Sticky note (`/Text`): a comment with no marked-up text.
    CommentMarker,
    Highlight,
    Squiggly,
    StrikeOut,
    /// Plain underline, used as a section heading in the response sheet.
    Underline,
}

impl AnnotationKind {
    pub fn from_subtype(name: &[u8]) -> Option<Self> {
        match name {
            b"Text" => Some(Self::CommentMarker),
            b"Highlight" => Some(Self::Highlight),
            b"Squiggly" => Some(Self::Squiggly),
            b"StrikeOut" => Some(Self::StrikeOut),
            b"Underline" => Some(Self::Underline),
            _ => None,
        }
    }

    pub fn subtype(self) -> &'static str {
        match self {
            Self::CommentMarker => "Text",
            Self::Highlight => "Highlight",
            Self::Squiggly => "Squiggly",
            Self::StrikeOut => "StrikeOut",
            Self::Underline => "Underline",
        }
    }

    pub fn is_section_marker(self) -> bool {
        match self {
            Self::Underline => true,
            Self::CommentMarker | Self::Highlight | Self::Squiggly | Self::StrikeOut => false,
        }
    }

    /// Text-markup kinds whose `/Rect` outlines the marked text. A sticky
    /// note's `/Rect` is just its icon.
    pub fn marks_text(self) -> bool {
        match self {
            Self::CommentMarker => false,
            Self::Highlight | Self::Squiggly | Self::StrikeOut | Self::Underline => true,
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subtype())
    }
}

pub struct Annotation {
    pub kind: AnnotationKind,
    regions: Vec<Rect>,
    rect: Option<Rect>,
    pub author: Option<String>,
    pub comment: Option<String>,
    text: String,
    after_break: bool,
}

impl Annotation {
    /// `regions` are the areas matched against page text; `rect` is the
    /// annotation's bounding rectangle, used for ordering when there are no
    /// regions.
    pub fn new(kind: AnnotationKind, regions: Vec<Rect>, rect: Option<Rect>) -> Result<Self, Error> {
        for r in regions.iter().chain(rect.iter()) {
            r.check()?;
        }
        Ok(Self {
            kind,
            regions,
            rect,
            author: None,
            comment: None,
            text: String::new(),
            after_break: false,
        })
    }

    /// An empty comment counts as no comment.
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment.filter(|c| !c.is_empty());
        self
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author.filter(|a| !a.is_empty());
        self
    }

    pub fn regions(&self) -> &[Rect] {
        &self.regions
    }

    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    /// Raw capture buffer.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when any region covers the majority of `atom`.
    pub fn covers(&self, atom: &Rect) -> bool {
        self.regions.iter().any(|r| overlaps_majority(atom, r))
    }

    pub fn capture_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.text.push_str(text);
        self.after_break = false;
    }

    /// Join wrapped lines: a trailing hyphen is dropped (the word continues on
    /// the next line), otherwise one space separates the lines. Further breaks
    /// before any new text are ignored.
    pub fn capture_break(&mut self) {
        if self.after_break {
            return;
        }
        self.after_break = true;
        if self.text.ends_with('-') {
            self.text.pop();
        } else if !self.text.ends_with(' ') {
            self.text.push(' ');
        }
    }

    /// Captured text after trimming, substitutions and whitespace collapsing.
    pub fn final_text(&self) -> String {
        collapse_whitespace(&substitute(self.text.trim()))
    }
}

/// Where an annotation starts, for reading-order comparisons.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub page: usize,
    pub mediabox: Rect,
    pub x: f32,
    pub y: f32,
}

pub struct Page {
    pub index: usize,
    pub mediabox: Rect,
    pub annotations: Vec<Annotation>,
}

impl Page {
    pub fn new(index: usize, mediabox: Rect) -> Self {
        Self {
            index,
            mediabox,
            annotations: Vec::new(),
        }
    }

    /// Top-left corner of the annotation's first region, or of its bounding
    /// rectangle. Annotations without geometry start at the page's top-left.
    pub fn position_of(&self, annot: &Annotation) -> Position {
        let (x, y) = match annot.regions.first().copied().or(annot.rect) {
            Some(r) => (r.x0, r.y1),
            None => (self.mediabox.x0, self.mediabox.y1),
        };
        Position {
            page: self.index,
            mediabox: self.mediabox,
            x,
            y,
        }
    }

    pub fn resolve(self) -> Vec<ResolvedAnnotation> {
        let positions: Vec<Position> = self
            .annotations
            .iter()
            .map(|a| self.position_of(a))
            .collect();
        self.annotations
            .into_iter()
            .zip(positions)
            .map(|(a, position)| ResolvedAnnotation {
                kind: a.kind,
                text: a.final_text(),
                has_regions: !a.regions.is_empty(),
                comment: a.comment,
                author: a.author,
                page: position.page + 1,
                position,
            })
            .collect()
    }
}

/// Final, read-only view of one annotation, handed to the renderers.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedAnnotation {
    pub kind: AnnotationKind,
    pub text: String,
    pub has_regions: bool,
    pub comment: Option<String>,
    pub author: Option<String>,
    /// 1-based page number.
    pub page: usize,
    pub position: Position,
}

impl ResolvedAnnotation {
    /// Text for output: the placeholder when regions captured nothing.
    pub fn display_text(&self) -> &str {
        if self.has_regions && self.text.is_empty() {
            MISSING_TEXT
        } else {
            &self.text
        }
    }

    pub fn comment_or_empty(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }
}

impl fmt::Display for ResolvedAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{} {}: {}", self.page, self.kind, self.display_text())?;
        if let Some(ref comment) = self.comment {
            write!(f, " | {}", comment.replace('\n', " "))?;
        }
        if let Some(ref author) = self.author {
            write!(f, " ({author})")?;
        }
        Ok(())
    }
}

/// Page content as grouped by the layout pass.
#[derive(Clone, Debug, PartialEq)]
pub enum LayoutItem {
    Container(Container),
    Glyph(Glyph),
    /// Inferred word space with no geometry of its own.
    Space,
    /// End of a text line.
    LineBreak,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerKind {
    Page,
    TextBox,
    Line,
}

impl ContainerKind {
    /// Containers whose end is a paragraph break.
    pub fn ends_paragraph(self) -> bool {
        match self {
            Self::TextBox => true,
            Self::Page | Self::Line => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Container {
    pub kind: ContainerKind,
    pub bbox: Rect,
    pub children: Vec<LayoutItem>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    pub bbox: Rect,
    pub text: String,
    pub size: f32,
}
