//! Response sheet: the numbered table a reviewer's comments are answered in.

mod csv_export;
mod markdown;

use std::fmt;

use crate::error::Error;
use crate::model::ResolvedAnnotation;
use crate::text::capitalize;

/// Column titles of the sheet's first row.
pub const HEADER: [&str; 3] = ["", "Editor/Reviewer Comments", "Response"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Format {
    Docx,
    Md,
    Csv,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Docx => "docx",
            Format::Md => "md",
            Format::Csv => "csv",
        }
    }

    pub fn render(self, rows: &[SheetRow]) -> Result<Vec<u8>, Error> {
        match self {
            Format::Docx => crate::docx::render(rows),
            Format::Md => Ok(markdown::render(rows).into_bytes()),
            Format::Csv => csv_export::render(rows),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetRow {
    /// Section heading spanning the comment and response columns.
    Heading(String),
    Item {
        label: String,
        text: String,
        comment: String,
    },
}

/// Number the annotations. An underline opens a section: its comment (or,
/// without one, its text) prefixes the labels of the rows that follow, and
/// numbering restarts at 1.
pub fn build_rows(annots: &[ResolvedAnnotation]) -> Vec<SheetRow> {
    let mut section = String::new();
    let mut counter = 1;
    let mut rows = Vec::with_capacity(annots.len());
    for annot in annots {
        if annot.kind.is_section_marker() {
            rows.push(SheetRow::Heading(format!(
                "{} comments",
                capitalize(&annot.text)
            )));
            section = match annot.comment.as_deref() {
                Some(comment) => comment.to_string(),
                None => annot.text.clone(),
            };
            counter = 1;
            continue;
        }
        let label = if section.is_empty() {
            counter.to_string()
        } else {
            format!("{section}.{counter}")
        };
        rows.push(SheetRow::Item {
            label,
            text: annot.display_text().to_string(),
            comment: annot.comment_or_empty().to_string(),
        });
        counter += 1;
    }
    rows
}
