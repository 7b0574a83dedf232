use crate::sheet::{HEADER, SheetRow};

use super::{escape_xml, inches_to_twips};

/// Label, comment and response columns.
const COLUMN_INCHES: [f32; 3] = [0.32, 4.5, 4.5];

/// Section headings are set on a solid black band.
const HEADING_SHADING: &str = r#"<w:shd w:val="clear" w:color="auto" w:fill="000000"/>"#;

/// One `w:p` per line of text; an empty cell still needs one paragraph.
fn paragraphs(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                "<w:p/>".to_string()
            } else {
                format!(
                    r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                    escape_xml(line)
                )
            }
        })
        .collect()
}

struct Cell<'a> {
    text: &'a str,
    width: u32,
    span: u32,
    shaded: bool,
}

impl<'a> Cell<'a> {
    fn new(column: usize, text: &'a str) -> Self {
        Self {
            text,
            width: inches_to_twips(COLUMN_INCHES[column]),
            span: 1,
            shaded: false,
        }
    }

    fn to_xml(&self) -> String {
        let mut props = format!(r#"<w:tcW w:w="{}" w:type="dxa"/>"#, self.width);
        if self.span > 1 {
            props.push_str(&format!(r#"<w:gridSpan w:val="{}"/>"#, self.span));
        }
        if self.shaded {
            props.push_str(HEADING_SHADING);
        }
        format!("<w:tc><w:tcPr>{props}</w:tcPr>{}</w:tc>", paragraphs(self.text))
    }
}

fn row_xml(cells: &[Cell]) -> String {
    let cells: String = cells.iter().map(Cell::to_xml).collect();
    format!("<w:tr>{cells}</w:tr>")
}

fn heading_row(title: &str) -> String {
    let marker = Cell {
        shaded: true,
        ..Cell::new(0, "")
    };
    let merged = Cell {
        width: inches_to_twips(COLUMN_INCHES[1]) + inches_to_twips(COLUMN_INCHES[2]),
        span: 2,
        shaded: true,
        ..Cell::new(1, title)
    };
    row_xml(&[marker, merged])
}

/// The whole sheet as a single bordered table.
pub(super) fn table_xml(rows: &[SheetRow]) -> String {
    let widths: Vec<u32> = COLUMN_INCHES.iter().map(|&w| inches_to_twips(w)).collect();
    let total: u32 = widths.iter().sum();
    let grid: String = widths
        .iter()
        .map(|w| format!(r#"<w:gridCol w:w="{w}"/>"#))
        .collect();

    let mut xml = format!(
        r#"<w:tbl><w:tblPr><w:tblStyle w:val="TableGrid"/><w:tblW w:w="{total}" w:type="dxa"/><w:tblLayout w:type="fixed"/><w:tblLook w:val="04A0" w:firstRow="1" w:lastRow="0" w:firstColumn="1" w:lastColumn="0" w:noHBand="0" w:noVBand="1"/></w:tblPr><w:tblGrid>{grid}</w:tblGrid>"#
    );
    let header: Vec<Cell> = HEADER
        .iter()
        .enumerate()
        .map(|(i, text)| Cell::new(i, text))
        .collect();
    xml.push_str(&row_xml(&header));

    for row in rows {
        let tr = match row {
            SheetRow::Heading(title) => heading_row(title),
            SheetRow::Item {
                label,
                text,
                comment,
            } => row_xml(&[Cell::new(0, label), Cell::new(1, text), Cell::new(2, comment)]),
        };
        xml.push_str(&tr);
    }
    xml.push_str("</w:tbl>");
    xml
}
