mod styles;
mod table;

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::Error;
use crate::sheet::SheetRow;

pub(super) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CT_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const OFFICE_DOC_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const STYLES_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Landscape US Letter, 0.75in margins: wide enough for the 9.32in table.
const PAGE_WIDTH_TWIPS: u32 = 15840;
const PAGE_HEIGHT_TWIPS: u32 = 12240;
const PAGE_MARGIN_TWIPS: u32 = 1080;

pub(super) fn inches_to_twips(inches: f32) -> u32 {
    (inches * 1440.0).round() as u32
}

/// Escape text for element content and attribute values. Characters XML 1.0
/// cannot carry at all are dropped.
pub(super) fn escape_xml(text: &str) -> String {
    let storable: String = text
        .chars()
        .filter(|&c| match c {
            '\t' | '\n' | '\r' => true,
            '\u{FFFE}' | '\u{FFFF}' => false,
            c => c >= ' ',
        })
        .collect();
    quick_xml::escape::escape(&storable).into_owned()
}

fn content_types_xml() -> String {
    format!(
        r#"{XML_DECL}<Types xmlns="{CT_NS}"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#
    )
}

fn relationships_xml(rel_type: &str, target: &str) -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{REL_NS}"><Relationship Id="rId1" Type="{rel_type}" Target="{target}"/></Relationships>"#
    )
}

fn document_xml(rows: &[SheetRow]) -> String {
    format!(
        r#"{XML_DECL}<w:document xmlns:w="{WML_NS}"><w:body>{table}<w:p/><w:sectPr><w:pgSz w:w="{PAGE_WIDTH_TWIPS}" w:h="{PAGE_HEIGHT_TWIPS}" w:orient="landscape"/><w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr></w:body></w:document>"#,
        table = table::table_xml(rows),
        m = PAGE_MARGIN_TWIPS,
    )
}

/// Package the response sheet as a WordprocessingML document.
pub(crate) fn render(rows: &[SheetRow]) -> Result<Vec<u8>, Error> {
    let parts = [
        ("[Content_Types].xml", content_types_xml()),
        ("_rels/.rels", relationships_xml(OFFICE_DOC_REL, "word/document.xml")),
        (
            "word/_rels/document.xml.rels",
            relationships_xml(STYLES_REL, "styles.xml"),
        ),
        ("word/styles.xml", styles::styles_xml()),
        ("word/document.xml", document_xml(rows)),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, xml) in parts {
        zip.start_file(name, SimpleFileOptions::default())?;
        zip.write_all(xml.as_bytes())?;
    }
    Ok(zip.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_and_drops_control_chars() {
        assert_eq!(
            escape_xml("a<b> & \"c\" 'd'\u{0007}"),
            "a&lt;b&gt; &amp; &quot;c&quot; &apos;d&apos;"
        );
    }

    #[test]
    fn column_widths_in_twips() {
        assert_eq!(inches_to_twips(0.32), 461);
        assert_eq!(inches_to_twips(4.5), 6480);
    }

    #[test]
    fn package_parts_are_present() {
        let bytes = render(&[]).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "word/document.xml",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing {name}");
        }
    }
}
