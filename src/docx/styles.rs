use super::{WML_NS, XML_DECL};

/// Body text size in half-points.
const FONT_SIZE_HALF_PTS: u32 = 22;
const FONT_NAME: &str = "Calibri";

/// Single 4/8pt border on every edge and inner line.
fn grid_borders() -> String {
    ["top", "left", "bottom", "right", "insideH", "insideV"]
        .iter()
        .map(|edge| {
            format!(r#"<w:{edge} w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#)
        })
        .collect()
}

/// Document defaults plus the `Normal`, `TableNormal` and `TableGrid` styles
/// the sheet refers to.
pub(super) fn styles_xml() -> String {
    format!(
        concat!(
            r#"{decl}<w:styles xmlns:w="{ns}">"#,
            r#"<w:docDefaults><w:rPrDefault><w:rPr>"#,
            r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:eastAsia="{font}" w:cs="{font}"/>"#,
            r#"<w:sz w:val="{size}"/><w:szCs w:val="{size}"/><w:lang w:val="en-US"/>"#,
            r#"</w:rPr></w:rPrDefault><w:pPrDefault><w:pPr>"#,
            r#"<w:spacing w:after="0" w:line="240" w:lineRule="auto"/>"#,
            r#"</w:pPr></w:pPrDefault></w:docDefaults>"#,
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
            r#"<w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/><w:uiPriority w:val="99"/><w:semiHidden/><w:tblPr><w:tblInd w:w="0" w:type="dxa"/>"#,
            r#"<w:tblCellMar><w:top w:w="0" w:type="dxa"/><w:left w:w="108" w:type="dxa"/><w:bottom w:w="0" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar></w:tblPr></w:style>"#,
            r#"<w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/><w:basedOn w:val="TableNormal"/><w:uiPriority w:val="59"/>"#,
            r#"<w:tblPr><w:tblBorders>{borders}</w:tblBorders></w:tblPr></w:style>"#,
            r#"</w:styles>"#,
        ),
        decl = XML_DECL,
        ns = WML_NS,
        font = FONT_NAME,
        size = FONT_SIZE_HALF_PTS,
        borders = grid_borders(),
    )
}
