use super::{HEADER, SheetRow};
use crate::error::Error;

/// Every field quoted; headings go in the comment column, marked up bold.
pub(super) fn render(rows: &[SheetRow]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for row in rows {
        match row {
            SheetRow::Heading(title) => {
                let title = format!("**{title}**");
                writer.write_record(["", title.as_str(), ""])?;
            }
            SheetRow::Item {
                label,
                text,
                comment,
            } => writer.write_record([label, text, comment])?,
        }
    }
    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}
