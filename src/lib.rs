pub mod capture;
mod docx;
mod error;
mod fonts;
pub mod geometry;
pub mod model;
pub mod order;
mod pdf;
pub mod sheet;
mod text;

pub use error::Error;
pub use model::{AnnotationKind, ResolvedAnnotation};
pub use order::ReadingOrder;
pub use sheet::Format;

use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Equal-width text columns per page, used for reading order.
    pub columns_per_page: NonZeroUsize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            columns_per_page: order::DEFAULT_COLUMNS,
        }
    }
}

pub fn extract_annotations(
    input: &Path,
    options: &ExtractOptions,
) -> Result<Vec<ResolvedAnnotation>, Error> {
    let bytes = std::fs::read(input)?;
    extract_annotations_from_bytes(&bytes, options)
}

pub fn extract_annotations_from_bytes(
    input: &[u8],
    options: &ExtractOptions,
) -> Result<Vec<ResolvedAnnotation>, Error> {
    let t0 = Instant::now();
    let order = ReadingOrder::new(options.columns_per_page);
    let annots = pdf::extract(input, &order)?;
    log::info!(
        "Timing: extract={:.1}ms ({} annotations)",
        t0.elapsed().as_secs_f64() * 1000.0,
        annots.len(),
    );
    Ok(annots)
}

/// Render `annots`, already in reading order, and write the sheet to `output`.
pub fn write_response_sheet(
    annots: &[ResolvedAnnotation],
    format: Format,
    output: &Path,
) -> Result<(), Error> {
    let t0 = Instant::now();

    let rows = sheet::build_rows(annots);
    let bytes = format.render(&rows)?;
    let t_render = t0.elapsed();

    std::fs::write(output, &bytes).map_err(|source| Error::Output {
        path: output.to_path_buf(),
        source,
    })?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: render {}={:.1}ms, write={:.1}ms (output {} bytes)",
        format,
        t_render.as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(())
}

pub fn generate_response_sheet(
    input: &Path,
    output: &Path,
    format: Format,
    options: &ExtractOptions,
) -> Result<(), Error> {
    let annots = extract_annotations(input, options)?;
    write_response_sheet(&annots, format, output)
}
