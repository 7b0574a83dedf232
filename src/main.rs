use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use reviewsheet::order::DEFAULT_COLUMNS;
use reviewsheet::{Error, ExtractOptions, Format, extract_annotations, write_response_sheet};

/// Collect reviewer annotations from PDFs into a response sheet.
#[derive(Debug, Parser)]
#[command(name = "reviewsheet", version)]
struct Cli {
    /// PDF files to process
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Number of text columns per page
    #[arg(short = 'n', long = "cols", value_name = "COLS", default_value_t = DEFAULT_COLUMNS)]
    cols: NonZeroUsize,

    /// Output format; repeat for several
    #[arg(short, long = "format", value_enum, default_values_t = [Format::Docx])]
    formats: Vec<Format>,

    /// Output path (one input and one format only)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print the extracted annotations
    #[arg(short, long)]
    list: bool,
}

fn process(cli: &Cli, input: &Path, formats: &[Format], options: &ExtractOptions) -> Result<(), Error> {
    let annots = extract_annotations(input, options)?;
    if cli.list {
        for annot in &annots {
            println!("{annot}");
        }
    }
    for &format in formats {
        let output = match &cli.output {
            Some(path) => path.clone(),
            None => input.with_extension(format.extension()),
        };
        write_response_sheet(&annots, format, &output)?;
        log::info!("{} -> {}", input.display(), output.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut formats: Vec<Format> = Vec::new();
    for format in &cli.formats {
        if !formats.contains(format) {
            formats.push(*format);
        }
    }
    if cli.output.is_some() && (cli.files.len() != 1 || formats.len() != 1) {
        Cli::command()
            .error(
                ErrorKind::ArgumentConflict,
                "--output needs exactly one input file and one format",
            )
            .exit();
    }

    let options = ExtractOptions {
        columns_per_page: cli.cols,
    };
    let mut failed = false;
    for input in &cli.files {
        if let Err(e) = process(&cli, input, &formats, &options) {
            eprintln!("error: {}: {e}", input.display());
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
