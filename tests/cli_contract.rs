mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

use common::{FontQuirk, Markup, PageFixture, TextLine, write_pdf, write_pdf_with_font};

fn sample_page() -> PageFixture {
    let line = TextLine::new(72.0, 700.0, "needs a citation");
    PageFixture::new(
        vec![line.clone()],
        vec![Markup::highlight(&[line.quad_of("citation")]).comment("which one?")],
    )
}

fn sample(dir: &std::path::Path, name: &str) -> std::path::PathBuf {
    write_pdf(dir, name, &[sample_page()])
}

#[test]
fn writes_each_requested_format_next_to_the_input() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let input = sample(temp.path(), "paper.pdf");

    cargo_bin_cmd!("reviewsheet")
        .arg(&input)
        .args(["-f", "md", "-f", "csv"])
        .assert()
        .success();

    let md = std::fs::read_to_string(temp.path().join("paper.md")).expect("markdown output");
    assert!(md.contains("| 1 | citation | which one? |"));
    assert!(temp.path().join("paper.csv").exists());
    assert!(!temp.path().join("paper.docx").exists());
}

#[test]
fn docx_is_the_default_format() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let input = sample(temp.path(), "paper.pdf");

    cargo_bin_cmd!("reviewsheet").arg(&input).assert().success();

    assert!(temp.path().join("paper.docx").exists());
}

#[test]
fn list_prints_annotations() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let input = sample(temp.path(), "paper.pdf");
    let output = temp.path().join("out.md");

    cargo_bin_cmd!("reviewsheet")
        .arg(&input)
        .args(["--list", "-f", "md", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("p1 Highlight: citation | which one?"));

    assert!(output.exists());
}

#[test]
fn failing_input_does_not_stop_the_batch() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let good = sample(temp.path(), "good.pdf");
    let missing = temp.path().join("missing.pdf");

    cargo_bin_cmd!("reviewsheet")
        .arg(&missing)
        .arg(&good)
        .args(["-f", "md"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error:").and(predicate::str::contains("missing.pdf")));

    assert!(temp.path().join("good.md").exists());
}

#[test]
fn out_of_range_font_metrics_do_not_stop_the_batch() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let odd = write_pdf_with_font(
        temp.path(),
        "odd.pdf",
        &[sample_page()],
        FontQuirk::FirstCharOutOfRange,
    );
    let good = sample(temp.path(), "good.pdf");

    cargo_bin_cmd!("reviewsheet")
        .arg(&odd)
        .arg(&good)
        .args(["-f", "md"])
        .assert()
        .success();

    let md = std::fs::read_to_string(temp.path().join("odd.md")).expect("markdown output");
    assert!(md.contains("| 1 | citation | which one? |"));
    assert!(temp.path().join("good.md").exists());
}

#[test]
fn output_path_needs_a_single_input_and_format() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let input = sample(temp.path(), "paper.pdf");

    cargo_bin_cmd!("reviewsheet")
        .arg(&input)
        .args(["-f", "md", "-f", "csv", "-o"])
        .arg(temp.path().join("sheet"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}

#[test]
fn zero_columns_is_rejected() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let input = sample(temp.path(), "paper.pdf");

    cargo_bin_cmd!("reviewsheet")
        .arg(&input)
        .args(["--cols", "0"])
        .assert()
        .failure();
}
