mod common;

use std::num::NonZeroUsize;

use common::{Markup, PageFixture, TextLine, build_pdf};
use reviewsheet::model::MISSING_TEXT;
use reviewsheet::{AnnotationKind, Error, ExtractOptions, extract_annotations_from_bytes};

fn extract(pages: &[PageFixture]) -> Result<Vec<reviewsheet::ResolvedAnnotation>, Error> {
    extract_annotations_from_bytes(&build_pdf(pages), &ExtractOptions::default())
}

fn columns(n: usize) -> ExtractOptions {
    ExtractOptions {
        columns_per_page: NonZeroUsize::new(n).unwrap(),
    }
}

#[test]
fn highlight_captures_covered_word() {
    let line = TextLine::new(72.0, 700.0, "xx abc yy");
    let annots = extract(&[PageFixture::new(
        vec![line.clone()],
        vec![Markup::highlight(&[line.quad_of("abc")]).comment("typo?")],
    )])
    .unwrap();
    assert_eq!(annots.len(), 1);
    assert_eq!(annots[0].kind, AnnotationKind::Highlight);
    assert_eq!(annots[0].text, "abc");
    assert_eq!(annots[0].comment.as_deref(), Some("typo?"));
    assert_eq!(annots[0].page, 1);
}

#[test]
fn hyphenated_words_are_rejoined_across_lines() {
    let first = TextLine::new(72.0, 700.0, "the foo-");
    let second = TextLine::new(72.0, 686.0, "bar baz");
    let annots = extract(&[PageFixture::new(
        vec![first.clone(), second.clone()],
        vec![Markup::highlight(&[first.quad_of("foo-"), second.quad_of("bar")])],
    )])
    .unwrap();
    assert_eq!(annots[0].text, "foobar");
}

#[test]
fn sixteen_quad_coordinates_make_two_regions() {
    let first = TextLine::new(72.0, 700.0, "abc");
    let second = TextLine::new(72.0, 600.0, "def");
    let annots = extract(&[PageFixture::new(
        vec![first.clone(), second.clone()],
        vec![Markup::highlight(&[first.quad(0, 3), second.quad(0, 3)])],
    )])
    .unwrap();
    assert_eq!(annots[0].text, "abc def");
}

#[test]
fn quad_points_not_a_multiple_of_eight_fail_the_document() {
    let line = TextLine::new(72.0, 700.0, "abc");
    let bad = Markup::highlight(&[line.quad(0, 3)]).raw_quad_points(vec![72.0; 10]);
    let err = extract(&[PageFixture::new(vec![line], vec![bad])]).unwrap_err();
    assert!(matches!(err, Error::MalformedGeometry(_)), "{err}");
}

#[test]
fn left_column_is_read_before_right_column() {
    let left = TextLine::new(72.0, 200.0, "left low");
    let right = TextLine::new(350.0, 700.0, "right high");
    let page = PageFixture::new(
        vec![left.clone(), right.clone()],
        vec![
            Markup::highlight(&[right.quad_of("right")]),
            Markup::highlight(&[left.quad_of("left")]),
        ],
    );

    let two = extract_annotations_from_bytes(&build_pdf(&[page.clone()]), &columns(2)).unwrap();
    let texts: Vec<_> = two.iter().map(|a| a.text.as_str()).collect();
    assert_eq!(texts, ["left", "right"]);

    let one = extract_annotations_from_bytes(&build_pdf(&[page]), &columns(1)).unwrap();
    let texts: Vec<_> = one.iter().map(|a| a.text.as_str()).collect();
    assert_eq!(texts, ["right", "left"]);
}

#[test]
fn pages_come_in_document_order() {
    let a = TextLine::new(72.0, 100.0, "first page");
    let b = TextLine::new(72.0, 700.0, "second page");
    let annots = extract(&[
        PageFixture::new(vec![a.clone()], vec![Markup::highlight(&[a.quad_of("first")])]),
        PageFixture::new(vec![TextLine::new(72.0, 700.0, "nothing marked")], vec![]),
        PageFixture::new(vec![b.clone()], vec![Markup::highlight(&[b.quad_of("second")])]),
    ])
    .unwrap();
    assert_eq!(annots.len(), 2);
    assert_eq!((annots[0].page, annots[0].text.as_str()), (1, "first"));
    assert_eq!((annots[1].page, annots[1].text.as_str()), (3, "second"));
}

#[test]
fn unresolvable_and_foreign_annotations_are_skipped() {
    let line = TextLine::new(72.0, 700.0, "keep this");
    let annots = extract(&[PageFixture {
        lines: vec![line.clone()],
        annots: vec![
            Markup::new("Link", &[line.quad_of("keep")]),
            Markup::highlight(&[line.quad_of("this")]),
        ],
        dangling_annot: true,
    }])
    .unwrap();
    assert_eq!(annots.len(), 1);
    assert_eq!(annots[0].text, "this");
}

#[test]
fn sticky_note_keeps_comment_and_author() {
    let line = TextLine::new(72.0, 700.0, "some text");
    let annots = extract(&[PageFixture::new(
        vec![line],
        vec![Markup::note(300.0, 650.0, "overall:\r\nfine").author("Zoë")],
    )])
    .unwrap();
    assert_eq!(annots[0].kind, AnnotationKind::CommentMarker);
    assert_eq!(annots[0].display_text(), "");
    assert_eq!(annots[0].comment.as_deref(), Some("overall:\nfine"));
    assert_eq!(annots[0].author.as_deref(), Some("Zoë"));
}

#[test]
fn highlight_over_blank_space_shows_placeholder() {
    let line = TextLine::new(72.0, 700.0, "abc");
    let empty_area = TextLine::new(300.0, 400.0, "");
    let annots = extract(&[PageFixture::new(
        vec![line],
        vec![Markup::highlight(&[empty_area.quad(0, 5)])],
    )])
    .unwrap();
    assert_eq!(annots[0].text, "");
    assert_eq!(annots[0].display_text(), MISSING_TEXT);
}

#[test]
fn garbage_input_is_not_a_pdf() {
    let err = extract_annotations_from_bytes(b"not a pdf at all", &ExtractOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPdf(_)), "{err}");
}
