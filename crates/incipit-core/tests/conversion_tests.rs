//! End-to-end conversion tests over in-memory documents.

mod common;

use common::{bold_run, italic_run, read_part, reference, run, summarize_body, text_runs, DocxBuilder};
use incipit_core::{
    Classification, ConversionIssue, ConversionSettings, EmphasisStyle, IncipitConverter,
    ReferenceStatus, WmlDocument,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn convert(builder: &DocxBuilder, settings: &ConversionSettings) -> (String, incipit_core::ConversionReport) {
    let result = IncipitConverter::convert(&builder.build(), settings).unwrap();
    (read_part(&result.document, "word/document.xml"), result.report)
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn document_without_references_is_returned_byte_for_byte() {
    let bytes = DocxBuilder::new()
        .paragraph(run("No citations here."))
        .build();

    let result = IncipitConverter::convert(&bytes, &ConversionSettings::default()).unwrap();

    assert_eq!(result.document, bytes);
    assert!(!result.report.is_success());
    assert_eq!(result.report.issues, vec![ConversionIssue::NoReferencesFound]);
}

#[test]
fn unpack_and_repack_without_changes_is_identical() {
    let bytes = DocxBuilder::new()
        .paragraph(format!("{}{}", run("Cited."), reference("1")))
        .note("1", "Source.")
        .build();
    let document = WmlDocument::from_bytes(&bytes).unwrap();
    assert_eq!(document.into_bytes().unwrap(), bytes);
}

#[test]
fn untouched_parts_keep_their_bytes_and_order() {
    let builder = DocxBuilder::new()
        .paragraph(format!("{}{}", run("The claim held."), reference("1")))
        .note("1", "Source.");
    let input = builder.build();
    let result = IncipitConverter::convert(&input, &ConversionSettings::default()).unwrap();

    assert_eq!(common::entry_names(&result.document), common::entry_names(&input));
    assert_eq!(read_part(&result.document, "_rels/.rels"), read_part(&input, "_rels/.rels"));
    assert_eq!(
        read_part(&result.document, "[Content_Types].xml"),
        read_part(&input, "[Content_Types].xml")
    );
}

// ============================================================================
// Reference conservation
// ============================================================================

#[test]
fn converted_references_become_anchor_and_field_pairs() {
    let builder = DocxBuilder::new()
        .paragraph(format!("{}{}", run("The first claim held."), reference("1")))
        .paragraph(format!(
            "{}{}{}{}",
            run("A second claim; another one."),
            reference("2"),
            run(" More."),
            reference("9")
        ))
        .note("1", "First source.")
        .note("2", "Second source.");

    let (document, report) = convert(&builder, &ConversionSettings::default());
    let body = summarize_body(&document);

    assert_eq!(body.references, ["9"]);
    assert_eq!(body.bookmarks, ["_Incipit0001", "_Incipit0002"]);
    assert_eq!(body.page_refs, body.bookmarks);
    assert_eq!(body.paragraphs[0], "The first claim held.The first claim0");

    assert_eq!(report.references_found, 3);
    assert_eq!(report.converted, 2);
    assert_eq!(report.dangling_ids(), ["9"]);
    assert_eq!(report.skipped_ids(), ["9"]);
    assert_eq!(report.short_ids(), ["2"]);
    assert_eq!(report.entries[1].incipit.as_deref(), Some("another one"));
    assert_eq!(report.entries[1].status, ReferenceStatus::ConvertedShort);
}

#[test]
fn page_field_markup_targets_its_bookmark() {
    let builder = DocxBuilder::new()
        .paragraph(format!("{}{}", run("Cited claim."), reference("3")))
        .note("3", "Source.");
    let (document, _) = convert(&builder, &ConversionSettings::default());

    let field = regex::Regex::new(concat!(
        r#"<w:bookmarkStart w:id="(\d+)" w:name="(_Incipit\d{4})"/><w:bookmarkEnd w:id="(\d+)"/>"#,
        r#"<w:r><w:fldChar w:fldCharType="begin" w:dirty="true"/></w:r>"#,
        r#"<w:r><w:instrText xml:space="preserve"> PAGEREF (_Incipit\d{4}) \\h </w:instrText></w:r>"#,
        r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r><w:r><w:t>0</w:t></w:r>"#,
        r#"<w:r><w:fldChar w:fldCharType="end"/></w:r>"#,
    ))
    .unwrap();
    let captures = field.captures(&document).expect("field markup not found");

    assert_eq!(&captures[1], &captures[3]);
    assert_eq!(&captures[2], "_Incipit0001");
    assert_eq!(&captures[4], &captures[2]);
}

#[test]
fn converted_notes_are_removed_and_separators_kept() {
    let builder = DocxBuilder::new()
        .paragraph(format!("{}{}{}", run("Kept claim."), reference("1"), reference("5")))
        .note("1", "Removed source.")
        .note("2", "Unreferenced source.");

    let result = IncipitConverter::convert(&builder.build(), &ConversionSettings::default()).unwrap();
    let notes = read_part(&result.document, "word/endnotes.xml");
    let doc = roxmltree::Document::parse(&notes).unwrap();
    let ids: Vec<&str> = doc
        .descendants()
        .filter(|n| n.has_tag_name((common::W_NS, "endnote")))
        .filter_map(|n| n.attribute((common::W_NS, "id")))
        .collect();

    assert_eq!(ids, ["-1", "0", "2"]);
    assert_eq!(result.report.dangling_ids(), ["5"]);
}

#[test]
fn only_dangling_references_leave_the_archive_untouched() {
    let bytes = DocxBuilder::new()
        .paragraph(format!("{}{}", run("Orphan."), reference("4")))
        .build();
    let result = IncipitConverter::convert(&bytes, &ConversionSettings::default()).unwrap();

    assert_eq!(result.document, bytes);
    assert!(!result.report.is_success());
    assert_eq!(result.report.entries[0].status, ReferenceStatus::Dangling);
}

// ============================================================================
// Heuristics end to end
// ============================================================================

#[test]
fn em_dash_aside_is_left_out_of_the_incipit() {
    let builder = DocxBuilder::new()
        .paragraph(format!(
            "{}{}",
            run("On the other \u{2014} some say disputed \u{2014} hand, the results held."),
            reference("1")
        ))
        .note("1", "Source.");

    let (document, report) = convert(&builder, &ConversionSettings::default());

    assert_eq!(report.entries[0].incipit.as_deref(), Some("On the other"));
    assert_eq!(report.entries[0].classification, Some(Classification::EmDashAdjusted));
    let runs = text_runs(&document);
    assert!(runs.contains(&("On the other".to_string(), true, false)));
    assert_eq!(runs.iter().filter(|(t, _, _)| t.contains("disputed")).count(), 1);
}

#[test]
fn short_italic_paragraph_starts_at_its_first_word() {
    let builder = DocxBuilder::new()
        .paragraph(format!("{}{}", italic_run("We see things as we are."), reference("1")))
        .note("1", "Source.");

    let (document, report) = convert(&builder, &ConversionSettings::default());

    assert_eq!(report.entries[0].incipit.as_deref(), Some("We see things"));
    assert_eq!(report.entries[0].classification, Some(Classification::Epigraph));
    assert!(text_runs(&document).contains(&("We see things".to_string(), true, false)));
}

#[test]
fn quoted_clause_does_not_restart_the_sentence() {
    let builder = DocxBuilder::new()
        .paragraph(format!(
            "{}{}{}",
            run("He said, \"It is a trap"),
            reference("1"),
            run(",\" and left.")
        ))
        .note("1", "Source.");

    let (_, report) = convert(&builder, &ConversionSettings::default());
    assert_eq!(report.entries[0].incipit.as_deref(), Some("He said, \"It"));
    assert_eq!(report.entries[0].classification, Some(Classification::SentenceStart));
}

#[test]
fn forced_italic_drops_source_bold() {
    let builder = DocxBuilder::new()
        .paragraph(format!("{}{}{}", bold_run("Call me "), run("Ishmael today."), reference("1")))
        .note("1", "Source.");
    let settings = ConversionSettings::new().with_emphasis_style(EmphasisStyle::Italic);

    let (document, _) = convert(&builder, &settings);
    let inserted: Vec<(String, bool, bool)> = text_runs(&document)
        .into_iter()
        .filter(|(text, _, _)| text == "Call me " || text == "Ishmael")
        .collect();

    assert_eq!(
        inserted,
        [("Call me ".to_string(), false, true), ("Ishmael".to_string(), false, true)]
    );
    // only the untouched source run is still bold
    assert_eq!(document.matches("<w:b/>").count(), 1);
}

#[test]
fn style_inherited_italic_is_switched_off_for_bold_incipits() {
    let builder = DocxBuilder::new()
        .styles(
            r#"<w:style w:type="character" w:styleId="Emph"><w:name w:val="Emphasis"/><w:rPr><w:i/></w:rPr></w:style>"#,
        )
        .paragraph(format!(
            r#"{}<w:r><w:rPr><w:rStyle w:val="Emph"/></w:rPr><w:t>Styled words here.</w:t></w:r>{}"#,
            run("Intro. "),
            reference("1")
        ))
        .note("1", "Source.");

    let (document, report) = convert(&builder, &ConversionSettings::default());

    assert_eq!(report.entries[0].incipit.as_deref(), Some("Styled words here"));
    assert!(document.contains(r#"<w:rStyle w:val="Emph"/><w:b/><w:i w:val="0"/>"#));
    assert!(text_runs(&document).contains(&("Styled words here".to_string(), true, false)));
}

#[test]
fn multiple_references_in_one_paragraph_use_the_original_text() {
    let builder = DocxBuilder::new()
        .paragraph(format!(
            "{}{}{}{}",
            run("First point made."),
            reference("1"),
            run(" Second point made."),
            reference("2")
        ))
        .note("1", "A.")
        .note("2", "B.");

    let (document, report) = convert(&builder, &ConversionSettings::default());
    let incipits: Vec<&str> = report
        .entries
        .iter()
        .filter_map(|e| e.incipit.as_deref())
        .collect();

    assert_eq!(incipits, ["First point made", "Second point made"]);
    assert_eq!(summarize_body(&document).bookmarks, ["_Incipit0001", "_Incipit0002"]);
}

#[test]
fn references_sharing_one_run_keep_their_positions() {
    let shared = concat!(
        r#"<w:r><w:t>Alpha beta gamma.</w:t><w:endnoteReference w:id="1"/>"#,
        r#"<w:t xml:space="preserve"> Delta epsilon zeta.</w:t><w:endnoteReference w:id="2"/></w:r>"#,
    );
    let builder = DocxBuilder::new()
        .paragraph(shared)
        .note("1", "A.")
        .note("2", "B.");

    let (document, report) = convert(&builder, &ConversionSettings::default());
    let body = summarize_body(&document);

    assert_eq!(report.converted, 2);
    assert_eq!(
        body.paragraphs[0],
        "Alpha beta gamma.Alpha beta gamma0 Delta epsilon zeta.Delta epsilon zeta0"
    );
    assert_eq!(body.bookmarks, ["_Incipit0001", "_Incipit0002"]);
    assert_eq!(body.page_refs, ["_Incipit0001", "_Incipit0002"]);
    assert!(body.references.is_empty());
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn manual_text_replaces_extraction() {
    let builder = DocxBuilder::new()
        .paragraph(format!("{}{}", run("Automatic words appear here."), reference("1")))
        .paragraph(format!("{}{}", run("Other words appear here."), reference("2")))
        .note("1", "A.")
        .note("2", "B.");
    let settings = ConversionSettings::new()
        .with_auto_extract(false)
        .with_manual_incipit("1", "See Melville");

    let (document, report) = convert(&builder, &settings);

    assert_eq!(report.entries[0].incipit.as_deref(), Some("See Melville"));
    assert_eq!(report.entries[0].classification, Some(Classification::Manual));
    assert_eq!(report.entries[1].incipit.as_deref(), Some("Other words appear"));
    assert!(report.issues.contains(&ConversionIssue::MissingManualText {
        ordinal: 2,
        note_id: "2".to_string(),
    }));
    assert!(summarize_body(&document).paragraphs[0].contains("See Melville"));
}

#[test]
fn placeholder_and_word_count_are_configurable() {
    let builder = DocxBuilder::new()
        .paragraph(format!("{}{}", run("One two three four five six."), reference("1")))
        .note("1", "A.");
    let settings = ConversionSettings::new()
        .with_word_count(5)
        .with_page_placeholder("?");

    let (document, report) = convert(&builder, &settings);

    assert_eq!(report.entries[0].incipit.as_deref(), Some("One two three four five"));
    assert!(summarize_body(&document).paragraphs[0].ends_with("One two three four five?"));
}

#[test]
fn field_update_is_requested_in_the_settings_part() {
    let builder = DocxBuilder::new()
        .settings(r#"<w:zoom w:percent="100"/><w:compat/>"#)
        .paragraph(format!("{}{}", run("Claim."), reference("1")))
        .note("1", "A.");
    let settings = ConversionSettings::new().with_update_fields_on_open(true);

    let result = IncipitConverter::convert(&builder.build(), &settings).unwrap();
    let settings_xml = read_part(&result.document, "word/settings.xml");

    assert!(settings_xml.contains(r#"<w:zoom w:percent="100"/><w:updateFields w:val="true"/><w:compat/>"#));
}

// ============================================================================
// Preview
// ============================================================================

#[test]
fn preview_reports_without_converting() {
    let builder = DocxBuilder::new()
        .paragraph(format!("{}{}", run("Call me Ishmael."), reference("1")))
        .note("1", "Melville,   Moby-Dick.");

    let report = IncipitConverter::preview(&builder.build(), &ConversionSettings::default()).unwrap();
    let entry = &report.entries[0];

    assert_eq!(entry.status, ReferenceStatus::Planned);
    assert_eq!(entry.anchor_name.as_deref(), Some("_Incipit0001"));
    assert_eq!(entry.incipit.as_deref(), Some("Call me Ishmael"));
    assert_eq!(entry.note_excerpt.as_deref(), Some("Melville, Moby-Dick."));
    assert_eq!(report.converted, 0);
}

#[test]
fn report_serializes_to_camel_case_json() {
    let builder = DocxBuilder::new()
        .paragraph(format!("{}{}", run("Call me Ishmael."), reference("1")))
        .note("1", "A.");
    let report = IncipitConverter::preview(&builder.build(), &ConversionSettings::default()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    assert_eq!(json["referencesFound"], 1);
    assert_eq!(json["entries"][0]["noteId"], "1");
    assert_eq!(json["entries"][0]["classification"], "sentence-start");
    assert_eq!(json["entries"][0]["status"], "planned");
}

// ============================================================================
// Word-count bound
// ============================================================================

proptest! {
    #[test]
    fn incipit_never_exceeds_the_requested_words(
        words in prop::collection::vec("[a-z]{1,8}", 1..12),
        count in 2usize..=7,
    ) {
        let builder = DocxBuilder::new()
            .paragraph(format!(
                "{}{}{}",
                run("Intro. "),
                run(&format!("{}.", words.join(" "))),
                reference("1")
            ))
            .note("1", "A.");
        let settings = ConversionSettings::new().with_word_count(count);

        let report = IncipitConverter::preview(&builder.build(), &settings).unwrap();
        let entry = &report.entries[0];
        let expected = count.min(words.len());

        prop_assert_eq!(entry.word_count, expected);
        prop_assert_eq!(
            entry.incipit.as_deref().unwrap_or_default().split_whitespace().count(),
            expected
        );
        prop_assert_eq!(report.short_ids().len(), usize::from(words.len() < count));
    }
}
