//! End-to-end extraction tests: read, classify, assemble.
//!
//! Fixtures mirror the real form's naming vocabulary so the rule table,
//! the page-range fallback, and the anomaly checks all get exercised
//! against parsed bytes rather than hand-built structs.

mod common;

use common::FormBuilder;
use formatlas::classifier::classify_fields;
use formatlas::config::EngineConfig;
use formatlas::hierarchy::{self, IssueKind, IssueLevel};
use formatlas::reader::{read_fields, FieldKind};

#[test]
fn test_generic_employment_field_falls_back_to_page_range() {
    let mut builder = FormBuilder::new(60);
    builder.text_field("form1[0].Section13[0].TextField1[0]", 40, [72, 680, 252, 694]);
    let doc = builder.build();

    let config = EngineConfig::new();
    let hierarchy = hierarchy::extract_from_document(&doc, &config).unwrap();

    let group = hierarchy.section(13).expect("page 40 lands in section 13");
    assert_eq!(group.field_count, 1);
    assert_eq!(group.name, "Employment Activities");
    let record = &group.fields[0];
    assert_eq!(record.page, Some(40));
    assert!(record.confidence <= 0.70);
    assert!(record.confidence > 0.0);
    assert_eq!(record.subsection, None);
}

#[test]
fn test_lettered_subform_classifies_with_high_confidence() {
    let mut builder = FormBuilder::new(110);
    builder.radio_group("Section21A-Incompetent[0]", 103, &["1", "2"]);
    let doc = builder.build();

    let config = EngineConfig::new();
    let hierarchy = hierarchy::extract_from_document(&doc, &config).unwrap();

    let group = hierarchy.section(21).unwrap();
    let record = &group.fields[0];
    assert_eq!(record.kind, FieldKind::Radio);
    assert_eq!(record.subsection.as_deref(), Some("A"));
    assert!(record.confidence >= 0.90);
    assert!(group.subsections.contains_key("A"));
}

#[test]
fn test_every_field_gets_a_section_even_without_signals() {
    let mut builder = FormBuilder::new(10);
    builder.text_field("form1[0].Sections1-6[0].TextField11[0]", 5, [72, 680, 252, 694]);
    builder.detached_text_field("form1[0].Mystery[0]");
    let doc = builder.build();

    let config = EngineConfig::new();
    let hierarchy = hierarchy::extract_from_document(&doc, &config).unwrap();

    let sentinel = hierarchy.section(0).expect("unclassifiable fields keep a group");
    assert_eq!(sentinel.name, "Unclassified");
    assert_eq!(sentinel.field_count, 1);
    assert_eq!(sentinel.fields[0].confidence, 0.0);

    // Sentinel fields stay in the totals but not in the coordinate count.
    let coverage = &hierarchy.metadata.coverage;
    assert_eq!(coverage.total_fields, 2);
    assert_eq!(coverage.unclassified_fields, 1);
    assert_eq!(coverage.fields_with_coordinates, 1);
    assert!(sentinel.fields[0].rect.is_sentinel());
}

#[test]
fn test_duplicate_field_listing_yields_one_record() {
    let mut builder = FormBuilder::new(10);
    let id = builder.text_field("form1[0].Sections1-6[0].SSN[0]", 5, [72, 500, 172, 514]);
    builder.relist_field(id);
    let doc = builder.build();

    let raw = read_fields(&doc).unwrap();
    assert_eq!(raw.len(), 1);

    let config = EngineConfig::new();
    let hierarchy = hierarchy::extract_from_document(&doc, &config).unwrap();
    assert_eq!(hierarchy.metadata.coverage.total_fields, 1);
    assert_eq!(hierarchy.section(4).unwrap().field_count, 1);
}

#[test]
fn test_classification_is_deterministic_across_runs() {
    let mut builder = FormBuilder::new(110);
    builder.text_field("form1[0].Sections1-6[0].TextField11[0]", 5, [72, 680, 252, 694]);
    builder.text_field("form1[0].Section13_1-2[0].TextField11[3]", 24, [72, 600, 252, 614]);
    builder.radio_group("Section21A-Incompetent[0]", 103, &["1", "2"]);
    builder.detached_text_field("form1[0].Mystery[0]");
    let bytes = builder.build_bytes();

    let config = EngineConfig::new();
    let run = |bytes: &[u8]| {
        let doc = formatlas::FormDocument::from_bytes(bytes, "fixture").unwrap();
        let raw = read_fields(&doc).unwrap();
        classify_fields(&doc, &raw, &config)
    };
    assert_eq!(run(&bytes), run(&bytes));
}

#[test]
fn test_expected_subsection_without_fields_is_flagged() {
    let mut builder = FormBuilder::new(80);
    // Section 18 expects subsections A, B, and C; only A and B get fields.
    for i in 0..3 {
        builder.text_field(
            &format!("form1[0].Section18_1[0].TextField11[{i}]"),
            70,
            [72, 600 - i * 20, 252, 614 - i * 20],
        );
        builder.text_field(
            &format!("form1[0].Section18_2[0].TextField11[{i}]"),
            72,
            [72, 600 - i * 20, 252, 614 - i * 20],
        );
    }
    let doc = builder.build();

    let config = EngineConfig::new();
    let hierarchy = hierarchy::extract_from_document(&doc, &config).unwrap();

    let unmapped: Vec<_> = hierarchy
        .issues
        .iter()
        .filter(|i| i.kind == IssueKind::UnmappedSubsection)
        .collect();
    assert_eq!(unmapped.len(), 1);
    assert_eq!(unmapped[0].subsection_id, "18C");
    assert_eq!(unmapped[0].level, IssueLevel::Warning);
    assert!(unmapped[0].suggestion.contains("section18"));

    let group = hierarchy.section(18).unwrap();
    assert_eq!(group.subsections["A"].field_count, 3);
    assert_eq!(group.subsections["B"].field_count, 3);
}

#[test]
fn test_single_field_subsection_is_reported_as_orphaned() {
    let mut builder = FormBuilder::new(110);
    builder.radio_group("Section21A-Incompetent[0]", 103, &["1", "2"]);
    let doc = builder.build();

    let config = EngineConfig::new();
    let hierarchy = hierarchy::extract_from_document(&doc, &config).unwrap();

    let orphaned: Vec<_> = hierarchy
        .issues
        .iter()
        .filter(|i| i.kind == IssueKind::OrphanedSubsection)
        .collect();
    assert_eq!(orphaned.len(), 1);
    assert_eq!(orphaned[0].subsection_id, "21A");
    assert_eq!(orphaned[0].level, IssueLevel::Warning);
    assert_eq!(serde_json::to_value(orphaned[0]).unwrap()["level"], "warning");
}

#[test]
fn test_hierarchy_artifact_is_json_serializable() {
    let mut builder = FormBuilder::new(60);
    builder.text_field("form1[0].Sections1-6[0].TextField11[0]", 5, [72, 680, 252, 694]);
    builder.dropdown("form1[0].Section13_1[0].School6_State[0]", 24, [72, 600, 252, 614], &["CA", "NY"]);
    let doc = builder.build();

    let config = EngineConfig::new();
    let hierarchy = hierarchy::extract_from_document(&doc, &config).unwrap();
    let json = serde_json::to_value(&hierarchy).unwrap();

    assert!(json["metadata"]["coverage"]["totalFields"].is_number());
    let group = &json["sections"]["section13"];
    assert!(group["regex"].is_string());
    assert!(group["confidence"].is_number());
    assert_eq!(group["stats"]["totalFields"], 1);
    assert_eq!(group["stats"]["fieldsWithCoordinates"], 1);
    let dropdown = &group["fields"][0];
    assert_eq!(dropdown["type"], "dropdown");
    assert_eq!(dropdown["options"][0], "CA");
    assert_eq!(dropdown["sectionName"], "Employment Activities");
}
