//! Field hierarchy assembly.
//!
//! Turns the classifier's flat output into the published artifact: one
//! group per section in ascending order with the sentinel group last,
//! per-subsection rollups with representative name patterns, anomaly
//! issues checked against the section registry, and coverage statistics.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classifier::{classify_fields, ClassifiedField};
use crate::config::EngineConfig;
use crate::document::FormDocument;
use crate::error::Result;
use crate::geometry::Rect;
use crate::reader::{read_fields, FieldKind};
use crate::resolver::GeometrySource;
use crate::sections;

lazy_static! {
    static ref INDEX_RE: Regex = Regex::new(r"\[\d+\]").unwrap();
}

/// One field row in the hierarchy artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    /// Fully qualified field name.
    pub name: String,
    /// Canonical `"N G R"` object reference.
    pub id: String,
    /// Human-readable label.
    pub label: String,
    /// Current value, omitted when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Widget kind.
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Assigned section, 0 for unclassified.
    pub section: u16,
    /// Canonical section name.
    pub section_name: String,
    /// Classification confidence in `[0, 1]`.
    pub confidence: f32,
    /// Subsection letter, omitted when none was inferred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsection: Option<String>,
    /// 1-based page, omitted when unknown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Placement rectangle, the sentinel when unresolved.
    pub rect: Rect,
    /// Strategy that produced the rectangle.
    pub geometry: GeometrySource,
    /// Export options for choice and radio fields.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub options: Vec<String>,
}

impl FieldRecord {
    fn from_classified(field: &ClassifiedField) -> Self {
        FieldRecord {
            name: field.name.clone(),
            id: field.reference_id.clone(),
            label: field.label.clone(),
            value: field.value.clone(),
            kind: field.kind,
            section: field.section,
            section_name: sections::section_name(field.section).to_string(),
            confidence: field.confidence,
            subsection: field.subsection.clone(),
            page: field.page,
            rect: field.rect,
            geometry: field.geometry,
            options: field.options.clone(),
        }
    }
}

/// Rollup for one subsection within a section group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsectionInfo {
    /// Number of fields assigned to the subsection.
    pub field_count: usize,
    /// Mean classification confidence.
    pub average_confidence: f32,
    /// Representative name stems, index brackets wildcarded.
    pub patterns: Vec<String>,
}

/// Per-section coverage summary, the numbers the dashboard renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionStats {
    /// Fields assigned to the section.
    pub total_fields: usize,
    /// Fields whose rectangle is not the sentinel.
    pub fields_with_coordinates: usize,
    /// Fields carrying a subsection letter.
    pub mapped_fields: usize,
    /// Fields without a subsection letter.
    pub unmapped_fields: usize,
    /// Mapped share as a percentage.
    pub mapped_rate: f32,
    /// Coordinate share as a percentage.
    pub coordinate_rate: f32,
}

/// All fields assigned to one section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionGroup {
    /// Section number, 0 for the sentinel group.
    pub number: u16,
    /// Canonical section name.
    pub name: String,
    /// Regex matching the group's dominant field-name shape.
    pub regex: String,
    /// Number of fields in the group.
    pub field_count: usize,
    /// Mean classification confidence.
    pub confidence: f32,
    /// Coverage summary for the section.
    pub stats: SectionStats,
    /// Subsection rollups, letters ascending.
    pub subsections: IndexMap<String, SubsectionInfo>,
    /// Field rows in extraction order.
    pub fields: Vec<FieldRecord>,
}

/// Anomaly category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    /// The registry expects the subsection but no field landed in it.
    UnmappedSubsection,
    /// The subsection exists but holds fewer fields than the orphan
    /// threshold.
    OrphanedSubsection,
}

/// Severity of a reported anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    /// Classification output for the subsection is unusable.
    Error,
    /// Likely a classification gap; output is still usable.
    Warning,
}

/// One anomaly found while assembling the hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// Anomaly category.
    pub kind: IssueKind,
    /// Compact identifier such as `13B`.
    pub subsection_id: String,
    /// Severity.
    pub level: IssueLevel,
    /// Human-readable description.
    pub message: String,
    /// What to check next.
    pub suggestion: String,
}

/// Extraction coverage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    /// All deduplicated fields.
    pub total_fields: usize,
    /// Fields with a section greater than 0.
    pub classified_fields: usize,
    /// Fields left in the sentinel group.
    pub unclassified_fields: usize,
    /// Fields whose rectangle is not the sentinel.
    pub fields_with_coordinates: usize,
    /// Classified share as a percentage.
    pub classification_rate: f32,
    /// Coordinate share as a percentage.
    pub coordinate_rate: f32,
}

/// Artifact envelope metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyMetadata {
    /// Recorded document source.
    pub source: String,
    /// RFC 3339 generation timestamp.
    pub generated_at: String,
    /// Number of non-sentinel section groups.
    pub total_sections: usize,
    /// Coverage statistics.
    pub coverage: CoverageReport,
}

/// The complete hierarchy artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldHierarchy {
    /// Envelope metadata.
    pub metadata: HierarchyMetadata,
    /// Section groups keyed `section<N>`, ascending, sentinel last.
    pub sections: IndexMap<String, SectionGroup>,
    /// Anomalies found during assembly.
    pub issues: Vec<ValidationIssue>,
}

impl FieldHierarchy {
    /// An artifact with no fields and zeroed statistics.
    pub fn empty(source: &str) -> Self {
        FieldHierarchy {
            metadata: HierarchyMetadata {
                source: source.to_string(),
                generated_at: Utc::now().to_rfc3339(),
                total_sections: 0,
                coverage: CoverageReport::default(),
            },
            sections: IndexMap::new(),
            issues: Vec::new(),
        }
    }

    /// Section group by number, if present.
    pub fn section(&self, number: u16) -> Option<&SectionGroup> {
        self.sections.get(&format!("section{number}"))
    }
}

/// Outcome of a full extraction attempt.
#[derive(Debug, Clone)]
pub struct ExtractionRun {
    /// The assembled artifact, empty when extraction failed.
    pub hierarchy: FieldHierarchy,
    /// Load or parse error, when the document was unreadable.
    pub error: Option<String>,
}

impl ExtractionRun {
    /// Whether the document was read and assembled.
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Group classified fields into the hierarchy artifact.
pub fn assemble(source: &str, fields: &[ClassifiedField], config: &EngineConfig) -> FieldHierarchy {
    let mut groups: BTreeMap<u16, Vec<&ClassifiedField>> = BTreeMap::new();
    for field in fields {
        groups.entry(field.section).or_default().push(field);
    }

    let mut order: Vec<u16> = groups.keys().copied().filter(|&n| n != 0).collect();
    if groups.contains_key(&0) {
        order.push(0);
    }

    let mut section_map: IndexMap<String, SectionGroup> = IndexMap::new();
    let mut issues = Vec::new();
    for number in order {
        let group = build_group(number, &groups[&number], config);
        if number != 0 {
            collect_issues(number, &group, config, &mut issues);
        }
        section_map.insert(format!("section{number}"), group);
    }

    let coverage = compute_coverage(fields);
    log::info!(
        "assembled {} sections from {} fields ({} unclassified, {} issues)",
        section_map.len(),
        coverage.total_fields,
        coverage.unclassified_fields,
        issues.len()
    );

    FieldHierarchy {
        metadata: HierarchyMetadata {
            source: source.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            total_sections: section_map.keys().filter(|k| *k != "section0").count(),
            coverage,
        },
        sections: section_map,
        issues,
    }
}

/// Run the full extraction pipeline over an open document.
pub fn extract_from_document(doc: &FormDocument, config: &EngineConfig) -> Result<FieldHierarchy> {
    let raw = read_fields(doc)?;
    let classified = classify_fields(doc, &raw, config);
    Ok(assemble(doc.source(), &classified, config))
}

/// Run the full extraction pipeline against a file on disk.
///
/// An unreadable document is not an error here: the run completes with an
/// empty hierarchy, zeroed statistics, and the failure recorded.
pub fn extract_from_path(path: &Path, config: &EngineConfig) -> ExtractionRun {
    let attempt = FormDocument::open(path).and_then(|doc| extract_from_document(&doc, config));
    match attempt {
        Ok(hierarchy) => ExtractionRun { hierarchy, error: None },
        Err(err) => {
            log::warn!("extraction failed for {}: {err}", path.display());
            ExtractionRun {
                hierarchy: FieldHierarchy::empty(&path.display().to_string()),
                error: Some(err.to_string()),
            }
        }
    }
}

fn build_group(number: u16, members: &[&ClassifiedField], config: &EngineConfig) -> SectionGroup {
    let mut by_letter: BTreeMap<String, Vec<&ClassifiedField>> = BTreeMap::new();
    for field in members {
        if let Some(letter) = &field.subsection {
            by_letter.entry(letter.clone()).or_default().push(field);
        }
    }
    let subsections = by_letter
        .into_iter()
        .map(|(letter, fields)| {
            let info = SubsectionInfo {
                field_count: fields.len(),
                average_confidence: mean_confidence(&fields),
                patterns: representative_patterns(&fields, config.max_group_patterns),
            };
            (letter, info)
        })
        .collect::<IndexMap<_, _>>();

    let regex = representative_patterns(members, 1)
        .into_iter()
        .next()
        .map(|stem| stem_regex(&stem))
        .unwrap_or_default();

    SectionGroup {
        number,
        name: sections::section_name(number).to_string(),
        regex,
        field_count: members.len(),
        confidence: mean_confidence(members),
        stats: section_stats(members),
        subsections,
        fields: members.iter().map(|f| FieldRecord::from_classified(f)).collect(),
    }
}

fn section_stats(members: &[&ClassifiedField]) -> SectionStats {
    let total = members.len();
    let with_coordinates = members.iter().filter(|f| !f.rect.is_sentinel()).count();
    let mapped = members.iter().filter(|f| f.subsection.is_some()).count();
    SectionStats {
        total_fields: total,
        fields_with_coordinates: with_coordinates,
        mapped_fields: mapped,
        unmapped_fields: total - mapped,
        mapped_rate: percentage(mapped, total),
        coordinate_rate: percentage(with_coordinates, total),
    }
}

/// Turn a wildcarded name stem into a matching regex.
fn stem_regex(stem: &str) -> String {
    regex::escape(stem).replace(r"\[\*\]", r"\[\d+\]")
}

fn collect_issues(
    number: u16,
    group: &SectionGroup,
    config: &EngineConfig,
    issues: &mut Vec<ValidationIssue>,
) {
    for letter in sections::expected_subsections(number) {
        if !group.subsections.contains_key(*letter) {
            let digit = letter.bytes().next().map(|b| b - b'A' + 1).unwrap_or(1);
            issues.push(ValidationIssue {
                kind: IssueKind::UnmappedSubsection,
                subsection_id: format!("{number}{letter}"),
                level: IssueLevel::Warning,
                message: format!(
                    "section {number} has no fields for expected subsection {letter}"
                ),
                suggestion: format!(
                    "check for unmatched section{number}{} or section{number}_{digit} subform names",
                    letter.to_ascii_lowercase()
                ),
            });
        }
    }
    for (letter, info) in &group.subsections {
        if info.field_count < config.orphan_threshold {
            // Low confidence, not proven wrong: a warning, never an error.
            issues.push(ValidationIssue {
                kind: IssueKind::OrphanedSubsection,
                subsection_id: format!("{number}{letter}"),
                level: IssueLevel::Warning,
                message: format!(
                    "subsection {letter} of section {number} holds only {} field(s)",
                    info.field_count
                ),
                suggestion: "confirm the subsection split or fold the stragglers into the parent \
                             section"
                    .to_string(),
            });
        }
    }
}

fn compute_coverage(fields: &[ClassifiedField]) -> CoverageReport {
    let total = fields.len();
    let classified = fields.iter().filter(|f| f.section > 0).count();
    let with_coordinates = fields.iter().filter(|f| !f.rect.is_sentinel()).count();
    CoverageReport {
        total_fields: total,
        classified_fields: classified,
        unclassified_fields: total - classified,
        fields_with_coordinates: with_coordinates,
        classification_rate: percentage(classified, total),
        coordinate_rate: percentage(with_coordinates, total),
    }
}

fn percentage(part: usize, whole: usize) -> f32 {
    if whole == 0 {
        0.0
    } else {
        (part as f32 / whole as f32) * 100.0
    }
}

fn mean_confidence(fields: &[&ClassifiedField]) -> f32 {
    if fields.is_empty() {
        return 0.0;
    }
    fields.iter().map(|f| f.confidence).sum::<f32>() / fields.len() as f32
}

/// Most common name stems among the fields, index brackets wildcarded,
/// capped at `max`. Ties keep first-seen order.
fn representative_patterns(fields: &[&ClassifiedField], max: usize) -> Vec<String> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for field in fields {
        let stem = INDEX_RE.replace_all(&field.name, "[*]").into_owned();
        *counts.entry(stem).or_insert(0) += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(max).map(|(stem, _)| stem).collect()
}
