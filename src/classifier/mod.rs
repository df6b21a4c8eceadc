//! Section and subsection classification.
//!
//! Classification runs three signals in strict priority order: the rule
//! table in [`rules`], then the page-range fallback in [`pages`], then a
//! sentinel section 0 for fields nothing can place. Confidence starts at
//! the matched rule's base and is reduced by a label-match penalty and a
//! geometry-source penalty; page-fallback confidence is capped so a
//! positional guess never outranks a rule match.

pub mod pages;
pub mod rules;

use std::collections::HashSet;

use crate::config::EngineConfig;
use crate::document::FormDocument;
use crate::geometry::Rect;
use crate::reader::{FieldKind, RawField};
use crate::resolver::{resolve_label, resolve_placement, GeometrySource, ResolvedPlacement};

/// A raw field with its resolved label, placement, and section assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedField {
    /// Fully qualified field name.
    pub name: String,
    /// Canonical `"N G R"` object reference.
    pub reference_id: String,
    /// Widget kind inherited from the raw field.
    pub kind: FieldKind,
    /// Current value, if the field has one.
    pub value: Option<String>,
    /// Export options for choice and radio fields.
    pub options: Vec<String>,
    /// Human-readable label from the resolution chain.
    pub label: String,
    /// Assigned section, 0 when unclassifiable.
    pub section: u16,
    /// Subsection letter when one could be inferred.
    pub subsection: Option<String>,
    /// Classification confidence in `[0, 1]`.
    pub confidence: f32,
    /// 1-based page the field sits on, when known.
    pub page: Option<u32>,
    /// Placement rectangle, sentinel when unresolved.
    pub rect: Rect,
    /// Which strategy produced the rectangle.
    pub geometry: GeometrySource,
    /// Source text of the rule pattern that matched, if any.
    pub matched_pattern: Option<&'static str>,
}

/// Classify every field, preserving input order.
///
/// Fields sharing a reference id with an earlier entry are dropped here
/// as a second dedup layer behind the reader's own.
pub fn classify_fields(
    doc: &FormDocument,
    fields: &[RawField],
    config: &EngineConfig,
) -> Vec<ClassifiedField> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::with_capacity(fields.len());
    for field in fields {
        if !seen.insert(field.reference_id.as_str()) {
            log::debug!("dropping duplicate reference id {}", field.reference_id);
            continue;
        }
        let label = resolve_label(field);
        let placement = resolve_placement(doc, field);
        out.push(classify_one(field, label, placement, config));
    }
    log::info!("classified {} fields", out.len());
    out
}

fn classify_one(
    field: &RawField,
    label: String,
    placement: ResolvedPlacement,
    config: &EngineConfig,
) -> ClassifiedField {
    let geometry_penalty = config.geometry_penalties.for_source(placement.source);
    let (section, subsection, confidence, matched_pattern) =
        match rules::match_rules(&field.name, &label) {
            Some((rule, via_label)) => {
                let label_penalty = if via_label { config.label_match_penalty } else { 0.0 };
                let confidence =
                    (rule.confidence - label_penalty - geometry_penalty).clamp(0.0, 1.0);
                let subsection = rule
                    .subsection
                    .map(str::to_string)
                    .or_else(|| rules::infer_subsection(rule.section, &field.name, &label));
                log::debug!(
                    "{} -> section {} via {} rule '{}'",
                    field.name,
                    rule.section,
                    if via_label { "label" } else { "name" },
                    rule.description
                );
                (rule.section, subsection, confidence, Some(rule.pattern.as_str()))
            }
            None => {
                let by_page = placement
                    .page
                    .and_then(|page| config.page_ranges.section_for_page(page).map(|s| (page, s)));
                match by_page {
                    Some((page, section)) => {
                        let confidence = (config.page_fallback_confidence - geometry_penalty)
                            .min(config.page_fallback_cap)
                            .max(0.0);
                        let subsection = rules::infer_subsection(section, &field.name, &label);
                        log::debug!(
                            "classification ambiguous for {}: page {} falls in section {}",
                            field.name,
                            page,
                            section
                        );
                        (section, subsection, confidence, None)
                    }
                    None => {
                        log::warn!("unclassifiable field {}", field.name);
                        (0, None, 0.0, None)
                    }
                }
            }
        };
    ClassifiedField {
        name: field.name.clone(),
        reference_id: field.reference_id.clone(),
        kind: field.kind,
        value: field.value.clone(),
        options: field.options.clone(),
        label,
        section,
        subsection,
        confidence,
        page: placement.page,
        rect: placement.rect,
        geometry: placement.source,
        matched_pattern,
    }
}
