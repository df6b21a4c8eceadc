//! Fill validation through save and reload.
//!
//! A fill is only trusted once it survives a full persistence cycle: the
//! values are applied to a fresh copy of the document, the result is
//! saved to a temporary file, reloaded, and read back. Whatever does not
//! round-trip is reported as a discrepancy. Batch runs aggregate one
//! outcome per section into a single report with an overall verdict.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::FormDocument;
use crate::error::Result;
use crate::mapper::{apply_values, flatten_values, verify_values, Discrepancy, FieldLookup};
use crate::reader::read_fields;

/// Validation outcome for one section's values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionOutcome {
    /// Section the values belong to.
    pub section: u16,
    /// Values that resolved to a field and were applied.
    pub fields_validated: usize,
    /// Values whose target matched no field.
    pub fields_missing: usize,
    /// Values a field refused.
    pub fields_rejected: usize,
    /// Values that did not survive the persistence cycle.
    pub fields_with_discrepancies: usize,
    /// The disagreements themselves.
    pub discrepancies: Vec<Discrepancy>,
}

impl SectionOutcome {
    /// True when every applied value round-tripped.
    pub fn passed(&self) -> bool {
        self.fields_with_discrepancies == 0
    }
}

/// Aggregated report over one or more validated sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillValidationReport {
    /// True iff no section reported a discrepancy.
    pub overall_success: bool,
    /// RFC 3339 generation timestamp.
    pub generated_at: String,
    /// Document the validation ran against.
    pub source: String,
    /// Per-section outcomes in ascending section order.
    pub sections: Vec<SectionOutcome>,
}

impl FillValidationReport {
    /// Plain-text rendering for terminals and logs.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("fill validation for {}\n", self.source));
        out.push_str(&format!("generated {}\n", self.generated_at));
        out.push_str(&format!(
            "overall: {}\n",
            if self.overall_success { "PASS" } else { "FAIL" }
        ));
        for section in &self.sections {
            out.push_str(&format!(
                "\nsection {}: {} applied, {} missing, {} rejected, {} discrepancies\n",
                section.section,
                section.fields_validated,
                section.fields_missing,
                section.fields_rejected,
                section.fields_with_discrepancies
            ));
            for d in &section.discrepancies {
                out.push_str(&format!(
                    "  {} expected '{}' got '{}'\n",
                    d.field,
                    d.expected,
                    d.actual.as_deref().unwrap_or("<empty>")
                ));
            }
        }
        out
    }
}

/// Validate one section's values against the document on disk.
///
/// Opens a fresh copy, applies the flattened values, saves to a
/// temporary file, reloads that file, and diffs what came back against
/// what was requested. The temporary file is removed when the function
/// returns. The document at `path` is never modified.
pub fn validate_section(
    path: &Path,
    section: u16,
    data: &Value,
    lookup: &FieldLookup,
) -> Result<SectionOutcome> {
    let mut doc = FormDocument::open(path)?;
    let fields = read_fields(&doc)?;
    let entries = flatten_values(data);
    log::debug!("section {section}: applying {} values", entries.len());
    let outcome = apply_values(&mut doc, &fields, &entries, lookup);

    let temp = tempfile::NamedTempFile::new()?;
    doc.save(temp.path())?;

    let reloaded = FormDocument::open(temp.path())?;
    let reloaded_fields = read_fields(&reloaded)?;
    let discrepancies = verify_values(&reloaded, &reloaded_fields, &entries, lookup);

    Ok(SectionOutcome {
        section,
        fields_validated: outcome.applied.len(),
        fields_missing: outcome.missing.len(),
        fields_rejected: outcome.rejected.len(),
        fields_with_discrepancies: discrepancies.len(),
        discrepancies,
    })
}

/// Validate several sections sequentially, ascending by section number.
pub fn validate_batch(
    path: &Path,
    sections: &BTreeMap<u16, Value>,
    lookup: &FieldLookup,
) -> Result<FillValidationReport> {
    let mut outcomes = Vec::with_capacity(sections.len());
    for (&section, data) in sections {
        log::info!("validating section {section}");
        outcomes.push(validate_section(path, section, data, lookup)?);
    }
    let overall_success = outcomes.iter().all(SectionOutcome::passed);
    Ok(FillValidationReport {
        overall_success,
        generated_at: Utc::now().to_rfc3339(),
        source: path.display().to_string(),
        sections: outcomes,
    })
}
