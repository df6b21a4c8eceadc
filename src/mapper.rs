//! Structured data to field id mapping.
//!
//! The bridge between nested application data and the flat AcroForm
//! field list: recursive leaf extraction from arbitrary JSON, reference
//! id normalization, an optional logical-path lookup table, type-aware
//! fill dispatch, and reverse verification of applied values.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::FormDocument;
use crate::error::Result;
use crate::reader::{FieldKind, RawField};

lazy_static! {
    static ref FULL_REF: Regex = Regex::new(r"^(\d+)\s+(\d+)\s+R$").unwrap();
    static ref NUMBER_GEN: Regex = Regex::new(r"^(\d+)\s+(\d+)$").unwrap();
    static ref BARE_NUMBER: Regex = Regex::new(r"^\d+$").unwrap();
}

/// One leaf value extracted from structured input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatEntry {
    /// Dotted logical path, array elements as `[i]`.
    pub path: String,
    /// Raw target token from the leaf's `id` key.
    pub id: String,
    /// Value to apply, already stringified.
    pub value: String,
}

/// Walk structured input and collect every fillable leaf.
///
/// A leaf is an object carrying a string `id` and a `value` key. Leaves
/// are never recursed into; a leaf whose value is empty or non-scalar is
/// skipped entirely. Everything else recurses with a breadcrumb path.
pub fn flatten_values(data: &Value) -> Vec<FlatEntry> {
    let mut out = Vec::new();
    walk(data, String::new(), &mut out);
    log::debug!("flattened {} leaf values", out.len());
    out
}

fn walk(node: &Value, path: String, out: &mut Vec<FlatEntry>) {
    match node {
        Value::Object(map) => {
            if let Some(id) = leaf_id(map) {
                if let Some(value) = map.get("value").and_then(scalar_text) {
                    out.push(FlatEntry { path, id: id.to_string(), value });
                }
                return;
            }
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                walk(child, child_path, out);
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                walk(item, format!("{path}[{i}]"), out);
            }
        }
        _ => {}
    }
}

fn leaf_id(map: &Map<String, Value>) -> Option<&str> {
    if !map.contains_key("value") {
        return None;
    }
    map.get("id").and_then(Value::as_str)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("Yes".to_string()),
        Value::Bool(false) => Some("No".to_string()),
        _ => None,
    }
}

/// Normalize a reference token to canonical `"N G R"` form.
///
/// `"9502"` and `"9502 0"` both become `"9502 0 R"`; canonical input is
/// returned unchanged, so the function is idempotent. Tokens that are not
/// object references, typically field names, pass through untouched.
pub fn normalize_reference_id(token: &str) -> String {
    let trimmed = token.trim();
    if FULL_REF.is_match(trimmed) {
        return trimmed.to_string();
    }
    if let Some(caps) = NUMBER_GEN.captures(trimmed) {
        return format!("{} {} R", &caps[1], &caps[2]);
    }
    if BARE_NUMBER.is_match(trimmed) {
        return format!("{trimmed} 0 R");
    }
    trimmed.to_string()
}

/// Logical-path to field-target lookup table.
///
/// Maps dotted paths from the structured input to a field name or
/// reference id, overriding the leaf's own `id`. Used when the input
/// schema and the form disagree about where a value lands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldLookup {
    entries: HashMap<String, String>,
}

impl FieldLookup {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(path, target)` pairs.
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(path, target)| (path.into(), target.into()))
            .collect();
        Self { entries }
    }

    /// Register one path override.
    pub fn insert(&mut self, path: impl Into<String>, target: impl Into<String>) {
        self.entries.insert(path.into(), target.into());
    }

    /// Target for a logical path, if overridden.
    pub fn target_for(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// Number of overrides.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no overrides.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Index over raw fields for target resolution.
pub struct FieldIndex<'a> {
    fields: &'a [RawField],
    by_reference: HashMap<&'a str, &'a RawField>,
    by_name: HashMap<&'a str, &'a RawField>,
}

impl<'a> FieldIndex<'a> {
    /// Build the index; the first field wins on duplicate keys.
    pub fn new(fields: &'a [RawField]) -> Self {
        let mut by_reference: HashMap<&str, &RawField> = HashMap::new();
        let mut by_name: HashMap<&str, &RawField> = HashMap::new();
        for field in fields {
            by_reference.entry(field.reference_id.as_str()).or_insert(field);
            by_name.entry(field.name.as_str()).or_insert(field);
        }
        Self { fields, by_reference, by_name }
    }

    /// Resolve a token: exact qualified name, then normalized reference
    /// id, then unique-prefix-free name suffix in field order.
    pub fn resolve(&self, token: &str) -> Option<&'a RawField> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        if let Some(field) = self.by_name.get(token).copied() {
            return Some(field);
        }
        let reference = normalize_reference_id(token);
        if let Some(field) = self.by_reference.get(reference.as_str()).copied() {
            return Some(field);
        }
        let suffix = format!(".{token}");
        self.fields.iter().find(|f| f.name.ends_with(&suffix))
    }
}

/// What happened to each requested value during a fill.
#[derive(Debug, Clone, Default)]
pub struct FillOutcome {
    /// Reference ids of fields that were set.
    pub applied: Vec<String>,
    /// Tokens that matched no field.
    pub missing: Vec<String>,
    /// Fields that refused the value, with the reason.
    pub rejected: Vec<(String, String)>,
}

impl FillOutcome {
    /// True when every requested value was applied.
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.rejected.is_empty()
    }
}

/// Apply flattened values to the document.
///
/// Each entry resolves through the lookup table first, then the field
/// index. Values dispatch by field kind: text and date fields take the
/// string as-is, dropdowns validate against their options, radio groups
/// against their appearance states, and checkboxes check on a
/// case-insensitive `yes`. Signature fields are never written.
pub fn apply_values(
    doc: &mut FormDocument,
    fields: &[RawField],
    entries: &[FlatEntry],
    lookup: &FieldLookup,
) -> FillOutcome {
    let index = FieldIndex::new(fields);
    let mut outcome = FillOutcome::default();
    for entry in entries {
        let token = lookup.target_for(&entry.path).unwrap_or(&entry.id);
        let field = match index.resolve(token) {
            Some(field) => field,
            None => {
                log::warn!("no field for '{}' (path {})", token, entry.path);
                outcome.missing.push(token.to_string());
                continue;
            }
        };
        match fill_field(doc, field, &entry.value) {
            Ok(true) => outcome.applied.push(field.reference_id.clone()),
            Ok(false) => outcome
                .rejected
                .push((field.reference_id.clone(), "field kind cannot be filled".to_string())),
            Err(err) => {
                log::warn!("value rejected for {}: {err}", field.name);
                outcome.rejected.push((field.reference_id.clone(), err.to_string()));
            }
        }
    }
    if !outcome.applied.is_empty() {
        if let Err(err) = doc.set_need_appearances() {
            log::warn!("could not set NeedAppearances: {err}");
        }
    }
    log::info!(
        "applied {} values ({} missing, {} rejected)",
        outcome.applied.len(),
        outcome.missing.len(),
        outcome.rejected.len()
    );
    outcome
}

fn fill_field(doc: &mut FormDocument, field: &RawField, value: &str) -> Result<bool> {
    match field.kind {
        FieldKind::Text | FieldKind::Date => {
            doc.set_text(field.id, value)?;
            Ok(true)
        }
        FieldKind::Dropdown => {
            doc.set_choice(field.id, &field.name, value)?;
            Ok(true)
        }
        FieldKind::Radio => {
            doc.set_radio(field.id, &field.name, value)?;
            Ok(true)
        }
        FieldKind::Checkbox => {
            doc.set_checkbox(field.id, value.eq_ignore_ascii_case("yes"))?;
            Ok(true)
        }
        FieldKind::Signature => {
            log::debug!("skipping signature field {}", field.name);
            Ok(false)
        }
    }
}

/// One requested value the document does not reflect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discrepancy {
    /// Reference id of the disagreeing field.
    pub field: String,
    /// Value the caller requested.
    pub expected: String,
    /// Value the document holds, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

/// Compare requested values against what the document now holds.
///
/// Only entries that resolve to an existing field are compared; targets
/// that matched nothing were already reported by the fill. Checkboxes
/// compare by on/off state rather than literal text.
pub fn verify_values(
    doc: &FormDocument,
    fields: &[RawField],
    entries: &[FlatEntry],
    lookup: &FieldLookup,
) -> Vec<Discrepancy> {
    let index = FieldIndex::new(fields);
    let mut discrepancies = Vec::new();
    for entry in entries {
        let token = lookup.target_for(&entry.path).unwrap_or(&entry.id);
        let Some(field) = index.resolve(token) else {
            continue;
        };
        if field.kind == FieldKind::Signature {
            continue;
        }
        let actual = doc.value_of(field.id);
        if !value_matches(doc, field, &entry.value, actual.as_deref()) {
            discrepancies.push(Discrepancy {
                field: field.reference_id.clone(),
                expected: entry.value.clone(),
                actual,
            });
        }
    }
    if !discrepancies.is_empty() {
        log::warn!("{} value(s) did not round-trip", discrepancies.len());
    }
    discrepancies
}

fn value_matches(doc: &FormDocument, field: &RawField, expected: &str, actual: Option<&str>) -> bool {
    match field.kind {
        FieldKind::Checkbox => {
            let want_on = expected.eq_ignore_ascii_case("yes");
            let on_state = doc.on_state_of(field.id).unwrap_or_else(|| "Yes".to_string());
            let is_on = matches!(actual, Some(v) if v == on_state || (v != "Off" && !v.is_empty()));
            want_on == is_on
        }
        _ => expected.trim() == actual.unwrap_or("").trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(name: &str, reference: &str, kind: FieldKind) -> RawField {
        let id = reference
            .split_whitespace()
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        RawField {
            name: name.to_string(),
            reference_id: reference.to_string(),
            id: (id, 0),
            kind,
            value: None,
            options: Vec::new(),
            tooltip: None,
            alt_tooltip: None,
            field_rect: None,
            widgets: Vec::new(),
        }
    }

    #[test]
    fn test_flatten_nested_objects_and_arrays() {
        let data = json!({
            "section1": {
                "lastName": { "id": "9502", "value": "Garcia" },
                "firstName": { "id": "9503 0", "value": "Maria" }
            },
            "section11": {
                "residences": [
                    { "address": { "street": { "id": "9600 0 R", "value": "12 Oak St" } } }
                ]
            }
        });
        let entries = flatten_values(&data);
        assert_eq!(entries.len(), 3);

        let by_path: HashMap<&str, &FlatEntry> =
            entries.iter().map(|e| (e.path.as_str(), e)).collect();
        assert_eq!(by_path["section1.lastName"].id, "9502");
        assert_eq!(by_path["section1.lastName"].value, "Garcia");
        assert_eq!(by_path["section1.firstName"].id, "9503 0");
        assert_eq!(by_path["section11.residences[0].address.street"].value, "12 Oak St");
    }

    #[test]
    fn test_flatten_skips_empty_and_nonscalar_leaves() {
        let data = json!({
            "blank": { "id": "1", "value": "" },
            "spaces": { "id": "2", "value": "   " },
            "nested": { "id": "3", "value": { "inner": "never recursed" } },
            "kept": { "id": "4", "value": "x" }
        });
        let entries = flatten_values(&data);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "kept");
    }

    #[test]
    fn test_flatten_stringifies_scalars() {
        let data = json!({
            "count": { "id": "1", "value": 3 },
            "yes": { "id": "2", "value": true },
            "no": { "id": "3", "value": false }
        });
        let entries = flatten_values(&data);
        let by_path: HashMap<&str, &FlatEntry> =
            entries.iter().map(|e| (e.path.as_str(), e)).collect();
        assert_eq!(by_path["count"].value, "3");
        assert_eq!(by_path["yes"].value, "Yes");
        assert_eq!(by_path["no"].value, "No");
    }

    #[test]
    fn test_normalize_reference_forms() {
        assert_eq!(normalize_reference_id("9502"), "9502 0 R");
        assert_eq!(normalize_reference_id("9502 0"), "9502 0 R");
        assert_eq!(normalize_reference_id("9502 0 R"), "9502 0 R");
        assert_eq!(normalize_reference_id("  9502  "), "9502 0 R");
        assert_eq!(normalize_reference_id("12 7"), "12 7 R");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for token in ["9502", "9502 0", "9502 0 R", "form1[0].SSN[0]"] {
            let once = normalize_reference_id(token);
            assert_eq!(normalize_reference_id(&once), once);
        }
    }

    #[test]
    fn test_normalize_passes_names_through() {
        assert_eq!(
            normalize_reference_id("form1[0].Sections1-6[0].SSN[0]"),
            "form1[0].Sections1-6[0].SSN[0]"
        );
    }

    #[test]
    fn test_index_resolves_name_reference_and_suffix() {
        let fields = vec![
            raw("form1[0].Sections1-6[0].TextField11[0]", "9502 0 R", FieldKind::Text),
            raw("form1[0].Sections1-6[0].SSN[0]", "9510 0 R", FieldKind::Text),
        ];
        let index = FieldIndex::new(&fields);

        let by_name = index.resolve("form1[0].Sections1-6[0].SSN[0]").unwrap();
        assert_eq!(by_name.reference_id, "9510 0 R");

        let by_reference = index.resolve("9502").unwrap();
        assert_eq!(by_reference.name, "form1[0].Sections1-6[0].TextField11[0]");

        let by_suffix = index.resolve("SSN[0]").unwrap();
        assert_eq!(by_suffix.reference_id, "9510 0 R");

        assert!(index.resolve("Nothing[9]").is_none());
        assert!(index.resolve("").is_none());
    }

    #[test]
    fn test_index_first_field_wins_on_duplicates() {
        let fields = vec![
            raw("form1[0].A[0]", "9502 0 R", FieldKind::Text),
            raw("form1[0].B[0]", "9502 0 R", FieldKind::Checkbox),
        ];
        let index = FieldIndex::new(&fields);
        assert_eq!(index.resolve("9502").unwrap().name, "form1[0].A[0]");
    }

    #[test]
    fn test_lookup_overrides_leaf_id() {
        let lookup = FieldLookup::from_pairs([("section1.lastName", "9999")]);
        assert_eq!(lookup.target_for("section1.lastName"), Some("9999"));
        assert_eq!(lookup.target_for("section1.firstName"), None);
        assert_eq!(lookup.len(), 1);
        assert!(!lookup.is_empty());
    }
}
