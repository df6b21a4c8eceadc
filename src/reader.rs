//! Raw field enumeration.
//!
//! Walks the AcroForm field tree and produces one [`RawField`] per unique
//! reference id: fully qualified dotted name, widget kind, current value,
//! options, tooltips, and the raw widget list. First occurrence wins;
//! widgets from later duplicates are folded in, never dropped, so
//! multi-widget fields keep every rect available for geometry fallback.

use std::collections::HashSet;

use indexmap::IndexMap;
use lopdf::{Dictionary, ObjectId};
use serde::{Deserialize, Serialize};

use crate::document::{reference_string, FormDocument};
use crate::error::Result;
use crate::geometry::Rect;

/// AcroForm field flag bits (`/Ff`).
pub mod field_flags {
    /// Field is read-only
    pub const READ_ONLY: u32 = 1;
    /// Field is required
    pub const REQUIRED: u32 = 1 << 1;
    /// Field is not exported
    pub const NO_EXPORT: u32 = 1 << 2;
    /// Button is a radio group
    pub const RADIO: u32 = 1 << 15;
    /// Button is a pushbutton
    pub const PUSHBUTTON: u32 = 1 << 16;
    /// Choice field is a combo box (else a list box)
    pub const COMBO: u32 = 1 << 17;
    /// Combo box allows free-text edits
    pub const EDIT: u32 = 1 << 18;
}

/// Closed set of widget kinds the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free-text entry
    Text,
    /// On/off checkbox
    Checkbox,
    /// Radio button group
    Radio,
    /// Combo or list choice
    Dropdown,
    /// Date entry (a text widget with the form's date naming)
    Date,
    /// Digital signature
    Signature,
}

/// One on-page occurrence of a field.
#[derive(Debug, Clone)]
pub struct Widget {
    /// Object id of the widget annotation (the field's own id when merged).
    pub id: ObjectId,
    /// 1-based page number from the widget's `/P`, matched by identity.
    pub page: Option<u32>,
    /// Raw `/Rect` on the widget dictionary.
    pub rect: Option<Rect>,
}

/// A form field as read from the document, before classification.
#[derive(Debug, Clone)]
pub struct RawField {
    /// Fully qualified dotted name (`form1[0].Section13_1[0].TextField11[2]`).
    pub name: String,
    /// Reference id in `N G R` form.
    pub reference_id: String,
    /// Object id of the field dictionary.
    pub id: ObjectId,
    /// Widget kind.
    pub kind: FieldKind,
    /// Current `/V`, decoded.
    pub value: Option<String>,
    /// `/Opt` export values for choice fields.
    pub options: Vec<String>,
    /// `/TU` tooltip text.
    pub tooltip: Option<String>,
    /// `/TM` mapping name, used as the secondary tooltip.
    pub alt_tooltip: Option<String>,
    /// Legacy `/Rect` stored directly on the field dictionary.
    pub field_rect: Option<Rect>,
    /// Widget occurrences, in document order.
    pub widgets: Vec<Widget>,
}

/// Enumerate all fields, deduplicated by reference id.
///
/// Returns `DocumentUnreadable` when the document has no AcroForm or an
/// empty field list; batch callers catch that condition and carry on with
/// an empty result instead of aborting unrelated work.
pub fn read_fields(doc: &FormDocument) -> Result<Vec<RawField>> {
    let top = doc.acro_field_ids()?;
    let mut collected = Vec::new();
    let mut seen = HashSet::new();
    for id in top {
        collect_field(doc, id, None, &mut collected, &mut seen);
    }

    let mut by_id: IndexMap<String, RawField> = IndexMap::with_capacity(collected.len());
    for field in collected {
        match by_id.get_mut(&field.reference_id) {
            Some(existing) => {
                log::debug!(
                    "duplicate field id {} ({}), folding {} widget(s)",
                    field.reference_id,
                    field.name,
                    field.widgets.len()
                );
                existing.widgets.extend(field.widgets);
            }
            None => {
                by_id.insert(field.reference_id.clone(), field);
            }
        }
    }

    let fields: Vec<RawField> = by_id.into_values().collect();
    log::info!("read {} fields from {}", fields.len(), doc.source());
    Ok(fields)
}

fn collect_field(
    doc: &FormDocument,
    id: ObjectId,
    prefix: Option<&str>,
    out: &mut Vec<RawField>,
    seen: &mut HashSet<ObjectId>,
) {
    if !seen.insert(id) {
        log::debug!("field {} already visited, skipping", reference_string(id));
        return;
    }
    let Some(dict) = doc.dict(id) else {
        log::warn!("field {} is not a dictionary, skipping", reference_string(id));
        return;
    };

    let partial = doc.text_of(dict, b"T");
    let kids = doc.kid_ids(dict);

    // A bare widget annotation listed at the top level aliases its parent
    // field; process the parent once instead of emitting a nameless field.
    if partial.is_none() && kids.is_empty() {
        if let Some(parent_id) = dict.get(b"Parent").ok().and_then(|o| o.as_reference().ok()) {
            if doc.dict(parent_id).is_some() {
                collect_field(doc, parent_id, prefix, out, seen);
                return;
            }
        }
    }

    let qualified = match (prefix, partial.as_deref()) {
        (Some(p), Some(t)) => format!("{p}.{t}"),
        (Some(p), None) => p.to_string(),
        (None, Some(t)) => t.to_string(),
        (None, None) => reference_string(id),
    };
    let child_fields: Vec<ObjectId> = kids
        .iter()
        .copied()
        .filter(|kid| doc.dict(*kid).map(|d| d.has(b"T")).unwrap_or(false))
        .collect();

    if !child_fields.is_empty() {
        // Intermediate grouping node: recurse, do not emit.
        for kid in child_fields {
            collect_field(doc, kid, Some(&qualified), out, seen);
        }
        return;
    }

    // Terminal field. Kids, if any, are widget annotations.
    let widgets = if kids.is_empty() {
        vec![widget_from(doc, id, dict)]
    } else {
        kids.iter()
            .filter_map(|&kid| doc.dict(kid).map(|d| widget_from(doc, kid, d)))
            .collect()
    };

    let flags = flags_of(doc, dict);
    let field_type = field_type_of(doc, dict);
    let kind = infer_kind(field_type.as_deref(), flags, &qualified);

    out.push(RawField {
        name: qualified,
        reference_id: reference_string(id),
        id,
        kind,
        value: doc.value_of(id),
        options: doc.choice_options(id),
        tooltip: doc.text_of(dict, b"TU"),
        alt_tooltip: doc.text_of(dict, b"TM"),
        field_rect: doc.rect_of(dict),
        widgets,
    });
}

fn widget_from(doc: &FormDocument, id: ObjectId, dict: &Dictionary) -> Widget {
    let page = dict
        .get(b"P")
        .ok()
        .and_then(|obj| obj.as_reference().ok())
        .and_then(|page_id| doc.page_number_of(page_id));
    Widget {
        id,
        page,
        rect: doc.rect_of(dict),
    }
}

/// `/FT`, walking `/Parent` links for inherited entries.
fn field_type_of(doc: &FormDocument, dict: &Dictionary) -> Option<String> {
    inherited_entry(doc, dict, |d| doc.text_of(d, b"FT"))
}

/// `/Ff` flag word, walking `/Parent` links for inherited entries.
fn flags_of(doc: &FormDocument, dict: &Dictionary) -> u32 {
    inherited_entry(doc, dict, |d| {
        d.get(b"Ff")
            .ok()
            .and_then(|obj| doc.resolve(obj).as_i64().ok())
    })
    .unwrap_or(0) as u32
}

fn inherited_entry<T>(
    doc: &FormDocument,
    dict: &Dictionary,
    read: impl Fn(&Dictionary) -> Option<T>,
) -> Option<T> {
    let mut current = dict;
    for _ in 0..8 {
        if let Some(value) = read(current) {
            return Some(value);
        }
        let parent_id = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.dict(parent_id)?;
    }
    None
}

/// Map `/FT` + flags + the form's naming vocabulary onto a [`FieldKind`].
fn infer_kind(field_type: Option<&str>, flags: u32, name: &str) -> FieldKind {
    match field_type {
        Some("Tx") => {
            if is_date_name(name) {
                FieldKind::Date
            } else {
                FieldKind::Text
            }
        }
        Some("Btn") => {
            if flags & field_flags::RADIO != 0 {
                FieldKind::Radio
            } else if flags & field_flags::PUSHBUTTON != 0 {
                // Pushbuttons hold no value; treat as checkbox-shaped.
                log::debug!("pushbutton field {name} mapped to checkbox kind");
                FieldKind::Checkbox
            } else {
                FieldKind::Checkbox
            }
        }
        Some("Ch") => FieldKind::Dropdown,
        Some("Sig") => FieldKind::Signature,
        _ => FieldKind::Text,
    }
}

/// The form names its date widgets `From_Datefield_Name_2[0]` and similar.
fn is_date_name(name: &str) -> bool {
    let last = name.rsplit('.').next().unwrap_or(name);
    last.to_ascii_lowercase().contains("datefield")
}
