//! Label and geometry resolution.
//!
//! Every field gets a label: tooltip, then the secondary tooltip, then a
//! humanized rendering of its internal name. Geometry runs through a fixed
//! chain of strategies of decreasing reliability; the strategy that
//! succeeded is recorded and later feeds confidence weighting. No strategy
//! succeeding yields the sentinel rect, never a made-up one.

use lopdf::ObjectId;
use serde::{Deserialize, Serialize};

use crate::document::FormDocument;
use crate::geometry::Rect;
use crate::reader::RawField;

/// Which geometry strategy produced a field's rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeometrySource {
    /// Direct `/Rect` on a widget.
    WidgetRect,
    /// Recovered by scanning the page's annotation list.
    PageAnnotation,
    /// Legacy `/Rect` on the field dictionary itself.
    FieldRect,
    /// No strategy succeeded; the sentinel rect is in effect.
    Unresolved,
}

/// Resolved on-page placement for one field.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedPlacement {
    /// 1-based page number, when it could be determined.
    pub page: Option<u32>,
    /// User-space rectangle; the sentinel when unresolved.
    pub rect: Rect,
    /// Strategy that produced `rect`.
    pub source: GeometrySource,
}

/// Derive a display label for a field.
pub fn resolve_label(field: &RawField) -> String {
    if let Some(tooltip) = non_empty(field.tooltip.as_deref()) {
        return tooltip.to_string();
    }
    if let Some(alt) = non_empty(field.alt_tooltip.as_deref()) {
        return alt.to_string();
    }
    humanize_name(&field.name)
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// Humanize an internal field name: take the last path component, drop
/// index brackets, split on underscores/dashes/case boundaries, and
/// title-case the words.
pub fn humanize_name(name: &str) -> String {
    let last = name.rsplit('.').next().unwrap_or(name);
    let base: String = last
        .chars()
        .take_while(|&c| c != '[')
        .filter(|&c| c != '#')
        .collect();

    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;
    for c in base.chars() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev = None;
            continue;
        }
        let boundary = match prev {
            Some(p) => {
                (c.is_uppercase() && p.is_lowercase())
                    || (c.is_ascii_digit() && p.is_alphabetic())
                    || (c.is_alphabetic() && p.is_ascii_digit())
            }
            None => false,
        };
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
        prev = Some(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    let titled: Vec<String> = words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    titled.join(" ")
}

/// Resolve page and rectangle for a field through the strategy chain:
/// widget `/Rect`, then page-annotation cross-reference, then field-level
/// `/Rect`, then the sentinel.
pub fn resolve_placement(doc: &FormDocument, field: &RawField) -> ResolvedPlacement {
    let page = resolve_page(doc, field);

    let strategies: [(GeometrySource, Option<Rect>); 3] = [
        (GeometrySource::WidgetRect, widget_rect(field)),
        (
            GeometrySource::PageAnnotation,
            page.and_then(|p| annotation_rect(doc, field, p)),
        ),
        (GeometrySource::FieldRect, field.field_rect),
    ];
    for (source, rect) in strategies {
        if let Some(rect) = rect {
            return ResolvedPlacement { page, rect, source };
        }
    }

    log::debug!("no geometry resolved for field {}", field.name);
    ResolvedPlacement {
        page,
        rect: Rect::sentinel(),
        source: GeometrySource::Unresolved,
    }
}

/// Page via widget `/P` identity first, then by scanning page annotation
/// lists for the widget's own object id.
fn resolve_page(doc: &FormDocument, field: &RawField) -> Option<u32> {
    field
        .widgets
        .iter()
        .find_map(|w| w.page)
        .or_else(|| {
            field
                .widgets
                .iter()
                .find_map(|w| doc.page_of_annotation(w.id))
        })
}

fn widget_rect(field: &RawField) -> Option<Rect> {
    field.widgets.iter().find_map(|w| w.rect)
}

/// Scan the page's `/Annots` for an entry that is one of the field's
/// widgets or points back at the field via `/Parent`, and read its rect.
fn annotation_rect(doc: &FormDocument, field: &RawField, page: u32) -> Option<Rect> {
    let widget_ids: Vec<ObjectId> = field.widgets.iter().map(|w| w.id).collect();
    for annot_id in doc.page_annotations(page) {
        let related = widget_ids.contains(&annot_id) || annot_parent(doc, annot_id) == Some(field.id);
        if !related {
            continue;
        }
        if let Some(rect) = doc.dict(annot_id).and_then(|d| doc.rect_of(d)) {
            return Some(rect);
        }
    }
    None
}

fn annot_parent(doc: &FormDocument, annot_id: ObjectId) -> Option<ObjectId> {
    doc.dict(annot_id)?
        .get(b"Parent")
        .ok()?
        .as_reference()
        .ok()
}
