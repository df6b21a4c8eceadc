//! Thin wrapper over the PDF object layer.
//!
//! `FormDocument` owns a loaded [`lopdf::Document`] and exposes exactly the
//! primitives the engine needs: the AcroForm field tree, page and annotation
//! lookups, text-string decoding, and type-appropriate value writes. All PDF
//! syntax handling stays inside `lopdf`; nothing above this module touches
//! raw objects.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

use crate::error::{Error, Result};
use crate::geometry::Rect;

/// Format an object id in the `N G R` reference form used as field ids.
pub fn reference_string(id: ObjectId) -> String {
    format!("{} {} R", id.0, id.1)
}

/// A loaded fillable document.
pub struct FormDocument {
    doc: Document,
    source: String,
    pages: BTreeMap<u32, ObjectId>,
}

impl std::fmt::Debug for FormDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormDocument")
            .field("source", &self.source)
            .field("page_count", &self.pages.len())
            .finish_non_exhaustive()
    }
}

impl FormDocument {
    /// Load a document from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let doc = Document::load(path).map_err(|e| Error::DocumentUnreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_document(doc, path.display().to_string()))
    }

    /// Load a document from an in-memory byte buffer.
    pub fn from_bytes(bytes: &[u8], label: &str) -> Result<Self> {
        let doc = Document::load_mem(bytes).map_err(|e| Error::DocumentUnreadable {
            path: label.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_document(doc, label.to_string()))
    }

    fn from_document(doc: Document, source: String) -> Self {
        let pages = doc.get_pages();
        Self { doc, source, pages }
    }

    /// Path or label this document was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &Document {
        &self.doc
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 1-based page number for a page object id, matched by identity.
    pub fn page_number_of(&self, page_id: ObjectId) -> Option<u32> {
        self.pages
            .iter()
            .find_map(|(&num, &id)| if id == page_id { Some(num) } else { None })
    }

    /// Object ids listed in the given page's `/Annots` array.
    pub fn page_annotations(&self, page_number: u32) -> Vec<ObjectId> {
        let Some(&page_id) = self.pages.get(&page_number) else {
            return Vec::new();
        };
        let Some(page_dict) = self.dict(page_id) else {
            return Vec::new();
        };
        let Ok(annots) = page_dict.get(b"Annots") else {
            return Vec::new();
        };
        let annots = self.resolve(annots);
        let Ok(entries) = annots.as_array() else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| entry.as_reference().ok())
            .collect()
    }

    /// 1-based page number carrying the given annotation id, by scanning
    /// each page's `/Annots` list. Used when a widget has no usable `/P`.
    pub fn page_of_annotation(&self, annot_id: ObjectId) -> Option<u32> {
        for &num in self.pages.keys() {
            if self.page_annotations(num).contains(&annot_id) {
                return Some(num);
            }
        }
        None
    }

    /// Top-level field ids from the AcroForm `/Fields` array.
    ///
    /// Fails with `DocumentUnreadable` when the document carries no
    /// AcroForm dictionary or an empty field list.
    pub fn acro_field_ids(&self) -> Result<Vec<ObjectId>> {
        let catalog = self
            .doc
            .catalog()
            .map_err(|e| self.unreadable(e.to_string()))?;
        let acro = catalog
            .get(b"AcroForm")
            .map_err(|_| self.unreadable("no AcroForm dictionary".to_string()))?;
        let acro = self.resolve(acro);
        let acro = acro
            .as_dict()
            .map_err(|_| self.unreadable("AcroForm is not a dictionary".to_string()))?;
        let fields = acro
            .get(b"Fields")
            .map_err(|_| self.unreadable("AcroForm has no /Fields".to_string()))?;
        let fields = self.resolve(fields);
        let entries = fields
            .as_array()
            .map_err(|_| self.unreadable("/Fields is not an array".to_string()))?;
        let ids: Vec<ObjectId> = entries
            .iter()
            .filter_map(|entry| entry.as_reference().ok())
            .collect();
        if ids.is_empty() {
            return Err(self.unreadable("AcroForm field list is empty".to_string()));
        }
        Ok(ids)
    }

    fn unreadable(&self, reason: String) -> Error {
        Error::DocumentUnreadable {
            path: self.source.clone(),
            reason,
        }
    }

    /// Dictionary behind an object id, if it resolves to one.
    pub fn dict(&self, id: ObjectId) -> Option<&Dictionary> {
        self.doc.get_object(id).ok().and_then(|o| o.as_dict().ok())
    }

    /// Follow indirect references until a direct object is reached.
    pub fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        let mut current = obj;
        // Reference chains in real files are one hop; bound the walk anyway.
        for _ in 0..16 {
            match current {
                Object::Reference(id) => match self.doc.get_object(*id) {
                    Ok(next) => current = next,
                    Err(_) => return current,
                },
                other => return other,
            }
        }
        current
    }

    /// Parse a `/Rect` entry on a dictionary into user-space geometry.
    pub fn rect_of(&self, dict: &Dictionary) -> Option<Rect> {
        let entry = dict.get(b"Rect").ok()?;
        let array = self.resolve(entry).as_array().ok()?;
        if array.len() != 4 {
            return None;
        }
        let mut corners = [0.0f32; 4];
        for (slot, obj) in corners.iter_mut().zip(array.iter()) {
            *slot = match self.resolve(obj) {
                Object::Integer(i) => *i as f32,
                Object::Real(f) => *f,
                _ => return None,
            };
        }
        Some(Rect::from_points(
            corners[0], corners[1], corners[2], corners[3],
        ))
    }

    /// Decode a text-string entry (`/T`, `/TU`, string `/V`) on a dictionary.
    pub fn text_of(&self, dict: &Dictionary, key: &[u8]) -> Option<String> {
        let entry = dict.get(key).ok()?;
        match self.resolve(entry) {
            Object::String(bytes, _) => Some(decode_text_string(bytes)),
            Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
            _ => None,
        }
    }

    /// Current `/V` of a field dictionary, decoded to a display string.
    pub fn value_of(&self, field_id: ObjectId) -> Option<String> {
        let dict = self.dict(field_id)?;
        let entry = dict.get(b"V").ok()?;
        match self.resolve(entry) {
            Object::String(bytes, _) => Some(decode_text_string(bytes)),
            Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
            Object::Integer(i) => Some(i.to_string()),
            Object::Real(f) => Some(f.to_string()),
            Object::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .filter_map(|item| match self.resolve(item) {
                        Object::String(bytes, _) => Some(decode_text_string(bytes)),
                        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
                        _ => None,
                    })
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(", "))
                }
            }
            _ => None,
        }
    }

    /// Child ids from a field dictionary's `/Kids` array.
    pub fn kid_ids(&self, dict: &Dictionary) -> Vec<ObjectId> {
        let Ok(kids) = dict.get(b"Kids") else {
            return Vec::new();
        };
        let kids = self.resolve(kids);
        let Ok(entries) = kids.as_array() else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| entry.as_reference().ok())
            .collect()
    }

    /// The checkbox/radio "on" appearance state for a field: the first
    /// non-`Off` key in its own or its widgets' `/AP` `/N` dictionary.
    pub fn on_state_of(&self, field_id: ObjectId) -> Option<String> {
        let dict = self.dict(field_id)?;
        if let Some(state) = self.on_state_in(dict) {
            return Some(state);
        }
        for kid in self.kid_ids(dict) {
            if let Some(kid_dict) = self.dict(kid) {
                if let Some(state) = self.on_state_in(kid_dict) {
                    return Some(state);
                }
            }
        }
        None
    }

    fn on_state_in(&self, dict: &Dictionary) -> Option<String> {
        let ap = self.resolve(dict.get(b"AP").ok()?).as_dict().ok()?;
        let normal = self.resolve(ap.get(b"N").ok()?).as_dict().ok()?;
        for (key, _) in normal.iter() {
            if key.as_slice() != b"Off" {
                return Some(String::from_utf8_lossy(key).into_owned());
            }
        }
        None
    }

    /// All appearance-state names across a field's widgets (radio groups).
    pub fn appearance_states_of(&self, field_id: ObjectId) -> Vec<String> {
        let mut states = Vec::new();
        let Some(dict) = self.dict(field_id) else {
            return states;
        };
        let mut dicts: Vec<&Dictionary> = vec![dict];
        for kid in self.kid_ids(dict) {
            if let Some(kid_dict) = self.dict(kid) {
                dicts.push(kid_dict);
            }
        }
        for d in dicts {
            let Some(ap) = d.get(b"AP").ok().map(|o| self.resolve(o)) else {
                continue;
            };
            let Ok(ap) = ap.as_dict() else { continue };
            let Some(normal) = ap.get(b"N").ok().map(|o| self.resolve(o)) else {
                continue;
            };
            let Ok(normal) = normal.as_dict() else { continue };
            for (key, _) in normal.iter() {
                let name = String::from_utf8_lossy(key).into_owned();
                if name != "Off" && !states.contains(&name) {
                    states.push(name);
                }
            }
        }
        states
    }

    // ---- mutation ----

    /// Write a text value into a field's `/V`.
    pub fn set_text(&mut self, field_id: ObjectId, value: &str) -> Result<()> {
        let dict = self.field_dict_mut(field_id)?;
        dict.set("V", encode_text_string(value));
        Ok(())
    }

    /// Select a choice value, validating against `/Opt` when present.
    pub fn set_choice(&mut self, field_id: ObjectId, name: &str, value: &str) -> Result<()> {
        let options = self.choice_options(field_id);
        if !options.is_empty() && !options.iter().any(|o| o == value) {
            return Err(Error::InvalidOption {
                field: name.to_string(),
                value: value.to_string(),
            });
        }
        let dict = self.field_dict_mut(field_id)?;
        dict.set("V", encode_text_string(value));
        Ok(())
    }

    /// Select a radio-group state, updating `/V` and every widget's `/AS`.
    pub fn set_radio(&mut self, field_id: ObjectId, name: &str, value: &str) -> Result<()> {
        let states = self.appearance_states_of(field_id);
        if !states.is_empty() && !states.iter().any(|s| s == value) {
            return Err(Error::InvalidOption {
                field: name.to_string(),
                value: value.to_string(),
            });
        }
        let kid_ids = self
            .dict(field_id)
            .map(|d| self.kid_ids(d))
            .unwrap_or_default();

        let dict = self.field_dict_mut(field_id)?;
        dict.set("V", Object::Name(value.as_bytes().to_vec()));
        dict.set("AS", Object::Name(value.as_bytes().to_vec()));
        for kid in kid_ids {
            let has_state = self
                .dict(kid)
                .and_then(|d| self.on_state_in(d))
                .is_some_and(|s| s == value);
            let state = if has_state { value } else { "Off" };
            if let Ok(kid_dict) = self.field_dict_mut_raw(kid) {
                kid_dict.set("AS", Object::Name(state.as_bytes().to_vec()));
            }
        }
        Ok(())
    }

    /// Check or uncheck a checkbox, writing both `/V` and `/AS`.
    pub fn set_checkbox(&mut self, field_id: ObjectId, checked: bool) -> Result<()> {
        let on_state = self
            .on_state_of(field_id)
            .unwrap_or_else(|| "Yes".to_string());
        let state = if checked { on_state.as_str() } else { "Off" };
        let kid_ids = self
            .dict(field_id)
            .map(|d| self.kid_ids(d))
            .unwrap_or_default();

        let state_obj = Object::Name(state.as_bytes().to_vec());
        let dict = self.field_dict_mut(field_id)?;
        dict.set("V", state_obj.clone());
        dict.set("AS", state_obj.clone());
        for kid in kid_ids {
            if let Ok(kid_dict) = self.field_dict_mut_raw(kid) {
                kid_dict.set("AS", state_obj.clone());
            }
        }
        Ok(())
    }

    /// `/Opt` export values for a choice field.
    pub fn choice_options(&self, field_id: ObjectId) -> Vec<String> {
        let Some(dict) = self.dict(field_id) else {
            return Vec::new();
        };
        let Some(opt) = dict.get(b"Opt").ok().map(|o| self.resolve(o)) else {
            return Vec::new();
        };
        let Ok(entries) = opt.as_array() else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| match self.resolve(entry) {
                Object::String(bytes, _) => Some(decode_text_string(bytes)),
                // [export, display] pair: the export value is what /V holds
                Object::Array(pair) if !pair.is_empty() => match self.resolve(&pair[0]) {
                    Object::String(bytes, _) => Some(decode_text_string(bytes)),
                    _ => None,
                },
                _ => None,
            })
            .collect()
    }

    /// Ask viewers to regenerate widget appearances after programmatic fills.
    pub fn set_need_appearances(&mut self) -> Result<()> {
        let catalog = self.doc.catalog()?;
        let acro_entry = catalog.get(b"AcroForm").ok().cloned();
        match acro_entry {
            Some(Object::Reference(id)) => {
                let acro = self.doc.get_object_mut(id)?.as_dict_mut()?;
                acro.set("NeedAppearances", Object::Boolean(true));
            }
            Some(Object::Dictionary(mut acro)) => {
                acro.set("NeedAppearances", Object::Boolean(true));
                let root_id = self
                    .doc
                    .trailer
                    .get(b"Root")
                    .and_then(Object::as_reference)?;
                let catalog = self.doc.get_object_mut(root_id)?.as_dict_mut()?;
                catalog.set("AcroForm", Object::Dictionary(acro));
            }
            _ => {}
        }
        Ok(())
    }

    fn field_dict_mut(&mut self, field_id: ObjectId) -> Result<&mut Dictionary> {
        self.field_dict_mut_raw(field_id)
            .map_err(|_| Error::FieldMissing(reference_string(field_id)))
    }

    fn field_dict_mut_raw(&mut self, field_id: ObjectId) -> Result<&mut Dictionary> {
        let dict = self.doc.get_object_mut(field_id)?.as_dict_mut()?;
        Ok(dict)
    }

    // ---- persistence ----

    /// Save the document to a path.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.doc.save(path)?;
        Ok(())
    }

    /// Serialize the document to bytes.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.doc.save_to(&mut buf)?;
        Ok(buf)
    }
}

/// Decode a PDF text string: UTF-16BE with BOM, else UTF-8, else Latin-1.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter(|c| c.len() == 2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => bytes.iter().map(|&b| b as char).collect(),
        }
    }
}

/// Encode a value for a string `/V`: ASCII as a literal, else UTF-16BE.
pub fn encode_text_string(value: &str) -> Object {
    if value.is_ascii() {
        Object::string_literal(value)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in value.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Literal)
    }
}
