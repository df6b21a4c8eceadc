//! Shared fixture builder for integration tests.
//!
//! Builds small synthetic AcroForm documents with the same naming
//! vocabulary as the real 136-page form, saved through lopdf so every
//! test runs against genuinely parsed bytes.

// Not every test target uses every builder method.
#![allow(dead_code)]

use formatlas::FormDocument;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};

pub struct FormBuilder {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    annots: Vec<Vec<Object>>,
    fields: Vec<Object>,
}

impl FormBuilder {
    pub fn new(page_count: usize) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_ids: Vec<ObjectId> = (0..page_count).map(|_| doc.new_object_id()).collect();
        Self {
            doc,
            pages_id,
            page_ids,
            annots: vec![Vec::new(); page_count],
            fields: Vec::new(),
        }
    }

    fn page_ref(&self, page: u32) -> ObjectId {
        self.page_ids[(page - 1) as usize]
    }

    fn push_field(&mut self, id: ObjectId, dict: Dictionary, page: Option<u32>) {
        self.doc.max_id = self.doc.max_id.max(id.0);
        self.doc.objects.insert(id, Object::Dictionary(dict));
        self.fields.push(Object::Reference(id));
        if let Some(page) = page {
            self.annots[(page - 1) as usize].push(Object::Reference(id));
        }
    }

    /// List an already-added field a second time in `/Fields`.
    pub fn relist_field(&mut self, id: ObjectId) {
        self.fields.push(Object::Reference(id));
    }

    pub fn text_field(&mut self, name: &str, page: u32, rect: [i64; 4]) -> ObjectId {
        let id = self.doc.new_object_id();
        self.text_field_at(id, name, page, rect);
        id
    }

    /// Text field pinned at a chosen object number, for reference-id tests.
    pub fn text_field_at(&mut self, id: ObjectId, name: &str, page: u32, rect: [i64; 4]) {
        let dict = dictionary! {
            "FT" => "Tx",
            "T" => Object::string_literal(name),
            "P" => self.page_ref(page),
            "Rect" => rect_array(rect),
        };
        self.push_field(id, dict, Some(page));
    }

    /// Text field with neither `/Rect` nor a page, for sentinel-geometry tests.
    pub fn detached_text_field(&mut self, name: &str) -> ObjectId {
        let id = self.doc.new_object_id();
        let dict = dictionary! {
            "FT" => "Tx",
            "T" => Object::string_literal(name),
        };
        self.push_field(id, dict, None);
        id
    }

    pub fn checkbox(&mut self, name: &str, page: u32, rect: [i64; 4]) -> ObjectId {
        let id = self.doc.new_object_id();
        let dict = dictionary! {
            "FT" => "Btn",
            "T" => Object::string_literal(name),
            "P" => self.page_ref(page),
            "Rect" => rect_array(rect),
            "V" => Object::Name(b"Off".to_vec()),
            "AS" => Object::Name(b"Off".to_vec()),
            "AP" => Object::Dictionary(dictionary! {
                "N" => Object::Dictionary(dictionary! {
                    "Yes" => Object::Null,
                    "Off" => Object::Null,
                }),
            }),
        };
        self.push_field(id, dict, Some(page));
        id
    }

    pub fn dropdown(&mut self, name: &str, page: u32, rect: [i64; 4], options: &[&str]) -> ObjectId {
        let id = self.doc.new_object_id();
        let opts: Vec<Object> = options.iter().map(|o| Object::string_literal(*o)).collect();
        let dict = dictionary! {
            "FT" => "Ch",
            "Ff" => (1i64 << 17),
            "T" => Object::string_literal(name),
            "P" => self.page_ref(page),
            "Rect" => rect_array(rect),
            "Opt" => opts,
        };
        self.push_field(id, dict, Some(page));
        id
    }

    /// Radio group with one widget per state, every widget on the same page.
    pub fn radio_group(&mut self, name: &str, page: u32, states: &[&str]) -> ObjectId {
        let group_id = self.doc.new_object_id();
        let mut kids = Vec::new();
        for (i, state) in states.iter().enumerate() {
            let y = 600 - (i as i64) * 20;
            let widget_id = self.doc.add_object(dictionary! {
                "Subtype" => "Widget",
                "Parent" => group_id,
                "P" => self.page_ref(page),
                "Rect" => rect_array([72, y, 86, y + 14]),
                "AS" => Object::Name(b"Off".to_vec()),
                "AP" => Object::Dictionary(dictionary! {
                    "N" => Object::Dictionary(dictionary! {
                        state.as_bytes() => Object::Null,
                        "Off" => Object::Null,
                    }),
                }),
            });
            kids.push(Object::Reference(widget_id));
            self.annots[(page - 1) as usize].push(Object::Reference(widget_id));
        }
        let dict = dictionary! {
            "FT" => "Btn",
            "Ff" => (1i64 << 15),
            "T" => Object::string_literal(name),
            "Kids" => kids,
        };
        self.push_field(group_id, dict, None);
        group_id
    }

    pub fn build_bytes(mut self) -> Vec<u8> {
        for (i, &page_id) in self.page_ids.iter().enumerate() {
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            };
            if !self.annots[i].is_empty() {
                page.set("Annots", Object::Array(self.annots[i].clone()));
            }
            self.doc.objects.insert(page_id, Object::Dictionary(page));
        }
        let kids: Vec<Object> = self.page_ids.iter().map(|&id| Object::Reference(id)).collect();
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.page_ids.len() as i64,
            }),
        );
        let fields = std::mem::take(&mut self.fields);
        let acroform_id = self.doc.add_object(dictionary! { "Fields" => fields });
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
            "AcroForm" => Object::Reference(acroform_id),
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        self.doc.save_to(&mut buf).expect("fixture should serialize");
        buf
    }

    pub fn build(self) -> FormDocument {
        let bytes = self.build_bytes();
        FormDocument::from_bytes(&bytes, "fixture").expect("fixture should load")
    }
}

fn rect_array(rect: [i64; 4]) -> Vec<Object> {
    rect.iter().map(|&v| v.into()).collect()
}
