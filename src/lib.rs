// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::match_like_matches_macro)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # Formatlas
//!
//! Field hierarchy extraction and bidirectional value mapping for large
//! fixed-layout AcroForm documents.
//!
//! ## Core Features
//!
//! ### Extraction
//! - **Raw Field Reading**: full `/AcroForm` tree walk with qualified
//!   names, kind inference, and reference-id deduplication
//! - **Label Resolution**: tooltip, secondary tooltip, then humanized
//!   internal name
//! - **Geometry Resolution**: widget rect, page annotation scan, legacy
//!   field rect, with the winning strategy recorded per field
//! - **Section Classification**: an ordered regex rule table over names
//!   and labels, backed by a page-range fallback, with confidence scores
//! - **Hierarchy Assembly**: per-section groups, subsection rollups with
//!   representative patterns, anomaly detection, coverage statistics
//!
//! ### Mapping & Validation
//! - **Structured-Data Flattening**: recursive leaf extraction from
//!   nested JSON with breadcrumb paths
//! - **Reference Normalization**: `"9502"`, `"9502 0"`, and
//!   `"9502 0 R"` all address the same object
//! - **Type-Aware Fill**: text, date, dropdown, radio, and checkbox
//!   dispatch with option and state validation
//! - **Round-Trip Validation**: fill, save, reload, diff, aggregated
//!   into JSON and text reports
//!
//! ## Quick Start
//!
//! ```ignore
//! use formatlas::config::EngineConfig;
//! use formatlas::hierarchy;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::new();
//! let run = hierarchy::extract_from_path("sf86.pdf".as_ref(), &config);
//! if let Some(err) = &run.error {
//!     eprintln!("unreadable document: {err}");
//! }
//! for (key, group) in &run.hierarchy.sections {
//!     println!("{key}: {} fields ({})", group.field_count, group.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Document access primitives over lopdf
pub mod document;
pub mod geometry;

// Extraction pipeline
pub mod classifier;
pub mod hierarchy;
pub mod reader;
pub mod resolver;

// Structured data mapping and fill validation
pub mod mapper;
pub mod validator;

// Configuration and the fixed section registry
pub mod config;
pub mod sections;

// Re-exports
pub use classifier::{classify_fields, ClassifiedField};
pub use config::{EngineConfig, GeometryPenalties};
pub use document::FormDocument;
pub use error::{Error, Result};
pub use hierarchy::{extract_from_document, extract_from_path, ExtractionRun, FieldHierarchy};
pub use mapper::{
    apply_values, flatten_values, normalize_reference_id, verify_values, Discrepancy, FieldLookup,
    FillOutcome, FlatEntry,
};
pub use reader::{read_fields, FieldKind, RawField};
pub use resolver::{resolve_label, resolve_placement, GeometrySource, ResolvedPlacement};
pub use validator::{validate_batch, validate_section, FillValidationReport, SectionOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
