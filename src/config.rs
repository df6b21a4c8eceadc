//! Engine configuration.
//!
//! Classification thresholds, confidence penalties, and the per-section
//! page-range table are calibration data, not constants: every knob here
//! has a default tuned for the known 136-page form layout and can be
//! overridden by the caller before a run.

use crate::classifier::pages::PageRangeTable;
use crate::resolver::GeometrySource;

/// Confidence penalties applied per geometry resolution strategy.
///
/// Weaker strategies pay a larger penalty, so confidence stays
/// monotone in the reliability of the path that produced the rect.
#[derive(Debug, Clone, Copy)]
pub struct GeometryPenalties {
    /// Direct widget rectangle (most reliable).
    pub widget_rect: f32,
    /// Rectangle recovered from the page's annotation list.
    pub page_annotation: f32,
    /// Legacy field-level rectangle.
    pub field_rect: f32,
    /// No strategy succeeded; sentinel rect in effect.
    pub unresolved: f32,
}

impl Default for GeometryPenalties {
    fn default() -> Self {
        Self {
            widget_rect: 0.0,
            page_annotation: 0.02,
            field_rect: 0.04,
            unresolved: 0.05,
        }
    }
}

impl GeometryPenalties {
    /// Penalty for the given resolution source.
    pub fn for_source(&self, source: GeometrySource) -> f32 {
        match source {
            GeometrySource::WidgetRect => self.widget_rect,
            GeometrySource::PageAnnotation => self.page_annotation,
            GeometrySource::FieldRect => self.field_rect,
            GeometrySource::Unresolved => self.unresolved,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Subsections with fewer fields than this are flagged as orphaned.
    pub orphan_threshold: usize,

    /// Maximum representative name patterns extracted per subsection group.
    pub max_group_patterns: usize,

    /// Confidence penalty when a rule matched the label but not the name.
    pub label_match_penalty: f32,

    /// Per-strategy geometry penalties.
    pub geometry_penalties: GeometryPenalties,

    /// Base confidence for page-range fallback classification.
    pub page_fallback_confidence: f32,

    /// Hard ceiling on page-range fallback confidence.
    pub page_fallback_cap: f32,

    /// Section-to-page-range table used by the fallback path.
    pub page_ranges: PageRangeTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    /// Create a configuration with defaults for the known form layout.
    pub fn new() -> Self {
        Self {
            orphan_threshold: 3,
            max_group_patterns: 3,
            label_match_penalty: 0.05,
            geometry_penalties: GeometryPenalties::default(),
            page_fallback_confidence: 0.55,
            page_fallback_cap: 0.70,
            page_ranges: PageRangeTable::default(),
        }
    }

    /// Override the orphaned-subsection field-count threshold.
    pub fn with_orphan_threshold(mut self, threshold: usize) -> Self {
        self.orphan_threshold = threshold;
        self
    }

    /// Override the number of representative patterns kept per group.
    pub fn with_max_group_patterns(mut self, max: usize) -> Self {
        self.max_group_patterns = max;
        self
    }

    /// Override the label-match confidence penalty.
    pub fn with_label_match_penalty(mut self, penalty: f32) -> Self {
        self.label_match_penalty = penalty;
        self
    }

    /// Override the geometry penalty schedule.
    pub fn with_geometry_penalties(mut self, penalties: GeometryPenalties) -> Self {
        self.geometry_penalties = penalties;
        self
    }

    /// Override the page-fallback base confidence and cap.
    pub fn with_page_fallback(mut self, base: f32, cap: f32) -> Self {
        self.page_fallback_confidence = base;
        self.page_fallback_cap = cap;
        self
    }

    /// Replace the section page-range table.
    pub fn with_page_ranges(mut self, table: PageRangeTable) -> Self {
        self.page_ranges = table;
        self
    }
}
