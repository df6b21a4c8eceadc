//! Section page-range table for positional fallback.
//!
//! Hand-calibrated against the known 136-page form layout. When a field's
//! name and label match no rule, the classifier assigns the lowest section
//! whose page range contains the field's page. The table is calibration
//! data: overrides can be replaced wholesale through the engine
//! configuration, and sections without an override fall back to the
//! historical `5 + (n - 1) * 4` four-page stride.

use std::collections::BTreeMap;

/// Highest section number the form defines.
pub const MAX_SECTION: u16 = 30;

const FALLBACK_START: u32 = 5;
const FALLBACK_STRIDE: u32 = 4;

/// Inclusive page ranges per section.
#[derive(Debug, Clone)]
pub struct PageRangeTable {
    overrides: BTreeMap<u16, (u32, u32)>,
}

impl Default for PageRangeTable {
    fn default() -> Self {
        // Sections 1-4 share the opening page; ambiguity resolves to the
        // lowest section, which is all the positional signal offers there.
        let table = [
            (1, (5, 5)),
            (2, (5, 5)),
            (3, (5, 5)),
            (4, (5, 5)),
            (5, (6, 6)),
            (6, (7, 7)),
            (7, (8, 8)),
            (8, (9, 9)),
            (9, (10, 12)),
            (10, (13, 13)),
            (11, (14, 19)),
            (12, (20, 22)),
            (13, (23, 52)),
            (14, (53, 53)),
            (15, (54, 59)),
            (16, (60, 62)),
            (17, (63, 68)),
            (18, (69, 78)),
            (19, (79, 86)),
            (20, (87, 102)),
            (21, (103, 106)),
            (22, (107, 112)),
            (23, (113, 116)),
            (24, (117, 120)),
            (25, (121, 123)),
            (26, (124, 131)),
            (27, (132, 133)),
            (28, (134, 134)),
            (29, (135, 135)),
            (30, (136, 136)),
        ];
        Self {
            overrides: table.into_iter().collect(),
        }
    }
}

impl PageRangeTable {
    /// A table with no overrides; every lookup uses the stride formula.
    pub fn empty() -> Self {
        Self {
            overrides: BTreeMap::new(),
        }
    }

    /// Set one section's inclusive page range.
    pub fn with_range(mut self, section: u16, start: u32, end: u32) -> Self {
        self.overrides.insert(section, (start, end));
        self
    }

    /// Inclusive page range for a section: override, else stride formula.
    pub fn range_for(&self, section: u16) -> (u32, u32) {
        if let Some(&range) = self.overrides.get(&section) {
            return range;
        }
        let start = FALLBACK_START + (section.saturating_sub(1) as u32) * FALLBACK_STRIDE;
        (start, start + FALLBACK_STRIDE - 1)
    }

    /// Lowest section whose range contains the page, if any.
    pub fn section_for_page(&self, page: u32) -> Option<u16> {
        (1..=MAX_SECTION).find(|&section| {
            let (start, end) = self.range_for(section);
            page >= start && page <= end
        })
    }
}
