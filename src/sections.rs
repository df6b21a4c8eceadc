//! Static registry of the known form sections.
//!
//! The form's own numbering scheme: 30 sections, some with lettered
//! subsections and repeatable entry blocks. Repeatability and entry
//! limits are properties of the printed form, not inferred from field
//! data.

/// Static description of one known section.
#[derive(Debug, Clone, Copy)]
pub struct SectionSpec {
    /// Section number as printed on the form.
    pub number: u16,
    /// Canonical section title.
    pub name: &'static str,
    /// Whether the section repeats as numbered entry blocks.
    pub is_repeatable: bool,
    /// Entry-block limit for repeatable sections.
    pub max_entries: Option<u8>,
    /// Subsection letters the section is expected to carry.
    pub subsections: &'static [&'static str],
}

/// All known sections in form order.
pub const SECTIONS: [SectionSpec; 30] = [
    SectionSpec { number: 1, name: "Full Name", is_repeatable: false, max_entries: None, subsections: &[] },
    SectionSpec { number: 2, name: "Date of Birth", is_repeatable: false, max_entries: None, subsections: &[] },
    SectionSpec { number: 3, name: "Place of Birth", is_repeatable: false, max_entries: None, subsections: &[] },
    SectionSpec { number: 4, name: "Social Security Number", is_repeatable: false, max_entries: None, subsections: &[] },
    SectionSpec { number: 5, name: "Other Names Used", is_repeatable: true, max_entries: Some(4), subsections: &[] },
    SectionSpec { number: 6, name: "Your Identifying Information", is_repeatable: false, max_entries: None, subsections: &[] },
    SectionSpec { number: 7, name: "Your Contact Information", is_repeatable: false, max_entries: None, subsections: &[] },
    SectionSpec { number: 8, name: "U.S. Passport Information", is_repeatable: false, max_entries: None, subsections: &[] },
    SectionSpec { number: 9, name: "Citizenship", is_repeatable: false, max_entries: None, subsections: &[] },
    SectionSpec { number: 10, name: "Dual/Multiple Citizenship & Foreign Passport Information", is_repeatable: true, max_entries: Some(2), subsections: &[] },
    SectionSpec { number: 11, name: "Where You Have Lived", is_repeatable: true, max_entries: Some(4), subsections: &[] },
    SectionSpec { number: 12, name: "Where You Went To School", is_repeatable: true, max_entries: Some(3), subsections: &[] },
    SectionSpec { number: 13, name: "Employment Activities", is_repeatable: true, max_entries: Some(4), subsections: &["A", "B", "C"] },
    SectionSpec { number: 14, name: "Selective Service Record", is_repeatable: false, max_entries: None, subsections: &[] },
    SectionSpec { number: 15, name: "Military History", is_repeatable: true, max_entries: Some(3), subsections: &[] },
    SectionSpec { number: 16, name: "People Who Know You Well", is_repeatable: true, max_entries: Some(3), subsections: &[] },
    SectionSpec { number: 17, name: "Marital/Relationship Status", is_repeatable: true, max_entries: Some(3), subsections: &["A", "B", "C"] },
    SectionSpec { number: 18, name: "Relatives", is_repeatable: true, max_entries: Some(6), subsections: &["A", "B", "C"] },
    SectionSpec { number: 19, name: "Foreign Contacts", is_repeatable: true, max_entries: Some(4), subsections: &[] },
    SectionSpec { number: 20, name: "Foreign Activities", is_repeatable: false, max_entries: None, subsections: &["A", "B", "C"] },
    SectionSpec { number: 21, name: "Psychological and Emotional Health", is_repeatable: false, max_entries: None, subsections: &["A", "B", "C", "D", "E"] },
    SectionSpec { number: 22, name: "Police Record", is_repeatable: false, max_entries: None, subsections: &["A", "B", "C"] },
    SectionSpec { number: 23, name: "Illegal Use of Drugs or Drug Activity", is_repeatable: false, max_entries: None, subsections: &["A", "B"] },
    SectionSpec { number: 24, name: "Use of Alcohol", is_repeatable: false, max_entries: None, subsections: &[] },
    SectionSpec { number: 25, name: "Investigations and Clearance Record", is_repeatable: false, max_entries: None, subsections: &[] },
    SectionSpec { number: 26, name: "Financial Record", is_repeatable: false, max_entries: None, subsections: &["A", "B", "C", "D", "E", "F", "G"] },
    SectionSpec { number: 27, name: "Use of Information Technology Systems", is_repeatable: false, max_entries: None, subsections: &["A", "B", "C"] },
    SectionSpec { number: 28, name: "Involvement in Non-Criminal Court Actions", is_repeatable: false, max_entries: None, subsections: &[] },
    SectionSpec { number: 29, name: "Association Record", is_repeatable: false, max_entries: None, subsections: &["A", "B", "C", "D", "E"] },
    SectionSpec { number: 30, name: "Continuation Space", is_repeatable: false, max_entries: None, subsections: &[] },
];

/// Look up the static description of a section, if it is a known one.
pub fn spec_for(section: u16) -> Option<&'static SectionSpec> {
    SECTIONS.iter().find(|s| s.number == section)
}

/// Canonical section title; "Unclassified" for the sentinel section 0.
pub fn section_name(section: u16) -> &'static str {
    if section == 0 {
        return "Unclassified";
    }
    spec_for(section).map(|s| s.name).unwrap_or("Unknown")
}

/// Subsection letters a section is expected to carry (empty when none).
pub fn expected_subsections(section: u16) -> &'static [&'static str] {
    spec_for(section).map(|s| s.subsections).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_sections_1_through_30() {
        assert_eq!(SECTIONS.len(), 30);
        for (i, spec) in SECTIONS.iter().enumerate() {
            assert_eq!(spec.number as usize, i + 1);
        }
    }

    #[test]
    fn test_section_name_lookup() {
        assert_eq!(section_name(13), "Employment Activities");
        assert_eq!(section_name(21), "Psychological and Emotional Health");
        assert_eq!(section_name(0), "Unclassified");
        assert_eq!(section_name(99), "Unknown");
    }

    #[test]
    fn test_expected_subsections() {
        assert_eq!(expected_subsections(18), &["A", "B", "C"]);
        assert_eq!(expected_subsections(21), &["A", "B", "C", "D", "E"]);
        assert!(expected_subsections(4).is_empty());
        assert!(expected_subsections(0).is_empty());
    }

    #[test]
    fn test_repeatable_sections_have_limits() {
        let employment = spec_for(13).unwrap();
        assert!(employment.is_repeatable);
        assert_eq!(employment.max_entries, Some(4));

        let ssn = spec_for(4).unwrap();
        assert!(!ssn.is_repeatable);
        assert_eq!(ssn.max_entries, None);
    }
}
