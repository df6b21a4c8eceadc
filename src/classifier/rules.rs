//! Ordered rule table mapping field names and labels to sections.
//!
//! Rules are evaluated strictly in table order. For each rule the field's
//! internal name is tried first, then its resolved label; the first rule
//! that matches either wins. Order therefore encodes precedence: subform
//! rules with subsection letters come before their section's container
//! rule, and keyword rules that could collide across sections (passport,
//! court, violence) are arranged so the more specific wording wins.

use lazy_static::lazy_static;
use regex::Regex;

/// One entry in the classification table.
pub struct NameRule {
    /// Section the rule assigns.
    pub section: u16,
    /// Subsection letter fixed by the rule itself, if any.
    pub subsection: Option<&'static str>,
    /// Base confidence before label and geometry penalties.
    pub confidence: f32,
    /// Compiled pattern, tried against name then label.
    pub pattern: Regex,
    /// Short description used in logs.
    pub description: &'static str,
}

fn rule(section: u16, confidence: f32, pattern: &str, description: &'static str) -> NameRule {
    NameRule {
        section,
        subsection: None,
        confidence,
        pattern: Regex::new(pattern).unwrap(),
        description,
    }
}

fn sub_rule(
    section: u16,
    subsection: &'static str,
    confidence: f32,
    pattern: &str,
    description: &'static str,
) -> NameRule {
    NameRule {
        section,
        subsection: Some(subsection),
        confidence,
        pattern: Regex::new(pattern).unwrap(),
        description,
    }
}

fn build_rules() -> Vec<NameRule> {
    vec![
        // Sections 1-4 share one page block; their fields live under a
        // combined container, so name rules key on the concrete widgets.
        rule(1, 0.95, r"(?i)sections1-6\[0\]\.textfield11\[[0-2]\]", "applicant name block"),
        rule(1, 0.80, r"(?i)\b(last|first|middle)\s*name\b", "name keywords"),
        rule(1, 0.72, r"(?i)\bsuffix\b", "name suffix"),
        rule(2, 0.95, r"(?i)sections1-6\[0\]\.from_datefield_name_2\[0\]", "date of birth field"),
        rule(2, 0.85, r"(?i)\bdate\s*of\s*birth\b", "date of birth label"),
        rule(2, 0.85, r"(?i)\bdob\b", "date of birth abbreviation"),
        rule(3, 0.85, r"(?i)\bplace\s*of\s*birth\b", "birthplace label"),
        rule(3, 0.78, r"(?i)\bbirth\s*(city|county|country|state)\b", "birthplace geography"),
        rule(4, 0.95, r"(?i)\bssn\[\d+\]", "ssn field array"),
        rule(4, 0.90, r"(?i)\bsocial\s*security\s*number\b", "ssn label"),
        rule(5, 0.90, r"(?i)section_?5[\[\-_.]", "section 5 container"),
        rule(5, 0.80, r"(?i)\bother\s*names?\s*used\b", "other names label"),
        rule(5, 0.75, r"(?i)\bmaiden\s*name\b", "maiden name"),
        rule(6, 0.90, r"(?i)section_?6[\[\-_.]", "section 6 container"),
        rule(6, 0.80, r"(?i)\b(hair|eye)\s*color\b", "physical description"),
        rule(6, 0.78, r"(?i)\bheight\b", "height"),
        rule(6, 0.78, r"(?i)\bweight\b", "weight"),
        rule(7, 0.90, r"(?i)section_?7[\[\-_.]", "section 7 container"),
        rule(7, 0.80, r"(?i)\b(home|work|mobile|cell)\s*(e-?mail|phone|telephone)\b", "contact labels"),
        rule(7, 0.78, r"(?i)\be-?mail\s*address\b", "email label"),
        rule(7, 0.75, r"(?i)\btelephone\s*number\b", "phone label"),
        rule(8, 0.90, r"(?i)section_?8[\[\-_.]", "section 8 container"),
        rule(8, 0.85, r"(?i)\bu\.?s\.?\s*passport\b", "us passport label"),
        rule(9, 0.92, r"(?i)section_?9\.1-9\.4", "citizenship subforms"),
        rule(9, 0.90, r"(?i)section_?9[\[\-_.]", "section 9 container"),
        rule(9, 0.80, r"(?i)\bcitizenship\b", "citizenship label"),
        rule(9, 0.78, r"(?i)\bnaturali[sz]", "naturalization"),
        rule(9, 0.75, r"(?i)\balien\s*registration\b", "alien registration"),
        rule(10, 0.90, r"(?i)section_?10[\[\-_.]", "section 10 container"),
        rule(10, 0.85, r"(?i)\bforeign\s*passport\b", "foreign passport label"),
        rule(10, 0.80, r"(?i)\bdual\s*citizen", "dual citizenship"),
        rule(11, 0.90, r"(?i)section_?11[\[\-_.]", "section 11 container"),
        rule(11, 0.78, r"(?i)\bresidence\b", "residence keyword"),
        rule(11, 0.72, r"(?i)\bneighbor", "neighbor reference"),
        rule(12, 0.90, r"(?i)section_?12[\[\-_.]", "section 12 container"),
        rule(12, 0.80, r"(?i)\b(school|college|university)\b", "education keywords"),
        rule(12, 0.76, r"(?i)\b(diploma|degree)\b", "credential keywords"),
        // Section 13 deliberately has no bare container rule: its entry
        // subforms always carry a digit suffix, and generic names under a
        // plain Section13 container are left to the page-range fallback.
        rule(13, 0.93, r"(?i)section_?13_[1-5]", "employment entry subforms"),
        rule(13, 0.82, r"(?i)\b(employer|employment|employee)\b", "employment keywords"),
        rule(13, 0.78, r"(?i)\bsupervisor\b", "supervisor block"),
        rule(13, 0.74, r"(?i)\bself-?employ", "self employment"),
        rule(13, 0.72, r"(?i)\bunemploy", "unemployment"),
        rule(14, 0.90, r"(?i)section_?14[\[\-_.]", "section 14 container"),
        rule(14, 0.85, r"(?i)selective\s*service", "selective service label"),
        rule(15, 0.90, r"(?i)section_?15[\[\-_.]", "section 15 container"),
        rule(15, 0.80, r"(?i)\bmilitary\b", "military keyword"),
        rule(15, 0.78, r"(?i)\b(army|navy|air\s*force|marine|coast\s*guard|national\s*guard)\b", "service branches"),
        rule(15, 0.74, r"(?i)\bdischarge", "discharge type"),
        rule(16, 0.90, r"(?i)section_?16[\[\-_.]", "section 16 container"),
        rule(16, 0.78, r"(?i)people\s*who\s*know\s*you", "verifier heading"),
        rule(16, 0.76, r"(?i)\bknows?\s*you\s*well\b", "verifier label"),
        rule(17, 0.92, r"(?i)section_?17_[1-3]", "marital entry subforms"),
        rule(17, 0.90, r"(?i)section_?17[\[\-_.]", "section 17 container"),
        rule(17, 0.80, r"(?i)\b(spouse|marital|marriage|married)\b", "marital keywords"),
        rule(17, 0.76, r"(?i)\b(divorc|widow|annul|separat)", "former status keywords"),
        rule(17, 0.74, r"(?i)\bcohabitant\b", "cohabitant block"),
        rule(18, 0.92, r"(?i)section_?18_[1-6]", "relative entry subforms"),
        rule(18, 0.90, r"(?i)section_?18[\[\-_.]", "section 18 container"),
        rule(18, 0.80, r"(?i)\brelative", "relative keyword"),
        rule(18, 0.76, r"(?i)\b(mother|father|stepmother|stepfather|child|sibling)\b", "relation types"),
        rule(19, 0.92, r"(?i)section_?19_[1-4]", "foreign contact subforms"),
        rule(19, 0.90, r"(?i)section_?19[\[\-_.]", "section 19 container"),
        rule(19, 0.80, r"(?i)foreign\s*(contact|national|friend)", "foreign contact keywords"),
        sub_rule(20, "A", 0.93, r"(?i)section_?20a", "foreign financial interests"),
        sub_rule(20, "B", 0.93, r"(?i)section_?20b", "foreign business activities"),
        sub_rule(20, "C", 0.93, r"(?i)section_?20c", "foreign travel"),
        rule(20, 0.90, r"(?i)section_?20[\[\-_.]", "section 20 container"),
        rule(20, 0.78, r"(?i)foreign\s*(financial|business|activit|travel|government|benefit)", "foreign activity keywords"),
        sub_rule(21, "A", 0.95, r"(?i)section_?21a", "mental incompetence declaration"),
        sub_rule(21, "B", 0.95, r"(?i)section_?21b", "court-ordered consultation"),
        sub_rule(21, "C", 0.95, r"(?i)section_?21c", "hospitalization"),
        sub_rule(21, "D", 0.95, r"(?i)section_?21d", "diagnosis record"),
        sub_rule(21, "E", 0.95, r"(?i)section_?21e", "current treatment"),
        rule(21, 0.90, r"(?i)section_?21[\[\-_.]", "section 21 container"),
        rule(21, 0.78, r"(?i)\b(mental|psycholog|psychiatr)", "mental health keywords"),
        rule(22, 0.92, r"(?i)section_?22_[1-6]", "police record subforms"),
        rule(22, 0.90, r"(?i)section_?22[\[\-_.]", "section 22 container"),
        rule(22, 0.80, r"(?i)\b(arrest|offense|charged|convict|sentenc)", "criminal history keywords"),
        rule(22, 0.76, r"(?i)\b(citation|probation|parole)\b", "court process keywords"),
        rule(22, 0.74, r"(?i)domestic\s*violence", "domestic violence"),
        rule(23, 0.92, r"(?i)section_?23_[1-2]", "drug use subforms"),
        rule(23, 0.90, r"(?i)section_?23[\[\-_.]", "section 23 container"),
        rule(23, 0.80, r"(?i)\b(drug|controlled\s*substance|narcotic)", "drug keywords"),
        rule(23, 0.76, r"(?i)\b(marijuana|cocaine|heroin|steroid|hallucinogen)", "substance names"),
        rule(24, 0.90, r"(?i)section_?24[\[\-_.]", "section 24 container"),
        rule(24, 0.80, r"(?i)\balcohol", "alcohol keyword"),
        rule(24, 0.74, r"(?i)\b(intoxicat|sobriety|drinking)", "alcohol effect keywords"),
        rule(25, 0.90, r"(?i)section_?25[\[\-_.]", "section 25 container"),
        rule(25, 0.80, r"(?i)\b(background\s*investigation|security\s*clearance)\b", "investigation keywords"),
        rule(25, 0.76, r"(?i)\bclearance\s*(level|action|granted)", "clearance detail keywords"),
        rule(25, 0.72, r"(?i)\bpolygraph\b", "polygraph"),
        rule(26, 0.92, r"(?i)section_?26_[1-7]", "financial record subforms"),
        rule(26, 0.90, r"(?i)section_?26[\[\-_.]", "section 26 container"),
        rule(26, 0.80, r"(?i)\b(bankrupt|delinquen|repossess|foreclos|garnish|lien|judgment)", "financial distress keywords"),
        rule(26, 0.76, r"(?i)\b(gambl|credit\s*counsel)", "financial obligation keywords"),
        rule(26, 0.72, r"(?i)\bdebt", "debt keyword"),
        rule(27, 0.90, r"(?i)section_?27[\[\-_.]", "section 27 container"),
        rule(27, 0.80, r"(?i)(information\s*technology|\bit\s*system)", "it systems keywords"),
        rule(27, 0.76, r"(?i)\b(unauthorized|illegal)\s*(access|entry)\b", "unauthorized access keywords"),
        rule(28, 0.90, r"(?i)section_?28[\[\-_.]", "section 28 container"),
        rule(28, 0.78, r"(?i)non-?criminal\s*court", "civil court keywords"),
        rule(28, 0.74, r"(?i)\bcivil\s*(action|court|suit)\b", "civil action keywords"),
        rule(29, 0.92, r"(?i)section_?29_[1-5]", "association subforms"),
        rule(29, 0.90, r"(?i)section_?29[\[\-_.]", "section 29 container"),
        rule(29, 0.80, r"(?i)\b(terror|overthrow|sabotage|sedition)", "association keywords"),
        rule(29, 0.72, r"(?i)\bviolen(ce|t)\b", "violence keyword"),
        rule(30, 0.90, r"(?i)section_?30[\[\-_.]", "section 30 container"),
        rule(30, 0.78, r"(?i)\bcontinuation\s*(space|sheet)\b", "continuation space"),
    ]
}

lazy_static! {
    /// The full classification table, in evaluation order.
    pub static ref NAME_RULES: Vec<NameRule> = build_rules();
    static ref SUBSECTION_DIRECT: Regex =
        Regex::new(r"(?i)section\s*_?(\d{1,2})\s*([a-g])(?:[^0-9a-z]|$)").unwrap();
    static ref SUBSECTION_DIGIT: Regex =
        Regex::new(r"(?i)section\s*_?(\d{1,2})_(\d)(?:[^0-9]|$)").unwrap();
    static ref SUBSECTION_LITERAL: Regex =
        Regex::new(r"(?i)subsection\s*_?([a-g])(?:[^0-9a-z]|$)").unwrap();
}

/// First rule whose pattern matches the name, else the label.
///
/// Returns the winning rule and whether the match came from the label,
/// which carries a small confidence penalty.
pub fn match_rules(name: &str, label: &str) -> Option<(&'static NameRule, bool)> {
    for rule in NAME_RULES.iter() {
        if rule.pattern.is_match(name) {
            return Some((rule, false));
        }
        if rule.pattern.is_match(label) {
            return Some((rule, true));
        }
    }
    None
}

/// Infer a subsection letter for an already-assigned section.
///
/// Strategies, first success wins: a `section<N><letter>` token whose
/// number agrees with the assigned section, a `section<N>_<digit>` token
/// mapped 1 to A and so on, a literal `subsection<letter>` token. Each is
/// tried against the name, then the whole chain against the label.
pub fn infer_subsection(section: u16, name: &str, label: &str) -> Option<String> {
    for text in [name, label] {
        if let Some(caps) = SUBSECTION_DIRECT.captures(text) {
            let number: u16 = caps[1].parse().unwrap_or(0);
            if number == section {
                return Some(caps[2].to_ascii_uppercase());
            }
        }
        if let Some(caps) = SUBSECTION_DIGIT.captures(text) {
            let number: u16 = caps[1].parse().unwrap_or(0);
            let digit: u8 = caps[2].parse().unwrap_or(0);
            if number == section && (1..=7).contains(&digit) {
                let letter = (b'A' + digit - 1) as char;
                return Some(letter.to_string());
            }
        }
        if let Some(caps) = SUBSECTION_LITERAL.captures(text) {
            return Some(caps[1].to_ascii_uppercase());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn match_name(name: &str) -> Option<(u16, Option<&'static str>, f32)> {
        match_rules(name, "").map(|(rule, _)| (rule.section, rule.subsection, rule.confidence))
    }

    #[test]
    fn test_table_compiles_and_is_nonempty() {
        assert!(NAME_RULES.len() > 80);
    }

    #[test]
    fn test_name_block_rules() {
        assert_eq!(
            match_name("form1[0].Sections1-6[0].TextField11[0]"),
            Some((1, None, 0.95))
        );
        assert_eq!(
            match_name("form1[0].Sections1-6[0].From_Datefield_Name_2[0]"),
            Some((2, None, 0.95))
        );
        assert_eq!(match_name("form1[0].Sections1-6[0].SSN[0]"), Some((4, None, 0.95)));
    }

    #[test]
    fn test_subform_letter_rules_fix_subsection() {
        let (section, subsection, confidence) =
            match_name("form1[0].Section21A-Incompetent[0].RadioButtonList[0]").unwrap();
        assert_eq!(section, 21);
        assert_eq!(subsection, Some("A"));
        assert!(confidence >= 0.95);
    }

    #[test]
    fn test_employment_requires_digit_suffix() {
        assert_eq!(match_name("form1[0].Section13_1-2[0].TextField11[3]").map(|m| m.0), Some(13));
        // A bare Section13 container is left to the page fallback.
        assert_eq!(match_name("form1[0].Section13[0].TextField1[0]"), None);
    }

    #[test]
    fn test_container_rules_do_not_cross_digit_boundaries() {
        assert_eq!(match_name("form1[0].Section11[0].p3-t68[3]").map(|m| m.0), Some(11));
        assert_eq!(match_name("form1[0].Section19_1[0].Name[0]").map(|m| m.0), Some(19));
        // Section11 must not be claimed by a hypothetical section 1 rule.
        assert_ne!(match_name("form1[0].Section11[0].p3-t68[3]").map(|m| m.0), Some(1));
    }

    #[test]
    fn test_label_match_reported() {
        let (rule, via_label) = match_rules("form1[0].p17-t4[2]", "Name of Employer").unwrap();
        assert_eq!(rule.section, 13);
        assert!(via_label);
    }

    #[test]
    fn test_passport_keywords_disambiguate() {
        assert_eq!(match_rules("x", "U.S. Passport Number").map(|(r, _)| r.section), Some(8));
        assert_eq!(match_rules("x", "Foreign Passport Number").map(|(r, _)| r.section), Some(10));
    }

    #[test]
    fn test_civil_court_is_not_police_record() {
        assert_eq!(
            match_rules("x", "Civil Court Action Details").map(|(r, _)| r.section),
            Some(28)
        );
        assert_eq!(
            match_rules("x", "Domestic violence protective order").map(|(r, _)| r.section),
            Some(22)
        );
    }

    #[test]
    fn test_subsection_direct_letter() {
        assert_eq!(
            infer_subsection(21, "form1[0].Section21A-Incompetent[0].f[0]", ""),
            Some("A".to_string())
        );
        // Letter token must agree with the assigned section.
        assert_eq!(infer_subsection(17, "form1[0].Section21A[0].f[0]", ""), None);
    }

    #[test]
    fn test_subsection_digit_mapping() {
        assert_eq!(
            infer_subsection(13, "form1[0].section13_1-2[0].f[0]", ""),
            Some("A".to_string())
        );
        assert_eq!(
            infer_subsection(13, "form1[0].Section_13_2[0].f[0]", ""),
            Some("B".to_string())
        );
        assert_eq!(
            infer_subsection(26, "form1[0].section26_7[0].f[0]", ""),
            Some("G".to_string())
        );
    }

    #[test]
    fn test_subsection_literal_and_label_fallback() {
        assert_eq!(
            infer_subsection(20, "form1[0].SubsectionB[0].f[0]", ""),
            Some("B".to_string())
        );
        assert_eq!(
            infer_subsection(20, "form1[0].p87[0].f[0]", "Section 20A Foreign Financial Interests"),
            Some("A".to_string())
        );
    }

    #[test]
    fn test_no_subsection_for_plain_containers() {
        assert_eq!(infer_subsection(13, "form1[0].Section13[0].TextField1[0]", ""), None);
        assert_eq!(infer_subsection(11, "form1[0].Section11[0].p3-t68[3]", ""), None);
    }
}
