//! Prompt Builder — renders the career-plan request for one employee.
//!
//! Pure and deterministic: the same employee, target role, taxonomy and
//! reference year always produce the same bytes.

use std::collections::HashSet;

use crate::analysis::prompts::{CAREER_PLAN_PROMPT_TEMPLATE, DEFAULT_TARGET_ROLE};
use crate::models::employee::EmployeeProfile;
use crate::models::taxonomy::TaxonomyEntry;

pub const MAX_PROMPT_SKILLS: usize = 8;
pub const MAX_PROMPT_COMPETENCIES: usize = 3;
pub const MAX_TAXONOMY_EXCERPT: usize = 10;

/// Target-role tokens must be longer than this to select taxonomy rows.
const MIN_ROLE_TOKEN_LEN: usize = 3;

pub fn build_career_prompt(
    employee: &EmployeeProfile,
    target_role: Option<&str>,
    taxonomy: &[TaxonomyEntry],
    reference_year: i32,
) -> String {
    let target_role = target_role.map(str::trim).filter(|r| !r.is_empty());

    let years_at_company = years_at_company(&employee.employment_info.hire_date, reference_year)
        .map(|y| y.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let skills = employee
        .skills
        .iter()
        .take(MAX_PROMPT_SKILLS)
        .map(|s| s.skill_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let competencies = employee
        .competencies
        .iter()
        .take(MAX_PROMPT_COMPETENCIES)
        .map(|c| c.summary())
        .collect::<Vec<_>>()
        .join(", ");

    let excerpt = taxonomy_excerpt(&employee.employment_info.department, target_role, taxonomy);
    let taxonomy_excerpt = if excerpt.is_empty() {
        "- (no closely related taxonomy skills found)".to_string()
    } else {
        excerpt
            .iter()
            .map(|s| format!("- {s}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    fill_template(
        CAREER_PLAN_PROMPT_TEMPLATE,
        &[
            ("name", &employee.personal_info.name),
            ("job_title", &employee.employment_info.job_title),
            ("department", &employee.employment_info.department),
            ("years_at_company", &years_at_company),
            ("skills", &or_none(&skills)),
            ("competencies", &or_none(&competencies)),
            ("target_role", target_role.unwrap_or(DEFAULT_TARGET_ROLE)),
            ("taxonomy_excerpt", &taxonomy_excerpt),
        ],
    )
}

/// Replaces each `{key}` in `template` with its value in a single pass.
///
/// Substituted text is never scanned again, so braces inside dataset values
/// stay literal. Braces that do not name a known key are copied through.
fn fill_template(template: &str, fields: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let substitution = tail[1..].find('}').and_then(|close| {
            let key = &tail[1..=close];
            fields
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close + 2))
        });
        match substitution {
            Some((value, consumed)) => {
                out.push_str(value);
                rest = &tail[consumed..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Whole years between the hire year and `reference_year`, never negative.
/// `None` when `hire_date` does not start with a four-digit year.
pub fn years_at_company(hire_date: &str, reference_year: i32) -> Option<i32> {
    let prefix = hire_date.trim().get(..4)?;
    if !prefix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hire_year: i32 = prefix.parse().ok()?;
    Some((reference_year - hire_year).max(0))
}

/// Up to ten distinct specialisations related to the department or role.
///
/// A row qualifies when its function label contains the department prefix
/// (text before the first `:`), or shares a token of more than three
/// characters with the target role. Comparison is case-insensitive.
pub fn taxonomy_excerpt(
    department: &str,
    target_role: Option<&str>,
    taxonomy: &[TaxonomyEntry],
) -> Vec<String> {
    let dept_prefix = department
        .split(':')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    let role_tokens: HashSet<String> = target_role
        .map(|role| significant_tokens(role).collect())
        .unwrap_or_default();

    let mut seen = HashSet::new();
    let mut excerpt = Vec::new();

    for entry in taxonomy {
        let label = entry.function_unit_skill.to_lowercase();

        let dept_match = !dept_prefix.is_empty() && label.contains(&dept_prefix);
        let role_match =
            !role_tokens.is_empty() && significant_tokens(&label).any(|t| role_tokens.contains(&t));
        if !(dept_match || role_match) {
            continue;
        }

        let specialisation = entry.specialisation_unit.trim();
        if specialisation.is_empty() || !seen.insert(specialisation.to_lowercase()) {
            continue;
        }
        excerpt.push(specialisation.to_string());
        if excerpt.len() == MAX_TAXONOMY_EXCERPT {
            break;
        }
    }

    excerpt
}

fn significant_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > MIN_ROLE_TOKEN_LEN)
        .map(str::to_lowercase)
}

fn or_none(list: &str) -> String {
    if list.is_empty() {
        "None recorded".to_string()
    } else {
        list.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee::{Competency, EmployeeSkill, EmploymentInfo, PersonalInfo};
    use serde_json::{json, Map};

    fn make_employee(department: &str, hire_date: &str) -> EmployeeProfile {
        EmployeeProfile {
            employee_id: "EMP-7".to_string(),
            personal_info: PersonalInfo {
                name: "Wei Ling".to_string(),
                extra: Map::new(),
            },
            employment_info: EmploymentInfo {
                job_title: "Terminal Planner".to_string(),
                department: department.to_string(),
                hire_date: hire_date.to_string(),
                extra: Map::new(),
            },
            skills: (1..=10)
                .map(|i| EmployeeSkill {
                    skill_name: format!("Skill{i}"),
                    function_area: "Operations".to_string(),
                    extra: Map::new(),
                })
                .collect(),
            competencies: ["Leadership", "Negotiation", "Coaching", "Analytics"]
                .iter()
                .map(|name| Competency {
                    name: name.to_string(),
                    level: json!("Advanced"),
                    extra: Map::new(),
                })
                .collect(),
            extra: Map::new(),
        }
    }

    fn taxonomy() -> Vec<TaxonomyEntry> {
        vec![
            TaxonomyEntry::new("Operations: Terminal", "Yard Planning"),
            TaxonomyEntry::new("Operations: Marine", "Vessel Scheduling"),
            TaxonomyEntry::new("Operations: Terminal", "yard planning"),
            TaxonomyEntry::new("Finance: Treasury", "Cash Management"),
            TaxonomyEntry::new("Info Tech: Data", "Data Engineering"),
        ]
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let employee = make_employee("Operations: Terminal", "2015-06-01");
        let a = build_career_prompt(&employee, Some("Data Analyst"), &taxonomy(), 2025);
        let b = build_career_prompt(&employee, Some("Data Analyst"), &taxonomy(), 2025);
        assert_eq!(a, b);
    }

    #[test]
    fn test_prompt_embeds_employee_fields() {
        let employee = make_employee("Operations", "2015-06-01");
        let prompt = build_career_prompt(&employee, None, &taxonomy(), 2025);

        assert!(prompt.contains("- Name: Wei Ling"));
        assert!(prompt.contains("- Current Role: Terminal Planner"));
        assert!(prompt.contains("- Years at PSA: 10"));
        assert!(prompt.contains(&format!("Target Role: {DEFAULT_TARGET_ROLE}")));
        // the schema is literal, not templated away
        assert!(prompt.contains("\"readiness_score\": 75"));
        assert!(prompt.contains("\"next_30_days\""));
    }

    #[test]
    fn test_prompt_caps_skills_and_competencies() {
        let employee = make_employee("Operations", "2015-06-01");
        let prompt = build_career_prompt(&employee, None, &taxonomy(), 2025);

        assert!(prompt.contains("Skill8"));
        assert!(!prompt.contains("Skill9"));
        assert!(prompt.contains("Coaching (Advanced)"));
        assert!(!prompt.contains("Analytics"));
    }

    #[test]
    fn test_excerpt_uses_department_prefix_and_dedupes() {
        let excerpt = taxonomy_excerpt("Operations: Terminal", None, &taxonomy());
        assert_eq!(excerpt, vec!["Yard Planning", "Vessel Scheduling"]);
    }

    #[test]
    fn test_excerpt_includes_target_role_matches() {
        let excerpt = taxonomy_excerpt("Operations", Some("Senior Data Scientist"), &taxonomy());
        assert!(excerpt.contains(&"Data Engineering".to_string()));
        assert!(!excerpt.contains(&"Cash Management".to_string()));
    }

    #[test]
    fn test_short_role_tokens_are_ignored() {
        // "IT" and "Ops" are three characters or fewer
        let excerpt = taxonomy_excerpt("Legal", Some("IT Ops"), &taxonomy());
        assert!(excerpt.is_empty());
    }

    #[test]
    fn test_changing_target_role_changes_excerpt() {
        let employee = make_employee("Legal", "2015-06-01");
        let finance = build_career_prompt(&employee, Some("Treasury Manager"), &taxonomy(), 2025);
        let data = build_career_prompt(&employee, Some("Data Lead"), &taxonomy(), 2025);
        assert!(finance.contains("- Cash Management"));
        assert!(!data.contains("- Cash Management"));
        assert!(data.contains("- Data Engineering"));
    }

    #[test]
    fn test_excerpt_capped_at_ten() {
        let names: Vec<String> = (0..25).map(|i| format!("Spec {i}")).collect();
        let rows: Vec<_> = names
            .iter()
            .map(|n| TaxonomyEntry::new("Operations", n))
            .collect();
        assert_eq!(taxonomy_excerpt("Operations", None, &rows).len(), MAX_TAXONOMY_EXCERPT);
    }

    #[test]
    fn test_placeholders_inside_values_stay_literal() {
        let mut employee = make_employee("Operations", "2015-06-01");
        employee.employment_info.job_title = "Lead {department} Planner".to_string();
        employee.personal_info.name = "{target_role}".to_string();
        let rows = vec![TaxonomyEntry::new("Operations", "Ask {name} first")];

        let prompt = build_career_prompt(&employee, Some("Manager"), &rows, 2025);
        assert!(prompt.contains("- Current Role: Lead {department} Planner"));
        assert!(prompt.contains("- Name: {target_role}"));
        assert!(prompt.contains("- Ask {name} first"));
    }

    #[test]
    fn test_fill_template_keeps_unknown_braces() {
        let filled = fill_template("{a} {\"b\": {a}} {c", &[("a", "1")]);
        assert_eq!(filled, "1 {\"b\": 1} {c");
    }

    #[test]
    fn test_years_at_company() {
        assert_eq!(years_at_company("2016-03-01", 2025), Some(9));
        assert_eq!(years_at_company("2030-01-01", 2025), Some(0));
        assert_eq!(years_at_company("03/01/2016", 2025), None);
        assert_eq!(years_at_company("", 2025), None);
    }

    #[test]
    fn test_unparseable_hire_date_renders_unknown() {
        let employee = make_employee("Operations", "n/a");
        let prompt = build_career_prompt(&employee, None, &taxonomy(), 2025);
        assert!(prompt.contains("- Years at PSA: unknown"));
    }
}
