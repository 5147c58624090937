//! Skill Matcher — recommends taxonomy specialisations for an employee.
//!
//! Algorithm:
//! 1. Lower-case the employee's skill names (a set) and function areas
//!    (distinct, first-seen order).
//! 2. Group taxonomy rows by `function_unit_skill`.
//! 3. For every function area, every group whose label shares a whitespace
//!    token with it contributes each specialisation that does not already
//!    appear inside the employee's concatenated skill text.
//! 4. Deduplicate case-insensitively, keep first-seen order, cap at 15.
//! 5. Coverage = distinct current skills / taxonomy rows, as a percentage
//!    rounded to one decimal (0 for an empty taxonomy).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::employee::EmployeeProfile;
use crate::models::taxonomy::TaxonomyEntry;

/// Maximum number of recommendations returned.
pub const MAX_RECOMMENDATIONS: usize = 15;

/// Relevance label attached to every token-matched recommendation.
pub const RELEVANCE_HIGH: &str = "high";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecommendation {
    pub function: String,
    pub skill: String,
    pub relevance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatchReport {
    pub current_skills_count: usize,
    pub total_skills_count: usize,
    pub recommended_skills: Vec<SkillRecommendation>,
    pub coverage_percentage: f64,
}

/// A taxonomy function label with its distinct specialisations.
struct FunctionGroup<'a> {
    label: &'a str,
    tokens: HashSet<String>,
    specialisations: Vec<&'a str>,
}

pub fn match_skills(employee: &EmployeeProfile, taxonomy: &[TaxonomyEntry]) -> SkillMatchReport {
    let current_skills: HashSet<String> = employee
        .skills
        .iter()
        .map(|s| s.skill_name.to_lowercase())
        .collect();

    let skills_text = employee
        .skills
        .iter()
        .map(|s| s.skill_name.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let mut current_functions: Vec<String> = Vec::new();
    for skill in &employee.skills {
        let area = skill.function_area.to_lowercase();
        if !area.trim().is_empty() && !current_functions.contains(&area) {
            current_functions.push(area);
        }
    }

    let groups = group_by_function(taxonomy);

    let mut seen: HashSet<String> = HashSet::new();
    let mut recommended = Vec::new();

    'outer: for function_area in &current_functions {
        let area_tokens = tokenize(function_area);

        for group in groups.iter().filter(|g| !g.tokens.is_disjoint(&area_tokens)) {
            for specialisation in &group.specialisations {
                let key = specialisation.to_lowercase();
                if skills_text.contains(&key) || !seen.insert(key) {
                    continue;
                }
                recommended.push(SkillRecommendation {
                    function: group.label.to_string(),
                    skill: specialisation.to_string(),
                    relevance: RELEVANCE_HIGH.to_string(),
                });
                if recommended.len() == MAX_RECOMMENDATIONS {
                    break 'outer;
                }
            }
        }
    }

    SkillMatchReport {
        current_skills_count: current_skills.len(),
        total_skills_count: taxonomy.len(),
        recommended_skills: recommended,
        coverage_percentage: coverage_percentage(current_skills.len(), taxonomy.len()),
    }
}

/// Percentage of `total` covered by `current`, rounded to one decimal.
pub fn coverage_percentage(current: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = current as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

fn group_by_function(taxonomy: &[TaxonomyEntry]) -> Vec<FunctionGroup<'_>> {
    let mut groups: Vec<FunctionGroup<'_>> = Vec::new();

    for entry in taxonomy {
        let label = entry.function_unit_skill.as_str();
        let specialisation = entry.specialisation_unit.as_str();

        let idx = match groups.iter().position(|g| g.label == label) {
            Some(idx) => idx,
            None => {
                groups.push(FunctionGroup {
                    label,
                    tokens: tokenize(label),
                    specialisations: Vec::new(),
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[idx];
        if !specialisation.trim().is_empty() && !group.specialisations.contains(&specialisation) {
            group.specialisations.push(specialisation);
        }
    }

    groups
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace().map(|t| t.to_lowercase()).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee::{EmployeeSkill, EmploymentInfo, PersonalInfo};
    use serde_json::Map;

    fn make_employee(skills: Vec<(&str, &str)>) -> EmployeeProfile {
        EmployeeProfile {
            employee_id: "EMP-1".to_string(),
            personal_info: PersonalInfo {
                name: "Test Person".to_string(),
                extra: Map::new(),
            },
            employment_info: EmploymentInfo {
                job_title: "Engineer".to_string(),
                department: "Info Tech".to_string(),
                hire_date: "2020-01-01".to_string(),
                extra: Map::new(),
            },
            skills: skills
                .into_iter()
                .map(|(name, area)| EmployeeSkill {
                    skill_name: name.to_string(),
                    function_area: area.to_string(),
                    extra: Map::new(),
                })
                .collect(),
            competencies: vec![],
            extra: Map::new(),
        }
    }

    #[test]
    fn test_token_overlap_recommends_group_skills() {
        let employee = make_employee(vec![("Cloud Architecture", "Info Tech: Infrastructure")]);
        let taxonomy = vec![
            TaxonomyEntry::new("Info Tech: Infrastructure", "Network Security"),
            TaxonomyEntry::new("Info Tech: Data", "Data Engineering"),
            TaxonomyEntry::new("Finance", "Treasury"),
        ];

        let report = match_skills(&employee, &taxonomy);
        let skills: Vec<_> = report.recommended_skills.iter().map(|r| r.skill.as_str()).collect();
        // "info" and "tech:" tokens are shared with both Info Tech groups
        assert_eq!(skills, vec!["Network Security", "Data Engineering"]);
        assert!(report.recommended_skills.iter().all(|r| r.relevance == "high"));
        assert_eq!(report.recommended_skills[0].function, "Info Tech: Infrastructure");
    }

    #[test]
    fn test_existing_skills_are_excluded_by_substring() {
        let employee = make_employee(vec![
            ("Advanced Cloud Architecture", "Info Tech"),
            ("Python", "Info Tech"),
        ]);
        let taxonomy = vec![
            TaxonomyEntry::new("Info Tech", "Cloud Architecture"),
            TaxonomyEntry::new("Info Tech", "python"),
            TaxonomyEntry::new("Info Tech", "Kubernetes"),
        ];

        let report = match_skills(&employee, &taxonomy);
        assert_eq!(report.recommended_skills.len(), 1);
        assert_eq!(report.recommended_skills[0].skill, "Kubernetes");

        let skills_text = "advanced cloud architecture python";
        for rec in &report.recommended_skills {
            assert!(!skills_text.contains(&rec.skill.to_lowercase()));
        }
    }

    #[test]
    fn test_duplicate_specialisation_across_groups_returned_once() {
        let employee = make_employee(vec![("Excel", "Port Operations")]);
        let taxonomy = vec![
            TaxonomyEntry::new("Port Operations", "Foo"),
            TaxonomyEntry::new("Terminal Operations", "foo"),
            TaxonomyEntry::new("Terminal Operations", "Bar"),
        ];

        let report = match_skills(&employee, &taxonomy);
        let foos = report
            .recommended_skills
            .iter()
            .filter(|r| r.skill.eq_ignore_ascii_case("foo"))
            .count();
        assert_eq!(foos, 1);
        assert_eq!(report.recommended_skills[0].skill, "Foo");
        assert_eq!(report.recommended_skills.len(), 2);
    }

    #[test]
    fn test_result_capped_at_fifteen() {
        let employee = make_employee(vec![("Excel", "Operations")]);
        let names: Vec<String> = (0..40).map(|i| format!("Specialty {i}")).collect();
        let taxonomy: Vec<_> = names
            .iter()
            .map(|n| TaxonomyEntry::new("Operations", n))
            .collect();

        let report = match_skills(&employee, &taxonomy);
        assert_eq!(report.recommended_skills.len(), MAX_RECOMMENDATIONS);
        assert_eq!(report.recommended_skills[0].skill, "Specialty 0");
        assert_eq!(report.total_skills_count, 40);
    }

    #[test]
    fn test_no_shared_tokens_no_recommendations() {
        let employee = make_employee(vec![("Excel", "Finance")]);
        let taxonomy = vec![TaxonomyEntry::new("Engineering", "Welding")];
        let report = match_skills(&employee, &taxonomy);
        assert!(report.recommended_skills.is_empty());
    }

    #[test]
    fn test_coverage_percentage_rounds_to_one_decimal() {
        let employee = make_employee(vec![
            ("A", "X"),
            ("B", "X"),
            ("a", "X"), // duplicate after lower-casing
        ]);
        let taxonomy: Vec<_> = (0..3).map(|_| TaxonomyEntry::new("Y", "Z")).collect();

        let report = match_skills(&employee, &taxonomy);
        assert_eq!(report.current_skills_count, 2);
        assert_eq!(report.total_skills_count, 3);
        assert_eq!(report.coverage_percentage, 66.7);
    }

    #[test]
    fn test_empty_taxonomy_reports_zero_coverage() {
        let employee = make_employee(vec![("Excel", "Finance")]);
        let report = match_skills(&employee, &[]);
        assert_eq!(report.coverage_percentage, 0.0);
        assert_eq!(report.total_skills_count, 0);
        assert!(report.recommended_skills.is_empty());
    }

    #[test]
    fn test_coverage_helper() {
        assert_eq!(coverage_percentage(1, 8), 12.5);
        assert_eq!(coverage_percentage(5, 5), 100.0);
        assert_eq!(coverage_percentage(3, 0), 0.0);
    }
}
