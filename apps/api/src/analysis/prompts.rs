// Prompt constants for career-plan generation.
// Reuses the JSON-only fragment from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// Persona half of the system prompt; `system_prompt()` appends the JSON rule.
const CAREER_ADVISOR_PERSONA: &str = "You are an expert career advisor at PSA International, \
    a global port operator. You write specific, actionable development plans \
    grounded in the maritime, port, logistics and supply chain industry.";

pub fn system_prompt() -> String {
    format!("{CAREER_ADVISOR_PERSONA} {JSON_ONLY_SYSTEM}")
}

/// Phrase used when the caller gives no target role.
pub const DEFAULT_TARGET_ROLE: &str = "Advancement in their current career path";

/// Career plan prompt template.
/// Replace: {name}, {job_title}, {department}, {years_at_company}, {skills},
///          {competencies}, {taxonomy_excerpt}, {target_role}
pub const CAREER_PLAN_PROMPT_TEMPLATE: &str = r#"Employee Profile:
- Name: {name}
- Current Role: {job_title}
- Department: {department}
- Years at PSA: {years_at_company}
- Current Skills: {skills}
- Competencies: {competencies}

Target Role: {target_role}

Relevant skills from the PSA skills taxonomy:
{taxonomy_excerpt}

Provide a comprehensive career development plan in this EXACT JSON format:
{
  "readiness_score": 75,
  "summary": "Brief 2-sentence assessment of their readiness and potential",
  "skill_gaps": [
    {"skill": "Skill Name", "priority": "High", "why": "Why this matters"},
    {"skill": "Another Skill", "priority": "Medium", "why": "Reason"}
  ],
  "learning_path": [
    {"step": 1, "skill": "First Skill", "action": "Specific action to take", "timeline": "3 months", "resources": ["Course 1", "Certification 2"]},
    {"step": 2, "skill": "Second Skill", "action": "Next action", "timeline": "2 months", "resources": ["Workshop", "Book"]}
  ],
  "internal_opportunities": ["Specific PSA project or role they could pursue", "Another opportunity"],
  "mentorship_match": "Suggest who they should connect with at PSA and why (be specific to their skills)",
  "next_30_days": ["Actionable step 1", "Actionable step 2", "Actionable step 3"]
}

Guidelines:
- Be specific to maritime/port/logistics/supply chain industry
- Reference PSA's operations (automated terminals, PORTNET, global network)
- Prefer skill gaps drawn from the taxonomy skills listed above
- Readiness score should be realistic (50-95 range)
- Priority must be one of "High", "Medium" or "Low"
- Include 3-5 skill gaps
- Learning path should have 3-4 steps
- Make it actionable and PSA-specific"#;
