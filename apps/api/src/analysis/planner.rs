//! Career Planner — orchestrates career-plan generation for one employee.
//!
//! Flow: look up employee → build prompt → model call → normalize response.
//! An unknown employee fails before any model call is made.

use std::time::Instant;

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::analysis::normalizer::{normalize_plan, FieldPolicy};
use crate::analysis::prompt_builder::build_career_prompt;
use crate::analysis::prompts::system_prompt;
use crate::dataset::DatasetStore;
use crate::errors::AppError;
use crate::llm_client::CompletionProvider;

/// Request body for `POST /api/analyze`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub employee_id: String,
    #[serde(default)]
    pub target_role: Option<String>,
}

/// Knobs fixed at startup that shape every plan request.
#[derive(Debug, Clone, Copy)]
pub struct PlanSettings {
    /// Year tenure is measured against.
    pub reference_year: i32,
    pub field_policy: FieldPolicy,
}

/// Generates a career plan and returns the model's JSON as-is.
pub async fn generate_career_plan(
    store: &DatasetStore,
    llm: &dyn CompletionProvider,
    settings: PlanSettings,
    request: &AnalyzeRequest,
) -> Result<Value, AppError> {
    let employee = store
        .get_employee(&request.employee_id)
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    let prompt = build_career_prompt(
        employee,
        request.target_role.as_deref(),
        store.list_taxonomy(),
        settings.reference_year,
    );

    info!(
        "Requesting career plan for {} (target role: {:?})",
        employee.employee_id, request.target_role
    );
    let started = Instant::now();
    let completion = llm.complete(&system_prompt(), &prompt).await?;
    info!(
        "Model responded in {}ms (finish_reason={:?}, {} chars)",
        started.elapsed().as_millis(),
        completion.finish_reason,
        completion.content.len()
    );

    let plan = normalize_plan(&completion, settings.field_policy)?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use crate::llm_client::{Completion, LlmError};
    use crate::models::taxonomy::TaxonomyEntry;

    struct CannedProvider {
        reply: Result<Completion, u16>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionProvider for CannedProvider {
        async fn complete(&self, _system: &str, prompt: &str) -> Result<Completion, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(prompt.contains("EXACT JSON format"));
            match &self.reply {
                Ok(completion) => Ok(completion.clone()),
                Err(status) => Err(LlmError::Api {
                    status: *status,
                    message: "upstream said no".to_string(),
                }),
            }
        }
    }

    fn canned(content: &str) -> CannedProvider {
        CannedProvider {
            reply: Ok(Completion {
                content: content.to_string(),
                finish_reason: Some("stop".to_string()),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    fn store() -> DatasetStore {
        let employee = json!({
            "employee_id": "EMP-1",
            "personal_info": {"name": "Ana"},
            "employment_info": {"job_title": "Planner", "department": "Operations", "hire_date": "2019-01-01"},
            "skills": [{"skill_name": "Yard Planning", "function_area": "Operations"}],
            "competencies": [{"name": "Teamwork", "level": "Intermediate"}]
        });
        DatasetStore::from_records(
            vec![employee],
            vec![TaxonomyEntry::new("Operations", "Berth Planning")],
        )
        .unwrap()
    }

    fn settings(field_policy: FieldPolicy) -> PlanSettings {
        PlanSettings {
            reference_year: 2025,
            field_policy,
        }
    }

    fn request(id: &str) -> AnalyzeRequest {
        AnalyzeRequest {
            employee_id: id.to_string(),
            target_role: None,
        }
    }

    #[tokio::test]
    async fn test_unknown_employee_never_calls_model() {
        let provider = canned("{}");
        let err = generate_career_plan(&store(), &provider, settings(FieldPolicy::Lenient), &request("EMP-404"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fenced_plan_is_returned() {
        let provider = canned("```json\n{\"readiness_score\": 80, \"summary\": \"ok\"}\n```");
        let plan = generate_career_plan(&store(), &provider, settings(FieldPolicy::Lenient), &request("EMP-1"))
            .await
            .unwrap();
        assert_eq!(plan["readiness_score"], 80);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_strict_policy_rejects_partial_plan() {
        let provider = canned("{\"readiness_score\": 80}");
        let err = generate_career_plan(&store(), &provider, settings(FieldPolicy::Strict), &request("EMP-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IncompletePlan(ref missing) if missing.len() == 6));
    }

    #[tokio::test]
    async fn test_upstream_status_is_propagated() {
        let provider = CannedProvider {
            reply: Err(401),
            calls: AtomicUsize::new(0),
        };
        let err = generate_career_plan(&store(), &provider, settings(FieldPolicy::Lenient), &request("EMP-1"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::UpstreamUnavailable {
                status: Some(401),
                ..
            }
        ));
    }
}
