//! A single role-bound model call

use super::template::{PromptTemplate, TemplateError};
use super::types::{AgentInput, Role};
use crate::ai::{GenerationOptions, TextModel};
use std::sync::Arc;

/// One agent, built per request and consumed by its single `run()`
pub struct Agent {
    role: Role,
    prompt: String,
    model: Arc<dyn TextModel>,
    options: GenerationOptions,
}

impl Agent {
    /// Resolve the role's template against `input`. A placeholder the input
    /// does not provide is an error for the caller to handle.
    pub fn new(role: Role, input: AgentInput, model: Arc<dyn TextModel>) -> Result<Self, TemplateError> {
        let prompt = PromptTemplate::for_role(role).render(&input.template_vars())?;
        Ok(Self {
            role,
            prompt,
            model,
            options: GenerationOptions::default(),
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Make the model call. Failures are logged and reported as `None`;
    /// callers substitute a placeholder.
    pub async fn run(self) -> Option<String> {
        log::info!("[AGENT] {} is running with {}...", self.role, self.model.name());
        log::debug!("[AGENT] {} prompt is {} chars", self.role, self.prompt().len());

        match self.model.generate_text(&self.prompt, &self.options).await {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => {
                log::warn!("[AGENT] {} received an empty response", self.role);
                None
            }
            Err(e) => {
                log::error!(
                    "[AGENT] Error during model call for {} ({}): {}",
                    self.role,
                    e.kind(),
                    e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::multi_agent::types::ResponseMap;
    use crate::ai::testing::ScriptedModel;

    const REPORT: &str = "Patient reports intermittent palpitations and shortness of breath on exertion.";

    #[test]
    fn test_specialist_prompt_contains_report() {
        let model = Arc::new(ScriptedModel::new());
        let agent = Agent::new(Role::Pulmonologist, AgentInput::Report(REPORT.to_string()), model).unwrap();
        assert_eq!(agent.role(), Role::Pulmonologist);
        assert!(agent.prompt().starts_with("Act like a pulmonologist"));
        assert!(agent.prompt().contains(REPORT));
        assert!(!agent.prompt().contains("{medical_report}"));
    }

    #[test]
    fn test_team_prompt_uses_named_inputs() {
        let mut responses = ResponseMap::new();
        responses.record(Role::Cardiologist, Some("Possible arrhythmia".into()));
        responses.record(Role::Psychologist, Some("Generalized anxiety".into()));
        responses.record(Role::Pulmonologist, None);

        let model = Arc::new(ScriptedModel::new());
        let agent = Agent::new(
            Role::MultidisciplinaryTeam,
            AgentInput::SpecialistReports(responses),
            model,
        )
        .unwrap();

        assert!(agent.prompt().contains("Cardiologist Report: Possible arrhythmia"));
        assert!(agent.prompt().contains("Psychologist Report: Generalized anxiety"));
        assert!(agent.prompt().contains("Pulmonologist Report: No Pulmonologist Report"));
    }

    #[test]
    fn test_mismatched_input_fails_construction() {
        let model = Arc::new(ScriptedModel::new());
        let result = Agent::new(
            Role::Cardiologist,
            AgentInput::SpecialistReports(ResponseMap::new().complete()),
            model.clone(),
        );
        assert!(matches!(result, Err(TemplateError::MissingVariable(ref v)) if v == "medical_report"));

        let result = Agent::new(Role::MultidisciplinaryTeam, AgentInput::Report(REPORT.to_string()), model);
        assert!(matches!(result, Err(TemplateError::MissingVariable(_))));
    }

    #[tokio::test]
    async fn test_run_returns_model_text() {
        let model = Arc::new(ScriptedModel::new());
        let agent = Agent::new(Role::Psychologist, AgentInput::Report(REPORT.to_string()), model.clone()).unwrap();
        assert_eq!(agent.run().await.as_deref(), Some("Psychologist findings"));
        assert_eq!(model.calls(), vec![Role::Psychologist]);
    }

    #[tokio::test]
    async fn test_run_swallows_model_failure() {
        let model = Arc::new(ScriptedModel::new().failing(Role::Cardiologist));
        let agent = Agent::new(Role::Cardiologist, AgentInput::Report(REPORT.to_string()), model).unwrap();
        assert_eq!(agent.run().await, None);
    }

    #[tokio::test]
    async fn test_run_treats_blank_text_as_missing() {
        let model = Arc::new(ScriptedModel::new().blank(Role::Pulmonologist));
        let agent = Agent::new(Role::Pulmonologist, AgentInput::Report(REPORT.to_string()), model).unwrap();
        assert_eq!(agent.run().await, None);
    }
}
