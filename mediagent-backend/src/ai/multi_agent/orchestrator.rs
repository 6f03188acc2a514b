//! Multi-agent orchestrator - specialist fan-out, then team synthesis

use super::agent::Agent;
use super::template::TemplateError;
use super::types::{AgentInput, ResponseMap, Role};
use crate::ai::TextModel;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use uuid::Uuid;

/// Reports shorter than this (after trimming) are rejected
pub const MIN_REPORT_CHARS: usize = 50;

pub const REPORT_TOO_SHORT: &str = "Error: Medical report is too short or empty. Analysis aborted.";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{}", REPORT_TOO_SHORT)]
    ReportTooShort,
    #[error("prompt template error: {0}")]
    Template(#[from] TemplateError),
    #[error("specialist task failed: {0}")]
    TaskFailed(String),
}

/// Result of a full analysis
#[derive(Debug, Clone)]
pub struct Diagnosis {
    pub analysis_id: Uuid,
    pub text: String,
    pub specialist_reports: ResponseMap,
}

/// Runs the specialists concurrently, then the team over their reports
#[derive(Clone)]
pub struct Orchestrator {
    model: Arc<dyn TextModel>,
}

impl Orchestrator {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    pub async fn run_analysis(&self, medical_report: &str) -> Result<Diagnosis, AnalysisError> {
        validate_report(medical_report)?;

        let analysis_id = Uuid::new_v4();
        let specialist_reports = self.run_specialists(analysis_id, medical_report).await?;

        log::info!("[ORCHESTRATOR] {} running multidisciplinary team synthesis", analysis_id);
        let team = Agent::new(
            Role::MultidisciplinaryTeam,
            AgentInput::SpecialistReports(specialist_reports.clone()),
            Arc::clone(&self.model),
        )?;
        let text = team.run().await.unwrap_or_else(|| {
            log::warn!(
                "[ORCHESTRATOR] {} multidisciplinary team produced no diagnosis, using placeholder",
                analysis_id
            );
            Role::MultidisciplinaryTeam.placeholder()
        });

        log::info!("[ORCHESTRATOR] {} analysis complete ({} chars)", analysis_id, text.len());
        Ok(Diagnosis {
            analysis_id,
            text,
            specialist_reports,
        })
    }

    /// Stage one: every specialist gets the same report and runs on its own
    /// task. Returns only after all of them have finished.
    async fn run_specialists(&self, analysis_id: Uuid, medical_report: &str) -> Result<ResponseMap, AnalysisError> {
        let agents = Role::specialists()
            .iter()
            .map(|role| {
                Agent::new(
                    *role,
                    AgentInput::Report(medical_report.to_string()),
                    Arc::clone(&self.model),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::info!(
            "[ORCHESTRATOR] {} running {} specialist agents concurrently",
            analysis_id,
            agents.len()
        );

        let mut join_set = JoinSet::new();
        for agent in agents {
            join_set.spawn(async move {
                let role = agent.role();
                (role, agent.run().await)
            });
        }

        let mut responses = ResponseMap::new();
        while let Some(joined) = join_set.join_next().await {
            let (role, output) = joined.map_err(|e| AnalysisError::TaskFailed(e.to_string()))?;
            if output.is_some() {
                log::info!("[ORCHESTRATOR] {} {} finished analysis", analysis_id, role);
            } else {
                log::warn!(
                    "[ORCHESTRATOR] {} {} produced no report, using placeholder",
                    analysis_id,
                    role
                );
            }
            responses.record(role, output);
        }

        if !responses.is_complete() {
            log::warn!("[ORCHESTRATOR] {} missing specialist entries, filling placeholders", analysis_id);
        }
        Ok(responses.complete())
    }
}

/// Reject empty or trivially short reports before any model call
pub fn validate_report(medical_report: &str) -> Result<(), AnalysisError> {
    if medical_report.trim().chars().count() < MIN_REPORT_CHARS {
        return Err(AnalysisError::ReportTooShort);
    }
    Ok(())
}
