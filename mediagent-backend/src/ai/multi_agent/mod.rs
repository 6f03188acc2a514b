//! Multi-agent analysis of a medical report
//!
//! A report goes through two stages:
//!
//! 1. **Specialists** - Cardiologist, Psychologist and Pulmonologist agents each
//!    read the same report. They run concurrently, one task per agent.
//! 2. **Multidisciplinary team** - once every specialist has finished, a fourth
//!    agent reads their three reports and produces the final diagnosis.
//!
//! ## Flow
//!
//! ```text
//!            ┌─ Cardiologist ─┐
//! Report ────┼─ Psychologist ─┼──▶ MultidisciplinaryTeam ──▶ Diagnosis
//!            └─ Pulmonologist ┘
//! ```
//!
//! A specialist whose model call fails is replaced by a `"No <Role> Report"`
//! placeholder so the synthesis still runs.

pub mod agent;
pub mod orchestrator;
pub mod template;
pub mod types;

pub use orchestrator::{AnalysisError, Orchestrator};
pub use template::check_templates;
pub use types::ResponseMap;
