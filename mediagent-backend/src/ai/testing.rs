//! Deterministic model fake for unit and HTTP tests

use crate::ai::multi_agent::types::Role;
use crate::ai::{GenerationOptions, ModelError, TextModel};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

pub const SYNTHESIS_REPLY: &str = "- Paroxysmal arrhythmia: palpitations with normal resting ECG\n- Panic disorder: episodic anxiety\n- Exercise-induced asthma: dyspnea on exertion";

/// Answers each prompt according to the role whose template produced it.
/// Specialists reply `"<Role> findings"`; the team replies `SYNTHESIS_REPLY`.
pub struct ScriptedModel {
    failing: HashSet<Role>,
    blank: HashSet<Role>,
    delays: HashMap<Role, Duration>,
    state: Mutex<CallLog>,
}

#[derive(Default)]
struct CallLog {
    /// Roles in order of call completion
    completed: Vec<Role>,
    /// For each synthesis call, how many specialist calls had finished
    specialists_done_at_synthesis: Vec<usize>,
    prompts: Vec<(Role, String)>,
    temperatures: Vec<f32>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            failing: HashSet::new(),
            blank: HashSet::new(),
            delays: HashMap::new(),
            state: Mutex::new(CallLog::default()),
        }
    }

    pub fn failing(mut self, role: Role) -> Self {
        self.failing.insert(role);
        self
    }

    pub fn blank(mut self, role: Role) -> Self {
        self.blank.insert(role);
        self
    }

    pub fn delayed(mut self, role: Role, millis: u64) -> Self {
        self.delays.insert(role, Duration::from_millis(millis));
        self
    }

    pub fn calls(&self) -> Vec<Role> {
        self.state.lock().unwrap().completed.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().completed.len()
    }

    pub fn specialists_done_at_synthesis(&self) -> Vec<usize> {
        self.state.lock().unwrap().specialists_done_at_synthesis.clone()
    }

    pub fn prompt_for(&self, role: Role) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .prompts
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, p)| p.clone())
    }

    pub fn temperatures(&self) -> Vec<f32> {
        self.state.lock().unwrap().temperatures.clone()
    }
}

/// Work out which role's template a prompt came from
pub fn role_for_prompt(prompt: &str) -> Role {
    let opening = prompt.lines().next().unwrap_or_default().to_lowercase();
    if opening.contains("multidisciplinary team") {
        Role::MultidisciplinaryTeam
    } else if opening.contains("cardiologist") {
        Role::Cardiologist
    } else if opening.contains("psychologist") {
        Role::Psychologist
    } else {
        Role::Pulmonologist
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate_text(&self, prompt: &str, options: &GenerationOptions) -> Result<String, ModelError> {
        let role = role_for_prompt(prompt);

        {
            let mut state = self.state.lock().unwrap();
            state.prompts.push((role, prompt.to_string()));
            state.temperatures.push(options.temperature);
            if role == Role::MultidisciplinaryTeam {
                let done = state.completed.iter().filter(|r| r.is_specialist()).count();
                state.specialists_done_at_synthesis.push(done);
            }
        }

        if let Some(delay) = self.delays.get(&role) {
            tokio::time::sleep(*delay).await;
        }

        self.state.lock().unwrap().completed.push(role);

        if self.failing.contains(&role) {
            return Err(ModelError::Request(format!("simulated outage for {}", role)));
        }
        if self.blank.contains(&role) {
            return Ok("   ".to_string());
        }

        Ok(match role {
            Role::MultidisciplinaryTeam => SYNTHESIS_REPLY.to_string(),
            specialist => format!("{} findings", specialist),
        })
    }
}
