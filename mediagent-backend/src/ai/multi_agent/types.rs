//! Multi-agent system types

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use strum::{Display, EnumIter};

/// The role an agent plays. Selects the prompt template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Role {
    Cardiologist,
    Psychologist,
    Pulmonologist,
    MultidisciplinaryTeam,
}

impl Role {
    /// Roles that read the raw report in the first stage
    pub fn specialists() -> &'static [Role] {
        &[Role::Cardiologist, Role::Psychologist, Role::Pulmonologist]
    }

    pub fn is_specialist(&self) -> bool {
        !matches!(self, Role::MultidisciplinaryTeam)
    }

    /// Text substituted for a specialist whose call failed or returned nothing
    pub fn placeholder(&self) -> String {
        format!("No {} Report", self)
    }

    /// Name of the synthesis template variable this role's report fills
    pub fn report_key(&self) -> Option<&'static str> {
        match self {
            Role::Cardiologist => Some("cardiologist_report"),
            Role::Psychologist => Some("psychologist_report"),
            Role::Pulmonologist => Some("pulmonologist_report"),
            Role::MultidisciplinaryTeam => None,
        }
    }
}

/// What an agent is given to work on
#[derive(Debug, Clone)]
pub enum AgentInput {
    /// A single medical report, for the specialists
    Report(String),
    /// Collected specialist outputs, for the team synthesis
    SpecialistReports(ResponseMap),
}

impl AgentInput {
    /// Template variables this input provides
    pub fn template_vars(&self) -> HashMap<&'static str, &str> {
        match self {
            AgentInput::Report(report) => HashMap::from([("medical_report", report.as_str())]),
            AgentInput::SpecialistReports(responses) => responses.template_vars(),
        }
    }
}

/// Specialist outputs keyed by role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResponseMap {
    reports: BTreeMap<Role, String>,
}

impl ResponseMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a role's output; `None` is stored as the role's placeholder
    pub fn record(&mut self, role: Role, output: Option<String>) {
        debug_assert!(role.is_specialist(), "{} does not report to the team", role);
        let text = output.unwrap_or_else(|| role.placeholder());
        self.reports.insert(role, text);
    }

    #[cfg(test)]
    pub fn get(&self, role: Role) -> Option<&str> {
        self.reports.get(&role).map(String::as_str)
    }

    /// True once every specialist has an entry (real or placeholder)
    pub fn is_complete(&self) -> bool {
        Role::specialists().iter().all(|r| self.reports.contains_key(r))
    }

    /// Fill any specialist that never reported with its placeholder
    pub fn complete(mut self) -> Self {
        for role in Role::specialists() {
            self.reports.entry(*role).or_insert_with(|| role.placeholder());
        }
        self
    }

    /// Named inputs for the synthesis template
    pub fn template_vars(&self) -> HashMap<&'static str, &str> {
        self.reports
            .iter()
            .filter_map(|(role, text)| role.report_key().map(|key| (key, text.as_str())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_placeholders() {
        assert_eq!(Role::Cardiologist.placeholder(), "No Cardiologist Report");
        assert_eq!(Role::Psychologist.placeholder(), "No Psychologist Report");
        assert_eq!(Role::Pulmonologist.placeholder(), "No Pulmonologist Report");
    }

    #[test]
    fn test_specialists_exclude_team() {
        assert_eq!(Role::specialists().len(), 3);
        assert!(Role::specialists().iter().all(Role::is_specialist));
        assert!(!Role::MultidisciplinaryTeam.is_specialist());
    }

    #[test]
    fn test_report_keys() {
        for role in Role::iter() {
            assert_eq!(role.report_key().is_some(), role.is_specialist(), "{}", role);
        }
    }

    #[test]
    fn test_record_failure_uses_placeholder() {
        let mut responses = ResponseMap::new();
        responses.record(Role::Psychologist, Some("Mild anxiety".to_string()));
        responses.record(Role::Cardiologist, None);

        assert_eq!(responses.get(Role::Psychologist), Some("Mild anxiety"));
        assert_eq!(responses.get(Role::Cardiologist), Some("No Cardiologist Report"));
        assert!(!responses.is_complete());
    }

    #[test]
    fn test_complete_fills_missing_roles() {
        let mut responses = ResponseMap::new();
        responses.record(Role::Pulmonologist, Some("Possible asthma".to_string()));
        let responses = responses.complete();

        assert!(responses.is_complete());
        assert_eq!(responses.get(Role::Cardiologist), Some("No Cardiologist Report"));
        assert_eq!(responses.get(Role::Pulmonologist), Some("Possible asthma"));
        assert_eq!(responses.get(Role::Psychologist), Some("No Psychologist Report"));
    }

    #[test]
    fn test_template_vars() {
        let mut responses = ResponseMap::new();
        responses.record(Role::Cardiologist, Some("A".into()));
        responses.record(Role::Psychologist, Some("B".into()));
        responses.record(Role::Pulmonologist, None);

        let vars = responses.template_vars();
        assert_eq!(vars["cardiologist_report"], "A");
        assert_eq!(vars["psychologist_report"], "B");
        assert_eq!(vars["pulmonologist_report"], "No Pulmonologist Report");
    }

    #[test]
    fn test_serializes_as_role_keyed_object() {
        let mut responses = ResponseMap::new();
        responses.record(Role::Cardiologist, Some("Normal ECG".into()));
        let value = serde_json::to_value(&responses).unwrap();
        assert_eq!(value, serde_json::json!({"Cardiologist": "Normal ECG"}));
    }
}
