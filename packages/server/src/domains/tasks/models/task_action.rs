//! Typed task actions.
//!
//! An incoming `(action, parameters)` pair is resolved into a [`TaskAction`]
//! at submission time, so malformed parameters for a known action are rejected
//! before a task record exists. Unknown actions fall through to
//! [`TaskAction::Generic`] and are routed by the triage agent.

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::common::{ServiceError, ServiceResult};
use crate::kernel::agent_roster::AgentRole;
use crate::kernel::BaseAgentRuntime;

pub type JsonObject = Map<String, Value>;

const MAX_ACTION_LEN: usize = 255;

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessCandidateParams {
    pub candidate_data: JsonObject,
    #[serde(default)]
    pub job_data: Option<JsonObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchCandidatesParams {
    pub job_requirements: JsonObject,
    #[serde(default)]
    pub filters: Option<JsonObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchCandidatesParams {
    pub job_data: JsonObject,
    pub candidate_pool: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoreCandidateParams {
    pub job_data: JsonObject,
    pub candidate_data: JsonObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessApplicationParams {
    pub application: JsonObject,
}

#[derive(Debug, Clone)]
pub enum TaskAction {
    ProcessCandidate(ProcessCandidateParams),
    SearchCandidates(SearchCandidatesParams),
    MatchCandidates(MatchCandidatesParams),
    ScoreCandidate(ScoreCandidateParams),
    ProcessApplication(ProcessApplicationParams),
    Generic { action: String, parameters: JsonObject },
}

impl TaskAction {
    /// Validate and resolve a raw submission.
    pub fn parse(action: &str, parameters: &Value) -> ServiceResult<Self> {
        let (action, object) = validate(action, parameters)?;

        Ok(match action {
            "process_candidate" => Self::ProcessCandidate(typed(action, parameters)?),
            "search_candidates" => Self::SearchCandidates(typed(action, parameters)?),
            "match_candidates" => Self::MatchCandidates(typed(action, parameters)?),
            "score_candidate" => Self::ScoreCandidate(typed(action, parameters)?),
            "process_application" => Self::ProcessApplication(typed(action, parameters)?),
            other => Self::Generic {
                action: other.to_string(),
                parameters: object.clone(),
            },
        })
    }

    /// Like [`TaskAction::parse`], but always hands the action to triage.
    pub fn triage(action: &str, parameters: &Value) -> ServiceResult<Self> {
        let (action, object) = validate(action, parameters)?;
        Ok(Self::Generic {
            action: action.to_string(),
            parameters: object.clone(),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::ProcessCandidate(_) => "process_candidate",
            Self::SearchCandidates(_) => "search_candidates",
            Self::MatchCandidates(_) => "match_candidates",
            Self::ScoreCandidate(_) => "score_candidate",
            Self::ProcessApplication(_) => "process_application",
            Self::Generic { action, .. } => action.as_str(),
        }
    }

    pub fn role(&self) -> AgentRole {
        match self {
            Self::ProcessCandidate(_) => AgentRole::Recruiter,
            Self::SearchCandidates(_) => AgentRole::Search,
            Self::MatchCandidates(_) | Self::ScoreCandidate(_) => AgentRole::Matcher,
            Self::ProcessApplication(_) => AgentRole::Processor,
            Self::Generic { .. } => AgentRole::Triage,
        }
    }

    pub fn prompt(&self, task_id: Uuid) -> String {
        match self {
            Self::ProcessCandidate(p) => {
                let mut prompt = format!("Analyze this candidate: {}", compact(&p.candidate_data));
                if let Some(job) = &p.job_data {
                    prompt.push_str(&format!("\n\nFor this job: {}", compact(job)));
                }
                prompt.push_str(
                    "\n\nProvide:\n\
                     1. Overall assessment (score out of 100)\n\
                     2. Key strengths (at least 3)\n\
                     3. Areas for improvement (at least 2)\n\
                     4. Recommendation (Interview, Consider, or Reject)\n\
                     5. Justification for your recommendation",
                );
                prompt
            }
            Self::SearchCandidates(p) => {
                let mut prompt = format!(
                    "Find candidates matching these job requirements: {}",
                    compact(&p.job_requirements)
                );
                if let Some(filters) = &p.filters {
                    prompt.push_str(&format!("\n\nApply these filters: {}", compact(filters)));
                }
                prompt.push_str(
                    "\n\nFor each matching candidate, provide a match score (0-100), \
                     the key matching skills and a short fit assessment. \
                     Return the top 5 candidates ordered by match score.",
                );
                prompt
            }
            Self::MatchCandidates(p) => format!(
                "Rank these candidates against the job.\n\nJob: {}\n\nCandidates: {}\n\n\
                 For each candidate give a score from 0 to 100 and a one-line reason.",
                compact(&p.job_data),
                Value::Array(p.candidate_pool.clone())
            ),
            Self::ScoreCandidate(p) => format!(
                "Score this candidate for the job.\n\nJob: {}\n\nCandidate: {}\n\n\
                 Give an overall score from 0 to 100 with skill, experience and education notes.",
                compact(&p.job_data),
                compact(&p.candidate_data)
            ),
            Self::ProcessApplication(p) => format!(
                "Extract the structured details from this application: {}\n\n\
                 Return the candidate's contact details, work history, education and skills.",
                compact(&p.application)
            ),
            Self::Generic { action, parameters } => format!(
                "Task ID: {}\nAction: {}\nParameters: {}\n\n\
                 Process this task according to the action type.",
                task_id,
                action,
                compact(parameters)
            ),
        }
    }

    /// Invoke the capability for this action and shape its output.
    pub async fn run(&self, task_id: Uuid, runtime: &dyn BaseAgentRuntime) -> Result<Value> {
        let output = runtime.invoke(self.role(), &self.prompt(task_id)).await?;
        Ok(self.shape(task_id, output))
    }

    fn shape(&self, task_id: Uuid, output: String) -> Value {
        match self {
            Self::ProcessCandidate(p) => json!({
                "assessment": output,
                "candidate_id": field(&p.candidate_data, "id"),
                "name": field(&p.candidate_data, "name"),
            }),
            Self::SearchCandidates(p) => json!({
                "search_results": output,
                "job_id": field(&p.job_requirements, "job_id"),
                "title": field(&p.job_requirements, "title"),
            }),
            Self::MatchCandidates(p) => json!({
                "job_id": field(&p.job_data, "id"),
                "job_title": field(&p.job_data, "title"),
                "matches": output,
                "total_candidates_considered": p.candidate_pool.len(),
            }),
            Self::ScoreCandidate(p) => json!({
                "job_id": field(&p.job_data, "id"),
                "job_title": field(&p.job_data, "title"),
                "candidate_id": field(&p.candidate_data, "id"),
                "candidate_name": field(&p.candidate_data, "name"),
                "match_details": output,
            }),
            Self::ProcessApplication(p) => json!({
                "application_id": field(&p.application, "id"),
                "extraction": output,
            }),
            Self::Generic { action, .. } => json!({
                "task_id": task_id,
                "action": action,
                "result": output,
            }),
        }
    }
}

fn validate<'a>(action: &'a str, parameters: &'a Value) -> ServiceResult<(&'a str, &'a JsonObject)> {
    let action = action.trim();
    if action.is_empty() {
        return Err(ServiceError::Validation("action must not be empty".into()));
    }
    if action.chars().count() > MAX_ACTION_LEN {
        return Err(ServiceError::Validation(format!(
            "action must be at most {} characters",
            MAX_ACTION_LEN
        )));
    }
    match parameters {
        Value::Object(object) => Ok((action, object)),
        _ => Err(ServiceError::Validation(
            "parameters must be a JSON object".into(),
        )),
    }
}

fn typed<T: DeserializeOwned>(action: &str, parameters: &Value) -> ServiceResult<T> {
    serde_json::from_value(parameters.clone()).map_err(|e| {
        ServiceError::Validation(format!("invalid parameters for {}: {}", action, e))
    })
}

fn field(object: &JsonObject, key: &str) -> Value {
    object.get(key).cloned().unwrap_or(Value::Null)
}

fn compact(object: &JsonObject) -> String {
    Value::Object(object.clone()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::MockAgentRuntime;

    #[test]
    fn rejects_blank_and_oversized_actions() {
        assert!(matches!(
            TaskAction::parse("   ", &json!({})),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            TaskAction::parse(&"a".repeat(256), &json!({})),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn rejects_non_object_parameters() {
        let err = TaskAction::parse("anything", &json!([1, 2])).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn known_action_requires_its_parameters() {
        let err = TaskAction::parse("process_candidate", &json!({"job_data": {}})).unwrap_err();
        assert!(err.to_string().contains("candidate_data"));
    }

    #[test]
    fn unknown_action_routes_through_triage() {
        let action = TaskAction::parse("summarize_pipeline", &json!({"stage": "onsite"})).unwrap();

        assert_eq!(action.name(), "summarize_pipeline");
        assert_eq!(action.role(), AgentRole::Triage);
        assert!(action
            .prompt(Uuid::nil())
            .contains("Action: summarize_pipeline"));
    }

    #[test]
    fn triage_ignores_known_action_names() {
        let action = TaskAction::triage("process_candidate", &json!({})).unwrap();
        assert_eq!(action.role(), AgentRole::Triage);
        assert_eq!(action.name(), "process_candidate");
    }

    #[test]
    fn matcher_actions_share_a_role() {
        let matching = TaskAction::parse(
            "match_candidates",
            &json!({"job_data": {"id": "j1"}, "candidate_pool": [{"id": "c1"}]}),
        )
        .unwrap();
        let scoring = TaskAction::parse(
            "score_candidate",
            &json!({"job_data": {"id": "j1"}, "candidate_data": {"id": "c1"}}),
        )
        .unwrap();

        assert_eq!(matching.role(), AgentRole::Matcher);
        assert_eq!(scoring.role(), AgentRole::Matcher);
    }

    #[tokio::test]
    async fn process_candidate_echoes_candidate_identity() {
        let runtime =
            MockAgentRuntime::new().with_response(AgentRole::Recruiter, "Strong hire, 88/100");
        let action = TaskAction::parse(
            "process_candidate",
            &json!({"candidate_data": {"id": "c1", "name": "Ada"}}),
        )
        .unwrap();

        let result = action.run(Uuid::now_v7(), &runtime).await.unwrap();

        assert_eq!(result["candidate_id"], "c1");
        assert_eq!(result["name"], "Ada");
        assert_eq!(result["assessment"], "Strong hire, 88/100");
        assert!(runtime.was_invoked_with(AgentRole::Recruiter));
    }

    #[tokio::test]
    async fn match_candidates_counts_the_pool() {
        let runtime = MockAgentRuntime::new();
        let action = TaskAction::parse(
            "match_candidates",
            &json!({
                "job_data": {"id": "j1", "title": "Engineer"},
                "candidate_pool": [{"id": "c1"}, {"id": "c2"}, {"id": "c3"}]
            }),
        )
        .unwrap();

        let result = action.run(Uuid::now_v7(), &runtime).await.unwrap();

        assert_eq!(result["total_candidates_considered"], 3);
        assert_eq!(result["job_title"], "Engineer");
        assert_eq!(result["matches"], "mock matcher output");
    }

    #[tokio::test]
    async fn generic_result_carries_task_id() {
        let runtime = MockAgentRuntime::new();
        let task_id = Uuid::now_v7();
        let action = TaskAction::parse("draft_outreach", &json!({})).unwrap();

        let result = action.run(task_id, &runtime).await.unwrap();

        assert_eq!(result["task_id"], json!(task_id));
        assert_eq!(result["action"], "draft_outreach");
    }

    #[tokio::test]
    async fn runtime_errors_propagate() {
        let runtime = MockAgentRuntime::new().failing("model unavailable");
        let action = TaskAction::parse("draft_outreach", &json!({})).unwrap();

        let err = action.run(Uuid::now_v7(), &runtime).await.unwrap_err();
        assert_eq!(err.to_string(), "model unavailable");
    }
}
