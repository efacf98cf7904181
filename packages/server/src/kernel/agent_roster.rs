//! Roles served by the hosted agent runtime.
//!
//! Each role is a fixed instruction template plus sampling settings. The
//! roster is built once at startup and handed to the runtime, so there is no
//! lazily populated agent cache anywhere in the process.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Recruiter,
    Processor,
    Matcher,
    Search,
    Triage,
}

impl AgentRole {
    pub const SPECIALISTS: [AgentRole; 4] = [
        AgentRole::Recruiter,
        AgentRole::Processor,
        AgentRole::Matcher,
        AgentRole::Search,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Recruiter => "recruiter",
            AgentRole::Processor => "processor",
            AgentRole::Matcher => "matcher",
            AgentRole::Search => "search",
            AgentRole::Triage => "triage",
        }
    }

    /// Pick the specialist named in a triage reply.
    ///
    /// The last specialist named as a whole word wins, so a reply that
    /// reasons about other roles before its verdict routes to the verdict.
    pub fn from_triage_reply(reply: &str) -> Option<AgentRole> {
        let reply = reply.to_lowercase();
        reply
            .split(|c: char| !c.is_ascii_alphanumeric())
            .rev()
            .filter(|word| !word.is_empty())
            .find_map(|word| {
                Self::SPECIALISTS
                    .iter()
                    .copied()
                    .find(|role| role.as_str() == word)
            })
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recruiter" => Ok(AgentRole::Recruiter),
            "processor" => Ok(AgentRole::Processor),
            "matcher" => Ok(AgentRole::Matcher),
            "search" => Ok(AgentRole::Search),
            "triage" => Ok(AgentRole::Triage),
            other => Err(format!("unknown agent role: {}", other)),
        }
    }
}

/// Instruction template and sampling settings for one role.
#[derive(Debug, Clone)]
pub struct RoleProfile {
    pub display_name: &'static str,
    pub instructions: &'static str,
    pub temperature: f64,
}

/// The full set of role profiles plus the model they run on.
#[derive(Debug, Clone)]
pub struct AgentRoster {
    pub model: String,
    pub max_tokens: u64,
    profiles: HashMap<AgentRole, RoleProfile>,
}

impl AgentRoster {
    pub fn new(model: impl Into<String>) -> Self {
        let profiles = [
            AgentRole::Recruiter,
            AgentRole::Processor,
            AgentRole::Matcher,
            AgentRole::Search,
            AgentRole::Triage,
        ]
        .into_iter()
        .map(|role| (role, default_profile(role)))
        .collect();

        Self {
            model: model.into(),
            max_tokens: 4096,
            profiles,
        }
    }

    pub fn profile(&self, role: AgentRole) -> &RoleProfile {
        // every role is inserted in `new`
        &self.profiles[&role]
    }

    pub fn roles(&self) -> impl Iterator<Item = (&AgentRole, &RoleProfile)> {
        self.profiles.iter()
    }
}

fn default_profile(role: AgentRole) -> RoleProfile {
    match role {
        AgentRole::Recruiter => RoleProfile {
            display_name: "AI Recruiter",
            instructions: RECRUITER_INSTRUCTIONS,
            temperature: 0.2,
        },
        AgentRole::Processor => RoleProfile {
            display_name: "AI Application Processor",
            instructions: PROCESSOR_INSTRUCTIONS,
            temperature: 0.1,
        },
        AgentRole::Matcher => RoleProfile {
            display_name: "AI Job Matcher",
            instructions: MATCHER_INSTRUCTIONS,
            temperature: 0.3,
        },
        AgentRole::Search => RoleProfile {
            display_name: "AI Search Agent",
            instructions: SEARCH_INSTRUCTIONS,
            temperature: 0.2,
        },
        AgentRole::Triage => RoleProfile {
            display_name: "Triage Agent",
            instructions: TRIAGE_INSTRUCTIONS,
            temperature: 0.0,
        },
    }
}

const RECRUITER_INSTRUCTIONS: &str = r#"You are a recruiter for technology companies.
Evaluate candidate applications against job requirements.
Weigh technical skills, experience, education and portfolio.
Name concrete strengths and concerns, and finish with a clear recommendation: Interview, Consider, or Reject."#;

const PROCESSOR_INSTRUCTIONS: &str = r#"You screen and process job applications.
Extract structured information (skills, experience, education) from resumes and applications.
Flag missing or inconsistent information and tag applications by skill area.
Stay objective and ignore factors unrelated to the role."#;

const MATCHER_INSTRUCTIONS: &str = r#"You match candidates to job openings.
Extract the key requirements of the job, compare each candidate against them,
and give a match percentage with a short rationale. Account for transferable skills."#;

const SEARCH_INSTRUCTIONS: &str = r#"You search for candidates and jobs.
Interpret the query, consider synonyms and related terms, apply the requested filters,
rank results by relevance and explain why each result was included."#;

const TRIAGE_INSTRUCTIONS: &str = r#"You route work on a talent platform to the right specialist.
Specialists:
- recruiter: evaluating candidates and making hiring recommendations
- processor: extracting and processing application information
- matcher: matching candidates to job opportunities
- search: finding candidates based on specific criteria
Reply with exactly one word: the name of the specialist that should handle the task."#;
