//! Request and response types for the XeroML API.
//!
//! These types mirror the service's API contract.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Intent graph
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle state of a sub-goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubGoalStatus {
    Pending,
    Active,
    Done,
    Blocked,
    Abandoned,
    Background,
    /// A value this client version does not know about.
    #[serde(other)]
    Unknown,
}

/// How close the user is to acting on their goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionReadiness {
    Exploring,
    Deciding,
    Executing,
    /// A value this client version does not know about.
    #[serde(other)]
    Unknown,
}

/// How well-defined the user's request is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityLevel {
    Clear,
    Partial,
    Conflicting,
    /// A value this client version does not know about.
    #[serde(other)]
    Unknown,
}

/// How cautious the response to the user should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskSensitivity {
    Low,
    Medium,
    High,
    /// A value this client version does not know about.
    #[serde(other)]
    Unknown,
}

/// Breadth of what the user is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentScope {
    Single,
    Compound,
    MultiStep,
    /// A value this client version does not know about.
    #[serde(other)]
    Unknown,
}

/// Categorical description of the conversational state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatentStates {
    /// Free-text label for the underlying goal.
    pub goal_intent: String,
    pub action_readiness: ActionReadiness,
    pub ambiguity_level: AmbiguityLevel,
    pub risk_sensitivity: RiskSensitivity,
    pub intent_scope: IntentScope,
}

/// Metadata attached to an intent graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentMeta {
    /// Provider that produced the graph.
    pub source: String,
    /// Overall confidence, 0 to 1.
    pub confidence: f64,
    #[serde(default)]
    pub negotiation_history: Vec<String>,
    pub latent_states: LatentStates,
}

/// A node in the sub-goal tree.
///
/// `children` are owned and form a tree; `dependencies` are ids of other
/// sub-goals and may point anywhere in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubGoal {
    pub id: String,
    pub goal: String,
    pub status: SubGoalStatus,
    pub priority: f64,
    #[serde(default)]
    pub success_criteria: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    /// Uncertainty, 0 to 1 by convention.
    pub uncertainty: f64,
    #[serde(default)]
    pub context_requirements: Vec<String>,
    pub modality: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub children: Vec<SubGoal>,
}

/// One parsed snapshot of user intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentGraph {
    pub schema_version: String,
    pub root_goal: String,
    #[serde(default)]
    pub sub_goals: Vec<SubGoal>,
    pub meta: IntentMeta,
}

impl IntentGraph {
    /// Iterate over every sub-goal in the tree, parents before children.
    pub fn sub_goals_depth_first(&self) -> SubGoalIter<'_> {
        SubGoalIter {
            stack: self.sub_goals.iter().rev().collect(),
        }
    }

    /// Find a sub-goal anywhere in the tree by id.
    pub fn find_sub_goal(&self, id: &str) -> Option<&SubGoal> {
        self.sub_goals_depth_first().find(|goal| goal.id == id)
    }

    /// Total number of sub-goals, nested ones included.
    pub fn sub_goal_count(&self) -> usize {
        self.sub_goals_depth_first().count()
    }
}

/// Depth-first iterator over a sub-goal tree.
pub struct SubGoalIter<'a> {
    stack: Vec<&'a SubGoal>,
}

impl<'a> Iterator for SubGoalIter<'a> {
    type Item = &'a SubGoal;

    fn next(&mut self) -> Option<Self::Item> {
        let goal = self.stack.pop()?;
        self.stack.extend(goal.children.iter().rev());
        Some(goal)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Drift
// ─────────────────────────────────────────────────────────────────────────────

/// Result of a drift check on a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    /// Whether the user's goal has shifted.
    pub detected: bool,
    pub drift_type: Option<String>,
    pub severity: f64,
    pub description: String,
    pub previous_goal: Option<String>,
    pub current_goal: Option<String>,
}

/// A drift event recorded in session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftEvent {
    pub turn_number: u32,
    pub drift_type: String,
    pub severity: f64,
    pub description: String,
    pub previous_goal: Option<String>,
    pub current_goal: Option<String>,
    pub created_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Parse
// ─────────────────────────────────────────────────────────────────────────────

/// Optional request keys are left out when unset or empty.
fn is_blank<S: AsRef<str>>(value: &Option<S>) -> bool {
    value.as_ref().is_none_or(|s| s.as_ref().is_empty())
}

/// Options for a parse call.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// LLM provider to use; the service picks one when unset.
    pub provider: Option<String>,
}

impl ParseOptions {
    /// Parse with a specific provider.
    pub fn provider(provider: impl Into<String>) -> Self {
        Self {
            provider: Some(provider.into()),
        }
    }
}

/// Request body for `/v1/parse` and `/v1/sessions/{id}/parse`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ParseRequest<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    pub provider: Option<&'a str>,
}

impl<'a> ParseRequest<'a> {
    pub(crate) fn new(message: &'a str, options: &'a ParseOptions) -> Self {
        Self {
            message,
            provider: options.provider.as_deref(),
        }
    }
}

/// Response to a one-shot parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResponse {
    pub graph: IntentGraph,
    #[serde(default)]
    pub session_id: Option<String>,
    pub request_id: String,
    pub latency_ms: f64,
}

/// Response to a parse within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionParseResponse {
    pub graph: IntentGraph,
    pub session_id: String,
    /// Turn number this parse was recorded under.
    pub turn_number: u32,
    pub request_id: String,
    pub latency_ms: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Sessions
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a new session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateSessionRequest {
    /// Caller-chosen session id; the service generates one when unset.
    #[serde(skip_serializing_if = "is_blank")]
    pub session_id: Option<String>,
}

impl CreateSessionRequest {
    /// Create a session under a caller-chosen id.
    pub fn with_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
        }
    }
}

/// Options for feeding a response back into a session.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Role of the message author, e.g. `assistant`.
    pub role: Option<String>,
}

impl UpdateOptions {
    /// Update with an explicit role.
    pub fn role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
        }
    }
}

/// Request body for `/v1/sessions/{id}/update`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct UpdateRequest<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    pub role: Option<&'a str>,
}

/// Session as returned on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub status: String,
    pub created_at: String,
}

/// Summary info for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionListItem {
    pub session_id: String,
    pub status: String,
    /// Number of turns in the session.
    pub turn_count: u32,
    /// Creation time (ISO 8601).
    pub created_at: String,
    /// Last update time (ISO 8601).
    pub updated_at: String,
}

/// Response for list sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionListItem>,
}

/// Query parameters for list sessions.
#[derive(Debug, Default, Serialize)]
pub(crate) struct ListSessionsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Current graph of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionGraphResponse {
    /// `None` until the session has parsed at least one message.
    pub graph: Option<IntentGraph>,
    pub session_id: String,
    pub turn_count: u32,
}

/// One turn's graph in session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphTurn {
    pub turn_number: u32,
    pub graph: IntentGraph,
    pub root_goal: String,
    pub confidence: f64,
    pub sub_goal_count: u32,
    pub provider: String,
    pub latency_ms: f64,
    pub created_at: String,
}

/// Full history of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionHistoryResponse {
    pub session_id: String,
    pub status: String,
    pub turn_count: u32,
    /// Graph evolved across all turns so far.
    pub current_graph: Option<IntentGraph>,
    #[serde(default)]
    pub graphs: Vec<GraphTurn>,
    #[serde(default)]
    pub drift_events: Vec<DriftEvent>,
}

/// Acknowledgement returned by update and end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AckResponse {
    pub status: String,
    pub session_id: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Usage
// ─────────────────────────────────────────────────────────────────────────────

/// Credit balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credits {
    pub used: u64,
    pub total: u64,
    pub remaining: u64,
}

/// Call counts for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMonth {
    /// Month in `YYYY-MM` form.
    pub month: String,
    pub parse_calls: u64,
    pub drift_checks: u64,
    pub session_creates: u64,
}

/// Credit balance and usage stats for the authenticated key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInfo {
    pub credits: Credits,
    pub tier: String,
    /// Requests per minute allowed for this tier.
    pub rate_limit: u32,
    #[serde(default)]
    pub usage: Vec<UsageMonth>,
}
