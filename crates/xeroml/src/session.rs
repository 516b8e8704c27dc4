//! Multi-turn sessions.

use crate::client::XeroMlClient;
use crate::error::Result;
use crate::types::{
    AckResponse, DriftReport, IntentGraph, ParseOptions, ParseRequest, SessionGraphResponse,
    SessionHistoryResponse, SessionParseResponse, UpdateOptions, UpdateRequest,
};

/// Handle to a server-side session.
///
/// Obtained from [`XeroMlClient::create_session`] or
/// [`XeroMlClient::session`]. The handle only knows its id; turn counts,
/// status and drift live on the server and are read back on demand.
#[derive(Debug, Clone)]
pub struct Session {
    client: XeroMlClient,
    session_id: String,
}

impl Session {
    pub(crate) fn new(client: XeroMlClient, session_id: String) -> Self {
        Self { client, session_id }
    }

    /// The server-side session identifier.
    pub fn id(&self) -> &str {
        &self.session_id
    }

    fn path(&self, action: &str) -> String {
        format!("/v1/sessions/{}/{}", self.session_id, action)
    }

    /// Parse a user message within this session. Costs 1 credit.
    pub async fn parse(&self, message: &str, options: ParseOptions) -> Result<IntentGraph> {
        Ok(self.parse_detailed(message, options).await?.graph)
    }

    /// Parse a user message and return the full response, including the
    /// turn number it was recorded under.
    pub async fn parse_detailed(
        &self,
        message: &str,
        options: ParseOptions,
    ) -> Result<SessionParseResponse> {
        let request = ParseRequest::new(message, &options);
        self.client.post(&self.path("parse"), &request).await
    }

    /// Feed an assistant (or other) response back for drift tracking. Free.
    pub async fn update(&self, message: &str, options: UpdateOptions) -> Result<()> {
        let request = UpdateRequest {
            message,
            role: options.role.as_deref(),
        };
        let _: AckResponse = self.client.post(&self.path("update"), &request).await?;
        Ok(())
    }

    /// Check whether the user's goal has drifted. Free.
    pub async fn check_drift(&self) -> Result<DriftReport> {
        self.client.get(&self.path("drift")).await
    }

    /// Get the current graph, or `None` if nothing has been parsed yet. Free.
    pub async fn get_graph(&self) -> Result<Option<IntentGraph>> {
        Ok(self.graph_snapshot().await?.graph)
    }

    /// Get the current graph together with the session's turn count. Free.
    pub async fn graph_snapshot(&self) -> Result<SessionGraphResponse> {
        self.client.get(&self.path("graph")).await
    }

    /// Get per-turn graphs, drift events and the current evolved graph. Free.
    pub async fn get_history(&self) -> Result<SessionHistoryResponse> {
        self.client.get(&self.path("history")).await
    }

    /// End this session. Free.
    pub async fn end(&self) -> Result<()> {
        let body = serde_json::Map::new();
        let _: AckResponse = self.client.post(&self.path("end"), &body).await?;
        tracing::debug!(session_id = %self.session_id, "Session ended");
        Ok(())
    }
}
