//! Sessions API.

use crate::client::XeroMlClient;
use crate::error::Result;
use crate::session::Session;
use crate::types::{
    CreateSessionRequest, ListSessionsQuery, SessionInfo, SessionListItem, SessionListResponse,
};

impl XeroMlClient {
    /// Create a new multi-turn session. Free.
    pub async fn create_session(&self, request: CreateSessionRequest) -> Result<Session> {
        let info: SessionInfo = self.post("/v1/sessions", &request).await?;
        tracing::debug!(session_id = %info.session_id, status = %info.status, "Session created");
        Ok(Session::new(self.clone(), info.session_id))
    }

    /// Attach to an existing session by id. Makes no request.
    pub fn session(&self, session_id: impl Into<String>) -> Session {
        Session::new(self.clone(), session_id.into())
    }

    /// List sessions for the authenticated key, optionally capped at `limit`.
    pub async fn list_sessions(&self, limit: Option<u32>) -> Result<Vec<SessionListItem>> {
        let query = ListSessionsQuery { limit };
        let response: SessionListResponse = self.get_with_query("/v1/sessions", &query).await?;
        Ok(response.sessions)
    }
}
