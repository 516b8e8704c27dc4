//! One-shot parsing.

use crate::client::XeroMlClient;
use crate::error::Result;
use crate::types::{IntentGraph, ParseOptions, ParseRequest, ParseResponse};

impl XeroMlClient {
    /// Parse a message without a session. Costs 1 credit.
    pub async fn parse(&self, message: &str, options: ParseOptions) -> Result<IntentGraph> {
        Ok(self.parse_detailed(message, options).await?.graph)
    }

    /// Parse a message and return the full response envelope.
    pub async fn parse_detailed(
        &self,
        message: &str,
        options: ParseOptions,
    ) -> Result<ParseResponse> {
        let request = ParseRequest::new(message, &options);
        self.post("/v1/parse", &request).await
    }
}
