//! Usage API.

use crate::client::XeroMlClient;
use crate::error::Result;
use crate::types::UsageInfo;

impl XeroMlClient {
    /// Get credit balance and usage stats. Free.
    pub async fn get_usage(&self) -> Result<UsageInfo> {
        self.get("/v1/usage").await
    }
}
