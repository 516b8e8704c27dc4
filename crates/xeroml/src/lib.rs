//! HTTP client SDK for the XeroML intent-parsing service.
//!
//! Sends user text to the service and gets back an [`IntentGraph`]: the
//! user's root goal, a tree of sub-goals, and confidence metadata. Parsing
//! is available one-shot or inside a [`Session`] that tracks how the user's
//! goal drifts across turns.
//!
//! # Example
//!
//! ```no_run
//! use xeroml::{CreateSessionRequest, Error, ParseOptions, UpdateOptions, XeroMlClient};
//!
//! # async fn example() -> xeroml::Result<()> {
//! let client = XeroMlClient::builder()
//!     .api_key("xml_live_...")
//!     .build()?;
//!
//! // One-shot parse
//! let graph = client.parse("Help me plan a trip to Tokyo", ParseOptions::default()).await?;
//! println!("Root goal: {}", graph.root_goal);
//!
//! // Multi-turn session
//! let session = client.create_session(CreateSessionRequest::default()).await?;
//! session.parse("Build a REST API", ParseOptions::provider("openai")).await?;
//! session.update("Here is a plan for the API...", UpdateOptions::role("assistant")).await?;
//!
//! let drift = session.check_drift().await?;
//! if drift.detected {
//!     println!("Goal drifted: {}", drift.description);
//! }
//! session.end().await?;
//!
//! // Branch on the error kind
//! match client.get_usage().await {
//!     Ok(usage) => println!("{} credits left", usage.credits.remaining),
//!     Err(Error::RateLimit { retry_after, .. }) => println!("retry in {retry_after}s"),
//!     Err(Error::Credit(_)) => println!("out of credits"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Parse**: one-shot intent parsing
//! - **Sessions**: create, list, parse within, update, drift, graph, history, end
//! - **Usage**: credit balance and monthly usage

mod api;
pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use client::{ClientBuilder, XeroMlClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{map_error, ApiError, Error, ErrorBody, ErrorDetail, ErrorKind, Result};
pub use session::Session;
pub use types::*;
