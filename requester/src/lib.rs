mod config;
mod error;
mod payload;
mod req;
mod runner;
mod status;
mod transport;

pub use config::RunnerConfig;
pub use error::{RunError, TransportError};
pub use payload::Payload;
pub use req::{flatten_headers, parse_body, HeaderEntry, Method, RequestDraft};
pub use runner::{ExecutionResult, RequestRunner, RunId, RunState};
pub use status::{classify, StatusClass};
pub use transport::{HttpTransport, OutgoingRequest, Transport, TransportResponse};

// re-exports
pub use http::HeaderMap;
pub use serde_json::Value;
