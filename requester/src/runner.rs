use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};

use http::HeaderMap;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    error::describe, flatten_headers, parse_body, HttpTransport, OutgoingRequest, Payload,
    RequestDraft, RunError, RunnerConfig, Transport, TransportResponse,
};

/// Monotonically increasing identifier of a triggered run.
pub type RunId = u64;

/// Outcome of one run. When completed, either `payload` or `error` is set,
/// never both.
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    pub status: Option<u16>,
    pub elapsed_ms: Option<u64>,
    pub headers: HeaderMap,
    pub payload: Option<Payload>,
    pub error: Option<String>,
}

impl ExecutionResult {
    fn failed(err: RunError, elapsed_ms: Option<u64>) -> Self {
        Self {
            elapsed_ms,
            error: Some(describe(&err)),
            ..Default::default()
        }
    }

    fn received(res: TransportResponse, elapsed_ms: u64) -> Self {
        Self {
            status: Some(res.status),
            elapsed_ms: Some(elapsed_ms),
            headers: res.headers,
            payload: Some(Payload::from_bytes(res.body)),
            error: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub enum RunState {
    #[default]
    Idle,
    InFlight {
        run: RunId,
    },
    Completed {
        run: RunId,
        result: ExecutionResult,
    },
}

impl RunState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, RunState::InFlight { .. })
    }

    pub fn result(&self) -> Option<&ExecutionResult> {
        match self {
            RunState::Completed { result, .. } => Some(result),
            _ => None,
        }
    }
}

/// Validates drafts, performs the exchange and publishes the run state.
pub struct RequestRunner<T = HttpTransport> {
    transport: T,
    latest: AtomicU64,
    state: watch::Sender<RunState>,
}

impl RequestRunner<HttpTransport> {
    pub fn with_config(config: &RunnerConfig) -> anyhow::Result<Self> {
        Ok(Self::new(HttpTransport::new(config)?))
    }
}

impl<T: Transport> RequestRunner<T> {
    pub fn new(transport: T) -> Self {
        let (state, _) = watch::channel(RunState::Idle);
        Self {
            transport,
            latest: AtomicU64::new(0),
            state,
        }
    }

    pub fn state(&self) -> RunState {
        self.state.borrow().clone()
    }

    /// Every state transition is published here; receivers only read.
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Run one request. Always settles into a result; failures are reported
    /// in `ExecutionResult::error`, never as `Err`.
    pub async fn execute(&self, draft: &RequestDraft) -> ExecutionResult {
        // id and InFlight are published under the same lock so an older
        // trigger cannot overwrite a newer run's state
        let mut run = 0;
        self.state.send_modify(|state| {
            run = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            *state = RunState::InFlight { run };
        });
        debug!(run, method = %draft.method, url = %draft.url, "run triggered");

        let result = self.run(run, draft).await;
        self.settle(run, result.clone());
        result
    }

    async fn run(&self, run: RunId, draft: &RequestDraft) -> ExecutionResult {
        if !draft.is_sendable() {
            debug!(run, "draft rejected: blank url");
            return ExecutionResult::failed(RunError::MissingUrl, None);
        }

        let headers = flatten_headers(&draft.headers);
        let body = match parse_body(draft.method, &draft.body_text) {
            Ok(body) => body,
            Err(err) => {
                debug!(run, "body rejected: {}", err);
                return ExecutionResult::failed(err, None);
            }
        };

        let req = OutgoingRequest {
            method: draft.method,
            url: draft.url.clone(),
            headers,
            body,
        };

        let start = Instant::now();
        let res = self.transport.send(req).await;
        let elapsed_ms = round_millis(start);

        match res {
            Ok(res) => {
                info!(run, status = res.status, elapsed_ms, "response received");
                ExecutionResult::received(res, elapsed_ms)
            }
            Err(err) => {
                warn!(run, elapsed_ms, "request failed: {}", err);
                ExecutionResult::failed(err.into(), Some(elapsed_ms))
            }
        }
    }

    fn settle(&self, run: RunId, result: ExecutionResult) {
        // a newer run owns the state now
        let applied = self.state.send_if_modified(|state| {
            if self.latest.load(Ordering::SeqCst) != run {
                return false;
            }
            *state = RunState::Completed { run, result };
            true
        });
        if !applied {
            debug!(run, "stale result discarded");
        }
    }
}

fn round_millis(start: Instant) -> u64 {
    let micros = start.elapsed().as_micros();
    ((micros + 500) / 1000) as u64
}
