//! Batch photo upload with client-side validation and bounded retry.
//!
//! One call to [`UploadOrchestrator::upload`] runs one state machine:
//!
//! ```text
//! Validating -> Uploading -> (Retrying)* -> Succeeded | Failed
//!     \_______________________________________________/ (no valid files)
//! ```
//!
//! Only network-class failures are retried, after a fixed delay, up to
//! [`RetryPolicy::max_attempts`] attempts in total. Attempts never overlap.
//! Status updates go out in order over an unbounded channel; the final
//! result is also returned by value.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use eventplan_core::photo::is_allowed_content_type;
use eventplan_core::types::DbId;
use eventplan_db::models::photo::{Photo, PhotoUploadResponse};
use futures::stream;
use serde::Deserialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::ApiClient;
use crate::error::ErrorBody;

/// Terminal message after retries were exhausted on network failures.
pub const NETWORK_FAILURE_MESSAGE: &str = "Network error: try again later";

/// Size of the body chunks handed to the HTTP stack.
const CHUNK_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Input and configuration
// ---------------------------------------------------------------------------

/// A file picked for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// How many attempts a batch gets and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Fixed delay before each retry.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(1500),
        }
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Failure of one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection, timeout or aborted body. Worth retrying.
    #[error("{0}")]
    Network(String),

    /// The server answered and refused the batch, or the request could not
    /// be built. Never retried.
    #[error("{message}")]
    Application {
        /// HTTP status, `None` when no response was received.
        status: Option<u16>,
        message: String,
    },
}

impl TransportError {
    pub fn is_network(&self) -> bool {
        matches!(self, TransportError::Network(_))
    }
}

/// Progress callback: `(bytes_sent, bytes_total)`.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Sends one batch of files for one event.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn send_batch(
        &self,
        event_id: DbId,
        files: &[UploadFile],
        progress: ProgressFn,
    ) -> Result<PhotoUploadResponse, TransportError>;
}

/// [`UploadTransport`] over HTTP multipart with streamed, progress-reporting
/// bodies.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    api: ApiClient,
}

impl HttpTransport {
    /// The client must already hold an editor or admin token.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn classify(err: reqwest::Error) -> TransportError {
        if err.is_builder() {
            TransportError::Application {
                status: None,
                message: err.to_string(),
            }
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

#[derive(Deserialize)]
struct UploadEnvelope {
    data: PhotoUploadResponse,
}

#[async_trait]
impl UploadTransport for HttpTransport {
    async fn send_batch(
        &self,
        event_id: DbId,
        files: &[UploadFile],
        progress: ProgressFn,
    ) -> Result<PhotoUploadResponse, TransportError> {
        let total: u64 = files.iter().map(|f| f.bytes.len() as u64).sum();
        let sent = Arc::new(AtomicU64::new(0));

        let mut form = reqwest::multipart::Form::new();
        for file in files {
            let chunks: Vec<Vec<u8>> = file.bytes.chunks(CHUNK_SIZE).map(<[u8]>::to_vec).collect();
            let sent = Arc::clone(&sent);
            let progress = Arc::clone(&progress);
            let body = reqwest::Body::wrap_stream(stream::iter(chunks.into_iter().map(
                move |chunk| {
                    let done = sent.fetch_add(chunk.len() as u64, Ordering::Relaxed)
                        + chunk.len() as u64;
                    progress(done, total);
                    Ok::<_, std::io::Error>(chunk)
                },
            )));
            let part = reqwest::multipart::Part::stream_with_length(body, file.bytes.len() as u64)
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)
                .map_err(Self::classify)?;
            form = form.part("files", part);
        }

        let request = self
            .api
            .authorized(
                self.api
                    .http()
                    .post(self.api.url(&format!("/events/{event_id}/photos"))),
            )
            .map_err(|e| TransportError::Application {
                status: None,
                message: e.to_string(),
            })?;
        let response = request.multipart(form).send().await.map_err(Self::classify)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
            return Err(TransportError::Application {
                status: Some(status.as_u16()),
                message,
            });
        }

        response
            .json::<UploadEnvelope>()
            .await
            .map(|envelope| envelope.data)
            .map_err(|e| {
                if e.is_decode() {
                    TransportError::Application {
                        status: Some(status.as_u16()),
                        message: format!("Unexpected response: {e}"),
                    }
                } else {
                    TransportError::Network(e.to_string())
                }
            })
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Phase of an upload invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Validating,
    Uploading,
    Retrying,
    Succeeded,
    Failed,
}

impl UploadPhase {
    /// Whether a status in `next` may follow a status in `self`.
    ///
    /// Staying in the same non-terminal phase is allowed (progress updates,
    /// per-file rejections, the next retry). Terminal phases allow nothing.
    pub fn can_transition_to(self, next: UploadPhase) -> bool {
        use UploadPhase::*;
        matches!(
            (self, next),
            (Validating, Validating | Uploading | Failed)
                | (Uploading, Uploading | Retrying | Succeeded | Failed)
                | (Retrying, Retrying | Succeeded | Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, UploadPhase::Succeeded | UploadPhase::Failed)
    }
}

/// Status updates sent while an upload runs.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadStatus {
    Validating,
    /// A file failed the client-side type check and was left out.
    Rejected { file_name: String, reason: String },
    /// First attempt; `progress` is 0..=100 and reaches 100 before
    /// `Succeeded`.
    Uploading { progress: u8 },
    /// Attempt `attempt` of `max_attempts`; progress restarts at 0.
    Retrying {
        attempt: u32,
        max_attempts: u32,
        progress: u8,
    },
    Succeeded {
        photos: Vec<Photo>,
        warnings: Vec<String>,
    },
    Failed { message: String },
}

impl UploadStatus {
    pub fn phase(&self) -> UploadPhase {
        match self {
            UploadStatus::Validating | UploadStatus::Rejected { .. } => UploadPhase::Validating,
            UploadStatus::Uploading { .. } => UploadPhase::Uploading,
            UploadStatus::Retrying { .. } => UploadPhase::Retrying,
            UploadStatus::Succeeded { .. } => UploadPhase::Succeeded,
            UploadStatus::Failed { .. } => UploadPhase::Failed,
        }
    }
}

/// Final result of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// At least one photo was created. `warnings` holds client rejections
    /// and server per-file errors.
    Succeeded {
        photos: Vec<Photo>,
        warnings: Vec<String>,
        attempts: u32,
    },
    Failed {
        message: String,
        /// Client-side rejections, reported even when nothing was sent.
        rejected: Vec<String>,
        attempts: u32,
    },
}

/// Forwards status updates, refusing transitions the phase table forbids.
struct StatusReporter {
    tx: Option<UnboundedSender<UploadStatus>>,
    phase: UploadPhase,
}

impl StatusReporter {
    fn emit(&mut self, status: UploadStatus) {
        let next = status.phase();
        if !self.phase.can_transition_to(next) {
            tracing::error!(from = ?self.phase, to = ?next, "Refusing invalid upload transition");
            return;
        }
        self.phase = next;
        if let Some(tx) = &self.tx {
            // A closed receiver means the caller stopped listening.
            let _ = tx.send(status);
        }
    }

    /// Progress callback for one attempt, plus the last percentage it
    /// reported. Sends only when the percentage changes.
    fn progress_fn(&self, attempt: u32, max_attempts: u32) -> (ProgressFn, Arc<AtomicU8>) {
        let tx = self.tx.clone();
        let last = Arc::new(AtomicU8::new(0));
        let seen = Arc::clone(&last);
        let callback: ProgressFn = Arc::new(move |sent: u64, total: u64| {
            let percent = if total == 0 {
                100
            } else {
                (sent.min(total) * 100 / total) as u8
            };
            if seen.swap(percent, Ordering::Relaxed) == percent {
                return;
            }
            if let Some(tx) = &tx {
                let _ = tx.send(progress_status(attempt, max_attempts, percent));
            }
        });
        (callback, last)
    }

    /// Pin progress at 100 once an attempt succeeded, for transports that
    /// never reported the final chunk (empty bodies, for one).
    fn complete_progress(&mut self, attempt: u32, max_attempts: u32, last: &AtomicU8) {
        if last.swap(100, Ordering::Relaxed) != 100 {
            self.emit(progress_status(attempt, max_attempts, 100));
        }
    }
}

fn progress_status(attempt: u32, max_attempts: u32, progress: u8) -> UploadStatus {
    if attempt == 1 {
        UploadStatus::Uploading { progress }
    } else {
        UploadStatus::Retrying {
            attempt,
            max_attempts,
            progress,
        }
    }
}

/// Runs upload invocations over a transport.
pub struct UploadOrchestrator<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: UploadTransport> UploadOrchestrator<T> {
    pub fn new(transport: T) -> Self {
        Self::with_policy(transport, RetryPolicy::default())
    }

    pub fn with_policy(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Validate `files`, upload the valid ones to `event_id` and retry
    /// network failures.
    ///
    /// Dropping the returned future abandons the invocation: the in-flight
    /// request is dropped with it and no further status is sent.
    pub async fn upload(
        &self,
        event_id: DbId,
        files: Vec<UploadFile>,
        status_tx: Option<UnboundedSender<UploadStatus>>,
    ) -> UploadOutcome {
        let mut reporter = StatusReporter {
            tx: status_tx,
            phase: UploadPhase::Validating,
        };
        reporter.emit(UploadStatus::Validating);

        let (valid, rejected) = partition(files);
        for (file_name, reason) in &rejected {
            reporter.emit(UploadStatus::Rejected {
                file_name: file_name.clone(),
                reason: reason.clone(),
            });
        }
        let rejected: Vec<String> = rejected
            .into_iter()
            .map(|(name, reason)| format!("File '{name}': {reason}"))
            .collect();

        if valid.is_empty() {
            return fail(&mut reporter, "Upload failed: no valid files".into(), rejected, 0);
        }

        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        reporter.emit(UploadStatus::Uploading { progress: 0 });

        loop {
            let (progress, last_progress) = reporter.progress_fn(attempt, max_attempts);
            let result = self.transport.send_batch(event_id, &valid, progress).await;

            match result {
                Ok(response) if response.photos.is_empty() => {
                    let detail = if response.errors.is_empty() {
                        "no photos were saved".to_string()
                    } else {
                        response.errors.join("; ")
                    };
                    let mut warnings = rejected;
                    warnings.extend(response.errors);
                    return fail(&mut reporter, format!("Upload failed: {detail}"), warnings, attempt);
                }
                Ok(response) => {
                    let mut warnings = rejected;
                    warnings.extend(response.errors);
                    tracing::info!(
                        event_id,
                        attempt,
                        uploaded = response.photos.len(),
                        warnings = warnings.len(),
                        "Upload succeeded"
                    );
                    reporter.complete_progress(attempt, max_attempts, &last_progress);
                    reporter.emit(UploadStatus::Succeeded {
                        photos: response.photos.clone(),
                        warnings: warnings.clone(),
                    });
                    return UploadOutcome::Succeeded {
                        photos: response.photos,
                        warnings,
                        attempts: attempt,
                    };
                }
                Err(TransportError::Network(detail)) if attempt < max_attempts => {
                    tracing::warn!(
                        event_id,
                        attempt,
                        max_attempts,
                        error = %detail,
                        "Upload attempt failed, retrying"
                    );
                    attempt += 1;
                    reporter.emit(UploadStatus::Retrying {
                        attempt,
                        max_attempts,
                        progress: 0,
                    });
                    tokio::time::sleep(self.policy.delay).await;
                }
                Err(TransportError::Network(detail)) => {
                    tracing::warn!(event_id, attempt, error = %detail, "Upload failed after all retries");
                    return fail(&mut reporter, NETWORK_FAILURE_MESSAGE.into(), rejected, attempt);
                }
                Err(TransportError::Application { status, message }) => {
                    tracing::warn!(event_id, attempt, ?status, error = %message, "Upload rejected");
                    return fail(
                        &mut reporter,
                        format!("Upload failed: {message}"),
                        rejected,
                        attempt,
                    );
                }
            }
        }
    }
}

fn fail(
    reporter: &mut StatusReporter,
    message: String,
    rejected: Vec<String>,
    attempts: u32,
) -> UploadOutcome {
    reporter.emit(UploadStatus::Failed {
        message: message.clone(),
    });
    UploadOutcome::Failed {
        message,
        rejected,
        attempts,
    }
}

/// Split files into the ones with an accepted content type and
/// `(file_name, reason)` for the rest.
fn partition(files: Vec<UploadFile>) -> (Vec<UploadFile>, Vec<(String, String)>) {
    let mut valid = Vec::with_capacity(files.len());
    let mut rejected = Vec::new();
    for file in files {
        if is_allowed_content_type(&file.content_type) {
            valid.push(file);
        } else {
            let reason = format!(
                "Unsupported file type '{}'. Allowed types: image/jpeg, image/png",
                file.content_type
            );
            rejected.push((file.file_name, reason));
        }
    }
    (valid, rejected)
}
