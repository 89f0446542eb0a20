//! Upload controller.
//!
//! Owns one [`UploadSession`] and drives it through
//! `Idle → Validating → (Uploading) → Analyzing → Done | Error`.
//! Snapshots are published on a `watch` channel so a view can follow along.

use std::sync::Arc;
use tokio::sync::watch;

use wordlens_core::{types::AnalysisEnvelope, Error, Result};

use crate::render::DisplaySink;
use crate::state::{FileCandidate, FileEvent, PreviewRef, UploadSession, UploadState};
use crate::transport::AnalysisTransport;
use crate::uploader::ContentUploader;

/// Whether the file is stored before the endpoint is called.
#[derive(Clone)]
pub enum ClientMode {
    /// Upload to the content store, then send the public URL as JSON.
    PreUpload(Arc<dyn ContentUploader>),
    /// Send the file itself as multipart.
    Inline,
}

pub struct UploadController {
    mode: ClientMode,
    transport: Arc<dyn AnalysisTransport>,
    sink: Option<Arc<dyn DisplaySink>>,
    session: watch::Sender<UploadSession>,
}

impl UploadController {
    pub fn new(mode: ClientMode, transport: Arc<dyn AnalysisTransport>) -> Self {
        let (session, _) = watch::channel(UploadSession::default());
        Self {
            mode,
            transport,
            sink: None,
            session,
        }
    }

    /// Publish successful results to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn DisplaySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Current session snapshot.
    pub fn session(&self) -> UploadSession {
        self.session.borrow().clone()
    }

    pub fn state(&self) -> UploadState {
        self.session.borrow().state
    }

    /// Follow session changes.
    pub fn subscribe(&self) -> watch::Receiver<UploadSession> {
        self.session.subscribe()
    }

    /// Handle a drop or pick. A drop with no files is ignored and yields `None`.
    pub async fn handle_event(&self, event: FileEvent) -> Result<Option<AnalysisEnvelope>> {
        match event.into_candidate() {
            Some(file) => self.analyze(file).await.map(Some),
            None => {
                tracing::debug!("Drop contained no files; ignoring");
                Ok(None)
            }
        }
    }

    /// Validate and analyze one file.
    ///
    /// Returns once the attempt reaches `Done`, `Error` or `Idle`. The outcome
    /// is also visible through [`session`](Self::session).
    pub async fn analyze(&self, file: FileCandidate) -> Result<AnalysisEnvelope> {
        let attempt = self.begin(&file)?;

        if !file.is_image() {
            let err = Error::InvalidFileType(file.content_type.clone());
            tracing::info!(file_name = %file.name, content_type = %file.content_type, "Rejected non-image file");
            self.update(attempt, UploadState::Idle, |s| {
                s.error = Some(err.to_string());
                s.preview = None;
            });
            return Err(err);
        }

        let mut watcher = self.session.subscribe();
        let cancelled = async move {
            let _ = watcher
                .wait_for(|s| s.attempt != attempt || !s.state.is_busy())
                .await;
        };
        let outcome = tokio::select! {
            outcome = self.run(attempt, &file) => outcome,
            _ = cancelled => Err(Error::Cancelled),
        };

        match outcome {
            Ok(envelope) => {
                let applied = self.update(attempt, UploadState::Done, |s| {
                    s.results = envelope.analysis.clone();
                    s.warning = envelope.warning.clone();
                    if let Some(path) = &envelope.image_path {
                        s.preview = Some(PreviewRef::Remote(path.clone()));
                    }
                });
                if !applied {
                    tracing::debug!(attempt, "Discarding result of a cancelled analysis");
                    return Err(Error::Cancelled);
                }

                if let Some(warning) = &envelope.warning {
                    tracing::warn!(%warning, "Analysis completed with a warning");
                }
                tracing::info!(items = envelope.analysis.len(), "Analysis complete");
                if let Some(sink) = &self.sink {
                    sink.show(&envelope.analysis);
                }
                Ok(envelope)
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                tracing::warn!(error = %e, "Analysis failed");
                self.update(attempt, UploadState::Error, |s| {
                    s.error = Some(e.to_string());
                    s.results.clear();
                });
                Err(e)
            }
        }
    }

    /// Abort an in-flight analysis. The late result, if any, is discarded.
    pub fn cancel(&self) {
        self.session.send_if_modified(|s| {
            if s.state.is_busy() && s.advance(UploadState::Idle) {
                s.results.clear();
                tracing::info!(attempt = s.attempt, "Analysis cancelled");
                true
            } else {
                false
            }
        });
    }

    /// Return to `Idle` after `Done` or `Error`.
    pub fn reset(&self) {
        self.session.send_if_modified(|s| {
            if s.state.is_busy() {
                return false;
            }
            *s = UploadSession {
                attempt: s.attempt,
                ..UploadSession::default()
            };
            true
        });
    }

    fn begin(&self, file: &FileCandidate) -> Result<u64> {
        let mut attempt = None;
        self.session.send_if_modified(|s| {
            if s.state.is_busy() {
                return false;
            }
            s.begin(&file.name);
            attempt = Some(s.attempt);
            true
        });

        attempt.ok_or_else(|| {
            tracing::debug!(file_name = %file.name, "Selection rejected while busy");
            Error::Busy
        })
    }

    async fn run(&self, attempt: u64, file: &FileCandidate) -> Result<AnalysisEnvelope> {
        match &self.mode {
            ClientMode::PreUpload(uploader) => {
                self.step(attempt, UploadState::Uploading)?;
                let stored = uploader.upload(file).await?;

                let advanced = self.update(attempt, UploadState::Analyzing, |s| {
                    s.preview = Some(PreviewRef::Remote(stored.public_url.clone()));
                });
                if !advanced {
                    return Err(Error::Cancelled);
                }
                self.transport.analyze_url(&stored.public_url).await
            }
            ClientMode::Inline => {
                self.step(attempt, UploadState::Analyzing)?;
                self.transport.analyze_file(file).await
            }
        }
    }

    fn step(&self, attempt: u64, next: UploadState) -> Result<()> {
        if self.update(attempt, next, |_| {}) {
            Ok(())
        } else {
            Err(Error::Cancelled)
        }
    }

    /// Apply `next` and `f` if `attempt` is still current and the move is legal.
    fn update(&self, attempt: u64, next: UploadState, f: impl FnOnce(&mut UploadSession)) -> bool {
        self.session.send_if_modified(|s| {
            if s.attempt != attempt || !s.advance(next) {
                return false;
            }
            f(s);
            true
        })
    }
}
