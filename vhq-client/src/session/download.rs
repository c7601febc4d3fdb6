//! Analyze/Download controller: URL → analyze → preview → download, with an optional transcript.

use std::hash::{DefaultHasher, Hash, Hasher};

use vhq_api::api::{analyze, download, transcript::post::TranscriptEntry};

use crate::quality::{QualityChoice, quality_choices};
use crate::toast::{ToastKind, Toasts};
use crate::transcript::Transcript;
use crate::validate::validate_url;
use crate::{ApiClient, CancelToken, Ticker, Transport};

/// Highest value reached by the simulated download progress before the server answers
const PROGRESS_CAP: f64 = 95.0;

/// Progress shown while the server prepares a direct download.
///
/// The server does not report progress for direct downloads, so the bar advances by a
/// pseudo-random step of up to 15% per tick and stops at 95% until the answer arrives.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulatedProgress {
    value: f64,
    seed: u64,
    steps: u64,
}

impl SimulatedProgress {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Seeds the steps with the downloaded URL so that each download advances differently.
    pub fn for_url(url: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        url.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Percentage from 0 to 95
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Advances by one step. Returns whether the bar can still advance.
    pub fn advance(&mut self) -> bool {
        if self.value >= PROGRESS_CAP {
            return false;
        }
        let mut hasher = DefaultHasher::new();
        (self.seed, self.steps).hash(&mut hasher);
        self.steps += 1;
        let step = (hasher.finish() % 1501) as f64 / 100.0;
        self.value = (self.value + step).min(PROGRESS_CAP);
        self.value < PROGRESS_CAP
    }

    pub fn status_text(&self) -> &'static str {
        if self.value < 30.0 {
            "Preparing download..."
        } else if self.value < 70.0 {
            "Downloading video..."
        } else {
            "Finalizing download..."
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DownloadPhase {
    #[default]
    Idle,
    Analyzing,
    Preview,
    Downloading(SimulatedProgress),
    Complete {
        download_url: String,
        filename: String,
    },
    /// A primary step failed. The message replaces the current section.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DownloadSession {
    /// URL of the last analysis, used by the download and transcript requests
    pub url: String,
    pub phase: DownloadPhase,
    pub analysis: Option<analyze::post::Response>,
    pub qualities: Vec<QualityChoice>,
    pub quality: Option<String>,
    pub format: download::post::OutputFormat,
    /// Transcript shown in the modal, if open
    pub transcript: Option<Transcript>,
    pub transcript_loading: bool,
    pub toasts: Toasts,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadAction {
    AnalyzeStarted { url: String },
    Analyzed(analyze::post::Response),
    /// A blocking failure of analyze or download
    Failed(String),
    SelectQuality(String),
    SelectFormat(download::post::OutputFormat),
    DownloadStarted,
    Progress(SimulatedProgress),
    Downloaded(download::post::Response),
    TranscriptRequested,
    TranscriptLoaded(Vec<TranscriptEntry>),
    TranscriptFailed(String),
    CloseTranscript,
    /// Leaves the error section, back to the preview if an analysis is available
    Retry,
    Toast(ToastKind, String),
    DismissToast(u64),
}

impl DownloadSession {
    pub fn is_analyzing(&self) -> bool {
        matches!(self.phase, DownloadPhase::Analyzing)
    }

    pub fn is_downloading(&self) -> bool {
        matches!(self.phase, DownloadPhase::Downloading(_))
    }

    pub fn apply(&mut self, action: DownloadAction) {
        match action {
            DownloadAction::AnalyzeStarted { url } => {
                self.url = url;
                self.phase = DownloadPhase::Analyzing;
            }
            DownloadAction::Analyzed(analysis) => {
                self.qualities = quality_choices(&analysis.formats);
                self.quality = self.qualities.first().map(|q| q.value.clone());
                self.transcript = None;
                self.analysis = Some(analysis);
                self.phase = DownloadPhase::Preview;
                self.toasts
                    .push(ToastKind::Success, "Video analyzed successfully!");
            }
            DownloadAction::Failed(message) => {
                self.phase = DownloadPhase::Failed(message);
            }
            DownloadAction::SelectQuality(quality) => {
                if self.qualities.iter().any(|q| q.value == quality) {
                    self.quality = Some(quality);
                }
            }
            DownloadAction::SelectFormat(format) => self.format = format,
            DownloadAction::DownloadStarted => {
                self.phase = DownloadPhase::Downloading(SimulatedProgress::default());
            }
            DownloadAction::Progress(progress) => {
                if let DownloadPhase::Downloading(current) = &mut self.phase {
                    *current = progress;
                }
            }
            DownloadAction::Downloaded(response) => {
                self.phase = DownloadPhase::Complete {
                    download_url: response.download_url,
                    filename: response.filename,
                };
                self.toasts
                    .push(ToastKind::Success, "Download completed successfully!");
            }
            DownloadAction::TranscriptRequested => self.transcript_loading = true,
            DownloadAction::TranscriptLoaded(entries) => {
                self.transcript_loading = false;
                self.transcript = Some(Transcript::from_entries(&entries));
            }
            DownloadAction::TranscriptFailed(message) => {
                self.transcript_loading = false;
                self.toasts.push(ToastKind::Error, message);
            }
            DownloadAction::CloseTranscript => self.transcript = None,
            DownloadAction::Retry => {
                if matches!(self.phase, DownloadPhase::Failed(_)) {
                    self.phase = if self.analysis.is_some() {
                        DownloadPhase::Preview
                    } else {
                        DownloadPhase::Idle
                    };
                }
            }
            DownloadAction::Toast(kind, message) => {
                self.toasts.push(kind, message);
            }
            DownloadAction::DismissToast(id) => self.toasts.dismiss(id),
        }
    }
}

/// Validates `input` and analyzes it. An invalid URL fails before any request is made.
pub async fn analyze<T: Transport>(
    client: &ApiClient<T>,
    input: &str,
    mut emit: impl FnMut(DownloadAction),
) {
    let url = match validate_url(input) {
        Ok(url) => url,
        Err(e) => {
            emit(DownloadAction::Failed(e.to_string()));
            return;
        }
    };

    emit(DownloadAction::AnalyzeStarted { url: url.clone() });
    match client.analyze(&url).await {
        Ok(analysis) => {
            log::info!("Analyzed {url} on {}", analysis.platform);
            emit(DownloadAction::Analyzed(analysis));
        }
        Err(e) => emit(DownloadAction::Failed(e.to_string())),
    }
}

/// Requests the download of the analyzed video.
pub async fn download<T: Transport>(
    client: &ApiClient<T>,
    url: &str,
    quality: &str,
    format: download::post::OutputFormat,
    mut emit: impl FnMut(DownloadAction),
) {
    emit(DownloadAction::DownloadStarted);
    match client.download(url, quality, format).await {
        Ok(response) => {
            log::info!("Download of {url} ready as {}", response.filename);
            emit(DownloadAction::Downloaded(response));
        }
        Err(e) => emit(DownloadAction::Failed(e.to_string())),
    }
}

/// Advances the simulated progress of a download once per tick until it reaches its cap or
/// `token` is cancelled.
pub async fn run_simulated_progress<K: Ticker + ?Sized>(
    ticker: &mut K,
    token: &CancelToken,
    mut progress: SimulatedProgress,
    mut emit: impl FnMut(DownloadAction),
) {
    loop {
        ticker.tick().await;
        if token.is_cancelled() {
            return;
        }
        let more = progress.advance();
        emit(DownloadAction::Progress(progress.clone()));
        if !more {
            return;
        }
    }
}

/// Fetches the transcript of the analyzed video. Failures end up in a notification.
pub async fn load_transcript<T: Transport>(
    client: &ApiClient<T>,
    url: &str,
    mut emit: impl FnMut(DownloadAction),
) {
    emit(DownloadAction::TranscriptRequested);
    match client.transcript(url).await {
        Ok(response) => emit(DownloadAction::TranscriptLoaded(response.transcript)),
        Err(e) => {
            log::warn!("Transcript of {url} unavailable: {e}");
            emit(DownloadAction::TranscriptFailed(e.to_string()));
        }
    }
}
