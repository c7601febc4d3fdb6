//! Common data types used by the APIs

use std::fmt;

/// Body of every non-successful response. The server is expected to set `error`, but the
/// client must cope with its absence.
#[derive(Default, Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// A single stream format reported by the analysis of a video.
#[derive(Default, Debug, serde::Deserialize, serde::Serialize, PartialEq, Clone)]
pub struct Format {
    /// Quality label, e.g. `720p` or `128kbps`. Missing for some audio-only streams.
    #[serde(default)]
    pub quality: Option<String>,
    /// Numeric stream tag assigned by the platform
    #[serde(default)]
    pub itag: Option<u32>,
    /// Either `video` or `audio`
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Size of the stream in bytes, when known
    #[serde(default)]
    pub filesize: Option<u64>,
}

/// Output flavour requested from the `download` endpoint.
#[derive(Default, Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Video,
    Audio,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

/// One caption line of a video transcript
#[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq, Clone)]
pub struct TranscriptEntry {
    /// Offset of the line from the start of the video, in seconds
    pub start: f64,
    pub text: String,
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Gating and presentation settings of a quality tier, as served by `platform-detect`.
#[derive(Default, Debug, serde::Deserialize, serde::Serialize, PartialEq, Clone)]
pub struct QualityConfig {
    /// Seconds of ad that must be watched to unlock the tier. Zero means no ad.
    #[serde(default)]
    pub ad_required: u64,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub label: String,
    /// Whether the tier is reserved to premium users
    #[serde(default)]
    pub premium: bool,
    /// Estimated processing time, in seconds
    #[serde(default)]
    pub processing_time: f64,
}

#[derive(Default, Debug, serde::Deserialize, serde::Serialize, PartialEq, Clone)]
pub struct AiEnhancements {
    #[serde(default)]
    pub potential_quality_gain: Option<String>,
}

/// Upsell attached to a `403` answer of `process-video`
#[derive(Default, Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
pub struct PremiumOffer {
    #[serde(default)]
    pub trial: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
}

/// Status of a processing job as reported by the server.
///
/// The server uses several words for the non-terminal states, which are folded into `Queued`
/// and `Running`. Unknown words are treated as `Running` so that a new server state never
/// terminates polling by accident.
#[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "queued" | "pending" | "started" => Self::Queued,
            "completed" => Self::Completed,
            "error" | "failed" => Self::Error,
            _ => Self::Running,
        }
    }
}

impl From<JobStatus> for String {
    fn from(value: JobStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entertainment metrics attached to a job while it is being enhanced
#[derive(Default, Debug, serde::Deserialize, serde::Serialize, PartialEq, Clone)]
pub struct LiveMetrics {
    #[serde(default)]
    pub neurons_active: Option<String>,
    #[serde(default)]
    pub gpu_utilization: Option<String>,
    #[serde(default)]
    pub enhancement_algorithm: Option<String>,
    #[serde(default)]
    pub frames_processed: Option<i64>,
}

/// Payload of a completed job
#[derive(Default, Debug, serde::Deserialize, serde::Serialize, PartialEq, Clone)]
pub struct JobResult {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    /// Size of the downloaded source, in bytes
    #[serde(default)]
    pub original_size: Option<f64>,
    /// Size of the processed output, in bytes
    #[serde(default)]
    pub enhanced_size: Option<f64>,
    #[serde(default)]
    pub quality_improvement: Option<String>,
}
