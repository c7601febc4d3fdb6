//! View models of the two controllers.
//!
//! Rendering is a pure function of a session. At most one section of the page is visible at a
//! time; overlays and notifications are rendered on top of it.

use vhq_api::api::{
    download::post::OutputFormat, download_result, process_video::post::PremiumOffer,
    processing_status::get::{JobResult, LiveMetrics},
};

use crate::format::{format_duration, format_file_size, trim_number};
use crate::platform::{KnownPlatform, Platform, PlatformDescriptor};
use crate::poller::{JobPhase, JobProgress};
use crate::quality::{QualityChoice, QualityOption, estimate_size};
use crate::session::{DownloadPhase, DownloadSession, SmartSession};
use crate::toast::Toast;
use crate::transcript::Transcript;

/// The mutually exclusive sections of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Loading,
    Preview,
    Progress,
    Complete,
    Error,
    Results,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Loading { message: String },
    Preview(PreviewView),
    QualitySelection(SelectionView),
    Progress(ProgressView),
    Complete { download_url: String, filename: String },
    Error { message: String },
    Results(ResultsView),
}

impl Section {
    pub fn region(&self) -> Region {
        match self {
            Self::Loading { .. } => Region::Loading,
            Self::Preview(_) | Self::QualitySelection(_) => Region::Preview,
            Self::Progress(_) => Region::Progress,
            Self::Complete { .. } => Region::Complete,
            Self::Error { .. } => Region::Error,
            Self::Results(_) => Region::Results,
        }
    }
}

/// Preview of an analyzed video with the download controls
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewView {
    pub platform: PlatformDescriptor,
    pub title: String,
    /// Set when the server resolved a short link
    pub resolved_from_short_link: bool,
    pub warning: Option<String>,
    pub thumbnail: Option<String>,
    pub duration: String,
    /// Estimated size of the selected download, e.g. `~39 MB`
    pub size: String,
    pub qualities: Vec<QualityChoice>,
    pub quality: Option<String>,
    pub format: OutputFormat,
    pub transcript_available: bool,
    pub transcript_loading: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualityCard {
    pub option: QualityOption,
    pub badge: Option<String>,
    pub details: String,
    /// e.g. `~5s processing`
    pub processing: String,
    pub selected: bool,
}

/// Detection panel and tier cards of the smart controller
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionView {
    pub headline: String,
    pub icon: String,
    pub confidence: u32,
    /// `None` while the smart analysis is pending
    pub summary: Option<AnalysisSummary>,
    pub cards: Vec<QualityCard>,
    /// Label of the process button, once a tier is selected
    pub process_label: Option<String>,
    pub process_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSummary {
    pub title: String,
    pub duration: String,
    pub enhancement: String,
    pub gain: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView {
    /// Percentage from 0 to 100
    pub percent: f64,
    pub status: String,
    /// Remaining time, e.g. `12s`
    pub eta: Option<String>,
    pub metrics: Option<LiveMetrics>,
}

impl ProgressView {
    /// Rounded percentage, e.g. `42%`
    pub fn label(&self) -> String {
        format!("{}%", self.percent.round())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub original_size: String,
    pub enhanced_size: String,
    pub improvement: String,
    /// e.g. `4x quality improvement`, when both sizes are known
    pub ratio: Option<String>,
    pub filename: Option<String>,
    pub download_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadView {
    pub analyze_enabled: bool,
    pub section: Option<Section>,
    pub transcript: Option<Transcript>,
    pub toasts: Vec<Toast>,
}

impl DownloadView {
    pub fn region(&self) -> Option<Region> {
        self.section.as_ref().map(Section::region)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdView {
    pub quality: String,
    /// Seconds left, or `✓` once the ad can be completed
    pub timer: String,
    pub can_complete: bool,
    pub completing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmartView {
    pub hint: Option<KnownPlatform>,
    pub detect_enabled: bool,
    pub section: Option<Section>,
    pub ad: Option<AdView>,
    pub paywall: Option<PremiumOffer>,
    pub toasts: Vec<Toast>,
}

impl SmartView {
    pub fn region(&self) -> Option<Region> {
        self.section.as_ref().map(Section::region)
    }
}

pub fn render_download(session: &DownloadSession) -> DownloadView {
    let section = match &session.phase {
        DownloadPhase::Idle => None,
        DownloadPhase::Analyzing => Some(Section::Loading {
            message: "Analyzing video...".to_string(),
        }),
        DownloadPhase::Preview => session.analysis.as_ref().map(|analysis| {
            let quality = session.quality.as_deref().unwrap_or("720p");
            let size = estimate_size(analysis.duration, quality, session.format);
            Section::Preview(PreviewView {
                platform: Platform::from_key(&analysis.platform).descriptor(),
                title: analysis
                    .title
                    .clone()
                    .unwrap_or_else(|| "Video Title".to_string()),
                resolved_from_short_link: analysis.platform == KnownPlatform::TikTok.key()
                    && analysis.resolved_url.is_some(),
                warning: analysis.warning.clone(),
                thumbnail: analysis.thumbnail.clone(),
                duration: format_duration(analysis.duration),
                size: format!("~{}", format_file_size(size)),
                qualities: session.qualities.clone(),
                quality: session.quality.clone(),
                format: session.format,
                transcript_available: analysis.transcript_available,
                transcript_loading: session.transcript_loading,
            })
        }),
        DownloadPhase::Downloading(progress) => Some(Section::Progress(ProgressView {
            percent: progress.value(),
            status: progress.status_text().to_string(),
            eta: None,
            metrics: None,
        })),
        DownloadPhase::Complete {
            download_url,
            filename,
        } => Some(Section::Complete {
            download_url: download_url.clone(),
            filename: filename.clone(),
        }),
        DownloadPhase::Failed(message) => Some(Section::Error {
            message: message.clone(),
        }),
    };

    DownloadView {
        analyze_enabled: !session.is_analyzing(),
        section,
        transcript: session.transcript.clone(),
        toasts: session.toasts.items().to_vec(),
    }
}

fn progress_view(progress: &JobProgress) -> ProgressView {
    ProgressView {
        percent: progress.progress,
        status: progress
            .step
            .clone()
            .unwrap_or_else(|| "Initializing...".to_string()),
        eta: progress
            .eta
            .filter(|eta| *eta > 0.0)
            .map(|eta| format!("{}s", eta.round())),
        metrics: progress.metrics.clone(),
    }
}

/// Ratio between the enhanced and original sizes, e.g. `4x quality improvement`
pub fn improvement_ratio(result: &JobResult) -> Option<String> {
    let original = result.original_size.filter(|s| *s > 0.0)?;
    let enhanced = result.enhanced_size?;
    Some(format!(
        "{}x quality improvement",
        trim_number((enhanced / original).round())
    ))
}

fn results_view(process_id: &str, result: &JobResult) -> ResultsView {
    ResultsView {
        original_size: format_file_size(result.original_size),
        enhanced_size: format_file_size(result.enhanced_size),
        improvement: result
            .quality_improvement
            .clone()
            .unwrap_or_else(|| "Enhanced quality".to_string()),
        ratio: improvement_ratio(result),
        filename: result.filename.clone(),
        download_url: download_result::get::path(process_id),
    }
}

fn selection_view(session: &SmartSession) -> Option<SelectionView> {
    let detection = session.detection.as_ref()?;
    let summary = session.analysis.as_ref().map(|analysis| AnalysisSummary {
        title: analysis
            .title
            .clone()
            .unwrap_or_else(|| "Video detected".to_string()),
        duration: format_duration(analysis.duration),
        enhancement: analysis
            .enhancement_potential
            .clone()
            .unwrap_or_else(|| "Standard".to_string()),
        gain: analysis
            .ai_enhancements
            .as_ref()
            .and_then(|e| e.potential_quality_gain.clone())
            .unwrap_or_else(|| "3-5x resolution improvement".to_string()),
    });
    let cards = detection
        .options
        .iter()
        .map(|option| QualityCard {
            badge: option.badge(),
            details: option.details(),
            processing: format!("~{}s processing", trim_number(option.processing_time)),
            selected: session.selected.as_deref() == Some(option.quality.as_str()),
            option: option.clone(),
        })
        .collect();
    let selected = session.selected_option();

    Some(SelectionView {
        headline: detection.headline(),
        icon: detection.icon.clone(),
        confidence: detection.confidence_percent(),
        summary,
        cards,
        process_label: selected.map(QualityOption::action_label),
        process_enabled: selected.is_some() && session.ad.is_none(),
    })
}

pub fn render_smart(session: &SmartSession) -> SmartView {
    let section = if let Some(message) = &session.error {
        Some(Section::Error {
            message: message.clone(),
        })
    } else {
        match &session.job {
            JobPhase::Failed(message) => Some(Section::Error {
                message: message.clone(),
            }),
            JobPhase::Completed(job) => Some(Section::Results(results_view(
                &job.process_id,
                &job.result,
            ))),
            JobPhase::Submitting => Some(Section::Progress(ProgressView {
                percent: 0.0,
                status: "Initializing...".to_string(),
                eta: None,
                metrics: None,
            })),
            JobPhase::Polling(progress) => Some(Section::Progress(progress_view(progress))),
            JobPhase::Idle if session.detecting && session.detection.is_none() => {
                Some(Section::Loading {
                    message: "Detecting platform...".to_string(),
                })
            }
            JobPhase::Idle => selection_view(session).map(Section::QualitySelection),
        }
    };

    let ad = session.ad.as_ref().map(|ad| {
        let remaining = ad.session.as_ref().map(|s| s.remaining());
        let can_complete = ad.session.as_ref().is_some_and(|s| s.can_complete());
        AdView {
            quality: ad.quality.clone(),
            timer: match remaining {
                _ if can_complete => "✓".to_string(),
                Some(seconds) => seconds.to_string(),
                None => "...".to_string(),
            },
            can_complete,
            completing: ad.completing,
        }
    });

    SmartView {
        hint: session.hint,
        detect_enabled: !session.detecting,
        section,
        ad,
        paywall: session.paywall.clone(),
        toasts: session.toasts.items().to_vec(),
    }
}
