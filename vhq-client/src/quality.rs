//! Quality tiers offered to the user by both controllers.

use vhq_api::api::{
    analyze::post::Format, download::post::OutputFormat, platform_detect,
};

use crate::gate::Gating;

/// Qualities offered when the analysis lists formats but none of them names a quality
pub const DEFAULT_QUALITIES: [&str; 5] = ["highest", "720p", "480p", "360p", "lowest"];

/// One entry of the quality selector of the analyze controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityChoice {
    pub value: String,
    pub label: String,
}

/// Returns each quality of `formats` once, in order of first appearance. Formats without a
/// quality are skipped.
pub fn distinct_qualities(formats: &[Format]) -> Vec<String> {
    let mut qualities: Vec<String> = Vec::new();
    for quality in formats
        .iter()
        .filter_map(|f| f.quality.as_deref())
        .filter(|q| !q.is_empty())
    {
        if !qualities.iter().any(|q| q == quality) {
            qualities.push(quality.to_string());
        }
    }
    qualities
}

/// Builds the options of the quality selector.
pub fn quality_choices(formats: &[Format]) -> Vec<QualityChoice> {
    if formats.is_empty() {
        return Vec::new();
    }

    let qualities = distinct_qualities(formats);
    if qualities.is_empty() {
        return DEFAULT_QUALITIES
            .iter()
            .map(|quality| QualityChoice {
                value: quality.to_string(),
                label: quality_label(quality),
            })
            .collect();
    }

    qualities
        .into_iter()
        .map(|value| QualityChoice {
            label: quality_label(&value),
            value,
        })
        .collect()
}

/// Display label of a quality value: resolutions such as `720p` get an `HD` suffix.
pub fn quality_label(quality: &str) -> String {
    match quality {
        "highest" => "Highest Quality".to_string(),
        "lowest" => "Lowest Quality".to_string(),
        q if is_resolution(q) => format!("{q} HD"),
        q => q.to_string(),
    }
}

fn is_resolution(quality: &str) -> bool {
    quality
        .strip_suffix('p')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Rough bitrate, in bits per second, used to estimate the size of a download
fn estimated_bitrate(quality: &str, format: OutputFormat) -> f64 {
    let (video, audio) = match quality {
        "highest" => (2_000_000.0, 320_000.0),
        "480p" => (1_000_000.0, 192_000.0),
        "360p" => (500_000.0, 128_000.0),
        "lowest" => (250_000.0, 96_000.0),
        _ => (1_500_000.0, 256_000.0),
    };
    match format {
        OutputFormat::Video => video,
        OutputFormat::Audio => audio,
    }
}

/// Estimated size in bytes of a download, or `None` when the video length is unknown.
pub fn estimate_size(duration: Option<f64>, quality: &str, format: OutputFormat) -> Option<f64> {
    let duration = duration.filter(|d| *d > 0.0)?;
    Some(duration * estimated_bitrate(quality, format) / 8.0)
}

/// A quality tier of the smart controller, with its gate
#[derive(Debug, Clone, PartialEq)]
pub struct QualityOption {
    pub quality: String,
    pub gating: Gating,
    /// Estimated processing time in seconds
    pub processing_time: f64,
    pub icon: String,
    pub label: String,
}

impl QualityOption {
    /// Short badge shown on the card of a gated tier
    pub fn badge(&self) -> Option<String> {
        match self.gating {
            Gating::Free => None,
            Gating::Ad { seconds } => Some(format!("{seconds}s ad")),
            Gating::Premium => Some("👑 Premium".to_string()),
        }
    }

    pub fn details(&self) -> String {
        match self.gating {
            Gating::Free => "Free".to_string(),
            Gating::Ad { seconds } => format!("Watch {seconds}s ad"),
            Gating::Premium => "Premium only".to_string(),
        }
    }

    /// Label of the button starting the processing of this tier
    pub fn action_label(&self) -> String {
        let quality = &self.quality;
        match self.gating {
            Gating::Free => format!("Start {quality} AI Enhancement"),
            Gating::Ad { seconds } => format!("Watch {seconds}s Ad → Start {quality} Enhancement"),
            Gating::Premium => format!("Upgrade to Premium for {quality}"),
        }
    }
}

/// Builds the tiers offered by a platform detection, in the recommended order. Recommended
/// qualities without a configuration are skipped.
pub fn quality_options(detection: &platform_detect::post::Response) -> Vec<QualityOption> {
    detection
        .recommended_qualities
        .iter()
        .filter_map(|quality| {
            let config = detection.quality_configs.get(quality)?;
            Some(QualityOption {
                quality: quality.clone(),
                gating: Gating::from(config),
                processing_time: config.processing_time,
                icon: config.icon.clone(),
                label: config.label.clone(),
            })
        })
        .collect()
}
