//! The subcommands of `vhq`.
//!
//! Each command drives the same sessions as the browser site and writes the sections they render
//! to `out`. Blocking errors of a session end the command with an error.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use http::Uri;

use vhq_api::api::download::post::OutputFormat;
use vhq_api::api::process_video::post::PremiumOffer;
use vhq_api::api::processing_status::get::JobStatus;
use vhq_client::gate::GateAction;
use vhq_client::poller::{JobEvent, PollOutcome};
use vhq_client::session::{DownloadAction, DownloadSession, SmartAction, SmartSession, download, smart};
use vhq_client::toast::{ToastKind, Toasts};
use vhq_client::transcript::export_filename;
use vhq_client::validate::validate_url;
use vhq_client::view::{PreviewView, ResultsView, Section, SelectionView, render_download, render_smart};
use vhq_client::{ApiClient, CancelToken, Ticker, Transport};

use crate::transport::join_url;

/// Message of the most recent error notification
fn last_error(toasts: &Toasts, fallback: &str) -> anyhow::Error {
    let message = toasts
        .items()
        .iter()
        .rev()
        .find(|t| t.kind == ToastKind::Error)
        .map_or(fallback, |t| t.message.as_str());
    anyhow!("{message}")
}

fn unexpected(section: Option<Section>) -> anyhow::Error {
    match section {
        Some(Section::Error { message }) => anyhow!("{message}"),
        other => anyhow!("Unexpected state: {other:?}"),
    }
}

async fn analyzed<T: Transport>(client: &ApiClient<T>, url: &str) -> Result<DownloadSession> {
    let mut session = DownloadSession::default();
    download::analyze(client, url, |a| session.apply(a)).await;
    Ok(session)
}

fn preview(session: &DownloadSession) -> Result<PreviewView> {
    match render_download(session).section {
        Some(Section::Preview(preview)) => Ok(preview),
        other => Err(unexpected(other)),
    }
}

fn write_preview(out: &mut impl Write, preview: &PreviewView) -> Result<()> {
    writeln!(
        out,
        "{} {}: {}",
        preview.platform.icon, preview.platform.name, preview.title
    )?;
    if preview.resolved_from_short_link {
        writeln!(out, "Resolved from a short link")?;
    }
    if let Some(warning) = &preview.warning {
        writeln!(out, "Warning: {warning}")?;
    }
    writeln!(out, "Duration: {}", preview.duration)?;
    writeln!(out, "Qualities:")?;
    for choice in &preview.qualities {
        let marker = if preview.quality.as_deref() == Some(choice.value.as_str()) {
            '*'
        } else {
            ' '
        };
        writeln!(out, " {marker} {:<8} {}", choice.value, choice.label)?;
    }
    writeln!(
        out,
        "Estimated {} size: {}",
        preview.format.as_str(),
        preview.size
    )?;
    if preview.transcript_available {
        writeln!(out, "Transcript available")?;
    }
    Ok(())
}

/// Analyzes `url` and prints its preview.
pub async fn analyze<T: Transport>(
    client: &ApiClient<T>,
    url: &str,
    out: &mut impl Write,
) -> Result<()> {
    let session = analyzed(client, url).await?;
    write_preview(out, &preview(&session)?)
}

/// Analyzes `url`, then requests its download in `quality`, the best available one by default.
pub async fn download<T: Transport>(
    client: &ApiClient<T>,
    base_url: &Uri,
    url: &str,
    quality: Option<&str>,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let mut session = analyzed(client, url).await?;
    preview(&session)?;

    if let Some(quality) = quality {
        session.apply(DownloadAction::SelectQuality(quality.to_string()));
        if session.quality.as_deref() != Some(quality) {
            bail!("Quality {quality} is not available for this video");
        }
    }
    session.apply(DownloadAction::SelectFormat(format));
    let quality = session
        .quality
        .clone()
        .context("No quality is available for this video")?;

    let url = session.url.clone();
    download::download(client, &url, &quality, format, |a| session.apply(a)).await;
    match render_download(&session).section {
        Some(Section::Complete {
            download_url,
            filename,
        }) => {
            writeln!(out, "{filename}")?;
            writeln!(out, "Download: {}", join_url(base_url, &download_url))?;
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

/// Fetches the transcript of `url`. Prints it, or exports it to `export`. An export path naming
/// a directory receives a timestamped file.
pub async fn transcript<T: Transport>(
    client: &ApiClient<T>,
    url: &str,
    export: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    let url = validate_url(url)?;
    let mut session = DownloadSession::default();
    download::load_transcript(client, &url, |a| session.apply(a)).await;

    let Some(transcript) = &session.transcript else {
        return Err(last_error(&session.toasts, "Failed to get transcript"));
    };

    match export {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(export_filename(chrono::Utc::now().timestamp_millis()))
            } else {
                path.to_path_buf()
            };
            std::fs::write(&path, transcript.export(None))
                .with_context(|| format!("Writing the transcript to {}", path.display()))?;
            writeln!(out, "Transcript exported to {}", path.display())?;
        }
        None => writeln!(out, "{}", transcript.to_text())?,
    }
    Ok(())
}

fn write_selection(out: &mut impl Write, selection: &SelectionView) -> Result<()> {
    writeln!(
        out,
        "{} {} ({}% confidence)",
        selection.icon, selection.headline, selection.confidence
    )?;
    if let Some(summary) = &selection.summary {
        writeln!(out, "{} ({})", summary.title, summary.duration)?;
        writeln!(out, "Enhancement potential: {}", summary.enhancement)?;
        writeln!(out, "Expected gain: {}", summary.gain)?;
    }
    for card in &selection.cards {
        write!(
            out,
            "  {} {:<6} {:<12} {:<24} {}",
            card.option.icon, card.option.quality, card.option.label, card.details, card.processing
        )?;
        match &card.badge {
            Some(badge) => writeln!(out, " [{badge}]")?,
            None => writeln!(out)?,
        }
    }
    Ok(())
}

fn write_offer(out: &mut impl Write, quality: &str, offer: &PremiumOffer) -> Result<()> {
    writeln!(out, "{quality} requires premium access")?;
    if let Some(trial) = &offer.trial {
        writeln!(out, "Trial: {trial}")?;
    }
    if let Some(price) = &offer.price {
        writeln!(out, "Price: {price}")?;
    }
    for benefit in &offer.benefits {
        writeln!(out, " - {benefit}")?;
    }
    Ok(())
}

fn write_results(out: &mut impl Write, base_url: &Uri, results: &ResultsView) -> Result<()> {
    writeln!(out, "Enhancement complete: {}", results.improvement)?;
    writeln!(
        out,
        "Size: {} → {}",
        results.original_size, results.enhanced_size
    )?;
    if let Some(ratio) = &results.ratio {
        writeln!(out, "{ratio}")?;
    }
    if let Some(filename) = &results.filename {
        writeln!(out, "File: {filename}")?;
    }
    writeln!(out, "Download: {}", join_url(base_url, &results.download_url))?;
    Ok(())
}

/// Tickers of the recurring activities of a processing run
pub struct Tickers<'a> {
    pub poll: &'a mut dyn Ticker,
    pub ad: &'a mut dyn Ticker,
}

/// Detects the platform of `url` and lists its tiers. With a `quality`, passes the gate of the
/// tier, watching its ad if needed, and waits for the processing job to complete.
pub async fn process<T: Transport>(
    client: &ApiClient<T>,
    base_url: &Uri,
    tickers: Tickers<'_>,
    url: &str,
    quality: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let mut session = SmartSession::default();
    smart::detect(client, url, |a| session.apply(a)).await;
    match render_smart(&session).section {
        Some(Section::QualitySelection(selection)) => write_selection(out, &selection)?,
        other => return Err(unexpected(other)),
    }

    let Some(quality) = quality else {
        writeln!(out, "Pass --quality to start processing")?;
        return Ok(());
    };
    session.apply(SmartAction::SelectQuality(quality.to_string()));
    if session.selected.is_none() {
        bail!("Quality {quality} is not offered for this video");
    }

    let token = CancelToken::new();
    let url = session.url.clone();
    let mut ads_watched = 0;
    let mut step = session.next_step()?;
    loop {
        step = match step {
            GateAction::ShowPaywall => {
                return write_offer(out, quality, &PremiumOffer::default());
            }
            GateAction::OpenAd { .. } => {
                let flow = smart::open_ad(client, &mut *tickers.ad, &token, quality, |a| {
                    log_ad(&a, &session);
                    session.apply(a);
                })
                .await;
                match flow {
                    smart::AdFlow::Proceed => GateAction::StartJob,
                    smart::AdFlow::Watched(ad) => {
                        if !smart::finish_ad(client, &token, &ad, |a| session.apply(a)).await {
                            return Err(last_error(&session.toasts, "Failed to complete ad viewing"));
                        }
                        ads_watched += 1;
                        if let Some(notice) = session.toasts.items().last() {
                            writeln!(out, "{}", notice.message)?;
                        }
                        GateAction::StartJob
                    }
                    smart::AdFlow::Failed => {
                        return Err(last_error(&session.toasts, "Failed to load ad"));
                    }
                    smart::AdFlow::Cancelled => bail!("The ad was cancelled"),
                }
            }
            GateAction::StartJob => {
                let outcome = smart::process(
                    client,
                    &mut *tickers.poll,
                    &token,
                    &url,
                    quality,
                    |a| {
                        let polled = matches!(a, SmartAction::Job(JobEvent::Status(_)));
                        session.apply(a);
                        if polled {
                            log_progress(&session);
                        }
                    },
                )
                .await;
                match outcome {
                    PollOutcome::Completed(_) => {
                        return match render_smart(&session).section {
                            Some(Section::Results(results)) => write_results(out, base_url, &results),
                            other => Err(unexpected(other)),
                        };
                    }
                    PollOutcome::Failed(message) => bail!(message),
                    PollOutcome::AdRequired { seconds } => {
                        if ads_watched > 0 {
                            bail!("The server still requires an ad for {quality}");
                        }
                        GateAction::OpenAd {
                            seconds: seconds.unwrap_or_default(),
                        }
                    }
                    PollOutcome::PremiumRequired(offer) => {
                        return write_offer(out, quality, &offer);
                    }
                    PollOutcome::Cancelled => bail!("Processing was cancelled"),
                }
            }
        };
    }
}

fn log_ad(action: &SmartAction, session: &SmartSession) {
    match action {
        SmartAction::AdStarted(ad) => {
            tracing::info!(quality = %ad.quality, seconds = ad.duration, "Watching ad");
        }
        SmartAction::AdTick => {
            if let Some(ad) = session.ad.as_ref().and_then(|ad| ad.session.as_ref()) {
                // The tick is applied after this call
                tracing::debug!(remaining = ad.remaining().saturating_sub(1), "Ad countdown");
            }
        }
        _ => {}
    }
}

fn log_progress(session: &SmartSession) {
    if let Some(Section::Progress(progress)) = render_smart(session).section {
        tracing::info!(
            progress = %progress.label(),
            eta = progress.eta.as_deref().unwrap_or("-"),
            "{}",
            progress.status
        );
    }
}

/// Prints the status of the processing job `process_id`.
pub async fn status<T: Transport>(
    client: &ApiClient<T>,
    base_url: &Uri,
    process_id: &str,
    out: &mut impl Write,
) -> Result<()> {
    let status = client.processing_status(process_id).await?;
    writeln!(
        out,
        "{process_id}: {} ({}%)",
        status.status,
        status.progress.clamp(0.0, 100.0).round()
    )?;
    if let Some(step) = &status.enhancement_step {
        writeln!(out, "{step}")?;
    }
    match status.status {
        JobStatus::Completed => {
            let path = client.download_result_path(process_id);
            writeln!(out, "Download: {}", join_url(base_url, &path))?;
        }
        JobStatus::Error => {
            bail!(
                "{}",
                status.error.as_deref().unwrap_or("Processing failed")
            );
        }
        JobStatus::Queued | JobStatus::Running => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use serde_json::json;
    use vhq_api::api::{
        analyze, analyze_smart, complete_ad, download as download_api, platform_detect,
        process_video, processing_status, request_ad, transcript as transcript_api,
    };
    use vhq_client::testing::{FakeTransport, InstantTicker};

    const YOUTUBE: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
    const TIKTOK: &str = "https://www.tiktok.com/@someone/video/7234567890123456789";

    fn server() -> Uri {
        Uri::from_static("http://127.0.0.1:5000")
    }

    fn output(out: Vec<u8>) -> String {
        String::from_utf8_lossy(&out).into_owned()
    }

    fn with_analysis(client: &ApiClient<FakeTransport>) {
        client.transport().respond(
            analyze::post::PATH,
            200,
            json!({
                "platform": "youtube",
                "title": "Never Gonna Give You Up",
                "duration": 213,
                "formats": [
                    {"quality": "720p", "itag": 22, "type": "video"},
                    {"quality": "480p", "itag": 135, "type": "video"}
                ],
                "transcript_available": true
            }),
        );
    }

    fn with_detection(client: &ApiClient<FakeTransport>) {
        client
            .transport()
            .respond(
                platform_detect::post::PATH,
                200,
                json!({
                    "platform": "tiktok",
                    "confidence": 0.9,
                    "icon": "🎵",
                    "quality_configs": {
                        "480p": {"ad_required": 0, "icon": "📱", "label": "Standard", "premium": false, "processing_time": 5},
                        "4K": {"ad_required": 3, "icon": "💎", "label": "Ultra HD", "premium": false, "processing_time": 60},
                        "8K": {"ad_required": 0, "icon": "👑", "label": "Cinema", "premium": true, "processing_time": 120}
                    },
                    "recommended_qualities": ["480p", "4K", "8K"]
                }),
            )
            .respond(
                analyze_smart::post::PATH,
                200,
                json!({"title": "Dance", "duration": 15, "enhancement_potential": "High"}),
            );
    }

    #[tokio::test]
    #[googletest::test]
    async fn analyze_prints_the_preview() -> googletest::Result<()> {
        let client = ApiClient::new(FakeTransport::new());
        with_analysis(&client);

        let mut out = Vec::new();
        analyze(&client, YOUTUBE, &mut out).await.or_fail()?;

        let printed = output(out);
        expect_that!(printed, contains_substring("Never Gonna Give You Up"));
        expect_that!(printed, contains_substring("Duration: 3:33"));
        expect_that!(printed, contains_substring("* 720p"));
        expect_that!(printed, contains_substring("Transcript available"));
        Ok(())
    }

    #[tokio::test]
    #[googletest::test]
    async fn invalid_url_fails_without_requests() {
        let client = ApiClient::new(FakeTransport::new());

        let mut out = Vec::new();
        let result = analyze(&client, "not a url", &mut out).await;

        expect_that!(result, err(anything()));
        expect_that!(client.transport().requests(), is_empty());
    }

    #[tokio::test]
    #[googletest::test]
    async fn download_rejects_unavailable_quality() {
        let client = ApiClient::new(FakeTransport::new());
        with_analysis(&client);

        let mut out = Vec::new();
        let format = OutputFormat::Video;
        let result = download(&client, &server(), YOUTUBE, Some("4K"), format, &mut out).await;

        expect_that!(
            result.map_err(|e| e.to_string()),
            err(eq("Quality 4K is not available for this video"))
        );
        expect_that!(client.transport().paths(), elements_are![eq("/api/analyze")]);
    }

    #[tokio::test]
    #[googletest::test]
    async fn download_prints_the_link() -> googletest::Result<()> {
        let client = ApiClient::new(FakeTransport::new());
        with_analysis(&client);
        client.transport().respond(
            download_api::post::PATH,
            200,
            json!({"download_url": "/downloads/rick.mp3", "filename": "rick.mp3"}),
        );

        let mut out = Vec::new();
        download(&client, &server(), YOUTUBE, Some("480p"), OutputFormat::Audio, &mut out)
            .await
            .or_fail()?;

        expect_that!(
            output(out),
            eq("rick.mp3\nDownload: http://127.0.0.1:5000/downloads/rick.mp3\n")
        );
        expect_that!(
            client.transport().requests()[1].body,
            some(eq(&json!({"url": YOUTUBE, "quality": "480p", "format": "audio"})))
        );
        Ok(())
    }

    #[tokio::test]
    #[googletest::test]
    async fn transcript_is_exported_to_a_directory() -> googletest::Result<()> {
        let client = ApiClient::new(FakeTransport::new());
        client.transport().respond(
            transcript_api::post::PATH,
            200,
            json!({"transcript": [{"start": 0, "text": "Hello"}, {"start": 65, "text": "world"}]}),
        );
        let dir = tempfile::TempDir::new().or_fail()?;

        let mut out = Vec::new();
        transcript(&client, YOUTUBE, Some(dir.path()), &mut out)
            .await
            .or_fail()?;

        let files: Vec<_> = std::fs::read_dir(dir.path())
            .or_fail()?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .collect();
        let [file] = files.as_slice() else {
            panic!("expected one exported file, got {files:?}");
        };
        let exported = std::fs::read_to_string(file).or_fail()?;
        expect_that!(exported, starts_with("Transcript - Video\n\n"));
        expect_that!(exported, contains_substring("world"));
        expect_that!(output(out), starts_with("Transcript exported to "));
        Ok(())
    }

    #[tokio::test]
    #[googletest::test]
    async fn transcript_failure_is_an_error() {
        let client = ApiClient::new(FakeTransport::new());
        client
            .transport()
            .respond(transcript_api::post::PATH, 404, json!({"error": "No transcript"}));

        let mut out = Vec::new();
        let result = transcript(&client, YOUTUBE, None, &mut out).await;

        expect_that!(result.map_err(|e| e.to_string()), err(eq("No transcript")));
    }

    #[tokio::test]
    #[googletest::test]
    async fn process_lists_tiers_without_quality() -> googletest::Result<()> {
        let client = ApiClient::new(FakeTransport::new());
        with_detection(&client);
        let (mut poll, mut ad) = (InstantTicker::default(), InstantTicker::default());

        let mut out = Vec::new();
        let tickers = Tickers {
            poll: &mut poll,
            ad: &mut ad,
        };
        process(&client, &server(), tickers, TIKTOK, None, &mut out)
            .await
            .or_fail()?;

        let printed = output(out);
        expect_that!(printed, contains_substring("Tiktok detected (90% confidence)"));
        expect_that!(printed, contains_substring("[3s ad]"));
        expect_that!(printed, contains_substring("[👑 Premium]"));
        expect_that!(printed, ends_with("Pass --quality to start processing\n"));
        Ok(())
    }

    #[tokio::test]
    #[googletest::test]
    async fn process_watches_the_ad_then_polls() -> googletest::Result<()> {
        let client = ApiClient::new(FakeTransport::new());
        with_detection(&client);
        client
            .transport()
            .respond(
                request_ad::post::PATH,
                200,
                json!({"ad_session_id": "ad-1", "duration": 3, "premium_user": false}),
            )
            .respond(
                complete_ad::post::PATH,
                200,
                json!({"success": true, "quality_unlocked": "4K", "unlock_duration": 3600}),
            )
            .respond(process_video::post::PATH, 200, json!({"process_id": "job-1"}))
            .respond(
                &processing_status::get::path("job-1"),
                200,
                json!({"status": "enhancing", "progress": 40, "enhancement_step": "Upscaling"}),
            )
            .respond(
                &processing_status::get::path("job-1"),
                200,
                json!({"status": "completed", "progress": 100, "result": {"original_size": 1048576, "enhanced_size": 4194304, "filename": "dance_4k.mp4"}}),
            );
        let (mut poll, mut ad) = (InstantTicker::default(), InstantTicker::default());

        let mut out = Vec::new();
        let tickers = Tickers {
            poll: &mut poll,
            ad: &mut ad,
        };
        process(&client, &server(), tickers, TIKTOK, Some("4K"), &mut out)
            .await
            .or_fail()?;

        expect_that!(ad.ticks, eq(3));
        expect_that!(poll.ticks, eq(2));
        let printed = output(out);
        expect_that!(printed, contains_substring("4K unlocked for 60 minutes!"));
        expect_that!(printed, contains_substring("4x quality improvement"));
        expect_that!(printed, contains_substring("File: dance_4k.mp4"));
        expect_that!(
            printed,
            ends_with("Download: http://127.0.0.1:5000/api/download-result/job-1\n")
        );
        Ok(())
    }

    #[tokio::test]
    #[googletest::test]
    async fn premium_tier_prints_the_offer() -> googletest::Result<()> {
        let client = ApiClient::new(FakeTransport::new());
        with_detection(&client);
        let (mut poll, mut ad) = (InstantTicker::default(), InstantTicker::default());

        let mut out = Vec::new();
        let tickers = Tickers {
            poll: &mut poll,
            ad: &mut ad,
        };
        process(&client, &server(), tickers, TIKTOK, Some("8K"), &mut out)
            .await
            .or_fail()?;

        expect_that!(output(out), ends_with("8K requires premium access\n"));
        expect_that!(
            client.transport().paths(),
            elements_are![eq("/api/platform-detect"), eq("/api/analyze-smart")]
        );
        Ok(())
    }

    #[tokio::test]
    #[googletest::test]
    async fn failed_job_is_an_error() {
        let client = ApiClient::new(FakeTransport::new());
        with_detection(&client);
        client
            .transport()
            .respond(process_video::post::PATH, 200, json!({"process_id": "job-2"}))
            .respond(
                &processing_status::get::path("job-2"),
                200,
                json!({"status": "error", "error": "Source unavailable"}),
            );
        let (mut poll, mut ad) = (InstantTicker::default(), InstantTicker::default());

        let mut out = Vec::new();
        let tickers = Tickers {
            poll: &mut poll,
            ad: &mut ad,
        };
        let server = server();
        let result = process(&client, &server, tickers, TIKTOK, Some("480p"), &mut out).await;

        expect_that!(result.map_err(|e| e.to_string()), err(eq("Source unavailable")));
    }

    #[tokio::test]
    #[googletest::test]
    async fn status_reports_completion() -> googletest::Result<()> {
        let client = ApiClient::new(FakeTransport::new());
        client.transport().respond(
            &processing_status::get::path("job-3"),
            200,
            json!({"status": "completed", "progress": 100}),
        );

        let mut out = Vec::new();
        status(&client, &server(), "job-3", &mut out).await.or_fail()?;

        expect_that!(
            output(out),
            eq("job-3: completed (100%)\nDownload: http://127.0.0.1:5000/api/download-result/job-3\n")
        );
        Ok(())
    }
}
