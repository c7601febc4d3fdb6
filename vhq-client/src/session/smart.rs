//! Smart-Detect controller: URL → platform detection → smart analysis → quality selection →
//! gate → processing job → results.

use vhq_api::api::{analyze_smart, platform_detect, process_video::post::PremiumOffer};

use crate::gate::{self, AdSession, AdStart, GateAction, Unlocked};
use crate::platform::{KnownPlatform, Platform, url_hint};
use crate::poller::{JobEvent, JobPhase, PollOutcome, run_job};
use crate::quality::{QualityOption, quality_options};
use crate::toast::{ToastKind, Toasts};
use crate::validate::validate_url;
use crate::{ApiClient, CancelToken, Error, Ticker, Transport};

/// Result of a platform detection, with the tiers it offers
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub platform: Platform,
    /// Platform key as sent by the server
    pub platform_key: String,
    /// Detection confidence, from 0 to 1
    pub confidence: f64,
    pub icon: String,
    pub options: Vec<QualityOption>,
}

impl Detection {
    fn new(response: platform_detect::post::Response) -> Self {
        Self {
            platform: Platform::from_key(&response.platform),
            options: quality_options(&response),
            platform_key: response.platform,
            confidence: response.confidence,
            icon: response.icon,
        }
    }

    pub fn option(&self, quality: &str) -> Option<&QualityOption> {
        self.options.iter().find(|o| o.quality == quality)
    }

    /// Header of the detection panel, e.g. `Youtube detected`
    pub fn headline(&self) -> String {
        let mut chars = self.platform_key.chars();
        let name: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => "Video".to_string(),
        };
        format!("{name} detected")
    }

    pub fn confidence_percent(&self) -> u32 {
        (self.confidence * 100.0).round().clamp(0.0, 100.0) as u32
    }
}

/// The ad modal. `session` is unset while the ad is being requested.
#[derive(Debug, Clone, PartialEq)]
pub struct AdOverlay {
    pub quality: String,
    pub session: Option<AdSession>,
    /// The completion request is in flight
    pub completing: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SmartSession {
    /// Current contents of the URL input
    pub input: String,
    /// Platform guessed from the input while typing
    pub hint: Option<KnownPlatform>,
    /// URL of the last detection, used to submit jobs
    pub url: String,
    pub detecting: bool,
    pub detection: Option<Detection>,
    pub analysis: Option<analyze_smart::post::Response>,
    pub selected: Option<String>,
    pub ad: Option<AdOverlay>,
    pub paywall: Option<PremiumOffer>,
    pub job: JobPhase,
    /// Blocking failure of detection or analysis
    pub error: Option<String>,
    pub toasts: Toasts,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SmartAction {
    Input(String),
    DetectStarted { url: String },
    /// Answers of a detection are tagged with its URL. Answers for a URL other than the one of
    /// the latest detection are dropped.
    Detected {
        url: String,
        response: platform_detect::post::Response,
    },
    Analyzed {
        url: String,
        analysis: analyze_smart::post::Response,
    },
    /// A blocking failure of the detection or analysis of `url`
    DetectFailed { url: String, message: String },
    /// A blocking failure, e.g. an invalid URL
    Failed(String),
    SelectQuality(String),
    AdRequested { quality: String },
    AdStarted(AdSession),
    AdTick,
    AdCompleting,
    AdUnlocked(Unlocked),
    AdRejected(String),
    /// The ad could not be loaded: the modal closes with a notification
    AdFailed(String),
    CloseAd,
    ShowPaywall(PremiumOffer),
    ClosePaywall,
    Job(JobEvent),
    DownloadTriggered,
    Toast(ToastKind, String),
    DismissToast(u64),
}

impl SmartSession {
    /// Selected tier, if it is one of the detected tiers
    pub fn selected_option(&self) -> Option<&QualityOption> {
        let quality = self.selected.as_deref()?;
        self.detection.as_ref()?.option(quality)
    }

    /// Decides how the processing of the selected tier starts.
    pub fn next_step(&self) -> Result<GateAction, Error> {
        self.selected_option()
            .map(|option| gate::resolve(option.gating))
            .ok_or_else(|| Error::Validation("Please select a quality first".to_string()))
    }

    pub fn apply(&mut self, action: SmartAction) {
        match action {
            SmartAction::Input(input) => {
                let trimmed = input.trim();
                if trimmed.chars().count() > 10 {
                    self.hint = url_hint(trimmed);
                } else {
                    self.hint = None;
                    if !self.job.is_active() {
                        self.detection = None;
                        self.analysis = None;
                        self.selected = None;
                    }
                }
                self.input = input;
            }
            SmartAction::DetectStarted { url } => {
                self.url = url;
                self.detecting = true;
                self.error = None;
                self.detection = None;
                self.analysis = None;
                self.selected = None;
                if !self.job.is_active() {
                    self.job = JobPhase::Idle;
                }
            }
            SmartAction::Detected { url, response } => {
                if url == self.url {
                    self.detection = Some(Detection::new(response));
                }
            }
            SmartAction::Analyzed { url, analysis } => {
                if url == self.url {
                    self.detecting = false;
                    self.analysis = Some(analysis);
                }
            }
            SmartAction::DetectFailed { url, message } => {
                if url == self.url {
                    self.detecting = false;
                    self.error = Some(message);
                }
            }
            SmartAction::Failed(message) => {
                self.detecting = false;
                self.error = Some(message);
            }
            SmartAction::SelectQuality(quality) => {
                if self
                    .detection
                    .as_ref()
                    .is_some_and(|d| d.option(&quality).is_some())
                {
                    self.selected = Some(quality);
                }
            }
            SmartAction::AdRequested { quality } => {
                self.ad = Some(AdOverlay {
                    quality,
                    session: None,
                    completing: false,
                });
            }
            SmartAction::AdStarted(session) => {
                if let Some(ad) = &mut self.ad {
                    ad.session = Some(session);
                }
            }
            SmartAction::AdTick => {
                if let Some(session) = self.ad.as_mut().and_then(|ad| ad.session.as_mut()) {
                    session.tick();
                }
            }
            SmartAction::AdCompleting => {
                if let Some(ad) = &mut self.ad {
                    ad.completing = true;
                }
            }
            SmartAction::AdUnlocked(unlocked) => {
                self.ad = None;
                self.toasts.push(ToastKind::Success, unlocked.notice());
            }
            SmartAction::AdRejected(message) => {
                if let Some(ad) = &mut self.ad {
                    ad.completing = false;
                }
                self.toasts.push(ToastKind::Error, message);
            }
            SmartAction::AdFailed(message) => {
                self.ad = None;
                self.toasts.push(ToastKind::Error, message);
            }
            SmartAction::CloseAd => self.ad = None,
            SmartAction::ShowPaywall(offer) => self.paywall = Some(offer),
            SmartAction::ClosePaywall => self.paywall = None,
            SmartAction::Job(event) => {
                if matches!(event, JobEvent::Submit) {
                    self.error = None;
                }
                self.job.apply(event);
            }
            SmartAction::DownloadTriggered => {
                self.toasts.push(ToastKind::Success, "Download started!");
            }
            SmartAction::Toast(kind, message) => {
                self.toasts.push(kind, message);
            }
            SmartAction::DismissToast(id) => self.toasts.dismiss(id),
        }
    }
}

/// Validates `input`, detects its platform, then analyzes the video.
pub async fn detect<T: Transport>(
    client: &ApiClient<T>,
    input: &str,
    mut emit: impl FnMut(SmartAction),
) {
    let url = match validate_url(input) {
        Ok(url) => url,
        Err(e) => {
            emit(SmartAction::Failed(e.to_string()));
            return;
        }
    };

    emit(SmartAction::DetectStarted { url: url.clone() });
    let detection = match client.platform_detect(&url).await {
        Ok(detection) => detection,
        Err(e) => {
            emit(SmartAction::DetectFailed {
                url,
                message: e.to_string(),
            });
            return;
        }
    };
    log::info!(
        "Detected {} for {url} with confidence {}",
        detection.platform,
        detection.confidence
    );
    emit(SmartAction::Detected {
        url: url.clone(),
        response: detection,
    });

    match client.analyze_smart(&url).await {
        Ok(analysis) => emit(SmartAction::Analyzed { url, analysis }),
        Err(e) => emit(SmartAction::DetectFailed {
            url,
            message: e.to_string(),
        }),
    }
}

/// How an ad flow ended
#[derive(Debug, Clone, PartialEq)]
pub enum AdFlow {
    /// No ad is needed after all: processing can start
    Proceed,
    /// The countdown reached zero, the ad can be completed with this session
    Watched(AdSession),
    Failed,
    /// The modal was closed or a newer ad replaced this one
    Cancelled,
}

/// Opens the ad modal of `quality`, requests the ad and counts it down.
pub async fn open_ad<T, K>(
    client: &ApiClient<T>,
    ticker: &mut K,
    token: &CancelToken,
    quality: &str,
    mut emit: impl FnMut(SmartAction),
) -> AdFlow
where
    T: Transport,
    K: Ticker + ?Sized,
{
    emit(SmartAction::AdRequested {
        quality: quality.to_string(),
    });

    let start = gate::request_ad(client, quality).await;
    if token.is_cancelled() {
        return AdFlow::Cancelled;
    }

    let session = match start {
        Ok(AdStart::PremiumUser | AdStart::NotRequired) => {
            emit(SmartAction::CloseAd);
            return AdFlow::Proceed;
        }
        Ok(AdStart::Countdown(session)) => session,
        Err(e) => {
            emit(SmartAction::AdFailed(e.to_string()));
            return AdFlow::Failed;
        }
    };

    emit(SmartAction::AdStarted(session.clone()));
    let mut watched = session;
    let finished = gate::run_countdown(ticker, token, watched.duration, || {
        watched.tick();
        emit(SmartAction::AdTick);
    })
    .await;

    if finished {
        AdFlow::Watched(watched)
    } else {
        AdFlow::Cancelled
    }
}

/// Confirms a watched ad. Returns whether processing can start, which is never the case once
/// `token` is cancelled, e.g. because the modal was closed while the confirmation was in flight.
pub async fn finish_ad<T: Transport>(
    client: &ApiClient<T>,
    token: &CancelToken,
    session: &AdSession,
    mut emit: impl FnMut(SmartAction),
) -> bool {
    if token.is_cancelled() {
        return false;
    }
    emit(SmartAction::AdCompleting);
    let completed = gate::complete_ad(client, session).await;
    if token.is_cancelled() {
        log::info!("Ad of {} closed during its completion", session.quality);
        return false;
    }
    match completed {
        Ok(unlocked) => {
            log::info!("{} unlocked", unlocked.quality);
            emit(SmartAction::AdUnlocked(unlocked));
            true
        }
        Err(e) => {
            emit(SmartAction::AdRejected(e.to_string()));
            false
        }
    }
}

/// Submits and polls the processing job of `quality`. A premium answer opens the paywall; an ad
/// answer is returned for the caller to open the ad of the tier.
pub async fn process<T, K>(
    client: &ApiClient<T>,
    ticker: &mut K,
    token: &CancelToken,
    url: &str,
    quality: &str,
    mut emit: impl FnMut(SmartAction),
) -> PollOutcome
where
    T: Transport,
    K: Ticker + ?Sized,
{
    let outcome = run_job(client, ticker, token, url, quality, |event| {
        emit(SmartAction::Job(event))
    })
    .await;

    if let PollOutcome::PremiumRequired(offer) = &outcome {
        emit(SmartAction::ShowPaywall(offer.clone()));
    }
    outcome
}
