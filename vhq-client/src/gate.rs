//! Quality gates: free tiers start right away, ad tiers require watching a timed ad, premium tiers
//! show an upsell.

use vhq_api::api::platform_detect::post::QualityConfig;

use crate::{ApiClient, CancelToken, Error, Ticker, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gating {
    Free,
    Ad { seconds: u64 },
    Premium,
}

impl From<&QualityConfig> for Gating {
    fn from(config: &QualityConfig) -> Self {
        if config.premium {
            Self::Premium
        } else if config.ad_required > 0 {
            Self::Ad {
                seconds: config.ad_required,
            }
        } else {
            Self::Free
        }
    }
}

/// Next step of the flow once a quality is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    StartJob,
    OpenAd { seconds: u64 },
    ShowPaywall,
}

pub fn resolve(gating: Gating) -> GateAction {
    match gating {
        Gating::Free => GateAction::StartJob,
        Gating::Ad { seconds } => GateAction::OpenAd { seconds },
        Gating::Premium => GateAction::ShowPaywall,
    }
}

/// An ad being watched. Lives from the ad request until completion or dismissal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdSession {
    pub session_id: String,
    pub quality: String,
    /// Seconds to watch, as last reported by the server
    pub duration: u64,
    remaining: u64,
}

impl AdSession {
    pub fn new(session_id: String, quality: String, duration: u64) -> Self {
        Self {
            session_id,
            quality,
            duration,
            remaining: duration,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn elapsed(&self) -> u64 {
        self.duration - self.remaining
    }

    /// Counts one second down. Returns whether the ad can now be completed.
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.can_complete()
    }

    pub fn can_complete(&self) -> bool {
        self.remaining == 0
    }
}

/// How the ad flow of a quality begins
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdStart {
    /// The caller has premium access: no ad, proceed
    PremiumUser,
    /// The server reports that this quality needs no ad: proceed
    NotRequired,
    Countdown(AdSession),
}

/// Requests the ad of a quality. Failures are reported as [`Error::Gate`].
pub async fn request_ad<T: Transport>(
    client: &ApiClient<T>,
    quality: &str,
) -> Result<AdStart, Error> {
    let response = client
        .request_ad(quality)
        .await
        .map_err(|e| Error::Gate(e.to_string()))?;

    if response.premium_user {
        log::info!("Premium user, skipping the ad of {quality}");
        return Ok(AdStart::PremiumUser);
    }

    match (response.ad_session_id, response.duration) {
        (Some(session_id), Some(duration)) if duration > 0 => Ok(AdStart::Countdown(
            AdSession::new(session_id, quality.to_string(), duration),
        )),
        _ if response.ad_required == Some(false) || response.duration == Some(0) => {
            Ok(AdStart::NotRequired)
        }
        _ => {
            log::error!("Ad response for {quality} has no session");
            Err(Error::Gate("Failed to load ad".to_string()))
        }
    }
}

/// Runs the countdown of an ad, calling `on_tick` once per elapsed second.
///
/// Returns `true` when the countdown reached zero, `false` when it was cancelled first.
pub async fn run_countdown<K: Ticker + ?Sized>(
    ticker: &mut K,
    token: &CancelToken,
    seconds: u64,
    mut on_tick: impl FnMut(),
) -> bool {
    for _ in 0..seconds {
        ticker.tick().await;
        if token.is_cancelled() {
            return false;
        }
        on_tick();
    }
    !token.is_cancelled()
}

/// Reward granted by a completed ad
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unlocked {
    pub quality: String,
    /// Seconds during which the quality stays unlocked
    pub unlock_duration: u64,
}

impl Unlocked {
    pub fn notice(&self) -> String {
        let minutes = (self.unlock_duration as f64 / 60.0).round();
        format!("{} unlocked for {minutes} minutes!", self.quality)
    }
}

/// Confirms a watched ad. The watch duration sent is the latest duration the server asked for.
pub async fn complete_ad<T: Transport>(
    client: &ApiClient<T>,
    session: &AdSession,
) -> Result<Unlocked, Error> {
    if !session.can_complete() {
        return Err(Error::Gate(format!(
            "Please watch the ad for {} more seconds",
            session.remaining()
        )));
    }

    let response = client
        .complete_ad(&session.session_id, session.duration)
        .await
        .map_err(|e| Error::Gate(e.to_string()))?;

    if !response.success {
        return Err(Error::Gate(
            response
                .message
                .unwrap_or_else(|| "Failed to complete ad viewing".to_string()),
        ));
    }

    Ok(Unlocked {
        quality: response
            .quality_unlocked
            .unwrap_or_else(|| session.quality.clone()),
        unlock_duration: response.unlock_duration.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeTransport, InstantTicker};
    use googletest::prelude::*;
    use serde_json::json;
    use vhq_api::api::{complete_ad, request_ad};

    #[googletest::test]
    fn gating_resolution() {
        expect_that!(resolve(Gating::Free), eq(GateAction::StartJob));
        expect_that!(
            resolve(Gating::Ad { seconds: 30 }),
            eq(GateAction::OpenAd { seconds: 30 })
        );
        expect_that!(resolve(Gating::Premium), eq(GateAction::ShowPaywall));

        let premium_with_ad = QualityConfig {
            ad_required: 10,
            premium: true,
            ..Default::default()
        };
        expect_that!(Gating::from(&premium_with_ad), eq(Gating::Premium));
    }

    #[googletest::test]
    fn completion_is_enabled_after_exactly_the_requested_ticks() {
        let mut session = AdSession::new("ad-1".to_string(), "1080p".to_string(), 10);
        for _ in 0..9 {
            expect_that!(session.tick(), eq(false));
        }
        expect_that!(session.can_complete(), eq(false));
        expect_that!(session.remaining(), eq(1));

        expect_that!(session.tick(), eq(true));
        expect_that!(session.elapsed(), eq(10));
        // Further ticks keep it at zero
        expect_that!(session.tick(), eq(true));
        expect_that!(session.remaining(), eq(0));
    }

    #[tokio::test]
    #[googletest::test]
    async fn premium_users_skip_the_countdown() -> googletest::Result<()> {
        let client = ApiClient::new(FakeTransport::new());
        client.transport().respond(
            request_ad::post::PATH,
            200,
            json!({"premium_user": true, "ad_required": false}),
        );

        expect_that!(
            request_ad(&client, "4K").await.or_fail()?,
            eq(&AdStart::PremiumUser)
        );
        Ok(())
    }

    #[tokio::test]
    #[googletest::test]
    async fn ad_request_opens_a_session() -> googletest::Result<()> {
        let client = ApiClient::new(FakeTransport::new());
        client
            .transport()
            .respond(
                request_ad::post::PATH,
                200,
                json!({"ad_session_id": "ad-7", "duration": 15, "ad_type": "rewarded_video"}),
            )
            .respond(request_ad::post::PATH, 200, json!({"ad_required": false}))
            .respond(request_ad::post::PATH, 500, json!({"error": "Ad request failed"}));

        expect_that!(
            request_ad(&client, "1080p").await.or_fail()?,
            eq(&AdStart::Countdown(AdSession::new(
                "ad-7".to_string(),
                "1080p".to_string(),
                15
            )))
        );
        expect_that!(
            request_ad(&client, "480p").await.or_fail()?,
            eq(&AdStart::NotRequired)
        );
        expect_that!(
            request_ad(&client, "1080p").await,
            err(eq(&Error::Gate("Ad request failed".to_string())))
        );
        Ok(())
    }

    #[tokio::test]
    #[googletest::test]
    async fn countdown_ticks_once_per_second_and_stops_on_cancel() {
        let mut ticker = InstantTicker::default();
        let token = CancelToken::new();
        let mut session = AdSession::new("ad-1".to_string(), "1080p".to_string(), 10);

        let finished = run_countdown(&mut ticker, &token, session.duration, || {
            session.tick();
        })
        .await;
        expect_that!(finished, eq(true));
        expect_that!(ticker.ticks, eq(10));
        expect_that!(session.can_complete(), eq(true));

        token.cancel();
        let mut ticks = 0;
        let finished = run_countdown(&mut ticker, &token, 10, || ticks += 1).await;
        expect_that!(finished, eq(false));
        expect_that!(ticks, eq(0));
    }

    #[tokio::test]
    #[googletest::test]
    async fn completion_requires_the_full_countdown() -> googletest::Result<()> {
        let client = ApiClient::new(FakeTransport::new());
        client.transport().respond(
            complete_ad::post::PATH,
            200,
            json!({
                "success": true,
                "quality_unlocked": "1080p",
                "unlock_duration": 3600,
                "message": "1080p quality unlocked for 1 hour!"
            }),
        );

        let mut session = AdSession::new("ad-1".to_string(), "1080p".to_string(), 2);
        expect_that!(
            complete_ad(&client, &session).await,
            err(matches_pattern!(Error::Gate(anything())))
        );
        expect_that!(client.transport().requests(), is_empty());

        session.tick();
        session.tick();
        let unlocked = complete_ad(&client, &session).await.or_fail()?;
        expect_that!(unlocked.notice(), eq("1080p unlocked for 60 minutes!"));
        expect_that!(
            client.transport().requests()[0].body,
            some(eq(&json!({"ad_session_id": "ad-1", "watch_duration": 2})))
        );
        Ok(())
    }

    #[tokio::test]
    #[googletest::test]
    async fn rejected_completion_surfaces_the_server_message() {
        let client = ApiClient::new(FakeTransport::new());
        client.transport().respond(
            complete_ad::post::PATH,
            400,
            json!({"success": false, "message": "Please watch at least 12s of the ad"}),
        );
        let mut session = AdSession::new("ad-1".to_string(), "1080p".to_string(), 1);
        session.tick();

        expect_that!(
            complete_ad(&client, &session).await,
            err(eq(&Error::Gate(
                "Please watch at least 12s of the ad".to_string()
            )))
        );
    }
}
