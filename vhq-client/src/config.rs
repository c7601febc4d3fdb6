use std::time::Duration;

fn default_poll_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_ad_tick() -> Duration {
    Duration::from_secs(1)
}

fn default_toast_lifetime() -> Duration {
    Duration::from_secs(3)
}

fn default_progress_tick() -> Duration {
    Duration::from_millis(500)
}

/// Timing settings shared by every front-end.
#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Interval between two requests to `processing-status`.
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Length of one second of the ad countdown. Only shortened in development setups.
    #[serde(default = "default_ad_tick", with = "humantime_serde")]
    pub ad_tick: Duration,

    /// How long a notification stays on screen.
    #[serde(default = "default_toast_lifetime", with = "humantime_serde")]
    pub toast_lifetime: Duration,

    /// Interval of the simulated progress shown while a direct download is prepared.
    #[serde(default = "default_progress_tick", with = "humantime_serde")]
    pub progress_tick: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            ad_tick: default_ad_tick(),
            toast_lifetime: default_toast_lifetime(),
            progress_tick: default_progress_tick(),
        }
    }
}
