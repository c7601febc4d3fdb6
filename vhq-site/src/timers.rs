use std::time::Duration;

use async_trait::async_trait;
use vhq_client::Ticker;

/// Ticker backed by a browser timer
pub struct SleepTicker {
    interval: Duration,
}

impl SleepTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

#[async_trait(?Send)]
impl Ticker for SleepTicker {
    async fn tick(&mut self) {
        gloo_timers::future::sleep(self.interval).await;
    }
}
