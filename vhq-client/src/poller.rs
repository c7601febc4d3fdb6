//! Processing job poller.
//!
//! A job goes through `Idle → Submitting → Polling → {Completed, Failed}`. [`JobPhase`] holds the
//! state and its transitions, which are pure so that a session can replay them as actions, and
//! [`run_job`] drives one job against the server, emitting a [`JobEvent`] for every transition.

use vhq_api::api::process_video::post::PremiumOffer;
use vhq_api::api::processing_status::get::{JobResult, JobStatus, LiveMetrics, Response};

use crate::client::ProcessStart;
use crate::{ApiClient, CancelToken, Ticker, Transport};

/// Progress of a job being polled
#[derive(Debug, Clone, PartialEq)]
pub struct JobProgress {
    pub process_id: String,
    pub status: JobStatus,
    /// Percentage from 0 to 100
    pub progress: f64,
    pub step: Option<String>,
    /// Seconds until completion, as estimated by the server
    pub eta: Option<f64>,
    pub metrics: Option<LiveMetrics>,
    /// Number of status answers received so far
    pub polls: u32,
}

impl JobProgress {
    fn new(process_id: String) -> Self {
        Self {
            process_id,
            status: JobStatus::Queued,
            progress: 0.0,
            step: None,
            eta: None,
            metrics: None,
            polls: 0,
        }
    }

    fn update(&mut self, status: &Response) {
        self.status = status.status;
        self.progress = status.progress.clamp(0.0, 100.0);
        self.polls += 1;
        // The server only reports some fields in some stages. The last known value is kept.
        if let Some(step) = &status.enhancement_step {
            self.step = Some(step.clone());
        }
        if status.eta.is_some() {
            self.eta = status.eta;
        }
        if status.live_metrics.is_some() {
            self.metrics = status.live_metrics.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletedJob {
    pub process_id: String,
    pub result: JobResult,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum JobPhase {
    #[default]
    Idle,
    Submitting,
    Polling(JobProgress),
    Completed(CompletedJob),
    Failed(String),
}

/// Transitions of a [`JobPhase`]
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// A new job is being submitted
    Submit,
    /// The server accepted the job
    Started { process_id: String },
    /// The submission failed
    Rejected(String),
    /// The submission was turned down by a quality gate, the flow goes back to selection
    Gated,
    /// A status answer was received
    Status(Response),
    Reset,
}

impl JobPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }

    /// Whether a job is in flight, i.e. submitting or polling
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Submitting | Self::Polling(_))
    }

    pub fn process_id(&self) -> Option<&str> {
        match self {
            Self::Polling(progress) => Some(&progress.process_id),
            Self::Completed(job) => Some(&job.process_id),
            _ => None,
        }
    }

    /// Applies an event. Events that do not fit the current phase are ignored, and `false` is
    /// returned.
    pub fn apply(&mut self, event: JobEvent) -> bool {
        let next = match (&mut *self, event) {
            (_, JobEvent::Submit) => Self::Submitting,
            (_, JobEvent::Reset) => Self::Idle,
            (Self::Submitting, JobEvent::Started { process_id }) => {
                Self::Polling(JobProgress::new(process_id))
            }
            (Self::Submitting, JobEvent::Rejected(message)) => Self::Failed(message),
            (Self::Submitting, JobEvent::Gated) => Self::Idle,
            (Self::Polling(progress), JobEvent::Status(status)) => match status.status {
                JobStatus::Completed => Self::Completed(CompletedJob {
                    process_id: progress.process_id.clone(),
                    result: status.result.unwrap_or_default(),
                }),
                JobStatus::Error => Self::Failed(
                    status
                        .error
                        .unwrap_or_else(|| "Processing failed".to_string()),
                ),
                JobStatus::Queued | JobStatus::Running => {
                    progress.update(&status);
                    return true;
                }
            },
            _ => return false,
        };
        *self = next;
        true
    }
}

/// How a call to [`run_job`] ended
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed(CompletedJob),
    Failed(String),
    /// The server requires an ad before processing this quality
    AdRequired { seconds: Option<u64> },
    /// The server requires premium access for this quality
    PremiumRequired(PremiumOffer),
    /// The loop was superseded by a newer job or the page was left
    Cancelled,
}

/// Submits a job and polls its status until it reaches a terminal status or `token` is
/// cancelled.
///
/// The first status request is made one tick after the submission. A status request that fails
/// is logged and polling goes on; there is no bound on the number of polls. Once `token` is
/// cancelled no further request is made and no further event is emitted.
pub async fn run_job<T, K>(
    client: &ApiClient<T>,
    ticker: &mut K,
    token: &CancelToken,
    url: &str,
    quality: &str,
    mut emit: impl FnMut(JobEvent),
) -> PollOutcome
where
    T: Transport,
    K: Ticker + ?Sized,
{
    if token.is_cancelled() {
        return PollOutcome::Cancelled;
    }
    emit(JobEvent::Submit);

    let started = client.process_video(url, quality).await;
    if token.is_cancelled() {
        return PollOutcome::Cancelled;
    }

    let process_id = match started {
        Ok(ProcessStart::Started(response)) => response.process_id,
        Ok(ProcessStart::AdRequired { seconds }) => {
            log::info!("Processing {quality} requires an ad");
            emit(JobEvent::Gated);
            return PollOutcome::AdRequired { seconds };
        }
        Ok(ProcessStart::PremiumRequired(offer)) => {
            log::info!("Processing {quality} requires premium access");
            emit(JobEvent::Gated);
            return PollOutcome::PremiumRequired(offer);
        }
        Err(e) => {
            let message = e.to_string();
            emit(JobEvent::Rejected(message.clone()));
            return PollOutcome::Failed(message);
        }
    };

    log::info!("Polling processing job {process_id}");
    emit(JobEvent::Started {
        process_id: process_id.clone(),
    });

    loop {
        ticker.tick().await;
        if token.is_cancelled() {
            log::info!("Stopped polling job {process_id}");
            return PollOutcome::Cancelled;
        }

        let status = client.processing_status(&process_id).await;
        if token.is_cancelled() {
            log::info!("Stopped polling job {process_id}");
            return PollOutcome::Cancelled;
        }

        let status = match status {
            Ok(status) => status,
            Err(e) => {
                log::warn!("Failed to fetch processing status of {process_id}: {e}");
                continue;
            }
        };

        let terminal = status.status;
        let result = status.result.clone();
        let error = status.error.clone();
        emit(JobEvent::Status(status));

        match terminal {
            JobStatus::Completed => {
                log::info!("Job {process_id} completed");
                return PollOutcome::Completed(CompletedJob {
                    process_id,
                    result: result.unwrap_or_default(),
                });
            }
            JobStatus::Error => {
                let message = error.unwrap_or_else(|| "Processing failed".to_string());
                log::info!("Job {process_id} failed: {message}");
                return PollOutcome::Failed(message);
            }
            JobStatus::Queued | JobStatus::Running => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::TaskSlot;
    use crate::testing::{FakeTransport, InstantTicker};
    use async_trait::async_trait;
    use googletest::prelude::*;
    use serde_json::json;
    use vhq_api::api::{process_video, processing_status};

    const URL: &str = "https://youtu.be/dQw4w9WgXcQ";

    fn status_path(id: &str) -> String {
        processing_status::get::path(id)
    }

    fn started(transport: &FakeTransport, id: &str) {
        transport.respond(
            process_video::post::PATH,
            200,
            json!({"process_id": id, "status": "started", "estimated_time": 5}),
        );
    }

    /// Replays the emitted events on a phase, counting the transitions into terminal phases
    #[derive(Default)]
    struct Recorder {
        phase: JobPhase,
        events: Vec<JobEvent>,
        completed: usize,
        failed: usize,
    }

    impl Recorder {
        fn record(&mut self, event: JobEvent) {
            self.events.push(event.clone());
            let was_terminal = self.phase.is_terminal();
            self.phase.apply(event);
            if !was_terminal {
                match self.phase {
                    JobPhase::Completed(_) => self.completed += 1,
                    JobPhase::Failed(_) => self.failed += 1,
                    _ => {}
                }
            }
        }
    }

    #[tokio::test]
    #[googletest::test]
    async fn completed_status_stops_polling() -> googletest::Result<()> {
        let client = ApiClient::new(FakeTransport::new());
        started(client.transport(), "p-1");
        client
            .transport()
            .respond(&status_path("p-1"), 200, json!({"status": "downloading", "progress": 10}))
            .respond(
                &status_path("p-1"),
                200,
                json!({
                    "status": "enhancing",
                    "progress": 51.5,
                    "enhancement_step": "Applying AI upscaling algorithms...",
                    "eta": 7.5,
                    "live_metrics": {"neurons_active": "412K", "gpu_utilization": "91%", "frames_processed": 215}
                }),
            )
            .respond(
                &status_path("p-1"),
                200,
                json!({
                    "status": "completed",
                    "progress": 100,
                    "result": {"filename": "youtube_1a2b3c4d.mp4", "original_size": 1000, "enhanced_size": 2500}
                }),
            )
            // Must never be requested
            .respond(&status_path("p-1"), 200, json!({"status": "error", "error": "late"}));

        let mut ticker = InstantTicker::default();
        let token = CancelToken::new();
        let mut recorder = Recorder::default();

        let outcome = run_job(&client, &mut ticker, &token, URL, "480p", |e| recorder.record(e)).await;

        expect_that!(
            outcome,
            matches_pattern!(PollOutcome::Completed(matches_pattern!(CompletedJob {
                process_id: eq("p-1"),
                result: matches_pattern!(JobResult {
                    filename: some(eq("youtube_1a2b3c4d.mp4")),
                    enhanced_size: some(eq(&2500.0)),
                    ..
                }),
            })))
        );
        expect_that!(recorder.completed, eq(1));
        expect_that!(recorder.failed, eq(0));
        expect_that!(
            client.transport().paths(),
            elements_are![
                eq("/api/process-video"),
                eq("/api/processing-status/p-1"),
                eq("/api/processing-status/p-1"),
                eq("/api/processing-status/p-1"),
            ]
        );
        expect_that!(ticker.ticks, eq(3));
        expect_that!(recorder.phase, matches_pattern!(JobPhase::Completed(anything())));
        Ok(())
    }

    #[tokio::test]
    #[googletest::test]
    async fn error_status_fails_once_and_stops() {
        let client = ApiClient::new(FakeTransport::new());
        started(client.transport(), "p-2");
        client
            .transport()
            .respond(&status_path("p-2"), 200, json!({"status": "downloading", "progress": 10}))
            .respond(
                &status_path("p-2"),
                200,
                json!({"status": "error", "progress": 10, "error": "Platform vimeo not supported yet"}),
            );

        let mut ticker = InstantTicker::default();
        let token = CancelToken::new();
        let mut recorder = Recorder::default();

        let outcome = run_job(&client, &mut ticker, &token, URL, "480p", |e| recorder.record(e)).await;

        expect_that!(
            outcome,
            eq(&PollOutcome::Failed("Platform vimeo not supported yet".to_string()))
        );
        expect_that!(recorder.failed, eq(1));
        expect_that!(recorder.completed, eq(0));
        expect_that!(client.transport().paths().len(), eq(3));
        expect_that!(
            recorder.phase,
            eq(&JobPhase::Failed("Platform vimeo not supported yet".to_string()))
        );
    }

    #[tokio::test]
    #[googletest::test]
    async fn failed_status_requests_keep_polling() {
        let client = ApiClient::new(FakeTransport::new());
        started(client.transport(), "p-3");
        client
            .transport()
            .fail(&status_path("p-3"), "connection reset")
            .respond(&status_path("p-3"), 404, json!({"error": "Process not found"}))
            .respond(&status_path("p-3"), 200, json!({"status": "completed", "progress": 100}));

        let mut ticker = InstantTicker::default();
        let token = CancelToken::new();
        let outcome = run_job(&client, &mut ticker, &token, URL, "480p", |_| {}).await;

        expect_that!(outcome, matches_pattern!(PollOutcome::Completed(anything())));
        expect_that!(ticker.ticks, eq(3));
    }

    #[tokio::test]
    #[googletest::test]
    async fn submission_failures_and_gates() {
        let client = ApiClient::new(FakeTransport::new());
        client
            .transport()
            .respond(process_video::post::PATH, 400, json!({"error": "URL is required"}))
            .respond(
                process_video::post::PATH,
                402,
                json!({"error": "Ad viewing required", "ad_required": true, "ad_duration": 30}),
            );

        let mut ticker = InstantTicker::default();
        let token = CancelToken::new();

        let mut recorder = Recorder::default();
        let outcome = run_job(&client, &mut ticker, &token, URL, "480p", |e| recorder.record(e)).await;
        expect_that!(outcome, eq(&PollOutcome::Failed("URL is required".to_string())));
        expect_that!(recorder.phase, eq(&JobPhase::Failed("URL is required".to_string())));

        let mut recorder = Recorder::default();
        let outcome = run_job(&client, &mut ticker, &token, URL, "4K", |e| recorder.record(e)).await;
        expect_that!(outcome, eq(&PollOutcome::AdRequired { seconds: Some(30) }));
        expect_that!(recorder.phase, eq(&JobPhase::Idle));
        expect_that!(ticker.ticks, eq(0));
    }

    /// Ticker that starts a new job through the slot on a given tick, the way a user clicking
    /// again would.
    struct RestartingTicker {
        slot: Rc<RefCell<TaskSlot>>,
        restart_on: usize,
        ticks: usize,
        restarted: Option<CancelToken>,
    }

    #[async_trait(?Send)]
    impl Ticker for RestartingTicker {
        async fn tick(&mut self) {
            self.ticks += 1;
            if self.ticks == self.restart_on {
                self.restarted = Some(self.slot.borrow_mut().start());
            }
        }
    }

    #[tokio::test]
    #[googletest::test]
    async fn starting_a_new_job_cancels_the_running_poller() -> googletest::Result<()> {
        let client = ApiClient::new(FakeTransport::new());
        started(client.transport(), "first");
        started(client.transport(), "second");
        client
            .transport()
            .respond(&status_path("first"), 200, json!({"status": "downloading", "progress": 10}))
            .respond(&status_path("first"), 200, json!({"status": "enhancing", "progress": 40}))
            .respond(&status_path("second"), 200, json!({"status": "completed", "progress": 100}));

        let slot = Rc::new(RefCell::new(TaskSlot::default()));
        let first_token = slot.borrow_mut().start();
        let mut ticker = RestartingTicker {
            slot: Rc::clone(&slot),
            restart_on: 2,
            ticks: 0,
            restarted: None,
        };

        let mut first_events = vec![];
        let outcome = run_job(&client, &mut ticker, &first_token, URL, "480p", |e| {
            first_events.push(e)
        })
        .await;
        expect_that!(outcome, eq(&PollOutcome::Cancelled));
        expect_that!(first_token.is_cancelled(), eq(true));

        let second_token = ticker.restarted.take().or_fail()?;
        let mut second_ticker = InstantTicker::default();
        let outcome = run_job(&client, &mut second_ticker, &second_token, URL, "480p", |_| {}).await;
        expect_that!(outcome, matches_pattern!(PollOutcome::Completed(anything())));

        // The first poller issued one status request before the restart and none after it
        expect_that!(
            client.transport().paths(),
            elements_are![
                eq("/api/process-video"),
                eq("/api/processing-status/first"),
                eq("/api/process-video"),
                eq("/api/processing-status/second"),
            ]
        );
        expect_that!(matches!(first_events.last(), Some(JobEvent::Status(_))), eq(true));
        Ok(())
    }

    #[googletest::test]
    fn phase_ignores_out_of_order_events() {
        let mut phase = JobPhase::Idle;
        expect_that!(
            phase.apply(JobEvent::Started {
                process_id: "p".to_string()
            }),
            eq(false)
        );
        expect_that!(phase, eq(&JobPhase::Idle));

        phase.apply(JobEvent::Submit);
        phase.apply(JobEvent::Started {
            process_id: "p".to_string(),
        });
        let status: processing_status::get::Response =
            serde_json::from_value(json!({"status": "completed", "progress": 100})).unwrap();
        expect_that!(phase.apply(JobEvent::Status(status.clone())), eq(true));
        expect_that!(phase.apply(JobEvent::Status(status)), eq(false));
        expect_that!(phase.process_id(), some(eq("p")));
    }

    #[googletest::test]
    fn progress_keeps_last_known_step() {
        let mut phase = JobPhase::Submitting;
        phase.apply(JobEvent::Started {
            process_id: "p".to_string(),
        });
        for body in [
            json!({"status": "enhancing", "progress": 44, "enhancement_step": "Analyzing video content...", "eta": 12}),
            json!({"status": "enhancing", "progress": 130}),
        ] {
            phase.apply(JobEvent::Status(serde_json::from_value(body).unwrap()));
        }

        expect_that!(
            phase,
            matches_pattern!(JobPhase::Polling(matches_pattern!(JobProgress {
                status: eq(&JobStatus::Running),
                progress: eq(&100.0),
                step: some(eq("Analyzing video content...")),
                eta: some(eq(&12.0)),
                polls: eq(&2),
                ..
            })))
        );
    }
}
