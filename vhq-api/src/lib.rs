//! The `vhq-api` crate defines the data types exchanged with the VideoHQ server by `vhq-site` and
//! `vhq-cli`.
//!
//! The crate follows these conventions:
//! - Each API endpoint of the server defines a full namespace path.
//! - For each endpoint namespace, `vhq-api` defines a nested namespace with the API method of the
//!   endpoint.
//! - Inside the namespace for a given API endpoint, the following items are defined:
//!   - `PATH`, the path of the endpoint relative to the server root.
//!   - If the request method is `POST`, a `Request` type defines the JSON body.
//!   - If the endpoint returns a JSON body, a `Response` type defines its contents.
//!   - Any additional types required to define either the request or the response.
//!
//! Every non-successful response carries an [`ErrorBody`](api::ErrorBody).
//!
//! The supported endpoints are:
//!  - `POST` `api/analyze`. Returns the metadata and formats of a video.
//!  - `POST` `api/download`. Downloads a video on the server and returns a link to the file.
//!  - `POST` `api/transcript`. Returns the captions of a video.
//!  - `POST` `api/platform-detect`. Detects the hosting platform and the quality tiers on offer.
//!  - `POST` `api/analyze-smart`. Returns the metadata and enhancement potential of a video.
//!  - `POST` `api/request-ad`. Opens an ad session that unlocks a quality tier.
//!  - `POST` `api/complete-ad`. Confirms that an ad was watched.
//!  - `POST` `api/process-video`. Starts an asynchronous processing job.
//!  - `GET` `api/processing-status/{id}`. Returns the status of a processing job.
//!  - `GET` `api/download-result/{id}`. Obtains the output file of a completed job.

mod types;

pub mod api {
    pub use crate::types::ErrorBody;

    pub mod analyze {
        pub mod post {
            pub use crate::types::Format;

            pub const PATH: &str = "/api/analyze";

            #[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
            pub struct Request {
                pub url: String,
            }

            /// The response to the `POST` `api/analyze` request
            #[derive(Default, Debug, serde::Deserialize, serde::Serialize, PartialEq, Clone)]
            pub struct Response {
                /// Platform key, e.g. `youtube`
                #[serde(default)]
                pub platform: String,
                #[serde(default)]
                pub title: Option<String>,
                /// Length of the video in seconds, when known
                #[serde(default)]
                pub duration: Option<f64>,
                #[serde(default)]
                pub thumbnail: Option<String>,
                #[serde(default)]
                pub formats: Vec<Format>,
                #[serde(default)]
                pub transcript_available: bool,
                /// Notice about degraded metadata
                #[serde(default)]
                pub warning: Option<String>,
                /// Target of a resolved short link
                #[serde(default)]
                pub resolved_url: Option<String>,
            }
        }
    }

    pub mod download {
        pub mod post {
            pub use crate::types::OutputFormat;

            pub const PATH: &str = "/api/download";

            #[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
            pub struct Request {
                pub url: String,
                pub quality: String,
                pub format: OutputFormat,
            }

            /// The response to the `POST` `api/download` request
            #[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
            pub struct Response {
                pub download_url: String,
                pub filename: String,
                #[serde(default)]
                pub filesize: Option<u64>,
            }
        }
    }

    pub mod transcript {
        pub mod post {
            pub use crate::types::TranscriptEntry;

            pub const PATH: &str = "/api/transcript";

            #[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
            pub struct Request {
                pub url: String,
            }

            /// The response to the `POST` `api/transcript` request
            #[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq, Clone)]
            pub struct Response {
                pub transcript: Vec<TranscriptEntry>,
            }
        }
    }

    pub mod platform_detect {
        pub mod post {
            use std::collections::HashMap;

            pub use crate::types::QualityConfig;

            pub const PATH: &str = "/api/platform-detect";

            #[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
            pub struct Request {
                pub url: String,
            }

            /// The response to the `POST` `api/platform-detect` request
            #[derive(Default, Debug, serde::Deserialize, serde::Serialize, PartialEq, Clone)]
            pub struct Response {
                pub platform: String,
                /// Detection confidence, from 0 to 1
                #[serde(default)]
                pub confidence: f64,
                #[serde(default)]
                pub icon: String,
                #[serde(default)]
                pub quality_configs: HashMap<String, QualityConfig>,
                /// Quality keys to offer, in display order
                #[serde(default)]
                pub recommended_qualities: Vec<String>,
            }
        }
    }

    pub mod analyze_smart {
        pub mod post {
            pub use crate::types::AiEnhancements;

            pub const PATH: &str = "/api/analyze-smart";

            #[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
            pub struct Request {
                pub url: String,
            }

            /// The response to the `POST` `api/analyze-smart` request
            #[derive(Default, Debug, serde::Deserialize, serde::Serialize, PartialEq, Clone)]
            pub struct Response {
                #[serde(default)]
                pub title: Option<String>,
                #[serde(default)]
                pub duration: Option<f64>,
                #[serde(default)]
                pub enhancement_potential: Option<String>,
                #[serde(default)]
                pub ai_enhancements: Option<AiEnhancements>,
            }
        }
    }

    pub mod request_ad {
        pub mod post {
            pub const PATH: &str = "/api/request-ad";

            #[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
            pub struct Request {
                pub quality: String,
            }

            /// The response to the `POST` `api/request-ad` request
            #[derive(Default, Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
            pub struct Response {
                /// Seconds of ad to watch
                #[serde(default)]
                pub duration: Option<u64>,
                #[serde(default)]
                pub ad_session_id: Option<String>,
                /// The caller already has premium access and can skip the ad
                #[serde(default)]
                pub premium_user: bool,
                /// Set to `false` when the tier does not need an ad at all
                #[serde(default)]
                pub ad_required: Option<bool>,
            }
        }
    }

    pub mod complete_ad {
        pub mod post {
            pub const PATH: &str = "/api/complete-ad";

            #[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
            pub struct Request {
                pub ad_session_id: String,
                /// Seconds of ad watched
                pub watch_duration: u64,
            }

            /// The response to the `POST` `api/complete-ad` request
            #[derive(Default, Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
            pub struct Response {
                #[serde(default)]
                pub success: bool,
                #[serde(default)]
                pub quality_unlocked: Option<String>,
                /// Seconds during which the unlocked tier stays available
                #[serde(default)]
                pub unlock_duration: Option<u64>,
                #[serde(default)]
                pub message: Option<String>,
            }
        }
    }

    pub mod process_video {
        pub mod post {
            pub use crate::types::PremiumOffer;

            pub const PATH: &str = "/api/process-video";

            #[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
            pub struct Request {
                pub url: String,
                pub quality: String,
            }

            /// The response to a successful `POST` `api/process-video` request
            #[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq, Clone)]
            pub struct Response {
                pub process_id: String,
                #[serde(default)]
                pub estimated_time: Option<f64>,
                #[serde(default)]
                pub message: Option<String>,
            }

            /// The body of a `402` or `403` answer to `POST` `api/process-video`
            #[derive(Default, Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
            pub struct Rejection {
                #[serde(default)]
                pub error: Option<String>,
                #[serde(default)]
                pub premium_offer: Option<PremiumOffer>,
                #[serde(default)]
                pub ad_required: bool,
                #[serde(default)]
                pub ad_duration: Option<u64>,
            }
        }
    }

    pub mod processing_status {
        pub mod get {
            pub use crate::types::{JobResult, JobStatus, LiveMetrics};

            pub fn path(process_id: &str) -> String {
                format!("/api/processing-status/{process_id}")
            }

            /// The response to the `GET` `api/processing-status/{id}` request
            #[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq, Clone)]
            pub struct Response {
                pub status: JobStatus,
                /// Percentage from 0 to 100
                #[serde(default)]
                pub progress: f64,
                #[serde(default)]
                pub enhancement_step: Option<String>,
                #[serde(default)]
                pub live_metrics: Option<LiveMetrics>,
                /// Estimated seconds until completion
                #[serde(default)]
                pub eta: Option<f64>,
                #[serde(default)]
                pub result: Option<JobResult>,
                #[serde(default)]
                pub error: Option<String>,
            }
        }
    }

    pub mod download_result {
        pub mod get {
            pub fn path(process_id: &str) -> String {
                format!("/api/download-result/{process_id}")
            }
        }
    }
}
