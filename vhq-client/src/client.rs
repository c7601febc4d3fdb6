use serde::{Serialize, de::DeserializeOwned};

use vhq_api::api::{
    ErrorBody, analyze, analyze_smart, complete_ad, download, download_result, platform_detect,
    process_video, processing_status, request_ad, transcript,
};

use crate::{Error, RawResponse, Transport};

/// Answer of the server to a request to start a processing job
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessStart {
    /// The job was queued under the given id
    Started(process_video::post::Response),
    /// `402`: an ad must be watched before this quality can be processed
    AdRequired { seconds: Option<u64> },
    /// `403` with an upsell: the quality is reserved to premium users
    PremiumRequired(process_video::post::PremiumOffer),
}

/// Typed client of the VideoHQ API.
///
/// Every call issues a single request and folds both transport failures and non-successful
/// answers into an [`Error`] carrying the message to show to the user.
pub struct ApiClient<T> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn post_raw<R: Serialize>(&self, path: &str, request: &R) -> Result<RawResponse, Error> {
        let body = serde_json::to_string(request)
            .map_err(|e| Error::Transport(format!("Failed to encode request: {e}")))?;
        log::debug!("POST {path}");
        self.transport.post_json(path, body).await.map_err(|e| {
            log::error!("Failed to POST {path}. Error performing HTTP request: {e}");
            e.into()
        })
    }

    async fn get_raw(&self, path: &str) -> Result<RawResponse, Error> {
        log::debug!("GET {path}");
        self.transport.get(path).await.map_err(|e| {
            log::error!("Failed to GET {path}. Error performing HTTP request: {e}");
            e.into()
        })
    }

    async fn post<R: Serialize, S: DeserializeOwned>(
        &self,
        path: &str,
        request: &R,
        fallback: &str,
    ) -> Result<S, Error> {
        let response = self.post_raw(path, request).await?;
        decode(path, response, fallback)
    }

    pub async fn analyze(&self, url: &str) -> Result<analyze::post::Response, Error> {
        let request = analyze::post::Request {
            url: url.to_string(),
        };
        self.post(analyze::post::PATH, &request, "Failed to analyze video")
            .await
    }

    pub async fn download(
        &self,
        url: &str,
        quality: &str,
        format: download::post::OutputFormat,
    ) -> Result<download::post::Response, Error> {
        let request = download::post::Request {
            url: url.to_string(),
            quality: quality.to_string(),
            format,
        };
        self.post(download::post::PATH, &request, "Failed to download video")
            .await
    }

    pub async fn transcript(&self, url: &str) -> Result<transcript::post::Response, Error> {
        let request = transcript::post::Request {
            url: url.to_string(),
        };
        self.post(transcript::post::PATH, &request, "Failed to get transcript")
            .await
    }

    pub async fn platform_detect(
        &self,
        url: &str,
    ) -> Result<platform_detect::post::Response, Error> {
        let request = platform_detect::post::Request {
            url: url.to_string(),
        };
        self.post(
            platform_detect::post::PATH,
            &request,
            "Platform detection failed",
        )
        .await
    }

    pub async fn analyze_smart(&self, url: &str) -> Result<analyze_smart::post::Response, Error> {
        let request = analyze_smart::post::Request {
            url: url.to_string(),
        };
        self.post(analyze_smart::post::PATH, &request, "Video analysis failed")
            .await
    }

    pub async fn request_ad(&self, quality: &str) -> Result<request_ad::post::Response, Error> {
        let request = request_ad::post::Request {
            quality: quality.to_string(),
        };
        self.post(request_ad::post::PATH, &request, "Failed to load ad")
            .await
    }

    /// Confirms an ad session. A `400` answer still carries a [`complete_ad::post::Response`]
    /// with `success: false` and the reason in `message`, which is returned as is.
    pub async fn complete_ad(
        &self,
        ad_session_id: &str,
        watch_duration: u64,
    ) -> Result<complete_ad::post::Response, Error> {
        let request = complete_ad::post::Request {
            ad_session_id: ad_session_id.to_string(),
            watch_duration,
        };
        let response = self.post_raw(complete_ad::post::PATH, &request).await?;
        if !response.ok()
            && let Ok(rejected) = serde_json::from_str::<complete_ad::post::Response>(&response.body)
            && rejected.message.is_some()
        {
            return Ok(rejected);
        }
        decode(
            complete_ad::post::PATH,
            response,
            "Failed to complete ad viewing",
        )
    }

    pub async fn process_video(&self, url: &str, quality: &str) -> Result<ProcessStart, Error> {
        const FALLBACK: &str = "Failed to start processing";

        let request = process_video::post::Request {
            url: url.to_string(),
            quality: quality.to_string(),
        };
        let response = self.post_raw(process_video::post::PATH, &request).await?;
        if response.ok() {
            return decode(process_video::post::PATH, response, FALLBACK).map(ProcessStart::Started);
        }

        let rejection: process_video::post::Rejection =
            serde_json::from_str(&response.body).unwrap_or_default();
        match (response.status, rejection) {
            (402, rejection) => Ok(ProcessStart::AdRequired {
                seconds: rejection.ad_duration,
            }),
            (
                403,
                process_video::post::Rejection {
                    premium_offer: Some(offer),
                    ..
                },
            ) => Ok(ProcessStart::PremiumRequired(offer)),
            _ => Err(server_error(&response, FALLBACK)),
        }
    }

    pub async fn processing_status(
        &self,
        process_id: &str,
    ) -> Result<processing_status::get::Response, Error> {
        let path = processing_status::get::path(process_id);
        let response = self.get_raw(&path).await?;
        decode(&path, response, "Failed to fetch processing status")
    }

    /// Path of the output file of a completed job. The file itself is fetched by the browser or
    /// by the caller, not decoded by the client.
    pub fn download_result_path(&self, process_id: &str) -> String {
        download_result::get::path(process_id)
    }
}

fn decode<S: DeserializeOwned>(
    path: &str,
    response: RawResponse,
    fallback: &str,
) -> Result<S, Error> {
    if !response.ok() {
        let error = server_error(&response, fallback);
        log::warn!("{path} answered {}: {error}", response.status);
        return Err(error);
    }

    serde_json::from_str(&response.body).map_err(|e| {
        log::error!("Failed to decode the answer of {path}. Error decoding json: {e:?}");
        Error::Server {
            status: response.status,
            message: format!("Unexpected response from server: {e}"),
        }
    })
}

/// Builds the error of a non-successful answer, using the server message verbatim when there is
/// one.
fn server_error(response: &RawResponse, fallback: &str) -> Error {
    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .and_then(|body| body.error)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| fallback.to_string());

    Error::Server {
        status: response.status,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTransport;
    use googletest::prelude::*;
    use serde_json::json;

    #[tokio::test]
    #[googletest::test]
    async fn analyze_posts_the_url() -> googletest::Result<()> {
        let client = ApiClient::new(FakeTransport::new());
        client.transport().respond(
            analyze::post::PATH,
            200,
            json!({
                "platform": "youtube",
                "title": "Never Gonna Give You Up",
                "duration": 213,
                "formats": [{"quality": "720p", "type": "video"}],
                "transcript_available": true
            }),
        );

        let response = client.analyze("https://youtu.be/dQw4w9WgXcQ").await.or_fail()?;

        expect_that!(
            response,
            matches_pattern!(analyze::post::Response {
                platform: eq("youtube"),
                title: some(eq("Never Gonna Give You Up")),
                duration: some(eq(&213.0)),
                transcript_available: eq(&true),
                ..
            })
        );
        expect_that!(
            client.transport().requests(),
            elements_are![matches_pattern!(crate::testing::Recorded {
                method: eq(&"POST"),
                path: eq("/api/analyze"),
                body: some(eq(&json!({"url": "https://youtu.be/dQw4w9WgXcQ"}))),
            })]
        );
        Ok(())
    }

    #[tokio::test]
    #[googletest::test]
    async fn server_message_is_surfaced_verbatim() {
        let client = ApiClient::new(FakeTransport::new());
        client.transport().respond(
            analyze::post::PATH,
            400,
            json!({"error": "This video is age-restricted and cannot be analyzed."}),
        );

        expect_that!(
            client.analyze("https://youtu.be/x").await,
            err(eq(&Error::Server {
                status: 400,
                message: "This video is age-restricted and cannot be analyzed.".to_string(),
            }))
        );
    }

    #[tokio::test]
    #[googletest::test]
    async fn missing_server_message_uses_fallback() {
        let client = ApiClient::new(FakeTransport::new());
        client
            .transport()
            .respond_raw(transcript::post::PATH, 502, "<html>Bad gateway</html>");

        expect_that!(
            client.transcript("https://youtu.be/x").await,
            err(eq(&Error::Server {
                status: 502,
                message: "Failed to get transcript".to_string(),
            }))
        );
    }

    #[tokio::test]
    #[googletest::test]
    async fn transport_failures_are_normalised() {
        let client = ApiClient::new(FakeTransport::new());
        client
            .transport()
            .fail(platform_detect::post::PATH, "connection refused");

        expect_that!(
            client.platform_detect("https://youtu.be/x").await,
            err(eq(&Error::Transport("connection refused".to_string())))
        );
    }

    #[tokio::test]
    #[googletest::test]
    async fn process_video_branches_on_gate_statuses() -> googletest::Result<()> {
        let client = ApiClient::new(FakeTransport::new());
        client
            .transport()
            .respond(
                process_video::post::PATH,
                402,
                json!({"error": "Ad viewing required", "ad_required": true, "ad_duration": 15}),
            )
            .respond(
                process_video::post::PATH,
                403,
                json!({
                    "error": "Premium required for 8K",
                    "premium_offer": {"trial": "7 days free", "price": "$4.99/month", "benefits": ["No ads"]}
                }),
            )
            .respond(
                process_video::post::PATH,
                403,
                json!({"error": "Forbidden"}),
            )
            .respond(
                process_video::post::PATH,
                200,
                json!({"process_id": "p-1", "status": "started", "estimated_time": 15}),
            );

        let url = "https://www.tiktok.com/@user/video/1";
        expect_that!(
            client.process_video(url, "1080p").await.or_fail()?,
            eq(&ProcessStart::AdRequired { seconds: Some(15) })
        );
        expect_that!(
            client.process_video(url, "8K").await.or_fail()?,
            matches_pattern!(ProcessStart::PremiumRequired(matches_pattern!(
                process_video::post::PremiumOffer {
                    price: some(eq("$4.99/month")),
                    ..
                }
            )))
        );
        expect_that!(
            client.process_video(url, "8K").await,
            err(eq(&Error::Server {
                status: 403,
                message: "Forbidden".to_string(),
            }))
        );
        expect_that!(
            client.process_video(url, "480p").await.or_fail()?,
            matches_pattern!(ProcessStart::Started(matches_pattern!(
                process_video::post::Response {
                    process_id: eq("p-1"),
                    ..
                }
            )))
        );
        Ok(())
    }

    #[tokio::test]
    #[googletest::test]
    async fn rejected_ad_completion_keeps_message() -> googletest::Result<()> {
        let client = ApiClient::new(FakeTransport::new());
        client.transport().respond(
            complete_ad::post::PATH,
            400,
            json!({"success": false, "message": "Please watch at least 12s of the ad"}),
        );

        let response = client.complete_ad("ad-1", 3).await.or_fail()?;
        expect_that!(
            response,
            matches_pattern!(complete_ad::post::Response {
                success: eq(&false),
                message: some(eq("Please watch at least 12s of the ad")),
                ..
            })
        );
        Ok(())
    }

    #[tokio::test]
    #[googletest::test]
    async fn undecodable_success_body_is_a_server_error() {
        let client = ApiClient::new(FakeTransport::new());
        client
            .transport()
            .respond_raw(&processing_status::get::path("p-1"), 200, "not json");

        expect_that!(
            client.processing_status("p-1").await,
            err(matches_pattern!(Error::Server {
                status: eq(&200),
                message: starts_with("Unexpected response from server"),
            }))
        );
    }
}
