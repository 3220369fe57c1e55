//! Reqwest-backed thumbnail source adapter.
//!
//! This adapter owns transport details only: request serialisation, timeout
//! and HTTP error mapping, and decoding the provider's JSON answer into a
//! thumbnail URL. The request timeout doubles as the workflow's bound on the
//! provider call; an elapsed deadline surfaces as a timeout error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ports::{ThumbnailSource, ThumbnailSourceError};
use crate::domain::{BOUNDARY_SRID, Boundary};

const DEFAULT_USER_AGENT: &str = "hectare-backend-imagery/0.1";

/// Thumbnail source adapter performing HTTP POST requests against one
/// provider endpoint.
pub struct ThumbnailHttpSource {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl ThumbnailHttpSource {
    /// Build an adapter using a reqwest client with an explicit request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        timeout: Duration,
        api_key: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

/// Request body sent to the provider: the polygon as GeoJSON plus its SRID.
#[derive(Debug, Serialize)]
struct ThumbnailRequestDto {
    geometry: Value,
    srid: u32,
}

/// Provider answer carrying the rendered thumbnail location.
#[derive(Debug, Deserialize)]
struct ThumbnailResponseDto {
    url: String,
}

#[async_trait]
impl ThumbnailSource for ThumbnailHttpSource {
    async fn fetch_thumbnail(&self, boundary: &Boundary) -> Result<String, ThumbnailSourceError> {
        let body = ThumbnailRequestDto {
            geometry: boundary.to_geojson(),
            srid: BOUNDARY_SRID,
        };

        let mut request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }

        parse_thumbnail_url(bytes.as_ref())
    }
}

fn parse_thumbnail_url(body: &[u8]) -> Result<String, ThumbnailSourceError> {
    let decoded: ThumbnailResponseDto = serde_json::from_slice(body).map_err(|error| {
        ThumbnailSourceError::decode(format!("invalid provider JSON payload: {error}"))
    })?;
    if decoded.url.trim().is_empty() {
        return Err(ThumbnailSourceError::decode(
            "provider answered without a thumbnail url",
        ));
    }
    Ok(decoded.url)
}

fn map_transport_error(error: reqwest::Error) -> ThumbnailSourceError {
    if error.is_timeout() {
        ThumbnailSourceError::timeout(error.to_string())
    } else {
        ThumbnailSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ThumbnailSourceError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ThumbnailSourceError::timeout(message)
        }
        _ => ThumbnailSourceError::upstream(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the non-network mapping helpers.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn parses_the_provider_payload() {
        let body = br#"{ "url": "https://imagery.invalid/tiles/abc.png" }"#;
        let url = parse_thumbnail_url(body).expect("payload decodes");
        assert_eq!(url, "https://imagery.invalid/tiles/abc.png");
    }

    #[rstest]
    #[case::not_json(b"<html>oops</html>" as &[u8])]
    #[case::missing_url(br#"{ "image": "nope" }"#)]
    #[case::blank_url(br#"{ "url": "  " }"#)]
    fn rejects_unusable_payloads(#[case] body: &[u8]) {
        let error = parse_thumbnail_url(body).expect_err("decode must fail");
        assert!(matches!(error, ThumbnailSourceError::Decode { .. }));
    }

    #[rstest]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT, true)]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, true)]
    #[case::too_many_requests(StatusCode::TOO_MANY_REQUESTS, false)]
    #[case::bad_request(StatusCode::BAD_REQUEST, false)]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, false)]
    fn maps_http_statuses(#[case] status: StatusCode, #[case] timeout: bool) {
        let error = map_status_error(status, b"{\"detail\":\"imagery backend unavailable\"}");
        if timeout {
            assert!(matches!(error, ThumbnailSourceError::Timeout { .. }));
        } else {
            assert!(matches!(error, ThumbnailSourceError::Upstream { .. }));
        }
        assert!(error.to_string().contains(&status.as_u16().to_string()));
    }

    #[rstest]
    fn long_bodies_are_truncated_in_messages() {
        let body = vec![b'x'; 400];
        let error = map_status_error(StatusCode::BAD_GATEWAY, &body);
        let message = error.to_string();
        assert!(message.contains("..."));
        assert!(message.len() < 300);
    }
}
