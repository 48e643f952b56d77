//! HTTP stitch service client.

use std::time::Duration;

use ureq::Agent;

use super::CancelToken;
use super::metadata::{HealthStatus, StitchRequest, StitchResponse};
use super::multipart::MultipartBody;
use super::service::StitchService;
use crate::error::UploadError;

/// Talks to a remote stitch service.
///
/// `GET {base}/health`, then `POST {base}/stitch` with a multipart body.
pub struct HttpStitchService {
    base_url: String,
    agent: Agent,
    timeout: Duration,
}

impl HttpStitchService {
    /// Create a client. `timeout` bounds each request end to end.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn map_error(&self, err: ureq::Error) -> UploadError {
        match err {
            ureq::Error::Timeout(_) => UploadError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            },
            ureq::Error::StatusCode(code) => UploadError::Rejected(format!("HTTP {code}")),
            other => UploadError::Network(other.to_string()),
        }
    }

    /// Encode the request as `multipart/form-data`.
    fn encode(request: &StitchRequest) -> Result<(String, Vec<u8>), UploadError> {
        let mut body = MultipartBody::new();
        let metadata = request.metadata_json()?;
        body.part("metadata", None, "application/json", &metadata);
        for part in &request.images {
            let data = std::fs::read(&part.path)?;
            body.part(
                &part.name,
                Some(&part.file_name()),
                part.content_type(),
                &data,
            );
        }
        let content_type = body.content_type();
        Ok((content_type, body.finish()))
    }
}

impl StitchService for HttpStitchService {
    fn health(&self) -> Result<HealthStatus, UploadError> {
        let mut response = self
            .agent
            .get(&self.url("health"))
            .call()
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Network(format!(
                "health probe returned HTTP {}",
                status.as_u16()
            )));
        }
        response
            .body_mut()
            .read_json::<HealthStatus>()
            .map_err(|e| self.map_error(e))
    }

    /// A request already on the wire cannot be withdrawn; the agent timeout
    /// bounds it.
    fn submit(
        &self,
        request: &StitchRequest,
        cancel: &CancelToken,
    ) -> Result<StitchResponse, UploadError> {
        let (content_type, body) = Self::encode(request)?;
        if cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }
        tracing::debug!(
            "POST {} ({} images, {} bytes)",
            self.url("stitch"),
            request.images.len(),
            body.len()
        );

        let mut response = self
            .agent
            .post(&self.url("stitch"))
            .header("Content-Type", &content_type)
            .send(&body[..])
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        match response.body_mut().read_json::<StitchResponse>() {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(UploadError::Rejected(format!(
                "HTTP {}",
                status.as_u16()
            ))),
            Err(e) => Err(self.map_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let service = HttpStitchService::new("http://stitch.local:8080/", Duration::from_secs(1));
        assert_eq!(service.base_url(), "http://stitch.local:8080");
        assert_eq!(service.url("health"), "http://stitch.local:8080/health");
    }

    #[test]
    fn test_unreachable_health_is_network_error() {
        // Port 9 (discard) on localhost is closed on test machines
        let service = HttpStitchService::new("http://127.0.0.1:9", Duration::from_millis(500));
        assert!(matches!(
            service.health(),
            Err(UploadError::Network(_)) | Err(UploadError::Timeout { .. })
        ));
    }

    #[test]
    fn test_cancelled_submit_sends_nothing() {
        use crate::upload::{SPHERICAL_CAPTURE, StitchMetadata};

        let service = HttpStitchService::new("http://127.0.0.1:9", Duration::from_millis(500));
        let request = StitchRequest {
            metadata: StitchMetadata {
                capture_type: SPHERICAL_CAPTURE.to_string(),
                photo_count: 0,
                orientations: Vec::new(),
                timestamp: 0,
            },
            images: Vec::new(),
        };
        let cancel = CancelToken::new();
        cancel.cancel();
        assert!(matches!(
            service.submit(&request, &cancel),
            Err(UploadError::Cancelled)
        ));
    }
}
