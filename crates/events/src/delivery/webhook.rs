//! Webhook delivery for security alerts.
//!
//! [`WebhookDelivery`] posts a JSON-encoded [`SecurityAlert`] to an external
//! URL. There is exactly one attempt per alert: the sink is informational and
//! a lost alert is acceptable.

use std::time::Duration;

use authgate_core::SecurityAlert;

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// WebhookDelivery
// ---------------------------------------------------------------------------

/// Posts alerts to an external webhook endpoint.
#[derive(Debug, Clone)]
pub struct WebhookDelivery {
    client: reqwest::Client,
}

impl WebhookDelivery {
    /// Create a delivery service with a pre-configured HTTP client.
    pub fn new() -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Post `alert` to `url` once and check the response status.
    pub async fn deliver(&self, url: &str, alert: &SecurityAlert) -> Result<(), WebhookError> {
        let response = self.client.post(url).json(alert).send().await?;
        if !response.status().is_success() {
            return Err(WebhookError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use uuid::Uuid;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn alert() -> SecurityAlert {
        SecurityAlert::ip_changed(Uuid::new_v4(), "1.2.3.4", "5.6.7.8", "agentA")
    }

    #[tokio::test]
    async fn posts_alert_as_json() {
        let server = MockServer::start().await;
        let alert = alert();

        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("content-type", "application/json"))
            .and(body_json(&alert))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let delivery = WebhookDelivery::new().unwrap();
        delivery
            .deliver(&format!("{}/hook", server.uri()), &alert)
            .await
            .expect("delivery should succeed");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&server)
            .await;

        let delivery = WebhookDelivery::new().unwrap();
        let err = delivery.deliver(&server.uri(), &alert()).await.unwrap_err();
        assert!(matches!(err, WebhookError::HttpStatus(502)));
    }

    #[test]
    fn webhook_error_display_http_status() {
        let err = WebhookError::HttpStatus(502);
        assert_eq!(err.to_string(), "Webhook returned HTTP 502");
    }

    #[test]
    fn webhook_error_display_request() {
        // Build a reqwest error from an invalid URL.
        let req_err = reqwest::Client::new().get("://bad").build().unwrap_err();
        let err = WebhookError::Request(req_err);
        assert!(err.to_string().contains("HTTP request failed"));
    }
}
