use async_trait::async_trait;
use reqwest::Client;
use tracing::trace;

use super::{TelemetryError, UsageEvent, UsageTransport};

/// [`UsageTransport`] that POSTs events as JSON
pub struct HttpUsageTransport {
    client: Client,
    endpoint: String,
}

impl HttpUsageTransport {
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/usage-tracking/v1/events", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl UsageTransport for HttpUsageTransport {
    async fn send(&self, event: UsageEvent) -> Result<(), TelemetryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&event)
            .send()
            .await
            .map_err(|e| TelemetryError::Transport(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(TelemetryError::Status(response.status().as_u16()));
        }
        trace!(id = %event.id, "usage event delivered");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::{UsageTracker, metadata};
    use std::{sync::Arc, time::Duration};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_event_is_posted_as_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/usage-tracking/v1/events"))
            .and(body_partial_json(serde_json::json!({
                "command": "init",
                "metadata": {"authType": "oauth"}
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let tracker = UsageTracker::new(Arc::new(HttpUsageTransport::new(client, &server.uri())));
        tracker.track("init", metadata([("authType", "oauth")]), None);
        tracker.flush(Duration::from_secs(5)).await;
    }

    #[tokio::test]
    async fn test_server_error_is_reported_as_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let transport = HttpUsageTransport::new(client, &server.uri());
        let event = UsageEvent {
            id: uuid::Uuid::new_v4(),
            command: "init".to_string(),
            portal_id: None,
            metadata: Default::default(),
            version: "0.0.0".to_string(),
        };

        assert!(matches!(
            transport.send(event).await,
            Err(TelemetryError::Status(500))
        ));
    }
}
