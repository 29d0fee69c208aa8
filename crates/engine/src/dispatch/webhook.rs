use async_trait::async_trait;
use reqwest::Client;

use super::dispatcher::{DispatchError, Dispatcher};
use crate::trigger::FiredEvent;
use hermes_common::crypto::sign_payload;

pub const SIGNATURE_HEADER: &str = "X-Hermes-Signature";

pub struct WebhookDispatcher {
    url: String,
    secret: Vec<u8>,
    client: Client,
}

impl WebhookDispatcher {
    pub fn new(url: String, secret: Vec<u8>) -> Self {
        Self {
            url,
            secret,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Dispatcher for WebhookDispatcher {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn dispatch(&self, event: &FiredEvent) -> Result<(), DispatchError> {
        let body = serde_json::to_vec(event).map_err(|e| DispatchError::Encode(e.to_string()))?;
        let signature =
            sign_payload(&self.secret, &body).map_err(|e| DispatchError::Encode(e.to_string()))?;

        let resp = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header(SIGNATURE_HEADER, &signature)
            .body(body)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DispatchError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::{MetricSnapshot, Severity};
    use axum::body::Bytes;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use hermes_common::crypto::verify_signature;
    use std::sync::{Arc, Mutex};

    fn sample_event() -> FiredEvent {
        FiredEvent {
            id: "evt-1".into(),
            rule_id: "r-1".into(),
            rule_name: "High risk".into(),
            trigger_type: "threshold".into(),
            severity: Severity::Critical,
            modules_to_trigger: vec!["notify".into()],
            trigger_count: 1,
            snapshot: MetricSnapshot::new().with("risk_score", 82.0),
            fired_at: chrono::Utc::now(),
            manual: false,
        }
    }

    async fn spawn_receiver(status: StatusCode) -> (String, Arc<Mutex<Vec<(String, Vec<u8>)>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let app = Router::new().route(
            "/hook",
            post(move |headers: HeaderMap, body: Bytes| {
                let sink = sink.clone();
                async move {
                    let sig = headers
                        .get(SIGNATURE_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    sink.lock().unwrap().push((sig, body.to_vec()));
                    status
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/hook"), received)
    }

    #[tokio::test]
    async fn posts_signed_event() {
        let (url, received) = spawn_receiver(StatusCode::OK).await;
        let dispatcher = WebhookDispatcher::new(url, b"hook-secret".to_vec());

        dispatcher.dispatch(&sample_event()).await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        let (sig, body) = &received[0];
        assert!(verify_signature(b"hook-secret", body, sig));
        let event: FiredEvent = serde_json::from_slice(body).unwrap();
        assert_eq!(event.rule_id, "r-1");
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let (url, _) = spawn_receiver(StatusCode::SERVICE_UNAVAILABLE).await;
        let dispatcher = WebhookDispatcher::new(url, b"s".to_vec());
        assert_eq!(
            dispatcher.dispatch(&sample_event()).await,
            Err(DispatchError::Rejected(503))
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let dispatcher = WebhookDispatcher::new("http://127.0.0.1:1/hook".into(), b"s".to_vec());
        assert!(matches!(
            dispatcher.dispatch(&sample_event()).await,
            Err(DispatchError::Transport(_))
        ));
    }
}
