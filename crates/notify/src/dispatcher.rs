use std::collections::VecDeque;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::SendError;
use crate::message::Message;
use crate::provider::Provider;
use crate::sign::{dingtalk_sign, lanxin_sign};
use crate::webhook::Webhook;

/// Number of concurrent dispatch workers per round.
const WORKER_COUNT: usize = 5;

/// Sends allowed per minute by the rate-limited providers.
const RATE_LIMIT_BATCH: usize = 20;

/// Pause inserted after each full batch.
const RATE_LIMIT_PAUSE: Duration = Duration::from_secs(60);

/// Delivers one round's messages to a set of webhook targets.
pub struct Dispatcher {
    client: Client,
}

impl Dispatcher {
    /// Create a new Dispatcher with a custom reqwest Client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Deliver `messages` to every target in `webhooks`.
    ///
    /// Targets are drained from a shared queue by a fixed pool of workers,
    /// so distinct webhooks are delivered concurrently while the messages
    /// to any single webhook stay strictly sequential, oldest entry first.
    /// Every failure is logged and recovered; the round never aborts.
    pub async fn dispatch(&self, webhooks: Vec<Webhook>, messages: &[Message]) {
        let queue = Mutex::new(VecDeque::from(webhooks));
        let workers = (0..WORKER_COUNT).map(|_| self.worker(&queue, messages));
        join_all(workers).await;
    }

    async fn worker(&self, queue: &Mutex<VecDeque<Webhook>>, messages: &[Message]) {
        loop {
            let webhook = { queue.lock().await.pop_front() };
            let Some(webhook) = webhook else { break };
            self.drain_target(&webhook, messages).await;
        }
    }

    /// Deliver the full message list to one webhook.
    async fn drain_target(&self, webhook: &Webhook, messages: &[Message]) {
        let Some(provider) = Provider::detect(&webhook.url) else {
            tracing::error!("Unknown webhook type: {}", webhook.url);
            return;
        };

        // One timestamp per target per delivery pass; both signing schemes
        // are derived from it and never cached across rounds.
        let timestamp = Utc::now().timestamp();
        let secret = webhook.sign.as_deref().filter(|s| !s.is_empty());

        let query = match (provider, secret) {
            (Provider::Dingtalk, Some(secret)) => {
                let ms = timestamp * 1000;
                vec![
                    ("timestamp".to_string(), ms.to_string()),
                    ("sign".to_string(), dingtalk_sign(secret, ms)),
                ]
            }
            _ => Vec::new(),
        };
        let body_sign = match (provider, secret) {
            (Provider::Lanxin, Some(secret)) => Some(lanxin_sign(secret, timestamp)),
            _ => None,
        };

        // New entries were collected newest-first; deliver oldest-first.
        let mut sent = 0;
        for msg in messages.iter().rev() {
            let payload = provider.build_payload(msg, timestamp, body_sign.as_deref());
            if let Err(e) = self.send(&webhook.url, provider, &query, &payload).await {
                tracing::error!("[{}] send failed: {}", webhook.url, e);
            }

            sent += 1;
            if provider.rate_limited() && should_pause(sent, messages.len()) {
                tracing::debug!("[{}] rate limit reached, pausing 60s", webhook.url);
                tokio::time::sleep(RATE_LIMIT_PAUSE).await;
            }
        }
    }

    /// POST one payload and interpret the provider's verdict.
    async fn send(
        &self,
        url: &str,
        provider: Provider,
        query: &[(String, String)],
        payload: &Value,
    ) -> Result<(), SendError> {
        let mut request = self.client.post(url).json(payload);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;

        let json_body = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"));
        let text = response.text().await?;

        if !json_body {
            return Err(SendError::Api(text));
        }
        let body: Value =
            serde_json::from_str(&text).map_err(|_| SendError::Api(text.clone()))?;
        if body.get(provider.error_code_field()).and_then(Value::as_i64) != Some(0) {
            return Err(SendError::Api(text));
        }

        Ok(())
    }
}

/// Rate pacing shared by WeCom and DingTalk: pause after every 20th send,
/// but only when the round's total volume exceeds one batch.
fn should_pause(sent: usize, total: usize) -> bool {
    sent % RATE_LIMIT_BATCH == 0 && total > RATE_LIMIT_BATCH
}
