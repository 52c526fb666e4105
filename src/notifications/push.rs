//! Web Push delivery: RFC 8291 payload encryption and RFC 8292 VAPID
//! signing via the `web-push` crate, with the HTTP request sent through
//! reqwest so the delivery status can be classified per endpoint.

use async_trait::async_trait;
use tracing::{info, warn};
use web_push::{ContentEncoding, SubscriptionInfo, VapidSignatureBuilder, WebPushMessageBuilder};

use crate::config::PushConfig;

use super::repo::PushSubscription;

/// Outcome of a single delivery attempt.
///
/// `EndpointGone` is the self-healing signal: the push service reported the
/// registration dead (404/410) and the subscription must be deleted.
/// Everything else that fails is logged and skipped, never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Delivered,
    EndpointGone,
    Failed(String),
}

#[async_trait]
pub trait PushSender: Send + Sync {
    async fn deliver(&self, subscription: &PushSubscription, payload: &[u8]) -> PushOutcome;
}

/// Push TTL handed to the push service; matches the proximity dedup window.
const PUSH_TTL_SECS: u32 = 86_400;

pub struct WebPushSender {
    client: reqwest::Client,
    private_key: String,
    subject: String,
}

impl WebPushSender {
    /// Returns `None` when no VAPID key pair is configured; the dispatcher
    /// then degrades to in-app notification recording only.
    pub fn from_config(config: &PushConfig) -> Option<Self> {
        if !config.is_configured() {
            return None;
        }
        let private_key = config.vapid_private_key.clone()?;
        Some(Self {
            client: reqwest::Client::new(),
            private_key,
            subject: config.vapid_subject.clone(),
        })
    }

    async fn try_deliver(
        &self,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> anyhow::Result<PushOutcome> {
        let sub_info = SubscriptionInfo::new(
            &subscription.endpoint,
            &subscription.p256dh,
            &subscription.auth,
        );

        let mut sig_builder = VapidSignatureBuilder::from_base64(&self.private_key, &sub_info)?;
        sig_builder.add_claim("sub", self.subject.as_str());
        let signature = sig_builder.build()?;

        let mut builder = WebPushMessageBuilder::new(&sub_info);
        builder.set_payload(ContentEncoding::Aes128Gcm, payload);
        builder.set_vapid_signature(signature);
        builder.set_ttl(PUSH_TTL_SECS);
        let message = builder.build()?;

        let mut request = self
            .client
            .post(message.endpoint.to_string())
            .header("TTL", message.ttl.to_string());

        if let Some(push_payload) = message.payload {
            request = request
                .header("Content-Encoding", push_payload.content_encoding.to_str())
                .header("Content-Type", "application/octet-stream");
            for (key, value) in &push_payload.crypto_headers {
                request = request.header(*key, value.as_str());
            }
            request = request.body(push_payload.content);
        }

        let response = request.send().await?;
        Ok(classify_status(response.status().as_u16()))
    }
}

#[async_trait]
impl PushSender for WebPushSender {
    async fn deliver(&self, subscription: &PushSubscription, payload: &[u8]) -> PushOutcome {
        match self.try_deliver(subscription, payload).await {
            Ok(PushOutcome::EndpointGone) => {
                info!(endpoint = %subscription.endpoint, "push endpoint gone");
                PushOutcome::EndpointGone
            }
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(endpoint = %subscription.endpoint, error = %e, "push delivery failed");
                PushOutcome::Failed(e.to_string())
            }
        }
    }
}

/// 2xx delivered; 404/410 means the registration no longer exists at the
/// push service; anything else is a plain failure.
fn classify_status(status: u16) -> PushOutcome {
    match status {
        200..=299 => PushOutcome::Delivered,
        404 | 410 => PushOutcome::EndpointGone,
        other => PushOutcome::Failed(format!("push service returned HTTP {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_statuses_are_delivered() {
        assert_eq!(classify_status(200), PushOutcome::Delivered);
        assert_eq!(classify_status(201), PushOutcome::Delivered);
    }

    #[test]
    fn gone_statuses_prune_the_subscription() {
        assert_eq!(classify_status(404), PushOutcome::EndpointGone);
        assert_eq!(classify_status(410), PushOutcome::EndpointGone);
    }

    #[test]
    fn other_statuses_fail_without_pruning() {
        assert!(matches!(classify_status(429), PushOutcome::Failed(_)));
        assert!(matches!(classify_status(500), PushOutcome::Failed(_)));
    }

    #[test]
    fn sender_absent_without_keys() {
        let config = PushConfig {
            vapid_public_key: None,
            vapid_private_key: None,
            vapid_subject: "mailto:admin@ausflugfinder.app".into(),
        };
        assert!(WebPushSender::from_config(&config).is_none());
    }
}
