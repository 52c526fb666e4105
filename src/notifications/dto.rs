use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct SettingsPayload {
    pub notifications_enabled: bool,
    pub friend_requests_enabled: bool,
    pub friend_activity_enabled: bool,
    pub nearby_trips_enabled: bool,
    pub nearby_radius_m: i32,
    pub location_tracking_enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct LocationPayload {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
}

/// Browser `PushSubscription.toJSON()` shape.
#[derive(Debug, Deserialize)]
pub struct SubscribePayload {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribePayload {
    pub endpoint: String,
}

#[derive(Debug, Serialize)]
pub struct VapidPublicKey {
    pub public_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_payload_parses_browser_shape() {
        let json = r#"{
            "endpoint": "https://push.example.com/reg/abc",
            "keys": {"p256dh": "BPub", "auth": "secret"}
        }"#;
        let payload: SubscribePayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.endpoint, "https://push.example.com/reg/abc");
        assert_eq!(payload.keys.p256dh, "BPub");
        assert_eq!(payload.keys.auth, "secret");
    }
}
