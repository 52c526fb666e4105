use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// VAPID key material for Web Push. Both keys absent means push delivery is
/// disabled and the dispatcher records in-app notifications only.
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    pub vapid_public_key: Option<String>,
    pub vapid_private_key: Option<String>,
    pub vapid_subject: String,
}

impl PushConfig {
    pub fn is_configured(&self) -> bool {
        self.vapid_public_key.is_some() && self.vapid_private_key.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WsConfig {
    pub heartbeat_secs: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProximityConfig {
    pub sweep_secs: u64,
    pub default_radius_m: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub push: PushConfig,
    pub ws: WsConfig,
    pub proximity: ProximityConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "ausflugfinder".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "ausflugfinder-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let push = PushConfig {
            vapid_public_key: std::env::var("VAPID_PUBLIC_KEY").ok(),
            vapid_private_key: std::env::var("VAPID_PRIVATE_KEY").ok(),
            vapid_subject: std::env::var("VAPID_SUBJECT")
                .unwrap_or_else(|_| "mailto:admin@ausflugfinder.app".into()),
        };
        let ws = WsConfig {
            heartbeat_secs: std::env::var("WS_HEARTBEAT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
            timeout_secs: std::env::var("WS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60),
        };
        let proximity = ProximityConfig {
            sweep_secs: std::env::var("PROXIMITY_SWEEP_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(300),
            default_radius_m: std::env::var("PROXIMITY_DEFAULT_RADIUS_M")
                .ok()
                .and_then(|v| v.parse::<i32>().ok())
                .unwrap_or(5000),
        };
        Ok(Self {
            database_url,
            jwt,
            push,
            ws,
            proximity,
        })
    }
}
