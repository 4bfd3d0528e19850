use std::env;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub port: u16,
    pub slot_defaults: SlotDefaults,
}

/// Grid used when staff open a day without choosing hours themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotDefaults {
    pub start_hour: u32,
    pub end_hour: u32,
    pub interval_minutes: u32,
}

impl Default for SlotDefaults {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 18,
            interval_minutes: 30,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = SlotDefaults::default();

        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            port: parse_or("PORT", 3000),
            slot_defaults: SlotDefaults {
                start_hour: parse_or("SLOT_START_HOUR", defaults.start_hour),
                end_hour: parse_or("SLOT_END_HOUR", defaults.end_hour),
                interval_minutes: parse_or("SLOT_INTERVAL_MINUTES", defaults.interval_minutes),
            },
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
