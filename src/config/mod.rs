use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::env;

pub const SUPABASE_URL_VAR: &str = "NEXT_PUBLIC_SUPABASE_URL";
pub const SUPABASE_ANON_KEY_VAR: &str = "NEXT_PUBLIC_SUPABASE_ANON_KEY";
pub const SUPABASE_SERVICE_ROLE_KEY_VAR: &str = "SUPABASE_SERVICE_ROLE_KEY";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} is not a valid http(s) URL")]
    InvalidUrl(&'static str),

    #[error("{0} does not look like a JWT")]
    MalformedKey(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub run_migrations: bool,
    pub log_format: LogFormat,

    // Auth provider
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let supabase = SupabaseEnv::from_vars(
            env::var(SUPABASE_URL_VAR).ok(),
            env::var(SUPABASE_ANON_KEY_VAR).ok(),
            env::var(SUPABASE_SERVICE_ROLE_KEY_VAR).ok(),
        )?;

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),
            run_migrations: env::var("RUN_MIGRATIONS")
                .unwrap_or_else(|_| "true".into())
                .parse()
                .unwrap_or(true),
            log_format: log_format_from_env(),

            supabase_url: supabase.url,
            supabase_anon_key: supabase.anon_key,
            supabase_service_role_key: supabase.service_role_key,
        })
    }
}

pub fn log_format_from_env() -> LogFormat {
    match env::var("LOG_FORMAT").as_deref() {
        Ok("json") | Ok("JSON") => LogFormat::Json,
        _ => LogFormat::Pretty,
    }
}

/// Auth provider settings after presence and format checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseEnv {
    pub url: String,
    pub anon_key: String,
    pub service_role_key: Option<String>,
}

impl SupabaseEnv {
    /// Only presence and shape are validated; the keys are never verified
    /// against the provider here.
    pub fn from_vars(
        url: Option<String>,
        anon_key: Option<String>,
        service_role_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let url = non_empty(url).ok_or(ConfigError::Missing(SUPABASE_URL_VAR))?;
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidUrl(SUPABASE_URL_VAR));
        }

        let anon_key = non_empty(anon_key).ok_or(ConfigError::Missing(SUPABASE_ANON_KEY_VAR))?;
        if !is_jwt_like(&anon_key) {
            return Err(ConfigError::MalformedKey(SUPABASE_ANON_KEY_VAR));
        }

        let service_role_key = non_empty(service_role_key);
        if let Some(key) = &service_role_key {
            if !is_jwt_like(key) {
                return Err(ConfigError::MalformedKey(SUPABASE_SERVICE_ROLE_KEY_VAR));
            }
        }

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key,
            service_role_key,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Three non-empty dot-separated base64url segments, the first of which
/// decodes to a JSON object.
pub fn is_jwt_like(token: &str) -> bool {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
        return false;
    }

    let Ok(header) = URL_SAFE_NO_PAD.decode(segments[0].trim_end_matches('=')) else {
        return false;
    };

    matches!(
        serde_json::from_slice::<serde_json::Value>(&header),
        Ok(serde_json::Value::Object(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // {"alg":"HS256","typ":"JWT"}
    const HEADER: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";

    fn jwt() -> String {
        format!("{HEADER}.eyJyb2xlIjoiYW5vbiJ9.c2lnbmF0dXJl")
    }

    #[test]
    fn test_jwt_like_accepts_real_shape() {
        assert!(is_jwt_like(&jwt()));
    }

    #[test]
    fn test_jwt_like_rejects_wrong_segment_count() {
        assert!(!is_jwt_like("abc.def"));
        assert!(!is_jwt_like(&format!("{HEADER}..sig")));
        assert!(!is_jwt_like("not-a-token"));
    }

    #[test]
    fn test_jwt_like_rejects_non_json_header() {
        // "hello" in base64url
        assert!(!is_jwt_like("aGVsbG8.payload.sig"));
    }

    #[test]
    fn test_supabase_env_valid() {
        let env = SupabaseEnv::from_vars(
            Some("https://abc.supabase.co/".into()),
            Some(jwt()),
            None,
        )
        .unwrap();
        assert_eq!(env.url, "https://abc.supabase.co");
        assert!(env.service_role_key.is_none());
    }

    #[test]
    fn test_supabase_env_missing_values() {
        assert_eq!(
            SupabaseEnv::from_vars(None, Some(jwt()), None),
            Err(ConfigError::Missing(SUPABASE_URL_VAR))
        );
        assert_eq!(
            SupabaseEnv::from_vars(Some("https://x.supabase.co".into()), Some("  ".into()), None),
            Err(ConfigError::Missing(SUPABASE_ANON_KEY_VAR))
        );
    }

    #[test]
    fn test_supabase_env_malformed_keys() {
        assert_eq!(
            SupabaseEnv::from_vars(Some("ftp://x".into()), Some(jwt()), None),
            Err(ConfigError::InvalidUrl(SUPABASE_URL_VAR))
        );
        assert_eq!(
            SupabaseEnv::from_vars(
                Some("https://x.supabase.co".into()),
                Some(jwt()),
                Some("service-key".into())
            ),
            Err(ConfigError::MalformedKey(SUPABASE_SERVICE_ROLE_KEY_VAR))
        );
    }
}
