use anyhow::Context;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Database connection string. `postgres://` in production; `sqlite://`
    /// works for local development.
    pub database_url: String,

    /// Listen address in `host:port` or `:port` form. A bare port is accepted
    /// and normalized to `:port`.
    pub listen_addr: String,

    /// Upper bound on pooled database connections shared by all requests.
    pub db_max_connections: u32,

    /// Create the users/user_sessions tables if they are missing.
    ///
    /// Development only. Production schemas are managed outside this service.
    pub bootstrap_schema: bool,

    /// One JSON object per log line instead of human-readable output.
    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://sessions_dev.db?mode=rwc".to_string());

        let listen_addr = get("LISTEN_ADDR")
            .or_else(|| get("PORT"))
            .map(|a| fix_addr(&a))
            .unwrap_or_else(|| ":60000".to_string());

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .with_context(|| format!("DB_MAX_CONNECTIONS must be a positive integer, got {v:?}"))?,
            None => 16,
        };
        anyhow::ensure!(db_max_connections > 0, "DB_MAX_CONNECTIONS must be at least 1");

        let bootstrap_schema = match get("BOOTSTRAP_SCHEMA") {
            Some(v) => parse_flag(&v).with_context(|| format!("BOOTSTRAP_SCHEMA: invalid value {v:?}"))?,
            None => false,
        };

        let json_logs = get("APP_ENV").is_some_and(|v| v == "production");

        Ok(Self {
            database_url,
            listen_addr,
            db_max_connections,
            bootstrap_schema,
            json_logs,
        })
    }

    /// Address handed to the TCP listener. `:port` binds every interface.
    pub fn bind_addr(&self) -> String {
        if self.listen_addr.starts_with(':') {
            format!("0.0.0.0{}", self.listen_addr)
        } else {
            self.listen_addr.clone()
        }
    }
}

/// Accept a bare port as shorthand for `:port`.
pub fn fix_addr(addr: &str) -> String {
    if addr.contains(':') {
        addr.to_string()
    } else {
        format!(":{addr}")
    }
}

fn parse_flag(v: &str) -> anyhow::Result<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow::anyhow!("expected a boolean, got {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn cfg(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn fix_addr_without_prefix() {
        assert_eq!(fix_addr("70000"), ":70000");
    }

    #[test]
    fn fix_addr_with_prefix() {
        assert_eq!(fix_addr(":70000"), ":70000");
    }

    #[test]
    fn fix_addr_keeps_host() {
        assert_eq!(fix_addr("127.0.0.1:8080"), "127.0.0.1:8080");
    }

    #[test]
    fn defaults() {
        let c = cfg(&[]).unwrap();
        assert_eq!(c.listen_addr, ":60000");
        assert_eq!(c.bind_addr(), "0.0.0.0:60000");
        assert_eq!(c.db_max_connections, 16);
        assert!(c.database_url.starts_with("sqlite://"));
        assert!(!c.bootstrap_schema);
        assert!(!c.json_logs);
    }

    #[test]
    fn env_overrides() {
        let c = cfg(&[
            ("DATABASE_URL", "postgres://db/sessions"),
            ("PORT", "8080"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("BOOTSTRAP_SCHEMA", "true"),
            ("APP_ENV", "production"),
        ])
        .unwrap();

        assert_eq!(c.database_url, "postgres://db/sessions");
        assert_eq!(c.listen_addr, ":8080");
        assert_eq!(c.db_max_connections, 4);
        assert!(c.bootstrap_schema);
        assert!(c.json_logs);
    }

    #[test]
    fn listen_addr_wins_over_port() {
        let c = cfg(&[("LISTEN_ADDR", "127.0.0.1:9000"), ("PORT", "8080")]).unwrap();
        assert_eq!(c.bind_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(cfg(&[("DB_MAX_CONNECTIONS", "lots")]).is_err());
        assert!(cfg(&[("DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(cfg(&[("BOOTSTRAP_SCHEMA", "maybe")]).is_err());
    }

    proptest! {
        #[test]
        fn bare_ports_gain_exactly_one_colon(port in "[0-9]{1,5}") {
            let fixed = fix_addr(&port);
            prop_assert_eq!(fix_addr(&fixed), fixed.clone());
            prop_assert_eq!(fixed, format!(":{port}"));
        }
    }
}
