use std::collections::HashMap;

/// Environment variable prefix shared by every setting.
const ENV_PREFIX: &str = "BANTER_BUS_CORE_API_";

/// Top-level server configuration, loaded from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub web_host: String,
    pub web_port: u16,
    pub management_api_url: String,
    pub management_api_port: Option<u16>,
    pub db_uri: String,
    pub db_name: String,
    pub message_queue_host: Option<String>,
    pub message_queue_port: Option<u16>,
    pub message_queue_password: Option<String>,
    /// Grace period before a disconnected player is removed from their room.
    pub disconnect_timer_in_seconds: i64,
    pub questions_per_round: usize,
    /// Response fields whose nested keys are dropped from structured logs,
    /// e.g. `{"players": ["avatar"]}`.
    pub log_response_exclude_attr: HashMap<String, Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut exclude = HashMap::new();
        exclude.insert("players".to_string(), vec!["avatar".to_string()]);
        Self {
            web_host: "0.0.0.0".to_string(),
            web_port: 8080,
            management_api_url: "http://localhost:8081".to_string(),
            management_api_port: None,
            db_uri: "mongodb://localhost:27017".to_string(),
            db_name: "banterbus".to_string(),
            message_queue_host: None,
            message_queue_port: None,
            message_queue_password: None,
            disconnect_timer_in_seconds: 300,
            questions_per_round: 3,
            log_response_exclude_attr: exclude,
        }
    }
}

impl Settings {
    /// Load settings from `BANTER_BUS_CORE_API_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let mut settings = Settings::default();

        if let Some(host) = env_var("WEB_HOST") {
            settings.web_host = host;
        }
        if let Some(port) = env_parse::<u16>("WEB_PORT") {
            settings.web_port = port;
        }
        if let Some(url) = env_var("MANAGEMENT_API_URL") {
            settings.management_api_url = url;
        }
        settings.management_api_port = env_parse::<u16>("MANAGEMENT_API_PORT");
        if let Some(uri) = env_var("DB_URI") {
            settings.db_uri = uri;
        }
        if let Some(name) = env_var("DB_NAME") {
            settings.db_name = name;
        }
        settings.message_queue_host = env_var("MESSAGE_QUEUE_HOST");
        settings.message_queue_port = env_parse::<u16>("MESSAGE_QUEUE_PORT");
        settings.message_queue_password = env_var("MESSAGE_QUEUE_PASSWORD");
        if let Some(secs) = env_parse::<i64>("DISCONNECT_TIMER_IN_SECONDS") {
            settings.disconnect_timer_in_seconds = secs;
        }
        if let Some(n) = env_parse::<usize>("QUESTIONS_PER_ROUND") {
            settings.questions_per_round = n;
        }
        if let Some(raw) = env_var("LOG_RESPONSE_EXCLUDE_ATTR") {
            match serde_json::from_str(&raw) {
                Ok(parsed) => settings.log_response_exclude_attr = parsed,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to parse LOG_RESPONSE_EXCLUDE_ATTR, keeping default");
                }
            }
        }

        settings
    }

    /// Base URL of the management service, with the optional port applied.
    pub fn management_url(&self) -> String {
        match self.management_api_port {
            Some(port) => format!("{}:{port}", self.management_api_url),
            None => self.management_api_url.clone(),
        }
    }

    /// Redis URI for the transport backplane, when a message queue host is
    /// configured.
    pub fn redis_uri(&self) -> Option<String> {
        let host = self.message_queue_host.as_ref()?;
        let mut uri = String::from("redis://");
        if let Some(password) = &self.message_queue_password {
            uri.push_str(password);
            uri.push('@');
        }
        uri.push_str(host);
        if let Some(port) = self.message_queue_port {
            uri.push_str(&format!(":{port}"));
        }
        Some(uri)
    }
}

fn env_var(suffix: &str) -> Option<String> {
    match std::env::var(format!("{ENV_PREFIX}{suffix}")) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn env_parse<T: std::str::FromStr>(suffix: &str) -> Option<T> {
    env_var(suffix)?.parse().ok()
}
