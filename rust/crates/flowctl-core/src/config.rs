//! Configuration loading for the flowctl master.

use serde::Deserialize;

/// Flat runtime configuration, loaded from the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_key")]
    pub master_api_key: String,

    #[serde(default = "default_db_path")]
    pub master_db_path: String,

    #[serde(default = "default_host")]
    pub master_host: String,

    #[serde(default = "default_port")]
    pub master_port: u16,

    /// Comma-separated list of worker ports on 127.0.0.1, pre-parsed into
    /// full base URLs.
    #[serde(default = "default_workers", deserialize_with = "deserialize_workers")]
    pub master_workers: Vec<String>,

    #[serde(default = "default_scheduler_interval")]
    pub scheduler_interval: f64,
}

fn default_api_key() -> String {
    "airflow-mini-secret-key".to_string()
}

fn default_db_path() -> String {
    "airflow_mini.db".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_workers() -> Vec<String> {
    parse_worker_ports("8001,8002")
}

fn default_scheduler_interval() -> f64 {
    2.0
}

fn deserialize_workers<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_worker_ports(&raw))
}

fn parse_worker_ports(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|port| format!("http://127.0.0.1:{port}"))
        .collect()
}

impl Config {
    /// Load configuration from the environment, with a local `.env` file
    /// loaded first if present, falling back to documented defaults.
    pub fn load() -> std::result::Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();

        let builder = config::Config::builder()
            .set_default("master_api_key", default_api_key())?
            .set_default("master_db_path", default_db_path())?
            .set_default("master_host", default_host())?
            .set_default("master_port", default_port() as i64)?
            .set_default("master_workers", "8001,8002")?
            .set_default("scheduler_interval", default_scheduler_interval())?
            .add_source(config::Environment::default().try_parsing(true));

        builder.build()?.try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.master_host, self.master_port)
    }

    pub fn callback_url(&self) -> String {
        format!(
            "http://{}:{}/internal/task-result",
            self.master_host, self.master_port
        )
    }

    pub fn scheduler_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.scheduler_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_worker_ports_into_urls() {
        let workers = parse_worker_ports("8001,8002");
        assert_eq!(
            workers,
            vec![
                "http://127.0.0.1:8001".to_string(),
                "http://127.0.0.1:8002".to_string()
            ]
        );
    }

    #[test]
    fn ignores_blank_entries() {
        let workers = parse_worker_ports("8001,,8002, ");
        assert_eq!(workers.len(), 2);
    }
}
