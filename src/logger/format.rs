//! Access log lines
//!
//! `access_log_format` names one of the built-in layouts (`common`,
//! `combined`, `json`) or is a pattern with `$variables`.

use std::time::Duration;

use chrono::{DateTime, Local};

/// Layout selected by `logging.access_log_format`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Common,
    Combined,
    Json,
    Pattern(String),
}

impl LogFormat {
    pub fn parse(name: &str) -> Self {
        match name {
            "common" => Self::Common,
            "combined" => Self::Combined,
            "json" => Self::Json,
            pattern => Self::Pattern(pattern.to_string()),
        }
    }
}

/// One viewer request as seen at the edge
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub client: String,
    pub received_at: DateTime<Local>,
    pub method: String,
    pub path: String,
    /// Raw query string, no leading `?`
    pub query: Option<String>,
    pub version: &'static str,
    pub status: u16,
    pub bytes_sent: usize,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Behavior pattern; `None` when the request never reached the pipeline
    pub behavior: Option<String>,
    /// Store the request was routed to
    pub store: String,
    pub elapsed: Duration,
}

impl AccessLogEntry {
    pub fn new(client: String, method: String, path: String) -> Self {
        Self {
            client,
            received_at: Local::now(),
            method,
            path,
            query: None,
            version: "1.1",
            status: 200,
            bytes_sent: 0,
            referer: None,
            user_agent: None,
            behavior: None,
            store: String::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn render(&self, format: &LogFormat) -> String {
        match format {
            LogFormat::Common => self.clf(),
            LogFormat::Combined => format!(
                "{} \"{}\" \"{}\"",
                self.clf(),
                dash(self.referer.as_deref()),
                dash(self.user_agent.as_deref()),
            ),
            LogFormat::Json => self.json(),
            LogFormat::Pattern(pattern) => self.substitute(pattern),
        }
    }

    fn uri(&self) -> String {
        self.query.as_ref().map_or_else(|| self.path.clone(), |q| format!("{}?{q}", self.path))
    }

    fn request_line(&self) -> String {
        format!("{} {} HTTP/{}", self.method, self.uri(), self.version)
    }

    fn clf(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.client,
            self.received_at.format("%d/%b/%Y:%H:%M:%S %z"),
            self.request_line(),
            self.status,
            self.bytes_sent,
        )
    }

    fn json(&self) -> String {
        serde_json::json!({
            "client": self.client,
            "received_at": self.received_at.to_rfc3339(),
            "method": self.method,
            "uri": self.uri(),
            "status": self.status,
            "bytes_sent": self.bytes_sent,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "behavior": self.behavior,
            "store": self.store,
            "elapsed_ms": self.elapsed.as_secs_f64() * 1000.0,
        })
        .to_string()
    }

    /// Variables: `$remote_addr`, `$time_local`, `$time_iso8601`, `$request`,
    /// `$request_method`, `$request_uri`, `$request_time`, `$status`,
    /// `$body_bytes_sent`, `$http_referer`, `$http_user_agent`,
    /// `$edge_behavior`, `$edge_store`
    fn substitute(&self, pattern: &str) -> String {
        let vars = [
            ("$remote_addr", self.client.clone()),
            ("$time_local", self.received_at.format("%d/%b/%Y:%H:%M:%S %z").to_string()),
            ("$time_iso8601", self.received_at.to_rfc3339()),
            ("$request_method", self.method.clone()),
            ("$request_uri", self.uri()),
            ("$request_time", format!("{:.3}", self.elapsed.as_secs_f64())),
            ("$request", self.request_line()),
            ("$status", self.status.to_string()),
            ("$body_bytes_sent", self.bytes_sent.to_string()),
            ("$http_referer", dash(self.referer.as_deref()).to_string()),
            ("$http_user_agent", dash(self.user_agent.as_deref()).to_string()),
            ("$edge_behavior", dash(self.behavior.as_deref()).to_string()),
            ("$edge_store", dash(Some(self.store.as_str()).filter(|s| !s.is_empty())).to_string()),
        ];

        // `$request_*` entries precede `$request` so prefixes are not eaten
        vars.iter()
            .fold(pattern.to_string(), |line, (name, value)| line.replace(name, value))
    }
}

fn dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
