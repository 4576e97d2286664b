use chrono::{SecondsFormat, Utc};
use tracing_subscriber::EnvFilter;

/// ISO-8601 / RFC 3339 UTC timestamp with millisecond precision.
pub fn now_timestamp_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn init_tracing(log_level: &str) {
    let normalized = log_level
        .split_whitespace()
        .next()
        .unwrap_or("info")
        .to_lowercase();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(normalized));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::now_timestamp_string;
    use chrono::DateTime;

    #[test]
    fn timestamp_is_valid_rfc3339() {
        let timestamp = now_timestamp_string();
        assert!(DateTime::parse_from_rfc3339(&timestamp).is_ok());
        assert!(timestamp.ends_with('Z'));
    }
}
