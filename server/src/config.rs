use anyhow::{Context, Result, bail};
use products_hr::{DEFAULT_MIN_GAP_SECONDS, MAX_MIN_GAP_SECONDS, OrderingPolicy};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub cors_allowed_origins: Vec<String>,
    /// Minimum spacing between consecutive pipeline steps.
    pub ordering: OrderingPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cors_allowed_origins: vec!["http://localhost:5173".into()],
            ordering: OrderingPolicy::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();

        let min_gap = match std::env::var("HIRING_MIN_STEP_GAP_SECONDS") {
            Ok(raw) => parse_gap(&raw)?,
            Err(_) => DEFAULT_MIN_GAP_SECONDS,
        };

        Ok(Self {
            cors_allowed_origins,
            ordering: OrderingPolicy::with_min_gap_seconds(min_gap),
        })
    }
}

fn parse_gap(raw: &str) -> Result<i64> {
    let seconds: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("invalid HIRING_MIN_STEP_GAP_SECONDS {raw:?}"))?;
    if seconds < 0 {
        bail!("HIRING_MIN_STEP_GAP_SECONDS must not be negative, got {seconds}");
    }
    if seconds > MAX_MIN_GAP_SECONDS {
        bail!("HIRING_MIN_STEP_GAP_SECONDS must be at most {MAX_MIN_GAP_SECONDS}, got {seconds}");
    }
    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_must_be_a_non_negative_integer() {
        assert_eq!(parse_gap(" 300 ").unwrap(), 300);
        assert!(parse_gap("-1").is_err());
        assert!(parse_gap("one minute").is_err());
    }

    #[test]
    fn gap_beyond_a_year_is_a_config_error() {
        assert_eq!(parse_gap(&MAX_MIN_GAP_SECONDS.to_string()).unwrap(), MAX_MIN_GAP_SECONDS);
        let err = parse_gap(&(i64::MAX / 100).to_string()).unwrap_err();
        assert!(err.to_string().contains("at most"), "{err}");
    }

    #[test]
    fn default_gap_is_one_minute() {
        let config = AppConfig::default();
        assert_eq!(config.ordering.min_gap.num_seconds(), 60);
    }
}
