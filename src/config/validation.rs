use crate::config::types::{Config, CrawlerConfig, FetchConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates id range and batching settings
///
/// `chunk-size = 0` is not rejected here; the partitioner clamps it to 1.
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.start_id < 1 {
        return Err(ConfigError::Validation(
            "start_id must be >= 1".to_string(),
        ));
    }

    if config.count < 1 {
        return Err(ConfigError::Validation("count must be >= 1".to_string()));
    }

    // The archive stores ids as SQLite INTEGER (i64).
    let fits = config
        .start_id
        .checked_add(config.count)
        .is_some_and(|end| end - 1 <= i64::MAX as u64);
    if !fits {
        return Err(ConfigError::Validation(format!(
            "id range starting at {} with {} ids exceeds the largest storable id {}",
            config.start_id,
            config.count,
            i64::MAX
        )));
    }

    if config.commit_every < 1 {
        return Err(ConfigError::Validation(format!(
            "commit_every must be >= 1, got {}",
            config.commit_every
        )));
    }

    if config.pool_multiplier < 1 || config.pool_multiplier > 64 {
        return Err(ConfigError::Validation(format!(
            "pool_multiplier must be between 1 and 64, got {}",
            config.pool_multiplier
        )));
    }

    Ok(())
}

/// Validates fetch settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    for (name, value) in [("base_url", &config.base_url), ("latest_url", &config.latest_url)] {
        let url = Url::parse(value)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "{} '{}' must use http or https",
                name, value
            )));
        }
    }

    // Ids are joined onto the base URL; without the trailing slash the last
    // path segment would be replaced instead.
    if !config.base_url.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "base_url '{}' must end with '/'",
            config.base_url
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.archive_path.is_empty() {
        return Err(ConfigError::Validation(
            "archive_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_start_id() {
        let mut config = Config::default();
        config.crawler.start_id = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_count() {
        let mut config = Config::default();
        config.crawler.count = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_overflowing_range() {
        let mut config = Config::default();
        config.crawler.start_id = u64::MAX;
        config.crawler.count = 2;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_range_must_fit_archive_ids() {
        let mut config = Config::default();
        config.crawler.start_id = i64::MAX as u64;
        config.crawler.count = 1;
        assert!(validate(&config).is_ok());

        config.crawler.count = 2;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));

        config.crawler.start_id = i64::MAX as u64 + 1;
        config.crawler.count = 1;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_chunk_size_is_allowed() {
        let mut config = Config::default();
        config.crawler.chunk_size = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_pool_multiplier_bounds() {
        let mut config = Config::default();
        config.crawler.pool_multiplier = 0;
        assert!(validate(&config).is_err());
        config.crawler.pool_multiplier = 65;
        assert!(validate(&config).is_err());
        config.crawler.pool_multiplier = 64;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_base_url_needs_trailing_slash() {
        let mut config = Config::default();
        config.fetch.base_url = "https://example.com/poem".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_base_url_must_parse() {
        let mut config = Config::default();
        config.fetch.base_url = "not a url/".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let mut config = Config::default();
        config.fetch.latest_url = "ftp://example.com/".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_archive_path() {
        let mut config = Config::default();
        config.output.archive_path = String::new();
        assert!(validate(&config).is_err());
    }
}
