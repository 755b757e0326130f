use crate::config::types::{
    BrowserConfig, Config, CrawlerConfig, ExtractionConfig, OutputConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Upper bound on simultaneous browser processes
const MAX_CONCURRENT_LIMIT: usize = 32;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_browser_config(&config.browser)?;
    validate_extraction_config(&config.extraction)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent < 1 || config.max_concurrent > MAX_CONCURRENT_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max-concurrent must be between 1 and {}, got {}",
            MAX_CONCURRENT_LIMIT, config.max_concurrent
        )));
    }

    if config.robots_timeout_ms == 0 || config.robots_timeout_ms > 10_000 {
        return Err(ConfigError::Validation(format!(
            "robots-timeout-ms must be between 1 and 10000, got {}",
            config.robots_timeout_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // The name doubles as the robots.txt product token
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    validate_email(&config.contact_email)?;

    if config.browser_user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "browser-user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("navigation-timeout-ms", config.navigation_timeout_ms),
        (
            "fallback-navigation-timeout-ms",
            config.fallback_navigation_timeout_ms,
        ),
        ("readiness-timeout-ms", config.readiness_timeout_ms),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation(format!("{} must be > 0", name)));
        }
    }

    if config.window_width == 0 || config.window_height == 0 {
        return Err(ConfigError::Validation(format!(
            "window size must be non-zero, got {}x{}",
            config.window_width, config.window_height
        )));
    }

    Ok(())
}

fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    if config.content_selectors.is_empty() {
        return Err(ConfigError::Validation(
            "content-selectors cannot be empty".to_string(),
        ));
    }

    for selector in config
        .content_selectors
        .iter()
        .chain(std::iter::once(&config.readiness_selector))
    {
        scraper::Selector::parse(selector).map_err(|e| {
            ConfigError::Validation(format!("Invalid CSS selector '{}': {:?}", selector, e))
        })?;
    }

    if let Some(bad) = config
        .skip_extensions
        .iter()
        .find(|ext| ext.trim().trim_start_matches('.').is_empty())
    {
        return Err(ConfigError::Validation(format!(
            "skip-extensions contains an empty entry: '{}'",
            bad
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.batch_summary_file.is_empty()
        || config.batch_summary_file.contains(['/', '\\'])
    {
        return Err(ConfigError::Validation(format!(
            "batch-summary-file must be a plain file name, got '{}'",
            config.batch_summary_file
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
