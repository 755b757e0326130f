use crate::ConfigError;
use std::path::Path;

/// Parses a seed list: one URL per line, blank lines and `#` comments ignored
pub fn parse_seed_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Reads a UTF-8 seed file
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Seeds in file order (may be empty)
/// * `Err(ConfigError::SeedFile)` - File missing or unreadable
pub fn read_seed_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::SeedFile {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_seed_list(&content))
}
