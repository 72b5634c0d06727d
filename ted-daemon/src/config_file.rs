//! Service configuration file
//!
//! Lines look like `theenergydetective:<key>=<value>`. Blank lines, `#`
//! comments and keys of other bindings are ignored.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use ted_binding::BINDING_TYPE;

/// Read and parse a service configuration file
pub fn load_service_config(path: &Path) -> Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_service_config(&content)
}

/// Collect the TED keys of a configuration file, prefix stripped
pub fn parse_service_config(content: &str) -> Result<HashMap<String, String>> {
    let mut config = HashMap::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .with_context(|| format!("Line {}: expected <key>=<value>, got '{}'", index + 1, line))?;

        let Some(key) = key
            .trim()
            .strip_prefix(BINDING_TYPE)
            .and_then(|rest| rest.strip_prefix(':'))
        else {
            continue;
        };

        config.insert(key.to_string(), value.trim().to_string());
    }

    Ok(config)
}
