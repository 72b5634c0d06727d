//! Service configuration parsing
//!
//! The binding is configured through a flat map of string keys:
//!
//! ```text
//! refresh=60000
//! main.host=192.168.1.20
//! main.port=80
//! garage.host=ted-garage.local
//! ```
//!
//! Keys are matched against `^(.*?)\.(host|port)$`. Parsing starts from the
//! current registry contents and upserts into a copy of it, so entries absent
//! from a later configuration are kept.

use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::device::{DeviceConfig, DeviceMap};
use crate::error::ConfigurationError;

/// Key carrying the refresh interval in milliseconds
pub const REFRESH_KEY: &str = "refresh";

/// Key added by the configuration admin that never describes a device
pub const SERVICE_PID_KEY: &str = "service.pid";

static DEVICE_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)\.(host|port)$").expect("device key pattern is a valid regex")
});

/// Result of parsing one configuration map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfig {
    /// New refresh interval, `None` if the map did not set one
    pub refresh: Option<Duration>,
    /// Full device map to install (previous entries plus upserts)
    pub devices: DeviceMap,
}

/// Split a device key into `(device_id, setting)`.
///
/// Returns `None` for keys that do not follow `<id>.<host|port>` or that have
/// an empty device id.
pub fn parse_device_key(key: &str) -> Option<(&str, &str)> {
    let captures = DEVICE_KEY_PATTERN.captures(key)?;
    let device_id = captures.get(1)?.as_str();
    let setting = captures.get(2)?.as_str();

    if device_id.is_empty() {
        return None;
    }

    Some((device_id, setting))
}

/// Parse a configuration map on top of the `current` device map.
///
/// # Errors
///
/// Returns `ConfigurationError::InvalidNumber` for a malformed `refresh` or
/// `<id>.port` value. On error nothing is returned, so the caller's state is
/// left untouched.
pub fn parse_configuration(
    config: &HashMap<String, String>,
    current: &DeviceMap,
) -> Result<ParsedConfig, ConfigurationError> {
    let refresh = match config.get(REFRESH_KEY) {
        Some(value) if !value.trim().is_empty() => Some(parse_refresh(value)?),
        _ => None,
    };

    let mut devices = current.clone();

    // Sorted so that the first reported error does not depend on hash order
    let mut keys: Vec<&String> = config.keys().collect();
    keys.sort();

    for key in keys {
        if key == SERVICE_PID_KEY || key == REFRESH_KEY {
            continue;
        }

        let Some((device_id, setting)) = parse_device_key(key) else {
            tracing::debug!(
                "given config key '{}' does not follow the expected pattern '<id>.<host|port>'",
                key
            );
            continue;
        };

        apply_device_setting(&mut devices, device_id, setting, &config[key])?;
    }

    Ok(ParsedConfig { refresh, devices })
}

/// Apply one `<id>.<setting>` value, creating the device if needed.
pub(crate) fn apply_device_setting(
    devices: &mut DeviceMap,
    device_id: &str,
    setting: &str,
    value: &str,
) -> Result<(), ConfigurationError> {
    let device = devices
        .entry(device_id.to_string())
        .or_insert_with(|| DeviceConfig::new(device_id));

    match setting {
        "host" => {
            device.host = Some(value.to_string());
        }
        "port" => {
            device.port = parse_port(&format!("{}.port", device_id), value)?;
        }
        _ => {
            return Err(ConfigurationError::UnknownKey(format!(
                "{}.{}",
                device_id, setting
            )));
        }
    }

    Ok(())
}

fn parse_refresh(value: &str) -> Result<Duration, ConfigurationError> {
    let millis = value
        .trim()
        .parse::<u64>()
        .map_err(|e| invalid_number(REFRESH_KEY, value, e.to_string()))?;

    if millis == 0 {
        return Err(invalid_number(
            REFRESH_KEY,
            value,
            "refresh interval must be positive".to_string(),
        ));
    }

    Ok(Duration::from_millis(millis))
}

fn parse_port(key: &str, value: &str) -> Result<u16, ConfigurationError> {
    let port = value
        .trim()
        .parse::<u16>()
        .map_err(|e| invalid_number(key, value, e.to_string()))?;

    if port == 0 {
        return Err(invalid_number(key, value, "port must be positive".to_string()));
    }

    Ok(port)
}

fn invalid_number(key: &str, value: &str, reason: String) -> ConfigurationError {
    ConfigurationError::InvalidNumber {
        key: key.to_string(),
        value: value.to_string(),
        reason,
    }
}
