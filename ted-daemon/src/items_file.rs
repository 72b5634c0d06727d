//! Items file
//!
//! Only item definitions carrying a `theenergydetective="..."` binding are
//! returned; everything else in the file belongs to other bindings.
//!
//! ```text
//! Number Power_Total "Total power [%d W]" <energy> (gPower) { theenergydetective="main:Power.Total.PowerNow" }
//! ```

use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use item_bus::{Item, ItemType};
use regex::Regex;

static ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<type>[A-Za-z]+(?::[A-Za-z]+)?)\s+(?P<name>[A-Za-z0-9_]+)\b.*\{(?P<bindings>.*)\}\s*$")
        .expect("item pattern is a valid regex")
});

static TED_BINDING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"theenergydetective\s*=\s*"(?P<config>[^"]*)""#)
        .expect("binding pattern is a valid regex")
});

/// One bound item read from an items file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDefinition {
    pub item: Item,
    pub binding_config: String,
    pub line: usize,
}

/// A TED-bound line that could not be turned into an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedItem {
    pub line: usize,
    pub reason: String,
}

/// Result of reading an items file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemBindings {
    pub definitions: Vec<ItemDefinition>,
    pub rejected: Vec<RejectedItem>,
}

/// Read and parse an items file
pub fn load_item_bindings(path: &Path) -> Result<ItemBindings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read items file {}", path.display()))?;
    Ok(parse_item_bindings(&content))
}

/// Extract every TED-bound item definition
///
/// A line with an unknown item type is rejected on its own; the rest of the
/// file still loads.
pub fn parse_item_bindings(content: &str) -> ItemBindings {
    let mut bindings = ItemBindings::default();

    for (index, line) in content.lines().enumerate() {
        if line.trim_start().starts_with("//") {
            continue;
        }
        let Some(item) = ITEM_RE.captures(line) else {
            continue;
        };
        let Some(binding) = TED_BINDING_RE.captures(&item["bindings"]) else {
            continue;
        };

        match item["type"].parse::<ItemType>() {
            Ok(item_type) => bindings.definitions.push(ItemDefinition {
                item: Item::new(&item["name"], item_type),
                binding_config: binding["config"].to_string(),
                line: index + 1,
            }),
            Err(e) => bindings.rejected.push(RejectedItem {
                line: index + 1,
                reason: format!("item '{}': {}", &item["name"], e),
            }),
        }
    }

    bindings
}
