//! Item model
//!
//! Items are the named values an automation host exposes. Each item has a
//! declared type that decides which kind of state it accepts.

use std::fmt;
use std::str::FromStr;

use crate::error::UnknownItemType;

/// Declared type of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    Number,
    Switch,
    Contact,
    String,
    DateTime,
    Dimmer,
    Rollershutter,
    Color,
    Location,
    Call,
    Group,
}

impl ItemType {
    /// Name used for this type in item definition files
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Number => "Number",
            ItemType::Switch => "Switch",
            ItemType::Contact => "Contact",
            ItemType::String => "String",
            ItemType::DateTime => "DateTime",
            ItemType::Dimmer => "Dimmer",
            ItemType::Rollershutter => "Rollershutter",
            ItemType::Color => "Color",
            ItemType::Location => "Location",
            ItemType::Call => "Call",
            ItemType::Group => "Group",
        }
    }

    /// Whether items of this type accept decimal state updates
    pub fn is_numeric(&self) -> bool {
        matches!(self, ItemType::Number)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = UnknownItemType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Typed variants such as `Number:Power` share the base type
        let base = s.split(':').next().unwrap_or(s);
        let item_type = match base {
            "Number" => ItemType::Number,
            "Switch" => ItemType::Switch,
            "Contact" => ItemType::Contact,
            "String" => ItemType::String,
            "DateTime" => ItemType::DateTime,
            "Dimmer" => ItemType::Dimmer,
            "Rollershutter" => ItemType::Rollershutter,
            "Color" => ItemType::Color,
            "Location" => ItemType::Location,
            "Call" => ItemType::Call,
            "Group" => ItemType::Group,
            _ => return Err(UnknownItemType(s.to_string())),
        };
        Ok(item_type)
    }
}

/// A named item with its declared type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    pub name: String,
    pub item_type: ItemType,
}

impl Item {
    pub fn new(name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            name: name.into(),
            item_type,
        }
    }

    /// Shorthand for a `Number` item
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, ItemType::Number)
    }
}
