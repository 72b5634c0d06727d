//! Item binding configuration
//!
//! Items are attached to a gateway value with a binding string of the form
//! `<gateway>:<element>(.<element>)*`, for example `main:Power.Total.PowerNow`.
//! The gateway part names a configured device id; the element part is the path
//! into the LiveData document.

use std::collections::HashMap;

use item_bus::Item;
use parking_lot::RwLock;

use crate::error::BindingConfigError;

/// Binding type name, used as the configuration namespace for this binding
pub const BINDING_TYPE: &str = "theenergydetective";

/// Parsed binding of one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemBinding {
    pub item_name: String,
    /// Device id of the gateway, matched exactly and case-sensitively
    pub gateway: String,
    /// Element names below `<LiveData>`, never empty
    pub element_path: Vec<String>,
}

/// Read access to item bindings, consumed by the dispatcher
pub trait BindingProvider: Send + Sync {
    /// Names of all items with a binding
    fn item_names(&self) -> Vec<String>;

    /// Gateway id an item is bound to
    fn gateway_for_item(&self, item_name: &str) -> Option<String>;

    /// Element path an item is bound to, empty if the item is unknown
    fn element_path_for_item(&self, item_name: &str) -> Vec<String>;
}

/// Reject items that cannot hold a decimal value
pub fn validate_item_type(item: &Item) -> Result<(), BindingConfigError> {
    if !item.item_type.is_numeric() {
        return Err(BindingConfigError::UnsupportedItemType {
            item: item.name.clone(),
            item_type: item.item_type,
        });
    }
    Ok(())
}

/// Parse a `gateway:element.element` binding string for `item_name`
pub fn parse_binding(item_name: &str, binding_config: &str) -> Result<ItemBinding, BindingConfigError> {
    let parts: Vec<&str> = binding_config.trim().split(':').collect();
    if parts.len() != 2 {
        return Err(BindingConfigError::Syntax(
            "TED binding must contain two parts separated by ':'".to_string(),
        ));
    }

    let gateway = parts[0].trim();
    let path = parts[1].trim();

    if gateway.is_empty() {
        return Err(BindingConfigError::Syntax(
            "TED binding must name a gateway before ':'".to_string(),
        ));
    }

    let element_path: Vec<String> = path.split('.').map(str::to_string).collect();
    if path.is_empty() || element_path.iter().any(|e| e.is_empty()) {
        return Err(BindingConfigError::Syntax(format!(
            "TED binding for LiveData XML must contain at least one element with elements separated by '.'. {}",
            path
        )));
    }

    Ok(ItemBinding {
        item_name: item_name.to_string(),
        gateway: gateway.to_string(),
        element_path,
    })
}

#[derive(Debug, Clone)]
struct BindingEntry {
    /// Model file (or other source) the binding was read from
    context: String,
    binding: ItemBinding,
}

/// Binding provider backed by an in-memory binding table
///
/// Bindings are grouped by the context they were read from, so reloading one
/// item file can drop exactly the bindings that file produced.
#[derive(Debug, Default)]
pub struct GenericBindingProvider {
    bindings: RwLock<HashMap<String, BindingEntry>>,
}

impl GenericBindingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binding type this provider parses
    pub fn binding_type(&self) -> &'static str {
        BINDING_TYPE
    }

    /// Validate, parse and store the binding of one item.
    ///
    /// A later binding for the same item replaces the earlier one.
    pub fn process_binding_configuration(
        &self,
        context: &str,
        item: &Item,
        binding_config: &str,
    ) -> Result<(), BindingConfigError> {
        validate_item_type(item)?;
        let binding = parse_binding(&item.name, binding_config)?;

        tracing::debug!(item = %item.name, binding = binding_config, "item binding");

        self.bindings.write().insert(
            item.name.clone(),
            BindingEntry {
                context: context.to_string(),
                binding,
            },
        );
        Ok(())
    }

    /// Drop every binding that was read from `context`
    pub fn remove_configurations(&self, context: &str) {
        self.bindings.write().retain(|_, entry| entry.context != context);
    }

    /// Whether `item_name` has a binding
    pub fn provides_binding_for(&self, item_name: &str) -> bool {
        self.bindings.read().contains_key(item_name)
    }

    /// Full binding of one item
    pub fn binding(&self, item_name: &str) -> Option<ItemBinding> {
        self.bindings.read().get(item_name).map(|e| e.binding.clone())
    }

    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BindingProvider for GenericBindingProvider {
    fn item_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn gateway_for_item(&self, item_name: &str) -> Option<String> {
        self.bindings
            .read()
            .get(item_name)
            .map(|e| e.binding.gateway.clone())
    }

    fn element_path_for_item(&self, item_name: &str) -> Vec<String> {
        self.bindings
            .read()
            .get(item_name)
            .map(|e| e.binding.element_path.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use item_bus::ItemType;
    use rstest::rstest;

    #[test]
    fn test_parse_two_level_path() {
        let binding = parse_binding("Power_Total", "gw1:Power.Total").unwrap();
        assert_eq!(binding.gateway, "gw1");
        assert_eq!(binding.element_path, vec!["Power", "Total"]);
        assert_eq!(binding.item_name, "Power_Total");
    }

    #[test]
    fn test_parse_single_element_path() {
        let binding = parse_binding("Voltage", "main:Voltage").unwrap();
        assert_eq!(binding.element_path, vec!["Voltage"]);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let binding = parse_binding("Power", "  main : Power.MTU1.PowerNow ").unwrap();
        assert_eq!(binding.gateway, "main");
        assert_eq!(binding.element_path, vec!["Power", "MTU1", "PowerNow"]);
    }

    #[rstest]
    #[case("gw1")]
    #[case("gw1:")]
    #[case(":Power.Total")]
    #[case("gw1:Power:Total")]
    #[case("gw1:.")]
    #[case("gw1:Power..Total")]
    #[case("gw1:Power.Total.")]
    #[case("")]
    fn test_malformed_binding_is_syntax_error(#[case] binding_config: &str) {
        assert!(matches!(
            parse_binding("Item", binding_config),
            Err(BindingConfigError::Syntax(_))
        ));
    }

    #[test]
    fn test_syntax_error_names_fragment() {
        let err = parse_binding("Item", "gw1:Power..Total").unwrap_err();
        assert!(err.to_string().contains("Power..Total"));
    }

    #[test]
    fn test_non_number_item_is_rejected() {
        let provider = GenericBindingProvider::new();
        let item = Item::new("Light", ItemType::Switch);

        let err = provider
            .process_binding_configuration("home.items", &item, "gw1:Power.Total")
            .unwrap_err();

        assert_eq!(
            err,
            BindingConfigError::UnsupportedItemType {
                item: "Light".to_string(),
                item_type: ItemType::Switch,
            }
        );
        assert!(err.to_string().contains("Switch"));
        assert!(provider.is_empty());
    }

    #[test]
    fn test_lookup_contract() {
        let provider = GenericBindingProvider::new();
        provider
            .process_binding_configuration("home.items", &Item::number("Power_Total"), "gw1:Power.Total")
            .unwrap();

        assert_eq!(provider.binding_type(), "theenergydetective");
        assert!(provider.provides_binding_for("Power_Total"));
        assert_eq!(provider.gateway_for_item("Power_Total").as_deref(), Some("gw1"));
        assert_eq!(provider.element_path_for_item("Power_Total"), vec!["Power", "Total"]);

        assert_eq!(provider.gateway_for_item("Unknown"), None);
        assert!(provider.element_path_for_item("Unknown").is_empty());
    }

    #[test]
    fn test_redefinition_overwrites() {
        let provider = GenericBindingProvider::new();
        let item = Item::number("Power");
        provider
            .process_binding_configuration("a.items", &item, "gw1:Power.Total")
            .unwrap();
        provider
            .process_binding_configuration("a.items", &item, "gw2:Power.MTU1")
            .unwrap();

        assert_eq!(provider.len(), 1);
        assert_eq!(provider.gateway_for_item("Power").as_deref(), Some("gw2"));
    }

    #[test]
    fn test_failed_redefinition_keeps_previous_binding() {
        let provider = GenericBindingProvider::new();
        let item = Item::number("Power");
        provider
            .process_binding_configuration("a.items", &item, "gw1:Power.Total")
            .unwrap();
        assert!(provider
            .process_binding_configuration("a.items", &item, "broken")
            .is_err());

        assert_eq!(provider.gateway_for_item("Power").as_deref(), Some("gw1"));
    }

    #[test]
    fn test_remove_configurations_by_context() {
        let provider = GenericBindingProvider::new();
        provider
            .process_binding_configuration("a.items", &Item::number("A"), "gw1:Power")
            .unwrap();
        provider
            .process_binding_configuration("b.items", &Item::number("B"), "gw1:Voltage")
            .unwrap();

        provider.remove_configurations("a.items");

        assert_eq!(provider.item_names(), vec!["B"]);
    }
}
