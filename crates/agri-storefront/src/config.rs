//! Storefront configuration.
//!
//! Every field has a default matching the stock AgriConnect pages, so an
//! empty document (or no document at all) is a valid configuration.

use std::time::Duration;

use agri_commerce::cart::DEFAULT_MAX_QUANTITY;
use agri_observability::{LogFormat, LogLevel, SessionId, StructuredLogger};
use serde::{Deserialize, Serialize};

use crate::dom::{Document, ViewportOptions};
use crate::error::{Result, StorefrontError};

/// Id of the optional inline JSON config block.
pub const CONFIG_ELEMENT_ID: &str = "storefront-config";

/// Storefront configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Prefix for relative endpoint paths. Same-origin when unset.
    pub base_url: Option<String>,

    pub endpoints: EndpointConfig,
    pub timing: TimingConfig,
    pub stepper: StepperConfig,
    pub reveal: RevealConfig,
    pub logging: LoggingConfig,
}

impl StorefrontConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Parse a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from a file; `.json` files are read as JSON, anything else as TOML.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| StorefrontError::ConfigRead {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        if path.ends_with(".json") {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Read the page's `<script id="storefront-config">` block, or the
    /// defaults when the page has none.
    pub fn from_document<D: Document>(doc: &D) -> Result<Self> {
        let Some(node) = doc.by_id(CONFIG_ELEMENT_ID) else {
            return Ok(Self::default());
        };
        let content = doc.text(&node);
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Self::from_json_str(&content)
    }

    /// Like [`from_document`](Self::from_document), but a malformed block
    /// yields the defaults. The parse error is handed back for logging; the
    /// page still boots.
    pub fn from_document_or_default<D: Document>(doc: &D) -> (Self, Option<StorefrontError>) {
        match Self::from_document(doc) {
            Ok(config) => (config, None),
            Err(error) => (Self::default(), Some(error)),
        }
    }

    /// A logger for the page with this config's level and format.
    pub fn logger(&self, session_id: SessionId) -> StructuredLogger {
        StructuredLogger::new(session_id)
            .with_min_level(self.logging.level)
            .with_format(self.logging.format)
    }
}

/// Backend paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub add_to_cart: String,
    pub update_cart_item: String,
    pub toggle_selection: String,
    pub send_offer: String,
    pub cart_count: String,
    /// Prefix; `/<offer id>/<action>` is appended.
    pub respond_to_offer: String,
    /// Prefix; `/<product id>` is appended.
    pub delete_product: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            add_to_cart: "/add_to_cart".to_string(),
            update_cart_item: "/update_cart_item".to_string(),
            toggle_selection: "/toggle_cart_item_selection".to_string(),
            send_offer: "/send_offer".to_string(),
            cart_count: "/api/cart_count".to_string(),
            respond_to_offer: "/respond_to_offer".to_string(),
            delete_product: "/farmer/delete_product".to_string(),
        }
    }
}

/// Delays, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Notification lifetime.
    pub notification_ms: u64,
    /// How long an add-to-cart button shows "Added!".
    pub added_flash_ms: u64,
    /// How long a newly selected row stays highlighted.
    pub selection_highlight_ms: u64,
}

impl TimingConfig {
    pub fn notification(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }

    pub fn added_flash(&self) -> Duration {
        Duration::from_millis(self.added_flash_ms)
    }

    pub fn selection_highlight(&self) -> Duration {
        Duration::from_millis(self.selection_highlight_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            notification_ms: 5000,
            added_flash_ms: 2000,
            selection_highlight_ms: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepperConfig {
    /// Upper bound for fields without a `max` attribute.
    pub default_max: i64,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            default_max: DEFAULT_MAX_QUANTITY,
        }
    }
}

/// Entrance animation and lazy image settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub selector: String,
    pub marker_class: String,
    pub threshold: f64,
    pub root_margin: String,
    pub lazy_images: bool,
}

impl RevealConfig {
    pub fn viewport(&self) -> ViewportOptions {
        ViewportOptions {
            threshold: self.threshold,
            root_margin: self.root_margin.clone(),
        }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            selector: ".fade-in, .slide-up".to_string(),
            marker_class: "animate".to_string(),
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".to_string(),
            lazy_images: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;

    // === Defaults ===

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::default();
        assert_eq!(config.endpoints.add_to_cart, "/add_to_cart");
        assert_eq!(config.endpoints.cart_count, "/api/cart_count");
        assert_eq!(config.timing.notification(), Duration::from_secs(5));
        assert_eq!(config.timing.added_flash(), Duration::from_secs(2));
        assert_eq!(config.stepper.default_max, 999);
        assert_eq!(config.reveal.marker_class, "animate");
        assert!(config.base_url.is_none());
    }

    // === Parsing ===

    #[test]
    fn test_toml_partial_override() {
        let config = StorefrontConfig::from_toml_str(
            r#"
            base_url = "https://shop.example"

            [timing]
            notification_ms = 8000

            [logging]
            level = "debug"
            format = "human"
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url.as_deref(), Some("https://shop.example"));
        assert_eq!(config.timing.notification_ms, 8000);
        assert_eq!(config.timing.added_flash_ms, 2000);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Human);
        assert_eq!(config.endpoints, EndpointConfig::default());
    }

    #[test]
    fn test_json_override() {
        let config = StorefrontConfig::from_json_str(
            r#"{"endpoints": {"send_offer": "/offers"}, "stepper": {"default_max": 50}}"#,
        )
        .unwrap();
        assert_eq!(config.endpoints.send_offer, "/offers");
        assert_eq!(config.endpoints.add_to_cart, "/add_to_cart");
        assert_eq!(config.stepper.default_max, 50);
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            StorefrontConfig::from_toml_str("timing = 3"),
            Err(StorefrontError::ConfigToml(_))
        ));
        assert!(matches!(
            StorefrontConfig::from_json_str("{"),
            Err(StorefrontError::ConfigJson(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = StorefrontConfig::load("/nonexistent/storefront.toml").unwrap_err();
        assert!(matches!(err, StorefrontError::ConfigRead { .. }));
    }

    // === Page ===

    #[test]
    fn test_from_document() {
        let doc = MemoryDocument::parse(
            r#"<body><script id="storefront-config" type="application/json">
                {"timing": {"selection_highlight_ms": 100}}
            </script></body>"#,
        );
        let config = StorefrontConfig::from_document(&doc).unwrap();
        assert_eq!(config.timing.selection_highlight_ms, 100);
    }

    #[test]
    fn test_from_document_without_block() {
        let doc = MemoryDocument::parse("<body><p>hi</p></body>");
        assert_eq!(
            StorefrontConfig::from_document(&doc).unwrap(),
            StorefrontConfig::default()
        );
    }

    #[test]
    fn test_malformed_block_falls_back_to_defaults() {
        let doc = MemoryDocument::parse(
            r#"<body><script id="storefront-config" type="application/json">
                {"timing": {"selection_highlight_ms":
            </script></body>"#,
        );
        assert!(StorefrontConfig::from_document(&doc).is_err());

        let (config, error) = StorefrontConfig::from_document_or_default(&doc);
        assert_eq!(config, StorefrontConfig::default());
        assert!(matches!(error, Some(StorefrontError::ConfigJson(_))));
    }
}
