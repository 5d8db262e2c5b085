//! Editor configuration
//!
//! Names of the anchors the mutations look for. The defaults match a Vite
//! project scaffolded with React or Vue.

use crate::EditorError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorOptions {
    /// Identifier of the configuration-factory call (`defineConfig(...)`)
    pub config_factory: String,
    pub plugins_key: String,
    pub resolve_key: String,
    pub alias_key: String,
    /// Member names accepted as the render call for JSX wrapping
    pub render_methods: Vec<String>,
    /// Slot holding the application entry point
    pub bootstrap_slot: String,
    pub default_script_lang: String,
    pub default_style_lang: String,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            config_factory: "defineConfig".to_string(),
            plugins_key: "plugins".to_string(),
            resolve_key: "resolve".to_string(),
            alias_key: "alias".to_string(),
            render_methods: vec!["render".to_string()],
            bootstrap_slot: "bootstrap".to_string(),
            default_script_lang: "js".to_string(),
            default_style_lang: "css".to_string(),
        }
    }
}

impl EditorOptions {
    /// Parse options from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_fills_defaults() {
        let options =
            EditorOptions::from_json(r#"{ "configFactory": "defineNuxtConfig", "renderMethods": ["render", "hydrate"] }"#)
                .unwrap();
        assert_eq!(options.config_factory, "defineNuxtConfig");
        assert_eq!(options.render_methods, vec!["render", "hydrate"]);
        assert_eq!(options.plugins_key, "plugins");
        assert_eq!(options.bootstrap_slot, "bootstrap");
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        let err = EditorOptions::from_json("{ configFactory: 1 }").unwrap_err();
        assert!(matches!(err, EditorError::Options(_)));
    }
}
