//! JSON Schema for `toolsets.json`, for editor completion and validation.

use crate::types::ToolsetsConfig;
use schemars::{Schema, generate::SchemaSettings};

/// Generate the JSON Schema for [`ToolsetsConfig`].
pub fn schema() -> Schema {
    SchemaSettings::default()
        .into_generator()
        .into_root_schema_for::<ToolsetsConfig>()
}

/// Generate the JSON Schema as a pretty-printed JSON string.
pub fn schema_json_pretty() -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&schema())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> jsonschema::Validator {
        jsonschema::validator_for(&serde_json::to_value(schema()).unwrap()).unwrap()
    }

    #[test]
    fn schema_lists_top_level_keys() {
        let v = serde_json::to_value(schema()).unwrap();
        let props = v["properties"].as_object().unwrap();
        for key in ["toolsets", "read_only", "dynamic_toolsets", "logging", "server"] {
            assert!(props.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn default_config_validates_against_schema() {
        let config_json = serde_json::to_value(ToolsetsConfig::default()).unwrap();
        let result = validator().validate(&config_json);
        assert!(
            result.is_ok(),
            "Default config should validate against schema: {:?}",
            result.err()
        );
    }

    #[test]
    fn partial_config_validates_against_schema() {
        let config_json = serde_json::json!({
            "$schema": "./toolsets.schema.json",
            "toolsets": ["repos", "issues"],
            "logging": { "level": "debug" }
        });
        assert!(validator().validate(&config_json).is_ok());
    }

    #[test]
    fn wrong_type_is_rejected() {
        let config_json = serde_json::json!({ "toolsets": "repos" });
        assert!(validator().validate(&config_json).is_err());
    }
}
