use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Converter settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Name of the metadata document written into each recipe directory
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,
    /// Name of the decoded photo written next to the metadata document
    #[serde(default = "default_image_file")]
    pub image_file: String,
    /// Directory name used when a recipe name sanitizes to nothing
    #[serde(default = "default_fallback_name")]
    pub fallback_name: String,
    /// Upper bound for a single recipe, compressed or decompressed, in bytes
    #[serde(default = "default_max_recipe_bytes")]
    pub max_recipe_bytes: u64,
    /// Decode HTML entities (`&amp;`, `&#39;`) found in text fields
    #[serde(default = "default_true")]
    pub decode_entities: bool,
    /// Rewrite free-text times ("1 hr 30 mins") as ISO 8601 durations
    #[serde(default = "default_true")]
    pub iso_durations: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            metadata_file: default_metadata_file(),
            image_file: default_image_file(),
            fallback_name: default_fallback_name(),
            max_recipe_bytes: default_max_recipe_bytes(),
            decode_entities: true,
            iso_durations: true,
        }
    }
}

// Default value functions
fn default_metadata_file() -> String {
    "recipe.json".to_string()
}

fn default_image_file() -> String {
    "full.jpg".to_string()
}

fn default_fallback_name() -> String {
    "unnamed_recipe".to_string()
}

fn default_max_recipe_bytes() -> u64 {
    100_000_000
}

fn default_true() -> bool {
    true
}

impl Settings {
    /// Load settings from file and environment variables
    ///
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables with PAPRIKA__ prefix
    /// 2. The given config file, or paprika-import.toml in the current directory
    /// 3. Default values
    ///
    /// An explicitly given file must exist; the implicit one may be missing.
    ///
    /// Environment variable format: PAPRIKA__MAX_RECIPE_BYTES
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("paprika-import").required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("PAPRIKA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
