use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use html_escape::decode_html_entities;
use log::{debug, warn};

use crate::config::Settings;
use crate::duration;
use crate::error::ImportError;
use crate::model::{AggregateRating, ConvertedRecipe, NextcloudRecipe, PaprikaRecipe};

const SCHEMA_CONTEXT: &str = "https://schema.org/";
const SCHEMA_TYPE: &str = "Recipe";

/// Options that change how Paprika values are rewritten
#[derive(Debug, Clone)]
pub struct MappingOptions {
    pub decode_entities: bool,
    pub iso_durations: bool,
    pub image_file: String,
}

impl Default for MappingOptions {
    fn default() -> Self {
        MappingOptions::from(&Settings::default())
    }
}

impl From<&Settings> for MappingOptions {
    fn from(settings: &Settings) -> Self {
        MappingOptions {
            decode_entities: settings.decode_entities,
            iso_durations: settings.iso_durations,
            image_file: settings.image_file.clone(),
        }
    }
}

impl MappingOptions {
    fn text(&self, value: Option<String>) -> String {
        let value = value.unwrap_or_default();
        if self.decode_entities {
            decode_html_entities(value.trim()).into_owned()
        } else {
            value.trim().to_string()
        }
    }

    fn lines(&self, value: Option<Vec<String>>) -> Vec<String> {
        value
            .unwrap_or_default()
            .into_iter()
            .flat_map(|entry| {
                entry
                    .split('\n')
                    .map(|line| self.text(Some(line.to_string())))
                    .collect::<Vec<_>>()
            })
            .filter(|line| !line.is_empty())
            .collect()
    }

    fn time(&self, value: Option<String>) -> String {
        let text = self.text(value);
        if !self.iso_durations {
            return text;
        }
        match duration::to_iso8601(&text) {
            Some(iso) => iso,
            None => {
                if !text.is_empty() {
                    debug!("Keeping unparsed time {text:?}");
                }
                text
            }
        }
    }
}

/// Map a decoded Paprika recipe onto the Nextcloud Cookbook layout.
///
/// `origin` only labels diagnostics. A recipe without a usable name is rejected; every
/// other missing field becomes an empty value.
pub fn map_recipe(
    source: PaprikaRecipe,
    origin: &str,
    options: &MappingOptions,
) -> Result<ConvertedRecipe, ImportError> {
    let name = options.text(source.name);
    if name.is_empty() {
        return Err(ImportError::mapping(origin, "recipe has no name"));
    }

    let image_url = options.text(source.image_url);
    let photo = source
        .photo_data
        .filter(|data| !data.trim().is_empty())
        .and_then(|data| match decode_photo(&data) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Dropping photo of '{name}' ({origin}): {e}");
                None
            }
        });
    let image = if photo.is_some() {
        options.image_file.clone()
    } else {
        image_url
    };

    let categories: Vec<String> = source
        .categories
        .into_iter()
        .map(|c| options.text(Some(c)))
        .filter(|c| !c.is_empty())
        .collect();

    let recipe = NextcloudRecipe {
        context: SCHEMA_CONTEXT.to_string(),
        kind: SCHEMA_TYPE.to_string(),
        image,
        recipe_ingredient: options.lines(source.ingredients),
        recipe_instructions: options.lines(source.directions),
        description: options.text(source.description),
        cook_time: options.time(source.cook_time),
        prep_time: options.time(source.prep_time),
        total_time: options.time(source.total_time),
        recipe_yield: options.text(source.servings),
        aggregate_rating: AggregateRating::single(source.rating.unwrap_or(0)),
        author: options.text(source.source),
        url: options.text(source.source_url),
        notes: options.text(source.notes),
        difficulty: options.text(source.difficulty),
        nutritional_info: options.text(source.nutritional_info),
        recipe_category: categories.first().cloned().unwrap_or_default(),
        keywords: categories.join(","),
        category: categories,
        date_created: options.text(source.created),
        name,
    };

    Ok(ConvertedRecipe {
        recipe,
        image: photo,
    })
}

fn decode_photo(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    // exports wrap long base64 payloads
    let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact)
}
