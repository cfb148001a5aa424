use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One recipe as found inside a Paprika export, before decompression
#[derive(Debug, Clone)]
pub struct RawRecipe {
    /// Where the bytes came from: a file path or an archive member name
    pub origin: String,
    /// Gzip-compressed JSON document
    pub bytes: Vec<u8>,
}

/// A decoded Paprika recipe.
///
/// Paprika writes most values as strings, but older exports and hand-edited files are
/// not consistent about it. Every field is read leniently: a value of an unexpected JSON
/// type is treated as absent instead of failing the whole recipe.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PaprikaRecipe {
    #[serde(deserialize_with = "lenient::text")]
    pub uid: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::lines")]
    pub ingredients: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::lines")]
    pub directions: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub notes: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub nutritional_info: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub servings: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub difficulty: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub prep_time: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub cook_time: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub total_time: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub source: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub source_url: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub image_url: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub photo_data: Option<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub categories: Vec<String>,
    #[serde(deserialize_with = "lenient::rating")]
    pub rating: Option<u8>,
    #[serde(deserialize_with = "lenient::text")]
    pub created: Option<String>,
}

/// A recipe in the schema.org layout read by Nextcloud Cookbook
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NextcloudRecipe {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@type")]
    pub kind: String,
    pub name: String,
    pub image: String,
    #[serde(rename = "recipeIngredient")]
    pub recipe_ingredient: Vec<String>,
    #[serde(rename = "recipeInstructions")]
    pub recipe_instructions: Vec<String>,
    pub description: String,
    #[serde(rename = "cookTime")]
    pub cook_time: String,
    #[serde(rename = "prepTime")]
    pub prep_time: String,
    #[serde(rename = "totalTime")]
    pub total_time: String,
    #[serde(rename = "recipeYield")]
    pub recipe_yield: String,
    #[serde(rename = "aggregateRating")]
    pub aggregate_rating: AggregateRating,
    pub author: String,
    pub url: String,
    pub notes: String,
    pub difficulty: String,
    #[serde(rename = "nutritionalInfo")]
    pub nutritional_info: String,
    pub category: Vec<String>,
    #[serde(rename = "recipeCategory")]
    pub recipe_category: String,
    pub keywords: String,
    #[serde(rename = "dateCreated")]
    pub date_created: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregateRating {
    #[serde(rename = "@type")]
    pub kind: String,
    #[serde(rename = "ratingValue")]
    pub rating_value: u8,
    #[serde(rename = "ratingCount")]
    pub rating_count: u32,
}

impl AggregateRating {
    pub fn single(rating: u8) -> Self {
        AggregateRating {
            kind: "AggregateRating".to_string(),
            rating_value: rating,
            rating_count: 1,
        }
    }
}

/// A mapped recipe ready to be written, with its decoded photo if it had one
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedRecipe {
    pub recipe: NextcloudRecipe,
    pub image: Option<Vec<u8>>,
}

mod lenient {
    use super::*;

    fn scalar(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(scalar(Value::deserialize(deserializer)?))
    }

    /// A newline-delimited string, or a list whose elements are taken as lines
    pub fn lines<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s.split('\n').map(String::from).collect()),
            Value::Array(items) => Some(items.into_iter().filter_map(scalar).collect()),
            _ => None,
        })
    }

    pub fn strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items.into_iter().filter_map(scalar).collect(),
            Value::String(s) if !s.trim().is_empty() => vec![s],
            _ => Vec::new(),
        })
    }

    pub fn rating<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rating = match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(rating
            .filter(|r| r.is_finite())
            .map(|r| r.round().clamp(0.0, 5.0) as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_paprika_export() {
        let recipe: PaprikaRecipe = serde_json::from_value(json!({
            "uid": "5A1B",
            "name": "Soup",
            "ingredients": "Water\nSalt",
            "directions": "Boil.",
            "servings": "2",
            "categories": ["Dinner", "Quick"],
            "rating": 4,
            "photo_hash": "ignored",
            "hash": "ignored too"
        }))
        .unwrap();

        assert_eq!(recipe.name.as_deref(), Some("Soup"));
        assert_eq!(
            recipe.ingredients,
            Some(vec!["Water".to_string(), "Salt".to_string()])
        );
        assert_eq!(recipe.categories, vec!["Dinner", "Quick"]);
        assert_eq!(recipe.rating, Some(4));
        assert_eq!(recipe.description, None);
    }

    #[test]
    fn test_unexpected_types_are_treated_as_absent() {
        let recipe: PaprikaRecipe = serde_json::from_value(json!({
            "name": "Stew",
            "ingredients": 12,
            "description": {"text": "nested"},
            "servings": 4,
            "categories": ["Dinner", null, 3],
            "rating": "five"
        }))
        .unwrap();

        assert_eq!(recipe.ingredients, None);
        assert_eq!(recipe.description, None);
        assert_eq!(recipe.servings.as_deref(), Some("4"));
        assert_eq!(recipe.categories, vec!["Dinner", "3"]);
        assert_eq!(recipe.rating, None);
    }

    #[test]
    fn test_ingredient_list_is_accepted() {
        let recipe: PaprikaRecipe = serde_json::from_value(json!({
            "name": "Soup",
            "ingredients": ["Water", "Salt"]
        }))
        .unwrap();

        assert_eq!(
            recipe.ingredients,
            Some(vec!["Water".to_string(), "Salt".to_string()])
        );
    }

    #[test]
    fn test_rating_is_clamped() {
        let recipe: PaprikaRecipe =
            serde_json::from_value(json!({ "name": "x", "rating": 9 })).unwrap();
        assert_eq!(recipe.rating, Some(5));

        let recipe: PaprikaRecipe =
            serde_json::from_value(json!({ "name": "x", "rating": "3" })).unwrap();
        assert_eq!(recipe.rating, Some(3));
    }

    #[test]
    fn test_nextcloud_field_names() {
        let recipe = NextcloudRecipe {
            context: "https://schema.org/".to_string(),
            kind: "Recipe".to_string(),
            name: "Soup".to_string(),
            image: String::new(),
            recipe_ingredient: vec!["Water".to_string()],
            recipe_instructions: vec![],
            description: String::new(),
            cook_time: String::new(),
            prep_time: String::new(),
            total_time: String::new(),
            recipe_yield: String::new(),
            aggregate_rating: AggregateRating::single(0),
            author: String::new(),
            url: String::new(),
            notes: String::new(),
            difficulty: String::new(),
            nutritional_info: String::new(),
            category: vec![],
            recipe_category: String::new(),
            keywords: String::new(),
            date_created: String::new(),
        };

        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(value["@context"], "https://schema.org/");
        assert_eq!(value["@type"], "Recipe");
        assert_eq!(value["recipeIngredient"], json!(["Water"]));
        assert_eq!(value["aggregateRating"]["@type"], "AggregateRating");
        assert_eq!(value["aggregateRating"]["ratingCount"], 1);
    }
}
