use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::Settings;
use crate::decoder::decode;
use crate::error::ImportError;
use crate::mapper::{map_recipe, MappingOptions};
use crate::model::RawRecipe;
use crate::source::InputSource;
use crate::writer::OutputWriter;

/// A recipe that could not be converted, and why
#[derive(Debug)]
pub struct RecipeFailure {
    /// File path or archive member name of the recipe
    pub origin: String,
    pub error: ImportError,
}

/// Outcome of a conversion run
#[derive(Debug, Default)]
pub struct ConversionSummary {
    /// Directories written, one per converted recipe, in input order
    pub converted: Vec<PathBuf>,
    /// Recipes that were skipped
    pub failures: Vec<RecipeFailure>,
}

impl ConversionSummary {
    pub fn succeeded(&self) -> usize {
        self.converted.len()
    }

    pub fn skipped(&self) -> usize {
        self.failures.len()
    }

    /// True when recipes were found but none of them could be converted
    pub fn all_failed(&self) -> bool {
        self.converted.is_empty() && !self.failures.is_empty()
    }
}

/// Builder for configuring and executing a conversion
#[derive(Debug, Default)]
pub struct PaprikaImporterBuilder {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    settings: Option<Settings>,
}

impl PaprikaImporterBuilder {
    /// Set the export to read: a `.paprikarecipe` file, a `.paprikarecipes` archive or a
    /// directory of `.paprikarecipe` files
    ///
    /// # Example
    /// ```
    /// use paprika_import::PaprikaImporter;
    ///
    /// let builder = PaprikaImporter::builder()
    ///     .input("My Recipes.paprikarecipes");
    /// ```
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    /// Set the directory that receives one sub-directory per recipe
    ///
    /// The directory is created if it does not exist yet.
    ///
    /// # Example
    /// ```
    /// use paprika_import::PaprikaImporter;
    ///
    /// let builder = PaprikaImporter::builder()
    ///     .input("My Recipes.paprikarecipes")
    ///     .output("cookbook");
    /// ```
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Use these settings instead of the defaults
    ///
    /// # Example
    /// ```
    /// use paprika_import::{PaprikaImporter, Settings};
    ///
    /// let settings = Settings {
    ///     iso_durations: false,
    ///     ..Settings::default()
    /// };
    /// let builder = PaprikaImporter::builder().settings(settings);
    /// ```
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build and execute the conversion
    ///
    /// # Returns
    /// A `ConversionSummary` listing written directories and skipped recipes
    ///
    /// # Errors
    /// Returns `ImportError` if:
    /// - No input or output path was specified
    /// - The input is not a recognised Paprika export
    /// - The output directory cannot be created
    ///
    /// Failures of individual recipes are not errors; they are collected in the summary.
    ///
    /// # Example
    /// ```no_run
    /// # use paprika_import::PaprikaImporter;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let summary = PaprikaImporter::builder()
    ///     .input("My Recipes.paprikarecipes")
    ///     .output("cookbook")
    ///     .build()?;
    /// println!("{} converted", summary.succeeded());
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<ConversionSummary, ImportError> {
        let input = self.input.ok_or_else(|| {
            ImportError::BuilderError("No input specified. Use .input()".to_string())
        })?;
        let output = self.output.ok_or_else(|| {
            ImportError::BuilderError("No output directory specified. Use .output()".to_string())
        })?;
        let settings = self.settings.unwrap_or_default();

        convert(&input, &output, &settings)
    }
}

/// Main entry point for the builder API
pub struct PaprikaImporter;

impl PaprikaImporter {
    /// Creates a new builder for converting an export
    ///
    /// # Example
    /// ```
    /// use paprika_import::PaprikaImporter;
    ///
    /// let builder = PaprikaImporter::builder();
    /// ```
    pub fn builder() -> PaprikaImporterBuilder {
        PaprikaImporterBuilder::default()
    }
}

/// Convert every recipe found at `input` into `output`.
///
/// The input is resolved before anything is written, so an unrecognised input leaves
/// the file system untouched.
pub fn convert(
    input: &Path,
    output: &Path,
    settings: &Settings,
) -> Result<ConversionSummary, ImportError> {
    let source = InputSource::open(input, settings.max_recipe_bytes)?;

    fs::create_dir_all(output).map_err(|e| ImportError::write(output, e))?;
    let mut writer = OutputWriter::new(output, settings);
    let options = MappingOptions::from(settings);

    let mut summary = ConversionSummary::default();
    for raw in source {
        let origin = match &raw {
            Ok(raw) => raw.origin.clone(),
            Err(e) => origin_of(e),
        };

        match raw.and_then(|raw| convert_one(raw, &options, settings, &mut writer)) {
            Ok(dir) => {
                info!("Converted {origin} -> {}", dir.display());
                summary.converted.push(dir);
            }
            Err(error) => {
                warn!("Skipping {origin}: {error}");
                summary.failures.push(RecipeFailure { origin, error });
            }
        }
    }

    if summary.converted.is_empty() && summary.failures.is_empty() {
        warn!("No recipes found in {}", input.display());
    }
    debug!(
        "{} converted, {} skipped",
        summary.succeeded(),
        summary.skipped()
    );
    Ok(summary)
}

fn convert_one(
    raw: RawRecipe,
    options: &MappingOptions,
    settings: &Settings,
    writer: &mut OutputWriter,
) -> Result<PathBuf, ImportError> {
    let recipe = decode(&raw, settings.max_recipe_bytes)?;
    let converted = map_recipe(recipe, &raw.origin, options)?;
    writer.write(&converted)
}

fn origin_of(error: &ImportError) -> String {
    match error {
        ImportError::DecodeError { origin, .. } | ImportError::MappingError { origin, .. } => {
            origin.clone()
        }
        ImportError::WriteError { path, .. } | ImportError::InputFormatError { path, .. } => {
            path.display().to_string()
        }
        _ => "<unknown>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_input() {
        let result = PaprikaImporter::builder().output("out").build();
        assert!(matches!(result, Err(ImportError::BuilderError(_))));
    }

    #[test]
    fn test_builder_requires_output() {
        let result = PaprikaImporter::builder().input("in.paprikarecipe").build();
        assert!(matches!(result, Err(ImportError::BuilderError(_))));
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = ConversionSummary::default();
        assert!(!summary.all_failed());

        summary.failures.push(RecipeFailure {
            origin: "a.paprikarecipe".to_string(),
            error: ImportError::decode("a.paprikarecipe", "bad"),
        });
        assert!(summary.all_failed());

        summary.converted.push(PathBuf::from("out/b"));
        assert!(!summary.all_failed());
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.skipped(), 1);
    }

    #[test]
    fn test_unrecognised_input_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        fs::write(&input, "not a recipe").unwrap();
        let output = dir.path().join("out");

        let err = convert(&input, &output, &Settings::default()).unwrap_err();
        assert!(err.is_fatal());
        assert!(!output.exists());
    }
}
