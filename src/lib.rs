//! Convert Paprika recipe exports into Nextcloud Cookbook recipe folders.
//!
//! A Paprika export is either a single `.paprikarecipe` file (gzip-compressed JSON) or a
//! `.paprikarecipes` bulk export (a zip archive of such files). Each recipe becomes a
//! directory holding a schema.org `recipe.json` and, when the export embeds a photo,
//! `full.jpg`.
//!
//! ```no_run
//! use paprika_import::PaprikaImporter;
//!
//! let summary = PaprikaImporter::builder()
//!     .input("My Recipes.paprikarecipes")
//!     .output("cookbook")
//!     .build()?;
//! println!("{} converted, {} skipped", summary.succeeded(), summary.skipped());
//! # Ok::<(), paprika_import::ImportError>(())
//! ```

pub mod builder;
pub mod config;
pub mod decoder;
pub mod duration;
pub mod error;
pub mod mapper;
pub mod model;
pub mod source;
pub mod writer;

pub use builder::{
    convert, ConversionSummary, PaprikaImporter, PaprikaImporterBuilder, RecipeFailure,
};
pub use config::Settings;
pub use error::ImportError;
pub use mapper::{map_recipe, MappingOptions};
pub use model::{ConvertedRecipe, NextcloudRecipe, PaprikaRecipe, RawRecipe};
pub use source::InputSource;
pub use writer::OutputWriter;
