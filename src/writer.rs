use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::config::Settings;
use crate::error::ImportError;
use crate::model::ConvertedRecipe;

/// Longest directory name handed out, leaving room for a `_N` suffix below the
/// usual 255-byte file name limit.
pub const MAX_DIRNAME_BYTES: usize = 200;

/// Turn a recipe title into a directory name: lowercased, whitespace runs replaced by
/// `_`, anything but letters, digits, `_` and `-` dropped, cut to `MAX_DIRNAME_BYTES`
/// on a character boundary.
pub fn safe_dirname(name: &str, fallback: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.trim().to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                result.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_alphanumeric() || c == '_' || c == '-' {
            result.push(c);
        }
    }

    if result.len() > MAX_DIRNAME_BYTES {
        let mut end = MAX_DIRNAME_BYTES;
        while !result.is_char_boundary(end) {
            end -= 1;
        }
        result.truncate(end);
    }

    if result.is_empty() {
        fallback.to_string()
    } else {
        result
    }
}

/// Writes converted recipes into one directory each below an output root.
///
/// Directory names are claimed in order: the first recipe called "Soup" gets `soup`,
/// the next `soup_2`, then `soup_3`. Directories already present on disk are never
/// reused.
pub struct OutputWriter {
    root: PathBuf,
    metadata_file: String,
    image_file: String,
    fallback_name: String,
    claimed: HashSet<String>,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>, settings: &Settings) -> Self {
        Self {
            root: root.into(),
            metadata_file: settings.metadata_file.clone(),
            image_file: settings.image_file.clone(),
            fallback_name: settings.fallback_name.clone(),
            claimed: HashSet::new(),
        }
    }

    /// Write one recipe, returning the directory it was written to.
    ///
    /// On failure nothing is left behind for this recipe.
    pub fn write(&mut self, converted: &ConvertedRecipe) -> Result<PathBuf, ImportError> {
        let dir = self.claim_dir(&converted.recipe.name)?;

        if let Err(e) = self.write_files(&dir, converted) {
            if let Err(cleanup) = fs::remove_dir_all(&dir) {
                warn!("Could not remove partial output {}: {cleanup}", dir.display());
            }
            return Err(e);
        }

        Ok(dir)
    }

    fn claim_dir(&mut self, name: &str) -> Result<PathBuf, ImportError> {
        let base = safe_dirname(name, &self.fallback_name);

        let mut n = 1usize;
        loop {
            let candidate = if n == 1 {
                base.clone()
            } else {
                format!("{base}_{n}")
            };
            n += 1;
            if self.claimed.contains(&candidate) {
                continue;
            }

            let dir = self.root.join(&candidate);
            match fs::create_dir(&dir) {
                Ok(()) => {
                    if n > 2 {
                        debug!("'{name}' already taken, using {candidate}");
                    }
                    self.claimed.insert(candidate);
                    return Ok(dir);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    self.claimed.insert(candidate);
                }
                Err(e) => return Err(ImportError::write(dir, e)),
            }
        }
    }

    fn write_files(&self, dir: &Path, converted: &ConvertedRecipe) -> Result<(), ImportError> {
        let metadata_path = dir.join(&self.metadata_file);
        let file = File::create(&metadata_path)
            .map_err(|e| ImportError::write(&metadata_path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &converted.recipe)
            .map_err(|e| ImportError::write(&metadata_path, e.into()))?;
        writer
            .flush()
            .map_err(|e| ImportError::write(&metadata_path, e))?;

        if let Some(image) = &converted.image {
            let image_path = dir.join(&self.image_file);
            fs::write(&image_path, image).map_err(|e| ImportError::write(&image_path, e))?;
        }

        Ok(())
    }
}
