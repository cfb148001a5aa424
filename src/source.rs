//! Input resolution: turns a path into a lazy sequence of compressed recipes.
//!
//! Three layouts are recognised by content, not by extension:
//! - a single `.paprikarecipe` file (gzip stream),
//! - a `.paprikarecipes` bulk export (zip archive of `.paprikarecipe` members),
//! - a directory of loose `.paprikarecipe` files.

use std::fs::{self, File};
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use std::vec;

use log::{debug, warn};
use zip::ZipArchive;

use crate::error::ImportError;
use crate::model::RawRecipe;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZIP_LOCAL_HEADER: [u8; 4] = *b"PK\x03\x04";
const ZIP_EMPTY_ARCHIVE: [u8; 4] = *b"PK\x05\x06";

pub const RECIPE_EXTENSION: &str = ".paprikarecipe";

/// Whether a file or archive member name looks like a single Paprika recipe
pub fn is_recipe_name(name: &str) -> bool {
    name.to_lowercase().ends_with(RECIPE_EXTENSION)
}

/// Lazy sequence of compressed recipes read from one input path.
///
/// The sequence is finite and cannot be restarted once exhausted. Errors for a single
/// recipe are yielded in place and iteration continues with the next one.
pub enum InputSource {
    File(SingleFileSource),
    Directory(DirectorySource),
    Archive(ArchiveSource<BufReader<File>>),
}

impl InputSource {
    /// Inspect `path` and open the matching source.
    ///
    /// Fails with `InputFormatError` when the path does not exist, cannot be read, or is
    /// a file that is neither a gzip stream nor a zip archive.
    pub fn open(path: &Path, max_bytes: u64) -> Result<Self, ImportError> {
        let metadata =
            fs::metadata(path).map_err(|e| ImportError::input_format(path, e))?;

        if metadata.is_dir() {
            return DirectorySource::open(path, max_bytes).map(InputSource::Directory);
        }

        let mut file = File::open(path).map_err(|e| ImportError::input_format(path, e))?;
        let mut magic = [0u8; 4];
        let read = read_prefix(&mut file, &mut magic)
            .map_err(|e| ImportError::input_format(path, e))?;
        let magic = &magic[..read];

        if magic.starts_with(&GZIP_MAGIC) {
            debug!("{}: single recipe", path.display());
            Ok(InputSource::File(SingleFileSource::new(path, max_bytes)))
        } else if magic == ZIP_LOCAL_HEADER || magic == ZIP_EMPTY_ARCHIVE {
            debug!("{}: bulk export archive", path.display());
            file.rewind().map_err(|e| ImportError::input_format(path, e))?;
            ArchiveSource::new(BufReader::new(file), max_bytes)
                .map(InputSource::Archive)
                .map_err(|e| ImportError::input_format(path, e))
        } else {
            Err(ImportError::input_format(
                path,
                "not a gzip-compressed recipe, a zip archive or a directory",
            ))
        }
    }
}

impl Iterator for InputSource {
    type Item = Result<RawRecipe, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            InputSource::File(source) => source.next(),
            InputSource::Directory(source) => source.next(),
            InputSource::Archive(source) => source.next(),
        }
    }
}

/// Fill `buf` as far as the reader allows, returning the number of bytes read
fn read_prefix(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Read at most `max_bytes` from `reader`; a longer stream is rejected, not truncated
fn read_bounded(
    reader: impl Read,
    max_bytes: u64,
    origin: &str,
) -> Result<Vec<u8>, ImportError> {
    let mut bytes = Vec::new();
    reader
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|e| ImportError::decode(origin, e))?;
    if bytes.len() as u64 > max_bytes {
        return Err(ImportError::decode(
            origin,
            format!("recipe exceeds {max_bytes} bytes"),
        ));
    }
    Ok(bytes)
}

fn read_file(path: &Path, max_bytes: u64) -> Result<RawRecipe, ImportError> {
    let origin = path.display().to_string();
    let file = File::open(path).map_err(|e| ImportError::decode(&origin, e))?;
    let bytes = read_bounded(file, max_bytes, &origin)?;

    Ok(RawRecipe { origin, bytes })
}

/// One `.paprikarecipe` file, yielded exactly once
pub struct SingleFileSource {
    path: Option<PathBuf>,
    max_bytes: u64,
}

impl SingleFileSource {
    pub fn new(path: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            path: Some(path.into()),
            max_bytes,
        }
    }
}

impl Iterator for SingleFileSource {
    type Item = Result<RawRecipe, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.path.take()?;
        Some(read_file(&path, self.max_bytes))
    }
}

/// Every `.paprikarecipe` file directly inside a directory, in file name order
pub struct DirectorySource {
    files: vec::IntoIter<PathBuf>,
    max_bytes: u64,
}

impl DirectorySource {
    pub fn open(dir: &Path, max_bytes: u64) -> Result<Self, ImportError> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| ImportError::input_format(dir, e))? {
            let entry = entry.map_err(|e| ImportError::input_format(dir, e))?;
            let path = entry.path();
            let name = entry.file_name();
            if path.is_file() && is_recipe_name(&name.to_string_lossy()) {
                files.push(path);
            } else {
                debug!("Skipping {}", path.display());
            }
        }
        files.sort();
        debug!("{}: {} recipe file(s)", dir.display(), files.len());

        Ok(Self {
            files: files.into_iter(),
            max_bytes,
        })
    }
}

impl Iterator for DirectorySource {
    type Item = Result<RawRecipe, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.next()?;
        Some(read_file(&path, self.max_bytes))
    }
}

/// Members of a `.paprikarecipes` bulk export, read one at a time in archive order
pub struct ArchiveSource<R> {
    archive: ZipArchive<R>,
    index: usize,
    max_bytes: u64,
}

impl<R: Read + Seek> ArchiveSource<R> {
    pub fn new(reader: R, max_bytes: u64) -> zip::result::ZipResult<Self> {
        Ok(Self {
            archive: ZipArchive::new(reader)?,
            index: 0,
            max_bytes,
        })
    }

    /// Number of members in the archive, recipes or not
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    fn read_member(&mut self, index: usize) -> Option<Result<RawRecipe, ImportError>> {
        // filter on the raw entry first: members we skip may use methods we cannot inflate
        let origin = match self.archive.by_index_raw(index) {
            Ok(member) => {
                let origin = member.name().to_string();
                if member.is_dir() || !is_recipe_name(&origin) {
                    debug!("Skipping archive member {origin}");
                    return None;
                }
                if member.size() > self.max_bytes {
                    warn!("{origin}: {} bytes, over the limit", member.size());
                    return Some(Err(ImportError::decode(
                        origin,
                        format!("recipe exceeds {} bytes", self.max_bytes),
                    )));
                }
                origin
            }
            Err(e) => {
                let origin = format!("archive member #{index}");
                return Some(Err(ImportError::decode(origin, e)));
            }
        };

        let member = match self.archive.by_index(index) {
            Ok(member) => member,
            Err(e) => return Some(Err(ImportError::decode(origin, e))),
        };
        // the declared size is only a hint, the stream itself is bounded
        let bytes = read_bounded(member, self.max_bytes, &origin);
        Some(bytes.map(|bytes| RawRecipe { origin, bytes }))
    }
}

impl<R: Read + Seek> Iterator for ArchiveSource<R> {
    type Item = Result<RawRecipe, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.archive.len() {
            let index = self.index;
            self.index += 1;
            if let Some(item) = self.read_member(index) {
                return Some(item);
            }
        }
        None
    }
}
