use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Where a referenced path is looked up from.
///
/// `current_file` is the file holding the directive; its directory is always
/// tried before `include_dirs`, which are tried in order.
#[derive(Debug, Clone, Copy)]
pub struct SearchContext<'a> {
    pub current_file: &'a Path,
    pub include_dirs: &'a [PathBuf],
}

/// An include that was found and opened
#[derive(Debug)]
pub struct ResolvedInclude {
    pub path: PathBuf,
    pub file: File,
}

impl<'a> SearchContext<'a> {
    pub fn new(current_file: &'a Path, include_dirs: &'a [PathBuf]) -> Self {
        Self {
            current_file,
            include_dirs,
        }
    }

    /// Same search directories, new current file
    #[must_use]
    pub fn rebind<'b>(&self, current_file: &'b Path) -> SearchContext<'b>
    where
        'a: 'b,
    {
        SearchContext {
            current_file,
            include_dirs: self.include_dirs,
        }
    }

    /// Candidate paths for a referenced path, in lookup order
    pub fn candidates<'s>(&'s self, include: &'s str) -> impl Iterator<Item = PathBuf> + 's {
        let current_dir = self.current_file.parent().unwrap_or_else(|| Path::new(""));

        std::iter::once(current_dir.join(include))
            .chain(self.include_dirs.iter().map(move |dir| dir.join(include)))
    }

    /// Opens the first candidate that is a readable regular file
    pub fn resolve(&self, include: &str) -> Option<ResolvedInclude> {
        self.candidates(include).find_map(|path| match open_regular_file(&path) {
            Ok(file) => Some(ResolvedInclude { path, file }),
            Err(e) => {
                trace!("Skipping candidate {}: {e}", path.display());
                None
            }
        })
    }
}

/// Opens a path for reading, refusing anything that isn't a regular file
///
/// # Errors
///
/// Returns the open error, or `InvalidInput` if the path is a directory or
/// other non-file object.
pub fn open_regular_file(path: &Path) -> io::Result<File> {
    let file = File::open(path)?;

    if !file.metadata()?.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        ));
    }

    Ok(file)
}
