use crate::directive::{Directive, DirectiveClassifier, next_line};
use crate::error::{FlatincError, Result};
use crate::resolve::{SearchContext, open_regular_file};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Configuration for include expansion
#[derive(Debug, Clone, Default)]
pub struct ExpandConfig {
    /// Fallback directories, searched in order after the including file's directory
    pub include_dirs: Vec<PathBuf>,
    /// Maximum include nesting depth (root file is depth 0). `None` means unbounded.
    pub max_depth: Option<usize>,
}

impl ExpandConfig {
    pub fn new(include_dirs: Vec<PathBuf>) -> Self {
        Self {
            include_dirs,
            max_depth: None,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Recursively replaces include directives with the expanded contents of
/// the files they name.
///
/// Output is written depth-first into a single writer: the lines of an
/// included file appear exactly where its directive stood. The first
/// include that cannot be resolved aborts the whole expansion; whatever was
/// written before that point stays written.
#[derive(Debug, Clone)]
pub struct Expander {
    classifier: DirectiveClassifier,
    config: ExpandConfig,
}

impl Expander {
    /// # Errors
    ///
    /// Returns `FlatincError::Regex` if the directive patterns fail to compile.
    pub fn new(config: ExpandConfig) -> Result<Self> {
        Ok(Self {
            classifier: DirectiveClassifier::new()?,
            config,
        })
    }

    pub fn config(&self) -> &ExpandConfig {
        &self.config
    }

    /// Expands `input`, treating it as the contents of `current_file`.
    ///
    /// # Errors
    ///
    /// - `FlatincError::UnresolvedInclude` if a directive, at any depth, names
    ///   a path found neither next to its file nor in any include directory.
    /// - `FlatincError::DepthExceeded` if nesting goes past `max_depth`.
    /// - `FlatincError::Io` on read or write failures.
    pub fn expand<R, W>(&self, input: R, output: &mut W, current_file: &Path) -> Result<()>
    where
        R: BufRead,
        W: Write + ?Sized,
    {
        let ctx = SearchContext::new(current_file, &self.config.include_dirs);
        self.expand_stream(input, output, ctx, 0)
    }

    fn expand_stream<R, W>(
        &self,
        mut input: R,
        output: &mut W,
        ctx: SearchContext<'_>,
        depth: usize,
    ) -> Result<()>
    where
        R: BufRead,
        W: Write + ?Sized,
    {
        let mut buf = Vec::new();
        let mut line_number = 0;

        while let Some(line) = next_line(&mut input, &mut buf)? {
            line_number += 1;

            match self.classifier.classify(line) {
                Some(directive) => {
                    self.expand_directive(&directive, line_number, output, ctx, depth)?;
                }
                None => {
                    output.write_all(line)?;
                    output.write_all(b"\n")?;
                }
            }
        }

        Ok(())
    }

    fn expand_directive<W>(
        &self,
        directive: &Directive,
        line: usize,
        output: &mut W,
        ctx: SearchContext<'_>,
        depth: usize,
    ) -> Result<()>
    where
        W: Write + ?Sized,
    {
        let Some(resolved) = ctx.resolve(&directive.path) else {
            warn!(
                "unknown include file {} at file {} at line {}",
                directive.path,
                ctx.current_file.display(),
                line
            );
            return Err(FlatincError::UnresolvedInclude {
                include: directive.path.clone(),
                kind: directive.kind,
                file: ctx.current_file.to_path_buf(),
                line,
            });
        };

        if let Some(limit) = self.config.max_depth
            && depth >= limit
        {
            warn!(
                "include depth limit {limit} reached at file {} at line {line}",
                ctx.current_file.display()
            );
            return Err(FlatincError::DepthExceeded {
                file: ctx.current_file.to_path_buf(),
                line,
                limit,
            });
        }

        debug!(
            "Including {} ({} include) from {}:{line} as {}",
            directive.path,
            directive.kind,
            ctx.current_file.display(),
            resolved.path.display()
        );

        let nested = ctx.rebind(&resolved.path);
        self.expand_stream(BufReader::new(resolved.file), output, nested, depth + 1)
    }

    /// Expands the file at `root` into `output`
    ///
    /// # Errors
    ///
    /// - `FlatincError::OpenInput` if `root` cannot be opened for reading.
    /// - Any error from [`Expander::expand`].
    pub fn expand_file<W>(&self, root: &Path, output: &mut W) -> Result<()>
    where
        W: Write + ?Sized,
    {
        let input = open_input(root)?;
        self.expand(input, output, root)
    }

    /// Expands the file at `root` and collects the result
    ///
    /// # Errors
    ///
    /// Same as [`Expander::expand_file`], plus `FlatincError::Io` with
    /// `InvalidData` if the expanded text is not valid UTF-8.
    pub fn expand_to_string(&self, root: &Path) -> Result<String> {
        let mut buffer = Vec::new();
        self.expand_file(root, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
    }

    /// Expands `in_file` into `out_file`, overwriting it.
    ///
    /// Output written before a failure is flushed, so a failed run leaves the
    /// expansion up to the offending directive in `out_file`.
    ///
    /// # Errors
    ///
    /// - `FlatincError::OpenInput` if `in_file` cannot be opened for reading.
    /// - `FlatincError::OpenOutput` if `out_file` cannot be created.
    /// - Any error from [`Expander::expand`].
    pub fn preprocess_file(&self, in_file: &Path, out_file: &Path) -> Result<()> {
        let input = open_input(in_file)?;
        let output = File::create(out_file).map_err(|source| FlatincError::OpenOutput {
            path: out_file.to_path_buf(),
            source,
        })?;

        let mut writer = BufWriter::new(output);
        let result = self.expand(input, &mut writer, in_file);
        let flushed = writer.flush();
        result?;
        flushed?;

        info!("Expanded {} into {}", in_file.display(), out_file.display());
        Ok(())
    }
}

fn open_input(path: &Path) -> Result<BufReader<File>> {
    open_regular_file(path)
        .map(BufReader::new)
        .map_err(|source| FlatincError::OpenInput {
            path: path.to_path_buf(),
            source,
        })
}

/// Expands `in_file` into `out_file` searching `include_dirs` in order
///
/// # Errors
///
/// See [`Expander::preprocess_file`].
pub fn preprocess(in_file: &Path, out_file: &Path, include_dirs: &[PathBuf]) -> Result<()> {
    Expander::new(ExpandConfig::new(include_dirs.to_vec()))?.preprocess_file(in_file, out_file)
}
