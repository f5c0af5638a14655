use crate::error::Result;
use regex::bytes::Regex;
use serde::Serialize;
use std::fmt;
use std::io::{self, BufRead};

/// Pattern for `#include "path"` occupying a whole line.
/// The path class matches raw bytes so non-UTF-8 paths still classify.
const LOCAL_INCLUDE: &str = r#"^\s*#\s*include\s*"((?-u:[^"])*)"\s*$"#;

/// Pattern for `#include <path>` occupying a whole line
const SYSTEM_INCLUDE: &str = r"^\s*#\s*include\s*<((?-u:[^>])*)>\s*$";

/// Delimiter style of an include directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IncludeKind {
    /// `#include "path"`
    Local,
    /// `#include <path>`
    System,
}

impl fmt::Display for IncludeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::System => f.write_str("system"),
        }
    }
}

/// An include directive recognized on a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Text between the delimiters, taken literally (invalid UTF-8 replaced)
    pub path: String,
    pub kind: IncludeKind,
}

/// A directive together with the 1-based line it was found on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedDirective {
    pub line: usize,
    pub directive: Directive,
}

/// Decides whether a line is entirely an include directive.
///
/// Both patterns are compiled once and reused for every line. A line that
/// only resembles a directive (trailing comment, text before the hash) is
/// not a directive and is left for verbatim pass-through.
#[derive(Debug, Clone)]
pub struct DirectiveClassifier {
    local: Regex,
    system: Regex,
}

impl DirectiveClassifier {
    /// Compiles the directive patterns
    ///
    /// # Errors
    ///
    /// Returns `FlatincError::Regex` if a pattern fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            local: Regex::new(LOCAL_INCLUDE)?,
            system: Regex::new(SYSTEM_INCLUDE)?,
        })
    }

    /// Classifies one line (without its terminator).
    ///
    /// Returns `None` for plain text.
    pub fn classify(&self, line: &[u8]) -> Option<Directive> {
        let patterns = [
            (&self.local, IncludeKind::Local),
            (&self.system, IncludeKind::System),
        ];

        patterns.into_iter().find_map(|(pattern, kind)| {
            pattern.captures(line).and_then(|caps| {
                caps.get(1).map(|path| Directive {
                    path: String::from_utf8_lossy(path.as_bytes()).into_owned(),
                    kind,
                })
            })
        })
    }
}

/// Reads the next line into `buf` and returns it without its `\n`.
///
/// A `\r` before the `\n` is left in place. Returns `None` at end of input.
///
/// # Errors
///
/// Returns any read error from `input`.
pub fn next_line<'b, R>(input: &mut R, buf: &'b mut Vec<u8>) -> io::Result<Option<&'b [u8]>>
where
    R: BufRead + ?Sized,
{
    buf.clear();
    if input.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }

    let line = buf.as_slice();
    Ok(Some(line.strip_suffix(b"\n").unwrap_or(line)))
}

/// Finds every whole-line include directive in the given input
///
/// # Errors
///
/// - `FlatincError::Regex` if the directive patterns fail to compile.
/// - `FlatincError::Io` if reading `input` fails.
pub fn find_directives<R: BufRead>(mut input: R) -> Result<Vec<LocatedDirective>> {
    let classifier = DirectiveClassifier::new()?;
    let mut buf = Vec::new();
    let mut line_number = 0;
    let mut found = Vec::new();

    while let Some(line) = next_line(&mut input, &mut buf)? {
        line_number += 1;
        if let Some(directive) = classifier.classify(line) {
            found.push(LocatedDirective {
                line: line_number,
                directive,
            });
        }
    }

    Ok(found)
}
