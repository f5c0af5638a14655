//! # flatinc
//!
//! Flattens `#include` directives: starting from a root file, every line that
//! is entirely an include directive is replaced by the recursively expanded
//! contents of the file it names, producing one self-contained text stream.
//!
//! ## Features
//!
//! - Recognizes `#include "path"` and `#include <path>` occupying a whole line
//! - Looks next to the including file first, then in each include directory in order
//! - Everything else passes through verbatim (no macros, no conditionals)
//! - Reports the unresolved path, the including file and the line number
//! - Optional cap on include nesting depth
//!
//! ## Usage
//!
//! ### As a Library
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//!
//! let include_dirs = vec![PathBuf::from("include")];
//! match flatinc::preprocess(Path::new("src/main.cpp"), Path::new("main.flat.cpp"), &include_dirs) {
//!     Ok(()) => println!("done"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```
//!
//! ### As a CLI Tool
//!
//! ```bash
//! # Expand to stdout
//! flatinc src/main.cpp -I include
//!
//! # Expand into a file, searching two include directories
//! flatinc src/main.cpp -I include1 -I include2 -o main.flat.cpp
//! ```

pub mod directive;
pub mod error;
pub mod expand;
pub mod resolve;

// Re-export main types and functions for convenience
pub use directive::{Directive, DirectiveClassifier, IncludeKind, LocatedDirective, find_directives};
pub use error::{FlatincError, Result};
pub use expand::{ExpandConfig, Expander, preprocess};
pub use resolve::SearchContext;
