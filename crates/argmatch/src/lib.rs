//! Signature-driven command line matching.
//!
//! Instead of one schema for the whole program, a [`Matcher`] holds a set
//! of handler alternatives, each declaring the flags, options, prefixes
//! and positional parameters it accepts. The matcher tries the whole
//! command line against each alternative in turn and invokes the first
//! one that consumes every argument and ends up with all required values
//! bound. Shared handlers layer cross-cutting arguments (verbosity,
//! defines) over whichever alternative matches.
//!
//! With the default `--` prefix, single-dash short options and clustering
//! are on, getopt style. Any other prefix (say `/` with `:` as assigner)
//! turns that off and leaves plain `<prefix>name<assigner>value` parsing.
//!
//! # Example
//!
//! ```
//! use argmatch::{handler, MatchOutcome, Matcher};
//!
//! let mut matcher = Matcher::new().alternative(
//!     handler("copy")
//!         .params(["src", "dst"])
//!         .param_default("overwrite", false)
//!         .options("src, dst")
//!         .flags("overwrite"),
//!     |inv| {
//!         format!(
//!             "{} -> {} (overwrite: {})",
//!             inv.get_str("src").unwrap_or_default(),
//!             inv.get_str("dst").unwrap_or_default(),
//!             inv.get_flag("overwrite"),
//!         )
//!     },
//! );
//!
//! let args: Vec<String> = ["prog", "--src=a.txt", "--dst=b.txt"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! match matcher.process(&args, false)? {
//!     MatchOutcome::Done(line) => assert_eq!(line, "a.txt -> b.txt (overwrite: false)"),
//!     MatchOutcome::Help(text) => println!("{text}"),
//! }
//! # Ok::<(), argmatch::MatchError>(())
//! ```

mod binding;
mod cursor;
mod decl;
mod error;
mod matcher;
mod mode;
mod spec;
mod usage;
mod value;

pub use binding::Invocation;
pub use decl::{handler, HandlerDecl};
pub use error::{MatchError, SetupError, UsageError};
pub use matcher::{MatchOutcome, Matcher};
pub use usage::{RenderOptions, Usage};
pub use value::Value;
