//! Error types for handler construction and command line processing.
//!
//! Not every rejection is an error. While alternatives are being tried, a
//! handler that cannot take the current argument produces a soft [`Problem`]
//! and the engine moves on; only once every alternative has rejected the
//! input does the problem recorded furthest into the argument vector become
//! a [`UsageError`]. Hard errors, by contrast, describe arguments that no
//! handler could ever accept and abort the run at once.

use std::fmt;

use thiserror::Error;

/// The handler declarations themselves are inconsistent. These indicate a
/// bug in the embedding application and are never folded into a usage
/// message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// One handler defined the same external name twice.
    #[error("handler {handler}: {name} is defined multiple times")]
    DuplicateName { handler: String, name: String },

    /// Two external names claimed the same parameter, or one external name
    /// was given out twice across the category lists.
    #[error("handler {handler}: invalid parameter reuse: {name}")]
    ParameterReuse { handler: String, name: String },

    /// A category entry names no declared parameter and does not qualify as
    /// an orphan flag.
    #[error("handler {handler}: invalid argument: {name}")]
    UnknownParameter { handler: String, name: String },

    /// Alias pair rejected. In clustered-short mode an alias must pair a
    /// one character spelling with a longer one.
    #[error("bad alias: {first}/{second}")]
    BadAlias { first: String, second: String },

    /// An `applies` pattern did not compile into a usable name filter.
    #[error("handler {handler}: invalid applies pattern: {pattern}")]
    BadAppliesPattern { handler: String, pattern: String },

    /// Processing was requested with no registered alternatives.
    #[error("no handlers defined")]
    NoHandlers,
}

/// A command line that could not be processed.
///
/// All variants except [`UsageError::NoMatch`] are hard errors raised as
/// soon as the offending argument is seen, no matter which alternative was
/// being tried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// Option-looking token after GNU ordering already closed the option
    /// region.
    #[error("Unexpected argument {0} after non option arguments")]
    OptionAfterArguments(String),

    /// A token that is nothing but an option prefix.
    #[error("Unexpected argument {0}")]
    BlankArgument(String),

    /// A flag was handed an inline value.
    #[error("Incorrect flag {0}")]
    FlagWithValue(String),

    /// An option with no way left to obtain its value.
    #[error("Incorrect option {0}")]
    OptionWithoutValue(String),

    /// An option value that failed its declared coercion.
    #[error("Incorrect value for {0}")]
    InvalidValue(String),

    /// A short prefix given alone, with no value token following.
    #[error("Incorrect prefix {0}")]
    PrefixWithoutValue(String),

    /// A bare prefix whose follow-up token does not look like name=value.
    #[error("Incorrect prefix usage on argument {0}")]
    MalformedPrefix(String),

    /// Every alternative rejected the input. Carries the display form of
    /// the best recorded [`Problem`].
    #[error("{0}")]
    NoMatch(String),
}

/// Any failure from processing a command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error(transparent)]
    Usage(#[from] UsageError),
}

/// Which kind of slot a missing-value problem refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotKind {
    Flag,
    Option,
    Parameter,
}

impl SlotKind {
    fn label(self) -> &'static str {
        match self {
            SlotKind::Flag => "flag",
            SlotKind::Option => "option",
            SlotKind::Parameter => "parameter",
        }
    }
}

/// Why one handler rejected the command line. Soft: other alternatives may
/// still match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Problem {
    /// A token this handler has no slot for.
    Unexpected(String),
    /// A clustered short name unknown to this handler.
    UnexpectedShort { name: String, argument: String },
    /// A slot without a default that never received a value.
    Missing { kind: SlotKind, name: String },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::Unexpected(argument) => write!(f, "Unexpected argument: {argument}"),
            Problem::UnexpectedShort { name, argument } => {
                write!(f, "Unexpected flag {name} in argument {argument}")
            }
            Problem::Missing { kind, name } => {
                write!(f, "Missing required {} {}", kind.label(), name)
            }
        }
    }
}
