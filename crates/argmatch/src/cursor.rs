//! Walking the raw argument vector.

use crate::error::UsageError;
use crate::mode::Mode;

/// How the current token is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Starts with the long option prefix.
    Long,
    /// Single dash cluster of one character names. Clustered mode only.
    Short,
    /// Anything else.
    Positional,
}

/// Cursor over the argument vector, skipping the program name at index 0.
///
/// One token is current at a time, already classified and split into name
/// and value. Handlers consume it through [`Cursor::advance`] or, one
/// cluster character at a time, through [`Cursor::shift_short`]. The engine
/// rewinds with [`Cursor::reset`] before trying the next alternative, so
/// every alternative sees the same tokens from the start.
#[derive(Debug)]
pub(crate) struct Cursor<'a> {
    args: &'a [String],
    gnu: bool,
    clustered: bool,
    long_prefix: String,
    assigner: String,
    next: usize,
    done: bool,
    can_be_option: bool,
    raw: String,
    kind: TokenKind,
    name: String,
    value: Option<String>,
    split: bool,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(args: &'a [String], mode: &Mode, gnu: bool) -> Result<Self, UsageError> {
        let mut cursor = Cursor {
            args,
            gnu,
            clustered: mode.clustered(),
            long_prefix: mode.long_prefix().to_string(),
            assigner: mode.assigner().to_string(),
            next: 1,
            done: args.len() <= 1,
            can_be_option: true,
            raw: String::new(),
            kind: TokenKind::Positional,
            name: String::new(),
            value: None,
            split: false,
        };
        if !cursor.done {
            cursor.load_next()?;
        }
        Ok(cursor)
    }

    /// Rewinds to the first argument, reopening the option region.
    pub(crate) fn reset(&mut self) -> Result<(), UsageError> {
        self.next = 1;
        self.done = self.args.len() <= 1;
        self.can_be_option = true;
        if !self.done {
            self.load_next()?;
        }
        Ok(())
    }

    pub(crate) fn finished(&self) -> bool {
        self.done
    }

    /// The current token exactly as given, prefix included.
    pub(crate) fn raw(&self) -> &str {
        &self.raw
    }

    pub(crate) fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Option or prefix name, one character for short tokens, or the
    /// pre-assigner part of a positional.
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Inline value: after the assigner, or the rest of a short cluster.
    pub(crate) fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Whether the current token carried an assigner-separated value.
    pub(crate) fn split(&self) -> bool {
        self.split
    }

    /// How far processing got: (token index, characters consumed within the
    /// token). Compared across alternatives to pick which rejection gets
    /// reported.
    pub(crate) fn position(&self) -> (usize, usize) {
        if self.done {
            return (self.args.len(), 0);
        }
        let remaining = self.value.as_deref().map_or(0, |v| v.chars().count());
        (self.next, self.raw.chars().count() - remaining)
    }

    /// Consumes the current token. Returns true when the cursor is
    /// exhausted or the newly loaded token is an option.
    pub(crate) fn advance(&mut self) -> Result<bool, UsageError> {
        if self.next >= self.args.len() {
            self.done = true;
        } else {
            self.load_next()?;
        }
        Ok(self.done || self.kind != TokenKind::Positional)
    }

    /// Consumes one name of a short cluster: the following character
    /// becomes the current name, or the whole token is consumed when none
    /// remain.
    pub(crate) fn shift_short(&mut self) -> Result<(), UsageError> {
        if let Some(rest) = self.value.take() {
            let mut chars = rest.chars();
            if let Some(first) = chars.next() {
                self.name = first.to_string();
                let tail: String = chars.collect();
                self.value = (!tail.is_empty()).then_some(tail);
                return Ok(());
            }
        }
        self.advance()?;
        Ok(())
    }

    /// Splits `what` on the first assigner with text on both sides.
    pub(crate) fn separate_pair(&self, what: &str) -> (String, Option<String>) {
        let (name, value, _) = self.separate(what);
        (name, value)
    }

    fn load_next(&mut self) -> Result<(), UsageError> {
        let token = self.args[self.next].clone();
        self.next += 1;
        if token.is_empty() {
            return Err(UsageError::BlankArgument(token));
        }
        if self.can_be_option {
            if let Some(body) = token.strip_prefix(self.long_prefix.as_str()) {
                if body.is_empty() {
                    return Err(UsageError::BlankArgument(token));
                }
                let (name, value, split) = self.separate(body);
                self.kind = TokenKind::Long;
                self.name = name;
                self.value = value;
                self.split = split;
                self.raw = token;
                return Ok(());
            }
            if self.clustered && token.starts_with('-') {
                let mut chars = token[1..].chars();
                let Some(first) = chars.next() else {
                    return Err(UsageError::BlankArgument(token));
                };
                let tail: String = chars.collect();
                self.kind = TokenKind::Short;
                self.name = first.to_string();
                self.value = (!tail.is_empty()).then_some(tail);
                self.split = false;
                self.raw = token;
                return Ok(());
            }
        } else if token.starts_with(self.long_prefix.as_str())
            || (self.clustered && token.starts_with('-'))
        {
            return Err(UsageError::OptionAfterArguments(token));
        }
        let (name, value, split) = self.separate(&token);
        self.kind = TokenKind::Positional;
        self.name = name;
        self.value = value;
        self.split = split;
        self.raw = token;
        self.can_be_option = !self.gnu;
        Ok(())
    }

    fn separate(&self, what: &str) -> (String, Option<String>, bool) {
        if !self.assigner.is_empty() {
            for (at, _) in what.match_indices(self.assigner.as_str()) {
                if at > 0 && at + self.assigner.len() < what.len() {
                    let value = what[at + self.assigner.len()..].to_string();
                    return (what[..at].to_string(), Some(value), true);
                }
            }
        }
        (what.to_string(), None, false)
    }
}
