//! Binding arguments to handler slots during one trial.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;

use crate::cursor::{Cursor, TokenKind};
use crate::error::{Problem, UsageError};
use crate::mode::Mode;
use crate::spec::{Coercion, HandlerSpec};
use crate::value::{expand_path, Value};

/// Outcome of offering the current argument to one handler.
#[derive(Debug)]
pub(crate) enum Consume {
    Taken,
    Rejected(Problem),
}

/// What one handler has accumulated so far in the current trial.
///
/// The engine keeps one state per shared handler across a whole trial and
/// a fresh one per alternative; all of them are reset before the next
/// alternative is tried.
#[derive(Debug, Default)]
pub(crate) struct HandlerState {
    bound: HashMap<i32, Value>,
    prefix_pairs: HashMap<i32, Vec<(String, Option<String>)>>,
    positionals: Vec<String>,
    keywords: IndexMap<String, Option<String>>,
}

impl HandlerState {
    pub(crate) fn reset(&mut self) {
        self.bound.clear();
        self.prefix_pairs.clear();
        self.positionals.clear();
        self.keywords.clear();
    }

    /// Offers the current argument to this handler. `Taken` always leaves
    /// the cursor moved past whatever was consumed; rejection leaves it
    /// untouched so another handler may claim the argument.
    pub(crate) fn handle_arg(
        &mut self,
        spec: &HandlerSpec,
        mode: &Mode,
        cursor: &mut Cursor<'_>,
    ) -> Result<Consume, UsageError> {
        match cursor.kind() {
            TokenKind::Positional => {
                if spec.var_positional || self.positionals.len() < spec.positionals.len() {
                    self.positionals.push(cursor.raw().to_string());
                    cursor.advance()?;
                    Ok(Consume::Taken)
                } else {
                    Ok(Consume::Rejected(Problem::Unexpected(
                        cursor.raw().to_string(),
                    )))
                }
            }
            TokenKind::Short => self.handle_short(spec, mode, cursor),
            TokenKind::Long => self.handle_long(spec, mode, cursor),
        }
    }

    fn handle_long(
        &mut self,
        spec: &HandlerSpec,
        mode: &Mode,
        cursor: &mut Cursor<'_>,
    ) -> Result<Consume, UsageError> {
        let name = cursor.name().to_string();
        if spec.defs.contains(&name) {
            if self.try_option(spec, mode, cursor, &name)? {
                return Ok(Consume::Taken);
            }
            if let Some(&slot) = spec.flags.get(&name) {
                if cursor.split() {
                    return Err(UsageError::FlagWithValue(name));
                }
                self.bound.insert(slot, Value::Bool(true));
                cursor.advance()?;
                return Ok(Consume::Taken);
            }
        }
        if let Some((slot, suffix)) = spec.match_prefix(&name) {
            let pair = if suffix.is_empty() {
                // bare prefix: the pair must come from the next token
                if cursor.split() || !mode.clustered() || cursor.advance()? {
                    return Err(UsageError::MalformedPrefix(cursor.raw().to_string()));
                }
                (cursor.name().to_string(), cursor.value().map(str::to_string))
            } else {
                (suffix, cursor.value().map(str::to_string))
            };
            self.prefix_pairs.entry(slot).or_default().push(pair);
            cursor.advance()?;
            return Ok(Consume::Taken);
        }
        if spec.keyword_catch_all {
            let value = cursor.value().map(str::to_string);
            self.keywords.insert(name, value);
            cursor.advance()?;
            return Ok(Consume::Taken);
        }
        Ok(Consume::Rejected(Problem::Unexpected(
            cursor.raw().to_string(),
        )))
    }

    fn handle_short(
        &mut self,
        spec: &HandlerSpec,
        mode: &Mode,
        cursor: &mut Cursor<'_>,
    ) -> Result<Consume, UsageError> {
        let name = cursor.name().to_string();
        if !spec.short_defs.contains(&name) {
            return Ok(Consume::Rejected(Problem::UnexpectedShort {
                name,
                argument: cursor.raw().to_string(),
            }));
        }
        if let Some(&slot) = spec.flags.get(&name) {
            self.bound.insert(slot, Value::Bool(true));
            cursor.shift_short()?;
            return Ok(Consume::Taken);
        }
        if self.try_option(spec, mode, cursor, &name)? {
            return Ok(Consume::Taken);
        }
        // the remaining short spelling kind is a prefix
        let Some(&slot) = spec.prefixes.get(&name) else {
            return Ok(Consume::Rejected(Problem::UnexpectedShort {
                name,
                argument: cursor.raw().to_string(),
            }));
        };
        let value = match cursor.value() {
            Some(inline) => inline.to_string(),
            None => {
                if cursor.advance()? {
                    return Err(UsageError::PrefixWithoutValue(name));
                }
                cursor.raw().to_string()
            }
        };
        let pair = cursor.separate_pair(&value);
        self.prefix_pairs.entry(slot).or_default().push(pair);
        cursor.advance()?;
        Ok(Consume::Taken)
    }

    /// Binds `name` as an option of this spec, pulling the value from the
    /// next token when clustering allows it. Returns false when `name` is
    /// not an option; missing and unparseable values are hard errors.
    fn try_option(
        &mut self,
        spec: &HandlerSpec,
        mode: &Mode,
        cursor: &mut Cursor<'_>,
        name: &str,
    ) -> Result<bool, UsageError> {
        let Some(&slot) = spec.options.get(name) else {
            return Ok(false);
        };
        let raw = match cursor.value() {
            Some(inline) => inline.to_string(),
            None => {
                if !mode.clustered() || cursor.advance()? || cursor.split() {
                    return Err(UsageError::OptionWithoutValue(name.to_string()));
                }
                cursor.raw().to_string()
            }
        };
        let value = coerce(spec, slot, name, &raw)?;
        self.bound.insert(slot, value);
        cursor.advance()?;
        Ok(true)
    }

    /// Whether any argument actually reached this handler. Pre-seeded
    /// empty prefix lists do not count.
    pub(crate) fn something_provided(&self) -> bool {
        !self.positionals.is_empty()
            || !self.bound.is_empty()
            || self.prefix_pairs.values().any(|pairs| !pairs.is_empty())
    }

    /// Problem that would keep this handler from being invoked, if any.
    /// Shared handlers pass `required = false`: untouched, they simply do
    /// not run, and only a partial binding is a problem.
    pub(crate) fn check_invokable(&self, spec: &HandlerSpec, required: bool) -> Option<Problem> {
        match self.materialize(spec) {
            Ok(_) => None,
            Err(problem) => (required || self.something_provided()).then_some(problem),
        }
    }

    /// Assembles the values the action receives, slot by slot: bound value,
    /// else next pending positional, else declared default. The first gap
    /// without a default is the reported problem; orphan flags are checked
    /// after the slots.
    pub(crate) fn materialize(&self, spec: &HandlerSpec) -> Result<Invocation, Problem> {
        let mut problem: Option<Problem> = None;
        let mut positionals: VecDeque<&String> = self.positionals.iter().collect();
        let mut values = Vec::with_capacity(self.positionals.len() + spec.slot_names.len());
        for slot in 1..=spec.slot_count() {
            if spec.is_prefix_slot(slot) {
                values.push(Value::Pairs(
                    self.prefix_pairs.get(&slot).cloned().unwrap_or_default(),
                ));
            } else if let Some(value) = self.bound.get(&slot) {
                values.push(value.clone());
            } else if spec.positionals.contains_key(&slot) && !positionals.is_empty() {
                if let Some(front) = positionals.pop_front() {
                    values.push(Value::Str(front.clone()));
                }
            } else if let Some(default) = spec.defaults.get(&slot) {
                values.push(default.clone());
            } else if problem.is_none() {
                let (kind, name) = spec.slot_label(slot);
                problem = Some(Problem::Missing { kind, name });
            }
        }
        // surplus positionals ride along after the declared values
        for extra in positionals {
            values.push(Value::Str(extra.clone()));
        }
        for slot in spec.orphan_slots() {
            if problem.is_none() && !self.bound.contains_key(&slot) {
                let (kind, name) = spec.slot_label(slot);
                problem = Some(Problem::Missing { kind, name });
            }
        }
        if let Some(problem) = problem {
            return Err(problem);
        }
        Ok(Invocation {
            names: spec.slot_names.clone(),
            declared: spec.slot_names.len(),
            values,
            keywords: self.keywords.clone(),
        })
    }
}

fn coerce(spec: &HandlerSpec, slot: i32, name: &str, raw: &str) -> Result<Value, UsageError> {
    match spec.coercions.get(&slot) {
        Some(Coercion::Int) => raw
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| UsageError::InvalidValue(name.to_string())),
        Some(Coercion::Float) => raw
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| UsageError::InvalidValue(name.to_string())),
        Some(Coercion::Path) => Ok(Value::Str(expand_path(raw))),
        None => Ok(Value::Str(raw.to_string())),
    }
}

/// Values for one matched handler, in parameter declaration order.
#[derive(Debug, Clone)]
pub struct Invocation {
    names: Vec<String>,
    values: Vec<Value>,
    declared: usize,
    keywords: IndexMap<String, Option<String>>,
}

impl Invocation {
    /// All values: the declared parameters in order, then any surplus
    /// positional arguments.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value of a parameter, by its internal (declaration) name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let at = self.names.iter().position(|n| n == name)?;
        self.values.get(at)
    }

    /// True when the named flag was set. False for absent names, so flag
    /// parameters with a `false` default read naturally.
    pub fn get_flag(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_float)
    }

    /// Accumulated pairs of a prefix parameter. Empty when the prefix never
    /// appeared.
    pub fn get_pairs(&self, name: &str) -> Option<&[(String, Option<String>)]> {
        self.get(name).and_then(Value::as_pairs)
    }

    /// Positional arguments beyond the declared parameters.
    pub fn rest(&self) -> &[Value] {
        &self.values[self.declared.min(self.values.len())..]
    }

    /// Unknown long options collected by a keyword catch-all, in command
    /// line order.
    pub fn keywords(&self) -> &IndexMap<String, Option<String>> {
        &self.keywords
    }
}
