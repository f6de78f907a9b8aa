//! The matcher: registration, trial scheduling and invocation.

use std::cmp::Reverse;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::binding::{Consume, HandlerState, Invocation};
use crate::cursor::Cursor;
use crate::decl::{handler, HandlerDecl};
use crate::error::{MatchError, Problem, SetupError, UsageError};
use crate::mode::Mode;
use crate::spec::HandlerSpec;
use crate::usage::Usage;

/// What a successful [`Matcher::process`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome<T> {
    /// An alternative matched and its action returned this value.
    Done(T),
    /// The built-in help alternative matched. Carries the rendered usage
    /// text; printing it is the caller's business.
    Help(String),
}

struct Registration<T> {
    decl: HandlerDecl,
    action: Box<dyn FnMut(&Invocation) -> T>,
}

struct SharedRegistration {
    decl: HandlerDecl,
    action: Box<dyn FnMut(&Invocation)>,
}

struct BuiltAlternative {
    spec: HandlerSpec,
    /// Index into the registrations. None for the built-in help handler.
    registration: Option<usize>,
}

struct BuiltShared {
    spec: HandlerSpec,
    registration: usize,
}

/// Specs compiled for one `process()` or usage request. Declarations stay
/// untouched on the matcher, so processing is repeatable.
struct Built {
    mode: Mode,
    alternatives: Vec<BuiltAlternative>,
    shared: Vec<BuiltShared>,
}

/// A set of handler alternatives matched against a command line.
///
/// Alternatives are mutually exclusive: `process` tries them against the
/// whole argument vector, highest priority first, and invokes the first
/// one that consumes every argument and has all required values. Shared
/// handlers attached to the matching alternative pick up cross-cutting
/// arguments and run before it.
///
/// The same matcher can process any number of command lines.
pub struct Matcher<T> {
    prefix: String,
    assigner: String,
    aliases: IndexMap<String, String>,
    options_help: IndexMap<String, String>,
    var_names: IndexMap<String, String>,
    default_help: bool,
    alternatives: Vec<Registration<T>>,
    shared: Vec<SharedRegistration>,
}

impl<T> Default for Matcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Matcher<T> {
    /// A matcher with getopt-style defaults: `--` long prefix (which turns
    /// on single-dash clustering), `=` assigner, and a built-in `--help`
    /// alternative.
    pub fn new() -> Self {
        Matcher {
            prefix: "--".to_string(),
            assigner: "=".to_string(),
            aliases: IndexMap::new(),
            options_help: IndexMap::new(),
            var_names: IndexMap::new(),
            default_help: true,
            alternatives: Vec::new(),
            shared: Vec::new(),
        }
    }

    /// Changes the long option prefix. Anything but `--` disables short
    /// option clustering.
    pub fn option_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Changes the name/value separator inside a single token.
    pub fn assigner(mut self, assigner: impl Into<String>) -> Self {
        self.assigner = assigner.into();
        self
    }

    /// Declares two spellings equivalent, in either order. With clustering
    /// on, one side must be a single character and the other longer. The
    /// pair is ignored by handlers that define neither side.
    pub fn alias(mut self, first: impl Into<String>, second: impl Into<String>) -> Self {
        self.aliases.insert(first.into(), second.into());
        self
    }

    /// Help line shown next to the option in usage text.
    pub fn option_help(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.options_help.insert(name.into(), text.into());
        self
    }

    /// Display name for an option's value in usage text, instead of the
    /// uppercased option name.
    pub fn var_name(mut self, name: impl Into<String>, display: impl Into<String>) -> Self {
        self.var_names.insert(name.into(), display.into());
        self
    }

    /// Drops the built-in help alternative.
    pub fn no_default_help(mut self) -> Self {
        self.default_help = false;
        self
    }

    /// Registers a handler alternative. The action runs if this
    /// alternative is the match, and its return value becomes the result
    /// of [`Matcher::process`].
    pub fn alternative(
        mut self,
        decl: HandlerDecl,
        action: impl FnMut(&Invocation) -> T + 'static,
    ) -> Self {
        self.alternatives.push(Registration {
            decl,
            action: Box::new(action),
        });
        self
    }

    /// Registers a shared handler: it consumes its arguments no matter
    /// which alternative they are interleaved with, and runs before the
    /// matching alternative's action.
    pub fn shared(mut self, decl: HandlerDecl, action: impl FnMut(&Invocation) + 'static) -> Self {
        self.shared.push(SharedRegistration {
            decl,
            action: Box::new(action),
        });
        self
    }

    /// Matches `args` (index 0 is the program name) against the registered
    /// alternatives. With `gnu` set, options must precede positional
    /// arguments.
    ///
    /// Hard errors surface as soon as they are seen. Otherwise, if no
    /// alternative matches, the rejection recorded furthest into the
    /// argument vector is reported.
    pub fn process(&mut self, args: &[String], gnu: bool) -> Result<MatchOutcome<T>, MatchError> {
        let built = self.build()?;
        debug!(arguments = args.len().saturating_sub(1), gnu, "processing command line");
        let mut cursor = Cursor::new(args, &built.mode, gnu)?;
        let mut shared_states: Vec<HandlerState> = built
            .shared
            .iter()
            .map(|_| HandlerState::default())
            .collect();
        let mut best: Option<((usize, usize), Problem)> = None;

        for alternative in &built.alternatives {
            let attached: Vec<usize> = built
                .shared
                .iter()
                .enumerate()
                .filter(|(_, shared)| shared.spec.applies_to(&alternative.spec))
                .map(|(index, _)| index)
                .collect();
            trace!(handler = %alternative.spec.name, "trying alternative");
            let mut state = HandlerState::default();
            let problem = try_alternative(
                &alternative.spec,
                &mut state,
                &attached,
                &built.shared,
                &mut shared_states,
                &built.mode,
                &mut cursor,
            )?;
            let Some(problem) = problem else {
                debug!(handler = %alternative.spec.name, "matched");
                for &index in &attached {
                    let shared = &built.shared[index];
                    if let Ok(invocation) = shared_states[index].materialize(&shared.spec) {
                        (self.shared[shared.registration].action)(&invocation);
                    }
                }
                let Some(registration) = alternative.registration else {
                    return Ok(MatchOutcome::Help(usage_from(&built).render()));
                };
                let invocation = state
                    .materialize(&alternative.spec)
                    .map_err(|problem| UsageError::NoMatch(problem.to_string()))?;
                return Ok(MatchOutcome::Done((self.alternatives[registration].action)(
                    &invocation,
                )));
            };
            let position = cursor.position();
            trace!(handler = %alternative.spec.name, ?position, %problem, "alternative rejected");
            if best.as_ref().is_none_or(|(recorded, _)| position > *recorded) {
                best = Some((position, problem));
            }
            cursor.reset()?;
            for shared_state in &mut shared_states {
                shared_state.reset();
            }
        }
        let message = best
            .map(|(_, problem)| problem.to_string())
            .unwrap_or_else(|| "Invalid command line input".to_string());
        debug!(%message, "no alternative matched");
        Err(UsageError::NoMatch(message).into())
    }

    /// Like [`Matcher::process`], but folds usage problems into `fallback`
    /// after printing the problem to stderr. Construction errors still
    /// surface: those are bugs, not user input.
    pub fn process_or(
        &mut self,
        args: &[String],
        gnu: bool,
        fallback: T,
    ) -> Result<MatchOutcome<T>, SetupError> {
        match self.process(args, gnu) {
            Ok(outcome) => Ok(outcome),
            Err(MatchError::Setup(err)) => Err(err),
            Err(MatchError::Usage(err)) => {
                eprintln!("{err}");
                Ok(MatchOutcome::Done(fallback))
            }
        }
    }

    /// Usage information for everything currently registered.
    pub fn usage(&self) -> Result<Usage, SetupError> {
        let built = self.build()?;
        Ok(usage_from(&built))
    }

    /// Renders the default usage layout to stdout.
    pub fn print_help(&self) -> Result<(), SetupError> {
        println!("{}", self.usage()?.render());
        Ok(())
    }

    fn build(&self) -> Result<Built, SetupError> {
        if self.alternatives.is_empty() {
            return Err(SetupError::NoHandlers);
        }
        let mut mode = Mode::new(self.prefix.clone(), self.assigner.clone());
        mode.options_help = self.options_help.clone();
        mode.var_names = self.var_names.clone();
        let mut aliases = self.aliases.clone();
        if self.default_help {
            if mode.clustered() {
                aliases.insert("h".to_string(), "help".to_string());
            }
            mode.options_help
                .insert("help".to_string(), "shows this help message".to_string());
        }

        let mut order: Vec<usize> = (0..self.alternatives.len()).collect();
        order.sort_by_key(|&index| Reverse(self.alternatives[index].decl.priority));
        let mut alternatives = Vec::with_capacity(order.len() + 1);
        for index in order {
            alternatives.push(BuiltAlternative {
                spec: build_spec(&self.alternatives[index].decl, &mode, &aliases)?,
                registration: Some(index),
            });
        }
        if self.default_help {
            let decl = handler("help")
                .flags("help")
                .exclusive()
                .doc("shows the help message");
            alternatives.push(BuiltAlternative {
                spec: build_spec(&decl, &mode, &aliases)?,
                registration: None,
            });
        }

        let mut order: Vec<usize> = (0..self.shared.len()).collect();
        order.sort_by_key(|&index| Reverse(self.shared[index].decl.priority));
        let mut shared = Vec::with_capacity(order.len());
        for index in order {
            shared.push(BuiltShared {
                spec: build_spec(&self.shared[index].decl, &mode, &aliases)?,
                registration: index,
            });
        }
        Ok(Built {
            mode,
            alternatives,
            shared,
        })
    }
}

fn build_spec(
    decl: &HandlerDecl,
    mode: &Mode,
    aliases: &IndexMap<String, String>,
) -> Result<HandlerSpec, SetupError> {
    let mut spec = HandlerSpec::build(decl, mode)?;
    for (first, second) in aliases {
        spec.apply_alias(first, second, mode)?;
    }
    Ok(spec)
}

fn usage_from(built: &Built) -> Usage {
    let groups = built
        .alternatives
        .iter()
        .map(|alternative| {
            let mut group = vec![alternative.spec.clone()];
            group.extend(
                built
                    .shared
                    .iter()
                    .filter(|shared| shared.spec.applies_to(&alternative.spec))
                    .map(|shared| shared.spec.clone()),
            );
            group
        })
        .collect();
    Usage::new(built.mode.clone(), groups)
}

/// Walks the whole command line for one alternative. Every token must be
/// taken by the alternative or one of its attached shared handlers; then
/// all of them must be invokable. Returns the rejection that failed the
/// trial, or None on success.
fn try_alternative(
    spec: &HandlerSpec,
    state: &mut HandlerState,
    attached: &[usize],
    shared: &[BuiltShared],
    shared_states: &mut [HandlerState],
    mode: &Mode,
    cursor: &mut Cursor<'_>,
) -> Result<Option<Problem>, UsageError> {
    'tokens: while !cursor.finished() {
        trace!(token = %cursor.raw(), "offering argument");
        let mut rejection = match state.handle_arg(spec, mode, cursor)? {
            Consume::Taken => continue 'tokens,
            Consume::Rejected(problem) => problem,
        };
        for &index in attached {
            match shared_states[index].handle_arg(&shared[index].spec, mode, cursor)? {
                Consume::Taken => continue 'tokens,
                Consume::Rejected(problem) => rejection = problem,
            }
        }
        return Ok(Some(rejection));
    }
    for &index in attached {
        if let Some(problem) = shared_states[index].check_invokable(&shared[index].spec, false) {
            return Ok(Some(problem));
        }
    }
    Ok(state.check_invokable(spec, true))
}
