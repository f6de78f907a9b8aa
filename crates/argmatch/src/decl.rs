//! Handler declarations: what a handler accepts, stated at registration.

use crate::value::Value;

/// One declared parameter: the internal name and an optional default.
#[derive(Debug, Clone)]
pub(crate) struct ParamDecl {
    pub(crate) name: String,
    pub(crate) default: Option<Value>,
}

/// Registration-time description of one handler.
///
/// Parameters are the values the action receives, in declaration order.
/// Which of them arrive as flags, options or prefixes is stated either
/// through category lists (`flags`, `options`, ...) or, when no list is
/// given, inferred from parameter name patterns: `verbose_flag`/`vFlag`,
/// `mode_option`/`modeOption`, `retries_option_int`, `ratio_option_float`,
/// `out_option_path`, `define_prefix`/`dPrefix`. The name with the pattern
/// stripped and uncameled (`logLevel` to `log-level`) is the external
/// spelling.
#[derive(Debug, Clone)]
pub struct HandlerDecl {
    pub(crate) name: String,
    pub(crate) params: Vec<ParamDecl>,
    pub(crate) flags: Vec<String>,
    pub(crate) options: Vec<String>,
    pub(crate) int_options: Vec<String>,
    pub(crate) float_options: Vec<String>,
    pub(crate) path_options: Vec<String>,
    pub(crate) prefixes: Vec<String>,
    pub(crate) var_positional: bool,
    pub(crate) keyword_catch_all: bool,
    pub(crate) priority: i32,
    pub(crate) exclusive: bool,
    pub(crate) applies: Option<String>,
    pub(crate) doc: Option<String>,
}

/// Starts declaring a handler. The name identifies the handler in
/// construction errors and is what `applies` patterns are matched against.
pub fn handler(name: impl Into<String>) -> HandlerDecl {
    HandlerDecl {
        name: name.into(),
        params: Vec::new(),
        flags: Vec::new(),
        options: Vec::new(),
        int_options: Vec::new(),
        float_options: Vec::new(),
        path_options: Vec::new(),
        prefixes: Vec::new(),
        var_positional: false,
        keyword_catch_all: false,
        priority: 0,
        exclusive: false,
        applies: None,
        doc: None,
    }
}

impl HandlerDecl {
    /// Adds a required parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamDecl {
            name: name.into(),
            default: None,
        });
        self
    }

    /// Adds a parameter with a default value. [`Value::None`] is a valid
    /// default and marks the parameter as plainly optional in usage text.
    pub fn param_default(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.params.push(ParamDecl {
            name: name.into(),
            default: Some(default.into()),
        });
        self
    }

    /// Adds several required parameters at once.
    pub fn params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self = self.param(name);
        }
        self
    }

    /// Declares flag parameters: comma-separated internal names, each
    /// optionally renamed with `"internal as external"`. An entry naming no
    /// parameter and carrying no rename becomes an orphan flag: it must
    /// appear on the command line but is not passed to the action.
    ///
    /// Giving any category list disables name pattern inference for this
    /// handler.
    pub fn flags(mut self, defs: impl Into<String>) -> Self {
        self.flags.push(defs.into());
        self
    }

    /// Declares option parameters, same syntax as [`HandlerDecl::flags`].
    pub fn options(mut self, defs: impl Into<String>) -> Self {
        self.options.push(defs.into());
        self
    }

    /// Declares options whose values must parse as integers.
    pub fn int_options(mut self, defs: impl Into<String>) -> Self {
        self.int_options.push(defs.into());
        self
    }

    /// Declares options whose values must parse as floats.
    pub fn float_options(mut self, defs: impl Into<String>) -> Self {
        self.float_options.push(defs.into());
        self
    }

    /// Declares options whose values get environment variables and a
    /// leading `~` expanded.
    pub fn path_options(mut self, defs: impl Into<String>) -> Self {
        self.path_options.push(defs.into());
        self
    }

    /// Declares prefix parameters, same syntax as [`HandlerDecl::flags`].
    pub fn prefixes(mut self, defs: impl Into<String>) -> Self {
        self.prefixes.push(defs.into());
        self
    }

    /// Accepts positional arguments beyond the declared parameters. The
    /// surplus is passed to the action after the declared values.
    pub fn var_positional(mut self) -> Self {
        self.var_positional = true;
        self
    }

    /// Collects unknown long options as keywords instead of rejecting the
    /// argument. Inert in clustered-short mode.
    pub fn keyword_catch_all(mut self) -> Self {
        self.keyword_catch_all = true;
        self
    }

    /// Alternatives with higher priority are tried first. Handlers sharing
    /// a priority keep their registration order. Defaults to 0.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Opts this alternative out of shared handlers that carry no
    /// `applies` pattern.
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// For shared handlers: restricts which alternatives this handler
    /// attaches to. Comma-separated handler names where `*` matches any
    /// run of characters, e.g. `"c*, move"`.
    pub fn applies(mut self, pattern: impl Into<String>) -> Self {
        self.applies = Some(pattern.into());
        self
    }

    /// Documentation shown in the alternatives section of the usage text.
    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = Some(text.into());
        self
    }

    pub(crate) fn is_explicit(&self) -> bool {
        !(self.flags.is_empty()
            && self.options.is_empty()
            && self.int_options.is_empty()
            && self.float_options.is_empty()
            && self.path_options.is_empty()
            && self.prefixes.is_empty())
    }
}
