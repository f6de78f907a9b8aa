//! Compiling declarations into matchable handler specs.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use regex_lite::Regex;

use crate::decl::HandlerDecl;
use crate::error::{SetupError, SlotKind};
use crate::mode::Mode;
use crate::value::Value;

/// Coercion applied to an option value before it is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Coercion {
    Int,
    Float,
    Path,
}

#[derive(Debug, Clone, Copy)]
enum Category {
    Flag,
    Prefix,
    Option(Option<Coercion>),
}

/// Suffix patterns for inferred categories, longest first so that
/// `retries_option_int` is an int option and not an option named
/// `retries-int`.
const NAME_SUFFIXES: &[(&str, Category)] = &[
    ("_option_float", Category::Option(Some(Coercion::Float))),
    ("_option_path", Category::Option(Some(Coercion::Path))),
    ("_option_int", Category::Option(Some(Coercion::Int))),
    ("OptionFloat", Category::Option(Some(Coercion::Float))),
    ("OptionPath", Category::Option(Some(Coercion::Path))),
    ("OptionInt", Category::Option(Some(Coercion::Int))),
    ("_option", Category::Option(None)),
    ("_prefix", Category::Prefix),
    ("Option", Category::Option(None)),
    ("Prefix", Category::Prefix),
    ("_flag", Category::Flag),
    ("Flag", Category::Flag),
];

/// Name filter for shared handlers: which alternatives they attach to.
#[derive(Debug, Clone)]
pub(crate) struct AppliesPattern {
    regex: Regex,
}

impl AppliesPattern {
    fn compile(pattern: &str, handler: &str) -> Result<Self, SetupError> {
        let branches: Vec<String> = pattern
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(glob_to_regex)
            .collect();
        let source = format!("^({})$", branches.join("|"));
        let regex = Regex::new(&source).map_err(|_| SetupError::BadAppliesPattern {
            handler: handler.to_string(),
            pattern: pattern.to_string(),
        })?;
        Ok(AppliesPattern { regex })
    }

    fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

fn glob_to_regex(part: &str) -> String {
    let mut out = String::with_capacity(part.len() + 4);
    for ch in part.chars() {
        match ch {
            '*' => out.push_str(".*"),
            c if c.is_ascii_alphanumeric() || c == '_' || c == '-' => out.push(c),
            c => {
                out.push('\\');
                out.push(c);
            }
        }
    }
    out
}

/// Which def set a spelling lives in. Short spellings are one character
/// names in clustered mode; everything else is long.
#[derive(Debug, Clone, Copy)]
enum DefSet {
    Long,
    Short,
}

/// Everything one handler accepts, compiled from its declaration. Built
/// fresh for each `process()` or usage request and read-only afterwards.
///
/// Slots are 1-based parameter indices. Orphan flags get negative slots so
/// they can be required without occupying a parameter.
#[derive(Debug, Clone)]
pub(crate) struct HandlerSpec {
    pub(crate) name: String,
    pub(crate) flags: IndexMap<String, i32>,
    pub(crate) options: IndexMap<String, i32>,
    pub(crate) prefixes: IndexMap<String, i32>,
    pub(crate) coercions: HashMap<i32, Coercion>,
    pub(crate) positionals: IndexMap<i32, String>,
    pub(crate) defaults: HashMap<i32, Value>,
    pub(crate) slot_names: Vec<String>,
    pub(crate) orphan_count: u32,
    pub(crate) var_positional: bool,
    pub(crate) keyword_catch_all: bool,
    pub(crate) priority: i32,
    pub(crate) exclusive: bool,
    pub(crate) applies: Option<AppliesPattern>,
    pub(crate) doc: Option<String>,
    pub(crate) defs: HashSet<String>,
    pub(crate) short_defs: HashSet<String>,
}

impl HandlerSpec {
    pub(crate) fn build(decl: &HandlerDecl, mode: &Mode) -> Result<Self, SetupError> {
        let applies = match &decl.applies {
            Some(pattern) => Some(AppliesPattern::compile(pattern, &decl.name)?),
            None => None,
        };
        let mut spec = HandlerSpec {
            name: decl.name.clone(),
            flags: IndexMap::new(),
            options: IndexMap::new(),
            prefixes: IndexMap::new(),
            coercions: HashMap::new(),
            positionals: IndexMap::new(),
            defaults: HashMap::new(),
            slot_names: decl.params.iter().map(|p| p.name.clone()).collect(),
            orphan_count: 0,
            var_positional: decl.var_positional,
            keyword_catch_all: decl.keyword_catch_all && !mode.clustered(),
            priority: decl.priority,
            exclusive: decl.exclusive,
            applies,
            doc: decl.doc.clone(),
            defs: HashSet::new(),
            short_defs: HashSet::new(),
        };
        if decl.is_explicit() {
            spec.claim_from_lists(decl)?;
        } else {
            spec.claim_from_param_names(decl)?;
        }
        for (index, param) in decl.params.iter().enumerate() {
            if let Some(default) = &param.default {
                spec.defaults.insert(index as i32 + 1, default.clone());
            }
        }
        spec.register_defs(mode)?;
        Ok(spec)
    }

    /// Inference: each parameter name either carries a category suffix or
    /// stays positional.
    fn claim_from_param_names(&mut self, decl: &HandlerDecl) -> Result<(), SetupError> {
        let mut used: HashSet<String> = HashSet::new();
        for (index, param) in decl.params.iter().enumerate() {
            let slot = index as i32 + 1;
            let Some((base, category)) = split_name_pattern(&param.name) else {
                self.positionals.insert(slot, param.name.clone());
                continue;
            };
            let external = uncamel(base);
            if !used.insert(external.clone()) {
                return Err(SetupError::ParameterReuse {
                    handler: self.name.clone(),
                    name: external,
                });
            }
            self.claim(category, external, slot);
        }
        Ok(())
    }

    /// Category lists: entries name parameters, optionally renamed with
    /// `as`. Flag entries naming nothing become orphan flags.
    fn claim_from_lists(&mut self, decl: &HandlerDecl) -> Result<(), SetupError> {
        let normalized: Vec<String> = decl
            .params
            .iter()
            .map(|p| strip_non_alphanumeric(&p.name))
            .collect();
        let mut used_external: HashSet<String> = HashSet::new();
        let mut claimed_slots: HashSet<i32> = HashSet::new();
        let groups: [(&[String], Category); 6] = [
            (&decl.flags, Category::Flag),
            (&decl.options, Category::Option(None)),
            (&decl.prefixes, Category::Prefix),
            (&decl.int_options, Category::Option(Some(Coercion::Int))),
            (&decl.float_options, Category::Option(Some(Coercion::Float))),
            (&decl.path_options, Category::Option(Some(Coercion::Path))),
        ];
        for (lists, category) in groups {
            for entry in lists.iter().flat_map(|list| list.split(',')) {
                let entry = entry.trim();
                if entry.is_empty() {
                    continue;
                }
                let (internal, rename) = split_rename(entry);
                let position = normalized
                    .iter()
                    .position(|p| *p == strip_non_alphanumeric(&internal));
                let Some(index) = position else {
                    if matches!(category, Category::Flag) && rename.is_none() {
                        self.orphan_count += 1;
                        let virtual_slot = -(self.orphan_count as i32);
                        if self.flags.insert(internal.clone(), virtual_slot).is_some() {
                            return Err(SetupError::DuplicateName {
                                handler: self.name.clone(),
                                name: internal,
                            });
                        }
                        continue;
                    }
                    return Err(SetupError::UnknownParameter {
                        handler: self.name.clone(),
                        name: internal,
                    });
                };
                let slot = index as i32 + 1;
                let external = rename.unwrap_or(internal.clone());
                if !used_external.insert(external.clone()) {
                    return Err(SetupError::ParameterReuse {
                        handler: self.name.clone(),
                        name: external,
                    });
                }
                if !claimed_slots.insert(slot) {
                    return Err(SetupError::ParameterReuse {
                        handler: self.name.clone(),
                        name: internal,
                    });
                }
                self.claim(category, external, slot);
            }
        }
        for (index, param) in decl.params.iter().enumerate() {
            let slot = index as i32 + 1;
            if !claimed_slots.contains(&slot) {
                self.positionals.insert(slot, param.name.clone());
            }
        }
        Ok(())
    }

    fn claim(&mut self, category: Category, external: String, slot: i32) {
        match category {
            Category::Flag => {
                self.flags.insert(external, slot);
            }
            Category::Prefix => {
                self.prefixes.insert(external, slot);
            }
            Category::Option(coercion) => {
                if let Some(coercion) = coercion {
                    self.coercions.insert(slot, coercion);
                }
                self.options.insert(external, slot);
            }
        }
    }

    /// Splits spellings into the long and short def sets and rejects names
    /// defined under two categories.
    fn register_defs(&mut self, mode: &Mode) -> Result<(), SetupError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut short_names: Vec<String> = Vec::new();
        let mut long_names: Vec<String> = Vec::new();
        for name in self
            .flags
            .keys()
            .chain(self.options.keys())
            .chain(self.prefixes.keys())
        {
            if !seen.insert(name.clone()) {
                return Err(SetupError::DuplicateName {
                    handler: self.name.clone(),
                    name: name.clone(),
                });
            }
            if mode.clustered() && name.chars().count() == 1 {
                short_names.push(name.clone());
            } else {
                long_names.push(name.clone());
            }
        }
        self.short_defs.extend(short_names);
        self.defs.extend(long_names);
        Ok(())
    }

    /// Defines one spelling as an alias of another. Pairs where neither
    /// side is defined are ignored, so matcher-wide aliases may target
    /// names that only some handlers declare.
    pub(crate) fn apply_alias(
        &mut self,
        first: &str,
        second: &str,
        mode: &Mode,
    ) -> Result<(), SetupError> {
        if mode.clustered() {
            let (short, long) = if first.chars().count() > second.chars().count() {
                (second, first)
            } else {
                (first, second)
            };
            if short.chars().count() != 1 || long.chars().count() == 1 {
                return Err(SetupError::BadAlias {
                    first: short.to_string(),
                    second: long.to_string(),
                });
            }
            if self.link_alias(long, DefSet::Long, short, DefSet::Short)? {
                return Ok(());
            }
            self.link_alias(short, DefSet::Short, long, DefSet::Long)?;
        } else {
            let (known, alias) = if self.defs.contains(second) {
                (second, first)
            } else {
                (first, second)
            };
            self.link_alias(known, DefSet::Long, alias, DefSet::Long)?;
        }
        Ok(())
    }

    fn link_alias(
        &mut self,
        known: &str,
        known_set: DefSet,
        alias: &str,
        alias_set: DefSet,
    ) -> Result<bool, SetupError> {
        if !self.in_set(known_set, known) {
            return Ok(false);
        }
        if self.in_set(alias_set, alias) {
            return Err(SetupError::BadAlias {
                first: known.to_string(),
                second: alias.to_string(),
            });
        }
        match alias_set {
            DefSet::Long => self.defs.insert(alias.to_string()),
            DefSet::Short => self.short_defs.insert(alias.to_string()),
        };
        if let Some(&slot) = self.flags.get(known) {
            self.flags.insert(alias.to_string(), slot);
        }
        if let Some(&slot) = self.options.get(known) {
            self.options.insert(alias.to_string(), slot);
        }
        if let Some(&slot) = self.prefixes.get(known) {
            self.prefixes.insert(alias.to_string(), slot);
        }
        Ok(true)
    }

    fn in_set(&self, set: DefSet, name: &str) -> bool {
        match set {
            DefSet::Long => self.defs.contains(name),
            DefSet::Short => self.short_defs.contains(name),
        }
    }

    pub(crate) fn slot_count(&self) -> i32 {
        self.slot_names.len() as i32
    }

    pub(crate) fn is_prefix_slot(&self, slot: i32) -> bool {
        self.prefixes.values().any(|&s| s == slot)
    }

    /// Virtual flag slots, most recently declared first.
    pub(crate) fn orphan_slots(&self) -> impl Iterator<Item = i32> + '_ {
        (1..=self.orphan_count as i32).rev().map(|i| -i)
    }

    /// Longest defined prefix that `name` starts with, and the remaining
    /// suffix.
    pub(crate) fn match_prefix(&self, name: &str) -> Option<(i32, String)> {
        let mut best: Option<(&str, i32)> = None;
        for (prefix, &slot) in &self.prefixes {
            if self.defs.contains(prefix) && name.starts_with(prefix.as_str()) {
                let better = best.is_none_or(|(found, _)| prefix.len() > found.len());
                if better {
                    best = Some((prefix, slot));
                }
            }
        }
        best.map(|(prefix, slot)| (slot, name[prefix.len()..].to_string()))
    }

    /// Display kind and name for a slot, for missing-value problems. Flag
    /// spellings win over option spellings, parameters come last.
    pub(crate) fn slot_label(&self, slot: i32) -> (SlotKind, String) {
        for (name, &s) in &self.flags {
            if s == slot {
                return (SlotKind::Flag, name.clone());
            }
        }
        for (name, &s) in &self.options {
            if s == slot {
                return (SlotKind::Option, name.clone());
            }
        }
        if let Some(name) = self.positionals.get(&slot) {
            return (SlotKind::Parameter, name.clone());
        }
        let fallback = usize::try_from(slot - 1)
            .ok()
            .and_then(|index| self.slot_names.get(index))
            .cloned()
            .unwrap_or_default();
        (SlotKind::Parameter, fallback)
    }

    /// Whether this shared handler attaches to the given alternative.
    pub(crate) fn applies_to(&self, alternative: &HandlerSpec) -> bool {
        match &self.applies {
            Some(pattern) => pattern.matches(&alternative.name),
            None => !alternative.exclusive,
        }
    }
}

fn split_name_pattern(name: &str) -> Option<(&str, Category)> {
    for (suffix, category) in NAME_SUFFIXES {
        if let Some(base) = name.strip_suffix(suffix) {
            if !base.is_empty() {
                return Some((base, *category));
            }
        }
    }
    None
}

/// `logLevel` to `log-level`. Underscored names only get the underscores
/// replaced; an uppercase run keeps its first letter, so `fooURL` becomes
/// `foo-u-r-l`, not `foo-url`.
fn uncamel(word: &str) -> String {
    if word.contains('_') {
        return word.replace('_', "-");
    }
    let mut out = String::with_capacity(word.len() + 4);
    let mut after_lower = false;
    for mut ch in word.chars() {
        if after_lower && ch.is_uppercase() {
            out.push('-');
            ch = ch.to_ascii_lowercase();
        }
        out.push(ch);
        after_lower = ch.is_lowercase();
    }
    out
}

fn strip_non_alphanumeric(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Splits a list entry into internal name and optional `as` rename.
fn split_rename(entry: &str) -> (String, Option<String>) {
    let words: Vec<&str> = entry.split_whitespace().collect();
    if let Some(at) = words.iter().position(|w| *w == "as") {
        if at > 0 && at + 1 < words.len() {
            return (words[..at].join(" "), Some(words[at + 1..].join(" ")));
        }
    }
    (entry.to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::handler;

    fn getopt() -> Mode {
        Mode::new("--", "=")
    }

    fn build(decl: HandlerDecl) -> HandlerSpec {
        HandlerSpec::build(&decl, &getopt()).unwrap()
    }

    #[test]
    fn snake_case_patterns_infer_categories() {
        let spec = build(
            handler("sync")
                .param("verbose_flag")
                .param("log_level_option")
                .param("retries_option_int")
                .param("ratio_option_float")
                .param("out_option_path")
                .param("define_prefix")
                .param("target"),
        );
        assert_eq!(spec.flags.get("verbose"), Some(&1));
        assert_eq!(spec.options.get("log-level"), Some(&2));
        assert_eq!(spec.options.get("retries"), Some(&3));
        assert_eq!(spec.options.get("ratio"), Some(&4));
        assert_eq!(spec.options.get("out"), Some(&5));
        assert_eq!(spec.prefixes.get("define"), Some(&6));
        assert_eq!(spec.positionals.get(&7), Some(&"target".to_string()));
        assert_eq!(spec.coercions.get(&3), Some(&Coercion::Int));
        assert_eq!(spec.coercions.get(&4), Some(&Coercion::Float));
        assert_eq!(spec.coercions.get(&5), Some(&Coercion::Path));
        assert!(spec.coercions.get(&2).is_none());
    }

    #[test]
    fn camel_case_patterns_uncamel_the_external_name() {
        let spec = build(
            handler("sync")
                .param("logLevelOption")
                .param("dryRunFlag")
                .param("DPrefix"),
        );
        assert_eq!(spec.options.get("log-level"), Some(&1));
        assert_eq!(spec.flags.get("dry-run"), Some(&2));
        assert_eq!(spec.prefixes.get("D"), Some(&3));
    }

    #[test]
    fn uncamel_keeps_uppercase_runs() {
        assert_eq!(uncamel("fooURL"), "foo-u-r-l");
        assert_eq!(uncamel("logLevel"), "log-level");
        assert_eq!(uncamel("Verbose"), "Verbose");
        assert_eq!(uncamel("log_level"), "log-level");
        assert_eq!(uncamel("v"), "v");
    }

    #[test]
    fn pattern_without_base_is_positional() {
        let spec = build(handler("go").param("Flag").param("_option"));
        assert!(spec.flags.is_empty());
        assert!(spec.options.is_empty());
        assert_eq!(spec.positionals.len(), 2);
    }

    #[test]
    fn building_is_repeatable() {
        let decl = handler("sync")
            .param("verbose_flag")
            .param("mode_option")
            .param("src");
        let first = HandlerSpec::build(&decl, &getopt()).unwrap();
        let second = HandlerSpec::build(&decl, &getopt()).unwrap();
        assert_eq!(first.flags, second.flags);
        assert_eq!(first.options, second.options);
        assert_eq!(first.positionals, second.positionals);
        assert_eq!(first.slot_names, second.slot_names);
    }

    #[test]
    fn category_lists_claim_and_rename_parameters() {
        let spec = build(
            handler("copy")
                .params(["src", "dst", "overwrite"])
                .options("src, dst")
                .flags("overwrite as force"),
        );
        assert_eq!(spec.options.get("src"), Some(&1));
        assert_eq!(spec.options.get("dst"), Some(&2));
        assert_eq!(spec.flags.get("force"), Some(&3));
        assert!(spec.positionals.is_empty());
    }

    #[test]
    fn list_matching_ignores_non_alphanumerics() {
        let spec = build(handler("go").param("log_level").options("log-level"));
        assert_eq!(spec.options.get("log-level"), Some(&1));
    }

    #[test]
    fn unclaimed_parameters_stay_positional() {
        let spec = build(
            handler("copy")
                .params(["src", "dst", "verbose"])
                .flags("verbose"),
        );
        assert_eq!(spec.positionals.get(&1), Some(&"src".to_string()));
        assert_eq!(spec.positionals.get(&2), Some(&"dst".to_string()));
        assert_eq!(spec.flags.get("verbose"), Some(&3));
    }

    #[test]
    fn unmatched_flag_entries_become_orphans() {
        let spec = build(handler("go").param("src").options("src").flags("force"));
        assert_eq!(spec.flags.get("force"), Some(&-1));
        assert_eq!(spec.orphan_count, 1);
        assert_eq!(spec.orphan_slots().collect::<Vec<_>>(), vec![-1]);
    }

    #[test]
    fn orphan_slots_iterate_newest_first() {
        let spec = build(handler("go").flags("force, dry-run"));
        assert_eq!(spec.flags.get("force"), Some(&-1));
        assert_eq!(spec.flags.get("dry-run"), Some(&-2));
        assert_eq!(spec.orphan_slots().collect::<Vec<_>>(), vec![-2, -1]);
    }

    #[test]
    fn renamed_entry_without_parameter_is_an_error() {
        let err = HandlerSpec::build(
            &handler("go").param("src").flags("missing as m"),
            &getopt(),
        )
        .unwrap_err();
        match err {
            SetupError::UnknownParameter { handler, name } => {
                assert_eq!(handler, "go");
                assert_eq!(name, "missing");
            }
            other => panic!("expected unknown parameter, got: {other:?}"),
        }
    }

    #[test]
    fn unmatched_option_entry_is_an_error() {
        let err =
            HandlerSpec::build(&handler("go").param("src").options("dst"), &getopt()).unwrap_err();
        match err {
            SetupError::UnknownParameter { name, .. } => assert_eq!(name, "dst"),
            other => panic!("expected unknown parameter, got: {other:?}"),
        }
    }

    #[test]
    fn claiming_one_parameter_twice_is_an_error() {
        let err = HandlerSpec::build(
            &handler("go").param("src").options("src").flags("src as s"),
            &getopt(),
        )
        .unwrap_err();
        match err {
            SetupError::ParameterReuse { name, .. } => assert_eq!(name, "src"),
            other => panic!("expected parameter reuse, got: {other:?}"),
        }
    }

    #[test]
    fn reusing_an_external_name_is_an_error() {
        let err = HandlerSpec::build(
            &handler("go")
                .params(["first", "second"])
                .options("first as x, second as x"),
            &getopt(),
        )
        .unwrap_err();
        match err {
            SetupError::ParameterReuse { name, .. } => assert_eq!(name, "x"),
            other => panic!("expected parameter reuse, got: {other:?}"),
        }
    }

    #[test]
    fn inferred_external_collision_is_an_error() {
        let err = HandlerSpec::build(
            &handler("go").param("log_level_option").param("logLevelOption"),
            &getopt(),
        )
        .unwrap_err();
        match err {
            SetupError::ParameterReuse { name, .. } => assert_eq!(name, "log-level"),
            other => panic!("expected parameter reuse, got: {other:?}"),
        }
    }

    #[test]
    fn same_name_in_two_categories_is_an_error() {
        let err = HandlerSpec::build(
            &handler("go")
                .params(["a", "b"])
                .options("a as x")
                .flags("b as x"),
            &getopt(),
        )
        .unwrap_err();
        match err {
            SetupError::ParameterReuse { name, .. } => assert_eq!(name, "x"),
            other => panic!("expected parameter reuse, got: {other:?}"),
        }
    }

    #[test]
    fn short_spellings_go_to_the_short_def_set() {
        let spec = build(handler("go").params(["v", "mode"]).flags("v").options("mode"));
        assert!(spec.short_defs.contains("v"));
        assert!(!spec.defs.contains("v"));
        assert!(spec.defs.contains("mode"));
    }

    #[test]
    fn without_clustering_everything_is_long() {
        let mode = Mode::new("/", ":");
        let spec = HandlerSpec::build(
            &handler("go").params(["v", "mode"]).flags("v").options("mode"),
            &mode,
        )
        .unwrap();
        assert!(spec.defs.contains("v"));
        assert!(spec.short_defs.is_empty());
    }

    #[test]
    fn alias_links_both_spellings_to_one_slot() {
        let mut spec = build(handler("go").param("verbose").flags("verbose"));
        spec.apply_alias("v", "verbose", &getopt()).unwrap();
        assert_eq!(spec.flags.get("v"), spec.flags.get("verbose"));
        assert!(spec.short_defs.contains("v"));
    }

    #[test]
    fn alias_order_does_not_matter() {
        let mut spec = build(handler("go").param("verbose").flags("verbose"));
        spec.apply_alias("verbose", "v", &getopt()).unwrap();
        assert_eq!(spec.flags.get("v"), Some(&1));
    }

    #[test]
    fn alias_from_short_to_long_works_too() {
        let mut spec = build(handler("go").param("v").flags("v"));
        spec.apply_alias("v", "verbose", &getopt()).unwrap();
        assert_eq!(spec.flags.get("verbose"), Some(&1));
        assert!(spec.defs.contains("verbose"));
    }

    #[test]
    fn alias_to_an_unknown_name_is_ignored() {
        let mut spec = build(handler("go").param("verbose").flags("verbose"));
        spec.apply_alias("q", "quiet", &getopt()).unwrap();
        assert!(spec.flags.get("q").is_none());
        assert!(spec.flags.get("quiet").is_none());
    }

    #[test]
    fn clustered_alias_must_pair_short_with_long() {
        let mut spec = build(handler("go").param("verbose").flags("verbose"));
        match spec.apply_alias("vb", "verbose", &getopt()) {
            Err(SetupError::BadAlias { .. }) => {}
            other => panic!("expected bad alias, got: {other:?}"),
        }
        match spec.apply_alias("v", "x", &getopt()) {
            Err(SetupError::BadAlias { .. }) => {}
            other => panic!("expected bad alias, got: {other:?}"),
        }
    }

    #[test]
    fn alias_onto_an_existing_spelling_is_an_error() {
        let mut spec = build(handler("go").params(["verbose", "v"]).flags("verbose, v"));
        match spec.apply_alias("v", "verbose", &getopt()) {
            Err(SetupError::BadAlias { .. }) => {}
            other => panic!("expected bad alias, got: {other:?}"),
        }
    }

    #[test]
    fn non_clustered_alias_lengths_are_free() {
        let mode = Mode::new("/", ":");
        let mut spec = HandlerSpec::build(
            &handler("go").param("verbose").flags("verbose"),
            &mode,
        )
        .unwrap();
        spec.apply_alias("verbose", "chatty", &mode).unwrap();
        assert_eq!(spec.flags.get("chatty"), Some(&1));
        assert!(spec.defs.contains("chatty"));
    }

    #[test]
    fn longest_prefix_wins() {
        let spec = build(
            handler("go")
                .params(["d", "define"])
                .prefixes("d as De, define as Def"),
        );
        let (slot, suffix) = spec.match_prefix("Define").unwrap();
        assert_eq!(slot, 2);
        assert_eq!(suffix, "ine");
        let (slot, suffix) = spec.match_prefix("Dex").unwrap();
        assert_eq!(slot, 1);
        assert_eq!(suffix, "x");
        assert!(spec.match_prefix("X").is_none());
    }

    #[test]
    fn short_prefix_spellings_do_not_match_long_tokens() {
        let spec = build(handler("go").param("defines").prefixes("defines as D"));
        assert!(spec.match_prefix("Dx").is_none());
    }

    #[test]
    fn applies_patterns_match_whole_names_with_globs() {
        let spec = build(handler("logging").applies("c*, move").param("v_flag"));
        let copy = build(handler("copy"));
        let mover = build(handler("move"));
        let show = build(handler("show"));
        assert!(spec.applies_to(&copy));
        assert!(spec.applies_to(&mover));
        assert!(!spec.applies_to(&show));
    }

    #[test]
    fn patternless_shared_skips_exclusive_alternatives() {
        let shared = build(handler("logging").param("v_flag"));
        let open = build(handler("copy"));
        let closed = build(handler("help").exclusive());
        assert!(shared.applies_to(&open));
        assert!(!shared.applies_to(&closed));
    }

    #[test]
    fn applies_pattern_beats_exclusive() {
        let shared = build(handler("logging").applies("help").param("v_flag"));
        let closed = build(handler("help").exclusive());
        assert!(shared.applies_to(&closed));
    }

    #[test]
    fn slot_labels_prefer_flag_spellings() {
        let spec = build(
            handler("go")
                .params(["src", "verbose"])
                .options("src")
                .flags("verbose"),
        );
        assert_eq!(spec.slot_label(1), (SlotKind::Option, "src".to_string()));
        assert_eq!(spec.slot_label(2), (SlotKind::Flag, "verbose".to_string()));
        let positional = build(handler("go").param("target"));
        assert_eq!(
            positional.slot_label(1),
            (SlotKind::Parameter, "target".to_string())
        );
    }
}
