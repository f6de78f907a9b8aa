//! Usage and help text rendering.
//!
//! The layout engine fills lines word by word against a total width, with
//! optional column alignment: option spellings start at a small indent and
//! their help text at a fixed column, wrapping back to that column.

use indexmap::IndexMap;

use crate::mode::Mode;
use crate::spec::HandlerSpec;
use crate::value::Value;

/// Formatting knobs for [`Usage::render_with`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Total line width before wrapping.
    pub width: usize,
    /// Column where option help and alternative documentation start.
    pub help_column: usize,
    /// Indent for option spellings and alternative contents.
    pub indent: usize,
    /// Include the leading `Usage:` line.
    pub include_usage_line: bool,
    /// Include the per-alternative section when there is more than one
    /// alternative.
    pub include_alternatives: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            width: 72,
            help_column: 24,
            indent: 2,
            include_usage_line: true,
            include_alternatives: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemKind {
    Flag,
    Option,
    Prefix,
    Parameter,
    VarArgs,
}

/// One renderable thing: an option under all its spellings, a parameter,
/// or the varargs marker.
#[derive(Debug, Clone)]
struct UsageItem {
    kind: ItemKind,
    /// Longest spelling, or the parameter name.
    name: String,
    /// All spellings, shortest first. Empty for parameters.
    aliases: Vec<String>,
    default: Option<Value>,
}

impl UsageItem {
    fn takes_value(&self) -> bool {
        matches!(self.kind, ItemKind::Option | ItemKind::Prefix)
    }

    fn optional(&self) -> bool {
        self.default.is_some()
    }

    fn prefix_for<'m>(&self, mode: &'m Mode, name: &str) -> &'m str {
        match self.kind {
            ItemKind::Flag | ItemKind::Option | ItemKind::Prefix => mode.option_prefix_for(name),
            ItemKind::Parameter | ItemKind::VarArgs => "",
        }
    }

    fn suffix_for(&self, mode: &Mode, name: &str) -> String {
        if !self.takes_value() {
            return String::new();
        }
        format!("{}{}", mode.delimiter_for(name), self.var_display(mode))
    }

    /// Display name for the value: an explicit var name reachable through
    /// any spelling, else the uppercased item name.
    fn var_display(&self, mode: &Mode) -> String {
        for alias in &self.aliases {
            if let Some(explicit) = mode.var_names.get(alias) {
                return explicit.clone();
            }
        }
        self.name.to_uppercase().replace('-', "_")
    }

    /// Compact form for usage lines: brackets and the default value when
    /// the item is optional.
    fn brief(&self, mode: &Mode) -> String {
        if self.kind == ItemKind::VarArgs {
            return "...".to_string();
        }
        let core = format!(
            "{}{}{}",
            self.prefix_for(mode, &self.name),
            self.name,
            self.suffix_for(mode, &self.name)
        );
        match &self.default {
            Some(Value::None) => format!("[{core}]"),
            Some(value) => format!("[{core} ({value})]"),
            None => core,
        }
    }

    /// All spellings for the options section, e.g. `-m MODE, --mode=MODE`.
    fn spellings_row(&self, mode: &Mode) -> String {
        self.aliases
            .iter()
            .map(|alias| {
                format!(
                    "{}{}{}",
                    self.prefix_for(mode, alias),
                    alias,
                    self.suffix_for(mode, alias)
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn doc<'m>(&self, mode: &'m Mode) -> Option<&'m str> {
        self.aliases
            .iter()
            .find_map(|alias| mode.options_help.get(alias).map(String::as_str))
    }
}

fn option_items(spec: &HandlerSpec) -> Vec<UsageItem> {
    let mut ret = Vec::new();
    let groups = [
        (ItemKind::Flag, &spec.flags),
        (ItemKind::Option, &spec.options),
        (ItemKind::Prefix, &spec.prefixes),
    ];
    for (kind, group) in groups {
        let mut by_slot: IndexMap<i32, Vec<String>> = IndexMap::new();
        for (name, &slot) in group {
            by_slot.entry(slot).or_default().push(name.clone());
        }
        let mut items: Vec<UsageItem> = by_slot
            .into_iter()
            .map(|(slot, mut aliases)| {
                aliases.sort_by_key(|alias| alias.chars().count());
                let name = aliases.last().cloned().unwrap_or_default();
                UsageItem {
                    kind,
                    name,
                    aliases,
                    default: spec.defaults.get(&slot).cloned(),
                }
            })
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        ret.extend(items);
    }
    ret
}

fn parameter_items(spec: &HandlerSpec) -> Vec<UsageItem> {
    let mut ret = Vec::new();
    for slot in 1..=spec.slot_count() {
        if let Some(name) = spec.positionals.get(&slot) {
            ret.push(UsageItem {
                kind: ItemKind::Parameter,
                name: name.clone(),
                aliases: Vec::new(),
                default: spec.defaults.get(&slot).cloned(),
            });
        }
    }
    ret
}

/// Usage information for a configured matcher: one group per alternative,
/// the alternative's own spec first, then the shared specs attached to it.
#[derive(Debug, Clone)]
pub struct Usage {
    mode: Mode,
    groups: Vec<Vec<HandlerSpec>>,
}

impl Usage {
    pub(crate) fn new(mode: Mode, groups: Vec<Vec<HandlerSpec>>) -> Self {
        Usage { mode, groups }
    }

    /// Renders with the default 72 column layout.
    pub fn render(&self) -> String {
        self.render_with(&RenderOptions::default())
    }

    pub fn render_with(&self, opts: &RenderOptions) -> String {
        let mut layout = Layout::new(opts.width);
        if self.groups.is_empty() {
            layout.add_text("Error, no usage configured", 0);
            return layout.finish();
        }
        let alternatives = self.groups.len();
        let all_options = self.all_options();
        if opts.include_usage_line {
            layout.add_text("Usage:", 0);
            if alternatives == 1 {
                let items: Vec<String> = self
                    .options_for(0)
                    .iter()
                    .chain(self.parameters_for(0).iter())
                    .map(|item| item.brief(&self.mode))
                    .collect();
                layout.add_items(&items, 0);
            } else {
                if !all_options.is_empty() {
                    layout.add_text("[common options]", 0);
                }
                layout.add_text(&self.summary_parameters(), 0);
            }
            layout.add_line();
        }
        if !all_options.is_empty() {
            layout.add_line_text("options:", 0);
            for item in &all_options {
                layout.add_line_text(&item.spellings_row(&self.mode), opts.indent);
                if let Some(doc) = item.doc(&self.mode) {
                    layout.add_text(doc, opts.help_column);
                }
            }
        }
        if opts.include_alternatives && alternatives > 1 {
            layout.add_line();
            layout.add_line_text("alternatives:", 0);
            for (index, group) in self.groups.iter().enumerate() {
                layout.add_line();
                layout.add_line_text("*", 0);
                let items: Vec<String> = self
                    .options_for(index)
                    .iter()
                    .chain(self.parameters_for(index).iter())
                    .map(|item| item.brief(&self.mode))
                    .collect();
                layout.add_items(&items, opts.indent);
                if let Some(doc) = group.first().and_then(|spec| spec.doc.as_deref()) {
                    layout.add_line();
                    for line in doc.split('\n') {
                        if !line.trim().is_empty() {
                            layout.add_text(line, opts.help_column);
                        }
                    }
                }
            }
        }
        layout.finish()
    }

    /// Options of every alternative, deduplicated by name with the first
    /// definition winning, flags before value-taking items.
    fn all_options(&self) -> Vec<UsageItem> {
        let mut by_name: IndexMap<String, UsageItem> = IndexMap::new();
        for index in 0..self.groups.len() {
            self.collect_options(index, &mut by_name);
        }
        let mut ret: Vec<UsageItem> = by_name.into_values().collect();
        ret.sort_by_key(|item| (item.takes_value(), item.name.to_lowercase()));
        ret
    }

    /// One alternative's options, required before optional. Collection
    /// stops after a catch-all handler: it accepts anything, so later
    /// specs add no information.
    fn options_for(&self, alternative: usize) -> Vec<UsageItem> {
        let mut by_name = IndexMap::new();
        self.collect_options(alternative, &mut by_name);
        let mut ret: Vec<UsageItem> = by_name.into_values().collect();
        ret.sort_by_key(|item| (item.optional(), item.name.to_lowercase()));
        ret
    }

    fn collect_options(&self, alternative: usize, into: &mut IndexMap<String, UsageItem>) {
        for spec in &self.groups[alternative] {
            for item in option_items(spec) {
                if !into.contains_key(&item.name) {
                    into.insert(item.name.clone(), item);
                }
            }
            if spec.keyword_catch_all {
                break;
            }
        }
    }

    /// One alternative's positional parameters, with the varargs marker.
    /// Parameters left of a required parameter render as required even
    /// when they carry defaults: they cannot be omitted positionally.
    fn parameters_for(&self, alternative: usize) -> Vec<UsageItem> {
        let mut ret = Vec::new();
        for spec in &self.groups[alternative] {
            ret.extend(parameter_items(spec));
            if spec.var_positional {
                ret.push(UsageItem {
                    kind: ItemKind::VarArgs,
                    name: "...".to_string(),
                    aliases: Vec::new(),
                    default: Some(Value::None),
                });
                break;
            }
        }
        let mut required_seen = false;
        for item in ret.iter_mut().rev() {
            if required_seen {
                item.default = None;
            } else {
                required_seen = item.default.is_none();
            }
        }
        ret
    }

    /// Parameter summary across alternatives: positions agree on a name or
    /// fall back to `argN`.
    fn summary_parameters(&self) -> String {
        let mut per_alt: Vec<Vec<UsageItem>> = Vec::new();
        let mut varargs = false;
        for group in &self.groups {
            let mut pars = Vec::new();
            for spec in group {
                pars.extend(parameter_items(spec));
                if spec.var_positional {
                    varargs = true;
                    break;
                }
            }
            per_alt.push(pars);
        }
        let longest = per_alt.iter().map(Vec::len).max().unwrap_or(0);
        let mut names: Vec<String> = Vec::new();
        for position in 0..longest {
            let mut name: Option<String> = None;
            for pars in &per_alt {
                let Some(item) = pars.get(position) else {
                    continue;
                };
                match &name {
                    None => name = Some(item.name.clone()),
                    Some(current) if *current != item.name => {
                        name = Some(format!("arg{}", position + 1));
                        break;
                    }
                    Some(_) => {}
                }
            }
            if let Some(name) = name {
                names.push(name);
            }
        }
        if varargs {
            names.push("...".to_string());
        }
        names.join(" ")
    }
}

/// Line filler with column alignment.
struct Layout {
    lines: Vec<String>,
    width: usize,
}

impl Layout {
    fn new(width: usize) -> Self {
        Layout {
            lines: vec![String::new()],
            width,
        }
    }

    fn add_line(&mut self) {
        self.lines.push(String::new());
    }

    fn add_line_text(&mut self, text: &str, column: usize) {
        self.add_line();
        self.add_text(text, column);
    }

    /// Adds text word by word to the current line.
    fn add_text(&mut self, text: &str, column: usize) {
        let words: Vec<String> = text.split(' ').map(str::to_string).collect();
        self.add_items(&words, column);
    }

    /// Adds items whole: an item never breaks, the line does. With a
    /// column, content starts there and wrapped lines return to it.
    fn add_items(&mut self, items: &[String], column: usize) {
        let mut current = self.lines.pop().unwrap_or_default();
        if column > 0 && !current.is_empty() && width_of(&current) + 1 > column {
            self.lines.push(current);
            current = String::new();
        }
        let mut started = column == 0 && !current.trim().is_empty();
        let pad = column.saturating_sub(width_of(&current));
        current.push_str(&" ".repeat(pad));
        for item in items {
            if started && width_of(&current) + width_of(item) >= self.width {
                self.lines.push(current);
                current = " ".repeat(column);
                started = false;
            }
            if !item.is_empty() || started {
                if started {
                    current.push(' ');
                }
                current.push_str(item);
                started = true;
            }
        }
        current.truncate(current.trim_end().len());
        self.lines.push(current);
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

fn width_of(text: &str) -> usize {
    text.chars().count()
}
