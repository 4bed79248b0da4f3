//! Option descriptors and per-parse match state.
//!
//! An option is split in two: an immutable [`OptionSpec`] describing the
//! switch, and an [`OptionState`] that the parser clears at the start of every
//! parse. The behavioural variants (repeatable, delimited, joined, POSIX) are
//! not subclasses but a single descriptor, `{Arity} x {ValueShape} x
//! {Attachment}`, chosen by the `Opt` constructors.

use crate::error::Fault;

// ============================================================================
// Handles and descriptor
// ============================================================================

/// Stable handle for a registered option (or alias).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Plain switch, never consumes a value.
    Switch,
    /// Requires a value, inline (`--name=v`) or as the next token.
    Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueShape {
    /// Each match overwrites the captured value.
    Single,
    /// Every match is appended to the value list.
    Repeated,
    /// Like `Repeated`, but each raw value is split on any character of the
    /// delimiter set first.
    Delimited(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// `-x value`, `--name value`, `--name=value`.
    Detached,
    /// `-Dkey=value`; the value is glued to the short switch. With
    /// `can_split` the detached `-D key=value` form is accepted too.
    Joined { can_split: bool },
    /// A single-dash long name (`-display :0`).
    Posix,
}

pub type MatchHook = Box<dyn FnMut(Option<&str>) -> Result<(), Fault>>;
pub type ExecuteHook = Box<dyn FnMut(&OptionState) -> Result<(), Fault>>;

// ============================================================================
// OptionSpec
// ============================================================================

#[derive(Debug, Clone)]
pub struct OptionSpec {
    pub(crate) long_name: Option<String>,
    pub(crate) short_name: Option<char>,
    pub(crate) arity: Arity,
    pub(crate) shape: ValueShape,
    pub(crate) attachment: Attachment,
    pub(crate) arg_help: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) default_value: Option<String>,
    pub(crate) hidden: bool,
}

impl OptionSpec {
    fn named(long_name: Option<String>, short_name: Option<char>) -> Self {
        OptionSpec {
            long_name,
            short_name,
            arity: Arity::Switch,
            shape: ValueShape::Single,
            attachment: Attachment::Detached,
            arg_help: None,
            description: None,
            default_value: None,
            hidden: false,
        }
    }

    pub fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    pub fn short_name(&self) -> Option<char> {
        self.short_name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn takes_value(&self) -> bool {
        self.arity == Arity::Value
    }

    pub fn shape(&self) -> &ValueShape {
        &self.shape
    }

    pub fn attachment(&self) -> Attachment {
        self.attachment
    }

    pub fn is_joined(&self) -> bool {
        matches!(self.attachment, Attachment::Joined { .. })
    }

    pub fn is_posix(&self) -> bool {
        self.attachment == Attachment::Posix
    }

    /// Value placeholder shown in help (`ARG`, `FILE`).
    pub fn arg_help(&self) -> Option<&str> {
        self.arg_help.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Name used in constraint messages: the long name, else the short char.
    pub fn display_name(&self) -> String {
        match (&self.long_name, self.short_name) {
            (Some(long), _) => long.clone(),
            (None, Some(c)) => c.to_string(),
            (None, None) => String::new(),
        }
    }

    pub(crate) fn has_name(&self) -> bool {
        self.long_name.is_some() || self.short_name.is_some()
    }
}

// ============================================================================
// Opt
// ============================================================================

pub struct Opt {
    pub(crate) spec: OptionSpec,
    pub(crate) on_match: Option<MatchHook>,
    pub(crate) on_execute: Option<ExecuteHook>,
}

impl Opt {
    /// A switch with a long name. An empty name means "short only"; add the
    /// short name with [`Opt::short`].
    pub fn new(long_name: &str) -> Self {
        let long = (!long_name.is_empty()).then(|| long_name.to_string());
        Opt {
            spec: OptionSpec::named(long, None),
            on_match: None,
            on_execute: None,
        }
    }

    pub fn short_only(c: char) -> Self {
        Opt {
            spec: OptionSpec::named(None, Some(c)),
            on_match: None,
            on_execute: None,
        }
    }

    /// Value-taking option that keeps every value it is given.
    pub fn repeatable(long_name: &str) -> Self {
        let mut opt = Opt::new(long_name).takes_value();
        opt.spec.shape = ValueShape::Repeated;
        opt
    }

    /// Repeatable option whose raw values are split on `delimiters`.
    pub fn delimited(long_name: &str, delimiters: &str) -> Self {
        Opt::new(long_name).delimiter(delimiters)
    }

    /// Delimited option using the default `,` separator.
    pub fn delimited_default(long_name: &str) -> Self {
        Opt::delimited(long_name, ",")
    }

    /// Short-only option whose value is attached to the switch (`-Dk=v`).
    pub fn joined(c: char, can_split: bool) -> Self {
        let mut opt = Opt::short_only(c).takes_value();
        opt.spec.shape = ValueShape::Repeated;
        opt.spec.attachment = Attachment::Joined { can_split };
        opt
    }

    /// POSIX single-form name: one character becomes a short switch,
    /// anything longer a long name spelled with the short switch char.
    pub fn posix(name: &str, takes_value: bool) -> Self {
        let mut chars = name.chars();
        let mut opt = match (chars.next(), chars.next()) {
            (Some(c), None) => Opt::short_only(c),
            _ => Opt::new(name),
        };
        opt.spec.attachment = Attachment::Posix;
        if takes_value {
            opt.spec.arity = Arity::Value;
        }
        opt
    }

    pub fn short(mut self, c: char) -> Self {
        self.spec.short_name = Some(c);
        self
    }

    pub fn takes_value(mut self) -> Self {
        self.spec.arity = Arity::Value;
        self
    }

    /// Split raw values on any character of `delimiters`; implies a value.
    pub fn delimiter(mut self, delimiters: &str) -> Self {
        self.spec.arity = Arity::Value;
        self.spec.shape = ValueShape::Delimited(delimiters.to_string());
        self
    }

    pub fn arg_help(mut self, help: &str) -> Self {
        self.spec.arg_help = Some(help.to_string());
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.spec.description = Some(desc.to_string());
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.spec.default_value = Some(value.to_string());
        self
    }

    /// Keep the option out of help and usage output; it still matches.
    pub fn hidden(mut self) -> Self {
        self.spec.hidden = true;
        self
    }

    /// Hook run on every match, before the state is recorded. A fault
    /// leaves the option unmatched.
    pub fn on_match<F>(mut self, hook: F) -> Self
    where
        F: FnMut(Option<&str>) -> Result<(), Fault> + 'static,
    {
        self.on_match = Some(Box::new(hook));
        self
    }

    /// Hook run by [`Parser::execute`](crate::Parser::execute) once the parse
    /// is over.
    pub fn on_execute<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&OptionState) -> Result<(), Fault> + 'static,
    {
        self.on_execute = Some(Box::new(hook));
        self
    }

    pub fn spec(&self) -> &OptionSpec {
        &self.spec
    }
}

// ============================================================================
// Alias
// ============================================================================

/// Extra names for an already registered option. Matching an alias matches
/// the target, and reading state through the alias reads the target's.
#[derive(Debug, Clone)]
pub struct Alias {
    pub(crate) target: OptionId,
    pub(crate) long_name: Option<String>,
    pub(crate) short_name: Option<char>,
}

impl Alias {
    pub fn new(target: OptionId) -> Self {
        Alias {
            target,
            long_name: None,
            short_name: None,
        }
    }

    pub fn long(mut self, name: &str) -> Self {
        self.long_name = Some(name.to_string());
        self
    }

    pub fn short(mut self, c: char) -> Self {
        self.short_name = Some(c);
        self
    }
}

// ============================================================================
// OptionState
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionState {
    matched: bool,
    value: Option<String>,
    values: Vec<String>,
}

impl OptionState {
    pub fn was_matched(&self) -> bool {
        self.matched
    }

    /// Last raw value captured this parse, without default fallback.
    pub fn captured(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Captured value, or the declared default when the option was not matched.
    pub fn value<'a>(&'a self, spec: &'a OptionSpec) -> Option<&'a str> {
        if self.matched {
            self.value.as_deref()
        } else {
            spec.default_value()
        }
    }

    /// Every value collected by a repeated or delimited option, in order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub(crate) fn record(&mut self, shape: &ValueShape, raw: Option<&str>) {
        self.matched = true;
        self.value = raw.map(str::to_string);
        let Some(raw) = raw else {
            return;
        };
        match shape {
            ValueShape::Single => {}
            ValueShape::Repeated => self.values.push(raw.to_string()),
            ValueShape::Delimited(delims) => self.values.extend(
                raw.split(|c: char| delims.contains(c))
                    .filter(|piece| !piece.is_empty())
                    .map(str::to_string),
            ),
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = OptionState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_only_when_unmatched() {
        let opt = Opt::new("name").takes_value().default_value("D");
        let mut state = OptionState::default();
        assert_eq!(state.value(opt.spec()), Some("D"));

        state.record(opt.spec().shape(), Some("V"));
        assert_eq!(state.value(opt.spec()), Some("V"));
        assert!(state.was_matched());
    }

    #[test]
    fn matched_switch_has_no_value_even_with_default() {
        let opt = Opt::new("flag").default_value("D");
        let mut state = OptionState::default();
        state.record(opt.spec().shape(), None);
        assert!(state.was_matched());
        assert_eq!(state.value(opt.spec()), None);
    }

    #[test]
    fn single_overwrites_repeated_appends() {
        let single = Opt::new("s").takes_value();
        let mut state = OptionState::default();
        state.record(single.spec().shape(), Some("a"));
        state.record(single.spec().shape(), Some("b"));
        assert_eq!(state.captured(), Some("b"));
        assert!(state.values().is_empty());

        let rep = Opt::repeatable("r");
        let mut state = OptionState::default();
        state.record(rep.spec().shape(), Some("a"));
        state.record(rep.spec().shape(), Some("b"));
        assert_eq!(state.captured(), Some("b"));
        assert_eq!(state.values(), ["a", "b"]);
    }

    #[test]
    fn delimited_splits_and_drops_empty_pieces() {
        let opt = Opt::delimited_default("zed");
        let mut state = OptionState::default();
        state.record(opt.spec().shape(), Some("a,b,c"));
        assert_eq!(state.values(), ["a", "b", "c"]);
        state.record(opt.spec().shape(), Some(",d,,e,"));
        assert_eq!(state.values(), ["a", "b", "c", "d", "e"]);
        assert_eq!(state.captured(), Some(",d,,e,"));
    }

    #[test]
    fn delimiter_set_splits_on_any_member() {
        let opt = Opt::delimited("path", ":;");
        let mut state = OptionState::default();
        state.record(opt.spec().shape(), Some("a:b;c"));
        assert_eq!(state.values(), ["a", "b", "c"]);
    }

    #[test]
    fn reset_clears_everything() {
        let opt = Opt::repeatable("r");
        let mut state = OptionState::default();
        state.record(opt.spec().shape(), Some("x"));
        state.reset();
        assert_eq!(state, OptionState::default());
    }

    #[test]
    fn posix_name_classification() {
        let short = Opt::posix("d", false);
        assert_eq!(short.spec().short_name(), Some('d'));
        assert_eq!(short.spec().long_name(), None);
        assert!(short.spec().is_posix());

        let long = Opt::posix("display", true);
        assert_eq!(long.spec().short_name(), None);
        assert_eq!(long.spec().long_name(), Some("display"));
        assert!(long.spec().takes_value());
    }

    #[test]
    fn joined_descriptor() {
        let opt = Opt::joined('D', true);
        let spec = opt.spec();
        assert_eq!(spec.short_name(), Some('D'));
        assert!(spec.takes_value());
        assert_eq!(spec.attachment(), Attachment::Joined { can_split: true });
        assert_eq!(spec.shape(), &ValueShape::Repeated);
    }

    #[test]
    fn display_name_prefers_long() {
        assert_eq!(Opt::new("one").short('1').spec().display_name(), "one");
        assert_eq!(Opt::short_only('x').spec().display_name(), "x");
        assert!(!Opt::new("").spec().has_name());
    }
}
