//! The command parser: configuration, the argv walk and post-parse checks.

use crate::constraint::Constraint;
use crate::error::{Error, Fault, Result};
use crate::group::{GroupId, OwnerGroup};
use crate::help;
use crate::notify::{
    self, ConstraintEvent, Ctx, FaultEvent, Handlers, MissingArgument, OptionEvent, ShadowEvent,
    TokenEvent,
};
use crate::option::{Attachment, Opt, OptionId, OptionState};
use crate::strings::Strings;
use crate::table::{Fired, OptionSet};
use crate::terminal::{ProcessTerminal, Terminal};

// ============================================================================
// Config
// ============================================================================

pub(crate) struct Config {
    pub(crate) app_name: String,
    pub(crate) arg_help: Option<String>,
    pub(crate) short_switch: char,
    pub(crate) long_switch: String,
    pub(crate) end_marker: Option<String>,
    pub(crate) autohelp: bool,
    pub(crate) allow_zero_args: bool,
    pub(crate) exit_on_help: bool,
    pub(crate) exit_on_unknown: Option<i32>,
    pub(crate) missing_argument: MissingArgument,
    pub(crate) header: Option<String>,
    pub(crate) footer: Option<String>,
}

impl Config {
    pub(crate) fn new(app_name: &str) -> Self {
        Config {
            app_name: app_name.to_string(),
            arg_help: None,
            short_switch: '-',
            long_switch: "--".to_string(),
            end_marker: Some("--".to_string()),
            autohelp: true,
            allow_zero_args: true,
            exit_on_help: true,
            exit_on_unknown: Some(1),
            missing_argument: MissingArgument::default(),
            header: None,
            footer: None,
        }
    }
}

/// Outcome of [`Parser::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Every token was walked and every constraint holds.
    Complete,
    /// A notification stopped the parse without requesting an exit.
    Halted,
    /// Termination was requested and the terminal returned.
    Exited(i32),
}

impl Status {
    pub fn is_complete(&self) -> bool {
        *self == Status::Complete
    }
}

// ============================================================================
// ParserBuilder
// ============================================================================

pub struct ParserBuilder {
    config: Config,
    strings: Strings,
    terminal: Option<Box<dyn Terminal>>,
    handlers: Handlers,
}

impl ParserBuilder {
    pub fn new(app_name: &str) -> Self {
        ParserBuilder {
            config: Config::new(app_name),
            strings: Strings::new(),
            terminal: None,
            handlers: Handlers::default(),
        }
    }

    /// Placeholder for positional arguments, shown after the options.
    pub fn arg_help(mut self, help: &str) -> Self {
        self.config.arg_help = Some(help.to_string());
        self
    }

    pub fn short_switch(mut self, c: char) -> Self {
        self.config.short_switch = c;
        self
    }

    /// Long switch prefix; must be at least two characters.
    pub fn long_switch(mut self, prefix: &str) -> Self {
        self.config.long_switch = prefix.to_string();
        self
    }

    /// Token after which everything is positional. `None` disables it.
    pub fn end_marker(mut self, marker: Option<&str>) -> Self {
        self.config.end_marker = marker.map(str::to_string);
        self
    }

    pub fn autohelp(mut self, enabled: bool) -> Self {
        self.config.autohelp = enabled;
        self
    }

    pub fn allow_zero_args(mut self, allow: bool) -> Self {
        self.config.allow_zero_args = allow;
        self
    }

    /// Whether `--help`/`--usage` exit 0 after printing.
    pub fn exit_on_help(mut self, exit: bool) -> Self {
        self.config.exit_on_help = exit;
        self
    }

    /// Exit status after reporting an unknown or malformed switch. `None`
    /// only halts the parse.
    pub fn exit_on_unknown(mut self, status: Option<i32>) -> Self {
        self.config.exit_on_unknown = status;
        self
    }

    pub fn missing_argument(mut self, policy: MissingArgument) -> Self {
        self.config.missing_argument = policy;
        self
    }

    pub fn help_header(mut self, text: &str) -> Self {
        self.config.header = Some(text.to_string());
        self
    }

    pub fn help_footer(mut self, text: &str) -> Self {
        self.config.footer = Some(text.to_string());
        self
    }

    pub fn terminal<T: Terminal + 'static>(mut self, terminal: T) -> Self {
        self.terminal = Some(Box::new(terminal));
        self
    }

    pub fn strings(mut self, strings: Strings) -> Self {
        self.strings = strings;
        self
    }

    pub fn on_shadow<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&ShadowEvent<'_>) -> bool + 'static,
    {
        self.handlers.shadow = Some(Box::new(handler));
        self
    }

    pub fn on_constraint_failure<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&ConstraintEvent<'_>, &mut Ctx<'_>) + 'static,
    {
        self.handlers.constraint_failure = Some(Box::new(handler));
        self
    }

    pub fn on_match_fault<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&FaultEvent<'_>, &mut Ctx<'_>) -> bool + 'static,
    {
        self.handlers.match_fault = Some(Box::new(handler));
        self
    }

    pub fn on_execute_fault<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&FaultEvent<'_>, &mut Ctx<'_>) -> bool + 'static,
    {
        self.handlers.execute_fault = Some(Box::new(handler));
        self
    }

    pub fn on_missing_argument<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&OptionEvent<'_>, &mut Ctx<'_>) -> bool + 'static,
    {
        self.handlers.missing_argument = Some(Box::new(handler));
        self
    }

    pub fn on_invalid_combination<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&TokenEvent<'_>, &mut Ctx<'_>) + 'static,
    {
        self.handlers.invalid_combination = Some(Box::new(handler));
        self
    }

    pub fn on_unknown_option<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&TokenEvent<'_>, &mut Ctx<'_>) + 'static,
    {
        self.handlers.unknown_option = Some(Box::new(handler));
        self
    }

    pub fn on_unknown_switch<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&TokenEvent<'_>, &mut Ctx<'_>) + 'static,
    {
        self.handlers.unknown_switch = Some(Box::new(handler));
        self
    }

    pub fn build(self) -> Result<Parser> {
        if self.config.long_switch.chars().count() < 2 {
            return Err(Error::LongSwitchTooShort(self.config.long_switch));
        }
        let terminal = self
            .terminal
            .unwrap_or_else(|| Box::new(ProcessTerminal::new()));
        Ok(Parser {
            config: self.config,
            options: OptionSet::default(),
            constraints: Vec::new(),
            handlers: self.handlers,
            strings: self.strings,
            terminal,
            autohelp: None,
            leftovers: Vec::new(),
            match_order: Vec::new(),
            exit: None,
        })
    }
}

// ============================================================================
// Parser
// ============================================================================

/// The help group registered on first parse. A key the user already holds
/// stays theirs, so either option may be missing.
struct AutoHelp {
    group: GroupId,
    help: Option<OptionId>,
    usage: Option<OptionId>,
}

enum Token {
    Positional,
    Resolved { id: OptionId, inline: Option<String> },
    InvalidCombination(String),
    UnknownSwitch(String),
    UnknownOption(String),
}

#[derive(Clone, Copy)]
enum Rejected {
    InvalidCombination,
    UnknownSwitch,
    UnknownOption,
}

impl Rejected {
    /// The default message quotes the whole token rather than the key.
    fn shows_token(self) -> bool {
        matches!(self, Rejected::UnknownOption)
    }
}

pub struct Parser {
    config: Config,
    options: OptionSet,
    constraints: Vec<Box<dyn Constraint>>,
    handlers: Handlers,
    strings: Strings,
    terminal: Box<dyn Terminal>,
    autohelp: Option<AutoHelp>,
    leftovers: Vec<String>,
    match_order: Vec<OptionId>,
    exit: Option<i32>,
}

fn split_inline(text: &str) -> (&str, Option<String>) {
    match text.split_once('=') {
        Some((key, value)) => (key, Some(value.to_string())),
        None => (text, None),
    }
}

impl Parser {
    pub fn builder(app_name: &str) -> ParserBuilder {
        ParserBuilder::new(app_name)
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register a group. Keys already taken go through the shadow handler;
    /// an option with a refused key is left out of the group.
    pub fn add_group(&mut self, group: OwnerGroup) -> Result<GroupId> {
        let Parser {
            options,
            handlers,
            terminal,
            strings,
            config,
            ..
        } = self;
        options.register(group, &mut |event| match handlers.shadow.as_mut() {
            Some(handler) => handler(event),
            None => notify::shadow_warning(event, terminal.as_mut(), strings, config),
        })
    }

    /// Unregister every key the group still owns. Returns false if the group
    /// is unknown or already removed.
    pub fn remove_group(&mut self, group: GroupId) -> bool {
        if self.autohelp.as_ref().is_some_and(|a| a.group == group) {
            self.autohelp = None;
        }
        self.options.remove_group(group)
    }

    pub fn add_constraint<C: Constraint + 'static>(&mut self, constraint: C) -> Result<()> {
        if let Some(&id) = constraint
            .options()
            .iter()
            .find(|&&id| !self.options.contains(id))
        {
            return Err(Error::UnknownOption(id));
        }
        self.constraints.push(Box::new(constraint));
        Ok(())
    }

    pub fn enable_autohelp(&mut self, autohelp: bool, allow_zero_args: bool) {
        self.config.autohelp = autohelp;
        self.config.allow_zero_args = allow_zero_args;
    }

    pub fn set_missing_argument(&mut self, policy: MissingArgument) {
        self.config.missing_argument = policy;
    }

    fn sync_autohelp(&mut self) {
        match (self.config.autohelp, self.autohelp.as_ref().map(|a| a.group)) {
            (true, None) => {
                let group = OwnerGroup::new(&self.strings.get("help.group"))
                    .option(
                        Opt::new("help")
                            .short('?')
                            .description(&self.strings.get("help.help")),
                    )
                    .option(Opt::new("usage").description(&self.strings.get("help.usage")));
                let registered = self.options.register(group, &mut |event| {
                    tracing::debug!(key = %event.key, "key already taken, left out of autohelp");
                    false
                });
                let Ok(gid) = registered else {
                    return;
                };
                let members = self.options.options_of(gid);
                let find = |name: &str| {
                    members
                        .iter()
                        .copied()
                        .find(|&id| self.options.spec_of(id).long_name() == Some(name))
                };
                let (help, usage) = (find("help"), find("usage"));
                if help.is_none() && usage.is_none() {
                    self.options.remove_group(gid);
                }
                self.autohelp = Some(AutoHelp {
                    group: gid,
                    help,
                    usage,
                });
            }
            (false, Some(gid)) => {
                self.remove_group(gid);
            }
            _ => {}
        }
    }

    // ========================================================================
    // Lookup and results
    // ========================================================================

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn options_of(&self, group: GroupId) -> &[OptionId] {
        self.options.options_of(group)
    }

    pub fn find_long(&self, name: &str) -> Option<OptionId> {
        self.options.find_long(name)
    }

    pub fn find_short(&self, c: char) -> Option<OptionId> {
        self.options.find_short(c)
    }

    pub fn matched(&self, id: OptionId) -> bool {
        self.options.matched(id)
    }

    pub fn value(&self, id: OptionId) -> Option<&str> {
        self.options.value(id)
    }

    pub fn values(&self, id: OptionId) -> &[String] {
        self.options.values(id)
    }

    pub fn state(&self, id: OptionId) -> Option<&OptionState> {
        self.options.state(id)
    }

    /// Positional arguments from the last parse, in order.
    pub fn leftovers(&self) -> &[String] {
        &self.leftovers
    }

    /// Clear all per-parse state.
    pub fn reset(&mut self) {
        self.options.reset_all();
        self.leftovers.clear();
        self.match_order.clear();
        self.exit = None;
    }

    // ========================================================================
    // Help output
    // ========================================================================

    pub fn usage(&self) -> String {
        help::usage(&self.options, &self.config, &self.strings)
    }

    pub fn help(&self) -> String {
        help::help(&self.options, &self.config, &self.strings)
    }

    pub fn print_usage(&mut self) {
        let text = self.usage();
        let _ = write!(self.terminal.stdout(), "{}", text);
    }

    pub fn print_help(&mut self) {
        let text = self.help();
        let _ = write!(self.terminal.stdout(), "{}", text);
    }

    // ========================================================================
    // Parsing
    // ========================================================================

    pub fn parse<I, S>(&mut self, args: I) -> Status
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        self.reset();
        self.sync_autohelp();
        tracing::debug!(app = %self.config.app_name, args = args.len(), "parsing");

        if args.is_empty() && !self.config.allow_zero_args {
            let usage = self.usage();
            let _ = write!(self.terminal.stderr(), "{}", usage);
            return Status::Halted;
        }
        if self.walk(&args) && self.check_constraints() {
            return Status::Complete;
        }
        match self.exit {
            Some(status) => Status::Exited(status),
            None => {
                tracing::debug!("parse halted");
                Status::Halted
            }
        }
    }

    /// Returns false when the walk was halted.
    fn walk(&mut self, args: &[String]) -> bool {
        let mut ended = false;
        let mut i = 0;
        while i < args.len() {
            let token = args[i].as_str();
            i += 1;
            if token.is_empty() {
                continue;
            }
            if ended {
                self.leftovers.push(token.to_string());
                continue;
            }
            if self.config.end_marker.as_deref() == Some(token) {
                tracing::trace!("end of options");
                ended = true;
                continue;
            }
            tracing::trace!(token, "token");

            let (id, inline) = match self.classify(token) {
                Token::Positional => {
                    self.leftovers.push(token.to_string());
                    continue;
                }
                Token::Resolved { id, inline } => (id, inline),
                Token::InvalidCombination(key) => {
                    self.reject(Rejected::InvalidCombination, token, &key);
                    return false;
                }
                Token::UnknownSwitch(key) => {
                    self.reject(Rejected::UnknownSwitch, token, &key);
                    return false;
                }
                Token::UnknownOption(key) => {
                    self.reject(Rejected::UnknownOption, token, &key);
                    return false;
                }
            };

            let value = if self.options.spec_of(id).takes_value() {
                match self.take_value(id, inline, args, &mut i) {
                    Some(value) => Some(value),
                    None if self.notify_missing(id, token) => continue,
                    None => return false,
                }
            } else {
                None
            };

            if !self.fire(id, value.as_deref()) {
                return false;
            }
        }
        true
    }

    fn classify(&self, token: &str) -> Token {
        let short = self.config.short_switch;
        let switch_shaped = token.starts_with(short);

        if let Some(body) = token.strip_prefix(short) {
            let mut chars = body.chars();
            match (chars.next(), chars.next()) {
                (None, _) => return Token::Positional,
                (Some(c), None) => {
                    return match self.options.find_short(c) {
                        Some(id) => Token::Resolved { id, inline: None },
                        None => Token::UnknownSwitch(c.to_string()),
                    };
                }
                (Some(c), Some(_)) if c != short => return self.classify_bundle(body, c),
                _ => {}
            }
        }

        match token.strip_prefix(self.config.long_switch.as_str()) {
            Some(rest) => {
                let (key, inline) = split_inline(rest);
                match self
                    .options
                    .find_long(key)
                    .filter(|&id| !self.options.spec_of(id).is_posix())
                {
                    Some(id) => Token::Resolved { id, inline },
                    None => Token::UnknownOption(key.to_string()),
                }
            }
            None if switch_shaped => {
                let body = &token[short.len_utf8()..];
                Token::UnknownOption(split_inline(body).0.to_string())
            }
            None => Token::Positional,
        }
    }

    /// A short-prefixed token of three or more characters: a POSIX long
    /// name, a joined value, or a rejected bundle.
    fn classify_bundle(&self, body: &str, first: char) -> Token {
        let (key, inline) = split_inline(body);
        if let Some(id) = self
            .options
            .find_long(key)
            .filter(|&id| self.options.spec_of(id).is_posix())
        {
            return Token::Resolved { id, inline };
        }
        if let Some(id) = self
            .options
            .find_short(first)
            .filter(|&id| self.options.spec_of(id).is_joined())
        {
            let rest = &body[first.len_utf8()..];
            return Token::Resolved {
                id,
                inline: Some(rest.to_string()),
            };
        }
        Token::InvalidCombination(body.to_string())
    }

    fn take_value(
        &self,
        id: OptionId,
        inline: Option<String>,
        args: &[String],
        i: &mut usize,
    ) -> Option<String> {
        if let Some(value) = inline {
            return (!value.is_empty()).then_some(value);
        }
        if self.options.spec_of(id).attachment() == (Attachment::Joined { can_split: false }) {
            return None;
        }
        let next = args.get(*i).cloned();
        if next.is_some() {
            *i += 1;
        }
        next
    }

    /// Record a match and run its callbacks. Returns false to halt.
    fn fire(&mut self, id: OptionId, value: Option<&str>) -> bool {
        let target = self.options.resolve_checked(id).unwrap_or(id);
        match self.options.fire(id, value) {
            Ok(_) => {}
            Err(fired) => {
                let fault = match fired {
                    Fired::Hook(fault) => fault,
                    Fired::Group(fault) => {
                        self.note_match(target);
                        fault
                    }
                };
                return self.notify_fault(false, id, &fault);
            }
        }
        self.note_match(target);

        let Some(auto) = self.autohelp.as_ref() else {
            return true;
        };
        let text = if auto.help == Some(id) {
            self.help()
        } else if auto.usage == Some(id) {
            self.usage()
        } else {
            return true;
        };
        let _ = write!(self.terminal.stdout(), "{}", text);
        if self.config.exit_on_help {
            self.exit = Some(0);
            self.terminal.exit(0);
            return false;
        }
        true
    }

    fn note_match(&mut self, target: OptionId) {
        if !self.match_order.contains(&target) {
            self.match_order.push(target);
        }
    }

    fn check_constraints(&mut self) -> bool {
        let Parser {
            options,
            config,
            strings,
            terminal,
            exit,
            handlers,
            constraints,
            ..
        } = self;
        let Some(failed) = constraints.iter().find(|c| !c.is_satisfied(options)) else {
            return true;
        };
        let message = failed.message(options, strings);
        tracing::debug!(%message, status = failed.exit_status(), "constraint failed");
        let event = ConstraintEvent {
            constraint: failed.as_ref(),
            message: &message,
            exit_status: failed.exit_status(),
        };
        let mut ctx = Ctx::new(options, config, strings, terminal.as_mut(), exit);
        match handlers.constraint_failure.as_mut() {
            Some(handler) => handler(&event, &mut ctx),
            None => notify::constraint_failure(&event, &mut ctx),
        }
        false
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    fn notify_missing(&mut self, id: OptionId, token: &str) -> bool {
        let policy = self.config.missing_argument;
        let Parser {
            options,
            config,
            strings,
            terminal,
            exit,
            handlers,
            ..
        } = self;
        let event = OptionEvent {
            id,
            option: options.spec_of(id),
            token,
        };
        let mut ctx = Ctx::new(options, config, strings, terminal.as_mut(), exit);
        let go = match handlers.missing_argument.as_mut() {
            Some(handler) => handler(&event, &mut ctx),
            None => notify::missing_argument(&event, &mut ctx, policy),
        };
        go && self.exit.is_none()
    }

    fn notify_fault(&mut self, executing: bool, id: OptionId, fault: &Fault) -> bool {
        tracing::debug!(option = %self.options.display_name(id), %fault, executing, "option fault");
        let Parser {
            options,
            config,
            strings,
            terminal,
            exit,
            handlers,
            ..
        } = self;
        let event = FaultEvent {
            id,
            option: options.spec_of(id),
            fault,
        };
        let mut ctx = Ctx::new(options, config, strings, terminal.as_mut(), exit);
        let go = if executing {
            match handlers.execute_fault.as_mut() {
                Some(handler) => handler(&event, &mut ctx),
                None => notify::execute_fault(&event, &mut ctx),
            }
        } else {
            match handlers.match_fault.as_mut() {
                Some(handler) => handler(&event, &mut ctx),
                None => notify::match_fault(&event, &mut ctx),
            }
        };
        go && self.exit.is_none()
    }

    fn reject(&mut self, kind: Rejected, token: &str, key: &str) {
        tracing::debug!(token, "rejected token");
        let Parser {
            options,
            config,
            strings,
            terminal,
            exit,
            handlers,
            ..
        } = self;
        let (slot, message_key) = match kind {
            Rejected::InvalidCombination => {
                (&mut handlers.invalid_combination, "error.invalid-combination")
            }
            Rejected::UnknownSwitch => (&mut handlers.unknown_switch, "error.unknown-switch"),
            Rejected::UnknownOption => (&mut handlers.unknown_option, "error.unknown-option"),
        };
        let event = TokenEvent { token, key };
        let mut ctx = Ctx::new(options, config, strings, terminal.as_mut(), exit);
        match slot.as_mut() {
            Some(handler) => handler(&event, &mut ctx),
            None => notify::rejected_token(message_key, kind.shows_token(), &event, &mut ctx),
        }
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Run the execute hook of every option matched by the last parse, in
    /// match order. A fault the execute-fault handler does not accept stops
    /// the run and is returned.
    pub fn execute(&mut self) -> Result<()> {
        for target in self.match_order.clone() {
            let Err(fault) = self.options.run_execute(target) else {
                continue;
            };
            if !self.notify_fault(true, target, &fault) {
                return Err(Error::Execute {
                    option: self.options.display_name(target),
                    source: fault,
                });
            }
        }
        Ok(())
    }
}
