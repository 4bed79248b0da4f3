//! Parse-time notifications.
//!
//! Each notification kind has an optional handler slot on the parser. An
//! empty slot means the built-in policy below: print a diagnostic, then
//! either continue or terminate through the injected [`Terminal`].
//!
//! Handlers that return `bool` answer "keep going?". Returning `false` halts
//! the parse; so does calling [`Ctx::exit`].

use std::io::Write;

use crate::constraint::Constraint;
use crate::error::Fault;
use crate::help;
use crate::option::{OptionId, OptionSpec};
use crate::parser::Config;
use crate::strings::Strings;
use crate::table::{Key, OptionSet};
use crate::terminal::Terminal;

// ============================================================================
// Events
// ============================================================================

/// A new option wants a key another option already holds.
#[derive(Debug)]
pub struct ShadowEvent<'a> {
    pub key: Key,
    pub option: &'a OptionSpec,
    pub existing: &'a OptionSpec,
    pub existing_id: OptionId,
}

/// An option is involved; `token` is the argv element that named it.
#[derive(Debug)]
pub struct OptionEvent<'a> {
    pub id: OptionId,
    pub option: &'a OptionSpec,
    pub token: &'a str,
}

/// An argv element that could not be resolved. `key` is the unknown
/// character, the combination without its leading switch, or the option
/// name without its prefix and any `=value`.
#[derive(Debug)]
pub struct TokenEvent<'a> {
    pub token: &'a str,
    pub key: &'a str,
}

/// A match hook, group callback or execute hook returned an error.
#[derive(Debug)]
pub struct FaultEvent<'a> {
    pub id: OptionId,
    pub option: &'a OptionSpec,
    pub fault: &'a Fault,
}

pub struct ConstraintEvent<'a> {
    pub constraint: &'a dyn Constraint,
    pub message: &'a str,
    pub exit_status: i32,
}

/// What the default missing-argument policy does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingArgument {
    /// Report and terminate with this status.
    Exit(i32),
    /// Report and keep walking.
    Ignore,
}

impl Default for MissingArgument {
    fn default() -> Self {
        MissingArgument::Exit(1)
    }
}

pub type ShadowHandler = Box<dyn FnMut(&ShadowEvent<'_>) -> bool>;
pub type ConstraintHandler = Box<dyn FnMut(&ConstraintEvent<'_>, &mut Ctx<'_>)>;
pub type FaultHandler = Box<dyn FnMut(&FaultEvent<'_>, &mut Ctx<'_>) -> bool>;
pub type OptionHandler = Box<dyn FnMut(&OptionEvent<'_>, &mut Ctx<'_>) -> bool>;
pub type TokenHandler = Box<dyn FnMut(&TokenEvent<'_>, &mut Ctx<'_>)>;

#[derive(Default)]
pub(crate) struct Handlers {
    pub(crate) shadow: Option<ShadowHandler>,
    pub(crate) constraint_failure: Option<ConstraintHandler>,
    pub(crate) match_fault: Option<FaultHandler>,
    pub(crate) execute_fault: Option<FaultHandler>,
    pub(crate) missing_argument: Option<OptionHandler>,
    pub(crate) invalid_combination: Option<TokenHandler>,
    pub(crate) unknown_option: Option<TokenHandler>,
    pub(crate) unknown_switch: Option<TokenHandler>,
}

// ============================================================================
// Handler context
// ============================================================================

/// What a handler can reach while a parse is running.
pub struct Ctx<'a> {
    pub(crate) options: &'a OptionSet,
    pub(crate) config: &'a Config,
    pub(crate) strings: &'a Strings,
    pub(crate) terminal: &'a mut dyn Terminal,
    pub(crate) exit: &'a mut Option<i32>,
}

impl<'a> Ctx<'a> {
    pub(crate) fn new(
        options: &'a OptionSet,
        config: &'a Config,
        strings: &'a Strings,
        terminal: &'a mut dyn Terminal,
        exit: &'a mut Option<i32>,
    ) -> Self {
        Ctx {
            options,
            config,
            strings,
            terminal,
            exit,
        }
    }

    pub fn options(&self) -> &'a OptionSet {
        self.options
    }

    pub fn strings(&self) -> &'a Strings {
        self.strings
    }

    pub fn usage(&self) -> String {
        help::usage(self.options, self.config, self.strings)
    }

    pub fn help(&self) -> String {
        help::help(self.options, self.config, self.strings)
    }

    /// `spec` as the user types it: `--arg`, `-A`, `-display`.
    pub fn switch_label(&self, spec: &OptionSpec) -> String {
        help::switch_label(spec, self.config)
    }

    pub fn stdout(&mut self) -> &mut dyn Write {
        self.terminal.stdout()
    }

    pub fn stderr(&mut self) -> &mut dyn Write {
        self.terminal.stderr()
    }

    /// Request termination. The parse halts and reports
    /// [`Status::Exited`](crate::Status::Exited) if the terminal returns.
    pub fn exit(&mut self, status: i32) {
        *self.exit = Some(status);
        self.terminal.exit(status);
    }

    fn report_with_usage(&mut self, message: &str) {
        let usage = self.usage();
        let err = self.terminal.stderr();
        let _ = writeln!(err, "{}", message);
        let _ = write!(err, "{}", usage);
    }
}

// ============================================================================
// Default policies
// ============================================================================

pub(crate) fn shadow_warning(
    event: &ShadowEvent<'_>,
    terminal: &mut dyn Terminal,
    strings: &Strings,
    config: &Config,
) -> bool {
    let key = match &event.key {
        Key::Long(name) => {
            let prefix = if event.option.is_posix() {
                config.short_switch.to_string()
            } else {
                config.long_switch.clone()
            };
            format!("{}{}", prefix, name)
        }
        Key::Short(c) => format!("{}{}", config.short_switch, c),
    };
    let message = strings.format(
        "warning.shadow",
        &[
            &key,
            event.option.description().unwrap_or(""),
            &key,
            event.existing.description().unwrap_or(""),
        ],
    );
    let _ = writeln!(terminal.stderr(), "{}", message);
    true
}

pub(crate) fn constraint_failure(event: &ConstraintEvent<'_>, ctx: &mut Ctx<'_>) {
    let message = ctx
        .strings
        .format("error.constraint", &[event.message, &ctx.strings.get("action.exit")]);
    ctx.report_with_usage(&message);
    ctx.exit(event.exit_status);
}

pub(crate) fn match_fault(event: &FaultEvent<'_>, ctx: &mut Ctx<'_>) -> bool {
    let label = ctx.switch_label(event.option);
    let message = ctx
        .strings
        .format("error.match-fault", &[&label, &event.fault.to_string()]);
    let _ = writeln!(ctx.stderr(), "{}", message);
    false
}

pub(crate) fn execute_fault(event: &FaultEvent<'_>, ctx: &mut Ctx<'_>) -> bool {
    let label = ctx.switch_label(event.option);
    let message = ctx
        .strings
        .format("error.execute-fault", &[&label, &event.fault.to_string()]);
    let _ = writeln!(ctx.stderr(), "{}", message);
    false
}

pub(crate) fn missing_argument(
    event: &OptionEvent<'_>,
    ctx: &mut Ctx<'_>,
    policy: MissingArgument,
) -> bool {
    let label = ctx.switch_label(event.option);
    let placeholder = event
        .option
        .arg_help()
        .map(str::to_string)
        .unwrap_or_else(|| ctx.strings.get("help.default-arg"));
    let action = match policy {
        MissingArgument::Exit(_) => ctx.strings.get("action.exit"),
        MissingArgument::Ignore => ctx.strings.get("action.ignore"),
    };
    let message = ctx
        .strings
        .format("error.missing-argument", &[&label, &placeholder, &action]);
    match policy {
        MissingArgument::Exit(status) => {
            ctx.report_with_usage(&message);
            ctx.exit(status);
            false
        }
        MissingArgument::Ignore => {
            let _ = writeln!(ctx.stderr(), "{}", message);
            true
        }
    }
}

/// Shared by unknown option, unknown switch and invalid combination.
pub(crate) fn rejected_token(
    key: &str,
    show_token: bool,
    event: &TokenEvent<'_>,
    ctx: &mut Ctx<'_>,
) {
    let shown = if show_token { event.token } else { event.key };
    let message = ctx.strings.format(key, &[shown]);
    ctx.report_with_usage(&message);
    if let Some(status) = ctx.config.exit_on_unknown {
        ctx.exit(status);
    }
}
