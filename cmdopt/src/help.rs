//! Help and usage rendering.

use crate::option::OptionSpec;
use crate::parser::Config;
use crate::strings::Strings;
use crate::table::OptionSet;

/// Column where option descriptions start in help output.
pub const DESCRIPTION_COLUMN: usize = 35;
const HELP_WIDTH: usize = 80;
const USAGE_WIDTH: usize = 72;
const USAGE_INDENT: usize = 8;

// ============================================================================
// Text wrapping
// ============================================================================

/// Wrap `text` to `width` columns, preferring to break at `cut`.
///
/// A break goes after the last `cut` at or before the width; failing that,
/// after the last space; failing that, hard at the width. Whitespace around
/// the break is dropped, and every continuation line starts with `indent`
/// spaces and is `indent` columns narrower. Embedded newlines start a new
/// paragraph. Every output line ends in `\n`.
pub fn wrap(text: &str, cut: char, width: usize, indent: usize) -> String {
    let mut out = String::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(&mut out, paragraph, cut, width, indent);
    }
    out
}

fn wrap_paragraph(out: &mut String, text: &str, cut: char, width: usize, indent: usize) {
    let margin = " ".repeat(indent);
    let mut line: Vec<char> = text.chars().collect();
    let mut limit = width.max(1);

    while line.len() > limit {
        let (end, resume) = if line[limit] == cut {
            if cut.is_whitespace() {
                (limit, limit + 1)
            } else {
                (limit + 1, limit + 2)
            }
        } else {
            let at = line[..=limit]
                .iter()
                .rposition(|&c| c == cut)
                .or_else(|| line[..=limit].iter().rposition(|&c| c == ' '))
                .unwrap_or(limit - 1);
            (at + 1, at + 1)
        };

        let piece: String = line[..end].iter().collect();
        out.push_str(piece.trim_end());
        out.push('\n');
        out.push_str(&margin);

        let rest: String = line[resume.min(line.len())..].iter().collect();
        line = rest.trim().chars().collect();
        limit = width.saturating_sub(indent).max(1);
    }

    let tail: String = line.into_iter().collect();
    out.push_str(tail.trim_end());
    out.push('\n');
}

// ============================================================================
// Switch spelling
// ============================================================================

fn long_prefix<'a>(spec: &OptionSpec, config: &'a Config) -> std::borrow::Cow<'a, str> {
    if spec.is_posix() {
        config.short_switch.to_string().into()
    } else {
        config.long_switch.as_str().into()
    }
}

/// Preferred spelling of an option for diagnostics: the long form when it
/// has one.
pub(crate) fn switch_label(spec: &OptionSpec, config: &Config) -> String {
    match (spec.long_name(), spec.short_name()) {
        (Some(long), _) => format!("{}{}", long_prefix(spec, config), long),
        (None, Some(c)) => format!("{}{}", config.short_switch, c),
        (None, None) => String::new(),
    }
}

fn placeholder(spec: &OptionSpec, strings: &Strings) -> String {
    spec.arg_help()
        .map(str::to_string)
        .unwrap_or_else(|| strings.get("help.default-arg"))
}

// ============================================================================
// Usage
// ============================================================================

/// One bracketed entry of the usage line: `[-A|--arg ARG]`.
fn usage_entry(spec: &OptionSpec, config: &Config, strings: &Strings) -> String {
    let mut entry = String::from("[");
    if let Some(c) = spec.short_name() {
        entry.push(config.short_switch);
        entry.push(c);
        if spec.long_name().is_some() {
            entry.push('|');
        }
    }
    if let Some(long) = spec.long_name() {
        entry.push_str(&long_prefix(spec, config));
        entry.push_str(long);
    }
    if spec.takes_value() {
        let short = spec.short_name().is_some();
        if (short && !spec.is_joined()) || spec.is_posix() {
            entry.push(' ');
        } else if !short && !spec.is_joined() {
            entry.push('=');
        }
        entry.push_str(&placeholder(spec, strings));
    }
    entry.push(']');
    entry
}

pub(crate) fn usage(options: &OptionSet, config: &Config, strings: &Strings) -> String {
    let mut line = format!("{}{}", strings.get("usage.prefix"), config.app_name);
    for group in options.active_groups() {
        for &id in group.members.iter().filter(|&&id| options.is_visible(id)) {
            line.push(' ');
            line.push_str(&usage_entry(options.spec_of(id), config, strings));
        }
    }
    if let Some(arg_help) = &config.arg_help {
        line.push(' ');
        line.push_str(arg_help);
    }
    wrap(&line, ']', USAGE_WIDTH, USAGE_INDENT)
}

// ============================================================================
// Help
// ============================================================================

/// One option row: `  -A, --arg=ARG` padded to the description column.
fn help_row(spec: &OptionSpec, config: &Config, strings: &Strings) -> String {
    let mut row = String::from("  ");
    if let Some(c) = spec.short_name() {
        row.push(config.short_switch);
        row.push(c);
        if spec.long_name().is_some() {
            row.push_str(", ");
        }
    }
    if let Some(long) = spec.long_name() {
        row.push_str(&long_prefix(spec, config));
        row.push_str(long);
    }
    if spec.takes_value() {
        if spec.long_name().is_some() {
            row.push(if spec.is_posix() { ' ' } else { '=' });
        } else if !spec.is_joined() {
            row.push(' ');
        }
        row.push_str(&placeholder(spec, strings));
    }

    let used = row.chars().count();
    if used >= DESCRIPTION_COLUMN {
        row.push(' ');
    } else {
        row.push_str(&" ".repeat(DESCRIPTION_COLUMN - used));
    }
    row.push_str(spec.description().unwrap_or(""));
    if let Some(default) = spec.default_value().filter(|d| !d.is_empty()) {
        row.push_str(&format!(" ({}{})", strings.get("help.default"), default));
    }
    wrap(&row, ' ', HELP_WIDTH, DESCRIPTION_COLUMN)
}

pub(crate) fn help(options: &OptionSet, config: &Config, strings: &Strings) -> String {
    let mut out = format!(
        "{}{} {}",
        strings.get("usage.prefix"),
        config.app_name,
        strings.get("help.synopsis")
    );
    if let Some(arg_help) = &config.arg_help {
        out.push(' ');
        out.push_str(arg_help);
    }
    out.push('\n');

    if let Some(header) = &config.header {
        out.push('\n');
        out.push_str(&wrap(header, ' ', HELP_WIDTH, 0));
    }
    for group in options.active_groups() {
        out.push('\n');
        out.push_str(&group.description);
        out.push_str(":\n");
        for &id in group.members.iter().filter(|&&id| options.is_visible(id)) {
            out.push_str(&help_row(options.spec_of(id), config, strings));
        }
    }
    if let Some(footer) = &config.footer {
        out.push('\n');
        out.push_str(&wrap(footer, ' ', HELP_WIDTH, 0));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::OwnerGroup;
    use crate::option::Opt;

    fn config() -> Config {
        let mut config = Config::new("prog");
        config.arg_help = Some("FILE...".to_string());
        config
    }

    fn set_with(group: OwnerGroup) -> OptionSet {
        let mut set = OptionSet::default();
        set.register(group, &mut |_| true).unwrap();
        set
    }

    #[test]
    fn wrap_leaves_short_text_alone() {
        assert_eq!(wrap("short", ' ', 80, 4), "short\n");
        assert_eq!(wrap("", ' ', 80, 4), "\n");
    }

    #[test]
    fn wrap_breaks_on_spaces_and_indents() {
        let text = "aaaa bbbb cccc dddd";
        assert_eq!(wrap(text, ' ', 10, 0), "aaaa bbbb\ncccc dddd\n");
        assert_eq!(wrap(text, ' ', 10, 2), "aaaa bbbb\n  cccc\n  dddd\n");
    }

    #[test]
    fn wrap_keeps_cut_char_on_first_line() {
        let text = "Usage:  p [-a|--alpha] [-b|--bravo] [-c|--charlie]";
        assert_eq!(
            wrap(text, ']', 40, 8),
            "Usage:  p [-a|--alpha] [-b|--bravo]\n        [-c|--charlie]\n"
        );
    }

    #[test]
    fn wrap_hard_breaks_unbroken_text() {
        assert_eq!(wrap("abcdefghij", ' ', 4, 0), "abcd\nefgh\nij\n");
    }

    #[test]
    fn wrap_splits_paragraphs() {
        assert_eq!(wrap("one\ntwo", ' ', 80, 0), "one\ntwo\n");
    }

    #[test]
    fn usage_separators() {
        let set = set_with(
            OwnerGroup::new("g")
                .option(Opt::new("one").short('1'))
                .option(Opt::new("arg").short('A').takes_value().arg_help("ARG"))
                .option(Opt::new("name").takes_value())
                .option(Opt::joined('D', false).arg_help("KEY=VALUE"))
                .option(Opt::posix("display", true).arg_help("DPY"))
                .option(Opt::new("secret").hidden()),
        );
        assert_eq!(
            usage(&set, &config(), &Strings::new()),
            "Usage:  prog [-1|--one] [-A|--arg ARG] [--name=<arg>] [-DKEY=VALUE]\n        \
             [-display DPY] FILE...\n"
        );
    }

    #[test]
    fn help_rows_and_defaults() {
        let set = set_with(
            OwnerGroup::new("options")
                .option(Opt::new("arg").short('A').takes_value().arg_help("ARG").description("an arg"))
                .option(Opt::short_only('x').takes_value().description("short only").default_value("7"))
                .option(Opt::joined('D', false).arg_help("K=V").description("define")),
        );
        let expected = "\
Usage:  prog [OPTION...] FILE...

options:
  -A, --arg=ARG                    an arg
  -x <arg>                         short only (default: 7)
  -DK=V                            define
";
        assert_eq!(help(&set, &config(), &Strings::new()), expected);
    }

    #[test]
    fn long_rows_push_description_and_wrap() {
        let set = set_with(OwnerGroup::new("g").option(
            Opt::new("a-very-long-option-name-indeed")
                .takes_value()
                .arg_help("VALUE")
                .description("a description long enough that it has to wrap onto a second line"),
        ));
        let text = help(&set, &Config::new("prog"), &Strings::new());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[3],
            "  --a-very-long-option-name-indeed=VALUE a description long enough that it has"
        );
        assert_eq!(lines[4], format!("{}to wrap onto a second line", " ".repeat(35)));
    }

    #[test]
    fn header_and_footer() {
        let mut config = Config::new("prog");
        config.header = Some("Header text.".to_string());
        config.footer = Some("Footer text.".to_string());
        let set = OptionSet::default();
        assert_eq!(
            help(&set, &config, &Strings::new()),
            "Usage:  prog [OPTION...]\n\nHeader text.\n\nFooter text.\n"
        );
    }

    #[test]
    fn labels() {
        let config = Config::new("prog");
        assert_eq!(switch_label(Opt::new("arg").short('A').spec(), &config), "--arg");
        assert_eq!(switch_label(Opt::short_only('A').spec(), &config), "-A");
        assert_eq!(switch_label(Opt::posix("display", true).spec(), &config), "-display");
    }
}
