//! User-visible text catalog.
//!
//! Every message the parser prints goes through [`Strings`] by key. A
//! caller-supplied lookup is consulted first; keys it does not know fall back
//! to the built-in English text. Templates use positional `{0}`, `{1}`, ...
//! placeholders.

pub type Lookup = Box<dyn Fn(&str) -> Option<String>>;

const CATALOG: &[(&str, &str)] = &[
    ("usage.prefix", "Usage:  "),
    ("help.synopsis", "[OPTION...]"),
    ("help.group", "Help options"),
    ("help.help", "show this help message"),
    ("help.usage", "show brief usage message"),
    ("help.default-arg", "<arg>"),
    ("help.default", "default: "),
    ("word.or", "or"),
    ("action.exit", "Exiting."),
    ("action.ignore", "Ignored."),
    ("error.missing-argument", "error:  option {0} requires parameter '{1}'.  {2}"),
    ("error.invalid-combination", "error:  invalid option combination '{0}'."),
    ("error.unknown-switch", "error:  unknown switch '{0}' specified."),
    ("error.unknown-option", "error:  unknown option specified ({0})."),
    ("error.constraint", "error:  {0}.  {1}"),
    ("error.match-fault", "error:  option {0} failed: {1}"),
    ("error.execute-fault", "error:  option {0} failed to execute: {1}"),
    ("warning.shadow", "warning:  option {0} ({1}) overrides option {2} ({3})."),
    ("constraint.required", "option '{0}' is required"),
    ("constraint.mutex", "cannot specify both '{0}' and '{1}'"),
    ("constraint.requires-any", "option '{0}' requires {1}"),
    ("constraint.requires-one", "one of {0} must be specified"),
];

#[derive(Default)]
pub struct Strings {
    lookup: Option<Lookup>,
}

impl Strings {
    pub fn new() -> Self {
        Strings::default()
    }

    /// Catalog that asks `lookup` first and falls back to the English text.
    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        Strings {
            lookup: Some(Box::new(lookup)),
        }
    }

    /// Text for `key`. Unknown keys come back verbatim.
    pub fn get(&self, key: &str) -> String {
        if let Some(text) = self.lookup.as_ref().and_then(|lookup| lookup(key)) {
            return text;
        }
        CATALOG
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, text)| (*text).to_string())
            .unwrap_or_else(|| key.to_string())
    }

    pub fn format(&self, key: &str, args: &[&str]) -> String {
        substitute(&self.get(key), args)
    }

    /// Quoted, `or`-joined list: `'a'`, `'a' or 'b'`, `'a', 'b' or 'c'`.
    pub fn quoted_list(&self, names: &[String]) -> String {
        let quoted: Vec<String> = names.iter().map(|n| format!("'{}'", n)).collect();
        match quoted.split_last() {
            None => String::new(),
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{} {} {}", rest.join(", "), self.get("word.or"), last),
        }
    }
}

/// Replace `{n}` with `args[n]`. Placeholders without an argument are kept.
pub fn substitute(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let arg = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            args.get(index).map(|a| (close, *a))
        });
        match arg {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_positional_args() {
        assert_eq!(substitute("{1} then {0}", &["a", "b"]), "b then a");
        assert_eq!(substitute("keep {2} and {x}", &["a"]), "keep {2} and {x}");
        assert_eq!(substitute("no placeholders", &[]), "no placeholders");
        assert_eq!(substitute("dangling {", &["a"]), "dangling {");
    }

    #[test]
    fn default_catalog() {
        let strings = Strings::new();
        assert_eq!(
            strings.format("error.unknown-switch", &["x"]),
            "error:  unknown switch 'x' specified."
        );
        assert_eq!(strings.get("no.such.key"), "no.such.key");
    }

    #[test]
    fn lookup_overrides_and_falls_back() {
        let strings = Strings::with_lookup(|key| match key {
            "help.group" => Some("Hilfe".to_string()),
            _ => None,
        });
        assert_eq!(strings.get("help.group"), "Hilfe");
        assert_eq!(strings.get("usage.prefix"), "Usage:  ");
    }

    #[test]
    fn quoted_lists() {
        let strings = Strings::new();
        let names = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(strings.quoted_list(&names(&["a"])), "'a'");
        assert_eq!(strings.quoted_list(&names(&["a", "b"])), "'a' or 'b'");
        assert_eq!(strings.quoted_list(&names(&["a", "b", "c"])), "'a', 'b' or 'c'");
    }
}
