//! Post-parse constraints over the matched set.
//!
//! Constraints are checked in registration order once the walk is over. The
//! first one that fails is reported and stops the check.

use crate::option::OptionId;
use crate::strings::{substitute, Strings};
use crate::table::OptionSet;

pub trait Constraint {
    fn is_satisfied(&self, options: &OptionSet) -> bool;

    /// Status the default policy exits with when this constraint fails.
    fn exit_status(&self) -> i32;

    fn message(&self, options: &OptionSet, strings: &Strings) -> String;

    /// Every option the constraint refers to; checked at registration.
    fn options(&self) -> Vec<OptionId>;
}

fn names(options: &OptionSet, ids: &[OptionId]) -> Vec<String> {
    ids.iter().map(|&id| options.display_name(id)).collect()
}

fn any_matched(options: &OptionSet, ids: &[OptionId]) -> bool {
    ids.iter().any(|&id| options.matched(id))
}

/// Render either the caller's template or the catalog entry `key`.
fn render(custom: &Option<String>, strings: &Strings, key: &str, args: &[&str]) -> String {
    match custom {
        Some(template) => substitute(template, args),
        None => strings.format(key, args),
    }
}

// ============================================================================
// Required
// ============================================================================

/// The option must be matched.
pub struct Required {
    option: OptionId,
    status: i32,
    custom: Option<String>,
}

impl Required {
    pub fn new(status: i32, option: OptionId) -> Self {
        Required {
            option,
            status,
            custom: None,
        }
    }

    /// Replace the message; `{0}` is the option's name.
    pub fn with_message(mut self, template: &str) -> Self {
        self.custom = Some(template.to_string());
        self
    }
}

impl Constraint for Required {
    fn is_satisfied(&self, options: &OptionSet) -> bool {
        options.matched(self.option)
    }

    fn exit_status(&self) -> i32 {
        self.status
    }

    fn message(&self, options: &OptionSet, strings: &Strings) -> String {
        let name = options.display_name(self.option);
        render(&self.custom, strings, "constraint.required", &[&name])
    }

    fn options(&self) -> Vec<OptionId> {
        vec![self.option]
    }
}

// ============================================================================
// MutuallyExclusive
// ============================================================================

/// At most one of the pair may be matched.
pub struct MutuallyExclusive {
    first: OptionId,
    second: OptionId,
    status: i32,
    custom: Option<String>,
}

impl MutuallyExclusive {
    pub fn new(status: i32, first: OptionId, second: OptionId) -> Self {
        MutuallyExclusive {
            first,
            second,
            status,
            custom: None,
        }
    }

    /// Replace the message; `{0}` and `{1}` are the two names.
    pub fn with_message(mut self, template: &str) -> Self {
        self.custom = Some(template.to_string());
        self
    }
}

impl Constraint for MutuallyExclusive {
    fn is_satisfied(&self, options: &OptionSet) -> bool {
        !(options.matched(self.first) && options.matched(self.second))
    }

    fn exit_status(&self) -> i32 {
        self.status
    }

    fn message(&self, options: &OptionSet, strings: &Strings) -> String {
        let first = options.display_name(self.first);
        let second = options.display_name(self.second);
        render(&self.custom, strings, "constraint.mutex", &[&first, &second])
    }

    fn options(&self) -> Vec<OptionId> {
        vec![self.first, self.second]
    }
}

// ============================================================================
// RequiresAnyOf / RequiresOneOf
// ============================================================================

/// If `dependent` is matched, at least one of `any_of` must be too.
pub struct RequiresAnyOf {
    dependent: OptionId,
    any_of: Vec<OptionId>,
    status: i32,
    custom: Option<String>,
}

impl RequiresAnyOf {
    pub fn new(status: i32, dependent: OptionId, any_of: &[OptionId]) -> Self {
        RequiresAnyOf {
            dependent,
            any_of: any_of.to_vec(),
            status,
            custom: None,
        }
    }

    /// Replace the message; `{0}` is the dependent, `{1}` the quoted list.
    pub fn with_message(mut self, template: &str) -> Self {
        self.custom = Some(template.to_string());
        self
    }
}

impl Constraint for RequiresAnyOf {
    fn is_satisfied(&self, options: &OptionSet) -> bool {
        !options.matched(self.dependent) || any_matched(options, &self.any_of)
    }

    fn exit_status(&self) -> i32 {
        self.status
    }

    fn message(&self, options: &OptionSet, strings: &Strings) -> String {
        let dependent = options.display_name(self.dependent);
        let list = strings.quoted_list(&names(options, &self.any_of));
        render(&self.custom, strings, "constraint.requires-any", &[&dependent, &list])
    }

    fn options(&self) -> Vec<OptionId> {
        let mut ids = vec![self.dependent];
        ids.extend_from_slice(&self.any_of);
        ids
    }
}

/// At least one of the set must be matched.
pub struct RequiresOneOf {
    one_of: Vec<OptionId>,
    status: i32,
    custom: Option<String>,
}

impl RequiresOneOf {
    pub fn new(status: i32, one_of: &[OptionId]) -> Self {
        RequiresOneOf {
            one_of: one_of.to_vec(),
            status,
            custom: None,
        }
    }

    /// Replace the message; `{0}` is the quoted list.
    pub fn with_message(mut self, template: &str) -> Self {
        self.custom = Some(template.to_string());
        self
    }
}

impl Constraint for RequiresOneOf {
    fn is_satisfied(&self, options: &OptionSet) -> bool {
        any_matched(options, &self.one_of)
    }

    fn exit_status(&self) -> i32 {
        self.status
    }

    fn message(&self, options: &OptionSet, strings: &Strings) -> String {
        let list = strings.quoted_list(&names(options, &self.one_of));
        render(&self.custom, strings, "constraint.requires-one", &[&list])
    }

    fn options(&self) -> Vec<OptionId> {
        self.one_of.clone()
    }
}
