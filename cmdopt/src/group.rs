//! Owner groups: the unit of registration, help grouping and match callback.

use crate::error::Fault;
use crate::option::{Alias, Opt, OptionId, OptionSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(pub(crate) usize);

/// Passed to a group's match callback.
#[derive(Debug)]
pub struct Match<'a> {
    /// Handle that matched. For an alias this is the alias, not its target.
    pub id: OptionId,
    pub option: &'a OptionSpec,
    pub value: Option<&'a str>,
}

pub type GroupAction = Box<dyn FnMut(&Match<'_>) -> Result<(), Fault>>;

pub(crate) enum Entry {
    Option(Opt),
    Alias(Alias),
}

/// A described set of options with one callback for all of them. Options
/// keep the order they were added in; help and usage print them that way.
pub struct OwnerGroup {
    pub(crate) description: String,
    pub(crate) entries: Vec<Entry>,
    pub(crate) action: Option<GroupAction>,
}

impl OwnerGroup {
    pub fn new(description: &str) -> Self {
        OwnerGroup {
            description: description.to_string(),
            entries: Vec::new(),
            action: None,
        }
    }

    pub fn option(mut self, opt: Opt) -> Self {
        self.entries.push(Entry::Option(opt));
        self
    }

    pub fn alias(mut self, alias: Alias) -> Self {
        self.entries.push(Entry::Alias(alias));
        self
    }

    /// Callback fired after an option's own match hook succeeds.
    pub fn on_match<F>(mut self, action: F) -> Self
    where
        F: FnMut(&Match<'_>) -> Result<(), Fault> + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
