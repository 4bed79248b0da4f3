//! Option registry: registered specs, their per-parse state, owner groups and
//! the long/short lookup tables.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Fault, Result};
use crate::group::{Entry, GroupAction, GroupId, Match, OwnerGroup};
use crate::notify::ShadowEvent;
use crate::option::{ExecuteHook, MatchHook, OptionId, OptionSpec, OptionState};

/// A lookup key in the option table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Long(String),
    Short(char),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Long(name) => f.write_str(name),
            Key::Short(c) => write!(f, "{}", c),
        }
    }
}

pub(crate) struct Slot {
    pub(crate) spec: OptionSpec,
    /// Set for aliases; state and hooks live on the target.
    pub(crate) target: Option<OptionId>,
    pub(crate) group: GroupId,
    pub(crate) on_match: Option<MatchHook>,
    pub(crate) on_execute: Option<ExecuteHook>,
}

pub(crate) struct GroupSlot {
    pub(crate) description: String,
    pub(crate) members: Vec<OptionId>,
    pub(crate) action: Option<GroupAction>,
    pub(crate) active: bool,
}

/// Which hook faulted while firing a match.
pub(crate) enum Fired {
    Hook(Fault),
    Group(Fault),
}

#[derive(Default)]
struct OptionTable {
    long: HashMap<String, OptionId>,
    short: HashMap<char, OptionId>,
}

/// All registered options and their state for the current parse.
#[derive(Default)]
pub struct OptionSet {
    slots: Vec<Slot>,
    states: Vec<OptionState>,
    groups: Vec<GroupSlot>,
    table: OptionTable,
}

impl OptionSet {
    // ========================================================================
    // Registration
    // ========================================================================

    /// Register every entry of `group`. A key already in the table is offered
    /// to `on_shadow`; if any of an option's keys is refused, that option is
    /// left out entirely.
    pub(crate) fn register(
        &mut self,
        group: OwnerGroup,
        on_shadow: &mut dyn FnMut(&ShadowEvent<'_>) -> bool,
    ) -> Result<GroupId> {
        let OwnerGroup {
            description,
            entries,
            action,
        } = group;

        let mut pending = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                Entry::Option(opt) => {
                    if !opt.spec.has_name() {
                        return Err(Error::Unnamed);
                    }
                    pending.push((opt.spec, None, opt.on_match, opt.on_execute));
                }
                Entry::Alias(alias) => {
                    let target = self.resolve_checked(alias.target)?;
                    let mut spec = self.slots[target.0].spec.clone();
                    spec.long_name = alias.long_name;
                    spec.short_name = alias.short_name;
                    if !spec.has_name() {
                        return Err(Error::Unnamed);
                    }
                    pending.push((spec, Some(target), None, None));
                }
            }
        }

        let gid = GroupId(self.groups.len());
        let mut members = Vec::with_capacity(pending.len());
        for (spec, target, on_match, on_execute) in pending {
            let id = OptionId(self.slots.len());
            if self.accepts(&spec, on_shadow) {
                if let Some(long) = &spec.long_name {
                    self.table.long.insert(long.clone(), id);
                }
                if let Some(c) = spec.short_name {
                    self.table.short.insert(c, id);
                }
                members.push(id);
            } else {
                tracing::debug!(option = %spec.display_name(), "option refused, not registered");
            }
            self.slots.push(Slot {
                spec,
                target,
                group: gid,
                on_match,
                on_execute,
            });
            self.states.push(OptionState::default());
        }

        tracing::debug!(group = %description, options = members.len(), "registered option group");
        self.groups.push(GroupSlot {
            description,
            members,
            action,
            active: true,
        });
        Ok(gid)
    }

    fn accepts(
        &self,
        spec: &OptionSpec,
        on_shadow: &mut dyn FnMut(&ShadowEvent<'_>) -> bool,
    ) -> bool {
        let mut keys = Vec::with_capacity(2);
        if let Some(long) = &spec.long_name {
            if let Some(&existing) = self.table.long.get(long) {
                keys.push((Key::Long(long.clone()), existing));
            }
        }
        if let Some(c) = spec.short_name {
            if let Some(&existing) = self.table.short.get(&c) {
                keys.push((Key::Short(c), existing));
            }
        }
        keys.into_iter().all(|(key, existing)| {
            let event = ShadowEvent {
                key,
                option: spec,
                existing: &self.slots[existing.0].spec,
                existing_id: existing,
            };
            on_shadow(&event)
        })
    }

    /// Drop the group's keys from the table and hide it from help. Returns
    /// false for an unknown or already removed group.
    pub(crate) fn remove_group(&mut self, gid: GroupId) -> bool {
        let Some(group) = self.groups.get_mut(gid.0).filter(|g| g.active) else {
            return false;
        };
        group.active = false;
        let members = group.members.clone();
        self.table.long.retain(|_, id| !members.contains(id));
        self.table.short.retain(|_, id| !members.contains(id));
        tracing::debug!(group = %group.description, "removed option group");
        true
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn find_long(&self, name: &str) -> Option<OptionId> {
        self.table.long.get(name).copied()
    }

    pub fn find_short(&self, c: char) -> Option<OptionId> {
        self.table.short.get(&c).copied()
    }

    pub fn contains(&self, id: OptionId) -> bool {
        id.0 < self.slots.len()
    }

    pub fn spec(&self, id: OptionId) -> Option<&OptionSpec> {
        self.slots.get(id.0).map(|slot| &slot.spec)
    }

    pub fn group_of(&self, id: OptionId) -> Option<GroupId> {
        self.slots.get(id.0).map(|slot| slot.group)
    }

    /// Registered members of a group, in insertion order.
    pub fn options_of(&self, gid: GroupId) -> &[OptionId] {
        self.groups
            .get(gid.0)
            .map(|g| g.members.as_slice())
            .unwrap_or(&[])
    }

    pub fn group_description(&self, gid: GroupId) -> Option<&str> {
        self.groups.get(gid.0).map(|g| g.description.as_str())
    }

    // ========================================================================
    // State accessors (aliases read through to their target)
    // ========================================================================

    pub fn state(&self, id: OptionId) -> Option<&OptionState> {
        let target = self.resolve_checked(id).ok()?;
        self.states.get(target.0)
    }

    pub fn matched(&self, id: OptionId) -> bool {
        self.state(id).is_some_and(OptionState::was_matched)
    }

    /// Captured value, or the default when the option did not match.
    pub fn value(&self, id: OptionId) -> Option<&str> {
        let target = self.resolve_checked(id).ok()?;
        self.states[target.0].value(&self.slots[target.0].spec)
    }

    pub fn values(&self, id: OptionId) -> &[String] {
        self.state(id).map(OptionState::values).unwrap_or(&[])
    }

    pub fn display_name(&self, id: OptionId) -> String {
        self.spec(id).map(OptionSpec::display_name).unwrap_or_default()
    }

    // ========================================================================
    // Crate internals
    // ========================================================================

    pub(crate) fn resolve_checked(&self, id: OptionId) -> Result<OptionId> {
        let slot = self.slots.get(id.0).ok_or(Error::UnknownOption(id))?;
        Ok(slot.target.unwrap_or(id))
    }

    pub(crate) fn spec_of(&self, id: OptionId) -> &OptionSpec {
        &self.slots[id.0].spec
    }

    /// Some key in the table still points at `id`.
    pub(crate) fn is_live(&self, id: OptionId) -> bool {
        let spec = self.spec_of(id);
        spec.long_name
            .as_ref()
            .is_some_and(|l| self.table.long.get(l) == Some(&id))
            || spec
                .short_name
                .is_some_and(|c| self.table.short.get(&c) == Some(&id))
    }

    pub(crate) fn is_visible(&self, id: OptionId) -> bool {
        !self.spec_of(id).hidden && self.is_live(id)
    }

    pub(crate) fn active_groups(&self) -> impl Iterator<Item = &GroupSlot> {
        self.groups.iter().filter(|g| g.active)
    }

    pub(crate) fn reset_all(&mut self) {
        self.states.iter_mut().for_each(OptionState::reset);
    }

    /// Run the option's match hook, record the match on the target's state,
    /// then run the owning group's callback. Returns the target handle.
    pub(crate) fn fire(
        &mut self,
        id: OptionId,
        value: Option<&str>,
    ) -> std::result::Result<OptionId, Fired> {
        let target = self.slots[id.0].target.unwrap_or(id);
        if let Some(hook) = self.slots[target.0].on_match.as_mut() {
            hook(value).map_err(Fired::Hook)?;
        }
        self.states[target.0].record(&self.slots[target.0].spec.shape, value);

        let slot = &self.slots[id.0];
        if let Some(action) = self.groups[slot.group.0].action.as_mut() {
            let found = Match {
                id,
                option: &slot.spec,
                value,
            };
            action(&found).map_err(Fired::Group)?;
        }
        Ok(target)
    }

    pub(crate) fn run_execute(&mut self, target: OptionId) -> std::result::Result<(), Fault> {
        match self.slots[target.0].on_execute.as_mut() {
            Some(hook) => hook(&self.states[target.0]),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::{Alias, Opt};

    fn accept_all() -> impl FnMut(&ShadowEvent<'_>) -> bool {
        |_| true
    }

    #[test]
    fn registers_keys_in_order() {
        let mut set = OptionSet::default();
        let gid = set
            .register(
                OwnerGroup::new("g")
                    .option(Opt::new("one").short('1'))
                    .option(Opt::short_only('x')),
                &mut accept_all(),
            )
            .unwrap();
        let members = set.options_of(gid).to_vec();
        assert_eq!(members.len(), 2);
        assert_eq!(set.find_long("one"), Some(members[0]));
        assert_eq!(set.find_short('1'), Some(members[0]));
        assert_eq!(set.find_short('x'), Some(members[1]));
        assert_eq!(set.group_of(members[1]), Some(gid));
    }

    #[test]
    fn unnamed_option_is_an_error() {
        let mut set = OptionSet::default();
        let err = set
            .register(OwnerGroup::new("g").option(Opt::new("")), &mut accept_all())
            .unwrap_err();
        assert!(matches!(err, Error::Unnamed));
    }

    #[test]
    fn refused_shadow_skips_whole_option() {
        let mut set = OptionSet::default();
        set.register(OwnerGroup::new("a").option(Opt::new("one")), &mut accept_all())
            .unwrap();
        let mut offered = Vec::new();
        let gid = set
            .register(
                OwnerGroup::new("b").option(Opt::new("one").short('Q')),
                &mut |ev: &ShadowEvent<'_>| {
                    offered.push(ev.key.clone());
                    false
                },
            )
            .unwrap();
        assert_eq!(offered, vec![Key::Long("one".to_string())]);
        assert!(set.options_of(gid).is_empty());
        assert_eq!(set.find_short('Q'), None);
    }

    #[test]
    fn alias_shares_target_state() {
        let mut set = OptionSet::default();
        let gid = set
            .register(
                OwnerGroup::new("g").option(Opt::new("verbose").default_value("no")),
                &mut accept_all(),
            )
            .unwrap();
        let verbose = set.options_of(gid)[0];
        let agid = set
            .register(
                OwnerGroup::new("aliases").alias(Alias::new(verbose).long("loud").short('v')),
                &mut accept_all(),
            )
            .unwrap();
        let loud = set.options_of(agid)[0];

        assert_eq!(set.value(loud), Some("no"));
        assert!(set.fire(loud, None).is_ok());
        assert!(set.matched(verbose));
        assert!(set.matched(loud));
        assert_eq!(set.spec(loud).unwrap().long_name(), Some("loud"));
    }

    #[test]
    fn removed_group_frees_its_keys() {
        let mut set = OptionSet::default();
        let gid = set
            .register(OwnerGroup::new("g").option(Opt::new("one").short('1')), &mut accept_all())
            .unwrap();
        assert!(set.remove_group(gid));
        assert!(!set.remove_group(gid));
        assert_eq!(set.find_long("one"), None);
        assert_eq!(set.find_short('1'), None);
        assert_eq!(set.active_groups().count(), 0);
    }
}
