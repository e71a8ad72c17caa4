use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use super::ChartHandle;

/// Registry partition key; `Global` holds charts registered without a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChartGroupKey {
    Global,
    Named(String),
}

impl ChartGroupKey {
    #[must_use]
    pub fn from_label(group: Option<&str>) -> Self {
        match group {
            Some(name) => Self::Named(name.to_owned()),
            None => Self::Global,
        }
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Global => None,
            Self::Named(name) => Some(name),
        }
    }
}

/// Identity comparison of chart handles (address only, vtable ignored).
#[must_use]
pub fn same_chart(lhs: &ChartHandle, rhs: &ChartHandle) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(lhs), Rc::as_ptr(rhs))
}

/// Catalogue of live charts partitioned by chart group.
///
/// A chart is a member of at most one group: registering it under a new
/// group removes it from the old one.
#[derive(Default)]
pub struct ChartRegistry {
    groups: IndexMap<ChartGroupKey, Vec<ChartHandle>>,
}

impl ChartRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chart` to `group`, migrating it out of any other group.
    /// Registering an existing member again is a no-op.
    pub fn register(&mut self, chart: ChartHandle, group: Option<&str>) {
        let key = ChartGroupKey::from_label(group);
        if let Some(current) = self.group_of(&chart) {
            if current == key {
                return;
            }
            self.remove_from(&current, &chart);
            debug!(from = ?current.label(), to = ?key.label(), "chart migrated between groups");
        }
        let members = self.groups.entry(key).or_default();
        members.push(chart);
        debug!(group = ?group, members = members.len(), "chart registered");
    }

    /// Removes `chart` from `group`. Returns `false` when it was not a member.
    pub fn deregister(&mut self, chart: &ChartHandle, group: Option<&str>) -> bool {
        let removed = self.remove_from(&ChartGroupKey::from_label(group), chart);
        if removed {
            debug!(group = ?group, "chart deregistered");
        }
        removed
    }

    /// Clears one group, or every group when `group` is `None`.
    pub fn deregister_all(&mut self, group: Option<&str>) {
        match group {
            Some(name) => {
                self.groups.shift_remove(&ChartGroupKey::Named(name.to_owned()));
            }
            None => self.groups.clear(),
        }
        debug!(group = ?group, "charts deregistered");
    }

    /// Charts of `group` in registration order.
    #[must_use]
    pub fn list(&self, group: Option<&str>) -> Vec<ChartHandle> {
        self.groups
            .get(&ChartGroupKey::from_label(group))
            .cloned()
            .unwrap_or_default()
    }

    /// `true` when `chart` belongs to any group.
    #[must_use]
    pub fn has(&self, chart: &ChartHandle) -> bool {
        self.group_of(chart).is_some()
    }

    #[must_use]
    pub fn group_of(&self, chart: &ChartHandle) -> Option<ChartGroupKey> {
        self.groups.iter().find_map(|(key, members)| {
            members
                .iter()
                .any(|member| same_chart(member, chart))
                .then(|| key.clone())
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove_from(&mut self, key: &ChartGroupKey, chart: &ChartHandle) -> bool {
        let Some(members) = self.groups.get_mut(key) else {
            return false;
        };
        let before = members.len();
        members.retain(|member| !same_chart(member, chart));
        let removed = members.len() != before;
        if members.is_empty() {
            self.groups.shift_remove(key);
        }
        removed
    }
}

impl fmt::Debug for ChartRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.groups
                    .iter()
                    .map(|(key, members)| (key.label().unwrap_or("<global>"), members.len())),
            )
            .finish()
    }
}
