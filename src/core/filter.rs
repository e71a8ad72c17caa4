use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::core::source::DimensionFilter;
use crate::core::types::Key;
use crate::error::{ChartError, ChartResult};

/// Caller-supplied key predicate used by [`Filter::Predicate`].
pub type KeyPredicate = Rc<dyn Fn(&Key) -> bool>;

/// One active selection criterion on a dimension.
#[derive(Clone)]
pub enum Filter {
    /// Exact key equality.
    Exact(Key),
    /// Half-open range `[lo, hi)`.
    Range { lo: Key, hi: Key },
    /// Arbitrary predicate; `label` identifies it for toggling and debugging.
    Predicate {
        label: String,
        predicate: KeyPredicate,
    },
}

impl Filter {
    #[must_use]
    pub fn exact(key: impl Into<Key>) -> Self {
        Self::Exact(key.into())
    }

    /// Builds a half-open range filter, rejecting mixed or inverted bounds.
    pub fn range(lo: impl Into<Key>, hi: impl Into<Key>) -> ChartResult<Self> {
        let lo = lo.into();
        let hi = hi.into();
        if !lo.is_comparable_with(&hi) {
            return Err(ChartError::InvalidData(format!(
                "range filter bounds must share a key type: [{lo}, {hi})"
            )));
        }
        if lo > hi {
            return Err(ChartError::InvalidData(format!(
                "range filter lower bound must be <= upper bound: [{lo}, {hi})"
            )));
        }
        Ok(Self::Range { lo, hi })
    }

    #[must_use]
    pub fn predicate(label: impl Into<String>, predicate: impl Fn(&Key) -> bool + 'static) -> Self {
        Self::Predicate {
            label: label.into(),
            predicate: Rc::new(predicate),
        }
    }

    #[must_use]
    pub fn matches(&self, key: &Key) -> bool {
        match self {
            Self::Exact(expected) => expected == key,
            Self::Range { lo, hi } => lo.is_comparable_with(key) && lo <= key && key < hi,
            Self::Predicate { predicate, .. } => predicate(key),
        }
    }
}

impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact(lhs), Self::Exact(rhs)) => lhs == rhs,
            (Self::Range { lo: a, hi: b }, Self::Range { lo: c, hi: d }) => a == c && b == d,
            (
                Self::Predicate {
                    label: lhs_label,
                    predicate: lhs,
                },
                Self::Predicate {
                    label: rhs_label,
                    predicate: rhs,
                },
            ) => lhs_label == rhs_label || Rc::ptr_eq(lhs, rhs),
            _ => false,
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(key) => f.debug_tuple("Exact").field(key).finish(),
            Self::Range { lo, hi } => f
                .debug_struct("Range")
                .field("lo", lo)
                .field("hi", hi)
                .finish(),
            Self::Predicate { label, .. } => f
                .debug_struct("Predicate")
                .field("label", label)
                .finish_non_exhaustive(),
        }
    }
}

/// Shared handle to a chart's active filters.
///
/// The owning chart mutates it; the chart's `FilterStage` reads it on every
/// pull. Cloning the handle shares the same underlying set.
#[derive(Clone, Default)]
pub struct FilterSet {
    filters: Rc<RefCell<Vec<Filter>>>,
}

impl FilterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Filter> {
        self.filters.borrow().clone()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.borrow().is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.borrow().len()
    }

    #[must_use]
    pub fn contains(&self, filter: &Filter) -> bool {
        self.filters.borrow().iter().any(|active| active == filter)
    }

    /// Adds `filter` when absent, removes it when present. Returns `true` if added.
    pub fn toggle(&self, filter: Filter) -> bool {
        let mut filters = self.filters.borrow_mut();
        if let Some(position) = filters.iter().position(|active| *active == filter) {
            filters.remove(position);
            trace!(remaining = filters.len(), "filter toggled off");
            return false;
        }
        filters.push(filter);
        trace!(active = filters.len(), "filter toggled on");
        true
    }

    pub fn replace(&self, filters: Vec<Filter>) {
        *self.filters.borrow_mut() = filters;
    }

    pub fn clear(&self) {
        self.filters.borrow_mut().clear();
    }

    /// A key passes when every active filter accepts it; no filters pass everything.
    #[must_use]
    pub fn accepts(&self, key: &Key) -> bool {
        self.filters.borrow().iter().all(|filter| filter.matches(key))
    }

    /// Collapses the active filters into the form handed to the indexing collaborator.
    #[must_use]
    pub fn to_dimension_filter(&self) -> DimensionFilter {
        let filters = self.filters.borrow();
        match filters.as_slice() {
            [] => DimensionFilter::All,
            [Filter::Exact(key)] => DimensionFilter::Exact(key.clone()),
            [Filter::Range { lo, hi }] => DimensionFilter::Range {
                lo: lo.clone(),
                hi: hi.clone(),
            },
            [Filter::Predicate { predicate, .. }] => DimensionFilter::Predicate(predicate.clone()),
            many => {
                let combined = many.to_vec();
                DimensionFilter::Predicate(Rc::new(move |key: &Key| {
                    combined.iter().all(|filter| filter.matches(key))
                }))
            }
        }
    }
}

impl fmt::Debug for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.filters.borrow().iter()).finish()
    }
}
