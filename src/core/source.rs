use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::core::filter::KeyPredicate;
use crate::core::types::{Key, Record};

/// Grouped aggregate produced by an external dimensional index.
///
/// `all` is a live view: every call reflects the index's current filters.
/// Implementations hand out owned records, so callers never mutate the
/// index's own storage.
pub trait GroupedSource {
    fn all(&self) -> Vec<Record>;
}

/// Filter request forwarded to the external indexing collaborator.
#[derive(Clone)]
pub enum DimensionFilter {
    All,
    Exact(Key),
    Range { lo: Key, hi: Key },
    Predicate(KeyPredicate),
}

impl DimensionFilter {
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Debug for DimensionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Exact(key) => f.debug_tuple("Exact").field(key).finish(),
            Self::Range { lo, hi } => f
                .debug_struct("Range")
                .field("lo", lo)
                .field("hi", hi)
                .finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// External "group by key" index a chart filters when its selection changes.
pub trait Dimension {
    fn filter(&self, filter: DimensionFilter);
}

pub type SourceHandle = Rc<dyn GroupedSource>;
pub type DimensionHandle = Rc<dyn Dimension>;

/// In-memory grouped source for headless use and tests.
#[derive(Debug, Default)]
pub struct StaticGroup {
    records: RefCell<Vec<Record>>,
}

impl StaticGroup {
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: RefCell::new(records),
        }
    }

    pub fn set_records(&self, records: Vec<Record>) {
        *self.records.borrow_mut() = records;
    }
}

impl GroupedSource for StaticGroup {
    fn all(&self) -> Vec<Record> {
        self.records.borrow().clone()
    }
}

/// Dimension stand-in that remembers every filter it was asked to apply.
#[derive(Debug, Default)]
pub struct RecordingDimension {
    applied: RefCell<Vec<DimensionFilter>>,
}

impl RecordingDimension {
    #[must_use]
    pub fn applied(&self) -> Vec<DimensionFilter> {
        self.applied.borrow().clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<DimensionFilter> {
        self.applied.borrow().last().cloned()
    }
}

impl Dimension for RecordingDimension {
    fn filter(&self, filter: DimensionFilter) {
        self.applied.borrow_mut().push(filter);
    }
}
