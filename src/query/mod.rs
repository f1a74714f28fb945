//! Query descriptors and the read path built on them.
//!
//! A query designates at most one index (the primary key by default) and
//! carries per-field criteria. [`select_strategy`] turns it into a
//! [`ScanStrategy`] once, before any scanning; [`ScanSource`] produces
//! candidate keys for that strategy in batches; [`Iter`] resolves them to
//! stored values.

pub mod criteria;
mod iter;
mod source;
mod strategy;

use std::collections::BTreeMap;

pub use iter::Iter;
pub use source::{KeySource, Pull, ScanSource};
pub use strategy::{select_strategy, ScanStrategy};

/// Which ordering a query is driven by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IndexTarget {
    /// Primary key order; always usable.
    #[default]
    Key,
    /// A declared secondary index.
    Field(String),
}

/// Logical predicate over one record type.
#[derive(Debug, Clone)]
pub struct Query<C> {
    target: IndexTarget,
    key_criteria: Vec<C>,
    field_criteria: BTreeMap<String, Vec<C>>,
}

impl<C> Default for Query<C> {
    fn default() -> Self {
        Self {
            target: IndexTarget::Key,
            key_criteria: Vec::new(),
            field_criteria: BTreeMap::new(),
        }
    }
}

impl<C> Query<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive the query through the index named `name`.
    pub fn index(self, name: impl Into<String>) -> Self {
        Query {
            target: IndexTarget::Field(name.into()),
            ..self
        }
    }

    pub fn key_criterion(mut self, criterion: C) -> Self {
        self.key_criteria.push(criterion);
        self
    }

    pub fn criterion(mut self, field: impl Into<String>, criterion: C) -> Self {
        self.field_criteria
            .entry(field.into())
            .or_default()
            .push(criterion);
        self
    }

    pub fn target(&self) -> &IndexTarget {
        &self.target
    }

    pub fn key_criteria(&self) -> &[C] {
        &self.key_criteria
    }

    pub fn field_criteria(&self) -> impl Iterator<Item = (&str, &[C])> {
        self.field_criteria
            .iter()
            .map(|(field, criteria)| (field.as_str(), criteria.as_slice()))
    }

    /// Criteria on the designated index field.
    pub fn target_criteria(&self) -> &[C] {
        match &self.target {
            IndexTarget::Key => &self.key_criteria,
            IndexTarget::Field(name) => self
                .field_criteria
                .get(name)
                .map(Vec::as_slice)
                .unwrap_or_default(),
        }
    }

    pub(crate) fn has_criteria(&self) -> bool {
        !self.key_criteria.is_empty() || self.field_criteria.values().any(|c| !c.is_empty())
    }
}
