//! Per-type adapter the engine consults for names, indexes and criteria.

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::IndexError;

/// Produces the encoded, indexable bytes of one field, or `None` when the
/// field does not apply to this value (the index is then skipped).
pub type IndexFn<R> = fn(index_name: &str, record: &R) -> Result<Option<Vec<u8>>, IndexError>;

/// A named index declared on a record type.
pub struct Index<R> {
    name: String,
    func: IndexFn<R>,
}

impl<R> Index<R> {
    pub fn new(name: impl Into<String>, func: IndexFn<R>) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encoded field value of `record` under this index.
    pub fn encode(&self, record: &R) -> Result<Option<Vec<u8>>, IndexError> {
        (self.func)(&self.name, record)
    }
}

impl<R> Clone for Index<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            func: self.func,
        }
    }
}

impl<R> fmt::Debug for Index<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index").field("name", &self.name).finish()
    }
}

/// What a criteria evaluation is asked to judge.
///
/// - key criteria during a primary-key scan: `is_key` is set, `value` is the
///   record key with its type prefix stripped, `record` is the decoded record.
/// - field criteria during a primary-key scan: `is_key` is clear, `field`
///   names the field to read out of `record`.
/// - index entry criteria: `record` is `None` and `value` is the entry's
///   encoded field value, to be compared as is.
#[derive(Debug)]
pub struct Candidate<'a, R> {
    pub field: &'a str,
    pub value: &'a [u8],
    pub is_key: bool,
    pub type_name: &'a str,
    pub record: Option<&'a R>,
}

impl<R> Clone for Candidate<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Candidate<'_, R> {}

/// Record-type adapter.
pub trait Storer {
    type Record: Serialize + DeserializeOwned;

    type Criterion;

    /// Stable name; it is baked into every stored key of the type.
    fn type_name(&self) -> &str;

    fn indexes(&self) -> &[Index<Self::Record>];

    fn index(&self, name: &str) -> Option<&Index<Self::Record>> {
        self.indexes().iter().find(|index| index.name() == name)
    }

    /// Whether `candidate` satisfies every criterion in `criteria`.
    fn matches_all(
        &self,
        criteria: &[Self::Criterion],
        candidate: Candidate<'_, Self::Record>,
    ) -> Result<bool, IndexError>;

    /// Whether any criterion needs an arbitrary match function, which no
    /// index lookup can answer.
    fn has_match_func(&self, criteria: &[Self::Criterion]) -> bool;
}
