//! Ready-made criteria over encoded field bytes.
//!
//! Comparisons run on the encoded bytes, so range operators only carry their
//! usual meaning when the field encoding preserves order (big-endian integers,
//! raw UTF-8 strings). A storer may use these directly as its `Criterion` type
//! or bring its own.

use std::{fmt, sync::Arc};

use regex::Regex;

use crate::error::IndexError;

/// Arbitrary predicate over a decoded record.
pub type MatchFn<R> = Arc<dyn Fn(&R) -> Result<bool, IndexError> + Send + Sync>;

pub enum Criterion<R> {
    Eq(Vec<u8>),
    Ne(Vec<u8>),
    Gt(Vec<u8>),
    Ge(Vec<u8>),
    Lt(Vec<u8>),
    Le(Vec<u8>),
    In(Vec<Vec<u8>>),
    RegExp(Regex),
    MatchFunc(MatchFn<R>),
}

impl<R> Criterion<R> {
    pub fn regex(pattern: &str) -> Result<Self, IndexError> {
        Regex::new(pattern)
            .map(Criterion::RegExp)
            .map_err(|err| IndexError::Criteria(err.to_string()))
    }

    pub fn match_func<F>(func: F) -> Self
    where
        F: Fn(&R) -> Result<bool, IndexError> + Send + Sync + 'static,
    {
        Criterion::MatchFunc(Arc::new(func))
    }

    pub fn is_match_func(&self) -> bool {
        matches!(self, Criterion::MatchFunc(_))
    }

    /// Evaluate against an encoded value and, when available, the decoded record.
    pub fn test(&self, value: &[u8], record: Option<&R>) -> Result<bool, IndexError> {
        Ok(match self {
            Criterion::Eq(other) => value == other.as_slice(),
            Criterion::Ne(other) => value != other.as_slice(),
            Criterion::Gt(other) => value > other.as_slice(),
            Criterion::Ge(other) => value >= other.as_slice(),
            Criterion::Lt(other) => value < other.as_slice(),
            Criterion::Le(other) => value <= other.as_slice(),
            Criterion::In(values) => values.iter().any(|other| other.as_slice() == value),
            Criterion::RegExp(regex) => regex.is_match(&String::from_utf8_lossy(value)),
            Criterion::MatchFunc(func) => match record {
                Some(record) => func(record)?,
                None => {
                    return Err(IndexError::Criteria(
                        "match function evaluated without a decoded record".into(),
                    ))
                }
            },
        })
    }
}

impl<R> Clone for Criterion<R> {
    fn clone(&self) -> Self {
        match self {
            Criterion::Eq(v) => Criterion::Eq(v.clone()),
            Criterion::Ne(v) => Criterion::Ne(v.clone()),
            Criterion::Gt(v) => Criterion::Gt(v.clone()),
            Criterion::Ge(v) => Criterion::Ge(v.clone()),
            Criterion::Lt(v) => Criterion::Lt(v.clone()),
            Criterion::Le(v) => Criterion::Le(v.clone()),
            Criterion::In(v) => Criterion::In(v.clone()),
            Criterion::RegExp(regex) => Criterion::RegExp(regex.clone()),
            Criterion::MatchFunc(func) => Criterion::MatchFunc(Arc::clone(func)),
        }
    }
}

impl<R> fmt::Debug for Criterion<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Eq(v) => f.debug_tuple("Eq").field(v).finish(),
            Criterion::Ne(v) => f.debug_tuple("Ne").field(v).finish(),
            Criterion::Gt(v) => f.debug_tuple("Gt").field(v).finish(),
            Criterion::Ge(v) => f.debug_tuple("Ge").field(v).finish(),
            Criterion::Lt(v) => f.debug_tuple("Lt").field(v).finish(),
            Criterion::Le(v) => f.debug_tuple("Le").field(v).finish(),
            Criterion::In(v) => f.debug_tuple("In").field(v).finish(),
            Criterion::RegExp(regex) => f.debug_tuple("RegExp").field(&regex.as_str()).finish(),
            Criterion::MatchFunc(_) => f.write_str("MatchFunc(..)"),
        }
    }
}

/// Conjunction of `criteria`; an empty set matches everything.
pub fn matches_all<R>(
    criteria: &[Criterion<R>],
    value: &[u8],
    record: Option<&R>,
) -> Result<bool, IndexError> {
    for criterion in criteria {
        if !criterion.test(value, record)? {
            return Ok(false);
        }
    }
    Ok(true)
}

pub fn has_match_func<R>(criteria: &[Criterion<R>]) -> bool {
    criteria.iter().any(Criterion::is_match_func)
}
