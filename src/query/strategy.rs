use crate::{
    error::IndexError,
    index::index_exists,
    keyspace::Keyspace,
    logging::keyhold_log,
    query::{IndexTarget, Query},
    store::StoreIter,
    storer::Storer,
};

/// How a query's candidate keys are produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStrategy {
    /// Walk the type partition in key order, filtering decoded records.
    PrimaryKeyScan,
    /// Walk the type partition and yield every key; criteria are left to the caller.
    FullScan,
    /// Walk the entries of one index, filtering on their encoded field values.
    IndexedLookup { index: String },
}

/// Decide once, before scanning, which strategy answers `query`.
///
/// The designated index falls back to [`ScanStrategy::FullScan`] when it has
/// no entries on a populated type, or when its criteria need a match function
/// that no index lookup can answer.
pub fn select_strategy<S, I>(
    keyspace: &Keyspace,
    storer: &S,
    iter: &mut I,
    query: &Query<S::Criterion>,
) -> Result<ScanStrategy, IndexError>
where
    S: Storer,
    I: StoreIter,
{
    let type_name = storer.type_name();
    let strategy = match query.target() {
        IndexTarget::Key => ScanStrategy::PrimaryKeyScan,
        IndexTarget::Field(name) => {
            if storer.index(name).is_none() {
                return Err(IndexError::UnknownIndex {
                    type_name: type_name.to_string(),
                    index: name.clone(),
                });
            }
            if !index_exists(iter, keyspace, type_name, name)?
                || storer.has_match_func(query.target_criteria())
            {
                ScanStrategy::FullScan
            } else {
                ScanStrategy::IndexedLookup {
                    index: name.clone(),
                }
            }
        }
    };
    keyhold_log!(
        log::Level::Debug,
        "strategy_selected",
        "type={} strategy={:?}",
        type_name,
        strategy
    );
    Ok(strategy)
}
