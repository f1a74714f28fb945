use crate::{error::IndexError, keyspace::Keyspace, store::StoreIter};

/// Whether `index_name` can be trusted to answer a query on `type_name`.
///
/// A type with no records reports every index usable. Otherwise the index is
/// usable only if at least one of its entries exists.
pub fn index_exists<I>(
    iter: &mut I,
    keyspace: &Keyspace,
    type_name: &str,
    index_name: &str,
) -> Result<bool, IndexError>
where
    I: StoreIter,
{
    let type_prefix = keyspace.type_prefix(type_name)?;
    iter.seek(&type_prefix);
    if !iter.valid_for_prefix(&type_prefix) {
        return Ok(true);
    }

    let index_prefix = keyspace.index_key_prefix(type_name, index_name)?;
    iter.seek(&index_prefix);
    Ok(iter.valid_for_prefix(&index_prefix))
}
