//! Secondary index entries: key lists keyed by encoded field values.
//!
//! Every declared index of a type stores one entry per distinct encoded field
//! value. The entry's value is a [`KeyList`] of the record keys carrying that
//! field value. Entries are maintained inside the caller's transaction, next
//! to the record write they describe, and an entry whose list empties is
//! deleted rather than stored empty.

mod availability;
mod key_list;
mod maintain;

pub use availability::index_exists;
pub use key_list::KeyList;
pub use maintain::{index_add, index_delete, index_update};
