//! Byte layout of record and index entry keys.
//!
//! Records of a type live under `record_namespace ++ type ++ ":"`. Index entries
//! live under `index_namespace ++ ":" ++ type ++ ":" ++ index ++ ":"`, followed by
//! the encoded field value. The trailing delimiter keeps the prefix of index
//! `name` from also covering entries of index `name2`. Type and index names
//! containing `:` are rejected with [`IndexError::InvalidName`].

use crate::{error::IndexError, option::IndexOption};

const DELIMITER: u8 = b':';

/// Computes every key the engine reads or writes.
#[derive(Debug, Clone)]
pub struct Keyspace {
    index_namespace: Vec<u8>,
    record_namespace: Vec<u8>,
    batch_size: usize,
}

impl Keyspace {
    /// Build a keyspace, rejecting namespaces where one is a prefix of the other.
    pub fn new(option: &IndexOption) -> Result<Self, IndexError> {
        let index = option.index_namespace.as_bytes();
        let record = option.record_namespace.as_bytes();
        if index.starts_with(record) || record.starts_with(index) {
            return Err(IndexError::NamespaceCollision {
                record: option.record_namespace.clone(),
                index: option.index_namespace.clone(),
            });
        }
        Ok(Self {
            index_namespace: index.to_vec(),
            record_namespace: record.to_vec(),
            batch_size: option.batch_size.max(1),
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Prefix bounding all records of `type_name`.
    pub fn type_prefix(&self, type_name: &str) -> Result<Vec<u8>, IndexError> {
        check_name(type_name)?;
        let mut prefix =
            Vec::with_capacity(self.record_namespace.len() + type_name.len() + 1);
        prefix.extend_from_slice(&self.record_namespace);
        prefix.extend_from_slice(type_name.as_bytes());
        prefix.push(DELIMITER);
        Ok(prefix)
    }

    /// Store key of a record given its encoded primary key.
    pub fn record_key(&self, type_name: &str, key: &[u8]) -> Result<Vec<u8>, IndexError> {
        let mut record_key = self.type_prefix(type_name)?;
        record_key.extend_from_slice(key);
        Ok(record_key)
    }

    /// Prefix bounding all entries of one index.
    pub fn index_key_prefix(
        &self,
        type_name: &str,
        index_name: &str,
    ) -> Result<Vec<u8>, IndexError> {
        check_name(type_name)?;
        check_name(index_name)?;
        let mut prefix = Vec::with_capacity(
            self.index_namespace.len() + type_name.len() + index_name.len() + 3,
        );
        prefix.extend_from_slice(&self.index_namespace);
        prefix.push(DELIMITER);
        prefix.extend_from_slice(type_name.as_bytes());
        prefix.push(DELIMITER);
        prefix.extend_from_slice(index_name.as_bytes());
        prefix.push(DELIMITER);
        Ok(prefix)
    }

    /// Full index entry key for an encoded field value.
    pub fn index_key(
        &self,
        type_name: &str,
        index_name: &str,
        encoded_value: &[u8],
    ) -> Result<Vec<u8>, IndexError> {
        let mut key = self.index_key_prefix(type_name, index_name)?;
        key.extend_from_slice(encoded_value);
        Ok(key)
    }
}

// Type and index names sit between delimiters, so they may not contain one.
fn check_name(name: &str) -> Result<(), IndexError> {
    if name.as_bytes().contains(&DELIMITER) {
        return Err(IndexError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

impl Default for Keyspace {
    fn default() -> Self {
        let option = IndexOption::default();
        Self {
            index_namespace: option.index_namespace.into_bytes(),
            record_namespace: option.record_namespace.into_bytes(),
            batch_size: option.batch_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_namespaces() {
        let keyspace = Keyspace::default();
        assert_eq!(keyspace.type_prefix("User").unwrap(), b"kh_User:".to_vec());
        assert_eq!(
            keyspace.record_key("User", b"42").unwrap(),
            b"kh_User:42".to_vec()
        );
        assert_eq!(
            keyspace.index_key_prefix("User", "Name").unwrap(),
            b"_khIndex:User:Name:".to_vec()
        );
        assert_eq!(
            keyspace.index_key("User", "Name", b"bob").unwrap(),
            b"_khIndex:User:Name:bob".to_vec()
        );
    }

    #[test]
    fn index_prefixes_do_not_nest() {
        let keyspace = Keyspace::default();
        let short = keyspace.index_key_prefix("User", "Name").unwrap();
        let long = keyspace.index_key_prefix("User", "Names").unwrap();
        assert!(!long.starts_with(&short));

        let entry = keyspace.index_key("User", "Names", b"x").unwrap();
        assert!(!entry.starts_with(&short));
    }

    #[test]
    fn index_keys_never_look_like_records() {
        let keyspace = Keyspace::default();
        let entry = keyspace.index_key("User", "Name", b"bob").unwrap();
        assert!(!entry.starts_with(&keyspace.type_prefix("User").unwrap()));
    }

    #[test]
    fn names_with_delimiter_are_rejected() {
        let keyspace = Keyspace::default();
        // "a:b"/"c" and "a"/"b:c" would share one index prefix
        assert!(matches!(
            keyspace.index_key_prefix("a:b", "c"),
            Err(IndexError::InvalidName { ref name }) if name == "a:b"
        ));
        assert!(matches!(
            keyspace.index_key_prefix("a", "b:c"),
            Err(IndexError::InvalidName { ref name }) if name == "b:c"
        ));
        assert!(matches!(
            keyspace.index_key("a", "b:c", b"v"),
            Err(IndexError::InvalidName { .. })
        ));

        // and "User:x" records would fall under the "User" partition
        assert!(matches!(
            keyspace.record_key("User:x", b"1"),
            Err(IndexError::InvalidName { ref name }) if name == "User:x"
        ));
        assert!(keyspace.type_prefix("User:x").is_err());
    }

    #[test]
    fn colliding_namespaces_are_rejected() {
        let option = IndexOption::default()
            .index_namespace("kh_index")
            .record_namespace("kh_");
        assert!(matches!(
            Keyspace::new(&option),
            Err(IndexError::NamespaceCollision { .. })
        ));

        let option = IndexOption::default().batch_size(7);
        assert_eq!(Keyspace::new(&option).unwrap().batch_size(), 7);
    }
}
