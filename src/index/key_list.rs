use serde::{Deserialize, Deserializer, Serialize};

/// Sorted, duplicate-free set of record keys stored as an index entry's value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeyList {
    keys: Vec<Vec<u8>>,
}

impl KeyList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `key` at its sorted position. Returns `false` if it was already present.
    pub fn add(&mut self, key: &[u8]) -> bool {
        match self.search(key) {
            Ok(_) => false,
            Err(pos) => {
                self.keys.insert(pos, key.to_vec());
                true
            }
        }
    }

    /// Remove `key`. Returns `false` if it was absent.
    pub fn remove(&mut self, key: &[u8]) -> bool {
        match self.search(key) {
            Ok(pos) => {
                self.keys.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.search(key).is_ok()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[u8]> {
        self.keys.iter().map(Vec::as_slice)
    }

    pub fn into_keys(self) -> Vec<Vec<u8>> {
        self.keys
    }

    fn search(&self, key: &[u8]) -> Result<usize, usize> {
        self.keys.binary_search_by(|probe| probe.as_slice().cmp(key))
    }
}

// Stored lists are sorted and deduplicated on read.
impl<'de> Deserialize<'de> for KeyList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut keys = Vec::<Vec<u8>>::deserialize(deserializer)?;
        keys.sort_unstable();
        keys.dedup();
        Ok(KeyList { keys })
    }
}

impl<'a> FromIterator<&'a [u8]> for KeyList {
    fn from_iter<T: IntoIterator<Item = &'a [u8]>>(iter: T) -> Self {
        let mut list = KeyList::new();
        for key in iter {
            list.add(key);
        }
        list
    }
}
