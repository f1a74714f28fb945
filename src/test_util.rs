//! Test-only record type and storer shared by the query tests.

use serde::{Deserialize, Serialize};

use crate::{
    error::IndexError,
    query::criteria::{self, Criterion},
    store::Transaction,
    storer::{Candidate, Index, Storer},
    Indexer,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct User {
    pub(crate) name: String,
    pub(crate) team: String,
    pub(crate) age: u32,
}

pub(crate) fn user(name: &str, team: &str, age: u32) -> User {
    User {
        name: name.into(),
        team: team.into(),
        age,
    }
}

fn field(name: &str, user: &User) -> Option<Vec<u8>> {
    match name {
        "name" => Some(user.name.as_bytes().to_vec()),
        "team" => Some(user.team.as_bytes().to_vec()),
        "age" => Some(user.age.to_be_bytes().to_vec()),
        _ => None,
    }
}

pub(crate) struct Users {
    indexes: Vec<Index<User>>,
}

impl Users {
    pub(crate) fn new() -> Self {
        Self {
            indexes: vec![
                Index::new("team", |name, user: &User| Ok(field(name, user))),
                Index::new("age", |name, user: &User| Ok(field(name, user))),
            ],
        }
    }
}

impl Storer for Users {
    type Record = User;
    type Criterion = Criterion<User>;

    fn type_name(&self) -> &str {
        "User"
    }

    fn indexes(&self) -> &[Index<User>] {
        &self.indexes
    }

    fn matches_all(
        &self,
        criteria: &[Criterion<User>],
        candidate: Candidate<'_, User>,
    ) -> Result<bool, IndexError> {
        match candidate.record {
            Some(record) if !candidate.is_key => {
                let value = field(candidate.field, record).unwrap_or_default();
                criteria::matches_all(criteria, &value, Some(record))
            }
            record => criteria::matches_all(criteria, candidate.value, record),
        }
    }

    fn has_match_func(&self, criteria: &[Criterion<User>]) -> bool {
        criteria::has_match_func(criteria)
    }
}

/// Write `user` under `key` and index it, the way a record layer would.
pub(crate) fn insert<T: Transaction>(
    indexer: &Indexer,
    storer: &Users,
    txn: &mut T,
    key: &str,
    user: &User,
) -> Vec<u8> {
    let record_key = indexer.record_key(storer, key.as_bytes()).unwrap();
    let value = indexer.encode(user).unwrap();
    txn.set(record_key.clone(), value).unwrap();
    indexer.index_add(storer, txn, &record_key, user).unwrap();
    record_key
}
