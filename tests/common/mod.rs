//! Common fixtures for integration tests: a `Book` record type and a thin
//! record layer that pairs every write with index maintenance.

#![allow(dead_code)]

use keyhold::{
    query::criteria::{self, Criterion},
    Candidate, Index, IndexError, Indexer, Storer, Transaction,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub year: u16,
    pub tags: Vec<String>,
}

pub fn book(title: &str, author: &str, year: u16) -> Book {
    Book {
        title: title.to_string(),
        author: author.to_string(),
        year,
        tags: Vec::new(),
    }
}

fn field(name: &str, book: &Book) -> Option<Vec<u8>> {
    match name {
        "title" => Some(book.title.as_bytes().to_vec()),
        "author" => Some(book.author.as_bytes().to_vec()),
        "year" => Some(book.year.to_be_bytes().to_vec()),
        // untagged books stay out of the tag index
        "tag" => book.tags.first().map(|tag| tag.as_bytes().to_vec()),
        _ => None,
    }
}

pub struct Books {
    indexes: Vec<Index<Book>>,
}

impl Books {
    pub fn new() -> Self {
        Self {
            indexes: vec![
                Index::new("author", |name, book: &Book| Ok(field(name, book))),
                Index::new("year", |name, book: &Book| Ok(field(name, book))),
                Index::new("tag", |name, book: &Book| Ok(field(name, book))),
            ],
        }
    }
}

impl Storer for Books {
    type Record = Book;
    type Criterion = Criterion<Book>;

    fn type_name(&self) -> &str {
        "Book"
    }

    fn indexes(&self) -> &[Index<Book>] {
        &self.indexes
    }

    fn matches_all(
        &self,
        criteria: &[Criterion<Book>],
        candidate: Candidate<'_, Book>,
    ) -> Result<bool, IndexError> {
        match candidate.record {
            Some(record) if !candidate.is_key => {
                let value = field(candidate.field, record).unwrap_or_default();
                criteria::matches_all(criteria, &value, Some(record))
            }
            record => criteria::matches_all(criteria, candidate.value, record),
        }
    }

    fn has_match_func(&self, criteria: &[Criterion<Book>]) -> bool {
        criteria::has_match_func(criteria)
    }
}

pub fn insert<T: Transaction>(indexer: &Indexer, txn: &mut T, key: &str, book: &Book) -> Vec<u8> {
    let storer = Books::new();
    let record_key = indexer
        .record_key(&storer, key.as_bytes())
        .expect("record key");
    let value = indexer.encode(book).expect("encode book");
    txn.set(record_key.clone(), value).expect("set record");
    indexer
        .index_add(&storer, txn, &record_key, book)
        .expect("index add");
    record_key
}

pub fn update<T: Transaction>(indexer: &Indexer, txn: &mut T, key: &str, book: &Book) {
    let storer = Books::new();
    let record_key = indexer
        .record_key(&storer, key.as_bytes())
        .expect("record key");
    let old: Book = indexer
        .decode(&txn.get(&record_key).expect("get").expect("existing record"))
        .expect("decode book");
    txn.set(record_key.clone(), indexer.encode(book).expect("encode"))
        .expect("set record");
    indexer
        .index_update(&storer, txn, &record_key, &old, book)
        .expect("index update");
}

pub fn remove<T: Transaction>(indexer: &Indexer, txn: &mut T, key: &str) {
    let storer = Books::new();
    let record_key = indexer
        .record_key(&storer, key.as_bytes())
        .expect("record key");
    let old: Book = indexer
        .decode(&txn.get(&record_key).expect("get").expect("existing record"))
        .expect("decode book");
    txn.delete(&record_key).expect("delete record");
    indexer
        .index_delete(&storer, txn, &record_key, &old)
        .expect("index delete");
}

/// Every index entry stored under `index`, as (encoded value, record keys).
pub fn entries<T: Transaction>(
    indexer: &Indexer,
    txn: &T,
    index: &str,
) -> Vec<(Vec<u8>, Vec<Vec<u8>>)> {
    use keyhold::{KeyList, StoreIter};

    let prefix = indexer
        .keyspace()
        .index_key_prefix("Book", index)
        .expect("index prefix");
    let mut iter = txn.iter();
    iter.seek(&prefix);
    let mut out = Vec::new();
    while iter.valid_for_prefix(&prefix) {
        let (key, value) = iter.item().expect("valid cursor has an item");
        let list: KeyList = indexer.decode(value).expect("decode key list");
        out.push((key[prefix.len()..].to_vec(), list.into_keys()));
        iter.next();
    }
    out
}
