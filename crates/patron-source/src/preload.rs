//! Join preloading.
//!
//! Each child category is read with exactly one statement per run and grouped
//! by its normalised owner key. Lookups for a key with no children return an
//! empty slice, so builders never special-case a missing group.

use rustc_hash::FxHashMap;

use patron_common::{present_text, PersonKey, Value};

use crate::records::{
    Address, ChildRow, Email, FlatLine, Person, Phone, UploadFileName, BODY_SEGMENT,
    HEADER_SEGMENT,
};
use crate::{Error, Query, QueryExecutor, Result};

/// Children of one category, grouped by owner key in source order.
#[derive(Debug, Clone)]
pub struct ChildIndex<T> {
    groups: FxHashMap<PersonKey, Vec<T>>,
    rows: usize,
}

impl<T> Default for ChildIndex<T> {
    fn default() -> Self {
        Self {
            groups: FxHashMap::default(),
            rows: 0,
        }
    }
}

impl<T: ChildRow> ChildIndex<T> {
    /// Group records by owner key. `query` names the source in errors.
    pub fn from_records(query: &Query, records: Vec<T>) -> Result<Self> {
        let mut index = Self::default();
        for record in records {
            let key = PersonKey::from_value(record.owner()).map_err(|source| {
                Error::MalformedKey {
                    query: query.to_string(),
                    source,
                }
            })?;
            index.groups.entry(key).or_default().push(record);
            index.rows += 1;
        }
        Ok(index)
    }
}

impl<T> ChildIndex<T> {
    /// Children of `key`, or an empty slice.
    #[inline]
    pub fn get(&self, key: PersonKey) -> &[T] {
        self.groups.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of grouped rows.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of distinct owner keys.
    pub fn key_count(&self) -> usize {
        self.groups.len()
    }
}

/// Run `query` once and group its rows.
pub fn preload_query<T, E>(executor: &E, query: &Query) -> Result<ChildIndex<T>>
where
    T: ChildRow,
    E: QueryExecutor + ?Sized,
{
    let records = executor.execute(query)?.decode::<T>(query)?;
    ChildIndex::from_records(query, records)
}

/// Run the category's default query once and group its rows.
pub fn preload<T, E>(executor: &E) -> Result<ChildIndex<T>>
where
    T: ChildRow,
    E: QueryExecutor + ?Sized,
{
    preload_query(executor, &T::query())
}

/// All contact categories for a run.
#[derive(Debug, Clone, Default)]
pub struct ContactIndexes {
    pub addresses: ChildIndex<Address>,
    pub emails: ChildIndex<Email>,
    pub phones: ChildIndex<Phone>,
}

impl ContactIndexes {
    /// Preload addresses, emails and phones.
    pub fn load<E: QueryExecutor + ?Sized>(executor: &E) -> Result<Self> {
        let addresses = preload(executor)?;
        let emails = preload(executor)?;
        let phones = preload(executor)?;

        let indexes = Self {
            addresses,
            emails,
            phones,
        };
        log::info!(
            "Preloaded {} addresses, {} emails, {} phones",
            indexes.addresses.row_count(),
            indexes.emails.row_count(),
            indexes.phones.row_count()
        );
        Ok(indexes)
    }
}

/// Fetch the people to export, optionally restricted to a PIDM list.
pub fn fetch_persons<E: QueryExecutor + ?Sized>(
    executor: &E,
    pidms: Option<&[Value]>,
) -> Result<Vec<Person>> {
    let query = Person::query_for(pidms);
    let persons = executor.execute(&query)?.decode::<Person>(&query)?;
    log::info!("Fetched {} persons", persons.len());
    Ok(persons)
}

/// Fetch flat-file lines: header segment first, then body segment.
pub fn fetch_flat_lines<E: QueryExecutor + ?Sized>(executor: &E) -> Result<Vec<String>> {
    let index: ChildIndex<FlatLine> = preload_query(executor, &FlatLine::query_segments())?;

    let lines: Vec<String> = [HEADER_SEGMENT, BODY_SEGMENT]
        .into_iter()
        .flat_map(|segment| index.get(PersonKey::new(segment)))
        .map(|line| line.text.to_string())
        .collect();

    log::info!("Fetched {} flat lines", lines.len());
    Ok(lines)
}

/// Fetch the scheduled upload file name, if the source provides one.
pub fn fetch_file_name<E: QueryExecutor + ?Sized>(executor: &E) -> Result<Option<String>> {
    let query = UploadFileName::query_put();
    let names = executor
        .execute(&query)?
        .decode::<UploadFileName>(&query)?;
    Ok(names.first().and_then(|n| present_text(&n.file_name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FromRow, ResultSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        set: ResultSet,
    }

    impl QueryExecutor for CountingSource {
        fn execute(&self, _query: &Query) -> Result<ResultSet> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.set.clone())
        }
    }

    fn email_rows(rows: Vec<(Value, &str)>) -> ResultSet {
        ResultSet::new(
            Email::COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows.into_iter()
                .map(|(pidm, address)| {
                    vec![pidm, Value::Null, Value::from(address), Value::from("PERS")]
                })
                .collect(),
        )
    }

    #[test]
    fn test_groups_mixed_key_representations() {
        let source = CountingSource {
            calls: AtomicUsize::new(0),
            set: email_rows(vec![
                (Value::from("372080"), "first@example.edu"),
                (Value::Integer(375036), "other@example.edu"),
                (Value::Decimal(372080.0), "second@example.edu"),
            ]),
        };

        let index: ChildIndex<Email> = preload(&source).unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(index.row_count(), 3);
        assert_eq!(index.key_count(), 2);

        let jane = index.get(PersonKey::new(372080));
        assert_eq!(jane.len(), 2);
        assert_eq!(jane[0].address, Value::from("first@example.edu"));
        assert_eq!(jane[1].address, Value::from("second@example.edu"));
    }

    #[test]
    fn test_absent_key_is_empty() {
        let index = ChildIndex::<Email>::default();
        assert!(index.get(PersonKey::new(1)).is_empty());
    }

    #[test]
    fn test_malformed_child_key_aborts() {
        let source = CountingSource {
            calls: AtomicUsize::new(0),
            set: email_rows(vec![(Value::from("n/a"), "x@example.edu")]),
        };

        let err = preload::<Email, _>(&source).unwrap_err();
        assert!(matches!(err, Error::MalformedKey { ref query, .. } if query == "ALMA_EMAIL"));
    }

    #[test]
    fn test_flat_lines_header_before_body() {
        let set = ResultSet::new(
            vec!["LINE_NO".into(), "SFTP_LINE".into()],
            vec![
                vec![Value::Integer(1), Value::from("body 1")],
                vec![Value::Integer(0), Value::from("header")],
                vec![Value::Integer(1), Value::from("body 2")],
            ],
        );
        let source = CountingSource {
            calls: AtomicUsize::new(0),
            set,
        };

        let lines = fetch_flat_lines(&source).unwrap();
        assert_eq!(lines, vec!["header", "body 1", "body 2"]);
    }
}
