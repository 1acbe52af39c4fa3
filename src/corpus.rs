//! CSV training corpus reader.
//!
//! Rows have the columns `id,normalized_name,vendor_id` (a header line is
//! required; `name` is accepted in place of `normalized_name`). The same file
//! feeds the model builder and the in-memory resolver. With
//! [`CorpusReader::with_eligibility`] rows whose name fails the
//! [`EligibilityRules`] are skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use canonical::{collapse_whitespace, normalize_transaction_name};
use index::{EntryId, TrainingRecord};
use matcher::{InMemoryResolver, ResolvedName, VendorId};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::eligibility::EligibilityRules;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to open corpus: {0}")]
    Open(#[from] std::io::Error),
    #[error("malformed corpus row: {0}")]
    Csv(#[from] csv::Error),
}

/// How the name column is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameColumn {
    /// Already normalized; only whitespace is collapsed.
    #[default]
    Normalized,
    /// Raw descriptions, run through the normalizer on read.
    Raw,
}

/// One corpus row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CorpusRow {
    pub id: EntryId,
    #[serde(alias = "name")]
    pub normalized_name: String,
    pub vendor_id: VendorId,
}

impl CorpusRow {
    pub fn training_record(&self) -> TrainingRecord {
        TrainingRecord::new(self.id, self.normalized_name.clone())
    }

    pub fn resolved_name(&self) -> ResolvedName {
        ResolvedName::new(self.id, self.normalized_name.clone(), self.vendor_id)
    }
}

/// Streaming iterator over corpus rows.
pub struct CorpusReader<R: Read> {
    rows: csv::DeserializeRecordsIntoIter<R, CorpusRow>,
    names: NameColumn,
    eligibility: Option<EligibilityRules>,
    skipped: u64,
}

impl CorpusReader<File> {
    pub fn open<P: AsRef<Path>>(path: P, names: NameColumn) -> Result<Self, CorpusError> {
        Ok(Self::from_reader(File::open(path)?, names))
    }
}

impl<R: Read> CorpusReader<R> {
    pub fn from_reader(reader: R, names: NameColumn) -> Self {
        let rows = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader)
            .into_deserialize();
        Self {
            rows,
            names,
            eligibility: None,
            skipped: 0,
        }
    }

    /// Skip rows whose normalized name `rules` rejects.
    pub fn with_eligibility(mut self, rules: EligibilityRules) -> Self {
        self.eligibility = Some(rules);
        self
    }

    /// Rows dropped by the eligibility rules so far.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Training records only, for [`index::ModelBuilder::build`].
    pub fn training_records(self) -> impl Iterator<Item = Result<TrainingRecord, CorpusError>> {
        self.map(|row| row.map(|r| r.training_record()))
    }
}

impl<R: Read> Iterator for CorpusReader<R> {
    type Item = Result<CorpusRow, CorpusError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut row = match self.rows.next()? {
                Ok(row) => row,
                Err(err) => return Some(Err(err.into())),
            };
            row.normalized_name = match self.names {
                NameColumn::Normalized => collapse_whitespace(&row.normalized_name),
                NameColumn::Raw => normalize_transaction_name(&row.normalized_name),
            };
            match &self.eligibility {
                Some(rules) if !rules.is_eligible(&row.normalized_name) => {
                    self.skipped += 1;
                    debug!(id = row.id, name = %row.normalized_name, "skipping ineligible corpus row");
                }
                _ => return Some(Ok(row)),
            }
        }
    }
}

/// Collect every row into an [`InMemoryResolver`].
pub fn load_resolver<I>(rows: I) -> Result<InMemoryResolver, CorpusError>
where
    I: IntoIterator<Item = Result<CorpusRow, CorpusError>>,
{
    let mut resolver = InMemoryResolver::new();
    for row in rows {
        resolver.insert(row?.resolved_name());
    }
    Ok(resolver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use matcher::Resolver;

    const CSV: &str = "id,normalized_name,vendor_id\n1,starbucks,10\n2, shell   oil ,20\n";

    #[test]
    fn reads_rows_and_collapses_whitespace() {
        let rows: Vec<CorpusRow> = CorpusReader::from_reader(CSV.as_bytes(), NameColumn::Normalized)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].normalized_name, "shell oil");
        assert_eq!(rows[1].vendor_id, 20);
    }

    #[test]
    fn raw_names_are_normalized() {
        let csv = "id,name,vendor_id\n7,\"WAL-MART #5678 01/15\",3\n";
        let row = CorpusReader::from_reader(csv.as_bytes(), NameColumn::Raw)
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(row.normalized_name, "walmart 5678");
    }

    #[test]
    fn malformed_row_is_an_error() {
        let csv = "id,normalized_name,vendor_id\nabc,starbucks,10\n";
        let first = CorpusReader::from_reader(csv.as_bytes(), NameColumn::Normalized).next();
        assert!(matches!(first, Some(Err(CorpusError::Csv(_)))));
    }

    #[test]
    fn ineligible_rows_are_skipped() {
        let csv = "id,name,vendor_id\n1,PAYMENT,1\n2,Starbucks #4521,2\n3,ATM WITHDRAWAL 9,3\n4,,4\n";
        let mut reader = CorpusReader::from_reader(csv.as_bytes(), NameColumn::Raw)
            .with_eligibility(EligibilityRules::default());
        let ids: Vec<EntryId> = reader.by_ref().map(|row| row.unwrap().id).collect();
        assert_eq!(ids, vec![2]);
        assert_eq!(reader.skipped(), 3);
    }

    #[test]
    fn without_rules_every_row_is_kept() {
        let csv = "id,name,vendor_id\n1,payment,1\n2,starbucks,2\n";
        let rows = CorpusReader::from_reader(csv.as_bytes(), NameColumn::Normalized).count();
        assert_eq!(rows, 2);
    }

    #[test]
    fn resolver_holds_every_row() {
        let resolver =
            load_resolver(CorpusReader::from_reader(CSV.as_bytes(), NameColumn::Normalized)).unwrap();
        let names = resolver.resolve(&[1, 2]).unwrap();
        assert_eq!(names.len(), 2);
    }
}
