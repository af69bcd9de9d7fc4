//! Aggregation of analysis records into a single result table.

use crate::AnalysisRecord;

/// Records from one session, in submission order.
///
/// Columns are the union of all record keys, ordered by first appearance.
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    records: Vec<AnalysisRecord>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record as the next row.
    pub fn push(&mut self, record: AnalysisRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[AnalysisRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column names: every key seen in any record, first-seen order.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for key in self.records.iter().flat_map(|r| r.keys()) {
            if !columns.contains(&key) {
                columns.push(key);
            }
        }
        columns
    }

    /// Cell text for every record, aligned to [`columns`](Self::columns).
    ///
    /// Keys a record lacks become empty cells.
    pub fn rows(&self) -> Vec<Vec<String>> {
        let columns = self.columns();
        self.records
            .iter()
            .map(|record| columns.iter().map(|c| record.cell_text(c)).collect())
            .collect()
    }
}

impl Extend<AnalysisRecord> for ResultTable {
    fn extend<T: IntoIterator<Item = AnalysisRecord>>(&mut self, iter: T) {
        self.records.extend(iter);
    }
}
