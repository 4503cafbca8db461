use std::path::Path;

use pdfshelf_fs::PdfRecord;

use crate::sort::SortOrder;

/// The canonical, sorted collection of known PDFs together with the current
/// name filter.
///
/// Sorting always applies to the canonical list. The filter only shapes
/// [`Library::visible`] and never drops records.
#[derive(Debug, Default)]
pub struct Library {
    records: Vec<PdfRecord>,
    order: SortOrder,
    query: String,
}

impl Library {
    pub fn new(order: SortOrder) -> Self {
        Self {
            records: Vec::new(),
            order,
            query: String::new(),
        }
    }

    /// Replace the collection with a fresh scan result, sorted by the
    /// current order.
    pub fn replace_all(&mut self, records: Vec<PdfRecord>) {
        self.records = records;
        self.order.sort(&mut self.records);
    }

    pub fn set_sort(&mut self, order: SortOrder) {
        self.order = order;
        self.order.sort(&mut self.records);
    }

    pub fn sort_order(&self) -> SortOrder {
        self.order
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Records whose display name contains the query, ignoring case, in
    /// canonical order. An empty query shows everything.
    pub fn visible(&self) -> Vec<&PdfRecord> {
        filter_by_name(&self.records, &self.query)
    }

    /// The whole canonical list, ignoring the filter.
    pub fn records(&self) -> &[PdfRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, path: &Path) -> Option<&PdfRecord> {
        self.records.iter().find(|r| r.path == path)
    }

    /// Remove the record at `path`. Exactly one record goes, even if the
    /// collection somehow holds the path twice.
    pub fn remove(&mut self, path: &Path) -> Option<PdfRecord> {
        let pos = self.records.iter().position(|r| r.path == path)?;
        Some(self.records.remove(pos))
    }

    /// Swap the record at `old_path` for `record`, keeping its position.
    /// The list is not re-sorted until the next sort change, matching what
    /// the user just saw.
    pub fn replace(&mut self, old_path: &Path, record: PdfRecord) -> bool {
        match self.records.iter_mut().find(|r| r.path == old_path) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }
}

/// Case-insensitive substring filter over display names.
pub fn filter_by_name<'a>(records: &'a [PdfRecord], query: &str) -> Vec<&'a PdfRecord> {
    if query.is_empty() {
        return records.iter().collect();
    }

    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| r.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
#[path = "library_tests.rs"]
mod tests;
