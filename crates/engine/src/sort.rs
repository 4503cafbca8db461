use std::{
    cmp::{Ordering, Reverse},
    fmt,
    str::FromStr,
};

use pdfshelf_fs::PdfRecord;

/// The six orderings the list can be shown in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    NameAsc,
    NameDesc,
    TimeAsc,
    TimeDesc,
    SizeAsc,
    SizeDesc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 6] = [
        SortOrder::NameAsc,
        SortOrder::NameDesc,
        SortOrder::TimeAsc,
        SortOrder::TimeDesc,
        SortOrder::SizeAsc,
        SortOrder::SizeDesc,
    ];

    /// Short machine name, as accepted by `FromStr`.
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::NameAsc => "name-asc",
            SortOrder::NameDesc => "name-desc",
            SortOrder::TimeAsc => "time-asc",
            SortOrder::TimeDesc => "time-desc",
            SortOrder::SizeAsc => "size-asc",
            SortOrder::SizeDesc => "size-desc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::NameAsc => "Name A-Z",
            SortOrder::NameDesc => "Name Z-A",
            SortOrder::TimeAsc => "Time: Old → New",
            SortOrder::TimeDesc => "Time: New → Old",
            SortOrder::SizeAsc => "Capacity: Small → Large",
            SortOrder::SizeDesc => "Capacity: Large → Small",
        }
    }

    fn is_descending(self) -> bool {
        matches!(
            self,
            SortOrder::NameDesc | SortOrder::TimeDesc | SortOrder::SizeDesc
        )
    }

    /// Compare two records on this order's key, ascending or descending.
    /// Equal keys compare equal; nothing breaks ties.
    pub fn compare(self, a: &PdfRecord, b: &PdfRecord) -> Ordering {
        let ord = match self {
            SortOrder::NameAsc | SortOrder::NameDesc => {
                a.name.to_lowercase().cmp(&b.name.to_lowercase())
            }
            SortOrder::TimeAsc | SortOrder::TimeDesc => a.modified_ms.cmp(&b.modified_ms),
            SortOrder::SizeAsc | SortOrder::SizeDesc => a.size.cmp(&b.size),
        };

        if self.is_descending() {
            ord.reverse()
        } else {
            ord
        }
    }

    /// Stable sort of `records`: records with equal keys keep their order.
    pub fn sort(self, records: &mut [PdfRecord]) {
        match self {
            // Name keys allocate; compute each once.
            SortOrder::NameAsc => records.sort_by_cached_key(|r| r.name.to_lowercase()),
            SortOrder::NameDesc => records.sort_by_cached_key(|r| Reverse(r.name.to_lowercase())),
            _ => records.sort_by(|a, b| self.compare(a, b)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSortOrderError(String);

impl fmt::Display for ParseSortOrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = SortOrder::ALL.iter().map(|o| o.as_str()).collect();
        write!(
            f,
            "unknown sort order {:?} (expected one of: {})",
            self.0,
            names.join(", ")
        )
    }
}

impl std::error::Error for ParseSortOrderError {}

impl FromStr for SortOrder {
    type Err = ParseSortOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        SortOrder::ALL
            .into_iter()
            .find(|o| o.as_str() == wanted)
            .ok_or_else(|| ParseSortOrderError(s.to_owned()))
    }
}

#[cfg(test)]
#[path = "sort_tests.rs"]
mod tests;
