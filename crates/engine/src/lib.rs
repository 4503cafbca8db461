mod library;
mod shelf;
mod sort;

pub use library::{Library, filter_by_name};
pub use shelf::{Shelf, ShelfError, ShelfResult};
pub use sort::{ParseSortOrderError, SortOrder};
