//! Storage access for renaming and deleting PDFs under the three permission
//! regimes shared storage can be in.

mod error;
mod mutator;
mod regime;
mod strategy;

pub use error::{MutationError, MutationResult};
pub use mutator::{FileMutator, normalize_new_name};
pub use regime::{EnvRegimeProbe, FixedRegime, ParseRegimeError, PermissionRegime, RegimeProbe};
pub use strategy::{
    CopyFn, DirectAccess, IndexedAccess, LegacyAccess, StorageAccess, copy_all,
};
