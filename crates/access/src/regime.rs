use std::{env, fmt, str::FromStr};

use log::warn;
use pdfshelf_runtime::ACCESS_ENV;

/// How much of shared storage this process may touch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PermissionRegime {
    /// Arbitrary paths may be renamed and deleted directly.
    #[default]
    FullAccess,
    /// Only indexed storage may be changed; files are reached through their
    /// index entries.
    IndexedOnly,
    /// Older storage model: files are writable but an in-place rename is
    /// not available, so renames copy and delete.
    Legacy,
}

impl PermissionRegime {
    pub const ALL: [PermissionRegime; 3] = [
        PermissionRegime::FullAccess,
        PermissionRegime::IndexedOnly,
        PermissionRegime::Legacy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PermissionRegime::FullAccess => "full",
            PermissionRegime::IndexedOnly => "indexed",
            PermissionRegime::Legacy => "legacy",
        }
    }
}

impl fmt::Display for PermissionRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRegimeError(String);

impl fmt::Display for ParseRegimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown access regime {:?} (expected full, indexed or legacy)",
            self.0
        )
    }
}

impl std::error::Error for ParseRegimeError {}

impl FromStr for PermissionRegime {
    type Err = ParseRegimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "full" | "manager" => Ok(PermissionRegime::FullAccess),
            "indexed" | "media" => Ok(PermissionRegime::IndexedOnly),
            "legacy" => Ok(PermissionRegime::Legacy),
            _ => Err(ParseRegimeError(s.to_owned())),
        }
    }
}

/// Source of the current permission regime. Asked again before every
/// mutation since access can be granted or revoked while we run.
pub trait RegimeProbe {
    fn current(&self) -> PermissionRegime;
}

/// A regime fixed at startup, e.g. from a command-line flag.
#[derive(Debug, Clone, Copy)]
pub struct FixedRegime(pub PermissionRegime);

impl RegimeProbe for FixedRegime {
    fn current(&self) -> PermissionRegime {
        self.0
    }
}

/// Reads `PDFSHELF_ACCESS` on every call. Unset means full access; an
/// unparsable value also falls back to full access, with a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvRegimeProbe;

impl RegimeProbe for EnvRegimeProbe {
    fn current(&self) -> PermissionRegime {
        match env::var(ACCESS_ENV) {
            Ok(val) if !val.trim().is_empty() => val.parse().unwrap_or_else(|e| {
                warn!("[regime] {e}; assuming full access");
                PermissionRegime::FullAccess
            }),
            _ => PermissionRegime::FullAccess,
        }
    }
}

impl<P: RegimeProbe + ?Sized> RegimeProbe for Box<P> {
    fn current(&self) -> PermissionRegime {
        (**self).current()
    }
}

#[cfg(test)]
#[path = "regime_tests.rs"]
mod tests;
