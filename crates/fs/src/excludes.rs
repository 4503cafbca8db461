use std::path::{Path, PathBuf};

/// Platform trash locations. PDFs that were deleted into the trash should
/// not show up in the list.
#[derive(Debug, Clone, Default)]
pub struct TrashRoots {
    roots: Vec<PathBuf>,
}

/// Directory prefixes that are never descended into. Nested prefixes are
/// collapsed into their outermost ancestor.
#[derive(Debug, Clone, Default)]
pub struct ExcludePrefixes {
    roots: Vec<PathBuf>,
}

/// Everything the walker consults before descending into a directory.
#[derive(Debug, Clone, Default)]
pub struct ScanExcludes {
    pub trash: TrashRoots,
    pub prefixes: ExcludePrefixes,
}

impl TrashRoots {
    /// Trash roots for the current platform.
    pub fn platform() -> Self {
        let mut roots = Vec::new();

        #[cfg(target_os = "macos")]
        {
            if let Some(home) = dirs::home_dir() {
                roots.push(home.join(".Trash"));
            }
            roots.push(PathBuf::from("/.Trashes"));
        }

        #[cfg(target_os = "linux")]
        {
            // $XDG_DATA_HOME/Trash, or ~/.local/share/Trash
            if let Some(data) = dirs::data_dir() {
                roots.push(data.join("Trash"));
            }
        }

        let mut trash = TrashRoots::default();
        for root in roots {
            trash.add_root(root);
        }
        trash
    }

    pub fn add_root(&mut self, root: PathBuf) {
        let root = root.canonicalize().unwrap_or(root);
        self.roots.push(root);
    }

    #[inline]
    pub fn contains(&self, path: &Path) -> bool {
        if self.roots.iter().any(|root| path.starts_with(root)) {
            return true;
        }

        // Windows keeps a "$Recycle.Bin" at every volume root.
        #[cfg(target_os = "windows")]
        {
            if path
                .components()
                .any(|c| c.as_os_str().eq_ignore_ascii_case("$Recycle.Bin"))
            {
                return true;
            }
        }

        false
    }
}

impl ExcludePrefixes {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        let mut prefixes = ExcludePrefixes::default();
        for root in roots {
            prefixes.add_root(root);
        }
        prefixes
    }

    /// Pseudo-filesystems and runtime dirs that only matter when a scan
    /// starts at `/`.
    pub fn with_system_defaults() -> Self {
        #[cfg(unix)]
        {
            use pdfshelf_runtime::DEFAULT_SYSTEM_SKIP_PREFIXES;

            ExcludePrefixes::new(
                DEFAULT_SYSTEM_SKIP_PREFIXES
                    .iter()
                    .map(PathBuf::from)
                    .collect(),
            )
        }
        #[cfg(not(unix))]
        {
            ExcludePrefixes::default()
        }
    }

    pub fn add_root(&mut self, root: PathBuf) {
        // /var/run is a symlink to /run on many systems.
        let root = root.canonicalize().unwrap_or(root);

        if self.roots.iter().any(|existing| root.starts_with(existing)) {
            return;
        }

        self.roots.retain(|existing| !existing.starts_with(&root));
        self.roots.push(root);
    }

    #[inline]
    pub fn contains(&self, path: &Path) -> bool {
        self.roots.iter().any(|root| path.starts_with(root))
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

impl ScanExcludes {
    /// Platform trash plus the system skip prefixes.
    pub fn platform() -> Self {
        Self {
            trash: TrashRoots::platform(),
            prefixes: ExcludePrefixes::with_system_defaults(),
        }
    }

    #[inline]
    pub fn skips_dir(&self, path: &Path) -> bool {
        self.trash.contains(path) || self.prefixes.contains(path)
    }
}

#[cfg(test)]
#[path = "excludes_tests.rs"]
mod tests;
