//! Schema-declared paths.

use std::collections::HashSet;

use fx_types::WritablePaths;

/// Writable-path predicate backed by a set of declared schema paths.
///
/// A path is writable when it, or one of its ancestors, is declared; a
/// declared `conv` therefore accepts writes to `conv.eur`.
#[derive(Debug, Clone, Default)]
pub struct DeclaredPaths {
    paths: HashSet<String>,
}

impl DeclaredPaths {
    pub fn new<S: Into<String>>(paths: impl IntoIterator<Item = S>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn declare(&mut self, path: impl Into<String>) {
        self.paths.insert(path.into());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }
}

impl WritablePaths for DeclaredPaths {
    fn is_writable(&self, path: &str) -> bool {
        if self.paths.contains(path) {
            return true;
        }
        path.match_indices('.')
            .any(|(position, _)| self.paths.contains(&path[..position]))
    }
}
