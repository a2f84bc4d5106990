//! Per-directory name de-duplication.

use std::collections::HashSet;

/// Names already handed out for one output directory.
///
/// Use one registry per destination directory and drop it when that
/// directory is done, so the same name can repeat across directories.
#[derive(Debug, Default, Clone)]
pub struct NameRegistry {
    names: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `candidate`, or the first free `candidate (N)` for N = 1, 2, ...
    ///
    /// The returned name is registered before it is returned, so the same
    /// registry never hands it out again.
    pub fn make_unique(&mut self, candidate: String) -> String {
        if !self.names.contains(&candidate) {
            self.names.insert(candidate.clone());
            return candidate;
        }

        let mut n: u64 = 1;
        loop {
            let probe = format!("{candidate} ({n})");
            if self.names.insert(probe.clone()) {
                tracing::debug!(candidate = %candidate, name = %probe, "Renamed duplicate entry");
                return probe;
            }
            n += 1;
        }
    }

    /// Whether `name` has already been handed out.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
