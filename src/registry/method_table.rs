//! Ordered name -> handler tables

/// Handlers keyed by name, kept in definition order.
///
/// Defining a name twice replaces the earlier handler in place: the last
/// definition wins and the name keeps its first position.
#[derive(Clone)]
pub struct MethodTable<H> {
    entries: Vec<(String, H)>,
}

impl<H> Default for MethodTable<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<H: Clone> MethodTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns true when an earlier handler was replaced
    pub fn define(&mut self, name: impl Into<String>, handler: H) -> bool {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => {
                entry.1 = handler;
                true
            }
            None => {
                self.entries.push((name, handler));
                false
            }
        }
    }

    /// A clone of the handler, so callers never hold a borrow while running it
    pub fn get(&self, name: &str) -> Option<H> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, h)| h.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
