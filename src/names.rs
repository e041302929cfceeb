//! Name table mapping strings to small integer identifiers.
//!
//! Every word the scanner sees (reserved words, device names, numerals) is
//! interned here once. An identifier is the position of the string at its
//! first insertion, so identifiers are stable for the lifetime of the table.

use std::collections::HashMap;
use std::fmt;

/// Identifier of an interned string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameId(pub usize);

impl fmt::Display for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bidirectional string interner.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    names: Vec<String>,
    index: HashMap<String, NameId>,
}

impl NameTable {
    /// Create an empty name table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the identifier for `name`, inserting it if not already present.
    pub fn lookup(&mut self, name: &str) -> NameId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = NameId(self.names.len());
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        id
    }

    /// Intern several names at once, in order.
    pub fn lookup_all<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<NameId> {
        names.iter().map(|n| self.lookup(n.as_ref())).collect()
    }

    /// Return the identifier for `name` without inserting it.
    pub fn query(&self, name: &str) -> Option<NameId> {
        self.index.get(name).copied()
    }

    /// Return the string for `id`, or `None` if the id was never assigned.
    pub fn get_name_string(&self, id: NameId) -> Option<&str> {
        self.names.get(id.0).map(String::as_str)
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_idempotent() {
        let mut names = NameTable::new();
        let a = names.lookup("clk1");
        let b = names.lookup("clk1");
        assert_eq!(a, b);
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_distinct_names_get_distinct_ids() {
        let mut names = NameTable::new();
        let ids = names.lookup_all(&["a", "b", "c", "a"]);
        assert_eq!(ids, vec![NameId(0), NameId(1), NameId(2), NameId(0)]);
    }

    #[test]
    fn test_ids_are_stable() {
        let mut names = NameTable::new();
        let first = names.lookup("sw1");
        for i in 0..50 {
            names.lookup(&format!("g{}", i));
        }
        assert_eq!(names.lookup("sw1"), first);
        assert_eq!(names.get_name_string(first), Some("sw1"));
    }

    #[test]
    fn test_query_does_not_insert() {
        let mut names = NameTable::new();
        assert_eq!(names.query("missing"), None);
        assert!(names.is_empty());
        let id = names.lookup("present");
        assert_eq!(names.query("present"), Some(id));
    }

    #[test]
    fn test_get_name_string_out_of_range() {
        let names = NameTable::new();
        assert_eq!(names.get_name_string(NameId(3)), None);
    }
}
