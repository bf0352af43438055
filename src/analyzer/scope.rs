use std::collections::HashMap;

use crate::types::types::{Type, TypeSet};

/// Identifiers visible at a program point and the types each may hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    variables: HashMap<String, TypeSet>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    /// The scope every build file starts from.
    pub fn root() -> Self {
        let mut scope = Scope::new();
        for name in ["meson", "build_machine", "host_machine", "target_machine"] {
            scope.set(name, TypeSet::single(Type::object(name)));
        }
        scope
    }

    pub fn get(&self, name: &str) -> Option<&TypeSet> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn set(&mut self, name: &str, types: TypeSet) {
        self.variables.insert(name.to_string(), types);
    }

    pub fn remove(&mut self, name: &str) -> Option<TypeSet> {
        self.variables.remove(name)
    }

    /// Adds `other`'s types to every identifier it names.
    pub fn union(&mut self, other: &Scope) {
        for (name, types) in &other.variables {
            self.variables
                .entry(name.clone())
                .or_default()
                .union(types);
        }
    }

    /// Union of several exit scopes.
    pub fn merge_all<'a>(scopes: impl IntoIterator<Item = &'a Scope>) -> Scope {
        let mut merged = Scope::new();
        for scope in scopes {
            merged.union(scope);
        }
        merged
    }

    /// Identifier names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names = self.variables.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// True if every identifier of `self` is in `other` with at least the
    /// same types.
    pub fn is_subset(&self, other: &Scope) -> bool {
        self.variables.iter().all(|(name, types)| {
            other
                .get(name)
                .is_some_and(|theirs| types.is_subset(theirs))
        })
    }
}
