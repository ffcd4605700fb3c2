use std::{hash::Hash, rc::Rc};

use indexmap::IndexMap;

/// Bidirectional map between names and handles.
///
/// Giving a name a new binding shadows the old one, removing the name restores it.
/// Each handle also has a base name, the first name it was given. The base name survives removal of the binding.
#[derive(Debug, Clone)]
pub struct NameTable<H> {
    bindings: IndexMap<Rc<str>, Vec<H>>,
    base: IndexMap<H, Rc<str>>,
}

impl<H> Default for NameTable<H> {
    fn default() -> Self {
        Self {
            bindings: IndexMap::new(),
            base: IndexMap::new(),
        }
    }
}

impl<H: Copy + Eq + Hash> NameTable<H> {
    /// Binds `name` to `h`, shadowing any previous binding of `name`.
    pub fn set(&mut self, name: &str, h: H) {
        let name: Rc<str> = match self.bindings.get_key_value(name) {
            Some((k, _)) => k.clone(),
            None => Rc::from(name),
        };
        self.base.entry(h).or_insert_with(|| name.clone());
        self.bindings.entry(name).or_default().push(h);
    }

    /// Removes the most recent binding of `name`.
    /// Returns the handle that was bound, if any.
    pub fn remove(&mut self, name: &str) -> Option<H> {
        let stack = self.bindings.get_mut(name)?;
        let h = stack.pop();
        if stack.is_empty() {
            self.bindings.shift_remove(name);
        }
        h
    }

    /// The handle currently bound to `name`.
    pub fn get(&self, name: &str) -> Option<H> {
        self.bindings.get(name).and_then(|s| s.last().copied())
    }

    /// The base name of `h`.
    pub fn base_name(&self, h: H) -> Option<&str> {
        self.base.get(&h).map(|s| s.as_ref())
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
        self.base.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadowing() {
        let mut names: NameTable<u32> = NameTable::default();
        names.set("x", 1);
        names.set("x", 2);
        assert_eq!(names.get("x"), Some(2));
        assert_eq!(names.remove("x"), Some(2));
        assert_eq!(names.get("x"), Some(1));
        assert_eq!(names.remove("x"), Some(1));
        assert_eq!(names.get("x"), None);
        assert_eq!(names.remove("x"), None);
    }

    #[test]
    fn test_base_name_is_first_name() {
        let mut names: NameTable<u32> = NameTable::default();
        names.set("a", 7);
        names.set("b", 7);
        assert_eq!(names.base_name(7), Some("a"));
        names.remove("a");
        assert_eq!(names.base_name(7), Some("a"));
        assert_eq!(names.get("b"), Some(7));
    }
}
