use std::collections::BTreeMap;

use super::Value;

/// A flattened record: dotted field paths (e.g. `"Address.City"`) mapped to
/// [`Value`]s.
///
/// Produced by [`flatten()`](crate::flatten) from a [`Record`](crate::Record),
/// or built by hand. Iteration is ordered by path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    data: BTreeMap<String, Value>,
}

impl Fields {
    /// Create an empty field set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value at a dotted path.
    #[must_use]
    pub fn set(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.insert(path, value.into());
        self
    }

    /// Insert a value at a dotted path (mutable reference version).
    /// An existing value at the same path is replaced.
    pub fn insert(&mut self, path: &str, value: Value) {
        self.data.insert(path.to_owned(), value);
    }

    /// Look up a value by its full dotted path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.data.get(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over `(path, value)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_simple() {
        let fields = Fields::new().set("Name", "alice");
        assert_eq!(fields.get("Name"), Some(&Value::from("alice")));
    }

    #[test]
    fn dotted_paths_are_opaque_keys() {
        let fields = Fields::new().set("Address.City", "Toronto");
        assert_eq!(fields.get("Address.City"), Some(&Value::from("Toronto")));
        assert_eq!(fields.get("Address"), None);
    }

    #[test]
    fn overwrite_value() {
        let fields = Fields::new().set("Age", 10_i64).set("Age", 20_i64);
        assert_eq!(fields.get("Age"), Some(&Value::Int(20)));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn iteration_is_path_ordered() {
        let fields = Fields::new()
            .set("b", 1_i64)
            .set("a.z", 2_i64)
            .set("a", 3_i64);
        let paths: Vec<&str> = fields.iter().map(|(p, _)| p).collect();
        assert_eq!(paths, ["a", "a.z", "b"]);
    }

    #[test]
    fn collect_from_pairs() {
        let fields: Fields = [("Age", 30_i64), ("Zip", 12345)].into_iter().collect();
        assert_eq!(fields.get("Zip"), Some(&Value::Int(12345)));
        assert!(!fields.is_empty());
    }
}
