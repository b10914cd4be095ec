//! Values captured while resolving a request path.

/// Key under which the matched route's name is recorded.
pub const ROUTE_NAME_KEY: &str = "name";

/// Key under which a catch-all capture is recorded.
pub const CATCH_ALL_KEY: &str = "*";

/// A captured value: a single string until the same key is captured twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    One(String),
    Many(Vec<String>),
}

/// Per-request parameter container.
///
/// Keys are the registered segment names (`:uuid`), the catch-all marker
/// (`*`) or [`ROUTE_NAME_KEY`]. Insertion order is preserved, and a key
/// captured more than once keeps every value in the order it was seen, so
/// `/:uuid/:uuid` yields a two element list under `:uuid`.
///
/// # Example
///
/// ```
/// use thicket::Params;
///
/// let mut params = Params::new();
/// params.add(":uuid", "a");
/// params.add(":uuid", "b");
/// assert_eq!(params.get(":uuid"), Some("a"));
/// assert_eq!(params.get_index(":uuid", 1), Some("b"));
/// assert_eq!(params.get_all(":uuid"), vec!["a", "b"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value under `key`, promoting to a list on repeats.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            None => self.entries.push((key, ParamValue::One(value))),
            Some((_, slot)) => match slot {
                ParamValue::One(first) => {
                    let first = std::mem::take(first);
                    *slot = ParamValue::Many(vec![first, value]);
                }
                ParamValue::Many(values) => values.push(value),
            },
        }
    }

    /// Returns the raw stored value.
    pub fn value(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Gets a value; for repeated keys this is the first capture.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self.value(key)? {
            ParamValue::One(v) => Some(v),
            ParamValue::Many(values) => values.first().map(String::as_str),
        }
    }

    /// Gets the `index`-th capture of a key.
    ///
    /// A key captured once only answers index 0.
    pub fn get_index(&self, key: &str, index: usize) -> Option<&str> {
        match self.value(key)? {
            ParamValue::One(v) if index == 0 => Some(v),
            ParamValue::One(_) => None,
            ParamValue::Many(values) => values.get(index).map(String::as_str),
        }
    }

    /// Gets every capture of a key, in order. Empty if absent.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        match self.value(key) {
            None => Vec::new(),
            Some(ParamValue::One(v)) => vec![v.as_str()],
            Some(ParamValue::Many(values)) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Returns the name of the matched route, if it was given one.
    pub fn route_name(&self) -> Option<&str> {
        self.get(ROUTE_NAME_KEY)
    }

    /// Parses a parameter as a specific type.
    pub fn parse<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Returns an iterator over keys and values in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar() {
        let mut params = Params::new();
        params.add(":ip", "10.0.0.1");
        assert_eq!(params.get(":ip"), Some("10.0.0.1"));
        assert_eq!(params.get_index(":ip", 0), Some("10.0.0.1"));
        assert_eq!(params.get_index(":ip", 1), None);
        assert_eq!(params.get_all(":ip"), vec!["10.0.0.1"]);
        assert_eq!(
            params.value(":ip"),
            Some(&ParamValue::One("10.0.0.1".to_string()))
        );
    }

    #[test]
    fn test_promotion_keeps_order() {
        let mut params = Params::new();
        params.add(":uuid", "one");
        params.add(":uuid", "two");
        params.add(":uuid", "three");

        assert_eq!(params.len(), 1);
        assert_eq!(params.get_all(":uuid"), vec!["one", "two", "three"]);
        assert_eq!(params.get(":uuid"), Some("one"));
        assert_eq!(params.get_index(":uuid", 1), Some("two"));
        assert_eq!(params.get_index(":uuid", 2), Some("three"));
        assert_eq!(params.get_index(":uuid", 3), None);
    }

    #[test]
    fn test_missing_key() {
        let params = Params::new();
        assert!(params.is_empty());
        assert_eq!(params.get("*"), None);
        assert_eq!(params.get_index("*", 0), None);
        assert!(params.get_all("*").is_empty());
        assert_eq!(params.route_name(), None);
    }

    #[test]
    fn test_iter_and_parse() {
        let mut params = Params::new();
        params.add(":id", "42");
        params.add(CATCH_ALL_KEY, "a/b");
        params.add(ROUTE_NAME_KEY, "item");

        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![":id", "*", "name"]);
        assert_eq!(params.parse::<i64>(":id"), Some(42));
        assert_eq!(params.parse::<i64>("*"), None);
        assert_eq!(params.route_name(), Some("item"));
    }
}
