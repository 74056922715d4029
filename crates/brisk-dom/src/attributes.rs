//! Element Attributes
//!
//! Attributes keep authoring order. Names are folded to ASCII lowercase on
//! the way in, so every lookup is case-insensitive. Elements rarely carry
//! more than a handful, so lookups scan.

/// Attribute collection of one element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedNodeMap {
    attributes: Vec<Attr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// Lowercase attribute name
    pub name: String,
    pub value: String,
}

impl Attr {
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            value: value.into(),
        }
    }
}

impl NamedNodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.attributes
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(name))
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.attributes[i].value.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Set `name` to `value` in place, or append it; returns the old value
    pub fn set_attribute(&mut self, name: &str, value: &str) -> Option<String> {
        match self.position(name) {
            Some(i) => Some(std::mem::replace(&mut self.attributes[i].value, value.to_string())),
            None => {
                self.attributes.push(Attr::new(name, value));
                None
            }
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<Attr> {
        self.position(name).map(|i| self.attributes.remove(i))
    }

    /// Lowercase names in authoring order
    pub fn names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attr> {
        self.attributes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_fold_case() {
        let mut attrs = NamedNodeMap::new();
        attrs.set_attribute("br-View", "{url:'/a'}");

        assert_eq!(attrs.get_attribute("BR-VIEW"), Some("{url:'/a'}"));
        assert!(attrs.has_attribute("br-view"));
        assert_eq!(attrs.names(), vec!["br-view"]);
    }

    #[test]
    fn test_overwrite_keeps_order() {
        let mut attrs = NamedNodeMap::new();
        attrs.set_attribute("a", "1");
        attrs.set_attribute("b", "2");

        assert_eq!(attrs.set_attribute("A", "3").as_deref(), Some("1"));
        assert_eq!(attrs.names(), vec!["a", "b"]);
        assert_eq!(attrs.get_attribute("a"), Some("3"));
    }

    #[test]
    fn test_remove() {
        let mut attrs = NamedNodeMap::new();
        attrs.set_attribute("a", "1");
        attrs.set_attribute("c", "3");

        assert_eq!(attrs.remove_attribute("A").map(|a| a.value), Some("1".to_string()));
        assert_eq!(attrs.get_attribute("c"), Some("3"));
        assert!(attrs.remove_attribute("a").is_none());
        assert_eq!(attrs.len(), 1);
    }
}
