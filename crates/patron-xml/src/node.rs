//! In-memory element tree.

use patron_common::{present_text, Value};

/// One element of an export document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    /// Tag name of the element.
    pub tag: String,
    /// Text content, if any.
    pub text: Option<String>,
    /// Attributes as key-value pairs, in emission order.
    pub attributes: Vec<(String, String)>,
    /// Child elements, in emission order.
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Create an empty element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create an element holding fixed text.
    pub fn with_text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(tag).text(text)
    }

    /// Set the text content.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Add an attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Add a child element.
    pub fn child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// Add multiple children.
    pub fn children(mut self, children: impl IntoIterator<Item = XmlNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Append a child in place.
    pub fn push(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    /// Append `<tag>value</tag>` only when the value is present.
    pub fn push_field(&mut self, tag: &str, value: &Value) {
        if let Some(text) = present_text(value) {
            self.children.push(XmlNode::with_text(tag, text));
        }
    }

    /// First child with the given tag.
    pub fn find(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// All children with the given tag.
    pub fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Text of the first child with the given tag.
    pub fn child_text(&self, tag: &str) -> Option<&str> {
        self.find(tag).and_then(|c| c.text.as_deref())
    }

    /// Value of an attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_field_skips_blank() {
        let mut node = XmlNode::new("user");
        node.push_field("first_name", &Value::from("Jane"));
        node.push_field("middle_name", &Value::from("  "));
        node.push_field("last_name", &Value::Null);
        node.push_field("user_group", &Value::from("0"));

        let tags: Vec<_> = node.children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["first_name", "user_group"]);
        assert_eq!(node.child_text("user_group"), Some("0"));
    }

    #[test]
    fn test_lookup_helpers() {
        let node = XmlNode::new("email")
            .attr("preferred", "true")
            .child(XmlNode::with_text("email_address", "a@b.c"));

        assert_eq!(node.attribute("preferred"), Some("true"));
        assert_eq!(node.attribute("missing"), None);
        assert_eq!(node.child_text("email_address"), Some("a@b.c"));
        assert_eq!(node.find_all("email_address").count(), 1);
    }
}
