//! Parse XML text back into a node tree.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::{Error, Result, XmlNode};

impl XmlNode {
    /// Parse XML text into a node tree.
    ///
    /// Declarations, comments and processing instructions are skipped; text
    /// and attribute values are unescaped.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    stack.push(start_node(&e)?);
                }
                Ok(Event::Empty(e)) => {
                    let node = start_node(&e)?;
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(node);
                    } else {
                        root = Some(node);
                    }
                }
                Ok(Event::End(_)) => {
                    if let Some(node) = stack.pop() {
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(node);
                        } else {
                            root = Some(node);
                        }
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(node) = stack.last_mut() {
                        let text = e.unescape().map_err(|e| Error::Xml(e.to_string()))?;
                        if !text.trim().is_empty() {
                            node.text = Some(text.into_owned());
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(Error::Xml(format!("XML parse error: {}", e))),
            }
        }

        root.ok_or_else(|| Error::Xml("No root element found in XML".to_string()))
    }
}

fn start_node(e: &BytesStart<'_>) -> Result<XmlNode> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut node = XmlNode::new(tag);

    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(e.to_string()))?
            .into_owned();
        node.attributes.push((key, value));
    }

    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::to_xml_string;

    #[test]
    fn test_from_xml_with_declaration() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<users>
  <user>
    <first_name>Jane</first_name>
  </user>
</users>"#;

        let root = XmlNode::from_xml(xml).unwrap();
        assert_eq!(root.tag, "users");
        let user = root.find("user").unwrap();
        assert_eq!(user.child_text("first_name"), Some("Jane"));
    }

    #[test]
    fn test_special_characters_round_trip() {
        let original = XmlNode::new("users").child(
            XmlNode::new("user")
                .attr("preferred", "R&D <lab>")
                .child(XmlNode::with_text("full_name", "O'Neil & Sons <Ltd>"))
                .child(XmlNode::new("parameters")),
        );

        let xml = to_xml_string(&original).unwrap();
        let parsed = XmlNode::from_xml(&xml).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_from_xml_empty() {
        assert!(XmlNode::from_xml("").is_err());
    }
}
