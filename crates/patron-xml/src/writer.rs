//! XML rendering.
//!
//! Rendering is pure: it returns text and never touches storage. Output has no
//! XML declaration, uses two-space indentation and keeps element and attribute
//! order exactly as built.

use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::{Error, Result, XmlNode};

/// Render a node tree to a UTF-8 string.
pub fn to_xml_string(root: &XmlNode) -> Result<String> {
    let mut output = Vec::new();
    write_xml(root, &mut output)?;
    Ok(String::from_utf8(output)?)
}

/// Write a node tree to a writer.
pub fn write_xml<W: Write>(root: &XmlNode, writer: W) -> Result<()> {
    let mut xml_writer = Writer::new_with_indent(writer, b' ', 2);
    write_element(&mut xml_writer, root)
}

fn write_element<W: Write>(writer: &mut Writer<W>, node: &XmlNode) -> Result<()> {
    let mut elem = BytesStart::new(node.tag.as_str());
    for (key, value) in &node.attributes {
        elem.push_attribute((key.as_str(), value.as_str()));
    }

    match (&node.text, node.children.is_empty()) {
        (None, true) => {
            writer
                .write_event(Event::Empty(elem))
                .map_err(|e| Error::Xml(e.to_string()))?;
        }
        (text, _) => {
            writer
                .write_event(Event::Start(elem))
                .map_err(|e| Error::Xml(e.to_string()))?;

            if let Some(text) = text {
                writer
                    .write_event(Event::Text(BytesText::new(text)))
                    .map_err(|e| Error::Xml(e.to_string()))?;
            }

            for child in &node.children {
                write_element(writer, child)?;
            }

            writer
                .write_event(Event::End(BytesEnd::new(node.tag.as_str())))
                .map_err(|e| Error::Xml(e.to_string()))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_declaration_and_indent() {
        let root = XmlNode::new("users").child(
            XmlNode::new("user")
                .child(XmlNode::with_text("record_type", "PUBLIC"))
                .child(XmlNode::new("addresses")),
        );

        let xml = to_xml_string(&root).unwrap();
        assert!(!xml.contains("<?xml"));
        assert_eq!(
            xml,
            "<users>\n  <user>\n    <record_type>PUBLIC</record_type>\n    <addresses/>\n  </user>\n</users>"
        );
    }

    #[test]
    fn test_escapes_text_and_attributes() {
        let root = XmlNode::new("email")
            .attr("note", "a \"quoted\" <value>")
            .child(XmlNode::with_text("email_address", "Tom & Jerry <tj@example.edu>"));

        let xml = to_xml_string(&root).unwrap();
        assert!(xml.contains("Tom &amp; Jerry &lt;tj@example.edu&gt;"));
        assert!(!xml.contains("<value>"));
    }

    #[test]
    fn test_attribute_order_is_kept() {
        let root = XmlNode::new("a").attr("z", "1").attr("b", "2");
        assert_eq!(to_xml_string(&root).unwrap(), r#"<a z="1" b="2"/>"#);
    }
}
