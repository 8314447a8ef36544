use super::arena::XmlDocument;
use super::node::XmlNodeData;
use super::xname::{XAttribute, XName, XMLNS_NS};
use crate::error::{IncipitError, Result};

pub fn parse(xml: &str) -> Result<XmlDocument> {
    parse_part(xml.as_bytes(), "input")
}

/// Parse the bytes of a named package part. `part` is only used to label
/// errors.
pub fn parse_part(bytes: &[u8], part: &str) -> Result<XmlDocument> {
    let text = std::str::from_utf8(bytes).map_err(|e| IncipitError::MarkupMalformed {
        part: part.to_string(),
        message: e.to_string(),
        location: format!("byte {}", e.valid_up_to()),
    })?;

    let doc = roxmltree::Document::parse_with_options(
        text,
        roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        },
    )
    .map_err(|e| IncipitError::MarkupMalformed {
        part: part.to_string(),
        message: e.to_string(),
        location: format!("line {}", e.pos().row),
    })?;

    let mut xml_doc = XmlDocument::new();
    let root = doc.root_element();
    let range = root.range();
    xml_doc.set_prolog(&text[..range.start]);
    xml_doc.set_epilog(&text[range.end..]);

    build_tree(root, &mut xml_doc, None);

    Ok(xml_doc)
}

fn build_tree(node: roxmltree::Node, doc: &mut XmlDocument, parent: Option<indextree::NodeId>) {
    let node_data = match node.node_type() {
        roxmltree::NodeType::Element => {
            let name = XName::new(node.tag_name().namespace().unwrap_or(""), node.tag_name().name());

            // roxmltree reports every namespace in scope; keep only the ones
            // this element declares so declarations stay where they were.
            let mut attributes: Vec<XAttribute> = declared_namespaces(node);

            attributes.extend(node.attributes().map(|attr| {
                XAttribute::new(
                    XName::new(attr.namespace().unwrap_or(""), attr.name()),
                    attr.value(),
                )
            }));

            XmlNodeData::Element { name, attributes }
        }
        roxmltree::NodeType::Text => match node.text() {
            Some(text) => XmlNodeData::Text(text.to_string()),
            None => return,
        },
        roxmltree::NodeType::Comment => match node.text() {
            Some(text) => XmlNodeData::Comment(text.to_string()),
            None => return,
        },
        roxmltree::NodeType::PI => match node.pi() {
            Some(pi) => XmlNodeData::ProcessingInstruction {
                target: pi.target.to_string(),
                data: pi.value.map(|s| s.to_string()).unwrap_or_default(),
            },
            None => return,
        },
        _ => return,
    };

    let new_id = match parent {
        Some(parent_id) => doc.add_child(parent_id, node_data),
        None => doc.add_root(node_data),
    };

    for child in node.children() {
        build_tree(child, doc, Some(new_id));
    }
}

fn declared_namespaces(node: roxmltree::Node) -> Vec<XAttribute> {
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();

    node.namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| match ns.name() {
            Some(prefix) => XAttribute::new(XName::new(XMLNS_NS, prefix), ns.uri()),
            None => XAttribute::new(XName::local("xmlns"), ns.uri()),
        })
        .collect()
}
