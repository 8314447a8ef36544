use super::arena::XmlDocument;
use super::node::XmlNodeData;
use super::xname::{XAttribute, XName, XMLNS_NS, XML_NS};
use crate::error::{IncipitError, Result};
use indextree::NodeId;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::io::Write;

const DEFAULT_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n";

pub fn serialize(doc: &XmlDocument) -> Result<String> {
    let bytes = serialize_bytes(doc)?;
    String::from_utf8(bytes).map_err(|e| IncipitError::XmlWrite(e.to_string()))
}

/// Serialize a whole part: verbatim prolog, the element tree, verbatim epilog.
pub fn serialize_bytes(doc: &XmlDocument) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());

    let prolog = doc.prolog().unwrap_or(DEFAULT_DECLARATION);
    writer.get_mut().write_all(prolog.as_bytes())?;

    if let Some(root_id) = doc.root() {
        write_node(doc, root_id, &mut writer, &NamespaceMap::new())?;
    }

    writer.get_mut().write_all(doc.epilog().as_bytes())?;
    Ok(writer.into_inner())
}

/// Serialize a subtree starting from a specific node (no XML declaration).
/// Namespace declarations inherited from ancestors are repeated on the
/// subtree root so the fragment stands alone.
pub fn serialize_subtree(doc: &XmlDocument, node_id: NodeId) -> Result<String> {
    let mut writer = Writer::new(Vec::new());

    let Some(node_data) = doc.get(node_id) else {
        return Ok(String::new());
    };

    match node_data {
        XmlNodeData::Element { name, attributes } => {
            let mut merged_attrs = attributes.clone();
            let mut declared: HashSet<XName> = merged_attrs
                .iter()
                .filter(|attr| attr.name.is_namespace_declaration())
                .map(|attr| attr.name.clone())
                .collect();

            let inherited = collect_ancestor_namespace_attrs(doc, node_id, &mut declared);
            merged_attrs.splice(0..0, inherited);

            write_element_with_attrs(doc, node_id, name, &merged_attrs, &mut writer, &NamespaceMap::new())?;
        }
        _ => write_node(doc, node_id, &mut writer, &NamespaceMap::new())?,
    }

    String::from_utf8(writer.into_inner()).map_err(|e| IncipitError::XmlWrite(e.to_string()))
}

/// Namespace URI to prefix; an empty prefix means the default namespace.
type NamespaceMap = HashMap<String, String>;

fn collect_ancestor_namespace_attrs(
    doc: &XmlDocument,
    node_id: NodeId,
    declared: &mut HashSet<XName>,
) -> Vec<XAttribute> {
    let mut collected = Vec::new();

    for ancestor_id in doc.ancestors(node_id).skip(1) {
        let Some(attrs) = doc.get(ancestor_id).and_then(|d| d.attributes()) else {
            continue;
        };

        for attr in attrs {
            if attr.name.is_namespace_declaration() && declared.insert(attr.name.clone()) {
                collected.push(attr.clone());
            }
        }
    }

    collected
}

fn extend_namespace_map(namespace_map: &mut NamespaceMap, attributes: &[XAttribute]) {
    for attr in attributes {
        match attr.name.namespace.as_deref() {
            None if attr.name.local_name == "xmlns" => {
                namespace_map.insert(attr.value.clone(), String::new());
            }
            Some(XMLNS_NS) => {
                namespace_map.insert(attr.value.clone(), attr.name.local_name.clone());
            }
            _ => {}
        }
    }
}

fn qualified_element_name(name: &XName, namespace_map: &NamespaceMap) -> String {
    let Some(ns) = &name.namespace else {
        return name.local_name.clone();
    };
    let prefix = namespace_map
        .get(ns)
        .map(String::as_str)
        .unwrap_or_else(|| well_known_prefix(ns));
    if prefix.is_empty() {
        name.local_name.clone()
    } else {
        format!("{}:{}", prefix, name.local_name)
    }
}

fn qualified_attribute_name(name: &XName, namespace_map: &NamespaceMap) -> String {
    let Some(ns) = &name.namespace else {
        return name.local_name.clone();
    };
    // Unprefixed attributes never take the default namespace.
    let prefix = match namespace_map.get(ns) {
        Some(prefix) if !prefix.is_empty() => prefix.as_str(),
        _ => well_known_prefix(ns),
    };
    format!("{}:{}", prefix, name.local_name)
}

fn write_node<W: Write>(
    doc: &XmlDocument,
    node_id: NodeId,
    writer: &mut Writer<W>,
    namespace_map: &NamespaceMap,
) -> Result<()> {
    let Some(node_data) = doc.get(node_id) else {
        return Ok(());
    };

    match node_data {
        XmlNodeData::Element { name, attributes } => {
            write_element_with_attrs(doc, node_id, name, attributes, writer, namespace_map)?;
        }
        XmlNodeData::Text(text) => {
            write_event(writer, Event::Text(BytesText::from_escaped(partial_escape(text))))?;
        }
        XmlNodeData::CData(text) => {
            write_event(writer, Event::CData(BytesCData::new(text.as_str())))?;
        }
        XmlNodeData::Comment(text) => {
            write_event(writer, Event::Comment(BytesText::from_escaped(text.as_str())))?;
        }
        XmlNodeData::ProcessingInstruction { target, data } => {
            let pi_content = if data.is_empty() {
                target.clone()
            } else {
                format!("{} {}", target, data)
            };
            write_event(writer, Event::PI(BytesPI::new(pi_content)))?;
        }
    }

    Ok(())
}

fn write_element_with_attrs<W: Write>(
    doc: &XmlDocument,
    node_id: NodeId,
    name: &XName,
    attributes: &[XAttribute],
    writer: &mut Writer<W>,
    namespace_map: &NamespaceMap,
) -> Result<()> {
    let mut scoped_map = namespace_map.clone();
    extend_namespace_map(&mut scoped_map, attributes);

    let tag_name = qualified_element_name(name, &scoped_map);
    let mut elem = BytesStart::new(tag_name.as_str());

    for attr in attributes {
        let attr_name = if attr.name.is_namespace_declaration() && attr.name.namespace.is_some() {
            format!("xmlns:{}", attr.name.local_name)
        } else {
            qualified_attribute_name(&attr.name, &scoped_map)
        };
        let value = escape_attribute(&attr.value);
        elem.push_attribute((attr_name.as_bytes(), value.as_bytes()));
    }

    let mut children = doc.children(node_id).peekable();

    if children.peek().is_none() {
        write_event(writer, Event::Empty(elem))?;
    } else {
        write_event(writer, Event::Start(elem))?;
        for child_id in children {
            write_node(doc, child_id, writer, &scoped_map)?;
        }
        write_event(writer, Event::End(BytesEnd::new(tag_name.as_str())))?;
    }

    Ok(())
}

fn write_event<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| IncipitError::XmlWrite(e.to_string()))
}

/// Attribute values are always written double-quoted, so `'` stays literal.
fn escape_attribute(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\t', '\n', '\r']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\t' => escaped.push_str("&#9;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn well_known_prefix(namespace: &str) -> &'static str {
    match namespace {
        "http://schemas.openxmlformats.org/wordprocessingml/2006/main" => "w",
        "http://schemas.microsoft.com/office/word/2010/wordml" => "w14",
        "http://schemas.microsoft.com/office/word/2012/wordml" => "w15",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships" => "r",
        "http://schemas.openxmlformats.org/markup-compatibility/2006" => "mc",
        "http://schemas.openxmlformats.org/drawingml/2006/main" => "a",
        "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" => "wp",
        "http://schemas.openxmlformats.org/officeDocument/2006/math" => "m",
        XMLNS_NS => "xmlns",
        XML_NS => "xml",
        _ => "ns",
    }
}
