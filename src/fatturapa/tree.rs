use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::core::FatturaError;

/// Minimal element tree: local names and text, nothing else.
///
/// Lookups follow DOM `getElementsByTagName` semantics: descendants in
/// document (pre-)order, the context element itself excluded. Walks and
/// drops use an explicit stack, so nesting depth is bounded by memory only.
#[derive(Debug, Default)]
pub struct XmlElement {
    name: String,
    children: Vec<XmlNode>,
}

#[derive(Debug)]
enum XmlNode {
    Element(XmlElement),
    Text(String),
}

impl XmlElement {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Vec::new(),
        }
    }

    /// Local name, namespace prefix stripped. The document node has an empty name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn nodes(&self) -> Nodes<'_> {
        Nodes {
            stack: vec![self.children.iter()],
        }
    }

    fn descendants(&self) -> impl Iterator<Item = &XmlElement> {
        self.nodes().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// First descendant named `tag`.
    pub fn find(&self, tag: &str) -> Option<&XmlElement> {
        self.descendants().find(|el| el.name == tag)
    }

    /// Resolve `path` segment by segment, each one inside the previous match.
    ///
    /// Only the first match of every segment is considered: if it lacks the
    /// next segment the lookup fails even when a later sibling would match.
    pub fn find_path(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter().try_fold(self, |el, tag| el.find(tag))
    }

    /// Every descendant named `tag`, in document order.
    pub fn find_all<'a>(&'a self, tag: &str) -> Vec<&'a XmlElement> {
        self.descendants().filter(|el| el.name == tag).collect()
    }

    /// Concatenated descendant text, trimmed.
    pub fn text(&self) -> String {
        let mut buf = String::new();
        for node in self.nodes() {
            if let XmlNode::Text(text) = node {
                buf.push_str(text);
            }
        }
        buf.trim().to_string()
    }
}

impl Drop for XmlElement {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let XmlNode::Element(mut el) = node {
                pending.append(&mut el.children);
            }
        }
    }
}

/// Pre-order walk over every node below an element.
struct Nodes<'a> {
    stack: Vec<std::slice::Iter<'a, XmlNode>>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a XmlNode;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(node) => {
                    if let XmlNode::Element(el) = node {
                        self.stack.push(el.children.iter());
                    }
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

fn malformed(message: impl std::fmt::Display) -> FatturaError {
    FatturaError::MalformedDocument(message.to_string())
}

fn start_element(e: &BytesStart<'_>) -> Result<XmlElement, FatturaError> {
    // Attributes are not mapped, but a broken one still makes the document malformed.
    for attr in e.attributes() {
        attr.map_err(|err| malformed(format!("invalid attribute: {err}")))?;
    }
    let name = std::str::from_utf8(e.local_name().as_ref())
        .map(str::to_string)
        .map_err(|err| malformed(format!("invalid element name: {err}")))?;
    Ok(XmlElement::new(name))
}

/// Parse XML text into a document node whose single child is the root element.
pub fn parse_document(xml: &str) -> Result<XmlElement, FatturaError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = Reader::from_str(xml);

    // stack[0] is the document node
    let mut stack: Vec<XmlElement> = vec![XmlElement::default()];
    let mut has_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if stack.len() == 1 {
                    if has_root {
                        return Err(malformed("more than one root element"));
                    }
                    has_root = true;
                }
                stack.push(start_element(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                if stack.len() == 1 {
                    if has_root {
                        return Err(malformed("more than one root element"));
                    }
                    has_root = true;
                }
                let el = start_element(e)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::Element(el));
                }
            }
            Ok(Event::End(_)) => {
                if stack.len() < 2 {
                    return Err(malformed("unexpected closing tag"));
                }
                if let Some(el) = stack.pop() {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::Element(el));
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| malformed(format!("invalid text: {err}")))?;
                if stack.len() == 1 {
                    if !text.trim().is_empty() {
                        return Err(malformed("text outside the root element"));
                    }
                } else if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::Text(text.into_owned()));
                }
            }
            Ok(Event::CData(ref e)) => {
                if stack.len() == 1 {
                    return Err(malformed("CDATA outside the root element"));
                }
                let text = std::str::from_utf8(e)
                    .map_err(|err| malformed(format!("invalid CDATA: {err}")))?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::Text(text.to_string()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(malformed(format!(
                    "XML parse error at byte {}: {e}",
                    reader.error_position()
                )));
            }
            // Declarations, comments, processing instructions, doctype
            _ => {}
        }
    }

    if stack.len() > 1 {
        let open: Vec<&str> = stack[1..].iter().map(XmlElement::name).collect();
        return Err(malformed(format!("unclosed elements: {}", open.join(" > "))));
    }
    if !has_root {
        return Err(malformed("no root element"));
    }

    Ok(stack.swap_remove(0))
}
