//! LiveData document parsing and element path lookup
//!
//! The gateway serves a single XML document rooted at `<LiveData>`. Values are
//! addressed by an ordered list of element names, descending one level per name
//! and taking the first matching child at each level, so repeated sibling tags
//! never make a lookup ambiguous.

use xmltree::{Element, XMLNode};

use crate::error::TedError;

/// Tag name every accepted document root must carry
pub const LIVE_DATA_ROOT: &str = "LiveData";

/// A parsed LiveData document
#[derive(Debug, Clone)]
pub struct LiveData {
    root: Element,
}

impl LiveData {
    /// Parse a LiveData document from raw XML text.
    ///
    /// # Errors
    ///
    /// Returns `TedError::Parse` for malformed XML and
    /// `TedError::UnexpectedRoot` if the root tag is not `LiveData`.
    pub fn parse(xml: &str) -> Result<Self, TedError> {
        let root = Element::parse(xml.as_bytes()).map_err(|e| TedError::Parse(e.to_string()))?;

        if root.name != LIVE_DATA_ROOT {
            return Err(TedError::UnexpectedRoot(root.name));
        }

        Ok(Self { root })
    }

    /// The `<LiveData>` root element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Text content of the element at `path`, or `None` if any segment is missing
    pub fn value<S: AsRef<str>>(&self, path: &[S]) -> Option<String> {
        find_element(&self.root, path).map(text_content)
    }

    /// Integer value of the element at `path`
    ///
    /// Returns `None` when the path does not resolve, and `Some(Err(..))` when it
    /// resolves to text that is not an integer.
    pub fn integer<S: AsRef<str>>(&self, path: &[S]) -> Option<Result<i64, std::num::ParseIntError>> {
        self.value(path).map(|text| text.trim().parse::<i64>())
    }
}

/// Descend from `element` following `path`, one child level per segment.
///
/// At each level the first child element (document order) whose tag equals the
/// segment is selected. An empty path returns `None`.
pub fn find_element<'a, S: AsRef<str>>(element: &'a Element, path: &[S]) -> Option<&'a Element> {
    let (first, rest) = path.split_first()?;
    let child = first_child(element, first.as_ref())?;

    if rest.is_empty() {
        Some(child)
    } else {
        find_element(child, rest)
    }
}

fn first_child<'a>(element: &'a Element, name: &str) -> Option<&'a Element> {
    element.children.iter().find_map(|node| match node {
        XMLNode::Element(child) if child.name == name => Some(child),
        _ => None,
    })
}

/// Concatenated text of `element` and all of its descendants, in document order
pub fn text_content(element: &Element) -> String {
    let mut text = String::new();
    collect_text(element, &mut text);
    text
}

fn collect_text(element: &Element, out: &mut String) {
    for node in &element.children {
        match node {
            XMLNode::Text(t) | XMLNode::CData(t) => out.push_str(t),
            XMLNode::Element(child) => collect_text(child, out),
            _ => {}
        }
    }
}
