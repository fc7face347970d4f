//! Owned XML tree used for both inbound notifications and outbound commands.
//!
//! Parsing is done with [`quick_xml`] into a small owned tree so that documents
//! can be searched in any order after the bytes are gone. Lookups by tag are
//! depth-first and return the first match anywhere in the tree, which mirrors
//! how the processor's documents are usually consumed: callers ask for
//! `google-order-number` without caring where it is nested.
//!
//! # Examples
//!
//! ```
//! use google_checkout::xml::Document;
//!
//! let doc = Document::parse(br#"<order><total currency="USD">190.98</total></order>"#).unwrap();
//! let total = doc.find("total").unwrap().to_money().unwrap();
//! assert_eq!(total.amount_minor_units(), 19098);
//! ```

pub(crate) mod writer;

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use crate::{
    error::{CheckoutError, Result},
    money::{DEFAULT_CURRENCY, Money},
};

/// Node in an element's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Nested element.
    Element(Element),
    /// Unescaped character data (text or CDATA).
    Text(String),
}

/// XML element with its attributes and children, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Local tag name, without any namespace prefix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of the named attribute on this element.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    /// All attributes in document order.
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Child nodes in document order.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Concatenated text content of this element and all descendants.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// Finds the first element named `tag` in pre-order, starting with `self`.
    #[must_use]
    pub fn find(&self, tag: &str) -> Option<&Element> {
        if self.name == tag {
            return Some(self);
        }
        self.child_elements().find_map(|child| child.find(tag))
    }

    /// Interprets the text content as a decimal amount in the element's own `currency`.
    ///
    /// An element without a `currency` attribute is read as US dollars.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MalformedDocument`] if the text is not a decimal number.
    pub fn to_money(&self) -> Result<Money> {
        let currency = self.attribute("currency").unwrap_or(DEFAULT_CURRENCY);
        Money::from_decimal_str(&self.text(), currency)
    }

    /// `true` iff the text content is exactly `"true"`.
    #[must_use]
    pub fn to_boolean(&self) -> bool {
        self.text() == "true"
    }
}

/// Parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parses a complete XML document.
    ///
    /// Whitespace-only text between elements is dropped; all other text and CDATA is kept
    /// with entities resolved. Comments, processing instructions and the declaration are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MalformedDocument`] if the input is not well-formed: syntax
    /// errors, mismatched or unclosed tags, text outside the root, or zero or multiple roots.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(bytes);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                CheckoutError::MalformedDocument(format!(
                    "XML parse error at position {}: {e}",
                    reader.error_position()
                ))
            })?;

            match event {
                Event::Start(start) => {
                    ensure_single_root(root.as_ref(), &stack)?;
                    stack.push(open_element(&start)?);
                }
                Event::Empty(start) => {
                    ensure_single_root(root.as_ref(), &stack)?;
                    attach(open_element(&start)?, &mut stack, &mut root);
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        CheckoutError::MalformedDocument("unexpected closing tag".to_owned())
                    })?;
                    attach(element, &mut stack, &mut root);
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| {
                        CheckoutError::MalformedDocument(format!("invalid character data: {e}"))
                    })?;
                    push_text(&text, &mut stack)?;
                }
                Event::CData(data) => {
                    let text = String::from_utf8(data.into_inner().into_owned()).map_err(|e| {
                        CheckoutError::MalformedDocument(format!("CDATA is not UTF-8: {e}"))
                    })?;
                    push_text(&text, &mut stack)?;
                }
                Event::Eof => break,
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(CheckoutError::MalformedDocument(format!(
                "unclosed element <{}>",
                open.name
            )));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| CheckoutError::MalformedDocument("document has no root element".to_owned()))
    }

    /// Root element.
    #[must_use]
    pub const fn root(&self) -> &Element {
        &self.root
    }

    /// Finds the first element named `tag` anywhere in the document, root included.
    #[must_use]
    pub fn find(&self, tag: &str) -> Option<&Element> {
        self.root.find(tag)
    }
}

fn open_element(start: &BytesStart<'_>) -> Result<Element> {
    let name = utf8(start.local_name().as_ref())?;
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr
            .map_err(|e| CheckoutError::MalformedDocument(format!("invalid attribute: {e}")))?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr
            .unescape_value()
            .map_err(|e| CheckoutError::MalformedDocument(format!("invalid attribute value: {e}")))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element { name, attributes, children: Vec::new() })
}

fn attach(element: Element, stack: &mut [Element], root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => *root = Some(element),
    }
}

fn ensure_single_root(root: Option<&Element>, stack: &[Element]) -> Result<()> {
    if stack.is_empty()
        && let Some(existing) = root
    {
        return Err(CheckoutError::MalformedDocument(format!(
            "multiple root elements (first was <{}>)",
            existing.name
        )));
    }
    Ok(())
}

fn push_text(text: &str, stack: &mut [Element]) -> Result<()> {
    if text.trim().is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        Some(parent) => {
            // Adjacent text and CDATA belong to one logical run.
            if let Some(Node::Text(previous)) = parent.children.last_mut() {
                previous.push_str(text);
            } else {
                parent.children.push(Node::Text(text.to_owned()));
            }
            Ok(())
        }
        None => Err(CheckoutError::MalformedDocument("text outside of root element".to_owned())),
    }
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| CheckoutError::MalformedDocument(format!("name is not UTF-8: {e}")))
}
