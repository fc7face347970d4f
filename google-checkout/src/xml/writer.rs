//! Deterministic XML serialization for outbound documents.

use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::error::{CheckoutError, Result};

/// Namespace carried on the root of every document exchanged with the processor.
pub const SCHEMA_NAMESPACE: &str = "http://checkout.google.com/schema/2";

/// Streaming builder that always starts with `<?xml version="1.0" encoding="UTF-8"?>`.
///
/// Attribute values and text are escaped. No whitespace is inserted, so the same calls
/// always produce the same bytes.
pub(crate) struct XmlBuilder {
    writer: Writer<Vec<u8>>,
}

impl XmlBuilder {
    pub(crate) fn new() -> Result<Self> {
        let mut builder = Self { writer: Writer::new(Vec::new()) };
        builder.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(builder)
    }

    /// Writes `<name attrs>`, runs `body`, then writes `</name>`.
    pub(crate) fn element<F>(&mut self, name: &str, attributes: &[(&str, &str)], body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.write(Event::Start(start_tag(name, attributes)))?;
        body(self)?;
        self.write(Event::End(BytesEnd::new(name)))
    }

    /// Writes `<name attrs>text</name>`.
    pub(crate) fn leaf(&mut self, name: &str, attributes: &[(&str, &str)], text: &str) -> Result<()> {
        self.write(Event::Start(start_tag(name, attributes)))?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.write(Event::End(BytesEnd::new(name)))
    }

    /// Writes `<name attrs/>`.
    pub(crate) fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        self.write(Event::Empty(start_tag(name, attributes)))
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| CheckoutError::MalformedDocument(format!("XML write failed: {e}")))
    }
}

fn start_tag<'a>(name: &'a str, attributes: &[(&'a str, &'a str)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for &(key, value) in attributes {
        start.push_attribute((key, value));
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(build: impl FnOnce(&mut XmlBuilder) -> Result<()>) -> String {
        let mut builder = XmlBuilder::new().unwrap();
        build(&mut builder).unwrap();
        String::from_utf8(builder.finish()).unwrap()
    }

    #[test]
    fn test_declaration_comes_first() {
        let xml = render(|b| b.empty("root", &[]));
        assert_eq!(xml, r#"<?xml version="1.0" encoding="UTF-8"?><root/>"#);
    }

    #[test]
    fn test_nested_elements_and_attribute_order() {
        let xml = render(|b| {
            b.element("outer", &[("xmlns", SCHEMA_NAMESPACE), ("id", "7")], |b| {
                b.leaf("inner", &[("currency", "USD")], "1.00")
            })
        });
        assert!(xml.ends_with(
            r#"<outer xmlns="http://checkout.google.com/schema/2" id="7"><inner currency="USD">1.00</inner></outer>"#
        ));
    }

    #[test]
    fn test_text_and_attributes_escaped() {
        let xml = render(|b| b.leaf("m", &[("q", "a\"b")], "Tom & Jerry <3"));
        assert!(xml.contains("&amp;"));
        assert!(xml.contains("&lt;3"));
        assert!(xml.contains("q=\"a&quot;b\""));
    }

    #[test]
    fn test_output_is_deterministic() {
        let build = |b: &mut XmlBuilder| b.element("a", &[], |b| b.leaf("b", &[], "x"));
        assert_eq!(render(build), render(build));
    }
}
