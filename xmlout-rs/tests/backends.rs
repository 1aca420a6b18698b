//! Every back end must see the same logical output as the text outputter.

use std::fs;
use std::path::Path;

use quick_xml::Writer;
use xmlout::format::{escape_attribute, escape_text, UnicodeEscape};
use xmlout::{
    parse_str, DomNode, DomOutputter, Element, Format, LineSeparator, Result, SaxAttribute,
    SaxHandler, SaxOutputter, StaxEventOutputter, StaxStreamOutputter, XmlOutputter,
};

fn load_case(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("cases")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("reading {}: {}", path.display(), e))
}

const CASES: [&str; 3] = ["mixed.xml", "namespaces.xml", "whitespace.xml"];

fn formats() -> Vec<(&'static str, Format)> {
    vec![
        ("raw", Format::raw()),
        ("compact", Format::compact()),
        ("pretty", Format::pretty()),
        ("pretty-collapsed", Format::pretty().with_expand_empty_elements(false)),
    ]
    .into_iter()
    .map(|(name, f)| (name, f.with_line_separator(LineSeparator::Nl)))
    .collect()
}

fn root_of(xml: &str) -> Element {
    parse_str(xml).unwrap().root().unwrap().clone()
}

#[test]
fn test_stax_stream_matches_text() {
    for case in CASES {
        let doc = parse_str(&load_case(case)).unwrap();
        for (name, format) in formats() {
            let text = XmlOutputter::with_format(format.clone())
                .document_to_string(&doc)
                .unwrap();
            let bytes = StaxStreamOutputter::with_format(format)
                .document_to_bytes(&doc)
                .unwrap();
            assert_eq!(String::from_utf8(bytes).unwrap(), text, "{} with {}", case, name);
        }
    }
}

#[test]
fn test_stax_events_through_writer_match_text() {
    for case in CASES {
        let root = root_of(&load_case(case));
        for (name, format) in formats() {
            let text = XmlOutputter::with_format(format.clone())
                .element_to_string(&root)
                .unwrap();
            let mut writer = Writer::new(Vec::new());
            StaxEventOutputter::with_format(format)
                .output_element(&root, &mut writer)
                .unwrap();
            assert_eq!(
                String::from_utf8(writer.into_inner()).unwrap(),
                text,
                "{} with {}",
                case,
                name
            );
        }
    }
}

#[test]
fn test_dom_serialization_matches_text() {
    // DOM serialization always collapses empty elements.
    let dom_formats = formats()
        .into_iter()
        .filter(|(_, f)| !f.expand_empty_elements());
    for (name, format) in dom_formats {
        for case in CASES {
            let root = root_of(&load_case(case));
            let text = XmlOutputter::with_format(format.clone())
                .element_to_string(&root)
                .unwrap();
            let dom = DomOutputter::with_format(format.clone())
                .output_element(&root)
                .unwrap();
            assert_eq!(DomNode::serialize(&dom), text, "{} with {}", case, name);

            DomNode::normalize(&dom);
            assert_eq!(DomNode::serialize(&dom), text, "{} with {} after normalize", case, name);
        }
    }
}

#[test]
fn test_dom_document_drops_top_level_padding() {
    let doc = parse_str(&load_case("mixed.xml")).unwrap();
    let format = Format::pretty().with_line_separator(LineSeparator::Nl);
    let dom = DomOutputter::with_format(format).output_document(&doc).unwrap();
    let dom = dom.borrow();
    assert_eq!(dom.node_name(), "#document");
    assert_eq!(dom.child_count(), 1);
    assert_eq!(dom.children()[0].borrow().node_name(), "doc");
}

/// Rebuilds XML text from SAX callbacks.
#[derive(Default)]
struct SaxToXml {
    out: String,
    in_cdata: bool,
}

impl SaxHandler for SaxToXml {
    fn start_element(
        &mut self,
        _uri: &str,
        _local_name: &str,
        qname: &str,
        attributes: &[SaxAttribute],
    ) -> Result<()> {
        self.out.push('<');
        self.out.push_str(qname);
        for attr in attributes {
            self.out.push_str(&format!(
                " {}=\"{}\"",
                attr.qname,
                escape_attribute(&UnicodeEscape, &attr.value)
            ));
        }
        self.out.push('>');
        Ok(())
    }

    fn end_element(&mut self, _uri: &str, _local_name: &str, qname: &str) -> Result<()> {
        self.out.push_str(&format!("</{}>", qname));
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        if self.in_cdata {
            self.out.push_str(text);
        } else {
            self.out.push_str(&escape_text(&UnicodeEscape, None, text));
        }
        Ok(())
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<()> {
        self.out.push_str(text);
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<()> {
        if data.is_empty() {
            self.out.push_str(&format!("<?{}?>", target));
        } else {
            self.out.push_str(&format!("<?{} {}?>", target, data));
        }
        Ok(())
    }

    fn skipped_entity(&mut self, name: &str) -> Result<()> {
        self.out.push_str(&format!("&{};", name));
        Ok(())
    }

    fn start_cdata(&mut self) -> Result<()> {
        self.in_cdata = true;
        self.out.push_str("<![CDATA[");
        Ok(())
    }

    fn end_cdata(&mut self) -> Result<()> {
        self.in_cdata = false;
        self.out.push_str("]]>");
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<()> {
        self.out.push_str(&format!("<!--{}-->", text));
        Ok(())
    }
}

#[test]
fn test_sax_events_rebuild_text_output() {
    // SAX has no empty-element event, so compare against expanded output.
    let sax_formats = formats()
        .into_iter()
        .map(|(name, f)| (name, f.with_expand_empty_elements(true)));
    for (name, format) in sax_formats {
        for case in CASES {
            let root = root_of(&load_case(case));
            let text = XmlOutputter::with_format(format.clone())
                .element_to_string(&root)
                .unwrap();
            let mut sax = SaxOutputter::new(SaxToXml::default())
                .with_format(format.clone())
                .with_namespace_declarations(true);
            sax.output_element(&root).unwrap();
            assert_eq!(sax.into_handler().out, text, "{} with {}", case, name);
        }
    }
}
