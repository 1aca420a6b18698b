//! XML text input and output.
//!
//! [`DocumentBuilder`] reads XML into the document model; [`XmlOutputter`]
//! writes it back out through [`XmlPrinter`].

mod outputter;
mod parser;
mod printer;

pub use outputter::XmlOutputter;
pub use parser::{parse_file, parse_str, DocumentBuilder};
pub use printer::XmlPrinter;
