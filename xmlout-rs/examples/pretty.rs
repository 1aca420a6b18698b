//! Example: Pretty-print an XML file
//!
//! Parses a document and writes it back to stdout with two-space
//! indentation and normalized text.
//!
//! Usage: cargo run --example pretty <input.xml>

use std::env;
use std::io;
use xmlout::{parse_file, Format, LineSeparator, XmlOutputter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.xml>", args[0]);
        std::process::exit(1);
    }

    eprintln!("Parsing: {}", args[1]);
    let doc = parse_file(&args[1])?;

    let format = Format::pretty().with_line_separator(LineSeparator::System);
    let outputter = XmlOutputter::with_format(format);
    outputter.output_document(&doc, io::stdout().lock())?;

    Ok(())
}
