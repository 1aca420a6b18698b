//! xmlout command line tool
//!
//! Reformats XML files through any of the library's back ends, or dumps the
//! SAX event stream a document produces.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use clap::{Parser, Subcommand, ValueEnum};
use xmlout::{
    parse_file, DomNode, DomOutputter, EventTrace, Format, LineSeparator, SaxOutputter,
    StaxStreamOutputter, TextMode, XmlOutputter,
};

/// XML output formatter
#[derive(Parser)]
#[command(name = "xmlout")]
#[command(version)]
#[command(about = "Reformat XML documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a document and write it back out
    #[command(visible_alias = "f")]
    Format {
        /// Input file
        input: String,
        /// Output file (default: stdout)
        output: Option<String>,

        #[command(flatten)]
        options: FormatOptions,

        /// Back end that produces the output
        #[arg(short, long, value_enum, default_value_t = Backend::Text)]
        backend: Backend,
    },

    /// Print the SAX events of a document, one per line
    #[command(visible_alias = "e")]
    Events {
        /// Input file
        input: String,

        #[command(flatten)]
        options: FormatOptions,
    },
}

#[derive(clap::Args)]
struct FormatOptions {
    /// Starting point for the other options
    #[arg(short, long, value_enum, default_value_t = Preset::Raw)]
    preset: Preset,

    /// Indent by this many spaces (0 disables indentation)
    #[arg(short, long)]
    indent: Option<usize>,

    /// preserve, trim, normalize or trim-full-white
    #[arg(short, long)]
    text_mode: Option<TextMode>,

    /// crnl, nl, cr, dos, unix, system, none or default
    #[arg(short, long)]
    line_separator: Option<LineSeparator>,

    /// UTF-8, UTF-16, US-ASCII or ISO-8859-1
    #[arg(long)]
    encoding: Option<String>,

    /// Leave out the XML declaration
    #[arg(long)]
    omit_declaration: bool,

    /// Leave the encoding out of the XML declaration
    #[arg(long)]
    omit_encoding: bool,

    /// Write empty elements as a start and end tag pair
    #[arg(long)]
    expand_empty: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Raw,
    Pretty,
    Compact,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Encoded text
    Text,
    /// quick-xml writer
    Stax,
    /// DOM tree, serialized without a declaration
    Dom,
}

impl FormatOptions {
    fn to_format(&self) -> Format {
        let mut format = match self.preset {
            Preset::Raw => Format::raw(),
            Preset::Pretty => Format::pretty(),
            Preset::Compact => Format::compact(),
        };
        if let Some(n) = self.indent {
            let unit = " ".repeat(n);
            format = format.with_indent((n > 0).then_some(unit.as_str()));
        }
        if let Some(mode) = self.text_mode {
            format = format.with_text_mode(mode);
        }
        if let Some(separator) = self.line_separator {
            format = format.with_line_separator(separator);
        }
        if let Some(encoding) = &self.encoding {
            format = format.with_encoding(encoding.as_str());
        }
        if self.omit_declaration {
            format = format.with_omit_declaration(true);
        }
        if self.omit_encoding {
            format = format.with_omit_encoding(true);
        }
        if self.expand_empty {
            format = format.with_expand_empty_elements(true);
        }
        format
    }
}

fn main() -> std::process::ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Format {
            input,
            output,
            options,
            backend,
        } => run_format(&input, output.as_deref(), &options.to_format(), backend),
        Commands::Events { input, options } => run_events(&input, &options.to_format()),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

/// Reformats one document.
fn run_format(
    input_path: &str,
    output_path: Option<&str>,
    format: &Format,
    backend: Backend,
) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Parsing: {}", input_path);
    let doc = parse_file(input_path)?;

    let mut output: Box<dyn Write> = match output_path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };

    log::info!("Writing with the {} back end...", backend.name());
    match backend {
        Backend::Text => {
            XmlOutputter::with_format(format.clone()).output_document(&doc, &mut output)?
        }
        Backend::Stax => {
            let bytes = StaxStreamOutputter::with_format(format.clone()).document_to_bytes(&doc)?;
            output.write_all(&bytes)?;
        }
        Backend::Dom => {
            let dom = DomOutputter::with_format(format.clone()).output_document(&doc)?;
            output.write_all(DomNode::serialize(&dom).as_bytes())?;
            if let Some(separator) = format.line_separator() {
                output.write_all(separator.as_bytes())?;
            }
        }
    }
    output.flush()?;

    log::info!("Done.");
    Ok(())
}

/// Prints the SAX events of one document.
fn run_events(input_path: &str, format: &Format) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Parsing: {}", input_path);
    let doc = parse_file(input_path)?;

    let mut sax = SaxOutputter::new(EventTrace::new()).with_format(format.clone());
    sax.output_document(&doc)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for event in sax.handler().events() {
        writeln!(out, "{}", event)?;
    }
    Ok(())
}

impl Backend {
    fn name(self) -> &'static str {
        match self {
            Backend::Text => "text",
            Backend::Stax => "StAX",
            Backend::Dom => "DOM",
        }
    }
}
