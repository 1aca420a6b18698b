//! Error types for xmlout.

use thiserror::Error;

/// Result type alias for xmlout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or outputting documents.
#[derive(Error, Debug)]
pub enum Error {
    /// XML parsing error.
    #[error("XML parse error: {0}")]
    Parse(String),

    /// The data being written cannot be represented, e.g. a broken
    /// surrogate pair or a character the output encoding lacks.
    #[error("Illegal data: {0}")]
    Data(String),

    /// A SAX handler or event consumer refused an event.
    #[error("Handler error: {0}")]
    Handler(String),

    /// Dispatch reached a state that the content model rules out.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A sink failure, annotated with what was being output.
    #[error("{context}: {source}")]
    Output {
        /// What the outputter was doing.
        context: &'static str,
        /// The underlying sink failure.
        #[source]
        source: Box<Error>,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML error from quick-xml.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl Error {
    /// Creates a handler error from anything printable.
    pub fn handler(msg: impl Into<String>) -> Self {
        Error::Handler(msg.into())
    }

    /// Wraps sink failures with output context. Data and internal errors
    /// describe the input itself and pass through untouched.
    pub fn in_context(self, context: &'static str) -> Self {
        match self {
            Error::Io(_) | Error::Xml(_) | Error::Handler(_) => Error::Output {
                context,
                source: Box::new(self),
            },
            other => other,
        }
    }

    /// Returns true if this error came from the output destination.
    pub fn is_sink_error(&self) -> bool {
        match self {
            Error::Io(_) | Error::Xml(_) | Error::Handler(_) => true,
            Error::Output { source, .. } => source.is_sink_error(),
            _ => false,
        }
    }
}
