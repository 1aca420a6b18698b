//! Constants used throughout xmlout.

/// URI bound to the reserved `xml` prefix.
pub const XML_NAMESPACE_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// URI of namespace declaration attributes (`xmlns`, `xmlns:p`).
pub const XMLNS_NAMESPACE_URI: &str = "http://www.w3.org/2000/xmlns/";

/// PI target that switches output escaping off for the enclosing level.
pub const PI_DISABLE_OUTPUT_ESCAPING: &str = "javax.xml.transform.disable-output-escaping";

/// PI target that switches output escaping back on for the enclosing level.
pub const PI_ENABLE_OUTPUT_ESCAPING: &str = "javax.xml.transform.enable-output-escaping";

/// Indent unit used by the pretty preset.
pub const STANDARD_INDENT: &str = "  ";

/// Encoding written when none is configured.
pub const STANDARD_ENCODING: &str = "UTF-8";

/// Initial depth capacity of a format stack.
pub const FORMAT_STACK_CAPACITY: usize = 16;
