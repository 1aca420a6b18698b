//! XML whitespace predicates and trimming.
//!
//! XML whitespace is exactly space, tab, carriage return and line feed;
//! `char::is_whitespace` would also swallow NBSP and friends.

/// Returns true for the four XML whitespace characters.
pub fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// True when `s` is empty or made only of XML whitespace.
pub fn is_all_whitespace(s: &str) -> bool {
    s.chars().all(is_xml_whitespace)
}

pub fn starts_with_whitespace(s: &str) -> bool {
    s.chars().next().is_some_and(is_xml_whitespace)
}

pub fn ends_with_whitespace(s: &str) -> bool {
    s.chars().next_back().is_some_and(is_xml_whitespace)
}

/// Strips leading whitespace.
pub fn trim_left(s: &str) -> &str {
    s.trim_start_matches(is_xml_whitespace)
}

/// Strips trailing whitespace.
pub fn trim_right(s: &str) -> &str {
    s.trim_end_matches(is_xml_whitespace)
}

/// Strips whitespace from both ends.
pub fn trim_both(s: &str) -> &str {
    s.trim_matches(is_xml_whitespace)
}

/// Strips both ends and collapses each interior whitespace run to a single
/// space.
pub fn compact(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split(is_xml_whitespace).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
