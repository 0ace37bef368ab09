//! Per-part header accumulation and interpretation.
//!
//! Only two headers are interpreted: `Content-Disposition` (field name and
//! optional filename) and `Content-Type`. Any other header line is kept in
//! the accumulator but never surfaced on the resulting part.
//!
//! Header names are matched case-insensitively by prefix:
//!
//! ```text
//! content-disposition: form-data; name="upload"; filename="a;b.txt"
//! ^^^^^^^^^^^^^^^^^^^^ prefix     ^^^^^^^^^^^^^  ^^^^^^^^^^^^^^^^^^^
//!                                 parameter      quoted parameter
//! ```

use formstream_core::constants::{CONTENT_DISPOSITION, CONTENT_TYPE};

/// Name and optional filename parsed from a `Content-Disposition` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    pub name: String,
    pub filename: Option<String>,
}

impl ContentDisposition {
    /// Parse the value that follows `Content-Disposition:`.
    ///
    /// Returns `None` when no `name` parameter is present.
    ///
    /// # Example
    ///
    /// ```
    /// use formstream_protocol::ContentDisposition;
    ///
    /// let cd = ContentDisposition::parse(r#" form-data; name="avatar"; filename="me.png""#).unwrap();
    /// assert_eq!(cd.name, "avatar");
    /// assert_eq!(cd.filename.as_deref(), Some("me.png"));
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        let params = parameters(value);

        let name = param(&params, "name")?;
        let filename = param(&params, "filename");

        Some(Self { name, filename })
    }
}

/// Raw header lines accumulated for the part being parsed.
#[derive(Debug, Default, Clone)]
pub struct PartHeaders {
    lines: Vec<String>,
}

impl PartHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one header line (without its CRLF). Invalid UTF-8 is replaced.
    pub fn push_line(&mut self, raw: &[u8]) {
        self.lines.push(String::from_utf8_lossy(raw).into_owned());
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Value of the first line whose name matches `prefix` (which includes
    /// the trailing colon), compared ASCII case-insensitively.
    pub fn find(&self, prefix: &str) -> Option<&str> {
        self.lines().find_map(|line| strip_prefix_ignore_case(line, prefix))
    }

    /// Parsed `Content-Disposition`, if present and carrying a name.
    pub fn content_disposition(&self) -> Option<ContentDisposition> {
        self.find(CONTENT_DISPOSITION)
            .and_then(ContentDisposition::parse)
    }

    /// Trimmed `Content-Type` value, if present and non-empty.
    pub fn content_type(&self) -> Option<String> {
        self.find(CONTENT_TYPE)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        line.get(prefix.len()..)
    } else {
        None
    }
}

fn param(params: &[(String, String)], key: &str) -> Option<String> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

/// Split a header value into lowercase-keyed `key=value` parameters.
///
/// The leading token (the disposition or media type) is skipped. Semicolons
/// inside quoted strings do not split. Quoted values are taken literally up
/// to the next `"`; backslashes are ordinary characters, as browsers send them.
pub(crate) fn parameters(value: &str) -> Vec<(String, String)> {
    split_unquoted(value)
        .into_iter()
        .skip(1)
        .filter_map(|segment| {
            let (key, raw) = segment.split_once('=')?;
            let key = key.trim().to_ascii_lowercase();
            if key.is_empty() {
                return None;
            }
            Some((key, unquote(raw.trim())))
        })
        .collect()
}

fn split_unquoted(value: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;

    for (i, c) in value.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                segments.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&value[start..]);
    segments
}

fn unquote(raw: &str) -> String {
    match raw.strip_prefix('"') {
        Some(inner) => inner.split_once('"').map_or(inner, |(value, _)| value).to_string(),
        None => raw.to_string(),
    }
}
