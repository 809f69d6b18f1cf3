//! Metacat version endpoint.

use crate::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Path segment that marks a Metacat-fronted member node base URL.
pub const MEMBER_NODE_SEGMENT: &str = "/d1/mn";

/// Version action, appended to the stripped base URL.
pub const METACAT_VERSION_PATH: &str = "/metacat?action=getversion";

/// How [`MEMBER_NODE_SEGMENT`] is removed from a base URL.
///
/// The two modes agree on the common `https://host/context/d1/mn` shape and
/// differ when the context path ends in one of the segment's characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StripMode {
    /// Remove the first occurrence of the exact substring `/d1/mn`.
    #[default]
    Exact,
    /// Trim every leading and trailing character found in `/d1/mn`.
    ///
    /// `https://host/metacatd/d1/mn` becomes `https://host/metacat`.
    Charset,
}

impl StripMode {
    /// Config and CLI spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Charset => "charset",
        }
    }
}

impl fmt::Display for StripMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StripMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "charset" => Ok(Self::Charset),
            _ => Err(Error::Config(format!(
                "Invalid strip mode: {s} (expected exact or charset)"
            ))),
        }
    }
}

/// Remove the member node segment from `base_url`.
pub fn strip_member_node_segment(base_url: &str, mode: StripMode) -> String {
    match mode {
        StripMode::Exact => base_url
            .replacen(MEMBER_NODE_SEGMENT, "", 1)
            .trim_end_matches('/')
            .to_string(),
        StripMode::Charset => base_url
            .trim_matches(|c| MEMBER_NODE_SEGMENT.contains(c))
            .to_string(),
    }
}

/// Metacat version URL for a node, or `None` if the base URL does not look
/// Metacat-fronted.
pub fn metacat_version_url(base_url: &str, mode: StripMode) -> Option<String> {
    base_url.contains(MEMBER_NODE_SEGMENT).then(|| {
        format!(
            "{}{METACAT_VERSION_PATH}",
            strip_member_node_segment(base_url, mode)
        )
    })
}

/// Read the version from a Metacat `getversion` response.
///
/// The response is strict XML such as `<version>2.19.0</version>`; the
/// version is the root element's own text, before any child element.
/// `Ok(None)` when that text is empty.
///
/// # Errors
///
/// [`Error::Parse`] when the body is not well-formed XML or has no root element.
pub fn parse_metacat_version(xml: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut saw_root = false;
    let mut root_text = String::new();
    let mut root_text_done = false;

    loop {
        match reader.read_event()? {
            Event::Start(_) => {
                if depth == 0 && saw_root {
                    return Err(Error::Parse("multiple root elements".into()));
                }
                if depth == 1 {
                    root_text_done = true;
                }
                saw_root = true;
                depth += 1;
            },
            Event::Empty(_) => {
                if depth == 0 && saw_root {
                    return Err(Error::Parse("multiple root elements".into()));
                }
                if depth == 1 {
                    root_text_done = true;
                }
                saw_root = true;
            },
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|e| Error::Parse(format!("Invalid text: {e}")))?;
                if depth == 0 {
                    if !text.trim().is_empty() {
                        return Err(Error::Parse("text outside of the root element".into()));
                    }
                } else if depth == 1 && !root_text_done {
                    root_text.push_str(&text);
                }
            },
            Event::CData(e) => {
                if depth == 1 && !root_text_done {
                    root_text.push_str(&String::from_utf8_lossy(&e));
                }
            },
            Event::End(_) => {
                depth = depth.saturating_sub(1);
            },
            Event::Eof => break,
            _ => {},
        }
    }

    if !saw_root {
        return Err(Error::Parse("document has no root element".into()));
    }
    if depth != 0 {
        return Err(Error::Parse("unexpected end of document".into()));
    }

    let version = root_text.trim();
    Ok((!version.is_empty()).then(|| version.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_modes_agree_on_common_urls() {
        for (base, expected) in [
            (
                "https://knb.ecoinformatics.org/knb/d1/mn",
                "https://knb.ecoinformatics.org/knb",
            ),
            ("https://arcticdata.io/metacat/d1/mn", "https://arcticdata.io/metacat"),
            ("https://mn.example.org/d1/mn", "https://mn.example.org"),
        ] {
            assert_eq!(strip_member_node_segment(base, StripMode::Exact), expected);
            assert_eq!(strip_member_node_segment(base, StripMode::Charset), expected);
        }
    }

    #[test]
    fn test_strip_modes_differ_when_context_ends_in_segment_chars() {
        let base = "https://data.example.org/metacatd/d1/mn";
        assert_eq!(
            strip_member_node_segment(base, StripMode::Exact),
            "https://data.example.org/metacatd"
        );
        assert_eq!(
            strip_member_node_segment(base, StripMode::Charset),
            "https://data.example.org/metacat"
        );

        let base = "https://data.example.org/edmn/d1/mn";
        assert_eq!(
            strip_member_node_segment(base, StripMode::Exact),
            "https://data.example.org/edmn"
        );
        assert_eq!(
            strip_member_node_segment(base, StripMode::Charset),
            "https://data.example.org/e"
        );
    }

    #[test]
    fn test_exact_strip_handles_trailing_slash_and_inner_segment() {
        assert_eq!(
            strip_member_node_segment("https://x.org/knb/d1/mn/", StripMode::Exact),
            "https://x.org/knb"
        );
        assert_eq!(
            strip_member_node_segment("https://x.org/knb/d1/mn/v2", StripMode::Exact),
            "https://x.org/knb/v2"
        );
    }

    #[test]
    fn test_metacat_version_url_requires_segment() {
        assert_eq!(
            metacat_version_url("https://x.org/knb/d1/mn", StripMode::Exact),
            Some("https://x.org/knb/metacat?action=getversion".to_string())
        );
        assert_eq!(
            metacat_version_url("https://gmn.example.org/mn", StripMode::Exact),
            None
        );
    }

    #[test]
    fn test_strip_mode_parsing() {
        assert_eq!("exact".parse::<StripMode>().unwrap(), StripMode::Exact);
        assert_eq!("Charset".parse::<StripMode>().unwrap(), StripMode::Charset);
        assert!("substring".parse::<StripMode>().is_err());
        assert_eq!(StripMode::Charset.to_string(), "charset");
    }

    #[test]
    fn test_parse_version_document() {
        assert_eq!(
            parse_metacat_version("<version>2.1.0</version>").unwrap(),
            Some("2.1.0".to_string())
        );
        assert_eq!(
            parse_metacat_version(
                "<?xml version=\"1.0\"?>\n<version>\n  2.19.0\n</version>\n"
            )
            .unwrap(),
            Some("2.19.0".to_string())
        );
    }

    #[test]
    fn test_parse_version_uses_text_before_first_child() {
        assert_eq!(
            parse_metacat_version("<version>3.0.0<build>42</build>tail</version>").unwrap(),
            Some("3.0.0".to_string())
        );
    }

    #[test]
    fn test_parse_version_empty_root() {
        assert_eq!(parse_metacat_version("<version/>").unwrap(), None);
        assert_eq!(parse_metacat_version("<version>  </version>").unwrap(), None);
    }

    #[test]
    fn test_parse_version_rejects_malformed() {
        for xml in [
            "",
            "2.1.0",
            "<version>2.1.0",
            "<version>2.1.0</release>",
            "<html><body>Error</body></html><html/>",
        ] {
            assert!(
                matches!(parse_metacat_version(xml), Err(Error::Parse(_))),
                "expected parse error for {xml:?}"
            );
        }
    }
}
