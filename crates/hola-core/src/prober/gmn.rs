//! GMN status page scraping.

use html_escape::decode_html_entities;

/// Path of the GMN status page, relative to the node base URL.
pub const GMN_HOME_PATH: &str = "/home";

/// First-cell label of the table row holding the GMN version.
pub const GMN_VERSION_LABEL: &str = "GMN version:";

/// URL of the GMN status page for a node.
pub fn gmn_home_url(base_url: &str) -> String {
    format!("{base_url}{GMN_HOME_PATH}")
}

/// Extract the GMN version from a `/home` status page.
///
/// The page is not valid XHTML, so it goes through the lenient `tl` parser.
/// Every `<tr>` is scanned; a row whose first `<td>` reads `GMN version:`
/// supplies the version from its second `<td>`. Tag names match in any case.
/// Cell text has HTML entities decoded and whitespace runs (including
/// `&nbsp;`) collapsed to one space before comparing. If several rows match,
/// the last one wins. Rows with fewer than two cells never match.
pub fn parse_gmn_version(html: &str) -> Option<String> {
    let dom = tl::parse(html, tl::ParserOptions::default()).ok()?;
    let parser = dom.parser();

    let mut version = None;
    for row in dom.nodes().iter().filter_map(|node| tag_named(node, "tr")) {
        let texts: Vec<String> = row
            .children()
            .all(parser)
            .iter()
            .filter(|node| tag_named(node, "td").is_some())
            .take(2)
            .map(|cell| cell_text(&cell.inner_text(parser)))
            .collect();

        if let [label, value] = texts.as_slice() {
            if label == GMN_VERSION_LABEL && !value.is_empty() {
                version = Some(value.clone());
            }
        }
    }
    version
}

fn tag_named<'a, 'b>(node: &'b tl::Node<'a>, name: &str) -> Option<&'b tl::HTMLTag<'a>> {
    node.as_tag()
        .filter(|tag| tag.name().as_utf8_str().eq_ignore_ascii_case(name))
}

fn cell_text(raw: &str) -> String {
    decode_html_entities(raw)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
