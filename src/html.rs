//! Queries over fetched wiki HTML pages.

use scraper::{Html, Selector};

/// Id of the MediaWiki edit box holding the page source.
pub const SOURCE_TEXTAREA_ID: &str = "wpTextbox1";

/// Literal (entity-decoded) contents of the textarea with the given id.
pub fn textarea_contents(html: &str, id: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(&format!("textarea[id=\"{}\"]", id)).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
}

/// Every `href` of every `<a>`, in document order.
pub fn links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .map(str::to_string)
        .collect()
}
