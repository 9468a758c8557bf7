//! Selector extraction — resolve one field's selector against a document.

use crate::document::Document;
use crate::error::Error;
use scraper::Selector;

/// Literal selector meaning "the document's own address".
pub const URL_SENTINEL: &str = "document.url";

/// What a selector collects from its matched elements.
enum Target<'a> {
    Text,
    Attr(&'a str),
}

/// Resolve a selector expression to raw string values, in document order.
///
/// The [`URL_SENTINEL`] returns the document address as a single value. A
/// trailing `::text` collects element text (also the default); a trailing
/// `::attr(name)` collects the named attribute. An empty result is a valid
/// outcome; a malformed selector is an error the caller recovers from.
pub fn extract(doc: &Document, selector: &str) -> Result<Vec<String>, Error> {
    let selector = selector.trim();
    if selector == URL_SENTINEL {
        return Ok(vec![doc.url().to_string()]);
    }

    let (css, target) = split_target(selector);
    let parsed = Selector::parse(css).map_err(|e| Error::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })?;

    let values = doc
        .html()
        .select(&parsed)
        .filter_map(|el| match target {
            Target::Text => Some(el.text().collect::<String>()),
            Target::Attr(name) => el.value().attr(name).map(String::from),
        })
        .collect();

    Ok(values)
}

/// Split a selector expression into the CSS part and its collection target.
fn split_target(selector: &str) -> (&str, Target<'_>) {
    if let Some(css) = selector.strip_suffix("::text") {
        return (css, Target::Text);
    }
    if let Some(idx) = selector.rfind("::attr(") {
        let rest = &selector[idx + "::attr(".len()..];
        if let Some(name) = rest.strip_suffix(')') {
            return (&selector[..idx], Target::Attr(name));
        }
    }
    (selector, Target::Text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
            <h1 class="title">  Staff Directory </h1>
            <div class="person"><span class="name">Ada Lovelace</span></div>
            <div class="person"><span class="name">Alan Turing</span></div>
            <a class="profile" href="/people/ada">profile</a>
        </body></html>
    "#;

    fn doc() -> Document {
        Document::new("https://example.edu/people", PAGE, 0.1, 0)
    }

    #[test]
    fn test_url_sentinel() {
        let values = extract(&doc(), URL_SENTINEL).unwrap();
        assert_eq!(values, vec!["https://example.edu/people".to_string()]);
    }

    #[test]
    fn test_text_extraction_in_document_order() {
        let values = extract(&doc(), ".person .name::text").unwrap();
        assert_eq!(values, vec!["Ada Lovelace", "Alan Turing"]);
    }

    #[test]
    fn test_default_target_is_text() {
        let values = extract(&doc(), "h1.title").unwrap();
        assert_eq!(values, vec!["  Staff Directory "]);
    }

    #[test]
    fn test_attr_extraction() {
        let values = extract(&doc(), "a.profile::attr(href)").unwrap();
        assert_eq!(values, vec!["/people/ada"]);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let values = extract(&doc(), ".missing::text").unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_malformed_selector_is_error() {
        assert!(extract(&doc(), ":::!bad").is_err());
    }
}
