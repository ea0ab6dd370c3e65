use eyre::eyre;
use scraper::{ElementRef, Html, Selector};

pub fn parse_selector(selector_str: &str) -> Result<Selector, eyre::Report> {
    Selector::parse(selector_str).map_err(|e| eyre!("Failed to compile selector: {e}"))
}

/// Text of an element with runs of whitespace collapsed and the ends trimmed.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

pub fn select_first<'a>(doc: &'a Html, selector_str: &str) -> Result<ElementRef<'a>, eyre::Report> {
    let selector = parse_selector(selector_str)?;

    doc.select(&selector)
        .next()
        .ok_or_else(|| eyre!("Element not found: {selector_str}"))
}

/// Like [`select_first`], scoped to the descendants of `element`.
pub fn select_first_in<'a>(
    element: ElementRef<'a>,
    selector_str: &str,
) -> Result<ElementRef<'a>, eyre::Report> {
    let selector = parse_selector(selector_str)?;

    element
        .select(&selector)
        .next()
        .ok_or_else(|| eyre!("Element not found: {selector_str}"))
}

pub fn select_first_text(doc: &Html, selector_str: &str) -> Result<String, eyre::Report> {
    Ok(element_text(select_first(doc, selector_str)?))
}

pub fn select<'a>(doc: &'a Html, selector_str: &str) -> Result<Vec<ElementRef<'a>>, eyre::Report> {
    let selector = parse_selector(selector_str)?;
    Ok(doc.select(&selector).collect())
}

pub fn select_text(doc: &Html, selector_str: &str) -> Result<Vec<String>, eyre::Report> {
    Ok(select(doc, selector_str)?
        .into_iter()
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect())
}

pub fn select_first_attr(
    doc: &Html,
    selector_str: &str,
    attr: &str,
) -> Result<String, eyre::Report> {
    let element = select_first(doc, selector_str)?;
    element
        .attr(attr)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| eyre!("attribute '{attr}' not found in element: {selector_str}"))
}

/// `None` when no element matches or the attribute is missing.
pub fn select_first_attr_opt(
    doc: &Html,
    selector_str: &str,
    attr: &str,
) -> Result<Option<String>, eyre::Report> {
    let selector = parse_selector(selector_str)?;
    Ok(doc
        .select(&selector)
        .next()
        .and_then(|element| element.attr(attr))
        .map(|s| s.trim().to_string()))
}

/// The `attr` value of every matching element that carries it.
pub fn select_attr(doc: &Html, selector_str: &str, attr: &str) -> Result<Vec<String>, eyre::Report> {
    Ok(select(doc, selector_str)?
        .into_iter()
        .filter_map(|element| element.attr(attr))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}
