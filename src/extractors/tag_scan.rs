use crate::extractors::denylist::NoiseFilter;
use crate::extractors::dom;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static PARAGRAPHS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("static selector"));

static PARAGRAPHS_AND_HEADINGS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, p, li").expect("static selector")
});

/// Collects the text of every paragraph, one per line.
///
/// With `include_headings`, headings and list items are collected too, in
/// document order. A matched element is reported whole, so an element nested
/// inside another match (a list inside a list item) is not repeated.
pub fn extract(html: &str, include_headings: bool) -> String {
    let doc = Html::parse_document(html);
    let noise = NoiseFilter::never_visible();
    let selector = if include_headings {
        &*PARAGRAPHS_AND_HEADINGS
    } else {
        &*PARAGRAPHS
    };

    let mut lines = Vec::new();
    let mut stack = vec![doc.root_element()];
    while let Some(el) = stack.pop() {
        if noise.is_noise(&el) {
            continue;
        }
        if selector.matches(&el) {
            let text = dom::visible_text(el, &noise);
            if !text.is_empty() {
                lines.push(text);
            }
            continue;
        }
        dom::push_child_elements(el, &mut stack);
    }

    lines.join("\n")
}
