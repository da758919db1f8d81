use crate::extractors::ExtractError;
use crate::extractors::denylist::NoiseFilter;
use crate::extractors::dom::{self, BlockScanner};
use crate::extractors::text;
use dom_smoothie::Readability;
use scraper::Html;

/// Containers whose own text survives flattening of a readability fragment
const FLATTEN_CONTAINERS: &[&str] = &[
    "html", "body", "div", "li", "section", "article", "main", "td", "th", "blockquote", "pre",
    "figcaption", "dd", "dt", "address",
];

/// Bounds on the documents handed to the readability algorithm.
///
/// Its running time grows steeply with nesting depth, so oversized or
/// pathologically nested pages are refused up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_depth: usize,
    pub max_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

impl Limits {
    /// Rejects documents the readability pass should not attempt
    pub fn check(&self, html: &str) -> Result<(), ExtractError> {
        if html.len() > self.max_bytes {
            return Err(ExtractError::DocumentTooLarge {
                bytes: html.len(),
                limit: self.max_bytes,
            });
        }

        let depth = dom::nesting_depth(Html::parse_document(html).root_element());
        if depth > self.max_depth {
            return Err(ExtractError::DocumentTooDeep {
                depth,
                limit: self.max_depth,
            });
        }
        Ok(())
    }
}

/// Runs the readability algorithm and flattens the article it finds.
///
/// A document without a recognisable article yields empty text. A document
/// outside `limits` is an error.
pub fn extract(html: &str, noise: &NoiseFilter, limits: Limits) -> Result<String, ExtractError> {
    limits.check(html)?;

    let mut reader = match Readability::new(html, None, None) {
        Ok(reader) => reader,
        Err(e) => {
            ::log::debug!("Readability could not load document: {}", e);
            return Ok(String::new());
        }
    };

    match reader.parse() {
        Ok(article) => Ok(flatten(&article.content, noise)),
        Err(e) => {
            ::log::debug!("Readability found no article: {}", e);
            Ok(String::new())
        }
    }
}

/// Strips noise from an HTML fragment and turns it into plain text blocks
pub fn flatten(fragment_html: &str, noise: &NoiseFilter) -> String {
    let fragment = Html::parse_fragment(fragment_html);

    let mut blocks = Vec::new();
    let scanner = BlockScanner::new(noise, FLATTEN_CONTAINERS, |t: &str| !t.is_empty());
    scanner.scan(fragment.root_element(), &mut blocks);

    text::join_fragments(blocks, "\n\n", false)
}
