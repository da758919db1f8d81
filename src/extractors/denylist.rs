//! Denylist-filtered scan.
//!
//! Structural noise (navigation, headers, footers, scripts) and storefront
//! widgets matched by class/id selectors are skipped as whole subtrees. What
//! remains is scanned for headings, paragraphs, divs and list items long
//! enough to be prose rather than UI labels.

use crate::extractors::ExtractError;
use crate::extractors::dom::{BlockScanner, NEVER_VISIBLE};
use crate::extractors::text;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

/// Tags removed before scanning, in the order they are listed in config
pub const DEFAULT_TAGS: &[&str] = &[
    "nav", "header", "footer", "script", "style", "noscript", "aside", "form",
];

/// Class/id selectors used by common storefront templates for non-content regions
pub const DEFAULT_SELECTORS: &[&str] = &[
    ".product-grid",
    ".product-list",
    ".product-item",
    ".product-card",
    ".product-tile",
    ".products",
    "#product-grid",
    ".collection-grid",
    ".breadcrumb",
    ".breadcrumbs",
    ".pagination",
    ".filters",
    ".facets",
    ".sort-by",
    ".newsletter",
    ".cookie-banner",
    "#cookie-banner",
    ".site-header",
    ".site-footer",
    "[role=navigation]",
];

/// Containers whose own text may be reported by the filtered scan
const CONTENT_CONTAINERS: &[&str] = &["div", "li"];

/// Tags and selectors that mark non-content regions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denylist {
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,

    #[serde(default = "default_selectors")]
    pub selectors: Vec<String>,
}

fn default_tags() -> Vec<String> {
    DEFAULT_TAGS.iter().map(|t| t.to_string()).collect()
}

fn default_selectors() -> Vec<String> {
    DEFAULT_SELECTORS.iter().map(|s| s.to_string()).collect()
}

impl Default for Denylist {
    fn default() -> Self {
        Self {
            tags: default_tags(),
            selectors: default_selectors(),
        }
    }
}

/// Compiled form of a [`Denylist`].
///
/// Text that is never rendered (scripts, styles, templates) is always noise,
/// whatever the configured tags.
#[derive(Debug)]
pub struct NoiseFilter {
    tags: Vec<String>,
    selectors: Vec<Selector>,
}

impl NoiseFilter {
    pub fn from_denylist(denylist: &Denylist) -> Result<Self, ExtractError> {
        let mut selectors = Vec::with_capacity(denylist.selectors.len());
        for css in &denylist.selectors {
            let selector = Selector::parse(css).map_err(|e| ExtractError::InvalidSelector {
                selector: css.clone(),
                message: e.to_string(),
            })?;
            selectors.push(selector);
        }

        Ok(Self {
            tags: denylist.tags.iter().map(|t| t.to_ascii_lowercase()).collect(),
            selectors,
        })
    }

    /// A filter that only drops never-rendered elements
    pub fn never_visible() -> Self {
        Self::tags_only(&[])
    }

    pub fn tags_only(tags: &[&str]) -> Self {
        Self {
            tags: tags.iter().map(|t| t.to_ascii_lowercase()).collect(),
            selectors: Vec::new(),
        }
    }

    pub fn is_noise(&self, el: &ElementRef<'_>) -> bool {
        let name = el.value().name();
        NEVER_VISIBLE.contains(&name)
            || self.tags.iter().any(|t| t == name)
            || self.selectors.iter().any(|s| s.matches(el))
    }
}

/// Minimum size for a fragment to count as content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub min_tokens: usize,
    pub min_chars: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_tokens: 5,
            min_chars: 30,
        }
    }
}

impl Thresholds {
    /// A fragment passes with enough tokens or enough characters
    pub fn accepts(&self, fragment: &str) -> bool {
        if fragment.is_empty() {
            return false;
        }
        text::count_words(fragment) >= self.min_tokens
            || fragment.chars().count() >= self.min_chars
    }
}

/// Runs the filtered scan and joins surviving fragments with blank lines
pub fn extract(html: &str, noise: &NoiseFilter, thresholds: Thresholds) -> String {
    let doc = Html::parse_document(html);

    let mut fragments = Vec::new();
    let scanner = BlockScanner::new(noise, CONTENT_CONTAINERS, |t: &str| thresholds.accepts(t));
    scanner.scan(doc.root_element(), &mut fragments);

    ::log::trace!("Denylist scan kept {} fragments", fragments.len());
    text::join_fragments(fragments, "\n\n", true)
}
