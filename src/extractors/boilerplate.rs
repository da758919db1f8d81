//! Shallow-text boilerplate classifier.
//!
//! The document is cut into text blocks at block-level element boundaries.
//! Each block is described by its word count and link density, and a small
//! decision tree over the current block and its neighbours decides whether it
//! is content. Navigation menus (dense links) and isolated short snippets
//! fall out; runs of prose survive.

use crate::extractors::dom::{self, NEVER_VISIBLE};
use crate::extractors::text;
use scraper::{ElementRef, Html, Node};

/// A run of text between two block boundaries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub words: usize,
    pub linked_words: usize,
}

impl TextBlock {
    /// Share of the block's words that sit inside links
    pub fn link_density(&self) -> f64 {
        if self.words == 0 {
            0.0
        } else {
            self.linked_words as f64 / self.words as f64
        }
    }
}

/// Keeps the blocks classified as content, one per line
pub fn extract(html: &str) -> String {
    let blocks = segment(html);
    let labels = classify(&blocks);

    let kept: Vec<String> = blocks
        .into_iter()
        .zip(labels)
        .filter_map(|(block, is_content)| is_content.then_some(block.text))
        .collect();

    ::log::trace!("Boilerplate classifier kept {} blocks", kept.len());
    kept.join("\n")
}

/// Splits a document into text blocks in document order
pub fn segment(html: &str) -> Vec<TextBlock> {
    let doc = Html::parse_document(html);
    let mut segmenter = Segmenter::default();
    segmenter.walk(doc.root_element());
    segmenter.blocks
}

/// Labels each block as content (`true`) or boilerplate.
///
/// Neighbours past either end of the document count as empty blocks.
pub fn classify(blocks: &[TextBlock]) -> Vec<bool> {
    let edge = TextBlock::default();
    (0..blocks.len())
        .map(|i| {
            let prev = if i == 0 { &edge } else { &blocks[i - 1] };
            let next = blocks.get(i + 1).unwrap_or(&edge);
            is_content(prev, &blocks[i], next)
        })
        .collect()
}

fn is_content(prev: &TextBlock, curr: &TextBlock, next: &TextBlock) -> bool {
    if curr.link_density() > 0.333_333 {
        return false;
    }

    if prev.link_density() <= 0.555_556 {
        if curr.words <= 16 {
            if next.words <= 15 {
                prev.words > 4
            } else {
                true
            }
        } else {
            true
        }
    } else if curr.words <= 40 {
        next.words > 17
    } else {
        true
    }
}

#[derive(Default)]
struct Segmenter {
    blocks: Vec<TextBlock>,
    current: String,
    linked_words: usize,
}

/// Pending work for the segmenter; the flag marks text inside a link
enum Step<'a> {
    Open(ElementRef<'a>, bool),
    Text(&'a str, bool),
    Flush,
}

fn push_children<'a>(el: ElementRef<'a>, in_link: bool, stack: &mut Vec<Step<'a>>) {
    for child in el.children().rev() {
        match child.value() {
            Node::Text(t) => stack.push(Step::Text(t, in_link)),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    stack.push(Step::Open(child_el, in_link));
                }
            }
            _ => {}
        }
    }
}

impl Segmenter {
    fn walk(&mut self, root: ElementRef<'_>) {
        let mut stack = Vec::new();
        push_children(root, false, &mut stack);

        while let Some(step) = stack.pop() {
            let (el, in_link) = match step {
                Step::Text(t, in_link) => {
                    self.push_text(t, in_link);
                    continue;
                }
                Step::Flush => {
                    self.flush();
                    continue;
                }
                Step::Open(el, in_link) => (el, in_link),
            };

            let name = el.value().name();
            if name == "head" || NEVER_VISIBLE.contains(&name) {
                continue;
            }
            if name == "br" {
                self.current.push(' ');
                continue;
            }
            if dom::is_block(name) {
                self.flush();
                stack.push(Step::Flush);
            }
            push_children(el, in_link || name == "a", &mut stack);
        }
        self.flush();
    }

    fn push_text(&mut self, fragment: &str, in_link: bool) {
        self.current.push_str(fragment);
        if in_link {
            self.linked_words += text::count_words(fragment);
        }
    }

    fn flush(&mut self) {
        let block_text = text::normalize_segment(&self.current);
        if !block_text.is_empty() {
            let words = text::count_words(&block_text);
            self.blocks.push(TextBlock {
                text: block_text,
                words,
                linked_words: self.linked_words.min(words),
            });
        }
        self.current.clear();
        self.linked_words = 0;
    }
}
