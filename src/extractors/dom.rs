use crate::extractors::denylist::NoiseFilter;
use crate::extractors::text;
use scraper::{ElementRef, Node};

/// Elements whose text is never rendered
pub(crate) const NEVER_VISIBLE: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that start a new block of text
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "caption", "dd", "details", "dialog",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre", "section",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Blocks whose whole text is one fragment
const LEAF_BLOCKS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6"];

pub(crate) fn is_block(name: &str) -> bool {
    BLOCK_TAGS.contains(&name)
}

/// Visible text of an element, whitespace-normalised
pub(crate) fn visible_text(el: ElementRef<'_>, noise: &NoiseFilter) -> String {
    let mut buf = String::new();
    push_text(el, noise, false, &mut buf);
    text::normalize_segment(&buf)
}

/// Text of an element excluding anything inside nested blocks
pub(crate) fn own_text(el: ElementRef<'_>, noise: &NoiseFilter) -> String {
    let mut buf = String::new();
    push_text(el, noise, true, &mut buf);
    text::normalize_segment(&buf)
}

/// Pushes an element's child elements so they pop in document order
pub(crate) fn push_child_elements<'a>(el: ElementRef<'a>, stack: &mut Vec<ElementRef<'a>>) {
    stack.extend(el.children().rev().filter_map(ElementRef::wrap));
}

/// Deepest element nesting below `root`, counting `root` as depth 1
pub(crate) fn nesting_depth(root: ElementRef<'_>) -> usize {
    let mut deepest = 0;
    let mut stack = vec![(root, 1)];
    while let Some((el, depth)) = stack.pop() {
        deepest = deepest.max(depth);
        stack.extend(
            el.children()
                .filter_map(ElementRef::wrap)
                .map(|child| (child, depth + 1)),
        );
    }
    deepest
}

/// Pending work for the text walk
enum Piece<'a> {
    Open(ElementRef<'a>),
    Text(&'a str),
    Space,
}

fn push_children<'a>(el: ElementRef<'a>, stack: &mut Vec<Piece<'a>>) {
    for child in el.children().rev() {
        match child.value() {
            Node::Text(t) => stack.push(Piece::Text(t)),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    stack.push(Piece::Open(child_el));
                }
            }
            _ => {}
        }
    }
}

fn push_text(el: ElementRef<'_>, noise: &NoiseFilter, stop_at_blocks: bool, buf: &mut String) {
    let mut stack = Vec::new();
    push_children(el, &mut stack);

    while let Some(piece) = stack.pop() {
        let child_el = match piece {
            Piece::Text(t) => {
                buf.push_str(t);
                continue;
            }
            Piece::Space => {
                buf.push(' ');
                continue;
            }
            Piece::Open(child_el) => child_el,
        };

        let name = child_el.value().name();
        if name == "br" {
            buf.push(' ');
            continue;
        }
        if noise.is_noise(&child_el) {
            continue;
        }
        if is_block(name) {
            buf.push(' ');
            if stop_at_blocks {
                continue;
            }
            // Closes the block once its children are done
            stack.push(Piece::Space);
        }
        push_children(child_el, &mut stack);
    }
}

/// Walks a tree in document order and collects text fragments from blocks.
///
/// Paragraphs and headings contribute their whole text and are not descended
/// into. Container elements contribute only their own inline text, so nested
/// blocks are reported once, by the innermost block that holds them.
pub(crate) struct BlockScanner<'a, F> {
    noise: &'a NoiseFilter,
    containers: &'a [&'a str],
    keep: F,
}

impl<'a, F> BlockScanner<'a, F>
where
    F: Fn(&str) -> bool,
{
    pub(crate) fn new(noise: &'a NoiseFilter, containers: &'a [&'a str], keep: F) -> Self {
        Self {
            noise,
            containers,
            keep,
        }
    }

    pub(crate) fn scan(&self, root: ElementRef<'_>, out: &mut Vec<String>) {
        let mut stack = vec![root];

        while let Some(el) = stack.pop() {
            if self.noise.is_noise(&el) {
                continue;
            }

            let name = el.value().name();
            if LEAF_BLOCKS.contains(&name) {
                let text = visible_text(el, self.noise);
                if (self.keep)(&text) {
                    out.push(text);
                }
                continue;
            }

            if self.containers.contains(&name) {
                let text = own_text(el, self.noise);
                if (self.keep)(&text) {
                    out.push(text);
                }
            }

            push_child_elements(el, &mut stack);
        }
    }
}
