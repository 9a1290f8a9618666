//! Split captured HTML into ordered content blocks.
//!
//! Each top-level block element is one block, a run of top-level inline
//! content is one block, and every `li` of a list is its own block. Blocks
//! holding media are descended into so images keep their place between the
//! surrounding text.

#[cfg(test)]
#[path = "html_test.rs"]
mod html_test;

use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::TendrilSink;
use html5ever::{Attribute, ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

use crate::bounds::is_meaningful_text;
use crate::capture::media::first_srcset_candidate;
use crate::style::extract_url;

/// Content found in a fragment, before any download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Text(String),
    /// Image URL as written in the markup; may be relative or `data:`.
    Image(String),
    /// Serialized inline `<svg>` element.
    Svg(String),
    /// `src` of a `<video>` or `<iframe>`.
    Media(String),
}

const INLINE: [&str; 26] = [
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "font", "i", "kbd", "label", "mark", "q", "s",
    "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var",
];

const SKIPPED: [&str; 7] = ["script", "style", "noscript", "template", "head", "title", "link"];

const MEDIA: [&str; 5] = ["img", "picture", "svg", "video", "iframe"];

/// Blocks of every fragment, in order.
#[must_use]
pub fn blocks(fragments: &[String]) -> Vec<Block> {
    fragments.iter().flat_map(|f| fragment_blocks(f)).collect()
}

#[must_use]
pub fn fragment_blocks(html: &str) -> Vec<Block> {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
    let Some(body) = find_element(&dom.document, "body") else {
        return Vec::new();
    };
    let mut collector = Collector::default();
    collector.children(&body);
    collector.flush();
    collector.blocks
}

#[derive(Default)]
struct Collector {
    blocks: Vec<Block>,
    inline: String,
}

impl Collector {
    fn flush(&mut self) {
        let text = normalize(&self.inline);
        self.inline.clear();
        self.push_text(text);
    }

    fn push_text(&mut self, text: String) {
        if is_meaningful_text(&text) {
            self.blocks.push(Block::Text(text));
        }
    }

    fn children(&mut self, node: &Handle) {
        for child in node.children.borrow().iter() {
            self.top_level(child);
        }
    }

    fn top_level(&mut self, node: &Handle) {
        match &node.data {
            NodeData::Text { contents } => self.inline.push_str(&contents.borrow()),
            NodeData::Element { name, attrs, .. } => {
                let tag = &*name.local;
                if tag == "br" {
                    self.inline.push('\n');
                    return;
                }
                if SKIPPED.contains(&tag) {
                    return;
                }
                if INLINE.contains(&tag) && !has_media(node) {
                    append_text(node, &mut self.inline);
                    return;
                }
                self.flush();
                self.block(node, tag, &attrs.borrow());
            }
            _ => {}
        }
    }

    fn block(&mut self, node: &Handle, tag: &str, attrs: &[Attribute]) {
        match tag {
            "img" => {
                if let Some(src) = image_source(attrs) {
                    self.blocks.push(Block::Image(src));
                }
            }
            "picture" => {
                if let Some(src) = picture_source(node) {
                    self.blocks.push(Block::Image(src));
                }
            }
            "svg" => match serialize_node(node) {
                Some(markup) => self.blocks.push(Block::Svg(markup)),
                None => tracing::warn!("inline svg could not be serialized"),
            },
            "video" | "iframe" => {
                if let Some(src) = media_source(node, attrs) {
                    self.blocks.push(Block::Media(src));
                }
            }
            "ul" | "ol" => {
                for li in node.children.borrow().iter().filter(|c| element_name(c).as_deref() == Some("li")) {
                    self.container(li);
                }
            }
            _ => {
                if let Some(url) = background_url(attrs) {
                    self.blocks.push(Block::Image(url));
                }
                self.container(node);
            }
        }
    }

    /// A block whose text is one item, unless media inside it needs its own
    /// items.
    fn container(&mut self, node: &Handle) {
        if has_media(node) {
            self.children(node);
            self.flush();
        } else {
            let mut raw = String::new();
            append_text(node, &mut raw);
            self.push_text(normalize(&raw));
        }
    }
}

fn element_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

fn attr(attrs: &[Attribute], name: &str) -> Option<String> {
    attrs
        .iter()
        .find(|a| &*a.name.local == name)
        .map(|a| a.value.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
    if element_name(node).as_deref() == Some(tag) {
        return Some(node.clone());
    }
    node.children.borrow().iter().find_map(|c| find_element(c, tag))
}

/// Whether `node` or a descendant is media or paints a background image.
fn has_media(node: &Handle) -> bool {
    match &node.data {
        NodeData::Element { name, attrs, .. } => {
            if MEDIA.contains(&&*name.local) || background_url(&attrs.borrow()).is_some() {
                return true;
            }
        }
        NodeData::Document => {}
        _ => return false,
    }
    node.children.borrow().iter().any(has_media)
}

/// Text of a subtree with line breaks at `br` and block boundaries.
fn append_text(node: &Handle, out: &mut String) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { name, .. } => {
            let tag = &*name.local;
            if SKIPPED.contains(&tag) {
                return;
            }
            if tag == "br" {
                out.push('\n');
                return;
            }
            let is_block = !INLINE.contains(&tag);
            if is_block {
                out.push('\n');
            }
            for child in node.children.borrow().iter() {
                append_text(child, out);
            }
            if is_block {
                out.push('\n');
            }
        }
        _ => {}
    }
}

/// Collapse whitespace within lines and drop blank lines.
fn normalize(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `src` wins over `srcset`.
fn image_source(attrs: &[Attribute]) -> Option<String> {
    attr(attrs, "src").or_else(|| attr(attrs, "srcset").and_then(|s| first_srcset_candidate(&s).map(str::to_string)))
}

fn picture_source(node: &Handle) -> Option<String> {
    let children = node.children.borrow();
    let element_attrs = |tag: &str| -> Vec<Vec<Attribute>> {
        children
            .iter()
            .filter_map(|c| match &c.data {
                NodeData::Element { name, attrs, .. } if &*name.local == tag => Some(attrs.borrow().clone()),
                _ => None,
            })
            .collect()
    };
    element_attrs("img")
        .iter()
        .find_map(|a| image_source(a))
        .or_else(|| element_attrs("source").iter().find_map(|a| image_source(a)))
}

/// `src`, else the first `<source src>` child.
fn media_source(node: &Handle, attrs: &[Attribute]) -> Option<String> {
    attr(attrs, "src").or_else(|| {
        node.children.borrow().iter().find_map(|c| match &c.data {
            NodeData::Element { name, attrs, .. } if &*name.local == "source" => attr(&attrs.borrow(), "src"),
            _ => None,
        })
    })
}

/// Image URL from an inline `background` or `background-image` declaration.
fn background_url(attrs: &[Attribute]) -> Option<String> {
    let style = attr(attrs, "style")?;
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .filter(|(prop, _)| matches!(prop.trim().to_ascii_lowercase().as_str(), "background" | "background-image"))
        .find_map(|(_, value)| extract_url(value))
}

fn serialize_node(node: &Handle) -> Option<String> {
    let mut out = Vec::new();
    let opts = SerializeOpts { traversal_scope: TraversalScope::IncludeNode, ..SerializeOpts::default() };
    match serialize(&mut out, &SerializableHandle::from(node.clone()), opts) {
        Ok(()) => match String::from_utf8(out) {
            Ok(markup) => Some(markup),
            Err(_) => None,
        },
        Err(e) => {
            tracing::debug!(error = %e, "svg serialization failed");
            None
        }
    }
}
