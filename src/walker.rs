//! Turns markup nodes into ordered [`ContentItem`]s.

use ego_tree::NodeRef;
use scraper::{node::Node, ElementRef};
use tracing::debug;

use crate::image::{ImageResolver, Role};
use crate::model::ContentItem;

const CONTAINER_TAGS: &[&str] = &["p", "div", "span", "pre", "code"];

/// Everything the walker needs besides the node itself.
pub struct WalkContext<'r> {
    pub problem: u32,
    pub role: Role,
    resolver: &'r mut dyn ImageResolver,
}

impl<'r> WalkContext<'r> {
    pub fn new(problem: u32, role: Role, resolver: &'r mut dyn ImageResolver) -> Self {
        Self {
            problem,
            role,
            resolver,
        }
    }

    fn image(&mut self, img: ElementRef<'_>) -> Option<ContentItem> {
        let element = img.value();
        let src = element.attr("src").or_else(|| element.attr("data-src"))?;
        match self.resolver.resolve(src, self.problem, self.role) {
            Ok(local_path) => Some(ContentItem::Image {
                src: src.to_string(),
                local_path,
                alt: element.attr("alt").unwrap_or_default().to_string(),
                width: element.attr("width").map(str::to_string),
                height: element.attr("height").map(str::to_string),
            }),
            Err(e) => {
                debug!("skipping image in {} of problem {}: {}", self.role, self.problem, e);
                None
            }
        }
    }
}

/// Walks one node and returns its items in reading order.
pub fn walk(node: NodeRef<'_, Node>, ctx: &mut WalkContext<'_>) -> Vec<ContentItem> {
    let mut items = vec![];
    walk_into(node, ctx, &mut items);
    items
}

fn walk_into(node: NodeRef<'_, Node>, ctx: &mut WalkContext<'_>, out: &mut Vec<ContentItem>) {
    match node.value() {
        Node::Text(text) => {
            let text = text.trim();
            if !text.is_empty() {
                out.push(ContentItem::text(text));
            }
        }
        Node::Document | Node::Fragment => {
            for child in node.children() {
                walk_into(child, ctx, out);
            }
        }
        Node::Element(_) => {
            if let Some(element) = ElementRef::wrap(node) {
                walk_element(element, ctx, out);
            }
        }
        _ => {}
    }
}

fn walk_element(element: ElementRef<'_>, ctx: &mut WalkContext<'_>, out: &mut Vec<ContentItem>) {
    let name = element.value().name();
    match name {
        "img" => out.extend(ctx.image(element)),
        "br" => out.push(ContentItem::LineBreak),
        "a" if is_image_link(element) => {
            if let Some(img) = first_image(element) {
                out.extend(ctx.image(img));
            }
        }
        _ if CONTAINER_TAGS.contains(&name) => {
            for child in element.children() {
                walk_into(child, ctx, out);
            }
        }
        _ => {
            let visible_text = visible_text(element);
            if visible_text.is_empty() && first_image(element).is_none() {
                return;
            }
            out.push(ContentItem::RawFragment {
                visible_text,
                serialized_markup: element.html(),
                tag_name: name.to_string(),
            });
        }
    }
}

/// A link whose only informative content is an image.
fn is_image_link(element: ElementRef<'_>) -> bool {
    first_image(element).is_some() && element.text().all(|t| t.trim().is_empty())
}

fn first_image(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "img")
}

/// Descendant text with whitespace collapsed to single spaces.
pub fn visible_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
