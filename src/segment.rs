//! Carves a wiki page into its problem region and numbered solution regions.
//!
//! A region is the run of element siblings that follows a section heading.
//! Boundaries come from heading text and from the anchor ids MediaWiki puts
//! on headings (`<h2><span id="Solution_2">Solution 2</span></h2>`).

use ego_tree::NodeRef;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{node::Node, ElementRef, Html};

static SOLUTION_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Solution_(\d+)").unwrap());
static SOLUTION_TEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^solution\s+(\d+)").unwrap());

pub const DEFAULT_MAX_SOLUTIONS: u32 = 3;

#[derive(Debug, Default)]
pub struct Segments<'a> {
    /// Empty when the page has no problem anchor.
    pub problem: Vec<ElementRef<'a>>,
    pub solutions: Vec<SolutionRegion<'a>>,
}

#[derive(Debug)]
pub struct SolutionRegion<'a> {
    pub index: u32,
    pub nodes: Vec<ElementRef<'a>>,
}

pub fn segment(page: &Html, max_solutions: u32) -> Segments<'_> {
    Segments {
        problem: problem_region(page),
        solutions: solution_regions(page, max_solutions),
    }
}

/// Siblings between the problem heading and the first solution, video
/// solution or "see also" heading.
pub fn problem_region(page: &Html) -> Vec<ElementRef<'_>> {
    let Some(anchor) = find_problem_anchor(page) else {
        return vec![];
    };
    siblings_after(section_start(anchor))
        .take_while(|e| !ends_problem(*e))
        .collect()
}

/// Up to `max_solutions` numbered solutions, stopping at the first number
/// that has no heading. A missing `Solution 2` hides `Solution 3`.
pub fn solution_regions(page: &Html, max_solutions: u32) -> Vec<SolutionRegion<'_>> {
    let mut regions = vec![];
    for index in 1..=max_solutions {
        let Some(heading) = find_solution_heading(page, index) else {
            break;
        };
        let nodes = siblings_after(heading)
            .take_while(|e| !ends_solution(*e, index))
            .collect();
        regions.push(SolutionRegion { index, nodes });
    }
    regions
}

fn find_problem_anchor(page: &Html) -> Option<ElementRef<'_>> {
    find_by_id(page, "Problem").or_else(|| {
        headings(page).find(|h| heading_text(*h).eq_ignore_ascii_case("problem"))
    })
}

fn find_solution_heading(page: &Html, index: u32) -> Option<ElementRef<'_>> {
    let labels = [format!("Solution {}", index), format!("Solution {}:", index)];
    find_by_id(page, &format!("Solution_{}", index))
        .and_then(enclosing_heading)
        .or_else(|| headings(page).find(|h| labels.contains(&heading_text(*h))))
}

fn ends_problem(element: ElementRef<'_>) -> bool {
    let solution_id = |id: &str| id.starts_with("Solution");
    if element.value().id().map_or(false, solution_id) {
        return true;
    }
    if !is_heading(element) {
        return false;
    }
    if anchor_id(element).map_or(false, solution_id) {
        return true;
    }
    let text = heading_text(element).to_lowercase();
    text.contains("solution") || text.contains("see also")
}

fn ends_solution(element: ElementRef<'_>, index: u32) -> bool {
    if !is_heading(element) {
        return false;
    }
    let next = index + 1;
    let text = heading_text(element).to_lowercase();

    if let Some(id) = anchor_id(element) {
        let declared = SOLUTION_ID
            .captures(id)
            .and_then(|c| c[1].parse::<u32>().ok());
        if declared == Some(next) || id.starts_with("Video") || id.starts_with("See_Also") {
            return true;
        }
    }
    let declared = SOLUTION_TEXT
        .captures(&text)
        .and_then(|c| c[1].parse::<u32>().ok());
    declared == Some(next) || text.starts_with("video") || text.starts_with("see also")
}

fn find_by_id<'a>(page: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    page.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().id() == Some(id))
}

fn headings(page: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    page.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| is_heading(*e))
}

fn is_heading(element: ElementRef<'_>) -> bool {
    matches!(element.value().name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn is_toc(element: ElementRef<'_>) -> bool {
    element.value().id() == Some("toc") || element.value().classes().any(|c| c == "toc")
}

/// The heading an anchor labels: the anchor itself or its parent.
fn enclosing_heading(anchor: ElementRef<'_>) -> Option<ElementRef<'_>> {
    if is_heading(anchor) {
        return Some(anchor);
    }
    anchor
        .parent()
        .and_then(ElementRef::wrap)
        .filter(|parent| is_heading(*parent))
}

/// Where sibling scanning starts for an anchor that may sit inside a heading.
fn section_start(anchor: ElementRef<'_>) -> ElementRef<'_> {
    enclosing_heading(anchor).unwrap_or(anchor)
}

fn siblings_after(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .filter(|e| !is_toc(*e))
}

/// First id on the heading or one of its descendants.
fn anchor_id(heading: ElementRef<'_>) -> Option<&str> {
    heading
        .descendants()
        .filter_map(ElementRef::wrap)
        .find_map(|e| e.value().id())
}

/// Heading text without MediaWiki's `[edit]` links.
pub fn heading_text(heading: ElementRef<'_>) -> String {
    let mut buf = String::new();
    collect_heading_text(*heading, &mut buf);
    buf.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_heading_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => {
            out.push_str(text);
            out.push(' ');
        }
        Node::Element(element) if element.classes().any(|c| c == "mw-editsection") => {}
        _ => {
            for child in node.children() {
                collect_heading_text(child, out);
            }
        }
    }
}
