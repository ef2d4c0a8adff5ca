//! Regenerates readable pages from stored problem records.

use askama::Template;

use crate::model::{ContentItem, ProblemRecord};
use crate::store::Store;
use crate::{Challenge, Result};

/// A content item as the templates see it.
#[derive(Debug)]
pub enum Fragment<'a> {
    Text(&'a str),
    Image(ImageView<'a>),
    Break,
    Markup(&'a str),
}

#[derive(Debug)]
pub struct ImageView<'a> {
    pub path: String,
    pub alt: &'a str,
    pub width: Option<&'a str>,
    pub height: Option<&'a str>,
}

impl<'a> From<&'a ContentItem> for Fragment<'a> {
    fn from(item: &'a ContentItem) -> Self {
        match item {
            ContentItem::Text { content } => Fragment::Text(content),
            ContentItem::Image {
                local_path,
                alt,
                width,
                height,
                ..
            } => Fragment::Image(ImageView {
                path: page_relative(local_path),
                alt,
                width: width.as_deref(),
                height: height.as_deref(),
            }),
            ContentItem::LineBreak => Fragment::Break,
            ContentItem::RawFragment {
                serialized_markup, ..
            } => Fragment::Markup(serialized_markup),
        }
    }
}

/// Pages live in `html/`, next to `images/`.
fn page_relative(local_path: &str) -> String {
    if local_path.starts_with("../") {
        local_path.to_string()
    } else {
        format!("../{}", local_path)
    }
}

#[derive(Template)]
#[template(path = "content.html.j2")]
struct ContentBlock<'a> {
    content: Vec<Fragment<'a>>,
}

#[derive(Template)]
#[template(path = "problem.html.j2")]
struct ProblemPage<'a> {
    problem: &'a ProblemRecord,
    content: String,
}

struct SolutionView {
    index: u32,
    content: String,
}

#[derive(Template)]
#[template(path = "solutions.html.j2")]
struct SolutionsPage<'a> {
    problem: &'a ProblemRecord,
    solutions: Vec<SolutionView>,
}

#[derive(Template)]
#[template(path = "index.html.j2")]
struct IndexPage<'a> {
    year: u32,
    contest_name: &'a str,
    numbers: Vec<u32>,
}

fn render_content(items: &[ContentItem]) -> Result<String> {
    let block = ContentBlock {
        content: items.iter().map(Fragment::from).collect(),
    };
    Ok(block.render()?)
}

pub fn problem_page(problem: &ProblemRecord) -> Result<String> {
    let page = ProblemPage {
        problem,
        content: render_content(&problem.content)?,
    };
    Ok(page.render()?)
}

pub fn solutions_page(problem: &ProblemRecord) -> Result<String> {
    let solutions = problem
        .solutions
        .iter()
        .map(|s| {
            Ok(SolutionView {
                index: s.index,
                content: render_content(&s.content)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let page = SolutionsPage { problem, solutions };
    Ok(page.render()?)
}

pub fn index_page(challenge: Challenge, year: u32, problems: &[ProblemRecord]) -> Result<String> {
    let page = IndexPage {
        year,
        contest_name: challenge.contest_name(),
        numbers: problems.iter().map(|p| p.number).collect(),
    };
    Ok(page.render()?)
}

/// Every page of one contest year as `(file name, html)`.
///
/// Problems without solutions get no solutions page.
pub fn site(challenge: Challenge, year: u32, problems: &[ProblemRecord]) -> Result<Vec<(String, String)>> {
    let mut pages = vec![];
    for problem in problems {
        pages.push((format!("problem_{}.html", problem.number), problem_page(problem)?));
        if !problem.solutions.is_empty() {
            pages.push((
                format!("solution_{}.html", problem.number),
                solutions_page(problem)?,
            ));
        }
    }
    pages.push(("index.html".to_string(), index_page(challenge, year, problems)?));
    Ok(pages)
}

/// Renders a stored contest year into its `html/` directory and returns the
/// number of pages written.
pub fn render_year(store: &Store, challenge: Challenge, year: u32) -> Result<usize> {
    let problems = store.load_problems(challenge, year)?;
    let pages = site(challenge, year, &problems)?;
    store.save_pages(challenge, year, &pages)?;
    Ok(pages.len())
}
