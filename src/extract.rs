use scraper::{ElementRef, Html};

use crate::choices;
use crate::image::{ImageResolver, Role, SourceCollector};
use crate::model::{ContentItem, ProblemRecord, SolutionRecord};
use crate::segment::{segment, DEFAULT_MAX_SOLUTIONS};
use crate::walker::{walk, WalkContext};
use crate::Challenge;

/// Builds [`ProblemRecord`]s from problem pages of one contest year.
#[derive(Debug, Clone, Copy)]
pub struct PageExtractor {
    challenge: Challenge,
    year: u32,
    max_solutions: u32,
}

impl PageExtractor {
    pub fn new(challenge: Challenge, year: u32) -> Self {
        Self {
            challenge,
            year,
            max_solutions: DEFAULT_MAX_SOLUTIONS,
        }
    }

    pub fn max_solutions(mut self, max_solutions: u32) -> Self {
        self.max_solutions = max_solutions;
        self
    }

    pub fn extract(&self, html: &str, number: u32, resolver: &mut dyn ImageResolver) -> ProblemRecord {
        let page = Html::parse_document(html);
        self.extract_page(&page, number, resolver)
    }

    /// Never fails: a page without a problem heading gives empty content and
    /// no choices, a page without solution headings gives no solutions.
    pub fn extract_page(
        &self,
        page: &Html,
        number: u32,
        resolver: &mut dyn ImageResolver,
    ) -> ProblemRecord {
        let segments = segment(page, self.max_solutions);

        let content = walk_region(&segments.problem, number, Role::Problem, resolver);
        let answer_choices = choices::extract(&content);
        let solutions = segments
            .solutions
            .iter()
            .map(|region| SolutionRecord {
                index: region.index,
                content: walk_region(&region.nodes, number, Role::Solution(region.index), resolver),
            })
            .filter(|solution| !solution.content.is_empty())
            .collect();

        ProblemRecord {
            number,
            content,
            answer_choices,
            solutions,
            year: self.year,
            contest_type: self.challenge,
            contest_name: self.challenge.contest_name().to_string(),
        }
    }

    /// Image references the walker will ask for, in page order.
    pub fn image_sources(&self, html: &str, number: u32) -> Vec<String> {
        let mut collector = SourceCollector::default();
        self.extract(html, number, &mut collector);
        collector.into_sources()
    }
}

fn walk_region(
    nodes: &[ElementRef<'_>],
    number: u32,
    role: Role,
    resolver: &mut dyn ImageResolver,
) -> Vec<ContentItem> {
    let mut ctx = WalkContext::new(number, role, resolver);
    nodes.iter().flat_map(|node| walk(**node, &mut ctx)).collect()
}
