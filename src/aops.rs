use anyhow::Result;
use derive_builder::Builder;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::fetch::{problem_links, Fetcher};
use crate::image::{DownloadedImages, PendingImage};
use crate::model::ProblemRecord;
use crate::segment::DEFAULT_MAX_SOLUTIONS;
use crate::store::Store;
use crate::{Challenge, PageExtractor};

/// Harvests contest years from the AoPS wiki into a [`Store`].
#[derive(Debug, Builder)]
pub struct AopsScraper {
    challenge: Challenge,
    years: RangeInclusive<u32>,
    #[builder(default = "1..=25")]
    problems: RangeInclusive<u32>,
    #[builder(default = "DEFAULT_MAX_SOLUTIONS")]
    max_solutions: u32,
    /// Problem pages fetched at the same time.
    #[builder(default = "4")]
    concurrency: usize,
    #[builder(default)]
    store: Store,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearReport {
    pub year: u32,
    pub scraped: usize,
    pub failed: usize,
}

impl AopsScraper {
    pub async fn scrape(&self) -> Result<Vec<YearReport>> {
        let fetcher = Fetcher::new()?;
        let limit = Arc::new(Semaphore::new(self.concurrency.max(1)));

        let mut reports = vec![];
        for year in self.years.clone() {
            reports.push(self.scrape_year(&fetcher, &limit, year).await?);
        }
        Ok(reports)
    }

    async fn scrape_year(
        &self,
        fetcher: &Fetcher,
        limit: &Arc<Semaphore>,
        year: u32,
    ) -> Result<YearReport> {
        info!("scraping {} {} problems", year, self.challenge.contest_name());
        let index_url = self.challenge.index_url(year);
        let links = match fetcher.page(&index_url).await {
            Ok(html) => problem_links(&html, self.challenge, year),
            Err(e) => {
                warn!("index page unavailable: {}", e);
                problem_links("", self.challenge, year)
            }
        };

        let extractor = PageExtractor::new(self.challenge, year).max_solutions(self.max_solutions);
        let mut handles = vec![];
        for (number, url) in links {
            if !self.problems.contains(&number) {
                continue;
            }
            let fetcher = fetcher.clone();
            let limit = limit.clone();
            let handle = tokio::spawn(async move {
                let _permit = limit.acquire_owned().await?;
                scrape_page(&fetcher, extractor, number, &url).await
            });
            handles.push((number, handle));
        }

        let mut problems = vec![];
        let mut images = vec![];
        let mut failed = 0;
        for (number, handle) in handles {
            match handle.await {
                Ok(Ok((problem, pending))) => {
                    problems.push(problem);
                    images.extend(pending);
                }
                Ok(Err(e)) => {
                    warn!("problem {} of {} skipped: {:#}", number, year, e);
                    failed += 1;
                }
                Err(e) => {
                    warn!("problem {} of {} aborted: {}", number, year, e);
                    failed += 1;
                }
            }
        }
        problems.sort_by(|a, b| a.number.cmp(&b.number));

        self.store.save_images(self.challenge, year, &images)?;
        let path = self.store.save_problems(self.challenge, year, &problems)?;
        info!(
            "saved {} problems ({} images) to {}",
            problems.len(),
            images.len(),
            path.display()
        );

        Ok(YearReport {
            year,
            scraped: problems.len(),
            failed,
        })
    }
}

/// Fetches one problem page with its images and extracts the record. Nothing
/// is written until the whole page has been processed.
async fn scrape_page(
    fetcher: &Fetcher,
    extractor: PageExtractor,
    number: u32,
    url: &str,
) -> Result<(ProblemRecord, Vec<PendingImage>)> {
    info!("scraping problem {}", number);
    let html = fetcher.page(url).await?;

    let sources = extractor.image_sources(&html, number);
    let payloads = fetcher.images(&sources).await;

    let mut images = DownloadedImages::new(payloads);
    let problem = extractor.extract(&html, number, &mut images);
    Ok((problem, images.into_pending()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_should_fill_defaults() {
        let scraper = AopsScraperBuilder::default()
            .challenge(Challenge::Amc10a)
            .years(2020..=2021)
            .build()
            .unwrap();

        assert_eq!(scraper.problems, 1..=25);
        assert_eq!(scraper.max_solutions, 3);
        assert_eq!(scraper.concurrency, 4);
    }

    #[test]
    fn builder_should_require_years() {
        let result = AopsScraperBuilder::default()
            .challenge(Challenge::Amc8)
            .build();
        assert!(result.is_err());
    }
}
