use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::challenge::BASE_URL;
use crate::image::absolute_url;
use crate::{Challenge, HarvestError, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const TIMEOUT: Duration = Duration::from_secs(30);

static PROBLEM_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^Problem\s+(\d+)").unwrap());

/// Shared HTTP client for pages and images.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build()
            .map_err(|source| HarvestError::Http {
                url: BASE_URL.to_string(),
                source,
            })?;
        Ok(Self { client })
    }

    pub async fn page(&self, url: &str) -> Result<String> {
        let http = |source: reqwest::Error| HarvestError::Http {
            url: url.to_string(),
            source,
        };
        self.client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http)?
            .text()
            .await
            .map_err(http)
    }

    pub async fn image(&self, url: &Url) -> Result<Vec<u8>> {
        let http = |source: reqwest::Error| HarvestError::Http {
            url: url.to_string(),
            source,
        };
        let bytes = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http)?
            .bytes()
            .await
            .map_err(http)?;
        Ok(bytes.to_vec())
    }

    /// Downloads every reference that resolves, keyed by absolute URL.
    /// Failures are logged and left out.
    pub async fn images(&self, sources: &[String]) -> HashMap<String, Vec<u8>> {
        let mut payloads = HashMap::new();
        for src in sources {
            let url = match absolute_url(src) {
                Ok(url) => url,
                Err(e) => {
                    debug!("{}", e);
                    continue;
                }
            };
            if payloads.contains_key(url.as_str()) {
                continue;
            }
            match self.image(&url).await {
                Ok(bytes) => {
                    payloads.insert(url.to_string(), bytes);
                }
                Err(e) => warn!("image download failed: {}", e),
            }
        }
        payloads
    }
}

/// Problem pages linked from a contest index page, sorted by number.
///
/// Falls back to the conventional URLs for problems 1 to 25 when the index
/// links none.
pub fn problem_links(index_html: &str, challenge: Challenge, year: u32) -> Vec<(u32, String)> {
    let document = Html::parse_document(index_html);
    let base = Url::parse(BASE_URL).ok();
    let mut links = BTreeMap::new();

    for link in document.select(&Selector::parse("a[href]").unwrap()) {
        let text = link.text().collect::<String>();
        let Some(number) = PROBLEM_LINK
            .captures(text.trim())
            .and_then(|c| c[1].parse::<u32>().ok())
        else {
            continue;
        };
        if !(1..=25).contains(&number) {
            continue;
        }
        let href = link.value().attr("href").unwrap_or_default();
        if let Some(url) = base.as_ref().and_then(|b| b.join(href).ok()) {
            links.entry(number).or_insert_with(|| url.to_string());
        }
    }

    if links.is_empty() {
        debug!("no problem links on {} {} index, using conventional urls", year, challenge);
        return (1..=25)
            .map(|n| (n, challenge.problem_url(year, n)))
            .collect();
    }
    links.into_iter().collect()
}
