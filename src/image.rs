use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use reqwest::Url;
use thiserror::Error;

use crate::challenge::BASE_URL;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("cannot resolve image reference {0:?}")]
    BadReference(String),
    #[error("image {0} was not downloaded")]
    Unavailable(String),
}

/// Which section of the page an image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Problem,
    Solution(u32),
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Problem => write!(f, "problem"),
            Role::Solution(index) => write!(f, "solution_{}", index),
        }
    }
}

/// Maps an image reference found in a page to a locally addressable path.
pub trait ImageResolver {
    fn resolve(&mut self, src: &str, problem: u32, role: Role) -> Result<String, ImageError>;
}

/// Resolves a possibly relative reference against the wiki origin.
pub fn absolute_url(src: &str) -> Result<Url, ImageError> {
    let src = src.trim();
    if src.is_empty() {
        return Err(ImageError::BadReference(src.to_string()));
    }
    Url::parse(BASE_URL)
        .and_then(|base| base.join(src))
        .map_err(|_| ImageError::BadReference(src.to_string()))
}

fn extension(url: &Url) -> String {
    Path::new(url.path())
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| ".png".to_string())
}

/// Image bytes waiting to be written at `local_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    pub local_path: String,
    pub bytes: Vec<u8>,
}

/// Hands out collision-free local names for one page.
///
/// Names look like `images/problem_{n}_{role}_{seq}{ext}`, where `seq` counts
/// up per page. Asking twice for the same reference and role returns the
/// first name.
#[derive(Debug, Default)]
pub struct LocalNamer {
    next: u32,
    assigned: HashMap<(String, Role), String>,
}

impl LocalNamer {
    /// Returns the name and whether it was newly assigned.
    pub fn name(&mut self, url: &Url, problem: u32, role: Role) -> (String, bool) {
        let key = (url.to_string(), role);
        if let Some(name) = self.assigned.get(&key) {
            return (name.clone(), false);
        }
        let name = format!(
            "images/problem_{}_{}_{}{}",
            problem,
            role,
            self.next,
            extension(url)
        );
        self.next += 1;
        self.assigned.insert(key, name.clone());
        (name, true)
    }
}

/// Resolver backed by images fetched before the page is walked.
#[derive(Debug, Default)]
pub struct DownloadedImages {
    payloads: HashMap<String, Vec<u8>>,
    namer: LocalNamer,
    pending: Vec<PendingImage>,
}

impl DownloadedImages {
    pub fn new(payloads: HashMap<String, Vec<u8>>) -> Self {
        Self {
            payloads,
            ..Default::default()
        }
    }

    /// Images resolved so far, in resolution order.
    pub fn into_pending(self) -> Vec<PendingImage> {
        self.pending
    }
}

impl ImageResolver for DownloadedImages {
    fn resolve(&mut self, src: &str, problem: u32, role: Role) -> Result<String, ImageError> {
        let url = absolute_url(src)?;
        let bytes = self
            .payloads
            .get(url.as_str())
            .ok_or_else(|| ImageError::Unavailable(url.to_string()))?;
        let (local_path, fresh) = self.namer.name(&url, problem, role);
        if fresh {
            self.pending.push(PendingImage {
                local_path: local_path.clone(),
                bytes: bytes.clone(),
            });
        }
        Ok(local_path)
    }
}

/// Records every reference it is asked for and resolves none of them.
///
/// Walking a page with it lists exactly the images worth downloading.
#[derive(Debug, Default)]
pub struct SourceCollector {
    sources: Vec<String>,
}

impl SourceCollector {
    pub fn into_sources(self) -> Vec<String> {
        self.sources
    }
}

impl ImageResolver for SourceCollector {
    fn resolve(&mut self, src: &str, _problem: u32, _role: Role) -> Result<String, ImageError> {
        if !self.sources.iter().any(|s| s == src) {
            self.sources.push(src.to_string());
        }
        Err(ImageError::Unavailable(src.to_string()))
    }
}

/// Resolver for tests: records every call and refuses references containing
/// `broken`.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingResolver {
    pub calls: Vec<(String, u32, Role)>,
}

#[cfg(test)]
impl ImageResolver for RecordingResolver {
    fn resolve(&mut self, src: &str, problem: u32, role: Role) -> Result<String, ImageError> {
        self.calls.push((src.to_string(), problem, role));
        if src.contains("broken") {
            return Err(ImageError::Unavailable(src.to_string()));
        }
        let file = src.rsplit('/').next().unwrap_or(src);
        Ok(format!("images/{}_{}", role, file))
    }
}
