use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::image::PendingImage;
use crate::model::ProblemRecord;
use crate::{Challenge, Result};

/// On-disk layout: `{root}/{contest_type}/{year}/` holding the problem JSON,
/// `images/` and `html/`.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Default for Store {
    fn default() -> Self {
        Self::new("data")
    }
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn year_dir(&self, challenge: Challenge, year: u32) -> PathBuf {
        self.root.join(challenge.to_string()).join(year.to_string())
    }

    pub fn json_path(&self, challenge: Challenge, year: u32) -> PathBuf {
        self.year_dir(challenge, year).join(format!(
            "{}_{}_problems.json",
            challenge.json_prefix(),
            year
        ))
    }

    pub fn html_dir(&self, challenge: Challenge, year: u32) -> PathBuf {
        self.year_dir(challenge, year).join("html")
    }

    pub fn save_problems(
        &self,
        challenge: Challenge,
        year: u32,
        problems: &[ProblemRecord],
    ) -> Result<PathBuf> {
        let path = self.json_path(challenge, year);
        ensure_parent(&path)?;
        fs::write(&path, serde_json::to_string_pretty(problems)?)?;
        Ok(path)
    }

    pub fn load_problems(&self, challenge: Challenge, year: u32) -> Result<Vec<ProblemRecord>> {
        let content = fs::read_to_string(self.json_path(challenge, year))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes images at their local paths, relative to the year directory.
    pub fn save_images(&self, challenge: Challenge, year: u32, images: &[PendingImage]) -> Result<()> {
        let dir = self.year_dir(challenge, year);
        for image in images {
            let path = dir.join(&image.local_path);
            ensure_parent(&path)?;
            fs::write(&path, &image.bytes)?;
        }
        Ok(())
    }

    /// Replaces the rendered pages of a year. Stale pages are removed first;
    /// `index.html` is simply overwritten.
    pub fn save_pages(&self, challenge: Challenge, year: u32, pages: &[(String, String)]) -> Result<()> {
        let dir = self.html_dir(challenge, year);
        fs::create_dir_all(&dir)?;
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let stale = path.extension().map_or(false, |ext| ext == "html")
                && path.file_name().map_or(false, |name| name != "index.html");
            if stale {
                debug!("removing {}", path.display());
                fs::remove_file(&path)?;
            }
        }
        for (name, html) in pages {
            fs::write(dir.join(name), html)?;
        }
        Ok(())
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(number: u32) -> ProblemRecord {
        ProblemRecord {
            number,
            content: vec![],
            answer_choices: vec![],
            solutions: vec![],
            year: 2021,
            contest_type: Challenge::Amc12a,
            contest_name: "AMC 12A".into(),
        }
    }

    #[test]
    fn layout_should_follow_contest_and_year() {
        let store = Store::new("data");
        assert_eq!(
            store.json_path(Challenge::Amc12a, 2021),
            Path::new("data/AMC12A/2021/amc12a_2021_problems.json")
        );
        assert_eq!(
            store.html_dir(Challenge::Amc8, 2001),
            Path::new("data/AMC8/2001/html")
        );
    }

    #[test]
    fn problems_should_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let problems = vec![record(1), record(2)];

        store.save_problems(Challenge::Amc12a, 2021, &problems).unwrap();
        assert_eq!(store.load_problems(Challenge::Amc12a, 2021).unwrap(), problems);
        assert!(store.load_problems(Challenge::Amc12b, 2021).is_err());
    }

    #[test]
    fn images_should_land_under_year_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let images = vec![PendingImage {
            local_path: "images/problem_1_problem_0.png".into(),
            bytes: vec![137, 80, 78, 71],
        }];

        store.save_images(Challenge::Amc8, 2020, &images).unwrap();
        let written = fs::read(dir.path().join("AMC8/2020/images/problem_1_problem_0.png")).unwrap();
        assert_eq!(written, vec![137, 80, 78, 71]);
    }

    #[test]
    fn save_pages_should_drop_stale_pages() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let html_dir = store.html_dir(Challenge::Amc8, 2020);
        fs::create_dir_all(&html_dir).unwrap();
        fs::write(html_dir.join("problem_9.html"), "old").unwrap();
        fs::write(html_dir.join("notes.txt"), "keep").unwrap();

        store
            .save_pages(
                Challenge::Amc8,
                2020,
                &[("index.html".into(), "new index".into())],
            )
            .unwrap();

        assert!(!html_dir.join("problem_9.html").exists());
        assert!(html_dir.join("notes.txt").exists());
        assert_eq!(fs::read_to_string(html_dir.join("index.html")).unwrap(), "new index");
    }
}
