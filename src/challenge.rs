use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

pub const BASE_URL: &str = "https://artofproblemsolving.com";

/// A contest family hosted on the AoPS wiki.
///
/// The `Display`/`FromStr` form is the storage key (`AMC8`, `AMC10A`, ...);
/// parsing also accepts the wiki slug (`AMC_8`) in any case.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    Display,
)]
#[strum(ascii_case_insensitive)]
pub enum Challenge {
    #[default]
    #[strum(to_string = "AMC8", serialize = "AMC_8")]
    #[serde(rename = "AMC8")]
    Amc8,
    #[strum(to_string = "AMC10A", serialize = "AMC_10A")]
    #[serde(rename = "AMC10A")]
    Amc10a,
    #[strum(to_string = "AMC10B", serialize = "AMC_10B")]
    #[serde(rename = "AMC10B")]
    Amc10b,
    #[strum(to_string = "AMC12A", serialize = "AMC_12A")]
    #[serde(rename = "AMC12A")]
    Amc12a,
    #[strum(to_string = "AMC12B", serialize = "AMC_12B")]
    #[serde(rename = "AMC12B")]
    Amc12b,
}

impl Challenge {
    pub fn wiki_slug(self) -> &'static str {
        match self {
            Challenge::Amc8 => "AMC_8",
            Challenge::Amc10a => "AMC_10A",
            Challenge::Amc10b => "AMC_10B",
            Challenge::Amc12a => "AMC_12A",
            Challenge::Amc12b => "AMC_12B",
        }
    }

    /// Human readable name, stored as `contest_name`.
    pub fn contest_name(self) -> &'static str {
        match self {
            Challenge::Amc8 => "AMC 8",
            Challenge::Amc10a => "AMC 10A",
            Challenge::Amc10b => "AMC 10B",
            Challenge::Amc12a => "AMC 12A",
            Challenge::Amc12b => "AMC 12B",
        }
    }

    pub fn json_prefix(self) -> &'static str {
        match self {
            Challenge::Amc8 => "amc8",
            Challenge::Amc10a => "amc10a",
            Challenge::Amc10b => "amc10b",
            Challenge::Amc12a => "amc12a",
            Challenge::Amc12b => "amc12b",
        }
    }

    pub fn index_url(self, year: u32) -> String {
        format!("{}/wiki/index.php/{}_{}", BASE_URL, year, self.wiki_slug())
    }

    pub fn problem_url(self, year: u32, problem: u32) -> String {
        format!(
            "{}/wiki/index.php/{}_{}_Problems/Problem_{}",
            BASE_URL,
            year,
            self.wiki_slug(),
            problem
        )
    }
}
