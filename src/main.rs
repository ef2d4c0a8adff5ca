use amc_harvest::aops::AopsScraperBuilder;
use amc_harvest::render::render_year;
use amc_harvest::store::Store;
use amc_harvest::{Challenge, HarvestError};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Harvest AMC problems from the AoPS wiki and rebuild them as local pages.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Download problems, solutions and images into the data directory.
    Scrape {
        #[command(flatten)]
        target: Target,
        /// Problem numbers to keep, `N` or `A-B`.
        #[arg(long, default_value = "1-25", value_parser = parse_range)]
        problems: RangeInclusive<u32>,
        #[arg(long, default_value_t = 3)]
        max_solutions: u32,
        /// Problem pages fetched at the same time.
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },
    /// Rebuild HTML pages from previously scraped JSON.
    Render {
        #[command(flatten)]
        target: Target,
    },
}

#[derive(Debug, Args)]
struct Target {
    /// AMC8, AMC10A, AMC10B, AMC12A or AMC12B.
    #[arg(long)]
    contest: Challenge,
    /// A year or an inclusive range such as `2019-2024`.
    #[arg(long, value_parser = parse_range)]
    years: RangeInclusive<u32>,
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
}

fn parse_range(s: &str) -> Result<RangeInclusive<u32>, HarvestError> {
    let bad = || HarvestError::BadRange(s.to_string());
    let (start, end) = match s.split_once('-') {
        Some((start, end)) => (start.trim(), end.trim()),
        None => (s.trim(), s.trim()),
    };
    let start: u32 = start.parse().map_err(|_| bad())?;
    let end: u32 = end.parse().map_err(|_| bad())?;
    if start > end {
        return Err(bad());
    }
    Ok(start..=end)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Command::Scrape {
            target,
            problems,
            max_solutions,
            concurrency,
        } => {
            let scraper = AopsScraperBuilder::default()
                .challenge(target.contest)
                .years(target.years)
                .problems(problems)
                .max_solutions(max_solutions)
                .concurrency(concurrency)
                .store(Store::new(target.data_dir))
                .build()?;

            for report in scraper.scrape().await? {
                if report.failed > 0 {
                    warn!(
                        "{}: {} problems scraped, {} failed",
                        report.year, report.scraped, report.failed
                    );
                } else {
                    info!("{}: {} problems scraped", report.year, report.scraped);
                }
            }
        }
        Command::Render { target } => {
            let store = Store::new(target.data_dir);
            for year in target.years {
                match render_year(&store, target.contest, year) {
                    Ok(pages) => info!("{}: rendered {} pages", year, pages),
                    Err(e) => warn!("{}: nothing rendered: {}", year, e),
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn parse_range_should_accept_years_and_spans() {
        assert_eq!(parse_range("2023").unwrap(), 2023..=2023);
        assert_eq!(parse_range("2019-2024").unwrap(), 2019..=2024);
        assert_eq!(parse_range(" 1 - 5 ").unwrap(), 1..=5);
        assert!(parse_range("2024-2019").is_err());
        assert!(parse_range("soon").is_err());
    }

    #[test]
    fn cli_should_parse_scrape_command() {
        Cli::command().debug_assert();
        let cli = Cli::parse_from([
            "amc-harvest",
            "scrape",
            "--contest",
            "amc10b",
            "--years",
            "2020-2021",
            "--problems",
            "21-25",
        ]);
        match cli.command {
            Command::Scrape {
                target,
                problems,
                max_solutions,
                ..
            } => {
                assert_eq!(target.contest, Challenge::Amc10b);
                assert_eq!(target.years, 2020..=2021);
                assert_eq!(target.data_dir, PathBuf::from("data"));
                assert_eq!(problems, 21..=25);
                assert_eq!(max_solutions, 3);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
