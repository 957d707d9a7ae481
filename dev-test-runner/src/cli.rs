//! Golden-file checker: derive → render → compare with `fixtures/*.json`
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use rayon::prelude::*;

use crate::fixtures::{Fixture, FIXTURES};
use crate::path_de::{first_difference, Golden};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// check derived schema documents against their checked-in renderings
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// glob pattern locating the golden files
    #[arg(long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/*.json"))]
    fixtures: String,

    /// only run fixtures whose name contains this substring
    #[arg(long)]
    filter: Option<String>,

    /// rewrite golden files from the current output instead of comparing
    #[arg(long, default_value_t = false)]
    bless: bool,
}

enum Outcome {
    Pass,
    Blessed,
    Missing,
    Mismatch { pointer: String },
    Failed(anyhow::Error),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        let goldens = resolve_goldens(&self.fixtures)?;
        let fixtures: Vec<&Fixture> = FIXTURES
            .iter()
            .filter(|f| self.filter.as_deref().is_none_or(|needle| f.name.contains(needle)))
            .collect();

        let dir = golden_dir(&self.fixtures);
        let started = chrono::Local::now();
        let outcomes: Vec<(&str, Outcome)> = fixtures
            .par_iter()
            .map(|fixture| {
                let golden = goldens.get(fixture.name).cloned();
                (fixture.name, self.check(fixture, golden, &dir))
            })
            .collect();

        let mut failures = 0usize;
        for (name, outcome) in &outcomes {
            match outcome {
                Outcome::Pass => eprintln!("{} {name}", "ok".green().bold()),
                Outcome::Blessed => eprintln!("{} {name}", "blessed".cyan().bold()),
                Outcome::Missing => {
                    failures += 1;
                    eprintln!("{} {name}: no golden file (run with --bless)", "missing".yellow().bold());
                }
                Outcome::Mismatch { pointer } => {
                    failures += 1;
                    eprintln!("{} {name}: first difference at `{pointer}`", "mismatch".red().bold());
                }
                Outcome::Failed(error) => {
                    failures += 1;
                    eprintln!("{} {name}: {error:#}", "error".red().bold());
                }
            }
        }
        for orphan in goldens.keys().filter(|k| !FIXTURES.iter().any(|f| f.name == k.as_str())) {
            eprintln!("{} {orphan}: golden file has no registered fixture", "warning".yellow());
        }

        let elapsed = chrono::Local::now() - started;
        eprintln!(
            "{} fixtures, {failures} failed, {}ms",
            outcomes.len(),
            elapsed.num_milliseconds()
        );
        if failures > 0 {
            bail!("{failures} fixture(s) failed");
        }
        Ok(())
    }

    fn check(&self, fixture: &Fixture, golden: Option<PathBuf>, dir: &Path) -> Outcome {
        match self.try_check(fixture, golden, dir) {
            Ok(outcome) => outcome,
            Err(error) => Outcome::Failed(error),
        }
    }

    fn try_check(&self, fixture: &Fixture, golden: Option<PathBuf>, dir: &Path) -> Result<Outcome> {
        let doc = fixture
            .derive()
            .with_context(|| format!("deriving {}", fixture.name))?;
        let rendered = doc.render()?;

        if self.bless {
            let path = golden.unwrap_or_else(|| dir.join(format!("{}.json", fixture.name)));
            std::fs::create_dir_all(dir)?;
            std::fs::write(&path, format!("{rendered}\n"))
                .with_context(|| format!("writing {}", path.display()))?;
            return Ok(Outcome::Blessed);
        }

        let Some(path) = golden else {
            return Ok(Outcome::Missing);
        };
        let golden = Golden::load(&path)?;
        if golden.text.trim_end() == rendered {
            return Ok(Outcome::Pass);
        }
        // Same structure but different bytes means ordering or formatting drift.
        let pointer = first_difference(&golden.to_value(), &doc.to_value()?)
            .unwrap_or_else(|| "(formatting)".to_owned());
        Ok(Outcome::Mismatch { pointer })
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Golden files keyed by file stem.
fn resolve_goldens(pattern: &str) -> Result<BTreeMap<String, PathBuf>> {
    let mut out = BTreeMap::new();
    for entry in glob::glob(pattern).with_context(|| format!("bad glob pattern: {pattern}"))? {
        let path = entry?;
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            out.insert(stem.to_owned(), path.clone());
        }
    }
    Ok(out)
}

/// Directory new golden files are blessed into: the pattern's literal prefix.
fn golden_dir(pattern: &str) -> PathBuf {
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }
    Path::new(pattern)
        .ancestors()
        .skip(1)
        .find(|p| !has_glob_chars(&p.to_string_lossy()))
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn golden_dir_is_the_literal_prefix() {
        assert_eq!(golden_dir("fixtures/*.json"), PathBuf::from("fixtures"));
        assert_eq!(golden_dir("a/b/**/*.json"), PathBuf::from("a/b"));
    }

    #[test]
    fn every_fixture_has_a_golden_file() {
        let pattern = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/*.json");
        let goldens = resolve_goldens(pattern).unwrap();
        for fixture in FIXTURES.iter() {
            assert!(goldens.contains_key(fixture.name), "missing golden for {}", fixture.name);
        }
    }

    #[test]
    fn goldens_match_current_output() {
        let cli = CommandLineInterface::parse_from(["dev-test-runner"]);
        cli.run().unwrap();
    }
}
