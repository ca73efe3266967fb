//! Go coverage profiles (`go test -coverprofile`).
//!
//! ```text
//! mode: set
//! example.com/pkg/server.go:10.2,12.16 2 1
//! ```
//!
//! Each block line is `<file>:<start>,<end> <statements> <count>`. Blocks are
//! aggregated per file into a tree whose sizes are statement counts and whose
//! heat is the covered ratio.

use std::collections::BTreeMap;

use regex::Regex;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{DelimitedSegmenter, PathSegmenter, TreeArena, TreeBuilder};
use crate::util::path::normalize_path_separator;

/// Statement totals of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageRecord {
    pub file: String,
    pub statements: u64,
    pub covered: u64,
}

impl CoverageRecord {
    pub fn ratio(&self) -> f64 {
        if self.statements == 0 {
            0.0
        } else {
            self.covered as f64 / self.statements as f64
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageProfile {
    pub mode: Option<String>,
    /// Per-file totals ordered by file name
    pub records: Vec<CoverageRecord>,
    pub skipped: usize,
}

pub struct CoverageParser {
    block_regex: Regex,
}

impl Default for CoverageParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CoverageParser {
    pub fn new() -> Self {
        Self {
            block_regex: Regex::new(
                r"^(?P<file>.+):(?P<block>\d+\.\d+,\d+\.\d+)\s+(?P<stmts>\d+)\s+(?P<count>\d+)\s*$",
            )
            .unwrap(),
        }
    }

    /// Parse a profile. Repeated blocks (merged profiles) count once, covered
    /// if any occurrence is.
    #[instrument(level = "debug", skip_all)]
    pub fn parse_str(&self, input: &str) -> ApplicationResult<CoverageProfile> {
        let mut profile = CoverageProfile::default();
        let mut blocks: BTreeMap<(String, String), (u64, u64)> = BTreeMap::new();

        for (number, line) in input.lines().enumerate() {
            if let Some(mode) = line.trim().strip_prefix("mode:") {
                profile.mode = Some(mode.trim().to_string());
                continue;
            }
            let caps = match self.block_regex.captures(line) {
                Some(caps) => caps,
                None => {
                    profile.skipped += 1;
                    debug!("skip line {}: {:?}", number + 1, line);
                    continue;
                }
            };
            let (stmts, count) = match (caps["stmts"].parse::<u64>(), caps["count"].parse::<u64>()) {
                (Ok(stmts), Ok(count)) => (stmts, count),
                _ => {
                    profile.skipped += 1;
                    debug!("skip line {}: counter out of range", number + 1);
                    continue;
                }
            };
            let entry = blocks
                .entry((caps["file"].to_string(), caps["block"].to_string()))
                .or_insert((stmts, 0));
            entry.1 = entry.1.max(count);
        }

        let mut per_file: BTreeMap<String, CoverageRecord> = BTreeMap::new();
        for ((file, _), (stmts, count)) in blocks {
            let record = per_file
                .entry(file.clone())
                .or_insert_with(|| CoverageRecord {
                    file,
                    statements: 0,
                    covered: 0,
                });
            record.statements += stmts;
            if count > 0 {
                record.covered += stmts;
            }
        }
        profile.records = per_file.into_values().collect();

        info!(
            "coverprofile: {} files, {} lines skipped",
            profile.records.len(),
            profile.skipped
        );
        if profile.records.is_empty() {
            return Err(ApplicationError::EmptyCoverageProfile {
                skipped: profile.skipped,
            });
        }
        Ok(profile)
    }
}

/// One node per path segment; sizes are statements, heat the covered ratio.
///
/// Sizes and heat of directories are resolved later by imputation and
/// [`impute_heat`].
pub fn build_coverage_tree(profile: &CoverageProfile) -> TreeArena {
    let segmenter = DelimitedSegmenter::new("/");
    let builder = TreeBuilder::default();
    let mut tree = TreeArena::with_root();

    for record in &profile.records {
        let segments = match segmenter.segment(&normalize_path_separator(&record.file)) {
            Some(segments) => segments,
            None => continue,
        };
        let idx = builder.insert_segments(&mut tree, &segments, record.statements as f64);
        if let Some(node) = tree.get_node_mut(idx) {
            node.data.heat = Some(record.ratio());
        }
    }
    tree
}

/// Give every internal node the size-weighted mean heat of its children.
///
/// Requires resolved sizes. Nodes whose children carry no size keep their heat.
#[instrument(level = "debug", skip_all)]
pub fn impute_heat(tree: &mut TreeArena) {
    let order: Vec<_> = tree.iter_postorder().map(|(idx, _)| idx).collect();
    for idx in order {
        let (weighted, total) = tree
            .children(idx)
            .iter()
            .filter_map(|&child| tree.get_node(child))
            .filter(|child| child.data.has_heat())
            .map(|child| (child.data.heat.unwrap_or(0.0), child.data.size))
            .fold((0.0, 0.0), |(w, t), (heat, size)| (w + heat * size, t + size));
        if total > 0.0 {
            if let Some(node) = tree.get_node_mut(idx) {
                node.data.heat = Some(weighted / total);
            }
        }
    }
}
