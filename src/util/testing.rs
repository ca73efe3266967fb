//! Shared test support: one-time log capture and small tree fixtures.

use std::sync::Once;

use tracing::info;
use tracing_subscriber::{fmt, fmt::format::FmtSpan, EnvFilter};

use crate::domain::{NormalizeOptions, Normalizer, SymbolRecord, TreeArena, TreeBuilder};

static TEST_SETUP: Once = Once::new();

/// Default directives when `RUST_LOG` is unset; per-row layout traces are muted.
const TEST_LOG_DIRECTIVES: &str = "debug,binsize_treemap::domain::layout=info";

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(TEST_LOG_DIRECTIVES));

        // captured per test by the harness; another subscriber may already be installed
        let installed = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .is_ok();
        info!("test logging ready (own subscriber: {installed})");
    });
}

/// Records from `(name, size)` pairs.
pub fn records(pairs: &[(&str, u64)]) -> Vec<SymbolRecord> {
    pairs
        .iter()
        .map(|&(name, size)| SymbolRecord::new(name, size))
        .collect()
}

/// Go-named records built and normalized with `options`.
pub fn normalized_tree(pairs: &[(&str, u64)], options: NormalizeOptions) -> TreeArena {
    init_test_setup();
    let mut tree = TreeBuilder::default().build(&records(pairs));
    Normalizer::new(options)
        .normalize(&mut tree)
        .expect("normalize fixture tree");
    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_repeated_calls_when_initializing_then_runs_once() {
        init_test_setup();
        init_test_setup();
        assert!(TEST_SETUP.is_completed());
    }

    #[test]
    fn given_pairs_when_building_fixture_then_tree_is_normalized() {
        let tree = normalized_tree(&[("pkg/a.Foo", 3), ("pkg/b.Bar", 4)], NormalizeOptions::default());
        assert_eq!(tree.root_node().unwrap().data.key(), "pkg");
        assert_eq!(tree.total_size(), 7.0);
    }
}
