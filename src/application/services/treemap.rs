//! Treemap service
//!
//! Runs the whole pipeline: parse input, build and normalize the tree, label
//! it and render it in the configured format.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::application::coverage::{build_coverage_tree, impute_heat, CoverageParser};
use crate::application::labels::{apply_coverage_labels, apply_size_labels};
use crate::application::render::{
    render_csv, render_text, Colorer, HeatColorer, NoneColorer, SvgRenderer,
};
use crate::application::symtab::SymtabParser;
use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    collapse_root, compute_layout, impute_sizes, limit_depth, Normalizer, TreeArena, TreeBuilder,
};
use crate::infrastructure::traits::FileSystem;

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Svg,
    Csv,
    Tree,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Csv => "csv",
            OutputFormat::Tree => "tree",
        };
        f.write_str(s)
    }
}

/// What the input text contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// `nm`-style symbol table
    Symtab,
    /// Go coverage profile
    Coverage,
}

/// A labelled, normalized tree ready for rendering.
pub struct Treemap {
    pub tree: TreeArena,
    pub kind: InputKind,
}

pub struct TreemapService {
    settings: Arc<Settings>,
    fs: Arc<dyn FileSystem>,
}

impl TreemapService {
    pub fn new(settings: Arc<Settings>, fs: Arc<dyn FileSystem>) -> Self {
        Self { settings, fs }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn read_input(&self, path: &Path) -> ApplicationResult<String> {
        debug!("read_input: {}", path.display());
        self.fs.read_to_string(path).with_path_context("read input", path)
    }

    pub fn write_output(&self, path: &Path, content: &str) -> ApplicationResult<()> {
        debug!("write_output: {} ({} bytes)", path.display(), content.len());
        self.fs.write(path, content).with_path_context("write output", path)
    }

    /// Parse, build, normalize and label a symbol table.
    #[instrument(level = "debug", skip_all)]
    pub fn symbol_tree(&self, input: &str) -> ApplicationResult<TreeArena> {
        let symtab = SymtabParser::new().parse_str(input)?;
        let builder = TreeBuilder::new(self.settings.naming.segmenter());
        let mut tree = builder.build(&symtab.records);

        let report = Normalizer::new(self.settings.normalize.clone()).normalize(&mut tree)?;
        info!(
            "tree: {} nodes, total {} bytes, {:?}",
            tree.len(),
            tree.total_size(),
            report
        );
        apply_size_labels(&mut tree);
        Ok(tree)
    }

    /// Parse a coverage profile into a tree of files weighted by statements.
    ///
    /// Symbol filtering does not apply; depth limiting and collapsing do.
    #[instrument(level = "debug", skip_all)]
    pub fn coverage_tree(&self, input: &str) -> ApplicationResult<TreeArena> {
        let profile = CoverageParser::new().parse_str(input)?;
        let mut tree = build_coverage_tree(&profile);

        let options = &self.settings.normalize;
        impute_sizes(&mut tree, options.empty_leaf_size);
        impute_heat(&mut tree);
        limit_depth(&mut tree, options.max_depth);
        collapse_root(&mut tree)?;
        info!("coverage tree: {} nodes, {} statements", tree.len(), tree.total_size());

        apply_coverage_labels(&mut tree);
        Ok(tree)
    }

    pub fn build(&self, input: &str, kind: InputKind) -> ApplicationResult<Treemap> {
        let tree = match kind {
            InputKind::Symtab => self.symbol_tree(input)?,
            InputKind::Coverage => self.coverage_tree(input)?,
        };
        Ok(Treemap { tree, kind })
    }

    /// Render the complete document in memory.
    #[instrument(level = "debug", skip_all, fields(format = %format))]
    pub fn render(&self, treemap: &Treemap, format: OutputFormat) -> ApplicationResult<String> {
        match format {
            OutputFormat::Csv => Ok(render_csv(&treemap.tree)),
            OutputFormat::Tree => Ok(render_text(&treemap.tree)),
            OutputFormat::Svg => {
                let colorer: Box<dyn Colorer> = match treemap.kind {
                    InputKind::Symtab => Box::new(NoneColorer),
                    InputKind::Coverage => Box::new(HeatColorer::default()),
                };
                let renderer = SvgRenderer::new(&self.settings.render, colorer)?;
                let layout = &self.settings.layout;
                let boxes = compute_layout(&treemap.tree, layout);
                Ok(renderer.render(&treemap.tree, &boxes, layout.width, layout.height))
            }
        }
    }

    /// Build and render in one step.
    pub fn run(&self, input: &str, kind: InputKind) -> ApplicationResult<String> {
        let treemap = self.build(input, kind)?;
        self.render(&treemap, self.settings.format)
    }
}
