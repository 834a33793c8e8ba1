//! Relationship diagrams for relational metadata.
//!
//! Tables with lookup columns (or taking part in many-to-many joins) become
//! clusters; lookup columns and primary keys become nodes; each resolved
//! reference becomes a colored edge labelled with its cardinality. The
//! assembled graph is laid out left to right and exported as SVG and PNG,
//! optionally PDF.

pub mod builder;
pub mod error;
pub mod fonts;
pub mod graph;
pub mod metadata;
pub mod model;
pub mod render;
pub mod sanitize;
pub mod theme;

use std::path::{Path, PathBuf};

pub use builder::diagnostics::{Diagnostic, Diagnostics};
pub use builder::{BuildOutcome, GraphBuilder};
pub use error::{Error, Result};
pub use metadata::MetadataDocument;
pub use render::{ExportFormat, RenderBackend, Renderer};
pub use theme::Theme;

use fonts::TextMeasure;

pub const DEFAULT_BASE_NAME: &str = "dataverse";

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// File stem of every artifact.
    pub base_name: String,
    pub theme: Theme,
    pub formats: Vec<ExportFormat>,
    pub png_scale: f32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            base_name: DEFAULT_BASE_NAME.to_string(),
            theme: Theme::default(),
            formats: vec![ExportFormat::Svg, ExportFormat::Png],
            png_scale: 1.0,
        }
    }
}

/// Files written by [`generate`] and the gaps found while building.
#[derive(Debug)]
pub struct GeneratedDiagram {
    pub paths: Vec<PathBuf>,
    pub diagnostics: Diagnostics,
}

/// Builds the relationship graph for `document` and writes one artifact
/// per requested format into `output_dir`, creating it if needed.
pub fn generate<T: TextMeasure>(
    document: &MetadataDocument,
    output_dir: &Path,
    options: &GenerateOptions,
    measure: T,
) -> Result<GeneratedDiagram> {
    let outcome = GraphBuilder::new().with_theme(&options.theme).build(
        &document.name,
        &document.tables,
        &document.relationships,
    )?;

    std::fs::create_dir_all(output_dir).map_err(|source| Error::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut renderer =
        Renderer::new(measure, options.theme.clone()).with_png_scale(options.png_scale);
    let paths = render::render_to_dir(
        &mut renderer,
        &outcome.graph,
        output_dir,
        &options.base_name,
        &options.formats,
    )?;

    Ok(GeneratedDiagram {
        paths,
        diagnostics: outcome.diagnostics,
    })
}
