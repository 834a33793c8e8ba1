//! Rendering backend seam and the default SVG/PNG/PDF backend.
//!
//! The builder never talks to a backend directly. Once a graph is
//! assembled, [`render_to_dir`] asks the backend for a layout in the
//! graph's orientation and then exports one file per requested format.

pub mod layout;
pub mod raster;
pub mod svg;

use std::path::{Path, PathBuf};

pub use crate::graph::Orientation;
use crate::error::RenderError;
use crate::fonts::TextMeasure;
use crate::graph::RootGraph;
use crate::theme::Theme;
use layout::{DiagramLayout, LayoutEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Svg,
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// Anything that can lay out a [`RootGraph`] and turn the result into
/// image bytes.
pub trait RenderBackend {
    fn compute_layout(
        &mut self,
        graph: &RootGraph,
        orientation: Orientation,
    ) -> Result<DiagramLayout, RenderError>;

    fn encode(
        &mut self,
        graph: &RootGraph,
        layout: &DiagramLayout,
        format: ExportFormat,
    ) -> Result<Vec<u8>, RenderError>;

    fn export(
        &mut self,
        graph: &RootGraph,
        layout: &DiagramLayout,
        path: &Path,
        format: ExportFormat,
    ) -> Result<(), RenderError> {
        let bytes = self.encode(graph, layout, format)?;
        std::fs::write(path, bytes).map_err(|source| RenderError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Default backend: layered layout, hand-written SVG, resvg rasterization.
pub struct Renderer<T: TextMeasure> {
    measure: T,
    theme: Theme,
    png_scale: f32,
}

impl<T: TextMeasure> Renderer<T> {
    pub fn new(measure: T, theme: Theme) -> Self {
        Self {
            measure,
            theme,
            png_scale: 1.0,
        }
    }

    pub fn with_png_scale(mut self, scale: f32) -> Self {
        self.png_scale = scale;
        self
    }
}

impl<T: TextMeasure> RenderBackend for Renderer<T> {
    fn compute_layout(
        &mut self,
        graph: &RootGraph,
        orientation: Orientation,
    ) -> Result<DiagramLayout, RenderError> {
        Ok(LayoutEngine::new(&mut self.measure, &self.theme).layout(graph, orientation))
    }

    fn encode(
        &mut self,
        graph: &RootGraph,
        layout: &DiagramLayout,
        format: ExportFormat,
    ) -> Result<Vec<u8>, RenderError> {
        let document = svg::render_svg(graph, layout);
        match format {
            ExportFormat::Svg => Ok(document.into_bytes()),
            ExportFormat::Png => raster::svg_to_png(&document, self.png_scale),
            ExportFormat::Pdf => raster::svg_to_pdf(&document),
        }
    }
}

/// Lays `graph` out once and writes `<dir>/<base_name>.<ext>` for each of
/// `formats`. Returns the written paths in `formats` order.
pub fn render_to_dir<B: RenderBackend + ?Sized>(
    backend: &mut B,
    graph: &RootGraph,
    dir: &Path,
    base_name: &str,
    formats: &[ExportFormat],
) -> Result<Vec<PathBuf>, RenderError> {
    let layout = backend.compute_layout(graph, graph.attributes.orientation)?;

    let mut written = Vec::with_capacity(formats.len());
    for format in formats {
        let path = dir.join(format!("{base_name}.{}", format.extension()));
        backend.export(graph, &layout, &path, *format)?;
        tracing::info!(path = %path.display(), "diagram written");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::ApproximateMeasure;
    use crate::graph::GraphAttributes;

    #[derive(Default)]
    struct Recording {
        layouts: Vec<Orientation>,
        exports: Vec<ExportFormat>,
    }

    impl RenderBackend for Recording {
        fn compute_layout(
            &mut self,
            _graph: &RootGraph,
            orientation: Orientation,
        ) -> Result<DiagramLayout, RenderError> {
            self.layouts.push(orientation);
            Ok(DiagramLayout::default())
        }

        fn encode(
            &mut self,
            _graph: &RootGraph,
            _layout: &DiagramLayout,
            format: ExportFormat,
        ) -> Result<Vec<u8>, RenderError> {
            self.exports.push(format);
            Ok(format.extension().as_bytes().to_vec())
        }
    }

    #[test]
    fn dispatch_lays_out_once_and_names_files_after_base() {
        let dir = tempfile::tempdir().expect("tempdir");
        let graph = RootGraph::new("doc", GraphAttributes::default());
        let mut backend = Recording::default();

        let paths = render_to_dir(
            &mut backend,
            &graph,
            dir.path(),
            "dataverse",
            &[ExportFormat::Svg, ExportFormat::Png],
        )
        .expect("render");

        assert_eq!(backend.layouts, vec![Orientation::LeftToRight]);
        assert_eq!(backend.exports, vec![ExportFormat::Svg, ExportFormat::Png]);
        assert_eq!(
            paths,
            vec![
                dir.path().join("dataverse.svg"),
                dir.path().join("dataverse.png")
            ]
        );
        assert_eq!(std::fs::read(&paths[1]).expect("png written"), b"png");
    }

    #[test]
    fn missing_directory_is_a_write_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let graph = RootGraph::new("doc", GraphAttributes::default());
        let mut renderer = Renderer::new(ApproximateMeasure::default(), Theme::default());

        let err = render_to_dir(
            &mut renderer,
            &graph,
            &dir.path().join("absent"),
            "dataverse",
            &[ExportFormat::Svg],
        )
        .expect_err("parent directory does not exist");
        assert!(matches!(err, RenderError::Write { .. }));
    }

    #[test]
    fn default_backend_encodes_svg_text() {
        let graph = RootGraph::new("doc", GraphAttributes::default());
        let mut renderer = Renderer::new(ApproximateMeasure::default(), Theme::default());
        let layout = renderer
            .compute_layout(&graph, Orientation::LeftToRight)
            .expect("layout");
        let bytes = renderer
            .encode(&graph, &layout, ExportFormat::Svg)
            .expect("svg");
        assert!(String::from_utf8(bytes).expect("utf-8").starts_with("<svg"));
    }
}
