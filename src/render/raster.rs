//! SVG to PNG and PDF conversion.

use std::path::Path;
use std::sync::Arc;

use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use crate::error::RenderError;

const LOCAL_FONTS_DIR: &str = "fonts";

pub fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>, RenderError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(RenderError::InvalidScale(scale));
    }

    let mut opts = usvg::Options::default();
    {
        let fontdb = opts.fontdb_mut();
        fontdb.load_system_fonts();

        let local_fonts = Path::new(LOCAL_FONTS_DIR);
        if local_fonts.is_dir() {
            fontdb.load_fonts_dir(local_fonts);
        }

        let families = fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(family, _)| family.as_str()));
        if let Some(family) = sans_fallback(families) {
            fontdb.set_sans_serif_family(family);
        }
    }

    let tree = usvg::Tree::from_str(svg, &opts).map_err(|e| RenderError::SvgParse(e.to_string()))?;

    let width = (tree.size().width() * scale).ceil() as u32;
    let height = (tree.size().height() * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::PixmapAlloc)?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| RenderError::PngEncode(e.to_string()))
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, RenderError> {
    use svg2pdf::usvg::fontdb;

    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();

    let local_fonts = Path::new(LOCAL_FONTS_DIR);
    if local_fonts.is_dir() {
        fontdb.load_fonts_dir(local_fonts);
    }

    let fallback = sans_fallback(
        fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(family, _)| family.as_str())),
    );
    if let Some(family) = fallback {
        fontdb.set_sans_serif_family(family);
    }

    let mut opts = svg2pdf::usvg::Options::default();
    opts.fontdb = Arc::new(fontdb);

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opts)
        .map_err(|e| RenderError::SvgParse(e.to_string()))?;

    // Text as paths, so viewers without the font still show labels.
    let mut options = svg2pdf::ConversionOptions::default();
    options.embed_text = false;

    svg2pdf::to_pdf(&tree, options, svg2pdf::PageOptions::default())
        .map_err(|e| RenderError::PdfConvert(e.to_string()))
}

/// First installed family whose name mentions "sans", else the first
/// family at all. Diagram text asks for the generic sans-serif family
/// when the themed font is missing.
fn sans_fallback<'a>(families: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut first: Option<&str> = None;
    for family in families {
        if family.to_ascii_lowercase().contains("sans") {
            return Some(family.to_string());
        }
        first.get_or_insert(family);
    }
    first.map(str::to_string)
}
