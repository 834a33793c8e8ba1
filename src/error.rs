use std::path::PathBuf;

/// Defects in the assembly code itself. Either one halts the current build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("precondition violated: `{argument}` must be present before edge creation")]
    PreconditionViolated { argument: &'static str },
    #[error("failed to construct diagram element: {detail}")]
    ResultConstruction { detail: String },
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to parse SVG: {0}")]
    SvgParse(String),
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG: {0}")]
    PngEncode(String),
    #[error("failed to convert SVG to PDF: {0}")]
    PdfConvert(String),
    #[error("invalid raster scale {0} (must be finite and greater than zero)")]
    InvalidScale(f32),
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("failed to read metadata file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON metadata: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML metadata: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid TOML metadata: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unsupported metadata format `{0}` (use .json, .yaml, .yml or .toml)")]
    UnsupportedFormat(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("unknown built-in theme '{name}'. Available: {available}")]
    UnknownBuiltin { name: String, available: String },
    #[error("failed to read theme file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse theme TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse theme YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error(transparent)]
    Theme(#[from] ThemeError),
    #[error("failed to create output directory {path}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
