use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ThemeError;

const CLASSIC_GRAPH: &str = "#000090";
const CLASSIC_BACKGROUND: &str = "white";
const CLASSIC_CLUSTER: &str = "#7070E0";
const CLASSIC_NODE_FILL: &str = "white";
const CLASSIC_NODE_TEXT: &str = "#ffffff";
const CLASSIC_EDGE: &str = "#000090";
const CLASSIC_FONT: &str = "helvetica";

const BUILTIN_THEMES: &[(&str, &str)] = &[
    ("classic", include_str!("../themes/classic.toml")),
    ("mono", include_str!("../themes/mono.toml")),
];

const FONT_SIZE: f32 = 14.0;
const PEN_WIDTH: f32 = 1.0;
const EDGE_WEIGHT: f32 = 3.0;
const NODE_PADDING_X: f32 = 14.0;
const NODE_PADDING_Y: f32 = 8.0;
const CLUSTER_PADDING: f32 = 16.0;
const NODE_SPACING: f32 = 18.0;
const RANK_SPACING: f32 = 96.0;

/// Diagram-wide styling: root graph defaults, fonts and spacing.
///
/// Per-relationship colors come from the builder's palette and are not
/// part of the theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_graph_color")]
    pub graph_color: String,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_cluster_color")]
    pub cluster_color: String,
    #[serde(default = "default_node_fill")]
    pub node_fill_color: String,
    #[serde(default = "default_node_text")]
    pub node_text_color: String,
    #[serde(default = "default_edge_color")]
    pub edge_color: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,

    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_pen_width")]
    pub pen_width: f32,
    #[serde(default = "default_edge_weight")]
    pub edge_weight: f32,

    #[serde(default = "default_node_padding_x")]
    pub node_padding_x: f32,
    #[serde(default = "default_node_padding_y")]
    pub node_padding_y: f32,
    #[serde(default = "default_cluster_padding")]
    pub cluster_padding: f32,
    #[serde(default = "default_node_spacing")]
    pub node_spacing: f32,
    #[serde(default = "default_rank_spacing")]
    pub rank_spacing: f32,
}

fn default_graph_color() -> String {
    CLASSIC_GRAPH.to_string()
}
fn default_background() -> String {
    CLASSIC_BACKGROUND.to_string()
}
fn default_cluster_color() -> String {
    CLASSIC_CLUSTER.to_string()
}
fn default_node_fill() -> String {
    CLASSIC_NODE_FILL.to_string()
}
fn default_node_text() -> String {
    CLASSIC_NODE_TEXT.to_string()
}
fn default_edge_color() -> String {
    CLASSIC_EDGE.to_string()
}
fn default_font_family() -> String {
    CLASSIC_FONT.to_string()
}
fn default_font_size() -> f32 {
    FONT_SIZE
}
fn default_pen_width() -> f32 {
    PEN_WIDTH
}
fn default_edge_weight() -> f32 {
    EDGE_WEIGHT
}
fn default_node_padding_x() -> f32 {
    NODE_PADDING_X
}
fn default_node_padding_y() -> f32 {
    NODE_PADDING_Y
}
fn default_cluster_padding() -> f32 {
    CLUSTER_PADDING
}
fn default_node_spacing() -> f32 {
    NODE_SPACING
}
fn default_rank_spacing() -> f32 {
    RANK_SPACING
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    pub fn classic() -> Self {
        Theme {
            graph_color: CLASSIC_GRAPH.to_string(),
            background_color: CLASSIC_BACKGROUND.to_string(),
            cluster_color: CLASSIC_CLUSTER.to_string(),
            node_fill_color: CLASSIC_NODE_FILL.to_string(),
            node_text_color: CLASSIC_NODE_TEXT.to_string(),
            edge_color: CLASSIC_EDGE.to_string(),
            font_family: CLASSIC_FONT.to_string(),

            font_size: FONT_SIZE,
            pen_width: PEN_WIDTH,
            edge_weight: EDGE_WEIGHT,

            node_padding_x: NODE_PADDING_X,
            node_padding_y: NODE_PADDING_Y,
            cluster_padding: CLUSTER_PADDING,
            node_spacing: NODE_SPACING,
            rank_spacing: RANK_SPACING,
        }
    }

    pub fn from_builtin(name: &str) -> Result<Self, ThemeError> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        let content = BUILTIN_THEMES
            .iter()
            .find(|(n, _)| *n == normalized)
            .map(|(_, c)| *c)
            .ok_or_else(|| ThemeError::UnknownBuiltin {
                name: name.to_string(),
                available: Self::list_builtins().join(", "),
            })?;
        Self::from_toml(content)
    }

    pub fn list_builtins() -> Vec<&'static str> {
        BUILTIN_THEMES.iter().map(|(n, _)| *n).collect()
    }

    pub fn from_toml(content: &str) -> Result<Self, ThemeError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ThemeError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Resolves `name_or_path` as a theme file when it names an existing file,
    /// otherwise as a built-in theme name.
    pub fn load(name_or_path: &str) -> Result<Self, ThemeError> {
        let path = Path::new(name_or_path);
        if !path.is_file() {
            return Self::from_builtin(name_or_path);
        }

        let content = std::fs::read_to_string(path).map_err(|source| ThemeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_toml(&content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Theme;

    #[test]
    fn from_builtin_accepts_hyphenated_and_case_insensitive_names() {
        let lower = Theme::from_builtin("mono").expect("lowercase variant");
        let upper = Theme::from_builtin(" MONO ").expect("uppercase variant");

        assert_eq!(lower, upper);
        assert_eq!(lower.graph_color, "#303030");
    }

    #[test]
    fn builtin_classic_matches_default() {
        assert_eq!(Theme::from_builtin("classic").expect("classic"), Theme::default());
    }

    #[test]
    fn unknown_builtin_lists_available_themes() {
        let err = Theme::from_builtin("neon").expect_err("neon is not built in");
        let message = err.to_string();
        assert!(message.contains("neon"));
        assert!(message.contains("classic, mono"));
    }

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let theme = Theme::from_yaml("cluster_color: \"#ff0000\"\nfont_size: 11\n").expect("yaml");
        assert_eq!(theme.cluster_color, "#ff0000");
        assert_eq!(theme.font_size, 11.0);
        assert_eq!(theme.graph_color, "#000090");
        assert_eq!(theme.rank_spacing, Theme::default().rank_spacing);
    }
}
