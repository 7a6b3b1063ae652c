use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

pub const DEFAULT_BG_COLOR: &str = "#ffffff";
pub const DEFAULT_FG_COLOR: &str = "#222222";
pub const UNTITLED_NODE: &str = "Untitled";
pub const UNTITLED_ROADMAP: &str = "Untitled Roadmap";

// Resource classification shown in the editor; layout ignores it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Video,
    Article,
    Quiz,
    #[default]
    #[serde(other)]
    Other,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Video => "video",
            NodeKind::Article => "article",
            NodeKind::Quiz => "quiz",
            NodeKind::Other => "other",
        }
    }
}

// Point in page space: origin top-left, y grows downwards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// One roadmap step with its display and style metadata.
///
/// Any position stored alongside the node by the editor is ignored: the
/// layout engine is the only source of rendered coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(
        default,
        alias = "bgcolor",
        alias = "bgColor",
        skip_serializing_if = "Option::is_none"
    )]
    pub bg_color: Option<String>,
    #[serde(
        default,
        alias = "fontcolor",
        alias = "fontColor",
        skip_serializing_if = "Option::is_none"
    )]
    pub fg_color: Option<String>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        GraphNode {
            id: id.into(),
            title: Some(title.into()),
            description: None,
            kind: NodeKind::Other,
            resource: None,
            bg_color: None,
            fg_color: None,
        }
    }

    pub fn display_title(&self) -> &str {
        non_blank(&self.title).unwrap_or(UNTITLED_NODE)
    }

    pub fn description_text(&self) -> &str {
        non_blank(&self.description).unwrap_or("")
    }

    pub fn resource_url(&self) -> Option<&str> {
        non_blank(&self.resource)
    }

    pub fn bg_color_str(&self) -> &str {
        non_blank(&self.bg_color).unwrap_or(DEFAULT_BG_COLOR)
    }

    pub fn fg_color_str(&self) -> &str {
        non_blank(&self.fg_color).unwrap_or(DEFAULT_FG_COLOR)
    }
}

/// Directed connection between two node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(alias = "source_node_id", deserialize_with = "null_as_empty")]
    pub source: String,
    #[serde(alias = "target_node_id", deserialize_with = "null_as_empty")]
    pub target: String,
}

impl GraphEdge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        GraphEdge {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

// Layout and page options; unset fields fall back to the defaults below
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_gap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sibling_gap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_limit: Option<usize>,
}

impl LayoutConfig {
    pub fn node_width(&self) -> f64 {
        self.node_width.unwrap_or(160.0)
    }

    pub fn node_height(&self) -> f64 {
        self.node_height.unwrap_or(60.0)
    }

    pub fn level_gap(&self) -> f64 {
        self.level_gap.unwrap_or(80.0)
    }

    pub fn sibling_gap(&self) -> f64 {
        self.sibling_gap.unwrap_or(40.0)
    }

    // A4 landscape in points
    pub fn page_width(&self) -> f64 {
        self.page_width.unwrap_or(841.89)
    }

    pub fn page_height(&self) -> f64 {
        self.page_height.unwrap_or(595.28)
    }

    pub fn margin(&self) -> f64 {
        self.margin.unwrap_or(40.0)
    }

    pub fn description_limit(&self) -> usize {
        self.description_limit.unwrap_or(80)
    }
}

/// Node id to rendered position.
///
/// `x` is the horizontal center of the node box and `y` its top edge.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionMap {
    positions: IndexMap<Arc<str>, Point>,
}

impl PositionMap {
    pub fn new() -> Self {
        PositionMap::default()
    }

    pub(crate) fn set(&mut self, id: Arc<str>, point: Point) {
        self.positions.insert(id, point);
    }

    pub fn get(&self, id: &str) -> Option<Point> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Point)> {
        self.positions.iter().map(|(id, p)| (id.as_ref(), *p))
    }
}

/// A complete export request: roadmap metadata plus its graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
    #[serde(default)]
    pub layout: LayoutConfig,
}

impl RoadmapDocument {
    pub fn new(title: impl Into<String>, nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        RoadmapDocument {
            title: title.into(),
            description: None,
            nodes,
            edges,
            layout: LayoutConfig::default(),
        }
    }

    pub fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() {
            UNTITLED_ROADMAP
        } else {
            title
        }
    }

    pub fn description_text(&self) -> Option<&str> {
        non_blank(&self.description)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

// Hosted-store rows carry nullable endpoint ids
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_accepts_store_row_shape() {
        let node: GraphNode = serde_json::from_str(
            r##"{"id":"n1","title":"Rust","type":"video","bgcolor":"#ff0000",
                "fontcolor":"#00ff00","position_x":10,"position_y":20,"resource":""}"##,
        )
        .unwrap();
        assert_eq!(node.kind, NodeKind::Video);
        assert_eq!(node.bg_color_str(), "#ff0000");
        assert_eq!(node.fg_color_str(), "#00ff00");
        assert_eq!(node.resource_url(), None);
    }

    #[test]
    fn node_defaults() {
        let node: GraphNode = serde_json::from_str(r#"{"id":"n1","type":"podcast"}"#).unwrap();
        assert_eq!(node.kind, NodeKind::Other);
        assert_eq!(node.display_title(), UNTITLED_NODE);
        assert_eq!(node.description_text(), "");
        assert_eq!(node.bg_color_str(), DEFAULT_BG_COLOR);
        assert_eq!(node.fg_color_str(), DEFAULT_FG_COLOR);
    }

    #[test]
    fn edge_with_null_endpoint() {
        let edge: GraphEdge = serde_json::from_str(
            r#"{"id":"e1","source_node_id":"a","target_node_id":null}"#,
        )
        .unwrap();
        assert_eq!(edge.source, "a");
        assert_eq!(edge.target, "");
    }

    #[test]
    fn layout_config_defaults_fill_missing_fields() {
        let config: LayoutConfig = serde_json::from_str(r#"{"node_width":200}"#).unwrap();
        assert_eq!(config.node_width(), 200.0);
        assert_eq!(config.node_height(), 60.0);
        assert_eq!(config.sibling_gap(), 40.0);
        assert_eq!(config.description_limit(), 80);
    }

    #[test]
    fn blank_roadmap_title() {
        let doc = RoadmapDocument::new("   ", vec![], vec![]);
        assert_eq!(doc.display_title(), UNTITLED_ROADMAP);
    }
}
