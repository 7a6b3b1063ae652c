use crate::error::Result;
use crate::graph::build_forest;
use crate::layout::layout;
use crate::render::{render, Header};
use crate::types::{Point, PositionMap, RoadmapDocument};
use crate::utils::export_file_name;
use std::path::{Path, PathBuf};

/// A rendered roadmap ready to be handed to the host's save facility.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportedDocument {
    /// Writes the document into `dir` under its export file name.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        tracing::info!(path = %path.display(), size = self.bytes.len(), "saved roadmap");
        Ok(path)
    }
}

/// Positions every node exactly where [`export_roadmap`] draws it.
pub fn layout_roadmap(doc: &RoadmapDocument) -> Result<PositionMap> {
    let config = &doc.layout;
    let forest = build_forest(&doc.nodes, &doc.edges)?;
    let header = Header::new(doc.display_title(), doc.description_text(), config);
    let origin = Point::new(config.page_width() / 2.0, header.content_top);
    Ok(layout(&forest, origin, config))
}

/// Builds the forest, lays it out and renders the PDF in one pass.
pub fn export_roadmap(doc: &RoadmapDocument) -> Result<ExportedDocument> {
    let start = std::time::Instant::now();
    let title = doc.display_title();

    let positions = layout_roadmap(doc)?;
    let bytes = render(
        title,
        doc.description_text(),
        &doc.nodes,
        &doc.edges,
        &positions,
        &doc.layout,
    )?;

    tracing::debug!(
        title,
        nodes = doc.nodes.len(),
        edges = doc.edges.len(),
        elapsed = ?start.elapsed(),
        "exported roadmap"
    );

    Ok(ExportedDocument {
        file_name: export_file_name(title),
        bytes,
    })
}

/// [`export_roadmap`] for a JSON-encoded [`RoadmapDocument`].
pub fn export_roadmap_json(input: &str) -> Result<ExportedDocument> {
    let doc: RoadmapDocument = serde_json::from_str(input)?;
    export_roadmap(&doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GraphEdge, GraphNode};

    #[test]
    fn names_file_after_title() {
        let doc = RoadmapDocument::new("Learn Rust", vec![GraphNode::new("1", "Start")], vec![]);
        let exported = export_roadmap(&doc).unwrap();
        assert_eq!(exported.file_name, "learn_rust_roadmap.pdf");
        assert!(exported.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn untitled_roadmap_fallback() {
        let doc = RoadmapDocument::new("", vec![], vec![]);
        let exported = export_roadmap(&doc).unwrap();
        assert_eq!(exported.file_name, "untitled_roadmap_roadmap.pdf");
    }

    #[test]
    fn layout_starts_below_header() {
        let doc = RoadmapDocument::new(
            "Chain",
            vec![GraphNode::new("1", "Start"), GraphNode::new("2", "End")],
            vec![GraphEdge::new("e", "1", "2")],
        );
        let positions = layout_roadmap(&doc).unwrap();
        let first = positions.get("1").unwrap();
        assert_eq!(first.y, 104.0);
        assert!((first.x - 841.89 / 2.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(export_roadmap_json("{ not json").is_err());
    }
}
