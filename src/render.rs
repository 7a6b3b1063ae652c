use crate::color::Rgb;
use crate::coordinate_system::{layout_bounds, to_pdf_space};
use crate::error::{ExportError, Result};
use crate::text::{encode_win_ansi, truncate, wrap, Font};
use crate::types::{GraphEdge, GraphNode, LayoutConfig, Point, PositionMap};
use ahash::AHashSet as HashSet;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

const TITLE_SIZE: f64 = 24.0;
const DESCRIPTION_SIZE: f64 = 12.0;
const NODE_TITLE_SIZE: f64 = 14.0;
const NODE_TEXT_SIZE: f64 = 11.0;
const LINE_HEIGHT_FACTOR: f64 = 1.15;
const CORNER_RADIUS: f64 = 10.0;
const NODE_TITLE_OFFSET: f64 = 22.0;
const NODE_TEXT_OFFSET: f64 = 40.0;
const NODE_TEXT_PADDING: f64 = 20.0;

const BORDER_COLOR: Rgb = Rgb::gray(60);
const NODE_TEXT_COLOR: Rgb = Rgb::gray(80);
const EDGE_COLOR: Rgb = Rgb::gray(180);
const EDGE_WIDTH: f64 = 2.0;
const HEADER_COLOR: Rgb = Rgb::gray(0);

// Bezier control distance for a quarter circle
const KAPPA: f64 = 0.552_284_75;

/// Title and wrapped description of the document, with the vertical cursor
/// reached after drawing them.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub title: String,
    pub description_lines: Vec<String>,
    /// Top edge of the first tree level
    pub content_top: f64,
}

impl Header {
    pub fn new(title: &str, description: Option<&str>, config: &LayoutConfig) -> Self {
        let margin = config.margin();
        let mut y = margin + TITLE_SIZE;

        let description_lines = match description {
            Some(text) if !text.trim().is_empty() => wrap(
                text,
                Font::Helvetica,
                DESCRIPTION_SIZE,
                config.page_width() - 2.0 * margin,
            ),
            _ => Vec::new(),
        };
        if !description_lines.is_empty() {
            y += 10.0 + description_lines.len() as f64 * DESCRIPTION_SIZE * LINE_HEIGHT_FACTOR;
        }

        Header {
            title: title.to_string(),
            description_lines,
            content_top: y + margin,
        }
    }
}

/// Draws a laid-out roadmap onto a single landscape page and serializes it.
///
/// Nodes without a position are skipped, as are edges with an unpositioned
/// endpoint.
pub fn render(
    title: &str,
    description: Option<&str>,
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    positions: &PositionMap,
    config: &LayoutConfig,
) -> Result<Vec<u8>> {
    let start = std::time::Instant::now();
    let header = Header::new(title, description, config);
    let mut canvas = Canvas::new(config.page_height());

    draw_header(&mut canvas, &header, config);

    if let Some(bounds) = layout_bounds(positions, config) {
        if !bounds.fits_page(config.page_width(), config.page_height()) {
            tracing::warn!(
                width = bounds.width(),
                height = bounds.height(),
                "roadmap layout overflows the page"
            );
        }
    }

    let mut drawn: HashSet<&str> = HashSet::with_capacity(positions.len());
    for node in nodes {
        let Some(position) = positions.get(&node.id) else {
            tracing::debug!(node = %node.id, "skipping node without position");
            continue;
        };
        // First record wins, as in the graph index
        if !drawn.insert(node.id.as_str()) {
            tracing::warn!(node = %node.id, "skipping node with duplicate id");
            continue;
        }
        draw_node(&mut canvas, node, position, config);
    }

    canvas.set_stroke(EDGE_COLOR);
    canvas.set_line_width(EDGE_WIDTH);
    let node_height = config.node_height();
    for edge in edges {
        if let (Some(from), Some(to)) = (positions.get(&edge.source), positions.get(&edge.target)) {
            canvas.line(Point::new(from.x, from.y + node_height), to);
        }
    }

    let bytes = canvas.finish(&header.title, config)?;
    tracing::debug!(
        elapsed = ?start.elapsed(),
        nodes = drawn.len(),
        size = bytes.len(),
        "render: document"
    );
    Ok(bytes)
}

fn draw_header(canvas: &mut Canvas, header: &Header, config: &LayoutConfig) {
    let center_x = config.page_width() / 2.0;
    let mut y = config.margin();

    canvas.set_fill(HEADER_COLOR);
    canvas.text_centered(&header.title, Font::HelveticaBold, TITLE_SIZE, center_x, y);
    y += TITLE_SIZE;

    for line in &header.description_lines {
        canvas.text_centered(line, Font::Helvetica, DESCRIPTION_SIZE, center_x, y);
        y += DESCRIPTION_SIZE * LINE_HEIGHT_FACTOR;
    }
}

fn draw_node(canvas: &mut Canvas, node: &GraphNode, position: Point, config: &LayoutConfig) {
    let width = config.node_width();
    let height = config.node_height();
    let left = position.x - width / 2.0;
    let bg = Rgb::parse_or(node.bg_color_str(), Rgb::gray(0xff));
    let fg = Rgb::parse_or(node.fg_color_str(), Rgb::gray(0x22));

    canvas.set_fill(bg);
    canvas.set_stroke(BORDER_COLOR);
    canvas.set_line_width(1.0);
    canvas.rounded_rect(Point::new(left, position.y), width, height, CORNER_RADIUS);

    canvas.set_fill(fg);
    let baseline = position.y + NODE_TITLE_OFFSET;
    let title = node.display_title();
    let title_width =
        canvas.text_centered(title, Font::HelveticaBold, NODE_TITLE_SIZE, position.x, baseline);
    if let Some(url) = node.resource_url() {
        canvas.link(
            url,
            Point::new(position.x - title_width / 2.0, baseline - NODE_TITLE_SIZE),
            Point::new(position.x + title_width / 2.0, baseline + NODE_TITLE_SIZE * 0.25),
        );
    }

    let snippet = truncate(node.description_text(), config.description_limit());
    if snippet.is_empty() {
        return;
    }
    canvas.set_fill(NODE_TEXT_COLOR);
    let line_height = NODE_TEXT_SIZE * LINE_HEIGHT_FACTOR;
    let bottom = position.y + height - 4.0;
    let mut y = position.y + NODE_TEXT_OFFSET;
    for line in wrap(&snippet, Font::Helvetica, NODE_TEXT_SIZE, width - NODE_TEXT_PADDING) {
        if y > bottom {
            break;
        }
        canvas.text_centered(&line, Font::Helvetica, NODE_TEXT_SIZE, position.x, y);
        y += line_height;
    }
}

#[inline]
fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// Accumulates page content in page space and converts to PDF user space.
struct Canvas {
    page_height: f64,
    operations: Vec<Operation>,
    links: Vec<Dictionary>,
}

impl Canvas {
    fn new(page_height: f64) -> Self {
        Canvas {
            page_height,
            operations: Vec::new(),
            links: Vec::new(),
        }
    }

    fn pdf(&self, point: Point) -> Point {
        to_pdf_space(point, self.page_height)
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }

    fn set_fill(&mut self, color: Rgb) {
        let [r, g, b] = color.components();
        self.op("rg", vec![real(r), real(g), real(b)]);
    }

    fn set_stroke(&mut self, color: Rgb) {
        let [r, g, b] = color.components();
        self.op("RG", vec![real(r), real(g), real(b)]);
    }

    fn set_line_width(&mut self, width: f64) {
        self.op("w", vec![real(width)]);
    }

    fn move_to(&mut self, p: Point) {
        self.op("m", vec![real(p.x), real(p.y)]);
    }

    fn line_to(&mut self, p: Point) {
        self.op("l", vec![real(p.x), real(p.y)]);
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.op(
            "c",
            vec![
                real(c1.x),
                real(c1.y),
                real(c2.x),
                real(c2.y),
                real(p.x),
                real(p.y),
            ],
        );
    }

    /// Filled and stroked rectangle with rounded corners; `top_left` in page
    /// space.
    fn rounded_rect(&mut self, top_left: Point, width: f64, height: f64, radius: f64) {
        let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
        let k = r * KAPPA;
        let left = top_left.x;
        let right = top_left.x + width;
        let top = self.page_height - top_left.y;
        let bottom = top - height;

        self.move_to(Point::new(left + r, bottom));
        self.line_to(Point::new(right - r, bottom));
        self.curve_to(
            Point::new(right - r + k, bottom),
            Point::new(right, bottom + r - k),
            Point::new(right, bottom + r),
        );
        self.line_to(Point::new(right, top - r));
        self.curve_to(
            Point::new(right, top - r + k),
            Point::new(right - r + k, top),
            Point::new(right - r, top),
        );
        self.line_to(Point::new(left + r, top));
        self.curve_to(
            Point::new(left + r - k, top),
            Point::new(left, top - r + k),
            Point::new(left, top - r),
        );
        self.line_to(Point::new(left, bottom + r));
        self.curve_to(
            Point::new(left, bottom + r - k),
            Point::new(left + r - k, bottom),
            Point::new(left + r, bottom),
        );
        self.op("h", vec![]);
        self.op("B", vec![]);
    }

    fn line(&mut self, from: Point, to: Point) {
        let from = self.pdf(from);
        let to = self.pdf(to);
        self.move_to(from);
        self.line_to(to);
        self.op("S", vec![]);
    }

    /// Draws `text` centered on `center_x` with its baseline at `baseline`
    /// (page space) and returns the drawn width.
    fn text_centered(
        &mut self,
        text: &str,
        font: Font,
        size: f64,
        center_x: f64,
        baseline: f64,
    ) -> f64 {
        let width = font.text_width(text, size);
        let origin = self.pdf(Point::new(center_x - width / 2.0, baseline));
        self.op("BT", vec![]);
        self.op("Tf", vec![font.resource_name().into(), real(size)]);
        self.op("Td", vec![real(origin.x), real(origin.y)]);
        self.op(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        );
        self.op("ET", vec![]);
        width
    }

    /// URI link over the page-space rectangle spanned by two corners.
    fn link(&mut self, url: &str, top_left: Point, bottom_right: Point) {
        let lower_left = self.pdf(Point::new(top_left.x, bottom_right.y));
        let upper_right = self.pdf(Point::new(bottom_right.x, top_left.y));
        self.links.push(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => vec![
                real(lower_left.x),
                real(lower_left.y),
                real(upper_right.x),
                real(upper_right.y),
            ],
            "Border" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)],
            "A" => dictionary! {
                "S" => "URI",
                "URI" => Object::String(url.as_bytes().to_vec(), StringFormat::Literal),
            },
        });
    }

    fn finish(self, title: &str, config: &LayoutConfig) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for font in [Font::Helvetica, Font::HelveticaBold] {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource_name(), font_id);
        }
        let resources_id = doc.add_object(dictionary! {
            "Font" => fonts,
        });

        let content = Content {
            operations: self.operations,
        }
        .encode()
        .map_err(ExportError::pdf)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                real(config.page_width()),
                real(config.page_height()),
            ],
        };
        if !self.links.is_empty() {
            let annots: Vec<Object> = self
                .links
                .into_iter()
                .map(|link| Object::Reference(doc.add_object(link)))
                .collect();
            page.set("Annots", annots);
        }
        let page_id = doc.add_object(page);

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(encode_win_ansi(title), StringFormat::Literal),
            "Producer" => Object::string_literal(concat!("roadmap-export ", env!("CARGO_PKG_VERSION"))),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).map_err(ExportError::pdf)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_without_description() {
        let header = Header::new("Rust", None, &LayoutConfig::default());
        assert!(header.description_lines.is_empty());
        assert_eq!(header.content_top, 104.0);
    }

    #[test]
    fn description_pushes_content_down() {
        let config = LayoutConfig::default();
        let short = Header::new("Rust", Some("One line."), &config);
        let long_text = "A much longer description that keeps going. ".repeat(20);
        let long = Header::new("Rust", Some(long_text.as_str()), &config);

        assert_eq!(short.description_lines.len(), 1);
        assert!(long.description_lines.len() > 1);
        assert!(long.content_top > short.content_top);
    }

    #[test]
    fn blank_description_is_ignored() {
        let header = Header::new("Rust", Some("  "), &LayoutConfig::default());
        assert_eq!(header.content_top, 104.0);
    }

    #[test]
    fn rounded_rect_is_closed_filled_path() {
        let mut canvas = Canvas::new(100.0);
        canvas.rounded_rect(Point::new(0.0, 0.0), 50.0, 20.0, 10.0);
        let ops: Vec<&str> = canvas.operations.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(ops.first(), Some(&"m"));
        assert_eq!(&ops[ops.len() - 2..], &["h", "B"]);
        assert_eq!(ops.iter().filter(|op| **op == "c").count(), 4);
    }

    #[test]
    fn line_is_flipped_into_pdf_space() {
        let mut canvas = Canvas::new(100.0);
        canvas.line(Point::new(10.0, 20.0), Point::new(10.0, 80.0));
        let first = &canvas.operations[0];
        assert_eq!(first.operator, "m");
        assert!(matches!(first.operands[1], Object::Real(y) if y == 80.0));
    }

    #[test]
    fn produces_pdf_bytes() {
        let nodes = vec![GraphNode::new("1", "Start")];
        let mut positions = PositionMap::new();
        positions.set(std::sync::Arc::from("1"), Point::new(420.0, 104.0));
        let bytes = render("Demo", None, &nodes, &[], &positions, &LayoutConfig::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
    }
}
