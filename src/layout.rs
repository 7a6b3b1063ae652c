use crate::graph::Forest;
use crate::types::{LayoutConfig, Point, PositionMap};

/// Computes a non-overlapping position for every node of `forest`.
///
/// `origin.x` is the horizontal center the whole forest is balanced around and
/// `origin.y` is the top edge of the first level. Subtree widths are measured
/// bottom-up once, then nodes are placed top-down: every parent sits centered
/// over the span of its children and sibling subtrees are separated by
/// `sibling_gap`.
///
/// A node with several parents is laid out under each of them, and the
/// placement reached last in left-to-right pre-order is the one kept.
pub fn layout(forest: &Forest<'_>, origin: Point, config: &LayoutConfig) -> PositionMap {
    let start = std::time::Instant::now();

    let widths = measure(forest, config);
    tracing::debug!(elapsed = ?start.elapsed(), "layout: measure");

    let sibling_gap = config.sibling_gap();
    let root_widths: Vec<f64> = forest.roots().iter().map(|&r| widths[r]).collect();
    let total_width = if root_widths.is_empty() {
        0.0
    } else {
        root_widths.iter().sum::<f64>() + sibling_gap * (root_widths.len() - 1) as f64
    };

    // Root centers, left to right
    let mut roots = Vec::with_capacity(root_widths.len());
    let mut cursor = origin.x - total_width / 2.0;
    for (&root, width) in forest.roots().iter().zip(&root_widths) {
        roots.push((root, Point::new(cursor + width / 2.0, origin.y)));
        cursor += width + sibling_gap;
    }

    let step_start = std::time::Instant::now();
    let positions = place(forest, &widths, roots, config);
    tracing::debug!(
        elapsed = ?step_start.elapsed(),
        total = ?start.elapsed(),
        nodes = positions.len(),
        forest_width = total_width,
        "layout: place"
    );

    positions
}

/// Occupied width of every subtree, indexed like the forest arena.
///
/// A shared node has the same width under every parent, so each slot is
/// measured once.
pub fn measure(forest: &Forest<'_>, config: &LayoutConfig) -> Vec<f64> {
    let node_width = config.node_width();
    let sibling_gap = config.sibling_gap();
    let mut widths = vec![0.0; forest.nodes().len()];

    for &index in forest.post_order() {
        let tree_node = forest.get(index);
        widths[index] = if tree_node.children.is_empty() {
            node_width
        } else {
            let total = children_width(&tree_node.children, &widths, sibling_gap);
            total.max(node_width)
        };
    }

    widths
}

fn children_width(children: &[usize], widths: &[f64], sibling_gap: f64) -> f64 {
    children.iter().map(|&c| widths[c]).sum::<f64>() + sibling_gap * (children.len() - 1) as f64
}

// Mirrored pre-order, rightmost child first: a node's first visit here is its
// last in left-to-right pre-order. Later visits are skipped with their subtrees.
fn place(
    forest: &Forest<'_>,
    widths: &[f64],
    roots: Vec<(usize, Point)>,
    config: &LayoutConfig,
) -> PositionMap {
    let level_step = config.node_height() + config.level_gap();
    let sibling_gap = config.sibling_gap();
    let mut centers: Vec<Option<Point>> = vec![None; forest.nodes().len()];
    let mut stack = roots;

    while let Some((index, center)) = stack.pop() {
        if centers[index].is_some() {
            continue;
        }
        centers[index] = Some(center);

        let tree_node = forest.get(index);
        if tree_node.children.is_empty() {
            continue;
        }
        let total = children_width(&tree_node.children, widths, sibling_gap);
        let child_y = center.y + level_step;
        let mut child_x = center.x - total / 2.0;
        for &child in &tree_node.children {
            stack.push((child, Point::new(child_x + widths[child] / 2.0, child_y)));
            child_x += widths[child] + sibling_gap;
        }
    }

    let mut positions = PositionMap::new();
    for (tree_node, center) in forest.nodes().iter().zip(centers) {
        if let Some(center) = center {
            positions.set(tree_node.id.clone(), center);
        }
    }
    positions
}
