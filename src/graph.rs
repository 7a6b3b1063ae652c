use crate::error::{ExportError, Result};
use crate::types::{GraphEdge, GraphNode};
use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use indexmap::IndexMap;
use std::sync::Arc;

// Helper function to convert &str to Arc<str>
#[inline]
pub(crate) fn arc_str(s: &str) -> Arc<str> {
    Arc::from(s)
}

/// Id-indexed view over one export call's nodes and edges.
///
/// Only edges whose endpoints both exist contribute children; every edge
/// target still counts when deciding which nodes are roots.
#[derive(Debug)]
pub struct RoadmapGraph<'a> {
    nodes: IndexMap<Arc<str>, &'a GraphNode>,
    children: HashMap<Arc<str>, Vec<Arc<str>>>,
    targets: HashSet<Arc<str>>,
}

impl<'a> RoadmapGraph<'a> {
    pub fn new(nodes: &'a [GraphNode], edges: &[GraphEdge]) -> Self {
        let mut index: IndexMap<Arc<str>, &'a GraphNode> = IndexMap::with_capacity(nodes.len());
        for node in nodes {
            if index.contains_key(node.id.as_str()) {
                tracing::warn!(node = %node.id, "skipping node with duplicate id");
                continue;
            }
            index.insert(arc_str(&node.id), node);
        }

        let mut children: HashMap<Arc<str>, Vec<Arc<str>>> = index
            .keys()
            .map(|id| (id.clone(), Vec::new()))
            .collect();
        let mut targets = HashSet::with_capacity(edges.len());

        for edge in edges {
            targets.insert(arc_str(&edge.target));

            let target = match index.get_key_value(edge.target.as_str()) {
                Some((id, _)) if index.contains_key(edge.source.as_str()) => id.clone(),
                _ => {
                    tracing::debug!(
                        edge = %edge.id,
                        source = %edge.source,
                        target = %edge.target,
                        "skipping edge with missing endpoint"
                    );
                    continue;
                }
            };
            if let Some(list) = children.get_mut(edge.source.as_str()) {
                list.push(target);
            }
        }

        RoadmapGraph {
            nodes: index,
            children,
            targets,
        }
    }

    pub fn node(&self, id: &str) -> Option<&'a GraphNode> {
        self.nodes.get(id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn children(&self, id: &str) -> &[Arc<str>] {
        self.children.get(id).map_or(&[], |list| list.as_slice())
    }

    /// Nodes no edge points at, in input order.
    pub fn roots(&self) -> Vec<Arc<str>> {
        self.nodes
            .keys()
            .filter(|id| !self.targets.contains(*id))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct TreeNode<'a> {
    pub id: Arc<str>,
    pub node: &'a GraphNode,
    /// Arena indexes, in edge order
    pub children: Vec<usize>,
}

/// Trees rooted at every inferred root, stored in one arena.
///
/// Every node id occupies a single slot. A node reached along several paths
/// is listed as a child by each of its parents, so the arena is a DAG whose
/// unfolding from the roots is the implied forest.
#[derive(Debug, Clone, Default)]
pub struct Forest<'a> {
    nodes: Vec<TreeNode<'a>>,
    roots: Vec<usize>,
    post_order: Vec<usize>,
    unrooted: Vec<String>,
}

impl<'a> Forest<'a> {
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn get(&self, index: usize) -> &TreeNode<'a> {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[TreeNode<'a>] {
        &self.nodes
    }

    /// Arena indexes with every child ahead of all its parents.
    pub fn post_order(&self) -> &[usize] {
        &self.post_order
    }

    pub fn root_ids(&self) -> Vec<&str> {
        self.roots.iter().map(|&i| self.nodes[i].id.as_ref()).collect()
    }

    pub fn child_ids(&self, index: usize) -> Vec<&str> {
        self.nodes[index]
            .children
            .iter()
            .map(|&c| self.nodes[c].id.as_ref())
            .collect()
    }

    /// Node ids that belong to no tree and will not be drawn.
    pub fn unrooted(&self) -> &[String] {
        &self.unrooted
    }

    pub fn tree_count(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

enum Visit {
    Enter(Arc<str>),
    Exit(usize),
}

/// Reconstructs the implied forest of a roadmap graph.
///
/// Fails with [`ExportError::CyclicInput`] when a node is its own ancestor,
/// whether the cycle hangs off a root or has no way in at all.
pub fn build_forest<'a>(nodes: &'a [GraphNode], edges: &[GraphEdge]) -> Result<Forest<'a>> {
    let graph = RoadmapGraph::new(nodes, edges);
    let mut forest = Forest::default();
    let mut slots: HashMap<Arc<str>, usize> = HashMap::with_capacity(graph.node_count());
    let mut path: HashSet<Arc<str>> = HashSet::new();

    for root in graph.roots() {
        let mut stack = vec![Visit::Enter(root.clone())];

        while let Some(item) = stack.pop() {
            match item {
                Visit::Exit(index) => {
                    path.remove(&forest.nodes[index].id);
                    forest.post_order.push(index);
                }
                Visit::Enter(id) => {
                    if slots.contains_key(&id) {
                        continue;
                    }
                    let Some(node) = graph.node(&id) else {
                        continue;
                    };

                    let index = forest.nodes.len();
                    forest.nodes.push(TreeNode {
                        id: id.clone(),
                        node,
                        children: Vec::new(),
                    });
                    slots.insert(id.clone(), index);
                    path.insert(id.clone());
                    stack.push(Visit::Exit(index));

                    for child in graph.children(&id).iter().rev() {
                        if path.contains(child) {
                            return Err(ExportError::CyclicInput {
                                node: child.to_string(),
                            });
                        }
                        stack.push(Visit::Enter(child.clone()));
                    }
                }
            }
        }

        if let Some(&index) = slots.get(&root) {
            forest.roots.push(index);
        }
    }

    // Every child of a reached node was reached too
    for tree_node in &mut forest.nodes {
        tree_node.children = graph
            .children(&tree_node.id)
            .iter()
            .filter_map(|child| slots.get(child).copied())
            .collect();
    }

    let unrooted: Vec<Arc<str>> = graph
        .nodes
        .keys()
        .filter(|id| !slots.contains_key(*id))
        .cloned()
        .collect();

    if !unrooted.is_empty() {
        if let Some(node) = find_cycle(&graph, &unrooted) {
            return Err(ExportError::CyclicInput { node });
        }
        tracing::warn!(
            count = unrooted.len(),
            nodes = ?unrooted,
            "nodes only reachable through dangling edges are left out"
        );
        forest.unrooted = unrooted.iter().map(|id| id.to_string()).collect();
    }

    tracing::debug!(
        trees = forest.roots.len(),
        tree_nodes = forest.nodes.len(),
        "built forest"
    );

    Ok(forest)
}

enum StackItem {
    Node(Arc<str>),
    Exit(Arc<str>),
}

// Depth-first search limited to nodes no root reached
fn find_cycle(graph: &RoadmapGraph<'_>, candidates: &[Arc<str>]) -> Option<String> {
    let mut visited: HashSet<Arc<str>> = HashSet::new();
    let mut path: HashSet<Arc<str>> = HashSet::new();
    let mut stack: Vec<StackItem> = candidates
        .iter()
        .rev()
        .map(|id| StackItem::Node(id.clone()))
        .collect();

    while let Some(item) = stack.pop() {
        match item {
            StackItem::Exit(v) => {
                path.remove(&v);
            }
            StackItem::Node(v) => {
                if visited.contains(&v) {
                    continue;
                }
                visited.insert(v.clone());
                path.insert(v.clone());
                stack.push(StackItem::Exit(v.clone()));

                for w in graph.children(&v).iter().rev() {
                    if path.contains(w) {
                        return Some(w.to_string());
                    }
                    stack.push(StackItem::Node(w.clone()));
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(ids: &[&str]) -> Vec<GraphNode> {
        ids.iter().map(|id| GraphNode::new(*id, *id)).collect()
    }

    fn edges(pairs: &[(&str, &str)]) -> Vec<GraphEdge> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, (s, t))| GraphEdge::new(format!("e{}", i), *s, *t))
            .collect()
    }

    #[test]
    fn chain_has_single_root() {
        let n = nodes(&["A", "B", "C"]);
        let e = edges(&[("A", "B"), ("B", "C")]);
        let forest = build_forest(&n, &e).unwrap();

        assert_eq!(forest.root_ids(), vec!["A"]);
        let a = forest.roots()[0];
        assert_eq!(forest.child_ids(a), vec!["B"]);
        let b = forest.get(a).children[0];
        assert_eq!(forest.child_ids(b), vec!["C"]);
        assert!(forest.get(forest.get(b).children[0]).children.is_empty());
    }

    #[test]
    fn disconnected_graph_keeps_node_order() {
        let n = nodes(&["A", "B", "C", "D"]);
        let e = edges(&[("A", "B"), ("C", "D")]);
        let forest = build_forest(&n, &e).unwrap();
        assert_eq!(forest.root_ids(), vec!["A", "C"]);
    }

    #[test]
    fn children_follow_edge_order() {
        let n = nodes(&["R", "X", "Y", "Z"]);
        let e = edges(&[("R", "Z"), ("R", "X"), ("R", "Y")]);
        let forest = build_forest(&n, &e).unwrap();
        assert_eq!(forest.child_ids(forest.roots()[0]), vec!["Z", "X", "Y"]);
    }

    #[test]
    fn isolated_nodes_are_roots() {
        let n = nodes(&["A", "B"]);
        let forest = build_forest(&n, &[]).unwrap();
        assert_eq!(forest.root_ids(), vec!["A", "B"]);
    }

    #[test]
    fn dangling_target_is_ignored() {
        let n = nodes(&["A", "B"]);
        let e = edges(&[("A", "B"), ("A", "ghost")]);
        let forest = build_forest(&n, &e).unwrap();
        assert_eq!(forest.child_ids(forest.roots()[0]), vec!["B"]);
        assert!(forest.unrooted().is_empty());
    }

    #[test]
    fn dangling_source_leaves_target_unrooted() {
        let n = nodes(&["A", "B"]);
        let e = edges(&[("ghost", "B")]);
        let forest = build_forest(&n, &e).unwrap();
        assert_eq!(forest.root_ids(), vec!["A"]);
        assert_eq!(forest.unrooted(), ["B".to_string()]);
    }

    #[test]
    fn diamond_shares_the_joined_node() {
        let n = nodes(&["A", "B", "C", "D"]);
        let e = edges(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
        let forest = build_forest(&n, &e).unwrap();

        let d_count = forest.nodes().iter().filter(|t| t.id.as_ref() == "D").count();
        assert_eq!(d_count, 1);
        let a = forest.roots()[0];
        for parent in forest.get(a).children.iter() {
            assert_eq!(forest.child_ids(*parent), vec!["D"]);
        }
    }

    #[test]
    fn post_order_puts_children_first() {
        let n = nodes(&["A", "B", "C", "D"]);
        let e = edges(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
        let forest = build_forest(&n, &e).unwrap();

        let order = forest.post_order();
        assert_eq!(order.len(), 4);
        let rank = |i: usize| order.iter().position(|&o| o == i).unwrap();
        for (index, tree_node) in forest.nodes().iter().enumerate() {
            for &child in &tree_node.children {
                assert!(rank(child) < rank(index));
            }
        }
    }

    #[test]
    fn layered_shared_steps_stay_one_slot_per_node() {
        // root, then 30 levels of two nodes each linked to both nodes below
        let mut n = nodes(&["root"]);
        let mut e = Vec::new();
        let mut previous = vec!["root".to_string()];
        for level in 0..30 {
            let current: Vec<String> = (0..2).map(|i| format!("L{}-{}", level, i)).collect();
            for id in &current {
                n.push(GraphNode::new(id.clone(), id.clone()));
            }
            for source in &previous {
                for target in &current {
                    let id = format!("e{}", e.len());
                    e.push(GraphEdge::new(id, source.clone(), target.clone()));
                }
            }
            previous = current;
        }

        let forest = build_forest(&n, &e).unwrap();
        assert_eq!(forest.nodes().len(), n.len());
        assert_eq!(forest.post_order().len(), n.len());
    }

    #[test]
    fn duplicate_id_keeps_first_record() {
        let mut n = nodes(&["A", "B"]);
        n.push(GraphNode::new("A", "Second A"));
        let graph = RoadmapGraph::new(&n, &[]);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.node("A").unwrap().display_title(), "A");

        let forest = build_forest(&n, &[]).unwrap();
        assert_eq!(forest.root_ids(), vec!["A", "B"]);
    }

    #[test]
    fn pure_cycle_is_reported() {
        let n = nodes(&["A", "B"]);
        let e = edges(&[("A", "B"), ("B", "A")]);
        let err = build_forest(&n, &e).unwrap_err();
        assert!(matches!(err, ExportError::CyclicInput { .. }));
    }

    #[test]
    fn cycle_below_root_is_reported() {
        let n = nodes(&["R", "A", "B"]);
        let e = edges(&[("R", "A"), ("A", "B"), ("B", "A")]);
        match build_forest(&n, &e) {
            Err(ExportError::CyclicInput { node }) => assert_eq!(node, "A"),
            other => panic!("expected cycle error, got {:?}", other.map(|f| f.root_ids().len())),
        }
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let n = nodes(&["R", "A"]);
        let e = edges(&[("R", "A"), ("A", "A")]);
        assert!(build_forest(&n, &e).is_err());
    }
}
