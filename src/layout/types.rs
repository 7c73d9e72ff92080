//! Data structures for layout computation.

/// A positioned node box in layout space.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: String,
    pub layer: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutNode {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// The complete layout result.
///
/// `nodes` is index-aligned with `GraphModel::nodes`; positions are the only
/// part that changes afterwards (node drag).
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub nodes: Vec<LayoutNode>,
    /// Layer index -> model node indices, top to bottom.
    pub layers: Vec<Vec<usize>>,
    pub width: f64,
    pub height: f64,
}

impl Layout {
    pub fn node(&self, index: usize) -> Option<&LayoutNode> {
        self.nodes.get(index)
    }

    /// Move a node's top-left corner. Returns false for an unknown index.
    pub fn move_node(&mut self, index: usize, x: f64, y: f64) -> bool {
        match self.nodes.get_mut(index) {
            Some(node) => {
                node.x = x;
                node.y = y;
                true
            }
            None => false,
        }
    }
}
