use common::shapes::Rectangle;
use smallvec::SmallVec;

/// A stored item together with its bounds and priority.
#[derive(Debug, Clone)]
pub struct Node<T> {
    item: T,
    bounds: Rectangle,
    priority: f64,
}

impl<T> Node<T> {
    pub(crate) fn new(item: T, bounds: Rectangle, priority: f64) -> Self {
        debug_assert!(!priority.is_nan());
        Self {
            item,
            bounds,
            priority,
        }
    }

    pub fn item(&self) -> &T {
        &self.item
    }

    pub fn bounds(&self) -> &Rectangle {
        &self.bounds
    }

    pub fn priority(&self) -> f64 {
        self.priority
    }

    pub(crate) fn into_parts(self) -> (T, Rectangle, f64) {
        (self.item, self.bounds, self.priority)
    }
}

/// Nodes of one quadrant in descending priority order.
///
/// Index 0 is the head (highest priority), the last entry is the tail.
/// Inserting below the tail is an append; anything else scans forward from
/// the head for its slot, so inserts are linear in the worst case.
#[derive(Debug)]
pub(crate) struct NodeList<T> {
    nodes: SmallVec<[Node<T>; 4]>,
}

impl<T> NodeList<T> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: SmallVec::new(),
        }
    }

    #[inline(always)]
    pub(crate) fn as_slice(&self) -> &[Node<T>] {
        &self.nodes
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, Node<T>> {
        self.nodes.iter()
    }

    #[inline(always)]
    pub(crate) fn head_priority(&self) -> Option<f64> {
        self.nodes.first().map(Node::priority)
    }

    pub(crate) fn insert(&mut self, node: Node<T>) {
        let idx = match self.nodes.last() {
            None => 0,
            Some(tail) if node.priority < tail.priority => self.nodes.len(),
            // Equal priorities go in front of the existing ones.
            Some(_) => self
                .nodes
                .iter()
                .position(|n| node.priority >= n.priority)
                .unwrap_or(self.nodes.len()),
        };
        self.nodes.insert(idx, node);
    }

    pub(crate) fn remove(&mut self, item: &T) -> Option<Node<T>>
    where
        T: PartialEq,
    {
        let idx = self.nodes.iter().position(|n| n.item == *item)?;
        Some(self.nodes.remove(idx))
    }

    pub(crate) fn drain_into(&mut self, out: &mut Vec<Node<T>>) {
        out.extend(self.nodes.drain(..));
    }
}
