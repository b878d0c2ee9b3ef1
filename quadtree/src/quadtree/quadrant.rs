use super::node::{Node, NodeList};
use common::shapes::Rectangle;
use tracing::trace;

/// Which relation between a stored node's bounds and the query rectangle
/// selects the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QueryKind {
    Intersecting,
    Inside,
}

impl QueryKind {
    #[inline(always)]
    pub(crate) fn matches(self, query: &Rectangle, bounds: &Rectangle) -> bool {
        match self {
            QueryKind::Intersecting => query.intersects(bounds),
            QueryKind::Inside => query.contains(bounds),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Quadrant<T> {
    bounds: Rectangle,
    nodes: NodeList<T>,
    // Top-left, top-right, bottom-left, bottom-right.
    children: [Option<Box<Quadrant<T>>>; 4],
    potential: f64,
    count: usize,
}

impl<T> Quadrant<T> {
    pub(crate) fn new(bounds: Rectangle) -> Self {
        Self {
            bounds,
            nodes: NodeList::new(),
            children: [None, None, None, None],
            potential: f64::NEG_INFINITY,
            count: 0,
        }
    }

    #[inline(always)]
    pub(crate) fn bounds(&self) -> &Rectangle {
        &self.bounds
    }

    /// Highest priority stored anywhere in this subtree.
    #[inline(always)]
    pub(crate) fn potential(&self) -> f64 {
        self.potential
    }

    #[inline(always)]
    pub(crate) fn count(&self) -> usize {
        self.count
    }

    #[inline(always)]
    pub(crate) fn nodes(&self) -> &[Node<T>] {
        self.nodes.as_slice()
    }

    pub(crate) fn children(&self) -> impl Iterator<Item = &Quadrant<T>> {
        self.children.iter().filter_map(|child| child.as_deref())
    }

    /// Stores the item in the deepest quadrant that fully contains `bounds`
    /// and returns the depth it landed at.
    pub(crate) fn insert(
        &mut self,
        item: T,
        bounds: Rectangle,
        priority: f64,
        depth: usize,
        max_depth: usize,
    ) -> usize {
        self.potential = self.potential.max(priority);
        self.count += 1;

        if depth <= max_depth && (bounds.width > 0.0 || bounds.height > 0.0) {
            let splits = self.bounds.quadrants();
            if let Some(slot) = splits.iter().position(|split| split.contains(&bounds)) {
                let child = self.children[slot]
                    .get_or_insert_with(|| Box::new(Quadrant::new(splits[slot])));
                return child.insert(item, bounds, priority, depth + 1, max_depth);
            }
        } else if depth > max_depth {
            trace!(depth, "max depth reached, storing node at current level");
        }

        self.nodes.insert(Node::new(item, bounds, priority));
        depth
    }

    /// Removes the first node holding `item`, searching only children whose
    /// region intersects `bounds`. Children left empty are released.
    pub(crate) fn remove(&mut self, item: &T, bounds: &Rectangle) -> bool
    where
        T: PartialEq,
    {
        let removed = self.nodes.remove(item).is_some() || self.remove_from_children(item, bounds);
        if removed {
            self.count -= 1;
            self.potential = self.calculate_potential();
        }
        removed
    }

    fn remove_from_children(&mut self, item: &T, bounds: &Rectangle) -> bool
    where
        T: PartialEq,
    {
        for slot in self.children.iter_mut() {
            let Some(child) = slot.as_deref_mut() else {
                continue;
            };
            if !child.bounds.intersects(bounds) || !child.remove(item, bounds) {
                continue;
            }
            if child.count == 0 {
                trace!(bounds = ?child.bounds, "releasing empty quadrant");
                *slot = None;
            }
            return true;
        }
        false
    }

    fn calculate_potential(&self) -> f64 {
        self.children()
            .map(Quadrant::potential)
            .fold(self.nodes.head_priority().unwrap_or(f64::NEG_INFINITY), f64::max)
    }

    pub(crate) fn has_nodes(&self, query: &Rectangle, kind: QueryKind) -> bool {
        self.nodes.iter().any(|node| kind.matches(query, node.bounds()))
            || self
                .children()
                .any(|child| child.bounds.intersects(query) && child.has_nodes(query, kind))
    }

    /// Moves every node of this subtree into `out`, in no particular order.
    pub(crate) fn drain_into(mut self, out: &mut Vec<Node<T>>) {
        out.reserve(self.count);
        let mut pending = vec![self.nodes];
        let mut quadrants: Vec<Box<Quadrant<T>>> =
            self.children.iter_mut().filter_map(Option::take).collect();
        while let Some(quadrant) = quadrants.pop() {
            let mut quadrant = *quadrant;
            quadrants.extend(quadrant.children.iter_mut().filter_map(Option::take));
            pending.push(quadrant.nodes);
        }
        for mut nodes in pending {
            nodes.drain_into(out);
        }
    }
}

#[cfg(test)]
impl<T> Quadrant<T> {
    /// Walks the subtree checking the cached statistics and placement rules.
    /// Returns the number of nodes found.
    pub(crate) fn check_invariants(&self) -> usize {
        let own = self.nodes.as_slice();
        assert!(
            own.windows(2).all(|w| w[0].priority() >= w[1].priority()),
            "node list out of order"
        );
        for node in own {
            assert!(!node.priority().is_nan(), "NaN priority stored");
        }

        let mut total = own.len();
        let splits = self.bounds.quadrants();
        for (slot, child) in self.children.iter().enumerate() {
            let Some(child) = child.as_deref() else {
                continue;
            };
            assert_eq!(child.bounds, splits[slot], "child bounds differ from split");
            assert!(child.count > 0, "empty child left in tree");
            for node in child.nodes() {
                assert!(child.bounds.contains(node.bounds()), "node outside its quadrant");
            }
            total += child.check_invariants();
        }

        assert_eq!(self.count, total, "subtree count mismatch");
        let expected = self.calculate_potential();
        assert!(
            self.potential == expected,
            "potential {} != {}",
            self.potential,
            expected
        );
        total
    }
}
