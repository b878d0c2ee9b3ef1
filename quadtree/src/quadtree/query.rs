use super::node::Node;
use super::quadrant::{Quadrant, QueryKind};
use common::shapes::Rectangle;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::iter::FusedIterator;

/// Work counters for a single query.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueryStats {
    /// Quadrants whose merge state was built.
    pub quadrants_opened: usize,
    /// Stored nodes tested against the query rectangle.
    pub nodes_visited: usize,
}

#[derive(Debug, Clone, Copy)]
struct QueryRect {
    rect: Rectangle,
    kind: QueryKind,
}

/// One input of a quadrant's merge.
///
/// Advancing a source yields a node and an upper bound on the priority of
/// whatever the source can still produce. A NaN bound means the source is
/// exhausted.
enum Source<'a, T> {
    Nodes { nodes: &'a [Node<T>], pos: usize },
    Pending(&'a Quadrant<T>),
    Open(Box<Merge<'a, T>>),
    Replay(&'a Node<T>),
}

impl<'a, T> Source<'a, T> {
    fn advance(&mut self, query: &QueryRect, stats: &mut QueryStats) -> Option<(&'a Node<T>, f64)> {
        match self {
            Source::Nodes { nodes, pos } => {
                let nodes: &'a [Node<T>] = *nodes;
                while *pos < nodes.len() {
                    let node = &nodes[*pos];
                    *pos += 1;
                    stats.nodes_visited += 1;
                    if query.kind.matches(&query.rect, node.bounds()) {
                        let next = nodes.get(*pos).map_or(f64::NAN, Node::priority);
                        return Some((node, next));
                    }
                }
                None
            }
            Source::Pending(quadrant) => {
                let quadrant: &'a Quadrant<T> = *quadrant;
                let mut merge = Merge::open(quadrant, query, stats);
                let next = merge.next(query, stats);
                *self = Source::Open(Box::new(merge));
                next
            }
            Source::Open(merge) => merge.next(query, stats),
            Source::Replay(node) => Some((*node, f64::NAN)),
        }
    }
}

struct Ranked<'a, T> {
    bound: f64,
    source: Source<'a, T>,
}

impl<T> PartialEq for Ranked<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Ranked<'_, T> {}

impl<T> PartialOrd for Ranked<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Ranked<'_, T> {
    // Bounds are never NaN once queued.
    fn cmp(&self, other: &Self) -> Ordering {
        self.bound.total_cmp(&other.bound)
    }
}

/// Priority-ordered merge over one quadrant's node list and children.
struct Merge<'a, T> {
    heap: BinaryHeap<Ranked<'a, T>>,
}

impl<'a, T> Merge<'a, T> {
    fn open(quadrant: &'a Quadrant<T>, query: &QueryRect, stats: &mut QueryStats) -> Self {
        stats.quadrants_opened += 1;
        let mut heap = BinaryHeap::with_capacity(5);
        let nodes = quadrant.nodes();
        if let Some(head) = nodes.first() {
            heap.push(Ranked {
                bound: head.priority(),
                source: Source::Nodes { nodes, pos: 0 },
            });
        }
        for child in quadrant.children() {
            if child.bounds().intersects(&query.rect) {
                heap.push(Ranked {
                    bound: child.potential(),
                    source: Source::Pending(child),
                });
            }
        }
        Self { heap }
    }

    /// Returns the next node in priority order along with an upper bound on
    /// everything this merge has left, or NaN when nothing is left.
    fn next(&mut self, query: &QueryRect, stats: &mut QueryStats) -> Option<(&'a Node<T>, f64)> {
        while let Some(Ranked { mut source, .. }) = self.heap.pop() {
            let Some((node, next_bound)) = source.advance(query, stats) else {
                continue;
            };
            let bound = match self.heap.peek() {
                Some(top) if next_bound.is_nan() => top.bound,
                Some(top) => next_bound.max(top.bound),
                None => next_bound,
            };
            if !next_bound.is_nan() {
                self.heap.push(Ranked {
                    bound: next_bound,
                    source,
                });
            }
            if bound > node.priority() {
                // Something still queued may outrank this node; park it until
                // it is the best bound left.
                self.heap.push(Ranked {
                    bound: node.priority(),
                    source: Source::Replay(node),
                });
                continue;
            }
            return Some((node, bound));
        }
        None
    }
}

/// Lazy, priority-ordered result of a range query.
///
/// Items come out with non-increasing priority. Each call to `next` does a
/// bounded amount of work, so taking only the first few results costs much
/// less than draining the query.
pub struct Items<'a, T> {
    query: QueryRect,
    merge: Option<Merge<'a, T>>,
    stats: QueryStats,
}

impl<'a, T> Items<'a, T> {
    pub(crate) fn new(root: Option<&'a Quadrant<T>>, rect: Rectangle, kind: QueryKind) -> Self {
        let query = QueryRect { rect, kind };
        let mut stats = QueryStats::default();
        let merge = root.map(|root| Merge::open(root, &query, &mut stats));
        Self {
            query,
            merge,
            stats,
        }
    }

    pub(crate) fn intersecting(root: Option<&'a Quadrant<T>>, rect: Rectangle) -> Self {
        Self::new(root, rect, QueryKind::Intersecting)
    }

    pub(crate) fn inside(root: Option<&'a Quadrant<T>>, rect: Rectangle) -> Self {
        Self::new(root, rect, QueryKind::Inside)
    }

    pub fn stats(&self) -> QueryStats {
        self.stats
    }

    /// Like `next`, but yields the whole stored node.
    pub fn next_node(&mut self) -> Option<&'a Node<T>> {
        let merge = self.merge.as_mut()?;
        match merge.next(&self.query, &mut self.stats) {
            Some((node, _)) => Some(node),
            None => {
                self.merge = None;
                None
            }
        }
    }
}

impl<'a, T> Iterator for Items<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_node().map(Node::item)
    }
}

impl<T> FusedIterator for Items<'_, T> {}

impl<T> std::fmt::Debug for Items<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Items")
            .field("query", &self.query)
            .field("stats", &self.stats)
            .field("done", &self.merge.is_none())
            .finish()
    }
}

/// Every stored item, breadth first, in no particular priority order.
pub struct Iter<'a, T> {
    quadrants: VecDeque<&'a Quadrant<T>>,
    nodes: std::slice::Iter<'a, Node<T>>,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(root: Option<&'a Quadrant<T>>) -> Self {
        Self {
            quadrants: root.into_iter().collect(),
            nodes: <&'a [Node<T>]>::default().iter(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.nodes.next() {
                return Some(node.item());
            }
            let quadrant = self.quadrants.pop_front()?;
            self.quadrants.extend(quadrant.children());
            self.nodes = quadrant.nodes().iter();
        }
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> std::fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Iter")
            .field("pending_quadrants", &self.quadrants.len())
            .field("pending_nodes", &self.nodes.len())
            .finish()
    }
}
