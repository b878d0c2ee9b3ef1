use super::config::Config;
use super::node::Node;
use super::quadrant::{Quadrant, QueryKind};
use super::query::{Items, Iter};
use crate::error::{QuadtreeError, QuadtreeResult};
use common::shapes::Rectangle;
use tracing::debug;

/// Spatial index over rectangles that answers range queries in descending
/// priority order.
///
/// Items are compared by value when removed. Queries borrow the tree, so it
/// cannot change while a query is being consumed.
#[derive(Debug)]
pub struct PriorityQuadTree<T> {
    extent: Rectangle,
    root: Option<Box<Quadrant<T>>>,
    config: Config,
}

impl<T> PriorityQuadTree<T> {
    pub fn new(extent: Rectangle) -> QuadtreeResult<Self> {
        Self::new_with_config(extent, Config::default())
    }

    pub fn new_with_config(extent: Rectangle, config: Config) -> QuadtreeResult<Self> {
        validate_extent(&extent)?;
        Ok(Self {
            extent,
            root: None,
            config,
        })
    }

    pub fn extent(&self) -> Rectangle {
        self.extent
    }

    /// Changes the extent and rebuilds the tree under it. Every stored item
    /// is kept, including ones outside the old or the new extent.
    pub fn set_extent(&mut self, extent: Rectangle) -> QuadtreeResult<()> {
        validate_extent(&extent)?;
        let old_extent = self.extent;
        self.extent = extent;
        self.reindex();
        debug!(?old_extent, new_extent = ?self.extent, items = self.len(), "reindexed quadtree");
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.count())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores `item` with the given bounds and priority. A NaN priority sorts
    /// last.
    pub fn insert(&mut self, item: T, bounds: Rectangle, priority: f64) -> QuadtreeResult<()> {
        validate_bounds(&bounds)?;
        let priority = if priority.is_nan() {
            f64::NEG_INFINITY
        } else {
            priority
        };
        self.insert_unchecked(item, bounds, priority);
        Ok(())
    }

    fn insert_unchecked(&mut self, item: T, bounds: Rectangle, priority: f64) {
        let extent = self.extent;
        self.root
            .get_or_insert_with(|| Box::new(Quadrant::new(extent)))
            .insert(item, bounds, priority, 1, self.config.max_depth);
    }

    /// Removes `item` wherever it is stored.
    pub fn remove(&mut self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.remove_unchecked(item, &Rectangle::INFINITE)
    }

    /// Removes `item`, only looking in the parts of the tree that `bounds`
    /// touches. Pass the bounds the item was inserted with.
    pub fn remove_within(&mut self, item: &T, bounds: Rectangle) -> QuadtreeResult<bool>
    where
        T: PartialEq,
    {
        validate_bounds(&bounds)?;
        Ok(self.remove_unchecked(item, &bounds))
    }

    fn remove_unchecked(&mut self, item: &T, bounds: &Rectangle) -> bool
    where
        T: PartialEq,
    {
        let Some(root) = self.root.as_deref_mut() else {
            return false;
        };
        root.remove(item, bounds)
    }

    /// Items whose bounds intersect `bounds`, highest priority first.
    pub fn items_intersecting(&self, bounds: Rectangle) -> QuadtreeResult<Items<'_, T>> {
        validate_bounds(&bounds)?;
        Ok(Items::intersecting(self.root.as_deref(), bounds))
    }

    /// Items whose bounds lie fully inside `bounds`, highest priority first.
    pub fn items_inside(&self, bounds: Rectangle) -> QuadtreeResult<Items<'_, T>> {
        validate_bounds(&bounds)?;
        Ok(Items::inside(self.root.as_deref(), bounds))
    }

    pub fn has_items_intersecting(&self, bounds: Rectangle) -> QuadtreeResult<bool> {
        validate_bounds(&bounds)?;
        Ok(self.has_items(&bounds, QueryKind::Intersecting))
    }

    pub fn has_items_inside(&self, bounds: Rectangle) -> QuadtreeResult<bool> {
        validate_bounds(&bounds)?;
        Ok(self.has_items(&bounds, QueryKind::Inside))
    }

    fn has_items(&self, bounds: &Rectangle, kind: QueryKind) -> bool {
        self.root
            .as_deref()
            .is_some_and(|root| root.has_nodes(bounds, kind))
    }

    /// Every stored item in no particular order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.root.as_deref())
    }

    pub fn clear(&mut self) {
        debug!(items = self.len(), "clearing quadtree");
        self.root = None;
    }

    fn reindex(&mut self) {
        let Some(old_root) = self.root.take() else {
            return;
        };
        let mut nodes: Vec<Node<T>> = Vec::new();
        old_root.drain_into(&mut nodes);
        for node in nodes {
            let (item, bounds, priority) = node.into_parts();
            self.insert_unchecked(item, bounds, priority);
        }
    }
}

impl<T> Default for PriorityQuadTree<T> {
    fn default() -> Self {
        Self {
            extent: Rectangle::default(),
            root: None,
            config: Config::default(),
        }
    }
}

impl<'a, T> IntoIterator for &'a PriorityQuadTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[inline(always)]
fn validate_bounds(bounds: &Rectangle) -> QuadtreeResult<()> {
    if bounds.has_nan() {
        return Err(QuadtreeError::NanBounds {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
        });
    }
    Ok(())
}

fn validate_extent(extent: &Rectangle) -> QuadtreeResult<()> {
    if !extent.is_finite() || !extent.is_defined() {
        return Err(QuadtreeError::InvalidExtent {
            x: extent.x,
            y: extent.y,
            width: extent.width,
            height: extent.height,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> PriorityQuadTree<u32> {
        PriorityQuadTree::new(Rectangle::new(0.0, 0.0, 100.0, 100.0)).unwrap()
    }

    fn check(tree: &PriorityQuadTree<u32>) {
        let found = tree.root.as_deref().map_or(0, Quadrant::check_invariants);
        assert_eq!(found, tree.len());
    }

    #[test]
    fn test_root_created_lazily_and_dropped_on_clear() {
        let mut tree = tree();
        assert!(tree.root.is_none());
        tree.insert(1, Rectangle::new(1.0, 1.0, 1.0, 1.0), 1.0).unwrap();
        assert!(tree.root.is_some());
        tree.clear();
        assert!(tree.root.is_none());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_nan_priority_stored_as_negative_infinity() {
        let mut tree = tree();
        tree.insert(1, Rectangle::new(1.0, 1.0, 1.0, 1.0), f64::NAN).unwrap();
        let mut items = tree.items_intersecting(Rectangle::INFINITE).unwrap();
        let node = items.next_node().unwrap();
        assert_eq!(node.priority(), f64::NEG_INFINITY);
        check(&tree);
    }

    #[test]
    fn test_invariants_hold_through_mixed_operations() {
        let mut tree = tree();
        for i in 0..200u32 {
            let offset = f64::from(i % 97);
            let size = f64::from(i % 7) + 0.5;
            tree.insert(i, Rectangle::new(offset, 99.0 - offset, size, size), f64::from(i % 13))
                .unwrap();
        }
        check(&tree);
        for i in (0..200u32).step_by(3) {
            assert!(tree.remove(&i));
        }
        check(&tree);
        tree.set_extent(Rectangle::new(-50.0, -50.0, 300.0, 300.0)).unwrap();
        check(&tree);
        for i in 0..200u32 {
            tree.remove(&i);
        }
        check(&tree);
        assert!(tree.is_empty());
        assert!(tree.root.as_deref().map_or(true, |root| root.children().count() == 0));
    }

    #[test]
    fn test_reindex_of_empty_tree_keeps_root_absent() {
        let mut tree = tree();
        tree.set_extent(Rectangle::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        assert!(tree.root.is_none());
        assert_eq!(tree.extent(), Rectangle::new(0.0, 0.0, 10.0, 10.0));
    }
}
