//! Id-keyed storage for one image's annotations with a mirrored list.

use crate::constants::{CORNER_HIT_TOLERANCE, SEED_HIT_RADIUS};
use crate::geometry::transform;
use crate::geometry::{Corner, Point, Rect, Size};
use crate::model::{AnnotationItem, BoxAnnotation, SeedPoint};

/// Stable identifier linking an annotation entity to its list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(u32);

/// A row in the mirrored display/labeling list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub item: ItemId,
    pub text: String,
}

/// All annotation entities for the current image, plus the mirrored list
/// the UI shows for selection and labeling.
///
/// Entities and list entries are paired by [`ItemId`] rather than by live
/// back-pointers; insertion and removal update both sides in one call, so
/// the two collections cannot drift apart.
#[derive(Debug, Default)]
pub struct AnnotationSet {
    next_id: u32,
    items: Vec<(ItemId, AnnotationItem)>,
    entries: Vec<ListEntry>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, item: AnnotationItem) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        self.entries.push(ListEntry {
            item: id,
            text: item.list_text(),
        });
        self.items.push((id, item));
        id
    }

    pub fn insert_box(&mut self, annotation: BoxAnnotation) -> ItemId {
        self.insert(AnnotationItem::Box(annotation))
    }

    pub fn insert_seed(&mut self, seed: SeedPoint) -> ItemId {
        self.insert(AnnotationItem::Seed(seed))
    }

    /// Remove an item and its mirrored entry in one transaction.
    pub fn remove(&mut self, id: ItemId) -> Option<AnnotationItem> {
        let index = self.items.iter().position(|(i, _)| *i == id)?;
        self.entries.retain(|e| e.item != id);
        Some(self.items.remove(index).1)
    }

    /// Remove by list row, deleting the underlying entity as well.
    pub fn remove_entry(&mut self, row: usize) -> Option<AnnotationItem> {
        let id = self.entries.get(row)?.item;
        self.remove(id)
    }

    pub fn get(&self, id: ItemId) -> Option<&AnnotationItem> {
        self.items.iter().find(|(i, _)| *i == id).map(|(_, item)| item)
    }

    fn get_mut(&mut self, id: ItemId) -> Option<&mut AnnotationItem> {
        self.items
            .iter_mut()
            .find(|(i, _)| *i == id)
            .map(|(_, item)| item)
    }

    /// Replace a box's rectangle after an interactive edit.
    pub fn set_box_rect(&mut self, id: ItemId, rect: Rect) -> bool {
        match self.get_mut(id) {
            Some(AnnotationItem::Box(b)) => {
                b.rect = rect;
                true
            }
            _ => false,
        }
    }

    /// Move a seed to a new (already clamped) position.
    pub fn set_seed_position(&mut self, id: ItemId, position: Point) -> bool {
        match self.get_mut(id) {
            Some(AnnotationItem::Seed(s)) => {
                s.position = position;
                true
            }
            _ => false,
        }
    }

    /// Assign a class label to a box, rewriting its mirrored entry text.
    pub fn set_class(&mut self, id: ItemId, name: &str) -> bool {
        let updated = match self.get_mut(id) {
            Some(AnnotationItem::Box(b)) => {
                b.label = Some(name.to_string());
                true
            }
            _ => false,
        };
        if updated {
            if let Some(entry) = self.entries.iter_mut().find(|e| e.item == id) {
                entry.text = name.to_string();
            }
        }
        updated
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    pub fn items(&self) -> impl Iterator<Item = (ItemId, &AnnotationItem)> {
        self.items.iter().map(|(id, item)| (*id, item))
    }

    /// Box annotations in insertion order.
    pub fn boxes(&self) -> impl Iterator<Item = &BoxAnnotation> {
        self.items.iter().filter_map(|(_, item)| item.as_box())
    }

    /// Seed points in insertion order.
    pub fn seeds(&self) -> impl Iterator<Item = &SeedPoint> {
        self.items.iter().filter_map(|(_, item)| item.as_seed())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.entries.clear();
    }

    /// Topmost box whose corner lies within grab tolerance of `p`.
    ///
    /// Later insertions sit on top, so the scan runs in reverse order.
    pub fn corner_at(&self, p: Point) -> Option<(ItemId, Corner)> {
        self.items.iter().rev().find_map(|(id, item)| {
            let b = item.as_box()?;
            b.rect
                .hit_corner(p, CORNER_HIT_TOLERANCE)
                .map(|corner| (*id, corner))
        })
    }

    /// Topmost item under `p`: boxes by containment, seeds by hit radius.
    pub fn item_at(&self, p: Point) -> Option<ItemId> {
        self.items
            .iter()
            .rev()
            .find(|(_, item)| match item {
                AnnotationItem::Box(b) => b.rect.contains_point(p),
                AnnotationItem::Seed(s) => s.position.distance_to(p) <= SEED_HIT_RADIUS,
            })
            .map(|(id, _)| *id)
    }

    /// Collect every seed for a prediction request and consume them.
    ///
    /// Returns predictor label indices (negative→0, positive→1) and the
    /// seed positions converted to original-image space. Seeds are
    /// single-use: every collected seed is removed from the set. With no
    /// seeds present this returns two empty lists and changes nothing.
    pub fn collect_and_consume(
        &mut self,
        display: Size,
        original: Size,
    ) -> (Vec<u8>, Vec<(f32, f32)>) {
        let mut labels = Vec::new();
        let mut points = Vec::new();
        let mut consumed = Vec::new();

        for (id, item) in &self.items {
            if let AnnotationItem::Seed(seed) = item {
                let p = transform::to_original(seed.position, display, original);
                labels.push(seed.label.index());
                points.push((p.x, p.y));
                consumed.push(*id);
            }
        }

        for id in consumed {
            self.remove(id);
        }

        (labels, points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SeedLabel;

    fn bounds() -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    fn sample_box(left: f32, top: f32) -> BoxAnnotation {
        BoxAnnotation::new(
            Rect::from_origin_size(left, top, 100.0, 80.0),
            Some("dog".into()),
        )
    }

    #[test]
    fn test_insert_mirrors_entry() {
        let mut set = AnnotationSet::new();
        let id = set.insert_box(sample_box(10.0, 10.0));

        assert_eq!(set.len(), 1);
        assert_eq!(set.entries().len(), 1);
        assert_eq!(set.entries()[0].item, id);
        assert_eq!(set.entries()[0].text, "dog");
    }

    #[test]
    fn test_remove_deletes_both_sides() {
        let mut set = AnnotationSet::new();
        let a = set.insert_box(sample_box(10.0, 10.0));
        let b = set.insert_seed(SeedPoint::create_at(
            Point::new(50.0, 50.0),
            SeedLabel::Positive,
            &bounds(),
        ));

        assert!(set.remove(a).is_some());
        assert_eq!(set.len(), 1);
        assert_eq!(set.entries().len(), 1);
        assert_eq!(set.entries()[0].item, b);

        // Removing via the list row kills the entity too.
        assert!(set.remove_entry(0).is_some());
        assert!(set.is_empty());
        assert!(set.entries().is_empty());
    }

    #[test]
    fn test_set_class_rewrites_entry_text() {
        let mut set = AnnotationSet::new();
        let id = set.insert_box(BoxAnnotation::unlabeled(Rect::from_origin_size(
            0.0, 0.0, 50.0, 50.0,
        )));
        assert_eq!(set.entries()[0].text, "unlabeled");

        assert!(set.set_class(id, "cat"));
        assert_eq!(set.entries()[0].text, "cat");
        assert_eq!(set.get(id).unwrap().as_box().unwrap().label.as_deref(), Some("cat"));
    }

    #[test]
    fn test_item_at_prefers_topmost() {
        let mut set = AnnotationSet::new();
        let below = set.insert_box(sample_box(10.0, 10.0));
        let above = set.insert_box(sample_box(10.0, 10.0));

        assert_eq!(set.item_at(Point::new(50.0, 50.0)), Some(above));
        set.remove(above);
        assert_eq!(set.item_at(Point::new(50.0, 50.0)), Some(below));
    }

    #[test]
    fn test_collect_and_consume() {
        let display = Size::new(800.0, 600.0);
        let original = Size::new(1600.0, 1200.0);
        let mut set = AnnotationSet::new();

        // Positions chosen so original-space values are (100,100), (400,400).
        set.insert_seed(SeedPoint::create_at(
            Point::new(50.0, 50.0),
            SeedLabel::Positive,
            &bounds(),
        ));
        set.insert_seed(SeedPoint::create_at(
            Point::new(200.0, 200.0),
            SeedLabel::Negative,
            &bounds(),
        ));
        set.insert_box(sample_box(300.0, 300.0));

        let (labels, points) = set.collect_and_consume(display, original);
        assert_eq!(labels, vec![1, 0]);
        assert_eq!(points, vec![(100.0, 100.0), (400.0, 400.0)]);

        // Seeds are gone, the box survives, and the list mirrors that.
        assert_eq!(set.seeds().count(), 0);
        assert_eq!(set.boxes().count(), 1);
        assert_eq!(set.entries().len(), 1);

        // A repeated request with no new seeds is a no-op.
        let (labels, points) = set.collect_and_consume(display, original);
        assert!(labels.is_empty());
        assert!(points.is_empty());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut set = AnnotationSet::new();
        set.insert_box(sample_box(0.0, 0.0));
        set.insert_seed(SeedPoint::create_at(
            Point::new(5.0, 5.0),
            SeedLabel::Negative,
            &bounds(),
        ));
        set.clear();
        assert!(set.is_empty());
        assert!(set.entries().is_empty());
    }
}
