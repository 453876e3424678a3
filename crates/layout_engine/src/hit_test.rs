//! Hit testing against the last layout pass

use box_tree::{BoxTree, InlineBox, InlineItem, LinkId, NodeId, Point, TextPosition, TextRange};
use text_engine::Shaper;

/// A text run found under a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextHit {
    pub position: TextPosition,
    /// Index of the run among the container's items
    pub item: usize,
    /// Container offsets covered by the run
    pub run: TextRange,
}

/// Maps points to text positions, objects, and links
pub struct HitTester<'a> {
    tree: &'a BoxTree,
    shaper: &'a dyn Shaper,
}

impl<'a> HitTester<'a> {
    pub fn new(tree: &'a BoxTree, shaper: &'a dyn Shaper) -> Self {
        Self { tree, shaper }
    }

    /// Inline container whose bounds contain `point`
    pub fn container_at(&self, point: Point) -> Option<NodeId> {
        self.tree
            .inline_containers()
            .into_iter()
            .find(|id| self.tree.bounds(*id).contains(point))
    }

    /// The text run directly under `point`, and the caret offset nearest
    /// to it within that run
    pub fn hit_test(&self, point: Point) -> Option<TextHit> {
        let container = self.container_at(point)?;
        let inline = self.tree.inline(container)?;
        inline
            .items()
            .iter()
            .enumerate()
            .find_map(|(item, entry)| match entry {
                InlineItem::Text(run) if run.rect.contains(point) => {
                    let local = self.shaper.coordinate_to_offset(
                        &run.shaped,
                        point.x - run.rect.x,
                        point.y - run.rect.y,
                    );
                    Some(TextHit {
                        position: TextPosition::new(container, run.offset + local),
                        item,
                        run: run.range(),
                    })
                }
                _ => None,
            })
    }

    /// Caret position for `point`: the run under it, or else the nearest
    /// offset on the line at that height in the container under it
    pub fn position_at(&self, point: Point) -> Option<TextPosition> {
        if let Some(hit) = self.hit_test(point) {
            return Some(hit.position);
        }
        let container = self.container_at(point)?;
        let inline = self.tree.inline(container)?;
        Some(TextPosition::new(container, self.nearest_offset(inline, point)))
    }

    /// Embedded object whose bounds contain `point`
    pub fn object_at(&self, point: Point) -> Option<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .find(|id| {
                self.tree.object(*id).is_some_and(|object| object.visible)
                    && self.tree.bounds(*id).contains(point)
            })
    }

    /// Link under `point`, through its text or one of its objects
    pub fn link_at(&self, point: Point) -> Option<LinkId> {
        if let Some(hit) = self.hit_test(point) {
            // A caret past the run's last character still means that character
            let offset = hit
                .position
                .offset
                .min(hit.run.end.saturating_sub(1))
                .max(hit.run.start);
            let inline = self.tree.inline(hit.position.container)?;
            let found = inline.links.iter().copied().find(|id| {
                self.tree
                    .link(*id)
                    .is_some_and(|link| link.covers_offset(offset))
            });
            if found.is_some() {
                return found;
            }
        }

        self.tree
            .links()
            .find(|(_, link)| {
                link.objects
                    .iter()
                    .any(|object| self.tree.bounds(*object).contains(point))
            })
            .map(|(id, _)| id)
    }

    fn nearest_offset(&self, inline: &InlineBox, point: Point) -> usize {
        let Some(line) = inline
            .lines
            .iter()
            .find(|line| point.y < line.rect.bottom())
            .or(inline.lines.last())
        else {
            return 0;
        };

        let items = inline.items();
        let mut offset = items
            .get(..line.items.start)
            .unwrap_or_default()
            .iter()
            .rev()
            .find_map(InlineItem::as_text)
            .map_or(0, |run| run.range().end);

        for run in items
            .get(line.items.clone())
            .unwrap_or_default()
            .iter()
            .filter_map(InlineItem::as_text)
        {
            if point.x < run.rect.x {
                return run.offset;
            }
            if point.x < run.rect.right() {
                return run.offset
                    + self.shaper.coordinate_to_offset(
                        &run.shaped,
                        point.x - run.rect.x,
                        point.y - run.rect.y,
                    );
            }
            offset = run.range().end;
        }
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LayoutEngine;
    use box_tree::{BoxNode, InlineBox, Link};
    use text_engine::TextRunCache;

    fn document(cache: &mut TextRunCache, lines: &[&[&str]]) -> (BoxTree, Vec<NodeId>) {
        let mut tree = BoxTree::new(10.0);
        let root = tree.root();
        let mut containers = Vec::new();
        for words in lines {
            let id = tree
                .append(root, BoxNode::Inline(InlineBox::new(true)))
                .unwrap();
            let inline = tree.inline_mut(id).unwrap();
            for word in *words {
                inline.push_text(cache.get(word, &[]));
            }
            containers.push(id);
        }
        LayoutEngine::default()
            .layout_document(&mut tree, 400.0)
            .unwrap();
        (tree, containers)
    }

    #[test]
    fn test_hit_maps_to_container_offset() {
        let mut cache = TextRunCache::default();
        let (tree, containers) = document(&mut cache, &[&["Hello", " ", "World"]]);
        let tester = HitTester::new(&tree, cache.shaper());

        let world = tree.inline(containers[0]).unwrap().text_runs().nth(2).unwrap().rect;
        let hit = tester
            .hit_test(Point::new(world.x + 0.5, world.y + 1.0))
            .unwrap();
        assert_eq!(hit.position, TextPosition::new(containers[0], 6));
        assert_eq!(hit.item, 2);
        assert_eq!(hit.run, TextRange::new(6, 11));
    }

    #[test]
    fn test_miss_outside_every_container() {
        let mut cache = TextRunCache::default();
        let (tree, _) = document(&mut cache, &[&["Hello"]]);
        let tester = HitTester::new(&tree, cache.shaper());
        assert!(tester.hit_test(Point::new(-5.0, -5.0)).is_none());
        assert!(tester.position_at(Point::new(-5.0, -5.0)).is_none());
    }

    #[test]
    fn test_position_past_line_end() {
        let mut cache = TextRunCache::default();
        let (tree, containers) = document(&mut cache, &[&["Hello"]]);
        let tester = HitTester::new(&tree, cache.shaper());
        let bounds = tree.bounds(containers[0]);

        let position = tester
            .position_at(Point::new(bounds.right() - 1.0, bounds.y + 1.0))
            .unwrap();
        assert_eq!(position, TextPosition::new(containers[0], 5));
    }

    #[test]
    fn test_second_container_found() {
        let mut cache = TextRunCache::default();
        let (tree, containers) = document(&mut cache, &[&["one"], &["two"]]);
        let tester = HitTester::new(&tree, cache.shaper());
        let bounds = tree.bounds(containers[1]);
        let position = tester
            .position_at(Point::new(bounds.x + 1.0, bounds.y + 1.0))
            .unwrap();
        assert_eq!(position.container, containers[1]);
    }

    #[test]
    fn test_link_under_text() {
        let mut cache = TextRunCache::default();
        let (mut tree, containers) = document(&mut cache, &[&["see", " ", "here"]]);
        let mut link = Link::new("http://example.com/", containers[0], 4);
        link.range.end = 8;
        let link_id = tree.add_link(link);

        let runs: Vec<_> = tree
            .inline(containers[0])
            .unwrap()
            .text_runs()
            .map(|run| run.rect)
            .collect();
        let tester = HitTester::new(&tree, cache.shaper());
        let on_link = Point::new(runs[2].right() - 0.5, runs[2].y + 1.0);
        assert_eq!(tester.link_at(on_link), Some(link_id));
        let off_link = Point::new(runs[0].x + 0.5, runs[0].y + 1.0);
        assert_eq!(tester.link_at(off_link), None);
    }
}
