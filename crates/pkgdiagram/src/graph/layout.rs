//! Ordering of arrows around a target and uses-arrow slot assignment
//!
//! Arrows sharing a target are sorted by where their far end lies, walking
//! the four quadrants around the target. Uses arrows are then spread out
//! along the target's edges in that order so they do not cross each other
//! near the box.

use std::cmp::Ordering;

use super::collection::TargetCollection;
use super::dependency::Dependency;
use super::target::{Target, ARR_HORIZ_DIST, ARR_VERT_DIST};
use crate::core::Point;

/// Distance between a box edge and the slots placed along it
pub const SLOT_GAP: i32 = 4;

/// Orders far-end centres around one centre target
///
/// Quadrants are numbered 0 above-left, 1 above-right, 2 below-left and
/// 3 below-right, where above means a smaller y than the centre and left a
/// smaller x. Points in different quadrants order by quadrant number.
/// Within a quadrant incoming arrows compare x then y, outgoing arrows
/// compare y then x, and the result is reversed in the quadrants where
/// above and left agree. Only coincident points compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutComparer {
    centre: Point,
    incoming: bool,
}

impl LayoutComparer {
    pub fn new(centre: Point, incoming: bool) -> Self {
        Self { centre, incoming }
    }

    /// Comparer around a target's centre
    pub fn around(target: &Target, incoming: bool) -> Self {
        Self::new(target.center(), incoming)
    }

    pub fn quadrant(&self, p: Point) -> u8 {
        let above = p.y < self.centre.y;
        let left = p.x < self.centre.x;
        match (above, left) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        }
    }

    pub fn compare(&self, a: Point, b: Point) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let qa = self.quadrant(a);
        let qb = self.quadrant(b);
        if qa != qb {
            return qa.cmp(&qb);
        }

        let order = if self.incoming {
            a.x.cmp(&b.x).then(a.y.cmp(&b.y))
        } else {
            a.y.cmp(&b.y).then(a.x.cmp(&b.x))
        };
        let above = a.y < self.centre.y;
        let left = a.x < self.centre.x;
        if above == left {
            order.reverse()
        } else {
            order
        }
    }
}

/// Stable sort of the arrows incident to `centre`
///
/// Incoming arrows are keyed on their source, outgoing ones on their
/// destination. Arrows whose far end cannot be resolved sort last.
pub fn sort_dependencies(
    deps: &mut [Dependency],
    centre: &Target,
    incoming: bool,
    targets: &TargetCollection,
) {
    let comparer = LayoutComparer::around(centre, incoming);
    let far_end = |d: &Dependency| {
        let name = if incoming { d.from() } else { d.to() };
        name.and_then(|n| targets.get(n)).map(Target::center)
    };
    deps.sort_by(|a, b| match (far_end(a), far_end(b)) {
        (Some(pa), Some(pb)) => comparer.compare(pa, pb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Assign start slots to the uses arrows leaving `source`
///
/// Arrows heading up leave from the top edge, all others from the bottom
/// edge. Each row of slots is centred on the box, `ARR_HORIZ_DIST` apart.
pub fn recalc_out_uses(source: &Target, uses: &mut [Dependency], targets: &TargetCollection) {
    let comparer = LayoutComparer::around(source, false);
    let mut outgoing: Vec<(usize, Point)> = uses
        .iter()
        .enumerate()
        .filter(|(_, d)| d.from() == Some(source.name()))
        .filter_map(|(i, d)| Some((i, targets.get(d.to()?)?.center())))
        .collect();
    outgoing.sort_by(|a, b| comparer.compare(a.1, b.1));

    let b = source.bounds();
    let cy = source.center().y;
    let n_top = outgoing.iter().filter(|(_, c)| c.y < cy).count() as i32;
    let n_bottom = outgoing.len() as i32 - n_top;

    let mut top_x = b.x + (b.width - (n_top - 1) * ARR_HORIZ_DIST) / 2;
    let mut bottom_x = b.x + (b.width - (n_bottom - 1) * ARR_HORIZ_DIST) / 2;
    for (i, c) in outgoing {
        let slot = if c.y < cy {
            let slot = Point::new(top_x, b.y - SLOT_GAP);
            top_x += ARR_HORIZ_DIST;
            slot
        } else {
            let slot = Point::new(bottom_x, b.bottom() + SLOT_GAP);
            bottom_x += ARR_HORIZ_DIST;
            slot
        };
        uses[i].set_source_slot(Some(slot));
    }
}

/// Assign end slots to the uses arrows entering `dest`
///
/// Arrows coming from the left enter on the left edge, all others on the
/// right edge. Each column of slots is centred on the box, `ARR_VERT_DIST`
/// apart.
pub fn recalc_in_uses(dest: &Target, uses: &mut [Dependency], targets: &TargetCollection) {
    let comparer = LayoutComparer::around(dest, true);
    let mut incoming: Vec<(usize, Point)> = uses
        .iter()
        .enumerate()
        .filter(|(_, d)| d.to() == Some(dest.name()))
        .filter_map(|(i, d)| Some((i, targets.get(d.from()?)?.center())))
        .collect();
    incoming.sort_by(|a, b| comparer.compare(a.1, b.1));

    let b = dest.bounds();
    let cx = dest.center().x;
    let n_left = incoming.iter().filter(|(_, c)| c.x < cx).count() as i32;
    let n_right = incoming.len() as i32 - n_left;

    let mut left_y = b.y + (b.height - (n_left - 1) * ARR_VERT_DIST) / 2;
    let mut right_y = b.y + (b.height - (n_right - 1) * ARR_VERT_DIST) / 2;
    for (i, c) in incoming {
        let slot = if c.x < cx {
            let slot = Point::new(b.x - SLOT_GAP, left_y);
            left_y += ARR_VERT_DIST;
            slot
        } else {
            let slot = Point::new(b.right() + SLOT_GAP, right_y);
            right_y += ARR_VERT_DIST;
            slot
        };
        uses[i].set_dest_slot(Some(slot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Rect;
    use crate::graph::{ClassRole, TargetKind};
    use proptest::prelude::*;

    fn at(name: &str, x: i32, y: i32) -> Target {
        Target::new(name, TargetKind::Class(ClassRole::Standard), Rect::new(x, y, 80, 50))
    }

    #[test]
    fn test_quadrants() {
        let cmp = LayoutComparer::new(Point::new(100, 100), false);
        assert_eq!(cmp.quadrant(Point::new(50, 50)), 0);
        assert_eq!(cmp.quadrant(Point::new(150, 50)), 1);
        assert_eq!(cmp.quadrant(Point::new(50, 150)), 2);
        assert_eq!(cmp.quadrant(Point::new(150, 150)), 3);
        // on the centre lines counts as below / right
        assert_eq!(cmp.quadrant(Point::new(100, 100)), 3);
    }

    #[test]
    fn test_quadrant_is_primary_key() {
        let cmp = LayoutComparer::new(Point::new(100, 100), true);
        assert_eq!(cmp.compare(Point::new(0, 0), Point::new(200, 300)), Ordering::Less);
        assert_eq!(cmp.compare(Point::new(150, 50), Point::new(50, 150)), Ordering::Less);
    }

    #[test]
    fn test_within_quadrant_incoming_uses_x() {
        let cmp = LayoutComparer::new(Point::new(100, 100), true);
        // above-right: above != left, plain x order
        assert_eq!(cmp.compare(Point::new(120, 10), Point::new(180, 90)), Ordering::Less);
        // above-left: above == left, reversed
        assert_eq!(cmp.compare(Point::new(20, 10), Point::new(80, 90)), Ordering::Greater);
        // x tie falls back to y
        assert_eq!(cmp.compare(Point::new(120, 10), Point::new(120, 90)), Ordering::Less);
    }

    #[test]
    fn test_within_quadrant_outgoing_uses_y() {
        let cmp = LayoutComparer::new(Point::new(100, 100), false);
        // below-left: above != left, plain y order
        assert_eq!(cmp.compare(Point::new(90, 120), Point::new(10, 180)), Ordering::Less);
        // below-right: above == left (both false), reversed
        assert_eq!(cmp.compare(Point::new(110, 120), Point::new(190, 180)), Ordering::Greater);
    }

    #[test]
    fn test_coincident_points_are_equal() {
        let cmp = LayoutComparer::new(Point::new(100, 100), false);
        assert_eq!(cmp.compare(Point::new(3, 4), Point::new(3, 4)), Ordering::Equal);
    }

    #[test]
    fn test_sort_dependencies_is_stable_and_puts_dangling_last() {
        let mut targets = TargetCollection::new();
        let centre = at("C", 200, 200);
        targets.add("C", centre.clone());
        targets.add("NW", at("NW", 0, 0));
        targets.add("SE", at("SE", 400, 400));

        let mut deps = vec![
            Dependency::with_endpoints(Some("C".into()), None, crate::graph::DependencyKind::Uses),
            Dependency::uses("C", "SE"),
            Dependency::uses("C", "NW"),
        ];
        sort_dependencies(&mut deps, &centre, false, &targets);
        let order: Vec<_> = deps.iter().map(|d| d.to()).collect();
        assert_eq!(order, vec![Some("NW"), Some("SE"), None]);
    }

    #[test]
    fn test_out_slots_split_top_and_bottom() {
        let mut targets = TargetCollection::new();
        let source = at("S", 100, 200);
        targets.add("S", source.clone());
        targets.add("Up", at("Up", 100, 0));
        targets.add("Down1", at("Down1", 0, 400));
        targets.add("Down2", at("Down2", 300, 400));

        let mut uses = vec![
            Dependency::uses("S", "Down2"),
            Dependency::uses("S", "Up"),
            Dependency::uses("S", "Down1"),
        ];
        recalc_out_uses(&source, &mut uses, &targets);

        // single top arrow sits in the middle of the top edge
        assert_eq!(uses[1].source_slot(), Some(Point::new(140, 196)));
        // two bottom arrows are centred, 5 apart
        let mut bottom: Vec<_> = [&uses[0], &uses[2]]
            .iter()
            .filter_map(|d| d.source_slot())
            .collect();
        bottom.sort_by_key(|p| p.x);
        assert_eq!(bottom, vec![Point::new(137, 254), Point::new(142, 254)]);
        assert!(uses.iter().all(|d| d.dest_slot().is_none()));
    }

    #[test]
    fn test_in_slots_split_left_and_right() {
        let mut targets = TargetCollection::new();
        let dest = at("D", 200, 200);
        targets.add("D", dest.clone());
        targets.add("L1", at("L1", 0, 100));
        targets.add("L2", at("L2", 0, 300));
        targets.add("R", at("R", 400, 200));

        let mut uses = vec![
            Dependency::uses("L1", "D"),
            Dependency::uses("R", "D"),
            Dependency::uses("L2", "D"),
            Dependency::uses("L1", "R"),
        ];
        recalc_in_uses(&dest, &mut uses, &targets);

        assert_eq!(uses[1].dest_slot(), Some(Point::new(284, 225)));
        let mut left: Vec<_> = [&uses[0], &uses[2]]
            .iter()
            .filter_map(|d| d.dest_slot())
            .collect();
        left.sort_by_key(|p| p.y);
        assert_eq!(left, vec![Point::new(196, 220), Point::new(196, 230)]);
        assert!(uses[3].dest_slot().is_none());
    }

    fn point() -> impl Strategy<Value = Point> {
        (-500i32..500, -500i32..500).prop_map(|(x, y)| Point::new(x, y))
    }

    proptest! {
        #[test]
        fn prop_compare_is_antisymmetric(
            centre in point(),
            a in point(),
            b in point(),
            incoming in any::<bool>(),
        ) {
            let cmp = LayoutComparer::new(centre, incoming);
            prop_assert_eq!(cmp.compare(a, b), cmp.compare(b, a).reverse());
            prop_assert_eq!(cmp.compare(a, b) == Ordering::Equal, a == b);
        }

        #[test]
        fn prop_compare_is_transitive(
            centre in point(),
            a in point(),
            b in point(),
            c in point(),
            incoming in any::<bool>(),
        ) {
            let cmp = LayoutComparer::new(centre, incoming);
            if cmp.compare(a, b) == Ordering::Less && cmp.compare(b, c) == Ordering::Less {
                prop_assert_eq!(cmp.compare(a, c), Ordering::Less);
            }
        }
    }
}
