use proptest::prelude::*;

use steelyard_layout::{Partitionable, Rect, SquarifyPartitioner};

#[derive(Debug, Clone)]
struct Item {
    size: f64,
    children: Vec<Item>,
}

impl Item {
    fn with_children(sizes: &[u32]) -> Self {
        let children: Vec<Item> = sizes
            .iter()
            .map(|&size| Item {
                size: f64::from(size),
                children: Vec::new(),
            })
            .collect();
        Self {
            size: children.iter().map(|c| c.size).sum(),
            children,
        }
    }
}

impl Partitionable for Item {
    fn size(&self) -> f64 {
        self.size
    }

    fn segments(&self) -> &[Self] {
        &self.children
    }
}

fn arb_frame() -> impl Strategy<Value = Rect> {
    (-100.0..100.0f64, -100.0..100.0f64, 1.0..1000.0f64, 1.0..1000.0f64)
        .prop_map(|(x, y, width, height)| Rect::new(x, y, width, height))
}

proptest! {
    #[test]
    fn partitions_conserve_area(sizes in prop::collection::vec(1u32..10_000, 1..30), frame in arb_frame()) {
        let item = Item::with_children(&sizes);
        let parts = SquarifyPartitioner::new().partition(&item, frame);

        prop_assert_eq!(parts.len(), sizes.len());
        let total: f64 = parts.iter().map(|p| p.rect.area()).sum();
        prop_assert!((total - frame.area()).abs() <= frame.area() * 1e-6,
            "areas sum to {} in a frame of {}", total, frame.area());
    }

    #[test]
    fn partitions_are_proportional(sizes in prop::collection::vec(1u32..10_000, 2..30), frame in arb_frame()) {
        let item = Item::with_children(&sizes);
        let parts = SquarifyPartitioner::new().partition(&item, frame);

        for part in &parts {
            let expected = part.item.size / item.size * frame.area();
            prop_assert!((part.rect.area() - expected).abs() <= frame.area() * 1e-6);
        }
    }

    #[test]
    fn partitions_do_not_overlap(sizes in prop::collection::vec(1u32..10_000, 2..30), frame in arb_frame()) {
        let item = Item::with_children(&sizes);
        let parts = SquarifyPartitioner::new().partition(&item, frame);
        let tolerance = frame.area() * 1e-6;

        for (i, a) in parts.iter().enumerate() {
            for b in &parts[i + 1..] {
                prop_assert!(a.rect.intersection_area(&b.rect) <= tolerance,
                    "{:?} overlaps {:?}", a.rect, b.rect);
            }
        }
    }

    #[test]
    fn partitions_stay_inside_frame(sizes in prop::collection::vec(1u32..10_000, 1..30), frame in arb_frame()) {
        let item = Item::with_children(&sizes);
        let parts = SquarifyPartitioner::new().partition(&item, frame);
        let tolerance = frame.width.max(frame.height) * 1e-6;

        for part in &parts {
            prop_assert!(frame.contains_rect(&part.rect, tolerance),
                "{:?} escapes {:?}", part.rect, frame);
        }
    }

    #[test]
    fn zero_sized_children_never_placed(
        sizes in prop::collection::vec(0u32..3, 0..20),
        frame in arb_frame(),
    ) {
        let item = Item::with_children(&sizes);
        let parts = SquarifyPartitioner::new().partition(&item, frame);

        prop_assert!(parts.iter().all(|p| p.item.size > 0.0));
        prop_assert_eq!(parts.len(), sizes.iter().filter(|&&s| s > 0).count());
    }
}

#[test]
fn scenario_reconstructs_frame() {
    let item = Item::with_children(&[50, 30, 20]);
    let frame = Rect::from_size(10.0, 10.0);
    let parts = SquarifyPartitioner::new().partition(&item, frame);

    let areas: Vec<f64> = parts.iter().map(|p| p.rect.area()).collect();
    for (area, expected) in areas.iter().zip([50.0, 30.0, 20.0]) {
        assert!((area - expected).abs() < 1e-9);
    }
    let total: f64 = areas.iter().sum();
    assert!((total - 100.0).abs() < 1e-9);
}
