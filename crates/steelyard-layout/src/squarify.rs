//! Squarified treemap partitioning.
//!
//! Segments are placed largest first in rows along the shorter side of the
//! remaining frame. A row keeps growing while the next segment does not make
//! its worst aspect ratio any worse; otherwise the row is laid out, the frame
//! shrinks by the row's thickness and a new row starts.

use crate::geometry::Rect;

/// Anything with a size and same-typed sized segments.
pub trait Partitionable: Sized {
    /// Size of the item. Only proportions matter.
    fn size(&self) -> f64;

    /// Segments to lay out, in their natural order.
    fn segments(&self) -> &[Self];
}

/// A computed rectangle and the segment it belongs to.
#[derive(Debug)]
pub struct Partition<'a, T> {
    pub rect: Rect,
    pub item: &'a T,
}

impl<T> Clone for Partition<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Partition<'_, T> {}

/// Axis along which a row's members are stacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    /// Members stacked top to bottom in a column at the left edge.
    Vertical,
    /// Members placed left to right in a strip at the top edge.
    Horizontal,
}

/// Stateless squarify layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquarifyPartitioner;

impl SquarifyPartitioner {
    pub fn new() -> Self {
        Self
    }

    /// Lay the segments of `item` out inside `frame`.
    ///
    /// Segments with a size of zero or less get no rectangle. A single
    /// remaining segment receives the whole frame. Partitions come back
    /// largest first.
    pub fn partition<'a, T: Partitionable>(&self, item: &'a T, frame: Rect) -> Vec<Partition<'a, T>> {
        let total = item.size();
        if total <= 0.0 {
            return Vec::new();
        }

        let mut segments: Vec<&'a T> = item.segments().iter().filter(|s| s.size() > 0.0).collect();
        match segments.len() {
            0 => return Vec::new(),
            1 => return vec![Partition { rect: frame, item: segments[0] }],
            _ => {}
        }

        // Stable, so equal sizes keep their input order.
        segments.sort_by(|a, b| b.size().total_cmp(&a.size()));

        let scale = frame.area() / total;
        let cells: Vec<Cell<'a, T>> = segments
            .into_iter()
            .map(|item| Cell {
                area: item.size() * scale,
                item,
            })
            .collect();

        Layout::new(frame, cells.len()).run(&cells)
    }
}

struct Cell<'a, T> {
    area: f64,
    item: &'a T,
}

impl<T> Clone for Cell<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cell<'_, T> {}

struct Layout<'a, T> {
    frame: Rect,
    placed: Vec<Partition<'a, T>>,
}

impl<'a, T> Layout<'a, T> {
    fn new(frame: Rect, capacity: usize) -> Self {
        Self {
            frame,
            placed: Vec::with_capacity(capacity),
        }
    }

    fn run(mut self, cells: &[Cell<'a, T>]) -> Vec<Partition<'a, T>> {
        let mut row: Vec<Cell<'a, T>> = Vec::new();
        let (mut width, mut orientation) = biggest_fitting_square(&self.frame);
        let mut next = 0;

        while next < cells.len() {
            if cells.len() - next == 1 {
                // The packing side is untouched by laying out a row along it,
                // so the last cell can reuse it and fill what is left.
                self.layout_row(&row, width, orientation);
                row.clear();
                self.layout_row(&cells[next..], width, orientation);
                break;
            }

            let candidate = cells[next];
            if row.is_empty() || worst(&row, None, width) >= worst(&row, Some(candidate), width) {
                row.push(candidate);
                next += 1;
            } else {
                self.layout_row(&row, width, orientation);
                row.clear();
                (width, orientation) = biggest_fitting_square(&self.frame);
            }
        }

        self.layout_row(&row, width, orientation);
        self.placed
    }

    /// Place `row` against the frame edge and shrink the frame past it.
    fn layout_row(&mut self, row: &[Cell<'a, T>], width: f64, orientation: Orientation) {
        let sum: f64 = row.iter().map(|c| c.area).sum();
        if row.is_empty() || width <= 0.0 {
            return;
        }
        let thickness = sum / width;
        if thickness <= 0.0 {
            return;
        }

        let frame = &mut self.frame;
        match orientation {
            Orientation::Vertical => {
                let mut y = frame.y;
                for cell in row {
                    let height = cell.area / thickness;
                    self.placed.push(Partition {
                        rect: Rect::new(frame.x, y, thickness, height),
                        item: cell.item,
                    });
                    y += height;
                }
                frame.x += thickness;
                frame.width = (frame.width - thickness).max(0.0);
            }
            Orientation::Horizontal => {
                let mut x = frame.x;
                for cell in row {
                    let width = cell.area / thickness;
                    self.placed.push(Partition {
                        rect: Rect::new(x, frame.y, width, thickness),
                        item: cell.item,
                    });
                    x += width;
                }
                frame.y += thickness;
                frame.height = (frame.height - thickness).max(0.0);
            }
        }
    }
}

/// Shorter side of `frame` and the orientation that packs along it.
fn biggest_fitting_square(frame: &Rect) -> (f64, Orientation) {
    if frame.height * frame.height <= frame.width * frame.width {
        (frame.height, Orientation::Vertical)
    } else {
        (frame.width, Orientation::Horizontal)
    }
}

/// Worst aspect ratio of `row`, optionally extended by `extra`.
fn worst<T>(row: &[Cell<'_, T>], extra: Option<Cell<'_, T>>, width: f64) -> f64 {
    let areas = row.iter().map(|c| c.area).chain(extra.map(|c| c.area));

    let (mut sum, mut min, mut max) = (0.0_f64, f64::INFINITY, 0.0_f64);
    for area in areas {
        sum += area;
        min = min.min(area);
        max = max.max(area);
    }
    if sum <= 0.0 || width <= 0.0 {
        return 0.0;
    }

    let width_sq = width * width;
    let sum_sq = sum * sum;
    (width_sq * max / sum_sq).max(sum_sq / (width_sq * min))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Item {
        size: f64,
        children: Vec<Item>,
    }

    impl Item {
        fn leaf(size: f64) -> Self {
            Self {
                size,
                children: Vec::new(),
            }
        }

        fn with_children(sizes: &[f64]) -> Self {
            Self {
                size: sizes.iter().sum(),
                children: sizes.iter().copied().map(Item::leaf).collect(),
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

    fn assert_rect(actual: Rect, expected: Rect) {
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        assert!(
            close(actual.x, expected.x)
                && close(actual.y, expected.y)
                && close(actual.width, expected.width)
                && close(actual.height, expected.height),
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn test_three_children_in_square() {
        let item = Item::with_children(&[50.0, 30.0, 20.0]);
        let parts = SquarifyPartitioner::new().partition(&item, Rect::from_size(10.0, 10.0));

        assert_eq!(parts.len(), 3);
        assert_rect(parts[0].rect, Rect::new(0.0, 0.0, 5.0, 10.0));
        assert_rect(parts[1].rect, Rect::new(5.0, 0.0, 5.0, 6.0));
        assert_rect(parts[2].rect, Rect::new(5.0, 6.0, 5.0, 4.0));
        assert_eq!(parts[0].item.size, 50.0);
    }

    #[test]
    fn test_sorted_largest_first() {
        let item = Item::with_children(&[20.0, 50.0, 30.0]);
        let parts = SquarifyPartitioner::new().partition(&item, Rect::from_size(10.0, 10.0));

        let sizes: Vec<f64> = parts.iter().map(|p| p.item.size).collect();
        assert_eq!(sizes, vec![50.0, 30.0, 20.0]);
    }

    #[test]
    fn test_no_children() {
        let item = Item::leaf(10.0);
        assert!(SquarifyPartitioner::new()
            .partition(&item, Rect::from_size(10.0, 10.0))
            .is_empty());
    }

    #[test]
    fn test_single_child_fills_frame() {
        let item = Item::with_children(&[7.0]);
        let frame = Rect::new(3.0, 4.0, 20.0, 5.0);
        let parts = SquarifyPartitioner::new().partition(&item, frame);

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].rect, frame);
    }

    #[test]
    fn test_non_positive_children_skipped() {
        let item = Item {
            size: 10.0,
            children: vec![Item::leaf(0.0), Item::leaf(10.0), Item::leaf(-3.0)],
        };
        let frame = Rect::from_size(4.0, 4.0);
        let parts = SquarifyPartitioner::new().partition(&item, frame);

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].rect, frame);
        assert_eq!(parts[0].item.size, 10.0);
    }

    #[test]
    fn test_non_positive_item() {
        let item = Item {
            size: 0.0,
            children: vec![Item::leaf(1.0), Item::leaf(2.0)],
        };
        assert!(SquarifyPartitioner::new()
            .partition(&item, Rect::from_size(4.0, 4.0))
            .is_empty());
    }

    #[test]
    fn test_wide_frame_packs_columns() {
        let item = Item::with_children(&[1.0, 1.0]);
        let parts = SquarifyPartitioner::new().partition(&item, Rect::from_size(20.0, 10.0));

        assert_rect(parts[0].rect, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_rect(parts[1].rect, Rect::new(10.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_tall_frame_packs_rows() {
        let item = Item::with_children(&[1.0, 1.0]);
        let parts = SquarifyPartitioner::new().partition(&item, Rect::from_size(10.0, 20.0));

        assert_rect(parts[0].rect, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_rect(parts[1].rect, Rect::new(0.0, 10.0, 10.0, 10.0));
    }

    #[test]
    fn test_worst_ratio() {
        let cells: Vec<Cell<'_, Item>> = Vec::new();
        assert_eq!(worst(&cells, None, 10.0), 0.0);

        let item = Item::leaf(0.0);
        let row = [Cell { area: 50.0, item: &item }];
        assert_eq!(worst(&row, None, 10.0), 2.0);
        assert_eq!(worst(&row, None, 0.0), 0.0);
    }
}
