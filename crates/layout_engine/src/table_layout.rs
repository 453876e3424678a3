//! Table Layout Algorithm
//!
//! Tables are laid out in two passes over a grid of spanning cells:
//! - Column sizing walks the rows, skipping columns covered by a rowspan
//!   from above, and splits each cell's width request evenly across the
//!   columns it spans
//! - Row placement gives each cell the width of its spanned columns and
//!   takes each row's height from the cells that end in that row
//!
//! When the natural widths do not fit, columns shrink proportionally but
//! the budget is handed out left to right, so earlier columns win.

use crate::SizeRequest;
use box_tree::Rect;

/// The shape of one cell, as seen by table layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub colspan: usize,
    pub rowspan: usize,
}

impl GridCell {
    pub fn new(colspan: usize, rowspan: usize) -> Self {
        Self {
            colspan: colspan.max(1),
            rowspan: rowspan.max(1),
        }
    }
}

/// Cell rects from row placement, relative to the table's origin
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TablePlacement {
    /// Rects in the same row/cell order as the input grid
    pub cells: Vec<Vec<Rect>>,
    pub height: f32,
}

/// Column sizing and row placement for one table
#[derive(Debug, Clone, Copy)]
pub struct TableLayout {
    /// Gap between adjacent columns
    spacing: f32,
}

impl TableLayout {
    /// Create a new table layout with the given column gap
    pub fn new(spacing: f32) -> Self {
        Self { spacing }
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Per-column width requests.
    ///
    /// `request` is called once per cell, in reading order, with the
    /// row and cell index.
    pub fn column_requests<F>(&self, rows: &[Vec<GridCell>], mut request: F) -> Vec<SizeRequest>
    where
        F: FnMut(usize, usize) -> SizeRequest,
    {
        let mut columns: Vec<SizeRequest> = Vec::new();
        let mut descending: Vec<usize> = Vec::new();

        for (row_index, row) in rows.iter().enumerate() {
            let mut column = 0;
            for (cell_index, cell) in row.iter().enumerate() {
                while descending.get(column).is_some_and(|rows_left| *rows_left > 0) {
                    column += 1;
                }

                let size = request(row_index, cell_index);
                let share = SizeRequest::new(
                    size.minimum / cell.colspan as f32,
                    size.natural / cell.colspan as f32,
                );
                let end = column + cell.colspan;
                if columns.len() < end {
                    columns.resize(end, SizeRequest::default());
                    descending.resize(end, 0);
                }
                for covered in column..end {
                    let width = &mut columns[covered];
                    width.minimum = width.minimum.max(share.minimum);
                    width.natural = width.natural.max(share.natural);
                    descending[covered] = cell.rowspan;
                }
                column = end;
            }

            for rows_left in descending.iter_mut() {
                *rows_left = rows_left.saturating_sub(1);
            }
        }
        columns
    }

    /// Table width requests: column sums plus the gaps between columns
    pub fn preferred_width(&self, columns: &[SizeRequest]) -> SizeRequest {
        if columns.is_empty() {
            return SizeRequest::default();
        }
        let gaps = self.spacing * (columns.len() - 1) as f32;
        SizeRequest::new(
            columns.iter().map(|c| c.minimum).sum::<f32>() + gaps,
            columns.iter().map(|c| c.natural).sum::<f32>() + gaps,
        )
    }

    /// Assign a width to every column for a table `available` wide
    pub fn resolve_columns(&self, columns: &[SizeRequest], available: f32) -> Vec<f32> {
        let mut widths: Vec<f32> = columns.iter().map(|c| c.minimum).collect();
        let natural_total = self.preferred_width(columns).natural;
        let shrink = if available > 0.0 {
            natural_total / available
        } else {
            f32::INFINITY
        };

        let mut extra = available + self.spacing
            - widths.iter().map(|w| w + self.spacing).sum::<f32>();

        for (width, column) in widths.iter_mut().zip(columns) {
            if extra <= 0.0 {
                break;
            }
            if shrink <= 1.0 {
                extra -= column.natural - *width;
                *width = column.natural;
            } else {
                let target = column.natural / shrink;
                if target > *width {
                    if extra > target - *width {
                        extra -= target - *width;
                        *width = target;
                    } else {
                        *width += extra;
                        extra = 0.0;
                    }
                }
            }
        }
        widths
    }

    /// Place every cell given resolved column widths.
    ///
    /// `height_for` is called with the row index, cell index, and the
    /// cell's width, and returns the cell's height at that width.
    pub fn place_rows<F, E>(
        &self,
        rows: &[Vec<GridCell>],
        widths: &[f32],
        mut height_for: F,
    ) -> Result<TablePlacement, E>
    where
        F: FnMut(usize, usize, f32) -> Result<f32, E>,
    {
        let count = widths.len();
        let mut descending = vec![0usize; count];
        let mut pending = vec![0.0f32; count];
        let mut cells = Vec::with_capacity(rows.len());
        let mut y = 0.0;
        let mut bottom: f32 = 0.0;

        for (row_index, row) in rows.iter().enumerate() {
            let mut column = 0;
            let mut x = 0.0;
            let mut rects = Vec::with_capacity(row.len());

            for (cell_index, cell) in row.iter().enumerate() {
                while column < count && descending[column] > 0 {
                    x += widths[column] + self.spacing;
                    column += 1;
                }

                let end = (column + cell.colspan).min(count);
                let spanned = end.saturating_sub(column);
                let width = widths[column.min(count)..end].iter().sum::<f32>()
                    + self.spacing * spanned.saturating_sub(1) as f32;
                let height = height_for(row_index, cell_index, width)?;

                rects.push(Rect::new(x, y, width, height));
                bottom = bottom.max(y + height);
                x += width + self.spacing;

                for covered in column..end {
                    descending[covered] = cell.rowspan;
                    pending[covered] = height;
                }
                column += cell.colspan;
            }

            let mut row_height: f32 = 0.0;
            for (rows_left, height) in descending.iter_mut().zip(&pending) {
                if *rows_left > 0 {
                    *rows_left -= 1;
                    if *rows_left == 0 {
                        row_height = row_height.max(*height);
                    }
                }
            }
            for height in pending.iter_mut() {
                *height = (*height - row_height).max(0.0);
            }

            cells.push(rects);
            y += row_height;
        }

        Ok(TablePlacement {
            cells,
            height: bottom.max(y),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid(rows: &[&[(usize, usize)]]) -> Vec<Vec<GridCell>> {
        rows.iter()
            .map(|row| row.iter().map(|(c, r)| GridCell::new(*c, *r)).collect())
            .collect()
    }

    #[test]
    fn test_spanning_cell_skips_columns_below() {
        let layout = TableLayout::new(10.0);
        let rows = grid(&[&[(2, 2), (1, 1)], &[(1, 1)]]);

        let columns = layout.column_requests(&rows, |_, _| SizeRequest::fixed(40.0));
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0], SizeRequest::fixed(20.0));
        assert_eq!(columns[1], SizeRequest::fixed(20.0));
        assert_eq!(columns[2], SizeRequest::fixed(40.0));

        let widths = vec![30.0, 50.0, 40.0];
        let placement = layout
            .place_rows(&rows, &widths, |_, _, _| Ok::<_, ()>(20.0))
            .unwrap();

        // The spanning cell covers columns 0 and 1 plus the gap between them
        assert_eq!(placement.cells[0][0].width, 30.0 + 50.0 + 10.0);

        // The second row's only cell lands in column 2
        let below = placement.cells[1][0];
        assert_eq!(below.x, 30.0 + 10.0 + 50.0 + 10.0);
        assert_eq!(below.width, 40.0);
    }

    #[test]
    fn test_colspan_splits_request_evenly() {
        let layout = TableLayout::new(10.0);
        let rows = grid(&[&[(2, 1)], &[(1, 1), (1, 1)]]);
        let columns = layout.column_requests(&rows, |row, cell| match (row, cell) {
            (0, _) => SizeRequest::new(100.0, 200.0),
            (_, 0) => SizeRequest::fixed(20.0),
            _ => SizeRequest::fixed(80.0),
        });
        assert_eq!(columns[0], SizeRequest::new(50.0, 100.0));
        assert_eq!(columns[1], SizeRequest::new(80.0, 100.0));
    }

    #[test]
    fn test_preferred_width_includes_gaps() {
        let layout = TableLayout::new(10.0);
        let columns = [SizeRequest::new(10.0, 20.0), SizeRequest::new(30.0, 40.0)];
        assert_eq!(layout.preferred_width(&columns), SizeRequest::new(50.0, 70.0));
        assert_eq!(layout.preferred_width(&[]), SizeRequest::default());
    }

    #[test]
    fn test_columns_grow_to_natural_when_room() {
        let layout = TableLayout::new(10.0);
        let columns = [SizeRequest::new(10.0, 20.0), SizeRequest::new(30.0, 40.0)];
        assert_eq!(layout.resolve_columns(&columns, 500.0), vec![20.0, 40.0]);
    }

    #[test]
    fn test_columns_shrink_first_column_priority() {
        let layout = TableLayout::new(0.0);
        let columns = [
            SizeRequest::new(10.0, 100.0),
            SizeRequest::new(10.0, 100.0),
            SizeRequest::new(10.0, 100.0),
        ];
        // Natural 300 into 150: every column targets 50
        let widths = layout.resolve_columns(&columns, 150.0);
        assert_eq!(widths, vec![50.0, 50.0, 50.0]);

        // Not enough budget for the last column's share
        let columns = [SizeRequest::new(10.0, 100.0), SizeRequest::new(60.0, 100.0)];
        let widths = layout.resolve_columns(&columns, 100.0);
        assert_eq!(widths[1], 60.0);
        assert_eq!(widths[0], 40.0);
    }

    #[test]
    fn test_minimums_kept_when_too_narrow() {
        let layout = TableLayout::new(10.0);
        let columns = [SizeRequest::new(40.0, 80.0), SizeRequest::new(40.0, 80.0)];
        assert_eq!(layout.resolve_columns(&columns, 50.0), vec![40.0, 40.0]);
    }

    #[test]
    fn test_row_height_from_terminating_cells() {
        let layout = TableLayout::new(0.0);
        let rows = grid(&[&[(1, 2), (1, 1)], &[(1, 1)]]);
        let widths = vec![50.0, 50.0];
        let placement = layout
            .place_rows(&rows, &widths, |row, cell, _| {
                Ok::<_, ()>(match (row, cell) {
                    (0, 0) => 100.0,
                    (0, 1) => 30.0,
                    _ => 20.0,
                })
            })
            .unwrap();

        // Row 0 ends only the short cell
        assert_eq!(placement.cells[1][0].y, 30.0);
        assert_eq!(placement.cells[1][0].x, 50.0);
        // Row 1 finishes the tall cell: 100 - 30 still pending
        assert_eq!(placement.height, 100.0);
    }

    #[test]
    fn test_rows_have_no_vertical_gap() {
        let layout = TableLayout::new(10.0);
        let rows = grid(&[&[(1, 1)], &[(1, 1)]]);
        let placement = layout
            .place_rows(&rows, &[40.0], |_, _, _| Ok::<_, ()>(25.0))
            .unwrap();
        assert_eq!(placement.cells[1][0].y, 25.0);
        assert_eq!(placement.height, 50.0);
    }

    proptest! {
        #[test]
        fn test_resolved_widths_respect_minimums(
            requests in proptest::collection::vec((0.0f32..100.0, 0.0f32..100.0), 1..8),
            available in 0.0f32..600.0,
        ) {
            let layout = TableLayout::new(10.0);
            let columns: Vec<SizeRequest> = requests
                .iter()
                .map(|(min, extra)| SizeRequest::new(*min, min + extra))
                .collect();
            let widths = layout.resolve_columns(&columns, available);
            for (width, column) in widths.iter().zip(&columns) {
                prop_assert!(*width >= column.minimum - 0.001);
                prop_assert!(*width <= column.natural + 0.001);
            }
        }
    }
}
