//! Box tree layout
//!
//! Widths are requested bottom-up, then allocated top-down: every node is
//! given a width, asks its children for their height at that width, and
//! stores the resulting absolute rects in the tree.

use crate::{
    FlowItem, GridCell, InlineFlow, LayoutError, Result, SizeRequest, TableLayout,
    TablePlacement,
};
use box_tree::{
    BlockBox, BoxNode, BoxTree, InlineBox, InlineItem, NodeId, Orientation, Rect, TableBox,
    TreeError,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Height of a line with nothing on it, when no earlier line sets one
    pub empty_line_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            empty_line_height: 16.0,
        }
    }
}

/// Lays out a box tree
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    /// Create a new layout engine
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out the whole document at `width` and return its height.
    ///
    /// The root never gets less than its minimum width; wider content
    /// overflows to the right.
    pub fn layout_document(&self, tree: &mut BoxTree, width: f32) -> Result<f32> {
        if !width.is_finite() || width < 0.0 {
            return Err(LayoutError::InvalidWidth(width));
        }
        let root = tree.root();
        let width = width.max(self.preferred_width(tree, root)?.minimum);
        let height = self.height_for_width(tree, root, width)?;
        self.allocate(tree, root, Rect::new(0.0, 0.0, width, height))?;
        tree.mark_clean();

        debug!(width, height, nodes = tree.len(), "Document laid out");
        Ok(height)
    }

    /// Minimum and natural width of a node
    pub fn preferred_width(&self, tree: &BoxTree, id: NodeId) -> Result<SizeRequest> {
        match node(tree, id)? {
            BoxNode::Block(block) => self.block_width(tree, block),
            BoxNode::TableCell(cell) => self.block_width(tree, &cell.body),
            BoxNode::Inline(inline) => {
                Ok(self.flow(inline).preferred_width(&flow_items(tree, inline)))
            }
            BoxNode::Table(table) => {
                let (_, columns) = self.table_columns(tree, table)?;
                Ok(TableLayout::new(table.spacing).preferred_width(&columns))
            }
            BoxNode::EmbeddedObject(object) if object.visible => {
                Ok(SizeRequest::fixed(object.width))
            }
            BoxNode::EmbeddedObject(_) => Ok(SizeRequest::default()),
        }
    }

    /// Height of a node laid out at `width`; does not touch the tree
    pub fn height_for_width(&self, tree: &BoxTree, id: NodeId, width: f32) -> Result<f32> {
        match node(tree, id)? {
            BoxNode::Block(block) => self.block_height(tree, block, width),
            BoxNode::TableCell(cell) => self.block_height(tree, &cell.body, width),
            BoxNode::Inline(inline) => Ok(self
                .flow(inline)
                .layout(&flow_items(tree, inline), width)
                .height),
            BoxNode::Table(table) => Ok(self.table_placement(tree, table, width)?.1.height),
            BoxNode::EmbeddedObject(object) if object.visible => Ok(object.height),
            BoxNode::EmbeddedObject(_) => Ok(0.0),
        }
    }

    /// Place `id` at `rect` and everything below it
    pub fn allocate(&self, tree: &mut BoxTree, id: NodeId, rect: Rect) -> Result<()> {
        tree.set_bounds(id, rect);
        match node(tree, id)? {
            BoxNode::Block(block) => {
                let block = block.clone();
                self.allocate_block(tree, &block, rect)
            }
            BoxNode::TableCell(cell) => {
                let block = cell.body.clone();
                self.allocate_block(tree, &block, rect)
            }
            BoxNode::Inline(_) => self.allocate_inline(tree, id, rect),
            BoxNode::Table(_) => self.allocate_table(tree, id, rect),
            BoxNode::EmbeddedObject(_) => Ok(()),
        }
    }

    fn flow(&self, inline: &InlineBox) -> InlineFlow {
        InlineFlow::new(inline.wrap, self.config.empty_line_height)
    }

    fn block_width(&self, tree: &BoxTree, block: &BlockBox) -> Result<SizeRequest> {
        let children = visible_children(tree, block);
        let mut request = SizeRequest::default();

        match block.orientation {
            Orientation::Vertical => {
                for child in &children {
                    let child = self.preferred_width(tree, *child)?;
                    request.minimum = request.minimum.max(child.minimum);
                    request.natural = request.natural.max(child.natural);
                }
            }
            Orientation::Horizontal => {
                for child in &children {
                    let child = self.preferred_width(tree, *child)?;
                    request.minimum += child.minimum;
                    request.natural += child.natural;
                }
                let gaps = gaps(block.spacing, children.len());
                request.minimum += gaps;
                request.natural += gaps;
            }
        }

        request.minimum += block.indent;
        request.natural += block.indent;
        Ok(request)
    }

    fn block_height(&self, tree: &BoxTree, block: &BlockBox, width: f32) -> Result<f32> {
        let children = visible_children(tree, block);
        let inner = (width - block.indent).max(0.0);

        match block.orientation {
            Orientation::Vertical => {
                let mut height = gaps(block.spacing, children.len());
                for child in &children {
                    height += self.height_for_width(tree, *child, inner)?;
                }
                Ok(height)
            }
            Orientation::Horizontal => {
                let widths = self.row_widths(tree, block, &children, inner)?;
                let mut height: f32 = 0.0;
                for (child, child_width) in children.iter().zip(widths) {
                    height = height.max(self.height_for_width(tree, *child, child_width)?);
                }
                Ok(height)
            }
        }
    }

    /// Widths of a horizontal block's children: all but the last at their
    /// natural width, the last takes what remains
    fn row_widths(
        &self,
        tree: &BoxTree,
        block: &BlockBox,
        children: &[NodeId],
        width: f32,
    ) -> Result<Vec<f32>> {
        let mut widths = Vec::with_capacity(children.len());
        let mut used = gaps(block.spacing, children.len());
        for (index, child) in children.iter().enumerate() {
            if index + 1 == children.len() {
                let minimum = self.preferred_width(tree, *child)?.minimum;
                widths.push((width - used).max(minimum));
            } else {
                let natural = self.preferred_width(tree, *child)?.natural;
                used += natural;
                widths.push(natural);
            }
        }
        Ok(widths)
    }

    fn allocate_block(&self, tree: &mut BoxTree, block: &BlockBox, rect: Rect) -> Result<()> {
        let children = visible_children(tree, block);
        for child in &block.children {
            if !children.contains(child) {
                tree.set_bounds(*child, Rect::default());
            }
        }

        let x = rect.x + block.indent;
        let inner = (rect.width - block.indent).max(0.0);
        match block.orientation {
            Orientation::Vertical => {
                let mut y = rect.y;
                for child in children {
                    let height = self.height_for_width(tree, child, inner)?;
                    self.allocate(tree, child, Rect::new(x, y, inner, height))?;
                    y += height + block.spacing;
                }
            }
            Orientation::Horizontal => {
                let widths = self.row_widths(tree, block, &children, inner)?;
                let mut x = x;
                for (child, width) in children.into_iter().zip(widths) {
                    let height = self.height_for_width(tree, child, width)?;
                    self.allocate(tree, child, Rect::new(x, rect.y, width, height))?;
                    x += width + block.spacing;
                }
            }
        }
        Ok(())
    }

    fn allocate_inline(&self, tree: &mut BoxTree, id: NodeId, rect: Rect) -> Result<()> {
        let inline = tree.inline(id).ok_or(TreeError::NodeNotFound(id))?;
        let layout = self.flow(inline).layout(&flow_items(tree, inline), rect.width);
        let place = |placement: &Option<Rect>| {
            placement
                .map(|r| r.translate(rect.x, rect.y))
                .unwrap_or_default()
        };

        let objects: Vec<(NodeId, Rect)> = inline
            .items()
            .iter()
            .zip(&layout.placements)
            .filter_map(|(item, placement)| match item {
                InlineItem::Object(object) => Some((*object, place(placement))),
                _ => None,
            })
            .collect();

        let inline = tree.inline_mut(id).ok_or(TreeError::NodeNotFound(id))?;
        for (item, placement) in inline.items_mut().iter_mut().zip(&layout.placements) {
            if let InlineItem::Text(run) = item {
                run.rect = place(placement);
            }
        }
        inline.lines = layout
            .lines
            .into_iter()
            .map(|mut line| {
                line.rect = line.rect.translate(rect.x, rect.y);
                line
            })
            .collect();

        for (object, bounds) in objects {
            tree.set_bounds(object, bounds);
        }
        Ok(())
    }

    fn allocate_table(&self, tree: &mut BoxTree, id: NodeId, rect: Rect) -> Result<()> {
        let table = tree.table(id).ok_or(TreeError::NodeNotFound(id))?;
        let (widths, placement) = self.table_placement(tree, table, rect.width)?;
        let rows = table.rows.clone();

        if let Some(table) = tree.table_mut(id) {
            table.column_widths = widths;
        }
        for (row, rects) in rows.iter().zip(placement.cells) {
            for (cell, cell_rect) in row.iter().zip(rects) {
                self.allocate(tree, *cell, cell_rect.translate(rect.x, rect.y))?;
            }
        }
        Ok(())
    }

    /// Grid shape and per-column width requests of a table
    fn table_columns(
        &self,
        tree: &BoxTree,
        table: &TableBox,
    ) -> Result<(Vec<Vec<GridCell>>, Vec<SizeRequest>)> {
        let grid = grid(tree, table)?;
        let requests = table
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| self.preferred_width(tree, *cell))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        let columns = TableLayout::new(table.spacing)
            .column_requests(&grid, |row, cell| requests[row][cell]);
        Ok((grid, columns))
    }

    /// Column widths and cell rects of a table laid out at `width`
    fn table_placement(
        &self,
        tree: &BoxTree,
        table: &TableBox,
        width: f32,
    ) -> Result<(Vec<f32>, TablePlacement)> {
        let layout = TableLayout::new(table.spacing);
        let (grid, columns) = self.table_columns(tree, table)?;
        let widths = layout.resolve_columns(&columns, width);
        let placement = layout.place_rows(&grid, &widths, |row, cell, cell_width| {
            self.height_for_width(tree, table.rows[row][cell], cell_width)
        })?;
        Ok((widths, placement))
    }
}

fn node(tree: &BoxTree, id: NodeId) -> Result<&BoxNode> {
    Ok(tree.get(id).ok_or(TreeError::NodeNotFound(id))?)
}

fn gaps(spacing: f32, count: usize) -> f32 {
    spacing * count.saturating_sub(1) as f32
}

fn visible_children(tree: &BoxTree, block: &BlockBox) -> Vec<NodeId> {
    block
        .children
        .iter()
        .copied()
        .filter(|child| tree.object(*child).map_or(true, |object| object.visible))
        .collect()
}

/// Flow measurements of an inline container's items
pub fn flow_items(tree: &BoxTree, inline: &InlineBox) -> Vec<FlowItem> {
    inline
        .items()
        .iter()
        .map(|item| match item {
            InlineItem::Text(run) => FlowItem::Text {
                width: run.shaped.width(),
                height: run.shaped.height(),
                baseline: run.shaped.baseline(),
                single_space: run.shaped.is_single_space(),
            },
            InlineItem::Object(id) => match tree.object(*id) {
                Some(object) if object.visible => FlowItem::Object {
                    width: object.width,
                    height: object.height,
                },
                _ => FlowItem::Hidden,
            },
            InlineItem::Break => FlowItem::Break,
        })
        .collect()
}

fn grid(tree: &BoxTree, table: &TableBox) -> Result<Vec<Vec<GridCell>>> {
    table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|id| match node(tree, *id)? {
                    BoxNode::TableCell(cell) => Ok(GridCell::new(
                        usize::from(cell.colspan),
                        usize::from(cell.rowspan),
                    )),
                    _ => Err(TreeError::WrongKind {
                        id: *id,
                        expected: "table cell",
                    }
                    .into()),
                })
                .collect()
        })
        .collect()
}
