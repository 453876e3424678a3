//! Box node types

use crate::{FormId, InlineBox, NodeId};
use serde::{Deserialize, Serialize};
use text_engine::ShapedTextHandle;
use url::Url;

/// Stacking direction of a block's children
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Vertical,
    /// Children side by side; used for list item rows (marker, then body)
    Horizontal,
}

/// A container that stacks its children
#[derive(Debug, Clone, Default)]
pub struct BlockBox {
    pub orientation: Orientation,
    /// Gap between adjacent visible children
    pub spacing: f32,
    /// Leading indentation applied to every child
    pub indent: f32,
    pub children: Vec<NodeId>,
}

impl BlockBox {
    /// Create a new vertical block
    pub fn vertical(spacing: f32) -> Self {
        Self {
            orientation: Orientation::Vertical,
            spacing,
            ..Default::default()
        }
    }

    /// Create a new horizontal block
    pub fn horizontal(spacing: f32) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            spacing,
            ..Default::default()
        }
    }

    pub fn with_indent(mut self, indent: f32) -> Self {
        self.indent = indent;
        self
    }
}

/// A table: rows of cell ids
#[derive(Debug, Clone, Default)]
pub struct TableBox {
    /// Gap between columns
    pub spacing: f32,
    pub rows: Vec<Vec<NodeId>>,
    /// Column widths from the last layout pass
    pub column_widths: Vec<f32>,
}

impl TableBox {
    /// Create a new empty table
    pub fn new(spacing: f32) -> Self {
        Self {
            spacing,
            ..Default::default()
        }
    }

    /// Start a new empty row
    pub fn add_row(&mut self) {
        self.rows.push(Vec::new());
    }

    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }
}

/// A table cell: a block with span counts, each in `1..=65534`
#[derive(Debug, Clone)]
pub struct TableCellBox {
    pub body: BlockBox,
    pub colspan: u16,
    pub rowspan: u16,
}

impl TableCellBox {
    /// Largest accepted span count
    pub const MAX_SPAN: u16 = 65534;

    pub fn new(body: BlockBox, colspan: u16, rowspan: u16) -> Self {
        Self {
            body,
            colspan: colspan.clamp(1, Self::MAX_SPAN),
            rowspan: rowspan.clamp(1, Self::MAX_SPAN),
        }
    }
}

/// Decoded image dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// An image placeholder, filled in when its fetch completes
#[derive(Debug, Clone)]
pub struct ImageObject {
    pub source: Url,
    pub loaded: Option<ImageSize>,
}

/// An option of a choice control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Interactive form control state
#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    SubmitButton { label: String },
    Checkbox { checked: bool },
    TextField { value: String },
    Select {
        options: Vec<SelectOption>,
        selected: Option<usize>,
    },
}

/// A form control and the form it submits
#[derive(Debug, Clone)]
pub struct Control {
    pub kind: ControlKind,
    pub form: Option<FormId>,
}

impl Control {
    /// Value contributed to a url-encoded submission, if any
    pub fn submitted_value(&self) -> Option<&str> {
        match &self.kind {
            ControlKind::TextField { value } => Some(value),
            ControlKind::Select { options, selected } => {
                selected.and_then(|index| options.get(index)).map(|option| option.value.as_str())
            }
            ControlKind::SubmitButton { .. } | ControlKind::Checkbox { .. } => None,
        }
    }
}

/// Payload of an embedded object
#[derive(Debug, Clone)]
pub enum ObjectContent {
    Image(ImageObject),
    Control(Control),
    /// Static text such as a list marker
    Label(ShapedTextHandle),
}

/// An atomic object placed inline or as a block child
#[derive(Debug, Clone)]
pub struct EmbeddedObject {
    pub content: ObjectContent,
    pub width: f32,
    pub height: f32,
    /// Hidden objects are never laid out or drawn
    pub visible: bool,
}

impl EmbeddedObject {
    /// Create a new visible object with an intrinsic size
    pub fn new(content: ObjectContent, width: f32, height: f32) -> Self {
        Self {
            content,
            width,
            height,
            visible: true,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn control(&self) -> Option<&Control> {
        match &self.content {
            ObjectContent::Control(control) => Some(control),
            _ => None,
        }
    }

    pub fn control_mut(&mut self) -> Option<&mut Control> {
        match &mut self.content {
            ObjectContent::Control(control) => Some(control),
            _ => None,
        }
    }
}

/// A node of the box tree
#[derive(Debug, Clone)]
pub enum BoxNode {
    Block(BlockBox),
    Inline(InlineBox),
    Table(TableBox),
    TableCell(TableCellBox),
    EmbeddedObject(EmbeddedObject),
}

impl BoxNode {
    pub fn kind_name(&self) -> &'static str {
        match self {
            BoxNode::Block(_) => "block",
            BoxNode::Inline(_) => "inline",
            BoxNode::Table(_) => "table",
            BoxNode::TableCell(_) => "table cell",
            BoxNode::EmbeddedObject(_) => "embedded object",
        }
    }

    /// Whether this node stacks block-level children (blocks and cells)
    pub fn is_block_container(&self) -> bool {
        matches!(self, BoxNode::Block(_) | BoxNode::TableCell(_))
    }

    pub fn as_block(&self) -> Option<&BlockBox> {
        match self {
            BoxNode::Block(block) => Some(block),
            BoxNode::TableCell(cell) => Some(&cell.body),
            _ => None,
        }
    }

    /// Child nodes in reading order
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            BoxNode::Block(block) => block.children.clone(),
            BoxNode::TableCell(cell) => cell.body.children.clone(),
            BoxNode::Inline(inline) => inline.objects().collect(),
            BoxNode::Table(table) => table.rows.iter().flatten().copied().collect(),
            BoxNode::EmbeddedObject(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_spans_are_clamped() {
        let cell = TableCellBox::new(BlockBox::vertical(10.0), 0, u16::MAX);
        assert_eq!(cell.colspan, 1);
        assert_eq!(cell.rowspan, TableCellBox::MAX_SPAN);
    }

    #[test]
    fn test_select_submits_selected_value() {
        let control = Control {
            kind: ControlKind::Select {
                options: vec![
                    SelectOption {
                        value: "a".into(),
                        label: "Alpha".into(),
                    },
                    SelectOption {
                        value: "b".into(),
                        label: "Beta".into(),
                    },
                ],
                selected: Some(1),
            },
            form: None,
        };
        assert_eq!(control.submitted_value(), Some("b"));

        let checkbox = Control {
            kind: ControlKind::Checkbox { checked: true },
            form: None,
        };
        assert_eq!(checkbox.submitted_value(), None);
    }
}
