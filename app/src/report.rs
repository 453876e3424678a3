//! Plain-text dump of a laid-out box tree

use box_tree::{BoxNode, BoxTree, ControlKind, InlineBox, InlineItem, NodeId, ObjectContent};
use std::fmt::Write;

/// One line per box with its placement; inline containers list their lines
pub fn layout_report(tree: &BoxTree) -> String {
    let mut out = String::new();
    write_node(&mut out, tree, tree.root(), 0);
    out
}

fn write_node(out: &mut String, tree: &BoxTree, id: NodeId, depth: usize) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    let rect = tree.bounds(id);
    let _ = writeln!(
        out,
        "{}{} at ({}, {}) size {}x{}",
        indent,
        describe(node),
        rect.x,
        rect.y,
        rect.width,
        rect.height
    );

    match node {
        BoxNode::Inline(inline) => write_lines(out, tree, inline, &indent),
        _ => {
            for child in tree.children(id) {
                write_node(out, tree, child, depth + 1);
            }
        }
    }
}

fn describe(node: &BoxNode) -> String {
    match node {
        BoxNode::Table(table) => format!("table [{} rows]", table.rows.len()),
        BoxNode::TableCell(cell) if cell.colspan > 1 || cell.rowspan > 1 => {
            format!("table cell [{}x{}]", cell.colspan, cell.rowspan)
        }
        BoxNode::EmbeddedObject(object) => object_label(&object.content),
        _ => node.kind_name().to_string(),
    }
}

fn object_label(content: &ObjectContent) -> String {
    match content {
        ObjectContent::Image(image) => format!("[image {}]", image.source),
        ObjectContent::Label(text) => format!("[{}]", text.text()),
        ObjectContent::Control(control) => match &control.kind {
            ControlKind::SubmitButton { label } => format!("[button {}]", label),
            ControlKind::Checkbox { checked: true } => "[x]".to_string(),
            ControlKind::Checkbox { checked: false } => "[ ]".to_string(),
            ControlKind::TextField { value } => format!("[field {:?}]", value),
            ControlKind::Select { options, selected } => {
                let label = selected
                    .and_then(|index| options.get(index))
                    .map_or("", |option| option.label.as_str());
                format!("[select {}]", label)
            }
        },
    }
}

fn write_lines(out: &mut String, tree: &BoxTree, inline: &InlineBox, indent: &str) {
    for line in &inline.lines {
        let mut text = String::new();
        for item in inline.items().get(line.items.clone()).unwrap_or_default() {
            match item {
                InlineItem::Text(run) => text.push_str(run.text()),
                InlineItem::Object(id) => {
                    if let Some(object) = tree.object(*id).filter(|object| object.visible) {
                        text.push_str(&object_label(&object.content));
                    }
                }
                InlineItem::Break => {}
            }
        }
        let _ = writeln!(out, "{}  | {}", indent, text.trim_end());
    }
}
