//! The box tree arena

use crate::{
    AnchorTable, AnchorTarget, BlockBox, BoxNode, EmbeddedObject, Form, FormId, InlineBox,
    InlineItem, Link, LinkId, NodeId, Rect, Result, TableBox, TreeError,
};

#[derive(Debug, Clone)]
struct NodeSlot {
    node: BoxNode,
    parent: Option<NodeId>,
    bounds: Rect,
}

/// A document's boxes, links, forms, and anchors.
///
/// Node 0 is the root block. Nodes are only ever appended, so ids stay
/// valid for the life of the tree.
#[derive(Debug, Clone)]
pub struct BoxTree {
    nodes: Vec<NodeSlot>,
    links: Vec<Link>,
    forms: Vec<Form>,
    anchors: AnchorTable,
    needs_layout: bool,
}

impl BoxTree {
    /// Create a new tree holding only a vertical root block
    pub fn new(root_spacing: f32) -> Self {
        Self {
            nodes: vec![NodeSlot {
                node: BoxNode::Block(BlockBox::vertical(root_spacing)),
                parent: None,
                bounds: Rect::default(),
            }],
            links: Vec::new(),
            forms: Vec::new(),
            anchors: AnchorTable::new(),
            needs_layout: true,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::from_index(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Append `node` as the last child of `parent`.
    ///
    /// Objects appended to an inline container also become its next flow
    /// item; cells appended to a table go into its last row.
    pub fn append(&mut self, parent: NodeId, node: BoxNode) -> Result<NodeId> {
        let id = NodeId::from_index(self.nodes.len());
        let child_kind = node.kind_name();
        let slot = self
            .nodes
            .get_mut(parent.index())
            .ok_or(TreeError::NodeNotFound(parent))?;

        let is_cell = matches!(node, BoxNode::TableCell(_));
        match &mut slot.node {
            BoxNode::Block(block) if !is_cell => block.children.push(id),
            BoxNode::TableCell(cell) if !is_cell => cell.body.children.push(id),
            BoxNode::Inline(inline) if matches!(node, BoxNode::EmbeddedObject(_)) => {
                inline.push_object(id);
            }
            BoxNode::Table(table) if is_cell => match table.rows.last_mut() {
                Some(row) => row.push(id),
                None => return Err(TreeError::NoTableRow(parent)),
            },
            parent_node => {
                return Err(TreeError::CannotContain {
                    parent: parent_node.kind_name(),
                    child: child_kind,
                })
            }
        }

        self.nodes.push(NodeSlot {
            node,
            parent: Some(parent),
            bounds: Rect::default(),
        });
        self.needs_layout = true;
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&BoxNode> {
        self.nodes.get(id.index()).map(|slot| &slot.node)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut BoxNode> {
        self.nodes.get_mut(id.index()).map(|slot| &mut slot.node)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index()).and_then(|slot| slot.parent)
    }

    /// Allocation from the last layout pass
    pub fn bounds(&self, id: NodeId) -> Rect {
        self.nodes
            .get(id.index())
            .map(|slot| slot.bounds)
            .unwrap_or_default()
    }

    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) {
        if let Some(slot) = self.nodes.get_mut(id.index()) {
            slot.bounds = bounds;
        }
    }

    pub fn inline(&self, id: NodeId) -> Option<&InlineBox> {
        match self.get(id)? {
            BoxNode::Inline(inline) => Some(inline),
            _ => None,
        }
    }

    pub fn inline_mut(&mut self, id: NodeId) -> Option<&mut InlineBox> {
        match self.get_mut(id)? {
            BoxNode::Inline(inline) => Some(inline),
            _ => None,
        }
    }

    pub fn table(&self, id: NodeId) -> Option<&TableBox> {
        match self.get(id)? {
            BoxNode::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn table_mut(&mut self, id: NodeId) -> Option<&mut TableBox> {
        match self.get_mut(id)? {
            BoxNode::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn object(&self, id: NodeId) -> Option<&EmbeddedObject> {
        match self.get(id)? {
            BoxNode::EmbeddedObject(object) => Some(object),
            _ => None,
        }
    }

    pub fn object_mut(&mut self, id: NodeId) -> Option<&mut EmbeddedObject> {
        match self.get_mut(id)? {
            BoxNode::EmbeddedObject(object) => Some(object),
            _ => None,
        }
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id).map(BoxNode::children).unwrap_or_default()
    }

    /// `id` and all of its descendants in reading order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if self.get(next).is_none() {
                continue;
            }
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    /// Every inline container in reading order
    pub fn inline_containers(&self) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|id| self.inline(*id).is_some())
            .collect()
    }

    pub fn add_link(&mut self, link: Link) -> LinkId {
        let id = LinkId(self.links.len() as u32);
        if let Some(inline) = self.inline_mut(link.container) {
            inline.links.push(id);
        }
        self.links.push(link);
        id
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.index())
    }

    pub fn link_mut(&mut self, id: LinkId) -> Option<&mut Link> {
        self.links.get_mut(id.index())
    }

    pub fn links(&self) -> impl Iterator<Item = (LinkId, &Link)> {
        self.links
            .iter()
            .enumerate()
            .map(|(index, link)| (LinkId(index as u32), link))
    }

    pub fn add_form(&mut self, form: Form) -> FormId {
        self.forms.push(form);
        FormId(self.forms.len() as u32 - 1)
    }

    pub fn form(&self, id: FormId) -> Result<&Form> {
        self.forms.get(id.index()).ok_or(TreeError::FormNotFound(id))
    }

    pub fn form_mut(&mut self, id: FormId) -> Result<&mut Form> {
        self.forms
            .get_mut(id.index())
            .ok_or(TreeError::FormNotFound(id))
    }

    pub fn anchors(&self) -> &AnchorTable {
        &self.anchors
    }

    pub fn anchors_mut(&mut self) -> &mut AnchorTable {
        &mut self.anchors
    }

    /// Where an anchor target was placed by the last layout pass
    pub fn target_rect(&self, target: AnchorTarget) -> Option<Rect> {
        match target {
            AnchorTarget::Object(id) => self.get(id).map(|_| self.bounds(id)),
            AnchorTarget::Text { container, item } => {
                match self.inline(container)?.items().get(item)? {
                    InlineItem::Text(run) => Some(run.rect),
                    _ => None,
                }
            }
        }
    }

    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    /// Request a layout pass, e.g. after an image arrived
    pub fn mark_dirty(&mut self) {
        self.needs_layout = true;
    }

    pub fn mark_clean(&mut self) {
        self.needs_layout = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Control, ControlKind, FormEncoding, FormMethod, FormField, ObjectContent, TableCellBox,
    };
    use text_engine::TextRunCache;
    use url::Url;

    fn text_field(tree: &mut BoxTree, parent: NodeId, value: &str) -> NodeId {
        let control = Control {
            kind: ControlKind::TextField {
                value: value.into(),
            },
            form: None,
        };
        tree.append(
            parent,
            BoxNode::EmbeddedObject(EmbeddedObject::new(ObjectContent::Control(control), 150.0, 24.0)),
        )
        .unwrap()
    }

    #[test]
    fn test_append_and_reading_order() {
        let mut tree = BoxTree::new(10.0);
        let root = tree.root();
        let first = tree.append(root, BoxNode::Inline(InlineBox::new(true))).unwrap();
        let table = tree.append(root, BoxNode::Table(TableBox::new(10.0))).unwrap();
        tree.table_mut(table).unwrap().add_row();
        let cell = tree
            .append(
                table,
                BoxNode::TableCell(TableCellBox::new(BlockBox::vertical(10.0), 1, 1)),
            )
            .unwrap();
        let second = tree.append(cell, BoxNode::Inline(InlineBox::new(true))).unwrap();

        assert_eq!(tree.inline_containers(), vec![first, second]);
        assert_eq!(tree.parent(second), Some(cell));
        assert_eq!(tree.children(table), vec![cell]);
    }

    #[test]
    fn test_append_rejects_invalid_children() {
        let mut tree = BoxTree::new(10.0);
        let root = tree.root();
        let inline = tree.append(root, BoxNode::Inline(InlineBox::new(true))).unwrap();
        assert!(tree
            .append(inline, BoxNode::Block(BlockBox::vertical(0.0)))
            .is_err());

        let table = tree.append(root, BoxNode::Table(TableBox::new(10.0))).unwrap();
        let cell = BoxNode::TableCell(TableCellBox::new(BlockBox::vertical(10.0), 1, 1));
        assert!(matches!(
            tree.append(table, cell.clone()),
            Err(TreeError::NoTableRow(_))
        ));
        assert!(tree.append(root, cell).is_err());
    }

    #[test]
    fn test_object_becomes_flow_item() {
        let mut tree = BoxTree::new(10.0);
        let root = tree.root();
        let inline = tree.append(root, BoxNode::Inline(InlineBox::new(true))).unwrap();
        let field = text_field(&mut tree, inline, "x");
        assert_eq!(tree.inline(inline).unwrap().objects().collect::<Vec<_>>(), vec![field]);
        assert_eq!(tree.inline(inline).unwrap().text_len(), 0);
    }

    #[test]
    fn test_link_is_indexed_by_container() {
        let mut tree = BoxTree::new(10.0);
        let root = tree.root();
        let inline = tree.append(root, BoxNode::Inline(InlineBox::new(true))).unwrap();
        let id = tree.add_link(Link::new("a.html", inline, 0));
        assert_eq!(tree.inline(inline).unwrap().links, vec![id]);
        assert_eq!(tree.link(id).unwrap().href, "a.html");
    }

    #[test]
    fn test_get_and_post_submissions() {
        let mut tree = BoxTree::new(10.0);
        let root = tree.root();
        let inline = tree.append(root, BoxNode::Inline(InlineBox::new(true))).unwrap();
        let query = text_field(&mut tree, inline, "rust lang");
        let page = text_field(&mut tree, inline, "2&3");

        let action = Url::parse("http://example.com/search?old=1").unwrap();
        let mut form = Form::new(FormMethod::Get, FormEncoding::UrlEncoded, action);
        form.fields.push(FormField {
            name: "q".into(),
            control: query,
        });
        form.fields.push(FormField {
            name: "page".into(),
            control: page,
        });
        let id = tree.add_form(form);

        let get = tree.form(id).unwrap().submission(&tree).unwrap();
        assert_eq!(get.url.as_str(), "http://example.com/search?q=rust%20lang&page=2%263");
        assert_eq!(get.body, None);

        tree.form_mut(id).unwrap().method = FormMethod::Post;
        let post = tree.form(id).unwrap().submission(&tree).unwrap();
        assert_eq!(post.body.as_deref(), Some("q=rust%20lang&page=2%263"));
        assert_eq!(post.url.query(), Some("old=1"));

        tree.form_mut(id).unwrap().encoding = FormEncoding::Multipart;
        assert!(matches!(
            tree.form(id).unwrap().submission(&tree),
            Err(TreeError::UnsupportedEncoding(FormEncoding::Multipart))
        ));
    }

    #[test]
    fn test_target_rect_for_text() {
        let mut tree = BoxTree::new(10.0);
        let root = tree.root();
        let inline = tree.append(root, BoxNode::Inline(InlineBox::new(true))).unwrap();
        let mut cache = TextRunCache::default();
        let item = tree.inline_mut(inline).unwrap().push_text(cache.get("here", &[]));
        if let InlineItem::Text(run) = &mut tree.inline_mut(inline).unwrap().items_mut()[item] {
            run.rect = Rect::new(5.0, 40.0, 30.0, 16.0);
        }
        let target = AnchorTarget::Text {
            container: inline,
            item,
        };
        assert_eq!(tree.target_rect(target), Some(Rect::new(5.0, 40.0, 30.0, 16.0)));
    }
}
