//! Incremental box tree construction
//!
//! The builder keeps an insertion stack whose bottom is the root block. Text
//! always lands in an inline container on top of the stack; structural tags
//! push blocks, list rows, tables, and cells, and their end tags pop back to
//! the frame they pushed.

use crate::{
    attr, scale_to_fit, tags, BuildError, BuilderConfig, FetchError, FetchRequest, Generation,
    ImageTicket, MarkupEvent, Result, SpanStack, TextPiece, WhitespaceState,
};
use box_tree::{
    AnchorTarget, BlockBox, BoxNode, BoxTree, Control, ControlKind, EmbeddedObject, Form,
    FormEncoding, FormField, FormId, FormMethod, ImageObject, ImageSize, InlineBox, Link, LinkId, NodeId,
    ObjectContent, SelectOption, TableBox, TableCellBox,
};
use text_engine::TextRunCache;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Root,
    Inline,
    List { counted: bool },
    ListItemRow,
    ListItemBody,
    Definition,
    Table,
    Cell,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: NodeId,
    kind: FrameKind,
}

#[derive(Debug, Clone, Default)]
struct PendingOption {
    value: Option<String>,
    label: String,
    selected: bool,
}

#[derive(Debug, Clone)]
struct OpenSelect {
    node: NodeId,
    option: Option<PendingOption>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScrollState {
    Waiting,
    Requested(AnchorTarget),
    Done,
}

/// Builds one document's box tree from markup events
pub struct BoxTreeBuilder {
    config: BuilderConfig,
    document_uri: Url,
    generation: Generation,
    active: bool,
    finished: bool,
    tree: BoxTree,
    stack: Vec<Frame>,
    spans: SpanStack,
    whitespace: WhitespaceState,
    pending_word: String,
    /// Offset of the pending word's end in the current inline container
    text_position: usize,
    ignore_depth: usize,
    list_counters: Vec<u32>,
    current_link: Option<LinkId>,
    current_form: Option<FormId>,
    open_select: Option<OpenSelect>,
    queued_ids: Vec<String>,
    scroll: ScrollState,
    fetches: Vec<FetchRequest>,
    viewport_width: f32,
}

impl BoxTreeBuilder {
    /// Create a new builder for the document at `document_uri`
    pub fn new(document_uri: Url, generation: Generation, config: BuilderConfig) -> Self {
        let tree = BoxTree::new(config.root_spacing);
        let root = Frame {
            node: tree.root(),
            kind: FrameKind::Root,
        };
        Self {
            config,
            document_uri,
            generation,
            active: true,
            finished: false,
            tree,
            stack: vec![root],
            spans: SpanStack::new(),
            whitespace: WhitespaceState::default(),
            pending_word: String::new(),
            text_position: 0,
            ignore_depth: 0,
            list_counters: Vec::new(),
            current_link: None,
            current_form: None,
            open_select: None,
            queued_ids: Vec::new(),
            scroll: ScrollState::Waiting,
            fetches: Vec::new(),
            viewport_width: 0.0,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Stop reacting to events and completions
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn document_uri(&self) -> &Url {
        &self.document_uri
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn tree(&self) -> &BoxTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut BoxTree {
        &mut self.tree
    }

    /// Width images are scaled down to
    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width;
    }

    /// Image fetches issued since the last call
    pub fn take_fetch_requests(&mut self) -> Vec<FetchRequest> {
        std::mem::take(&mut self.fetches)
    }

    /// The leaf named by the document's fragment, reported once
    pub fn take_scroll_target(&mut self) -> Option<AnchorTarget> {
        match self.scroll {
            ScrollState::Requested(target) => {
                self.scroll = ScrollState::Done;
                Some(target)
            }
            _ => None,
        }
    }

    pub fn feed(&mut self, cache: &mut TextRunCache, events: impl IntoIterator<Item = MarkupEvent>) {
        for event in events {
            match event {
                MarkupEvent::Start { name, attrs } => self.start_element(cache, &name, &attrs),
                MarkupEvent::Characters(text) => self.characters(cache, &text),
                MarkupEvent::End { name } => self.end_element(cache, &name),
            }
        }
    }

    pub fn start_element(&mut self, cache: &mut TextRunCache, name: &str, attrs: &[(String, String)]) {
        if !self.accepts_events() {
            return;
        }
        let tag = name.to_ascii_lowercase();
        let tag = tag.as_str();

        if self.top().kind == FrameKind::Inline {
            if tags::is_flushing(tag) {
                self.flush_word(cache);
                self.whitespace.prev_space = true;
            }
            if tags::is_blocking(tag) {
                self.stack.pop();
            }
        }

        if let Some(id) = attr(attrs, "id") {
            self.queued_ids.push(id.to_string());
        }
        if tag == "a" {
            if let Some(name) = attr(attrs, "name") {
                self.queued_ids.push(name.to_string());
            }
        }

        match tag {
            "ul" | "ol" | "dl" => self.open_list(tag),
            "li" => self.open_list_item(cache),
            "dd" => {
                let block = BlockBox::vertical(self.config.list_body_spacing)
                    .with_indent(self.config.definition_indent);
                self.push_node(BoxNode::Block(block), FrameKind::Definition);
            }
            "table" => {
                let table = TableBox::new(self.config.table_spacing);
                self.push_node(BoxNode::Table(table), FrameKind::Table);
            }
            "tr" => self.open_row(),
            "td" | "th" => self.open_cell(attrs),
            "pre" => {
                self.whitespace.preformatted = true;
                self.push_inline(false);
            }
            "br" => {
                if let Some(container) = self.ensure_inline() {
                    if let Some(inline) = self.tree.inline_mut(container) {
                        inline.push_break();
                    }
                }
            }
            "img" => self.add_image(attrs),
            "input" => self.add_input(cache, attrs),
            "select" => self.open_select(attrs),
            "option" => self.open_option(attrs),
            "a" => self.open_link(attrs),
            "form" => self.open_form(attrs),
            _ if tags::is_ignored(tag) => self.ignore_depth += 1,
            _ => {}
        }

        let at = self.pending_word.len();
        for style in tags::style_attrs(tag, &self.config) {
            self.spans.open(style, at);
        }
    }

    pub fn characters(&mut self, cache: &mut TextRunCache, text: &str) {
        if !self.accepts_events() || self.ignore_depth > 0 {
            return;
        }
        if let Some(select) = self.open_select.as_mut() {
            if let Some(option) = select.option.as_mut() {
                option.label.push_str(text);
            }
            return;
        }
        if self.top().kind == FrameKind::Table {
            return;
        }
        let pieces = self.whitespace.split(text);
        if pieces
            .iter()
            .all(|piece| matches!(piece, TextPiece::WordEnd(word) if word.is_empty()))
        {
            return;
        }
        let Some(container) = self.ensure_inline() else {
            return;
        };

        for piece in pieces {
            match piece {
                TextPiece::WordEnd(segment) => {
                    self.pending_word.push_str(segment);
                    self.text_position += segment.len();
                    self.flush_word(cache);
                }
                TextPiece::Space => {
                    self.emit_word(cache, " ");
                    self.text_position += 1;
                }
                TextPiece::Break => {
                    if let Some(inline) = self.tree.inline_mut(container) {
                        inline.push_break();
                    }
                }
                TextPiece::Partial(segment) => {
                    self.pending_word.push_str(segment);
                    self.text_position += segment.len();
                }
            }
        }
    }

    pub fn end_element(&mut self, cache: &mut TextRunCache, name: &str) {
        if !self.accepts_events() {
            return;
        }
        let tag = name.to_ascii_lowercase();
        let tag = tag.as_str();

        if self.top().kind == FrameKind::Inline {
            if tags::is_flushing(tag) {
                self.flush_word(cache);
            }
            if tags::is_blocking(tag) {
                self.stack.pop();
                self.whitespace.prev_space = true;
            }
        }

        match tag {
            "ul" | "ol" | "dl" => self.pop_to(|kind| matches!(kind, FrameKind::List { .. })),
            "li" => self.pop_to(|kind| kind == FrameKind::ListItemRow),
            "dd" => self.pop_to(|kind| kind == FrameKind::Definition),
            "table" => self.pop_to(|kind| kind == FrameKind::Table),
            "td" | "th" => self.close_open_cell(),
            "pre" => self.whitespace.preformatted = false,
            "select" => self.close_select(cache),
            "option" => self.finish_option(),
            "a" => self.close_link(),
            "form" => self.current_form = None,
            _ if tags::is_ignored(tag) => self.ignore_depth = self.ignore_depth.saturating_sub(1),
            _ => {}
        }

        let at = self.pending_word.len();
        for style in tags::style_attrs(tag, &self.config).iter().rev() {
            self.spans.close(style.kind(), at);
        }
    }

    /// Emit the trailing word and close anything still open
    pub fn finish(&mut self, cache: &mut TextRunCache) -> Result<()> {
        if !self.active {
            return Err(BuildError::Inactive(self.generation.0));
        }
        if self.finished {
            return Ok(());
        }
        if self.top().kind == FrameKind::Inline {
            self.flush_word(cache);
        }
        self.close_select(cache);
        self.close_link();
        self.finished = true;
        tracing::debug!(
            generation = self.generation.0,
            nodes = self.tree.len(),
            links = self.tree.links().count(),
            "document built"
        );
        Ok(())
    }

    /// Apply a finished image fetch; returns true when the tree changed
    pub fn image_loaded(
        &mut self,
        ticket: ImageTicket,
        result: std::result::Result<ImageSize, FetchError>,
    ) -> bool {
        if !self.active || ticket.generation != self.generation {
            tracing::debug!(node = %ticket.node, "dropping stale image completion");
            return false;
        }
        let size = match result {
            Ok(size) => size,
            Err(err) => {
                tracing::warn!(node = %ticket.node, %err, "image failed to load");
                return false;
            }
        };

        let (width, height) = scale_to_fit(size, self.viewport_width);
        let Some(object) = self.tree.object_mut(ticket.node) else {
            return false;
        };
        let ObjectContent::Image(image) = &mut object.content else {
            return false;
        };
        image.loaded = Some(size);
        object.width = width;
        object.height = height;
        self.tree.mark_dirty();
        true
    }

    fn accepts_events(&self) -> bool {
        self.active && !self.finished
    }

    fn top(&self) -> Frame {
        self.stack.last().copied().unwrap_or(Frame {
            node: self.tree.root(),
            kind: FrameKind::Root,
        })
    }

    fn push_node(&mut self, node: BoxNode, kind: FrameKind) -> Option<NodeId> {
        match self.tree.append(self.top().node, node) {
            Ok(id) => {
                self.stack.push(Frame { node: id, kind });
                Some(id)
            }
            Err(err) => {
                tracing::debug!(%err, "skipping misplaced element");
                None
            }
        }
    }

    fn push_inline(&mut self, wrap: bool) -> Option<NodeId> {
        let id = self.push_node(BoxNode::Inline(InlineBox::new(wrap)), FrameKind::Inline)?;
        self.text_position = 0;
        Some(id)
    }

    fn ensure_inline(&mut self) -> Option<NodeId> {
        let top = self.top();
        if top.kind == FrameKind::Inline {
            return Some(top.node);
        }
        self.push_inline(true)
    }

    /// Pop frames until `len` remain, unwinding list counters on the way
    fn truncate_stack(&mut self, len: usize) {
        while self.stack.len() > len.max(1) {
            if let Some(Frame {
                kind: FrameKind::List { counted: true },
                ..
            }) = self.stack.pop()
            {
                self.list_counters.pop();
            }
        }
    }

    /// Pop back through the nearest frame matching `matches`, without
    /// leaving the innermost table unless the match is that table
    fn pop_to(&mut self, matches: impl Fn(FrameKind) -> bool) {
        for index in (1..self.stack.len()).rev() {
            let kind = self.stack[index].kind;
            if matches(kind) {
                self.truncate_stack(index);
                return;
            }
            if kind == FrameKind::Table {
                return;
            }
        }
    }

    fn emit_word(&mut self, cache: &mut TextRunCache, word: &str) {
        if word.is_empty() {
            return;
        }
        let top = self.top();
        if top.kind != FrameKind::Inline {
            tracing::debug!(word, "dropping word outside an inline container");
            return;
        }

        let shaped = cache.get(word, self.spans.current());
        self.spans.shift(word.len());
        let Some(inline) = self.tree.inline_mut(top.node) else {
            return;
        };
        let item = inline.push_text(shaped);
        self.tree.mark_dirty();
        self.bind_queued(AnchorTarget::Text {
            container: top.node,
            item,
        });
    }

    fn flush_word(&mut self, cache: &mut TextRunCache) {
        if self.pending_word.is_empty() {
            return;
        }
        let word = std::mem::take(&mut self.pending_word);
        self.emit_word(cache, &word);
    }

    fn bind_queued(&mut self, target: AnchorTarget) {
        if self.queued_ids.is_empty() {
            return;
        }
        let fragment = self.document_uri.fragment().map(str::to_string);
        for name in std::mem::take(&mut self.queued_ids) {
            if self.scroll == ScrollState::Waiting && fragment.as_deref() == Some(name.as_str()) {
                self.scroll = ScrollState::Requested(target);
            }
            self.tree.anchors_mut().bind(name, target);
        }
    }

    fn open_list(&mut self, tag: &str) {
        let counted = tag != "dl";
        let block = BlockBox::vertical(self.config.list_spacing);
        if self
            .push_node(BoxNode::Block(block), FrameKind::List { counted })
            .is_some()
            && counted
        {
            self.list_counters.push(if tag == "ol" { 1 } else { 0 });
        }
    }

    /// Leave an unclosed list item before its next sibling
    fn close_open_item(&mut self) {
        for index in (1..self.stack.len()).rev() {
            match self.stack[index].kind {
                FrameKind::List { .. } | FrameKind::Table => return,
                FrameKind::ListItemRow => {
                    if matches!(self.stack[index - 1].kind, FrameKind::List { .. }) {
                        self.truncate_stack(index);
                    }
                    return;
                }
                _ => {}
            }
        }
    }

    fn open_list_item(&mut self, cache: &mut TextRunCache) {
        self.close_open_item();
        let is_block = self
            .tree
            .get(self.top().node)
            .is_some_and(BoxNode::is_block_container);
        let Some(counter) = self.list_counters.last_mut().filter(|_| is_block) else {
            return;
        };
        let marker = tags::list_marker(*counter);
        if *counter > 0 {
            *counter += 1;
        }

        let row = BlockBox::horizontal(self.config.list_marker_gap);
        let Some(row) = self.push_node(BoxNode::Block(row), FrameKind::ListItemRow) else {
            return;
        };
        let label = cache.get(&marker, &[]);
        let object = EmbeddedObject::new(ObjectContent::Label(label.clone()), label.width(), label.height());
        if let Err(err) = self.tree.append(row, BoxNode::EmbeddedObject(object)) {
            tracing::debug!(%err, "list marker not added");
        }
        let body = BlockBox::vertical(self.config.list_body_spacing);
        self.push_node(BoxNode::Block(body), FrameKind::ListItemBody);
    }

    /// Leave a cell left open by tag soup before the next row or cell
    fn close_open_cell(&mut self) {
        if let Some(table) = self.stack.iter().rposition(|frame| frame.kind == FrameKind::Table) {
            if self
                .stack
                .get(table + 1)
                .is_some_and(|frame| frame.kind == FrameKind::Cell)
            {
                self.truncate_stack(table + 1);
            }
        }
    }

    fn open_row(&mut self) {
        self.close_open_cell();
        let top = self.top();
        if top.kind != FrameKind::Table {
            return;
        }
        if let Some(table) = self.tree.table_mut(top.node) {
            table.add_row();
            self.tree.mark_dirty();
        }
    }

    fn open_cell(&mut self, attrs: &[(String, String)]) {
        self.close_open_cell();
        let top = self.top();
        let has_rows = self.tree.table(top.node).is_some_and(TableBox::has_rows);
        if top.kind != FrameKind::Table || !has_rows {
            return;
        }
        let cell = TableCellBox::new(
            BlockBox::vertical(self.config.cell_spacing),
            tags::parse_span(attr(attrs, "colspan")),
            tags::parse_span(attr(attrs, "rowspan")),
        );
        self.push_node(BoxNode::TableCell(cell), FrameKind::Cell);
    }

    fn append_object(&mut self, container: NodeId, object: EmbeddedObject) -> Option<NodeId> {
        match self.tree.append(container, BoxNode::EmbeddedObject(object)) {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::debug!(%err, "embedded object not added");
                None
            }
        }
    }

    fn add_image(&mut self, attrs: &[(String, String)]) {
        let Some(container) = self.ensure_inline() else {
            return;
        };
        let Some(src) = attr(attrs, "src") else {
            return;
        };
        let source = match self.document_uri.join(src) {
            Ok(source) => source,
            Err(err) => {
                tracing::warn!(src, %err, "unresolvable image source");
                return;
            }
        };

        let image = ImageObject {
            source: source.clone(),
            loaded: None,
        };
        let object = EmbeddedObject::new(ObjectContent::Image(image), 0.0, 0.0);
        let Some(node) = self.append_object(container, object) else {
            return;
        };
        if let Some(link) = self.current_link.and_then(|id| self.tree.link_mut(id)) {
            link.objects.push(node);
        }
        self.bind_queued(AnchorTarget::Object(node));
        self.fetches.push(FetchRequest {
            ticket: ImageTicket {
                generation: self.generation,
                node,
            },
            url: source,
        });
    }

    fn add_input(&mut self, cache: &mut TextRunCache, attrs: &[(String, String)]) {
        let Some(container) = self.ensure_inline() else {
            return;
        };
        let input_type = attr(attrs, "type").unwrap_or("text").to_ascii_lowercase();
        let value = attr(attrs, "value");

        let (kind, width, height) = match input_type.as_str() {
            "submit" => {
                let label = value.unwrap_or("submit").to_string();
                let width = cache.get(&label, &[]).width() + 2.0 * self.config.button_padding;
                (ControlKind::SubmitButton { label }, width, self.config.control_height)
            }
            "checkbox" => (
                ControlKind::Checkbox {
                    checked: attr(attrs, "checked").is_some(),
                },
                self.config.checkbox_size,
                self.config.checkbox_size,
            ),
            _ => (
                ControlKind::TextField {
                    value: value.unwrap_or_default().to_string(),
                },
                self.config.text_field_width,
                self.config.control_height,
            ),
        };

        let control = Control {
            kind,
            form: self.current_form,
        };
        let mut object = EmbeddedObject::new(ObjectContent::Control(control), width, height);
        if input_type == "hidden" {
            object = object.hidden();
        }
        if let Some(node) = self.append_object(container, object) {
            self.register_field(attrs, node);
        }
    }

    fn register_field(&mut self, attrs: &[(String, String)], control: NodeId) {
        let (Some(form), Some(name)) = (self.current_form, attr(attrs, "name")) else {
            return;
        };
        if let Ok(form) = self.tree.form_mut(form) {
            form.fields.push(FormField {
                name: name.to_string(),
                control,
            });
        }
    }

    fn open_select(&mut self, attrs: &[(String, String)]) {
        let Some(container) = self.ensure_inline() else {
            return;
        };
        let control = Control {
            kind: ControlKind::Select {
                options: Vec::new(),
                selected: None,
            },
            form: self.current_form,
        };
        let object = EmbeddedObject::new(
            ObjectContent::Control(control),
            self.config.select_arrow_width,
            self.config.control_height,
        );
        if let Some(node) = self.append_object(container, object) {
            self.register_field(attrs, node);
            self.open_select = Some(OpenSelect { node, option: None });
        }
    }

    fn open_option(&mut self, attrs: &[(String, String)]) {
        if self.open_select.is_none() {
            return;
        }
        self.finish_option();
        if let Some(select) = self.open_select.as_mut() {
            select.option = Some(PendingOption {
                value: attr(attrs, "value").map(str::to_string),
                label: String::new(),
                selected: attr(attrs, "selected").is_some(),
            });
        }
    }

    fn finish_option(&mut self) {
        let Some(select) = self.open_select.as_mut() else {
            return;
        };
        let Some(option) = select.option.take() else {
            return;
        };
        let node = select.node;
        let label = option.label.split_whitespace().collect::<Vec<_>>().join(" ");
        let value = option.value.unwrap_or_else(|| label.clone());

        let Some(control) = self.tree.object_mut(node).and_then(EmbeddedObject::control_mut) else {
            return;
        };
        if let ControlKind::Select { options, selected } = &mut control.kind {
            options.push(SelectOption { value, label });
            if option.selected {
                *selected = Some(options.len() - 1);
            }
        }
    }

    fn close_select(&mut self, cache: &mut TextRunCache) {
        self.finish_option();
        let Some(select) = self.open_select.take() else {
            return;
        };
        let arrow = self.config.select_arrow_width;
        let Some(object) = self.tree.object_mut(select.node) else {
            return;
        };
        let mut widest: f32 = 0.0;
        if let ObjectContent::Control(Control {
            kind: ControlKind::Select { options, selected },
            ..
        }) = &mut object.content
        {
            if selected.is_none() && !options.is_empty() {
                *selected = Some(0);
            }
            for option in options.iter() {
                widest = widest.max(cache.get(&option.label, &[]).width());
            }
        }
        object.width = widest + arrow;
        self.tree.mark_dirty();
    }

    fn open_link(&mut self, attrs: &[(String, String)]) {
        let Some(container) = self.ensure_inline() else {
            return;
        };
        if let Some(href) = attr(attrs, "href") {
            let link = Link::new(href, container, self.text_position);
            self.current_link = Some(self.tree.add_link(link));
        }
    }

    fn close_link(&mut self) {
        let Some(id) = self.current_link.take() else {
            return;
        };
        let top = self.top();
        let Some(container) = self.tree.link(id).map(|link| link.container) else {
            return;
        };
        let end = if top.kind == FrameKind::Inline && top.node == container {
            self.text_position
        } else {
            self.tree.inline(container).map_or(0, InlineBox::text_len)
        };
        if let Some(link) = self.tree.link_mut(id) {
            link.range.end = end.max(link.range.start);
        }
    }

    fn open_form(&mut self, attrs: &[(String, String)]) {
        let action = match attr(attrs, "action") {
            Some(action) => self.document_uri.join(action).unwrap_or_else(|err| {
                tracing::warn!(action, %err, "unresolvable form action, using the document URI");
                self.document_uri.clone()
            }),
            None => self.document_uri.clone(),
        };
        let form = Form::new(
            FormMethod::from_attr(attr(attrs, "method")),
            FormEncoding::from_attr(attr(attrs, "enctype")),
            action,
        );
        self.current_form = Some(self.tree.add_form(form));
    }
}
