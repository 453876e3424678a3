//! The document view
//!
//! Loading runs through four states: a request is issued, headers arrive
//! (the old tree is dropped and a fresh builder created), markup chunks
//! are fed, and the load finishes or fails. Every transfer carries the
//! generation it was requested under; anything reported for an older
//! generation is dropped.

use crate::{
    NavigationRequest, PageAction, PageConfig, PageError, PointerButton, Result, StatusMessage,
};
use box_tree::{
    BoxTree, ControlKind, EmbeddedObject, FormId, ImageSize, LinkId, NodeId, ObjectContent,
    Point, TextPosition, TreeError,
};
use doc_builder::{BoxTreeBuilder, FetchError, FetchRequest, Generation, ImageTicket, MarkupEvent};
use layout_engine::{HitTester, LayoutEngine};
use selection_engine::{reading_order, SearchEngine, SearchMatch, SelectionModel};
use text_engine::TextRunCache;
use tracing::{debug, info, warn};
use url::Url;

/// Where the current navigation stands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet
    #[default]
    Idle,
    Requesting,
    GotHeaders,
    Loading,
    Ready,
    Failed,
}

impl LoadState {
    fn accepts_markup(self) -> bool {
        matches!(self, LoadState::GotHeaders | LoadState::Loading)
    }
}

/// Outcome of a layout pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPass {
    /// Width the root was laid out at; never below its minimum width
    pub width: f32,
    pub height: f32,
    /// Pending scroll to the document's fragment, once its leaf is placed
    pub scroll_to: Option<f32>,
}

/// A document view and the input routed to it
pub struct Page {
    config: PageConfig,
    cache: TextRunCache,
    engine: LayoutEngine,
    generation: Generation,
    load_state: LoadState,
    builder: Option<BoxTreeBuilder>,
    selection: SelectionModel,
    search: SearchEngine,
    selected_text: String,
    status: Vec<StatusMessage>,
    viewport_width: f32,
    hovered: Option<LinkId>,
    focused: Option<LinkId>,
}

impl Page {
    /// Create a new empty page
    pub fn new(config: PageConfig) -> Self {
        let engine = LayoutEngine::new(config.layout.clone());
        Self {
            config,
            cache: TextRunCache::default(),
            engine,
            generation: Generation::default(),
            load_state: LoadState::Idle,
            builder: None,
            selection: SelectionModel::new(),
            search: SearchEngine::new(),
            selected_text: String::new(),
            status: Vec::new(),
            viewport_width: 0.0,
            hovered: None,
            focused: None,
        }
    }

    /// Share an existing word cache, e.g. one kept across tabs
    pub fn with_cache(mut self, cache: TextRunCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// The displayed document's tree
    pub fn tree(&self) -> Option<&BoxTree> {
        self.builder.as_ref().map(BoxTreeBuilder::tree)
    }

    pub fn document_uri(&self) -> Option<&Url> {
        self.builder.as_ref().map(BoxTreeBuilder::document_uri)
    }

    pub fn cache(&self) -> &TextRunCache {
        &self.cache
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    /// Text of the last finished drag
    pub fn selected_text(&self) -> &str {
        &self.selected_text
    }

    pub fn focused_link(&self) -> Option<LinkId> {
        self.focused
    }

    /// Status messages posted since the last call
    pub fn take_status(&mut self) -> Vec<StatusMessage> {
        std::mem::take(&mut self.status)
    }

    /// Image fetches the host should start
    pub fn take_fetch_requests(&mut self) -> Vec<FetchRequest> {
        self.builder
            .as_mut()
            .map(BoxTreeBuilder::take_fetch_requests)
            .unwrap_or_default()
    }

    /// Whether the tree changed since the last layout pass
    pub fn needs_layout(&self) -> bool {
        self.tree().is_some_and(BoxTree::needs_layout)
    }

    // Navigation

    /// Request `href`, resolved against the current document
    pub fn navigate(&mut self, href: &str) -> Result<NavigationRequest> {
        let url = match self.document_uri() {
            Some(base) => base.join(href)?,
            None => Url::parse(href)?,
        };
        Ok(self.request(url))
    }

    /// The host received response headers; `url` is the final URI after
    /// redirects
    pub fn headers_received(&mut self, generation: Generation, url: Url) -> bool {
        if generation != self.generation || self.load_state != LoadState::Requesting {
            debug!(generation = generation.0, "Dropping stale headers");
            return false;
        }

        let mut builder = BoxTreeBuilder::new(url, generation, self.config.builder.clone());
        builder.set_viewport_width(self.viewport_width);
        self.builder = Some(builder);
        self.selection = SelectionModel::new();
        self.search = SearchEngine::new();
        self.selected_text.clear();
        self.hovered = None;
        self.focused = None;
        self.set_state(LoadState::GotHeaders, StatusMessage::GotHeaders);
        true
    }

    /// Feed a chunk of markup events
    pub fn chunk_received(
        &mut self,
        generation: Generation,
        events: impl IntoIterator<Item = MarkupEvent>,
    ) -> bool {
        if generation != self.generation || !self.load_state.accepts_markup() {
            debug!(generation = generation.0, "Dropping stale markup");
            return false;
        }
        let Some(builder) = self.builder.as_mut() else {
            return false;
        };
        builder.feed(&mut self.cache, events);
        if self.load_state != LoadState::Loading {
            self.set_state(LoadState::Loading, StatusMessage::Loading);
        }
        true
    }

    /// The transfer completed
    pub fn load_finished(&mut self, generation: Generation) -> Result<bool> {
        if generation != self.generation || !self.load_state.accepts_markup() {
            debug!(generation = generation.0, "Dropping stale completion");
            return Ok(false);
        }
        let builder = self.builder.as_mut().ok_or(PageError::NoDocument)?;
        builder.finish(&mut self.cache)?;

        let stats = self.cache.stats();
        info!(
            entries = self.cache.len(),
            hits = stats.hits,
            misses = stats.misses,
            "Document loaded"
        );
        self.set_state(LoadState::Ready, StatusMessage::Ready);
        Ok(true)
    }

    /// The transfer failed before or while the document arrived
    pub fn load_failed(&mut self, generation: Generation, reason: &str) -> bool {
        if generation != self.generation
            || matches!(self.load_state, LoadState::Ready | LoadState::Failed)
        {
            return false;
        }
        warn!(generation = generation.0, reason, "Document failed to load");
        if let Some(builder) = self.builder.as_mut() {
            builder.deactivate();
        }
        self.set_state(LoadState::Failed, StatusMessage::LoadFailed);
        true
    }

    /// An image fetch completed; returns true when the tree changed
    pub fn image_loaded(
        &mut self,
        ticket: ImageTicket,
        result: std::result::Result<ImageSize, FetchError>,
    ) -> bool {
        let Some(builder) = self.builder.as_mut() else {
            return false;
        };
        if ticket.generation != self.generation || !builder.is_active() {
            debug!(node = %ticket.node, "Dropping stale image completion");
            return false;
        }
        if result.is_err() {
            let source = match builder.tree().object(ticket.node).map(|object| &object.content) {
                Some(ObjectContent::Image(image)) => image.source.to_string(),
                _ => String::new(),
            };
            self.status.push(StatusMessage::ImageFailed(source));
        }
        builder.image_loaded(ticket, result)
    }

    // Layout

    /// Lay the document out for a viewport `width` wide
    pub fn layout(&mut self, width: f32) -> Result<LayoutPass> {
        self.viewport_width = width;
        let builder = self.builder.as_mut().ok_or(PageError::NoDocument)?;
        builder.set_viewport_width(width);
        let target = builder.take_scroll_target();

        let tree = builder.tree_mut();
        let height = self.engine.layout_document(tree, width)?;
        let scroll_to = target.and_then(|target| tree.target_rect(target)).map(|rect| rect.y);
        if let Some(y) = scroll_to {
            debug!(y, "Scrolling to the document fragment");
        }
        Ok(LayoutPass {
            width: tree.bounds(tree.root()).width,
            height,
            scroll_to,
        })
    }

    // Pointer

    /// A button went down: the primary button starts a drag selection
    pub fn pointer_pressed(&mut self, point: Point, button: PointerButton) {
        if button != PointerButton::Primary {
            return;
        }
        let Some(builder) = self.builder.as_mut() else {
            return;
        };
        let anchor = HitTester::new(builder.tree(), self.cache.shaper()).position_at(point);
        let tree = builder.tree_mut();
        match anchor {
            Some(anchor) => self.selection.start_drag(tree, anchor),
            None => self.selection.clear(tree),
        }
        self.selected_text.clear();
    }

    /// Extend a drag in progress, or report the link under the pointer
    pub fn pointer_moved(&mut self, point: Point) {
        let Some(builder) = self.builder.as_mut() else {
            return;
        };
        let (anchor, link) = {
            let tester = HitTester::new(builder.tree(), self.cache.shaper());
            (tester.position_at(point), tester.link_at(point))
        };

        if self.selection.is_active() {
            if let Some(anchor) = anchor {
                self.selection.extend_to(builder.tree_mut(), anchor);
            }
            return;
        }

        if link != self.hovered {
            self.hovered = link;
            let message = link
                .and_then(|id| link_url(builder, id))
                .map_or(StatusMessage::Cleared, |url| {
                    StatusMessage::LinkTarget(url.to_string())
                });
            self.status.push(message);
        }
    }

    /// A button came up: finish a drag, or activate what is under the
    /// pointer when nothing was selected. The middle button opens links in
    /// a new tab.
    pub fn pointer_released(&mut self, point: Point, button: PointerButton) -> Option<PageAction> {
        let builder = self.builder.as_mut()?;
        if self.selection.is_active() {
            self.selected_text = self.selection.end_drag(builder.tree());
            if !self.selected_text.is_empty() {
                debug!(bytes = self.selected_text.len(), "Selection finished");
                return None;
            }
        }

        let (link, control) = {
            let tree = builder.tree();
            let tester = HitTester::new(tree, self.cache.shaper());
            let control = tester
                .object_at(point)
                .filter(|id| tree.object(*id).is_some_and(|object| object.control().is_some()));
            (tester.link_at(point), control)
        };
        match button {
            PointerButton::Primary => {
                if let Some(link) = link {
                    return self.follow_link(link, false);
                }
                match self.activate_control(control?) {
                    Ok(action) => action,
                    Err(err) => {
                        debug!(%err, "Control not activated");
                        None
                    }
                }
            }
            PointerButton::Middle => self.follow_link(link?, true),
            PointerButton::Secondary => None,
        }
    }

    // Links

    /// Follow a link: scroll for a fragment of this document, otherwise
    /// navigate or ask for a new tab
    pub fn follow_link(&mut self, link: LinkId, new_tab: bool) -> Option<PageAction> {
        let builder = self.builder.as_ref()?;
        let href = builder.tree().link(link)?.href.clone();
        if !new_tab {
            if let Some(fragment) = href.strip_prefix('#') {
                return self.scroll_to_fragment(fragment);
            }
        }

        let url = link_url(builder, link)?;
        if new_tab {
            debug!(%url, "Opening link in a new tab");
            return Some(PageAction::OpenInNewTab(url));
        }
        Some(PageAction::Navigate(self.request(url)))
    }

    /// Scroll position of the leaf bound to `name`
    pub fn scroll_to_fragment(&self, name: &str) -> Option<PageAction> {
        let tree = self.tree()?;
        let Some(target) = tree.anchors().get(name) else {
            debug!(name, "No anchor for fragment");
            return None;
        };
        tree.target_rect(target)
            .map(|rect| PageAction::ScrollTo(rect.y))
    }

    /// Move keyboard focus to the next link in reading order; after the
    /// last link focus leaves the links and the next call starts over
    pub fn focus_next_link(&mut self) -> Option<LinkId> {
        let builder = self.builder.as_ref()?;
        let tree = builder.tree();
        let mut links: Vec<(LinkId, TextPosition)> = tree
            .links()
            .map(|(id, link)| (id, TextPosition::new(link.container, link.range.start)))
            .collect();
        links.sort_by(|a, b| reading_order(tree, a.1, b.1));

        let current = self
            .focused
            .and_then(|focused| links.iter().position(|(id, _)| *id == focused));
        let next = match current {
            Some(index) => links.get(index + 1),
            None => links.first(),
        }
        .map(|(id, _)| *id);

        let message = next
            .and_then(|id| link_url(builder, id))
            .map_or(StatusMessage::Cleared, |url| {
                StatusMessage::LinkTarget(url.to_string())
            });
        self.status.push(message);
        self.focused = next;
        next
    }

    /// Follow the focused link
    pub fn activate_focused_link(&mut self, new_tab: bool) -> Option<PageAction> {
        let link = self.focused?;
        self.follow_link(link, new_tab)
    }

    // Forms

    /// Activate a control: buttons and text fields submit their form,
    /// checkboxes toggle
    pub fn activate_control(&mut self, node: NodeId) -> Result<Option<PageAction>> {
        let builder = self.builder.as_mut().ok_or(PageError::NoDocument)?;
        let control = builder
            .tree_mut()
            .object_mut(node)
            .and_then(EmbeddedObject::control_mut)
            .ok_or(PageError::NotAControl(node))?;

        let submits = match &mut control.kind {
            ControlKind::Checkbox { checked } => {
                *checked = !*checked;
                false
            }
            ControlKind::Select { .. } => false,
            ControlKind::SubmitButton { .. } | ControlKind::TextField { .. } => true,
        };
        match (submits, control.form) {
            (true, Some(form)) => self.submit_form(form),
            (true, None) => {
                debug!(%node, "Control outside any form");
                Ok(None)
            }
            (false, _) => Ok(None),
        }
    }

    /// Replace a text field's value
    pub fn set_text_field(&mut self, node: NodeId, text: &str) -> Result<()> {
        let builder = self.builder.as_mut().ok_or(PageError::NoDocument)?;
        match builder
            .tree_mut()
            .object_mut(node)
            .and_then(EmbeddedObject::control_mut)
            .map(|control| &mut control.kind)
        {
            Some(ControlKind::TextField { value }) => {
                *value = text.to_string();
                Ok(())
            }
            _ => Err(PageError::NotAControl(node)),
        }
    }

    /// Pick an option of a choice control; out-of-range indices are ignored
    pub fn choose_option(&mut self, node: NodeId, index: usize) -> Result<()> {
        let builder = self.builder.as_mut().ok_or(PageError::NoDocument)?;
        match builder
            .tree_mut()
            .object_mut(node)
            .and_then(EmbeddedObject::control_mut)
            .map(|control| &mut control.kind)
        {
            Some(ControlKind::Select { options, selected }) => {
                if index < options.len() {
                    *selected = Some(index);
                }
                Ok(())
            }
            _ => Err(PageError::NotAControl(node)),
        }
    }

    /// Submit a form. Encodings other than url-encoded are logged and
    /// ignored.
    pub fn submit_form(&mut self, form: FormId) -> Result<Option<PageAction>> {
        let tree = self.tree().ok_or(PageError::NoDocument)?;
        let submission = match tree.form(form)?.submission(tree) {
            Ok(submission) => submission,
            Err(TreeError::UnsupportedEncoding(encoding)) => {
                warn!(?encoding, "Form encoding not supported, submission ignored");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        let generation = self.begin_request();
        Ok(Some(PageAction::Navigate(NavigationRequest::from_submission(
            generation, submission,
        ))))
    }

    // Find

    /// Next match of `pattern` after the current one
    pub fn find(&mut self, pattern: &str) -> Option<SearchMatch> {
        let builder = self.builder.as_mut()?;
        let tree = builder.tree_mut();
        self.selection.clear(tree);
        self.selected_text.clear();
        self.search.find(tree, pattern)
    }

    /// Re-search for an edited pattern from the current match
    pub fn refine_find(&mut self, pattern: &str) -> Option<SearchMatch> {
        let builder = self.builder.as_mut()?;
        let tree = builder.tree_mut();
        self.selection.clear(tree);
        self.selected_text.clear();
        self.search.refine(tree, pattern)
    }

    pub fn cancel_find(&mut self) {
        if let Some(builder) = self.builder.as_mut() {
            self.search.cancel(builder.tree_mut());
        }
    }

    fn request(&mut self, url: Url) -> NavigationRequest {
        let generation = self.begin_request();
        debug!(generation = generation.0, %url, "Navigating");
        NavigationRequest::get(generation, url)
    }

    /// Invalidate everything in flight and hand out a new generation
    fn begin_request(&mut self) -> Generation {
        if let Some(builder) = self.builder.as_mut() {
            builder.deactivate();
        }
        self.generation = self.generation.next();
        self.set_state(LoadState::Requesting, StatusMessage::Requesting);
        self.generation
    }

    fn set_state(&mut self, state: LoadState, message: StatusMessage) {
        self.load_state = state;
        self.status.push(message);
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(PageConfig::default())
    }
}

/// Absolute target of a link
fn link_url(builder: &BoxTreeBuilder, id: LinkId) -> Option<Url> {
    let href = &builder.tree().link(id)?.href;
    match builder.document_uri().join(href) {
        Ok(url) => Some(url),
        Err(err) => {
            warn!(href, %err, "Unresolvable link target");
            None
        }
    }
}
