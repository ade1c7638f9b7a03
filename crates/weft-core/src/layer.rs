//! Scrollable layer — an offscreen buffer with viewport and scroll state.
//!
//! A layer owns a [`CharBuffer`] that is usually taller than the region
//! it is shown in. A `LayerView` node blits the viewport rectangle into
//! the frame buffer; scrolling moves the rectangle. Content is rendered
//! lazily: the layer re-renders only when the viewport width changes
//! (or on every prepare when `always_render` is set).

use std::cell::RefCell;
use std::rc::Rc;

use crate::buffer::CharBuffer;
use crate::template::Template;

/// Cursor position and visibility within a layer's content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CursorState {
    /// Column within the layer's content.
    pub x: u16,
    /// Row within the layer's content.
    pub y: u16,
    /// Whether the cursor should be shown.
    pub visible: bool,
}

enum LayerContent {
    None,
    Template {
        tmpl: Template,
        width: u16,
        height: u16,
    },
    Callback {
        render: Box<dyn FnMut(&mut CharBuffer, u16, u16)>,
        width: u16,
        height: u16,
    },
}

struct LayerInner {
    buffer: Option<CharBuffer>,
    content: LayerContent,
    scroll_y: u16,
    viewport_w: u16,
    viewport_h: u16,
    last_render_w: u16,
    last_render_h: u16,
    always_render: bool,
    cursor: CursorState,
    origin: (u16, u16),
}

impl LayerInner {
    fn content_height(&self) -> u16 {
        self.buffer.as_ref().map_or(0, CharBuffer::height)
    }

    fn max_scroll(&self) -> u16 {
        self.content_height().saturating_sub(self.viewport_h)
    }

    fn clamp_scroll(&mut self) {
        self.scroll_y = self.scroll_y.min(self.max_scroll());
    }
}

/// A shared handle to a scrollable offscreen layer.
///
/// Cloning produces another handle to the same layer; `LayerView` nodes
/// hold one clone, the owning widget holds another.
#[derive(Clone)]
pub struct Layer(Rc<RefCell<LayerInner>>);

impl Layer {
    /// Create an empty layer. The buffer is allocated when content is set.
    #[must_use]
    pub fn new() -> Self {
        Layer(Rc::new(RefCell::new(LayerInner {
            buffer: None,
            content: LayerContent::None,
            scroll_y: 0,
            viewport_w: 0,
            viewport_h: 0,
            last_render_w: 0,
            last_render_h: 0,
            always_render: false,
            cursor: CursorState::default(),
            origin: (0, 0),
        })))
    }

    /// Set the layer's content to a compiled template rendered at the
    /// given content size. A zero dimension makes this a no-op and the
    /// layer stays empty.
    pub fn set_content(&self, tmpl: Template, width: u16, height: u16) {
        if width == 0 || height == 0 {
            return;
        }
        let mut inner = self.0.borrow_mut();
        inner.buffer = Some(CharBuffer::new(width, height));
        inner.content = LayerContent::Template {
            tmpl,
            width,
            height,
        };
        inner.last_render_w = 0;
        inner.last_render_h = 0;
        inner.clamp_scroll();
    }

    /// Set the layer's content to a render callback invoked with the
    /// buffer and the render dimensions. A zero dimension is a no-op.
    pub fn set_render(
        &self,
        render: impl FnMut(&mut CharBuffer, u16, u16) + 'static,
        width: u16,
        height: u16,
    ) {
        if width == 0 || height == 0 {
            return;
        }
        let mut inner = self.0.borrow_mut();
        inner.buffer = Some(CharBuffer::new(width, height));
        inner.content = LayerContent::Callback {
            render: Box::new(render),
            width,
            height,
        };
        inner.last_render_w = 0;
        inner.last_render_h = 0;
        inner.clamp_scroll();
    }

    /// Replace the layer's buffer with pre-rendered content.
    pub fn set_buffer(&self, buf: CharBuffer) {
        let mut inner = self.0.borrow_mut();
        inner.last_render_w = buf.width();
        inner.last_render_h = buf.height();
        inner.buffer = Some(buf);
        inner.content = LayerContent::None;
        inner.clamp_scroll();
    }

    /// Force a re-render on every prepare call.
    pub fn set_always_render(&self, always: bool) {
        self.0.borrow_mut().always_render = always;
    }

    /// Update the viewport dimensions. Scroll position is re-clamped.
    pub fn set_viewport(&self, width: u16, height: u16) {
        let mut inner = self.0.borrow_mut();
        inner.viewport_w = width;
        inner.viewport_h = height;
        inner.clamp_scroll();
    }

    /// Current viewport dimensions.
    pub fn viewport(&self) -> (u16, u16) {
        let inner = self.0.borrow();
        (inner.viewport_w, inner.viewport_h)
    }

    /// Re-render the content if the viewport width changed since the
    /// last render, the layer has never rendered, or `always_render` is
    /// set. Height changes alone do not re-render: the viewport crops
    /// the existing buffer.
    pub fn prepare(&self) {
        let mut inner = self.0.borrow_mut();
        let inner = &mut *inner;

        let (content_w, content_h) = match &inner.content {
            LayerContent::None => return,
            LayerContent::Template { width, height, .. }
            | LayerContent::Callback { width, height, .. } => (*width, *height),
        };

        let render_w = if inner.viewport_w > 0 {
            inner.viewport_w
        } else {
            content_w
        };
        if !inner.always_render && inner.last_render_w != 0 && inner.last_render_w == render_w {
            return;
        }

        let buf = inner
            .buffer
            .get_or_insert_with(|| CharBuffer::new(render_w, content_h));
        if buf.width() != render_w || buf.height() != content_h {
            buf.resize(render_w, content_h);
        }
        buf.clear();
        match &mut inner.content {
            LayerContent::Template { tmpl, .. } => tmpl.render(buf, render_w, content_h),
            LayerContent::Callback { render, .. } => render(buf, render_w, content_h),
            LayerContent::None => {}
        }
        inner.last_render_w = render_w;
        inner.last_render_h = content_h;
        inner.scroll_y = inner.scroll_y.min(content_h.saturating_sub(inner.viewport_h));
        tracing::trace!(target: "weft::layer", render_w, content_h, "layer re-rendered");
    }

    /// Copy the viewport rectangle of the layer's buffer into `dest` at
    /// (x, y), clipped to `w` × `h`.
    pub fn blit(&self, dest: &mut CharBuffer, x: u16, y: u16, w: u16, h: u16) {
        let mut inner = self.0.borrow_mut();
        inner.origin = (x, y);
        let scroll_y = inner.scroll_y;
        let Some(buf) = &inner.buffer else {
            return;
        };
        let copy_w = w.min(buf.width());
        for cy in 0..h {
            let src_y = scroll_y.saturating_add(cy);
            if src_y >= buf.height() {
                break;
            }
            for cx in 0..copy_w {
                if let Some(cell) = buf.get(cx, src_y) {
                    dest.set_fast(x + cx, y + cy, *cell);
                }
            }
        }
    }

    /// Current scroll offset.
    pub fn scroll_y(&self) -> u16 {
        self.0.borrow().scroll_y
    }

    /// Scroll to an absolute row, clamped to the content.
    pub fn scroll_to(&self, y: u16) {
        let mut inner = self.0.borrow_mut();
        inner.scroll_y = y.min(inner.max_scroll());
    }

    /// Scroll down by `n` rows.
    pub fn scroll_down(&self, n: u16) {
        let mut inner = self.0.borrow_mut();
        inner.scroll_y = inner.scroll_y.saturating_add(n).min(inner.max_scroll());
    }

    /// Scroll up by `n` rows.
    pub fn scroll_up(&self, n: u16) {
        let mut inner = self.0.borrow_mut();
        inner.scroll_y = inner.scroll_y.saturating_sub(n);
    }

    /// Scroll down by one viewport height.
    pub fn page_down(&self) {
        let n = self.0.borrow().viewport_h;
        self.scroll_down(n);
    }

    /// Scroll up by one viewport height.
    pub fn page_up(&self) {
        let n = self.0.borrow().viewport_h;
        self.scroll_up(n);
    }

    /// Scroll down by half a viewport height.
    pub fn half_page_down(&self) {
        let n = self.0.borrow().viewport_h / 2;
        self.scroll_down(n.max(1));
    }

    /// Scroll up by half a viewport height.
    pub fn half_page_up(&self) {
        let n = self.0.borrow().viewport_h / 2;
        self.scroll_up(n.max(1));
    }

    /// Scroll to the top of the content.
    pub fn scroll_to_top(&self) {
        self.0.borrow_mut().scroll_y = 0;
    }

    /// Scroll to the end of the content.
    pub fn scroll_to_end(&self) {
        let mut inner = self.0.borrow_mut();
        inner.scroll_y = inner.max_scroll();
    }

    /// Place the cursor within the layer's content.
    pub fn set_cursor(&self, x: u16, y: u16) {
        let mut inner = self.0.borrow_mut();
        inner.cursor.x = x;
        inner.cursor.y = y;
    }

    /// Make the cursor visible.
    pub fn show_cursor(&self) {
        self.0.borrow_mut().cursor.visible = true;
    }

    /// Hide the cursor.
    pub fn hide_cursor(&self) {
        self.0.borrow_mut().cursor.visible = false;
    }

    /// The cursor's on-screen position after the last blit: the blit
    /// origin plus the cursor offset minus the scroll. Visibility is
    /// false when the cursor is scrolled outside the viewport.
    pub fn screen_cursor(&self) -> (u16, u16, bool) {
        let inner = self.0.borrow();
        let (ox, oy) = inner.origin;
        if inner.cursor.y < inner.scroll_y {
            return (ox, oy, false);
        }
        let rel_y = inner.cursor.y - inner.scroll_y;
        let visible = inner.cursor.visible
            && rel_y < inner.viewport_h
            && inner.cursor.x < inner.viewport_w;
        (ox + inner.cursor.x, oy + rel_y, visible)
    }
}

impl Default for Layer {
    fn default() -> Self {
        Self::new()
    }
}
