//! Declarative node tree — the input to template compilation.
//!
//! A frame's UI is described as a tree of lightweight nodes built with
//! the free functions in this module (`text`, `hbox`, `for_each`, …) and
//! configured with chainable by-value methods. The tree is compiled once
//! with [`crate::template::Template::compile`]; dynamic content flows
//! through [`Value`] handles and per-element render closures, re-read on
//! every render.

use std::rc::Rc;

use crate::border::Border;
use crate::buffer::CharBuffer;
use crate::color::Color;
use crate::layer::Layer;
use crate::style::Style;
use crate::value::Value;

/// A styled run of text inside a rich-text node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    /// The text content.
    pub text: String,
    /// The style applied to this run.
    pub style: Style,
}

impl Span {
    /// Create a span with the default style.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::default(),
        }
    }

    /// Create a span with the given style.
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Width of this span in runes.
    pub fn rune_count(&self) -> u16 {
        self.text.chars().count() as u16
    }
}

/// Sizing parameters shared by all nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlexParams {
    /// Fraction of the parent width (0.0 = unset).
    pub percent_width: f32,
    /// Explicit width in cells (0 = unset).
    pub width: u16,
    /// Explicit height in cells (0 = unset).
    pub height: u16,
    /// Weight for distributing leftover vertical space.
    pub flex_grow: f32,
}

/// A string captured statically or read from a shared handle each frame.
#[derive(Clone, Debug)]
pub(crate) enum StrSource {
    Static(String),
    Shared(Value<String>),
}

impl StrSource {
    pub(crate) fn resolve(&self) -> String {
        match self {
            StrSource::Static(s) => s.clone(),
            StrSource::Shared(v) => v.get(),
        }
    }
}

/// A progress value (0..=100) captured statically or shared.
#[derive(Clone, Debug)]
pub(crate) enum NumSource {
    Static(u8),
    Shared(Value<u8>),
}

/// Rich-text spans captured statically or shared.
#[derive(Clone, Debug)]
pub(crate) enum SpanSource {
    Static(Vec<Span>),
    Shared(Value<Vec<Span>>),
}

/// Measure callback for custom nodes: available width in, (w, h) out.
pub(crate) type MeasureFn = Rc<dyn Fn(u16) -> (u16, u16)>;
/// Render callback for custom nodes: buffer plus the node's (x, y, w, h).
pub(crate) type RenderFn = Rc<dyn Fn(&mut CharBuffer, u16, u16, u16, u16)>;

/// Type-erased item list for iteration nodes: a length plus a node
/// produced per element by the caller's render closure.
pub(crate) trait ItemNodes {
    fn len(&self) -> usize;
    fn node_at(&self, idx: usize) -> Node;
}

struct SliceSource<T> {
    items: Value<Vec<T>>,
    render: Rc<dyn Fn(&T) -> Node>,
}

impl<T> ItemNodes for SliceSource<T> {
    fn len(&self) -> usize {
        self.items.with(|v| v.len())
    }

    fn node_at(&self, idx: usize) -> Node {
        self.items
            .with(|v| v.get(idx).map(|item| (self.render)(item)))
            .unwrap_or_else(|| text(""))
    }
}

/// The node variants. Kept crate-private so the builder surface is the
/// only way to construct trees.
pub(crate) enum NodeKind {
    Text {
        content: StrSource,
    },
    Progress {
        value: NumSource,
        bar_width: u16,
    },
    RichText {
        spans: SpanSource,
    },
    Leader {
        label: StrSource,
        value: StrSource,
        fill: char,
    },
    Container {
        children: Vec<Node>,
        is_row: bool,
        gap: u16,
        border: Option<Border>,
        title: Option<String>,
        border_fg: Color,
    },
    LayerView {
        layer: Layer,
    },
    If {
        cond: Value<bool>,
        then_branch: Box<Node>,
        else_branch: Option<Box<Node>>,
    },
    Condition {
        pred: Rc<dyn Fn() -> bool>,
        then_branch: Box<Node>,
        else_branch: Option<Box<Node>>,
    },
    Switch {
        selector: Rc<dyn Fn() -> i32>,
        cases: Vec<Node>,
        default: Option<Box<Node>>,
    },
    ForEach {
        source: Rc<dyn ItemNodes>,
    },
    SelectionList {
        source: Rc<dyn ItemNodes>,
        selected: Value<usize>,
        marker: String,
        max_visible: u16,
    },
    Custom {
        measure: MeasureFn,
        render: RenderFn,
    },
}

/// One node of a declarative UI tree.
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) style: Style,
    pub(crate) flex: FlexParams,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            style: Style::default(),
            flex: FlexParams::default(),
        }
    }

    /// Set the node's style.
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Set the foreground color (shortcut for a style update).
    #[must_use]
    pub fn fg(mut self, color: Color) -> Self {
        self.style.fg = color;
        self
    }

    /// Set bold (shortcut for a style update).
    #[must_use]
    pub fn bold(mut self) -> Self {
        self.style = self.style.bold();
        self
    }

    /// Set an explicit width in cells.
    #[must_use]
    pub fn width(mut self, width: u16) -> Self {
        self.flex.width = width;
        self
    }

    /// Set an explicit height in cells.
    #[must_use]
    pub fn height(mut self, height: u16) -> Self {
        self.flex.height = height;
        self
    }

    /// Size this node to a fraction of the parent width.
    #[must_use]
    pub fn percent_width(mut self, fraction: f32) -> Self {
        self.flex.percent_width = fraction;
        self
    }

    /// Set the flex-grow weight for leftover vertical space.
    #[must_use]
    pub fn flex_grow(mut self, grow: f32) -> Self {
        self.flex.flex_grow = grow;
        self
    }

    /// Set the gap between container children. No effect on other nodes.
    #[must_use]
    pub fn gap(mut self, gap: u16) -> Self {
        if let NodeKind::Container { gap: g, .. } = &mut self.kind {
            *g = gap;
        }
        self
    }

    /// Set a container border. No effect on other nodes.
    #[must_use]
    pub fn border(mut self, border: Border) -> Self {
        if let NodeKind::Container { border: b, .. } = &mut self.kind {
            *b = Some(border);
        }
        self
    }

    /// Set a container title, drawn into the top border row.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        if let NodeKind::Container { title: t, .. } = &mut self.kind {
            *t = Some(title.into());
        }
        self
    }

    /// Set the border foreground color. No effect on other nodes.
    #[must_use]
    pub fn border_fg(mut self, color: Color) -> Self {
        if let NodeKind::Container { border_fg, .. } = &mut self.kind {
            *border_fg = color;
        }
        self
    }

    /// Set the bar width of a progress node. No effect on other nodes.
    #[must_use]
    pub fn bar_width(mut self, width: u16) -> Self {
        if let NodeKind::Progress { bar_width, .. } = &mut self.kind {
            *bar_width = width;
        }
        self
    }

    /// Set the fill rune of a leader node. No effect on other nodes.
    #[must_use]
    pub fn fill_char(mut self, ch: char) -> Self {
        if let NodeKind::Leader { fill, .. } = &mut self.kind {
            *fill = ch;
        }
        self
    }

    /// Attach an else branch to a conditional. No effect on other nodes.
    #[must_use]
    pub fn or_else(mut self, node: Node) -> Self {
        match &mut self.kind {
            NodeKind::If { else_branch, .. } | NodeKind::Condition { else_branch, .. } => {
                *else_branch = Some(Box::new(node));
            }
            _ => {}
        }
        self
    }

    /// Attach a default branch to a switch. No effect on other nodes.
    #[must_use]
    pub fn default_case(mut self, node: Node) -> Self {
        if let NodeKind::Switch { default, .. } = &mut self.kind {
            *default = Some(Box::new(node));
        }
        self
    }

    /// Set the selection marker of a selection list.
    #[must_use]
    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        if let NodeKind::SelectionList { marker: m, .. } = &mut self.kind {
            *m = marker.into();
        }
        self
    }

    /// Cap the number of visible rows of a selection list.
    #[must_use]
    pub fn max_visible(mut self, rows: u16) -> Self {
        if let NodeKind::SelectionList { max_visible, .. } = &mut self.kind {
            *max_visible = rows;
        }
        self
    }
}

/// A single line of static text.
pub fn text(content: impl Into<String>) -> Node {
    Node::new(NodeKind::Text {
        content: StrSource::Static(content.into()),
    })
}

/// A single line of text read from a shared handle each frame.
pub fn text_value(value: &Value<String>) -> Node {
    Node::new(NodeKind::Text {
        content: StrSource::Shared(value.clone()),
    })
}

/// A progress bar with a static value (0..=100).
pub fn progress(value: u8) -> Node {
    Node::new(NodeKind::Progress {
        value: NumSource::Static(value),
        bar_width: 0,
    })
}

/// A progress bar whose value (0..=100) is read each frame.
pub fn progress_value(value: &Value<u8>) -> Node {
    Node::new(NodeKind::Progress {
        value: NumSource::Shared(value.clone()),
        bar_width: 0,
    })
}

/// A line of styled spans.
pub fn rich(spans: Vec<Span>) -> Node {
    Node::new(NodeKind::RichText {
        spans: SpanSource::Static(spans),
    })
}

/// A line of styled spans read from a shared handle each frame.
pub fn rich_value(value: &Value<Vec<Span>>) -> Node {
    Node::new(NodeKind::RichText {
        spans: SpanSource::Shared(value.clone()),
    })
}

/// A "label .... value" line with a fill rune between the two.
pub fn leader(label: impl Into<String>, value: impl Into<String>) -> Node {
    Node::new(NodeKind::Leader {
        label: StrSource::Static(label.into()),
        value: StrSource::Static(value.into()),
        fill: '.',
    })
}

/// A leader line whose label and value are read each frame.
pub fn leader_values(label: &Value<String>, value: &Value<String>) -> Node {
    Node::new(NodeKind::Leader {
        label: StrSource::Shared(label.clone()),
        value: StrSource::Shared(value.clone()),
        fill: '.',
    })
}

/// A horizontal container: children laid out left to right.
pub fn hbox(children: Vec<Node>) -> Node {
    Node::new(NodeKind::Container {
        children,
        is_row: true,
        gap: 0,
        border: None,
        title: None,
        border_fg: Color::Default,
    })
}

/// A vertical container: children laid out top to bottom.
pub fn vbox(children: Vec<Node>) -> Node {
    Node::new(NodeKind::Container {
        children,
        is_row: false,
        gap: 0,
        border: None,
        title: None,
        border_fg: Color::Default,
    })
}

/// A viewport onto a [`Layer`]. Set the viewport size with
/// [`Node::width`] / [`Node::height`]; height 0 fills remaining space.
pub fn layer_view(layer: &Layer) -> Node {
    Node::new(NodeKind::LayerView {
        layer: layer.clone(),
    })
}

/// Content rendered only while the condition handle is true.
pub fn when(cond: &Value<bool>, then_branch: Node) -> Node {
    Node::new(NodeKind::If {
        cond: cond.clone(),
        then_branch: Box::new(then_branch),
        else_branch: None,
    })
}

/// Content rendered only while the predicate returns true.
pub fn condition(pred: impl Fn() -> bool + 'static, then_branch: Node) -> Node {
    Node::new(NodeKind::Condition {
        pred: Rc::new(pred),
        then_branch: Box::new(then_branch),
        else_branch: None,
    })
}

/// One of several branches chosen by a selector each frame. A selector
/// result of -1 or out of range selects the default branch, or nothing.
pub fn switch(selector: impl Fn() -> i32 + 'static, cases: Vec<Node>) -> Node {
    Node::new(NodeKind::Switch {
        selector: Rc::new(selector),
        cases,
        default: None,
    })
}

/// One node per element of a shared list, stacked vertically.
///
/// The render closure runs once per element per frame. It must be
/// structurally pure: every element must produce the same tree shape,
/// with only the content differing.
pub fn for_each<T: 'static>(
    items: &Value<Vec<T>>,
    render: impl Fn(&T) -> Node + 'static,
) -> Node {
    Node::new(NodeKind::ForEach {
        source: Rc::new(SliceSource {
            items: items.clone(),
            render: Rc::new(render),
        }),
    })
}

/// A windowed list with a marker prefix on the selected element.
///
/// The window follows the selected index. The render closure has the
/// same structural-purity requirement as [`for_each`].
pub fn selection_list<T: 'static>(
    items: &Value<Vec<T>>,
    selected: &Value<usize>,
    render: impl Fn(&T) -> Node + 'static,
) -> Node {
    Node::new(NodeKind::SelectionList {
        source: Rc::new(SliceSource {
            items: items.clone(),
            render: Rc::new(render),
        }),
        selected: selected.clone(),
        marker: "> ".into(),
        max_visible: 0,
    })
}

/// A user-drawn node: `measure` maps available width to (w, h);
/// `render` paints into the buffer at the node's computed rectangle.
pub fn custom(
    measure: impl Fn(u16) -> (u16, u16) + 'static,
    render: impl Fn(&mut CharBuffer, u16, u16, u16, u16) + 'static,
) -> Node {
    Node::new(NodeKind::Custom {
        measure: Rc::new(measure),
        render: Rc::new(render),
    })
}
