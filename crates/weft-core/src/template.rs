//! Compiled template — a flattened, level-indexed operation list.
//!
//! A declarative [`Node`] tree is compiled once into an ordered list of
//! operations. Each op burns in how its value is read (static capture vs
//! shared handle) so the per-frame render never re-inspects the tree.
//! Conditional branches compile into eager sub-templates; iteration
//! bodies are compiled per element per frame from the caller's render
//! closure. Geometry and leaf scratches live beside the ops and are
//! overwritten every frame.

use std::rc::Rc;

use crate::border::Border;
use crate::buffer::CharBuffer;
use crate::color::Color;
use crate::error::{Result, WeftError};
use crate::layer::Layer;
use crate::node::{
    FlexParams, ItemNodes, MeasureFn, Node, NodeKind, NumSource, RenderFn, Span, SpanSource,
    StrSource,
};
use crate::style::Style;
use crate::value::Value;

/// One operation of a compiled template.
pub(crate) struct Op {
    pub kind: OpKind,
    pub parent: Option<usize>,
    pub level: usize,
    pub style: Style,
    pub flex: FlexParams,
}

/// Operation kinds. The `*Static` / `*Ptr` split is decided at compile
/// time: the kind itself encodes how the value is read each frame.
pub(crate) enum OpKind {
    TextStatic {
        text: String,
    },
    TextPtr {
        value: Value<String>,
    },
    ProgressStatic {
        value: u8,
        bar_width: u16,
    },
    ProgressPtr {
        value: Value<u8>,
        bar_width: u16,
    },
    RichStatic {
        spans: Vec<Span>,
    },
    RichPtr {
        value: Value<Vec<Span>>,
    },
    LeaderStatic {
        label: String,
        value: String,
        fill: char,
    },
    LeaderPtr {
        label: StrSource,
        value: StrSource,
        fill: char,
    },
    ContainerStart {
        is_row: bool,
        gap: u16,
        border: Option<Border>,
        title: Option<String>,
        border_fg: Color,
    },
    ContainerEnd {
        start: usize,
    },
    If {
        cond: Value<bool>,
        then_tmpl: usize,
        else_tmpl: Option<usize>,
    },
    Condition {
        pred: Rc<dyn Fn() -> bool>,
        then_tmpl: usize,
        else_tmpl: Option<usize>,
    },
    Switch {
        selector: Rc<dyn Fn() -> i32>,
        cases: Vec<usize>,
        default_tmpl: Option<usize>,
    },
    ForEach {
        source: Rc<dyn ItemNodes>,
        slot: usize,
    },
    SelectionList {
        source: Rc<dyn ItemNodes>,
        selected: Value<usize>,
        marker: String,
        max_visible: u16,
        slot: usize,
    },
    Layer {
        layer: Layer,
    },
    Custom {
        measure: MeasureFn,
        render: RenderFn,
    },
}

/// Per-op geometry scratch, overwritten every frame.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Geom {
    pub x: u16,
    pub y: u16,
    /// Interior width for containers, node width for leaves.
    pub w: u16,
    /// Outer height.
    pub h: u16,
    /// Pre-flex content height; per-iteration height for iteration ops.
    pub content_h: u16,
    /// 1 if the op draws a border, else 0.
    pub border_offset: u16,
}

/// A materialized, positioned leaf ready to paint.
pub(crate) struct Leaf {
    pub kind: LeafKind,
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
    pub style: Style,
}

pub(crate) enum LeafKind {
    Text { text: String },
    Progress { value: u8 },
    Rich { spans: Vec<Span> },
    Layer { layer: Layer },
    Custom { render: RenderFn },
}

/// A compiled declarative tree plus its per-frame scratch state.
///
/// The op list, level index, and sub-templates are immutable after
/// [`Template::compile`]; `geom`, `leaves`, and the per-frame iteration
/// sub-templates are rebuilt on every render.
pub struct Template {
    pub(crate) ops: Vec<Op>,
    pub(crate) by_level: Vec<Vec<usize>>,
    pub(crate) max_level: usize,
    /// Direct child ops per op (container end markers excluded).
    pub(crate) children: Vec<Vec<usize>>,
    /// Eagerly compiled branch sub-templates (if / condition / switch).
    pub(crate) subs: Vec<Template>,
    /// Per-frame iteration bodies, one slot per iteration op.
    pub(crate) iter_subs: Vec<Vec<Template>>,
    pub(crate) geom: Vec<Geom>,
    pub(crate) leaves: Vec<Leaf>,
    /// Per-frame branch choice: index into `subs`, or `None`.
    pub(crate) chosen: Vec<Option<usize>>,
}

impl Template {
    /// Compile a declarative tree. Fails fast on malformed trees: a
    /// switch with neither cases nor a default, or a percent width
    /// outside 0.0..=1.0.
    pub fn compile(node: Node) -> Result<Template> {
        let mut t = Template {
            ops: Vec::new(),
            by_level: Vec::new(),
            max_level: 0,
            children: Vec::new(),
            subs: Vec::new(),
            iter_subs: Vec::new(),
            geom: Vec::new(),
            leaves: Vec::new(),
            chosen: Vec::new(),
        };
        t.emit(node, None, 0)?;
        t.finish();
        Ok(t)
    }

    /// An empty template producing no ops and no leaves.
    pub(crate) fn empty() -> Template {
        Template {
            ops: Vec::new(),
            by_level: Vec::new(),
            max_level: 0,
            children: Vec::new(),
            subs: Vec::new(),
            iter_subs: Vec::new(),
            geom: Vec::new(),
            leaves: Vec::new(),
            chosen: Vec::new(),
        }
    }

    /// Render one frame into `buf` at the given dimensions.
    ///
    /// Infallible: out-of-bounds content is clipped, empty branches
    /// produce nothing.
    pub fn render(&mut self, buf: &mut CharBuffer, width: u16, height: u16) {
        self.render_opts(buf, width, height, false);
    }

    /// Like [`render`](Self::render), but pads each text write to the
    /// node's width with its style, so a caller whose content shape is
    /// stable can skip clearing the buffer between frames.
    pub fn render_padded(&mut self, buf: &mut CharBuffer, width: u16, height: u16) {
        self.render_opts(buf, width, height, true);
    }

    fn render_opts(&mut self, buf: &mut CharBuffer, width: u16, height: u16, padded: bool) {
        crate::layout::layout_frame(self, buf, 0, 0, width, height);
        let leaves = std::mem::take(&mut self.leaves);
        crate::painter::paint(&leaves, buf, padded);
        self.leaves = leaves;
    }

    /// Number of compiled ops, including those of branch sub-templates.
    pub fn op_count(&self) -> usize {
        self.ops.len() + self.subs.iter().map(Template::op_count).sum::<usize>()
    }

    fn emit(&mut self, node: Node, parent: Option<usize>, level: usize) -> Result<()> {
        let Node { kind, style, flex } = node;
        match kind {
            NodeKind::Text { content } => {
                let kind = match content {
                    StrSource::Static(text) => OpKind::TextStatic { text },
                    StrSource::Shared(value) => OpKind::TextPtr { value },
                };
                self.push_op(kind, parent, level, style, flex);
            }
            NodeKind::Progress { value, bar_width } => {
                let kind = match value {
                    NumSource::Static(value) => OpKind::ProgressStatic { value, bar_width },
                    NumSource::Shared(value) => OpKind::ProgressPtr { value, bar_width },
                };
                self.push_op(kind, parent, level, style, flex);
            }
            NodeKind::RichText { spans } => {
                let kind = match spans {
                    SpanSource::Static(spans) => OpKind::RichStatic { spans },
                    SpanSource::Shared(value) => OpKind::RichPtr { value },
                };
                self.push_op(kind, parent, level, style, flex);
            }
            NodeKind::Leader { label, value, fill } => {
                let kind = match (label, value) {
                    (StrSource::Static(label), StrSource::Static(value)) => {
                        OpKind::LeaderStatic { label, value, fill }
                    }
                    (label, value) => OpKind::LeaderPtr { label, value, fill },
                };
                self.push_op(kind, parent, level, style, flex);
            }
            NodeKind::Container {
                children,
                is_row,
                gap,
                border,
                title,
                border_fg,
            } => {
                if !(0.0..=1.0).contains(&flex.percent_width) {
                    return Err(WeftError::Compile(format!(
                        "container percent_width {} outside 0.0..=1.0",
                        flex.percent_width
                    )));
                }
                let idx = self.push_op(
                    OpKind::ContainerStart {
                        is_row,
                        gap,
                        border,
                        title,
                        border_fg,
                    },
                    parent,
                    level,
                    style,
                    flex,
                );
                for child in children {
                    self.emit(child, Some(idx), level + 1)?;
                }
                self.push_op(
                    OpKind::ContainerEnd { start: idx },
                    Some(idx),
                    level,
                    Style::default(),
                    FlexParams::default(),
                );
            }
            NodeKind::LayerView { layer } => {
                self.push_op(OpKind::Layer { layer }, parent, level, style, flex);
            }
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let then_tmpl = self.push_sub(*then_branch)?;
                let else_tmpl = match else_branch {
                    Some(node) => Some(self.push_sub(*node)?),
                    None => None,
                };
                self.push_op(
                    OpKind::If {
                        cond,
                        then_tmpl,
                        else_tmpl,
                    },
                    parent,
                    level,
                    style,
                    flex,
                );
            }
            NodeKind::Condition {
                pred,
                then_branch,
                else_branch,
            } => {
                let then_tmpl = self.push_sub(*then_branch)?;
                let else_tmpl = match else_branch {
                    Some(node) => Some(self.push_sub(*node)?),
                    None => None,
                };
                self.push_op(
                    OpKind::Condition {
                        pred,
                        then_tmpl,
                        else_tmpl,
                    },
                    parent,
                    level,
                    style,
                    flex,
                );
            }
            NodeKind::Switch {
                selector,
                cases,
                default,
            } => {
                if cases.is_empty() && default.is_none() {
                    return Err(WeftError::Compile(
                        "switch has no cases and no default branch".into(),
                    ));
                }
                let mut case_tmpls = Vec::with_capacity(cases.len());
                for case in cases {
                    case_tmpls.push(self.push_sub(case)?);
                }
                let default_tmpl = match default {
                    Some(node) => Some(self.push_sub(*node)?),
                    None => None,
                };
                self.push_op(
                    OpKind::Switch {
                        selector,
                        cases: case_tmpls,
                        default_tmpl,
                    },
                    parent,
                    level,
                    style,
                    flex,
                );
            }
            NodeKind::ForEach { source } => {
                let slot = self.iter_subs.len();
                self.iter_subs.push(Vec::new());
                self.push_op(OpKind::ForEach { source, slot }, parent, level, style, flex);
            }
            NodeKind::SelectionList {
                source,
                selected,
                marker,
                max_visible,
            } => {
                let slot = self.iter_subs.len();
                self.iter_subs.push(Vec::new());
                self.push_op(
                    OpKind::SelectionList {
                        source,
                        selected,
                        marker,
                        max_visible,
                        slot,
                    },
                    parent,
                    level,
                    style,
                    flex,
                );
            }
            NodeKind::Custom { measure, render } => {
                self.push_op(OpKind::Custom { measure, render }, parent, level, style, flex);
            }
        }
        Ok(())
    }

    fn push_sub(&mut self, node: Node) -> Result<usize> {
        let sub = Template::compile(node)?;
        self.subs.push(sub);
        Ok(self.subs.len() - 1)
    }

    fn push_op(
        &mut self,
        kind: OpKind,
        parent: Option<usize>,
        level: usize,
        style: Style,
        flex: FlexParams,
    ) -> usize {
        let idx = self.ops.len();
        if level >= self.by_level.len() {
            self.by_level.resize_with(level + 1, Vec::new);
        }
        self.by_level[level].push(idx);
        if level > self.max_level {
            self.max_level = level;
        }
        self.ops.push(Op {
            kind,
            parent,
            level,
            style,
            flex,
        });
        idx
    }

    fn finish(&mut self) {
        self.children = vec![Vec::new(); self.ops.len()];
        for (i, op) in self.ops.iter().enumerate() {
            if matches!(op.kind, OpKind::ContainerEnd { .. }) {
                continue;
            }
            if let Some(p) = op.parent {
                self.children[p].push(i);
            }
        }
        self.geom = vec![Geom::default(); self.ops.len()];
        self.chosen = vec![None; self.ops.len()];
    }
}
