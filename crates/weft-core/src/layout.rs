//! Three-phase layout over a compiled template's operation list.
//!
//! Phase 1 walks levels top-down assigning widths and leaf heights,
//! evaluating branch choices, and compiling iteration bodies for the
//! frame. Phase 2 walks bottom-up accumulating container content
//! heights, then top-down distributing leftover vertical space to flex
//! children. Phase 3 walks the ops in document order with a context
//! stack, positioning leaves, drawing borders, and materializing the
//! leaf list the painter consumes.

use unicode_width::UnicodeWidthStr;

use crate::buffer::CharBuffer;
use crate::style::Style;
use crate::template::{Geom, Leaf, LeafKind, Op, OpKind, Template};

/// Lay out one frame of `t` into the rectangle at (x0, y0) of the given
/// size, drawing container chrome into `buf` and filling `t.leaves`.
/// Returns the (width, height) actually used.
pub(crate) fn layout_frame(
    t: &mut Template,
    buf: &mut CharBuffer,
    x0: u16,
    y0: u16,
    avail_w: u16,
    avail_h: u16,
) -> (u16, u16) {
    t.leaves.clear();
    if t.ops.is_empty() {
        return (0, 0);
    }
    debug_assert_eq!(t.by_level.len(), t.max_level + 1);
    phase_update(t, avail_w);
    phase_heights(t);
    phase_flex(t, avail_h);
    phase_draw(t, buf, x0, y0, avail_w, avail_h)
}

/// Phase 1: top-down widths, leaf heights, branch choices, iteration
/// body compilation.
fn phase_update(t: &mut Template, frame_w: u16) {
    let Template {
        ops,
        by_level,
        geom,
        subs,
        iter_subs,
        chosen,
        ..
    } = t;

    for (level, level_ops) in by_level.iter().enumerate() {
        for &i in level_ops {
            debug_assert_eq!(ops[i].level, level);
            let parent_w = match ops[i].parent {
                None => frame_w,
                Some(p) => geom[p].w,
            };
            let flex = ops[i].flex;
            match &ops[i].kind {
                OpKind::ContainerStart { border, .. } => {
                    let mut w = if flex.width > 0 {
                        flex.width
                    } else if flex.percent_width > 0.0 {
                        (f32::from(parent_w) * flex.percent_width).floor() as u16
                    } else {
                        parent_w
                    };
                    let b = u16::from(border.is_some());
                    w = w.saturating_sub(2 * b);
                    geom[i] = Geom {
                        w,
                        border_offset: b,
                        ..Geom::default()
                    };
                }
                OpKind::ContainerEnd { .. } => {}
                OpKind::TextStatic { text } => {
                    geom[i].w = explicit_or(flex.width, UnicodeWidthStr::width(text.as_str()) as u16);
                    geom[i].h = 1;
                }
                OpKind::TextPtr { value } => {
                    geom[i].w = explicit_or(
                        flex.width,
                        value.with(|s| UnicodeWidthStr::width(s.as_str()) as u16),
                    );
                    geom[i].h = 1;
                }
                OpKind::ProgressStatic { bar_width, .. }
                | OpKind::ProgressPtr { bar_width, .. } => {
                    geom[i].w = explicit_or(*bar_width, parent_w);
                    geom[i].h = 1;
                }
                OpKind::RichStatic { spans } => {
                    let runes: u16 = spans.iter().map(crate::node::Span::rune_count).sum();
                    geom[i].w = explicit_or(flex.width, runes);
                    geom[i].h = 1;
                }
                OpKind::RichPtr { value } => {
                    let runes: u16 =
                        value.with(|spans| spans.iter().map(crate::node::Span::rune_count).sum());
                    geom[i].w = explicit_or(flex.width, runes);
                    geom[i].h = 1;
                }
                OpKind::LeaderStatic { .. } | OpKind::LeaderPtr { .. } => {
                    geom[i].w = explicit_or(flex.width, parent_w);
                    geom[i].h = 1;
                }
                OpKind::Layer { .. } => {
                    geom[i].w = explicit_or(flex.width, parent_w);
                    geom[i].h = flex.height;
                }
                OpKind::Custom { measure, .. } => {
                    let (w, h) = measure(parent_w);
                    geom[i].w = w;
                    geom[i].h = h;
                }
                OpKind::If {
                    cond,
                    then_tmpl,
                    else_tmpl,
                } => {
                    let pick = if cond.get() {
                        Some(*then_tmpl)
                    } else {
                        *else_tmpl
                    };
                    chosen[i] = pick;
                    geom[i].w = parent_w;
                    geom[i].h = pick.map_or(0, |s| simplified_height(&subs[s]));
                }
                OpKind::Condition {
                    pred,
                    then_tmpl,
                    else_tmpl,
                } => {
                    let pick = if pred() { Some(*then_tmpl) } else { *else_tmpl };
                    chosen[i] = pick;
                    geom[i].w = parent_w;
                    geom[i].h = pick.map_or(0, |s| simplified_height(&subs[s]));
                }
                OpKind::Switch {
                    selector,
                    cases,
                    default_tmpl,
                } => {
                    let sel = selector();
                    let pick = if sel >= 0 && (sel as usize) < cases.len() {
                        Some(cases[sel as usize])
                    } else {
                        *default_tmpl
                    };
                    chosen[i] = pick;
                    geom[i].w = parent_w;
                    geom[i].h = pick.map_or(0, |s| simplified_height(&subs[s]));
                }
                OpKind::ForEach { source, slot } => {
                    let len = source.len();
                    let bodies = &mut iter_subs[*slot];
                    bodies.clear();
                    for e in 0..len {
                        bodies.push(compile_body(source.node_at(e)));
                    }
                    let iter_h = bodies.first().map_or(0, simplified_height);
                    geom[i].w = parent_w;
                    geom[i].content_h = iter_h;
                    geom[i].h = iter_h.saturating_mul(len as u16);
                }
                OpKind::SelectionList {
                    source,
                    selected,
                    max_visible,
                    slot,
                    ..
                } => {
                    let len = source.len();
                    let window = if *max_visible > 0 {
                        (usize::from(*max_visible)).min(len)
                    } else {
                        len
                    };
                    let first = list_window_start(selected.get(), len, window);
                    let bodies = &mut iter_subs[*slot];
                    bodies.clear();
                    for e in first..first + window {
                        bodies.push(compile_body(source.node_at(e)));
                    }
                    let iter_h = bodies.first().map_or(0, simplified_height).max(1);
                    geom[i].w = parent_w;
                    geom[i].content_h = iter_h;
                    geom[i].h = if window == 0 {
                        0
                    } else {
                        iter_h.saturating_mul(window as u16)
                    };
                }
            }
        }
    }
}

fn explicit_or(explicit: u16, fallback: u16) -> u16 {
    if explicit > 0 { explicit } else { fallback }
}

/// First visible index of a windowed list: the window follows the
/// selected element.
fn list_window_start(selected: usize, len: usize, window: usize) -> usize {
    if window == 0 || len == 0 {
        return 0;
    }
    let sel = selected.min(len - 1);
    if sel >= window { sel + 1 - window } else { 0 }
}

fn compile_body(node: crate::node::Node) -> Template {
    Template::compile(node).unwrap_or_else(|err| {
        tracing::warn!(target: "weft::layout", error = %err, "iteration body failed to compile");
        Template::empty()
    })
}

/// Single-iteration height of a sub-template: leaves outside rows sum,
/// rows count as one line, container markers are skipped.
fn simplified_height(t: &Template) -> u16 {
    let mut sum: u16 = 0;
    let mut row_depth: usize = 0;
    for op in &t.ops {
        match &op.kind {
            OpKind::ContainerStart { is_row, .. } => {
                if *is_row {
                    if row_depth == 0 {
                        sum = sum.saturating_add(1);
                    }
                    row_depth += 1;
                }
            }
            OpKind::ContainerEnd { start } => {
                if matches!(&t.ops[*start].kind, OpKind::ContainerStart { is_row: true, .. }) {
                    row_depth = row_depth.saturating_sub(1);
                }
            }
            OpKind::ForEach { source, .. } => {
                if row_depth == 0 {
                    sum = sum.saturating_add(source.len() as u16);
                }
            }
            OpKind::SelectionList {
                source,
                max_visible,
                ..
            } => {
                if row_depth == 0 {
                    let len = source.len() as u16;
                    let rows = if *max_visible > 0 {
                        len.min(*max_visible)
                    } else {
                        len
                    };
                    sum = sum.saturating_add(rows);
                }
            }
            OpKind::Layer { .. } => {
                if row_depth == 0 {
                    sum = sum.saturating_add(op.flex.height.max(1));
                }
            }
            _ => {
                if row_depth == 0 {
                    sum = sum.saturating_add(1);
                }
            }
        }
    }
    sum
}

/// Phase 2a: bottom-up container content heights.
fn phase_heights(t: &mut Template) {
    let Template {
        ops,
        by_level,
        geom,
        children,
        ..
    } = t;

    for level_ops in by_level.iter().rev() {
        for &i in level_ops {
            let OpKind::ContainerStart { is_row, gap, .. } = &ops[i].kind else {
                continue;
            };
            let kids = &children[i];
            let mut content_h: u16 = 0;
            if *is_row {
                for &k in kids {
                    content_h = content_h.max(child_extent_h(ops, geom, k));
                }
            } else {
                for &k in kids {
                    content_h = content_h.saturating_add(child_extent_h(ops, geom, k));
                }
                if kids.len() > 1 {
                    content_h = content_h.saturating_add(gap.saturating_mul((kids.len() - 1) as u16));
                }
            }
            let b2 = geom[i].border_offset * 2;
            let flex = ops[i].flex;
            let h = if flex.height > 0 {
                flex.height
            } else {
                content_h.saturating_add(b2)
            };
            geom[i].content_h = content_h.min(h);
            geom[i].h = h;
        }
    }
}

fn child_extent_h(ops: &[Op], geom: &[Geom], k: usize) -> u16 {
    let m = ops[k].style.margin;
    geom[k].h.saturating_add(m.top).saturating_add(m.bottom)
}

/// Phase 2b: top-down flex distribution of leftover vertical space in
/// vertical containers (and the virtual root column).
fn phase_flex(t: &mut Template, frame_h: u16) {
    let Template {
        ops,
        by_level,
        geom,
        children,
        ..
    } = t;

    let root_kids: Vec<usize> = (0..ops.len())
        .filter(|&i| {
            ops[i].parent.is_none() && !matches!(ops[i].kind, OpKind::ContainerEnd { .. })
        })
        .collect();
    distribute(ops, geom, &root_kids, frame_h, 0);

    for level_ops in by_level.iter() {
        for &i in level_ops {
            let OpKind::ContainerStart {
                is_row: false, gap, ..
            } = &ops[i].kind
            else {
                continue;
            };
            let interior = geom[i].h.saturating_sub(geom[i].border_offset * 2);
            distribute(ops, geom, &children[i], interior, *gap);
        }
    }
}

/// Distribute `interior - used` cells among flex children by weight.
/// Shares truncate; the last flex child absorbs the leftover so the
/// total is exact.
fn distribute(ops: &[Op], geom: &mut [Geom], kids: &[usize], interior: u16, gap: u16) {
    let mut used: u16 = 0;
    let mut total: f32 = 0.0;
    let mut flex_kids: Vec<(usize, f32)> = Vec::new();
    for &k in kids {
        used = used.saturating_add(child_extent_h(ops, geom, k));
        let mut grow = ops[k].flex.flex_grow;
        if grow == 0.0 && ops[k].flex.height == 0 && matches!(ops[k].kind, OpKind::Layer { .. }) {
            // A layer with no explicit height fills remaining space.
            grow = 1.0;
        }
        if grow > 0.0 {
            total += grow;
            flex_kids.push((k, grow));
        }
    }
    if kids.len() > 1 {
        used = used.saturating_add(gap.saturating_mul((kids.len() - 1) as u16));
    }
    if flex_kids.is_empty() || total <= 0.0 {
        return;
    }
    let remaining = interior.saturating_sub(used);
    if remaining == 0 {
        return;
    }
    let mut given: u16 = 0;
    let last = flex_kids.len() - 1;
    for (n, &(k, grow)) in flex_kids.iter().enumerate() {
        let share = if n == last {
            remaining - given
        } else {
            (f32::from(remaining) * grow / total).floor() as u16
        };
        geom[k].h = geom[k].h.saturating_add(share);
        given = given.saturating_add(share);
    }
}

/// Layout context for one open container during the document-order walk.
struct Ctx {
    cursor_x: u16,
    cursor_y: u16,
    start_x: u16,
    start_y: u16,
    is_row: bool,
    gap: u16,
    first: bool,
    max_w: u16,
    max_h: u16,
    avail_w: u16,
    avail_h: u16,
}

/// Apply the between-siblings gap and return the child's position.
fn begin_child(ctx: &mut Ctx) -> (u16, u16) {
    if !ctx.first {
        if ctx.is_row {
            ctx.cursor_x = ctx.cursor_x.saturating_add(ctx.gap);
        } else {
            ctx.cursor_y = ctx.cursor_y.saturating_add(ctx.gap);
        }
    }
    (ctx.cursor_x, ctx.cursor_y)
}

/// Advance the cursor past a placed child and update the extents.
fn end_child(ctx: &mut Ctx, x: u16, y: u16, outer_w: u16, outer_h: u16) {
    if ctx.is_row {
        ctx.cursor_x = x.saturating_add(outer_w);
    } else {
        ctx.cursor_y = y.saturating_add(outer_h);
    }
    ctx.max_w = ctx
        .max_w
        .max(x.saturating_add(outer_w).saturating_sub(ctx.start_x));
    ctx.max_h = ctx
        .max_h
        .max(y.saturating_add(outer_h).saturating_sub(ctx.start_y));
    ctx.first = false;
}

/// Phase 3: document-order positioning, border drawing, and leaf
/// materialization.
fn phase_draw(
    t: &mut Template,
    buf: &mut CharBuffer,
    x0: u16,
    y0: u16,
    avail_w: u16,
    avail_h: u16,
) -> (u16, u16) {
    let Template {
        ops,
        geom,
        subs,
        iter_subs,
        leaves,
        chosen,
        ..
    } = t;

    let mut stack = vec![Ctx {
        cursor_x: x0,
        cursor_y: y0,
        start_x: x0,
        start_y: y0,
        is_row: false,
        gap: 0,
        first: true,
        max_w: 0,
        max_h: 0,
        avail_w,
        avail_h,
    }];

    for i in 0..ops.len() {
        match &ops[i].kind {
            OpKind::ContainerStart {
                is_row,
                gap,
                border,
                title,
                border_fg,
            } => {
                let Some(ctx) = stack.last_mut() else {
                    continue;
                };
                let (px, py) = begin_child(ctx);
                let m = ops[i].style.margin;
                let b = geom[i].border_offset;
                let gx = px.saturating_add(m.left);
                let gy = py.saturating_add(m.top);
                geom[i].x = gx;
                geom[i].y = gy;
                let outer_w = geom[i].w.saturating_add(2 * b);
                let outer_h = geom[i].h;

                let fill = ops[i].style.fill;
                if !fill.is_default() {
                    buf.fill_rect(gx, gy, outer_w, outer_h, Style::new().bg(fill));
                }
                if let Some(border) = border {
                    let bstyle = Style::new().fg(*border_fg);
                    buf.draw_border(gx, gy, outer_w, outer_h, *border, bstyle);
                    if let Some(title) = title {
                        let label = format!(" {title} ");
                        buf.write_string_fast(
                            gx + 1,
                            gy,
                            &label,
                            bstyle,
                            outer_w.saturating_sub(2),
                        );
                    }
                }

                stack.push(Ctx {
                    cursor_x: gx.saturating_add(b),
                    cursor_y: gy.saturating_add(b),
                    start_x: gx.saturating_add(b),
                    start_y: gy.saturating_add(b),
                    is_row: *is_row,
                    gap: *gap,
                    first: true,
                    max_w: 0,
                    max_h: 0,
                    avail_w: geom[i].w,
                    avail_h: outer_h.saturating_sub(2 * b),
                });
            }
            OpKind::ContainerEnd { start } => {
                let s = *start;
                stack.pop();
                let Some(ctx) = stack.last_mut() else {
                    continue;
                };
                let m = ops[s].style.margin;
                let outer_w = geom[s].w.saturating_add(2 * geom[s].border_offset);
                let outer_h = geom[s].h;
                end_child(
                    ctx,
                    geom[s].x,
                    geom[s].y,
                    outer_w.saturating_add(m.right),
                    outer_h.saturating_add(m.bottom),
                );
            }
            OpKind::If { .. } | OpKind::Condition { .. } | OpKind::Switch { .. } => {
                // A branch that selects nothing collapses: no leaves,
                // no cursor movement, no gap.
                let Some(sub_idx) = chosen[i] else {
                    continue;
                };
                let Some(ctx) = stack.last_mut() else {
                    continue;
                };
                let (bx, by) = begin_child(ctx);
                let rem_w = if ctx.is_row {
                    ctx.avail_w.saturating_sub(bx.saturating_sub(ctx.start_x))
                } else {
                    ctx.avail_w
                };
                let rem_h = ctx.avail_h.saturating_sub(by.saturating_sub(ctx.start_y));
                let (uw, uh) = layout_frame(&mut subs[sub_idx], buf, bx, by, rem_w, rem_h);
                leaves.append(&mut subs[sub_idx].leaves);
                end_child(ctx, bx, by, uw, uh);
            }
            OpKind::ForEach { slot, .. } => {
                if iter_subs[*slot].is_empty() {
                    continue;
                }
                let Some(ctx) = stack.last_mut() else {
                    continue;
                };
                let (bx, base_y) = begin_child(ctx);
                let rem_w = if ctx.is_row {
                    ctx.avail_w.saturating_sub(bx.saturating_sub(ctx.start_x))
                } else {
                    ctx.avail_w
                };
                let iter_h = geom[i].content_h;
                for (e, body) in iter_subs[*slot].iter_mut().enumerate() {
                    let y = base_y.saturating_add(iter_h.saturating_mul(e as u16));
                    layout_frame(body, buf, bx, y, rem_w, iter_h.max(1));
                    leaves.append(&mut body.leaves);
                }
                end_child(ctx, bx, base_y, geom[i].w, geom[i].h);
            }
            OpKind::SelectionList {
                source,
                selected,
                marker,
                slot,
                ..
            } => {
                let window = iter_subs[*slot].len();
                if window == 0 {
                    continue;
                }
                let Some(ctx) = stack.last_mut() else {
                    continue;
                };
                let (bx, base_y) = begin_child(ctx);
                let len = source.len();
                let first = list_window_start(selected.get(), len, window);
                let sel = selected.get().min(len.saturating_sub(1));
                let iter_h = geom[i].content_h.max(1);
                let marker_w = marker.chars().count() as u16;
                let rem_w = if ctx.is_row {
                    ctx.avail_w.saturating_sub(bx.saturating_sub(ctx.start_x))
                } else {
                    ctx.avail_w
                };
                for (k, body) in iter_subs[*slot].iter_mut().enumerate() {
                    let y = base_y.saturating_add(iter_h.saturating_mul(k as u16));
                    if first + k == sel {
                        leaves.push(Leaf {
                            kind: LeafKind::Text {
                                text: marker.clone(),
                            },
                            x: bx,
                            y,
                            w: marker_w,
                            h: 1,
                            style: ops[i].style,
                        });
                    }
                    layout_frame(
                        body,
                        buf,
                        bx.saturating_add(marker_w),
                        y,
                        rem_w.saturating_sub(marker_w),
                        iter_h,
                    );
                    leaves.append(&mut body.leaves);
                }
                end_child(ctx, bx, base_y, geom[i].w, geom[i].h);
            }
            _ => {
                // Simple leaf: materialize and position.
                let Some(ctx) = stack.last_mut() else {
                    continue;
                };
                let (px, py) = begin_child(ctx);
                let m = ops[i].style.margin;
                let x = px.saturating_add(m.left);
                let y = py.saturating_add(m.top);
                geom[i].x = x;
                geom[i].y = y;
                let w = geom[i].w;
                let mut h = geom[i].h;

                let kind = match &ops[i].kind {
                    OpKind::TextStatic { text } => Some(LeafKind::Text { text: text.clone() }),
                    OpKind::TextPtr { value } => Some(LeafKind::Text { text: value.get() }),
                    OpKind::ProgressStatic { value, .. } => {
                        Some(LeafKind::Progress { value: (*value).min(100) })
                    }
                    OpKind::ProgressPtr { value, .. } => Some(LeafKind::Progress {
                        value: value.get().min(100),
                    }),
                    OpKind::RichStatic { spans } => Some(LeafKind::Rich {
                        spans: spans.clone(),
                    }),
                    OpKind::RichPtr { value } => Some(LeafKind::Rich { spans: value.get() }),
                    OpKind::LeaderStatic { label, value, fill } => Some(LeafKind::Text {
                        text: leader_line(label, value, *fill, w),
                    }),
                    OpKind::LeaderPtr { label, value, fill } => Some(LeafKind::Text {
                        text: leader_line(&label.resolve(), &value.resolve(), *fill, w),
                    }),
                    OpKind::Layer { layer } => {
                        if h == 0 {
                            h = ctx
                                .avail_h
                                .saturating_sub(y.saturating_sub(ctx.start_y));
                        }
                        Some(LeafKind::Layer {
                            layer: layer.clone(),
                        })
                    }
                    OpKind::Custom { render, .. } => Some(LeafKind::Custom {
                        render: render.clone(),
                    }),
                    _ => None,
                };
                let Some(kind) = kind else {
                    continue;
                };
                leaves.push(Leaf {
                    kind,
                    x,
                    y,
                    w,
                    h,
                    style: ops[i].style,
                });
                end_child(
                    ctx,
                    x,
                    y,
                    w.saturating_add(m.right),
                    h.saturating_add(m.bottom),
                );
            }
        }
    }

    match stack.first() {
        Some(root) => (root.max_w, root.cursor_y.saturating_sub(root.start_y)),
        None => (0, 0),
    }
}

/// Compose a "label .... value" line filled to `width` runes.
fn leader_line(label: &str, value: &str, fill: char, width: u16) -> String {
    let lw = label.chars().count() as u16;
    let vw = value.chars().count() as u16;
    let fill_n = width.saturating_sub(lw.saturating_add(vw));
    let mut out = String::with_capacity(usize::from(width) + label.len() + value.len());
    out.push_str(label);
    for _ in 0..fill_n {
        out.push(fill);
    }
    out.push_str(value);
    out
}
