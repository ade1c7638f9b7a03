//! Paints materialized leaves into a character buffer.

use std::borrow::Cow;

use unicode_width::UnicodeWidthStr;

use crate::buffer::CharBuffer;
use crate::style::{Align, Case};
use crate::template::{Leaf, LeafKind};

/// Paint every leaf in iteration order using the buffer primitives.
///
/// With `padded` set, text writes are padded to the leaf width with the
/// leaf's style, letting the caller skip clearing the buffer when the
/// content shape is stable between frames.
pub(crate) fn paint(leaves: &[Leaf], buf: &mut CharBuffer, padded: bool) {
    for leaf in leaves {
        match &leaf.kind {
            LeafKind::Text { text } => paint_text(buf, leaf, text, padded),
            LeafKind::Progress { value } => {
                buf.write_progress_bar(
                    leaf.x,
                    leaf.y,
                    leaf.w,
                    f32::from(*value) / 100.0,
                    leaf.style,
                );
            }
            LeafKind::Rich { spans } => {
                let mut cx = leaf.x;
                let limit = leaf.x.saturating_add(leaf.w);
                for span in spans {
                    if cx >= limit {
                        break;
                    }
                    buf.write_string_fast(cx, leaf.y, &span.text, span.style, limit - cx);
                    cx = cx.saturating_add(span.rune_count());
                }
            }
            LeafKind::Layer { layer } => {
                layer.set_viewport(leaf.w, leaf.h);
                layer.prepare();
                layer.blit(buf, leaf.x, leaf.y, leaf.w, leaf.h);
            }
            LeafKind::Custom { render } => render(buf, leaf.x, leaf.y, leaf.w, leaf.h),
        }
    }
}

fn paint_text(buf: &mut CharBuffer, leaf: &Leaf, text: &str, padded: bool) {
    let shaped = apply_case(text, leaf.style.case);
    let shown = UnicodeWidthStr::width(shaped.as_ref()) as u16;
    let off = match leaf.style.align {
        Align::Left => 0,
        Align::Center => leaf.w.saturating_sub(shown) / 2,
        Align::Right => leaf.w.saturating_sub(shown),
    };
    if padded {
        buf.fill_rect(leaf.x, leaf.y, leaf.w, 1, leaf.style);
    }
    buf.write_string_fast(
        leaf.x.saturating_add(off),
        leaf.y,
        &shaped,
        leaf.style,
        leaf.w.saturating_sub(off),
    );
}

fn apply_case(text: &str, case: Option<Case>) -> Cow<'_, str> {
    match case {
        None => Cow::Borrowed(text),
        Some(Case::Upper) => Cow::Owned(text.to_uppercase()),
        Some(Case::Lower) => Cow::Owned(text.to_lowercase()),
        Some(Case::Capitalize) => {
            let mut out = String::with_capacity(text.len());
            let mut word_start = true;
            for ch in text.chars() {
                if word_start {
                    out.extend(ch.to_uppercase());
                } else {
                    out.push(ch);
                }
                word_start = ch.is_whitespace();
            }
            Cow::Owned(out)
        }
    }
}
