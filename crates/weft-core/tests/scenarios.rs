//! End-to-end rendering scenarios over the public API.

use weft_core::{
    Border, CharBuffer, Layer, Style, Template, Value, condition, for_each, hbox, layer_view,
    leader, progress, rich, selection_list, switch, text, text_value, vbox, when,
};

fn compile(node: weft_core::Node) -> Template {
    match Template::compile(node) {
        Ok(t) => t,
        Err(e) => unreachable!("compile failed: {e}"),
    }
}

#[test]
fn basic_text_on_empty_buffer() {
    let mut tmpl = compile(text("Hi"));
    let mut buf = CharBuffer::new(5, 1);
    tmpl.render(&mut buf, 5, 1);
    assert_eq!(buf.line_text(0), "Hi");
}

#[test]
fn hbox_with_gap() {
    let mut tmpl = compile(hbox(vec![text("A"), text("B")]).gap(2));
    let mut buf = CharBuffer::new(10, 1);
    tmpl.render(&mut buf, 10, 1);
    assert_eq!(buf.line_text(0), "A  B");
}

#[test]
fn dynamic_title_via_shared_value() {
    let title = Value::new(String::from("Hello"));
    let mut tmpl = compile(text_value(&title));
    let mut buf = CharBuffer::new(10, 1);

    tmpl.render(&mut buf, 10, 1);
    assert_eq!(buf.line_text(0), "Hello");
    assert_eq!(buf.get(0, 0).map(|c| c.ch), Some('H'));

    title.set("Bye".into());
    buf.clear();
    tmpl.render(&mut buf, 10, 1);
    assert_eq!(buf.line_text(0), "Bye");
    assert_eq!(buf.get(0, 0).map(|c| c.ch), Some('B'));
}

#[test]
fn conditional_toggles_content() {
    let show = Value::new(true);
    let mut tmpl = compile(vbox(vec![text("A"), when(&show, text("B")), text("C")]));
    let mut buf = CharBuffer::new(10, 5);

    tmpl.render(&mut buf, 10, 5);
    assert_eq!(buf.line_text(0), "A");
    assert_eq!(buf.line_text(1), "B");
    assert_eq!(buf.line_text(2), "C");

    show.set(false);
    buf.clear();
    tmpl.render(&mut buf, 10, 5);
    assert_eq!(buf.line_text(0), "A");
    assert_eq!(buf.line_text(1), "C");
    assert_eq!(buf.line_text(2), "");
}

#[test]
fn conditional_else_branch_renders() {
    let show = Value::new(false);
    let mut tmpl = compile(when(&show, text("yes")).or_else(text("no")));
    let mut buf = CharBuffer::new(10, 1);
    tmpl.render(&mut buf, 10, 1);
    assert_eq!(buf.line_text(0), "no");

    show.set(true);
    buf.clear();
    tmpl.render(&mut buf, 10, 1);
    assert_eq!(buf.line_text(0), "yes");
}

#[test]
fn condition_predicate_selects_branch() {
    let count = Value::new(3usize);
    let c = count.clone();
    let mut tmpl = compile(condition(move || c.get() > 2, text("many")).or_else(text("few")));
    let mut buf = CharBuffer::new(10, 1);
    tmpl.render(&mut buf, 10, 1);
    assert_eq!(buf.line_text(0), "many");

    count.set(1);
    buf.clear();
    tmpl.render(&mut buf, 10, 1);
    assert_eq!(buf.line_text(0), "few");
}

#[test]
fn for_each_over_three_items() {
    struct Item {
        name: String,
    }
    let items = Value::new(vec![
        Item { name: "a".into() },
        Item { name: "b".into() },
        Item { name: "c".into() },
    ]);
    let mut tmpl = compile(for_each(&items, |item: &Item| text(item.name.clone())));
    let mut buf = CharBuffer::new(10, 5);
    tmpl.render(&mut buf, 10, 5);
    assert_eq!(buf.line_text(0), "a");
    assert_eq!(buf.line_text(1), "b");
    assert_eq!(buf.line_text(2), "c");
    assert_eq!(buf.line_text(3), "");
}

#[test]
fn border_merge_at_junctions() {
    // Two adjacent 3x3 single-bordered boxes sharing an edge column.
    let mut buf = CharBuffer::new(10, 3);
    buf.draw_border(0, 0, 3, 3, Border::SINGLE, Style::default());
    buf.draw_border(2, 0, 3, 3, Border::SINGLE, Style::default());
    assert_eq!(buf.get(2, 0).map(|c| c.ch), Some('\u{252c}')); // ┬
    assert_eq!(buf.get(2, 1).map(|c| c.ch), Some('\u{2502}')); // │
    assert_eq!(buf.get(2, 2).map(|c| c.ch), Some('\u{2534}')); // ┴

    // A horizontal edge crossing the shared vertical produces ┼.
    buf.draw_border(0, 1, 5, 2, Border::SINGLE, Style::default());
    assert_eq!(buf.get(2, 1).map(|c| c.ch), Some('\u{253c}')); // ┼
}

#[test]
fn foreach_empty_slice_produces_nothing() {
    let items: Value<Vec<String>> = Value::new(vec![]);
    let mut tmpl = compile(for_each(&items, |s: &String| text(s.clone())));
    let mut buf = CharBuffer::new(10, 5);
    tmpl.render(&mut buf, 10, 5);
    for y in 0..5 {
        assert_eq!(buf.line_text(y), "");
    }
}

#[test]
fn zero_size_buffer_no_panic() {
    let mut tmpl = compile(vbox(vec![text("A"), progress(50), leader("a", "b")]));
    let mut buf = CharBuffer::new(0, 0);
    tmpl.render(&mut buf, 0, 0);
}

#[test]
fn bordered_child_clips_in_single_row() {
    let mut tmpl = compile(vbox(vec![vbox(vec![text("x")]).border(Border::SINGLE)]).height(1));
    let mut buf = CharBuffer::new(10, 1);
    tmpl.render(&mut buf, 10, 1);
    // Only the top border row fits; the interior and bottom are clipped.
    assert_eq!(buf.get(0, 0).map(|c| c.ch), Some('\u{250c}'));
    assert_eq!(buf.get(9, 0).map(|c| c.ch), Some('\u{2510}'));
}

#[test]
fn render_is_deterministic_across_buffers() {
    let show = Value::new(true);
    let items = Value::new(vec!["x".to_string(), "y".to_string()]);
    let node = vbox(vec![
        text("head"),
        hbox(vec![text("A"), text("B")]).gap(1),
        when(&show, text("cond")),
        for_each(&items, |s: &String| text(s.clone())),
        progress(30).bar_width(6),
    ])
    .border(Border::SINGLE);

    let mut tmpl = compile(node);
    let mut buf_a = CharBuffer::new(20, 10);
    let mut buf_b = CharBuffer::new(20, 10);
    tmpl.render(&mut buf_a, 20, 10);
    tmpl.render(&mut buf_b, 20, 10);
    for y in 0..10 {
        for x in 0..20 {
            assert_eq!(buf_a.get(x, y), buf_b.get(x, y), "cell ({x},{y})");
        }
    }
}

#[test]
fn bordered_container_with_title() {
    let mut tmpl = compile(vbox(vec![text("x")]).border(Border::SINGLE).title("Log"));
    let mut buf = CharBuffer::new(12, 5);
    tmpl.render(&mut buf, 12, 5);
    let top = buf.line_text(0);
    assert!(top.starts_with('\u{250c}'), "top row: {top:?}");
    assert!(top.contains(" Log "), "top row: {top:?}");
    assert_eq!(buf.get(0, 1).map(|c| c.ch), Some('\u{2502}'));
    assert_eq!(buf.get(1, 1).map(|c| c.ch), Some('x'));
    assert_eq!(buf.get(11, 1).map(|c| c.ch), Some('\u{2502}'));
}

#[test]
fn leader_fills_between_label_and_value() {
    let mut tmpl = compile(leader("CPU", "42%").width(10));
    let mut buf = CharBuffer::new(12, 1);
    tmpl.render(&mut buf, 12, 1);
    assert_eq!(buf.line_text(0), "CPU....42%");
}

#[test]
fn progress_bar_renders_fill_split() {
    let mut tmpl = compile(progress(50).bar_width(4));
    let mut buf = CharBuffer::new(10, 1);
    tmpl.render(&mut buf, 10, 1);
    assert_eq!(buf.line_text(0), "\u{2588}\u{2588}\u{2591}\u{2591}");
}

#[test]
fn rich_text_spans_render_in_sequence() {
    let mut tmpl = compile(rich(vec![
        weft_core::Span::new("ok "),
        weft_core::Span::styled("FAIL", Style::new().bold()),
    ]));
    let mut buf = CharBuffer::new(10, 1);
    tmpl.render(&mut buf, 10, 1);
    assert_eq!(buf.line_text(0), "ok FAIL");
    assert!(
        buf.get(3, 0)
            .is_some_and(|c| c.style.attrs.contains(weft_core::Attributes::BOLD))
    );
}

#[test]
fn selection_list_windows_follow_selection() {
    let items = Value::new((0..5).map(|i| format!("i{i}")).collect::<Vec<_>>());
    let selected = Value::new(4usize);
    let mut tmpl = compile(
        selection_list(&items, &selected, |s: &String| text(s.clone())).max_visible(3),
    );
    let mut buf = CharBuffer::new(10, 5);
    tmpl.render(&mut buf, 10, 5);
    assert_eq!(buf.line_text(0), "  i2");
    assert_eq!(buf.line_text(1), "  i3");
    assert_eq!(buf.line_text(2), "> i4");

    selected.set(0);
    buf.clear();
    tmpl.render(&mut buf, 10, 5);
    assert_eq!(buf.line_text(0), "> i0");
    assert_eq!(buf.line_text(1), "  i1");
    assert_eq!(buf.line_text(2), "  i2");
}

#[test]
fn switch_selects_case_or_default() {
    let mode = Value::new(0i32);
    let m = mode.clone();
    let mut tmpl = compile(
        switch(move || m.get(), vec![text("zero"), text("one")]).default_case(text("other")),
    );
    let mut buf = CharBuffer::new(10, 1);

    tmpl.render(&mut buf, 10, 1);
    assert_eq!(buf.line_text(0), "zero");

    mode.set(1);
    buf.clear();
    tmpl.render(&mut buf, 10, 1);
    assert_eq!(buf.line_text(0), "one");

    mode.set(-1);
    buf.clear();
    tmpl.render(&mut buf, 10, 1);
    assert_eq!(buf.line_text(0), "other");

    mode.set(7);
    buf.clear();
    tmpl.render(&mut buf, 10, 1);
    assert_eq!(buf.line_text(0), "other");
}

#[test]
fn layer_view_scrolls_content() {
    let layer = Layer::new();
    let lines = Value::new((0..10).map(|i| format!("row{i}")).collect::<Vec<_>>());
    let content = compile(for_each(&lines, |s: &String| text(s.clone())));
    layer.set_content(content, 10, 10);

    let mut tmpl = compile(layer_view(&layer).height(3));
    let mut buf = CharBuffer::new(10, 3);
    tmpl.render(&mut buf, 10, 3);
    assert_eq!(buf.line_text(0), "row0");
    assert_eq!(buf.line_text(2), "row2");

    layer.scroll_down(5);
    buf.clear();
    tmpl.render(&mut buf, 10, 3);
    assert_eq!(buf.line_text(0), "row5");
    assert_eq!(buf.line_text(2), "row7");
}

#[test]
fn layer_fills_remaining_height_in_column() {
    let layer = Layer::new();
    let lines = Value::new((0..10).map(|i| format!("r{i}")).collect::<Vec<_>>());
    let content = compile(for_each(&lines, |s: &String| text(s.clone())));
    layer.set_content(content, 10, 10);

    let mut tmpl = compile(vbox(vec![text("head"), layer_view(&layer)]).height(5));
    let mut buf = CharBuffer::new(10, 5);
    tmpl.render(&mut buf, 10, 5);
    assert_eq!(buf.line_text(0), "head");
    assert_eq!(buf.line_text(1), "r0");
    assert_eq!(buf.line_text(4), "r3");
}

#[test]
fn flex_grow_distributes_leftover_height() {
    // Two bordered boxes flex-grown inside a fixed-height column.
    let mut tmpl = compile(
        vbox(vec![
            vbox(vec![text("a")]).border(Border::SINGLE).flex_grow(1.0),
            vbox(vec![text("b")]).border(Border::SINGLE).flex_grow(1.0),
        ])
        .height(10),
    );
    let mut buf = CharBuffer::new(8, 10);
    tmpl.render(&mut buf, 8, 10);
    // Each box starts at 3 rows; 4 leftover rows split 2/2.
    // Box one occupies rows 0..=4, box two rows 5..=9.
    assert_eq!(buf.get(0, 0).map(|c| c.ch), Some('\u{250c}'));
    assert_eq!(buf.get(0, 4).map(|c| c.ch), Some('\u{2514}'));
    assert_eq!(buf.get(0, 5).map(|c| c.ch), Some('\u{250c}'));
    assert_eq!(buf.get(0, 9).map(|c| c.ch), Some('\u{2514}'));
}

#[test]
fn percent_width_sizes_container() {
    let mut tmpl = compile(
        hbox(vec![
            vbox(vec![text("L")]).percent_width(0.5).border(Border::SINGLE),
            vbox(vec![text("R")]).border(Border::SINGLE).width(5),
        ])
        .gap(0),
    );
    let mut buf = CharBuffer::new(20, 3);
    tmpl.render(&mut buf, 20, 3);
    // Left box outer width = floor(20 * 0.5) - 2 + 2 = 10.
    assert_eq!(buf.get(0, 0).map(|c| c.ch), Some('\u{250c}'));
    assert_eq!(buf.get(9, 0).map(|c| c.ch), Some('\u{2510}'));
    // Right box begins immediately after.
    assert_eq!(buf.get(10, 0).map(|c| c.ch), Some('\u{250c}'));
    assert_eq!(buf.get(14, 0).map(|c| c.ch), Some('\u{2510}'));
}

#[test]
fn padded_render_overwrites_stale_content_without_clear() {
    let title = Value::new(String::from("longer text"));
    let mut tmpl = compile(text_value(&title).width(15));
    let mut buf = CharBuffer::new(15, 1);

    tmpl.render_padded(&mut buf, 15, 1);
    assert_eq!(buf.line_text(0), "longer text");

    title.set("short".into());
    // No clear between frames: padding must cover the stale tail.
    tmpl.render_padded(&mut buf, 15, 1);
    assert_eq!(buf.line_text(0), "short");
}

#[test]
fn nested_containers_position_correctly() {
    let mut tmpl = compile(vbox(vec![
        text("top"),
        hbox(vec![
            vbox(vec![text("a"), text("b")]).width(4),
            vbox(vec![text("c"), text("d")]).width(4),
        ])
        .gap(2),
        text("bottom"),
    ]));
    let mut buf = CharBuffer::new(12, 6);
    tmpl.render(&mut buf, 12, 6);
    assert_eq!(buf.line_text(0), "top");
    assert_eq!(buf.get(0, 1).map(|c| c.ch), Some('a'));
    assert_eq!(buf.get(0, 2).map(|c| c.ch), Some('b'));
    // Second column starts after the first's width plus the gap.
    assert_eq!(buf.get(6, 1).map(|c| c.ch), Some('c'));
    assert_eq!(buf.get(6, 2).map(|c| c.ch), Some('d'));
    assert_eq!(buf.line_text(3), "bottom");
}

#[test]
fn wide_runes_occupy_two_columns() {
    let mut tmpl = compile(text("\u{4e16}\u{754c}!"));
    let mut buf = CharBuffer::new(10, 1);
    tmpl.render(&mut buf, 10, 1);
    assert_eq!(buf.get(0, 0).map(|c| c.ch), Some('\u{4e16}'));
    assert!(buf.get(1, 0).is_some_and(weft_core::Cell::is_placeholder));
    assert_eq!(buf.get(2, 0).map(|c| c.ch), Some('\u{754c}'));
    assert_eq!(buf.get(4, 0).map(|c| c.ch), Some('!'));
}
