//! Rendering benchmarks — template render and diff flush.

#![allow(missing_docs)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use weft_core::{
    Border, CharBuffer, Color, ScreenDriver, Style, Template, TestBackend, Value, for_each, hbox,
    leader, progress_value, text, text_value, vbox,
};

fn dashboard_template() -> (Template, Value<String>, Value<u8>) {
    let title = Value::new(String::from("weft dashboard"));
    let pct = Value::new(40u8);
    let rows = Value::new(
        (0..20)
            .map(|i| format!("item number {i}"))
            .collect::<Vec<_>>(),
    );
    let node = vbox(vec![
        text_value(&title).style(Style::new().fg(Color::CYAN).bold()),
        hbox(vec![
            vbox(vec![
                leader("cpu", "40%").width(16),
                leader("mem", "61%").width(16),
            ])
            .border(Border::SINGLE)
            .width(20),
            vbox(vec![for_each(&rows, |s: &String| text(s.clone()))])
                .border(Border::SINGLE)
                .title("items"),
        ])
        .gap(1),
        progress_value(&pct).bar_width(40),
    ]);
    let tmpl = match Template::compile(node) {
        Ok(t) => t,
        Err(_) => unreachable!(),
    };
    (tmpl, title, pct)
}

/// Benchmark a full template render into an 80x24 buffer.
fn benchmark_template_render_80x24(c: &mut Criterion) {
    let (mut tmpl, _title, _pct) = dashboard_template();
    c.bench_function("template_render_80x24", |b| {
        let mut buf = CharBuffer::new(80, 24);
        b.iter(|| {
            buf.clear_dirty();
            tmpl.render(&mut buf, 80, 24);
            black_box(buf.max_dirty_row())
        })
    });
}

/// Benchmark a render plus diff flush with a small per-frame change.
fn benchmark_frame_flush_80x24(c: &mut Criterion) {
    let (mut tmpl, _title, pct) = dashboard_template();
    let driver = ScreenDriver::new(80, 24);
    let mut term = TestBackend::new(80, 24);
    c.bench_function("frame_flush_80x24", |b| {
        let mut n = 0u8;
        b.iter(|| {
            n = (n + 1) % 101;
            pct.set(n);
            driver
                .frame(&mut term, true, |back| tmpl.render(back, 80, 24))
                .ok();
            term.clear_buffer();
        })
    });
}

/// Benchmark raw progress-bar and string writes into a 200x60 grid.
fn benchmark_buffer_writes_200x60(c: &mut Criterion) {
    c.bench_function("buffer_writes_200x60", |b| {
        let style = Style::new().fg(Color::GREEN);
        b.iter(|| {
            let mut buf = CharBuffer::new(200, 60);
            for y in 0..60 {
                buf.write_string_fast(0, y, "the quick brown fox jumps over", style, 200);
                buf.write_progress_bar(40, y, 40, f32::from(y) / 60.0, style);
            }
            black_box(buf)
        })
    });
}

criterion_group!(
    benches,
    benchmark_template_render_80x24,
    benchmark_frame_flush_80x24,
    benchmark_buffer_writes_200x60
);
criterion_main!(benches);
