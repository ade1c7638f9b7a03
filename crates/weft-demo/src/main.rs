//! weft-demo: a small dashboard exercising the engine end to end.
//!
//! Keys: `q` quits, `j`/`k` scroll the log, `<Tab>` toggles the detail
//! pane, `+`/`-` adjust the progress value.

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use weft_core::{
    AppLoop, Border, Color, CrosstermBackend, CrosstermEvents, Layer, Style, Template, Value,
    for_each, hbox, layer_view, leader, progress_value, text, text_value, vbox, when,
};

/// Command-line flags.
#[derive(Parser, Debug)]
#[command(name = "weft-demo", about = "weft engine dashboard demo")]
struct Cli {
    /// Number of rows in the scrolling log.
    #[arg(long, default_value_t = 100)]
    log_rows: usize,

    /// Render with padded text writes (skips per-frame clears).
    #[arg(long)]
    padded: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let status = Value::new(String::from("ready"));
    let pct = Value::new(35u8);
    let show_detail = Value::new(true);

    let log = Layer::new();
    let log_lines = Value::new(
        (0..cli.log_rows)
            .map(|i| format!("log entry {i}"))
            .collect::<Vec<_>>(),
    );
    let log_content = Template::compile(for_each(&log_lines, |s: &String| text(s.clone())))
        .context("failed to compile log content")?;
    log.set_content(log_content, 80, cli.log_rows as u16);

    let root = vbox(vec![
        hbox(vec![
            text("weft demo").style(Style::new().fg(Color::CYAN).bold()),
            text_value(&status).style(Style::new().fg(Color::BRIGHT_BLACK)),
        ])
        .gap(2),
        hbox(vec![
            vbox(vec![
                leader("progress", "").width(18),
                progress_value(&pct).bar_width(18),
            ])
            .border(Border::SINGLE)
            .title("state")
            .width(22),
            when(
                &show_detail,
                vbox(vec![
                    text("detail pane"),
                    text("tab toggles me").style(Style::new().dim()),
                ])
                .border(Border::ROUNDED)
                .title("detail"),
            ),
        ])
        .gap(1),
        vbox(vec![layer_view(&log)])
            .border(Border::SINGLE)
            .title("log")
            .flex_grow(1.0),
        text("q quit · j/k scroll · tab detail · +/- progress")
            .style(Style::new().fg(Color::BRIGHT_BLACK)),
    ])
    .flex_grow(1.0);

    let template = Template::compile(root).context("failed to compile dashboard")?;
    let mut app =
        AppLoop::new(CrosstermBackend::new(), template).context("failed to set up terminal")?;
    app.set_padded(cli.padded);

    let handle = app.handle();
    {
        let handle = handle.clone();
        app.bind("q", move |_| handle.stop())
            .context("bind q")?;
    }
    {
        let (log, handle) = (log.clone(), handle.clone());
        app.bind("j", move |_| {
            log.scroll_down(1);
            handle.request_render();
        })
        .context("bind j")?;
    }
    {
        let (log, handle) = (log.clone(), handle.clone());
        app.bind("k", move |_| {
            log.scroll_up(1);
            handle.request_render();
        })
        .context("bind k")?;
    }
    {
        let (show, handle) = (show_detail.clone(), handle.clone());
        app.bind("<Tab>", move |_| {
            show.update(|v| *v = !*v);
            handle.request_render();
        })
        .context("bind tab")?;
    }
    {
        let (pct, status, handle) = (pct.clone(), status.clone(), handle.clone());
        app.bind("+", move |_| {
            pct.update(|v| *v = (*v + 5).min(100));
            status.set(format!("progress {}%", pct.get()));
            handle.request_render();
        })
        .context("bind +")?;
    }
    {
        let (pct, status, handle) = (pct.clone(), status.clone(), handle.clone());
        app.bind("-", move |_| {
            pct.update(|v| *v = v.saturating_sub(5));
            status.set(format!("progress {}%", pct.get()));
            handle.request_render();
        })
        .context("bind -")?;
    }

    debug!("starting app loop");
    let mut events = CrosstermEvents::new();
    app.run(&mut events).await.context("app loop failed")?;
    Ok(())
}
