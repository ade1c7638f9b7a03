//! Application loop — glue between input, rendering, and the terminal.
//!
//! The loop runs two logical tasks on one thread: an input task pulling
//! decoded events from an [`EventSource`] and dispatching them through
//! the [`Router`], and a render task draining a bounded render-request
//! channel. The channel has capacity one: requests made while a render
//! is pending coalesce into a single frame.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use crate::error::{Result, WeftError};
use crate::input::{Event, KeyEvent, Router};
use crate::screen::ScreenDriver;
use crate::template::Template;
use crate::terminal::Terminal;

/// A source of decoded terminal events. The reader collaborator.
pub trait EventSource {
    /// The next decoded event, or `None` when the source is exhausted.
    #[allow(async_fn_in_trait)]
    async fn next_event(&mut self) -> Option<Event>;
}

/// Event source backed by the crossterm event stream.
pub struct CrosstermEvents {
    stream: crossterm::event::EventStream,
}

impl CrosstermEvents {
    /// Create an event source reading from the terminal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stream: crossterm::event::EventStream::new(),
        }
    }
}

impl Default for CrosstermEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEvents {
    async fn next_event(&mut self) -> Option<Event> {
        use futures::StreamExt;
        loop {
            match self.stream.next().await {
                None | Some(Err(_)) => return None,
                Some(Ok(ct)) => {
                    if let Some(event) = Event::from_crossterm(ct) {
                        return Some(event);
                    }
                }
            }
        }
    }
}

/// Scripted event source for tests: yields a fixed sequence, then ends.
pub struct ScriptedEvents {
    events: VecDeque<Event>,
}

impl ScriptedEvents {
    /// Create a source yielding the given events in order.
    #[must_use]
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

impl EventSource for ScriptedEvents {
    async fn next_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }
}

/// Clonable handle for requesting renders and stopping the loop from
/// input handlers or background code.
#[derive(Clone)]
pub struct AppHandle {
    tx: mpsc::Sender<()>,
    stopped: Arc<AtomicBool>,
}

impl AppHandle {
    /// Request a render. Non-blocking: if a render is already pending,
    /// the request coalesces into it.
    pub fn request_render(&self) {
        let _ = self.tx.try_send(());
    }

    /// Stop the loop. The input task observes the flag on its next
    /// iteration.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        let _ = self.tx.try_send(());
    }

    /// Whether stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// The application loop: owns the terminal, the screen driver, the
/// router, and the compiled template.
pub struct AppLoop<T: Terminal> {
    terminal: T,
    driver: ScreenDriver,
    router: Router,
    template: Template,
    handle: AppHandle,
    rx: Option<mpsc::Receiver<()>>,
    padded: bool,
}

impl<T: Terminal> AppLoop<T> {
    /// Create a loop for the given terminal and compiled template.
    pub fn new(terminal: T, template: Template) -> Result<Self> {
        let (width, height) = terminal.size()?;
        let (tx, rx) = mpsc::channel(1);
        Ok(Self {
            terminal,
            driver: ScreenDriver::new(width, height),
            router: Router::new(),
            template,
            handle: AppHandle {
                tx,
                stopped: Arc::new(AtomicBool::new(false)),
            },
            rx: Some(rx),
            padded: false,
        })
    }

    /// A clonable handle for render requests and stopping.
    pub fn handle(&self) -> AppHandle {
        self.handle.clone()
    }

    /// The key router.
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Bind a key pattern to a handler.
    pub fn bind(&mut self, spec: &str, handler: impl FnMut(&KeyEvent) + 'static) -> Result<()> {
        self.router.bind(spec, handler)
    }

    /// Replace the compiled template (rebuild-on-demand).
    pub fn set_template(&mut self, template: Template) {
        self.template = template;
    }

    /// Render with text padding so frames skip the dirty-row clear.
    pub fn set_padded(&mut self, padded: bool) {
        self.padded = padded;
    }

    /// The terminal backend.
    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    /// Mutable access to the terminal backend.
    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }

    /// Run until stopped or the event source ends. Enters raw mode on
    /// entry, restores it on the way out, and renders an initial frame.
    pub async fn run(&mut self, events: &mut impl EventSource) -> Result<()> {
        let Some(mut rx) = self.rx.take() else {
            return Err(WeftError::Terminal("app loop is already running".into()));
        };
        self.terminal.enter_raw_mode()?;
        let result = self.event_loop(&mut rx, events).await;
        let exited = self.terminal.exit_raw_mode();
        self.rx = Some(rx);
        result.and(exited)
    }

    async fn event_loop(
        &mut self,
        rx: &mut mpsc::Receiver<()>,
        events: &mut impl EventSource,
    ) -> Result<()> {
        self.render_frame()?;
        loop {
            if self.handle.is_stopped() {
                return Ok(());
            }
            tokio::select! {
                biased;
                req = rx.recv() => {
                    if req.is_none() || self.handle.is_stopped() {
                        return Ok(());
                    }
                    self.render_frame()?;
                }
                event = events.next_event() => {
                    match event {
                        None => return Ok(()),
                        Some(Event::Key(key)) => {
                            let handled = self.router.dispatch(&key);
                            tracing::trace!(target: "weft::app", ?key, handled, "key event");
                        }
                        Some(Event::Resize(width, height)) => {
                            self.driver.resize(&mut self.terminal, width, height)?;
                            self.handle.request_render();
                        }
                        Some(Event::Paste(_)) => {}
                    }
                }
            }
        }
    }

    /// Measure, lay out, paint, and flush one frame, strictly in order.
    fn render_frame(&mut self) -> Result<()> {
        let (width, height) = self.driver.size();
        let template = &mut self.template;
        let padded = self.padded;
        self.driver.frame(&mut self.terminal, !padded, |back| {
            if padded {
                template.render_padded(back, width, height);
            } else {
                template.render(back, width, height);
            }
        })
    }
}
