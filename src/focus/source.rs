use async_trait::async_trait;
use log::warn;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, Lines},
    sync::mpsc,
};

use super::FocusEvent;

#[async_trait]
pub trait FocusSource: Send {
    /// Next transition, or `None` once the source is closed.
    async fn next_event(&mut self) -> Option<FocusEvent>;
}

/// Push-style adapter: the host calls [`FocusSender::on_hidden`] and
/// friends from its own event handlers.
pub struct ChannelFocusSource {
    rx: mpsc::UnboundedReceiver<FocusEvent>,
}

#[derive(Clone)]
pub struct FocusSender {
    tx: mpsc::UnboundedSender<FocusEvent>,
}

impl ChannelFocusSource {
    pub fn new() -> (FocusSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (FocusSender { tx }, Self { rx })
    }
}

impl FocusSender {
    pub fn send(&self, event: FocusEvent) {
        // The monitor may already be gone during teardown.
        let _ = self.tx.send(event);
    }

    pub fn on_hidden(&self) {
        self.send(FocusEvent::Hidden);
    }

    pub fn on_visible(&self) {
        self.send(FocusEvent::Visible);
    }

    pub fn on_blur(&self) {
        self.send(FocusEvent::Blur);
    }

    pub fn on_focus(&self) {
        self.send(FocusEvent::Focus);
    }
}

#[async_trait]
impl FocusSource for ChannelFocusSource {
    async fn next_event(&mut self) -> Option<FocusEvent> {
        self.rx.recv().await
    }
}

/// One event name per line (`hidden`, `visible`, `blur`, `focus`).
/// Blank lines are skipped; unknown names are logged and skipped.
pub struct LineFocusSource<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin + Send> LineFocusSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> FocusSource for LineFocusSource<R> {
    async fn next_event(&mut self) -> Option<FocusEvent> {
        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(err) => {
                    warn!("focus input failed: {err}");
                    return None;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            match line.parse() {
                Ok(event) => return Some(event),
                Err(err) => warn!("{err}"),
            }
        }
    }
}
