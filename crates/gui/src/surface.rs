//! Tauri-backed implementations of the content surface and the UI sink.

use anyhow::{Context, Result};
use tauri::{
    AppHandle, Emitter, LogicalPosition, LogicalSize, Position, Rect, Runtime, Size, Webview, Wry,
};
use tracing::warn;
use url::Url;

use crate::events::{UiEvent, UiSink};
use crate::host::ContentSurface;
use crate::layout::PixelRect;

pub const MAIN_WEBVIEW_LABEL: &str = "main";
pub const CONTENT_WEBVIEW_LABEL: &str = "content";

/// The child webview that renders web content.
///
/// The webview exposes no history introspection, so back/forward always go
/// through `history.back()`/`history.forward()`, which the document itself
/// treats as no-ops at either end of its history.
#[derive(Debug, Clone)]
pub struct ContentView<R: Runtime = Wry> {
    webview: Webview<R>,
}

impl<R: Runtime> ContentView<R> {
    pub fn new(webview: Webview<R>) -> Self {
        Self { webview }
    }
}

impl<R: Runtime> ContentSurface for ContentView<R> {
    fn load_url(&self, url: &str) -> Result<()> {
        let target = Url::parse(url).with_context(|| format!("invalid url `{url}`"))?;
        self.webview.navigate(target)?;
        Ok(())
    }

    fn can_go_back(&self) -> bool {
        true
    }

    fn go_back(&self) -> Result<()> {
        self.webview.eval("history.back()")?;
        Ok(())
    }

    fn can_go_forward(&self) -> bool {
        true
    }

    fn go_forward(&self) -> Result<()> {
        self.webview.eval("history.forward()")?;
        Ok(())
    }

    fn reload(&self) -> Result<()> {
        self.webview.eval("location.reload()")?;
        Ok(())
    }

    fn set_bounds(&self, rect: PixelRect) -> Result<()> {
        let bounds = Rect {
            position: Position::Logical(LogicalPosition::new(rect.x as f64, rect.y as f64)),
            size: Size::Logical(LogicalSize::new(rect.width as f64, rect.height as f64)),
        };
        self.webview
            .set_bounds(bounds)
            .context("failed to set content bounds")?;
        if rect.width > 1 && rect.height > 1 {
            self.webview.show()?;
        } else {
            self.webview.hide()?;
        }
        Ok(())
    }
}

/// Emits UI events to the chrome webview only; the content webview never
/// receives shell events.
pub struct TauriSink<R: Runtime = Wry> {
    app: AppHandle<R>,
}

impl<R: Runtime> TauriSink<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: Runtime> UiSink for TauriSink<R> {
    fn emit(&self, event: UiEvent) {
        let channel = event.channel();
        if let Err(err) = self.app.emit_to(MAIN_WEBVIEW_LABEL, channel, event) {
            warn!("failed to emit {channel} event: {err}");
        }
    }
}
