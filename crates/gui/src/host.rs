//! Host controller: owns the content surface, applies navigation and layout
//! commands to it, and relays its lifecycle callbacks to the UI.

use anyhow::Result;
use tracing::{debug, warn};

use crate::events::{HostCommand, HostEvent, SurfaceEvent};
use crate::layout::{ChromeGeometry, LayoutRect, PixelRect};

/// Native content view operated by the host.
///
/// Implementations perform the operation and report failures; the controller
/// decides what to do with them.
pub trait ContentSurface {
    fn load_url(&self, url: &str) -> Result<()>;
    fn can_go_back(&self) -> bool;
    fn go_back(&self) -> Result<()>;
    fn can_go_forward(&self) -> bool;
    fn go_forward(&self) -> Result<()>;
    fn reload(&self) -> Result<()>;
    fn set_bounds(&self, rect: PixelRect) -> Result<()>;
}

/// Where the currently applied content bounds came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutSource {
    Fallback,
    Measured,
}

#[derive(Debug)]
pub struct HostController<S> {
    surface: Option<S>,
    geometry: ChromeGeometry,
    layout_source: LayoutSource,
    bounds: Option<PixelRect>,
    current_url: Option<String>,
    loading: bool,
}

impl<S: ContentSurface> HostController<S> {
    pub fn new(geometry: ChromeGeometry) -> Self {
        Self {
            surface: None,
            geometry,
            layout_source: LayoutSource::Fallback,
            bounds: None,
            current_url: None,
            loading: false,
        }
    }

    /// Install the content surface once the native view exists.
    pub fn attach(&mut self, surface: S) {
        self.surface = Some(surface);
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn set_geometry(&mut self, geometry: ChromeGeometry) {
        self.geometry = geometry;
    }

    pub fn layout_source(&self) -> LayoutSource {
        self.layout_source
    }

    pub fn bounds(&self) -> Option<PixelRect> {
        self.bounds
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Apply a command. Commands arriving before the surface exists are
    /// dropped, and surface failures are logged rather than returned.
    pub fn dispatch(&mut self, command: HostCommand) {
        let Some(surface) = self.surface.as_ref() else {
            debug!(?command, "content surface not ready; command ignored");
            return;
        };

        let result = match &command {
            HostCommand::Navigate(url) => {
                debug!(%url, "navigating content surface");
                surface.load_url(url)
            }
            HostCommand::GoBack if surface.can_go_back() => surface.go_back(),
            HostCommand::GoForward if surface.can_go_forward() => surface.go_forward(),
            HostCommand::GoBack | HostCommand::GoForward => Ok(()),
            HostCommand::Reload => surface.reload(),
            HostCommand::UpdateLayout(rect) => {
                let rect = *rect;
                self.layout_source = LayoutSource::Measured;
                self.apply_rect(rect);
                return;
            }
        };

        if let Err(err) = result {
            warn!(?command, "content surface command failed: {err}");
        }
    }

    /// Window resize: reposition with the fallback layout until the UI has
    /// supplied a measured one.
    pub fn window_resized(&mut self, width: f64, height: f64) {
        if self.layout_source == LayoutSource::Measured {
            return;
        }
        let rect = self.geometry.fallback_rect(width, height);
        self.apply_rect(rect);
    }

    /// Translate a surface callback into the event the UI should see.
    ///
    /// Loading transitions are de-duplicated so the UI never observes two
    /// consecutive `Loading(true)` events.
    pub fn relay(&mut self, event: SurfaceEvent) -> Option<HostEvent> {
        match event {
            SurfaceEvent::StartedLoading if self.loading => None,
            SurfaceEvent::StartedLoading => {
                self.loading = true;
                Some(HostEvent::Loading(true))
            }
            SurfaceEvent::StoppedLoading if !self.loading => None,
            SurfaceEvent::StoppedLoading => {
                self.loading = false;
                Some(HostEvent::Loading(false))
            }
            SurfaceEvent::Navigated(url) | SurfaceEvent::NavigatedInPage(url) => {
                self.current_url = Some(url.clone());
                Some(HostEvent::UrlChanged(url))
            }
            SurfaceEvent::TitleUpdated(title) => Some(HostEvent::TitleChanged(title)),
        }
    }

    fn apply_rect(&mut self, rect: LayoutRect) {
        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        let pixels = rect.rounded();
        if self.bounds == Some(pixels) {
            return;
        }
        debug!(?pixels, source = ?self.layout_source, "updating content bounds");
        match surface.set_bounds(pixels) {
            Ok(()) => self.bounds = Some(pixels),
            Err(err) => warn!("failed to set content bounds: {err}"),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Operation recorded by [`RecordingSurface`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum SurfaceCall {
        Load(String),
        Back,
        Forward,
        Reload,
        Bounds(PixelRect),
    }

    /// In-memory surface that records every call and has a toggleable history.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingSurface {
        pub calls: Arc<Mutex<Vec<SurfaceCall>>>,
        pub history: Arc<Mutex<(bool, bool)>>,
    }

    impl RecordingSurface {
        pub fn calls(&self) -> Vec<SurfaceCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn set_history(&self, back: bool, forward: bool) {
            *self.history.lock().unwrap() = (back, forward);
        }

        fn record(&self, call: SurfaceCall) -> Result<()> {
            self.calls.lock().unwrap().push(call);
            Ok(())
        }
    }

    impl ContentSurface for RecordingSurface {
        fn load_url(&self, url: &str) -> Result<()> {
            self.record(SurfaceCall::Load(url.to_string()))
        }
        fn can_go_back(&self) -> bool {
            self.history.lock().unwrap().0
        }
        fn go_back(&self) -> Result<()> {
            self.record(SurfaceCall::Back)
        }
        fn can_go_forward(&self) -> bool {
            self.history.lock().unwrap().1
        }
        fn go_forward(&self) -> Result<()> {
            self.record(SurfaceCall::Forward)
        }
        fn reload(&self) -> Result<()> {
            self.record(SurfaceCall::Reload)
        }
        fn set_bounds(&self, rect: PixelRect) -> Result<()> {
            self.record(SurfaceCall::Bounds(rect))
        }
    }
}
