use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::events::{HostCommand, SurfaceEvent, UiEvent, UiSink};
use crate::host::{ContentSurface, HostController};
use crate::layout::ChromeGeometry;
use crate::shell::{BrowserShell, UiAction};

/// The browsing session: host controller, UI-surface state and the channel
/// to the UI webview. Owned by the entry point and handed to every handler.
pub struct ShellContext<S> {
    host: HostController<S>,
    shell: BrowserShell,
    sink: Arc<dyn UiSink>,
}

impl<S: ContentSurface> ShellContext<S> {
    pub fn new(
        geometry: ChromeGeometry,
        home_url: &str,
        search_endpoint: &str,
        sink: Arc<dyn UiSink>,
    ) -> Self {
        Self {
            host: HostController::new(geometry),
            shell: BrowserShell::new(home_url, search_endpoint),
            sink,
        }
    }

    pub fn host(&self) -> &HostController<S> {
        &self.host
    }

    pub fn shell(&self) -> &BrowserShell {
        &self.shell
    }

    pub fn attach_surface(&mut self, surface: S) {
        self.host.attach(surface);
    }

    pub fn set_geometry(&mut self, geometry: ChromeGeometry) {
        self.host.set_geometry(geometry);
    }

    pub fn set_search_endpoint(&mut self, endpoint: &str) {
        self.shell.set_search_endpoint(endpoint);
    }

    /// User action from the chrome UI.
    pub fn ui_action(&mut self, action: UiAction) -> Result<()> {
        let touches_tabs = action.touches_tabs();
        let command = self.shell.dispatch(action)?;
        if touches_tabs {
            self.emit_tabs();
        }
        if let Some(command) = command {
            self.host.dispatch(command);
        }
        Ok(())
    }

    /// Raw host command, bypassing tab bookkeeping.
    pub fn host_command(&mut self, command: HostCommand) {
        self.host.dispatch(command);
    }

    /// Lifecycle callback from the content surface.
    pub fn surface_event(&mut self, event: SurfaceEvent) {
        let Some(relayed) = self.host.relay(event) else {
            return;
        };
        debug!(?relayed, "relaying host event");
        self.shell.apply_host_event(&relayed);
        self.sink.emit(UiEvent::Host(relayed));
        self.emit_tabs();
    }

    pub fn window_resized(&mut self, width: f64, height: f64) {
        self.host.window_resized(width, height);
    }

    fn emit_tabs(&self) {
        self.sink.emit(UiEvent::TabsChanged(self.shell.tabs()));
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Sink that keeps every emitted event.
    #[derive(Default)]
    pub struct RecordingSink {
        pub events: Mutex<Vec<UiEvent>>,
    }

    impl RecordingSink {
        pub fn channels(&self) -> Vec<&'static str> {
            self.events.lock().unwrap().iter().map(UiEvent::channel).collect()
        }

        pub fn take(&self) -> Vec<UiEvent> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    impl UiSink for RecordingSink {
        fn emit(&self, event: UiEvent) {
            self.events.lock().unwrap().push(event);
        }
    }
}
