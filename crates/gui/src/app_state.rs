use std::sync::{Arc, Mutex, MutexGuard};

use crate::agent_bridge::AgentBridge;
use crate::context::ShellContext;
use crate::events::UiSink;
use crate::host::ContentSurface;
use crate::settings::ShellSettings;

/// Process-wide state handed to every command handler.
pub struct AppState<S> {
    pub context: Mutex<ShellContext<S>>,
    pub agent: AgentBridge,
    pub settings: Mutex<ShellSettings>,
}

impl<S: ContentSurface> AppState<S> {
    pub fn new(settings: ShellSettings, sink: Arc<dyn UiSink>) -> Self {
        let context = ShellContext::new(
            settings.geometry,
            &settings.home_url,
            &settings.search_endpoint,
            sink.clone(),
        );
        Self {
            context: Mutex::new(context),
            agent: AgentBridge::new(sink, settings.agent.cancel_on_stop),
            settings: Mutex::new(settings),
        }
    }

    pub fn context(&self) -> MutexGuard<'_, ShellContext<S>> {
        self.context.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn settings(&self) -> ShellSettings {
        self.settings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replace the settings. Geometry and search endpoint apply immediately;
    /// the agent endpoint is read at the next launch.
    pub fn apply_settings(&self, settings: ShellSettings) {
        {
            let mut context = self.context();
            context.set_geometry(settings.geometry);
            context.set_search_endpoint(&settings.search_endpoint);
        }
        *self.settings.lock().unwrap_or_else(|e| e.into_inner()) = settings;
    }
}
