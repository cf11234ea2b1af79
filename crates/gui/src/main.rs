#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]

use std::sync::Arc;

use tauri::webview::{PageLoadEvent, WebviewBuilder};
use tauri::{
    AppHandle, LogicalPosition, LogicalSize, Manager, WebviewUrl, WebviewWindowBuilder,
    WindowEvent, Wry,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

use aeternus_gui::commands::{self, DesktopState};
use aeternus_gui::events::SurfaceEvent;
use aeternus_gui::settings::{ShellSettings, DEFAULT_HOME_URL};
use aeternus_gui::surface::{ContentView, TauriSink, CONTENT_WEBVIEW_LABEL, MAIN_WEBVIEW_LABEL};
use aeternus_gui::AppState;

const DEFAULT_LOG_FILTER: &str = "info,aeternus_gui=debug,agent_session=debug";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    fmt().with_env_filter(filter).init();
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let msg = if let Some(s) = info.payload().downcast_ref::<&str>() {
            *s
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.as_str()
        } else {
            "panic occurred"
        };
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown:0".into());
        error!("panic: {} @ {}", msg, location);
    }));
}

/// Surface callbacks are queued and applied in order on the async runtime,
/// never from inside the webview callback itself.
fn spawn_surface_relay(app: &AppHandle<Wry>) -> mpsc::UnboundedSender<SurfaceEvent> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Some(state) = app.try_state::<DesktopState>() {
                state.context().surface_event(event);
            }
        }
    });
    tx
}

fn home_url(settings: &ShellSettings) -> Url {
    match Url::parse(&settings.home_url) {
        Ok(url) => url,
        Err(err) => {
            warn!("invalid home url `{}`: {err}", settings.home_url);
            Url::parse(DEFAULT_HOME_URL).expect("default home url parses")
        }
    }
}

/// WebView2 takes one argument string per browser environment, so every
/// webview in the process must be built with the same value.
#[cfg(windows)]
fn browser_args(settings: &ShellSettings) -> Option<String> {
    Some(format!(
        "--disable-features=msWebOOUI,msPdfOOUI,msSmartScreenProtection {}",
        settings.agent.remote_debugging_arg()
    ))
}

#[cfg(not(windows))]
fn browser_args(settings: &ShellSettings) -> Option<String> {
    warn!(
        port = settings.agent.cdp_port,
        "remote debugging is unavailable on this platform; Agent Core cannot drive the content view"
    );
    None
}

fn create_browser_window(app: &AppHandle<Wry>, settings: &ShellSettings) -> tauri::Result<()> {
    let window_size = settings.window;
    let args = browser_args(settings);
    let mut window_builder =
        WebviewWindowBuilder::new(app, MAIN_WEBVIEW_LABEL, WebviewUrl::App("index.html".into()))
            .title("Aeternus")
            .inner_size(window_size.width, window_size.height)
            .min_inner_size(window_size.min_width, window_size.min_height);
    if let Some(args) = args.as_deref() {
        window_builder = window_builder.additional_browser_args(args);
    }
    let window = window_builder.build()?;
    debug!("main window built");

    // The content webview carries no IPC capability; see capabilities/main.json.
    let relay = spawn_surface_relay(app);
    let title_relay = relay.clone();
    let mut builder = WebviewBuilder::new(CONTENT_WEBVIEW_LABEL, WebviewUrl::External(home_url(settings)))
        .on_page_load(move |_webview, payload| {
            let events = match payload.event() {
                PageLoadEvent::Started => vec![
                    SurfaceEvent::StartedLoading,
                    SurfaceEvent::Navigated(payload.url().to_string()),
                ],
                PageLoadEvent::Finished => vec![SurfaceEvent::StoppedLoading],
            };
            for event in events {
                let _ = relay.send(event);
            }
        })
        .on_document_title_changed(move |_webview, title| {
            let _ = title_relay.send(SurfaceEvent::TitleUpdated(title));
        });
    if let Some(args) = args.as_deref() {
        info!(port = settings.agent.cdp_port, "content view remote debugging enabled");
        builder = builder.additional_browser_args(args);
    }

    let fallback = settings
        .geometry
        .fallback_rect(window_size.width, window_size.height);
    let content = window.as_ref().window().add_child(
        builder,
        LogicalPosition::new(fallback.x, fallback.y),
        LogicalSize::new(fallback.width, fallback.height),
    )?;

    if let Some(state) = app.try_state::<DesktopState>() {
        state.context().attach_surface(ContentView::new(content));
    }

    let resize_app = app.clone();
    let resize_window = window.clone();
    window.on_window_event(move |event| {
        if let WindowEvent::Resized(size) = event {
            let scale = resize_window.scale_factor().unwrap_or(1.0);
            let logical = size.to_logical::<f64>(scale);
            if let Some(state) = resize_app.try_state::<DesktopState>() {
                state.context().window_resized(logical.width, logical.height);
            }
        }
    });

    Ok(())
}

fn main() {
    init_tracing();
    install_panic_hook();
    info!("starting aeternus shell");

    tauri::Builder::default()
        .setup(|app| {
            let settings = ShellSettings::load_or_default();
            let sink = Arc::new(TauriSink::new(app.handle().clone()));
            app.manage::<DesktopState>(AppState::new(settings.clone(), sink));

            create_browser_window(app.handle(), &settings)?;

            let agent = app.state::<DesktopState>().agent.clone();
            let endpoint = settings.agent.endpoint;
            tauri::async_runtime::spawn(async move {
                agent.connect(&endpoint);
            });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::navigate,
            commands::go_back,
            commands::go_forward,
            commands::reload,
            commands::update_layout,
            commands::container_resized,
            commands::submit_url,
            commands::new_tab,
            commands::close_tab,
            commands::activate_tab,
            commands::get_tabs,
            commands::agent_submit,
            commands::agent_stop,
            commands::agent_log,
            commands::agent_status,
            commands::get_settings,
            commands::update_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
