//! # Saorsa Overlay WASM Application
//!
//! Browser host for the annotation overlay: wires canvas and window events
//! into the engine, draws through a 2D canvas and talks to the document
//! service.
//!
//! ## Usage
//!
//! Build for WASM:
//! ```bash
//! wasm-pack build --target web overlay-app
//! ```
//!
//! Then import in JavaScript:
//! ```javascript
//! import init, { OverlayApp } from './pkg/overlay_app.js';
//!
//! await init();
//! const app = new OverlayApp('overlay', 'page', null, null);
//! app.onPageChange((page, label, image) => { /* swap page content */ });
//! app.onTextRequest((json) => {
//!     const request = JSON.parse(json);
//!     app.resolveText(request.id, prompt('Label'));
//! });
//! app.load('doc-1');
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod host;
mod input;
mod listeners;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use host::{run, schedule_layout, Callbacks, Host};
use input::{mouse_input, touch_input};
use js_sys::Function;
use listeners::Listeners;
use overlay_core::{
    Effect, Engine, EngineConfig, LayoutChange, PersistenceGateway, PointerPhase, Tool, TouchPhase,
};
use overlay_gateway::{GatewayConfig, HttpGateway, DEFAULT_TIMEOUT_MS};
use overlay_renderer::{Canvas2dSurface, Renderer};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{EventTarget, HtmlCanvasElement};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init_wasm() {
    console_error_panic_hook::set_once();
    tracing::info!("Saorsa Overlay WASM initialized");
}

/// Annotation overlay bound to one canvas and one content element.
#[wasm_bindgen]
pub struct OverlayApp {
    host: Rc<RefCell<Host>>,
    gateway: Rc<HttpGateway>,
    _listeners: Listeners,
}

#[wasm_bindgen]
impl OverlayApp {
    /// Attach to `canvas_id`, sized over the `content_id` element.
    ///
    /// `service_url` defaults to the page origin; `config_json` holds an
    /// optional engine configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if either element is missing, the canvas has no 2D
    /// context or the configuration is invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        content_id: &str,
        service_url: Option<String>,
        config_json: Option<String>,
    ) -> Result<OverlayApp, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document"))?;

        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("Canvas '{canvas_id}' not found")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str("Element is not a canvas"))?;
        let content = document
            .get_element_by_id(content_id)
            .ok_or_else(|| JsValue::from_str(&format!("Content '{content_id}' not found")))?;

        let config = match config_json {
            Some(json) => EngineConfig::from_json(&json).map_err(js_error)?,
            None => EngineConfig::default(),
        };
        let service_url = match service_url {
            Some(url) => url,
            None => window.location().origin()?,
        };
        let gateway_config =
            GatewayConfig::new(&service_url, Duration::from_millis(DEFAULT_TIMEOUT_MS))
                .map_err(js_error)?;
        let gateway = HttpGateway::new(&gateway_config).map_err(js_error)?;

        let surface = Canvas2dSurface::new(canvas.clone()).map_err(js_error)?;
        let host = Rc::new(RefCell::new(Host {
            engine: Engine::new(config),
            renderer: Renderer::new(surface),
            content,
            callbacks: Callbacks::default(),
        }));
        if let Ok(state) = host.try_borrow() {
            state.sync_cursor();
        }

        let listeners = register_listeners(&host, canvas.as_ref(), window.as_ref())?;
        tracing::info!("Overlay attached to #{} over #{}", canvas_id, content_id);

        Ok(Self {
            host,
            gateway: Rc::new(gateway),
            _listeners: listeners,
        })
    }

    /// Register `callback(requestJson)` for text-label prompts.
    ///
    /// Without a handler, text requests are cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error while the overlay is handling another call.
    #[wasm_bindgen(js_name = onTextRequest)]
    pub fn on_text_request(&self, callback: Function) -> Result<(), JsValue> {
        self.with_host_mut(|state| state.callbacks.text_request = Some(callback))
    }

    /// Register `callback(page, label, image)` for page changes.
    ///
    /// # Errors
    ///
    /// Returns an error while the overlay is handling another call.
    #[wasm_bindgen(js_name = onPageChange)]
    pub fn on_page_change(&self, callback: Function) -> Result<(), JsValue> {
        self.with_host_mut(|state| state.callbacks.page_change = Some(callback))
    }

    /// Register `callback(noticeJson, message)` for load and save outcomes.
    ///
    /// # Errors
    ///
    /// Returns an error while the overlay is handling another call.
    #[wasm_bindgen(js_name = onNotice)]
    pub fn on_notice(&self, callback: Function) -> Result<(), JsValue> {
        self.with_host_mut(|state| state.callbacks.notice = Some(callback))
    }

    /// Fetch a document from the service and open it.
    ///
    /// A later call supersedes an earlier one still in flight.
    ///
    /// # Errors
    ///
    /// Returns an error while the overlay is handling another call.
    pub fn load(&self, document_id: String) -> Result<(), JsValue> {
        let ticket = self.with_host_mut(|state| state.engine.begin_load(document_id))?;
        let host = Rc::clone(&self.host);
        let gateway = Rc::clone(&self.gateway);
        spawn_local(async move {
            let result = gateway.load_document(ticket.document_id()).await;
            run(&host, |engine| engine.finish_load(&ticket, result));
        });
        Ok(())
    }

    /// Save every annotation of the open document.
    ///
    /// # Errors
    ///
    /// Returns an error if no document is open.
    pub fn save(&self) -> Result<(), JsValue> {
        let pending = self
            .with_host(|state| state.engine.save_request())?
            .map_err(js_error)?;
        let host = Rc::clone(&self.host);
        let gateway = Rc::clone(&self.gateway);
        spawn_local(async move {
            let result = gateway.save_annotations(&pending.request).await;
            run(&host, |engine| {
                engine.finish_save(&pending, result);
                Effect::None
            });
        });
        Ok(())
    }

    /// Recalibrate after the page content finished loading or changed size.
    ///
    /// # Errors
    ///
    /// Returns an error while the overlay is handling another call.
    #[wasm_bindgen(js_name = contentLoaded)]
    pub fn content_loaded(&self) -> Result<(), JsValue> {
        let metrics = self.with_host(Host::measure)?;
        run(&self.host, |engine| engine.calibrate(metrics));
        Ok(())
    }

    /// Select a tool by name: `pen`, `highlighter`, `eraser` or `text`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown tool name.
    #[wasm_bindgen(js_name = selectTool)]
    pub fn select_tool(&self, name: &str) -> Result<(), JsValue> {
        let tool = Tool::from_name(name)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown tool '{name}'")))?;
        self.with_host_mut(|state| {
            state.engine.select_tool(tool);
            state.sync_cursor();
        })
    }

    /// Select the drawing color as `#RRGGBB`.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed color.
    #[wasm_bindgen(js_name = selectColor)]
    pub fn select_color(&self, color: &str) -> Result<(), JsValue> {
        self.with_host_mut(|state| state.engine.select_color(color))?
            .map_err(js_error)
    }

    /// Select the brush size.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive or non-finite width.
    #[wasm_bindgen(js_name = setStrokeWidth)]
    pub fn set_stroke_width(&self, width: f64) -> Result<(), JsValue> {
        self.with_host_mut(|state| state.engine.set_stroke_width(width))?
            .map_err(js_error)
    }

    /// Answer a text request; `null` or an empty string cancels it.
    #[wasm_bindgen(js_name = resolveText)]
    pub fn resolve_text(&self, request_id: f64, text: Option<String>) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let request_id = request_id.max(0.0) as u64;
        run(&self.host, |engine| engine.resolve_text(request_id, text));
    }

    /// Go to the next page.
    #[wasm_bindgen(js_name = nextPage)]
    pub fn next_page(&self) {
        run(&self.host, |engine| engine.advance(1));
    }

    /// Go to the previous page.
    #[wasm_bindgen(js_name = previousPage)]
    pub fn previous_page(&self) {
        run(&self.host, |engine| engine.advance(-1));
    }

    /// Remove every annotation on the current page.
    #[wasm_bindgen(js_name = clearPage)]
    pub fn clear_page(&self) {
        run(&self.host, Engine::clear_page);
    }

    /// Close the document without saving.
    pub fn discard(&self) {
        run(&self.host, Engine::discard_document);
    }

    /// Page indicator, e.g. `2/5`.
    #[wasm_bindgen(js_name = pageLabel)]
    pub fn page_label(&self) -> String {
        self.with_host(|state| state.engine.page_label())
            .unwrap_or_default()
    }

    /// Whether a previous page exists.
    #[wasm_bindgen(js_name = canGoBack)]
    pub fn can_go_back(&self) -> bool {
        self.with_host(|state| state.engine.can_go_back())
            .unwrap_or(false)
    }

    /// Whether a next page exists.
    #[wasm_bindgen(js_name = canGoForward)]
    pub fn can_go_forward(&self) -> bool {
        self.with_host(|state| state.engine.can_go_forward())
            .unwrap_or(false)
    }

    /// Whether annotations changed since the last load or save.
    #[wasm_bindgen(js_name = hasUnsavedChanges)]
    pub fn has_unsaved_changes(&self) -> bool {
        self.with_host(|state| state.engine.has_unsaved_changes())
            .unwrap_or(false)
    }

    /// All annotations of the open document in wire format.
    ///
    /// # Errors
    ///
    /// Returns an error while the overlay is handling another call.
    #[wasm_bindgen(js_name = annotationsJson)]
    pub fn annotations_json(&self) -> Result<String, JsValue> {
        self.with_host(|state| match state.engine.annotations() {
            Some(set) => set.to_json().map_err(js_error),
            None => Ok("[]".to_string()),
        })?
    }

    /// CSS cursor for the active tool.
    pub fn cursor(&self) -> String {
        self.with_host(|state| state.engine.cursor().to_string())
            .unwrap_or_default()
    }
}

impl OverlayApp {
    fn with_host<R>(&self, f: impl FnOnce(&Host) -> R) -> Result<R, JsValue> {
        let state = self
            .host
            .try_borrow()
            .map_err(|_| JsValue::from_str("Overlay is busy"))?;
        Ok(f(&state))
    }

    fn with_host_mut<R>(&self, f: impl FnOnce(&mut Host) -> R) -> Result<R, JsValue> {
        let mut state = self
            .host
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("Overlay is busy"))?;
        Ok(f(&mut state))
    }
}

fn register_listeners(
    host: &Rc<RefCell<Host>>,
    canvas: &EventTarget,
    window: &EventTarget,
) -> Result<Listeners, JsValue> {
    let mut listeners = Listeners::new();

    for (name, phase) in [
        ("mousedown", PointerPhase::Down),
        ("mousemove", PointerPhase::Move),
        ("mouseup", PointerPhase::Up),
        ("mouseleave", PointerPhase::Leave),
    ] {
        let host = Rc::clone(host);
        listeners.add(canvas, name, move |event| {
            if let Some(input) = mouse_input(&event, phase) {
                run(&host, |engine| engine.handle_input(&input));
            }
        })?;
    }

    for (name, phase) in [
        ("touchstart", TouchPhase::Start),
        ("touchmove", TouchPhase::Move),
        ("touchend", TouchPhase::End),
        ("touchcancel", TouchPhase::Cancel),
    ] {
        let host = Rc::clone(host);
        listeners.add_active(canvas, name, move |event| {
            if let Some(input) = touch_input(&event, phase) {
                run(&host, |engine| engine.handle_input(&input));
            }
        })?;
    }

    for (name, change) in [
        ("resize", LayoutChange::Resize),
        ("orientationchange", LayoutChange::Orientation),
    ] {
        let weak = Rc::downgrade(host);
        listeners.add(window, name, move |_| {
            if let Some(host) = weak.upgrade() {
                schedule_layout(&host, change);
            }
        })?;
    }

    Ok(listeners)
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
