//! Shared browser-side state and effect dispatch.
//!
//! Engine effects are carried out while the state is borrowed. JavaScript
//! callbacks run only after the borrow is released so a callback may call
//! back into the app.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use overlay_core::{ContentBox, Effect, Engine, LayoutChange, Notice, SurfaceMetrics, TextRequest};
use overlay_renderer::{Canvas2dSurface, Renderer};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

/// JavaScript hooks registered by the page.
#[derive(Clone, Default)]
pub(crate) struct Callbacks {
    pub(crate) text_request: Option<Function>,
    pub(crate) page_change: Option<Function>,
    pub(crate) notice: Option<Function>,
}

/// Work for JavaScript, collected during dispatch.
enum HostCall {
    Page {
        page: usize,
        label: String,
        image: Option<String>,
    },
    Text(TextRequest),
    Notice(Notice),
}

pub(crate) struct Host {
    pub(crate) engine: Engine,
    pub(crate) renderer: Renderer<Canvas2dSurface>,
    pub(crate) content: Element,
    pub(crate) callbacks: Callbacks,
}

impl Host {
    /// Current content box and pixel ratio.
    pub(crate) fn measure(&self) -> SurfaceMetrics {
        let rect = self.content.get_bounding_client_rect();
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        SurfaceMetrics::new(
            ContentBox {
                left: rect.left(),
                top: rect.top(),
                width: rect.width(),
                height: rect.height(),
            },
            dpr,
        )
    }

    pub(crate) fn sync_cursor(&self) {
        let style = self.renderer.surface().canvas().style();
        if style.set_property("cursor", self.engine.cursor()).is_err() {
            tracing::debug!("Cursor style rejected");
        }
    }

    fn fit_canvas(&self) {
        let Some(metrics) = self.engine.metrics() else {
            return;
        };
        let (width, height) = metrics.css_size();
        let style = self.renderer.surface().canvas().style();
        let sized = style
            .set_property("width", &format!("{width}px"))
            .and_then(|()| style.set_property("height", &format!("{height}px")));
        if sized.is_err() {
            tracing::warn!("Failed to size overlay canvas");
        }
    }

    fn dispatch(&mut self, effect: Effect) -> Vec<HostCall> {
        if matches!(effect, Effect::Recalibrate) {
            self.fit_canvas();
        }
        if let Err(e) = self.renderer.apply(&self.engine, &effect) {
            tracing::error!("Overlay render failed: {}", e);
        }

        let mut calls = Vec::new();
        match effect {
            Effect::ShowPage(page) => calls.push(HostCall::Page {
                page,
                label: self.engine.page_label(),
                image: self
                    .engine
                    .document()
                    .and_then(|d| d.content.image(page))
                    .map(str::to_string),
            }),
            Effect::RequestText(request) => calls.push(HostCall::Text(request)),
            Effect::None | Effect::DrawSegment(_) | Effect::Redraw | Effect::Recalibrate => {}
        }
        calls.extend(self.engine.take_notices().into_iter().map(HostCall::Notice));
        self.sync_cursor();
        calls
    }
}

/// Apply `step` to the engine, render its effect, then notify JavaScript.
pub(crate) fn run<F>(host: &Rc<RefCell<Host>>, step: F)
where
    F: FnOnce(&mut Engine) -> Effect,
{
    let (calls, callbacks) = {
        let Ok(mut state) = host.try_borrow_mut() else {
            tracing::warn!("Re-entrant overlay update ignored");
            return;
        };
        let effect = step(&mut state.engine);
        (state.dispatch(effect), state.callbacks.clone())
    };

    for call in calls {
        match call {
            HostCall::Page { page, label, image } => {
                if let Some(callback) = &callbacks.page_change {
                    let image = image.map_or(JsValue::NULL, |src| JsValue::from_str(&src));
                    report(callback.call3(
                        &JsValue::NULL,
                        &JsValue::from(u32::try_from(page).unwrap_or(u32::MAX)),
                        &JsValue::from_str(&label),
                        &image,
                    ));
                }
            }
            HostCall::Text(request) => match &callbacks.text_request {
                Some(callback) => report(
                    serde_json::to_string(&request)
                        .map_err(|e| JsValue::from_str(&e.to_string()))
                        .and_then(|json| callback.call1(&JsValue::NULL, &JsValue::from_str(&json))),
                ),
                None => {
                    tracing::debug!("No text handler; dropping request {}", request.id);
                    let step: Box<dyn FnOnce(&mut Engine) -> Effect> =
                        Box::new(move |engine| engine.cancel_text(request.id));
                    run(host, step);
                }
            },
            HostCall::Notice(notice) => {
                if notice.is_failure() {
                    tracing::warn!("{}", notice);
                } else {
                    tracing::info!("{}", notice);
                }
                if let Some(callback) = &callbacks.notice {
                    report(
                        serde_json::to_string(&notice)
                            .map_err(|e| JsValue::from_str(&e.to_string()))
                            .and_then(|json| {
                                callback.call2(
                                    &JsValue::NULL,
                                    &JsValue::from_str(&json),
                                    &JsValue::from_str(&notice.to_string()),
                                )
                            }),
                    );
                }
            }
        }
    }
}

/// Queue a coalesced recalibration after a resize or rotation.
pub(crate) fn schedule_layout(host: &Rc<RefCell<Host>>, change: LayoutChange) {
    let Ok(ticket) = host
        .try_borrow_mut()
        .map(|mut state| state.engine.note_layout_change(change))
    else {
        return;
    };

    let weak = Rc::downgrade(host);
    let settle = Closure::once_into_js(move || {
        let Some(host) = weak.upgrade() else {
            return;
        };
        let Ok(metrics) = host.try_borrow().map(|state| state.measure()) else {
            return;
        };
        run(&host, |engine| engine.settle_layout(ticket, metrics));
    });

    let Some(window) = web_sys::window() else {
        return;
    };
    let delay = i32::try_from(ticket.delay_ms).unwrap_or(i32::MAX);
    if window
        .set_timeout_with_callback_and_timeout_and_arguments_0(settle.unchecked_ref(), delay)
        .is_err()
    {
        tracing::warn!("Failed to schedule layout settle");
    }
}

fn report(result: Result<JsValue, JsValue>) {
    if let Err(e) = result {
        tracing::warn!("Overlay callback threw: {:?}", e);
    }
}
