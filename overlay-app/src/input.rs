//! DOM event conversion.

use overlay_core::{InputEvent, PointerPhase, TouchEvent, TouchPhase, TouchPoint};
use wasm_bindgen::JsCast;
use web_sys::{Event, MouseEvent};

/// Convert a mouse event into an [`InputEvent`].
pub(crate) fn mouse_input(event: &Event, phase: PointerPhase) -> Option<InputEvent> {
    let mouse = event.dyn_ref::<MouseEvent>()?;
    Some(InputEvent::Pointer {
        phase,
        client_x: f64::from(mouse.client_x()),
        client_y: f64::from(mouse.client_y()),
        button: u8::try_from(mouse.button()).unwrap_or(u8::MAX),
    })
}

/// Convert a touch event into an [`InputEvent`], suppressing scrolling.
pub(crate) fn touch_input(event: &Event, phase: TouchPhase) -> Option<InputEvent> {
    let touch_event = event.dyn_ref::<web_sys::TouchEvent>()?;
    touch_event.prevent_default();

    let list = touch_event.touches();
    let touches = (0..list.length())
        .filter_map(|i| list.item(i))
        .map(|touch| TouchPoint {
            id: u32::try_from(touch.identifier()).unwrap_or_default(),
            client_x: f64::from(touch.client_x()),
            client_y: f64::from(touch.client_y()),
        })
        .collect();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let timestamp_ms = event.time_stamp().max(0.0) as u64;
    Some(InputEvent::Touch(TouchEvent::new(phase, touches, timestamp_ms)))
}
