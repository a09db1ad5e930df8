//! Input events for the overlay.
//!
//! Mouse and touch input arrive in their own shapes and are unified into a
//! single [`UnifiedInput`] step before they reach the capture state machine.

use serde::{Deserialize, Serialize};

/// Phase of a mouse/pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
    /// Pointer left the surface.
    Leave,
}

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// Touch started (finger down).
    Start,
    /// Touch moved (finger dragging).
    Move,
    /// Touch ended (finger up).
    End,
    /// Touch cancelled by the host (e.g., palm rejection, device lost).
    Cancel,
}

/// A single touch point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Touch identifier (for multi-touch).
    pub id: u32,
    /// X position in viewport pixels.
    pub client_x: f64,
    /// Y position in viewport pixels.
    pub client_y: f64,
}

/// A touch event with the touches currently on the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    /// Phase of this touch event.
    pub phase: TouchPhase,
    /// All current touch points.
    pub touches: Vec<TouchPoint>,
    /// Timestamp in milliseconds.
    pub timestamp_ms: u64,
}

impl TouchEvent {
    /// Create a new touch event.
    #[must_use]
    pub fn new(phase: TouchPhase, touches: Vec<TouchPoint>, timestamp_ms: u64) -> Self {
        Self {
            phase,
            touches,
            timestamp_ms,
        }
    }

    /// Get the primary (first) touch point.
    #[must_use]
    pub fn primary_touch(&self) -> Option<&TouchPoint> {
        self.touches.first()
    }

    /// Check if this is a multi-touch event.
    #[must_use]
    pub fn is_multi_touch(&self) -> bool {
        self.touches.len() > 1
    }
}

/// All input events the overlay can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Mouse/pointer event.
    Pointer {
        /// Event phase.
        phase: PointerPhase,
        /// X position in viewport pixels.
        client_x: f64,
        /// Y position in viewport pixels.
        client_y: f64,
        /// Mouse button (0 = primary).
        button: u8,
    },

    /// Raw touch event.
    Touch(TouchEvent),
}

/// Device-independent input step consumed by the capture state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnifiedInput {
    /// Contact started at a viewport position.
    Begin {
        /// X position in viewport pixels.
        client_x: f64,
        /// Y position in viewport pixels.
        client_y: f64,
    },
    /// Contact moved to a viewport position.
    Extend {
        /// X position in viewport pixels.
        client_x: f64,
        /// Y position in viewport pixels.
        client_y: f64,
    },
    /// Contact ended (up, leave, touch end or cancel).
    Finish,
}

impl InputEvent {
    /// Build a pointer event for the primary button.
    #[must_use]
    pub fn pointer(phase: PointerPhase, client_x: f64, client_y: f64) -> Self {
        Self::Pointer {
            phase,
            client_x,
            client_y,
            button: 0,
        }
    }

    /// Unify into a capture step.
    ///
    /// Only the primary mouse button and single-finger touches draw. Start and
    /// move events carrying more than one touch belong to pinch/zoom gestures
    /// and yield `None`; any end or cancel finishes the current contact.
    #[must_use]
    pub fn unify(&self) -> Option<UnifiedInput> {
        match self {
            Self::Pointer {
                phase,
                client_x,
                client_y,
                button,
            } => match phase {
                PointerPhase::Down if *button == 0 => Some(UnifiedInput::Begin {
                    client_x: *client_x,
                    client_y: *client_y,
                }),
                PointerPhase::Down => None,
                PointerPhase::Move => Some(UnifiedInput::Extend {
                    client_x: *client_x,
                    client_y: *client_y,
                }),
                PointerPhase::Up | PointerPhase::Leave => Some(UnifiedInput::Finish),
            },
            Self::Touch(touch) => match touch.phase {
                TouchPhase::Start | TouchPhase::Move if touch.is_multi_touch() => None,
                TouchPhase::Start => touch.primary_touch().map(|t| UnifiedInput::Begin {
                    client_x: t.client_x,
                    client_y: t.client_y,
                }),
                TouchPhase::Move => touch.primary_touch().map(|t| UnifiedInput::Extend {
                    client_x: t.client_x,
                    client_y: t.client_y,
                }),
                TouchPhase::End | TouchPhase::Cancel => Some(UnifiedInput::Finish),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(phase: TouchPhase, points: &[(f64, f64)]) -> InputEvent {
        let touches = points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| TouchPoint {
                id: u32::try_from(i).unwrap_or(u32::MAX),
                client_x: x,
                client_y: y,
            })
            .collect();
        InputEvent::Touch(TouchEvent::new(phase, touches, 0))
    }

    #[test]
    fn mouse_and_touch_unify_to_same_steps() {
        let mouse = InputEvent::pointer(PointerPhase::Down, 10.0, 20.0).unify();
        let finger = touch(TouchPhase::Start, &[(10.0, 20.0)]).unify();
        assert_eq!(mouse, finger);
        assert_eq!(
            mouse,
            Some(UnifiedInput::Begin {
                client_x: 10.0,
                client_y: 20.0
            })
        );
    }

    #[test]
    fn leave_and_touch_end_finish() {
        assert_eq!(
            InputEvent::pointer(PointerPhase::Leave, 0.0, 0.0).unify(),
            Some(UnifiedInput::Finish)
        );
        assert_eq!(
            InputEvent::pointer(PointerPhase::Up, 0.0, 0.0).unify(),
            Some(UnifiedInput::Finish)
        );
        assert_eq!(touch(TouchPhase::End, &[]).unify(), Some(UnifiedInput::Finish));
        assert_eq!(touch(TouchPhase::Cancel, &[]).unify(), Some(UnifiedInput::Finish));
    }

    #[test]
    fn multi_touch_is_not_drawing_input() {
        assert!(touch(TouchPhase::Start, &[(1.0, 1.0), (5.0, 5.0)]).unify().is_none());
        assert!(touch(TouchPhase::Move, &[(1.0, 1.0), (5.0, 5.0)]).unify().is_none());
    }

    #[test]
    fn secondary_button_does_not_draw() {
        let right = InputEvent::Pointer {
            phase: PointerPhase::Down,
            client_x: 1.0,
            client_y: 1.0,
            button: 2,
        };
        assert!(right.unify().is_none());
    }

    #[test]
    fn touch_start_without_points_is_ignored() {
        assert!(touch(TouchPhase::Start, &[]).unify().is_none());
    }
}
