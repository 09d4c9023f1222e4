//! Interactivity of the map.
//!
//! User interaction handling is done in several steps:
//! 1. An OS or UI toolkit event is converted to a common [`RawUserEvent`] enum.
//! 2. `RawUserEvent` is given to the [`EventProcessor`], that converts it into a [`UserEvent`].
//!    `EventProcessor` keeps track of the input state (pointer position, pressed mouse buttons,
//!    press and click times) and turns raw presses and moves into clicks and drags.
//! 3. `EventProcessor` has a list of [`UserEventHandler`]s, which change the state of the map
//!    based on the events. The first handler that stops an event hides it from the rest.

use asu_heatmap_types::cartesian::{Point2d, Vector2d};
use maybe_sync::{MaybeSend, MaybeSync};

use crate::map::Map;

mod annotations;
mod event_processor;
mod map;

pub use annotations::AnnotationClickHandler;
pub use event_processor::EventProcessor;
pub use map::{MapController, MapControllerConfiguration};

/// User input handler.
pub trait UserEventHandler: MaybeSend + MaybeSync {
    /// Handle the event.
    fn handle(&self, event: &UserEvent, map: &mut Map) -> EventPropagation;
}

impl<T: for<'a> Fn(&'a UserEvent, &'a mut Map) -> EventPropagation> UserEventHandler for T
where
    T: MaybeSync + MaybeSend,
{
    fn handle(&self, event: &UserEvent, map: &mut Map) -> EventPropagation {
        self(event, map)
    }
}

/// Raw user interaction event, without any input state information. The state is tracked by the
/// [`EventProcessor`], which combines it with the `RawUserEvent` to produce a [`UserEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawUserEvent {
    /// A mouse button was pressed.
    ButtonPressed(MouseButton),
    /// A mouse button was released.
    ButtonReleased(MouseButton),
    /// Mouse pointer was moved to the given screen pixel position.
    PointerMoved(Point2d),
    /// Scroll by a mouse wheel or a touch pad. The number is the number of lines that the event
    /// would scroll if it was scrolling a text.
    Scroll(f64),
    /// Multi-touch zoom gesture around a screen point. The first value multiplies the resolution.
    Zoom(f64, Point2d),
}

/// User interaction event handled by [`UserEventHandler`]s.
#[derive(Debug, Clone)]
pub enum UserEvent {
    /// A mouse button was pressed.
    ButtonPressed(MouseButton, MouseEvent),
    /// A mouse button was released.
    ButtonReleased(MouseButton, MouseEvent),
    /// A mouse button was clicked. Fired right after [`UserEvent::ButtonReleased`] if the button
    /// was released shortly after the press and the pointer was not dragged.
    Click(MouseButton, MouseEvent),
    /// Fired right after the second [`UserEvent::Click`] if it followed the first one shortly.
    DoubleClick(MouseButton, MouseEvent),
    /// Mouse pointer moved.
    PointerMoved(MouseEvent),

    /// Drag started: the pointer moved away from the press position with a button held down.
    ///
    /// A handler returning [`EventPropagation::Consume`] becomes the target of all following
    /// drag events until the button is released.
    DragStarted(MouseButton, MouseEvent),

    /// Pointer moved during a drag. The vector is the pointer movement in screen pixels.
    Drag(MouseButton, Vector2d, MouseEvent),

    /// Mouse button was released while dragging.
    DragEnded(MouseButton, MouseEvent),

    /// Scroll event. The number is the number of text lines the scroll is requested for.
    Scroll(f64, MouseEvent),

    /// Zoom around a point by a multi-touch gesture. The first value multiplies the resolution.
    Zoom(f64, Point2d),
}

/// Value returned by an [`UserEventHandler`] to indicate the status of the event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventPropagation {
    /// Event should be propagated to the next handler.
    Propagate,
    /// Event should not be propagated to the next handler.
    Stop,
    /// Event should not be propagated to the next handler, and the current handler becomes the
    /// owner of the drag started by [`UserEvent::DragStarted`].
    Consume,
}

/// Mouse button enum.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Wheel button.
    Middle,
    /// Secondary button.
    Right,
    /// Any other button.
    Other,
}

/// State of the mouse at the moment of the event.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    /// Pointer position on the screen in pixels from the top-left corner.
    pub screen_pointer_position: Point2d,
    /// Pointer position on the projected plane.
    pub map_pointer_position: Point2d,
    /// State of the mouse buttons.
    pub buttons: MouseButtonsState,
}

/// State of a mouse button.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum MouseButtonState {
    /// Button is pressed.
    Pressed,
    /// Button is not pressed.
    #[default]
    Released,
}

/// State of all mouse buttons.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct MouseButtonsState {
    /// State of the left mouse button.
    pub left: MouseButtonState,
    /// State of the middle mouse button.
    pub middle: MouseButtonState,
    /// State of the right mouse button.
    pub right: MouseButtonState,
}

impl MouseButtonsState {
    pub(crate) fn set_pressed(&mut self, button: MouseButton) {
        self.set_state(button, MouseButtonState::Pressed);
    }

    pub(crate) fn set_released(&mut self, button: MouseButton) {
        self.set_state(button, MouseButtonState::Released);
    }

    fn set_state(&mut self, button: MouseButton, state: MouseButtonState) {
        match button {
            MouseButton::Left => self.left = state,
            MouseButton::Middle => self.middle = state,
            MouseButton::Right => self.right = state,
            MouseButton::Other => {}
        }
    }

    /// The pressed button, if exactly one is pressed.
    fn single_pressed(&self) -> Option<MouseButton> {
        let mut button = None;
        if self.left == MouseButtonState::Pressed && button.replace(MouseButton::Left).is_some() {
            return None;
        }
        if self.middle == MouseButtonState::Pressed && button.replace(MouseButton::Middle).is_some()
        {
            return None;
        }
        if self.right == MouseButtonState::Pressed && button.replace(MouseButton::Right).is_some() {
            return None;
        }

        button
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pressed_button() {
        let mut state = MouseButtonsState::default();
        assert_eq!(state.single_pressed(), None);

        state.set_pressed(MouseButton::Left);
        assert_eq!(state.single_pressed(), Some(MouseButton::Left));

        state.set_pressed(MouseButton::Right);
        assert_eq!(state.single_pressed(), None);

        state.set_released(MouseButton::Left);
        assert_eq!(state.single_pressed(), Some(MouseButton::Right));

        state.set_pressed(MouseButton::Other);
        assert_eq!(state.single_pressed(), Some(MouseButton::Right));
    }
}
