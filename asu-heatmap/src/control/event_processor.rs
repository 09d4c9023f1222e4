use std::time::Duration;

use asu_heatmap_types::cartesian::Point2d;
use web_time::SystemTime;

use crate::control::{
    EventPropagation, MouseButtonsState, MouseEvent, RawUserEvent, UserEvent, UserEventHandler,
};
use crate::map::Map;

const DRAG_THRESHOLD: f64 = 3.0;
const CLICK_TIMEOUT: Duration = Duration::from_millis(300);
const DBL_CLICK_TIMEOUT: Duration = Duration::from_millis(500);

/// Converts [`RawUserEvent`]s into [`UserEvent`]s and gives them to the handlers in the order
/// the handlers were added.
pub struct EventProcessor {
    handlers: Vec<Box<dyn UserEventHandler>>,
    pointer_position: Point2d,
    pointer_pressed_position: Point2d,

    buttons_state: MouseButtonsState,

    last_pressed_time: SystemTime,
    last_click_time: SystemTime,

    is_dragging: bool,
    drag_target: Option<usize>,
}

impl Default for EventProcessor {
    fn default() -> Self {
        Self {
            handlers: vec![],
            pointer_position: Point2d::origin(),
            pointer_pressed_position: Point2d::origin(),
            buttons_state: Default::default(),
            last_pressed_time: SystemTime::UNIX_EPOCH,
            last_click_time: SystemTime::UNIX_EPOCH,
            is_dragging: false,
            drag_target: None,
        }
    }
}

impl EventProcessor {
    /// Adds a handler to the end of the handler list.
    pub fn add_handler(&mut self, handler: impl UserEventHandler + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Returns true if no handlers are added.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Last known pointer position on the screen.
    pub fn pointer_position(&self) -> Point2d {
        self.pointer_position
    }

    /// Processes the raw event and runs the handlers for the resulting user events.
    pub fn handle(&mut self, event: RawUserEvent, map: &mut Map) {
        for user_event in self.process(event, map) {
            self.dispatch(&user_event, map);

            if matches!(user_event, UserEvent::DragEnded(..)) {
                self.drag_target = None;
            }
        }
    }

    fn dispatch(&mut self, user_event: &UserEvent, map: &mut Map) {
        let is_drag_event = matches!(user_event, UserEvent::Drag(..) | UserEvent::DragEnded(..));

        for (index, handler) in self.handlers.iter().enumerate() {
            if is_drag_event && self.drag_target != Some(index) {
                continue;
            }

            match handler.handle(user_event, map) {
                EventPropagation::Propagate => {}
                EventPropagation::Stop => break,
                EventPropagation::Consume => {
                    if let UserEvent::DragStarted(button, _) = user_event {
                        self.drag_target = Some(index);

                        let delta = self.pointer_position - self.pointer_pressed_position;
                        let mouse_event = self.get_mouse_event(map);
                        handler.handle(&UserEvent::Drag(*button, delta, mouse_event), map);
                    }

                    break;
                }
            }
        }
    }

    fn process(&mut self, event: RawUserEvent, map: &Map) -> Vec<UserEvent> {
        let now = SystemTime::now();
        match event {
            RawUserEvent::ButtonPressed(button) => {
                self.buttons_state.set_pressed(button);
                self.last_pressed_time = now;
                self.pointer_pressed_position = self.pointer_position;

                vec![UserEvent::ButtonPressed(button, self.get_mouse_event(map))]
            }
            RawUserEvent::ButtonReleased(button) => {
                self.buttons_state.set_released(button);
                let mut events = vec![UserEvent::ButtonReleased(
                    button,
                    self.get_mouse_event(map),
                )];

                if self.is_dragging {
                    self.is_dragging = false;
                    events.push(UserEvent::DragEnded(button, self.get_mouse_event(map)));
                } else if now.duration_since(self.last_pressed_time).unwrap_or_default()
                    < CLICK_TIMEOUT
                {
                    events.push(UserEvent::Click(button, self.get_mouse_event(map)));

                    if now.duration_since(self.last_click_time).unwrap_or_default()
                        < DBL_CLICK_TIMEOUT
                    {
                        events.push(UserEvent::DoubleClick(button, self.get_mouse_event(map)));
                        self.last_click_time = SystemTime::UNIX_EPOCH;
                    } else {
                        self.last_click_time = now;
                    }
                }

                events
            }
            RawUserEvent::PointerMoved(position) => {
                let prev_position = self.pointer_position;
                self.pointer_position = position;

                let mut events = vec![UserEvent::PointerMoved(self.get_mouse_event(map))];
                if let Some(button) = self.buttons_state.single_pressed() {
                    if self.is_dragging {
                        events.push(UserEvent::Drag(
                            button,
                            position - prev_position,
                            self.get_mouse_event(map),
                        ));
                    } else if taxicab_distance(position, self.pointer_pressed_position)
                        > DRAG_THRESHOLD
                    {
                        self.is_dragging = true;
                        events.push(UserEvent::DragStarted(
                            button,
                            self.get_mouse_event_pos(map, self.pointer_pressed_position),
                        ));
                    }
                }

                events
            }
            RawUserEvent::Scroll(delta) => {
                vec![UserEvent::Scroll(delta, self.get_mouse_event(map))]
            }
            RawUserEvent::Zoom(factor, center) => vec![UserEvent::Zoom(factor, center)],
        }
    }

    fn get_mouse_event(&self, map: &Map) -> MouseEvent {
        self.get_mouse_event_pos(map, self.pointer_position)
    }

    fn get_mouse_event_pos(&self, map: &Map, screen_pointer_position: Point2d) -> MouseEvent {
        MouseEvent {
            screen_pointer_position,
            map_pointer_position: map.view().screen_to_map(screen_pointer_position),
            buttons: self.buttons_state,
        }
    }
}

fn taxicab_distance(a: Point2d, b: Point2d) -> f64 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}
