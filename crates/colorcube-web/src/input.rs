use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// Accumulated input state read each frame by the application.
pub struct InputState {
    pub mouse_dx: f32,
    pub mouse_dy: f32,
    pub scroll_delta: f32,
    pub left_button_down: bool,
    pub middle_button_down: bool,
    pub right_button_down: bool,
    /// Cursor position in CSS pixels relative to the canvas, `None` once it leaves.
    pub cursor: Option<Vec2>,
    /// Pointer events forwarded to egui.
    pub ui_events: Vec<egui::Event>,
    /// Set by the window resize listener, cleared once the surface is reconfigured.
    pub resized: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            mouse_dx: 0.0,
            mouse_dy: 0.0,
            scroll_delta: 0.0,
            left_button_down: false,
            middle_button_down: false,
            right_button_down: false,
            cursor: None,
            ui_events: Vec::new(),
            resized: false,
        }
    }

    /// Clear per-frame deltas (called after the frame consumes them).
    pub fn clear_deltas(&mut self) {
        self.mouse_dx = 0.0;
        self.mouse_dy = 0.0;
        self.scroll_delta = 0.0;
    }

    pub fn take_ui_events(&mut self) -> Vec<egui::Event> {
        std::mem::take(&mut self.ui_events)
    }

    /// Hand this frame's input to the caller and reset everything per-frame.
    /// Button and cursor state carry over.
    pub fn take_frame(&mut self) -> InputState {
        let frame = InputState {
            mouse_dx: self.mouse_dx,
            mouse_dy: self.mouse_dy,
            scroll_delta: self.scroll_delta,
            left_button_down: self.left_button_down,
            middle_button_down: self.middle_button_down,
            right_button_down: self.right_button_down,
            cursor: self.cursor,
            ui_events: self.take_ui_events(),
            resized: std::mem::take(&mut self.resized),
        };
        self.clear_deltas();
        frame
    }

    fn set_button(&mut self, button: i16, down: bool) {
        match button {
            0 => self.left_button_down = down,
            1 => self.middle_button_down = down,
            2 => self.right_button_down = down,
            _ => {}
        }
    }
}

fn egui_button(button: i16) -> Option<egui::PointerButton> {
    match button {
        0 => Some(egui::PointerButton::Primary),
        1 => Some(egui::PointerButton::Middle),
        2 => Some(egui::PointerButton::Secondary),
        _ => None,
    }
}

fn mouse_pos(e: &web_sys::MouseEvent) -> Vec2 {
    Vec2::new(e.offset_x() as f32, e.offset_y() as f32)
}

fn listen(
    target: &web_sys::EventTarget,
    event: &str,
    handler: impl FnMut(web_sys::MouseEvent) + 'static,
) {
    let closure = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(handler);
    if let Err(e) =
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
    {
        log::error!("failed to add {event} listener: {e:?}");
    }
    closure.forget();
}

/// Register mouse, wheel and resize listeners ONCE at init.
/// Closures are leaked via `.forget()` since they live for the app lifetime.
pub fn register_input_listeners(
    window: &web_sys::Window,
    canvas: &web_sys::HtmlCanvasElement,
    state: Rc<RefCell<InputState>>,
) {
    let target: &web_sys::EventTarget = canvas.as_ref();

    {
        let state = state.clone();
        listen(target, "mousemove", move |e: web_sys::MouseEvent| {
            let mut s = state.borrow_mut();
            let pos = mouse_pos(&e);
            s.mouse_dx += e.movement_x() as f32;
            s.mouse_dy += e.movement_y() as f32;
            s.cursor = Some(pos);
            s.ui_events
                .push(egui::Event::PointerMoved(egui::pos2(pos.x, pos.y)));
        });
    }

    {
        let state = state.clone();
        listen(target, "mousedown", move |e: web_sys::MouseEvent| {
            let mut s = state.borrow_mut();
            s.set_button(e.button(), true);
            if let Some(button) = egui_button(e.button()) {
                let pos = mouse_pos(&e);
                s.ui_events.push(egui::Event::PointerButton {
                    pos: egui::pos2(pos.x, pos.y),
                    button,
                    pressed: true,
                    modifiers: egui::Modifiers::default(),
                });
            }
        });
    }

    {
        let state = state.clone();
        listen(target, "mouseup", move |e: web_sys::MouseEvent| {
            let mut s = state.borrow_mut();
            s.set_button(e.button(), false);
            if let Some(button) = egui_button(e.button()) {
                let pos = mouse_pos(&e);
                s.ui_events.push(egui::Event::PointerButton {
                    pos: egui::pos2(pos.x, pos.y),
                    button,
                    pressed: false,
                    modifiers: egui::Modifiers::default(),
                });
            }
        });
    }

    {
        let state = state.clone();
        listen(target, "mouseleave", move |_e: web_sys::MouseEvent| {
            let mut s = state.borrow_mut();
            s.cursor = None;
            s.left_button_down = false;
            s.middle_button_down = false;
            s.right_button_down = false;
            s.ui_events.push(egui::Event::PointerGone);
        });
    }

    // wheel (scroll zoom)
    {
        let state = state.clone();
        let closure =
            Closure::<dyn FnMut(web_sys::WheelEvent)>::new(move |e: web_sys::WheelEvent| {
                e.prevent_default();
                let mut s = state.borrow_mut();
                // deltaY is positive for scroll down (zoom out)
                let delta = -e.delta_y() as f32;
                s.scroll_delta += if e.delta_mode() == 1 {
                    delta * 20.0 / 100.0 // line mode
                } else {
                    delta / 100.0 // pixel mode
                };
            });
        // Non-passive so preventDefault stops the page from scrolling.
        let options = web_sys::AddEventListenerOptions::new();
        options.set_passive(false);
        if let Err(e) = target.add_event_listener_with_callback_and_add_event_listener_options(
            "wheel",
            closure.as_ref().unchecked_ref(),
            &options,
        ) {
            log::error!("failed to add wheel listener: {e:?}");
        }
        closure.forget();
    }

    // contextmenu (right drag pans instead of opening the menu)
    listen(target, "contextmenu", |e: web_sys::MouseEvent| {
        e.prevent_default();
    });

    // window resize
    {
        let closure = Closure::<dyn FnMut()>::new(move || {
            state.borrow_mut().resized = true;
        });
        if let Err(e) =
            window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
        {
            log::error!("failed to add resize listener: {e:?}");
        }
        closure.forget();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_frame_resets_per_frame_state() {
        let mut input = InputState::new();
        input.mouse_dx = 4.0;
        input.scroll_delta = -1.0;
        input.resized = true;
        input.set_button(0, true);
        input.cursor = Some(Vec2::new(5.0, 6.0));
        input.ui_events.push(egui::Event::PointerGone);

        let frame = input.take_frame();
        assert_eq!(frame.mouse_dx, 4.0);
        assert_eq!(frame.scroll_delta, -1.0);
        assert!(frame.resized);
        assert_eq!(frame.ui_events.len(), 1);

        assert_eq!(input.mouse_dx, 0.0);
        assert_eq!(input.scroll_delta, 0.0);
        assert!(!input.resized);
        assert!(input.ui_events.is_empty());
        assert!(input.left_button_down);
        assert_eq!(input.cursor, Some(Vec2::new(5.0, 6.0)));
    }

    #[test]
    fn test_button_mapping() {
        let mut input = InputState::new();
        input.set_button(2, true);
        assert!(input.right_button_down);
        input.set_button(7, true);
        assert!(!input.left_button_down && !input.middle_button_down);
        assert_eq!(egui_button(1), Some(egui::PointerButton::Middle));
        assert_eq!(egui_button(3), None);
    }
}
