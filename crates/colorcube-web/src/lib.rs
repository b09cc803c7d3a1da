#[cfg(target_arch = "wasm32")]
mod app;
mod camera;
#[cfg(target_arch = "wasm32")]
mod gpu;
mod input;
pub mod ui;

#[cfg(target_arch = "wasm32")]
use colorcube_core::config::ViewerConfig;
#[cfg(target_arch = "wasm32")]
use colorcube_core::error::ColorCubeError;
#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
const CANVAS_ID: &str = "colorcube-canvas";

#[cfg(target_arch = "wasm32")]
/// WASM entry point. Sets the panic hook and initializes logging.
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::error_1(&format!("logger init failed: {e}").into());
    }
    log::info!("Color cube starting...");

    wasm_bindgen_futures::spawn_local(async {
        if let Err(e) = run().await {
            show_error_to_user(&format!("{e}"));
        }
    });
}

#[cfg(target_arch = "wasm32")]
fn dom_error(what: &str) -> ColorCubeError {
    ColorCubeError::Dom(what.to_string())
}

#[cfg(target_arch = "wasm32")]
/// Async initialization: gets canvas, computes physical size, creates Application.
async fn run() -> Result<(), ColorCubeError> {
    let window = web_sys::window().ok_or_else(|| dom_error("no global window"))?;
    let document = window
        .document()
        .ok_or_else(|| dom_error("no document"))?;

    let canvas = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| dom_error("canvas element not found"))?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| dom_error("element is not a canvas"))?;

    let config = ViewerConfig::embedded()?;

    // Canvas backing store is sized in physical pixels.
    let dpi_scale = window.device_pixel_ratio() as f32;
    let css_width = canvas.client_width() as f32;
    let css_height = canvas.client_height() as f32;
    let physical_width = ((css_width * dpi_scale) as u32).max(1);
    let physical_height = ((css_height * dpi_scale) as u32).max(1);

    canvas.set_width(physical_width);
    canvas.set_height(physical_height);

    log::info!(
        "Canvas: {}x{} CSS, {}x{} physical (DPI: {:.2})",
        css_width,
        css_height,
        physical_width,
        physical_height,
        dpi_scale
    );

    // Input listeners are registered once for the app lifetime.
    let input_state = Rc::new(RefCell::new(input::InputState::new()));
    input::register_input_listeners(&window, &canvas, input_state.clone());

    let gpu_ctx = gpu::init_gpu(canvas.clone(), physical_width, physical_height).await?;
    let application = app::Application::new(gpu_ctx, canvas, config, dpi_scale, input_state)?;
    let app_rc = Rc::new(RefCell::new(application));

    app::Application::start_loop(app_rc);

    Ok(())
}

#[cfg(target_arch = "wasm32")]
/// Show a user-visible error, not just a console line.
fn show_error_to_user(msg: &str) {
    log::error!("{msg}");
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(&format!("Color Cube Error: {msg}"));
    }
}
