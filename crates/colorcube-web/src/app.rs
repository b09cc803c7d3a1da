use crate::camera::Camera;
use crate::gpu::GpuContext;
use crate::input::InputState;
use crate::ui::controls::{self, ControlAction, ControlValues};
use crate::ui::hover::{self, HoverInfo};
use crate::ui::UiState;
use colorcube_core::config::ViewerConfig;
use colorcube_core::state::CubeState;
use colorcube_render::Renderer;
use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

type RafClosure = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Frames further apart than this (ms) are treated as a backgrounded tab.
const MAX_FRAME_GAP_MS: f64 = 100.0;

/// Main application struct. Owns all subsystems.
pub struct Application {
    gpu: GpuContext,
    ui_state: UiState,
    renderer: Renderer,
    camera: Camera,
    state: CubeState,
    input: Rc<RefCell<InputState>>,
    canvas: web_sys::HtmlCanvasElement,
    config: ViewerConfig,
    uploaded_generation: Option<u64>,
    hover: Option<HoverInfo>,
    dpi_scale: f32,
    last_frame_time: f64,
}

impl Application {
    pub fn new(
        gpu: GpuContext,
        canvas: web_sys::HtmlCanvasElement,
        config: ViewerConfig,
        dpi_scale: f32,
        input: Rc<RefCell<InputState>>,
    ) -> Result<Self, colorcube_core::ColorCubeError> {
        let ui_state = UiState::new(&gpu.device, gpu.surface_format, dpi_scale);
        let renderer = Renderer::new(
            &gpu.device,
            gpu.surface_format,
            gpu.surface_config.width,
            gpu.surface_config.height,
        );
        let camera = Camera::new(&config.camera);
        let state = CubeState::new(&config)?;

        Ok(Self {
            gpu,
            ui_state,
            renderer,
            camera,
            state,
            input,
            canvas,
            config,
            uploaded_generation: None,
            hover: None,
            dpi_scale,
            last_frame_time: 0.0,
        })
    }

    /// Start the requestAnimationFrame loop.
    /// The rAF closure is created once and re-registered every frame.
    pub fn start_loop(app: Rc<RefCell<Self>>) {
        let closure: RafClosure = Rc::new(RefCell::new(None));
        let closure_clone = closure.clone();

        *closure.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            {
                let mut app_ref = app.borrow_mut();
                let delta = timestamp - app_ref.last_frame_time;
                let backgrounded =
                    app_ref.last_frame_time > 0.0 && delta > MAX_FRAME_GAP_MS;
                app_ref.last_frame_time = timestamp;
                // Skip the frame after a long gap so damping and flights don't jump.
                if !backgrounded {
                    let dt = if delta > 0.0 { delta / 1000.0 } else { 0.0 };
                    app_ref.render_frame(dt as f32, timestamp / 1000.0);
                }
            }
            request_frame(&closure_clone);
        }) as Box<dyn FnMut(f64)>));

        request_frame(&closure);
    }

    /// Canvas size in CSS pixels.
    fn css_size(&self) -> Vec2 {
        Vec2::new(
            self.gpu.surface_config.width as f32 / self.dpi_scale,
            self.gpu.surface_config.height as f32 / self.dpi_scale,
        )
    }

    /// Match the canvas backing store to its CSS size and reconfigure everything sized by it.
    fn handle_resize(&mut self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        self.dpi_scale = window.device_pixel_ratio() as f32;
        self.ui_state.ctx.set_pixels_per_point(self.dpi_scale);

        let width = ((self.canvas.client_width() as f32 * self.dpi_scale) as u32).max(1);
        let height = ((self.canvas.client_height() as f32 * self.dpi_scale) as u32).max(1);
        if width == self.gpu.surface_config.width && height == self.gpu.surface_config.height {
            return;
        }
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.gpu.resize(width, height);
        self.renderer.resize(&self.gpu.device, width, height);
        log::info!("Resized to {width}x{height} (DPI: {:.2})", self.dpi_scale);
    }

    /// Orbit, pan and zoom from this frame's mouse deltas, unless egui owns the pointer.
    fn apply_camera_input(&mut self, input: &InputState, pointer_on_ui: bool) {
        if pointer_on_ui {
            return;
        }
        if input.left_button_down {
            self.camera.orbit(input.mouse_dx, input.mouse_dy);
        } else if input.right_button_down || input.middle_button_down {
            self.camera.pan(input.mouse_dx, input.mouse_dy);
        }
        if input.scroll_delta != 0.0 {
            self.camera.zoom(input.scroll_delta);
        }
    }

    /// Pick the voxel under the cursor and build its tooltip.
    fn update_hover(&mut self, cursor: Option<Vec2>, pointer_on_ui: bool) {
        self.hover = None;
        if pointer_on_ui {
            return;
        }
        let (Some(cursor), Some(grid)) = (cursor, self.state.grid()) else {
            return;
        };
        let size = self.css_size();
        let Some(ray) = self.camera.cursor_ray(cursor, size.x, size.y) else {
            return;
        };
        self.hover = grid
            .pick(&ray, self.config.transparency.pick_transparent)
            .map(|hit| HoverInfo::from_hit(&hit, cursor));
    }

    fn apply_action(&mut self, action: ControlAction) {
        let result = match action {
            ControlAction::SetSegments(n) => self.state.set_segments(n),
            ControlAction::SetTransparentRows(axis, k) => self.state.set_transparent_rows(axis, k),
            ControlAction::FlyTo(i) => {
                if let Some(preset) = self.config.presets.get(i) {
                    if !self.camera.fly_to(glam::Vec3::from(preset.eye)) {
                        log::debug!("ignoring {} view request during flight", preset.name);
                    }
                }
                Ok(())
            }
        };
        if let Err(e) = result {
            log::warn!("{e}");
        }
    }

    /// Render a single frame.
    fn render_frame(&mut self, dt: f32, time_seconds: f64) {
        let mut input = self.input.borrow_mut().take_frame();
        let ui_events = std::mem::take(&mut input.ui_events);

        if input.resized {
            self.handle_resize();
        }

        // egui state from the previous frame decides who owns the pointer.
        let pointer_on_ui =
            self.ui_state.ctx.is_pointer_over_area() || self.ui_state.ctx.is_using_pointer();
        self.apply_camera_input(&input, pointer_on_ui);
        self.camera.update(dt);
        self.update_hover(input.cursor, pointer_on_ui);

        // Run egui frame first (no encoder needed)
        let width = self.gpu.surface_config.width;
        let height = self.gpu.surface_config.height;
        let screen = self.ui_state.screen_descriptor(width, height);
        let raw_input = self
            .ui_state
            .raw_input(width, height, ui_events, time_seconds);

        let values = ControlValues::from_state(&self.state);
        let segment_range = self.state.segment_range();
        let flying = self.camera.flight().is_some();
        let mut actions = Vec::new();
        let full_output = {
            let presets = &self.config.presets;
            let hover = self.hover.as_ref();
            self.ui_state.ctx.run(raw_input, |ctx| {
                actions = controls::show(ctx, values, segment_range, presets, flying);
                if let Some(info) = hover {
                    hover::show(ctx, info);
                }
            })
        };
        for action in actions {
            self.apply_action(action);
        }

        if let Some(grid) = self.state.grid() {
            if self.uploaded_generation != Some(self.state.generation()) {
                self.renderer.upload_grid(&self.gpu.device, grid);
                self.uploaded_generation = Some(self.state.generation());
                log::debug!("{} instances on screen", self.renderer.instance_count());
            }
        }
        let view_proj = self.camera.view_proj(width as f32, height as f32);
        self.renderer.update_camera(
            &self.gpu.queue,
            view_proj.to_cols_array_2d(),
            self.camera.eye_position(),
        );

        let Application {
            gpu,
            ui_state,
            renderer,
            ..
        } = self;

        // Get surface texture, handle Lost by reconfiguring
        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.surface_config);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                return;
            }
            Err(e) => {
                log::error!("Surface error: {e:?}");
                return;
            }
        };

        let view = output.texture.create_view(&Default::default());

        let clipped_primitives = ui_state
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        // 1. Voxel pass (clears color and depth)
        renderer.render(&mut encoder, &view);

        // 2. Upload egui textures and update buffers
        for (id, delta) in &full_output.textures_delta.set {
            ui_state
                .renderer
                .update_texture(&gpu.device, &gpu.queue, *id, delta);
        }

        ui_state.renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &clipped_primitives,
            &screen,
        );

        // 3. egui pass on top of the scene
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui-pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();
            ui_state
                .renderer
                .render(&mut pass, &clipped_primitives, &screen);
        }

        // 4. Free textures after rendering
        for id in &full_output.textures_delta.free {
            ui_state.renderer.free_texture(id);
        }

        // 5. Submit and present
        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

/// Register the rAF callback for the next frame, logging instead of panicking on failure.
fn request_frame(closure: &RafClosure) {
    let Some(window) = web_sys::window() else {
        log::error!("no global window");
        return;
    };
    let slot = closure.borrow();
    let Some(callback) = slot.as_ref() else {
        log::error!("rAF closure missing");
        return;
    };
    if let Err(e) = window.request_animation_frame(callback.as_ref().unchecked_ref()) {
        log::error!("rAF registration failed: {e:?}");
    }
}
