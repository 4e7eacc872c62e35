use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::{SceneConfig, ShadowConfig, WindowConfig},
    error::{Error, Result},
    gfx::rendering::RenderEngine,
    haunted::HauntedHouse,
    timer::Timer,
    ui::{DebugPanel, UiManager},
};

/// Size of the render surface for a window of `physical` pixels.
///
/// The surface is rendered at `min(scale_factor, max_ratio)` pixels per
/// logical pixel and stretched onto the window.
pub fn render_size(physical: PhysicalSize<u32>, scale_factor: f64, max_ratio: f64) -> (u32, u32) {
    let scale = render_scale(scale_factor, max_ratio);
    let shrink = |v: u32| ((v as f64 * scale).round() as u32).max(1);
    (shrink(physical.width), shrink(physical.height))
}

/// Ratio of render surface pixels to physical window pixels
fn render_scale(scale_factor: f64, max_ratio: f64) -> f64 {
    if scale_factor <= 0.0 {
        return 1.0;
    }
    scale_factor.min(max_ratio) / scale_factor
}

pub struct HauntedHouseApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window_config: WindowConfig,
    shadow_config: ShadowConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    world: HauntedHouse,
    panel: DebugPanel,
    panel_changed: bool,
    timer: Timer,
    fatal: Option<Error>,
}

impl HauntedHouseApp {
    /// Builds the scene on the CPU; the window and GPU resources are created
    /// once the event loop resumes
    pub fn new(config: SceneConfig) -> Result<Self> {
        config.validate()?;
        let event_loop = EventLoop::new()?;

        let aspect = config.window.width as f32 / config.window.height.max(1) as f32;
        let world = HauntedHouse::build(&config, aspect);

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                panel: DebugPanel::from_config(&config.materials),
                window_config: config.window,
                shadow_config: config.shadows,
                window: None,
                render_engine: None,
                ui_manager: None,
                world,
                panel_changed: false,
                timer: Timer::new(),
                fatal: None,
            },
        })
    }

    /// Runs the event loop until the window closes
    pub fn run(mut self) -> Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .ok_or_else(|| Error::Window("event loop already consumed".to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self.app_state)?;

        match self.app_state.fatal.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = WindowAttributes::default()
            .with_title(self.window_config.title.clone())
            .with_inner_size(LogicalSize::new(
                self.window_config.width,
                self.window_config.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|e| Error::Window(e.to_string()))?,
        );
        self.window = Some(window.clone());

        let (width, height) = self.surface_size(&window);
        let shadows = self.shadow_config.clone();
        let target = window.clone();
        let render_engine = pollster::block_on(RenderEngine::new(target, width, height, shadows))?;

        self.world
            .scene
            .camera_manager
            .camera
            .resize_projection(width, height);
        render_engine.init_scene(&mut self.world.scene);

        let mut ui_manager = UiManager::new(
            render_engine.device(),
            render_engine.queue(),
            render_engine.surface_format(),
            &window,
        );
        ui_manager.set_render_scale(self.render_scale(&window));

        log::info!(
            "Window ready: {}x{} physical, rendering at {width}x{height}",
            window.inner_size().width,
            window.inner_size().height
        );

        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(render_engine);
        Ok(())
    }

    fn render_scale(&self, window: &Window) -> f32 {
        render_scale(window.scale_factor(), self.window_config.max_pixel_ratio) as f32
    }

    fn surface_size(&self, window: &Window) -> (u32, u32) {
        render_size(
            window.inner_size(),
            window.scale_factor(),
            self.window_config.max_pixel_ratio,
        )
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop, window: &Arc<Window>) {
        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };

        self.timer.update();
        self.world.animate(self.timer.elapsed());

        if self.panel_changed {
            if let Some(floor) = self.world.floor_material_mut() {
                self.panel.apply(floor);
            }
            self.panel_changed = false;
        }

        render_engine.update(&mut self.world.scene);

        let panel = &mut self.panel;
        let panel_changed = &mut self.panel_changed;
        let overlay = self.ui_manager.as_mut().map(|ui_manager| {
            move |device: &wgpu::Device,
                  queue: &wgpu::Queue,
                  encoder: &mut wgpu::CommandEncoder,
                  view: &wgpu::TextureView| {
                let drawn = ui_manager.draw(device, queue, encoder, window, view, |ui| {
                    *panel_changed |= panel.draw(ui);
                });
                if let Err(e) = drawn {
                    log::error!("{e}");
                }
            }
        });

        match render_engine.render_frame(&self.world.scene, overlay) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                render_engine.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Surface out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("Skipping frame: {e}"),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init_graphics(event_loop) {
            log::error!("Failed to initialise graphics: {e}");
            self.fatal = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // Handle UI input first
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui_manager.handle_input(&window, &ui_event) {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                self.world
                    .scene
                    .camera_manager
                    .process_keyboard_event(&event);
            }
            WindowEvent::CursorMoved { .. }
            | WindowEvent::MouseInput { .. }
            | WindowEvent::MouseWheel { .. } => {
                // cursor positions arrive in physical window pixels
                let viewport_height = window.inner_size().height as f32;
                self.world
                    .scene
                    .camera_manager
                    .process_event(&event, viewport_height);
            }
            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }
                let (width, height) = self.surface_size(&window);
                let scale = self.render_scale(&window);
                self.world
                    .scene
                    .camera_manager
                    .camera
                    .resize_projection(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.set_render_scale(scale);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop, &window),
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_capped() {
        // 1200x800 logical on a 3x display renders at 2x
        let size = render_size(PhysicalSize::new(3600, 2400), 3.0, 2.0);
        assert_eq!(size, (2400, 1600));
    }

    #[test]
    fn low_ratios_render_at_native_size() {
        assert_eq!(render_size(PhysicalSize::new(1200, 800), 1.0, 2.0), (1200, 800));
        assert_eq!(render_size(PhysicalSize::new(2400, 1600), 2.0, 2.0), (2400, 1600));
    }

    #[test]
    fn surface_is_never_empty() {
        assert_eq!(render_size(PhysicalSize::new(0, 0), 3.0, 2.0), (1, 1));
    }
}
