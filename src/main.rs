//! Desktop viewer for the showcase scene.

use std::sync::Arc;

use anyhow::Context as _;
use log::{error, info};
use vitrine::camera::PerspectiveCamera;
use vitrine::controls::{Key, Modifiers, OrbitControls, PointerButton};
use vitrine::core::{Engine, EngineBuilder};
use vitrine::math::Vector2;
use vitrine::scene::Scene;
use vitrine::showcase::Showcase;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key as WinitKey, NamedKey},
    window::{Window, WindowAttributes, WindowId},
};

/// Pixels per wheel line.
const LINE_HEIGHT: f32 = 40.0;

/// Everything that exists once the window does.
struct Viewer {
    window: Arc<Window>,
    engine: Engine,
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    showcase: Showcase,
    modifiers: Modifiers,
    last_cursor: Vector2,
}

impl Viewer {
    fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let PhysicalSize { width, height } = window.inner_size();
        let engine = pollster::block_on(
            EngineBuilder::new()
                .antialias(true)
                .build(window.clone(), width, height),
        )
        .context("failed to create rendering context")?;

        let mut scene = Scene::new();
        let showcase = Showcase::build(&mut scene).context("failed to build showcase scene")?;
        let camera = Showcase::camera(engine.aspect_ratio());
        let mut controls = Showcase::controls();
        controls.set_viewport_height(height as f32);

        Ok(Self {
            window,
            engine,
            scene,
            camera,
            controls,
            showcase,
            modifiers: Modifiers::NONE,
            last_cursor: Vector2::ZERO,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.engine.resize(size.width, size.height);
        self.camera.set_aspect(self.engine.aspect_ratio());
        self.controls.set_viewport_height(size.height as f32);
    }

    fn frame(&mut self) {
        self.controls.update(&mut self.camera);
        self.showcase
            .animate(&mut self.scene, self.engine.elapsed_time());

        match self.engine.render(&mut self.scene, &mut self.camera) {
            Ok(info) => {
                if info.frame % 600 == 0 {
                    info!(
                        "frame {}: {} draws, {} triangles, {} culled",
                        info.frame, info.draw_calls, info.triangles, info.culled
                    );
                }
            }
            Err(err) => error!("frame failed: {}", err),
        }
        self.window.request_redraw();
    }

    fn pointer_button(&mut self, button: MouseButton, state: ElementState) {
        let button = match button {
            MouseButton::Left => PointerButton::Left,
            MouseButton::Middle => PointerButton::Middle,
            MouseButton::Right => PointerButton::Right,
            _ => return,
        };
        match state {
            ElementState::Pressed => {
                self.controls
                    .pointer_down(button, self.modifiers, self.last_cursor);
            }
            ElementState::Released => self.controls.pointer_up(),
        }
    }

    fn key(&mut self, event: &KeyEvent, event_loop: &ActiveEventLoop) {
        if event.state != ElementState::Pressed {
            return;
        }
        let key = match &event.logical_key {
            WinitKey::Named(NamedKey::Escape) => {
                event_loop.exit();
                return;
            }
            WinitKey::Named(NamedKey::ArrowUp) => Key::ArrowUp,
            WinitKey::Named(NamedKey::ArrowDown) => Key::ArrowDown,
            WinitKey::Named(NamedKey::ArrowLeft) => Key::ArrowLeft,
            WinitKey::Named(NamedKey::ArrowRight) => Key::ArrowRight,
            _ => return,
        };
        self.controls.key_down(key);
    }
}

#[derive(Default)]
struct App {
    viewer: Option<Viewer>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }
        let attributes = WindowAttributes::default()
            .with_title(format!("{} {}", vitrine::NAME, vitrine::VERSION))
            .with_inner_size(PhysicalSize::new(1280, 720));
        let viewer = event_loop
            .create_window(attributes)
            .context("failed to create window")
            .and_then(|window| Viewer::new(Arc::new(window)));
        match viewer {
            Ok(viewer) => {
                viewer.window.request_redraw();
                self.viewer = Some(viewer);
            }
            Err(err) => {
                error!("{:#}", err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested; exiting");
                self.viewer = None;
                event_loop.exit();
            }
            WindowEvent::Resized(size) => viewer.resize(size),
            WindowEvent::RedrawRequested => viewer.frame(),
            WindowEvent::ModifiersChanged(modifiers) => {
                let state = modifiers.state();
                viewer.modifiers = Modifiers {
                    shift: state.shift_key(),
                    ctrl: state.control_key(),
                    alt: state.alt_key(),
                    meta: state.super_key(),
                };
            }
            WindowEvent::CursorMoved { position, .. } => {
                viewer.last_cursor = Vector2::new(position.x as f32, position.y as f32);
                viewer.controls.pointer_move(viewer.last_cursor);
            }
            WindowEvent::MouseInput { state, button, .. } => viewer.pointer_button(button, state),
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y * LINE_HEIGHT,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32,
                };
                // winit reports scrolling up as positive.
                viewer.controls.wheel(-dy);
            }
            WindowEvent::KeyboardInput { event, .. } => viewer.key(&event, event_loop),
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::default();
    event_loop.run_app(&mut app).context("event loop failed")?;
    Ok(())
}
