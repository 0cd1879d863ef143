//! Bouncebox - balls bouncing in a box, kicked upward by the music.
//!
//! Loud passages launch every ball; colors and trails show how fast they go.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use bouncebox::audio::{AudioAmplitudeSampler, PendingAudio, PlaybackMode};
use bouncebox::camera::CameraSystem;
use bouncebox::cli::Args;
use bouncebox::params::*;
use bouncebox::rendering::{scene_to_lines, RenderSystem, Uniforms};
use bouncebox::simulation::{RunState, SimulationController};

/// Orbit speed per dragged pixel (radians)
const ORBIT_RAD_PER_PX: f32 = 0.005;

/// Distance factor per wheel notch
const ZOOM_PER_LINE: f32 = 0.9;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,

    // Simulation
    simulation: SimulationController,
    camera: CameraSystem,

    // Configuration
    render_config: RenderConfig,
    ranges: ControlRanges,
    allow_bulk_count: bool,

    // Input state
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
    fastest_label: Option<String>,

    /// Setup failure reported after the event loop exits
    error: Option<anyhow::Error>,
}

impl App {
    fn new(simulation: SimulationController, allow_bulk_count: bool) -> Self {
        let render_config = RenderConfig::default();
        let camera = CameraSystem::new(&render_config);

        Self {
            window: None,
            render_system: None,
            simulation,
            camera,
            render_config,
            ranges: ControlRanges::default(),
            allow_bulk_count,
            dragging: false,
            last_cursor: None,
            fastest_label: None,
            error: None,
        }
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    /// Map a key press onto a controller operation
    fn handle_key(&mut self, code: KeyCode, event_loop: &ActiveEventLoop) {
        let config = self.simulation.config().clone();
        match code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::Space => {
                self.simulation.toggle_pause();
            }
            KeyCode::KeyR => self.simulation.reset(),
            KeyCode::KeyB => self.simulation.add_entity(),
            KeyCode::ArrowUp | KeyCode::ArrowDown => {
                let delta = if code == KeyCode::ArrowUp {
                    self.ranges.gravity_step
                } else {
                    -self.ranges.gravity_step
                };
                let gravity = self.ranges.clamp_gravity(config.gravity_y + delta);
                self.simulation.set_gravity(gravity);
            }
            KeyCode::Minus | KeyCode::Equal => {
                let delta = if code == KeyCode::Equal {
                    self.ranges.entity_size_step
                } else {
                    -self.ranges.entity_size_step
                };
                let size = self.ranges.clamp_entity_size(config.entity_size_m + delta);
                if size != config.entity_size_m {
                    self.simulation.set_entity_size(size);
                }
            }
            KeyCode::BracketLeft | KeyCode::BracketRight => {
                let delta = if code == KeyCode::BracketRight {
                    self.ranges.enclosure_size_step
                } else {
                    -self.ranges.enclosure_size_step
                };
                let size = self.ranges.clamp_enclosure_size(config.enclosure_size_m + delta);
                if size != config.enclosure_size_m {
                    self.simulation.set_enclosure_size(size);
                }
            }
            KeyCode::Digit1 | KeyCode::Digit2 | KeyCode::Digit3 => {
                let index = match code {
                    KeyCode::Digit1 => 1,
                    KeyCode::Digit2 => 2,
                    _ => 3,
                };
                if let Some(palette) = Palette::from_index(index) {
                    self.simulation.set_entity_color(palette.colors());
                }
            }
            KeyCode::Comma | KeyCode::Period => {
                if !self.allow_bulk_count {
                    log::info!("Bulk ball count is disabled (run with --allow-bulk-count)");
                    return;
                }
                let count = if code == KeyCode::Period {
                    config.entity_count + 1
                } else {
                    config.entity_count.saturating_sub(1)
                };
                let count = self.ranges.clamp_entity_count(count);
                if count != config.entity_count {
                    self.simulation.set_entity_count(count);
                }
            }
            _ => return,
        }
        self.request_redraw();
    }

    /// Render a single frame
    fn render_frame(&mut self) {
        if let Some(report) = self.simulation.tick() {
            self.fastest_label = report.sync.fastest_label;
        }

        let Some(render_system) = self.render_system.as_mut() else {
            return;
        };

        let vertices = scene_to_lines(self.simulation.scene(), self.render_config.sphere_segments);
        render_system.update_vertices(&vertices);

        let (view_proj, _) = self.camera.create_view_proj_matrix();
        render_system.update_uniforms(&Uniforms {
            view_proj: view_proj.to_cols_array_2d(),
        });

        match render_system.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    render_system.resize(size.width, size.height);
                }
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }

        self.update_title();
    }

    fn update_title(&self) {
        let Some(window) = &self.window else {
            return;
        };
        let state = match self.simulation.run_state() {
            RunState::Running => "running",
            RunState::Paused => "paused",
        };
        let audio = if self.simulation.is_loading_audio() {
            "loading audio".to_string()
        } else {
            format!("amp {:.0}", self.simulation.last_amplitude())
        };
        window.set_title(&format!(
            "Bouncebox | {} | {} balls | {} | {}",
            state,
            self.simulation.entities().len(),
            audio,
            self.fastest_label.as_deref().unwrap_or("Vel: 0.00")
        ));
    }

    fn try_init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("Bouncebox")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("failed to create window")?,
        );

        let render_system = pollster::block_on(RenderSystem::new(Arc::clone(&window)))
            .context("failed to initialise renderer")?;

        let size = window.inner_size();
        self.camera.set_viewport(size.width, size.height);

        log::info!(
            "Space pause | R reset | B add ball | arrows gravity | -/= ball size | [/] box size | 1-3 palette | drop a file to play it"
        );

        self.window = Some(window);
        self.render_system = Some(render_system);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Frames are only requested while the simulation runs
        if self.simulation.is_running() {
            self.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }
        if let Err(e) = self.try_init(event_loop) {
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(render_system) = self.render_system.as_mut() {
                    render_system.resize(size.width, size.height);
                }
                self.camera.set_viewport(size.width, size.height);
                self.request_redraw();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        repeat,
                        ..
                    },
                ..
            } => {
                // Held keys repeat only for continuous controls
                if repeat && matches!(code, KeyCode::Space | KeyCode::KeyR | KeyCode::KeyB) {
                    return;
                }
                self.handle_key(code, event_loop);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = state == ElementState::Pressed;
                if !self.dragging {
                    self.last_cursor = None;
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some((lx, ly)) = self.last_cursor {
                    if self.dragging {
                        let dx = (position.x - lx) as f32;
                        let dy = (position.y - ly) as f32;
                        self.camera.orbit(-dx * ORBIT_RAD_PER_PX, dy * ORBIT_RAD_PER_PX);
                        self.request_redraw();
                    }
                }
                self.last_cursor = Some((position.x, position.y));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 * 0.01,
                };
                self.camera.zoom(ZOOM_PER_LINE.powf(lines));
                self.request_redraw();
            }
            WindowEvent::DroppedFile(path) => {
                self.simulation.load_audio(path);
                self.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                self.render_frame();
            }
            _ => {}
        }
    }
}

/// Step the simulation without a window, logging progress once a second
fn run_headless(mut simulation: SimulationController, audio: Option<PathBuf>, frames: u64) {
    if let Some(path) = audio {
        match PendingAudio::from_path(path).wait() {
            Ok(decoded) => simulation.attach_audio(decoded),
            Err(e) => log::warn!("Failed to load audio: {}", e),
        }
    }

    let mut impulses = 0;
    for _ in 0..frames {
        let Some(report) = simulation.tick() else {
            break;
        };
        if report.step.impulse.is_some() {
            impulses += 1;
        }
        if report.frame % 60 == 0 {
            log::info!(
                "frame {}: amplitude {:.1}, fastest {}",
                report.frame,
                report.amplitude,
                report.sync.fastest_label.as_deref().unwrap_or("-")
            );
        }
    }

    log::info!(
        "Simulated {} frames ({} with audio impulses)",
        simulation.frame(),
        impulses
    );
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let ranges = ControlRanges::default();
    let config = args
        .simulation_config(&ranges)
        .context("invalid --palette")?;

    let mode = if args.silent || args.headless {
        PlaybackMode::Clock
    } else {
        PlaybackMode::Device
    };
    let sampler = AudioAmplitudeSampler::new(AnalyserConfig::default(), mode)?;
    let mut simulation = SimulationController::new(
        config,
        PhysicsParams::default(),
        VisualParams::default(),
        sampler,
        args.seed,
    );

    if args.headless {
        run_headless(simulation, args.audio, args.frames);
        return Ok(());
    }

    if let Some(path) = args.audio {
        simulation.load_audio(path);
    }

    let mut app = App::new(simulation, args.allow_bulk_count);
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
