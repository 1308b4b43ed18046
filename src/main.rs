//! Swellfield viewer - wind-driven FFT ocean on a wgpu surface.

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use swellfield::camera::CameraSystem;
use swellfield::cli::Args;
use swellfield::context::GpuContext;
use swellfield::ocean::OceanSystem;
use swellfield::params::*;
use swellfield::rendering::{RenderSystem, SkyUniforms, Uniforms};

/// Main application state
struct App {
    // Window and GPU systems (created on resume)
    window: Option<Arc<Window>>,
    context: Option<GpuContext>,
    ocean: Option<OceanSystem>,
    render_system: Option<RenderSystem>,

    // Simulation configuration
    wind: WindParameters,
    camera: CameraSystem,
    render_config: RenderConfig,
    recording_config: Option<RecordingConfig>,

    // Time tracking
    start_time: Instant,
    last_time_s: f32,
    frame_num: usize,
}

impl App {
    fn new(args: &Args) -> Self {
        Self {
            window: None,
            context: None,
            ocean: None,
            render_system: None,
            wind: args.wind_parameters(),
            camera: CameraSystem::new(args.parse_camera_preset()),
            render_config: RenderConfig::default(),
            recording_config: args.create_recording_config(),
            start_time: Instant::now(),
            last_time_s: 0.0,
            frame_num: 0,
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let window_attributes = Window::default_attributes()
            .with_title("Swellfield - FFT Ocean")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));
        let window = Arc::new(event_loop.create_window(window_attributes).unwrap());
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(Arc::clone(&window))
            .expect("Failed to create surface");

        let (context, adapter) =
            pollster::block_on(GpuContext::for_surface(&instance, &surface))
                .unwrap_or_else(|e| fatal(&e));

        let ocean = OceanSystem::new(
            &context.device,
            &context.queue,
            self.wind.clone(),
            SpectrumModel::default(),
            FoamParams::default(),
        )
        .unwrap_or_else(|e| fatal(&e));

        let render_system = RenderSystem::new(
            &context,
            &adapter,
            surface,
            (size.width, size.height),
            &self.render_config,
            self.wind.domain_length_m,
            ocean.surface_bind_group_layout(),
            self.recording_config.clone(),
        )
        .unwrap_or_else(|e| fatal(&e));

        println!("\nSwellfield is running!");
        println!("Press 1/2/3 to switch sea state, ESC to quit\n");

        self.window = Some(window);
        self.context = Some(context);
        self.ocean = Some(ocean);
        self.render_system = Some(render_system);
        self.start_time = Instant::now();
        self.last_time_s = 0.0;
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape => event_loop.exit(),
                KeyCode::Digit1 => self.set_sea(WindParameters::calm()),
                KeyCode::Digit2 => self.set_sea(WindParameters::moderate()),
                KeyCode::Digit3 => self.set_sea(WindParameters::storm()),
                _ => {}
            },
            WindowEvent::Resized(size) => {
                if let (Some(context), Some(render_system)) =
                    (&self.context, &mut self.render_system)
                {
                    render_system.resize(context, size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render_frame();
                if let Some(ref recording) = self.recording_config {
                    if self.frame_num >= recording.total_frames() {
                        println!("Recording complete: {} frames", self.frame_num);
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }
}

impl App {
    /// Switch sea state at runtime, keeping the grid and patch dimensions
    fn set_sea(&mut self, mut wind: WindParameters) {
        let (Some(context), Some(ocean)) = (&self.context, &mut self.ocean) else {
            return;
        };
        let current = ocean.wind();
        wind.grid_size = current.grid_size;
        wind.domain_length_m = current.domain_length_m;
        wind.spectrum_seed = current.spectrum_seed;

        println!("Sea state: {} m/s wind", wind.wind_speed_m_per_s);
        if let Err(e) = ocean.reconfigure(&context.queue, wind) {
            log::error!("reconfigure failed: {}", e);
        }
    }

    /// Simulate and render a single frame
    fn render_frame(&mut self) {
        let Some(ref context) = self.context else {
            return;
        };
        let Some(ref mut ocean) = self.ocean else {
            return;
        };
        let Some(ref render_system) = self.render_system else {
            return;
        };

        let time_s = self.start_time.elapsed().as_secs_f32();
        let dt_s = time_s - self.last_time_s;
        self.last_time_s = time_s;

        // Record the full simulation pipeline for this frame
        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Simulation Encoder"),
            });
        ocean.simulate(&mut encoder, &context.queue, time_s, dt_s);
        context.queue.submit(std::iter::once(encoder.finish()));

        // Camera and shading uniforms
        let (view_proj, camera_pos) = self
            .camera
            .create_view_proj_matrix(time_s, &self.render_config);
        render_system.update_uniforms(
            context,
            &Uniforms {
                view_proj: view_proj.to_cols_array_2d(),
                camera_pos: camera_pos.to_array(),
                time: time_s,
                patch_size_m: ocean.wind().domain_length_m,
                _padding: [0.0; 3],
            },
        );
        render_system.update_sky_uniforms(
            context,
            &SkyUniforms {
                inv_view_proj: view_proj.inverse().to_cols_array_2d(),
                time: time_s,
                _padding: [0.0; 3],
            },
        );

        // The renderer binds the previous frame's completed surface set
        match render_system.render(context, ocean.surface_bind_group(), self.frame_num) {
            Ok(()) => self.frame_num += 1,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Frame dropped; the swapchain is reconfigured on the next
                // resize event and the simulation simply continues
                log::warn!("surface lost, dropping frame");
            }
            Err(e) => log::error!("render error: {:?}", e),
        }
    }
}

fn fatal(message: &str) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    println!("Swellfield - FFT-synthesized ocean wave simulator");

    // Reject invalid configuration before any window or GPU work
    let wind = args.wind_parameters();
    if let Err(e) = wind.validate() {
        fatal(&format!("invalid configuration: {}", e));
    }
    println!(
        "Sea: {} m/s wind, {}x{} grid over {:.0}m",
        wind.wind_speed_m_per_s, wind.grid_size, wind.grid_size, wind.domain_length_m
    );

    let mut app = App::new(&args);
    let event_loop = EventLoop::new().unwrap();
    let _ = event_loop.run_app(&mut app);
}
