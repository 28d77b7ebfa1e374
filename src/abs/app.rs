//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2
//! and OpenGL context necessary for creating a windowed application.

use std::sync::Arc;

use glow::HasContext;
use sdl2::video::{GLProfile, SwapInterval};

use crate::config::ExampleConfig;
use crate::error::AppError;

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
///
/// Fields drop in declaration order: the GL function table first, the SDL context last.
pub struct App {
    pub gl: Arc<glow::Context>,
    pub gl_context: sdl2::video::GLContext,
    pub window: sdl2::video::Window,
    pub event_pump: sdl2::EventPump,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub sdl: sdl2::Sdl,
}

impl App {
    /// Opens a window as described by `config` and makes a core profile context current on it.
    pub fn new(config: &ExampleConfig) -> Result<Self, AppError> {
        let sdl = sdl2::init().map_err(AppError::Sdl)?;
        let video_subsystem = sdl.video().map_err(AppError::Sdl)?;

        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(GLProfile::Core);
        let [major, minor] = config.gl_version;
        gl_attr.set_context_version(major, minor);
        if config.samples > 0 {
            gl_attr.set_multisample_buffers(1);
            gl_attr.set_multisample_samples(config.samples);
        }
        let mut flags = gl_attr.set_context_flags();
        if cfg!(target_os = "macos") {
            flags.forward_compatible();
        }
        if cfg!(debug_assertions) {
            flags.debug();
        }
        flags.set();

        let window = video_subsystem
            .window(&config.title, config.width, config.height)
            .opengl()
            .resizable()
            .position_centered()
            .build()?;

        let gl_context = window.gl_create_context().map_err(AppError::Context)?;
        window
            .gl_make_current(&gl_context)
            .map_err(AppError::Context)?;

        let interval = if config.vsync {
            SwapInterval::VSync
        } else {
            SwapInterval::Immediate
        };
        if let Err(err) = video_subsystem.gl_set_swap_interval(interval) {
            log::warn!("Could not set swap interval: {}", err);
        }

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = sdl.event_pump().map_err(AppError::Sdl)?;

        unsafe {
            log::info!(
                "OpenGL version: {}, GLSL version: {}",
                gl.get_parameter_string(glow::VERSION),
                gl.get_parameter_string(glow::SHADING_LANGUAGE_VERSION)
            );
        }

        Ok(Self {
            gl: Arc::new(gl),
            gl_context,
            window,
            event_pump,
            video_subsystem,
            sdl,
        })
    }

    /// Size of the drawable area in pixels, which differs from the window size on HiDPI screens.
    pub fn drawable_size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }

    pub fn swap(&self) {
        self.window.gl_swap_window();
    }
}
