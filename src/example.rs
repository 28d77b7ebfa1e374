//! The example lifecycle.
//!
//! An example is a value implementing [`Example`]. [`run`] opens the window, calls
//! [`Example::prepare`] once, then renders frames until a close is requested. Input reaches the
//! example through [`dispatch`], together with the [`ExampleContext`] of the running program, so
//! there is no global "current example".

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;

use crate::abs::{App, GlError};
use crate::config::ExampleConfig;
use crate::error::AppError;

/// Where a running example is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Uninitialized,
    WindowReady,
    Prepared,
    Running,
    Destroyed,
}

impl Stage {
    /// The stage that normally follows this one.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Uninitialized => Some(Stage::WindowReady),
            Stage::WindowReady => Some(Stage::Prepared),
            Stage::Prepared => Some(Stage::Running),
            Stage::Running => Some(Stage::Destroyed),
            Stage::Destroyed => None,
        }
    }

    /// Moves to `to`, which must be the next stage. Any live stage may jump to `Destroyed`.
    pub fn advance(&mut self, to: Stage) {
        debug_assert!(
            self.next() == Some(to) || (to == Stage::Destroyed && *self != Stage::Destroyed),
            "invalid lifecycle transition {:?} -> {:?}",
            self,
            to
        );
        log::debug!("Lifecycle {:?} -> {:?}", self, to);
        *self = to;
    }
}

/// Window input the examples care about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Keycode),
    KeyUp(Keycode),
    MouseMove { x: i32, y: i32, dx: i32, dy: i32 },
    MouseButton { button: MouseButton, pressed: bool, x: i32, y: i32 },
    Resized { width: u32, height: u32 },
    Quit,
}

impl InputEvent {
    /// Translates an SDL event, dropping the ones no example reacts to. Key repeats are dropped.
    pub fn from_sdl(event: &Event) -> Option<Self> {
        match *event {
            Event::Quit { .. } => Some(InputEvent::Quit),
            Event::KeyDown {
                keycode: Some(keycode),
                repeat: false,
                ..
            } => Some(InputEvent::KeyDown(keycode)),
            Event::KeyUp {
                keycode: Some(keycode),
                repeat: false,
                ..
            } => Some(InputEvent::KeyUp(keycode)),
            Event::MouseMotion {
                x, y, xrel, yrel, ..
            } => Some(InputEvent::MouseMove {
                x,
                y,
                dx: xrel,
                dy: yrel,
            }),
            Event::MouseButtonDown {
                mouse_btn, x, y, ..
            } => Some(InputEvent::MouseButton {
                button: mouse_btn,
                pressed: true,
                x,
                y,
            }),
            Event::MouseButtonUp {
                mouse_btn, x, y, ..
            } => Some(InputEvent::MouseButton {
                button: mouse_btn,
                pressed: false,
                x,
                y,
            }),
            // SDL sends SizeChanged for every size change and Resized only for external ones.
            Event::Window {
                win_event: WindowEvent::SizeChanged(width, height),
                ..
            } => Some(InputEvent::Resized {
                width: width.max(0) as u32,
                height: height.max(0) as u32,
            }),
            _ => None,
        }
    }

    /// Replaces the size carried by a resize event with the drawable size in pixels.
    pub fn with_drawable_size(self, (width, height): (u32, u32)) -> Self {
        match self {
            InputEvent::Resized { .. } => InputEvent::Resized { width, height },
            other => other,
        }
    }
}

/// State of the running program handed to every [`Example`] callback.
#[derive(Debug)]
pub struct ExampleContext {
    width: u32,
    height: u32,
    shaders_path: PathBuf,
    textures_path: PathBuf,
    start: Instant,
    frame: u64,
    close_requested: bool,
}

impl ExampleContext {
    pub fn new(config: &ExampleConfig, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            shaders_path: config.shaders_path(),
            textures_path: config.textures_path(),
            start: Instant::now(),
            frame: 0,
            close_requested: false,
        }
    }

    /// Drawable width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Drawable height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Time since the context was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Number of frames presented so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// `<shaders>/<example>/<file>`.
    pub fn shader_path(&self, example: &str, file: &str) -> PathBuf {
        self.shaders_path.join(example).join(file)
    }

    /// `<textures>/<file>`.
    pub fn texture_path(&self, file: &str) -> PathBuf {
        self.textures_path.join(file)
    }

    /// Ends the render loop after the current frame.
    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }
}

/// A sample program driven by [`run`].
///
/// Only [`Example::render`] is required. The input callbacks default to doing nothing.
pub trait Example {
    /// Allocates GPU resources. Called once, after the context is current and before the first
    /// frame.
    fn prepare(&mut self, _gl: &Arc<glow::Context>, _ctx: &ExampleContext) -> Result<(), GlError> {
        Ok(())
    }

    /// Draws one frame.
    fn render(&mut self, gl: &Arc<glow::Context>, ctx: &ExampleContext) -> Result<(), GlError>;

    fn on_key_down(&mut self, _key: Keycode, _ctx: &mut ExampleContext) {}

    fn on_key_up(&mut self, _key: Keycode, _ctx: &mut ExampleContext) {}

    fn on_mouse_move(&mut self, _x: i32, _y: i32, _ctx: &mut ExampleContext) {}

    fn on_mouse_button(
        &mut self,
        _button: MouseButton,
        _pressed: bool,
        _ctx: &mut ExampleContext,
    ) {
    }

    /// Called after the context already holds the new size.
    fn on_resize(&mut self, _width: u32, _height: u32, _ctx: &mut ExampleContext) {}
}

/// Routes one input event to `example`.
///
/// Escape and window close requests end the render loop after the example has seen the event.
pub fn dispatch<E: Example + ?Sized>(example: &mut E, ctx: &mut ExampleContext, event: InputEvent) {
    match event {
        InputEvent::KeyDown(key) => {
            example.on_key_down(key, ctx);
            if key == Keycode::Escape {
                ctx.request_close();
            }
        }
        InputEvent::KeyUp(key) => example.on_key_up(key, ctx),
        InputEvent::MouseMove { x, y, .. } => example.on_mouse_move(x, y, ctx),
        InputEvent::MouseButton { button, pressed, .. } => {
            example.on_mouse_button(button, pressed, ctx)
        }
        InputEvent::Resized { width, height } => {
            ctx.set_size(width, height);
            example.on_resize(width, height, ctx);
        }
        InputEvent::Quit => ctx.request_close(),
    }
}

/// Runs `example` in a new window until it is closed.
///
/// The example is dropped, releasing its GPU resources, before the context goes away.
pub fn run<E: Example>(mut example: E, config: &ExampleConfig) -> Result<(), AppError> {
    let mut stage = Stage::Uninitialized;
    let mut app = App::new(config)?;
    stage.advance(Stage::WindowReady);

    let (width, height) = app.drawable_size();
    let mut ctx = ExampleContext::new(config, width, height);
    let result = render_loop(&mut app, &mut example, &mut ctx, &mut stage);

    drop(example);
    stage.advance(Stage::Destroyed);
    drop(app);
    result
}

fn render_loop<E: Example>(
    app: &mut App,
    example: &mut E,
    ctx: &mut ExampleContext,
    stage: &mut Stage,
) -> Result<(), AppError> {
    example.prepare(&app.gl, ctx)?;
    stage.advance(Stage::Prepared);

    stage.advance(Stage::Running);
    while !ctx.close_requested() {
        example.render(&app.gl, ctx)?;
        app.swap();
        ctx.frame += 1;

        for event in app.event_pump.poll_iter() {
            let Some(input) = InputEvent::from_sdl(&event) else {
                continue;
            };
            // Window coordinates and pixels differ on HiDPI screens.
            let input = input.with_drawable_size(app.window.drawable_size());
            dispatch(example, ctx, input);
        }
    }
    log::info!("Closing after {} frames", ctx.frame());
    Ok(())
}

/// Entry point shared by the example binaries: config, logging, then [`run`].
pub fn launch<E: Example>(title: &str, example: E) -> ExitCode {
    let config = match setup(title) {
        Ok(config) => config,
        Err(err) => {
            // No logger to report through yet.
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match run(example, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn setup(title: &str) -> Result<ExampleConfig, AppError> {
    let config = ExampleConfig::load()?.with_title(title);
    crate::logging::init(config.level_filter()?)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Seen {
        Down(Keycode),
        Up(Keycode),
        Move(i32, i32),
        Resize(u32, u32),
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Seen>,
    }

    impl Example for Recorder {
        fn render(&mut self, _gl: &Arc<glow::Context>, _ctx: &ExampleContext) -> Result<(), GlError> {
            Ok(())
        }

        fn on_key_down(&mut self, key: Keycode, _ctx: &mut ExampleContext) {
            self.events.push(Seen::Down(key));
        }

        fn on_key_up(&mut self, key: Keycode, _ctx: &mut ExampleContext) {
            self.events.push(Seen::Up(key));
        }

        fn on_mouse_move(&mut self, x: i32, y: i32, _ctx: &mut ExampleContext) {
            self.events.push(Seen::Move(x, y));
        }

        fn on_resize(&mut self, width: u32, height: u32, ctx: &mut ExampleContext) {
            assert_eq!((ctx.width(), ctx.height()), (width, height));
            self.events.push(Seen::Resize(width, height));
        }
    }

    fn context() -> ExampleContext {
        let config = ExampleConfig {
            data_dir: PathBuf::from("/data"),
            ..ExampleConfig::default()
        };
        ExampleContext::new(&config, 1280, 720)
    }

    #[test]
    fn lifecycle_is_linear() {
        let mut stage = Stage::Uninitialized;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            stage.advance(next);
            seen.push(stage);
        }
        assert_eq!(
            seen,
            vec![
                Stage::Uninitialized,
                Stage::WindowReady,
                Stage::Prepared,
                Stage::Running,
                Stage::Destroyed
            ]
        );
    }

    #[test]
    fn failed_prepare_can_still_be_torn_down() {
        let mut stage = Stage::WindowReady;
        stage.advance(Stage::Destroyed);
        assert_eq!(stage, Stage::Destroyed);
    }

    #[test]
    fn callbacks_receive_their_events() {
        let mut example = Recorder::default();
        let mut ctx = context();

        dispatch(&mut example, &mut ctx, InputEvent::KeyDown(Keycode::A));
        dispatch(&mut example, &mut ctx, InputEvent::KeyUp(Keycode::A));
        dispatch(
            &mut example,
            &mut ctx,
            InputEvent::MouseMove { x: 3, y: 4, dx: 1, dy: 0 },
        );
        dispatch(
            &mut example,
            &mut ctx,
            InputEvent::Resized { width: 640, height: 480 },
        );

        assert_eq!(
            example.events,
            vec![
                Seen::Down(Keycode::A),
                Seen::Up(Keycode::A),
                Seen::Move(3, 4),
                Seen::Resize(640, 480)
            ]
        );
        assert_eq!((ctx.width(), ctx.height()), (640, 480));
        assert!(!ctx.close_requested());
    }

    #[test]
    fn escape_and_quit_close_the_window() {
        let mut example = Recorder::default();

        let mut ctx = context();
        dispatch(&mut example, &mut ctx, InputEvent::KeyDown(Keycode::Escape));
        assert!(ctx.close_requested());
        // The example still saw the key.
        assert_eq!(example.events, vec![Seen::Down(Keycode::Escape)]);

        let mut ctx = context();
        dispatch(&mut example, &mut ctx, InputEvent::Quit);
        assert!(ctx.close_requested());
    }

    #[test]
    fn two_examples_have_independent_contexts() {
        let (mut first, mut second) = (Recorder::default(), Recorder::default());
        let (mut first_ctx, mut second_ctx) = (context(), context());

        dispatch(&mut first, &mut first_ctx, InputEvent::KeyDown(Keycode::Escape));
        dispatch(&mut second, &mut second_ctx, InputEvent::KeyDown(Keycode::B));

        assert!(first_ctx.close_requested());
        assert!(!second_ctx.close_requested());
        assert_eq!(second.events, vec![Seen::Down(Keycode::B)]);
    }

    #[test]
    fn asset_paths() {
        let ctx = context();
        assert_eq!(
            ctx.shader_path("triangle", "triangle.vert"),
            PathBuf::from("/data/shaders/triangle/triangle.vert")
        );
        assert_eq!(
            ctx.texture_path("desert.tga"),
            PathBuf::from("/data/textures/desert.tga")
        );
        assert!((ctx.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn resize_reports_the_drawable_size() {
        let mut example = Recorder::default();
        let mut ctx = context();

        // A 800x600 window on a 2x display.
        let logical = InputEvent::Resized { width: 800, height: 600 };
        let input = logical.with_drawable_size((1600, 1200));
        dispatch(&mut example, &mut ctx, input);

        // on_resize itself asserts the context already holds the pixel size.
        assert_eq!(example.events, vec![Seen::Resize(1600, 1200)]);
        assert_eq!((ctx.width(), ctx.height()), (1600, 1200));
    }

    #[test]
    fn drawable_size_leaves_other_events_alone() {
        let key = InputEvent::KeyDown(Keycode::A);
        assert_eq!(key.with_drawable_size((1600, 1200)), key);
        assert_eq!(InputEvent::Quit.with_drawable_size((1, 1)), InputEvent::Quit);
    }

    fn window_event(win_event: WindowEvent) -> Event {
        Event::Window {
            timestamp: 0,
            window_id: 1,
            win_event,
        }
    }

    #[test]
    fn one_resize_per_size_change() {
        // SDL sends both events for a user resize. Only one may reach on_resize.
        assert_eq!(
            InputEvent::from_sdl(&window_event(WindowEvent::SizeChanged(800, 600))),
            Some(InputEvent::Resized { width: 800, height: 600 })
        );
        assert_eq!(
            InputEvent::from_sdl(&window_event(WindowEvent::Resized(800, 600))),
            None
        );
    }

    #[test]
    fn sdl_events_are_translated() {
        assert_eq!(
            InputEvent::from_sdl(&Event::Quit { timestamp: 0 }),
            Some(InputEvent::Quit)
        );
        assert_eq!(
            InputEvent::from_sdl(&window_event(WindowEvent::FocusGained)),
            None
        );
    }
}
