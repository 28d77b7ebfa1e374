//! An empty window. Escape closes it.

use std::process::ExitCode;
use std::sync::Arc;

use glow::HasContext;
use glsamples::abs::GlError;
use glsamples::{Example, ExampleContext};

struct WindowExample;

impl Example for WindowExample {
    fn render(&mut self, gl: &Arc<glow::Context>, ctx: &ExampleContext) -> Result<(), GlError> {
        unsafe {
            gl.viewport(0, 0, ctx.width() as i32, ctx.height() as i32);
            gl.clear_color(0.2, 0.3, 0.3, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT);
        }
        Ok(())
    }
}

fn main() -> ExitCode {
    glsamples::launch("Window", WindowExample)
}
