//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing OpenGL shaders.
//! This module also provides the [`Uniform`] trait for setting uniform variables in shader
//! programs.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use glam::{IVec3, Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::abs::{Device, GlError};

/// Pipeline stage a [`Shader`] is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEvaluation,
    Compute,
}

impl ShaderKind {
    pub fn gl_enum(self) -> u32 {
        match self {
            ShaderKind::Vertex => glow::VERTEX_SHADER,
            ShaderKind::Fragment => glow::FRAGMENT_SHADER,
            ShaderKind::Geometry => glow::GEOMETRY_SHADER,
            ShaderKind::TessControl => glow::TESS_CONTROL_SHADER,
            ShaderKind::TessEvaluation => glow::TESS_EVALUATION_SHADER,
            ShaderKind::Compute => glow::COMPUTE_SHADER,
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderKind::Vertex => "vertex",
            ShaderKind::Fragment => "fragment",
            ShaderKind::Geometry => "geometry",
            ShaderKind::TessControl => "tessellation control",
            ShaderKind::TessEvaluation => "tessellation evaluation",
            ShaderKind::Compute => "compute",
        })
    }
}

/// Represents an individual OpenGL shader.
pub struct Shader<D: Device = glow::Context> {
    gl: Arc<D>,
    id: Option<D::Shader>,
    kind: ShaderKind,
}

impl<D: Device> Shader<D> {
    /// Reads `path` and compiles its contents as a `kind` shader.
    pub fn create(gl: &Arc<D>, path: impl AsRef<Path>, kind: ShaderKind) -> Result<Self, GlError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| {
            log::error!("Could not open shader file: {}", path.display());
            GlError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let shader = Self::from_source(gl, kind, &source)?;
        log::debug!("Compiled {} shader {}", kind, path.display());
        Ok(shader)
    }

    /// Compiles a new shader from the given source code.
    pub fn from_source(gl: &Arc<D>, kind: ShaderKind, source: &str) -> Result<Self, GlError> {
        unsafe {
            let shader = gl.create_shader(kind.gl_enum()).map_err(GlError::Backend)?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                log::error!("Failed to compile {} shader. Compile log\n{}", kind, log);
                return Err(GlError::Compile { kind, log });
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: Some(shader),
                kind,
            })
        }
    }

    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    pub fn is_valid(&self) -> bool {
        self.id.is_some()
    }

    /// Deletes the shader object. Later calls do nothing.
    pub fn destroy(&mut self) {
        if let Some(id) = self.id.take() {
            unsafe {
                self.gl.delete_shader(id);
            }
        }
    }
}

impl<D: Device> Drop for Shader<D> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Represents a value that can be written to a uniform variable.
pub trait Uniform {
    /// Writes the value to `location` of the program currently in use.
    fn set_uniform<D: Device>(&self, gl: &D, location: &D::UniformLocation);
}

impl Uniform for bool {
    fn set_uniform<D: Device>(&self, gl: &D, location: &D::UniformLocation) {
        unsafe { gl.uniform_1_i32(Some(location), *self as i32) }
    }
}

impl Uniform for i32 {
    fn set_uniform<D: Device>(&self, gl: &D, location: &D::UniformLocation) {
        unsafe { gl.uniform_1_i32(Some(location), *self) }
    }
}

impl Uniform for f32 {
    fn set_uniform<D: Device>(&self, gl: &D, location: &D::UniformLocation) {
        unsafe { gl.uniform_1_f32(Some(location), *self) }
    }
}

impl Uniform for Vec2 {
    fn set_uniform<D: Device>(&self, gl: &D, location: &D::UniformLocation) {
        unsafe { gl.uniform_2_f32(Some(location), self.x, self.y) }
    }
}

impl Uniform for Vec3 {
    fn set_uniform<D: Device>(&self, gl: &D, location: &D::UniformLocation) {
        unsafe { gl.uniform_3_f32(Some(location), self.x, self.y, self.z) }
    }
}

impl Uniform for IVec3 {
    fn set_uniform<D: Device>(&self, gl: &D, location: &D::UniformLocation) {
        unsafe { gl.uniform_3_i32(Some(location), self.x, self.y, self.z) }
    }
}

impl Uniform for Vec4 {
    fn set_uniform<D: Device>(&self, gl: &D, location: &D::UniformLocation) {
        unsafe { gl.uniform_4_f32(Some(location), self.x, self.y, self.z, self.w) }
    }
}

impl Uniform for Mat2 {
    fn set_uniform<D: Device>(&self, gl: &D, location: &D::UniformLocation) {
        unsafe { gl.uniform_matrix_2_f32_slice(Some(location), false, &self.to_cols_array()) }
    }
}

impl Uniform for Mat3 {
    fn set_uniform<D: Device>(&self, gl: &D, location: &D::UniformLocation) {
        unsafe { gl.uniform_matrix_3_f32_slice(Some(location), false, &self.to_cols_array()) }
    }
}

impl Uniform for Mat4 {
    fn set_uniform<D: Device>(&self, gl: &D, location: &D::UniformLocation) {
        unsafe { gl.uniform_matrix_4_f32_slice(Some(location), false, &self.to_cols_array()) }
    }
}

impl<T: Uniform> Uniform for &T {
    fn set_uniform<D: Device>(&self, gl: &D, location: &D::UniformLocation) {
        (*self).set_uniform(gl, location);
    }
}

/// Represents an OpenGL shader program composed of multiple shaders.
pub struct ShaderProgram<D: Device = glow::Context> {
    gl: Arc<D>,
    id: Option<D::Program>,
}

impl<D: Device> ShaderProgram<D> {
    /// Links a vertex and a fragment stage, either of which may be missing but not both.
    pub fn create(
        gl: &Arc<D>,
        vertex: Option<&Shader<D>>,
        fragment: Option<&Shader<D>>,
    ) -> Result<Self, GlError> {
        let stages: Vec<&Shader<D>> = vertex.into_iter().chain(fragment).collect();
        Self::new(gl, &stages)
    }

    /// Links a new shader program from the given shaders.
    ///
    /// Stages that were already destroyed are skipped. The stages stay owned by the caller and are
    /// detached again once linking is done.
    pub fn new(gl: &Arc<D>, shaders: &[&Shader<D>]) -> Result<Self, GlError> {
        let stages: Vec<D::Shader> = shaders.iter().filter_map(|s| s.id).collect();
        if stages.is_empty() {
            return Err(GlError::NoShaderStages);
        }

        unsafe {
            let program = gl.create_program().map_err(GlError::Backend)?;

            for &stage in &stages {
                gl.attach_shader(program, stage);
            }

            gl.link_program(program);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                log::error!("Failed to link program. Link log\n{}", log);
                return Err(GlError::Link(log));
            }

            for &stage in &stages {
                gl.detach_shader(program, stage);
            }

            log::debug!("Program create [{:?}] stages: {:?}", program, stages);

            Ok(Self {
                gl: Arc::clone(gl),
                id: Some(program),
            })
        }
    }

    fn program(&self) -> Result<D::Program, GlError> {
        self.id.ok_or(GlError::Unallocated("shader program"))
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        if let Some(id) = self.id {
            unsafe {
                self.gl.use_program(Some(id));
            }
        }
    }

    /// Looks up a uniform by name.
    pub fn uniform_location(&self, name: &str) -> Option<D::UniformLocation> {
        let program = self.id?;
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    /// Looks up a vertex attribute by name.
    pub fn attrib_location(&self, name: &str) -> Option<u32> {
        let program = self.id?;
        unsafe { self.gl.get_attrib_location(program, name) }
    }

    /// Sets a uniform variable in the shader program.
    ///
    /// The location is looked up on every call and the value lands in whichever program is in
    /// use, so call [`ShaderProgram::use_program`] first.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) -> Result<(), GlError> {
        let program = self.program()?;
        let location = unsafe { self.gl.get_uniform_location(program, name) }
            .ok_or_else(|| GlError::UnknownUniform(name.to_string()))?;
        value.set_uniform(&*self.gl, &location);
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.id.is_some()
    }

    /// Deletes the program object. Later calls do nothing.
    pub fn destroy(&mut self) {
        if let Some(id) = self.id.take() {
            unsafe {
                self.gl.delete_program(id);
            }
        }
    }
}

impl<D: Device> Drop for ShaderProgram<D> {
    fn drop(&mut self) {
        self.destroy();
    }
}
