//! Vertex and index buffers.
//!
//! Both kinds share one implementation, [`Buffer`], parameterized by a [`BufferKind`] marker that
//! picks the binding target and the name used in diagnostics. A buffer starts out unallocated,
//! gets its storage from [`Buffer::create`], and gives it back on [`Buffer::destroy`] or drop.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::abs::{Device, GlError};

/// Extra intent attached to a buffer at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferFlag {
    #[default]
    None,
    ComputeRead,
    ComputeWrite,
    /// Vertex buffers created with this flag bind to `GL_DRAW_INDIRECT_BUFFER`.
    DrawIndirect,
}

/// Usage hint, inferred from whether initial contents were supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    Static,
    Dynamic,
}

impl Usage {
    fn gl_enum(self) -> u32 {
        match self {
            Usage::Static => glow::STATIC_DRAW,
            Usage::Dynamic => glow::DYNAMIC_DRAW,
        }
    }
}

/// Selects the binding point of a [`Buffer`].
pub trait BufferKind {
    const LABEL: &'static str;

    fn target(flag: BufferFlag) -> u32;

    /// Binding point used while uploading or releasing storage.
    fn transfer_target(flag: BufferFlag) -> u32 {
        Self::target(flag)
    }
}

/// Marker for vertex attribute storage.
#[derive(Debug)]
pub enum Vertices {}

/// Marker for element index storage.
#[derive(Debug)]
pub enum Indices {}

impl BufferKind for Vertices {
    const LABEL: &'static str = "vertex buffer";

    fn target(flag: BufferFlag) -> u32 {
        match flag {
            BufferFlag::DrawIndirect => glow::DRAW_INDIRECT_BUFFER,
            _ => glow::ARRAY_BUFFER,
        }
    }
}

impl BufferKind for Indices {
    const LABEL: &'static str = "index buffer";

    fn target(_flag: BufferFlag) -> u32 {
        glow::ELEMENT_ARRAY_BUFFER
    }

    // The element binding belongs to whichever vertex array is bound.
    fn transfer_target(_flag: BufferFlag) -> u32 {
        glow::COPY_WRITE_BUFFER
    }
}

pub type VertexBuffer<D = glow::Context> = Buffer<Vertices, D>;
pub type IndexBuffer<D = glow::Context> = Buffer<Indices, D>;

/// A block of GPU memory holding vertex or index data.
pub struct Buffer<K: BufferKind, D: Device = glow::Context> {
    gl: Arc<D>,
    id: Option<D::Buffer>,
    size: usize,
    usage: Usage,
    flag: BufferFlag,
    target: u32,
    _kind: PhantomData<K>,
}

impl<K: BufferKind, D: Device> Buffer<K, D> {
    /// Creates a wrapper that owns no GPU memory yet.
    pub fn new(gl: &Arc<D>) -> Self {
        Self {
            gl: Arc::clone(gl),
            id: None,
            size: 0,
            usage: Usage::Dynamic,
            flag: BufferFlag::None,
            target: K::target(BufferFlag::None),
            _kind: PhantomData,
        }
    }

    /// Allocates a static buffer holding a copy of `data`.
    pub fn with_data(gl: &Arc<D>, data: &[u8], flag: BufferFlag) -> Result<Self, GlError> {
        let mut buffer = Self::new(gl);
        buffer.create(data.len(), Some(data), flag)?;
        Ok(buffer)
    }

    /// Allocates an uninitialized dynamic buffer of `size` bytes.
    pub fn with_size(gl: &Arc<D>, size: usize, flag: BufferFlag) -> Result<Self, GlError> {
        let mut buffer = Self::new(gl);
        buffer.create(size, None, flag)?;
        Ok(buffer)
    }

    /// Allocates a static buffer from a slice of plain-old-data elements.
    pub fn from_slice<T: bytemuck::Pod>(
        gl: &Arc<D>,
        data: &[T],
        flag: BufferFlag,
    ) -> Result<Self, GlError> {
        Self::with_data(gl, bytemuck::cast_slice(data), flag)
    }

    /// Allocates `size` bytes of device memory.
    ///
    /// With `Some(data)` the contents are uploaded right away and the buffer is static; `data`
    /// must then be exactly `size` bytes long. With `None` the storage is left uninitialized and
    /// the buffer is dynamic. Any storage the wrapper already owned is released first.
    pub fn create(
        &mut self,
        size: usize,
        data: Option<&[u8]>,
        flag: BufferFlag,
    ) -> Result<(), GlError> {
        if let Some(data) = data {
            if data.len() != size {
                return Err(GlError::SizeMismatch {
                    expected: size,
                    actual: data.len(),
                });
            }
        }
        let gl_size = i32::try_from(size).map_err(|_| GlError::TooLarge { size })?;

        self.destroy();

        let usage = if data.is_some() {
            Usage::Static
        } else {
            Usage::Dynamic
        };
        let transfer = K::transfer_target(flag);

        unsafe {
            let id = self.gl.create_buffer().map_err(GlError::Backend)?;
            self.gl.bind_buffer(transfer, Some(id));
            match data {
                Some(data) => self.gl.buffer_data_u8_slice(transfer, data, usage.gl_enum()),
                None => self.gl.buffer_data_size(transfer, gl_size, usage.gl_enum()),
            }
            self.gl.bind_buffer(transfer, None);
            self.id = Some(id);
        }

        self.size = size;
        self.usage = usage;
        self.flag = flag;
        self.target = K::target(flag);
        log::trace!("Created {} of {} bytes ({:?})", K::LABEL, size, usage);
        Ok(())
    }

    /// Overwrites `data.len()` bytes starting at `offset`.
    ///
    /// Nothing reaches the device when the buffer was never created or the range does not fit.
    pub fn update(&self, offset: usize, data: &[u8]) -> Result<(), GlError> {
        let Some(id) = self.id else {
            log::error!("Updating invalid {}.", K::LABEL);
            return Err(GlError::Unallocated(K::LABEL));
        };
        let in_range = offset
            .checked_add(data.len())
            .is_some_and(|end| end <= self.size);
        if !in_range {
            return Err(GlError::OutOfRange {
                offset,
                len: data.len(),
                size: self.size,
            });
        }
        if self.usage == Usage::Static {
            log::debug!("Updating a static {}; the driver may stall.", K::LABEL);
        }

        let transfer = K::transfer_target(self.flag);
        unsafe {
            self.gl.bind_buffer(transfer, Some(id));
            // `offset` is within `size`, which fit an i32 at creation.
            self.gl.buffer_sub_data_u8_slice(transfer, offset as i32, data);
            self.gl.bind_buffer(transfer, None);
        }
        Ok(())
    }

    /// Like [`Buffer::update`], for a slice of plain-old-data elements.
    pub fn update_slice<T: bytemuck::Pod>(&self, offset: usize, data: &[T]) -> Result<(), GlError> {
        self.update(offset, bytemuck::cast_slice(data))
    }

    /// Releases the device memory. Calling this on an unallocated buffer does nothing.
    pub fn destroy(&mut self) {
        if let Some(id) = self.id.take() {
            unsafe {
                self.gl.bind_buffer(K::transfer_target(self.flag), None);
                self.gl.delete_buffer(id);
            }
            self.size = 0;
        }
    }

    pub fn is_allocated(&self) -> bool {
        self.id.is_some()
    }

    /// Size of the allocation in bytes, zero when unallocated.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn usage(&self) -> Usage {
        self.usage
    }

    pub fn flag(&self) -> BufferFlag {
        self.flag
    }

    /// The binding point this buffer is bound to.
    pub fn target(&self) -> u32 {
        self.target
    }

    /// The underlying handle, for vertex array setup.
    pub fn raw(&self) -> Option<D::Buffer> {
        self.id
    }
}

impl<K: BufferKind, D: Device> Drop for Buffer<K, D> {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abs::device::fake::{Call, FakeDevice};
    use crate::logging::capture;
    use log::Level;

    fn uploads(gl: &FakeDevice) -> Vec<Call> {
        gl.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::BufferData { .. } | Call::BufferSubData { .. }))
            .collect()
    }

    #[test]
    fn initial_data_makes_a_static_buffer() {
        let gl = Arc::new(FakeDevice::default());
        let vb = VertexBuffer::with_data(&gl, &[1, 2, 3, 4], BufferFlag::None).unwrap();

        assert!(vb.is_allocated());
        assert_eq!(vb.size(), 4);
        assert_eq!(vb.usage(), Usage::Static);
        assert_eq!(vb.target(), glow::ARRAY_BUFFER);
        assert_eq!(
            uploads(&gl),
            vec![Call::BufferData {
                target: glow::ARRAY_BUFFER,
                buffer: vb.raw().unwrap(),
                len: 4,
                usage: glow::STATIC_DRAW,
                uploaded: true,
            }]
        );
        // Binding is restored once the upload is done.
        assert_eq!(gl.bindings.borrow()[&glow::ARRAY_BUFFER], None);
    }

    #[test]
    fn missing_data_makes_a_dynamic_buffer() {
        let gl = Arc::new(FakeDevice::default());
        let ib = IndexBuffer::with_size(&gl, 64, BufferFlag::None).unwrap();

        assert_eq!(ib.usage(), Usage::Dynamic);
        assert_eq!(ib.target(), glow::ELEMENT_ARRAY_BUFFER);
        assert!(matches!(
            uploads(&gl)[0],
            Call::BufferData { len: 64, usage: glow::DYNAMIC_DRAW, uploaded: false, .. }
        ));
    }

    #[test]
    fn draw_indirect_flag_changes_vertex_target_only() {
        let gl = Arc::new(FakeDevice::default());
        let vb = VertexBuffer::with_size(&gl, 16, BufferFlag::DrawIndirect).unwrap();
        let ib = IndexBuffer::with_size(&gl, 16, BufferFlag::DrawIndirect).unwrap();

        assert_eq!(vb.target(), glow::DRAW_INDIRECT_BUFFER);
        assert_eq!(ib.target(), glow::ELEMENT_ARRAY_BUFFER);
    }

    #[test]
    fn data_must_match_the_requested_size() {
        let gl = Arc::new(FakeDevice::default());
        let mut vb = VertexBuffer::new(&gl);

        let err = vb.create(8, Some(&[0u8; 4]), BufferFlag::None).unwrap_err();
        assert!(matches!(err, GlError::SizeMismatch { expected: 8, actual: 4 }));
        assert!(!vb.is_allocated());
        assert!(gl.live_buffers.borrow().is_empty());
    }

    #[test]
    fn update_before_create_uploads_nothing() {
        let gl = Arc::new(FakeDevice::default());
        let vb = VertexBuffer::new(&gl);

        capture::start();
        let err = vb.update(0, &[0u8; 4]).unwrap_err();
        assert!(matches!(err, GlError::Unallocated("vertex buffer")));
        assert!(uploads(&gl).is_empty());
        assert!(
            capture::take()
                .contains(&(Level::Error, "Updating invalid vertex buffer.".to_string()))
        );
    }

    #[test]
    fn update_writes_the_requested_range() {
        let gl = Arc::new(FakeDevice::default());
        let vb = VertexBuffer::with_size(&gl, 32, BufferFlag::None).unwrap();

        vb.update_slice(8, &[1.0f32, 2.0]).unwrap();
        assert_eq!(
            uploads(&gl).last(),
            Some(&Call::BufferSubData {
                target: glow::ARRAY_BUFFER,
                buffer: vb.raw().unwrap(),
                offset: 8,
                len: 8,
            })
        );
    }

    #[test]
    fn update_outside_the_allocation_is_rejected() {
        let gl = Arc::new(FakeDevice::default());
        let ib = IndexBuffer::with_size(&gl, 12, BufferFlag::None).unwrap();

        let err = ib.update(8, &[0u8; 8]).unwrap_err();
        assert!(matches!(err, GlError::OutOfRange { offset: 8, len: 8, size: 12 }));
        assert!(ib.update(usize::MAX, &[0u8; 1]).is_err());
        assert_eq!(uploads(&gl).len(), 1);
    }

    #[test]
    fn index_uploads_leave_the_element_binding_alone() {
        let gl = Arc::new(FakeDevice::default());
        // Stands in for the element buffer of whichever vertex array is bound.
        gl.bindings
            .borrow_mut()
            .insert(glow::ELEMENT_ARRAY_BUFFER, Some(99));

        let mut ib = IndexBuffer::with_size(&gl, 12, BufferFlag::None).unwrap();
        ib.update_slice(0, &[0u32, 1, 2]).unwrap();
        ib.destroy();

        assert_eq!(gl.bindings.borrow()[&glow::ELEMENT_ARRAY_BUFFER], Some(99));
        let targets: Vec<u32> = uploads(&gl)
            .into_iter()
            .map(|c| match c {
                Call::BufferData { target, .. } | Call::BufferSubData { target, .. } => target,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(targets, vec![glow::COPY_WRITE_BUFFER; 2]);
    }

    #[test]
    fn destroy_twice_is_a_no_op() {
        let gl = Arc::new(FakeDevice::default());
        let mut vb = VertexBuffer::from_slice(&gl, &[0.0f32; 6], BufferFlag::None).unwrap();
        let id = vb.raw().unwrap();

        vb.destroy();
        vb.destroy();
        drop(vb);

        assert_eq!(gl.times_deleted(id), 1);
        assert!(gl.live_buffers.borrow().is_empty());
    }

    #[test]
    fn recreating_releases_the_previous_allocation() {
        let gl = Arc::new(FakeDevice::default());
        let mut vb = VertexBuffer::with_size(&gl, 4, BufferFlag::None).unwrap();
        let first = vb.raw().unwrap();

        vb.create(8, None, BufferFlag::None).unwrap();

        assert_eq!(gl.times_deleted(first), 1);
        assert_eq!(gl.live_buffers.borrow().len(), 1);
        assert_eq!(vb.size(), 8);
    }

    #[test]
    fn drop_releases_the_buffer() {
        let gl = Arc::new(FakeDevice::default());
        {
            let _ib = IndexBuffer::from_slice(&gl, &[0u32, 1, 2], BufferFlag::None).unwrap();
            assert_eq!(gl.live_buffers.borrow().len(), 1);
        }
        assert!(gl.live_buffers.borrow().is_empty());
    }
}
