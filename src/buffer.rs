//! Vertex buffers.

use std::rc::Rc;

use bytemuck::Pod;

use crate::device::{gl_int, Device};
use crate::error::{Error, Result};
use crate::program::{PipelineProgram, VertexLayout};

/// How often the contents of a [`GeometryBuffer`] are expected to change.
///
/// Purely a hint to the driver's allocator; it has no effect on correctness.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum UsageHint {
    /// Rewritten every frame or so (`GL_STREAM_DRAW`).
    Stream,
    /// Written once, drawn many times (`GL_STATIC_DRAW`).
    #[default]
    Static,
    /// Rewritten occasionally (`GL_DYNAMIC_DRAW`).
    Dynamic,
}

impl UsageHint {
    /// The GL usage enum.
    #[must_use]
    pub const fn gl_usage(self) -> u32 {
        match self {
            Self::Stream => glow::STREAM_DRAW,
            Self::Static => glow::STATIC_DRAW,
            Self::Dynamic => glow::DYNAMIC_DRAW,
        }
    }
}

/// A device buffer holding tightly packed vertex records.
///
/// The buffer only supplies bytes; the shape of a vertex comes from the
/// [`VertexLayout`] of the program it is bound against. The record type
/// uploaded must have exactly the layout's stride and field order, or the
/// device reads garbage-interleaved attributes. That mismatch is not
/// detected here; [`vertex_count`](Self::vertex_count) makes it observable.
pub struct GeometryBuffer<D: Device> {
    device: Rc<D>,
    handle: D::Buffer,
    record_size: usize,
    record_count: usize,
}

impl<D: Device> GeometryBuffer<D> {
    /// Allocate an empty device buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceInit`] if the device cannot create the buffer.
    pub fn new(device: Rc<D>) -> Result<Self> {
        let handle = device
            .create_buffer()
            .map_err(Error::device_init("vertex buffer creation"))?;
        log::trace!("created buffer {handle:?}");
        Ok(Self {
            device,
            handle,
            record_size: 0,
            record_count: 0,
        })
    }

    /// Replace the buffer contents with the byte image of `records`.
    ///
    /// Leaves the buffer bound to the array-buffer binding point.
    pub fn upload<T: Pod>(&mut self, records: &[T], hint: UsageHint) {
        self.device.bind_array_buffer(Some(self.handle));
        self.device
            .array_buffer_data(bytemuck::cast_slice(records), hint.gl_usage());
        self.record_size = std::mem::size_of::<T>();
        self.record_count = records.len();
    }

    /// Bind the buffer and describe every attribute of `program`'s layout.
    ///
    /// The pointer stride is the program's stride, never this buffer's
    /// record size. Binding against an unlinked program binds the buffer
    /// but describes nothing.
    pub fn bind(&self, program: &PipelineProgram<D>) {
        self.device.bind_array_buffer(Some(self.handle));

        let Some(layout) = program.layout() else {
            log::warn!("vertex buffer {:?} bound against an unlinked program", self.handle);
            return;
        };
        let stride = layout.gl_stride();
        for attribute in layout.attributes() {
            let descriptor = &attribute.descriptor;
            self.device.vertex_attrib_pointer(
                attribute.location,
                i32::from(descriptor.count()),
                descriptor.element_type().gl_type(),
                descriptor.is_normalized(),
                stride,
                gl_int(attribute.offset),
            );
        }
    }

    /// Clear the array-buffer binding point. Attribute arrays stay enabled;
    /// disabling them belongs to [`PipelineProgram::unbind`].
    pub fn unbind(&self) {
        self.device.bind_array_buffer(None);
    }

    /// Size in bytes of one uploaded record.
    #[must_use]
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Number of records uploaded.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Total bytes uploaded.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.record_size * self.record_count
    }

    /// Whole vertices a draw through `layout` can read from this buffer.
    ///
    /// Equals [`record_count`](Self::record_count) when the record size
    /// matches the layout stride. Otherwise the device reinterprets the
    /// bytes with the layout's stride, and any trailing partial vertex is
    /// unreadable.
    #[must_use]
    pub fn vertex_count(&self, layout: &VertexLayout) -> usize {
        match layout.stride() {
            0 => 0,
            stride => self.byte_len() / stride,
        }
    }

    /// Draw-call vertex count for `layout`, as the `i32` GL expects.
    #[must_use]
    pub fn gl_vertex_count(&self, layout: &VertexLayout) -> i32 {
        gl_int(self.vertex_count(layout))
    }
}

impl<D: Device> Drop for GeometryBuffer<D> {
    fn drop(&mut self) {
        self.device.delete_buffer(self.handle);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bytemuck::{Pod, Zeroable};

    use super::*;
    use crate::attribute::{AttributeDescriptor, ElementType};
    use crate::device::mock::{AttribPointer, MockDevice};
    use crate::shaders::{TEXTURED_FRAGMENT_SRC, TEXTURED_VERTEX_SRC};

    /// Matches the textured shader's `a_position` + `a_texCoord0`.
    #[derive(Copy, Clone, Pod, Zeroable)]
    #[repr(C)]
    struct TexturedVertex {
        position: [f32; 3],
        tex_coord: [f32; 2],
    }

    /// Four bytes short of the textured layout's stride.
    #[derive(Copy, Clone, Pod, Zeroable)]
    #[repr(C)]
    struct ShortVertex {
        position: [f32; 4],
    }

    fn quad() -> Vec<TexturedVertex> {
        vec![
            TexturedVertex { position: [0.0, 0.0, 0.0], tex_coord: [0.0, 0.0] },
            TexturedVertex { position: [0.0, 600.0, 0.0], tex_coord: [0.0, 1.0] },
            TexturedVertex { position: [800.0, 0.0, 0.0], tex_coord: [1.0, 0.0] },
            TexturedVertex { position: [800.0, 600.0, 0.0], tex_coord: [1.0, 1.0] },
        ]
    }

    fn textured_program(device: &Rc<MockDevice>) -> PipelineProgram<MockDevice> {
        PipelineProgram::from_sources(
            device,
            vec![
                AttributeDescriptor::float("a_position", 3).unwrap(),
                AttributeDescriptor::float("a_texCoord0", 2).unwrap(),
            ],
            TEXTURED_VERTEX_SRC,
            TEXTURED_FRAGMENT_SRC,
        )
        .unwrap()
    }

    #[test]
    fn upload_copies_full_byte_image() {
        let device = Rc::new(MockDevice::new());
        let mut buffer = GeometryBuffer::new(Rc::clone(&device)).unwrap();
        buffer.upload(&quad(), UsageHint::Static);

        assert_eq!(buffer.record_size(), 20);
        assert_eq!(buffer.record_count(), 4);
        let state = device.state();
        let bytes = state.buffers.values().next().unwrap();
        assert_eq!(bytes.len(), 80);
        assert_eq!(bytes.as_slice(), bytemuck::cast_slice::<_, u8>(&quad()));
        assert_eq!(state.buffer_usage.values().next(), Some(&glow::STATIC_DRAW));
    }

    #[test]
    fn upload_replaces_prior_contents() {
        let device = Rc::new(MockDevice::new());
        let mut buffer = GeometryBuffer::new(Rc::clone(&device)).unwrap();
        buffer.upload(&quad(), UsageHint::Static);
        buffer.upload(&quad()[..2], UsageHint::Dynamic);

        assert_eq!(buffer.record_count(), 2);
        let state = device.state();
        assert_eq!(state.buffers.values().next().unwrap().len(), 40);
        assert_eq!(state.buffer_usage.values().next(), Some(&glow::DYNAMIC_DRAW));
    }

    #[test]
    fn bind_describes_layout_with_program_stride() {
        let device = Rc::new(MockDevice::new());
        let program = textured_program(&device);
        let mut buffer = GeometryBuffer::new(Rc::clone(&device)).unwrap();
        buffer.upload(&quad(), UsageHint::Static);

        program.bind();
        buffer.bind(&program);

        let state = device.state();
        assert_eq!(
            state.attrib_pointers,
            [
                AttribPointer {
                    location: 0,
                    count: 3,
                    gl_type: glow::FLOAT,
                    normalized: false,
                    stride: 20,
                    offset: 0,
                },
                AttribPointer {
                    location: 1,
                    count: 2,
                    gl_type: glow::FLOAT,
                    normalized: false,
                    stride: 20,
                    offset: 12,
                },
            ]
        );
        assert!(state.bound_array_buffer.is_some());
    }

    #[test]
    fn normalized_integer_attributes_keep_their_type() {
        let device = Rc::new(MockDevice::new());
        let vertex = "in vec2 a_position;\nin vec4 a_color;\n";
        let program = PipelineProgram::from_sources(
            &device,
            vec![
                AttributeDescriptor::float("a_position", 2).unwrap(),
                AttributeDescriptor::new("a_color", ElementType::UInt8, 4)
                    .unwrap()
                    .normalized(true),
            ],
            vertex,
            "void main() {}",
        )
        .unwrap();
        let buffer = GeometryBuffer::new(Rc::clone(&device)).unwrap();
        buffer.bind(&program);

        let state = device.state();
        let color = &state.attrib_pointers[1];
        assert_eq!(color.gl_type, glow::UNSIGNED_BYTE);
        assert!(color.normalized);
        assert_eq!(color.stride, 12);
        assert_eq!(color.offset, 8);
    }

    #[test]
    fn matching_records_read_exactly_every_vertex() {
        let device = Rc::new(MockDevice::new());
        let program = textured_program(&device);
        let mut buffer = GeometryBuffer::new(Rc::clone(&device)).unwrap();
        buffer.upload(&quad(), UsageHint::Static);

        let layout = program.layout().unwrap();
        assert_eq!(buffer.record_size(), layout.stride());
        assert_eq!(buffer.vertex_count(layout), 4);
        assert_eq!(buffer.vertex_count(layout) * layout.stride(), buffer.byte_len());
    }

    #[test]
    fn mismatched_records_leave_a_partial_vertex() {
        // Five 16-byte records read through a 20-byte stride: the device sees
        // four whole vertices of garbage-interleaved data, not five.
        let device = Rc::new(MockDevice::new());
        let program = textured_program(&device);
        let mut buffer = GeometryBuffer::new(Rc::clone(&device)).unwrap();
        buffer.upload(&[ShortVertex { position: [1.0; 4] }; 5], UsageHint::Stream);

        program.bind();
        buffer.bind(&program);

        let layout = program.layout().unwrap();
        assert_ne!(buffer.record_size(), layout.stride());
        assert_eq!(buffer.byte_len(), 80);
        assert_eq!(buffer.vertex_count(layout), 4);
        assert!(device.state().attrib_pointers.iter().all(|p| p.stride == 20));

        buffer.upload(&[ShortVertex { position: [1.0; 4] }; 3], UsageHint::Stream);
        assert_eq!(buffer.byte_len() % layout.stride(), 8);
        assert_eq!(buffer.vertex_count(layout), 2);
    }

    #[test]
    fn bind_against_unlinked_program_describes_nothing() {
        let device = Rc::new(MockDevice::new());
        let program = PipelineProgram::new(
            Rc::clone(&device),
            vec![AttributeDescriptor::float("a_position", 3).unwrap()],
        )
        .unwrap();
        let buffer = GeometryBuffer::new(Rc::clone(&device)).unwrap();
        buffer.bind(&program);

        let state = device.state();
        assert!(state.attrib_pointers.is_empty());
        assert!(state.bound_array_buffer.is_some());
    }

    #[test]
    fn unbind_leaves_attribute_arrays_enabled() {
        let device = Rc::new(MockDevice::new());
        let program = textured_program(&device);
        let buffer = GeometryBuffer::new(Rc::clone(&device)).unwrap();
        program.bind();
        buffer.bind(&program);
        buffer.unbind();

        let state = device.state();
        assert_eq!(state.bound_array_buffer, None);
        assert_eq!(state.enabled_arrays.len(), 2);
    }

    #[test]
    fn drop_releases_buffer() {
        let device = Rc::new(MockDevice::new());
        let buffer = GeometryBuffer::new(Rc::clone(&device)).unwrap();
        assert_eq!(device.state().buffers.len(), 1);
        drop(buffer);
        assert_eq!(device.state().live_objects(), 0);
    }
}
