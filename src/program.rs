//! Shader programs and the vertex layout they resolve at link time.
//!
//! A [`PipelineProgram`] is built from the ordered list of
//! [`AttributeDescriptor`]s describing one vertex record. Linking resolves
//! every descriptor's name against the linked program and packs the
//! attributes left to right with no padding, producing the [`VertexLayout`]
//! that [`GeometryBuffer::bind`](crate::GeometryBuffer::bind) later feeds to
//! the device. Name resolution never happens at draw time.

use std::cell::Cell;
use std::rc::Rc;

use crate::attribute::AttributeDescriptor;
use crate::device::{gl_int, Device};
use crate::error::{Error, Result};
use crate::shaders::{ShaderStage, ShaderUnit};
use crate::uniform::UniformValue;

/// One declared attribute after link-time resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedAttribute {
    /// The declaration this entry resolves.
    pub descriptor: AttributeDescriptor,
    /// Binding location the linker assigned.
    pub location: u32,
    /// Byte offset within one vertex record.
    pub offset: usize,
}

/// Packed byte layout of one vertex record.
///
/// `offset[i]` is the sum of the widths of attributes `0..i`, and `stride`
/// is the sum of all widths.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VertexLayout {
    attributes: Vec<ResolvedAttribute>,
    stride: usize,
}

impl VertexLayout {
    /// Resolve `descriptors` in order with `locate`, packing them without
    /// alignment padding.
    fn resolve(
        descriptors: &[AttributeDescriptor],
        mut locate: impl FnMut(&str) -> Option<u32>,
    ) -> Result<Self> {
        let mut attributes = Vec::with_capacity(descriptors.len());
        let mut offset = 0;
        for descriptor in descriptors {
            let Some(location) = locate(descriptor.name()) else {
                log::error!(
                    "Could not find attribute named \"{}\" in shader program.",
                    descriptor.name()
                );
                return Err(Error::AttributeResolution {
                    name: descriptor.name().to_owned(),
                });
            };
            attributes.push(ResolvedAttribute {
                descriptor: descriptor.clone(),
                location,
                offset,
            });
            offset += descriptor.byte_width();
        }
        Ok(Self {
            attributes,
            stride: offset,
        })
    }

    /// Resolved attributes, in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &[ResolvedAttribute] {
        &self.attributes
    }

    /// Total bytes per vertex record.
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Stride as the `i32` GL expects.
    #[must_use]
    pub fn gl_stride(&self) -> i32 {
        gl_int(self.stride)
    }
}

/// A linked shader program with its resolved vertex layout.
///
/// Owns the device program object and its attachment records, not the
/// attached [`ShaderUnit`]s: units may be dropped once [`link`](Self::link)
/// has returned.
pub struct PipelineProgram<D: Device> {
    device: Rc<D>,
    handle: D::Program,
    declared: Vec<AttributeDescriptor>,
    attached: Vec<D::Shader>,
    layout: Option<VertexLayout>,
    bound: Cell<bool>,
}

impl<D: Device> PipelineProgram<D> {
    /// Create an unlinked program for vertex records described by
    /// `attributes`, in field order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Link`] if the device cannot create the program.
    pub fn new(device: Rc<D>, attributes: Vec<AttributeDescriptor>) -> Result<Self> {
        let handle = device.create_program().map_err(Error::Link)?;
        log::trace!("created program {handle:?}");
        Ok(Self {
            device,
            handle,
            declared: attributes,
            attached: Vec::new(),
            layout: None,
            bound: Cell::new(false),
        })
    }

    /// Compile a vertex/fragment pair from source, attach, and link.
    ///
    /// The compiled shader objects are released before returning, so only
    /// the program owns device state.
    ///
    /// # Errors
    ///
    /// Returns the first [`Error::Compile`], [`Error::Link`] or
    /// [`Error::AttributeResolution`] encountered.
    pub fn from_sources(
        device: &Rc<D>,
        attributes: Vec<AttributeDescriptor>,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Self> {
        let mut vertex = ShaderUnit::from_source(Rc::clone(device), ShaderStage::Vertex, vertex_src)?;
        vertex.compile()?;
        let mut fragment =
            ShaderUnit::from_source(Rc::clone(device), ShaderStage::Fragment, fragment_src)?;
        fragment.compile()?;

        let mut program = Self::new(Rc::clone(device), attributes)?;
        program.attach(&vertex);
        program.attach(&fragment);
        program.link()?;
        Ok(program)
    }

    /// Record `unit` as a link input. No validation happens here; a unit
    /// that failed to compile makes [`link`](Self::link) fail.
    pub fn attach(&mut self, unit: &ShaderUnit<D>) {
        self.device.attach_shader(self.handle, unit.handle());
        self.attached.push(unit.handle());
    }

    /// Link the attached units and resolve the vertex layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Link`] with the linker log if the device rejects
    /// the program, or [`Error::AttributeResolution`] naming the first
    /// declared attribute the linked program does not expose. Either way
    /// the program stays unlinked.
    ///
    /// Re-linking a bound program disables the old layout's arrays; the next
    /// [`bind`](Self::bind) enables the new ones.
    pub fn link(&mut self) -> Result<()> {
        if self.bound.replace(false) {
            for attribute in self.resolved() {
                self.device.disable_vertex_attrib_array(attribute.location);
            }
        }
        self.layout = None;
        self.device.link_program(self.handle);

        if !self.device.program_link_status(self.handle) {
            let log = self.device.program_info_log(self.handle);
            log::error!("Could not link shader program:\n{log}");
            return Err(Error::Link(log));
        }

        let device = &self.device;
        let handle = self.handle;
        let layout = VertexLayout::resolve(&self.declared, |name| {
            device.attrib_location(handle, name)
        })?;

        // Linked code no longer needs the shader objects.
        for shader in self.attached.drain(..) {
            self.device.detach_shader(self.handle, shader);
        }

        log::debug!(
            "linked program {:?}: {} attributes, stride {}",
            self.handle,
            layout.attributes().len(),
            layout.stride()
        );
        self.layout = Some(layout);
        Ok(())
    }

    /// The resolved layout, or `None` before a successful link.
    #[must_use]
    pub fn layout(&self) -> Option<&VertexLayout> {
        self.layout.as_ref()
    }

    /// Whether [`link`](Self::link) succeeded.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.layout.is_some()
    }

    /// The declared attributes, in order.
    #[must_use]
    pub fn declared_attributes(&self) -> &[AttributeDescriptor] {
        &self.declared
    }

    /// Make this program current and enable its attribute arrays.
    ///
    /// Binding an already-bound program re-selects it without enabling the
    /// arrays a second time.
    pub fn bind(&self) {
        self.device.use_program(Some(self.handle));
        if self.bound.replace(true) {
            return;
        }
        for attribute in self.resolved() {
            self.device.enable_vertex_attrib_array(attribute.location);
        }
    }

    /// Disable the attribute arrays and clear the current program.
    pub fn unbind(&self) {
        for attribute in self.resolved() {
            self.device.disable_vertex_attrib_array(attribute.location);
        }
        self.device.use_program(None);
        self.bound.set(false);
    }

    /// Look up the uniform `name`.
    ///
    /// Returns `None` (and logs) if the linked program has no such active
    /// uniform; passing `None` to [`set_uniform`](Self::set_uniform) is a
    /// no-op.
    #[must_use]
    pub fn uniform_location(&self, name: &str) -> Option<D::UniformLocation> {
        let location = self.device.uniform_location(self.handle, name);
        if location.is_none() {
            log::error!("Could not find uniform named \"{name}\" in shader program.");
        }
        location
    }

    /// Write `value` to `location` of the current program.
    ///
    /// Array uniforms take slices, arrays or `Vec`s; an empty sequence writes
    /// nothing.
    pub fn set_uniform<V: UniformValue + ?Sized>(&self, location: Option<&D::UniformLocation>, value: &V) {
        let data = value.uniform_data();
        if data.is_empty() {
            log::debug!("skipping empty uniform array write to {location:?}");
            return;
        }
        self.device.set_uniform(location, data);
    }

    fn resolved(&self) -> &[ResolvedAttribute] {
        self.layout
            .as_ref()
            .map(VertexLayout::attributes)
            .unwrap_or_default()
    }
}

impl<D: Device> Drop for PipelineProgram<D> {
    fn drop(&mut self) {
        self.device.delete_program(self.handle);
    }
}
