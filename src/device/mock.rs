//! Recording [`Device`] used by unit tests.
//!
//! The mock simulates just enough of a GL driver to exercise the wrappers:
//! shaders "compile" unless their source is empty or contains `#error`,
//! programs "link" when every attached shader compiled and a vertex stage is
//! present, and the linker assigns attribute locations from the vertex
//! stage's `in`/`attribute` declarations in source order. Every object is
//! tracked so tests can assert nothing leaked.

use std::cell::{Ref, RefCell};
use std::collections::{BTreeSet, HashMap};

use super::{Device, UniformData};

#[derive(Debug)]
pub(crate) struct MockShader {
    pub stage: u32,
    pub source: String,
    pub compiled: bool,
}

#[derive(Debug, Default)]
pub(crate) struct MockProgram {
    pub attached: Vec<u32>,
    pub linked: bool,
    pub log: String,
    pub attributes: Vec<String>,
    pub uniforms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AttribPointer {
    pub location: u32,
    pub count: i32,
    pub gl_type: u32,
    pub normalized: bool,
    pub stride: i32,
    pub offset: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum UniformWrite {
    Float(u8, Vec<f32>),
    Int(u8, Vec<i32>),
    Matrix(u8, Vec<f32>),
}

#[derive(Debug, Default)]
pub(crate) struct MockTexture {
    pub width: i32,
    pub height: i32,
    pub pixels: Vec<u8>,
    pub parameters: HashMap<u32, i32>,
}

#[derive(Debug, Default)]
pub(crate) struct MockState {
    next_id: u32,
    pub fail_object_creation: bool,
    pub shaders: HashMap<u32, MockShader>,
    pub programs: HashMap<u32, MockProgram>,
    pub buffers: HashMap<u32, Vec<u8>>,
    pub buffer_usage: HashMap<u32, u32>,
    pub textures: HashMap<u32, MockTexture>,
    pub vertex_arrays: BTreeSet<u32>,
    pub current_program: Option<u32>,
    pub bound_array_buffer: Option<u32>,
    pub bound_vertex_array: Option<u32>,
    pub active_unit: u32,
    pub unit_textures: HashMap<u32, Option<u32>>,
    pub enabled_arrays: BTreeSet<u32>,
    pub enable_calls: usize,
    pub attrib_pointers: Vec<AttribPointer>,
    pub uniform_writes: Vec<(u32, UniformWrite)>,
    pub viewport: [i32; 4],
    pub clear_color: [f32; 4],
    pub clears: Vec<u32>,
}

impl MockState {
    fn allocate(&mut self) -> Result<u32, String> {
        if self.fail_object_creation {
            return Err("out of device memory".to_owned());
        }
        self.next_id += 1;
        Ok(self.next_id)
    }

    /// Objects of any kind that have been created and not deleted.
    pub fn live_objects(&self) -> usize {
        self.shaders.len()
            + self.programs.len()
            + self.buffers.len()
            + self.textures.len()
            + self.vertex_arrays.len()
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockDevice {
    state: RefCell<MockState>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Ref<'_, MockState> {
        self.state.borrow()
    }

    pub fn set_fail_object_creation(&self, fail: bool) {
        self.state.borrow_mut().fail_object_creation = fail;
    }
}

/// Names declared by `keyword <type> <name>;` lines, in source order.
fn declarations(source: &str, keywords: &[&str]) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let line = line.trim().trim_end_matches(';');
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                [keyword, _ty, name] if keywords.contains(keyword) => {
                    Some(name.trim_end_matches(';').to_owned())
                }
                _ => None,
            }
        })
        .collect()
}

impl Device for MockDevice {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type Texture = u32;
    type VertexArray = u32;
    type UniformLocation = u32;

    fn create_shader(&self, stage: u32) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate()?;
        state.shaders.insert(
            id,
            MockShader {
                stage,
                source: String::new(),
                compiled: false,
            },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.source = source.to_owned();
        }
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.compiled = !s.source.trim().is_empty() && !s.source.contains("#error");
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        match self.state.borrow().shaders.get(&shader) {
            Some(s) if !s.compiled => "0:1(1): error: #error directive".to_owned(),
            _ => String::new(),
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate()?;
        state.programs.insert(id, MockProgram::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.retain(|&s| s != shader);
        }
    }

    fn link_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        let Some(p) = state.programs.get_mut(&program) else {
            return;
        };
        let shaders: Vec<&MockShader> = p
            .attached
            .iter()
            .filter_map(|id| state.shaders.get(id))
            .collect();

        if shaders.is_empty() || shaders.len() != p.attached.len() {
            p.linked = false;
            p.log = "error: no valid shaders attached".to_owned();
            return;
        }
        if shaders.iter().any(|s| !s.compiled) {
            p.linked = false;
            p.log = "error: attached shader is not compiled".to_owned();
            return;
        }
        let Some(vertex) = shaders.iter().find(|s| s.stage == glow::VERTEX_SHADER) else {
            p.linked = false;
            p.log = "error: program lacks a vertex shader".to_owned();
            return;
        };

        p.attributes = declarations(&vertex.source, &["in", "attribute"]);
        p.uniforms = shaders
            .iter()
            .flat_map(|s| declarations(&s.source, &["uniform"]))
            .collect();
        p.linked = true;
        p.log.clear();
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: u32) {
        self.state.borrow_mut().programs.remove(&program);
    }

    fn use_program(&self, program: Option<u32>) {
        self.state.borrow_mut().current_program = program;
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        let p = state.programs.get(&program).filter(|p| p.linked)?;
        let index = p.attributes.iter().position(|a| a == name)?;
        u32::try_from(index).ok()
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        let p = state.programs.get(&program).filter(|p| p.linked)?;
        let index = p.uniforms.iter().position(|u| u == name)?;
        u32::try_from(index).ok()
    }

    fn set_uniform(&self, location: Option<&u32>, data: UniformData<'_>) {
        let Some(&location) = location else {
            return;
        };
        let write = match data {
            UniformData::Float { components, values } => UniformWrite::Float(components, values.to_vec()),
            UniformData::Int { components, values } => UniformWrite::Int(components, values.to_vec()),
            UniformData::Matrix { dim, values } => UniformWrite::Matrix(dim, values.to_vec()),
        };
        self.state.borrow_mut().uniform_writes.push((location, write));
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        let mut state = self.state.borrow_mut();
        state.enable_calls += 1;
        state.enabled_arrays.insert(location);
    }

    fn disable_vertex_attrib_array(&self, location: u32) {
        self.state.borrow_mut().enabled_arrays.remove(&location);
    }

    fn vertex_attrib_pointer(
        &self,
        location: u32,
        count: i32,
        gl_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        self.state.borrow_mut().attrib_pointers.push(AttribPointer {
            location,
            count,
            gl_type,
            normalized,
            stride,
            offset,
        });
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate()?;
        state.buffers.insert(id, Vec::new());
        Ok(id)
    }

    fn bind_array_buffer(&self, buffer: Option<u32>) {
        self.state.borrow_mut().bound_array_buffer = buffer;
    }

    fn array_buffer_data(&self, data: &[u8], usage: u32) {
        let mut state = self.state.borrow_mut();
        if let Some(id) = state.bound_array_buffer {
            state.buffers.insert(id, data.to_vec());
            state.buffer_usage.insert(id, usage);
        }
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut state = self.state.borrow_mut();
        state.buffers.remove(&buffer);
        if state.bound_array_buffer == Some(buffer) {
            state.bound_array_buffer = None;
        }
    }

    fn create_texture(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate()?;
        state.textures.insert(id, MockTexture::default());
        Ok(id)
    }

    fn active_texture(&self, unit: u32) {
        self.state.borrow_mut().active_unit = unit;
    }

    fn bind_texture_2d(&self, texture: Option<u32>) {
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit;
        state.unit_textures.insert(unit, texture);
    }

    fn tex_image_2d_rgba8(&self, width: i32, height: i32, pixels: &[u8]) {
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit;
        if let Some(Some(id)) = state.unit_textures.get(&unit).copied() {
            if let Some(t) = state.textures.get_mut(&id) {
                t.width = width;
                t.height = height;
                t.pixels = pixels.to_vec();
            }
        }
    }

    fn tex_parameter_2d(&self, parameter: u32, value: i32) {
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit;
        if let Some(Some(id)) = state.unit_textures.get(&unit).copied() {
            if let Some(t) = state.textures.get_mut(&id) {
                t.parameters.insert(parameter, value);
            }
        }
    }

    fn delete_texture(&self, texture: u32) {
        let mut state = self.state.borrow_mut();
        state.textures.remove(&texture);
        for bound in state.unit_textures.values_mut() {
            if *bound == Some(texture) {
                *bound = None;
            }
        }
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate()?;
        state.vertex_arrays.insert(id);
        Ok(id)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.state.borrow_mut().bound_vertex_array = vertex_array;
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        let mut state = self.state.borrow_mut();
        state.vertex_arrays.remove(&vertex_array);
        if state.bound_vertex_array == Some(vertex_array) {
            state.bound_vertex_array = None;
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.state.borrow_mut().viewport = [x, y, width, height];
    }

    fn clear_color(&self, color: [f32; 4]) {
        self.state.borrow_mut().clear_color = color;
    }

    fn clear(&self, mask: u32) {
        self.state.borrow_mut().clears.push(mask);
    }
}
