//! Declarative vertex attribute descriptors.

use crate::error::{Error, Result};

/// Scalar element type of a vertex attribute.
///
/// Each variant maps onto the matching GL type enum via
/// [`gl_type`](Self::gl_type).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// `GL_BYTE`
    Int8,
    /// `GL_UNSIGNED_BYTE`
    UInt8,
    /// `GL_SHORT`
    Int16,
    /// `GL_UNSIGNED_SHORT`
    UInt16,
    /// `GL_INT`
    Int32,
    /// `GL_UNSIGNED_INT`
    UInt32,
    /// `GL_FLOAT`
    Float32,
}

impl ElementType {
    /// Size of one element in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
        }
    }

    /// The GL type enum passed to `glVertexAttribPointer`.
    #[must_use]
    pub const fn gl_type(self) -> u32 {
        match self {
            Self::Int8 => glow::BYTE,
            Self::UInt8 => glow::UNSIGNED_BYTE,
            Self::Int16 => glow::SHORT,
            Self::UInt16 => glow::UNSIGNED_SHORT,
            Self::Int32 => glow::INT,
            Self::UInt32 => glow::UNSIGNED_INT,
            Self::Float32 => glow::FLOAT,
        }
    }
}

/// One named per-vertex input channel.
///
/// The ordered list of descriptors handed to a
/// [`PipelineProgram`](crate::PipelineProgram) must match the field order of
/// the host vertex struct uploaded later: the layout is packed left to right
/// with no padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeDescriptor {
    name: String,
    element_type: ElementType,
    count: u8,
    normalized: bool,
}

impl AttributeDescriptor {
    /// Describe an attribute of `count` elements (1 to 4) of `element_type`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAttribute`] if `count` is outside `1..=4` or
    /// the name is empty.
    pub fn new(name: impl Into<String>, element_type: ElementType, count: u8) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidAttribute {
                name,
                reason: "attribute name is empty".to_owned(),
            });
        }
        if !(1..=4).contains(&count) {
            return Err(Error::InvalidAttribute {
                name,
                reason: format!("element count {count} is outside 1..=4"),
            });
        }
        Ok(Self {
            name,
            element_type,
            count,
            normalized: false,
        })
    }

    /// Shorthand for a `Float32` attribute with `count` components.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn float(name: impl Into<String>, count: u8) -> Result<Self> {
        Self::new(name, ElementType::Float32, count)
    }

    /// Map integer values to `[0, 1]` (unsigned) or `[-1, 1]` (signed) when
    /// the vertex stage reads them.
    #[must_use]
    pub fn normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    /// Name the vertex stage declares this input under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scalar element type.
    #[must_use]
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Number of elements, 1 to 4.
    #[must_use]
    pub fn count(&self) -> u8 {
        self.count
    }

    /// Whether integer values are normalized.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Bytes this attribute occupies in one vertex record. Always positive.
    #[must_use]
    pub fn byte_width(&self) -> usize {
        usize::from(self.count) * self.element_type.size()
    }
}
