//! Typed uniform values.
//!
//! [`UniformValue`] turns a host value into the [`UniformData`] payload the
//! device writes. Scalars, `glam` vectors and matrices are supported, along
//! with slices, arrays and `Vec`s of each for array uniforms.

use glam::{IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::device::UniformData;

/// A value that can be written to a uniform location.
pub trait UniformValue {
    /// Borrow the value as a device uniform payload.
    fn uniform_data(&self) -> UniformData<'_>;
}

macro_rules! impl_uniform {
    ($variant:ident { $field:ident: $n:expr }, $($ty:ty),+) => {
        $(
            impl UniformValue for $ty {
                fn uniform_data(&self) -> UniformData<'_> {
                    UniformData::$variant {
                        $field: $n,
                        values: bytemuck::cast_slice(std::slice::from_ref(self)),
                    }
                }
            }

            impl UniformValue for [$ty] {
                fn uniform_data(&self) -> UniformData<'_> {
                    UniformData::$variant {
                        $field: $n,
                        values: bytemuck::cast_slice(self),
                    }
                }
            }
        )+
    };
}

impl_uniform!(Float { components: 1 }, f32);
impl_uniform!(Float { components: 2 }, Vec2);
impl_uniform!(Float { components: 3 }, Vec3);
impl_uniform!(Float { components: 4 }, Vec4);
impl_uniform!(Int { components: 1 }, i32);
impl_uniform!(Int { components: 2 }, IVec2);
impl_uniform!(Int { components: 3 }, IVec3);
impl_uniform!(Int { components: 4 }, IVec4);
impl_uniform!(Matrix { dim: 2 }, Mat2);
impl_uniform!(Matrix { dim: 3 }, Mat3);
impl_uniform!(Matrix { dim: 4 }, Mat4);

impl<T> UniformValue for Vec<T>
where
    [T]: UniformValue,
{
    fn uniform_data(&self) -> UniformData<'_> {
        self.as_slice().uniform_data()
    }
}

impl<T, const N: usize> UniformValue for [T; N]
where
    [T]: UniformValue,
{
    fn uniform_data(&self) -> UniformData<'_> {
        self.as_slice().uniform_data()
    }
}
