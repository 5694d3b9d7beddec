//! Small value types shared across the crate.

use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::{Pod, Zeroable};

/// Opaque handle of the host-owned OS window (the windowing library's window
/// pointer, as an integer).
///
/// The adapter only ever hands this value around; it never creates or
/// destroys the window it names.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub usize);

/// Opaque handle of an OS cursor created by the windowing library.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CursorHandle(pub u64);

/// A size in physical pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a size from unsigned dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Convert the signed size reported by the windowing library.
    ///
    /// Negative values (which some platforms report transiently) clamp to 0.
    #[must_use]
    pub fn from_os(width: i32, height: i32) -> Self {
        Self {
            width: u32::try_from(width).unwrap_or(0),
            height: u32::try_from(height).unwrap_or(0),
        }
    }

    /// Whether either dimension is zero, e.g. for an iconified window.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The size as the `(width, height)` pair of `i32` GL expects.
    #[must_use]
    pub fn to_gl(self) -> (i32, i32) {
        (gl_size(self.width), gl_size(self.height))
    }

    const fn pack(self) -> u64 {
        ((self.width as u64) << 32) | self.height as u64
    }

    #[expect(clippy::cast_possible_truncation)]
    const fn unpack(bits: u64) -> Self {
        Self {
            width: (bits >> 32) as u32,
            height: bits as u32,
        }
    }
}

/// Latest-wins cell for a [`Size`] written on one thread and read on others.
///
/// Both halves live in one atomic word, so a reader may see a stale size but
/// never a width from one write paired with a height from another.
#[derive(Debug, Default)]
pub struct SizeCell(AtomicU64);

impl SizeCell {
    /// Create a cell holding `size`.
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self(AtomicU64::new(size.pack()))
    }

    /// Read the latest size.
    pub fn load(&self) -> Size {
        Size::unpack(self.0.load(Ordering::Acquire))
    }

    /// Store `size`, returning the previous value.
    pub fn swap(&self, size: Size) -> Size {
        Size::unpack(self.0.swap(size.pack(), Ordering::AcqRel))
    }
}

/// A vertex of the composite quad, ready for the GPU.
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
#[repr(C)]
pub struct QuadVertex {
    /// Clip-space position.
    pub position: [f32; 2],
    /// Texture coordinate into the offscreen color texture.
    pub uv: [f32; 2],
}

/// A full-screen quad as a four-vertex triangle strip.
///
/// GL textures and the default framebuffer share a bottom-left origin, so
/// the texture coordinates map straight across without a flip.
pub const FULLSCREEN_QUAD: [QuadVertex; 4] = [
    QuadVertex {
        position: [-1.0, -1.0],
        uv: [0.0, 0.0],
    },
    QuadVertex {
        position: [1.0, -1.0],
        uv: [1.0, 0.0],
    },
    QuadVertex {
        position: [-1.0, 1.0],
        uv: [0.0, 1.0],
    },
    QuadVertex {
        position: [1.0, 1.0],
        uv: [1.0, 1.0],
    },
];

/// Convert a `u32` to `i32` for GL API calls, saturating at `i32::MAX`.
///
/// Window sizes never get near the limit; saturation just keeps the
/// conversion total.
pub(crate) fn gl_size(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_os_sizes_clamp_to_zero() {
        assert_eq!(Size::from_os(-4, 600), Size::new(0, 600));
        assert!(Size::from_os(800, 0).is_empty());
        assert!(!Size::from_os(800, 600).is_empty());
    }

    #[test]
    fn size_cell_keeps_both_halves_together() {
        let cell = SizeCell::new(Size::new(800, 600));
        assert_eq!(cell.swap(Size::new(u32::MAX, 1)), Size::new(800, 600));
        assert_eq!(cell.load(), Size::new(u32::MAX, 1));
    }

    #[test]
    fn gl_size_saturates() {
        assert_eq!(gl_size(1024), 1024);
        assert_eq!(gl_size(u32::MAX), i32::MAX);
    }

    #[test]
    fn quad_vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<QuadVertex>(), 16);
        assert_eq!(bytemuck::cast_slice::<_, u8>(&FULLSCREEN_QUAD).len(), 64);
    }
}
