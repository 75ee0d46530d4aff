//! Context options passed to `wglCreateContextAttribsARB`.

use crate::properties::{Key, Properties, Value};
use crate::wgl;

/// Requested properties of a render context.
pub type ContextOptions = Properties<ContextKey>;

/// Context option keys.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ContextKey {
    /// `i32` major version.
    MajorVersion,

    /// `i32` minor version.
    MinorVersion,

    /// `i32` layer plane.
    LayerPlane,

    /// [`ContextFlags`].
    Flags,

    /// [`ProfileMask`].
    ProfileMask,
}

impl Key for ContextKey {
    const ALL: &'static [Self] = &[
        ContextKey::MajorVersion,
        ContextKey::MinorVersion,
        ContextKey::LayerPlane,
        ContextKey::Flags,
        ContextKey::ProfileMask,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn token(self) -> i32 {
        let token = match self {
            ContextKey::MajorVersion => wgl::CONTEXT_MAJOR_VERSION_ARB,
            ContextKey::MinorVersion => wgl::CONTEXT_MINOR_VERSION_ARB,
            ContextKey::LayerPlane => wgl::CONTEXT_LAYER_PLANE_ARB,
            ContextKey::Flags => wgl::CONTEXT_FLAGS_ARB,
            ContextKey::ProfileMask => wgl::CONTEXT_PROFILE_MASK_ARB,
        };
        token as i32
    }

    fn encode(self, value: i32, list: &mut Vec<i32>) {
        if self != ContextKey::Flags {
            list.push(self.token());
            list.push(value);
            return;
        }
        // No-error is requested through its own attribute.
        let flags = ContextFlags::from_bits_truncate(value as u32);
        let bits = flags - ContextFlags::NO_ERROR;
        if !bits.is_empty() {
            list.push(self.token());
            list.push(bits.bits() as i32);
        }
        if flags.contains(ContextFlags::NO_ERROR) {
            list.push(wgl::CONTEXT_OPENGL_NO_ERROR_ARB as i32);
            list.push(1);
        }
    }
}

bitflags! {
    /// Context creation flags.
    pub struct ContextFlags: u32 {
        /// `WGL_CONTEXT_DEBUG_BIT_ARB`.
        const DEBUG = 0x1;

        /// `WGL_CONTEXT_FORWARD_COMPATIBLE_BIT_ARB`.
        const FORWARD_COMPATIBLE = 0x2;

        /// `WGL_CONTEXT_ROBUST_ACCESS_BIT_ARB`.
        const ROBUST_ACCESS = 0x4;

        /// Materialised as `WGL_CONTEXT_OPENGL_NO_ERROR_ARB`.
        const NO_ERROR = 0x8;
    }
}

bitflags! {
    /// Context profile mask.
    pub struct ProfileMask: u32 {
        /// `WGL_CONTEXT_CORE_PROFILE_BIT_ARB`.
        const CORE = 0x1;

        /// `WGL_CONTEXT_COMPATIBILITY_PROFILE_BIT_ARB`.
        const COMPATIBILITY = 0x2;

        /// `WGL_CONTEXT_ES2_PROFILE_BIT_EXT`.
        const ES = 0x4;
    }
}

impl Value for ContextFlags {
    fn to_raw(self) -> i32 {
        self.bits() as i32
    }

    fn from_raw(raw: i32) -> Option<Self> {
        Self::from_bits(raw as u32)
    }
}

impl Value for ProfileMask {
    fn to_raw(self) -> i32 {
        self.bits() as i32
    }

    fn from_raw(raw: i32) -> Option<Self> {
        Self::from_bits(raw as u32)
    }
}

impl Properties<ContextKey> {
    /// Options requesting version `major.minor`.
    pub fn version(major: i32, minor: i32) -> Self {
        Self::new()
            .with(ContextKey::MajorVersion, major)
            .with(ContextKey::MinorVersion, minor)
    }

    /// A copy with any requested version removed.
    pub fn without_version(&self) -> Self {
        self.clone()
            .without(ContextKey::MajorVersion)
            .without(ContextKey::MinorVersion)
    }
}
