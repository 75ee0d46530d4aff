//! GLSL shader objects.

use crate::gl;
use crate::resource::{Name, Resource};
use std::{cmp, fmt, hash, sync};

/// The pipeline stage a shader is compiled for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Stage {
    /// Corresponds to `GL_VERTEX_SHADER`.
    Vertex,

    /// Corresponds to `GL_GEOMETRY_SHADER`.
    Geometry,

    /// Corresponds to `GL_FRAGMENT_SHADER`.
    Fragment,
}

impl Stage {
    /// Returns the equivalent OpenGL enumeration constant.
    pub fn as_gl_enum(self) -> u32 {
        match self {
            Stage::Vertex => gl::VERTEX_SHADER,
            Stage::Geometry => gl::GEOMETRY_SHADER,
            Stage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

/// A compiled shader object.
#[derive(Clone)]
pub struct Shader {
    /// Deletes the shader on the owning display upon destruction.
    resource: sync::Arc<Resource>,

    /// The stage the shader was compiled for.
    stage: Stage,
}

impl Shader {
    /// Wraps a freshly created resource record.
    pub(crate) fn new(resource: Resource, stage: Stage) -> Self {
        Self {
            resource: sync::Arc::new(resource),
            stage,
        }
    }

    /// Returns the OpenGL shader name.
    pub fn name(&self) -> Name {
        self.resource.name()
    }

    /// Returns the id of the owning display.
    pub(crate) fn display(&self) -> usize {
        self.resource.display()
    }

    /// Returns the pipeline stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }
}

impl cmp::Eq for Shader {}

impl cmp::PartialEq<Self> for Shader {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && self.display() == other.display()
    }
}

impl fmt::Debug for Shader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        #[derive(Debug)]
        struct Shader(u32, Stage);

        Shader(self.name(), self.stage).fmt(f)
    }
}

impl hash::Hash for Shader {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.display().hash(state);
        self.name().hash(state);
    }
}
