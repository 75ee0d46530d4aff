//! Vertex array objects.

use crate::buffer::{IndexBuffer, VertexBuffer};
use crate::resource::{Name, Resource};
use std::{cmp, fmt, hash, sync};

/// Corresponds to an OpenGL vertex array object.
///
/// Keeps the buffers it was set up with alive. Vertex arrays are not
/// shared between contexts; one may only be used with the render context
/// that created it.
#[derive(Clone)]
pub struct VertexArray {
    /// Deletes the VAO on the owning display upon destruction.
    resource: sync::Arc<Resource>,

    /// Vertex buffers whose schemas were bound to attribute locations.
    vertices: Vec<VertexBuffer>,

    /// Draw sequence indices bound as the element array buffer.
    indices: Option<IndexBuffer>,
}

impl VertexArray {
    /// Constructor.
    pub(crate) fn new(
        resource: Resource,
        vertices: Vec<VertexBuffer>,
        indices: Option<IndexBuffer>,
    ) -> Self {
        Self {
            resource: sync::Arc::new(resource),
            vertices,
            indices,
        }
    }

    /// Returns the OpenGL VAO name.
    pub fn name(&self) -> Name {
        self.resource.name()
    }

    /// Returns the id of the owning display.
    pub(crate) fn display(&self) -> usize {
        self.resource.display()
    }

    /// Returns the id of the render context that created the VAO.
    pub(crate) fn context(&self) -> Option<usize> {
        self.resource.context()
    }

    /// Returns the vertex buffers.
    pub fn vertices(&self) -> &[VertexBuffer] {
        &self.vertices
    }

    /// Returns the index buffer.
    pub fn indices(&self) -> Option<&IndexBuffer> {
        self.indices.as_ref()
    }
}

impl cmp::Eq for VertexArray {}

impl cmp::PartialEq<Self> for VertexArray {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.display() == other.display()
            && self.context() == other.context()
    }
}

impl fmt::Debug for VertexArray {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        #[derive(Debug)]
        struct VertexArray<'a> {
            name: u32,
            vertices: &'a [VertexBuffer],
            indices: Option<&'a IndexBuffer>,
        }

        VertexArray {
            name: self.name(),
            vertices: &self.vertices,
            indices: self.indices.as_ref(),
        }.fmt(f)
    }
}

impl hash::Hash for VertexArray {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.display().hash(state);
        self.context().hash(state);
        self.name().hash(state)
    }
}
