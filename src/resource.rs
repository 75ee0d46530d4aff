//! The record shared by every handle to a GL-named object.

use crate::queue;
use std::{fmt, ops};

/// GL object name type.
pub type Name = u32;

/// The kind of GL-named object.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    /// Deleted with `glDeleteShader`.
    Shader,

    /// Deleted with `glDeleteProgram`.
    Program,

    /// Deleted with `glDeleteBuffers`.
    Buffer,

    /// Deleted with `glDeleteVertexArrays`.
    VertexArray,
}

/// A GL object whose last handle was dropped.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Garbage {
    /// What to delete.
    pub kind: Kind,

    /// The GL object name.
    pub name: Name,

    /// The render context whose namespace `name` lives in, for objects
    /// that are not shared between contexts.
    pub context: Option<usize>,
}

/// Binds a GL name to the display that owns it.
///
/// Dropping the record schedules the delete call on the display's
/// garbage queue.
pub(crate) struct Resource {
    /// Identifies the owning display.
    display: usize,

    /// The GL object name.
    name: Name,

    /// The kind of object.
    kind: Kind,

    /// Set for container objects, which live in one context only.
    context: Option<usize>,

    /// Returns the name to the display upon destruction.
    tx: queue::Sender<Garbage>,
}

impl Resource {
    /// Constructor.
    pub(crate) fn new(
        display: usize,
        name: Name,
        kind: Kind,
        tx: queue::Sender<Garbage>,
    ) -> Self {
        Self { display, name, kind, context: None, tx }
    }

    /// Ties the record to the render context that created the object.
    pub(crate) fn owned_by(mut self, context: usize) -> Self {
        self.context = Some(context);
        self
    }

    /// Returns the owning display id.
    pub(crate) fn display(&self) -> usize {
        self.display
    }

    /// Returns the GL object name.
    pub(crate) fn name(&self) -> Name {
        self.name
    }

    /// Returns the owning render context id, if the object is not shared.
    pub(crate) fn context(&self) -> Option<usize> {
        self.context
    }
}

impl ops::Drop for Resource {
    fn drop(&mut self) {
        let garbage = Garbage { kind: self.kind, name: self.name, context: self.context };
        if self.tx.send(garbage).is_err() {
            // The display is gone, and its contexts with it.
            trace!(target: "glctx::resource", "dropped {:?} after its display", garbage);
        }
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Resource")
            .field("display", &self.display)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("context", &self.context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::Queue;

    #[test]
    fn dropping_the_record_queues_a_delete() {
        let queue = Queue::new();
        let resource = Resource::new(1, 7, Kind::Buffer, queue.tx());
        assert_eq!(resource.name(), 7);
        assert!(queue.is_empty());
        drop(resource);
        assert_eq!(queue.next(), Some(Garbage { kind: Kind::Buffer, name: 7, context: None }));
    }

    #[test]
    fn container_objects_remember_their_context() {
        let queue = Queue::new();
        let resource = Resource::new(1, 1, Kind::VertexArray, queue.tx()).owned_by(4);
        assert_eq!(resource.context(), Some(4));
        drop(resource);
        let garbage = queue.next().unwrap();
        assert_eq!(garbage.kind, Kind::VertexArray);
        assert_eq!(garbage.context, Some(4));
    }

    #[test]
    fn dropping_after_the_queue_is_gone_is_harmless() {
        let queue = Queue::new();
        let resource = Resource::new(1, 3, Kind::Shader, queue.tx());
        drop(queue);
        drop(resource);
    }
}
