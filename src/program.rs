//! GLSL programs.

use crate::resource::{Name, Resource};
use std::{cmp, fmt, hash, sync};

/// A shader program.
///
/// Link status and interface introspection are queried through the
/// render context that created the program.
#[derive(Clone)]
pub struct Program {
    /// Deletes the program on the owning display upon destruction.
    resource: sync::Arc<Resource>,
}

impl Program {
    /// Wraps a freshly created resource record.
    pub(crate) fn new(resource: Resource) -> Self {
        Self {
            resource: sync::Arc::new(resource),
        }
    }

    /// Returns the OpenGL program name.
    pub fn name(&self) -> Name {
        self.resource.name()
    }

    /// Returns the id of the owning display.
    pub(crate) fn display(&self) -> usize {
        self.resource.display()
    }
}

impl cmp::Eq for Program {}

impl cmp::PartialEq<Self> for Program {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && self.display() == other.display()
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        #[derive(Debug)]
        struct Program(u32);

        Program(self.name()).fmt(f)
    }
}

impl hash::Hash for Program {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.display().hash(state);
        self.name().hash(state)
    }
}
