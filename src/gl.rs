//! OpenGL 3.3 core bindings generated from the Khronos registry.
//!
//! Only the enumeration constants, the type aliases, and the raw
//! [`Gl`] function table live here. Calls are made through the guarded
//! command sets in [`commands`](../commands/index.html).

#![allow(missing_docs, clippy::all)]

include!(concat!(env!("OUT_DIR"), "/gl_bindings.rs"));
