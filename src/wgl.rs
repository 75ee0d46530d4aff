//! WGL bindings generated from the Khronos registry.
//!
//! Provides the `WGL_ARB_*` / `WGL_EXT_*` tokens consumed by the display
//! format and context option property bags, and the raw [`Wgl`] table the
//! WGL extension command sets are resolved into.

#![allow(missing_docs, clippy::all)]

include!(concat!(env!("OUT_DIR"), "/wgl_bindings.rs"));
