//! Shared machinery of the command sets.
//!
//! A command set is a table of resolved entry points for one logical
//! group of the API plus a [`Guard`] that every call is routed through.
//! Extension command sets additionally carry a [`Presence`] record.

use crate::error::{Error, Result};
use crate::resolver::{ErrorReporter, Resolver};
use fnv::FnvHashSet;
use std::{fmt, ptr};
use std::os::raw::c_void;

/// Upper bound on the error codes drained after a single call.
///
/// Some drivers keep reporting an error when no context is current;
/// the bound keeps the drain loop finite.
pub const MAX_DRAINED_ERRORS: usize = 32;

/// Resolution state of a command set.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum State {
    /// Every pointer is null; every call fails with unsupported.
    Unresolved,

    /// Pointers were populated from a resolver.
    Resolved,
}

impl Default for State {
    fn default() -> Self {
        State::Unresolved
    }
}

/// A table of entry points for one logical group of the API.
pub trait CommandSet {
    /// Populates the table from `resolver`.
    ///
    /// The context the resolver answers for must be current on the
    /// calling thread. The resolved pointers are only valid while that
    /// context is current.
    fn resolve(&mut self, resolver: &dyn Resolver);

    /// Returns the resolution state.
    fn state(&self) -> State;

    /// Returns `true` once `resolve` has run.
    fn is_resolved(&self) -> bool {
        self.state() == State::Resolved
    }
}

/// A command set gated on a named extension.
pub trait ExtensionCommandSet: CommandSet {
    /// The extension string name, e.g. `WGL_ARB_create_context`.
    fn name(&self) -> &'static str;

    /// `true` iff the extension is advertised and its mandatory entry
    /// points resolved.
    fn is_present(&self) -> bool;
}

/// Pre-call and post-call bookkeeping shared by every entry point.
#[derive(Clone, Copy, Default)]
pub struct Guard {
    /// Drains the GL error state, if the command group reports there.
    reporter: Option<ErrorReporter>,
}

impl Guard {
    /// A guard that drains errors through `reporter` after each call.
    pub fn new(reporter: Option<ErrorReporter>) -> Self {
        Self { reporter }
    }

    /// A guard that never drains errors.
    ///
    /// Used by window-system command groups, which report failure
    /// through return values instead of the GL error state.
    pub fn unchecked() -> Self {
        Self { reporter: None }
    }

    /// Fails with unsupported when the entry point did not resolve.
    pub fn before(&self, command: &'static str, loaded: bool) -> Result<()> {
        if loaded {
            Ok(())
        } else {
            debug!(target: "gl", "{} is not loaded", command);
            Err(Error::Unsupported { command })
        }
    }

    /// Drains the accumulated error state after `command` was dispatched.
    ///
    /// A non-zero first code fails the call; the remaining codes are
    /// captured so the error state is left clean.
    pub fn after(&self, command: &'static str) -> Result<()> {
        let codes = self.drain();
        match codes.split_first() {
            None => Ok(()),
            Some((&code, pending)) => {
                for code in &codes {
                    error!(target: "gl", "{}: 0x{:x}", command, code);
                }
                Err(Error::Subsystem {
                    command,
                    code,
                    pending: pending.to_vec(),
                })
            }
        }
    }

    /// Fetches pending error codes until the reporter returns zero.
    pub fn drain(&self) -> Vec<u32> {
        let mut codes = Vec::new();
        if let Some(reporter) = self.reporter {
            while codes.len() < MAX_DRAINED_ERRORS {
                let code = unsafe { reporter() };
                if code == 0 {
                    break;
                }
                codes.push(code);
            }
        }
        codes
    }

    /// Returns `true` if this guard drains errors.
    pub fn is_checked(&self) -> bool {
        self.reporter.is_some()
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Guard").field("checked", &self.is_checked()).finish()
    }
}

/// Extension name plus the computed presence flag.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Presence {
    name: &'static str,
    present: bool,
}

impl Presence {
    /// An absent extension named `name`.
    pub fn new(name: &'static str) -> Self {
        Self { name, present: false }
    }

    /// Recomputes presence: advertised by `resolver` and every entry in
    /// `loaded` is true.
    pub fn update(&mut self, resolver: &dyn Resolver, loaded: &[bool]) {
        let advertised = resolver.is_extension_present(self.name);
        self.present = advertised && loaded.iter().all(|&x| x);
        if advertised && !self.present {
            warn!(
                target: "gl",
                "{} is advertised but its entry points did not resolve",
                self.name,
            );
        }
    }

    /// The extension name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The computed presence flag.
    pub fn is_present(&self) -> bool {
        self.present
    }
}

/// Names of the entry points that resolved non-null.
#[derive(Clone, Debug, Default)]
pub struct Loaded {
    names: FnvHashSet<&'static str>,
}

impl Loaded {
    /// Returns `true` if `name` resolved non-null.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Returns the number of resolved entry points.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if nothing resolved.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A loader for the generated tables that consults `resolver` for every
/// symbol, recording which ones resolved.
pub(crate) fn load_all<'a>(
    resolver: &'a dyn Resolver,
    loaded: &'a mut Loaded,
) -> impl FnMut(&'static str) -> *const c_void + 'a {
    move |symbol| {
        let address = resolver.resolve_entry_point(symbol);
        if !address.is_null() {
            loaded.names.insert(symbol);
        }
        address
    }
}

/// A loader for the generated tables that only consults `resolver` for
/// the symbols in `commands`; everything else stays null.
pub(crate) fn load_subset<'a>(
    resolver: &'a dyn Resolver,
    commands: &'static [&'static str],
) -> impl FnMut(&'static str) -> *const c_void + 'a {
    move |symbol| {
        if commands.contains(&symbol) {
            resolver.resolve_entry_point(symbol)
        } else {
            ptr::null()
        }
    }
}

/// A loader that resolves nothing, used for the unresolved state.
pub(crate) fn load_none(_: &'static str) -> *const c_void {
    ptr::null()
}
