//! Render contexts.

use crate::command::ExtensionCommandSet;
use crate::commands::Api;
use crate::display::{CurrentGuard, Display};
use crate::error::{Error, Result};
use crate::platform::{ContextHandle, DeviceHandle, Platform, WindowHandle};
use crate::resolver::DeviceResolver;
use crate::resource::{Garbage, Kind};
use std::fmt;
use std::sync::atomic;

const TARGET: &str = "glctx::context";

static NEXT_CONTEXT_ID: atomic::AtomicUsize = atomic::AtomicUsize::new(1);

/// A live GL context bound to a drawable.
///
/// Owns its own resolved command sets, since entry points may be context
/// specific. A render context is current on at most one thread at a
/// time; destroying it while it is current on another thread is not
/// defended against.
pub struct RenderContext<P: Platform> {
    /// Process-unique; handles may be reused by the driver.
    id: usize,

    /// Keeps the display, and with it the root context, alive.
    display: Display<P>,

    /// The drawable.
    window: WindowHandle,

    /// Device context of `window`.
    device: DeviceHandle,

    /// The GL context.
    context: ContextHandle,

    /// Command sets resolved against `context`.
    api: Api,

    /// Set once the context was torn down.
    disposed: bool,
}

// A context that is not current may move between threads.
unsafe impl<P: Platform> Send for RenderContext<P> {}

impl<P: Platform> RenderContext<P> {
    /// Takes ownership of a created context. Unresolved until
    /// [`resolve`](#method.resolve) runs.
    pub(crate) fn new(
        display: Display<P>,
        window: WindowHandle,
        device: DeviceHandle,
        context: ContextHandle,
    ) -> Self {
        let id = NEXT_CONTEXT_ID.fetch_add(1, atomic::Ordering::Relaxed);
        display.register_context(id);
        Self {
            id,
            display,
            window,
            device,
            context,
            api: Api::new(),
            disposed: false,
        }
    }

    /// Resolves the command sets against this context: bind, resolve,
    /// then restore what was current before.
    pub(crate) fn resolve(&mut self, resolver: &mut P::Resolver) -> Result<()> {
        let platform = self.display.platform();
        let current = CurrentGuard::bind(platform, self.device, self.context)?;
        resolver.set_device(self.device)?;
        self.api.resolve(&*resolver);
        current.close()?;
        debug!(
            target: TARGET,
            "{:?}: {} core entry points, extensions [{}]",
            self.context,
            self.api.core().loaded().len(),
            self.api
                .extensions()
                .filter(|set| set.is_present())
                .map(|set| set.name())
                .collect::<Vec<_>>()
                .join(" "),
        );
        Ok(())
    }

    /// Returns the process-unique context id.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the resolved command sets.
    ///
    /// They may only be called while this context is current on the
    /// calling thread.
    pub fn api(&self) -> &Api {
        &self.api
    }

    /// Returns the display that issued this context.
    pub fn display(&self) -> &Display<P> {
        &self.display
    }

    /// Returns the drawable.
    pub fn window(&self) -> WindowHandle {
        self.window
    }

    /// Returns the device context of the drawable.
    pub fn device(&self) -> DeviceHandle {
        self.device
    }

    /// Returns the raw GL context.
    pub fn handle(&self) -> ContextHandle {
        self.context
    }

    /// Binds this context to the calling thread, then deletes any
    /// resources of the display that were dropped since the last
    /// collection.
    pub fn make_current(&self) -> Result<()> {
        self.display.platform().make_current(self.device, self.context)?;
        self.collect_garbage()?;
        Ok(())
    }

    /// Unbinds any context from the calling thread.
    pub fn done_current(&self) -> Result<()> {
        self.display.platform().clear_current()
    }

    /// Returns `true` if this context is current on the calling thread.
    pub fn is_current(&self) -> bool {
        self.display.platform().current_context() == self.context
    }

    /// Presents the back buffer. May block on vertical retrace.
    pub fn swap_buffers(&self) -> Result<()> {
        self.display.platform().swap_buffers(self.device)
    }

    /// Sets the number of vertical retraces to wait for per swap.
    ///
    /// Requires `WGL_EXT_swap_control` and this context to be current.
    pub fn set_swap_interval(&self, interval: i32) -> Result<()> {
        let swap_control = self.api.swap_control();
        if !swap_control.is_present() {
            return Err(Error::not_supported("WGL_EXT_swap_control"));
        }
        if swap_control.swap_interval(interval)? {
            Ok(())
        } else {
            Err(Error::platform("wglSwapIntervalEXT", self.display.platform().last_error()))
        }
    }

    /// Deletes the GL objects of dropped resources of this display.
    ///
    /// Vertex arrays are deleted only by the context that created them;
    /// those of other contexts are held for their owner's next
    /// collection. Returns the number of objects deleted. This context
    /// must be current on the calling thread.
    pub fn collect_garbage(&self) -> Result<usize> {
        if !self.is_current() {
            return Err(Error::invalid("render context is not current on this thread"));
        }
        let mut count = 0;
        while let Some(garbage) = self.display.garbage().next() {
            match garbage.context {
                Some(owner) if owner != self.id => {
                    self.display.defer_vertex_array(owner, garbage.name);
                }
                _ => {
                    self.delete(garbage);
                    count += 1;
                }
            }
        }
        for name in self.display.take_vertex_arrays(self.id) {
            self.delete(Garbage { kind: Kind::VertexArray, name, context: Some(self.id) });
            count += 1;
        }
        if count > 0 {
            trace!(target: TARGET, "{:?}: collected {} objects", self.context, count);
        }
        Ok(count)
    }

    fn delete(&self, garbage: Garbage) {
        let core = self.api.core();
        let result = match garbage.kind {
            Kind::Shader => core.delete_shader(garbage.name),
            Kind::Program => core.delete_program(garbage.name),
            Kind::Buffer => core.delete_buffer(garbage.name),
            Kind::VertexArray => core.delete_vertex_array(garbage.name),
        };
        if let Err(error) = result {
            warn!(target: TARGET, "failed to delete {:?}: {}", garbage, error);
        }
    }

    /// Checks that a resource was created by this context's display.
    pub(crate) fn check_owner(&self, display: usize) -> Result<()> {
        if display == self.display.id() {
            Ok(())
        } else {
            Err(Error::invalid(format!(
                "resource of display {} used with display {}",
                display,
                self.display.id(),
            )))
        }
    }

    /// Checks that a per-context object was created by this context.
    pub(crate) fn check_context(&self, display: usize, context: Option<usize>) -> Result<()> {
        self.check_owner(display)?;
        match context {
            Some(context) if context == self.id => Ok(()),
            Some(context) => Err(Error::invalid(format!(
                "object of context {} used with context {}",
                context,
                self.id,
            ))),
            None => Ok(()),
        }
    }

    /// Destroys the context, reporting the first failure.
    pub fn dispose(mut self) -> Result<()> {
        self.disposed = true;
        self.destroy()
    }

    fn destroy(&mut self) -> Result<()> {
        let platform = self.display.platform();
        let current = self.is_current();
        if current {
            if let Err(error) = self.collect_garbage() {
                warn!(target: TARGET, "{}", error);
            }
        }
        let stranded = self.display.retire_context(self.id);
        if !stranded.is_empty() {
            debug!(
                target: TARGET,
                "{:?}: {} vertex arrays released with the context",
                self.context,
                stranded.len(),
            );
        }
        let unbound = if current {
            platform.clear_current()
        } else {
            Ok(())
        };
        let deleted = platform.delete_context(self.context);
        let released = platform.release_device(self.window, self.device);
        debug!(target: TARGET, "destroyed {:?}", self.context);
        unbound.and(deleted).and(released)
    }
}

impl<P: Platform> Drop for RenderContext<P> {
    fn drop(&mut self) {
        if !self.disposed {
            self.disposed = true;
            if let Err(error) = self.destroy() {
                warn!(target: TARGET, "{}", error);
            }
        }
    }
}

impl<P: Platform> fmt::Debug for RenderContext<P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("id", &self.id)
            .field("display", &self.display.id())
            .field("window", &self.window)
            .field("device", &self.device)
            .field("context", &self.context)
            .finish()
    }
}
