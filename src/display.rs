//! Display contexts and the modern context bootstrap.
//!
//! A display owns a hidden root context that parents resource sharing
//! for every render context it issues. Creating the root context needs
//! `WGL_ARB_create_context` and `WGL_ARB_pixel_format`, which can only be
//! discovered with some context current, so the first call to
//! [`Display::create_context`] goes through a throwaway legacy context on
//! an auxiliary window first.

use crate::command::{CommandSet, ExtensionCommandSet};
use crate::commands::{ArbCreateContext, ArbPixelFormat};
use crate::context::RenderContext;
use crate::error::{Error, OperationError, Result};
use crate::format::{DisplayFormat, PixelFormatDescriptor};
use crate::options::ContextOptions;
use crate::platform::{
    ContextHandle,
    DeviceHandle,
    Platform,
    WindowHandle,
    WindowKind,
    WindowRequest,
};
use crate::queue::Queue;
use crate::resolver::{DeviceResolver, Resolver};
use crate::resource::{Garbage, Name};
use fnv::{FnvHashMap, FnvHashSet};
use raw_window_handle::RawWindowHandle;
use std::{fmt, ptr};
use std::os::raw::c_void;
use std::sync::{atomic, Arc, Mutex, MutexGuard, PoisonError};

const TARGET: &str = "glctx::display";

/// Reported when the modern creation extensions are unavailable.
pub const MODERN_OPENGL: &str = "modern OpenGL on this display";

static NEXT_DISPLAY_ID: atomic::AtomicUsize = atomic::AtomicUsize::new(1);

/// Destroys a window created during bootstrap unless released.
struct WindowGuard<'a, P: Platform> {
    platform: &'a P,
    window: Option<WindowHandle>,
}

impl<'a, P: Platform> WindowGuard<'a, P> {
    fn create(platform: &'a P, request: &WindowRequest) -> Result<Self> {
        let window = platform.create_window(request)?;
        Ok(Self { platform, window: Some(window) })
    }

    fn handle(&self) -> WindowHandle {
        self.window.unwrap_or_default()
    }

    fn release(mut self) -> WindowHandle {
        self.window.take().unwrap_or_default()
    }

    fn close(mut self) -> Result<()> {
        match self.window.take() {
            Some(window) => self.platform.destroy_window(window),
            None => Ok(()),
        }
    }
}

impl<'a, P: Platform> Drop for WindowGuard<'a, P> {
    fn drop(&mut self) {
        if let Some(window) = self.window.take() {
            if let Err(error) = self.platform.destroy_window(window) {
                warn!(target: TARGET, "rollback: {}", error);
            }
        }
    }
}

/// Releases a device context unless released to a render context.
pub(crate) struct DeviceGuard<'a, P: Platform> {
    platform: &'a P,
    window: WindowHandle,
    device: Option<DeviceHandle>,
}

impl<'a, P: Platform> DeviceGuard<'a, P> {
    pub(crate) fn acquire(platform: &'a P, window: WindowHandle) -> Result<Self> {
        let device = platform.device(window)?;
        Ok(Self { platform, window, device: Some(device) })
    }

    pub(crate) fn handle(&self) -> DeviceHandle {
        self.device.unwrap_or_default()
    }

    pub(crate) fn release(mut self) -> DeviceHandle {
        self.device.take().unwrap_or_default()
    }

    fn close(mut self) -> Result<()> {
        match self.device.take() {
            Some(device) => self.platform.release_device(self.window, device),
            None => Ok(()),
        }
    }
}

impl<'a, P: Platform> Drop for DeviceGuard<'a, P> {
    fn drop(&mut self) {
        if let Some(device) = self.device.take() {
            if let Err(error) = self.platform.release_device(self.window, device) {
                warn!(target: TARGET, "rollback: {}", error);
            }
        }
    }
}

/// Deletes a GL context unless released.
pub(crate) struct ContextGuard<'a, P: Platform> {
    platform: &'a P,
    context: Option<ContextHandle>,
}

impl<'a, P: Platform> ContextGuard<'a, P> {
    pub(crate) fn new(platform: &'a P, context: ContextHandle) -> Self {
        Self { platform, context: Some(context) }
    }

    pub(crate) fn handle(&self) -> ContextHandle {
        self.context.unwrap_or_default()
    }

    pub(crate) fn release(mut self) -> ContextHandle {
        self.context.take().unwrap_or_default()
    }

    fn close(mut self) -> Result<()> {
        match self.context.take() {
            Some(context) => self.platform.delete_context(context),
            None => Ok(()),
        }
    }
}

impl<'a, P: Platform> Drop for ContextGuard<'a, P> {
    fn drop(&mut self) {
        if let Some(context) = self.context.take() {
            if let Err(error) = self.platform.delete_context(context) {
                warn!(target: TARGET, "rollback: {}", error);
            }
        }
    }
}

/// Binds a context for the duration of a scope, then restores whatever
/// was current before.
pub(crate) struct CurrentGuard<'a, P: Platform> {
    platform: &'a P,
    previous: Option<(DeviceHandle, ContextHandle)>,
}

impl<'a, P: Platform> CurrentGuard<'a, P> {
    pub(crate) fn bind(
        platform: &'a P,
        device: DeviceHandle,
        context: ContextHandle,
    ) -> Result<Self> {
        let previous = (platform.current_device(), platform.current_context());
        platform.make_current(device, context)?;
        Ok(Self { platform, previous: Some(previous) })
    }

    fn restore(&mut self) -> Result<()> {
        match self.previous.take() {
            Some((_, context)) if context.is_null() => self.platform.clear_current(),
            Some((device, context)) => self.platform.make_current(device, context),
            None => Ok(()),
        }
    }

    pub(crate) fn close(mut self) -> Result<()> {
        self.restore()
    }
}

impl<'a, P: Platform> Drop for CurrentGuard<'a, P> {
    fn drop(&mut self) {
        if let Err(error) = self.restore() {
            warn!(target: TARGET, "rollback: {}", error);
        }
    }
}

/// The bootstrap apparatus kept for the lifetime of a display.
struct Root {
    /// Hidden window owned by the display.
    window: WindowHandle,

    /// Private device context of `window`.
    device: DeviceHandle,

    /// Resource-sharing parent of every issued render context.
    context: ContextHandle,

    /// Pixel format chosen on the root device.
    pixel_format: i32,

    /// `pixel_format` described back.
    descriptor: PixelFormatDescriptor,

    /// Resolved against the root context.
    create_context: ArbCreateContext,
}

// The command sets hold driver entry points that are only called with
// the display's locks held.
unsafe impl Send for Root {}

impl Root {
    fn destroy<P: Platform>(self, platform: &P) {
        if platform.current_context() == self.context {
            if let Err(error) = platform.clear_current() {
                warn!(target: TARGET, "{}", error);
            }
        }
        let results = [
            platform.delete_context(self.context),
            platform.release_device(self.window, self.device),
            platform.destroy_window(self.window),
        ];
        for result in IntoIterator::into_iter(results) {
            if let Err(error) = result {
                warn!(target: TARGET, "root teardown: {}", error);
            }
        }
    }
}

/// Vertex array names are only meaningful on the context that generated
/// them, so their deletion waits until that context collects garbage.
#[derive(Debug, Default)]
struct VertexArrayGarbage {
    /// Render contexts of the display that have not been destroyed.
    live: FnvHashSet<usize>,

    /// Names awaiting deletion, keyed by owning context.
    pending: FnvHashMap<usize, Vec<Name>>,
}

struct Inner<P: Platform> {
    /// Distinguishes resources of different displays.
    id: usize,

    /// Operating system primitives.
    platform: Arc<P>,

    /// The requested output format.
    format: DisplayFormat,

    /// Rebound to each device a context is resolved on.
    resolver: Mutex<P::Resolver>,

    /// Present once bootstrap succeeded.
    root: Mutex<Option<Root>>,

    /// Names of dropped resources awaiting deletion.
    garbage: Queue<Garbage>,

    /// Dropped vertex arrays sorted out of `garbage` by another context.
    vertex_arrays: Mutex<VertexArrayGarbage>,
}

impl<P: Platform> Inner<P> {
    fn lock_resolver(&self) -> MutexGuard<P::Resolver> {
        self.resolver.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_root(&self) -> MutexGuard<Option<Root>> {
        self.root.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_vertex_arrays(&self) -> MutexGuard<VertexArrayGarbage> {
        self.vertex_arrays.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P: Platform> Drop for Inner<P> {
    fn drop(&mut self) {
        let root = self.root.get_mut().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(root) = root {
            debug!(target: TARGET, "display {}: destroying root context", self.id);
            root.destroy(&*self.platform);
        }
        if !self.garbage.is_empty() {
            debug!(
                target: TARGET,
                "display {}: {} objects released with their contexts",
                self.id,
                self.garbage.len(),
            );
        }
    }
}

/// The factory and root for a set of resource-sharing render contexts
/// on one output device.
///
/// Cheap to clone; every render context keeps its display alive.
pub struct Display<P: Platform> {
    inner: Arc<Inner<P>>,
}

impl<P: Platform> Display<P> {
    /// Constructor.
    pub(crate) fn new(platform: Arc<P>, format: DisplayFormat) -> Result<Self> {
        let resolver = platform.create_resolver()?;
        let id = NEXT_DISPLAY_ID.fetch_add(1, atomic::Ordering::Relaxed);
        debug!(target: TARGET, "display {}: format {:?}", id, format);
        Ok(Self {
            inner: Arc::new(Inner {
                id,
                platform,
                format,
                resolver: Mutex::new(resolver),
                root: Mutex::new(None),
                garbage: Queue::new(),
                vertex_arrays: Mutex::new(VertexArrayGarbage::default()),
            }),
        })
    }

    /// Returns the process-unique display id.
    pub fn id(&self) -> usize {
        self.inner.id
    }

    /// Returns the platform primitives.
    pub fn platform(&self) -> &P {
        &self.inner.platform
    }

    /// Returns the requested output format.
    pub fn format(&self) -> &DisplayFormat {
        &self.inner.format
    }

    /// Locks and returns the display's resolver.
    ///
    /// Its answers describe the device of the most recently created
    /// render context.
    pub fn resolver(&self) -> MutexGuard<P::Resolver> {
        self.inner.lock_resolver()
    }

    /// Returns `true` once the root context exists.
    pub fn is_bootstrapped(&self) -> bool {
        self.inner.lock_root().is_some()
    }

    /// Returns the cached pixel format id chosen during bootstrap.
    pub fn pixel_format(&self) -> Option<i32> {
        self.inner.lock_root().as_ref().map(|root| root.pixel_format)
    }

    /// Returns the format the driver actually chose during bootstrap.
    pub fn chosen_format(&self) -> Option<DisplayFormat> {
        self.inner
            .lock_root()
            .as_ref()
            .map(|root| DisplayFormat::from_descriptor(&root.descriptor))
    }

    /// Returns the queue dropped resources are sent to.
    pub(crate) fn garbage(&self) -> &Queue<Garbage> {
        &self.inner.garbage
    }

    /// Starts tracking vertex array garbage for a render context.
    pub(crate) fn register_context(&self, context: usize) {
        self.inner.lock_vertex_arrays().live.insert(context);
    }

    /// Holds a dropped vertex array until its owning context collects.
    ///
    /// Names of destroyed contexts went away with them and are discarded.
    pub(crate) fn defer_vertex_array(&self, context: usize, name: Name) {
        let mut vertex_arrays = self.inner.lock_vertex_arrays();
        if vertex_arrays.live.contains(&context) {
            vertex_arrays.pending.entry(context).or_default().push(name);
        } else {
            trace!(
                target: TARGET,
                "display {}: vertex array {} went away with context {}",
                self.id(),
                name,
                context,
            );
        }
    }

    /// Takes the vertex arrays waiting for `context` to delete them.
    pub(crate) fn take_vertex_arrays(&self, context: usize) -> Vec<Name> {
        self.inner.lock_vertex_arrays().pending.remove(&context).unwrap_or_default()
    }

    /// Stops tracking a destroyed context, returning the names it never
    /// got to delete.
    pub(crate) fn retire_context(&self, context: usize) -> Vec<Name> {
        let mut vertex_arrays = self.inner.lock_vertex_arrays();
        vertex_arrays.live.remove(&context);
        vertex_arrays.pending.remove(&context).unwrap_or_default()
    }

    /// Creates a render context for `drawable`.
    ///
    /// The first call bootstraps the display's root context; later calls
    /// reuse it, and a failed bootstrap is retried from scratch. The
    /// drawable must be a window whose class has a private device context
    /// and whose pixel format has not been set yet.
    pub fn create_context(
        &self,
        drawable: RawWindowHandle,
        options: &ContextOptions,
    ) -> Result<RenderContext<P>> {
        let platform = self.platform();
        let window = platform.drawable(drawable)?;
        platform.validate_drawable(window)?;
        let device = DeviceGuard::acquire(platform, window)?;
        if platform.pixel_format(device.handle())? != 0 {
            return Err(OperationError::PixelFormatAlreadySet.into());
        }

        let mut resolver = self.inner.lock_resolver();
        let mut slot = self.inner.lock_root();
        if slot.is_none() {
            info!(target: TARGET, "display {}: bootstrapping", self.id());
            *slot = Some(self.bootstrap(window, options, &mut *resolver)?);
        }
        let root = slot.as_ref().ok_or_else(|| Error::not_supported(MODERN_OPENGL))?;

        let descriptor = platform.describe_pixel_format(device.handle(), root.pixel_format)?;
        platform.set_pixel_format(device.handle(), root.pixel_format, &descriptor)?;
        let attribs = options.to_attrib_list();
        let handle = root
            .create_context
            .create_context_attribs(device.handle(), root.context, &attribs)?;
        if handle.is_null() {
            return Err(Error::platform("wglCreateContextAttribsARB", platform.last_error()));
        }
        let context = ContextGuard::new(platform, handle);
        drop(slot);

        let mut render_context = RenderContext::new(
            self.clone(),
            window,
            device.release(),
            context.release(),
        );
        render_context.resolve(&mut *resolver)?;
        info!(
            target: TARGET,
            "display {}: created context {:?} for {:?}",
            self.id(),
            handle,
            window,
        );
        Ok(render_context)
    }

    /// Creates the root apparatus.
    fn bootstrap(
        &self,
        near: WindowHandle,
        options: &ContextOptions,
        resolver: &mut P::Resolver,
    ) -> Result<Root> {
        let platform = self.platform();
        let (mut create_context, mut choose_format) = self.resolve_modern(near, resolver)?;

        let request = WindowRequest {
            kind: WindowKind::Root,
            near: Some(near),
            user_data: Arc::as_ptr(&self.inner) as *const c_void,
        };
        let window = WindowGuard::create(platform, &request)?;
        let device = DeviceGuard::acquire(platform, window.handle())?;

        let (ints, floats) = self.inner.format.to_pixel_format_attribs();
        let formats = choose_format
            .choose_pixel_format(device.handle(), &ints, &floats, 1)?
            .ok_or_else(|| Error::platform("wglChoosePixelFormatARB", platform.last_error()))?;
        let pixel_format = match formats.first() {
            Some(&format) => format,
            None => {
                warn!(target: TARGET, "no pixel format matches {:?}", self.inner.format);
                return Err(OperationError::NoMatchingPixelFormat.into());
            }
        };
        let descriptor = platform.describe_pixel_format(device.handle(), pixel_format)?;
        platform.set_pixel_format(device.handle(), pixel_format, &descriptor)?;
        debug!(target: TARGET, "root pixel format {}: {:?}", pixel_format, descriptor);

        let attribs = options.without_version().to_attrib_list();
        let handle = create_context.create_context_attribs(
            device.handle(),
            ContextHandle::null(),
            &attribs,
        )?;
        if handle.is_null() {
            return Err(Error::platform("wglCreateContextAttribsARB", platform.last_error()));
        }
        let context = ContextGuard::new(platform, handle);

        let current = CurrentGuard::bind(platform, device.handle(), context.handle())?;
        resolver.set_device(device.handle())?;
        create_context.resolve(&*resolver);
        // Only needed again to check that the root's driver still offers it.
        choose_format.resolve(&*resolver);
        current.close()?;
        if !create_context.is_present() || !choose_format.is_present() {
            return Err(Error::not_supported(MODERN_OPENGL));
        }

        info!(target: TARGET, "display {}: root context {:?} ready", self.id(), handle);
        Ok(Root {
            window: window.release(),
            device: device.release(),
            context: context.release(),
            pixel_format,
            descriptor,
            create_context,
        })
    }

    /// Resolves the modern creation extensions through a legacy context
    /// on an auxiliary window, tearing both down before returning.
    fn resolve_modern(
        &self,
        near: WindowHandle,
        resolver: &mut P::Resolver,
    ) -> Result<(ArbCreateContext, ArbPixelFormat)> {
        let platform = self.platform();
        let request = WindowRequest {
            kind: WindowKind::Auxiliary,
            near: Some(near),
            user_data: ptr::null(),
        };
        let window = WindowGuard::create(platform, &request)?;
        let device = DeviceGuard::acquire(platform, window.handle())?;

        let wanted = self.inner.format.to_descriptor();
        let format = platform.choose_pixel_format(device.handle(), &wanted)?;
        let described = platform.describe_pixel_format(device.handle(), format)?;
        platform.set_pixel_format(device.handle(), format, &described)?;

        let handle = platform.create_legacy_context(device.handle())?;
        let context = ContextGuard::new(platform, handle);
        let current = CurrentGuard::bind(platform, device.handle(), context.handle())?;
        resolver.set_device(device.handle())?;
        debug!(target: TARGET, "legacy context extensions: {}", resolver.extensions());

        if !resolver.is_extension_present(ArbCreateContext::NAME)
            || !resolver.is_extension_present(ArbPixelFormat::NAME)
        {
            warn!(target: TARGET, "display {}: {} unavailable", self.id(), MODERN_OPENGL);
            return Err(Error::not_supported(MODERN_OPENGL));
        }
        let mut create_context = ArbCreateContext::new();
        create_context.resolve(&*resolver);
        let mut choose_format = ArbPixelFormat::new();
        choose_format.resolve(&*resolver);
        if !create_context.is_present() || !choose_format.is_present() {
            return Err(Error::not_supported(MODERN_OPENGL));
        }

        current.close()?;
        context.close()?;
        device.close()?;
        window.close()?;
        Ok((create_context, choose_format))
    }
}

impl<P: Platform> Clone for Display<P> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<P: Platform> PartialEq for Display<P> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<P: Platform> Eq for Display<P> {}

impl<P: Platform> fmt::Debug for Display<P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Display")
            .field("id", &self.inner.id)
            .field("format", &self.inner.format)
            .field("references", &Arc::strong_count(&self.inner))
            .finish()
    }
}
