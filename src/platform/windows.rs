//! Native Win32/WGL primitives.

use crate::command::{self, CommandSet};
use crate::commands::CoreCommands;
use crate::error::{Error, Result};
use crate::extensions::ExtensionSet;
use crate::format::{LayerType, PfdFlags, PixelFormatDescriptor, PixelType};
use crate::gl;
use crate::platform::{
    ContextHandle,
    DeviceHandle,
    Platform,
    WindowHandle,
    WindowKind,
    WindowRequest,
};
use crate::resolver::{DeviceResolver, ErrorReporter, Resolver};
use crate::util;
use crate::wgl;
use std::{ffi, fmt, mem, ptr};
use std::os::raw::{c_char, c_void};

use winapi::shared::minwindef::{BYTE, FALSE, HMODULE, LPARAM, LRESULT, UINT, WORD, WPARAM};
use winapi::shared::windef::{HDC, HGLRC, HWND};
use winapi::shared::winerror::ERROR_CLASS_ALREADY_EXISTS;
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::libloaderapi::{FreeLibrary, GetModuleHandleW, GetProcAddress, LoadLibraryW};
use winapi::um::wingdi;
use winapi::um::winuser;

const TARGET: &str = "glctx::platform";

const AUXILIARY_CLASS: &str = "glctx auxiliary";
const ROOT_CLASS: &str = "glctx root";

/// Values some drivers return from `wglGetProcAddress` instead of null.
const PROC_SENTINELS: [isize; 5] = [0, 1, 2, 3, -1];

/// Queries that build the window-system half of the extension set.
const EXTENSION_QUERIES: &[&str] = &["wglGetExtensionsStringARB", "wglGetExtensionsStringEXT"];

type GetProcAddressFn = unsafe extern "system" fn(*const c_char) -> *const c_void;

fn encode_wide(input: &str) -> Vec<u16> {
    input.encode_utf16().chain(Some(0)).collect()
}

fn last_error() -> u32 {
    unsafe { GetLastError() }
}

/// Maps a `BOOL` result onto a platform error.
fn check(ok: i32, api: &'static str) -> Result<()> {
    if ok == FALSE {
        Err(Error::platform(api, last_error()))
    } else {
        Ok(())
    }
}

/// A loaded system library, freed on drop.
struct Library {
    name: &'static str,
    module: HMODULE,
}

impl Library {
    fn load(name: &'static str) -> Result<Self> {
        let wide = encode_wide(name);
        let module = unsafe { LoadLibraryW(wide.as_ptr()) };
        if module.is_null() {
            return Err(Error::platform("LoadLibraryW", last_error()));
        }
        debug!(target: TARGET, "loaded {}", name);
        Ok(Self { name, module })
    }

    fn symbol(&self, name: &ffi::CStr) -> *const c_void {
        unsafe { GetProcAddress(self.module, name.as_ptr()) as *const c_void }
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        if unsafe { FreeLibrary(self.module) } == FALSE {
            warn!(target: TARGET, "failed to free {}: {}", self.name, last_error());
        }
    }
}

unsafe impl Send for Library {}
unsafe impl Sync for Library {}

/// Window procedure of root windows.
///
/// Keeps the creation parameter reachable from the window for as long as
/// the window exists.
unsafe extern "system" fn root_window_proc(
    hwnd: HWND,
    message: UINT,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match message {
        winuser::WM_CREATE => {
            let create = lparam as *const winuser::CREATESTRUCTW;
            if !create.is_null() {
                let params = (*create).lpCreateParams;
                winuser::SetWindowLongPtrW(hwnd, winuser::GWLP_USERDATA, params as _);
            }
            0
        }
        winuser::WM_DESTROY => {
            winuser::SetWindowLongPtrW(hwnd, winuser::GWLP_USERDATA, 0);
            0
        }
        _ => winuser::DefWindowProcW(hwnd, message, wparam, lparam),
    }
}

/// WGL on top of `opengl32.dll` and `gdi32.dll`.
pub struct Win32Platform {
    _opengl32: Library,
    _gdi32: Library,
    get_proc_address: GetProcAddressFn,
    get_error: ErrorReporter,
    auxiliary_class: Vec<u16>,
    root_class: Vec<u16>,
}

impl Win32Platform {
    /// Loads the system libraries and registers the window classes.
    pub fn new() -> Result<Self> {
        let _gdi32 = Library::load("gdi32.dll")?;
        let opengl32 = Library::load("opengl32.dll")?;

        let symbol = opengl32.symbol(&util::cstring("wglGetProcAddress")?);
        if symbol.is_null() {
            return Err(Error::platform("GetProcAddress", last_error()));
        }
        let get_proc_address: GetProcAddressFn = unsafe { mem::transmute(symbol) };

        let symbol = opengl32.symbol(&util::cstring("glGetError")?);
        if symbol.is_null() {
            return Err(Error::platform("GetProcAddress", last_error()));
        }
        let get_error: ErrorReporter = unsafe { mem::transmute(symbol) };

        let platform = Self {
            _opengl32: opengl32,
            _gdi32,
            get_proc_address,
            get_error,
            auxiliary_class: encode_wide(AUXILIARY_CLASS),
            root_class: encode_wide(ROOT_CLASS),
        };
        platform.register_class(&platform.auxiliary_class, winuser::DefWindowProcW)?;
        platform.register_class(&platform.root_class, root_window_proc)?;
        Ok(platform)
    }

    fn register_class(
        &self,
        name: &[u16],
        procedure: unsafe extern "system" fn(HWND, UINT, WPARAM, LPARAM) -> LRESULT,
    ) -> Result<()> {
        let mut class: winuser::WNDCLASSEXW = unsafe { mem::zeroed() };
        class.cbSize = mem::size_of::<winuser::WNDCLASSEXW>() as UINT;
        class.style = winuser::CS_OWNDC;
        class.lpfnWndProc = Some(procedure);
        class.hInstance = unsafe { GetModuleHandleW(ptr::null()) };
        class.lpszClassName = name.as_ptr();
        if unsafe { winuser::RegisterClassExW(&class) } == 0 {
            let code = last_error();
            if code != ERROR_CLASS_ALREADY_EXISTS {
                return Err(Error::platform("RegisterClassExW", code));
            }
        }
        Ok(())
    }

    /// Top-left corner of the monitor `window` is on.
    fn monitor_origin(&self, window: WindowHandle) -> (i32, i32) {
        unsafe {
            let monitor = winuser::MonitorFromWindow(
                window.as_ptr() as HWND,
                winuser::MONITOR_DEFAULTTONEAREST,
            );
            let mut info: winuser::MONITORINFO = mem::zeroed();
            info.cbSize = mem::size_of::<winuser::MONITORINFO>() as u32;
            if monitor.is_null() || winuser::GetMonitorInfoW(monitor, &mut info) == FALSE {
                (0, 0)
            } else {
                (info.rcMonitor.left, info.rcMonitor.top)
            }
        }
    }
}

impl fmt::Debug for Win32Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Win32Platform").finish()
    }
}

fn to_native(descriptor: &PixelFormatDescriptor) -> wingdi::PIXELFORMATDESCRIPTOR {
    wingdi::PIXELFORMATDESCRIPTOR {
        nSize: mem::size_of::<wingdi::PIXELFORMATDESCRIPTOR>() as WORD,
        nVersion: 1,
        dwFlags: descriptor.flags.bits(),
        iPixelType: match descriptor.pixel_type {
            PixelType::Rgba => wingdi::PFD_TYPE_RGBA,
            PixelType::Indexed => wingdi::PFD_TYPE_COLORINDEX,
        },
        cColorBits: descriptor.color_bits,
        cRedBits: descriptor.red_bits,
        cRedShift: descriptor.red_shift,
        cGreenBits: descriptor.green_bits,
        cGreenShift: descriptor.green_shift,
        cBlueBits: descriptor.blue_bits,
        cBlueShift: descriptor.blue_shift,
        cAlphaBits: descriptor.alpha_bits,
        cAlphaShift: descriptor.alpha_shift,
        cAccumBits: descriptor.accum_bits,
        cAccumRedBits: descriptor.accum_red_bits,
        cAccumGreenBits: descriptor.accum_green_bits,
        cAccumBlueBits: descriptor.accum_blue_bits,
        cAccumAlphaBits: descriptor.accum_alpha_bits,
        cDepthBits: descriptor.depth_bits,
        cStencilBits: descriptor.stencil_bits,
        cAuxBuffers: descriptor.aux_buffers,
        iLayerType: match descriptor.layer_type {
            LayerType::Main => wingdi::PFD_MAIN_PLANE,
            LayerType::Overlay => wingdi::PFD_OVERLAY_PLANE,
            LayerType::Underlay => wingdi::PFD_UNDERLAY_PLANE as BYTE,
        },
        bReserved: 0,
        dwLayerMask: 0,
        dwVisibleMask: descriptor.visible_mask,
        dwDamageMask: 0,
    }
}

fn from_native(native: &wingdi::PIXELFORMATDESCRIPTOR) -> PixelFormatDescriptor {
    PixelFormatDescriptor {
        flags: PfdFlags::from_bits_truncate(native.dwFlags),
        pixel_type: if native.iPixelType == wingdi::PFD_TYPE_COLORINDEX {
            PixelType::Indexed
        } else {
            PixelType::Rgba
        },
        color_bits: native.cColorBits,
        red_bits: native.cRedBits,
        red_shift: native.cRedShift,
        green_bits: native.cGreenBits,
        green_shift: native.cGreenShift,
        blue_bits: native.cBlueBits,
        blue_shift: native.cBlueShift,
        alpha_bits: native.cAlphaBits,
        alpha_shift: native.cAlphaShift,
        accum_bits: native.cAccumBits,
        accum_red_bits: native.cAccumRedBits,
        accum_green_bits: native.cAccumGreenBits,
        accum_blue_bits: native.cAccumBlueBits,
        accum_alpha_bits: native.cAccumAlphaBits,
        depth_bits: native.cDepthBits,
        stencil_bits: native.cStencilBits,
        aux_buffers: native.cAuxBuffers,
        layer_type: match native.iLayerType as i8 {
            1 => LayerType::Overlay,
            -1 => LayerType::Underlay,
            _ => LayerType::Main,
        },
        visible_mask: native.dwVisibleMask,
    }
}

impl Platform for Win32Platform {
    type Resolver = WglResolver;

    fn create_resolver(&self) -> Result<WglResolver> {
        Ok(WglResolver {
            opengl32: Library::load("opengl32.dll")?,
            get_proc_address: self.get_proc_address,
            get_error: self.get_error,
            device: DeviceHandle::null(),
            extensions: ExtensionSet::new(),
        })
    }

    fn validate_drawable(&self, window: WindowHandle) -> Result<()> {
        let hwnd = window.as_ptr() as HWND;
        if unsafe { winuser::IsWindow(hwnd) } == FALSE {
            return Err(Error::invalid(format!("{:?} is not a window", window)));
        }
        let style = unsafe { winuser::GetClassLongPtrW(hwnd, winuser::GCL_STYLE) } as UINT;
        if style & winuser::CS_OWNDC == 0 {
            return Err(Error::invalid(format!(
                "window class of {:?} lacks a private device context",
                window,
            )));
        }
        Ok(())
    }

    fn create_window(&self, request: &WindowRequest) -> Result<WindowHandle> {
        let class = match request.kind {
            WindowKind::Auxiliary => &self.auxiliary_class,
            WindowKind::Root => &self.root_class,
        };
        let (x, y) = request.near.map(|near| self.monitor_origin(near)).unwrap_or((0, 0));
        let title = encode_wide("");
        let hwnd = unsafe {
            winuser::CreateWindowExW(
                winuser::WS_EX_TOOLWINDOW,
                class.as_ptr(),
                title.as_ptr(),
                winuser::WS_POPUP | winuser::WS_CLIPSIBLINGS | winuser::WS_CLIPCHILDREN,
                x,
                y,
                1,
                1,
                ptr::null_mut(),
                ptr::null_mut(),
                GetModuleHandleW(ptr::null()),
                request.user_data as *mut c_void,
            )
        };
        if hwnd.is_null() {
            return Err(Error::platform("CreateWindowExW", last_error()));
        }
        trace!(target: TARGET, "created {:?} window {:?}", request.kind, hwnd);
        Ok(WindowHandle::from_ptr(hwnd as *mut c_void))
    }

    fn destroy_window(&self, window: WindowHandle) -> Result<()> {
        check(unsafe { winuser::DestroyWindow(window.as_ptr() as HWND) }, "DestroyWindow")
    }

    fn device(&self, window: WindowHandle) -> Result<DeviceHandle> {
        let hdc = unsafe { winuser::GetDC(window.as_ptr() as HWND) };
        if hdc.is_null() {
            Err(Error::platform("GetDC", last_error()))
        } else {
            Ok(DeviceHandle::from_ptr(hdc as *mut c_void))
        }
    }

    fn release_device(&self, window: WindowHandle, device: DeviceHandle) -> Result<()> {
        let released = unsafe {
            winuser::ReleaseDC(window.as_ptr() as HWND, device.as_ptr() as HDC)
        };
        check(released, "ReleaseDC")
    }

    fn pixel_format(&self, device: DeviceHandle) -> Result<i32> {
        // Zero doubles as "none set" and failure; a stale error is not
        // distinguishable, so zero is reported as none.
        Ok(unsafe { wingdi::GetPixelFormat(device.as_ptr() as HDC) })
    }

    fn choose_pixel_format(
        &self,
        device: DeviceHandle,
        descriptor: &PixelFormatDescriptor,
    ) -> Result<i32> {
        let native = to_native(descriptor);
        let format = unsafe { wingdi::ChoosePixelFormat(device.as_ptr() as HDC, &native) };
        if format == 0 {
            Err(Error::platform("ChoosePixelFormat", last_error()))
        } else {
            Ok(format)
        }
    }

    fn describe_pixel_format(
        &self,
        device: DeviceHandle,
        format: i32,
    ) -> Result<PixelFormatDescriptor> {
        let mut native: wingdi::PIXELFORMATDESCRIPTOR = unsafe { mem::zeroed() };
        let size = mem::size_of::<wingdi::PIXELFORMATDESCRIPTOR>() as UINT;
        let count = unsafe {
            wingdi::DescribePixelFormat(device.as_ptr() as HDC, format, size, &mut native)
        };
        if count == 0 {
            Err(Error::platform("DescribePixelFormat", last_error()))
        } else {
            Ok(from_native(&native))
        }
    }

    fn set_pixel_format(
        &self,
        device: DeviceHandle,
        format: i32,
        descriptor: &PixelFormatDescriptor,
    ) -> Result<()> {
        let native = to_native(descriptor);
        let ok = unsafe { wingdi::SetPixelFormat(device.as_ptr() as HDC, format, &native) };
        check(ok, "SetPixelFormat")
    }

    fn create_legacy_context(&self, device: DeviceHandle) -> Result<ContextHandle> {
        let hglrc = unsafe { wingdi::wglCreateContext(device.as_ptr() as HDC) };
        if hglrc.is_null() {
            Err(Error::platform("wglCreateContext", last_error()))
        } else {
            Ok(ContextHandle::from_ptr(hglrc as *mut c_void))
        }
    }

    fn delete_context(&self, context: ContextHandle) -> Result<()> {
        let ok = unsafe { wingdi::wglDeleteContext(context.as_ptr() as HGLRC) };
        check(ok, "wglDeleteContext")
    }

    fn make_current(&self, device: DeviceHandle, context: ContextHandle) -> Result<()> {
        let ok = unsafe {
            wingdi::wglMakeCurrent(device.as_ptr() as HDC, context.as_ptr() as HGLRC)
        };
        check(ok, "wglMakeCurrent")
    }

    fn clear_current(&self) -> Result<()> {
        let ok = unsafe { wingdi::wglMakeCurrent(ptr::null_mut(), ptr::null_mut()) };
        check(ok, "wglMakeCurrent")
    }

    fn current_context(&self) -> ContextHandle {
        ContextHandle::from_ptr(unsafe { wingdi::wglGetCurrentContext() } as *mut c_void)
    }

    fn current_device(&self) -> DeviceHandle {
        DeviceHandle::from_ptr(unsafe { wingdi::wglGetCurrentDC() } as *mut c_void)
    }

    fn swap_buffers(&self, device: DeviceHandle) -> Result<()> {
        check(unsafe { wingdi::SwapBuffers(device.as_ptr() as HDC) }, "SwapBuffers")
    }

    fn last_error(&self) -> u32 {
        last_error()
    }
}

/// Resolves entry points through `wglGetProcAddress`, falling back to
/// the exports of `opengl32.dll` for the OpenGL 1.1 functions.
pub struct WglResolver {
    opengl32: Library,
    get_proc_address: GetProcAddressFn,
    get_error: ErrorReporter,
    device: DeviceHandle,
    extensions: ExtensionSet,
}

unsafe impl Send for WglResolver {}

impl WglResolver {
    /// Returns the device the resolver is bound to.
    pub fn device(&self) -> DeviceHandle {
        self.device
    }

    fn gl_extensions(&self) -> String {
        let mut core = CoreCommands::new();
        core.resolve(self);
        match core.get_string(gl::EXTENSIONS) {
            Ok(Some(extensions)) => extensions,
            // Core profiles only enumerate extensions one at a time.
            _ => {
                let count = core.get_integer(gl::NUM_EXTENSIONS).unwrap_or(0).max(0) as u32;
                (0 .. count)
                    .filter_map(|index| core.get_stringi(gl::EXTENSIONS, index).ok().flatten())
                    .collect::<Vec<_>>()
                    .join(" ")
            }
        }
    }

    fn wgl_extensions(&self, device: DeviceHandle) -> Option<String> {
        let table = wgl::Wgl::load_with(command::load_subset(self, EXTENSION_QUERIES));
        unsafe {
            if table.GetExtensionsStringARB.is_loaded() {
                util::owned_string(table.GetExtensionsStringARB(device.as_const()))
            } else if table.GetExtensionsStringEXT.is_loaded() {
                util::owned_string(table.GetExtensionsStringEXT())
            } else {
                None
            }
        }
    }
}

impl Resolver for WglResolver {
    fn resolve_entry_point(&self, name: &str) -> *const c_void {
        let name = match util::cstring(name) {
            Ok(name) => name,
            Err(_) => return ptr::null(),
        };
        let address = unsafe { (self.get_proc_address)(name.as_ptr()) };
        if PROC_SENTINELS.contains(&(address as isize)) {
            self.opengl32.symbol(&name)
        } else {
            address
        }
    }

    fn is_extension_present(&self, name: &str) -> bool {
        self.extensions.contains(name)
    }

    fn error_reporter(&self) -> Option<ErrorReporter> {
        Some(self.get_error)
    }
}

impl DeviceResolver for WglResolver {
    fn set_device(&mut self, device: DeviceHandle) -> Result<()> {
        self.device = device;
        self.extensions = ExtensionSet::new();
        let mut extensions = ExtensionSet::parse(&self.gl_extensions());
        if let Some(window_system) = self.wgl_extensions(device) {
            extensions.extend_from_str(&window_system);
        }
        debug!(target: TARGET, "{:?}: {} extensions", device, extensions.len());
        self.extensions = extensions;
        Ok(())
    }

    fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }
}

impl fmt::Debug for WglResolver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("WglResolver")
            .field("device", &self.device)
            .field("extensions", &self.extensions.len())
            .finish()
    }
}
