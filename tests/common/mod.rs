//! A software stand-in for WGL and a GL 3.3 driver.
//!
//! Driver state is thread local, so every test owns an isolated driver.
//! Entry points are real `extern "system"` functions that the display
//! resolves and calls exactly as it would the native ones.

#![allow(dead_code)]

use glctx::extensions::ExtensionSet;
use glctx::format::{PfdFlags, PixelFormatDescriptor, PixelType};
use glctx::gl;
use glctx::platform::{
    ContextHandle,
    DeviceHandle,
    Platform,
    WindowHandle,
    WindowKind,
    WindowRequest,
};
use glctx::resolver::{DeviceResolver, ErrorReporter, Resolver};
use glctx::wgl;
use glctx::{Error, Result};
use raw_window_handle::{RawWindowHandle, Win32WindowHandle};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::CString;
use std::os::raw::{c_char, c_void};
use std::{ptr, slice};

const ERROR_INVALID_HANDLE: u32 = 6;
const ERROR_INVALID_PARAMETER: u32 = 87;
const ERROR_INVALID_WINDOW_HANDLE: u32 = 1400;
const ERROR_INVALID_PIXEL_FORMAT: u32 = 2000;

/// Number of pixel formats every mock device exposes.
pub const PIXEL_FORMATS: i32 = 8;

/// The first format `wglChoosePixelFormatARB` reports.
pub const PREFERRED_FORMAT: i32 = 2;

/// The format the legacy `ChoosePixelFormat` picks.
pub const LEGACY_FORMAT: i32 = 1;

/// Knobs for the simulated driver.
#[derive(Clone, Debug)]
pub struct Config {
    /// Advertised through `glGetString(GL_EXTENSIONS)`.
    pub gl_extensions: Vec<&'static str>,

    /// Advertised through `wglGetExtensionsStringARB`.
    pub wgl_extensions: Vec<&'static str>,

    /// Entry points the resolver reports as null.
    pub missing: Vec<&'static str>,

    /// How many formats `wglChoosePixelFormatARB` reports as matching.
    pub matching_formats: usize,

    /// Platform calls that fail, by API name.
    ///
    /// `wglCreateContextAttribsARB` only fails for contexts without a
    /// share parent, i.e. root contexts.
    pub failing: Vec<&'static str>,

    /// Rebinding the resolver fails while a root context is current.
    pub fail_root_resolution: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gl_extensions: vec!["GL_ARB_vertex_array_object", "GL_ARB_copy_buffer"],
            wgl_extensions: vec![
                "WGL_ARB_extensions_string",
                "WGL_ARB_pixel_format",
                "WGL_ARB_create_context",
                "WGL_ARB_create_context_profile",
                "WGL_EXT_swap_control",
            ],
            missing: Vec::new(),
            matching_formats: 3,
            failing: Vec::new(),
            fail_root_resolution: false,
        }
    }
}

impl Config {
    /// A driver that only offers legacy context creation.
    pub fn legacy_only() -> Self {
        Self {
            wgl_extensions: vec!["WGL_ARB_extensions_string"],
            ..Self::default()
        }
    }
}

/// A window known to the driver.
#[derive(Clone, Debug)]
pub struct Window {
    /// `None` for windows created by the application.
    pub kind: Option<WindowKind>,
    pub own_dc: bool,
    pub user_data: usize,
    pub near: Option<usize>,
    pub device: usize,
    pub pixel_format: i32,
    pub device_refs: usize,
}

/// A vertex array object of one context.
#[derive(Clone, Debug, Default)]
pub struct VertexArrayState {
    pub element_buffer: u32,
    pub enabled: Vec<u32>,
    /// `(location, buffer, components, type, integer)`.
    pub pointers: Vec<(u32, u32, i32, u32, bool)>,
}

/// A GL context known to the driver.
#[derive(Clone, Debug, Default)]
pub struct Context {
    pub device: usize,
    pub legacy: bool,
    pub share: usize,
    pub group: usize,
    pub attribs: Vec<(i32, i32)>,
    pub bindings: HashMap<u32, u32>,
    pub vertex_arrays: HashMap<u32, VertexArrayState>,
    /// Vertex array names are generated per context.
    pub last_vertex_array: u32,
    pub vertex_array: u32,
    pub restart_enabled: bool,
    pub restart_index: u32,
    pub swap_interval: i32,
    pub draws: Vec<(u32, i32)>,
}

/// The whole simulated driver.
#[derive(Debug)]
pub struct Driver {
    pub config: Config,
    next_handle: usize,
    next_name: u32,
    next_group: usize,
    pub windows: HashMap<usize, Window>,
    pub contexts: HashMap<usize, Context>,
    pub current: Option<(usize, usize)>,
    /// Buffer contents keyed by share group and name.
    pub buffers: HashMap<(usize, u32), Vec<u8>>,
    pub errors: Vec<u32>,
    pub last_error: u32,
    pub clears: usize,
    pub flushes: usize,
    pub swaps: usize,
    pub chosen_attribs: Vec<(i32, i32)>,
    gl_extensions: CString,
    gl_extension_list: Vec<CString>,
    wgl_extensions: CString,
    version: CString,
}

impl Driver {
    fn new(config: Config) -> Self {
        let gl_extensions = config.gl_extensions.join(" ");
        let wgl_extensions = config.wgl_extensions.join(" ");
        Self {
            gl_extension_list: config
                .gl_extensions
                .iter()
                .map(|name| CString::new(*name).unwrap())
                .collect(),
            gl_extensions: CString::new(gl_extensions).unwrap(),
            wgl_extensions: CString::new(wgl_extensions).unwrap(),
            version: CString::new("3.3.0 mock").unwrap(),
            config,
            next_handle: 0x1000,
            next_name: 1,
            next_group: 1,
            windows: HashMap::new(),
            contexts: HashMap::new(),
            current: None,
            buffers: HashMap::new(),
            errors: Vec::new(),
            last_error: 0,
            clears: 0,
            flushes: 0,
            swaps: 0,
            chosen_attribs: Vec::new(),
        }
    }

    fn handle(&mut self) -> usize {
        let handle = self.next_handle;
        self.next_handle += 0x10;
        handle
    }

    fn window_of(&self, device: usize) -> Option<usize> {
        self.windows
            .iter()
            .find(|(_, window)| window.device == device)
            .map(|(&hwnd, _)| hwnd)
    }

    fn device_format(&self, device: usize) -> Option<i32> {
        self.window_of(device).map(|hwnd| self.windows[&hwnd].pixel_format)
    }

    fn fail<T>(&mut self, api: &'static str, code: u32) -> Result<T> {
        self.last_error = code;
        Err(Error::platform(api, code))
    }

    /// Fails `api` if the configuration asks for it.
    fn check(&mut self, api: &'static str) -> Result<()> {
        if self.config.failing.contains(&api) {
            self.fail(api, ERROR_INVALID_PARAMETER)
        } else {
            Ok(())
        }
    }

    fn add_window(&mut self, kind: Option<WindowKind>, own_dc: bool) -> usize {
        let hwnd = self.handle();
        let device = hwnd + 1;
        self.windows.insert(
            hwnd,
            Window {
                kind,
                own_dc,
                user_data: 0,
                near: None,
                device,
                pixel_format: 0,
                device_refs: 0,
            },
        );
        hwnd
    }

    fn add_context(&mut self, device: usize, legacy: bool, share: usize) -> usize {
        let group = if share == 0 {
            let group = self.next_group;
            self.next_group += 1;
            group
        } else {
            self.contexts[&share].group
        };
        let handle = self.handle();
        self.contexts.insert(
            handle,
            Context { device, legacy, share, group, ..Context::default() },
        );
        handle
    }

    fn current_context(&mut self) -> Option<&mut Context> {
        let (_, context) = self.current?;
        self.contexts.get_mut(&context)
    }

    fn raise(&mut self, code: u32) {
        self.errors.push(code);
    }

    fn bound(&mut self, target: u32) -> u32 {
        match self.current_context() {
            Some(context) if target == gl::ELEMENT_ARRAY_BUFFER && context.vertex_array != 0 => {
                let vertex_array = context.vertex_array;
                context.vertex_arrays[&vertex_array].element_buffer
            }
            Some(context) => context.bindings.get(&target).cloned().unwrap_or(0),
            None => 0,
        }
    }

    fn group(&mut self) -> Option<usize> {
        self.current_context().map(|context| context.group)
    }

    /// Platform-created windows still alive.
    pub fn live_windows(&self) -> usize {
        self.windows.values().filter(|window| window.kind.is_some()).count()
    }

    /// Device contexts obtained and not released.
    pub fn outstanding_devices(&self) -> usize {
        self.windows.values().map(|window| window.device_refs).sum()
    }

    /// The root contexts, i.e. modern contexts without a share parent.
    pub fn roots(&self) -> Vec<&Context> {
        self.contexts.values().filter(|c| !c.legacy && c.share == 0).collect()
    }
}

thread_local! {
    static DRIVER: RefCell<Driver> = RefCell::new(Driver::new(Config::default()));
}

/// Runs `f` against the calling thread's driver.
pub fn with_driver<R, F: FnOnce(&mut Driver) -> R>(f: F) -> R {
    DRIVER.with(|driver| f(&mut driver.borrow_mut()))
}

/// Replaces the driver configuration, keeping its objects.
pub fn configure<F: FnOnce(&mut Config)>(f: F) {
    with_driver(|driver| {
        let mut config = driver.config.clone();
        f(&mut config);
        let fresh = Driver::new(config);
        driver.config = fresh.config;
        driver.gl_extensions = fresh.gl_extensions;
        driver.gl_extension_list = fresh.gl_extension_list;
        driver.wgl_extensions = fresh.wgl_extensions;
    })
}

/// Sets up logging for a test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates an application window.
pub fn drawable(own_dc: bool) -> RawWindowHandle {
    let hwnd = with_driver(|driver| driver.add_window(None, own_dc));
    let mut handle = Win32WindowHandle::empty();
    handle.hwnd = hwnd as *mut c_void;
    RawWindowHandle::Win32(handle)
}

/// The native window of a drawable.
pub fn hwnd(drawable: RawWindowHandle) -> usize {
    match drawable {
        RawWindowHandle::Win32(handle) => handle.hwnd as usize,
        _ => 0,
    }
}

/// Sets a pixel format on a drawable behind the display's back.
pub fn preset_pixel_format(drawable: RawWindowHandle, format: i32) {
    with_driver(|driver| {
        if let Some(window) = driver.windows.get_mut(&hwnd(drawable)) {
            window.pixel_format = format;
        }
    })
}

/// The pixel format set on a drawable.
pub fn pixel_format_of(drawable: RawWindowHandle) -> i32 {
    with_driver(|driver| driver.windows[&hwnd(drawable)].pixel_format)
}

/// The attributes a context was created with, or empty for legacy ones.
pub fn attribs_of(context: ContextHandle) -> Vec<(i32, i32)> {
    with_driver(|driver| driver.contexts[&(context.as_ptr() as usize)].attribs.clone())
}

/// The contents of a buffer visible to the current context.
pub fn buffer_contents(name: u32) -> Option<Vec<u8>> {
    with_driver(|driver| {
        let group = driver.group()?;
        driver.buffers.get(&(group, name)).cloned()
    })
}

/// The state of the current context.
pub fn current_state() -> Option<Context> {
    with_driver(|driver| driver.current_context().cloned())
}

/// Parses a `(key, value, ..., 0)` list.
fn pairs(list: *const i32) -> Vec<(i32, i32)> {
    let mut pairs = Vec::new();
    if list.is_null() {
        return pairs;
    }
    unsafe {
        let mut cursor = list;
        while *cursor != 0 {
            pairs.push((*cursor, *cursor.add(1)));
            cursor = cursor.add(2);
        }
    }
    pairs
}

fn describe(format: i32) -> PixelFormatDescriptor {
    PixelFormatDescriptor {
        flags: PfdFlags::DRAW_TO_WINDOW | PfdFlags::SUPPORT_OPENGL | PfdFlags::DOUBLE_BUFFER,
        pixel_type: PixelType::Rgba,
        color_bits: 32,
        red_bits: 8,
        red_shift: 16,
        green_bits: 8,
        green_shift: 8,
        blue_bits: 8,
        alpha_bits: 8,
        alpha_shift: 24,
        depth_bits: if format % 2 == 0 { 24 } else { 16 },
        stencil_bits: 8,
        ..PixelFormatDescriptor::default()
    }
}

// GL entry points

unsafe extern "system" fn get_error() -> u32 {
    with_driver(|driver| if driver.errors.is_empty() { 0 } else { driver.errors.remove(0) })
}

unsafe extern "system" fn clear(_mask: u32) {
    with_driver(|driver| {
        if driver.current.is_some() {
            driver.clears += 1;
        }
    })
}

unsafe extern "system" fn clear_color(_r: f32, _g: f32, _b: f32, _a: f32) {}

unsafe extern "system" fn flush() {
    with_driver(|driver| driver.flushes += 1)
}

unsafe extern "system" fn get_string(name: u32) -> *const u8 {
    with_driver(|driver| match name {
        gl::EXTENSIONS => driver.gl_extensions.as_ptr() as *const u8,
        gl::VERSION => driver.version.as_ptr() as *const u8,
        _ => {
            driver.raise(gl::INVALID_ENUM);
            ptr::null()
        }
    })
}

unsafe extern "system" fn get_stringi(name: u32, index: u32) -> *const u8 {
    with_driver(|driver| {
        match driver.gl_extension_list.get(index as usize) {
            Some(extension) if name == gl::EXTENSIONS => extension.as_ptr() as *const u8,
            _ => {
                driver.raise(gl::INVALID_VALUE);
                ptr::null()
            }
        }
    })
}

unsafe extern "system" fn get_integerv(pname: u32, data: *mut i32) {
    with_driver(|driver| match pname {
        gl::NUM_EXTENSIONS => *data = driver.gl_extension_list.len() as i32,
        _ => driver.raise(gl::INVALID_ENUM),
    })
}

unsafe extern "system" fn gen_buffers(n: i32, names: *mut u32) {
    with_driver(|driver| {
        let group = match driver.group() {
            Some(group) => group,
            None => return,
        };
        for i in 0 .. n as usize {
            let name = driver.next_name;
            driver.next_name += 1;
            driver.buffers.insert((group, name), Vec::new());
            *names.add(i) = name;
        }
    })
}

unsafe extern "system" fn delete_buffers(n: i32, names: *const u32) {
    with_driver(|driver| {
        let group = match driver.group() {
            Some(group) => group,
            None => return,
        };
        for &name in slice::from_raw_parts(names, n as usize) {
            driver.buffers.remove(&(group, name));
        }
    })
}

unsafe extern "system" fn bind_buffer(target: u32, name: u32) {
    with_driver(|driver| {
        let group = match driver.group() {
            Some(group) => group,
            None => return,
        };
        if name != 0 && !driver.buffers.contains_key(&(group, name)) {
            driver.raise(gl::INVALID_OPERATION);
            return;
        }
        if let Some(context) = driver.current_context() {
            if target == gl::ELEMENT_ARRAY_BUFFER && context.vertex_array != 0 {
                let vertex_array = context.vertex_array;
                if let Some(state) = context.vertex_arrays.get_mut(&vertex_array) {
                    state.element_buffer = name;
                }
            } else {
                context.bindings.insert(target, name);
            }
        }
    })
}

unsafe extern "system" fn buffer_data(target: u32, size: isize, data: *const c_void, _usage: u32) {
    with_driver(|driver| {
        let name = driver.bound(target);
        let group = driver.group().unwrap_or(0);
        match driver.buffers.get_mut(&(group, name)) {
            Some(contents) if name != 0 => {
                *contents = if data.is_null() {
                    vec![0; size as usize]
                } else {
                    slice::from_raw_parts(data as *const u8, size as usize).to_vec()
                };
            }
            _ => driver.raise(gl::INVALID_OPERATION),
        }
    })
}

unsafe extern "system" fn buffer_sub_data(
    target: u32,
    offset: isize,
    size: isize,
    data: *const c_void,
) {
    with_driver(|driver| {
        let name = driver.bound(target);
        let group = driver.group().unwrap_or(0);
        let (offset, size) = (offset as usize, size as usize);
        match driver.buffers.get_mut(&(group, name)) {
            Some(contents) if name != 0 && offset + size <= contents.len() => {
                let source = slice::from_raw_parts(data as *const u8, size);
                contents[offset .. offset + size].copy_from_slice(source);
            }
            Some(_) if name != 0 => driver.raise(gl::INVALID_VALUE),
            _ => driver.raise(gl::INVALID_OPERATION),
        }
    })
}

unsafe extern "system" fn get_buffer_parameteriv(target: u32, pname: u32, params: *mut i32) {
    with_driver(|driver| {
        let name = driver.bound(target);
        let group = driver.group().unwrap_or(0);
        let size = driver.buffers.get(&(group, name)).map(Vec::len);
        match size {
            Some(size) if name != 0 && pname == gl::BUFFER_SIZE => *params = size as i32,
            _ => driver.raise(gl::INVALID_OPERATION),
        }
    })
}

unsafe extern "system" fn gen_vertex_arrays(n: i32, names: *mut u32) {
    with_driver(|driver| {
        if let Some(context) = driver.current_context() {
            for i in 0 .. n as usize {
                context.last_vertex_array += 1;
                let name = context.last_vertex_array;
                context.vertex_arrays.insert(name, VertexArrayState::default());
                *names.add(i) = name;
            }
        }
    })
}

unsafe extern "system" fn delete_vertex_arrays(n: i32, names: *const u32) {
    with_driver(|driver| {
        if let Some(context) = driver.current_context() {
            for name in slice::from_raw_parts(names, n as usize) {
                context.vertex_arrays.remove(name);
                if context.vertex_array == *name {
                    context.vertex_array = 0;
                }
            }
        }
    })
}

unsafe extern "system" fn bind_vertex_array(name: u32) {
    with_driver(|driver| {
        let known = match driver.current_context() {
            Some(context) if name == 0 || context.vertex_arrays.contains_key(&name) => {
                context.vertex_array = name;
                true
            }
            Some(_) => false,
            None => true,
        };
        if !known {
            driver.raise(gl::INVALID_OPERATION);
        }
    })
}

unsafe extern "system" fn enable_vertex_attrib_array(index: u32) {
    with_driver(|driver| {
        if let Some(context) = driver.current_context() {
            let vertex_array = context.vertex_array;
            if let Some(state) = context.vertex_arrays.get_mut(&vertex_array) {
                state.enabled.push(index);
            }
        }
    })
}

fn record_pointer(index: u32, size: i32, ty: u32, integer: bool) {
    with_driver(|driver| {
        let buffer = driver.bound(gl::ARRAY_BUFFER);
        let recorded = match driver.current_context() {
            Some(context) if buffer != 0 => {
                let vertex_array = context.vertex_array;
                match context.vertex_arrays.get_mut(&vertex_array) {
                    Some(state) => {
                        state.pointers.push((index, buffer, size, ty, integer));
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        };
        if !recorded {
            driver.raise(gl::INVALID_OPERATION);
        }
    })
}

unsafe extern "system" fn vertex_attrib_pointer(
    index: u32,
    size: i32,
    ty: u32,
    _normalized: u8,
    _stride: i32,
    _offset: *const c_void,
) {
    record_pointer(index, size, ty, false)
}

unsafe extern "system" fn vertex_attrib_i_pointer(
    index: u32,
    size: i32,
    ty: u32,
    _stride: i32,
    _offset: *const c_void,
) {
    record_pointer(index, size, ty, true)
}

unsafe extern "system" fn enable(cap: u32) {
    with_driver(|driver| {
        if let Some(context) = driver.current_context() {
            if cap == gl::PRIMITIVE_RESTART {
                context.restart_enabled = true;
            }
        }
    })
}

unsafe extern "system" fn disable(cap: u32) {
    with_driver(|driver| {
        if let Some(context) = driver.current_context() {
            if cap == gl::PRIMITIVE_RESTART {
                context.restart_enabled = false;
            }
        }
    })
}

unsafe extern "system" fn primitive_restart_index(index: u32) {
    with_driver(|driver| {
        if let Some(context) = driver.current_context() {
            context.restart_index = index;
        }
    })
}

unsafe extern "system" fn draw_arrays(mode: u32, _first: i32, count: i32) {
    with_driver(|driver| {
        let drawn = match driver.current_context() {
            Some(context) if context.vertex_array != 0 => {
                context.draws.push((mode, count));
                true
            }
            _ => false,
        };
        if !drawn {
            driver.raise(gl::INVALID_OPERATION);
        }
    })
}

unsafe extern "system" fn draw_elements(mode: u32, count: i32, ty: u32, _offset: *const c_void) {
    with_driver(|driver| {
        let element_buffer = driver.bound(gl::ELEMENT_ARRAY_BUFFER);
        let group = driver.group().unwrap_or(0);
        let available = driver.buffers.get(&(group, element_buffer)).map(Vec::len).unwrap_or(0);
        let size = match ty {
            gl::UNSIGNED_BYTE => 1,
            gl::UNSIGNED_SHORT => 2,
            _ => 4,
        };
        let drawn = match driver.current_context() {
            Some(context) if element_buffer != 0 && count as usize * size <= available => {
                context.draws.push((mode, count));
                true
            }
            _ => false,
        };
        if !drawn {
            driver.raise(gl::INVALID_OPERATION);
        }
    })
}

// WGL entry points

unsafe extern "system" fn create_context_attribs(
    device: *const c_void,
    share: *const c_void,
    attribs: *const i32,
) -> *const c_void {
    with_driver(|driver| {
        let device = device as usize;
        let share = share as usize;
        if share == 0 && driver.config.failing.contains(&"wglCreateContextAttribsARB") {
            driver.last_error = ERROR_INVALID_PARAMETER;
            return ptr::null();
        }
        if driver.device_format(device).unwrap_or(0) == 0 {
            driver.last_error = ERROR_INVALID_PIXEL_FORMAT;
            return ptr::null();
        }
        if share != 0 && !driver.contexts.contains_key(&share) {
            driver.last_error = ERROR_INVALID_HANDLE;
            return ptr::null();
        }
        let handle = driver.add_context(device, false, share);
        if let Some(context) = driver.contexts.get_mut(&handle) {
            context.attribs = pairs(attribs);
        }
        handle as *const c_void
    })
}

unsafe extern "system" fn choose_pixel_format_arb(
    device: *const c_void,
    int_attribs: *const i32,
    _float_attribs: *const f32,
    max_formats: u32,
    formats: *mut i32,
    count: *mut u32,
) -> i32 {
    with_driver(|driver| {
        if driver.window_of(device as usize).is_none() {
            driver.last_error = ERROR_INVALID_HANDLE;
            return 0;
        }
        driver.chosen_attribs = pairs(int_attribs);
        let matching = driver.config.matching_formats.min(max_formats as usize);
        for i in 0 .. matching {
            *formats.add(i) = PREFERRED_FORMAT + i as i32;
        }
        *count = matching as u32;
        1
    })
}

unsafe extern "system" fn get_extensions_string_arb(_device: *const c_void) -> *const c_char {
    with_driver(|driver| driver.wgl_extensions.as_ptr())
}

unsafe extern "system" fn swap_interval(interval: i32) -> i32 {
    with_driver(|driver| match driver.current_context() {
        Some(context) if interval >= 0 => {
            context.swap_interval = interval;
            1
        }
        _ => 0,
    })
}

unsafe extern "system" fn get_swap_interval() -> i32 {
    with_driver(|driver| driver.current_context().map(|c| c.swap_interval).unwrap_or(0))
}

fn entry_point(name: &str) -> *const c_void {
    match name {
        "glGetError" => get_error as *const c_void,
        "glClear" => clear as *const c_void,
        "glClearColor" => clear_color as *const c_void,
        "glFlush" => flush as *const c_void,
        "glGetString" => get_string as *const c_void,
        "glGetStringi" => get_stringi as *const c_void,
        "glGetIntegerv" => get_integerv as *const c_void,
        "glGenBuffers" => gen_buffers as *const c_void,
        "glDeleteBuffers" => delete_buffers as *const c_void,
        "glBindBuffer" => bind_buffer as *const c_void,
        "glBufferData" => buffer_data as *const c_void,
        "glBufferSubData" => buffer_sub_data as *const c_void,
        "glGetBufferParameteriv" => get_buffer_parameteriv as *const c_void,
        "glGenVertexArrays" => gen_vertex_arrays as *const c_void,
        "glDeleteVertexArrays" => delete_vertex_arrays as *const c_void,
        "glBindVertexArray" => bind_vertex_array as *const c_void,
        "glEnableVertexAttribArray" => enable_vertex_attrib_array as *const c_void,
        "glVertexAttribPointer" => vertex_attrib_pointer as *const c_void,
        "glVertexAttribIPointer" => vertex_attrib_i_pointer as *const c_void,
        "glEnable" => enable as *const c_void,
        "glDisable" => disable as *const c_void,
        "glPrimitiveRestartIndex" => primitive_restart_index as *const c_void,
        "glDrawArrays" => draw_arrays as *const c_void,
        "glDrawElements" => draw_elements as *const c_void,
        "wglCreateContextAttribsARB" => create_context_attribs as *const c_void,
        "wglChoosePixelFormatARB" => choose_pixel_format_arb as *const c_void,
        "wglGetExtensionsStringARB" => get_extensions_string_arb as *const c_void,
        "wglSwapIntervalEXT" => swap_interval as *const c_void,
        "wglGetSwapIntervalEXT" => get_swap_interval as *const c_void,
        _ => ptr::null(),
    }
}

/// Resolves against the simulated driver.
#[derive(Debug, Default)]
pub struct MockResolver {
    device: DeviceHandle,
    extensions: ExtensionSet,
}

impl Resolver for MockResolver {
    fn resolve_entry_point(&self, name: &str) -> *const c_void {
        let missing = with_driver(|driver| driver.config.missing.iter().any(|m| *m == name));
        if missing {
            ptr::null()
        } else {
            entry_point(name)
        }
    }

    fn is_extension_present(&self, name: &str) -> bool {
        self.extensions.contains(name)
    }

    fn error_reporter(&self) -> Option<ErrorReporter> {
        Some(get_error)
    }
}

impl DeviceResolver for MockResolver {
    fn set_device(&mut self, device: DeviceHandle) -> Result<()> {
        let (current, root) = with_driver(|driver| {
            let current = driver.current;
            let root = current
                .and_then(|(_, context)| driver.contexts.get(&context))
                .map_or(false, |context| !context.legacy && context.share == 0);
            (current.map(|(device, _)| device), root && driver.config.fail_root_resolution)
        });
        if current != Some(device.as_ptr() as usize) {
            return Err(Error::platform("wglGetCurrentContext", ERROR_INVALID_HANDLE));
        }
        if root {
            return Err(Error::platform("wglGetProcAddress", ERROR_INVALID_HANDLE));
        }
        let (gl_extensions, wgl_extensions) = with_driver(|driver| {
            (driver.config.gl_extensions.join(" "), driver.config.wgl_extensions.join(" "))
        });
        self.device = device;
        self.extensions = ExtensionSet::from_strings(vec![
            gl_extensions.as_str(),
            wgl_extensions.as_str(),
        ]);
        Ok(())
    }

    fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }
}

/// Window, device, and context primitives of the simulated driver.
#[derive(Debug)]
pub struct MockPlatform;

impl MockPlatform {
    /// Resets the calling thread's driver to `config`.
    pub fn new(config: Config) -> Self {
        with_driver(|driver| *driver = Driver::new(config));
        MockPlatform
    }
}

impl Platform for MockPlatform {
    type Resolver = MockResolver;

    fn create_resolver(&self) -> Result<MockResolver> {
        Ok(MockResolver::default())
    }

    fn validate_drawable(&self, window: WindowHandle) -> Result<()> {
        with_driver(|driver| match driver.windows.get(&(window.as_ptr() as usize)) {
            None => Err(Error::invalid(format!("{:?} is not a window", window))),
            Some(window) if !window.own_dc => Err(Error::invalid("no private device context")),
            Some(_) => Ok(()),
        })
    }

    fn create_window(&self, request: &WindowRequest) -> Result<WindowHandle> {
        with_driver(|driver| {
            let hwnd = driver.add_window(Some(request.kind), true);
            if let Some(window) = driver.windows.get_mut(&hwnd) {
                window.user_data = request.user_data as usize;
                window.near = request.near.map(|near| near.as_ptr() as usize);
            }
            Ok(WindowHandle::from_ptr(hwnd as *mut c_void))
        })
    }

    fn destroy_window(&self, window: WindowHandle) -> Result<()> {
        with_driver(|driver| match driver.windows.remove(&(window.as_ptr() as usize)) {
            Some(_) => Ok(()),
            None => driver.fail("DestroyWindow", ERROR_INVALID_WINDOW_HANDLE),
        })
    }

    fn device(&self, window: WindowHandle) -> Result<DeviceHandle> {
        with_driver(|driver| match driver.windows.get_mut(&(window.as_ptr() as usize)) {
            Some(window) => {
                window.device_refs += 1;
                Ok(DeviceHandle::from_ptr(window.device as *mut c_void))
            }
            None => driver.fail("GetDC", ERROR_INVALID_WINDOW_HANDLE),
        })
    }

    fn release_device(&self, window: WindowHandle, device: DeviceHandle) -> Result<()> {
        with_driver(|driver| match driver.windows.get_mut(&(window.as_ptr() as usize)) {
            Some(window) if window.device == device.as_ptr() as usize && window.device_refs > 0 => {
                window.device_refs -= 1;
                Ok(())
            }
            _ => driver.fail("ReleaseDC", ERROR_INVALID_HANDLE),
        })
    }

    fn pixel_format(&self, device: DeviceHandle) -> Result<i32> {
        with_driver(|driver| match driver.device_format(device.as_ptr() as usize) {
            Some(format) => Ok(format),
            None => driver.fail("GetPixelFormat", ERROR_INVALID_HANDLE),
        })
    }

    fn choose_pixel_format(
        &self,
        device: DeviceHandle,
        descriptor: &PixelFormatDescriptor,
    ) -> Result<i32> {
        with_driver(|driver| {
            driver.check("ChoosePixelFormat")?;
            let supported = descriptor.flags.contains(PfdFlags::SUPPORT_OPENGL);
            match driver.window_of(device.as_ptr() as usize) {
                Some(_) if supported => Ok(LEGACY_FORMAT),
                _ => driver.fail("ChoosePixelFormat", ERROR_INVALID_PIXEL_FORMAT),
            }
        })
    }

    fn describe_pixel_format(
        &self,
        device: DeviceHandle,
        format: i32,
    ) -> Result<PixelFormatDescriptor> {
        with_driver(|driver| {
            let known = driver.window_of(device.as_ptr() as usize).is_some();
            if known && format >= 1 && format <= PIXEL_FORMATS {
                Ok(describe(format))
            } else {
                driver.fail("DescribePixelFormat", ERROR_INVALID_PARAMETER)
            }
        })
    }

    fn set_pixel_format(
        &self,
        device: DeviceHandle,
        format: i32,
        _descriptor: &PixelFormatDescriptor,
    ) -> Result<()> {
        with_driver(|driver| {
            driver.check("SetPixelFormat")?;
            let hwnd = driver.window_of(device.as_ptr() as usize);
            match hwnd.and_then(|hwnd| driver.windows.get_mut(&hwnd)) {
                Some(window) if window.pixel_format == 0 => {
                    window.pixel_format = format;
                    Ok(())
                }
                _ => driver.fail("SetPixelFormat", ERROR_INVALID_PIXEL_FORMAT),
            }
        })
    }

    fn create_legacy_context(&self, device: DeviceHandle) -> Result<ContextHandle> {
        with_driver(|driver| {
            driver.check("wglCreateContext")?;
            let device = device.as_ptr() as usize;
            if driver.device_format(device).unwrap_or(0) == 0 {
                return driver.fail("wglCreateContext", ERROR_INVALID_PIXEL_FORMAT);
            }
            let handle = driver.add_context(device, true, 0);
            Ok(ContextHandle::from_ptr(handle as *mut c_void))
        })
    }

    fn delete_context(&self, context: ContextHandle) -> Result<()> {
        with_driver(|driver| {
            let handle = context.as_ptr() as usize;
            if driver.contexts.remove(&handle).is_none() {
                return driver.fail("wglDeleteContext", ERROR_INVALID_HANDLE);
            }
            if driver.current.map(|(_, current)| current) == Some(handle) {
                driver.current = None;
            }
            Ok(())
        })
    }

    fn make_current(&self, device: DeviceHandle, context: ContextHandle) -> Result<()> {
        with_driver(|driver| {
            let (device, handle) = (device.as_ptr() as usize, context.as_ptr() as usize);
            if handle == 0 {
                driver.current = None;
                return Ok(());
            }
            let format = driver.device_format(device).unwrap_or(0);
            if format == 0 || !driver.contexts.contains_key(&handle) {
                return driver.fail("wglMakeCurrent", ERROR_INVALID_HANDLE);
            }
            driver.current = Some((device, handle));
            Ok(())
        })
    }

    fn clear_current(&self) -> Result<()> {
        with_driver(|driver| driver.current = None);
        Ok(())
    }

    fn current_context(&self) -> ContextHandle {
        let current = with_driver(|driver| driver.current.map(|(_, c)| c).unwrap_or(0));
        ContextHandle::from_ptr(current as *mut c_void)
    }

    fn current_device(&self) -> DeviceHandle {
        let current = with_driver(|driver| driver.current.map(|(d, _)| d).unwrap_or(0));
        DeviceHandle::from_ptr(current as *mut c_void)
    }

    fn swap_buffers(&self, device: DeviceHandle) -> Result<()> {
        with_driver(|driver| match driver.window_of(device.as_ptr() as usize) {
            Some(_) => {
                driver.swaps += 1;
                Ok(())
            }
            None => driver.fail("SwapBuffers", ERROR_INVALID_HANDLE),
        })
    }

    fn last_error(&self) -> u32 {
        with_driver(|driver| driver.last_error)
    }
}

/// Shorthand for the attribute token of a WGL constant.
pub fn token(value: u32) -> i32 {
    value as i32
}

/// The WGL tokens every modern pixel format request must carry.
pub fn mandatory_format_tokens() -> [(i32, i32); 2] {
    [(token(wgl::DRAW_TO_WINDOW_ARB), 1), (token(wgl::SUPPORT_OPENGL_ARB), 1)]
}
