extern crate env_logger;
extern crate glctx;
extern crate raw_window_handle;
#[cfg(windows)]
extern crate winapi;

#[cfg(windows)]
mod win32 {
    use glctx::buffer::{Attribute, ComponentType, Usage, VertexSchema};
    use glctx::shader::Stage;
    use glctx::{gl, ContextKey, ContextOptions, DisplayFormat, Driver, ProfileMask};
    use raw_window_handle::{RawWindowHandle, Win32WindowHandle};
    use std::{error, mem, ptr};
    use winapi::shared::minwindef::{LPARAM, LRESULT, UINT, WPARAM};
    use winapi::shared::windef::HWND;
    use winapi::um::libloaderapi::GetModuleHandleW;
    use winapi::um::winuser::{
        CreateWindowExW,
        DefWindowProcW,
        DispatchMessageW,
        PeekMessageW,
        PostQuitMessage,
        RegisterClassW,
        ShowWindow,
        TranslateMessage,
        CS_HREDRAW,
        CS_OWNDC,
        CS_VREDRAW,
        CW_USEDEFAULT,
        MSG,
        PM_REMOVE,
        SW_SHOWNORMAL,
        WM_DESTROY,
        WM_QUIT,
        WNDCLASSW,
        WS_OVERLAPPEDWINDOW,
    };

    #[derive(Clone, Copy)]
    #[repr(C)]
    struct Vertex {
        position: [f32; 2],
        color: [u8; 4],
    }

    const TRIANGLE_DATA: &[Vertex] = &[
        Vertex { position: [-0.5, -0.5], color: [255, 0, 0, 255] },
        Vertex { position: [0.5, -0.5], color: [0, 255, 0, 255] },
        Vertex { position: [0.0, 0.5], color: [0, 0, 255, 255] },
    ];

    const VERTEX_SHADER: &str = "
        #version 330 core
        layout(location = 0) in vec2 a_Position;
        layout(location = 1) in vec4 a_Color;
        out vec4 v_Color;
        void main() {
            v_Color = a_Color;
            gl_Position = vec4(a_Position, 0.0, 1.0);
        }
    ";

    const FRAGMENT_SHADER: &str = "
        #version 330 core
        in vec4 v_Color;
        out vec4 o_Color;
        void main() {
            o_Color = v_Color;
        }
    ";

    unsafe extern "system" fn window_proc(
        hwnd: HWND,
        msg: UINT,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        if msg == WM_DESTROY {
            PostQuitMessage(0);
            return 0;
        }
        DefWindowProcW(hwnd, msg, wparam, lparam)
    }

    fn encode_wide(input: &str) -> Vec<u16> {
        input.encode_utf16().chain(Some(0)).collect()
    }

    fn create_window() -> Result<RawWindowHandle, Box<dyn error::Error>> {
        let instance = unsafe { GetModuleHandleW(ptr::null()) };
        let class_name = encode_wide("glctx triangle");
        let title = encode_wide("triangle");

        let mut class: WNDCLASSW = unsafe { mem::zeroed() };
        class.style = CS_HREDRAW | CS_VREDRAW | CS_OWNDC;
        class.hInstance = instance;
        class.lpszClassName = class_name.as_ptr();
        class.lpfnWndProc = Some(window_proc);
        if unsafe { RegisterClassW(&class) } == 0 {
            return Err("failed to register window class".into());
        }

        let hwnd = unsafe {
            CreateWindowExW(
                0,
                class_name.as_ptr(),
                title.as_ptr(),
                WS_OVERLAPPEDWINDOW,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                640,
                480,
                ptr::null_mut(),
                ptr::null_mut(),
                instance,
                ptr::null_mut(),
            )
        };
        if hwnd.is_null() {
            return Err("failed to create window".into());
        }
        unsafe { ShowWindow(hwnd, SW_SHOWNORMAL) };

        let mut handle = Win32WindowHandle::empty();
        handle.hwnd = hwnd as *mut _;
        handle.hinstance = instance as *mut _;
        Ok(RawWindowHandle::Win32(handle))
    }

    /// Returns `false` once the window has been closed.
    fn pump_messages() -> bool {
        let mut msg: MSG = unsafe { mem::zeroed() };
        unsafe {
            while PeekMessageW(&mut msg, ptr::null_mut(), 0, 0, PM_REMOVE) != 0 {
                if msg.message == WM_QUIT {
                    return false;
                }
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
        true
    }

    pub fn run() -> Result<(), Box<dyn error::Error>> {
        let window = create_window()?;
        let driver = Driver::native()?;
        let display = driver.create_display(DisplayFormat::standard())?;
        let options = ContextOptions::version(3, 3)
            .with(ContextKey::ProfileMask, ProfileMask::CORE);
        let context = display.create_context(window, &options)?;
        context.make_current()?;
        if let Err(error) = context.set_swap_interval(1) {
            log::warn!("vsync unavailable: {}", error);
        }

        let vertex_shader = context.create_shader(Stage::Vertex, VERTEX_SHADER)?;
        let fragment_shader = context.create_shader(Stage::Fragment, FRAGMENT_SHADER)?;
        let program = context.create_program(&[&vertex_shader, &fragment_shader])?;
        if !context.is_linked(&program)? {
            return Err(context.program_info_log(&program)?.into());
        }

        let schema = VertexSchema::new(
            mem::size_of::<Vertex>(),
            &[
                Attribute::new(0, 2, ComponentType::F32, false, 0),
                Attribute::new(1, 4, ComponentType::U8, true, 8),
            ],
        )?;
        let vertices = context.create_vertex_buffer(schema, Usage::StaticDraw, TRIANGLE_DATA)?;
        let vertex_array = context.create_vertex_array(&[&vertices], None)?;

        let core = context.api().core();
        core.clear_color(0.1, 0.1, 0.1, 1.0)?;
        while pump_messages() {
            core.clear(gl::COLOR_BUFFER_BIT)?;
            context.use_program(Some(&program))?;
            context.draw_arrays(&vertex_array, gl::TRIANGLES, 0, vertices.len())?;
            context.swap_buffers()?;
        }
        Ok(())
    }
}

#[cfg(windows)]
fn main() {
    env_logger::init();
    if let Err(error) = win32::run() {
        eprintln!("triangle: {}", error);
    }
}

#[cfg(not(windows))]
fn main() {
    env_logger::init();
    eprintln!("triangle: this demo requires WGL and only runs on Windows");
}
