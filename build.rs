extern crate gl_generator;

use gl_generator::{Api, Fallbacks, Profile, Registry, StructGenerator};

fn main() {
    let out_dir = std::env::var("OUT_DIR").unwrap();
    let out_dir = std::path::Path::new(&out_dir);

    let mut file = std::fs::File::create(out_dir.join("gl_bindings.rs")).unwrap();
    Registry::new(Api::Gl, (3, 3), Profile::Core, Fallbacks::All, ["GL_KHR_debug"])
        .write_bindings(StructGenerator, &mut file)
        .unwrap();

    let mut file = std::fs::File::create(out_dir.join("wgl_bindings.rs")).unwrap();
    Registry::new(
        Api::Wgl,
        (1, 0),
        Profile::Core,
        Fallbacks::All,
        [
            "WGL_ARB_create_context",
            "WGL_ARB_create_context_no_error",
            "WGL_ARB_create_context_profile",
            "WGL_ARB_create_context_robustness",
            "WGL_ARB_extensions_string",
            "WGL_ARB_pixel_format",
            "WGL_EXT_create_context_es2_profile",
            "WGL_EXT_extensions_string",
            "WGL_EXT_swap_control",
        ],
    )
    .write_bindings(StructGenerator, &mut file)
    .unwrap();
}
