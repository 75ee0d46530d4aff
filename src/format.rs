//! Display formats and the legacy pixel format descriptor.

use crate::properties::{Key, Properties, Value};
use crate::wgl;

/// A display format: the requested properties of the output surface.
pub type DisplayFormat = Properties<FormatKey>;

/// Display format keys.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FormatKey {
    /// `bool`; the format can render to a window. Always requested.
    DrawToWindow,

    /// `bool`; the format can render to a memory bitmap.
    DrawToBitmap,

    /// [`Acceleration`].
    Acceleration,

    /// `bool`; the format needs a logical palette.
    NeedPalette,

    /// `bool`.
    DoubleBuffer,

    /// `bool`.
    Stereo,

    /// [`SwapMethod`].
    SwapMethod,

    /// `bool`; the format supports a transparent key colour.
    Transparent,

    /// Red component of the transparent key colour.
    TransparentRed,

    /// Green component of the transparent key colour.
    TransparentGreen,

    /// Blue component of the transparent key colour.
    TransparentBlue,

    /// Alpha component of the transparent key colour.
    TransparentAlpha,

    /// Transparent colour index for indexed formats.
    TransparentIndex,

    /// [`PixelType`].
    PixelType,

    /// Colour bits, excluding alpha.
    ColorBits,

    RedBits,
    GreenBits,
    BlueBits,
    AlphaBits,
    AccumBits,
    AccumRedBits,
    AccumGreenBits,
    AccumBlueBits,
    AccumAlphaBits,
    DepthBits,
    StencilBits,

    /// Number of auxiliary buffers.
    AuxBuffers,

    /// Number of overlay planes.
    NumberOverlays,

    /// Number of underlay planes.
    NumberUnderlays,

    /// `bool`; layer planes share the main plane's depth buffer.
    ShareDepth,

    /// `bool`; layer planes share the main plane's stencil buffer.
    ShareStencil,

    /// `bool`; layer planes share the main plane's accumulation buffer.
    ShareAccum,
}

impl Key for FormatKey {
    const ALL: &'static [Self] = &[
        FormatKey::DrawToWindow,
        FormatKey::DrawToBitmap,
        FormatKey::Acceleration,
        FormatKey::NeedPalette,
        FormatKey::DoubleBuffer,
        FormatKey::Stereo,
        FormatKey::SwapMethod,
        FormatKey::Transparent,
        FormatKey::TransparentRed,
        FormatKey::TransparentGreen,
        FormatKey::TransparentBlue,
        FormatKey::TransparentAlpha,
        FormatKey::TransparentIndex,
        FormatKey::PixelType,
        FormatKey::ColorBits,
        FormatKey::RedBits,
        FormatKey::GreenBits,
        FormatKey::BlueBits,
        FormatKey::AlphaBits,
        FormatKey::AccumBits,
        FormatKey::AccumRedBits,
        FormatKey::AccumGreenBits,
        FormatKey::AccumBlueBits,
        FormatKey::AccumAlphaBits,
        FormatKey::DepthBits,
        FormatKey::StencilBits,
        FormatKey::AuxBuffers,
        FormatKey::NumberOverlays,
        FormatKey::NumberUnderlays,
        FormatKey::ShareDepth,
        FormatKey::ShareStencil,
        FormatKey::ShareAccum,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn token(self) -> i32 {
        let token = match self {
            FormatKey::DrawToWindow => wgl::DRAW_TO_WINDOW_ARB,
            FormatKey::DrawToBitmap => wgl::DRAW_TO_BITMAP_ARB,
            FormatKey::Acceleration => wgl::ACCELERATION_ARB,
            FormatKey::NeedPalette => wgl::NEED_PALETTE_ARB,
            FormatKey::DoubleBuffer => wgl::DOUBLE_BUFFER_ARB,
            FormatKey::Stereo => wgl::STEREO_ARB,
            FormatKey::SwapMethod => wgl::SWAP_METHOD_ARB,
            FormatKey::Transparent => wgl::TRANSPARENT_ARB,
            FormatKey::TransparentRed => wgl::TRANSPARENT_RED_VALUE_ARB,
            FormatKey::TransparentGreen => wgl::TRANSPARENT_GREEN_VALUE_ARB,
            FormatKey::TransparentBlue => wgl::TRANSPARENT_BLUE_VALUE_ARB,
            FormatKey::TransparentAlpha => wgl::TRANSPARENT_ALPHA_VALUE_ARB,
            FormatKey::TransparentIndex => wgl::TRANSPARENT_INDEX_VALUE_ARB,
            FormatKey::PixelType => wgl::PIXEL_TYPE_ARB,
            FormatKey::ColorBits => wgl::COLOR_BITS_ARB,
            FormatKey::RedBits => wgl::RED_BITS_ARB,
            FormatKey::GreenBits => wgl::GREEN_BITS_ARB,
            FormatKey::BlueBits => wgl::BLUE_BITS_ARB,
            FormatKey::AlphaBits => wgl::ALPHA_BITS_ARB,
            FormatKey::AccumBits => wgl::ACCUM_BITS_ARB,
            FormatKey::AccumRedBits => wgl::ACCUM_RED_BITS_ARB,
            FormatKey::AccumGreenBits => wgl::ACCUM_GREEN_BITS_ARB,
            FormatKey::AccumBlueBits => wgl::ACCUM_BLUE_BITS_ARB,
            FormatKey::AccumAlphaBits => wgl::ACCUM_ALPHA_BITS_ARB,
            FormatKey::DepthBits => wgl::DEPTH_BITS_ARB,
            FormatKey::StencilBits => wgl::STENCIL_BITS_ARB,
            FormatKey::AuxBuffers => wgl::AUX_BUFFERS_ARB,
            FormatKey::NumberOverlays => wgl::NUMBER_OVERLAYS_ARB,
            FormatKey::NumberUnderlays => wgl::NUMBER_UNDERLAYS_ARB,
            FormatKey::ShareDepth => wgl::SHARE_DEPTH_ARB,
            FormatKey::ShareStencil => wgl::SHARE_STENCIL_ARB,
            FormatKey::ShareAccum => wgl::SHARE_ACCUM_ARB,
        };
        token as i32
    }
}

/// Hardware acceleration requirement.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Acceleration {
    /// Software rendering only.
    None,

    /// Generic implementation with partial hardware acceleration.
    Generic,

    /// Full hardware acceleration.
    Full,
}

impl Value for Acceleration {
    fn to_raw(self) -> i32 {
        let token = match self {
            Acceleration::None => wgl::NO_ACCELERATION_ARB,
            Acceleration::Generic => wgl::GENERIC_ACCELERATION_ARB,
            Acceleration::Full => wgl::FULL_ACCELERATION_ARB,
        };
        token as i32
    }

    fn from_raw(raw: i32) -> Option<Self> {
        match raw as u32 {
            wgl::NO_ACCELERATION_ARB => Some(Acceleration::None),
            wgl::GENERIC_ACCELERATION_ARB => Some(Acceleration::Generic),
            wgl::FULL_ACCELERATION_ARB => Some(Acceleration::Full),
            _ => None,
        }
    }
}

/// How the back buffer is presented.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SwapMethod {
    /// Front and back buffers are exchanged.
    Exchange,

    /// The back buffer is copied to the front buffer.
    Copy,

    /// The back buffer contents are undefined after a swap.
    Undefined,
}

impl Value for SwapMethod {
    fn to_raw(self) -> i32 {
        let token = match self {
            SwapMethod::Exchange => wgl::SWAP_EXCHANGE_ARB,
            SwapMethod::Copy => wgl::SWAP_COPY_ARB,
            SwapMethod::Undefined => wgl::SWAP_UNDEFINED_ARB,
        };
        token as i32
    }

    fn from_raw(raw: i32) -> Option<Self> {
        match raw as u32 {
            wgl::SWAP_EXCHANGE_ARB => Some(SwapMethod::Exchange),
            wgl::SWAP_COPY_ARB => Some(SwapMethod::Copy),
            wgl::SWAP_UNDEFINED_ARB => Some(SwapMethod::Undefined),
            _ => None,
        }
    }
}

/// Colour representation of a pixel.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PixelType {
    /// Red, green, blue, and alpha channels.
    Rgba,

    /// Colour palette indices.
    Indexed,
}

impl Default for PixelType {
    fn default() -> Self {
        PixelType::Rgba
    }
}

impl Value for PixelType {
    fn to_raw(self) -> i32 {
        let token = match self {
            PixelType::Rgba => wgl::TYPE_RGBA_ARB,
            PixelType::Indexed => wgl::TYPE_COLORINDEX_ARB,
        };
        token as i32
    }

    fn from_raw(raw: i32) -> Option<Self> {
        match raw as u32 {
            wgl::TYPE_RGBA_ARB => Some(PixelType::Rgba),
            wgl::TYPE_COLORINDEX_ARB => Some(PixelType::Indexed),
            _ => None,
        }
    }
}

bitflags! {
    /// Flags of the legacy pixel format descriptor.
    pub struct PfdFlags: u32 {
        const DOUBLE_BUFFER = 0x0000_0001;
        const STEREO = 0x0000_0002;
        const DRAW_TO_WINDOW = 0x0000_0004;
        const DRAW_TO_BITMAP = 0x0000_0008;
        const SUPPORT_GDI = 0x0000_0010;
        const SUPPORT_OPENGL = 0x0000_0020;
        const GENERIC_FORMAT = 0x0000_0040;
        const NEED_PALETTE = 0x0000_0080;
        const NEED_SYSTEM_PALETTE = 0x0000_0100;
        const SWAP_EXCHANGE = 0x0000_0200;
        const SWAP_COPY = 0x0000_0400;
        const SWAP_LAYER_BUFFERS = 0x0000_0800;
        const GENERIC_ACCELERATED = 0x0000_1000;
        const DEPTH_DONT_CARE = 0x2000_0000;
        const DOUBLE_BUFFER_DONT_CARE = 0x4000_0000;
        const STEREO_DONT_CARE = 0x8000_0000;
    }
}

impl Default for PfdFlags {
    fn default() -> Self {
        PfdFlags::empty()
    }
}

/// Layer of a legacy pixel format.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LayerType {
    /// The main plane.
    Main,

    /// An overlay plane.
    Overlay,

    /// An underlay plane.
    Underlay,
}

impl Default for LayerType {
    fn default() -> Self {
        LayerType::Main
    }
}

/// Platform-neutral mirror of the legacy pixel format descriptor.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct PixelFormatDescriptor {
    pub flags: PfdFlags,
    pub pixel_type: PixelType,
    pub color_bits: u8,
    pub red_bits: u8,
    pub red_shift: u8,
    pub green_bits: u8,
    pub green_shift: u8,
    pub blue_bits: u8,
    pub blue_shift: u8,
    pub alpha_bits: u8,
    pub alpha_shift: u8,
    pub accum_bits: u8,
    pub accum_red_bits: u8,
    pub accum_green_bits: u8,
    pub accum_blue_bits: u8,
    pub accum_alpha_bits: u8,
    pub depth_bits: u8,
    pub stencil_bits: u8,
    pub aux_buffers: u8,
    pub layer_type: LayerType,

    /// Transparent colour index of an indexed underlay plane.
    pub visible_mask: u32,
}

impl Properties<FormatKey> {
    /// A double-buffered RGBA8 window format with 24 depth bits and 8
    /// stencil bits.
    pub fn standard() -> Self {
        Self::new()
            .with(FormatKey::DrawToWindow, true)
            .with(FormatKey::DoubleBuffer, true)
            .with(FormatKey::PixelType, PixelType::Rgba)
            .with(FormatKey::ColorBits, 24u8)
            .with(FormatKey::AlphaBits, 8u8)
            .with(FormatKey::DepthBits, 24u8)
            .with(FormatKey::StencilBits, 8u8)
    }

    /// Translates the format into a legacy descriptor.
    ///
    /// OpenGL support and window drawing are always requested. Undefined
    /// double-buffer, stereo, and depth keys degrade to "don't care".
    pub fn to_descriptor(&self) -> PixelFormatDescriptor {
        use self::FormatKey::*;

        let bits = |key| self.get(key, 0u8);
        let mut flags = PfdFlags::SUPPORT_OPENGL | PfdFlags::DRAW_TO_WINDOW;
        if self.get(DrawToBitmap, false) {
            flags |= PfdFlags::DRAW_TO_BITMAP;
        }
        if self.get(NeedPalette, false) {
            flags |= PfdFlags::NEED_PALETTE;
        }
        match self.try_get::<bool>(DoubleBuffer) {
            Some(true) => flags |= PfdFlags::DOUBLE_BUFFER,
            Some(false) => {}
            None => flags |= PfdFlags::DOUBLE_BUFFER_DONT_CARE,
        }
        match self.try_get::<bool>(Stereo) {
            Some(true) => flags |= PfdFlags::STEREO,
            Some(false) => {}
            None => flags |= PfdFlags::STEREO_DONT_CARE,
        }
        if !self.is_defined(DepthBits) {
            flags |= PfdFlags::DEPTH_DONT_CARE;
        }
        match self.try_get(SwapMethod) {
            Some(self::SwapMethod::Exchange) => flags |= PfdFlags::SWAP_EXCHANGE,
            Some(self::SwapMethod::Copy) => flags |= PfdFlags::SWAP_COPY,
            _ => {}
        }
        match self.try_get(Acceleration) {
            Some(self::Acceleration::Generic) => {
                flags |= PfdFlags::GENERIC_FORMAT | PfdFlags::GENERIC_ACCELERATED;
            }
            Some(self::Acceleration::None) => flags |= PfdFlags::GENERIC_FORMAT,
            _ => {}
        }

        let pixel_type = self.get(PixelType, self::PixelType::Rgba);
        let visible_mask = match pixel_type {
            self::PixelType::Indexed if self.get(Transparent, false) => {
                self.get(TransparentIndex, 0u32)
            }
            _ => 0,
        };

        PixelFormatDescriptor {
            flags,
            pixel_type,
            color_bits: bits(ColorBits),
            red_bits: bits(RedBits),
            green_bits: bits(GreenBits),
            blue_bits: bits(BlueBits),
            alpha_bits: bits(AlphaBits),
            accum_bits: bits(AccumBits),
            accum_red_bits: bits(AccumRedBits),
            accum_green_bits: bits(AccumGreenBits),
            accum_blue_bits: bits(AccumBlueBits),
            accum_alpha_bits: bits(AccumAlphaBits),
            depth_bits: bits(DepthBits),
            stencil_bits: bits(StencilBits),
            aux_buffers: bits(AuxBuffers),
            layer_type: LayerType::Main,
            visible_mask,
            ..Default::default()
        }
    }

    /// Builds a format from a legacy descriptor, defining every key the
    /// descriptor represents exactly.
    pub fn from_descriptor(pfd: &PixelFormatDescriptor) -> Self {
        use self::FormatKey::*;

        let flags = pfd.flags;
        let mut format = Self::new();
        format
            .define(DrawToWindow, flags.contains(PfdFlags::DRAW_TO_WINDOW))
            .define(DrawToBitmap, flags.contains(PfdFlags::DRAW_TO_BITMAP))
            .define(NeedPalette, flags.contains(PfdFlags::NEED_PALETTE))
            .define(PixelType, pfd.pixel_type)
            .define(ColorBits, pfd.color_bits)
            .define(RedBits, pfd.red_bits)
            .define(GreenBits, pfd.green_bits)
            .define(BlueBits, pfd.blue_bits)
            .define(AlphaBits, pfd.alpha_bits)
            .define(AccumBits, pfd.accum_bits)
            .define(AccumRedBits, pfd.accum_red_bits)
            .define(AccumGreenBits, pfd.accum_green_bits)
            .define(AccumBlueBits, pfd.accum_blue_bits)
            .define(AccumAlphaBits, pfd.accum_alpha_bits)
            .define(StencilBits, pfd.stencil_bits)
            .define(AuxBuffers, pfd.aux_buffers);

        if !flags.contains(PfdFlags::DOUBLE_BUFFER_DONT_CARE) {
            format.define(DoubleBuffer, flags.contains(PfdFlags::DOUBLE_BUFFER));
        }
        if !flags.contains(PfdFlags::STEREO_DONT_CARE) {
            format.define(Stereo, flags.contains(PfdFlags::STEREO));
        }
        if !flags.contains(PfdFlags::DEPTH_DONT_CARE) {
            format.define(DepthBits, pfd.depth_bits);
        }
        if flags.contains(PfdFlags::SWAP_EXCHANGE) {
            format.define(SwapMethod, self::SwapMethod::Exchange);
        } else if flags.contains(PfdFlags::SWAP_COPY) {
            format.define(SwapMethod, self::SwapMethod::Copy);
        }
        let acceleration = if !flags.contains(PfdFlags::GENERIC_FORMAT) {
            self::Acceleration::Full
        } else if flags.contains(PfdFlags::GENERIC_ACCELERATED) {
            self::Acceleration::Generic
        } else {
            self::Acceleration::None
        };
        format.define(Acceleration, acceleration);
        if pfd.pixel_type == self::PixelType::Indexed && pfd.visible_mask != 0 {
            format
                .define(Transparent, true)
                .define(TransparentIndex, pfd.visible_mask);
        }
        format
    }

    /// Materialises the format as the integer and float attribute lists
    /// of `wglChoosePixelFormatARB`.
    ///
    /// Window drawing and OpenGL support are always requested and the
    /// pixel type defaults to RGBA.
    pub fn to_pixel_format_attribs(&self) -> (Vec<i32>, Vec<f32>) {
        let mut ints = vec![
            wgl::DRAW_TO_WINDOW_ARB as i32,
            1,
            wgl::SUPPORT_OPENGL_ARB as i32,
            1,
        ];
        if !self.is_defined(FormatKey::PixelType) {
            ints.push(wgl::PIXEL_TYPE_ARB as i32);
            ints.push(PixelType::Rgba.to_raw());
        }
        for (key, value) in self.iter() {
            if key != FormatKey::DrawToWindow {
                key.encode(value, &mut ints);
            }
        }
        ints.push(0);
        (ints, vec![0.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_listed_in_index_order() {
        for (i, key) in FormatKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
        }
    }

    #[test]
    fn unspecified_keys_degrade_to_dont_care() {
        let pfd = DisplayFormat::new().to_descriptor();
        assert!(pfd.flags.contains(PfdFlags::SUPPORT_OPENGL | PfdFlags::DRAW_TO_WINDOW));
        assert!(pfd.flags.contains(PfdFlags::DOUBLE_BUFFER_DONT_CARE));
        assert!(pfd.flags.contains(PfdFlags::STEREO_DONT_CARE));
        assert!(pfd.flags.contains(PfdFlags::DEPTH_DONT_CARE));
        assert!(!pfd.flags.contains(PfdFlags::GENERIC_FORMAT));
        assert_eq!(pfd.pixel_type, PixelType::Rgba);
        assert_eq!(pfd.layer_type, LayerType::Main);
    }

    #[test]
    fn acceleration_maps_onto_generic_flags() {
        let pfd = |acceleration| {
            DisplayFormat::new()
                .with(FormatKey::Acceleration, acceleration)
                .to_descriptor()
                .flags
        };
        let generic = PfdFlags::GENERIC_FORMAT | PfdFlags::GENERIC_ACCELERATED;
        assert!(pfd(Acceleration::Generic).contains(generic));
        assert!(pfd(Acceleration::None).contains(PfdFlags::GENERIC_FORMAT));
        assert!(!pfd(Acceleration::None).contains(PfdFlags::GENERIC_ACCELERATED));
        assert!(!pfd(Acceleration::Full).intersects(generic));
    }

    #[test]
    fn indexed_transparency_uses_the_visible_mask() {
        let format = DisplayFormat::new()
            .with(FormatKey::PixelType, PixelType::Indexed)
            .with(FormatKey::Transparent, true)
            .with(FormatKey::TransparentIndex, 7i32);
        assert_eq!(format.to_descriptor().visible_mask, 7);

        let rgba = DisplayFormat::new()
            .with(FormatKey::Transparent, true)
            .with(FormatKey::TransparentIndex, 7i32);
        assert_eq!(rgba.to_descriptor().visible_mask, 0);
    }

    #[test]
    fn descriptor_round_trip_preserves_exact_keys() {
        let format = DisplayFormat::new()
            .with(FormatKey::DoubleBuffer, true)
            .with(FormatKey::Stereo, false)
            .with(FormatKey::SwapMethod, SwapMethod::Exchange)
            .with(FormatKey::Acceleration, Acceleration::Generic)
            .with(FormatKey::PixelType, PixelType::Indexed)
            .with(FormatKey::Transparent, true)
            .with(FormatKey::TransparentIndex, 3i32)
            .with(FormatKey::ColorBits, 32u8)
            .with(FormatKey::DepthBits, 24u8)
            .with(FormatKey::StencilBits, 8u8)
            .with(FormatKey::AccumBits, 64u8)
            .with(FormatKey::AuxBuffers, 2u8);
        let back = DisplayFormat::from_descriptor(&format.to_descriptor());
        for (key, value) in format.iter() {
            assert_eq!(back.raw(key), Some(value), "{:?}", key);
        }
    }

    #[test]
    fn dont_care_keys_stay_undefined() {
        let back = DisplayFormat::from_descriptor(&DisplayFormat::new().to_descriptor());
        assert!(!back.is_defined(FormatKey::DoubleBuffer));
        assert!(!back.is_defined(FormatKey::Stereo));
        assert!(!back.is_defined(FormatKey::DepthBits));
        assert!(!back.is_defined(FormatKey::SwapMethod));
    }

    #[test]
    fn modern_attribs_carry_mandatory_keys() {
        let (ints, floats) = DisplayFormat::new()
            .with(FormatKey::DrawToWindow, true)
            .with(FormatKey::DepthBits, 24u8)
            .to_pixel_format_attribs();
        assert_eq!(
            ints,
            vec![
                wgl::DRAW_TO_WINDOW_ARB as i32, 1,
                wgl::SUPPORT_OPENGL_ARB as i32, 1,
                wgl::PIXEL_TYPE_ARB as i32, wgl::TYPE_RGBA_ARB as i32,
                wgl::DEPTH_BITS_ARB as i32, 24,
                0,
            ],
        );
        assert_eq!(floats, vec![0.0]);
    }
}
