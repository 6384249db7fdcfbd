//! Format and aspect compatibility for meta copies
//!
//! A meta copy may cross aspects (depth to color or color to depth) only
//! between formats with bit-identical texel layouts.

use ash::vk;

/// Depth/color pairs that can be copied into one another bit-exactly
const CROSS_ASPECT_PAIRS: [(vk::Format, vk::Format); 2] = [
    (vk::Format::D16_UNORM, vk::Format::R16_UNORM),
    (vk::Format::D32_SFLOAT, vk::Format::R32_SFLOAT),
];

/// Format a destination view must have to receive `src_format`
///
/// Returns `vk::Format::UNDEFINED` when the aspects differ and the source
/// format has no bit-exact counterpart on the destination side. Callers must
/// then abandon the copy.
pub fn resolve_destination_format(
    dst_aspect: vk::ImageAspectFlags,
    src_aspect: vk::ImageAspectFlags,
    src_format: vk::Format,
) -> vk::Format {
    if dst_aspect == src_aspect {
        return src_format;
    }

    if dst_aspect == vk::ImageAspectFlags::COLOR && src_aspect == vk::ImageAspectFlags::DEPTH {
        return CROSS_ASPECT_PAIRS
            .iter()
            .find(|(depth, _)| *depth == src_format)
            .map(|(_, color)| *color)
            .unwrap_or(vk::Format::UNDEFINED);
    }

    if dst_aspect == vk::ImageAspectFlags::DEPTH && src_aspect == vk::ImageAspectFlags::COLOR {
        return CROSS_ASPECT_PAIRS
            .iter()
            .find(|(_, color)| *color == src_format)
            .map(|(depth, _)| *depth)
            .unwrap_or(vk::Format::UNDEFINED);
    }

    vk::Format::UNDEFINED
}

/// Aspect mask covering every aspect of `format`
///
/// `None` for `UNDEFINED`.
pub fn format_aspect(format: vk::Format) -> Option<vk::ImageAspectFlags> {
    match format {
        vk::Format::UNDEFINED => None,
        vk::Format::D16_UNORM | vk::Format::X8_D24_UNORM_PACK32 | vk::Format::D32_SFLOAT => {
            Some(vk::ImageAspectFlags::DEPTH)
        }
        vk::Format::S8_UINT => Some(vk::ImageAspectFlags::STENCIL),
        vk::Format::D16_UNORM_S8_UINT
        | vk::Format::D24_UNORM_S8_UINT
        | vk::Format::D32_SFLOAT_S8_UINT => {
            Some(vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL)
        }
        _ => Some(vk::ImageAspectFlags::COLOR),
    }
}

/// True if `aspect` designates a color attachment
pub fn is_color_aspect(aspect: vk::ImageAspectFlags) -> bool {
    aspect.contains(vk::ImageAspectFlags::COLOR)
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
