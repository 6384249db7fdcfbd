//! Per-draw state of a meta copy
//!
//! The caller records the draw itself. This module only computes what goes
//! into it: dynamic viewport/scissor, push constants and draw counts.

use ash::vk;
use glam::IVec2;

use crate::pipeline::PUSH_CONSTANT_SIZE;

/// Rectangle copied from the source to the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyRegion {
    pub src_offset: vk::Offset2D,
    pub dst_offset: vk::Offset2D,
    pub extent: vk::Extent2D,
}

/// Dynamic state and counts for the single draw of a meta copy
#[derive(Debug, Clone, Copy)]
pub struct CopyDraw {
    pub viewport: vk::Viewport,
    pub scissor: vk::Rect2D,
    /// Added to destination pixel coordinates to find the source texel
    pub push_offset: IVec2,
    pub vertex_count: u32,
    /// One instance per destination layer
    pub instance_count: u32,
}

impl CopyDraw {
    /// Push-constant data for the fragment stage
    pub fn push_constant_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.push_offset)
    }
}

pub fn copy_draw(region: &CopyRegion, layer_count: u32) -> CopyDraw {
    let viewport = vk::Viewport {
        x: region.dst_offset.x as f32,
        y: region.dst_offset.y as f32,
        width: region.extent.width as f32,
        height: region.extent.height as f32,
        min_depth: 0.0,
        max_depth: 1.0,
    };

    let scissor = vk::Rect2D {
        offset: region.dst_offset,
        extent: region.extent,
    };

    // Wraps like the shader's 32-bit integer add
    let push_offset = IVec2::new(
        region.src_offset.x.wrapping_sub(region.dst_offset.x),
        region.src_offset.y.wrapping_sub(region.dst_offset.y),
    );
    debug_assert_eq!(std::mem::size_of::<IVec2>(), PUSH_CONSTANT_SIZE as usize);

    CopyDraw {
        viewport,
        scissor,
        push_offset,
        vertex_count: 1,
        instance_count: layer_count,
    }
}

#[cfg(test)]
#[path = "draw_tests.rs"]
mod tests;
