//! Image view descriptor consumed by meta copies
//!
//! Views are owned by the caller and only described here: the session and the
//! factory never create or destroy them.

use ash::vk;

/// Everything a meta copy needs to know about an image view
#[derive(Debug, Clone, Copy)]
pub struct ImageViewInfo {
    pub handle: vk::ImageView,
    pub view_type: vk::ImageViewType,
    pub format: vk::Format,
    pub aspect: vk::ImageAspectFlags,
    pub samples: vk::SampleCountFlags,
    /// Layout the image is kept in between operations
    pub layout: vk::ImageLayout,
    /// Pipeline stages that access the image outside of the copy
    pub stages: vk::PipelineStageFlags,
    /// Access types used by those stages
    pub access: vk::AccessFlags,
    pub subresource_range: vk::ImageSubresourceRange,
    /// Extent of mip level 0 of the underlying image
    pub image_extent: vk::Extent3D,
}

impl ImageViewInfo {
    /// Extent of the view's mip `level`, relative to its base mip level
    pub fn mip_level_extent(&self, level: u32) -> vk::Extent3D {
        let mip = self.subresource_range.base_mip_level.saturating_add(level);
        vk::Extent3D {
            width: mip_dimension(self.image_extent.width, mip),
            height: mip_dimension(self.image_extent.height, mip),
            depth: mip_dimension(self.image_extent.depth, mip),
        }
    }

    pub fn layer_count(&self) -> u32 {
        self.subresource_range.layer_count
    }
}

fn mip_dimension(size: u32, mip: u32) -> u32 {
    size.checked_shr(mip).unwrap_or(0).max(1)
}

#[cfg(test)]
#[path = "image_view_tests.rs"]
mod tests;
