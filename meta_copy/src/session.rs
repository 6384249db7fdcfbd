//! Attachment session
//!
//! Per-copy render pass and framebuffer targeting one destination view. The
//! render pass depends on the destination's current layout, which can change
//! between copies, so nothing here is cached.

use ash::vk;
use std::sync::Arc;

use crate::device::{AttachmentBinding, FramebufferDesc, MetaCopyDevice, RenderPassDesc};
use crate::error::{Error, Result};
use crate::format::{format_aspect, is_color_aspect};
use crate::handle::Owned;
use crate::image_view::ImageViewInfo;
use crate::meta_trace;

const OWNER: &str = "AttachmentSession";

/// Render pass + framebuffer for one meta copy
///
/// Both objects are destroyed when the session is dropped, framebuffer first.
/// The caller must not drop the session while GPU work using it is pending.
pub struct AttachmentSession {
    // Drop order: framebuffer, then render pass
    framebuffer: Owned<vk::Framebuffer>,
    render_pass: Owned<vk::RenderPass>,
    destination: ImageViewInfo,
    source: ImageViewInfo,
    discard_destination: bool,
}

impl AttachmentSession {
    /// Build the render pass and framebuffer for a copy into `destination`
    ///
    /// With `discard_destination`, previous destination contents are not
    /// loaded and the attachment starts in `UNDEFINED` layout.
    pub fn new(
        device: &Arc<dyn MetaCopyDevice>,
        destination: ImageViewInfo,
        source: ImageViewInfo,
        discard_destination: bool,
    ) -> Result<Self> {
        if format_aspect(destination.format).is_none() {
            return Err(Error::UnsupportedFormat(destination.format));
        }

        let rp_desc = session_render_pass_desc(&destination, discard_destination);
        let render_pass = Owned::create(device, OWNER, |d| d.create_render_pass(&rp_desc))?;

        // On failure `render_pass` is dropped here and destroyed
        let fb_desc = session_framebuffer_desc(&destination, render_pass.raw());
        let framebuffer = Owned::create(device, OWNER, |d| d.create_framebuffer(&fb_desc))?;

        meta_trace!(
            "meta_copy::session",
            "Created session for {:?} ({}x{}, {} layers, discard={})",
            destination.format,
            fb_desc.width,
            fb_desc.height,
            fb_desc.layers,
            discard_destination
        );

        Ok(Self {
            framebuffer,
            render_pass,
            destination,
            source,
            discard_destination,
        })
    }

    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass.raw()
    }

    pub fn framebuffer(&self) -> vk::Framebuffer {
        self.framebuffer.raw()
    }

    pub fn destination(&self) -> &ImageViewInfo {
        &self.destination
    }

    pub fn source(&self) -> &ImageViewInfo {
        &self.source
    }

    pub fn discards_destination(&self) -> bool {
        self.discard_destination
    }

    /// Framebuffer extent (destination mip level extent)
    pub fn extent(&self) -> vk::Extent2D {
        let extent = self.destination.mip_level_extent(0);
        vk::Extent2D {
            width: extent.width,
            height: extent.height,
        }
    }

    pub fn layer_count(&self) -> u32 {
        self.destination.layer_count()
    }
}

/// Render pass description for a session targeting `dst`
pub fn session_render_pass_desc(dst: &ImageViewInfo, discard: bool) -> RenderPassDesc {
    let (load_op, initial_layout) = if discard {
        (vk::AttachmentLoadOp::DONT_CARE, vk::ImageLayout::UNDEFINED)
    } else {
        (vk::AttachmentLoadOp::LOAD, dst.layout)
    };

    let attachment = vk::AttachmentDescription {
        format: dst.format,
        samples: dst.samples,
        load_op,
        store_op: vk::AttachmentStoreOp::STORE,
        stencil_load_op: vk::AttachmentLoadOp::DONT_CARE,
        stencil_store_op: vk::AttachmentStoreOp::DONT_CARE,
        initial_layout,
        final_layout: dst.layout,
        ..Default::default()
    };

    let binding = if is_color_aspect(dst.aspect) {
        AttachmentBinding::Color(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
    } else {
        AttachmentBinding::DepthStencil(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
    };

    // Color-attachment stages are used for depth targets as well
    let dependencies = vec![
        vk::SubpassDependency {
            src_subpass: vk::SUBPASS_EXTERNAL,
            dst_subpass: 0,
            src_stage_mask: dst.stages,
            dst_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            src_access_mask: vk::AccessFlags::empty(),
            dst_access_mask: vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
            dependency_flags: vk::DependencyFlags::empty(),
        },
        vk::SubpassDependency {
            src_subpass: 0,
            dst_subpass: vk::SUBPASS_EXTERNAL,
            src_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            dst_stage_mask: dst.stages,
            src_access_mask: vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
            dst_access_mask: dst.access,
            dependency_flags: vk::DependencyFlags::empty(),
        },
    ];

    RenderPassDesc {
        attachment,
        binding,
        dependencies,
    }
}

/// Framebuffer description binding `dst` to `render_pass`
pub fn session_framebuffer_desc(dst: &ImageViewInfo, render_pass: vk::RenderPass) -> FramebufferDesc {
    let extent = dst.mip_level_extent(0);
    FramebufferDesc {
        render_pass,
        attachment: dst.handle,
        width: extent.width,
        height: extent.height,
        layers: dst.layer_count(),
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
