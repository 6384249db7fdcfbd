//! Cached meta copy pipelines
//!
//! One `CopyPipeline` exists per distinct `PipelineKey`. It owns the render
//! pass, descriptor set layout, pipeline layout and graphics pipeline built
//! for that key and releases them, newest first, when dropped.

use ash::vk;
use std::ffi::{CStr, CString};
use std::sync::Arc;

use crate::device::{
    AttachmentBinding, DepthStencilDesc, DescriptorBindingDesc, DescriptorSetLayoutDesc,
    GraphicsPipelineDesc, MetaCopyDevice, MultisampleDesc, PipelineLayoutDesc, RasterizationDesc,
    RenderPassDesc, ShaderStageDesc, TargetState,
};
use crate::error::Result;
use crate::format::is_color_aspect;
use crate::handle::Owned;

const OWNER: &str = "PipelineFactory";

/// Push-constant bytes available to the fragment stage (one `vk::Offset2D`)
pub const PUSH_CONSTANT_SIZE: u32 = std::mem::size_of::<vk::Offset2D>() as u32;

/// Cache key: what a pipeline is specialized for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub view_type: vk::ImageViewType,
    pub format: vk::Format,
    pub samples: vk::SampleCountFlags,
}

/// Raw handles of a cached pipeline
///
/// Owned by the factory and valid for its whole lifetime. Two values compare
/// equal when they name the same objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetaCopyPipeline {
    pub render_pass: vk::RenderPass,
    pub set_layout: vk::DescriptorSetLayout,
    pub pipeline_layout: vk::PipelineLayout,
    pub pipeline: vk::Pipeline,
}

/// Modules bound to the three pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineShaders {
    pub vertex: vk::ShaderModule,
    pub geometry: vk::ShaderModule,
    pub fragment: vk::ShaderModule,
}

/// Cache entry owning the four objects of one key
pub(crate) struct CopyPipeline {
    // Reverse creation order
    pipeline: Owned<vk::Pipeline>,
    pipeline_layout: Owned<vk::PipelineLayout>,
    set_layout: Owned<vk::DescriptorSetLayout>,
    render_pass: Owned<vk::RenderPass>,
}

impl CopyPipeline {
    /// Build every object for `key`
    ///
    /// Objects created before a failing step are released before returning.
    pub(crate) fn build(
        device: &Arc<dyn MetaCopyDevice>,
        key: &PipelineKey,
        aspect: vk::ImageAspectFlags,
        sampler: vk::Sampler,
        shaders: &PipelineShaders,
        entry_point: &CString,
        min_sample_shading: f32,
    ) -> Result<Self> {
        let rp_desc = pipeline_render_pass_desc(key, aspect);
        let render_pass = Owned::create(device, OWNER, |d| d.create_render_pass(&rp_desc))?;

        let dsl_desc = descriptor_set_layout_desc(sampler);
        let set_layout =
            Owned::create(device, OWNER, |d| d.create_descriptor_set_layout(&dsl_desc))?;

        let layout_desc = pipeline_layout_desc(set_layout.raw());
        let pipeline_layout =
            Owned::create(device, OWNER, |d| d.create_pipeline_layout(&layout_desc))?;

        let pipe_desc = graphics_pipeline_desc(
            key,
            aspect,
            shaders,
            entry_point,
            min_sample_shading,
            pipeline_layout.raw(),
            render_pass.raw(),
        );
        let pipeline = Owned::create(device, OWNER, |d| d.create_graphics_pipeline(&pipe_desc))?;

        Ok(Self {
            pipeline,
            pipeline_layout,
            set_layout,
            render_pass,
        })
    }

    pub(crate) fn handles(&self) -> MetaCopyPipeline {
        MetaCopyPipeline {
            render_pass: self.render_pass.raw(),
            set_layout: self.set_layout.raw(),
            pipeline_layout: self.pipeline_layout.raw(),
            pipeline: self.pipeline.raw(),
        }
    }
}

/// Render pass compatible with every destination of `key`
///
/// The attachment stays in `GENERAL` layout and is always loaded and stored.
/// Only compatibility matters here: copies run inside session render passes.
pub fn pipeline_render_pass_desc(key: &PipelineKey, aspect: vk::ImageAspectFlags) -> RenderPassDesc {
    let attachment = vk::AttachmentDescription {
        format: key.format,
        samples: key.samples,
        load_op: vk::AttachmentLoadOp::LOAD,
        store_op: vk::AttachmentStoreOp::STORE,
        stencil_load_op: vk::AttachmentLoadOp::DONT_CARE,
        stencil_store_op: vk::AttachmentStoreOp::DONT_CARE,
        initial_layout: vk::ImageLayout::GENERAL,
        final_layout: vk::ImageLayout::GENERAL,
        ..Default::default()
    };

    let binding = if is_color_aspect(aspect) {
        AttachmentBinding::Color(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
    } else {
        AttachmentBinding::DepthStencil(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
    };

    RenderPassDesc {
        attachment,
        binding,
        dependencies: Vec::new(),
    }
}

/// One fragment-only combined image sampler with `sampler` baked in
pub fn descriptor_set_layout_desc(sampler: vk::Sampler) -> DescriptorSetLayoutDesc {
    DescriptorSetLayoutDesc {
        bindings: vec![DescriptorBindingDesc {
            binding: 0,
            descriptor_type: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
            stages: vk::ShaderStageFlags::FRAGMENT,
            immutable_sampler: Some(sampler),
        }],
    }
}

pub fn pipeline_layout_desc(set_layout: vk::DescriptorSetLayout) -> PipelineLayoutDesc {
    PipelineLayoutDesc {
        set_layouts: vec![set_layout],
        push_constant_ranges: vec![vk::PushConstantRange {
            stage_flags: vk::ShaderStageFlags::FRAGMENT,
            offset: 0,
            size: PUSH_CONSTANT_SIZE,
        }],
    }
}

/// Depth/stencil state for depth targets: depth always written, no stencil
pub fn copy_depth_stencil_state() -> DepthStencilDesc {
    let stencil = vk::StencilOpState {
        fail_op: vk::StencilOp::KEEP,
        pass_op: vk::StencilOp::KEEP,
        depth_fail_op: vk::StencilOp::KEEP,
        compare_op: vk::CompareOp::ALWAYS,
        compare_mask: 0xFFFF_FFFF,
        write_mask: 0xFFFF_FFFF,
        reference: 0,
    };
    DepthStencilDesc {
        depth_test: true,
        depth_write: true,
        depth_compare_op: vk::CompareOp::ALWAYS,
        stencil_test: false,
        stencil,
    }
}

/// Blend state for color targets: plain overwrite of all four channels
pub fn copy_color_blend_state() -> vk::PipelineColorBlendAttachmentState {
    vk::PipelineColorBlendAttachmentState {
        blend_enable: vk::FALSE,
        src_color_blend_factor: vk::BlendFactor::ONE,
        dst_color_blend_factor: vk::BlendFactor::ZERO,
        color_blend_op: vk::BlendOp::ADD,
        src_alpha_blend_factor: vk::BlendFactor::ONE,
        dst_alpha_blend_factor: vk::BlendFactor::ZERO,
        alpha_blend_op: vk::BlendOp::ADD,
        color_write_mask: vk::ColorComponentFlags::RGBA,
    }
}

pub fn graphics_pipeline_desc(
    key: &PipelineKey,
    aspect: vk::ImageAspectFlags,
    shaders: &PipelineShaders,
    entry_point: &CStr,
    min_sample_shading: f32,
    layout: vk::PipelineLayout,
    render_pass: vk::RenderPass,
) -> GraphicsPipelineDesc {
    let stages = vec![
        ShaderStageDesc {
            stage: vk::ShaderStageFlags::VERTEX,
            module: shaders.vertex,
        },
        ShaderStageDesc {
            stage: vk::ShaderStageFlags::GEOMETRY,
            module: shaders.geometry,
        },
        ShaderStageDesc {
            stage: vk::ShaderStageFlags::FRAGMENT,
            module: shaders.fragment,
        },
    ];

    let target = if is_color_aspect(aspect) {
        TargetState::Color(copy_color_blend_state())
    } else {
        TargetState::DepthStencil(copy_depth_stencil_state())
    };

    GraphicsPipelineDesc {
        stages,
        entry_point: entry_point.to_owned(),
        topology: vk::PrimitiveTopology::POINT_LIST,
        dynamic_states: vec![vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR],
        rasterization: RasterizationDesc {
            depth_clamp: true,
            polygon_mode: vk::PolygonMode::FILL,
            cull_mode: vk::CullModeFlags::NONE,
            front_face: vk::FrontFace::COUNTER_CLOCKWISE,
        },
        multisample: MultisampleDesc {
            samples: key.samples,
            sample_shading: key.samples != vk::SampleCountFlags::TYPE_1,
            min_sample_shading,
        },
        target,
        layout,
        render_pass,
        subpass: 0,
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
