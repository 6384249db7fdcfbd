//! Vulkan implementation of MetaCopyDevice
//!
//! Turns the core's plain object descriptions into `vk::*CreateInfo`
//! structures and creates them on an `ash::Device`. The device handle is
//! borrowed: creating and destroying the logical device stays with the caller.

use ash::prelude::VkResult;
use ash::vk;

use meta_copy::device::{
    AttachmentBinding, DepthStencilDesc, DescriptorSetLayoutDesc, FramebufferDesc,
    GraphicsPipelineDesc, MetaCopyDevice, MultisampleDesc, PipelineLayoutDesc, RasterizationDesc,
    RenderPassDesc, SamplerDesc,
};

/// `MetaCopyDevice` backed by an `ash::Device`
pub struct VulkanDevice {
    device: ash::Device,
    pipeline_cache: vk::PipelineCache,
}

impl VulkanDevice {
    pub fn new(device: ash::Device) -> Self {
        Self::with_pipeline_cache(device, vk::PipelineCache::null())
    }

    /// Use `pipeline_cache` for every graphics pipeline created
    pub fn with_pipeline_cache(device: ash::Device, pipeline_cache: vk::PipelineCache) -> Self {
        meta_copy::meta_debug!(
            "meta_copy_vulkan::device",
            "Vulkan meta copy device created (pipeline cache: {})",
            if pipeline_cache == vk::PipelineCache::null() { "none" } else { "external" }
        );
        Self {
            device,
            pipeline_cache,
        }
    }

    pub fn device(&self) -> &ash::Device {
        &self.device
    }
}

// ============================================================================
// Pure conversions
// ============================================================================

/// (color reference, depth/stencil reference) for the single attachment
pub fn attachment_reference_split(
    binding: AttachmentBinding,
) -> (Option<vk::AttachmentReference>, Option<vk::AttachmentReference>) {
    let reference = vk::AttachmentReference {
        attachment: 0,
        layout: binding.layout(),
    };
    match binding {
        AttachmentBinding::Color(_) => (Some(reference), None),
        AttachmentBinding::DepthStencil(_) => (None, Some(reference)),
    }
}

pub fn sampler_create_info(desc: &SamplerDesc) -> vk::SamplerCreateInfo<'static> {
    vk::SamplerCreateInfo::default()
        .mag_filter(desc.mag_filter)
        .min_filter(desc.min_filter)
        .mipmap_mode(desc.mipmap_mode)
        .address_mode_u(desc.address_mode)
        .address_mode_v(desc.address_mode)
        .address_mode_w(desc.address_mode)
        .mip_lod_bias(desc.mip_lod_bias)
        .anisotropy_enable(desc.max_anisotropy.is_some())
        .max_anisotropy(desc.max_anisotropy.unwrap_or(1.0))
        .compare_enable(desc.compare_op.is_some())
        .compare_op(desc.compare_op.unwrap_or(vk::CompareOp::ALWAYS))
        .min_lod(desc.min_lod)
        .max_lod(desc.max_lod)
        .border_color(desc.border_color)
        .unnormalized_coordinates(desc.unnormalized_coordinates)
}

pub fn rasterization_state_info(
    desc: &RasterizationDesc,
) -> vk::PipelineRasterizationStateCreateInfo<'static> {
    vk::PipelineRasterizationStateCreateInfo::default()
        .depth_clamp_enable(desc.depth_clamp)
        .rasterizer_discard_enable(false)
        .polygon_mode(desc.polygon_mode)
        .cull_mode(desc.cull_mode)
        .front_face(desc.front_face)
        .depth_bias_enable(false)
        .line_width(1.0)
}

/// Multisample state; a null sample mask means every sample is written
pub fn multisample_state_info(
    desc: &MultisampleDesc,
) -> vk::PipelineMultisampleStateCreateInfo<'static> {
    vk::PipelineMultisampleStateCreateInfo::default()
        .rasterization_samples(desc.samples)
        .sample_shading_enable(desc.sample_shading)
        .min_sample_shading(desc.min_sample_shading)
        .alpha_to_coverage_enable(false)
        .alpha_to_one_enable(false)
}

pub fn depth_stencil_state_info(
    desc: &DepthStencilDesc,
) -> vk::PipelineDepthStencilStateCreateInfo<'static> {
    vk::PipelineDepthStencilStateCreateInfo::default()
        .depth_test_enable(desc.depth_test)
        .depth_write_enable(desc.depth_write)
        .depth_compare_op(desc.depth_compare_op)
        .depth_bounds_test_enable(false)
        .stencil_test_enable(desc.stencil_test)
        .front(desc.stencil)
        .back(desc.stencil)
        .min_depth_bounds(0.0)
        .max_depth_bounds(1.0)
}

// ============================================================================
// MetaCopyDevice implementation
// ============================================================================

impl MetaCopyDevice for VulkanDevice {
    fn create_sampler(&self, desc: &SamplerDesc) -> VkResult<vk::Sampler> {
        let info = sampler_create_info(desc);
        unsafe { self.device.create_sampler(&info, None) }
    }

    fn create_shader_module(&self, code: &[u32]) -> VkResult<vk::ShaderModule> {
        let info = vk::ShaderModuleCreateInfo::default().code(code);
        unsafe { self.device.create_shader_module(&info, None) }
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> VkResult<vk::RenderPass> {
        let (color_ref, depth_ref) = attachment_reference_split(desc.binding);

        let mut subpass =
            vk::SubpassDescription::default().pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS);
        if let Some(color_ref) = color_ref.as_ref() {
            subpass = subpass.color_attachments(std::slice::from_ref(color_ref));
        }
        if let Some(depth_ref) = depth_ref.as_ref() {
            subpass = subpass.depth_stencil_attachment(depth_ref);
        }

        let info = vk::RenderPassCreateInfo::default()
            .attachments(std::slice::from_ref(&desc.attachment))
            .subpasses(std::slice::from_ref(&subpass))
            .dependencies(&desc.dependencies);

        unsafe { self.device.create_render_pass(&info, None) }
    }

    fn create_framebuffer(&self, desc: &FramebufferDesc) -> VkResult<vk::Framebuffer> {
        let info = vk::FramebufferCreateInfo::default()
            .render_pass(desc.render_pass)
            .attachments(std::slice::from_ref(&desc.attachment))
            .width(desc.width)
            .height(desc.height)
            .layers(desc.layers);

        unsafe { self.device.create_framebuffer(&info, None) }
    }

    fn create_descriptor_set_layout(
        &self,
        desc: &DescriptorSetLayoutDesc,
    ) -> VkResult<vk::DescriptorSetLayout> {
        let bindings: Vec<vk::DescriptorSetLayoutBinding> = desc
            .bindings
            .iter()
            .map(|b| {
                let binding = vk::DescriptorSetLayoutBinding::default()
                    .binding(b.binding)
                    .descriptor_type(b.descriptor_type)
                    .stage_flags(b.stages);
                match &b.immutable_sampler {
                    // Sets descriptor_count to 1
                    Some(sampler) => binding.immutable_samplers(std::slice::from_ref(sampler)),
                    None => binding.descriptor_count(1),
                }
            })
            .collect();

        let info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);
        unsafe { self.device.create_descriptor_set_layout(&info, None) }
    }

    fn create_pipeline_layout(&self, desc: &PipelineLayoutDesc) -> VkResult<vk::PipelineLayout> {
        let info = vk::PipelineLayoutCreateInfo::default()
            .set_layouts(&desc.set_layouts)
            .push_constant_ranges(&desc.push_constant_ranges);

        unsafe { self.device.create_pipeline_layout(&info, None) }
    }

    fn create_graphics_pipeline(&self, desc: &GraphicsPipelineDesc) -> VkResult<vk::Pipeline> {
        let stages: Vec<vk::PipelineShaderStageCreateInfo> = desc
            .stages
            .iter()
            .map(|s| {
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(s.stage)
                    .module(s.module)
                    .name(desc.entry_point.as_c_str())
            })
            .collect();

        let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default();
        let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(desc.topology)
            .primitive_restart_enable(false);

        // Viewport and scissor are dynamic: counts only
        let mut viewport_state = vk::PipelineViewportStateCreateInfo::default();
        viewport_state.viewport_count = 1;
        viewport_state.scissor_count = 1;

        let rasterization_state = rasterization_state_info(&desc.rasterization);
        let multisample_state = multisample_state_info(&desc.multisample);

        let blend_attachments: Vec<vk::PipelineColorBlendAttachmentState> =
            desc.target.color_blend().copied().into_iter().collect();
        let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .logic_op(vk::LogicOp::NO_OP)
            .attachments(&blend_attachments)
            .blend_constants([0.0; 4]);
        let depth_stencil_state = desc.target.depth_stencil().map(depth_stencil_state_info);

        let dynamic_state =
            vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&desc.dynamic_states);

        let mut info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization_state)
            .multisample_state(&multisample_state)
            .dynamic_state(&dynamic_state)
            .layout(desc.layout)
            .render_pass(desc.render_pass)
            .subpass(desc.subpass)
            .base_pipeline_index(-1);
        if !blend_attachments.is_empty() {
            info = info.color_blend_state(&color_blend_state);
        }
        if let Some(depth_stencil_state) = depth_stencil_state.as_ref() {
            info = info.depth_stencil_state(depth_stencil_state);
        }

        let pipelines = unsafe {
            self.device
                .create_graphics_pipelines(self.pipeline_cache, std::slice::from_ref(&info), None)
                .map_err(|(_, result)| result)?
        };
        pipelines.into_iter().next().ok_or(vk::Result::ERROR_UNKNOWN)
    }

    fn destroy_sampler(&self, sampler: vk::Sampler) {
        unsafe { self.device.destroy_sampler(sampler, None) }
    }

    fn destroy_shader_module(&self, module: vk::ShaderModule) {
        unsafe { self.device.destroy_shader_module(module, None) }
    }

    fn destroy_render_pass(&self, render_pass: vk::RenderPass) {
        unsafe { self.device.destroy_render_pass(render_pass, None) }
    }

    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer) {
        unsafe { self.device.destroy_framebuffer(framebuffer, None) }
    }

    fn destroy_descriptor_set_layout(&self, layout: vk::DescriptorSetLayout) {
        unsafe { self.device.destroy_descriptor_set_layout(layout, None) }
    }

    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout) {
        unsafe { self.device.destroy_pipeline_layout(layout, None) }
    }

    fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        unsafe { self.device.destroy_pipeline(pipeline, None) }
    }
}

#[cfg(test)]
#[path = "vulkan_device_tests.rs"]
mod tests;
