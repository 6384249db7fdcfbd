//! Device abstraction used by the session and the factory
//!
//! The core never touches `ash::Device` directly. It builds plain,
//! pointer-free descriptions of the objects it needs and hands them to a
//! `MetaCopyDevice`, which turns them into Vulkan objects. `meta_copy_vulkan`
//! provides the ash implementation; tests use the mock device.

use ash::prelude::VkResult;
use ash::vk;
use std::ffi::CString;
use std::fmt;

#[cfg(test)]
pub(crate) mod mock_device;

/// Kinds of Vulkan objects created by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Sampler,
    ShaderModule,
    RenderPass,
    Framebuffer,
    DescriptorSetLayout,
    PipelineLayout,
    GraphicsPipeline,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 7] = [
        ObjectKind::Sampler,
        ObjectKind::ShaderModule,
        ObjectKind::RenderPass,
        ObjectKind::Framebuffer,
        ObjectKind::DescriptorSetLayout,
        ObjectKind::PipelineLayout,
        ObjectKind::GraphicsPipeline,
    ];

    /// Lower-case name used in error messages
    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Sampler => "sampler",
            ObjectKind::ShaderModule => "shader module",
            ObjectKind::RenderPass => "render pass",
            ObjectKind::Framebuffer => "framebuffer",
            ObjectKind::DescriptorSetLayout => "descriptor set layout",
            ObjectKind::PipelineLayout => "pipeline layout",
            ObjectKind::GraphicsPipeline => "graphics pipeline",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Sampler
// ============================================================================

/// Sampler description
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerDesc {
    pub mag_filter: vk::Filter,
    pub min_filter: vk::Filter,
    pub mipmap_mode: vk::SamplerMipmapMode,
    /// Applied to U, V and W
    pub address_mode: vk::SamplerAddressMode,
    pub mip_lod_bias: f32,
    /// `None` disables anisotropic filtering
    pub max_anisotropy: Option<f32>,
    /// `None` disables depth comparison
    pub compare_op: Option<vk::CompareOp>,
    pub min_lod: f32,
    pub max_lod: f32,
    pub border_color: vk::BorderColor,
    pub unnormalized_coordinates: bool,
}

// ============================================================================
// Render pass / framebuffer
// ============================================================================

/// How the single attachment of a render pass is wired into its subpass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentBinding {
    /// Bound as the only color attachment
    Color(vk::ImageLayout),
    /// Bound as the depth/stencil attachment
    DepthStencil(vk::ImageLayout),
}

impl AttachmentBinding {
    /// Layout the attachment is in during the subpass
    pub fn layout(self) -> vk::ImageLayout {
        match self {
            AttachmentBinding::Color(layout) | AttachmentBinding::DepthStencil(layout) => layout,
        }
    }

    pub fn is_color(self) -> bool {
        matches!(self, AttachmentBinding::Color(_))
    }
}

/// Single-attachment, single-subpass render pass
#[derive(Debug, Clone)]
pub struct RenderPassDesc {
    pub attachment: vk::AttachmentDescription,
    pub binding: AttachmentBinding,
    pub dependencies: Vec<vk::SubpassDependency>,
}

/// Single-attachment framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferDesc {
    pub render_pass: vk::RenderPass,
    pub attachment: vk::ImageView,
    pub width: u32,
    pub height: u32,
    pub layers: u32,
}

// ============================================================================
// Layouts
// ============================================================================

/// One binding of a descriptor set layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorBindingDesc {
    pub binding: u32,
    pub descriptor_type: vk::DescriptorType,
    pub stages: vk::ShaderStageFlags,
    /// Baked-in sampler; the binding then holds exactly one descriptor
    pub immutable_sampler: Option<vk::Sampler>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSetLayoutDesc {
    pub bindings: Vec<DescriptorBindingDesc>,
}

#[derive(Debug, Clone)]
pub struct PipelineLayoutDesc {
    pub set_layouts: Vec<vk::DescriptorSetLayout>,
    pub push_constant_ranges: Vec<vk::PushConstantRange>,
}

// ============================================================================
// Graphics pipeline
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderStageDesc {
    pub stage: vk::ShaderStageFlags,
    pub module: vk::ShaderModule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterizationDesc {
    pub depth_clamp: bool,
    pub polygon_mode: vk::PolygonMode,
    pub cull_mode: vk::CullModeFlags,
    pub front_face: vk::FrontFace,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultisampleDesc {
    pub samples: vk::SampleCountFlags,
    pub sample_shading: bool,
    pub min_sample_shading: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct DepthStencilDesc {
    pub depth_test: bool,
    pub depth_write: bool,
    pub depth_compare_op: vk::CompareOp,
    pub stencil_test: bool,
    /// Used for both front and back faces
    pub stencil: vk::StencilOpState,
}

/// Output-merger state of a pipeline: exactly one of the two is attached
#[derive(Debug, Clone, Copy)]
pub enum TargetState {
    Color(vk::PipelineColorBlendAttachmentState),
    DepthStencil(DepthStencilDesc),
}

impl TargetState {
    pub fn color_blend(&self) -> Option<&vk::PipelineColorBlendAttachmentState> {
        match self {
            TargetState::Color(blend) => Some(blend),
            TargetState::DepthStencil(_) => None,
        }
    }

    pub fn depth_stencil(&self) -> Option<&DepthStencilDesc> {
        match self {
            TargetState::Color(_) => None,
            TargetState::DepthStencil(ds) => Some(ds),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GraphicsPipelineDesc {
    pub stages: Vec<ShaderStageDesc>,
    /// Shared by every stage
    pub entry_point: CString,
    pub topology: vk::PrimitiveTopology,
    pub dynamic_states: Vec<vk::DynamicState>,
    pub rasterization: RasterizationDesc,
    pub multisample: MultisampleDesc,
    pub target: TargetState,
    pub layout: vk::PipelineLayout,
    pub render_pass: vk::RenderPass,
    pub subpass: u32,
}

// ============================================================================
// Device trait
// ============================================================================

/// Creates and destroys the Vulkan objects a meta copy needs
///
/// Implementations must be callable from any thread. Destroy calls receive
/// handles previously returned by the matching create call, exactly once.
pub trait MetaCopyDevice: Send + Sync {
    fn create_sampler(&self, desc: &SamplerDesc) -> VkResult<vk::Sampler>;
    fn create_shader_module(&self, code: &[u32]) -> VkResult<vk::ShaderModule>;
    fn create_render_pass(&self, desc: &RenderPassDesc) -> VkResult<vk::RenderPass>;
    fn create_framebuffer(&self, desc: &FramebufferDesc) -> VkResult<vk::Framebuffer>;
    fn create_descriptor_set_layout(
        &self,
        desc: &DescriptorSetLayoutDesc,
    ) -> VkResult<vk::DescriptorSetLayout>;
    fn create_pipeline_layout(&self, desc: &PipelineLayoutDesc) -> VkResult<vk::PipelineLayout>;
    fn create_graphics_pipeline(&self, desc: &GraphicsPipelineDesc) -> VkResult<vk::Pipeline>;

    fn destroy_sampler(&self, sampler: vk::Sampler);
    fn destroy_shader_module(&self, module: vk::ShaderModule);
    fn destroy_render_pass(&self, render_pass: vk::RenderPass);
    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer);
    fn destroy_descriptor_set_layout(&self, layout: vk::DescriptorSetLayout);
    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout);
    fn destroy_pipeline(&self, pipeline: vk::Pipeline);
}
