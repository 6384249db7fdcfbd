//! Mock device for unit tests (no GPU required)
//!
//! Hands out unique fake handles, records every description it is asked to
//! build and every destroy call, and can be told to fail a given object kind.

use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{
    DescriptorSetLayoutDesc, FramebufferDesc, GraphicsPipelineDesc, MetaCopyDevice, ObjectKind,
    PipelineLayoutDesc, RenderPassDesc, SamplerDesc,
};

#[derive(Default)]
pub struct MockState {
    next_handle: u64,
    pub samplers: Vec<SamplerDesc>,
    pub shader_modules: Vec<Vec<u32>>,
    pub render_passes: Vec<RenderPassDesc>,
    pub framebuffers: Vec<FramebufferDesc>,
    pub set_layouts: Vec<DescriptorSetLayoutDesc>,
    pub pipeline_layouts: Vec<PipelineLayoutDesc>,
    pub pipelines: Vec<GraphicsPipelineDesc>,
    pub created: Vec<(ObjectKind, u64)>,
    pub destroyed: Vec<(ObjectKind, u64)>,
    failures: HashMap<ObjectKind, vk::Result>,
}

#[derive(Default)]
pub struct MockDevice {
    state: Mutex<MockState>,
}

impl MockDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Same device, viewed through the trait object the core expects
    pub fn as_device(self: &Arc<Self>) -> Arc<dyn MetaCopyDevice> {
        Arc::clone(self) as Arc<dyn MetaCopyDevice>
    }

    /// Make every creation of `kind` fail with `result` until cleared
    pub fn fail(&self, kind: ObjectKind, result: vk::Result) {
        self.state.lock().unwrap().failures.insert(kind, result);
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    /// Inspect the recorded state
    pub fn with_state<R>(&self, f: impl FnOnce(&MockState) -> R) -> R {
        f(&self.state.lock().unwrap())
    }

    pub fn created_count(&self, kind: ObjectKind) -> usize {
        self.with_state(|s| s.created.iter().filter(|(k, _)| *k == kind).count())
    }

    pub fn destroyed_count(&self, kind: ObjectKind) -> usize {
        self.with_state(|s| s.destroyed.iter().filter(|(k, _)| *k == kind).count())
    }

    /// Objects created and not yet destroyed
    pub fn live_count(&self) -> usize {
        self.with_state(|s| s.created.len() - s.destroyed.len())
    }

    /// Number of destroy calls received for one raw handle
    pub fn destroy_calls_for(&self, kind: ObjectKind, raw: u64) -> usize {
        self.with_state(|s| {
            s.destroyed
                .iter()
                .filter(|(k, h)| *k == kind && *h == raw)
                .count()
        })
    }

    fn create<H: Handle>(&self, kind: ObjectKind, record: impl FnOnce(&mut MockState)) -> VkResult<H> {
        let mut state = self.state.lock().unwrap();
        if let Some(result) = state.failures.get(&kind) {
            return Err(*result);
        }
        state.next_handle += 1;
        let raw = state.next_handle;
        state.created.push((kind, raw));
        record(&mut state);
        Ok(H::from_raw(raw))
    }

    fn destroy<H: Handle>(&self, kind: ObjectKind, handle: H) {
        self.state.lock().unwrap().destroyed.push((kind, handle.as_raw()));
    }
}

impl MetaCopyDevice for MockDevice {
    fn create_sampler(&self, desc: &SamplerDesc) -> VkResult<vk::Sampler> {
        self.create(ObjectKind::Sampler, |s| s.samplers.push(*desc))
    }

    fn create_shader_module(&self, code: &[u32]) -> VkResult<vk::ShaderModule> {
        self.create(ObjectKind::ShaderModule, |s| s.shader_modules.push(code.to_vec()))
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> VkResult<vk::RenderPass> {
        self.create(ObjectKind::RenderPass, |s| s.render_passes.push(desc.clone()))
    }

    fn create_framebuffer(&self, desc: &FramebufferDesc) -> VkResult<vk::Framebuffer> {
        self.create(ObjectKind::Framebuffer, |s| s.framebuffers.push(*desc))
    }

    fn create_descriptor_set_layout(
        &self,
        desc: &DescriptorSetLayoutDesc,
    ) -> VkResult<vk::DescriptorSetLayout> {
        self.create(ObjectKind::DescriptorSetLayout, |s| s.set_layouts.push(desc.clone()))
    }

    fn create_pipeline_layout(&self, desc: &PipelineLayoutDesc) -> VkResult<vk::PipelineLayout> {
        self.create(ObjectKind::PipelineLayout, |s| s.pipeline_layouts.push(desc.clone()))
    }

    fn create_graphics_pipeline(&self, desc: &GraphicsPipelineDesc) -> VkResult<vk::Pipeline> {
        self.create(ObjectKind::GraphicsPipeline, |s| s.pipelines.push(desc.clone()))
    }

    fn destroy_sampler(&self, sampler: vk::Sampler) {
        self.destroy(ObjectKind::Sampler, sampler);
    }

    fn destroy_shader_module(&self, module: vk::ShaderModule) {
        self.destroy(ObjectKind::ShaderModule, module);
    }

    fn destroy_render_pass(&self, render_pass: vk::RenderPass) {
        self.destroy(ObjectKind::RenderPass, render_pass);
    }

    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer) {
        self.destroy(ObjectKind::Framebuffer, framebuffer);
    }

    fn destroy_descriptor_set_layout(&self, layout: vk::DescriptorSetLayout) {
        self.destroy(ObjectKind::DescriptorSetLayout, layout);
    }

    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout) {
        self.destroy(ObjectKind::PipelineLayout, layout);
    }

    fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        self.destroy(ObjectKind::GraphicsPipeline, pipeline);
    }
}

/// Shader set of distinguishable placeholder blobs (not reflectable)
///
/// Each blob is the SPIR-V magic followed by a tag, so the recorded module
/// code tells which shader a module was built from.
pub fn mock_shader_set() -> crate::shaders::ShaderSet {
    use crate::shaders::{ShaderCode, SPIRV_MAGIC};

    let blob = |tag: u32| ShaderCode::from_words(vec![SPIRV_MAGIC, tag]).unwrap();
    crate::shaders::ShaderSet {
        vertex: blob(1),
        geometry: blob(2),
        color_1d: blob(3),
        color_2d: blob(4),
        color_ms: blob(5),
        depth_1d: blob(6),
        depth_2d: blob(7),
        depth_ms: blob(8),
    }
}
