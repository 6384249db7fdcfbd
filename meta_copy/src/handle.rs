//! Owned Vulkan handles
//!
//! `Owned<T>` pairs a raw handle with the device that created it and destroys
//! the handle exactly once when dropped. Structs holding several `Owned`
//! fields declare them in reverse creation order, so Rust's field drop order
//! tears objects down newest-first.

use ash::vk;
use std::fmt;
use std::sync::Arc;

use crate::device::{MetaCopyDevice, ObjectKind};
use crate::error::{Error, Result};
use crate::meta_error;

/// A raw Vulkan handle this crate knows how to destroy
pub trait DeviceObject: Copy + fmt::Debug {
    const KIND: ObjectKind;

    fn destroy(self, device: &dyn MetaCopyDevice);
}

impl DeviceObject for vk::Sampler {
    const KIND: ObjectKind = ObjectKind::Sampler;

    fn destroy(self, device: &dyn MetaCopyDevice) {
        device.destroy_sampler(self);
    }
}

impl DeviceObject for vk::ShaderModule {
    const KIND: ObjectKind = ObjectKind::ShaderModule;

    fn destroy(self, device: &dyn MetaCopyDevice) {
        device.destroy_shader_module(self);
    }
}

impl DeviceObject for vk::RenderPass {
    const KIND: ObjectKind = ObjectKind::RenderPass;

    fn destroy(self, device: &dyn MetaCopyDevice) {
        device.destroy_render_pass(self);
    }
}

impl DeviceObject for vk::Framebuffer {
    const KIND: ObjectKind = ObjectKind::Framebuffer;

    fn destroy(self, device: &dyn MetaCopyDevice) {
        device.destroy_framebuffer(self);
    }
}

impl DeviceObject for vk::DescriptorSetLayout {
    const KIND: ObjectKind = ObjectKind::DescriptorSetLayout;

    fn destroy(self, device: &dyn MetaCopyDevice) {
        device.destroy_descriptor_set_layout(self);
    }
}

impl DeviceObject for vk::PipelineLayout {
    const KIND: ObjectKind = ObjectKind::PipelineLayout;

    fn destroy(self, device: &dyn MetaCopyDevice) {
        device.destroy_pipeline_layout(self);
    }
}

impl DeviceObject for vk::Pipeline {
    const KIND: ObjectKind = ObjectKind::GraphicsPipeline;

    fn destroy(self, device: &dyn MetaCopyDevice) {
        device.destroy_pipeline(self);
    }
}

/// Raw handle destroyed on drop
pub struct Owned<T: DeviceObject> {
    handle: T,
    device: Arc<dyn MetaCopyDevice>,
}

impl<T: DeviceObject> Owned<T> {
    /// Run `create` and take ownership of the handle it returns
    ///
    /// A failing creation is logged and reported as `Error::ObjectCreation`
    /// naming `owner` and the object kind.
    pub(crate) fn create<F>(device: &Arc<dyn MetaCopyDevice>, owner: &'static str, create: F) -> Result<Self>
    where
        F: FnOnce(&dyn MetaCopyDevice) -> ash::prelude::VkResult<T>,
    {
        match create(device.as_ref()) {
            Ok(handle) => Ok(Self {
                handle,
                device: Arc::clone(device),
            }),
            Err(result) => {
                meta_error!("meta_copy::handle", "{}: failed to create {}: {:?}", owner, T::KIND, result);
                Err(Error::ObjectCreation {
                    owner,
                    kind: T::KIND,
                    result,
                })
            }
        }
    }

    /// Raw handle (still owned by `self`)
    pub fn raw(&self) -> T {
        self.handle
    }
}

impl<T: DeviceObject> fmt::Debug for Owned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Owned")
            .field("kind", &T::KIND)
            .field("handle", &self.handle)
            .finish()
    }
}

impl<T: DeviceObject> Drop for Owned<T> {
    fn drop(&mut self) {
        self.handle.destroy(self.device.as_ref());
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
