/*!
# Meta Copy - Vulkan Backend

Vulkan implementation of the `meta_copy` device seam.

`VulkanDevice` wraps an existing `ash::Device` and implements
`MetaCopyDevice`, so a `PipelineFactory` and `AttachmentSession`s can be
built on real hardware:

```no_run
# fn demo(device: ash::Device, shaders: meta_copy::meta_copy::ShaderSet) -> meta_copy::Result<()> {
use std::sync::Arc;
use meta_copy::meta_copy::{Config, PipelineFactory};
use meta_copy_vulkan::VulkanDevice;

let factory = PipelineFactory::new(Arc::new(VulkanDevice::new(device)), &shaders, Config::default())?;
# Ok(())
# }
```
*/

mod vulkan_device;

pub use vulkan_device::{
    attachment_reference_split, depth_stencil_state_info, multisample_state_info,
    rasterization_state_info, sampler_create_info, VulkanDevice,
};
