/*!
# Meta Copy

Cached GPU objects for image-to-image "meta copies": copies or resolves
between two image views that the native copy command cannot service, such
as mismatched sample counts or a depth/color aspect crossing.

## Architecture

- **PipelineFactory**: device-lifetime cache of copy pipelines keyed by view
  type, destination format and sample count. Owns the copy sampler and the
  vertex, geometry and six fragment shader modules.
- **AttachmentSession**: per-copy render pass and framebuffer for one
  destination view.
- **MetaCopyDevice**: the device seam. The core describes objects with plain
  structs; a backend (see `meta_copy_vulkan`) turns them into Vulkan objects.

Typical flow: resolve the destination format, fetch the pipeline for it,
open a session on the destination view, then record one draw using
[`meta_copy::draw::copy_draw`](crate::draw::copy_draw).
*/

mod error;
mod config;
mod handle;
pub mod log;
pub mod device;
pub mod format;
pub mod image_view;
pub mod shaders;
pub mod session;
pub mod pipeline;
pub mod factory;
pub mod draw;

// Main meta_copy namespace module
pub mod meta_copy {
    pub use crate::error::{Error, Result};
    pub use crate::config::Config;
    pub use crate::handle::{DeviceObject, Owned};

    pub use crate::device::{MetaCopyDevice, ObjectKind};
    pub use crate::factory::PipelineFactory;
    pub use crate::format::resolve_destination_format;
    pub use crate::image_view::ImageViewInfo;
    pub use crate::pipeline::{MetaCopyPipeline, PipelineKey};
    pub use crate::session::AttachmentSession;
    pub use crate::shaders::{FragmentVariant, ShaderCode, ShaderFamily, ShaderSet};
    pub use crate::draw::{copy_draw, CopyDraw, CopyRegion};

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, set_logger, reset_logger};
    }
}

pub use error::{Error, Result};
pub use config::Config;
