//! Pipeline factory
//!
//! Device-lifetime owner of the copy sampler, the shader modules and every
//! pipeline built so far. Pipelines are built lazily on first request for a
//! key and kept until the factory is dropped.

use ash::vk;
use rustc_hash::FxHashMap;
use std::ffi::CString;
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::device::{MetaCopyDevice, SamplerDesc};
use crate::error::{Error, Result};
use crate::format::{self, format_aspect};
use crate::handle::Owned;
use crate::pipeline::{CopyPipeline, MetaCopyPipeline, PipelineKey, PipelineShaders};
use crate::shaders::{FragmentVariant, ShaderCode, ShaderFamily, ShaderSet};
use crate::{meta_debug, meta_info};

const OWNER: &str = "PipelineFactory";

/// Nearest-filtered, clamped, single-level sampler used to read copy sources
pub fn copy_sampler_desc() -> SamplerDesc {
    SamplerDesc {
        mag_filter: vk::Filter::NEAREST,
        min_filter: vk::Filter::NEAREST,
        mipmap_mode: vk::SamplerMipmapMode::NEAREST,
        address_mode: vk::SamplerAddressMode::CLAMP_TO_EDGE,
        mip_lod_bias: 0.0,
        max_anisotropy: None,
        compare_op: None,
        min_lod: 0.0,
        max_lod: 0.0,
        border_color: vk::BorderColor::FLOAT_TRANSPARENT_BLACK,
        unnormalized_coordinates: false,
    }
}

/// True if `samples` is exactly one supported sample count bit
pub fn is_valid_sample_count(samples: vk::SampleCountFlags) -> bool {
    let raw = samples.as_raw();
    raw.count_ones() == 1 && raw <= vk::SampleCountFlags::TYPE_64.as_raw()
}

/// Cache of meta copy pipelines plus the objects they share
///
/// Safe to share between threads. Lookup and insertion happen under one
/// lock, so each key is built at most once even under contention.
pub struct PipelineFactory {
    // Drop releases pipelines and fragments newest-first, then the
    // remaining fields drop top to bottom
    pipelines: Mutex<FxHashMap<PipelineKey, CopyPipeline>>,
    /// Creation order: color 1D/2D/MS, then depth 1D/2D/MS
    fragments: Vec<Owned<vk::ShaderModule>>,
    geometry: Owned<vk::ShaderModule>,
    vertex: Owned<vk::ShaderModule>,
    sampler: Owned<vk::Sampler>,
    entry_point: CString,
    config: Config,
    device: Arc<dyn MetaCopyDevice>,
}

impl PipelineFactory {
    /// Create the sampler and all shader modules
    ///
    /// Anything created before a failure is released before returning.
    pub fn new(device: Arc<dyn MetaCopyDevice>, shaders: &ShaderSet, config: Config) -> Result<Self> {
        config.validate()?;
        let entry_point = config.entry_point_cstring()?;
        if config.validate_shaders {
            shaders.validate(&config.entry_point)?;
        }

        let sampler_desc = copy_sampler_desc();
        let sampler = Owned::create(&device, OWNER, |d| d.create_sampler(&sampler_desc))?;

        let module = |code: &ShaderCode| {
            Owned::create(&device, OWNER, |d| d.create_shader_module(code.words()))
        };
        let vertex = module(&shaders.vertex)?;
        let geometry = module(&shaders.geometry)?;
        let mut fragments = Vec::with_capacity(ShaderFamily::ALL.len() * FragmentVariant::ALL.len());
        for family in ShaderFamily::ALL {
            for variant in FragmentVariant::ALL {
                fragments.push(module(shaders.fragment(family, variant))?);
            }
        }

        meta_info!(
            "meta_copy::factory",
            "Pipeline factory ready (entry point {:?}, shader validation {})",
            config.entry_point,
            if config.validate_shaders { "on" } else { "off" }
        );

        Ok(Self {
            pipelines: Mutex::new(FxHashMap::default()),
            fragments,
            geometry,
            vertex,
            sampler,
            entry_point,
            config,
            device,
        })
    }

    /// Pipeline for copies into a view of `view_type`, `format` and `samples`
    ///
    /// Builds and caches the pipeline on first request. A failed build is
    /// not cached and the next call for the same key retries it.
    pub fn get_pipeline(
        &self,
        view_type: vk::ImageViewType,
        format: vk::Format,
        samples: vk::SampleCountFlags,
    ) -> Result<MetaCopyPipeline> {
        let aspect = format_aspect(format).ok_or(Error::UnsupportedFormat(format))?;
        if !is_valid_sample_count(samples) {
            return Err(Error::InvalidSampleCount(samples));
        }

        let key = PipelineKey {
            view_type,
            format,
            samples,
        };

        let mut pipelines = self
            .pipelines
            .lock()
            .map_err(|_| Error::LockPoisoned("pipeline cache"))?;

        if let Some(pipeline) = pipelines.get(&key) {
            return Ok(pipeline.handles());
        }

        let family = ShaderFamily::from_aspect(aspect);
        let variant = FragmentVariant::select(view_type, samples);
        let shaders = PipelineShaders {
            vertex: self.vertex.raw(),
            geometry: self.geometry.raw(),
            fragment: self.fragment_module(family, variant),
        };

        let pipeline = CopyPipeline::build(
            &self.device,
            &key,
            aspect,
            self.sampler.raw(),
            &shaders,
            &self.entry_point,
            self.config.min_sample_shading,
        )?;
        let handles = pipeline.handles();
        pipelines.insert(key, pipeline);

        meta_debug!(
            "meta_copy::factory",
            "Created {:?}/{:?} pipeline for {:?} {:?} x{} ({} cached)",
            family,
            variant,
            view_type,
            format,
            samples.as_raw(),
            pipelines.len()
        );

        Ok(handles)
    }

    /// See [`format::resolve_destination_format`]
    pub fn resolve_destination_format(
        &self,
        dst_aspect: vk::ImageAspectFlags,
        src_aspect: vk::ImageAspectFlags,
        src_format: vk::Format,
    ) -> vk::Format {
        format::resolve_destination_format(dst_aspect, src_aspect, src_format)
    }

    /// Sampler baked into every pipeline's descriptor set layout
    pub fn sampler(&self) -> vk::Sampler {
        self.sampler.raw()
    }

    pub fn cached_pipeline_count(&self) -> Result<usize> {
        let pipelines = self
            .pipelines
            .lock()
            .map_err(|_| Error::LockPoisoned("pipeline cache"))?;
        Ok(pipelines.len())
    }

    pub fn contains(&self, key: &PipelineKey) -> Result<bool> {
        let pipelines = self
            .pipelines
            .lock()
            .map_err(|_| Error::LockPoisoned("pipeline cache"))?;
        Ok(pipelines.contains_key(key))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn fragment_module(&self, family: ShaderFamily, variant: FragmentVariant) -> vk::ShaderModule {
        self.fragments[family.index() * FragmentVariant::ALL.len() + variant.index()].raw()
    }
}

impl Drop for PipelineFactory {
    fn drop(&mut self) {
        self.pipelines
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        while self.fragments.pop().is_some() {}
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
