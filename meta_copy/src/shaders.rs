//! Shader blobs and fragment variant selection
//!
//! A meta copy draws with a shared vertex + geometry pair and one of six
//! fragment shaders: an aspect family (color or depth/stencil) crossed with
//! a sampling variant (1D, 2D single-sample, multisampled).

use ash::vk;

use crate::error::{Error, Result};
use crate::pipeline::PUSH_CONSTANT_SIZE;

/// First word of every SPIR-V module
pub const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Validated SPIR-V words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderCode {
    words: Vec<u32>,
}

impl ShaderCode {
    /// Build from a little-endian byte blob (e.g. `include_bytes!`)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() || bytes.len() % 4 != 0 {
            return Err(Error::InvalidShader(format!(
                "SPIR-V size must be a non-zero multiple of 4 (got {} bytes)",
                bytes.len()
            )));
        }
        let words = bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Self::from_words(words)
    }

    pub fn from_words(words: Vec<u32>) -> Result<Self> {
        match words.first() {
            Some(&SPIRV_MAGIC) => Ok(Self { words }),
            Some(&other) => Err(Error::InvalidShader(format!(
                "bad SPIR-V magic 0x{:08x}",
                other
            ))),
            None => Err(Error::InvalidShader("empty SPIR-V module".to_string())),
        }
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }
}

/// Aspect family of the fragment shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderFamily {
    Color,
    DepthStencil,
}

impl ShaderFamily {
    pub const ALL: [ShaderFamily; 2] = [ShaderFamily::Color, ShaderFamily::DepthStencil];

    /// Family writing to a destination with the given aspect
    pub fn from_aspect(aspect: vk::ImageAspectFlags) -> Self {
        if aspect.contains(vk::ImageAspectFlags::COLOR) {
            ShaderFamily::Color
        } else {
            ShaderFamily::DepthStencil
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            ShaderFamily::Color => 0,
            ShaderFamily::DepthStencil => 1,
        }
    }
}

/// How the fragment shader samples the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentVariant {
    OneD,
    TwoD,
    Multisampled,
}

impl FragmentVariant {
    pub const ALL: [FragmentVariant; 3] = [
        FragmentVariant::OneD,
        FragmentVariant::TwoD,
        FragmentVariant::Multisampled,
    ];

    /// Variant for a view type and sample count
    ///
    /// Plain 1D views always use the 1D variant, whatever the sample count.
    /// Every other view type, 1D arrays included, goes by sample count.
    pub fn select(view_type: vk::ImageViewType, samples: vk::SampleCountFlags) -> Self {
        if view_type == vk::ImageViewType::TYPE_1D {
            FragmentVariant::OneD
        } else if samples == vk::SampleCountFlags::TYPE_1 {
            FragmentVariant::TwoD
        } else {
            FragmentVariant::Multisampled
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            FragmentVariant::OneD => 0,
            FragmentVariant::TwoD => 1,
            FragmentVariant::Multisampled => 2,
        }
    }
}

/// The eight shader blobs a pipeline factory is built from
#[derive(Debug, Clone)]
pub struct ShaderSet {
    pub vertex: ShaderCode,
    pub geometry: ShaderCode,
    pub color_1d: ShaderCode,
    pub color_2d: ShaderCode,
    pub color_ms: ShaderCode,
    pub depth_1d: ShaderCode,
    pub depth_2d: ShaderCode,
    pub depth_ms: ShaderCode,
}

impl ShaderSet {
    pub fn fragment(&self, family: ShaderFamily, variant: FragmentVariant) -> &ShaderCode {
        match (family, variant) {
            (ShaderFamily::Color, FragmentVariant::OneD) => &self.color_1d,
            (ShaderFamily::Color, FragmentVariant::TwoD) => &self.color_2d,
            (ShaderFamily::Color, FragmentVariant::Multisampled) => &self.color_ms,
            (ShaderFamily::DepthStencil, FragmentVariant::OneD) => &self.depth_1d,
            (ShaderFamily::DepthStencil, FragmentVariant::TwoD) => &self.depth_2d,
            (ShaderFamily::DepthStencil, FragmentVariant::Multisampled) => &self.depth_ms,
        }
    }

    /// Check every blob against the interface the pipelines expect
    pub fn validate(&self, entry_point: &str) -> Result<()> {
        check_stage("vertex", &reflect(&self.vertex)?, entry_point)?;
        check_stage("geometry", &reflect(&self.geometry)?, entry_point)?;
        for family in ShaderFamily::ALL {
            for variant in FragmentVariant::ALL {
                let name = format!("{:?} {:?} fragment", family, variant);
                let reflected = reflect(self.fragment(family, variant))?;
                check_stage(&name, &reflected, entry_point)?;
                check_fragment(&name, &reflected)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Reflection
// ============================================================================

/// Resource kinds a fragment shader may use for the source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DescriptorKind {
    CombinedImageSampler,
    SampledImage,
    Other,
}

/// The parts of a reflected module relevant to meta copies
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ReflectedShader {
    pub entry_points: Vec<String>,
    /// (set, binding, kind)
    pub descriptors: Vec<(u32, u32, DescriptorKind)>,
    /// Size in bytes of each push-constant block, if known
    pub push_constants: Vec<Option<usize>>,
}

pub(crate) fn reflect(code: &ShaderCode) -> Result<ReflectedShader> {
    let entry_points = spirq::ReflectConfig::new()
        .spv(code.words())
        .ref_all_rscs(true)
        .reflect()
        .map_err(|e| Error::InvalidShader(format!("SPIR-V reflection failed: {:?}", e)))?;

    let mut reflected = ReflectedShader::default();
    for entry_point in &entry_points {
        reflected.entry_points.push(entry_point.name.clone());
        for var in entry_point.vars.iter() {
            match var {
                spirq::var::Variable::Descriptor { desc_bind, desc_ty, .. } => {
                    let kind = match desc_ty {
                        spirq::ty::DescriptorType::CombinedImageSampler() => {
                            DescriptorKind::CombinedImageSampler
                        }
                        spirq::ty::DescriptorType::SampledImage() => DescriptorKind::SampledImage,
                        _ => DescriptorKind::Other,
                    };
                    reflected.descriptors.push((desc_bind.set(), desc_bind.bind(), kind));
                }
                spirq::var::Variable::PushConstant { ty, .. } => {
                    reflected.push_constants.push(ty.nbyte());
                }
                _ => {}
            }
        }
    }
    Ok(reflected)
}

pub(crate) fn check_stage(name: &str, reflected: &ReflectedShader, entry_point: &str) -> Result<()> {
    if reflected.entry_points.iter().any(|ep| ep == entry_point) {
        Ok(())
    } else {
        Err(Error::InvalidShader(format!(
            "{} shader has no entry point named {:?}",
            name, entry_point
        )))
    }
}

pub(crate) fn check_fragment(name: &str, reflected: &ReflectedShader) -> Result<()> {
    let has_source = reflected.descriptors.iter().any(|&(set, binding, kind)| {
        set == 0
            && binding == 0
            && matches!(
                kind,
                DescriptorKind::CombinedImageSampler | DescriptorKind::SampledImage
            )
    });
    if !has_source {
        return Err(Error::InvalidShader(format!(
            "{} shader does not sample an image at set 0, binding 0",
            name
        )));
    }

    for size in reflected.push_constants.iter().flatten() {
        if *size > PUSH_CONSTANT_SIZE as usize {
            return Err(Error::InvalidShader(format!(
                "{} shader push constants use {} bytes, at most {} are available",
                name, size, PUSH_CONSTANT_SIZE
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "shaders_tests.rs"]
mod tests;
