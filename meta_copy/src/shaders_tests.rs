//! Unit tests for shaders.rs
//!
//! Tests SPIR-V blob checks, variant selection and the reflection checks
//! (on hand-built reflection data, no real SPIR-V needed).

use crate::device::mock_device::mock_shader_set;
use crate::error::Error;
use crate::shaders::{
    check_fragment, check_stage, DescriptorKind, FragmentVariant, ReflectedShader, ShaderCode,
    ShaderFamily, SPIRV_MAGIC,
};
use ash::vk;

// ============================================================================
// SHADER CODE TESTS
// ============================================================================

#[test]
fn test_from_bytes_little_endian() {
    let mut bytes = SPIRV_MAGIC.to_le_bytes().to_vec();
    bytes.extend_from_slice(&0x0001_0000u32.to_le_bytes());
    let code = ShaderCode::from_bytes(&bytes).unwrap();
    assert_eq!(code.words(), &[SPIRV_MAGIC, 0x0001_0000]);
}

#[test]
fn test_from_bytes_rejects_bad_length() {
    assert!(matches!(ShaderCode::from_bytes(&[]), Err(Error::InvalidShader(_))));
    let mut bytes = SPIRV_MAGIC.to_le_bytes().to_vec();
    bytes.push(0);
    assert!(matches!(ShaderCode::from_bytes(&bytes), Err(Error::InvalidShader(_))));
}

#[test]
fn test_from_bytes_rejects_bad_magic() {
    let bytes = SPIRV_MAGIC.to_be_bytes();
    let err = ShaderCode::from_bytes(&bytes).unwrap_err();
    assert!(format!("{}", err).contains("magic"));
}

#[test]
fn test_from_words_rejects_empty() {
    assert!(ShaderCode::from_words(Vec::new()).is_err());
}

// ============================================================================
// VARIANT SELECTION TESTS
// ============================================================================

#[test]
fn test_one_d_views_select_one_d_variant() {
    for samples in [vk::SampleCountFlags::TYPE_1, vk::SampleCountFlags::TYPE_4] {
        assert_eq!(
            FragmentVariant::select(vk::ImageViewType::TYPE_1D, samples),
            FragmentVariant::OneD
        );
    }
}

#[test]
fn test_one_d_array_views_select_by_sample_count() {
    assert_eq!(
        FragmentVariant::select(vk::ImageViewType::TYPE_1D_ARRAY, vk::SampleCountFlags::TYPE_1),
        FragmentVariant::TwoD
    );
    assert_eq!(
        FragmentVariant::select(vk::ImageViewType::TYPE_1D_ARRAY, vk::SampleCountFlags::TYPE_4),
        FragmentVariant::Multisampled
    );
}

#[test]
fn test_single_sample_selects_two_d_variant() {
    for view_type in [
        vk::ImageViewType::TYPE_2D,
        vk::ImageViewType::TYPE_2D_ARRAY,
        vk::ImageViewType::CUBE,
        vk::ImageViewType::TYPE_3D,
    ] {
        assert_eq!(
            FragmentVariant::select(view_type, vk::SampleCountFlags::TYPE_1),
            FragmentVariant::TwoD
        );
    }
}

#[test]
fn test_multiple_samples_select_multisampled_variant() {
    assert_eq!(
        FragmentVariant::select(vk::ImageViewType::TYPE_2D, vk::SampleCountFlags::TYPE_8),
        FragmentVariant::Multisampled
    );
    assert_eq!(
        FragmentVariant::select(vk::ImageViewType::TYPE_2D_ARRAY, vk::SampleCountFlags::TYPE_2),
        FragmentVariant::Multisampled
    );
}

#[test]
fn test_family_from_aspect() {
    assert_eq!(ShaderFamily::from_aspect(vk::ImageAspectFlags::COLOR), ShaderFamily::Color);
    assert_eq!(
        ShaderFamily::from_aspect(vk::ImageAspectFlags::DEPTH),
        ShaderFamily::DepthStencil
    );
    assert_eq!(
        ShaderFamily::from_aspect(vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL),
        ShaderFamily::DepthStencil
    );
}

#[test]
fn test_shader_set_fragment_table_is_exhaustive_and_distinct() {
    let set = mock_shader_set();
    let mut seen = Vec::new();
    for family in ShaderFamily::ALL {
        for variant in FragmentVariant::ALL {
            let tag = set.fragment(family, variant).words()[1];
            assert!(!seen.contains(&tag), "{:?}/{:?} shares a blob", family, variant);
            seen.push(tag);
        }
    }
    assert_eq!(seen.len(), 6);
    assert_eq!(set.fragment(ShaderFamily::Color, FragmentVariant::TwoD).words()[1], 4);
    assert_eq!(
        set.fragment(ShaderFamily::DepthStencil, FragmentVariant::Multisampled).words()[1],
        8
    );
}

// ============================================================================
// REFLECTION CHECK TESTS
// ============================================================================

fn fragment_reflection() -> ReflectedShader {
    ReflectedShader {
        entry_points: vec!["main".to_string()],
        descriptors: vec![(0, 0, DescriptorKind::CombinedImageSampler)],
        push_constants: vec![Some(8)],
    }
}

#[test]
fn test_check_stage_entry_point() {
    let reflected = fragment_reflection();
    assert!(check_stage("vertex", &reflected, "main").is_ok());
    let err = check_stage("vertex", &reflected, "copy_main").unwrap_err();
    assert!(format!("{}", err).contains("copy_main"));
}

#[test]
fn test_check_fragment_accepts_expected_interface() {
    assert!(check_fragment("color 2D", &fragment_reflection()).is_ok());

    let sampled_image = ReflectedShader {
        descriptors: vec![(0, 0, DescriptorKind::SampledImage)],
        push_constants: Vec::new(),
        ..fragment_reflection()
    };
    assert!(check_fragment("color 2D", &sampled_image).is_ok());
}

#[test]
fn test_check_fragment_requires_source_binding() {
    let wrong_binding = ReflectedShader {
        descriptors: vec![(0, 1, DescriptorKind::CombinedImageSampler)],
        ..fragment_reflection()
    };
    assert!(check_fragment("f", &wrong_binding).is_err());

    let wrong_kind = ReflectedShader {
        descriptors: vec![(0, 0, DescriptorKind::Other)],
        ..fragment_reflection()
    };
    assert!(check_fragment("f", &wrong_kind).is_err());
}

#[test]
fn test_check_fragment_rejects_oversized_push_constants() {
    let reflected = ReflectedShader {
        push_constants: vec![Some(16)],
        ..fragment_reflection()
    };
    let err = check_fragment("depth MS", &reflected).unwrap_err();
    assert!(format!("{}", err).contains("16 bytes"));
}
