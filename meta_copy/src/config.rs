//! Pipeline factory configuration

use std::ffi::CString;

use crate::error::{Error, Result};

/// Factory configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Entry point shared by every shader stage
    pub entry_point: String,

    /// Reflect the shader blobs with spirq before creating modules
    pub validate_shaders: bool,

    /// Minimum fraction of samples shaded when per-sample shading is on
    pub min_sample_shading: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            entry_point: "main".to_string(),
            validate_shaders: true,
            min_sample_shading: 1.0,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.entry_point.is_empty() {
            return Err(Error::InvalidConfig("entry point is empty".to_string()));
        }
        if self.entry_point.contains('\0') {
            return Err(Error::InvalidConfig(format!(
                "entry point {:?} contains a NUL byte",
                self.entry_point
            )));
        }
        if !(0.0..=1.0).contains(&self.min_sample_shading) {
            return Err(Error::InvalidConfig(format!(
                "min_sample_shading {} is outside [0, 1]",
                self.min_sample_shading
            )));
        }
        Ok(())
    }

    /// Entry point as a C string
    pub(crate) fn entry_point_cstring(&self) -> Result<CString> {
        CString::new(self.entry_point.as_str()).map_err(|_| {
            Error::InvalidConfig(format!(
                "entry point {:?} contains a NUL byte",
                self.entry_point
            ))
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
