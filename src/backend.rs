//! Compute backend selection.
//!
//! Kernels record where their arrays live. No accelerator backend is built
//! into this crate, so an offload request always resolves to the host with
//! a warning and the run continues.

use std::fmt;

/// Where a kernel's arrays and operators live.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComputeBackend {
    /// Host memory, host threads
    #[default]
    Host,
    /// Device memory
    Accelerator,
}

impl ComputeBackend {
    /// Backends compiled into this build.
    pub fn available() -> &'static [ComputeBackend] {
        &[ComputeBackend::Host]
    }

    /// Resolve a run's offload request to a usable backend.
    ///
    /// Never fails: an unavailable accelerator degrades to [`ComputeBackend::Host`].
    pub fn resolve(use_accelerator: bool) -> Self {
        if !use_accelerator {
            return ComputeBackend::Host;
        }
        if Self::available().contains(&ComputeBackend::Accelerator) {
            return ComputeBackend::Accelerator;
        }
        log::warn!("accelerator offload requested but no device backend is available, running on host");
        ComputeBackend::Host
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ComputeBackend::Host => "host",
            ComputeBackend::Accelerator => "accelerator",
        }
    }
}

impl fmt::Display for ComputeBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falls_back_to_host() {
        assert_eq!(ComputeBackend::resolve(false), ComputeBackend::Host);
        assert_eq!(ComputeBackend::resolve(true), ComputeBackend::Host);
        assert_eq!(ComputeBackend::default().to_string(), "host");
    }
}
