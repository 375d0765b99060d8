// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Static configuration of a shim deployment.

use crate::region::Region;

/// Which transfer directions the handler emulates.
///
/// With [`AccessMode::LoadsOnly`] every store encoding decodes as unsupported
/// and takes the fatal path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    #[default]
    LoadsOnly,
    LoadsAndStores,
}

impl AccessMode {
    #[inline]
    pub const fn allows_stores(self) -> bool {
        matches!(self, AccessMode::LoadsAndStores)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShimConfig {
    pub region: Region,
    pub access: AccessMode,
}

impl ShimConfig {
    /// Build-time region, loads only.
    pub const DEFAULT: ShimConfig = ShimConfig::new(Region::DEFAULT);

    pub const fn new(region: Region) -> Self {
        Self { region, access: AccessMode::LoadsOnly }
    }

    pub const fn with_access(self, access: AccessMode) -> Self {
        Self { access, ..self }
    }
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
