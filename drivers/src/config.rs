/*++

Licensed under the Apache-2.0 license.

File Name:

    config.rs

Abstract:

    File contains driver configuration shared by all engines.

--*/

use crate::Layout;

cfg_if::cfg_if! {
    if #[cfg(feature = "emu")] {
        /// Default poll budget for hardware waits
        pub const MAX_POLLS: u32 = 10_000;
    } else {
        /// Default poll budget for hardware waits
        pub const MAX_POLLS: u32 = 1_000_000;
    }
}

/// Largest single DMA transfer in bytes
pub const DMA_MAX_TRANSFER_BYTES: u32 = 0x1FFF_FFFC;

/// Driver configuration
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    /// Poll budget for every bounded wait
    pub max_polls: u32,

    /// Largest DMA transfer the SHA driver issues before splitting
    pub dma_max_bytes: u32,

    /// Byte order of ECDSA operands in caller memory
    pub ecc_layout: Layout,

    /// Curves the ECDSA engine accepts
    pub ecc_curves: crate::CurveSet,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_polls: MAX_POLLS,
            dma_max_bytes: DMA_MAX_TRANSFER_BYTES,
            ecc_layout: Layout::Reversed,
            ecc_curves: crate::CurveSet::all(),
        }
    }
}
