/*++

Licensed under the Apache-2.0 license.

File Name:

    mod.rs

Abstract:

    File contains the register map shared by the drivers and the software
    model of the crypto engines.

--*/

pub mod aes_regs;
pub mod ecdsa_regs;
pub mod rsa_regs;
pub mod sha_regs;

/// AES-GCM engine
pub const AES_BASE: u32 = 0xF11E_0000;

/// SHA3 engine
pub const SHA3_BASE: u32 = 0xF120_0000;

/// SHA2 engine
pub const SHA2_BASE: u32 = 0xF121_0000;

/// RSA exponentiation engine
pub const RSA_BASE: u32 = 0xF122_0000;

/// ECDSA engine
pub const ECDSA_BASE: u32 = 0xF123_0000;

/// Secure stream switch
pub const SSS_BASE: u32 = 0xF111_0000;

/// eFuse cache
pub const EFUSE_CACHE_BASE: u32 = 0xF125_0000;

pub mod sss {
    /// Stream switch configuration. Selects which engine the DMA feeds.
    pub const CFG: u32 = 0x500;

    pub const ROUTE_NONE: u32 = 0x0;
    pub const ROUTE_DMA0_AES: u32 = 0x5;
    pub const ROUTE_DMA0_SHA2: u32 = 0xA;
    pub const ROUTE_DMA0_SHA3: u32 = 0xC;
}

pub mod efuse {
    /// Security miscellaneous control 1
    pub const SECURITY_MISC1: u32 = 0x0E8;

    /// All bits set means the DPA countermeasure is disabled on this part
    pub const DPA_CM_DIS_MASK: u32 = 0xFFFF_0000;
}
