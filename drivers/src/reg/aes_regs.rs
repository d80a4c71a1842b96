/*++

Licensed under the Apache-2.0 license.

File Name:

    aes_regs.rs

Abstract:

    File contains register definitions for the AES-GCM engine

--*/

use tock_registers::register_bitfields;

pub const STATUS: u32 = 0x000;
pub const KEY_SEL: u32 = 0x004;
pub const KEY_LOAD: u32 = 0x008;
pub const START_MSG: u32 = 0x00C;
pub const SOFT_RST: u32 = 0x010;
pub const KEY_CLEAR: u32 = 0x014;
pub const MODE: u32 = 0x018;
pub const KUP_WR: u32 = 0x01C;
pub const IV_0: u32 = 0x040;
pub const IV_3: u32 = 0x04C;
pub const KEY_SIZE: u32 = 0x050;
pub const KEY_DEC: u32 = 0x058;
pub const KEY_DEC_TRIG: u32 = 0x05C;
pub const KEY_DEC_SEL: u32 = 0x060;
pub const KEY_ZEROED_STATUS: u32 = 0x064;
pub const AAD: u32 = 0x06C;
pub const SPLIT_CFG: u32 = 0x070;
pub const DATA_SWAP: u32 = 0x074;
pub const CM_EN: u32 = 0x078;
pub const KEY_MASK_0: u32 = 0x080;
pub const BH_KEY_0: u32 = 0x0F0;
pub const USER_KEY_0_0: u32 = 0x110;

/// Distance between consecutive user key register banks
pub const USER_KEY_STRIDE: u32 = 0x20;

/// Value written to `KEY_DEC` to arm a key decryption
pub const KEY_DEC_MAGIC: u32 = 0xFFFF_FFFF;

register_bitfields! [
    u32,

    /// Status Register Fields
    pub STATUS_REG [
        BUSY OFFSET(0) NUMBITS(1) [],
        READY OFFSET(1) NUMBITS(1) [],
        DONE OFFSET(2) NUMBITS(1) [],
        KEY_INIT_DONE OFFSET(4) NUMBITS(1) [],
        GCM_TAG_PASS OFFSET(5) NUMBITS(1) [],
        BLK_KEY_DEC_DONE OFFSET(6) NUMBITS(1) [],
        ERROR OFFSET(8) NUMBITS(1) [],
        CM_ENABLED OFFSET(12) NUMBITS(1) [],
    ],

    /// Mode Register Fields
    pub MODE_REG [
        ENC_DEC_N OFFSET(0) NUMBITS(1) [
            Decrypt = 0,
            Encrypt = 1,
        ],
    ],

    /// Key Size Register Fields
    pub KEY_SIZE_REG [
        SIZE OFFSET(0) NUMBITS(2) [
            Key128 = 0,
            Key256 = 2,
        ],
    ],

    /// Key Update Register Fields
    pub KUP_WR_REG [
        KEY_SAVE OFFSET(0) NUMBITS(1) [],
        IV_SAVE OFFSET(1) NUMBITS(1) [],
    ],

    /// Split Configuration Register Fields
    pub SPLIT_CFG_REG [
        DATA_SPLIT OFFSET(0) NUMBITS(1) [],
        KEY_SPLIT OFFSET(1) NUMBITS(1) [],
    ],
];

/// Hardware key selector values
pub mod key_sel {
    pub const BBRAM: u32 = 0xBBDE_6600;
    pub const BBRAM_RED: u32 = 0xBBDE_8200;
    pub const BH: u32 = 0xBDB0_6600;
    pub const BH_RED: u32 = 0xBDB0_8200;
    pub const EFUSE: u32 = 0xEFDE_6600;
    pub const EFUSE_RED: u32 = 0xEFDE_8200;
    pub const EFUSE_USER_0: u32 = 0xEF85_6601;
    pub const EFUSE_USER_1: u32 = 0xEF85_6602;
    pub const EFUSE_USER_RED_0: u32 = 0xEF85_8201;
    pub const EFUSE_USER_RED_1: u32 = 0xEF85_8202;
    pub const KUP: u32 = 0xBDC9_8200;
    pub const PUF: u32 = 0xDBDE_8200;
    pub const USER_0: u32 = 0xBD85_8201;
}

/// Key clear / zeroed status bits
pub mod key_clear {
    pub const USER_0: u32 = 1 << 0;
    pub const EFUSE_USER_0: u32 = 1 << 8;
    pub const EFUSE_USER_1: u32 = 1 << 9;
    pub const BBRAM_RED: u32 = 1 << 10;
    pub const EFUSE_RED: u32 = 1 << 11;
    pub const EFUSE_USER_RED_0: u32 = 1 << 12;
    pub const EFUSE_USER_RED_1: u32 = 1 << 13;
    pub const BH: u32 = 1 << 14;
    pub const BH_RED: u32 = 1 << 15;
    pub const PUF: u32 = 1 << 16;
    pub const KUP: u32 = 1 << 17;
    pub const EXPANDED: u32 = 1 << 18;
    pub const EFUSE: u32 = 1 << 19;
    pub const ALL: u32 = 0x000F_FFFF;
}

/// Key decryption selector values
pub mod key_dec_sel {
    pub const BBRAM_RED: u32 = 0;
    pub const BH_RED: u32 = 1;
    pub const EFUSE_RED: u32 = 2;
    pub const EFUSE_USER_RED_0: u32 = 3;
    pub const EFUSE_USER_RED_1: u32 = 4;
}
