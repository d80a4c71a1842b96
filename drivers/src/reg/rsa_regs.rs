/*++

Licensed under the Apache-2.0 license.

File Name:

    rsa_regs.rs

Abstract:

    File contains register definitions for the RSA exponentiation engine

--*/

use tock_registers::register_bitfields;

pub const CTRL: u32 = 0x00;
pub const STATUS: u32 = 0x04;
pub const MINV: u32 = 0x08;
pub const KEY_LEN: u32 = 0x0C;
pub const RESET: u32 = 0x10;

/// Start of the operand RAM window
pub const RAM: u32 = 0x1000;

/// Words per operand region
pub const RAM_REGION_WORDS: u32 = 128;

/// Operand regions inside the RAM window
pub const RAM_EXPONENT: u32 = 0;
pub const RAM_MODULUS: u32 = RAM_REGION_WORDS;
pub const RAM_DATA: u32 = 2 * RAM_REGION_WORDS;
pub const RAM_EXTENSION: u32 = 3 * RAM_REGION_WORDS;

/// Total RAM words
pub const RAM_WORDS: u32 = 4 * RAM_REGION_WORDS;

register_bitfields! [
    u32,

    /// Control Register Fields
    pub CTRL_REG [
        OPCODE OFFSET(0) NUMBITS(2) [
            Exp = 1,
            ExpPrecalc = 2,
        ],
        START OFFSET(3) NUMBITS(1) [],
    ],

    /// Status Register Fields
    pub STATUS_REG [
        DONE OFFSET(0) NUMBITS(1) [],
        ERROR OFFSET(1) NUMBITS(1) [],
        BUSY OFFSET(2) NUMBITS(1) [],
    ],
];
