/*++

Licensed under the Apache-2.0 license.

File Name:

    ecdsa_regs.rs

Abstract:

    File contains register definitions for the ECDSA engine

--*/

use tock_registers::register_bitfields;

pub const CTRL: u32 = 0x00;
pub const STATUS: u32 = 0x04;
pub const RESULT: u32 = 0x08;
pub const HASH_LEN: u32 = 0x0C;
pub const RESET: u32 = 0x10;

/// Start of the operand RAM
pub const RAM: u32 = 0x100;

/// Bytes reserved per operand slot (66 byte operands rounded up to words)
pub const SLOT_BYTES: u32 = 68;

/// Operand slots
pub const SLOT_D: u32 = 0;
pub const SLOT_K: u32 = 1;
pub const SLOT_HASH: u32 = 2;
pub const SLOT_QX: u32 = 3;
pub const SLOT_QY: u32 = 4;
pub const SLOT_R: u32 = 5;
pub const SLOT_S: u32 = 6;
pub const SLOT_COUNT: u32 = 7;

register_bitfields! [
    u32,

    /// Control Register Fields
    pub CTRL_REG [
        OPCODE OFFSET(0) NUMBITS(2) [
            PublicKey = 0,
            Sign = 1,
            Verify = 2,
            Validate = 3,
        ],
        CURVE OFFSET(4) NUMBITS(2) [
            P256 = 0,
            P384 = 1,
            P521 = 2,
        ],
        START OFFSET(8) NUMBITS(1) [],
    ],

    /// Status Register Fields
    pub STATUS_REG [
        DONE OFFSET(0) NUMBITS(1) [],
        BUSY OFFSET(1) NUMBITS(1) [],
    ],
];

/// Result codes reported in `RESULT`
pub mod result {
    pub const SUCCESS: u32 = 0;
    pub const KEY_ZERO: u32 = 1;
    pub const KEY_WRONG_ORDER: u32 = 2;
    pub const KEY_NOT_ON_CURVE: u32 = 3;
    pub const BAD_SIGN: u32 = 4;
    pub const BAD_RANDOM_NUMBER: u32 = 5;
    pub const INCORRECT_HASH_LEN: u32 = 6;
    pub const R_S_ZERO_OR_ORDER: u32 = 7;
}
