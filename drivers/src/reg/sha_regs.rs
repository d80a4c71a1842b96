/*++

Licensed under the Apache-2.0 license.

File Name:

    sha_regs.rs

Abstract:

    File contains register definitions for the SHA2 and SHA3 engines. Both
    engines share one layout at different base addresses.

--*/

use tock_registers::register_bitfields;

pub const START: u32 = 0x00;
pub const RESET: u32 = 0x04;
pub const DONE: u32 = 0x08;
pub const MODE: u32 = 0x0C;
pub const STATUS: u32 = 0x10;
pub const FINAL: u32 = 0x14;

/// Digest words, stored last word first
pub const DIGEST_0: u32 = 0x20;

/// Largest digest in words
pub const DIGEST_WORDS: usize = 16;

register_bitfields! [
    u32,

    /// Done Register Fields
    pub DONE_REG [
        DONE OFFSET(0) NUMBITS(1) [],
    ],

    /// Status Register Fields
    pub STATUS_REG [
        ERROR OFFSET(0) NUMBITS(1) [],
    ],

    /// Mode Register Fields
    pub MODE_REG [
        MODE OFFSET(0) NUMBITS(2) [
            Bits256 = 0,
            Bits384 = 1,
            Bits512 = 2,
        ],
    ],
];
