/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the Crypto Engine Emulator peripheral library.

--*/

mod aes;
mod ecdsa;
mod emu_hal;
mod rsa;
mod sha;
mod sys_mem;

pub use aes::{AesFaults, AesPeriph};
pub use ecdsa::{EcdsaFaults, EcdsaPeriph};
pub use emu_hal::{DmaFaults, EmuHal};
pub use rsa::{RsaFaults, RsaPeriph};
pub use sha::{ShaFamily, ShaFaults, ShaPeriph};
pub use sys_mem::SysMem;

/// Register block of one emulated engine
pub trait Peripheral {
    /// Read a 32-bit register at `offset`
    fn read(&self, offset: u32) -> u32;

    /// Write a 32-bit register at `offset`
    fn write(&mut self, offset: u32, val: u32);
}
