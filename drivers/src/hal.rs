/*++

Licensed under the Apache-2.0 license.

File Name:

    hal.rs

Abstract:

    File contains the hardware access layer the engine drivers are built on:
    register access, reset control, DMA and bounded event waits.

--*/

use cryptoeng_error::{CryptoError, CryptoResult};

/// Address in the DMA visible address space
pub type Addr = u64;

/// DMA channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaChannel {
    /// Memory to engine
    Src,

    /// Engine to memory
    Dst,
}

/// Hardware access layer
///
/// Implemented by the platform (MMIO plus the PMC DMA) and by the software
/// model used in tests. Drivers never touch registers or caller memory except
/// through this trait.
pub trait HwAccess {
    /// Read a 32-bit register
    fn read_reg(&self, base: u32, offset: u32) -> u32;

    /// Write a 32-bit register
    fn write_reg(&mut self, base: u32, offset: u32, val: u32);

    /// Hold the block at `base` in reset
    fn set_reset(&mut self, base: u32, offset: u32) {
        self.write_reg(base, offset, 1);
    }

    /// Take the block at `base` out of reset
    fn release_reset(&mut self, base: u32, offset: u32) {
        self.write_reg(base, offset, 0);
    }

    /// Enable or disable byte swapping within each word on a DMA channel
    fn dma_config_endianness(&mut self, channel: DmaChannel, enable: bool);

    /// Start a DMA transfer of `words` 32-bit words.
    ///
    /// `last` marks the final word of the stream on the source channel.
    fn dma_transfer(
        &mut self,
        channel: DmaChannel,
        addr: Addr,
        words: u32,
        last: bool,
    ) -> CryptoResult<()>;

    /// Stream a driver local buffer into the routed engine
    fn dma_transfer_local(&mut self, data: &[u8], last: bool) -> CryptoResult<()>;

    /// Wait for a DMA channel to finish its transfer
    fn dma_wait_done(&mut self, channel: DmaChannel, max_polls: u32) -> CryptoResult<()>;

    /// Processor read of caller memory
    fn mem_read(&self, addr: Addr, buf: &mut [u8]) -> CryptoResult<()>;

    /// Processor write of caller memory
    fn mem_write(&mut self, addr: Addr, data: &[u8]) -> CryptoResult<()>;

    /// Poll until `(reg & mask) == expected`.
    ///
    /// # Returns
    ///
    /// * `HAL_WAIT_TIMEOUT` once `max_polls` reads did not match
    fn wait_for_event(
        &self,
        base: u32,
        offset: u32,
        mask: u32,
        expected: u32,
        max_polls: u32,
    ) -> CryptoResult<()> {
        crate::wait::until(max_polls, CryptoError::HAL_WAIT_TIMEOUT, || {
            self.read_reg(base, offset) & mask == expected
        })
    }
}

/// Source and destination pair moved through an engine in one go.
///
/// The destination is programmed first and awaited last.
#[derive(Debug, Clone, Copy, Default)]
pub struct DmaXfer {
    pub src: Option<(Addr, u32, bool)>,
    pub dst: Option<(Addr, u32)>,
}

impl DmaXfer {
    /// Run the transfer and wait for both channels.
    pub fn run<H: HwAccess>(&self, hal: &mut H, max_polls: u32) -> CryptoResult<()> {
        if let Some((addr, words)) = self.dst {
            hal.dma_transfer(DmaChannel::Dst, addr, words, false)?;
        }
        if let Some((addr, words, last)) = self.src {
            hal.dma_transfer(DmaChannel::Src, addr, words, last)?;
            hal.dma_wait_done(DmaChannel::Src, max_polls)?;
        }
        if self.dst.is_some() {
            hal.dma_wait_done(DmaChannel::Dst, max_polls)?;
        }
        Ok(())
    }
}

/// Bytes to whole words; sizes are validated to be word aligned before this is used.
pub(crate) const fn words(bytes: u32) -> u32 {
    bytes / 4
}
