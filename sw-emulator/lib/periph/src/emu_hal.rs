/*++

Licensed under the Apache-2.0 license.

File Name:

    emu_hal.rs

Abstract:

    File contains the emulated hardware access layer: the engine register
    blocks, the secure stream switch, the eFuse cache and the DMA between
    system memory and the routed engine.

--*/

use crate::{AesPeriph, EcdsaPeriph, Peripheral, RsaPeriph, ShaFamily, ShaPeriph, SysMem};
use cryptoeng_drivers::reg::{
    efuse, sss, AES_BASE, ECDSA_BASE, EFUSE_CACHE_BASE, RSA_BASE, SHA2_BASE, SHA3_BASE, SSS_BASE,
};
use cryptoeng_drivers::{Addr, DmaChannel, HwAccess};
use cryptoeng_error::{CryptoError, CryptoResult};

/// Default size of emulated system memory
const SYS_MEM_SIZE: usize = 256 * 1024;

/// Faults the DMA model can be told to inject
#[derive(Debug, Default, Clone, Copy)]
pub struct DmaFaults {
    /// Transfers never report done
    pub hang: bool,

    /// Transfers are rejected
    pub error: bool,
}

/// Destination transfer still waiting for engine output
#[derive(Debug, Clone, Copy)]
struct PendingDst {
    addr: Addr,
    remaining: usize,
}

pub struct EmuHal {
    /// Caller memory reached through the DMA
    pub mem: SysMem,
    aes: AesPeriph,
    sha2: ShaPeriph,
    sha3: ShaPeriph,
    rsa: RsaPeriph,
    ecdsa: EcdsaPeriph,
    efuse_misc1: u32,
    sss_cfg: u32,
    src_swap: bool,
    dst_swap: bool,
    dst: Option<PendingDst>,
    writes: Vec<(u32, u32, u32)>,
    pub faults: DmaFaults,
}

impl Default for EmuHal {
    fn default() -> Self {
        Self::new()
    }
}

impl EmuHal {
    pub fn new() -> Self {
        Self::with_mem_size(SYS_MEM_SIZE)
    }

    pub fn with_mem_size(size: usize) -> Self {
        Self {
            mem: SysMem::new(size),
            aes: AesPeriph::new(),
            sha2: ShaPeriph::new(ShaFamily::Sha2),
            sha3: ShaPeriph::new(ShaFamily::Sha3),
            rsa: RsaPeriph::new(),
            ecdsa: EcdsaPeriph::new(),
            efuse_misc1: 0,
            sss_cfg: sss::ROUTE_NONE,
            src_swap: false,
            dst_swap: false,
            dst: None,
            writes: Vec::new(),
            faults: DmaFaults::default(),
        }
    }

    pub fn aes(&self) -> &AesPeriph {
        &self.aes
    }

    pub fn aes_mut(&mut self) -> &mut AesPeriph {
        &mut self.aes
    }

    pub fn sha2_mut(&mut self) -> &mut ShaPeriph {
        &mut self.sha2
    }

    pub fn sha3_mut(&mut self) -> &mut ShaPeriph {
        &mut self.sha3
    }

    pub fn rsa(&self) -> &RsaPeriph {
        &self.rsa
    }

    pub fn rsa_mut(&mut self) -> &mut RsaPeriph {
        &mut self.rsa
    }

    pub fn ecdsa(&self) -> &EcdsaPeriph {
        &self.ecdsa
    }

    pub fn ecdsa_mut(&mut self) -> &mut EcdsaPeriph {
        &mut self.ecdsa
    }

    /// Program the `SECURITY_MISC1` eFuse word
    pub fn set_efuse_misc1(&mut self, val: u32) {
        self.efuse_misc1 = val;
    }

    /// Every register write so far as `(base, offset, value)`
    pub fn reg_writes(&self) -> &[(u32, u32, u32)] {
        &self.writes
    }

    /// Register writes to the block at `base`
    pub fn writes_to(&self, base: u32) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.writes
            .iter()
            .filter(move |(b, _, _)| *b == base)
            .map(|(_, o, v)| (*o, *v))
    }

    pub fn clear_write_log(&mut self) {
        self.writes.clear();
    }

    fn periph(&self, base: u32) -> Option<&dyn Peripheral> {
        match base {
            AES_BASE => Some(&self.aes),
            SHA2_BASE => Some(&self.sha2),
            SHA3_BASE => Some(&self.sha3),
            RSA_BASE => Some(&self.rsa),
            ECDSA_BASE => Some(&self.ecdsa),
            _ => None,
        }
    }

    fn periph_mut(&mut self, base: u32) -> Option<&mut dyn Peripheral> {
        match base {
            AES_BASE => Some(&mut self.aes),
            SHA2_BASE => Some(&mut self.sha2),
            SHA3_BASE => Some(&mut self.sha3),
            RSA_BASE => Some(&mut self.rsa),
            ECDSA_BASE => Some(&mut self.ecdsa),
            _ => None,
        }
    }

    /// Byte swap applied between memory and the engine on `channel`.
    ///
    /// The AES port takes big endian words: either the DMA channel swap or
    /// the engine data port swap converts little endian memory words, and
    /// with neither the engine sees every word byte reversed. The SHA
    /// engines take a byte stream.
    fn swap(&self, channel: DmaChannel) -> bool {
        let dma = match channel {
            DmaChannel::Src => self.src_swap,
            DmaChannel::Dst => self.dst_swap,
        };
        if self.sss_cfg == sss::ROUTE_DMA0_AES {
            !(dma || self.aes.data_swap())
        } else {
            dma
        }
    }

    fn swap_words(data: &mut [u8]) {
        for word in data.chunks_exact_mut(4) {
            word.reverse();
        }
    }

    fn feed(&mut self, data: &[u8], last: bool) -> CryptoResult<()> {
        if self.faults.error {
            Err(CryptoError::HAL_DMA_ERROR)?;
        }
        let mut data = data.to_vec();
        if self.swap(DmaChannel::Src) {
            Self::swap_words(&mut data);
        }
        match self.sss_cfg {
            sss::ROUTE_DMA0_AES => self.aes.push(&data, last),
            sss::ROUTE_DMA0_SHA2 => self.sha2.push(&data, last),
            sss::ROUTE_DMA0_SHA3 => self.sha3.push(&data, last),
            _ => Err(CryptoError::HAL_DMA_ERROR)?,
        }
        self.pump()
    }

    /// Move available engine output into the pending destination.
    fn pump(&mut self) -> CryptoResult<()> {
        let Some(mut dst) = self.dst else {
            return Ok(());
        };
        if self.sss_cfg != sss::ROUTE_DMA0_AES {
            return Ok(());
        }
        self.aes.request_output();
        let mut out = self.aes.pull(dst.remaining);
        if out.is_empty() {
            return Ok(());
        }
        if self.swap(DmaChannel::Dst) {
            Self::swap_words(&mut out);
        }
        self.mem.write(dst.addr, &out)?;
        dst.addr += out.len() as Addr;
        dst.remaining -= out.len();
        self.dst = (dst.remaining > 0).then_some(dst);
        Ok(())
    }
}

impl HwAccess for EmuHal {
    fn read_reg(&self, base: u32, offset: u32) -> u32 {
        match (base, offset) {
            (SSS_BASE, sss::CFG) => self.sss_cfg,
            (EFUSE_CACHE_BASE, efuse::SECURITY_MISC1) => self.efuse_misc1,
            _ => self.periph(base).map_or(0, |p| p.read(offset)),
        }
    }

    fn write_reg(&mut self, base: u32, offset: u32, val: u32) {
        self.writes.push((base, offset, val));
        match (base, offset) {
            (SSS_BASE, sss::CFG) => self.sss_cfg = val,
            _ => {
                if let Some(p) = self.periph_mut(base) {
                    p.write(offset, val);
                }
            }
        }
    }

    fn dma_config_endianness(&mut self, channel: DmaChannel, enable: bool) {
        match channel {
            DmaChannel::Src => self.src_swap = enable,
            DmaChannel::Dst => self.dst_swap = enable,
        }
    }

    fn dma_transfer(
        &mut self,
        channel: DmaChannel,
        addr: Addr,
        words: u32,
        last: bool,
    ) -> CryptoResult<()> {
        let len = words as usize * 4;
        match channel {
            DmaChannel::Src => {
                let data = self.mem.slice(addr, len)?;
                self.feed(&data, last)
            }
            DmaChannel::Dst => {
                if self.faults.error {
                    Err(CryptoError::HAL_DMA_ERROR)?;
                }
                // Reject a destination outside memory up front
                self.mem.slice(addr, len)?;
                self.dst = (len > 0).then_some(PendingDst {
                    addr,
                    remaining: len,
                });
                self.pump()
            }
        }
    }

    fn dma_transfer_local(&mut self, data: &[u8], last: bool) -> CryptoResult<()> {
        self.feed(data, last)
    }

    fn dma_wait_done(&mut self, channel: DmaChannel, _max_polls: u32) -> CryptoResult<()> {
        if self.faults.hang {
            Err(CryptoError::HAL_DMA_TIMEOUT)?;
        }
        if channel == DmaChannel::Dst && self.dst.is_some() {
            Err(CryptoError::HAL_DMA_TIMEOUT)?;
        }
        Ok(())
    }

    fn mem_read(&self, addr: Addr, buf: &mut [u8]) -> CryptoResult<()> {
        self.mem.read(addr, buf)
    }

    fn mem_write(&mut self, addr: Addr, data: &[u8]) -> CryptoResult<()> {
        self.mem.write(addr, data)
    }
}
