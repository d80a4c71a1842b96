/*++

Licensed under the Apache-2.0 license.

File Name:

    sys_mem.rs

Abstract:

    File contains the caller visible memory the emulated DMA and processor
    read and write.

--*/

use cryptoeng_drivers::Addr;
use cryptoeng_error::{CryptoError, CryptoResult};

/// Flat byte addressable memory starting at address zero
pub struct SysMem {
    data: Vec<u8>,
}

impl SysMem {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0u8; size],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn range(&self, addr: Addr, len: usize) -> CryptoResult<core::ops::Range<usize>> {
        let start = usize::try_from(addr).map_err(|_| CryptoError::HAL_DMA_INVALID_ADDR)?;
        let end = start
            .checked_add(len)
            .ok_or(CryptoError::HAL_DMA_INVALID_ADDR)?;
        if end > self.data.len() {
            Err(CryptoError::HAL_DMA_INVALID_ADDR)?;
        }
        Ok(start..end)
    }

    pub fn read(&self, addr: Addr, buf: &mut [u8]) -> CryptoResult<()> {
        let range = self.range(addr, buf.len())?;
        buf.copy_from_slice(&self.data[range]);
        Ok(())
    }

    pub fn write(&mut self, addr: Addr, data: &[u8]) -> CryptoResult<()> {
        let range = self.range(addr, data.len())?;
        self.data[range].copy_from_slice(data);
        Ok(())
    }

    /// Copy of `len` bytes at `addr`
    pub fn slice(&self, addr: Addr, len: usize) -> CryptoResult<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read(addr, &mut buf)?;
        Ok(buf)
    }
}
