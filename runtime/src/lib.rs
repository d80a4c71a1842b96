// Licensed under the Apache-2.0 license

#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod aes;
mod command;
mod drivers;
mod ecdsa;
mod kat;
mod rsa;
mod sha;

pub use aes::AesCmd;
pub use command::{AesReq, Command, CommandId, EcdsaReq, KatReq, Response, ShaReq};
pub use drivers::Drivers;
pub use ecdsa::EcdsaCmd;
pub use kat::KatCmd;
pub use rsa::RsaCmd;
pub use sha::ShaCmd;

use cryptoeng_cfi_lib::cfi_assert_eq;
use cryptoeng_drivers::{cprintln, HwAccess, OwnerId};
use cryptoeng_error::{CryptoError, CryptoResult};

fn human_readable_command(bytes: &[u8]) -> Option<&str> {
    if bytes.len() == 4 && bytes.iter().all(|c| c.is_ascii_alphanumeric()) {
        core::str::from_utf8(bytes).ok()
    } else {
        None
    }
}

/// Routes decoded requests from remote callers to the engines.
///
/// Owns the hardware, the self test status and one context per engine. Each
/// command runs to completion before the next one is accepted.
pub struct Dispatcher<H: HwAccess> {
    drivers: Drivers<H>,
}

impl<H: HwAccess> Dispatcher<H> {
    pub fn new(drivers: Drivers<H>) -> Self {
        Self { drivers }
    }

    pub fn drivers(&self) -> &Drivers<H> {
        &self.drivers
    }

    pub fn drivers_mut(&mut self) -> &mut Drivers<H> {
        &mut self.drivers
    }

    /// Execute `cmd` for the caller identified by `owner_token`.
    ///
    /// # Arguments
    ///
    /// * `owner_token` - Transport identity of the caller
    /// * `cmd` - Decoded request
    ///
    /// # Returns
    ///
    /// * `RUNTIME_INVALID_OWNER` if the token can't identify a remote caller
    /// * `Response` - Outcome of the command
    pub fn dispatch(&mut self, owner_token: u32, cmd: &Command) -> CryptoResult<Response> {
        let id = cmd.id();
        if let Some(ascii) = human_readable_command(&id.0.to_be_bytes()) {
            cprintln!(
                "[rt] Received command=0x{:x} ({}), owner=0x{:x}",
                id.0,
                ascii,
                owner_token
            );
        } else {
            cprintln!("[rt] Received command=0x{:x}, owner=0x{:x}", id.0, owner_token);
        }

        let owner =
            OwnerId::new(owner_token).map_err(|_| CryptoError::RUNTIME_INVALID_OWNER)?;
        cfi_assert_eq(owner.is_privileged(), false)?;

        let result = match cmd {
            Command::Aes(req) => AesCmd::execute(&mut self.drivers, owner, req),
            Command::Sha(req) => ShaCmd::execute(&mut self.drivers, owner, req),
            Command::Rsa(params) => RsaCmd::execute(&mut self.drivers, owner, params),
            Command::Ecdsa(req) => EcdsaCmd::execute(&mut self.drivers, owner, req),
            Command::Kat(req) => KatCmd::execute(&mut self.drivers, req),
        };

        if let Err(e) = result {
            cprintln!("[rt] Command 0x{:x} failed 0x{:08X}", id.0, u32::from(e));
            if e.is_fatal() {
                cprintln!("[rt] Glitch detected");
            }
        }
        result
    }
}
