/*++

Licensed under the Apache-2.0 license.

File Name:

    arbiter.rs

Abstract:

    File contains the single-owner arbiter guarding each shared engine.

--*/

use core::num::NonZeroU32;

use crate::cprintln;
use cryptoeng_cfi_lib::{cfi_launder, MaskedU32};
use cryptoeng_error::{CryptoError, CryptoResult};

/// Displaced owners remembered per engine until each one observes its loss
pub const LOST_OWNERS_MAX: usize = 4;

/// Opaque identity of the logical caller holding an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerId(NonZeroU32);

impl OwnerId {
    /// Reserved identity of in-firmware users (self tests, loader)
    pub const PRIVILEGED: OwnerId = OwnerId(NonZeroU32::MAX);

    /// Build an owner from a transport token.
    ///
    /// Zero and the privileged value are rejected.
    pub fn new(token: u32) -> CryptoResult<Self> {
        match NonZeroU32::new(token) {
            Some(v) if v != Self::PRIVILEGED.0 => Ok(Self(v)),
            _ => Err(CryptoError::ARBITER_INVALID_OWNER),
        }
    }

    pub fn is_privileged(&self) -> bool {
        *self == Self::PRIVILEGED
    }

    fn raw(&self) -> u32 {
        self.0.get()
    }
}

/// How a claim was granted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The engine was free
    Fresh,

    /// The requester already owned the engine
    Continuation,

    /// A privileged requester displaced the current owner
    Preempted(OwnerId),
}

/// Ownership state of one engine instance
#[derive(Debug)]
pub struct EngineSlot {
    owner: Option<OwnerId>,

    /// Raw owner value (zero when free) kept as a masked shadow
    shadow: MaskedU32,

    /// Displaced owners that have not started a new operation yet, oldest first
    lost: [Option<OwnerId>; LOST_OWNERS_MAX],
}

impl Default for EngineSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineSlot {
    pub const fn new() -> Self {
        Self {
            owner: None,
            shadow: MaskedU32::new(0),
            lost: [None; LOST_OWNERS_MAX],
        }
    }

    /// Current owner, if any
    pub fn owner(&self) -> Option<OwnerId> {
        self.owner
    }

    pub fn is_busy(&self) -> bool {
        self.owner.is_some()
    }

    /// True if a privileged claim displaced `owner` and it has not started
    /// a new operation since
    pub fn context_lost(&self, owner: OwnerId) -> bool {
        self.lost.contains(&Some(owner))
    }

    /// True if any displaced owner has yet to observe its loss
    pub fn data_context_lost(&self) -> bool {
        self.lost[0].is_some()
    }

    fn mark_lost(&mut self, owner: OwnerId) {
        if self.context_lost(owner) {
            return;
        }
        match self.lost.iter_mut().find(|o| o.is_none()) {
            Some(free) => *free = Some(owner),
            None => {
                if let Some(oldest) = self.lost[0] {
                    cprintln!("[arb] Forgetting lost owner 0x{:08X}", oldest.raw());
                }
                self.lost.rotate_left(1);
                self.lost[LOST_OWNERS_MAX - 1] = Some(owner);
            }
        }
    }

    fn forget_lost(&mut self, owner: OwnerId) {
        if let Some(i) = self.lost.iter().position(|o| *o == Some(owner)) {
            self.lost[i..].rotate_left(1);
            self.lost[LOST_OWNERS_MAX - 1] = None;
        }
    }

    fn verified_owner(&self) -> CryptoResult<Option<OwnerId>> {
        let raw = self
            .shadow
            .get()
            .map_err(|_| CryptoError::ARBITER_GLITCH_DETECTED)?;
        let plain = self.owner.map_or(0, |o| o.raw());
        if cfi_launder(plain) != raw {
            Err(CryptoError::ARBITER_GLITCH_DETECTED)?;
        }
        Ok(self.owner)
    }

    fn set_owner(&mut self, owner: Option<OwnerId>) {
        self.owner = owner;
        self.shadow.set(owner.map_or(0, |o| o.raw()));
    }

    /// Claim the engine for `requester`.
    ///
    /// A free engine is taken. The current owner continues. A privileged
    /// requester displaces any other owner and marks its context lost. Any
    /// other requester is refused with `ARBITER_ENGINE_BUSY`.
    pub fn compare_and_claim(&mut self, requester: OwnerId) -> CryptoResult<Claim> {
        match self.verified_owner()? {
            None => {
                self.set_owner(Some(requester));
                Ok(Claim::Fresh)
            }
            Some(owner) if owner == requester => Ok(Claim::Continuation),
            Some(owner) if requester.is_privileged() => {
                cprintln!("[arb] Owner 0x{:08X} preempted", owner.raw());
                self.mark_lost(owner);
                self.set_owner(Some(requester));
                Ok(Claim::Preempted(owner))
            }
            Some(_) => Err(CryptoError::ARBITER_ENGINE_BUSY),
        }
    }

    /// Claim the engine for the start of a new operation.
    ///
    /// A fresh start clears a context loss recorded against the requester.
    pub fn begin_operation(&mut self, requester: OwnerId) -> CryptoResult<Claim> {
        let claim = self.compare_and_claim(requester)?;
        self.forget_lost(requester);
        Ok(claim)
    }

    /// Validate a continuation call of `requester`.
    ///
    /// Fails with `ARBITER_DATA_CONTEXT_LOST` if the requester's operation was
    /// displaced, or `ARBITER_ENGINE_BUSY` if someone else holds the engine.
    /// A free engine passes; the lifecycle state check rejects the call.
    pub fn check_context(&self, requester: OwnerId) -> CryptoResult<()> {
        let owner = self.verified_owner()?;
        if self.context_lost(requester) {
            Err(CryptoError::ARBITER_DATA_CONTEXT_LOST)?;
        }
        match owner {
            Some(o) if o != requester => Err(CryptoError::ARBITER_ENGINE_BUSY),
            _ => Ok(()),
        }
    }

    /// Refuse if another caller holds the engine, without claiming it.
    pub fn ensure_available(&self, requester: OwnerId) -> CryptoResult<()> {
        match self.verified_owner()? {
            Some(o) if o != requester && !requester.is_privileged() => {
                Err(CryptoError::ARBITER_ENGINE_BUSY)
            }
            _ => Ok(()),
        }
    }

    /// Release the engine held by `requester`.
    pub fn release(&mut self, requester: OwnerId) -> CryptoResult<()> {
        match self.owner {
            Some(o) if o == requester => {
                self.set_owner(None);
                Ok(())
            }
            None => Ok(()),
            Some(_) => Err(CryptoError::ARBITER_NOT_OWNER),
        }
    }

    /// Release on a terminal transition of the owner's operation.
    pub(crate) fn release_owned(&mut self, requester: OwnerId) {
        if self.owner == Some(requester) {
            self.set_owner(None);
        }
    }
}
