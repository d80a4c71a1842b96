// Licensed under the Apache-2.0 license

use cryptoeng_drivers::{Addr, HwAccess, KatGate, OwnerId, SHA_MAX_DIGEST_SIZE};
use cryptoeng_error::CryptoResult;

use crate::{Drivers, Response, ShaReq};

pub struct ShaCmd;
impl ShaCmd {
    /// Execute a SHA2 or SHA3 request on behalf of `owner`.
    ///
    /// Digests are written to the caller's `out_addr`.
    pub(crate) fn execute<H: HwAccess>(
        drivers: &mut Drivers<H>,
        owner: OwnerId,
        req: &ShaReq,
    ) -> CryptoResult<Response> {
        match *req {
            ShaReq::Init { kind } => {
                let (hal, sha, _) = drivers.sha(kind);
                sha.init(hal, owner)?;
            }
            ShaReq::Start { mode } => {
                let (hal, sha, kat_status) = drivers.sha(mode.kind());
                sha.start(hal, KatGate::Registry(kat_status), owner, mode)?;
            }
            ShaReq::Update { kind, addr, size } => {
                let (hal, sha, _) = drivers.sha(kind);
                sha.update(hal, owner, addr, size)?;
            }
            ShaReq::LastUpdate { kind } => {
                let (hal, sha, _) = drivers.sha(kind);
                sha.last_update(hal, owner)?;
            }
            ShaReq::Finish { kind, out_addr } => {
                let (hal, sha, _) = drivers.sha(kind);
                let mut digest = [0u8; SHA_MAX_DIGEST_SIZE];
                let len = sha.finish(hal, owner, &mut digest)?;
                return Self::write_digest(hal, out_addr, &digest[..len]);
            }
            ShaReq::Digest {
                mode,
                addr,
                size,
                out_addr,
            } => {
                let (hal, sha, kat_status) = drivers.sha(mode.kind());
                let mut digest = [0u8; SHA_MAX_DIGEST_SIZE];
                let len = sha.digest(
                    hal,
                    KatGate::Registry(kat_status),
                    owner,
                    mode,
                    addr,
                    size,
                    &mut digest,
                )?;
                return Self::write_digest(hal, out_addr, &digest[..len]);
            }
        }
        Ok(Response::Done)
    }

    fn write_digest<H: HwAccess>(
        hal: &mut H,
        out_addr: Addr,
        digest: &[u8],
    ) -> CryptoResult<Response> {
        hal.mem_write(out_addr, digest)?;
        Ok(Response::Digest { len: digest.len() })
    }
}
