// Licensed under the Apache-2.0 license

use cryptoeng_drivers::{HwAccess, KatGate, OwnerId};
use cryptoeng_error::CryptoResult;

use crate::{Drivers, EcdsaReq, Response};

pub struct EcdsaCmd;
impl EcdsaCmd {
    /// Execute an ECDSA request on behalf of `owner`.
    ///
    /// A bad signature is reported as `ECDSA_BAD_SIGNATURE`.
    pub(crate) fn execute<H: HwAccess>(
        drivers: &mut Drivers<H>,
        owner: OwnerId,
        req: &EcdsaReq,
    ) -> CryptoResult<Response> {
        let Drivers {
            hal,
            kat_status,
            ecdsa,
            ..
        } = drivers;
        let gate = KatGate::Registry(kat_status);

        match req {
            EcdsaReq::GenerateKey {
                curve,
                key_addr,
                pub_key_addr,
            } => ecdsa.generate_public_key(hal, gate, owner, *curve, *key_addr, *pub_key_addr)?,
            EcdsaReq::Sign(params) => ecdsa.sign(hal, gate, owner, params)?,
            EcdsaReq::Verify(params) => ecdsa.verify(hal, gate, owner, params)?,
            EcdsaReq::ValidateKey {
                curve,
                pub_key_addr,
            } => ecdsa.validate_public_key(hal, gate, owner, *curve, *pub_key_addr)?,
        }
        Ok(Response::Done)
    }
}
