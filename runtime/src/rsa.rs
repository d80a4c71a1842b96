// Licensed under the Apache-2.0 license

#[cfg(not(feature = "fips-self-test"))]
use cryptoeng_drivers::RsaDirection;
use cryptoeng_drivers::{HwAccess, KatGate, OwnerId, RsaParams};
#[cfg(not(feature = "fips-self-test"))]
use cryptoeng_error::CryptoError;
use cryptoeng_error::CryptoResult;

use crate::{Drivers, Response};

pub struct RsaCmd;
impl RsaCmd {
    /// Execute one RSA exponentiation on behalf of `owner`.
    ///
    /// Private decryption is only offered by builds carrying its self test.
    pub(crate) fn execute<H: HwAccess>(
        drivers: &mut Drivers<H>,
        owner: OwnerId,
        params: &RsaParams,
    ) -> CryptoResult<Response> {
        #[cfg(not(feature = "fips-self-test"))]
        if params.exponent.direction() == RsaDirection::PrivateDecrypt {
            Err(CryptoError::RUNTIME_UNSUPPORTED_COMMAND)?;
        }
        drivers.rsa.operation(
            &mut drivers.hal,
            KatGate::Registry(&drivers.kat_status),
            owner,
            params,
        )?;
        Ok(Response::Done)
    }
}
