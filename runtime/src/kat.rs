// Licensed under the Apache-2.0 license

use cryptoeng_drivers::{cprintln, HwAccess, KatId};
use cryptoeng_error::CryptoResult;

use crate::{Drivers, KatReq, Response};

pub struct KatCmd;
impl KatCmd {
    /// Execute a self test request.
    ///
    /// Tests run as the privileged owner and displace any operation in
    /// progress on the engines they use.
    pub(crate) fn execute<H: HwAccess>(
        drivers: &mut Drivers<H>,
        req: &KatReq,
    ) -> CryptoResult<Response> {
        let status = match *req {
            KatReq::Run { ids } => {
                let ids = KatId::from_raw(ids)?;
                cprintln!("[rt] Running KATs 0x{:X}", ids.bits());
                drivers.run_kats(Some(ids))?
            }
            KatReq::RunAll => {
                cprintln!("[rt] Running all KATs");
                drivers.run_kats(None)?
            }
            KatReq::Status => drivers.kat_status.bits()?,
        };
        Ok(Response::KatStatus(status))
    }
}
