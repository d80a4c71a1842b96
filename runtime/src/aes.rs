// Licensed under the Apache-2.0 license

use cryptoeng_drivers::{cprintln, HwAccess, KatGate, OwnerId};
use cryptoeng_error::CryptoResult;

use crate::{AesReq, Drivers, Response};

pub struct AesCmd;
impl AesCmd {
    /// Execute an AES-GCM request on behalf of `owner`.
    ///
    /// The engine driver claims the engine, performs the transition and
    /// releases it on every terminal path, resetting the hardware on failure.
    pub(crate) fn execute<H: HwAccess>(
        drivers: &mut Drivers<H>,
        owner: OwnerId,
        req: &AesReq,
    ) -> CryptoResult<Response> {
        let Drivers {
            hal,
            kat_status,
            aes,
            ..
        } = drivers;
        let gate = KatGate::Registry(kat_status);

        match *req {
            AesReq::Init => aes.init(hal, owner)?,
            AesReq::OperationInit(params) => aes.operation_init(hal, gate, owner, &params)?,
            AesReq::GmacCfg { enable } => aes.gmac_cfg(hal, owner, enable)?,
            AesReq::UpdateAad { aad_addr, size } => aes.update_aad(hal, owner, aad_addr, size)?,
            AesReq::Update {
                in_addr,
                out_addr,
                size,
                is_last,
            } => aes.update(hal, owner, in_addr, out_addr, size, is_last)?,
            AesReq::Final { tag_addr } => aes.finish(hal, owner, tag_addr)?,
            AesReq::EncryptData(params) => aes.encrypt_data(hal, gate, owner, &params)?,
            AesReq::DecryptData(params) => aes.decrypt_data(hal, gate, owner, &params)?,
            AesReq::WriteKey {
                key_src,
                key_size,
                key_addr,
            } => aes.write_key(hal, owner, key_src, key_size, key_addr)?,
            AesReq::KeyZero(target) => aes.key_zero(hal, owner, target)?,
            AesReq::KekDecrypt(params) => aes.kek_decrypt(hal, gate, owner, &params)?,
            AesReq::SetDpaCm { enable } => {
                aes.set_dpa_cm(hal, owner, enable)?;
                cprintln!("[rt] AES DPA countermeasure enabled={}", enable);
            }
            AesReq::CfgKupKeyNIv { enable } => aes.cfg_kup_key_n_iv(hal, owner, enable)?,
        }
        Ok(Response::Done)
    }
}
