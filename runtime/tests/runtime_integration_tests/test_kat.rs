// Licensed under the Apache-2.0 license

use cryptoeng_drivers::reg::efuse;
use cryptoeng_drivers::{Addr, CryptoError, KatId, ShaMode};
use cryptoeng_runtime::{Command, KatReq, Response, ShaReq};

use crate::common::{hal, put, run_rt_test, run_rt_test_no_kats, OWNER_A, OWNER_B};

const MSG: Addr = 0x6000;
const DIGEST: Addr = 0x6400;

fn kat(req: KatReq) -> Command {
    Command::Kat(req)
}

fn sha3_digest() -> Command {
    Command::Sha(ShaReq::Digest {
        mode: ShaMode::Sha3_384,
        addr: MSG,
        size: 3,
        out_addr: DIGEST,
    })
}

#[test]
fn test_status_after_boot() {
    let mut rt = run_rt_test();
    assert_eq!(
        rt.dispatch(OWNER_A, &kat(KatReq::Status)),
        Ok(Response::KatStatus(KatId::all()))
    );
}

#[test]
fn test_run_rejects_unknown_ids() {
    let mut rt = run_rt_test();
    assert_eq!(
        rt.dispatch(OWNER_A, &kat(KatReq::Run { ids: 0 })),
        Err(CryptoError::KAT_INVALID_ID)
    );
    assert_eq!(
        rt.dispatch(OWNER_A, &kat(KatReq::Run { ids: 1 << 12 })),
        Err(CryptoError::KAT_INVALID_ID)
    );
    assert_eq!(
        rt.dispatch(OWNER_A, &kat(KatReq::Status)),
        Ok(Response::KatStatus(KatId::all()))
    );
}

#[test]
fn test_run_all_from_cold() {
    let mut rt = run_rt_test_no_kats();
    assert_eq!(
        rt.dispatch(OWNER_B, &kat(KatReq::Status)),
        Ok(Response::KatStatus(KatId::empty()))
    );
    assert_eq!(
        rt.dispatch(OWNER_B, &kat(KatReq::RunAll)),
        Ok(Response::KatStatus(KatId::all()))
    );
}

#[test]
fn test_failed_run_all_gates_engines() {
    let mut rt = run_rt_test();
    put(&mut rt, MSG, b"abc");

    hal(&mut rt).sha3_mut().faults.error = true;
    assert!(rt.dispatch(OWNER_A, &kat(KatReq::RunAll)).is_err());

    // Tests that ran before the failure are the only ones recorded
    assert_eq!(
        rt.dispatch(OWNER_A, &kat(KatReq::Status)),
        Ok(Response::KatStatus(KatId::SHA2_256))
    );

    hal(&mut rt).sha3_mut().faults.error = false;
    assert_eq!(
        rt.dispatch(OWNER_A, &sha3_digest()),
        Err(CryptoError::SHA_KAT_NOT_EXECUTED)
    );

    assert_eq!(
        rt.dispatch(OWNER_A, &kat(KatReq::RunAll)),
        Ok(Response::KatStatus(KatId::all()))
    );
    assert_eq!(
        rt.dispatch(OWNER_A, &sha3_digest()),
        Ok(Response::Digest { len: 48 })
    );
}

#[test]
fn test_dpa_fused_off_is_skipped() {
    let mut rt = run_rt_test_no_kats();
    hal(&mut rt).set_efuse_misc1(efuse::DPA_CM_DIS_MASK);
    assert_eq!(
        rt.dispatch(OWNER_A, &kat(KatReq::RunAll)),
        Ok(Response::KatStatus(KatId::all() - KatId::AES_DPA_CM))
    );
}
