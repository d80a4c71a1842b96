// Licensed under the Apache-2.0 license

use cryptoeng_drivers::reg::ECDSA_BASE;
use cryptoeng_drivers::{Addr, CryptoError, Curve, EcdsaSignParams, EcdsaVerifyParams};
use cryptoeng_runtime::{Command, EcdsaReq};

use crate::common::{exec, hal, put_hex, read_hex, run_rt_test, run_rt_test_no_kats, OWNER_A};

const PRIV_KEY: Addr = 0x5000;
const EPHEMERAL: Addr = 0x5100;
const HASH: Addr = 0x5200;
const PUB_KEY: Addr = 0x5300;
const SIG: Addr = 0x5400;

const D: &str = "2217964fb2143533ba93aa35fe0937a6695e20872707064499217c5f6ab809df";
const HASH_HEX: &str = "02bf585c7289459cdd2061d167e540c01e4056b465cae15fa345edad9388546d";
const K: &str = "bfd631a2a6473170b8166d332506be62e5485ad0be76ba74a1097c595f5770cd";
const PUB: &str = concat!(
    "3677fbf9bb2d96a31b01110857938cc49d9a30a4e00e9cd4b55d9777580c84c7",
    "0c674894e853d36bbec6c21fdcfc7bd1f82b72d3a4c28e10d8255d2133d5ca38"
);
const SIGNATURE: &str = concat!(
    "7a67e944c79390b22aeb4f03ef12dae65f1bf042fcc26e5f10ec949b39b41f6a",
    "3301166c6dbc5fa38b1a10ca50a7089847e574cd910ac31d04e9a699549a5c5a"
);

type Rt = cryptoeng_runtime::Dispatcher<cryptoeng_emu_periph::EmuHal>;

fn stage(rt: &mut Rt) {
    put_hex(rt, PRIV_KEY, D);
    put_hex(rt, EPHEMERAL, K);
    put_hex(rt, HASH, HASH_HEX);
}

fn generate() -> Command {
    Command::Ecdsa(EcdsaReq::GenerateKey {
        curve: Curve::P256,
        key_addr: PRIV_KEY,
        pub_key_addr: PUB_KEY,
    })
}

fn sign() -> Command {
    Command::Ecdsa(EcdsaReq::Sign(EcdsaSignParams {
        curve: Curve::P256,
        key_addr: PRIV_KEY,
        ephemeral_addr: EPHEMERAL,
        hash_addr: HASH,
        hash_len: 32,
        sig_addr: SIG,
    }))
}

fn verify() -> Command {
    Command::Ecdsa(EcdsaReq::Verify(EcdsaVerifyParams {
        curve: Curve::P256,
        pub_key_addr: PUB_KEY,
        hash_addr: HASH,
        hash_len: 32,
        sig_addr: SIG,
    }))
}

fn validate() -> Command {
    Command::Ecdsa(EcdsaReq::ValidateKey {
        curve: Curve::P256,
        pub_key_addr: PUB_KEY,
    })
}

#[test]
fn test_generate_sign_verify() {
    let mut rt = run_rt_test();
    stage(&mut rt);

    exec(&mut rt, OWNER_A, generate());
    assert_eq!(read_hex(&rt, PUB_KEY, 64), PUB);
    exec(&mut rt, OWNER_A, validate());

    exec(&mut rt, OWNER_A, sign());
    assert_eq!(read_hex(&rt, SIG, 64), SIGNATURE);
    exec(&mut rt, OWNER_A, verify());
    assert!(hal(&mut rt).ecdsa().ram_clear());

    // Any other digest must not verify
    put_hex(
        &mut rt,
        HASH,
        "03bf585c7289459cdd2061d167e540c01e4056b465cae15fa345edad9388546d",
    );
    assert_eq!(
        rt.dispatch(OWNER_A, &verify()),
        Err(CryptoError::ECDSA_BAD_SIGNATURE)
    );
    assert!(hal(&mut rt).ecdsa().ram_clear());
    assert!(!rt.drivers().ecdsa.slot().is_busy());
}

#[test]
fn test_empty_hash_rejected() {
    let mut rt = run_rt_test();
    stage(&mut rt);
    let cmd = Command::Ecdsa(EcdsaReq::Sign(EcdsaSignParams {
        curve: Curve::P256,
        key_addr: PRIV_KEY,
        ephemeral_addr: EPHEMERAL,
        hash_addr: HASH,
        hash_len: 0,
        sig_addr: SIG,
    }));
    assert_eq!(
        rt.dispatch(OWNER_A, &cmd),
        Err(CryptoError::ECDSA_INVALID_PARAM)
    );
}

#[test]
fn test_ecdsa_gated_by_self_test() {
    let mut rt = run_rt_test_no_kats();
    stage(&mut rt);
    put_hex(&mut rt, PUB_KEY, PUB);
    put_hex(&mut rt, SIG, SIGNATURE);

    hal(&mut rt).clear_write_log();
    for cmd in [generate(), sign(), verify(), validate()] {
        assert_eq!(
            rt.dispatch(OWNER_A, &cmd),
            Err(CryptoError::ECDSA_KAT_NOT_EXECUTED)
        );
    }
    assert_eq!(hal(&mut rt).writes_to(ECDSA_BASE).count(), 0);
}
