// Licensed under the Apache-2.0 license

use cryptoeng_drivers::reg::SHA3_BASE;
use cryptoeng_drivers::{Addr, CryptoError, KatId, ShaKind, ShaMode, ShaState};
use cryptoeng_runtime::{Command, KatReq, Response, ShaReq};

use crate::common::{
    exec, hal, put, read_hex, run_rt_test, run_rt_test_no_kats, OWNER_A, OWNER_B,
};

const MSG: Addr = 0x2000;
const DIGEST: Addr = 0x2400;
const DIGEST2: Addr = 0x2500;

const MESSAGE: &[u8] = b"The quick brown fox jumps over the lazy dog, twice over: \
The quick brown fox jumps over the lazy dog, twice over: \
The quick brown fox jumps over the lazy dog, twice over: ";

const SHA3_384_HEX: &str = concat!(
    "b6cb4a3e5dd4a41da4c2e9192fc31a763215b86e0b8439dd",
    "6322d24f504814bcf13d6406fdedb7bc3a6627fbd6ac96ab"
);
const SHA512_HEX: &str = concat!(
    "d15a65ebc7eff1033f6ce3813a9fcefcbd6ac862f1923344d35506c2893deb50",
    "1b70f767b70e20ecdb139f1b76d3b546cf9710ba2552b82853c807349f90d511"
);
const SHA256_HEX: &str = "ff75f49e3cb28a828aef70685db393b176e3033f709c68c235e78b655f283e4f";

fn digest(mode: ShaMode, out_addr: Addr) -> Command {
    Command::Sha(ShaReq::Digest {
        mode,
        addr: MSG,
        size: MESSAGE.len() as u32,
        out_addr,
    })
}

#[test]
fn test_digest_is_deterministic() {
    let mut rt = run_rt_test();
    put(&mut rt, MSG, MESSAGE);

    assert_eq!(
        rt.dispatch(OWNER_A, &digest(ShaMode::Sha3_384, DIGEST)),
        Ok(Response::Digest { len: 48 })
    );
    assert_eq!(
        rt.dispatch(OWNER_B, &digest(ShaMode::Sha3_384, DIGEST2)),
        Ok(Response::Digest { len: 48 })
    );
    assert_eq!(read_hex(&rt, DIGEST, 48), SHA3_384_HEX);
    assert_eq!(read_hex(&rt, DIGEST2, 48), SHA3_384_HEX);

    assert_eq!(
        rt.dispatch(OWNER_A, &digest(ShaMode::Sha512, DIGEST)),
        Ok(Response::Digest { len: 64 })
    );
    assert_eq!(read_hex(&rt, DIGEST, 64), SHA512_HEX);

    assert_eq!(
        rt.dispatch(OWNER_A, &digest(ShaMode::Sha256, DIGEST)),
        Ok(Response::Digest { len: 32 })
    );
    assert_eq!(read_hex(&rt, DIGEST, 32), SHA256_HEX);
}

#[test]
fn test_streamed_updates() {
    let mut rt = run_rt_test();
    put(&mut rt, MSG, MESSAGE);

    exec(
        &mut rt,
        OWNER_A,
        Command::Sha(ShaReq::Start {
            mode: ShaMode::Sha3_384,
        }),
    );
    assert_eq!(rt.drivers().sha3.state(), ShaState::EngineStarted);

    let mut offset = 0u32;
    for chunk in [7u32, 100, 1, MESSAGE.len() as u32 - 108] {
        exec(
            &mut rt,
            OWNER_A,
            Command::Sha(ShaReq::Update {
                kind: ShaKind::Sha3,
                addr: MSG + Addr::from(offset),
                size: chunk,
            }),
        );
        offset += chunk;
    }
    assert_eq!(
        rt.dispatch(
            OWNER_A,
            &Command::Sha(ShaReq::Finish {
                kind: ShaKind::Sha3,
                out_addr: DIGEST,
            })
        ),
        Ok(Response::Digest { len: 48 })
    );
    assert_eq!(read_hex(&rt, DIGEST, 48), SHA3_384_HEX);
    assert_eq!(rt.drivers().sha3.state(), ShaState::Initialized);
    assert!(!rt.drivers().sha3.slot().is_busy());
}

#[test]
fn test_engines_are_independent() {
    let mut rt = run_rt_test();
    put(&mut rt, MSG, MESSAGE);

    exec(
        &mut rt,
        OWNER_A,
        Command::Sha(ShaReq::Start {
            mode: ShaMode::Sha3_384,
        }),
    );

    // SHA3 is held by A, SHA2 is free for B
    assert_eq!(
        rt.dispatch(OWNER_B, &digest(ShaMode::Sha3_256, DIGEST2)),
        Err(CryptoError::ARBITER_ENGINE_BUSY)
    );
    assert_eq!(
        rt.dispatch(OWNER_B, &digest(ShaMode::Sha512, DIGEST2)),
        Ok(Response::Digest { len: 64 })
    );
    assert_eq!(read_hex(&rt, DIGEST2, 64), SHA512_HEX);

    exec(
        &mut rt,
        OWNER_A,
        Command::Sha(ShaReq::Update {
            kind: ShaKind::Sha3,
            addr: MSG,
            size: MESSAGE.len() as u32,
        }),
    );
    assert_eq!(
        rt.dispatch(
            OWNER_A,
            &Command::Sha(ShaReq::Finish {
                kind: ShaKind::Sha3,
                out_addr: DIGEST,
            })
        ),
        Ok(Response::Digest { len: 48 })
    );
    assert_eq!(read_hex(&rt, DIGEST, 48), SHA3_384_HEX);
}

#[test]
fn test_mode_must_match_engine_state() {
    let mut rt = run_rt_test();
    put(&mut rt, MSG, MESSAGE);

    // Update without a start
    assert_eq!(
        rt.dispatch(
            OWNER_A,
            &Command::Sha(ShaReq::Update {
                kind: ShaKind::Sha2,
                addr: MSG,
                size: 16,
            })
        ),
        Err(CryptoError::SHA_STATE_MISMATCH)
    );

    exec(
        &mut rt,
        OWNER_A,
        Command::Sha(ShaReq::Start {
            mode: ShaMode::Sha384,
        }),
    );
    assert_eq!(
        rt.dispatch(
            OWNER_A,
            &Command::Sha(ShaReq::Start {
                mode: ShaMode::Sha384,
            })
        ),
        Err(CryptoError::SHA_STATE_MISMATCH)
    );
}

#[test]
fn test_sha_gated_by_self_test() {
    let mut rt = run_rt_test_no_kats();
    put(&mut rt, MSG, MESSAGE);
    exec(
        &mut rt,
        OWNER_A,
        Command::Sha(ShaReq::Init {
            kind: ShaKind::Sha3,
        }),
    );

    hal(&mut rt).clear_write_log();
    assert_eq!(
        rt.dispatch(OWNER_A, &digest(ShaMode::Sha3_384, DIGEST)),
        Err(CryptoError::SHA_KAT_NOT_EXECUTED)
    );
    assert_eq!(hal(&mut rt).writes_to(SHA3_BASE).count(), 0);
    assert_eq!(rt.drivers().sha3.state(), ShaState::Initialized);

    assert_eq!(
        rt.dispatch(
            OWNER_A,
            &Command::Kat(KatReq::Run {
                ids: KatId::SHA3_384.bits(),
            })
        ),
        Ok(Response::KatStatus(KatId::SHA3_384))
    );
    assert_eq!(
        rt.dispatch(OWNER_A, &digest(ShaMode::Sha3_384, DIGEST)),
        Ok(Response::Digest { len: 48 })
    );
    assert_eq!(read_hex(&rt, DIGEST, 48), SHA3_384_HEX);

    // SHA3-256 has still not been tested
    assert_eq!(
        rt.dispatch(OWNER_A, &digest(ShaMode::Sha3_256, DIGEST)),
        Err(CryptoError::SHA_KAT_NOT_EXECUTED)
    );
}
