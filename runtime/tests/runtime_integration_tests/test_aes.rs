// Licensed under the Apache-2.0 license

use cryptoeng_drivers::reg::{aes_regs::key_clear, AES_BASE};
use cryptoeng_drivers::{
    Addr, AesDataParams, AesDirection, AesKeySize, AesKeySrc, AesOpParams, AesState, CryptoError,
    KatId, KeyClearTarget,
};
use cryptoeng_runtime::{AesReq, Command, KatReq, Response};

use crate::common::{
    exec, hal, put, put_hex, read, read_hex, run_rt_test, run_rt_test_no_kats, OWNER_A, OWNER_B,
};

const KEY: Addr = 0x1000;
const IV: Addr = 0x1040;
const AAD: Addr = 0x1080;
const PT: Addr = 0x1100;
const CT: Addr = 0x1200;
const OUT: Addr = 0x1300;
const TAG: Addr = 0x1400;

const KEY_HEX: &str = "4c8ebfe1444ec1b2d503c6986659af2c94fafe945f72c1e8486a5acfedb8a0f8";
const IV_HEX: &str = "473360e0ad24889959858995";
const PT_HEX: &str = concat!(
    "030a11181f262d343b424950575e656c737a81888f969da4abb2b9c0c7ced5dc",
    "e3eaf1f8ff060d141b222930373e454c535a61686f767d848b9299a0a7aeb5bc"
);
const CT_HEX: &str = concat!(
    "a644241400b6f6ac5385b23fd0991f23914f0ed3faf72a09684106dd50830fdf",
    "7b3f62b768578c9e1ea7c346bc210ce7605c34940c655ed2ff7e448cbba7456e"
);
const TAG_HEX: &str = "892b94e9b775f664594a6b659f49892e";

const DATA_LEN: u32 = 64;
const AAD_LEN: u32 = 32;

type Rt = cryptoeng_runtime::Dispatcher<cryptoeng_emu_periph::EmuHal>;

fn stage(rt: &mut Rt) {
    put_hex(rt, KEY, KEY_HEX);
    let mut iv = [0u8; 16];
    iv[..12].copy_from_slice(&hex::decode(IV_HEX).unwrap());
    put(rt, IV, &iv);
    let aad: Vec<u8> = (0x10..0x30).collect();
    put(rt, AAD, &aad);
    put_hex(rt, PT, PT_HEX);
}

fn write_key(src: AesKeySrc, key_size: AesKeySize) -> Command {
    Command::Aes(AesReq::WriteKey {
        key_src: src,
        key_size,
        key_addr: KEY,
    })
}

fn data_params(src: AesKeySrc, key_size: AesKeySize, input: Addr, output: Addr) -> AesDataParams {
    AesDataParams {
        key_src: src,
        key_size,
        iv_addr: IV,
        aad_addr: AAD,
        aad_len: AAD_LEN,
        in_addr: input,
        out_addr: output,
        data_len: DATA_LEN,
        tag_addr: TAG,
    }
}

fn encrypt(src: AesKeySrc) -> Command {
    Command::Aes(AesReq::EncryptData(data_params(
        src,
        AesKeySize::Key256,
        PT,
        CT,
    )))
}

fn decrypt(src: AesKeySrc) -> Command {
    Command::Aes(AesReq::DecryptData(data_params(
        src,
        AesKeySize::Key256,
        CT,
        OUT,
    )))
}

fn op_init(direction: AesDirection) -> Command {
    Command::Aes(AesReq::OperationInit(AesOpParams {
        key_src: AesKeySrc::User1,
        key_size: AesKeySize::Key256,
        iv_addr: IV,
        direction,
    }))
}

fn update(input: Addr, output: Addr) -> Command {
    Command::Aes(AesReq::Update {
        in_addr: input,
        out_addr: output,
        size: DATA_LEN,
        is_last: true,
    })
}

#[test]
fn test_round_trip_every_user_key() {
    let mut rt = run_rt_test();
    stage(&mut rt);

    for n in 0..8 {
        let src = AesKeySrc::user(n).unwrap();
        for key_size in [AesKeySize::Key128, AesKeySize::Key256] {
            exec(&mut rt, OWNER_A, write_key(src, key_size));
            let enc = data_params(src, key_size, PT, CT);
            let dec = data_params(src, key_size, CT, OUT);
            exec(&mut rt, OWNER_A, Command::Aes(AesReq::EncryptData(enc)));
            assert_ne!(read_hex(&rt, CT, 64), PT_HEX);
            exec(&mut rt, OWNER_A, Command::Aes(AesReq::DecryptData(dec)));
            assert_eq!(read_hex(&rt, OUT, 64), PT_HEX);
            put(&mut rt, OUT, &[0; 64]);
        }
    }
}

#[test]
fn test_known_answer_and_single_byte_flips() {
    let mut rt = run_rt_test();
    stage(&mut rt);
    exec(&mut rt, OWNER_A, write_key(AesKeySrc::User4, AesKeySize::Key256));

    exec(&mut rt, OWNER_A, encrypt(AesKeySrc::User4));
    assert_eq!(read_hex(&rt, CT, 64), CT_HEX);
    assert_eq!(read_hex(&rt, TAG, 16), TAG_HEX);

    exec(&mut rt, OWNER_A, decrypt(AesKeySrc::User4));
    assert_eq!(read_hex(&rt, OUT, 64), PT_HEX);

    let ct = read(&rt, CT, 64);
    for i in 0..ct.len() {
        let mut bad = ct.clone();
        bad[i] ^= 0x01;
        put(&mut rt, CT, &bad);
        assert_eq!(
            rt.dispatch(OWNER_A, &decrypt(AesKeySrc::User4)),
            Err(CryptoError::AES_TAG_MISMATCH)
        );
    }
    put(&mut rt, CT, &ct);

    let tag = read(&rt, TAG, 16);
    for i in 0..tag.len() {
        let mut bad = tag.clone();
        bad[i] ^= 0x80;
        put(&mut rt, TAG, &bad);
        assert_eq!(
            rt.dispatch(OWNER_A, &decrypt(AesKeySrc::User4)),
            Err(CryptoError::AES_TAG_MISMATCH)
        );
    }
    put(&mut rt, TAG, &tag);

    // Every failure released the engine
    exec(&mut rt, OWNER_B, decrypt(AesKeySrc::User4));
    assert_eq!(read_hex(&rt, OUT, 64), PT_HEX);
}

#[test]
fn test_streamed_commands_match_single_shot() {
    let mut rt = run_rt_test();
    stage(&mut rt);
    exec(&mut rt, OWNER_A, write_key(AesKeySrc::User1, AesKeySize::Key256));

    exec(&mut rt, OWNER_A, op_init(AesDirection::Encrypt));
    assert_eq!(rt.drivers().aes.state(), AesState::EncryptActive);
    exec(
        &mut rt,
        OWNER_A,
        Command::Aes(AesReq::UpdateAad {
            aad_addr: AAD,
            size: AAD_LEN,
        }),
    );
    exec(&mut rt, OWNER_A, update(PT, CT));
    exec(&mut rt, OWNER_A, Command::Aes(AesReq::Final { tag_addr: TAG }));
    assert_eq!(read_hex(&rt, CT, 64), CT_HEX);
    assert_eq!(read_hex(&rt, TAG, 16), TAG_HEX);
    assert_eq!(rt.drivers().aes.state(), AesState::Initialized);
    assert!(!rt.drivers().aes.slot().is_busy());
}

#[test]
fn test_busy_engine_rejects_other_owner() {
    let mut rt = run_rt_test();
    stage(&mut rt);
    exec(&mut rt, OWNER_A, write_key(AesKeySrc::User1, AesKeySize::Key256));
    exec(&mut rt, OWNER_A, op_init(AesDirection::Encrypt));

    hal(&mut rt).clear_write_log();
    assert_eq!(
        rt.dispatch(OWNER_B, &op_init(AesDirection::Encrypt)),
        Err(CryptoError::ARBITER_ENGINE_BUSY)
    );
    assert_eq!(
        rt.dispatch(OWNER_B, &encrypt(AesKeySrc::User1)),
        Err(CryptoError::ARBITER_ENGINE_BUSY)
    );
    assert_eq!(
        rt.dispatch(OWNER_B, &update(PT, OUT)),
        Err(CryptoError::ARBITER_ENGINE_BUSY)
    );
    assert_eq!(hal(&mut rt).writes_to(AES_BASE).count(), 0);

    // The owner finishes and the engine becomes free
    exec(&mut rt, OWNER_A, update(PT, CT));
    exec(&mut rt, OWNER_A, Command::Aes(AesReq::Final { tag_addr: TAG }));
    exec(&mut rt, OWNER_B, decrypt(AesKeySrc::User1));
    assert_eq!(read_hex(&rt, OUT, 64), PT_HEX);
}

#[test]
fn test_failed_operation_frees_engine() {
    let mut rt = run_rt_test();
    stage(&mut rt);
    exec(&mut rt, OWNER_A, write_key(AesKeySrc::User1, AesKeySize::Key256));
    put_hex(&mut rt, CT, CT_HEX);
    put(&mut rt, TAG, &[0u8; 16]);

    exec(&mut rt, OWNER_A, op_init(AesDirection::Decrypt));
    exec(
        &mut rt,
        OWNER_A,
        Command::Aes(AesReq::UpdateAad {
            aad_addr: AAD,
            size: AAD_LEN,
        }),
    );
    exec(&mut rt, OWNER_A, update(CT, OUT));
    assert_eq!(
        rt.dispatch(OWNER_A, &Command::Aes(AesReq::Final { tag_addr: TAG })),
        Err(CryptoError::AES_TAG_MISMATCH)
    );
    assert!(!rt.drivers().aes.slot().is_busy());

    exec(&mut rt, OWNER_B, encrypt(AesKeySrc::User1));
    assert_eq!(read_hex(&rt, TAG, 16), TAG_HEX);
}

#[test]
fn test_self_test_run_loses_owner_context() {
    let mut rt = run_rt_test();
    stage(&mut rt);
    exec(&mut rt, OWNER_A, write_key(AesKeySrc::User1, AesKeySize::Key256));
    exec(&mut rt, OWNER_A, op_init(AesDirection::Encrypt));
    exec(
        &mut rt,
        OWNER_A,
        Command::Aes(AesReq::UpdateAad {
            aad_addr: AAD,
            size: AAD_LEN,
        }),
    );

    // Another caller has the AES self test run; it completes a full operation
    let ids = (KatId::AES_ENCRYPT | KatId::AES_DECRYPT).bits();
    assert!(rt
        .dispatch(OWNER_B, &Command::Kat(KatReq::Run { ids }))
        .is_ok());

    assert_eq!(
        rt.dispatch(OWNER_A, &update(PT, CT)),
        Err(CryptoError::ARBITER_DATA_CONTEXT_LOST)
    );
    assert_eq!(
        rt.dispatch(OWNER_A, &Command::Aes(AesReq::Final { tag_addr: TAG })),
        Err(CryptoError::ARBITER_DATA_CONTEXT_LOST)
    );

    // A fresh operation by the displaced owner works
    exec(&mut rt, OWNER_A, encrypt(AesKeySrc::User1));
    assert_eq!(read_hex(&rt, CT, 64), CT_HEX);
}

#[test]
fn test_key_zero_verified() {
    let mut rt = run_rt_test();
    stage(&mut rt);
    exec(&mut rt, OWNER_A, write_key(AesKeySrc::User3, AesKeySize::Key256));
    assert_ne!(hal(&mut rt).aes().user_key(3), [0; 8]);

    exec(
        &mut rt,
        OWNER_A,
        Command::Aes(AesReq::KeyZero(KeyClearTarget::Source(AesKeySrc::User3))),
    );
    assert_ne!(
        hal(&mut rt).aes().zeroed_status() & (key_clear::USER_0 << 3),
        0
    );
    assert_eq!(hal(&mut rt).aes().user_key(3), [0; 8]);

    hal(&mut rt).clear_write_log();
    assert_eq!(
        rt.dispatch(
            OWNER_A,
            &Command::Aes(AesReq::KeyZero(KeyClearTarget::Source(
                AesKeySrc::BootHeader
            )))
        ),
        Err(CryptoError::AES_KEY_NOT_CLEARABLE)
    );
    assert!(hal(&mut rt).reg_writes().is_empty());

    assert_eq!(
        rt.dispatch(OWNER_A, &write_key(AesKeySrc::BootHeader, AesKeySize::Key256)),
        Err(CryptoError::AES_KEY_SRC_NOT_WRITABLE)
    );
}

#[test]
fn test_key_zero_all_keys() {
    let mut rt = run_rt_test();
    stage(&mut rt);
    for n in [0, 5, 7] {
        exec(
            &mut rt,
            OWNER_A,
            write_key(AesKeySrc::user(n).unwrap(), AesKeySize::Key256),
        );
    }
    exec(
        &mut rt,
        OWNER_B,
        Command::Aes(AesReq::KeyZero(KeyClearTarget::AllKeys)),
    );
    for n in 0..8 {
        assert_eq!(hal(&mut rt).aes().user_key(n), [0; 8]);
    }
}

#[test]
fn test_device_keys_refused_for_remote_callers() {
    let mut rt = run_rt_test();
    stage(&mut rt);
    for src in [AesKeySrc::Efuse, AesKeySrc::Bbram, AesKeySrc::BootHeader] {
        assert_eq!(
            rt.dispatch(OWNER_A, &encrypt(src)),
            Err(CryptoError::AES_DEVICE_KEY_NOT_ALLOWED)
        );
    }
    assert!(!rt.drivers().aes.slot().is_busy());
}

#[test]
fn test_gating_leaves_state_unchanged() {
    let mut rt = run_rt_test_no_kats();
    stage(&mut rt);
    exec(&mut rt, OWNER_A, Command::Aes(AesReq::Init));
    exec(&mut rt, OWNER_A, write_key(AesKeySrc::User0, AesKeySize::Key256));

    hal(&mut rt).clear_write_log();
    assert_eq!(
        rt.dispatch(OWNER_A, &encrypt(AesKeySrc::User0)),
        Err(CryptoError::AES_KAT_NOT_EXECUTED)
    );
    assert_eq!(
        rt.dispatch(OWNER_A, &op_init(AesDirection::Decrypt)),
        Err(CryptoError::AES_KAT_NOT_EXECUTED)
    );
    assert!(hal(&mut rt).reg_writes().is_empty());
    assert_eq!(rt.drivers().aes.state(), AesState::Initialized);
    assert!(!rt.drivers().aes.slot().is_busy());
    assert_eq!(rt.drivers().kat_status.bits(), Ok(KatId::empty()));
}

#[test]
fn test_gmac_only() {
    let mut rt = run_rt_test();
    stage(&mut rt);
    exec(&mut rt, OWNER_A, write_key(AesKeySrc::User2, AesKeySize::Key256));

    let mut params = data_params(AesKeySrc::User2, AesKeySize::Key256, PT, CT);
    params.data_len = 0;
    exec(&mut rt, OWNER_A, Command::Aes(AesReq::EncryptData(params)));
    exec(&mut rt, OWNER_A, Command::Aes(AesReq::DecryptData(params)));

    let mut tag = read(&rt, TAG, 16);
    tag[3] ^= 0x10;
    put(&mut rt, TAG, &tag);
    assert_eq!(
        rt.dispatch(OWNER_A, &Command::Aes(AesReq::DecryptData(params))),
        Err(CryptoError::AES_TAG_MISMATCH)
    );
}

#[test]
fn test_invalid_owner_tokens() {
    let mut rt = run_rt_test();
    for token in [0, u32::MAX] {
        assert_eq!(
            rt.dispatch(token, &Command::Aes(AesReq::Init)),
            Err(CryptoError::RUNTIME_INVALID_OWNER)
        );
    }
    assert_eq!(
        rt.dispatch(OWNER_A, &Command::Kat(KatReq::Status)),
        Ok(Response::KatStatus(KatId::all()))
    );
}
