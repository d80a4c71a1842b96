// Licensed under the Apache-2.0 license

use cryptoeng_drivers::reg::RSA_BASE;
use cryptoeng_drivers::{Addr, CryptoError, KatId, RsaExponent, RsaKeySize, RsaParams};
use cryptoeng_runtime::Command;

use crate::common::{
    exec, hal, put_hex, read_hex, run_rt_test, run_rt_test_no_kats, OWNER_A, OWNER_B,
};

const MODULUS: Addr = 0x4000;
const PRIV_EXP: Addr = 0x4200;
const INPUT: Addr = 0x4400;
const OUTPUT: Addr = 0x4600;

const PUB_EXP: u32 = 65537;
const KEY_BYTES: usize = RsaKeySize::Rsa3072.bytes();

const MODULUS_HEX: &str = concat!(
    "c6a667ef521d3b5ea4cd1576c609f72b6ee56a2d221f38e10d41396f78d0f1b0",
    "d449139b2f8be4a4bc5d4928fc6564b3381681310954bcfca7289642e01482c6",
    "19ecd6b1125a80fb1b65713fc3664171c7ae8646d436123482b0d7152c5b60ce",
    "69f08f04ae5dc23c2041fa8ffeec796b4a104a53f59faf3a74e443d146058ba0",
    "30a2c7e24221e1aef2d28698bc25f4625fc745c6ad570e03a35a44356cc38305",
    "a405ab8c0a9cdaf8346ab3f4b0cffca07e6951610e7ad1953d20e5b463a9defa",
    "1752539eea6bad8e2b8e2fdbf02f741592448bdc9f7c690e54daa095d0eb3998",
    "fe487692b5f95ed8e9a018b8e76abce45d0bccc20b3c0a64627ec10394c250d7",
    "bf833f17955c1022c215868fbc5f387e85388be6fcf256f6da68550fa3dff6a9",
    "d8fcf3b9681e0c57cfe3efd9cc33e495667a9f50306a65e4b249dd6483b3021d",
    "7046078ff8e36cd85417edd670f1cd3b07a51145359c082e1a473e73120be428",
    "d69b3b838a224718bccc15d015967682f2f58c9c40e5b7351fb0cd0c2daa2ed3",
);

const PRIV_EXP_HEX: &str = concat!(
    "147bf85fbf51f05b541729cd73a277706d210f0fd462efd4952f52a2e20c79bf",
    "c84438d759d1cd2407a07ef8d0fe0ba247785a9e19de3916bc8dfce0ac86b0ed",
    "88a2d988ace1d447108e275d71e2cb80d61c73103eb5ccaec9833eca9a265a17",
    "2ee97576001cfef880430d7967ca2ec31782128811de038dbd9c043a4244341f",
    "b2a43684685962124e4bd34150b5813bdbb08acb6ff878237be6c4fdd5575bdd",
    "6b0a82a4103c18805bb75d133060622692a27d97ca8c73ac35ff7c705b8e9ac5",
    "74a911ff010ebd4c8fd9defbbf302ff62bf055a26b487ae5b5b6cde38bd0003d",
    "dabc18c24d7c80bdf5038216b62c870523afb168813d6fd563d68a56541031bc",
    "0de0a993e4783056dba19a035ef668970733544793c3b51b2e0e66a10220eb9b",
    "cf22d2ded8dbc089c0591247910bf1ad5fd1c6df418cc53ca8a6950c75007bbb",
    "babfbd23d2944ad6d3c0aa37a1c3a1277a158e23f4d8ef38b5b81f0f52a3fcd0",
    "c05c8f2a60db334b0ed92133978bba9d15c4bb2be85d5642f5fa57bb087a0951",
);

const MESSAGE_HEX: &str = concat!(
    "0dd78c2a42434cbca7c807a04d69a76eba41d01a9f63dc9d8e7b1403f7755e56",
    "fa2fcacf3589a42f2d24770eb3e1f964d8be3362fef4caa7161632c612f08774",
    "71c77c1137689db39ccc7aaaf8d244ed325209751c70ab2ef4e97abaceb836ac",
    "1615294479bdc2ac29f405a3ec78125b1e5827619a979b4bdbef0c16cdd25619",
    "3c59767d987cf07fccac770e360b2ea4582ae138acf898e31fd0cf040d66e866",
    "8c909da9f67721123d8a41903f8361c7474a425f4a8f87ffaebed39a2284fdf1",
    "70bd7ca95d236b3bcbf9f3041d6329158137756b2f9bf85964c5af6d9dee5f1c",
    "daf211e5ba0bcfb086371d5963210ed3855ecdae6a426bbf7acbf429a8a4d154",
    "ad4002f21f690d034563dd118cf99c9e9a9267b664d39d7de27553e9b94ed56a",
    "484b76a544c36d019cd13f2a30c9dc878be02b70a70193e582f0de6aa8558b79",
    "6927c9d657b19a7cb47a0a836dd98a5a95515adee88c6d3219843c83cb1000c3",
    "dd16f791afe057ab40b9082c00261a46efab645ede403b246e970028846d2ac3",
);

const CIPHERTEXT_HEX: &str = concat!(
    "1e898fc7bb0209beb0838ad27875a902e1f87fc8bff8124b26afddd388537ab4",
    "5877387faab8e959d720d24d70014ec403fc7ed9783f7af48a80e06b18847cf2",
    "90f026ca81e73e3dada707b5697576c9ce08e852b52e1fef29b1b02b99ecf37f",
    "33df06127fdbe19c6a50a541c3b302976e0aab8c909eaffe25d71a8f5bed6140",
    "8910699ecc514b1cebb4af285b4901f3f43b3162fedeff7674268d1b2ce0c10b",
    "4d11d954ea77f83540f033da24d2f2d000236963a907ed8939063968776f8929",
    "5b953383654a521aafc55fff5594c1588ded79954af21abd6d8d6f042a0f2be3",
    "efb9da6859d987a65239d564d2a8fa1c78770f5e804654e89a28ca13fa784eb2",
    "f5ed34f01021af0a4d7f395d42e1ba458a2c8f5af77a3e63a76b69d6e5a80418",
    "496ee49d5e05fc43bc67f3ea0dd41c0ad16c19942a5d0a87784421805935e57b",
    "5dc50f88348199ecb0cf4e087aba9e07f0b3ac3f57070493659c653f44aba82f",
    "42e94235e654d9d9086d4741cbb2055f1cdfb62e9ad6e97f1f2d884284d3419f",
);

type Rt = cryptoeng_runtime::Dispatcher<cryptoeng_emu_periph::EmuHal>;

fn stage(rt: &mut Rt, input_hex: &str) {
    put_hex(rt, MODULUS, MODULUS_HEX);
    put_hex(rt, PRIV_EXP, PRIV_EXP_HEX);
    put_hex(rt, INPUT, input_hex);
}

fn rsa(exponent: RsaExponent) -> Command {
    Command::Rsa(RsaParams {
        key_size: RsaKeySize::Rsa3072,
        modulus_addr: MODULUS,
        exponent,
        ext_addr: None,
        input_addr: INPUT,
        output_addr: OUTPUT,
    })
}

fn ram_is_zero(rt: &mut Rt) -> bool {
    hal(rt).rsa().ram().iter().all(|&w| w == 0)
}

#[test]
fn test_public_encrypt_private_decrypt() {
    let mut rt = run_rt_test();
    stage(&mut rt, MESSAGE_HEX);

    exec(&mut rt, OWNER_A, rsa(RsaExponent::Public(PUB_EXP)));
    assert_eq!(read_hex(&rt, OUTPUT, KEY_BYTES), CIPHERTEXT_HEX);

    put_hex(&mut rt, INPUT, CIPHERTEXT_HEX);
    exec(&mut rt, OWNER_B, rsa(RsaExponent::Private(PRIV_EXP)));
    assert_eq!(read_hex(&rt, OUTPUT, KEY_BYTES), MESSAGE_HEX);
    assert!(ram_is_zero(&mut rt));
    assert!(!rt.drivers().rsa.slot().is_busy());
}

#[test]
fn test_private_decrypt_failures_leave_ram_zero() {
    let mut rt = run_rt_test();
    stage(&mut rt, CIPHERTEXT_HEX);

    hal(&mut rt).rsa_mut().faults.error = true;
    assert_eq!(
        rt.dispatch(OWNER_A, &rsa(RsaExponent::Private(PRIV_EXP))),
        Err(CryptoError::RSA_HW_ERROR)
    );
    assert!(ram_is_zero(&mut rt));

    hal(&mut rt).rsa_mut().faults.error = false;
    hal(&mut rt).rsa_mut().faults.hang = true;
    assert_eq!(
        rt.dispatch(OWNER_A, &rsa(RsaExponent::Private(PRIV_EXP))),
        Err(CryptoError::RSA_TIMEOUT)
    );
    assert!(ram_is_zero(&mut rt));

    hal(&mut rt).rsa_mut().faults.hang = false;
    hal(&mut rt).rsa_mut().faults.stuck_ram_word = Some(40);
    assert_eq!(
        rt.dispatch(OWNER_A, &rsa(RsaExponent::Private(PRIV_EXP))),
        Err(CryptoError::RSA_RAM_ZEROIZE_FAILED)
    );

    hal(&mut rt).rsa_mut().faults.stuck_ram_word = None;
    exec(&mut rt, OWNER_A, rsa(RsaExponent::Private(PRIV_EXP)));
    assert_eq!(read_hex(&rt, OUTPUT, KEY_BYTES), MESSAGE_HEX);
    assert!(ram_is_zero(&mut rt));
}

#[test]
fn test_rsa_gated_by_self_test() {
    let mut rt = run_rt_test_no_kats();
    stage(&mut rt, MESSAGE_HEX);

    hal(&mut rt).clear_write_log();
    assert_eq!(
        rt.dispatch(OWNER_A, &rsa(RsaExponent::Public(PUB_EXP))),
        Err(CryptoError::RSA_KAT_NOT_EXECUTED)
    );
    assert_eq!(
        rt.dispatch(OWNER_A, &rsa(RsaExponent::Private(PRIV_EXP))),
        Err(CryptoError::RSA_KAT_NOT_EXECUTED)
    );
    assert_eq!(hal(&mut rt).writes_to(RSA_BASE).count(), 0);
    assert_eq!(rt.drivers().kat_status.bits(), Ok(KatId::empty()));
    assert!(!rt.drivers().rsa.slot().is_busy());
}

#[test]
fn test_input_not_below_modulus() {
    let mut rt = run_rt_test();
    stage(&mut rt, MODULUS_HEX);
    assert_eq!(
        rt.dispatch(OWNER_A, &rsa(RsaExponent::Public(PUB_EXP))),
        Err(CryptoError::RSA_INVALID_PARAM)
    );
}
