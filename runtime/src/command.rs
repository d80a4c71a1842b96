// Licensed under the Apache-2.0 license

use cryptoeng_drivers::{
    Addr, AesDataParams, AesKeySize, AesKeySrc, AesOpParams, Curve, EcdsaSignParams,
    EcdsaVerifyParams, KatId, KekDecryptParams, KeyClearTarget, RsaParams, ShaKind, ShaMode,
};

/// Wire identifier of a command, four ASCII characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandId(pub u32);

impl CommandId {
    pub const AES_INIT: Self = Self(0x4145_5349); // "AESI"
    pub const AES_OP_INIT: Self = Self(0x4145_534F); // "AESO"
    pub const AES_GMAC_CFG: Self = Self(0x4145_5347); // "AESG"
    pub const AES_UPDATE_AAD: Self = Self(0x4145_5341); // "AESA"
    pub const AES_UPDATE: Self = Self(0x4145_5355); // "AESU"
    pub const AES_FINAL: Self = Self(0x4145_5346); // "AESF"
    pub const AES_ENCRYPT_DATA: Self = Self(0x4145_5345); // "AESE"
    pub const AES_DECRYPT_DATA: Self = Self(0x4145_5344); // "AESD"
    pub const AES_WRITE_KEY: Self = Self(0x4145_534B); // "AESK"
    pub const AES_KEY_ZERO: Self = Self(0x4145_535A); // "AESZ"
    pub const AES_KEK_DECRYPT: Self = Self(0x4145_5352); // "AESR"
    pub const AES_DPA_CM: Self = Self(0x4145_5350); // "AESP"
    pub const AES_KUP_CFG: Self = Self(0x4145_5343); // "AESC"
    pub const SHA_INIT: Self = Self(0x5348_4149); // "SHAI"
    pub const SHA_START: Self = Self(0x5348_4153); // "SHAS"
    pub const SHA_UPDATE: Self = Self(0x5348_4155); // "SHAU"
    pub const SHA_LAST_UPDATE: Self = Self(0x5348_414C); // "SHAL"
    pub const SHA_FINISH: Self = Self(0x5348_4146); // "SHAF"
    pub const SHA_DIGEST: Self = Self(0x5348_4144); // "SHAD"
    pub const RSA_OPERATION: Self = Self(0x5253_414F); // "RSAO"
    pub const ECDSA_GENERATE_KEY: Self = Self(0x4543_4447); // "ECDG"
    pub const ECDSA_SIGN: Self = Self(0x4543_4453); // "ECDS"
    pub const ECDSA_VERIFY: Self = Self(0x4543_4456); // "ECDV"
    pub const ECDSA_VALIDATE_KEY: Self = Self(0x4543_444B); // "ECDK"
    pub const KAT_RUN: Self = Self(0x4B41_5452); // "KATR"
    pub const KAT_RUN_ALL: Self = Self(0x4B41_5441); // "KATA"
    pub const KAT_STATUS: Self = Self(0x4B41_5453); // "KATS"
}

impl From<u32> for CommandId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<CommandId> for u32 {
    fn from(value: CommandId) -> Self {
        value.0
    }
}

/// AES-GCM requests
#[derive(Debug, Clone, Copy)]
pub enum AesReq {
    Init,
    OperationInit(AesOpParams),
    GmacCfg {
        enable: bool,
    },
    UpdateAad {
        aad_addr: Addr,
        size: u32,
    },
    Update {
        in_addr: Addr,
        out_addr: Addr,
        size: u32,
        is_last: bool,
    },
    Final {
        tag_addr: Addr,
    },
    EncryptData(AesDataParams),
    DecryptData(AesDataParams),
    WriteKey {
        key_src: AesKeySrc,
        key_size: AesKeySize,
        key_addr: Addr,
    },
    KeyZero(KeyClearTarget),
    KekDecrypt(KekDecryptParams),
    SetDpaCm {
        enable: bool,
    },
    CfgKupKeyNIv {
        enable: bool,
    },
}

/// SHA2 and SHA3 requests. `kind` selects the engine.
#[derive(Debug, Clone, Copy)]
pub enum ShaReq {
    Init {
        kind: ShaKind,
    },
    Start {
        mode: ShaMode,
    },
    Update {
        kind: ShaKind,
        addr: Addr,
        size: u32,
    },
    LastUpdate {
        kind: ShaKind,
    },
    Finish {
        kind: ShaKind,
        out_addr: Addr,
    },
    Digest {
        mode: ShaMode,
        addr: Addr,
        size: u32,
        out_addr: Addr,
    },
}

/// ECDSA requests
#[derive(Debug, Clone, Copy)]
pub enum EcdsaReq {
    GenerateKey {
        curve: Curve,
        key_addr: Addr,
        pub_key_addr: Addr,
    },
    Sign(EcdsaSignParams),
    Verify(EcdsaVerifyParams),
    ValidateKey {
        curve: Curve,
        pub_key_addr: Addr,
    },
}

/// Self test requests
#[derive(Debug, Clone, Copy)]
pub enum KatReq {
    /// Run the tests covering the raw `KatId` bits
    Run { ids: u32 },
    RunAll,
    Status,
}

/// A decoded request
#[derive(Debug, Clone, Copy)]
pub enum Command {
    Aes(AesReq),
    Sha(ShaReq),
    Rsa(RsaParams),
    Ecdsa(EcdsaReq),
    Kat(KatReq),
}

impl Command {
    pub fn id(&self) -> CommandId {
        match self {
            Command::Aes(req) => match req {
                AesReq::Init => CommandId::AES_INIT,
                AesReq::OperationInit(_) => CommandId::AES_OP_INIT,
                AesReq::GmacCfg { .. } => CommandId::AES_GMAC_CFG,
                AesReq::UpdateAad { .. } => CommandId::AES_UPDATE_AAD,
                AesReq::Update { .. } => CommandId::AES_UPDATE,
                AesReq::Final { .. } => CommandId::AES_FINAL,
                AesReq::EncryptData(_) => CommandId::AES_ENCRYPT_DATA,
                AesReq::DecryptData(_) => CommandId::AES_DECRYPT_DATA,
                AesReq::WriteKey { .. } => CommandId::AES_WRITE_KEY,
                AesReq::KeyZero(_) => CommandId::AES_KEY_ZERO,
                AesReq::KekDecrypt(_) => CommandId::AES_KEK_DECRYPT,
                AesReq::SetDpaCm { .. } => CommandId::AES_DPA_CM,
                AesReq::CfgKupKeyNIv { .. } => CommandId::AES_KUP_CFG,
            },
            Command::Sha(req) => match req {
                ShaReq::Init { .. } => CommandId::SHA_INIT,
                ShaReq::Start { .. } => CommandId::SHA_START,
                ShaReq::Update { .. } => CommandId::SHA_UPDATE,
                ShaReq::LastUpdate { .. } => CommandId::SHA_LAST_UPDATE,
                ShaReq::Finish { .. } => CommandId::SHA_FINISH,
                ShaReq::Digest { .. } => CommandId::SHA_DIGEST,
            },
            Command::Rsa(_) => CommandId::RSA_OPERATION,
            Command::Ecdsa(req) => match req {
                EcdsaReq::GenerateKey { .. } => CommandId::ECDSA_GENERATE_KEY,
                EcdsaReq::Sign(_) => CommandId::ECDSA_SIGN,
                EcdsaReq::Verify(_) => CommandId::ECDSA_VERIFY,
                EcdsaReq::ValidateKey { .. } => CommandId::ECDSA_VALIDATE_KEY,
            },
            Command::Kat(req) => match req {
                KatReq::Run { .. } => CommandId::KAT_RUN,
                KatReq::RunAll => CommandId::KAT_RUN_ALL,
                KatReq::Status => CommandId::KAT_STATUS,
            },
        }
    }
}

/// Result of a successful command. Bulk output has already been written to
/// the addresses named in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Done,

    /// Bytes of digest written
    Digest { len: usize },

    /// Self test status after the command
    KatStatus(KatId),
}
