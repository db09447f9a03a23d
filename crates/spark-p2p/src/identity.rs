use std::{fmt, sync::Arc};

use sha2::{Digest, Sha256};

/// 密钥算法标识。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum KeyType {
    /// Ed25519 签名密钥。
    Ed25519,
    /// secp256k1 签名密钥。
    Secp256k1,
    /// RSA 密钥。
    Rsa,
}

impl KeyType {
    fn label(self) -> &'static str {
        match self {
            KeyType::Ed25519 => "ed25519",
            KeyType::Secp256k1 => "secp256k1",
            KeyType::Rsa => "rsa",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 节点公钥。
///
/// # 教案级注释
/// - **意图 (Why)**：作为身份派生与握手校验的输入，公钥需要在多个组件之间廉价克隆；
/// - **契约 (What)**：内部字节以 `Arc<[u8]>` 保存，克隆仅增加引用计数；本类型不做任何密码学校验，
///   字节合法性由生成方负责。
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    key_type: KeyType,
    bytes: Arc<[u8]>,
}

impl PublicKey {
    /// 以算法与编码后的公钥字节构造。
    pub fn new(key_type: KeyType, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            key_type,
            bytes: bytes.into(),
        }
    }

    /// 密钥算法。
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// 编码后的公钥字节。
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("key_type", &self.key_type)
            .field("bytes", &hex::encode(&self.bytes))
            .finish()
    }
}

/// 节点私钥。
///
/// `Debug` 输出只包含算法与长度，避免密钥材料进入日志。
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    key_type: KeyType,
    bytes: Arc<[u8]>,
}

impl PrivateKey {
    /// 以算法与编码后的私钥字节构造。
    pub fn new(key_type: KeyType, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            key_type,
            bytes: bytes.into(),
        }
    }

    /// 密钥算法。
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// 编码后的私钥字节。
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("key_type", &self.key_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// 节点的密钥对。
#[derive(Clone, Debug)]
pub struct Keypair {
    public: PublicKey,
    private: PrivateKey,
}

impl Keypair {
    /// 组合已有的公私钥。
    ///
    /// - **前置条件**：两把密钥属于同一算法且互相匹配，本类型不做校验。
    pub fn new(public: PublicKey, private: PrivateKey) -> Self {
        Self { public, private }
    }

    /// 公钥。
    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    /// 私钥。
    pub fn private(&self) -> &PrivateKey {
        &self.private
    }

    /// 从公钥派生的节点标识。
    pub fn peer_id(&self) -> PeerId {
        PeerId::from_public_key(&self.public)
    }
}

/// 节点标识。
///
/// # 教案级注释
/// - **意图 (Why)**：节点标识在 Peerstore 键、日志字段与握手校验中被频繁复制，使用 `Arc<str>` 保证克隆廉价；
/// - **逻辑 (How)**：[`PeerId::from_public_key`] 对 `算法标签 || 公钥字节` 做 SHA-256 并以十六进制编码，
///   相同公钥总是得到相同标识；
/// - **契约 (What)**：[`PeerId::new`] 接受任意外部生成的字符串标识，不做格式校验，便于对接既有节点。
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(Arc<str>);

impl PeerId {
    /// 使用外部给定的字符串标识构造。
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// 由公钥派生节点标识。
    pub fn from_public_key(key: &PublicKey) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(key.key_type().label().as_bytes());
        hasher.update(key.as_bytes());
        Self(Arc::from(hex::encode(hasher.finalize())))
    }

    /// 字符串视图。
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PeerId").field(&&*self.0).finish()
    }
}
