use std::fmt;

use sha2::{Digest, Sha256};

use crate::identity::PeerId;

/// 安全传输契约：负责在原始连接上完成握手与加密。
///
/// 握手本身由升级层执行，配置层只需要协议标识与本地身份。
pub trait SecureTransport: Send + Sync + 'static {
    /// 协商时使用的协议标识。
    fn protocol_id(&self) -> &str;

    /// 握手时声明的本地节点。
    fn local_peer(&self) -> PeerId;
}

/// 私有网络保护器：仅允许持有相同预共享密钥的节点互联。
pub trait Protector: Send + Sync + 'static {
    /// 预共享密钥指纹，用于日志与诊断，不暴露密钥本身。
    fn fingerprint(&self) -> &[u8];
}

/// 明文“安全”传输，只交换身份不加密。
///
/// # 风险提示
/// - 仅适用于测试或受信网络；生产环境应替换为真正的加密握手实现。
#[derive(Clone, Debug)]
pub struct PlaintextSecurity {
    local: PeerId,
}

impl PlaintextSecurity {
    /// 协议标识。
    pub const PROTOCOL_ID: &'static str = "/plaintext/2.0.0";

    /// 以本地节点构造。
    pub fn new(local: PeerId) -> Self {
        Self { local }
    }
}

impl SecureTransport for PlaintextSecurity {
    fn protocol_id(&self) -> &str {
        Self::PROTOCOL_ID
    }

    fn local_peer(&self) -> PeerId {
        self.local.clone()
    }
}

/// 基于预共享密钥的保护器。
///
/// 只保留 SHA-256 指纹，原始密钥在构造后即被丢弃。
#[derive(Clone)]
pub struct PskProtector {
    fingerprint: [u8; 32],
}

impl PskProtector {
    /// 由预共享密钥构造。
    pub fn new(psk: &[u8]) -> Self {
        let digest = Sha256::digest(psk);
        let mut fingerprint = [0_u8; 32];
        fingerprint.copy_from_slice(&digest);
        Self { fingerprint }
    }
}

impl Protector for PskProtector {
    fn fingerprint(&self) -> &[u8] {
        &self.fingerprint
    }
}

impl fmt::Debug for PskProtector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PskProtector")
            .field("fingerprint", &hex::encode(self.fingerprint))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protectors_with_same_key_share_fingerprint() {
        let a = PskProtector::new(b"swarm-key");
        let b = PskProtector::new(b"swarm-key");
        let c = PskProtector::new(b"other-key");
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
