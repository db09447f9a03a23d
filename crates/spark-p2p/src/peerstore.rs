use std::sync::Arc;

use dashmap::DashMap;

use crate::identity::{Keypair, PeerId, PrivateKey, PublicKey};

/// 节点记录存储契约。
///
/// # 教案级注释
/// - **意图 (Why)**：传输构造器经常需要读取本地节点的密钥（例如握手签名），配置层只通过该契约读取，
///   不关心底层是内存表还是持久化存储；
/// - **契约 (What)**：所有方法均为只读查询，未命中返回 `None`；实现需满足 `Send + Sync`，以便在
///   宿主各组件间以 `Arc<dyn Peerstore>` 共享。
pub trait Peerstore: Send + Sync + 'static {
    /// 查询节点公钥。
    fn public_key(&self, peer: &PeerId) -> Option<PublicKey>;

    /// 查询节点私钥，通常只有本地节点存在私钥。
    fn private_key(&self, peer: &PeerId) -> Option<PrivateKey>;

    /// 返回已知节点列表。
    fn peers(&self) -> Vec<PeerId>;
}

#[derive(Clone, Debug)]
struct KeyRecord {
    public: PublicKey,
    private: Option<PrivateKey>,
}

/// `MemoryPeerstore` 以内存并发表保存节点密钥。
///
/// # 教案式解读
/// - **实现策略（How）**：内部持有 `Arc<DashMap<PeerId, KeyRecord>>`，读多写少，克隆后的句柄共享同一张表；
/// - **后置条件**：`add_keypair` 与 `add_public_key` 会覆盖同一节点的旧记录并返回旧公钥，
///   便于上层感知密钥轮换；
/// - **风险提示**：未实现地址簿与 TTL，若需要地址过期策略应在宿主层扩展。
#[derive(Clone, Debug, Default)]
pub struct MemoryPeerstore {
    inner: Arc<DashMap<PeerId, KeyRecord>>,
}

impl MemoryPeerstore {
    /// 构造空表。
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入本地节点的完整密钥对，返回其派生的节点标识。
    pub fn add_keypair(&self, keypair: &Keypair) -> PeerId {
        let peer = keypair.peer_id();
        self.inner.insert(
            peer.clone(),
            KeyRecord {
                public: keypair.public().clone(),
                private: Some(keypair.private().clone()),
            },
        );
        peer
    }

    /// 写入远端节点的公钥。
    pub fn add_public_key(&self, peer: PeerId, key: PublicKey) -> Option<PublicKey> {
        self.inner
            .insert(
                peer,
                KeyRecord {
                    public: key,
                    private: None,
                },
            )
            .map(|previous| previous.public)
    }
}

impl Peerstore for MemoryPeerstore {
    fn public_key(&self, peer: &PeerId) -> Option<PublicKey> {
        self.inner.get(peer).map(|entry| entry.value().public.clone())
    }

    fn private_key(&self, peer: &PeerId) -> Option<PrivateKey> {
        self.inner
            .get(peer)
            .and_then(|entry| entry.value().private.clone())
    }

    fn peers(&self) -> Vec<PeerId> {
        self.inner.iter().map(|entry| entry.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::KeyType;

    fn keypair(seed: u8) -> Keypair {
        Keypair::new(
            PublicKey::new(KeyType::Ed25519, vec![seed; 32]),
            PrivateKey::new(KeyType::Ed25519, vec![seed.wrapping_add(1); 64]),
        )
    }

    #[test]
    fn local_keypair_exposes_both_keys() {
        let store = MemoryPeerstore::new();
        let pair = keypair(3);
        let peer = store.add_keypair(&pair);
        assert_eq!(store.public_key(&peer).as_ref(), Some(pair.public()));
        assert_eq!(store.private_key(&peer).as_ref(), Some(pair.private()));
    }

    #[test]
    fn remote_peer_has_no_private_key() {
        let store = MemoryPeerstore::new();
        let remote = keypair(9);
        let peer = remote.peer_id();
        assert!(store.add_public_key(peer.clone(), remote.public().clone()).is_none());
        assert!(store.private_key(&peer).is_none());
        assert_eq!(store.peers(), vec![peer]);
    }
}
