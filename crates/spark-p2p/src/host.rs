use std::{fmt, sync::Arc};

use crate::{
    identity::{Keypair, PeerId},
    peerstore::{MemoryPeerstore, Peerstore},
};

/// 宿主网络视图契约。
///
/// 网络层负责连接与流的实际管理，配置层只读取本地身份与 Peerstore。
pub trait Network: Send + Sync + 'static {
    /// 本地节点标识。
    fn local_peer(&self) -> PeerId;

    /// 网络层使用的 Peerstore。
    fn peerstore(&self) -> Arc<dyn Peerstore>;
}

/// 运行中的点对点节点。
///
/// # 教案级注释
/// - **意图 (Why)**：传输/多路复用构造器需要的宿主上下文（身份、Peerstore、网络）均从该契约读取，
///   配置层不依赖任何具体宿主实现；
/// - **契约 (What)**：方法应为廉价的只读访问，多次调用返回语义一致的结果；
/// - **风险提示 (Trade-offs)**：返回 `Arc<dyn _>` 会产生一次引用计数递增，在装配期可忽略。
pub trait Host: Send + Sync + 'static {
    /// 本地节点标识。
    fn id(&self) -> PeerId;

    /// 节点记录存储。
    fn peerstore(&self) -> Arc<dyn Peerstore>;

    /// 网络视图。
    fn network(&self) -> Arc<dyn Network>;
}

/// 基于 [`MemoryPeerstore`] 的最小网络实现。
#[derive(Clone, Debug)]
pub struct BasicNetwork {
    local: PeerId,
    peerstore: MemoryPeerstore,
}

impl BasicNetwork {
    /// 以本地标识与共享 Peerstore 构造。
    pub fn new(local: PeerId, peerstore: MemoryPeerstore) -> Self {
        Self { local, peerstore }
    }
}

impl Network for BasicNetwork {
    fn local_peer(&self) -> PeerId {
        self.local.clone()
    }

    fn peerstore(&self) -> Arc<dyn Peerstore> {
        Arc::new(self.peerstore.clone())
    }
}

/// 内存宿主：持有本地密钥对、Peerstore 与网络视图。
///
/// # 教案式说明
/// - **意图（Why）**：嵌入方在尚未接入完整网络栈时，仍需要一个满足 [`Host`] 契约的宿主来驱动配置装配；
/// - **逻辑（How）**：`new` 将密钥对写入新建的 [`MemoryPeerstore`]，并让 [`BasicNetwork`] 共享同一张表；
/// - **契约（What）**：`id()` 恒等于密钥对派生的 [`PeerId`]，`peerstore()` 总能查到本地公私钥。
#[derive(Clone)]
pub struct BasicHost {
    id: PeerId,
    peerstore: MemoryPeerstore,
    network: Arc<BasicNetwork>,
}

impl BasicHost {
    /// 以本地密钥对构造宿主。
    pub fn new(keypair: &Keypair) -> Self {
        let peerstore = MemoryPeerstore::new();
        let id = peerstore.add_keypair(keypair);
        let network = Arc::new(BasicNetwork::new(id.clone(), peerstore.clone()));
        Self {
            id,
            peerstore,
            network,
        }
    }

    /// 以指定标识构造一个未登记任何密钥的宿主。
    ///
    /// 用于验证“密钥缺失”路径：Peerstore 中查不到本地公私钥。
    pub fn without_keys(id: PeerId) -> Self {
        let peerstore = MemoryPeerstore::new();
        let network = Arc::new(BasicNetwork::new(id.clone(), peerstore.clone()));
        Self {
            id,
            peerstore,
            network,
        }
    }

    /// 访问具体的内存 Peerstore，便于继续写入远端节点。
    pub fn memory_peerstore(&self) -> &MemoryPeerstore {
        &self.peerstore
    }
}

impl fmt::Debug for BasicHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicHost").field("id", &self.id).finish()
    }
}

impl Host for BasicHost {
    fn id(&self) -> PeerId {
        self.id.clone()
    }

    fn peerstore(&self) -> Arc<dyn Peerstore> {
        Arc::new(self.peerstore.clone())
    }

    fn network(&self) -> Arc<dyn Network> {
        self.network.clone()
    }
}
