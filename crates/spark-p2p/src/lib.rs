#![deny(unsafe_code)]
#![doc = "spark-p2p: 点对点宿主的外部协作方契约。"]
#![doc = ""]
#![doc = "== 使命概述 =="]
#![doc = "- **Why**：配置层需要向传输/多路复用构造器注入宿主上下文，但不应依赖任何具体的宿主、网络或 Peerstore 实现。"]
#![doc = "- **What**：定义 `Host`、`Network`、`Peerstore`、`Transport`、`StreamMuxer`、`SecureTransport` 等契约，以及连接升级器 `Upgrader`。"]
#![doc = "- **How**：同时提供内存实现（`BasicHost`、`MemoryPeerstore`、`PlaintextSecurity`）与内建默认传输/复用器描述，供装配层兜底与测试使用。"]

pub mod filters;
pub mod host;
pub mod identity;
pub mod muxer;
pub mod peerstore;
pub mod protocol;
pub mod security;
pub mod transport;
pub mod upgrader;

pub use filters::AddressFilters;
pub use host::{BasicHost, BasicNetwork, Host, Network};
pub use identity::{KeyType, Keypair, PeerId, PrivateKey, PublicKey};
pub use muxer::{MPLEX_PROTOCOL_ID, MplexMuxer, StreamMuxer, YAMUX_PROTOCOL_ID, YamuxMuxer};
pub use peerstore::{MemoryPeerstore, Peerstore};
pub use protocol::ProtocolId;
pub use security::{PlaintextSecurity, Protector, PskProtector, SecureTransport};
pub use transport::{TCP_TRANSPORT_ID, TcpTransport, Transport, WS_TRANSPORT_ID, WsTransport};
pub use upgrader::Upgrader;
