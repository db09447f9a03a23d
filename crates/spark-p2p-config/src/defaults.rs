//! 内建组件目录与缺省集合。
//!
//! # 教案级注释
//! - **意图 (Why)**：调用方未配置任何传输或多路复用器时，宿主仍需可用的最小栈；
//!   配置文件按名称引用组件时，也需要一份“名称 -> 构造器”的目录；
//! - **逻辑 (How)**：目录中的条目与用户条目一样走 [`resolve`] 与工厂调用，
//!   因此默认传输在缺少升级器时同样报告 `RoleUnavailable(upgrader)`；
//! - **契约 (What)**：缺省顺序固定，传输为 `tcp`、`ws`，多路复用器为 yamux、mplex。

use std::{convert::Infallible, sync::Arc};

use spark_p2p::{
    MPLEX_PROTOCOL_ID, MplexMuxer, ProtocolId, StreamMuxer, TCP_TRANSPORT_ID, TcpTransport,
    Transport, Upgrader, WS_TRANSPORT_ID, WsTransport, YAMUX_PROTOCOL_ID, YamuxMuxer,
};

use crate::{
    capability::{Capability, MuxerCapability, TransportCapability},
    constructor::RawConstructor,
    error::ConfigError,
    resolver::resolve,
    role::BuildContext,
};

/// 缺省传输，按优先级排列。
pub const DEFAULT_TRANSPORTS: [&str; 2] = [TCP_TRANSPORT_ID, WS_TRANSPORT_ID];

/// 缺省多路复用器，按优先级排列。
pub const DEFAULT_MUXERS: [&str; 2] = [YAMUX_PROTOCOL_ID, MPLEX_PROTOCOL_ID];

/// 按名称查找内建传输构造器。
pub fn builtin_transport(id: &str) -> Option<RawConstructor> {
    match id {
        TCP_TRANSPORT_ID => Some(RawConstructor::transport_fn(|upgrader: Upgrader| {
            Ok::<_, Infallible>(TcpTransport::new(upgrader))
        })),
        WS_TRANSPORT_ID => Some(RawConstructor::transport_fn(|upgrader: Upgrader| {
            Ok::<_, Infallible>(WsTransport::new(upgrader))
        })),
        _ => None,
    }
}

/// 按协议 ID 查找内建多路复用构造器。
pub fn builtin_muxer(id: &str) -> Option<RawConstructor> {
    match id {
        YAMUX_PROTOCOL_ID => Some(RawConstructor::muxer_fn(|| {
            Ok::<_, Infallible>(YamuxMuxer::default())
        })),
        MPLEX_PROTOCOL_ID => Some(RawConstructor::muxer_fn(|| Ok::<_, Infallible>(MplexMuxer))),
        _ => None,
    }
}

pub(crate) fn default_transports(
    ctx: &BuildContext<'_>,
) -> Result<Vec<(ProtocolId, Arc<dyn Transport>)>, ConfigError> {
    instantiate::<TransportCapability>(&DEFAULT_TRANSPORTS, builtin_transport, ctx)
}

pub(crate) fn default_muxers(
    ctx: &BuildContext<'_>,
) -> Result<Vec<(ProtocolId, Arc<dyn StreamMuxer>)>, ConfigError> {
    instantiate::<MuxerCapability>(&DEFAULT_MUXERS, builtin_muxer, ctx)
}

fn instantiate<C: Capability>(
    ids: &[&'static str],
    catalog: fn(&str) -> Option<RawConstructor>,
    ctx: &BuildContext<'_>,
) -> Result<Vec<(ProtocolId, Arc<C::Instance>)>, ConfigError> {
    ids.iter()
        .map(|&id| {
            let raw = catalog(id).ok_or_else(|| ConfigError::UnknownIdentifier {
                capability: C::KIND,
                id: id.to_owned(),
            })?;
            let instance = resolve::<C>(raw)?.invoke(ctx)?;
            Ok((ProtocolId::from_static(id), instance))
        })
        .collect()
}
