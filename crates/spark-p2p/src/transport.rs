use std::sync::Arc;

use crate::upgrader::Upgrader;

/// TCP 传输的选择标识。
pub const TCP_TRANSPORT_ID: &str = "tcp";
/// WebSocket 传输的选择标识。
pub const WS_TRANSPORT_ID: &str = "ws";

/// 统一的传输接口。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 在 TCP/WebSocket/QUIC 等实现之间共享统一签名，宿主按多地址挑选可拨号的传输；
/// - 配置层只关心“能否拨号”与“支持哪些协议”，建连与监听由实现方负责。
///
/// ## 契约说明（What）
/// - `protocols` 返回该传输处理的多地址协议名（如 `tcp`、`ws`）；
/// - `can_dial` 必须是纯函数，不得触发任何网络 I/O；
/// - `proxy` 表示是否为代理型传输（如中继），默认 `false`。
pub trait Transport: Send + Sync + 'static {
    /// 支持的多地址协议。
    fn protocols(&self) -> &[&'static str];

    /// 判断给定多地址是否可由该传输拨号。
    fn can_dial(&self, addr: &str) -> bool;

    /// 是否为代理型传输。
    fn proxy(&self) -> bool {
        false
    }
}

impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    fn protocols(&self) -> &[&'static str] {
        (**self).protocols()
    }

    fn can_dial(&self, addr: &str) -> bool {
        (**self).can_dial(addr)
    }

    fn proxy(&self) -> bool {
        (**self).proxy()
    }
}

fn segments(addr: &str) -> impl Iterator<Item = &str> {
    addr.split('/').filter(|segment| !segment.is_empty())
}

fn has_tcp_port(addr: &str) -> bool {
    let mut parts = segments(addr);
    while let Some(part) = parts.next() {
        if part == "tcp" {
            return parts.next().is_some_and(|port| port.parse::<u16>().is_ok());
        }
    }
    false
}

/// TCP 传输描述。
///
/// 持有升级器以便建连后直接完成握手；拨号前先检查升级器中的地址过滤规则。
#[derive(Clone, Debug)]
pub struct TcpTransport {
    upgrader: Upgrader,
}

impl TcpTransport {
    /// 以升级器构造。
    pub fn new(upgrader: Upgrader) -> Self {
        Self { upgrader }
    }

    /// 关联的升级器。
    pub fn upgrader(&self) -> &Upgrader {
        &self.upgrader
    }
}

impl Transport for TcpTransport {
    fn protocols(&self) -> &[&'static str] {
        &[TCP_TRANSPORT_ID]
    }

    fn can_dial(&self, addr: &str) -> bool {
        if self.upgrader.filters().is_denied(addr) {
            return false;
        }
        has_tcp_port(addr) && segments(addr).all(|part| part != WS_TRANSPORT_ID)
    }
}

/// WebSocket 传输描述，地址形如 `/ip4/1.2.3.4/tcp/80/ws`。
#[derive(Clone, Debug)]
pub struct WsTransport {
    upgrader: Upgrader,
}

impl WsTransport {
    /// 以升级器构造。
    pub fn new(upgrader: Upgrader) -> Self {
        Self { upgrader }
    }

    /// 关联的升级器。
    pub fn upgrader(&self) -> &Upgrader {
        &self.upgrader
    }
}

impl Transport for WsTransport {
    fn protocols(&self) -> &[&'static str] {
        &[WS_TRANSPORT_ID]
    }

    fn can_dial(&self, addr: &str) -> bool {
        if self.upgrader.filters().is_denied(addr) {
            return false;
        }
        has_tcp_port(addr) && segments(addr).last() == Some(WS_TRANSPORT_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        filters::AddressFilters, identity::PeerId, muxer::MplexMuxer, security::PlaintextSecurity,
    };

    fn upgrader(filters: AddressFilters) -> Upgrader {
        Upgrader::new(
            Arc::new(PlaintextSecurity::new(PeerId::new("local"))),
            Arc::new(MplexMuxer),
        )
        .with_filters(Arc::new(filters))
    }

    #[test]
    fn tcp_and_ws_split_addresses() {
        let tcp = TcpTransport::new(upgrader(AddressFilters::new()));
        let ws = WsTransport::new(upgrader(AddressFilters::new()));

        assert!(tcp.can_dial("/ip4/127.0.0.1/tcp/4001"));
        assert!(!tcp.can_dial("/ip4/127.0.0.1/tcp/4001/ws"));
        assert!(!tcp.can_dial("/ip4/127.0.0.1/udp/4001/quic"));
        assert!(!tcp.can_dial("/ip4/127.0.0.1/tcp/not-a-port"));

        assert!(ws.can_dial("/ip4/127.0.0.1/tcp/80/ws"));
        assert!(!ws.can_dial("/ip4/127.0.0.1/tcp/80"));
    }

    #[test]
    fn denied_addresses_are_not_dialable() {
        let mut filters = AddressFilters::new();
        filters.deny("/ip4/10.");
        let tcp = TcpTransport::new(upgrader(filters));
        assert!(!tcp.can_dial("/ip4/10.0.0.1/tcp/4001"));
        assert!(tcp.can_dial("/ip4/192.168.0.1/tcp/4001"));
    }
}
