use std::{fmt, sync::Arc};

use crate::{
    filters::AddressFilters,
    muxer::StreamMuxer,
    security::{Protector, SecureTransport},
};

/// 连接升级器：为原始连接叠加安全层与多路复用层。
///
/// # 教案级注释
/// - **意图 (Why)**：传输实现只负责建立原始字节流，随后交由升级器完成握手与复用协商；
///   升级器因此也是传输构造器最常声明的依赖；
/// - **体系位置 (Where)**：由宿主装配流程在多路复用集合构建完成后创建，再注入到每个传输构造器；
/// - **契约 (What)**：所有字段均为共享引用，`clone` 只增加引用计数；`protector` 为 `None`
///   表示公共网络。
#[derive(Clone)]
pub struct Upgrader {
    secure: Arc<dyn SecureTransport>,
    muxer: Arc<dyn StreamMuxer>,
    protector: Option<Arc<dyn Protector>>,
    filters: Arc<AddressFilters>,
}

impl Upgrader {
    /// 以安全传输与复用器构造，过滤规则为空、无私有网络保护。
    pub fn new(secure: Arc<dyn SecureTransport>, muxer: Arc<dyn StreamMuxer>) -> Self {
        Self {
            secure,
            muxer,
            protector: None,
            filters: Arc::new(AddressFilters::new()),
        }
    }

    /// 设置私有网络保护器。
    pub fn with_protector(mut self, protector: Option<Arc<dyn Protector>>) -> Self {
        self.protector = protector;
        self
    }

    /// 设置地址过滤规则。
    pub fn with_filters(mut self, filters: Arc<AddressFilters>) -> Self {
        self.filters = filters;
        self
    }

    /// 安全传输。
    pub fn secure(&self) -> &Arc<dyn SecureTransport> {
        &self.secure
    }

    /// 多路复用器。
    pub fn muxer(&self) -> &Arc<dyn StreamMuxer> {
        &self.muxer
    }

    /// 私有网络保护器。
    pub fn protector(&self) -> Option<&Arc<dyn Protector>> {
        self.protector.as_ref()
    }

    /// 地址过滤规则。
    pub fn filters(&self) -> &Arc<AddressFilters> {
        &self.filters
    }
}

impl fmt::Debug for Upgrader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upgrader")
            .field("secure", &self.secure.protocol_id())
            .field("muxer", &self.muxer.name())
            .field("private_network", &self.protector.is_some())
            .field("filters", &self.filters.denied())
            .finish()
    }
}
