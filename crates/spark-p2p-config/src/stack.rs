//! 栈配置：宿主侧持有传输与多路复用器条目，并在启动时一次性装配。
//!
//! # 教案级注释
//! - **意图 (Why)**：宿主选项以增量方式登记传输、多路复用器、私有网络保护与地址过滤规则；
//!   登记时立即解析构造器，使声明错误在选项阶段暴露，而不是拖到启动；
//! - **逻辑 (How)**：`assemble` 依次执行
//!   1. 以宿主上下文构建多路复用集合；
//!   2. 以安全传输、多路复用集合、保护器、过滤规则构建升级器；
//!   3. 以“宿主 + 升级器”上下文构建传输集合；
//! - **契约 (What)**：`assemble` 要么返回完整的 [`Stack`]，要么返回首个错误；
//!   同一份配置可多次装配，每次都会重新调用构造器。

use std::{fmt, sync::Arc};

use spark_p2p::{
    AddressFilters, Host, ProtocolId, Protector, SecureTransport, StreamMuxer, Transport, Upgrader,
};
use tracing::info;

use crate::{
    aggregate::AggregateSet,
    capability::{CapabilityKind, MuxerCapability, TransportCapability},
    constructor::RawConstructor,
    defaults::{builtin_muxer, builtin_transport},
    error::ConfigError,
    named::NamedFactory,
    role::BuildContext,
    settings::StackSettings,
};

/// 传输与多路复用器的装配配置。
#[derive(Clone, Default)]
pub struct StackConfig {
    transports: Vec<NamedFactory<TransportCapability>>,
    muxers: Vec<NamedFactory<MuxerCapability>>,
    protector: Option<Arc<dyn Protector>>,
    filters: AddressFilters,
}

impl StackConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个传输条目，构造器在此处完成解析。
    pub fn transport(
        &mut self,
        id: impl Into<ProtocolId>,
        raw: RawConstructor,
    ) -> Result<&mut Self, ConfigError> {
        self.transports.push(NamedFactory::resolve(id, raw)?);
        Ok(self)
    }

    /// 登记一个多路复用条目，标识即协商使用的协议 ID。
    pub fn muxer(
        &mut self,
        id: impl Into<ProtocolId>,
        raw: RawConstructor,
    ) -> Result<&mut Self, ConfigError> {
        self.muxers.push(NamedFactory::resolve(id, raw)?);
        Ok(self)
    }

    /// 启用私有网络保护。
    pub fn protector(&mut self, protector: Arc<dyn Protector>) -> &mut Self {
        self.protector = Some(protector);
        self
    }

    /// 替换地址过滤规则。
    pub fn filters(&mut self, filters: AddressFilters) -> &mut Self {
        self.filters = filters;
        self
    }

    /// 追加一条地址拒绝规则。
    pub fn deny_address(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.filters.deny(prefix);
        self
    }

    /// 按名称引用内建目录中的组件。
    ///
    /// # 契约说明（What）
    /// - 名称按出现顺序追加在已登记条目之后；
    /// - 未知名称返回 [`ConfigError::UnknownIdentifier`]，此时配置保持调用前的状态。
    pub fn apply_settings(&mut self, settings: &StackSettings) -> Result<&mut Self, ConfigError> {
        let transports: Vec<NamedFactory<TransportCapability>> = settings
            .transports
            .iter()
            .map(|id| {
                let raw = builtin_transport(id).ok_or_else(|| unknown(CapabilityKind::Transport, id))?;
                NamedFactory::resolve(id.clone(), raw)
            })
            .collect::<Result<_, ConfigError>>()?;
        let muxers: Vec<NamedFactory<MuxerCapability>> = settings
            .muxers
            .iter()
            .map(|id| {
                let raw = builtin_muxer(id).ok_or_else(|| unknown(CapabilityKind::Muxer, id))?;
                NamedFactory::resolve(id.clone(), raw)
            })
            .collect::<Result<_, ConfigError>>()?;

        self.transports.extend(transports);
        self.muxers.extend(muxers);
        for prefix in &settings.deny_addresses {
            self.filters.deny(prefix.as_str());
        }
        Ok(self)
    }

    /// 已登记的传输条目。
    pub fn transports(&self) -> &[NamedFactory<TransportCapability>] {
        &self.transports
    }

    /// 已登记的多路复用条目。
    pub fn muxers(&self) -> &[NamedFactory<MuxerCapability>] {
        &self.muxers
    }

    /// 装配完整的传输栈。
    pub fn assemble(
        &self,
        host: Arc<dyn Host>,
        secure: Arc<dyn SecureTransport>,
    ) -> Result<Stack, ConfigError> {
        let ctx = BuildContext::new(&host);
        let muxers = Arc::new(AggregateSet::<MuxerCapability>::build(&self.muxers, &ctx)?);

        let upgrader = Upgrader::new(secure, Arc::clone(&muxers) as Arc<dyn StreamMuxer>)
            .with_protector(self.protector.clone())
            .with_filters(Arc::new(self.filters.clone()));

        let transports = AggregateSet::<TransportCapability>::build(
            &self.transports,
            &ctx.with_upgrader(&upgrader),
        )?;

        info!(
            host = %host.id(),
            transports = transports.len(),
            muxers = muxers.len(),
            private = upgrader.protector().is_some(),
            "stack assembled"
        );
        Ok(Stack {
            host,
            muxers,
            upgrader,
            transports,
        })
    }
}

fn unknown(capability: CapabilityKind, id: &str) -> ConfigError {
    ConfigError::UnknownIdentifier {
        capability,
        id: id.to_owned(),
    }
}

impl fmt::Debug for StackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackConfig")
            .field("transports", &self.transports.iter().map(NamedFactory::id).collect::<Vec<_>>())
            .field("muxers", &self.muxers.iter().map(NamedFactory::id).collect::<Vec<_>>())
            .field("private", &self.protector.is_some())
            .field("filters", &self.filters)
            .finish()
    }
}

/// 装配完成的传输栈，构建后不可变。
pub struct Stack {
    host: Arc<dyn Host>,
    muxers: Arc<AggregateSet<MuxerCapability>>,
    upgrader: Upgrader,
    transports: AggregateSet<TransportCapability>,
}

impl Stack {
    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    pub fn muxers(&self) -> &Arc<AggregateSet<MuxerCapability>> {
        &self.muxers
    }

    pub fn upgrader(&self) -> &Upgrader {
        &self.upgrader
    }

    pub fn transports(&self) -> &AggregateSet<TransportCapability> {
        &self.transports
    }

    /// 按优先级选出第一个可拨号该地址的传输。
    pub fn transport_for(&self, addr: &str) -> Option<(&ProtocolId, &Arc<dyn Transport>)> {
        self.transports
            .iter()
            .find(|(_, transport)| transport.can_dial(addr))
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("host", &self.host.id())
            .field("muxers", &self.muxers)
            .field("upgrader", &self.upgrader)
            .field("transports", &self.transports)
            .finish()
    }
}
