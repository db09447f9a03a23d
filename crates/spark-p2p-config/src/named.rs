//! 带协议标识的工厂。

use std::fmt;

use spark_p2p::ProtocolId;

use crate::{
    capability::Capability,
    constructor::RawConstructor,
    error::ConfigError,
    resolver::{ResolvedFactory, resolve},
};

/// `(标识, 工厂)` 对，聚合器的输入单元。
///
/// 标识在同一聚合内必须唯一；对多路复用器而言它就是协商时使用的协议 ID。
pub struct NamedFactory<C: Capability> {
    id: ProtocolId,
    factory: ResolvedFactory<C>,
}

impl<C: Capability> NamedFactory<C> {
    pub fn new(id: impl Into<ProtocolId>, factory: ResolvedFactory<C>) -> Self {
        Self {
            id: id.into(),
            factory,
        }
    }

    /// 解析原始构造器并绑定标识。
    pub fn resolve(id: impl Into<ProtocolId>, raw: RawConstructor) -> Result<Self, ConfigError> {
        Ok(Self::new(id, resolve::<C>(raw)?))
    }

    pub fn id(&self) -> &ProtocolId {
        &self.id
    }

    pub fn factory(&self) -> &ResolvedFactory<C> {
        &self.factory
    }
}

impl<C: Capability> Clone for NamedFactory<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            factory: self.factory.clone(),
        }
    }
}

impl<C: Capability> fmt::Debug for NamedFactory<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedFactory")
            .field("id", &self.id)
            .field("factory", &self.factory)
            .finish()
    }
}
