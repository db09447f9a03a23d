//! 能力标记：传输与多路复用两类可配置组件。
//!
//! # 教案级注释
//! - **意图 (Why)**：解析器、命名工厂与聚合器对两类组件的处理完全相同，
//!   差异只在“合法角色表”“实例类型”“默认集合”三处；以零尺寸标记类型承载这些差异，
//!   其余代码只写一次泛型实现；
//! - **契约 (What)**：[`Capability`] 被 sealed，只由 [`TransportCapability`] 与
//!   [`MuxerCapability`] 实现。

use std::{fmt, sync::Arc};

use spark_p2p::{ProtocolId, StreamMuxer, Transport};

use crate::{
    constructor::RawConstructor,
    defaults,
    error::ConfigError,
    role::{BuildContext, MUXER_ROLES, RoleRegistry, TRANSPORT_ROLES},
    sealed::Sealed,
};

/// 能力种类，用于日志与错误信息。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    Transport,
    Muxer,
}

impl CapabilityKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            CapabilityKind::Transport => "transport",
            CapabilityKind::Muxer => "muxer",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 对象层构造器的产出。
#[derive(Clone)]
pub enum Built {
    Transport(Arc<dyn Transport>),
    Muxer(Arc<dyn StreamMuxer>),
}

impl Built {
    /// 产出所属的能力种类。
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Built::Transport(_) => CapabilityKind::Transport,
            Built::Muxer(_) => CapabilityKind::Muxer,
        }
    }
}

impl fmt::Debug for Built {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Built::Transport(transport) => f
                .debug_tuple("Transport")
                .field(&transport.protocols())
                .finish(),
            Built::Muxer(muxer) => f.debug_tuple("Muxer").field(&muxer.name()).finish(),
        }
    }
}

/// 可配置组件的能力描述。
///
/// # 教案级注释
/// - **逻辑 (How)**：
///   - `roles` 给出构造器可声明的合法角色；
///   - `prebuilt` 识别调用方直接提供的现成实例；
///   - `from_built` 把对象层产出收窄为本能力的实例，种类不符时原样退回；
///   - `defaults` 在调用方未配置任何条目时给出内建集合，顺序即优先级。
/// - **契约 (What)**：实现者为零尺寸类型，不持有状态。
pub trait Capability: Sealed + Send + Sync + 'static {
    /// 组件实例类型。
    type Instance: ?Sized + Send + Sync + 'static;

    /// 能力种类。
    const KIND: CapabilityKind;

    /// 合法角色表。
    fn roles() -> &'static RoleRegistry;

    /// 若原始构造器是本能力的现成实例，返回该实例。
    fn prebuilt(raw: &RawConstructor) -> Option<Arc<Self::Instance>>;

    /// 收窄对象层产出。
    fn from_built(built: Built) -> Result<Arc<Self::Instance>, Built>;

    /// 内建默认集合。
    fn defaults(
        ctx: &BuildContext<'_>,
    ) -> Result<Vec<(ProtocolId, Arc<Self::Instance>)>, ConfigError>;
}

/// 传输能力。
#[derive(Clone, Copy, Debug, Default)]
pub struct TransportCapability;

/// 多路复用能力。
#[derive(Clone, Copy, Debug, Default)]
pub struct MuxerCapability;

impl Sealed for TransportCapability {}
impl Sealed for MuxerCapability {}

impl Capability for TransportCapability {
    type Instance = dyn Transport;

    const KIND: CapabilityKind = CapabilityKind::Transport;

    fn roles() -> &'static RoleRegistry {
        &TRANSPORT_ROLES
    }

    fn prebuilt(raw: &RawConstructor) -> Option<Arc<Self::Instance>> {
        match raw {
            RawConstructor::Transport(transport) => Some(Arc::clone(transport)),
            _ => None,
        }
    }

    fn from_built(built: Built) -> Result<Arc<Self::Instance>, Built> {
        match built {
            Built::Transport(transport) => Ok(transport),
            other => Err(other),
        }
    }

    fn defaults(
        ctx: &BuildContext<'_>,
    ) -> Result<Vec<(ProtocolId, Arc<Self::Instance>)>, ConfigError> {
        defaults::default_transports(ctx)
    }
}

impl Capability for MuxerCapability {
    type Instance = dyn StreamMuxer;

    const KIND: CapabilityKind = CapabilityKind::Muxer;

    fn roles() -> &'static RoleRegistry {
        &MUXER_ROLES
    }

    fn prebuilt(raw: &RawConstructor) -> Option<Arc<Self::Instance>> {
        match raw {
            RawConstructor::Muxer(muxer) => Some(Arc::clone(muxer)),
            _ => None,
        }
    }

    fn from_built(built: Built) -> Result<Arc<Self::Instance>, Built> {
        match built {
            Built::Muxer(muxer) => Ok(muxer),
            other => Err(other),
        }
    }

    fn defaults(
        ctx: &BuildContext<'_>,
    ) -> Result<Vec<(ProtocolId, Arc<Self::Instance>)>, ConfigError> {
        defaults::default_muxers(ctx)
    }
}

/// 可作为能力 `C` 实例返回的值。
///
/// 构造器的返回类型必须实现 `Constructed<C>`，否则无法注册为该能力的构造器。
pub trait Constructed<C: Capability> {
    /// 装箱为对象层产出。
    fn into_built(self) -> Built;
}

impl<T: Transport> Constructed<TransportCapability> for T {
    fn into_built(self) -> Built {
        Built::Transport(Arc::new(self))
    }
}

impl<M: StreamMuxer> Constructed<MuxerCapability> for M {
    fn into_built(self) -> Built {
        Built::Muxer(Arc::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_p2p::{MplexMuxer, YamuxMuxer};

    #[test]
    fn built_narrows_to_matching_capability() {
        let built =
            <YamuxMuxer as Constructed<MuxerCapability>>::into_built(YamuxMuxer::default());
        assert_eq!(built.kind(), CapabilityKind::Muxer);

        let rejected = TransportCapability::from_built(built.clone())
            .err()
            .expect("多路复用器不能作为传输");
        assert_eq!(rejected.kind(), CapabilityKind::Muxer);

        let muxer = MuxerCapability::from_built(built).expect("种类一致应成功");
        assert_eq!(muxer.name(), "yamux");
    }

    #[test]
    fn prebuilt_only_matches_own_kind() {
        let raw = RawConstructor::muxer(MplexMuxer);
        assert!(MuxerCapability::prebuilt(&raw).is_some());
        assert!(TransportCapability::prebuilt(&raw).is_none());
    }

    #[test]
    fn kinds_render_lowercase() {
        assert_eq!(TransportCapability::KIND.to_string(), "transport");
        assert_eq!(MuxerCapability::KIND.to_string(), "muxer");
    }
}
