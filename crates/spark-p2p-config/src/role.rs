//! 角色注册表：构造器可声明的注入参数的封闭集合。
//!
//! # 教案级注释
//! - **意图 (Why)**：构造器只能依赖宿主已知的少量上下文对象；把它们枚举为 [`Role`]，
//!   并为每个角色固定一个提取函数，就能在编译期拒绝未知参数类型，在装配期拒绝越权角色；
//! - **逻辑 (How)**：
//!   1. [`RoleParam`] 把每个角色绑定到唯一的 Rust 类型，参数类型不在集合内时构造器无法通过编译；
//!   2. [`RoleRegistry`] 是 `角色 -> 提取函数` 的静态表，每种能力各有一张（[`TRANSPORT_ROLES`]、[`MUXER_ROLES`]）；
//!   3. 提取函数读取 [`BuildContext`]（宿主与可选升级器），产出 [`RoleValue`]。
//! - **契约 (What)**：注册表在进程生命周期内只读；提取函数不产生副作用，
//!   对同一状态重复调用得到等价结果。

use std::{collections::VecDeque, fmt, sync::Arc};

use spark_p2p::{
    AddressFilters, Host, Network, PeerId, Peerstore, PrivateKey, Protector, PublicKey,
    SecureTransport, StreamMuxer, Upgrader,
};
use thiserror::Error;

use crate::{error::ConfigError, sealed::Sealed};

/// 可注入角色。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// 宿主本身，类型 `Arc<dyn Host>`。
    Host,
    /// 网络视图，类型 `Arc<dyn Network>`。
    Network,
    /// 本地节点标识，类型 [`PeerId`]。
    PeerId,
    /// 本地公钥，类型 [`PublicKey`]。
    PublicKey,
    /// 本地私钥，类型 [`PrivateKey`]。
    PrivateKey,
    /// 节点记录存储，类型 `Arc<dyn Peerstore>`。
    Peerstore,
    /// 地址过滤集合，类型 `Arc<AddressFilters>`。
    AddressFilters,
    /// 安全传输，类型 `Arc<dyn SecureTransport>`。
    SecureTransport,
    /// 多路复用传输，类型 `Arc<dyn StreamMuxer>`。
    StreamMuxer,
    /// 连接升级器，类型 [`Upgrader`]。
    Upgrader,
    /// 私有网络保护器，类型 `Option<Arc<dyn Protector>>`。
    Protector,
}

impl Role {
    /// 全部角色，顺序稳定。
    pub const ALL: [Role; 11] = [
        Role::Host,
        Role::Network,
        Role::PeerId,
        Role::PublicKey,
        Role::PrivateKey,
        Role::Peerstore,
        Role::AddressFilters,
        Role::SecureTransport,
        Role::StreamMuxer,
        Role::Upgrader,
        Role::Protector,
    ];

    /// 稳定的字符串名称，用于日志与错误信息。
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Host => "host",
            Role::Network => "network",
            Role::PeerId => "peer_id",
            Role::PublicKey => "public_key",
            Role::PrivateKey => "private_key",
            Role::Peerstore => "peerstore",
            Role::AddressFilters => "address_filters",
            Role::SecureTransport => "secure_transport",
            Role::StreamMuxer => "stream_muxer",
            Role::Upgrader => "upgrader",
            Role::Protector => "protector",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 提取角色值时可读取的宿主状态。
///
/// # 教案式说明
/// - **意图（Why）**：对应“宿主状态 + 升级器状态”二元组；多路复用器在升级器存在之前构建，
///   因此升级器是可选的；
/// - **契约（What）**：只持有借用，`Copy` 后可在一次装配中反复传递；依赖升级器的角色在
///   `upgrader` 缺失时返回 [`ConfigError::RoleUnavailable`]。
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    host: &'a Arc<dyn Host>,
    upgrader: Option<&'a Upgrader>,
}

impl<'a> BuildContext<'a> {
    /// 仅以宿主构造，适用于多路复用器装配。
    pub fn new(host: &'a Arc<dyn Host>) -> Self {
        Self {
            host,
            upgrader: None,
        }
    }

    /// 附加升级器，适用于传输装配。
    pub fn with_upgrader(mut self, upgrader: &'a Upgrader) -> Self {
        self.upgrader = Some(upgrader);
        self
    }

    /// 宿主。
    pub fn host(&self) -> &'a Arc<dyn Host> {
        self.host
    }

    /// 升级器。
    pub fn upgrader(&self) -> Option<&'a Upgrader> {
        self.upgrader
    }

    pub(crate) fn require_upgrader(&self, role: Role) -> Result<&'a Upgrader, ConfigError> {
        self.upgrader.ok_or(ConfigError::RoleUnavailable { role })
    }
}

impl fmt::Debug for BuildContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("host", &self.host.id())
            .field("upgrader", &self.upgrader)
            .finish()
    }
}

/// 提取后的角色值。
#[derive(Clone)]
pub enum RoleValue {
    Host(Arc<dyn Host>),
    Network(Arc<dyn Network>),
    PeerId(PeerId),
    PublicKey(PublicKey),
    PrivateKey(PrivateKey),
    Peerstore(Arc<dyn Peerstore>),
    AddressFilters(Arc<AddressFilters>),
    SecureTransport(Arc<dyn SecureTransport>),
    StreamMuxer(Arc<dyn StreamMuxer>),
    Upgrader(Upgrader),
    Protector(Option<Arc<dyn Protector>>),
}

impl RoleValue {
    /// 值所属的角色。
    pub fn role(&self) -> Role {
        match self {
            RoleValue::Host(_) => Role::Host,
            RoleValue::Network(_) => Role::Network,
            RoleValue::PeerId(_) => Role::PeerId,
            RoleValue::PublicKey(_) => Role::PublicKey,
            RoleValue::PrivateKey(_) => Role::PrivateKey,
            RoleValue::Peerstore(_) => Role::Peerstore,
            RoleValue::AddressFilters(_) => Role::AddressFilters,
            RoleValue::SecureTransport(_) => Role::SecureTransport,
            RoleValue::StreamMuxer(_) => Role::StreamMuxer,
            RoleValue::Upgrader(_) => Role::Upgrader,
            RoleValue::Protector(_) => Role::Protector,
        }
    }
}

impl fmt::Debug for RoleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RoleValue").field(&self.role()).finish()
    }
}

/// 绑定到某个角色的参数类型。
///
/// 每个角色恰好对应一个实现类型；构造器的参数必须全部实现本 trait。
/// 该 trait 被 sealed，集合之外的类型无法作为构造器参数。
pub trait RoleParam: Sealed + Sized + Send + 'static {
    /// 该类型代表的角色。
    const ROLE: Role;

    /// 从角色值中取出具体类型，角色不符时原样退回。
    fn from_value(value: RoleValue) -> Result<Self, RoleValue>;
}

macro_rules! role_param {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Sealed for $ty {}

            impl RoleParam for $ty {
                const ROLE: Role = Role::$variant;

                fn from_value(value: RoleValue) -> Result<Self, RoleValue> {
                    match value {
                        RoleValue::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

role_param! {
    Arc<dyn Host> => Host,
    Arc<dyn Network> => Network,
    PeerId => PeerId,
    PublicKey => PublicKey,
    PrivateKey => PrivateKey,
    Arc<dyn Peerstore> => Peerstore,
    Arc<AddressFilters> => AddressFilters,
    Arc<dyn SecureTransport> => SecureTransport,
    Arc<dyn StreamMuxer> => StreamMuxer,
    Upgrader => Upgrader,
    Option<Arc<dyn Protector>> => Protector,
}

/// 按声明顺序排列的实参。
#[derive(Debug, Default)]
pub struct RoleArgs {
    values: VecDeque<RoleValue>,
}

/// 实参与构造器声明不一致。
#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected argument for role `{expected}`, found {found:?}")]
pub struct ArgumentMismatch {
    pub expected: Role,
    pub found: Option<Role>,
}

impl RoleArgs {
    /// 以有序实参构造。
    pub fn new(values: Vec<RoleValue>) -> Self {
        Self {
            values: values.into(),
        }
    }

    /// 剩余实参个数。
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否已取空。
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 取出下一个实参并转换为目标类型。
    pub fn take<A: RoleParam>(&mut self) -> Result<A, ArgumentMismatch> {
        let value = self.values.pop_front().ok_or(ArgumentMismatch {
            expected: A::ROLE,
            found: None,
        })?;
        A::from_value(value).map_err(|other| ArgumentMismatch {
            expected: A::ROLE,
            found: Some(other.role()),
        })
    }

    /// 取出下一个原始角色值。
    pub fn next_value(&mut self) -> Option<RoleValue> {
        self.values.pop_front()
    }
}

/// 角色提取函数。
pub type Extractor = fn(&BuildContext<'_>) -> Result<RoleValue, ConfigError>;

/// `角色 -> 提取函数` 的静态表。
///
/// # 教案级注释
/// - **契约 (What)**：`lookup` 未命中即表示该角色不属于此能力的合法集合；
///   表内角色互不重复，顺序仅影响 `roles()` 的遍历顺序；
/// - **风险提示 (Trade-offs)**：线性查找足以覆盖 11 个角色，无需哈希表。
pub struct RoleRegistry {
    entries: &'static [(Role, Extractor)],
}

impl RoleRegistry {
    /// 以静态表构造。
    pub const fn new(entries: &'static [(Role, Extractor)]) -> Self {
        Self { entries }
    }

    /// 查找角色的提取函数。
    pub fn lookup(&self, role: Role) -> Option<Extractor> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == role)
            .map(|(_, extractor)| *extractor)
    }

    /// 是否包含该角色。
    pub fn contains(&self, role: Role) -> bool {
        self.lookup(role).is_some()
    }

    /// 遍历合法角色。
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.entries.iter().map(|(role, _)| *role)
    }

    /// 合法角色个数。
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空表。
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for RoleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.roles()).finish()
    }
}

fn extract_host(ctx: &BuildContext<'_>) -> Result<RoleValue, ConfigError> {
    Ok(RoleValue::Host(Arc::clone(ctx.host())))
}

fn extract_network(ctx: &BuildContext<'_>) -> Result<RoleValue, ConfigError> {
    Ok(RoleValue::Network(ctx.host().network()))
}

fn extract_peer_id(ctx: &BuildContext<'_>) -> Result<RoleValue, ConfigError> {
    Ok(RoleValue::PeerId(ctx.host().id()))
}

fn extract_public_key(ctx: &BuildContext<'_>) -> Result<RoleValue, ConfigError> {
    let host = ctx.host();
    host.peerstore()
        .public_key(&host.id())
        .map(RoleValue::PublicKey)
        .ok_or(ConfigError::RoleUnavailable {
            role: Role::PublicKey,
        })
}

fn extract_private_key(ctx: &BuildContext<'_>) -> Result<RoleValue, ConfigError> {
    let host = ctx.host();
    host.peerstore()
        .private_key(&host.id())
        .map(RoleValue::PrivateKey)
        .ok_or(ConfigError::RoleUnavailable {
            role: Role::PrivateKey,
        })
}

fn extract_peerstore(ctx: &BuildContext<'_>) -> Result<RoleValue, ConfigError> {
    Ok(RoleValue::Peerstore(ctx.host().peerstore()))
}

fn extract_address_filters(ctx: &BuildContext<'_>) -> Result<RoleValue, ConfigError> {
    let upgrader = ctx.require_upgrader(Role::AddressFilters)?;
    Ok(RoleValue::AddressFilters(Arc::clone(upgrader.filters())))
}

fn extract_secure_transport(ctx: &BuildContext<'_>) -> Result<RoleValue, ConfigError> {
    let upgrader = ctx.require_upgrader(Role::SecureTransport)?;
    Ok(RoleValue::SecureTransport(Arc::clone(upgrader.secure())))
}

fn extract_stream_muxer(ctx: &BuildContext<'_>) -> Result<RoleValue, ConfigError> {
    let upgrader = ctx.require_upgrader(Role::StreamMuxer)?;
    Ok(RoleValue::StreamMuxer(Arc::clone(upgrader.muxer())))
}

fn extract_upgrader(ctx: &BuildContext<'_>) -> Result<RoleValue, ConfigError> {
    let upgrader = ctx.require_upgrader(Role::Upgrader)?;
    Ok(RoleValue::Upgrader(upgrader.clone()))
}

fn extract_protector(ctx: &BuildContext<'_>) -> Result<RoleValue, ConfigError> {
    let upgrader = ctx.require_upgrader(Role::Protector)?;
    Ok(RoleValue::Protector(upgrader.protector().cloned()))
}

/// 传输构造器可声明的角色：全部 11 个。
pub static TRANSPORT_ROLES: RoleRegistry = RoleRegistry::new(&[
    (Role::Upgrader, extract_upgrader as Extractor),
    (Role::Host, extract_host as Extractor),
    (Role::Network, extract_network as Extractor),
    (Role::StreamMuxer, extract_stream_muxer as Extractor),
    (Role::SecureTransport, extract_secure_transport as Extractor),
    (Role::Protector, extract_protector as Extractor),
    (Role::AddressFilters, extract_address_filters as Extractor),
    (Role::PeerId, extract_peer_id as Extractor),
    (Role::PrivateKey, extract_private_key as Extractor),
    (Role::PublicKey, extract_public_key as Extractor),
    (Role::Peerstore, extract_peerstore as Extractor),
]);

/// 多路复用构造器可声明的角色：只读宿主上下文，不含升级器相关角色。
pub static MUXER_ROLES: RoleRegistry = RoleRegistry::new(&[
    (Role::Host, extract_host as Extractor),
    (Role::Network, extract_network as Extractor),
    (Role::PeerId, extract_peer_id as Extractor),
    (Role::Peerstore, extract_peerstore as Extractor),
]);
