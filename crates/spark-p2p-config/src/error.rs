//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中定义构造器解析、聚合与栈装配阶段的全部失败语义；
//! - 装配只在宿主启动时执行一次，所有错误都返回给调用方，不存在进程级致命错误。
//!
//! ## 设计要求（What）
//! - 错误类型派生 `thiserror::Error`，可直接交给 `anyhow`/`eyre` 等上层框架；
//! - 用户构造器返回的错误经 [`ConfigError::ConstructorInvocation`] 原样透传，可通过 `source()` 取回。

use thiserror::Error;

use crate::{capability::CapabilityKind, role::Role};

/// 类型擦除后的用户错误。
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 配置层错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：区分“构造器声明不合法”“标识冲突”“用户构造器失败”三大类，
///   让宿主在启动失败时能给出可操作的诊断；
/// - **契约 (What)**：
///   - 解析阶段只可能产生 `UnsupportedParameterType`、`DuplicateParameterRole`、
///     `InvalidConstructorSignature`，此时尚未调用任何用户代码；
///   - 聚合阶段在调用任何工厂前检查 `DuplicateIdentifier`；
///   - `RoleUnavailable` 表示宿主状态无法提供某个角色（例如 Peerstore 中缺少本地私钥）。
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 构造器声明了目标能力不接受的参数角色。
    #[error("unsupported parameter type: role `{role}` cannot be injected into a {capability} constructor")]
    UnsupportedParameterType {
        role: Role,
        capability: CapabilityKind,
    },

    /// 同一角色被多个参数声明。
    #[error("parameter role `{role}` is declared more than once")]
    DuplicateParameterRole { role: Role },

    /// 构造器返回值形态与目标能力不符。
    #[error("invalid {capability} constructor signature: {reason}")]
    InvalidConstructorSignature {
        capability: CapabilityKind,
        reason: String,
    },

    /// 两个条目使用了同一协议标识。
    #[error("duplicate {capability} identifier `{id}`")]
    DuplicateIdentifier {
        capability: CapabilityKind,
        id: String,
    },

    /// 用户构造器返回错误。
    #[error("{capability} constructor failed: {source}")]
    ConstructorInvocation {
        capability: CapabilityKind,
        #[source]
        source: BoxError,
    },

    /// 当前宿主状态无法提供该角色的值。
    #[error("role `{role}` is unavailable in the current host state")]
    RoleUnavailable { role: Role },

    /// 配置引用了内建目录中不存在的标识。
    #[error("unknown {capability} identifier `{id}`")]
    UnknownIdentifier {
        capability: CapabilityKind,
        id: String,
    },

    /// 栈配置文件解析失败。
    #[error("failed to parse stack settings: {0}")]
    Settings(#[from] toml::de::Error),
}

impl ConfigError {
    /// 若错误来自用户构造器，返回原始错误。
    pub fn invocation_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            ConfigError::ConstructorInvocation { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
