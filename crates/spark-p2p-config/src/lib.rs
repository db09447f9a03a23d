#![deny(unsafe_code)]
#![allow(clippy::result_large_err)]
#![allow(private_bounds)]
#![doc = "spark-p2p-config: 点对点宿主的传输与多路复用构造器装配工具。"]
#![doc = ""]
#![doc = "== 使命概述 =="]
#![doc = "- **Why**：宿主允许调用方以现成实例或“按角色声明依赖的构造器”注册传输与多路复用器，装配层负责校验、注入与聚合。"]
#![doc = "- **What**：角色注册表 → 构造器解析 → 命名工厂 → 聚合集合 → 栈装配，外加 TOML 声明式配置与日志安装入口。"]
#![doc = "- **How**：构造器参数类型在编译期绑定到封闭的角色集合；对象层构造器在注册时按签名校验，运行期只剩提取与调用。"]

pub mod aggregate;
pub mod capability;
pub mod constructor;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod named;
pub mod resolver;
pub mod role;
mod sealed;
pub mod settings;
pub mod stack;

pub use aggregate::{AggregateSet, MULTISTREAM_NAME};
pub use capability::{
    Built, Capability, CapabilityKind, Constructed, MuxerCapability, TransportCapability,
};
pub use constructor::{
    ConstructorFn, DynConstructor, RawConstructor, ReturnKind, Signature, TypedConstructor,
};
pub use defaults::{DEFAULT_MUXERS, DEFAULT_TRANSPORTS, builtin_muxer, builtin_transport};
pub use error::{BoxError, ConfigError};
pub use logging::LoggingError;
pub use named::NamedFactory;
pub use resolver::{ResolvedFactory, resolve};
pub use role::{
    ArgumentMismatch, BuildContext, Extractor, MUXER_ROLES, Role, RoleArgs, RoleParam,
    RoleRegistry, RoleValue, TRANSPORT_ROLES,
};
pub use settings::StackSettings;
pub use stack::{Stack, StackConfig};
