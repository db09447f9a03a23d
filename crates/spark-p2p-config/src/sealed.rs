//! 内部 sealed 模块，限定 [`Capability`](crate::capability::Capability) 与
//! [`RoleParam`](crate::role::RoleParam) 的实现者集合。
//!
//! # 契约说明（What）
//! - 只有本 crate 内的能力标记与 11 个角色类型实现 `Sealed`；
//! - 新增能力或角色时需同时扩展角色注册表与默认集合，因此不对外开放。
pub(crate) trait Sealed {}
