//! 声明式栈配置。
//!
//! # 教案级注释
//! - **意图 (Why)**：部署方常以配置文件而非代码挑选传输与多路复用器；
//!   配置文件只能引用内建目录中的名称，自定义构造器仍需通过 [`StackConfig`](crate::StackConfig) 注册；
//! - **契约 (What)**：未知字段直接拒绝，所有字段缺省为空列表；空列表意味着回退到内建默认集合。
//!
//! ```toml
//! transports = ["tcp", "ws"]
//! muxers = ["/yamux/1.0.0"]
//! deny_addresses = ["/ip4/10."]
//! ```

use serde::Deserialize;

use crate::error::ConfigError;

/// 从 TOML 反序列化的栈配置。
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StackSettings {
    /// 传输名称，按优先级排列。
    pub transports: Vec<String>,
    /// 多路复用协议 ID，按优先级排列。
    pub muxers: Vec<String>,
    /// 拒绝拨号的多地址前缀。
    pub deny_addresses: Vec<String>,
}

impl StackSettings {
    /// 解析 TOML 文本。
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }
}
