//! 日志安装入口。
//!
//! # 教案式说明
//! - **意图（Why）**：装配过程在 `debug`/`info`/`warn` 级别输出解析、回退与重复标识事件；
//!   嵌入方未自行配置 Subscriber 时，可调用 [`install`] 获得开箱即用的控制台日志；
//! - **逻辑（How）**：组装 `EnvFilter + fmt` Layer 并设置为全局 Subscriber，过滤规则取自 `RUST_LOG`，缺省为 `info`；
//! - **契约（What）**：进程内只允许成功安装一次；已有外部 Subscriber 时返回错误而不是覆盖。

use std::sync::OnceLock;

use thiserror::Error;
use tracing::dispatcher;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt};

static INSTALLED: OnceLock<()> = OnceLock::new();

/// 日志安装错误。
#[derive(Debug, Error)]
pub enum LoggingError {
    /// 本模块已完成安装。
    #[error("logging has already been installed")]
    AlreadyInstalled,
    /// 外部已设置全局 Subscriber。
    #[error("a global tracing subscriber has already been set")]
    SubscriberAlreadySet,
    /// 设置全局 Subscriber 失败。
    #[error("failed to set global subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// 安装全局日志 Subscriber。
pub fn install() -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Err(LoggingError::AlreadyInstalled);
    }
    if dispatcher::has_been_set() {
        return Err(LoggingError::SubscriberAlreadySet);
    }

    let subscriber = tracing_subscriber::registry()
        .with(build_env_filter())
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber)?;

    INSTALLED
        .set(())
        .map_err(|_| LoggingError::AlreadyInstalled)
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
