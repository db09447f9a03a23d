use std::sync::Arc;

/// yamux 的标准协议标识。
pub const YAMUX_PROTOCOL_ID: &str = "/yamux/1.0.0";
/// mplex 的标准协议标识。
pub const MPLEX_PROTOCOL_ID: &str = "/mplex/6.3.0";

/// 流多路复用传输契约。
///
/// # 教案级注释
/// - **意图 (Why)**：在单条已加密连接上承载多条逻辑流；配置层只负责构造与按协议标识挑选，
///   具体的帧编解码由实现方负责；
/// - **契约 (What)**：`name` 仅用于日志；`max_streams` 返回单连接允许的并发流上限，`None` 表示不设限。
pub trait StreamMuxer: Send + Sync + 'static {
    /// 实现名称，用于日志与诊断。
    fn name(&self) -> &str;

    /// 单连接并发流上限。
    fn max_streams(&self) -> Option<u32> {
        None
    }
}

impl<T> StreamMuxer for Arc<T>
where
    T: StreamMuxer + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn max_streams(&self) -> Option<u32> {
        (**self).max_streams()
    }
}

/// yamux 复用器描述。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YamuxMuxer {
    receive_window: u32,
    max_streams: u32,
}

impl YamuxMuxer {
    /// 默认接收窗口（256 KiB）。
    pub const DEFAULT_RECEIVE_WINDOW: u32 = 256 * 1024;
    /// 默认并发流上限。
    pub const DEFAULT_MAX_STREAMS: u32 = 1000;

    /// 覆盖接收窗口。
    pub fn with_receive_window(mut self, bytes: u32) -> Self {
        self.receive_window = bytes;
        self
    }

    /// 覆盖并发流上限。
    pub fn with_max_streams(mut self, limit: u32) -> Self {
        self.max_streams = limit;
        self
    }

    /// 接收窗口大小。
    pub fn receive_window(&self) -> u32 {
        self.receive_window
    }
}

impl Default for YamuxMuxer {
    fn default() -> Self {
        Self {
            receive_window: Self::DEFAULT_RECEIVE_WINDOW,
            max_streams: Self::DEFAULT_MAX_STREAMS,
        }
    }
}

impl StreamMuxer for YamuxMuxer {
    fn name(&self) -> &str {
        "yamux"
    }

    fn max_streams(&self) -> Option<u32> {
        Some(self.max_streams)
    }
}

/// mplex 复用器描述。mplex 没有流控窗口，也不限制并发流。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MplexMuxer;

impl StreamMuxer for MplexMuxer {
    fn name(&self) -> &str {
        "mplex"
    }
}
