//! 日志安装入口的集成测试。
//!
//! 全局 Subscriber 在进程内只能设置一次，因此本文件只包含一个用例，独占一个测试进程。

use spark_p2p_config::{LoggingError, logging};

#[test]
fn install_succeeds_once_then_reports_already_installed() {
    logging::install().expect("首次安装应成功");
    tracing::info!("logging installed");
    assert!(matches!(
        logging::install(),
        Err(LoggingError::AlreadyInstalled)
    ));
}
