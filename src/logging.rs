// ==========================================
// 配件目录管理系统 - 日志初始化
// ==========================================
// 职责: CLI 与测试各一个 tracing 入口
// 约定: 导入/回滚的关键节点用结构化字段（import_id、计数、耗时）
//       而不是拼进消息文本，方便按字段过滤
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 无 RUST_LOG 时的默认过滤器：本 crate info，依赖降噪到 warn
const DEFAULT_FILTER: &str = "warn,parts_catalog_aps=info";

/// CLI 入口的日志初始化
///
/// RUST_LOG 优先（如 RUST_LOG=parts_catalog_aps=trace），
/// 未设置时用 [`DEFAULT_FILTER`]。
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// 测试用初始化：输出进测试捕获器，重复调用安全
///
/// 默认把本 crate 提到 debug（排查差异/回滚用例时直接可见），
/// RUST_LOG 仍可覆盖。
pub fn init_test() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,parts_catalog_aps=debug"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
