/// 地址过滤集合。
///
/// # 教案级注释
/// - **意图 (Why)**：宿主可禁止向特定网段或协议栈拨号/监听，传输实现在 `can_dial` 前查询该集合；
/// - **逻辑 (How)**：以多地址字符串前缀表达规则，例如 `/ip4/10.` 拒绝整个 `10.0.0.0/8`；
/// - **契约 (What)**：空集合不拒绝任何地址；规则按插入顺序保存，重复规则会被忽略。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressFilters {
    denied: Vec<String>,
}

impl AddressFilters {
    /// 构造空集合。
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条拒绝规则。
    pub fn deny(&mut self, prefix: impl Into<String>) -> &mut Self {
        let prefix = prefix.into();
        if !self.denied.contains(&prefix) {
            self.denied.push(prefix);
        }
        self
    }

    /// 判断地址是否命中拒绝规则。
    pub fn is_denied(&self, addr: &str) -> bool {
        self.denied.iter().any(|prefix| addr.starts_with(prefix.as_str()))
    }

    /// 已登记的规则。
    pub fn denied(&self) -> &[String] {
        &self.denied
    }

    /// 是否没有任何规则。
    pub fn is_empty(&self) -> bool {
        self.denied.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_rules_block_matching_addresses() {
        let mut filters = AddressFilters::new();
        filters.deny("/ip4/10.").deny("/ip4/10.");
        assert_eq!(filters.denied().len(), 1, "重复规则应被忽略");
        assert!(filters.is_denied("/ip4/10.1.2.3/tcp/4001"));
        assert!(!filters.is_denied("/ip4/192.168.1.1/tcp/4001"));
    }
}
