use std::{borrow::Borrow, borrow::Cow, fmt};

/// 线上可见的协议标识，例如 `/yamux/1.0.0`。
///
/// # 教案级注释
/// - **意图 (Why)**：协议标识既作为聚合集合的键，又会在协商阶段写到线上；内建常量使用 `&'static str`
///   零分配，外部配置使用 `String`，因此以 `Cow<'static, str>` 统一承载；
/// - **契约 (What)**：比较与排序等价于底层字符串，且实现 `Borrow<str>`，可直接用 `&str` 查询
///   `BTreeMap<ProtocolId, _>`；
/// - **风险提示 (Trade-offs)**：本类型不校验格式（是否以 `/` 开头等），由协商层自行约束。
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtocolId(Cow<'static, str>);

impl ProtocolId {
    /// 以静态字符串构造，可用于常量上下文。
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    /// 字符串视图。
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for ProtocolId {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

impl From<String> for ProtocolId {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl Borrow<str> for ProtocolId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProtocolId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ProtocolId {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ProtocolId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn borrowed_and_owned_ids_compare_equal() {
        let borrowed = ProtocolId::from_static("/yamux/1.0.0");
        let owned = ProtocolId::from(String::from("/yamux/1.0.0"));
        assert_eq!(borrowed, owned);
        assert_eq!(borrowed, "/yamux/1.0.0");
    }

    #[test]
    fn map_lookup_by_str() {
        let mut map = BTreeMap::new();
        map.insert(ProtocolId::from("/mplex/6.3.0"), 1_usize);
        assert_eq!(map.get("/mplex/6.3.0"), Some(&1));
        assert_eq!(map.get("/yamux/1.0.0"), None);
    }
}
