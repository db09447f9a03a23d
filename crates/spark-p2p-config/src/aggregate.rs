//! 聚合器：把多条命名工厂合成为一个有序、标识唯一的组件集合。
//!
//! # 教案级注释
//! - **意图 (Why)**：宿主最终持有的是“一组传输”与“一组多路复用器”，而非单个组件；
//!   聚合器负责唯一性校验、按序构造以及缺省回退；
//! - **逻辑 (How)**：
//!   1. 输入非空时，先整体校验标识唯一，再按输入顺序逐个调用工厂；
//!   2. 输入为空时，改用能力的内建默认集合；
//!   3. 结果保存为有序条目加 `BTreeMap` 索引，顺序即协商优先级；
//! - **契约 (What)**：任一步失败都不产生部分结果；重复标识在调用任何工厂之前就会被发现。
//! - **风险提示 (Trade-offs)**：默认集合只在输入为空时启用，显式配置的条目不会与默认值合并。

use std::{
    collections::{BTreeMap, btree_map::Entry},
    fmt,
    sync::Arc,
};

use spark_p2p::{ProtocolId, StreamMuxer};
use tracing::{debug, info, warn};

use crate::{
    capability::{Capability, MuxerCapability},
    error::ConfigError,
    named::NamedFactory,
    role::BuildContext,
};

/// 多路复用集合在协商时使用的名称。
pub const MULTISTREAM_NAME: &str = "multistream";

/// 有序且标识唯一的组件集合。
pub struct AggregateSet<C: Capability> {
    entries: Vec<(ProtocolId, Arc<C::Instance>)>,
    index: BTreeMap<ProtocolId, usize>,
    defaulted: bool,
}

impl<C: Capability> AggregateSet<C> {
    /// 由命名工厂构建集合。
    ///
    /// # 契约说明（What）
    /// - **前置条件**：`ctx` 能够提供各工厂声明的角色；
    /// - **返回**：
    ///   - 输入非空时，条目与输入一一对应且顺序一致；
    ///   - 输入为空时，条目为内建默认集合，`is_default()` 返回 `true`；
    /// - **错误**：重复标识返回 [`ConfigError::DuplicateIdentifier`]，工厂失败原样返回。
    pub fn build(
        factories: &[NamedFactory<C>],
        ctx: &BuildContext<'_>,
    ) -> Result<Self, ConfigError> {
        if factories.is_empty() {
            let entries = C::defaults(ctx)?;
            info!(
                capability = %C::KIND,
                count = entries.len(),
                "no entries configured, falling back to defaults"
            );
            return Self::from_entries(entries, true);
        }

        let index = index_ids::<C>(factories.iter().map(NamedFactory::id))?;
        let mut entries = Vec::with_capacity(factories.len());
        for named in factories {
            let instance = named.factory().invoke(ctx)?;
            debug!(capability = %C::KIND, id = %named.id(), "constructed entry");
            entries.push((named.id().clone(), instance));
        }

        Ok(Self {
            entries,
            index,
            defaulted: false,
        })
    }

    fn from_entries(
        entries: Vec<(ProtocolId, Arc<C::Instance>)>,
        defaulted: bool,
    ) -> Result<Self, ConfigError> {
        let index = index_ids::<C>(entries.iter().map(|(id, _)| id))?;
        Ok(Self {
            entries,
            index,
            defaulted,
        })
    }

    /// 按标识选取实例。
    pub fn select(&self, id: &str) -> Option<&Arc<C::Instance>> {
        self.index
            .get(id)
            .and_then(|position| self.entries.get(*position))
            .map(|(_, instance)| instance)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// 按优先级遍历标识。
    pub fn ids(&self) -> impl Iterator<Item = &ProtocolId> + '_ {
        self.entries.iter().map(|(id, _)| id)
    }

    /// 按优先级遍历条目。
    pub fn iter(&self) -> impl Iterator<Item = (&ProtocolId, &Arc<C::Instance>)> + '_ {
        self.entries.iter().map(|(id, instance)| (id, instance))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 集合是否来自内建默认值。
    pub fn is_default(&self) -> bool {
        self.defaulted
    }
}

fn index_ids<'a, C: Capability>(
    ids: impl Iterator<Item = &'a ProtocolId>,
) -> Result<BTreeMap<ProtocolId, usize>, ConfigError> {
    let mut index = BTreeMap::new();
    for (position, id) in ids.enumerate() {
        match index.entry(id.clone()) {
            Entry::Occupied(_) => {
                warn!(capability = %C::KIND, id = %id, "duplicate identifier rejected");
                return Err(ConfigError::DuplicateIdentifier {
                    capability: C::KIND,
                    id: id.to_string(),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(position);
            }
        }
    }
    Ok(index)
}

impl<C: Capability> Clone for AggregateSet<C> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            index: self.index.clone(),
            defaulted: self.defaulted,
        }
    }
}

impl<C: Capability> fmt::Debug for AggregateSet<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateSet")
            .field("capability", &C::KIND)
            .field("ids", &self.ids().collect::<Vec<_>>())
            .field("defaulted", &self.defaulted)
            .finish()
    }
}

/// 多路复用集合本身即为升级器使用的复用器：协商时按集合顺序尝试各协议。
impl StreamMuxer for AggregateSet<MuxerCapability> {
    fn name(&self) -> &str {
        MULTISTREAM_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        capability::TransportCapability, constructor::RawConstructor, role::Role,
    };
    use spark_p2p::{
        BasicHost, Host, MPLEX_PROTOCOL_ID, MplexMuxer, PeerId, YAMUX_PROTOCOL_ID, YamuxMuxer,
    };
    use tracing_test::traced_test;

    fn host() -> Arc<dyn Host> {
        Arc::new(BasicHost::without_keys(PeerId::new("local")))
    }

    #[traced_test]
    #[test]
    fn empty_muxer_list_falls_back_to_defaults() {
        let host = host();
        let set = AggregateSet::<MuxerCapability>::build(&[], &BuildContext::new(&host))
            .expect("默认集合应构建成功");
        assert!(set.is_default());
        let ids: Vec<&str> = set.ids().map(ProtocolId::as_str).collect();
        assert_eq!(ids, vec![YAMUX_PROTOCOL_ID, MPLEX_PROTOCOL_ID]);
        assert!(logs_contain("falling back to defaults"));
    }

    #[test]
    fn supplied_entries_replace_defaults() {
        let host = host();
        let factories = vec![
            NamedFactory::<MuxerCapability>::resolve("/custom/1.0.0", RawConstructor::muxer(MplexMuxer))
                .expect("解析成功"),
        ];
        let set = AggregateSet::build(&factories, &BuildContext::new(&host)).expect("构建成功");
        assert!(!set.is_default());
        assert_eq!(set.len(), 1);
        assert!(set.contains("/custom/1.0.0"));
        assert!(!set.contains(YAMUX_PROTOCOL_ID));
        assert_eq!(set.select("/custom/1.0.0").map(|m| m.name()), Some("mplex"));
    }

    #[traced_test]
    #[test]
    fn duplicate_is_reported_before_any_invocation() {
        let host = host();
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let counting = RawConstructor::muxer_fn(move |_id: PeerId| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok::<_, std::convert::Infallible>(YamuxMuxer::default())
        });
        let factories = vec![
            NamedFactory::<MuxerCapability>::resolve("/dup", counting).expect("解析成功"),
            NamedFactory::resolve("/dup", RawConstructor::muxer(MplexMuxer)).expect("解析成功"),
        ];
        let err = AggregateSet::build(&factories, &BuildContext::new(&host))
            .expect_err("重复标识应失败");
        assert!(matches!(err, ConfigError::DuplicateIdentifier { ref id, .. } if id == "/dup"));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(logs_contain("duplicate identifier rejected"));
    }

    #[test]
    fn default_transports_require_upgrader() {
        let host = host();
        let err = AggregateSet::<TransportCapability>::build(&[], &BuildContext::new(&host))
            .expect_err("缺少升级器时默认传输无法构建");
        assert!(matches!(
            err,
            ConfigError::RoleUnavailable {
                role: Role::Upgrader
            }
        ));
    }

    #[test]
    fn muxer_set_acts_as_multistream_muxer() {
        let host = host();
        let set = AggregateSet::<MuxerCapability>::build(&[], &BuildContext::new(&host))
            .expect("默认集合应构建成功");
        let muxer: Arc<dyn StreamMuxer> = Arc::new(set);
        assert_eq!(muxer.name(), MULTISTREAM_NAME);
    }
}
