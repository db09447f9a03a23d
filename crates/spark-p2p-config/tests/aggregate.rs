//! 聚合器的集成测试与性质测试。
//!
//! # 教案级注释概览
//! - **核心目标 (Why)**：验证聚合器的三条外部可见契约：
//!   1. 标识重复时整体失败，且报告首个重复的标识；
//!   2. 空输入回退到固定的默认集合，多次构建结果一致；
//!   3. 对无重复输入重新排序，不改变成功与否及成员集合；
//! - **设计手法 (How)**：确定性用例覆盖边界，`proptest` 随机生成子序列并打乱顺序覆盖性质 3；
//! - **合同与边界 (What)**：多路复用条目使用现成实例，传输条目使用带升级器的上下文。

use std::{collections::BTreeSet, convert::Infallible, sync::Arc};

use proptest::prelude::*;
use spark_p2p::{
    BasicHost, Host, MPLEX_PROTOCOL_ID, MplexMuxer, PeerId, PlaintextSecurity, ProtocolId,
    StreamMuxer, TCP_TRANSPORT_ID, Upgrader, WS_TRANSPORT_ID, YAMUX_PROTOCOL_ID, YamuxMuxer,
};
use spark_p2p_config::{
    AggregateSet, BuildContext, CapabilityKind, ConfigError, MuxerCapability, NamedFactory,
    RawConstructor, TransportCapability, builtin_transport,
};

fn host() -> Arc<dyn Host> {
    Arc::new(BasicHost::without_keys(PeerId::new("aggregate")))
}

fn muxer_entries(ids: &[&str]) -> Vec<NamedFactory<MuxerCapability>> {
    ids.iter()
        .map(|id| {
            NamedFactory::resolve(id.to_string(), RawConstructor::muxer(MplexMuxer))
                .expect("现成实例应解析成功")
        })
        .collect()
}

fn ids_of(set: &AggregateSet<MuxerCapability>) -> Vec<String> {
    set.ids().map(ProtocolId::to_string).collect()
}

#[test]
fn duplicate_ids_fail_with_the_repeated_id() {
    let host = host();
    let err = AggregateSet::build(&muxer_entries(&["a", "a"]), &BuildContext::new(&host))
        .expect_err("重复标识应失败");
    match err {
        ConfigError::DuplicateIdentifier { capability, id } => {
            assert_eq!(capability, CapabilityKind::Muxer);
            assert_eq!(id, "a");
        }
        other => panic!("意外错误: {other}"),
    }
}

#[test]
fn first_duplicate_in_input_order_is_reported() {
    let host = host();
    let err = AggregateSet::build(
        &muxer_entries(&["x", "b", "y", "b", "x"]),
        &BuildContext::new(&host),
    )
    .expect_err("重复标识应失败");
    assert!(matches!(err, ConfigError::DuplicateIdentifier { ref id, .. } if id == "b"));
}

#[test]
fn distinct_ids_are_independently_selectable() {
    let host = host();
    let entries = vec![
        NamedFactory::<MuxerCapability>::resolve("a", RawConstructor::muxer(YamuxMuxer::default()))
            .expect("解析成功"),
        NamedFactory::resolve("b", RawConstructor::muxer(MplexMuxer)).expect("解析成功"),
    ];
    let set = AggregateSet::build(&entries, &BuildContext::new(&host)).expect("构建成功");
    assert_eq!(set.len(), 2);
    assert_eq!(ids_of(&set), vec!["a", "b"]);
    assert_eq!(set.select("a").map(|m| m.name()), Some("yamux"));
    assert_eq!(set.select("b").map(|m| m.name()), Some("mplex"));
    assert!(set.select("c").is_none());
}

#[test]
fn empty_input_yields_the_same_defaults_every_time() {
    let host = host();
    let ctx = BuildContext::new(&host);
    let first = AggregateSet::<MuxerCapability>::build(&[], &ctx).expect("默认集合应构建成功");
    let second = AggregateSet::<MuxerCapability>::build(&[], &ctx).expect("默认集合应构建成功");
    assert!(first.is_default());
    assert_eq!(ids_of(&first), vec![YAMUX_PROTOCOL_ID, MPLEX_PROTOCOL_ID]);
    assert_eq!(ids_of(&first), ids_of(&second));
}

#[test]
fn default_transports_use_context_upgrader() {
    let host = host();
    let upgrader = Upgrader::new(
        Arc::new(PlaintextSecurity::new(host.id())),
        Arc::new(MplexMuxer),
    );
    let set = AggregateSet::<TransportCapability>::build(
        &[],
        &BuildContext::new(&host).with_upgrader(&upgrader),
    )
    .expect("默认传输应构建成功");
    let ids: Vec<&str> = set.ids().map(ProtocolId::as_str).collect();
    assert_eq!(ids, vec![TCP_TRANSPORT_ID, WS_TRANSPORT_ID]);
    assert!(set.select(TCP_TRANSPORT_ID).is_some_and(|t| t.can_dial("/ip4/1.1.1.1/tcp/4001")));
    assert!(set.select(WS_TRANSPORT_ID).is_some_and(|t| t.can_dial("/ip4/1.1.1.1/tcp/80/ws")));
}

#[test]
fn failure_leaves_no_partial_result() {
    let host = host();
    let upgrader = Upgrader::new(
        Arc::new(PlaintextSecurity::new(host.id())),
        Arc::new(MplexMuxer),
    );
    let failing = RawConstructor::transport_fn(|_upgrader: Upgrader| {
        Err::<spark_p2p::TcpTransport, _>("listener exhausted")
    });
    let entries = vec![
        NamedFactory::<TransportCapability>::resolve(
            "tcp",
            builtin_transport(TCP_TRANSPORT_ID).expect("内建传输"),
        )
        .expect("解析成功"),
        NamedFactory::resolve("broken", failing).expect("解析成功"),
    ];
    let err = AggregateSet::build(&entries, &BuildContext::new(&host).with_upgrader(&upgrader))
        .expect_err("任一工厂失败则整体失败");
    assert!(matches!(err, ConfigError::ConstructorInvocation { .. }));
    assert!(err.to_string().contains("listener exhausted"));
}

#[test]
fn muxer_set_can_back_an_upgrader() {
    let host = host();
    let set = AggregateSet::<MuxerCapability>::build(
        &muxer_entries(&["/a/1.0.0"]),
        &BuildContext::new(&host),
    )
    .expect("构建成功");
    let muxer: Arc<dyn StreamMuxer> = Arc::new(set);
    let upgrader = Upgrader::new(Arc::new(PlaintextSecurity::new(host.id())), muxer);
    assert_eq!(upgrader.muxer().name(), "multistream");
}

const POOL: [&str; 6] = ["/a", "/b", "/c", "/d", "/e", "/f"];

proptest! {
    #[test]
    fn reordering_distinct_ids_keeps_membership(
        ids in proptest::sample::subsequence(POOL.to_vec(), 1..=POOL.len()).prop_shuffle()
    ) {
        let host = host();
        let ctx = BuildContext::new(&host);

        let mut sorted = ids.clone();
        sorted.sort_unstable();

        let shuffled = AggregateSet::build(&muxer_entries(&ids), &ctx).expect("无重复输入应成功");
        let ordered = AggregateSet::build(&muxer_entries(&sorted), &ctx).expect("无重复输入应成功");

        prop_assert_eq!(ids_of(&shuffled), ids.iter().map(|id| id.to_string()).collect::<Vec<_>>());
        let lhs: BTreeSet<String> = ids_of(&shuffled).into_iter().collect();
        let rhs: BTreeSet<String> = ids_of(&ordered).into_iter().collect();
        prop_assert_eq!(lhs, rhs);
        prop_assert!(!shuffled.is_default());
    }

    #[test]
    fn duplicates_fail_regardless_of_order(
        ids in proptest::collection::vec(proptest::sample::select(POOL.to_vec()), 1..8)
            .prop_shuffle()
    ) {
        let host = host();
        let unique = ids.iter().collect::<BTreeSet<_>>().len() == ids.len();
        let result = AggregateSet::build(&muxer_entries(&ids), &BuildContext::new(&host));
        match result {
            Ok(set) => {
                prop_assert!(unique);
                prop_assert_eq!(set.len(), ids.len());
            }
            Err(err) => {
                prop_assert!(!unique);
                let is_duplicate = matches!(err, ConfigError::DuplicateIdentifier { .. });
                prop_assert!(is_duplicate);
            }
        }
    }
}

#[test]
fn infallible_constructors_need_no_error_type() {
    let host = host();
    let entries = vec![
        NamedFactory::<MuxerCapability>::resolve(
            "/zero/1.0.0",
            RawConstructor::muxer_fn(|| Ok::<_, Infallible>(MplexMuxer)),
        )
        .expect("解析成功"),
    ];
    let set = AggregateSet::build(&entries, &BuildContext::new(&host)).expect("构建成功");
    assert!(set.contains("/zero/1.0.0"));
}
