//! 构造器解析：把原始构造器校验并固化为可重复调用的工厂。
//!
//! # 教案级注释
//! - **意图 (Why)**：把所有“声明是否合法”的判断前移到注册时完成，
//!   宿主启动时只剩真正的构造调用；
//! - **逻辑 (How)**：
//!   1. 现成实例直接固化为恒等工厂，种类不符时报告签名错误；
//!   2. 构造器逐个参数在能力的角色表中查找提取函数，同时检测重复角色；
//!   3. 返回形态必须是 `[能力]` 或 `[能力, 错误]`；
//! - **契约 (What)**：解析期间绝不调用用户代码；解析成功的工厂在调用时只可能因
//!   角色提取失败或用户构造器失败而报错。

use std::{collections::BTreeSet, fmt, sync::Arc};

use tracing::debug;

use crate::{
    capability::Capability,
    constructor::{DynConstructor, RawConstructor, ReturnKind},
    error::ConfigError,
    role::{BuildContext, Extractor, Role, RoleArgs},
};

enum Plan<C: Capability> {
    Instance(Arc<C::Instance>),
    Call {
        constructor: Arc<dyn DynConstructor>,
        extractors: Arc<[(Role, Extractor)]>,
    },
}

impl<C: Capability> Clone for Plan<C> {
    fn clone(&self) -> Self {
        match self {
            Plan::Instance(instance) => Plan::Instance(Arc::clone(instance)),
            Plan::Call {
                constructor,
                extractors,
            } => Plan::Call {
                constructor: Arc::clone(constructor),
                extractors: Arc::clone(extractors),
            },
        }
    }
}

/// 解析完成的工厂。
///
/// # 教案式说明
/// - **契约（What）**：克隆只增加引用计数；每次 `invoke` 都重新提取实参并调用构造器，
///   恒等工厂则始终返回同一实例。
pub struct ResolvedFactory<C: Capability> {
    plan: Plan<C>,
}

impl<C: Capability> Clone for ResolvedFactory<C> {
    fn clone(&self) -> Self {
        Self {
            plan: self.plan.clone(),
        }
    }
}

impl<C: Capability> fmt::Debug for ResolvedFactory<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("ResolvedFactory");
        debug.field("capability", &C::KIND);
        match &self.plan {
            Plan::Instance(_) => debug.field("plan", &"instance"),
            Plan::Call { .. } => debug.field("params", &self.params()),
        };
        debug.finish()
    }
}

impl<C: Capability> ResolvedFactory<C> {
    /// 构造器声明的参数角色；恒等工厂为空。
    pub fn params(&self) -> Vec<Role> {
        match &self.plan {
            Plan::Instance(_) => Vec::new(),
            Plan::Call { extractors, .. } => extractors.iter().map(|(role, _)| *role).collect(),
        }
    }

    /// 是否为现成实例的恒等工厂。
    pub fn is_prebuilt(&self) -> bool {
        matches!(self.plan, Plan::Instance(_))
    }

    /// 从上下文提取实参并构造实例。
    ///
    /// # 契约说明（What）
    /// - 实参按声明顺序提取，任一角色不可用即返回 [`ConfigError::RoleUnavailable`]，构造器不会被调用；
    /// - 用户错误包装为 [`ConfigError::ConstructorInvocation`]，`source` 保持原值；
    /// - 对象层构造器产出的种类与能力不符时返回 [`ConfigError::InvalidConstructorSignature`]。
    pub fn invoke(&self, ctx: &BuildContext<'_>) -> Result<Arc<C::Instance>, ConfigError> {
        let (constructor, extractors) = match &self.plan {
            Plan::Instance(instance) => return Ok(Arc::clone(instance)),
            Plan::Call {
                constructor,
                extractors,
            } => (constructor, extractors),
        };

        let values = extractors
            .iter()
            .map(|(_, extract)| extract(ctx))
            .collect::<Result<Vec<_>, _>>()?;

        let built = constructor
            .invoke(RoleArgs::new(values))
            .map_err(|source| ConfigError::ConstructorInvocation {
                capability: C::KIND,
                source,
            })?;

        C::from_built(built).map_err(|other| ConfigError::InvalidConstructorSignature {
            capability: C::KIND,
            reason: format!("constructor produced a {} at run time", other.kind()),
        })
    }
}

/// 解析原始构造器。
pub fn resolve<C: Capability>(raw: RawConstructor) -> Result<ResolvedFactory<C>, ConfigError> {
    let constructor = match raw {
        RawConstructor::Callable(constructor) => constructor,
        prebuilt => {
            let instance = C::prebuilt(&prebuilt).ok_or_else(|| {
                ConfigError::InvalidConstructorSignature {
                    capability: C::KIND,
                    reason: format!(
                        "expected a {} or a constructor returning one, found a {}",
                        C::KIND,
                        prebuilt.describe()
                    ),
                }
            })?;
            debug!(capability = %C::KIND, "resolved prebuilt instance");
            return Ok(ResolvedFactory {
                plan: Plan::Instance(instance),
            });
        }
    };

    let signature = constructor.signature();
    let extractors = plan_arguments::<C>(signature.params())?;
    check_returns::<C>(signature.returns())?;

    debug!(
        capability = %C::KIND,
        params = ?signature.params(),
        "resolved constructor"
    );
    Ok(ResolvedFactory {
        plan: Plan::Call {
            constructor,
            extractors: extractors.into(),
        },
    })
}

fn plan_arguments<C: Capability>(params: &[Role]) -> Result<Vec<(Role, Extractor)>, ConfigError> {
    let registry = C::roles();
    let mut seen = BTreeSet::new();
    params
        .iter()
        .map(|&role| {
            if !seen.insert(role) {
                return Err(ConfigError::DuplicateParameterRole { role });
            }
            registry
                .lookup(role)
                .map(|extract| (role, extract))
                .ok_or(ConfigError::UnsupportedParameterType {
                    role,
                    capability: C::KIND,
                })
        })
        .collect()
}

fn check_returns<C: Capability>(returns: &[ReturnKind]) -> Result<(), ConfigError> {
    match returns {
        [ReturnKind::Capability(kind)] | [ReturnKind::Capability(kind), ReturnKind::Error]
            if *kind == C::KIND =>
        {
            Ok(())
        }
        _ => {
            let found = returns
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            Err(ConfigError::InvalidConstructorSignature {
                capability: C::KIND,
                reason: format!(
                    "constructor must return `{kind}` or `({kind}, error)`, found `({found})`",
                    kind = C::KIND
                ),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        capability::{Built, CapabilityKind, MuxerCapability, TransportCapability},
        constructor::Signature,
        error::BoxError,
    };
    use spark_p2p::{BasicHost, Host, MplexMuxer, PeerId};

    struct Scripted(Signature);

    impl DynConstructor for Scripted {
        fn signature(&self) -> Signature {
            self.0.clone()
        }

        fn invoke(&self, _args: RoleArgs) -> Result<Built, BoxError> {
            Ok(Built::Muxer(Arc::new(MplexMuxer)))
        }
    }

    fn scripted(params: Vec<Role>, returns: Vec<ReturnKind>) -> RawConstructor {
        RawConstructor::dynamic(Scripted(Signature::new(params, returns)))
    }

    #[test]
    fn return_shapes_are_checked() {
        let muxer = ReturnKind::Capability(CapabilityKind::Muxer);
        assert!(resolve::<MuxerCapability>(scripted(vec![], vec![muxer])).is_ok());
        assert!(resolve::<MuxerCapability>(scripted(vec![], vec![muxer, ReturnKind::Error])).is_ok());

        for returns in [
            vec![],
            vec![ReturnKind::Error],
            vec![muxer, ReturnKind::Other("u32")],
            vec![muxer, ReturnKind::Error, ReturnKind::Error],
            vec![ReturnKind::Capability(CapabilityKind::Transport)],
        ] {
            let err = resolve::<MuxerCapability>(scripted(vec![], returns.clone()))
                .expect_err("返回形态不合法应失败");
            assert!(
                matches!(err, ConfigError::InvalidConstructorSignature { .. }),
                "{returns:?} 应被拒绝"
            );
        }
    }

    #[test]
    fn repeated_role_is_rejected() {
        let err = resolve::<TransportCapability>(scripted(
            vec![Role::PeerId, Role::Upgrader, Role::PeerId],
            vec![ReturnKind::Capability(CapabilityKind::Transport)],
        ))
        .expect_err("重复角色应失败");
        assert!(matches!(
            err,
            ConfigError::DuplicateParameterRole { role: Role::PeerId }
        ));
    }

    #[test]
    fn runtime_kind_mismatch_is_a_signature_error() {
        let factory = resolve::<TransportCapability>(scripted(
            vec![],
            vec![ReturnKind::Capability(CapabilityKind::Transport)],
        ))
        .expect("签名合法");
        let host: Arc<dyn Host> = Arc::new(BasicHost::without_keys(PeerId::new("local")));
        let err = match factory.invoke(&BuildContext::new(&host)) {
            Ok(_) => panic!("产出种类不符应失败"),
            Err(err) => err,
        };
        assert!(matches!(
            err,
            ConfigError::InvalidConstructorSignature {
                capability: CapabilityKind::Transport,
                ..
            }
        ));
    }
}
