//! 构造器的泛型层与对象层。
//!
//! # 教案级注释
//! - **意图 (Why)**：
//!   - 绝大多数构造器是普通闭包或函数，参数类型在编译期已知，走泛型层 [`ConstructorFn`]；
//!   - 插件或脚本构造器的形状只在运行时可知，走对象层 [`DynConstructor`]，自报 [`Signature`]；
//! - **逻辑 (How)**：[`TypedConstructor`] 把泛型层适配为对象层，解析器只面对对象层一种形态；
//! - **契约 (What)**：两层语义等价。泛型层的签名恒为 `[能力, 错误]`，因此不会出现返回形态错误；
//!   对象层的签名由实现方负责，解析器会逐项校验。

use std::{fmt, marker::PhantomData, sync::Arc};

use spark_p2p::{StreamMuxer, Transport};

use crate::{
    capability::{Built, Capability, CapabilityKind, Constructed, MuxerCapability, TransportCapability},
    error::BoxError,
    role::{Role, RoleArgs, RoleParam},
};

/// 构造器返回值中的一项。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReturnKind {
    /// 某种能力的实例。
    Capability(CapabilityKind),
    /// 错误值。
    Error,
    /// 其它类型，携带类型名。
    Other(&'static str),
}

impl fmt::Display for ReturnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnKind::Capability(kind) => write!(f, "{kind}"),
            ReturnKind::Error => f.write_str("error"),
            ReturnKind::Other(name) => f.write_str(name),
        }
    }
}

/// 构造器自报的形状：有序参数角色与有序返回项。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Role>,
    returns: Vec<ReturnKind>,
}

impl Signature {
    pub fn new(params: Vec<Role>, returns: Vec<ReturnKind>) -> Self {
        Self { params, returns }
    }

    pub fn params(&self) -> &[Role] {
        &self.params
    }

    pub fn returns(&self) -> &[ReturnKind] {
        &self.returns
    }
}

/// 对象层构造器。
///
/// # 契约说明（What）
/// - `signature` 必须是纯函数，多次调用返回相同结果；解析阶段只调用它；
/// - `invoke` 收到的实参顺序与 `signature().params()` 一致；
/// - 返回的 [`Built`] 种类应与签名中声明的能力一致，否则调用时报告签名错误。
pub trait DynConstructor: Send + Sync + 'static {
    /// 构造器形状。
    fn signature(&self) -> Signature;

    /// 以有序实参调用构造器。
    fn invoke(&self, args: RoleArgs) -> Result<Built, BoxError>;
}

/// 泛型层构造器：参数均为角色类型、返回 `Result<T, E>` 的函数。
///
/// `Args` 是参数类型元组，仅用于区分不同元数的实现，调用方无需手写。
pub trait ConstructorFn<C: Capability, Args>: Send + Sync + 'static {
    /// 参数角色，按声明顺序。
    fn params() -> Vec<Role>;

    /// 依次取出实参并调用。
    fn call(&self, args: &mut RoleArgs) -> Result<Built, BoxError>;
}

macro_rules! impl_constructor_fn {
    ($($arg:ident $value:ident),*) => {
        impl<C, F, T, E, $($arg,)*> ConstructorFn<C, ($($arg,)*)> for F
        where
            C: Capability,
            F: Fn($($arg),*) -> Result<T, E> + Send + Sync + 'static,
            T: Constructed<C>,
            E: Into<BoxError>,
            $($arg: RoleParam,)*
        {
            fn params() -> Vec<Role> {
                vec![$(<$arg as RoleParam>::ROLE),*]
            }

            #[allow(unused_variables)]
            fn call(&self, args: &mut RoleArgs) -> Result<Built, BoxError> {
                $(let $value = args.take::<$arg>()?;)*
                (self)($($value),*)
                    .map(Constructed::into_built)
                    .map_err(Into::into)
            }
        }
    };
}

impl_constructor_fn!();
impl_constructor_fn!(A1 a1);
impl_constructor_fn!(A1 a1, A2 a2);
impl_constructor_fn!(A1 a1, A2 a2, A3 a3);
impl_constructor_fn!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_constructor_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_constructor_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_constructor_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
impl_constructor_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);
impl_constructor_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8, A9 a9);
impl_constructor_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8, A9 a9, A10 a10);
impl_constructor_fn!(
    A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8, A9 a9, A10 a10, A11 a11
);

/// 将泛型层构造器适配为对象层实现。
pub struct TypedConstructor<F, C, Args> {
    inner: F,
    _marker: PhantomData<fn() -> (C, Args)>,
}

impl<F, C, Args> TypedConstructor<F, C, Args>
where
    F: ConstructorFn<C, Args>,
    C: Capability,
{
    /// 包装泛型层构造器。
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }
}

impl<F, C, Args> DynConstructor for TypedConstructor<F, C, Args>
where
    F: ConstructorFn<C, Args>,
    C: Capability,
    Args: 'static,
{
    fn signature(&self) -> Signature {
        Signature::new(
            F::params(),
            vec![ReturnKind::Capability(C::KIND), ReturnKind::Error],
        )
    }

    fn invoke(&self, mut args: RoleArgs) -> Result<Built, BoxError> {
        self.inner.call(&mut args)
    }
}

/// 调用方提供的原始构造器。
///
/// # 教案式说明
/// - **意图（Why）**：注册入口接受“现成实例”与“构造器”两种形态，统一为一个枚举后再交给解析器；
/// - **契约（What）**：`Transport`/`Muxer` 变体会被原样共享给所有使用方，不会被复制或重新构造。
#[derive(Clone)]
pub enum RawConstructor {
    /// 现成的传输实例。
    Transport(Arc<dyn Transport>),
    /// 现成的多路复用器实例。
    Muxer(Arc<dyn StreamMuxer>),
    /// 待调用的构造器。
    Callable(Arc<dyn DynConstructor>),
}

impl RawConstructor {
    /// 以现成传输实例构造。
    pub fn transport<T: Transport>(transport: T) -> Self {
        Self::Transport(Arc::new(transport))
    }

    /// 以现成多路复用器实例构造。
    pub fn muxer<M: StreamMuxer>(muxer: M) -> Self {
        Self::Muxer(Arc::new(muxer))
    }

    /// 以返回传输的泛型层构造器构造。
    pub fn transport_fn<F, Args>(constructor: F) -> Self
    where
        F: ConstructorFn<TransportCapability, Args>,
        Args: 'static,
    {
        Self::Callable(Arc::new(TypedConstructor::new(constructor)))
    }

    /// 以返回多路复用器的泛型层构造器构造。
    pub fn muxer_fn<F, Args>(constructor: F) -> Self
    where
        F: ConstructorFn<MuxerCapability, Args>,
        Args: 'static,
    {
        Self::Callable(Arc::new(TypedConstructor::new(constructor)))
    }

    /// 以对象层构造器构造。
    pub fn dynamic<D: DynConstructor>(constructor: D) -> Self {
        Self::Callable(Arc::new(constructor))
    }

    /// 形态描述，用于错误信息。
    pub fn describe(&self) -> &'static str {
        match self {
            RawConstructor::Transport(_) => "prebuilt transport",
            RawConstructor::Muxer(_) => "prebuilt muxer",
            RawConstructor::Callable(_) => "constructor",
        }
    }
}

impl From<Arc<dyn Transport>> for RawConstructor {
    fn from(transport: Arc<dyn Transport>) -> Self {
        Self::Transport(transport)
    }
}

impl From<Arc<dyn StreamMuxer>> for RawConstructor {
    fn from(muxer: Arc<dyn StreamMuxer>) -> Self {
        Self::Muxer(muxer)
    }
}

impl From<Arc<dyn DynConstructor>> for RawConstructor {
    fn from(constructor: Arc<dyn DynConstructor>) -> Self {
        Self::Callable(constructor)
    }
}

impl fmt::Debug for RawConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawConstructor::Callable(constructor) => f
                .debug_tuple("Callable")
                .field(&constructor.signature())
                .finish(),
            other => f.write_str(other.describe()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::RoleValue;
    use spark_p2p::{MplexMuxer, PeerId, TcpTransport, Upgrader};
    use std::convert::Infallible;

    #[test]
    fn typed_signature_lists_roles_in_declaration_order() {
        let raw = RawConstructor::transport_fn(|u: Upgrader, _id: PeerId| {
            Ok::<_, Infallible>(TcpTransport::new(u))
        });
        let RawConstructor::Callable(constructor) = raw else {
            panic!("闭包应注册为构造器");
        };
        let signature = constructor.signature();
        assert_eq!(signature.params(), &[Role::Upgrader, Role::PeerId]);
        assert_eq!(
            signature.returns(),
            &[
                ReturnKind::Capability(CapabilityKind::Transport),
                ReturnKind::Error
            ]
        );
    }

    #[test]
    fn typed_invoke_surfaces_argument_mismatch() {
        let raw = RawConstructor::muxer_fn(|_id: PeerId| Ok::<_, Infallible>(MplexMuxer));
        let RawConstructor::Callable(constructor) = raw else {
            panic!("闭包应注册为构造器");
        };
        let err = constructor
            .invoke(RoleArgs::new(vec![]))
            .expect_err("缺少实参应失败");
        assert!(err.to_string().contains("peer_id"));

        let built = constructor
            .invoke(RoleArgs::new(vec![RoleValue::PeerId(PeerId::new("p"))]))
            .expect("实参齐全应成功");
        assert_eq!(built.kind(), CapabilityKind::Muxer);
    }

    #[test]
    fn zero_argument_constructor_is_supported() {
        let raw = RawConstructor::muxer_fn(|| Ok::<_, Infallible>(MplexMuxer));
        let RawConstructor::Callable(constructor) = raw else {
            panic!("闭包应注册为构造器");
        };
        assert!(constructor.signature().params().is_empty());
    }
}
