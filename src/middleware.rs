// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 中间件链模块
//!
//! 每个中间件声明一个关联的 `Context` 类型，用来保存它在单个请求中的状态。
//! `Pipeline` 在请求开始时为每个中间件创建一份默认上下文，并按中间件类型
//! 登记在 [`ContextRegistry`] 中，钩子和处理器通过类型取回自己或其他中间件的上下文。
//!
//! ## 执行顺序
//! 1. 按注册顺序调用 `before_handle`。若某个中间件调用了 `Response::end()`，
//!    后续中间件的 `before_handle` 与处理器都会被跳过。
//! 2. 响应未完成时调用处理器。
//! 3. 对所有已经进入过 `before_handle` 的中间件按相反顺序调用 `after_handle`，
//!    包括提前结束响应的那一个。

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
};

use log::debug;

use crate::{request::Request, response::Response};

/// 请求前后执行的钩子
pub trait Middleware: 'static {
    type Context: Default + 'static;

    /// 处理器执行前调用。
    ///
    /// 当前中间件自己的上下文只通过 `ctx` 传入，钩子执行期间它不在 `all` 中，
    /// 因此 `all.get::<Self>()` 总是返回 `None`；`all` 只用于读取其他中间件的上下文。
    fn before_handle(
        &self,
        req: &Request,
        res: &mut Response,
        ctx: &mut Self::Context,
        all: &ContextRegistry,
    );

    /// 处理器执行后调用，`ctx` 与 `all` 的约定同 [`Middleware::before_handle`]。
    fn after_handle(
        &self,
        req: &Request,
        res: &mut Response,
        ctx: &mut Self::Context,
        all: &ContextRegistry,
    );
}

/// 以中间件类型为键的上下文表，生命周期与单个请求相同
#[derive(Default)]
pub struct ContextRegistry {
    contexts: HashMap<TypeId, Box<dyn Any>>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<M: Middleware>(&mut self, ctx: M::Context) {
        self.contexts.insert(TypeId::of::<M>(), Box::new(ctx));
    }

    pub fn get<M: Middleware>(&self) -> Option<&M::Context> {
        self.contexts
            .get(&TypeId::of::<M>())
            .and_then(|boxed| boxed.downcast_ref::<M::Context>())
    }

    pub fn get_mut<M: Middleware>(&mut self) -> Option<&mut M::Context> {
        self.contexts
            .get_mut(&TypeId::of::<M>())
            .and_then(|boxed| boxed.downcast_mut::<M::Context>())
    }

    fn take<M: Middleware>(&mut self) -> Option<M::Context> {
        self.contexts
            .remove(&TypeId::of::<M>())
            .and_then(|boxed| boxed.downcast::<M::Context>().ok())
            .map(|boxed| *boxed)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl fmt::Debug for ContextRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextRegistry")
            .field("contexts", &self.contexts.len())
            .finish()
    }
}

/// 路由处理器。闭包与函数会自动实现该 trait。
#[cfg_attr(test, mockall::automock)]
pub trait Handler {
    fn handle(&self, req: &Request, res: &mut Response, ctx: &mut ContextRegistry);
}

impl<F> Handler for F
where
    F: Fn(&Request, &mut Response, &mut ContextRegistry),
{
    fn handle(&self, req: &Request, res: &mut Response, ctx: &mut ContextRegistry) {
        self(req, res, ctx)
    }
}

// 擦除了上下文类型的中间件，便于放进同一个 Vec
trait Stage: Send + Sync {
    fn prepare(&self, registry: &mut ContextRegistry);
    fn before(&self, req: &Request, res: &mut Response, registry: &mut ContextRegistry);
    fn after(&self, req: &Request, res: &mut Response, registry: &mut ContextRegistry);
}

impl<M> Stage for M
where
    M: Middleware + Send + Sync,
{
    fn prepare(&self, registry: &mut ContextRegistry) {
        registry.insert::<M>(M::Context::default());
    }

    fn before(&self, req: &Request, res: &mut Response, registry: &mut ContextRegistry) {
        // 暂时取出自己的上下文，使其余上下文可以同时以只读方式借出
        let mut ctx = registry.take::<M>().unwrap_or_default();
        self.before_handle(req, res, &mut ctx, registry);
        registry.insert::<M>(ctx);
    }

    fn after(&self, req: &Request, res: &mut Response, registry: &mut ContextRegistry) {
        let mut ctx = registry.take::<M>().unwrap_or_default();
        self.after_handle(req, res, &mut ctx, registry);
        registry.insert::<M>(ctx);
    }
}

/// 按注册顺序组合的中间件链
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<M>(mut self, middleware: M) -> Self
    where
        M: Middleware + Send + Sync,
    {
        self.stages.push(Box::new(middleware));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// 让一个请求依次通过中间件链和处理器，返回生成的响应
    pub fn handle<H>(&self, req: &Request, handler: &H) -> Response
    where
        H: Handler + ?Sized,
    {
        let mut registry = ContextRegistry::new();
        for stage in &self.stages {
            stage.prepare(&mut registry);
        }

        let mut res = Response::new();
        let mut entered = 0;
        for stage in &self.stages {
            stage.before(req, &mut res, &mut registry);
            entered += 1;
            if res.is_completed() {
                debug!(
                    "[ID{}]第{}个中间件提前结束了响应，跳过处理器",
                    req.id(),
                    entered
                );
                break;
            }
        }

        if !res.is_completed() {
            handler.handle(req, &mut res, &mut registry);
        }

        for stage in self.stages[..entered].iter().rev() {
            stage.after(req, &mut res, &mut registry);
        }
        res
    }
}
