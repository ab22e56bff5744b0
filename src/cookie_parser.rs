// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Cookie 中间件
//!
//! - `before_handle`：统计 `Cookie` 标头的数量。没有则保持空 Jar；恰好一个则解析；
//!   多于一个时以 `400 Bad Request` 结束响应，处理器不会被调用。
//! - `after_handle`：把处理器通过 [`CookieContext::set_cookie`] 添加的 Cookie
//!   按添加顺序逐个写成独立的 `Set-Cookie` 标头。

use log::{debug, warn};

use crate::{
    cookie::Cookie,
    exception::Exception,
    jar::CookieJar,
    middleware::{ContextRegistry, Middleware},
    param::{COOKIE, SET_COOKIE},
    request::Request,
    response::Response,
};

/// 单个请求内的 Cookie 状态
#[derive(Debug, Default)]
pub struct CookieContext {
    jar: CookieJar,
    cookies_to_add: Vec<Cookie>,
}

impl CookieContext {
    /// 读取请求中的 Cookie。名称不存在时返回空字符串，与值本身为空无法区分。
    pub fn get_cookie(&self, name: &str) -> &str {
        self.jar.get(name).unwrap_or("")
    }

    /// 添加一条待下发的 Cookie，返回其可变引用以便继续链式设置属性
    pub fn set_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Cookie {
        self.cookies_to_add.push(Cookie::new(name, value));
        let last = self.cookies_to_add.len() - 1;
        &mut self.cookies_to_add[last]
    }

    pub fn jar(&self) -> &CookieJar {
        &self.jar
    }

    pub fn cookies_to_add(&self) -> &[Cookie] {
        &self.cookies_to_add
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CookieParser;

impl CookieParser {
    pub fn new() -> Self {
        Self
    }

    fn load_jar(req: &Request) -> Result<CookieJar, Exception> {
        match req.header_count(COOKIE) {
            0 => Ok(CookieJar::new()),
            1 => Ok(req.header(COOKIE).map(CookieJar::parse).unwrap_or_default()),
            _ => Err(Exception::DuplicateCookieHeader),
        }
    }
}

impl Middleware for CookieParser {
    type Context = CookieContext;

    fn before_handle(
        &self,
        req: &Request,
        res: &mut Response,
        ctx: &mut CookieContext,
        _all: &ContextRegistry,
    ) {
        match Self::load_jar(req) {
            Ok(jar) => ctx.jar = jar,
            Err(e) => {
                warn!(
                    "[ID{}]收到{}个Cookie标头，拒绝请求：{}",
                    req.id(),
                    req.header_count(COOKIE),
                    e
                );
                res.set_code(e.status_code()).end();
            }
        }
    }

    fn after_handle(
        &self,
        req: &Request,
        res: &mut Response,
        ctx: &mut CookieContext,
        _all: &ContextRegistry,
    ) {
        for cookie in &ctx.cookies_to_add {
            res.add_header(SET_COOKIE, &cookie.format());
        }
        if !ctx.cookies_to_add.is_empty() {
            debug!(
                "[ID{}]写入{}个Set-Cookie标头",
                req.id(),
                ctx.cookies_to_add.len()
            );
        }
    }
}
