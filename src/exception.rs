// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了请求在进入中间件链之前以及 Cookie 中间件执行期间可能出现的异常。
//!
//! ## 设计意图
//! - **错误分类**：区分报文解析错误（请求行、编码、版本）与 Cookie 标头的协议错误。
//! - **语义映射**：每个变体都通过 [`Exception::status_code`] 对应到一个拒绝请求时使用的状态码。
//! - **软错误不入此表**：Cookie 字符串中缺少 `=` 的残缺片段只会让分词提前结束，不会被当作异常抛出。

use std::fmt;

/// 请求处理过程中发生的异常类型。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Exception {
    /// 客户端发送的请求字节流无法解析为合法的 UTF-8 字符串。
    RequestIsNotUtf8,
    /// 请求行缺少方法、路径或版本中的某一部分。
    MalformedRequestLine,
    /// 客户端使用了服务器暂不支持的 HTTP 方法。
    UnSupportedRequestMethod,
    /// 客户端使用了服务器不支持的 HTTP 协议版本。
    UnsupportedHttpVersion,
    /// 同一个请求携带了多于一个 `Cookie` 标头。
    /// 中间件会以 `400 Bad Request` 终止该请求，但仍然执行后置钩子。
    DuplicateCookieHeader,
}

use Exception::*;

impl Exception {
    /// 拒绝该请求时应返回的 HTTP 状态码。
    pub fn status_code(&self) -> u16 {
        match self {
            UnSupportedRequestMethod => 405,
            UnsupportedHttpVersion => 505,
            RequestIsNotUtf8 | MalformedRequestLine | DuplicateCookieHeader => 400,
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestIsNotUtf8 => write!(f, "Request bytes can't be parsed in UTF-8"),
            MalformedRequestLine => write!(f, "Malformed request line"),
            UnSupportedRequestMethod => write!(f, "Unsupported request method"),
            UnsupportedHttpVersion => write!(f, "Unsupported HTTP version"),
            DuplicateCookieHeader => write!(f, "More than one Cookie header (400)"),
        }
    }
}
