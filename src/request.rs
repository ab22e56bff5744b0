// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求处理模块
//!
//! 负责将 TCP 流中读取的原始字节解析为强类型的 `Request` 结构体。它涵盖了：
//! 1. 请求行（Request-Line）的解析（方法、路径、版本）。
//! 2. 全部标头（Headers）的按序提取，重复出现的标头会各自保留一份，
//!    以便 Cookie 中间件统计 `Cookie` 标头出现的次数。

use crate::{exception::Exception, param::*};
use log::error;

/// 表示一个 HTTP 请求的元数据。
///
/// 该结构体不包含请求体（Body），主要用于中间件链与处理器读取。
#[derive(Debug, Clone)]
pub struct Request {
    /// 全局请求 ID，用于在多线程环境下追踪日志
    id: u128,
    /// HTTP 请求方法（GET, POST 等）
    method: HttpRequestMethod,
    /// 请求的资源路径（包含查询字符串）
    path: String,
    /// HTTP 协议版本
    version: HttpVersion,
    /// 按出现顺序保存的 (名称, 值) 列表
    headers: Vec<(String, String)>,
}

impl Request {
    /// 以给定的方法与路径构造一个不含标头的请求，主要用于测试与程序内调用。
    pub fn new(method: HttpRequestMethod, path: &str) -> Self {
        Self {
            id: 0,
            method,
            path: path.to_string(),
            version: HttpVersion::V1_1,
            headers: Vec::new(),
        }
    }

    /// 追加一个标头，不会覆盖已有的同名标头
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// 从原始字节缓冲区尝试构建 `Request` 实例。
    ///
    /// # 逻辑步骤
    /// 1. 验证编码：确保请求数据是合法的 UTF-8 字符串。
    /// 2. 解析请求行：提取方法、路径和协议版本。
    /// 3. 逐行解析标头，直到遇到空行；缺少 `:` 的行会被忽略。
    ///
    /// # 参数
    /// * `buffer` - 从网络 Socket 读取的原始数据。
    /// * `id` - 全局请求 ID。
    pub fn try_from(buffer: &[u8], id: u128) -> Result<Self, Exception> {
        // 只去掉读缓冲区尾部残留的 0 字节，报文中间的 0 字节原样保留
        let buffer = match buffer.iter().rposition(|&b| b != 0) {
            Some(last) => &buffer[..=last],
            None => &buffer[..0],
        };
        let request_string = match std::str::from_utf8(buffer) {
            Ok(string) => string,
            Err(_) => {
                error!("[ID{}]无法解析HTTP请求", id);
                return Err(Exception::RequestIsNotUtf8);
            }
        };

        let mut request_lines = request_string.split(CRLF);

        // 解析请求行 (e.g., "GET /index.html HTTP/1.1")
        let first_line = request_lines.next().unwrap_or_default();
        let first_line_parts: Vec<&str> = first_line.split(' ').collect();
        if first_line_parts.len() < 3 {
            error!("[ID{}]HTTP请求行格式不正确：{}", id, first_line);
            return Err(Exception::MalformedRequestLine);
        }

        let method_str = first_line_parts[0].to_uppercase();
        let method = match method_str.as_str() {
            "GET" => HttpRequestMethod::Get,
            "HEAD" => HttpRequestMethod::Head,
            "OPTIONS" => HttpRequestMethod::Options,
            "POST" => HttpRequestMethod::Post,
            _ => {
                error!("[ID{}]不支持的HTTP请求方法：{}", id, &method_str);
                return Err(Exception::UnSupportedRequestMethod);
            }
        };

        let version_str = first_line_parts[first_line_parts.len() - 1].to_uppercase();
        let version = match version_str.as_str() {
            "HTTP/1.1" => HttpVersion::V1_1,
            _ => {
                error!("[ID{}]不支持的HTTP协议版本：{}", id, &version_str);
                return Err(Exception::UnsupportedHttpVersion);
            }
        };

        // 路径中可能包含空格，虽然不规范但通过 join 尝试恢复
        let path = first_line_parts[1..first_line_parts.len() - 1].join(" ");

        let mut headers = Vec::new();
        for line in request_lines {
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                headers.push((name.trim().to_string(), value.trim().to_string()));
            }
        }

        Ok(Self {
            id,
            method,
            path,
            version,
            headers,
        })
    }
}

/// 请求头结束标记 `\r\n\r\n` 之后的位置；标记尚未出现时返回 `None`。
///
/// 用于判断从 Socket 读到的字节是否已经包含完整的请求头。
pub fn head_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| pos + 4)
}

// --- Getter 访问器实现 ---

impl Request {
    pub fn id(&self) -> u128 {
        self.id
    }

    pub fn version(&self) -> &HttpVersion {
        &self.version
    }

    /// 获取请求路径（含查询参数）
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    /// 第一个同名标头的值，名称比较不区分大小写
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).next()
    }

    /// 同名标头出现的次数
    pub fn header_count(&self, name: &str) -> usize {
        self.header_values(name).count()
    }

    pub fn header_values<'a, 'b>(&'a self, name: &'b str) -> impl Iterator<Item = &'a str> + 'b
    where
        'a: 'b,
    {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn user_agent(&self) -> &str {
        self.header("User-Agent").unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 验证常规 GET 请求的解析，包括 Path 和 Headers
    #[test]
    fn test_parse_get_request() {
        let request_str = "GET / HTTP/1.1\r\nHost: localhost:7878\r\nUser-Agent: Test-Browser\r\nCookie: a=1; b=2\r\n\r\n";

        let request = Request::try_from(request_str.as_bytes(), 3).unwrap();

        assert_eq!(request.id(), 3);
        assert_eq!(request.method(), HttpRequestMethod::Get);
        assert_eq!(request.path(), "/");
        assert_eq!(request.user_agent(), "Test-Browser");
        assert_eq!(request.header("Cookie"), Some("a=1; b=2"));
        assert_eq!(request.header_count("Cookie"), 1);
    }

    /// 重复出现的 Cookie 标头需要分别保留
    #[test]
    fn test_repeated_cookie_headers_are_counted() {
        let request_str =
            "GET / HTTP/1.1\r\nCookie: a=1\r\nHost: localhost\r\ncookie: b=2\r\n\r\n";

        let request = Request::try_from(request_str.as_bytes(), 0).unwrap();

        assert_eq!(request.header_count("Cookie"), 2);
        let values: Vec<&str> = request.header_values("COOKIE").collect();
        assert_eq!(values, vec!["a=1", "b=2"]);
        assert_eq!(request.header("Cookie"), Some("a=1"));
    }

    /// 空行之后的内容属于请求体，不能被当作标头
    #[test]
    fn test_body_is_not_parsed_as_header() {
        let request_str =
            "POST /submit HTTP/1.1\r\nContent-Length: 9\r\n\r\nCookie: x";

        let request = Request::try_from(request_str.as_bytes(), 0).unwrap();

        assert_eq!(request.method(), HttpRequestMethod::Post);
        assert_eq!(request.header_count("Cookie"), 0);
    }

    #[test]
    fn test_trailing_zero_bytes_are_ignored() {
        let mut buffer = b"GET /a HTTP/1.1\r\nCookie: k=v\r\nCookie: x=y\r\n\r\n".to_vec();
        buffer.resize(1024, 0);

        let request = Request::try_from(&buffer, 0).unwrap();

        assert_eq!(request.path(), "/a");
        assert_eq!(request.header("cookie"), Some("k=v"));
        assert_eq!(request.header_count("cookie"), 2);
    }

    /// 报文中间的 0 字节不能截断后续标头，否则重复的 Cookie 标头会被漏数
    #[test]
    fn test_embedded_zero_byte_keeps_later_headers() {
        let buffer = b"GET / HTTP/1.1\r\nCookie: a=1\r\nX-Pad: \x00junk\r\nCookie: b=2\r\n\r\n";

        let request = Request::try_from(buffer, 0).unwrap();

        assert_eq!(request.header_count("Cookie"), 2);
        assert_eq!(request.header("X-Pad"), Some("\0junk"));
    }

    #[test]
    fn test_all_zero_buffer_is_malformed() {
        let result = Request::try_from(&[0u8; 16], 0);

        assert_eq!(result.unwrap_err(), Exception::MalformedRequestLine);
    }

    #[test]
    fn test_head_end() {
        assert_eq!(head_end(b"GET / HTTP/1.1\r\nHost: a"), None);
        assert_eq!(head_end(b"GET / HTTP/1.1\r\n\r\n"), Some(18));
        assert_eq!(head_end(b"GET / HTTP/1.1\r\n\r\nbody"), Some(18));
        assert_eq!(head_end(b""), None);
    }

    #[test]
    fn test_header_value_with_colon() {
        let request_str = "GET / HTTP/1.1\r\nHost: localhost:7878\r\n\r\n";

        let request = Request::try_from(request_str.as_bytes(), 0).unwrap();

        assert_eq!(request.header("host"), Some("localhost:7878"));
    }

    #[test]
    fn test_unsupported_method() {
        let request_str = "DELETE /resource HTTP/1.1\r\nHost: localhost:7878\r\n\r\n";

        let result = Request::try_from(request_str.as_bytes(), 0);

        assert_eq!(result.unwrap_err(), Exception::UnSupportedRequestMethod);
    }

    #[test]
    fn test_unsupported_http_version() {
        let request_str = "GET / HTTP/2.0\r\nHost: localhost:7878\r\n\r\n";

        let result = Request::try_from(request_str.as_bytes(), 0);

        assert_eq!(result.unwrap_err(), Exception::UnsupportedHttpVersion);
    }

    #[test]
    fn test_malformed_request_line() {
        let result = Request::try_from(b"GET\r\n\r\n", 0);

        assert_eq!(result.unwrap_err(), Exception::MalformedRequestLine);
    }

    #[test]
    fn test_invalid_utf8() {
        let buffer = vec![0xFF, 0xFE, 0xFD];

        let result = Request::try_from(&buffer, 0);

        assert_eq!(result.unwrap_err(), Exception::RequestIsNotUtf8);
    }

    #[test]
    fn test_lowercase_method_and_query_path() {
        let request_str = "get /page?id=123&name=test HTTP/1.1\r\n\r\n";

        let request = Request::try_from(request_str.as_bytes(), 0).unwrap();

        assert_eq!(request.method(), HttpRequestMethod::Get);
        assert_eq!(request.path(), "/page?id=123&name=test");
    }

    #[test]
    fn test_builder() {
        let request = Request::new(HttpRequestMethod::Get, "/")
            .with_header("Cookie", "a=1")
            .with_header("Cookie", "b=2");

        assert_eq!(request.header_count("cookie"), 2);
        assert_eq!(request.user_agent(), "");
    }
}
