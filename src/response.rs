// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use crate::{
    param::*,
    util::{http_date, status_page},
};

use bytes::Bytes;
use chrono::prelude::*;
use log::error;

#[derive(Debug, Clone)]
pub struct Response {
    version: HttpVersion,
    status_code: u16,
    information: String,
    content_type: Option<String>,
    date: DateTime<Utc>,
    server_name: String,
    // 附加标头按写入顺序保存，同名标头各占一行
    headers: Vec<(String, String)>,
    content: Option<Bytes>,
    completed: bool,
}

impl Response {
    pub fn new() -> Self {
        Self {
            version: HttpVersion::V1_1,
            status_code: 200,
            information: "OK".to_string(),
            content_type: None,
            date: Utc::now(),
            server_name: SERVER_NAME.to_string(),
            headers: Vec::new(),
            content: None,
            completed: false,
        }
    }

    /// 构造一个带有简易 HTML 页面的错误响应
    pub fn from_status_code(code: u16) -> Self {
        let mut response = Self::new();
        response.set_code(code);
        response.set_body("text/html;charset=utf-8", status_page(code));
        response
    }

    pub fn set_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self.information = match STATUS_CODES.get(&code) {
            Some(&phrase) => phrase.to_string(),
            None => {
                error!("非法的状态码：{}。这条错误说明代码编写出现了错误。", code);
                String::new()
            }
        };
        self
    }

    /// 追加一个标头。同名标头不会被合并，每次调用都会多出独立的一行。
    pub fn add_header(&mut self, name: &str, value: &str) -> &mut Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn set_body(&mut self, content_type: &str, content: impl Into<Bytes>) -> &mut Self {
        self.content_type = Some(content_type.to_string());
        self.content = Some(content.into());
        self
    }

    fn set_date(&mut self) -> &mut Self {
        self.date = Utc::now();
        self
    }

    /// 标记响应已经完成。中间件链会跳过处理器，但已进入的中间件的后置钩子仍会执行。
    pub fn end(&mut self) -> &mut Self {
        self.completed = true;
        self
    }

    pub fn as_bytes(&mut self) -> Vec<u8> {
        self.set_date();
        let content: &[u8] = match &self.content {
            Some(c) => c,
            None => b"",
        };

        let mut header = format!(
            "{} {} {}{}",
            self.version, self.status_code, self.information, CRLF
        );
        if let Some(t) = &self.content_type {
            header.push_str(&["Content-Type: ", t, CRLF].concat());
        }
        header.push_str(&format!("Content-Length: {}{}", content.len(), CRLF));
        header.push_str(&["Date: ", &http_date(&self.date), CRLF].concat());
        header.push_str(&["Server: ", &self.server_name, CRLF].concat());
        for (name, value) in &self.headers {
            header.push_str(&[name.as_str(), ": ", value.as_str(), CRLF].concat());
        }
        header.push_str(CRLF);

        [header.as_bytes(), content].concat()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn has_body(&self) -> bool {
        self.content.is_some()
    }

    /// 所有同名标头的值，按写入顺序排列
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }
}
