// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use chrono::{DateTime, Utc};

use crate::param::{HTTP_DATE_FORMAT, STATUS_CODES};

/// 将 UTC 时间格式化为 HTTP-date，例如 `Wed, 21 Oct 2015 07:28:00 GMT`。
///
/// 调用方负责传入 UTC 时间，这里不做任何时区换算。
pub fn http_date(date: &DateTime<Utc>) -> String {
    date.format(HTTP_DATE_FORMAT).to_string()
}

/// 跳过 `pos` 处开始的一段连续空格（仅 `' '`，不含制表符），返回第一个非空格的位置。
pub(crate) fn skip_spaces(text: &str, mut pos: usize) -> usize {
    let bytes = text.as_bytes();
    while pos < bytes.len() && bytes[pos] == b' ' {
        pos += 1;
    }
    pos
}

/// 生成错误状态码对应的简易 HTML 页面
pub fn status_page(code: u16) -> String {
    let description = STATUS_CODES.get(&code).copied().unwrap_or("Unknown Status");
    format!(
        r"<!DOCTYPE html>
<html>
<head><title>{code}</title></head>
<body>
<h1>{code}</h1>
<p>{description}</p>
</body>
</html>"
    )
}
