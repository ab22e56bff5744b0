// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Cookie 标头解析模块
//!
//! 负责把请求中唯一一个 `Cookie` 标头的原始值切分为 `名称 -> 值` 的映射（Jar）。
//!
//! ## 解析规则
//! 1. 从当前位置寻找下一个 `=`，找不到则结束，剩余文本被静默丢弃。
//! 2. `=` 之前的部分去除首尾空白后作为名称。
//! 3. 跳过 `=` 之后连续的空格；若此时已到结尾，记录空值并结束。
//! 4. 取到下一个 `;`（或结尾）为止的内容并去除首尾空白作为值，
//!    若被一对双引号包裹则去掉这对引号，内部内容不做反转义。
//! 5. 同名 Cookie 只保留第一次出现的值。
//!
//! 解析过程不会失败：残缺的片段只会让循环提前结束，已解析的键值对全部保留。

use crate::util::skip_spaces;

/// 单个请求范围内的 Cookie 映射，保持插入顺序。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    entries: Vec<(String, String)>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析 `Cookie` 标头的值
    pub fn parse(header: &str) -> Self {
        let mut jar = Self::new();
        let len = header.len();
        let mut pos = 0;

        while pos < len {
            let pos_equal = match header[pos..].find('=') {
                Some(offset) => pos + offset,
                None => break,
            };
            let name = header[pos..pos_equal].trim();

            pos = skip_spaces(header, pos_equal + 1);
            if pos == len {
                // `name=` 位于末尾
                jar.insert(name, "");
                break;
            }

            let pos_semicolon = header[pos..].find(';').map(|offset| pos + offset);
            let value = header[pos..pos_semicolon.unwrap_or(len)].trim();
            jar.insert(name, strip_quotes(value));

            match pos_semicolon {
                Some(semicolon) => pos = skip_spaces(header, semicolon + 1),
                None => break,
            }
        }

        jar
    }

    /// 插入键值对；名称已存在时保持原值不变
    pub fn insert(&mut self, name: &str, value: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.entries.push((name.to_string(), value.to_string()));
        true
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按插入顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

fn strip_quotes(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
