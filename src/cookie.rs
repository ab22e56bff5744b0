// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 下发 Cookie 模块
//!
//! `Cookie` 是一个可变的链式构建器，描述一条即将写入 `Set-Cookie` 标头的 Cookie。
//! 每个属性设置方法都就地修改并返回 `&mut Self`，因此可以以任意顺序连续调用，
//! 同一属性重复设置时以最后一次为准。
//!
//! 序列化由 [`Cookie::format`] 完成，属性按固定顺序输出：
//! `Expires`、`Max-Age`、`Domain`、`Path`、`Secure`、`HttpOnly`、`SameSite`。
//! 与调用顺序无关。
//!
//! 本模块不对名称或属性值做任何字符校验或转义。

use chrono::{DateTime, Duration, Utc};

use std::fmt;

use crate::{param::COOKIE_DIVIDER, util::http_date};

/// `SameSite` 属性的三种取值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cookie {
    name: String,
    value: String,
    expires_at: Option<DateTime<Utc>>,
    max_age: Option<i64>,
    // 空字符串表示未设置
    domain: String,
    path: String,
    secure: bool,
    httponly: bool,
    same_site: Option<SameSite>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expires_at: None,
            max_age: None,
            domain: String::new(),
            path: String::new(),
            secure: false,
            httponly: false,
            same_site: None,
        }
    }

    /// `Expires` 属性，必须是 UTC 时间
    pub fn expires(&mut self, at: DateTime<Utc>) -> &mut Self {
        self.expires_at = Some(at);
        self
    }

    /// `Max-Age` 属性，单位为秒，允许为负
    pub fn max_age(&mut self, seconds: i64) -> &mut Self {
        self.max_age = Some(seconds);
        self
    }

    /// 以时间段设置 `Max-Age`，不足一秒的部分被截断
    pub fn max_age_duration(&mut self, duration: Duration) -> &mut Self {
        self.max_age(duration.num_seconds())
    }

    pub fn domain(&mut self, domain: impl Into<String>) -> &mut Self {
        self.domain = domain.into();
        self
    }

    pub fn path(&mut self, path: impl Into<String>) -> &mut Self {
        self.path = path.into();
        self
    }

    pub fn secure(&mut self) -> &mut Self {
        self.secure = true;
        self
    }

    pub fn httponly(&mut self) -> &mut Self {
        self.httponly = true;
        self
    }

    pub fn same_site(&mut self, policy: SameSite) -> &mut Self {
        self.same_site = Some(policy);
        self
    }

    /// 生成 `Set-Cookie` 标头的值。
    ///
    /// 空值会输出为 `""`，其余内容原样写出。对同一个未修改的 `Cookie`
    /// 多次调用得到的字符串完全相同。
    pub fn format(&self) -> String {
        let mut segments = Vec::with_capacity(8);
        if self.value.is_empty() {
            segments.push(format!("{}=\"\"", self.name));
        } else {
            segments.push(format!("{}={}", self.name, self.value));
        }
        if let Some(at) = &self.expires_at {
            segments.push(format!("Expires={}", http_date(at)));
        }
        if let Some(age) = self.max_age {
            segments.push(format!("Max-Age={}", age));
        }
        if !self.domain.is_empty() {
            segments.push(format!("Domain={}", self.domain));
        }
        if !self.path.is_empty() {
            segments.push(format!("Path={}", self.path));
        }
        if self.secure {
            segments.push("Secure".to_string());
        }
        if self.httponly {
            segments.push("HttpOnly".to_string());
        }
        if let Some(policy) = self.same_site {
            segments.push(format!("SameSite={}", policy));
        }
        segments.join(COOKIE_DIVIDER)
    }
}

// --- Getter 访问器实现 ---

impl Cookie {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> Option<&DateTime<Utc>> {
        self.expires_at.as_ref()
    }

    pub fn get_max_age(&self) -> Option<i64> {
        self.max_age
    }

    pub fn get_domain(&self) -> &str {
        &self.domain
    }

    pub fn get_path(&self) -> &str {
        &self.path
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn is_httponly(&self) -> bool {
        self.httponly
    }

    pub fn get_same_site(&self) -> Option<SameSite> {
        self.same_site
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_name_value_only() {
        let cookie = Cookie::new("a", "1");
        assert_eq!(cookie.format(), "a=1");
    }

    #[test]
    fn test_format_empty_value_is_quoted() {
        let cookie = Cookie::new("token", "");
        assert_eq!(cookie.format(), "token=\"\"");
    }

    #[test]
    fn test_flags_in_fixed_order() {
        let mut cookie = Cookie::new("session", "abc");
        cookie.same_site(SameSite::Lax).httponly().secure();
        assert_eq!(cookie.format(), "session=abc; Secure; HttpOnly; SameSite=Lax");

        let mut other = Cookie::new("session", "abc");
        other.secure().httponly().same_site(SameSite::Lax);
        assert_eq!(other.format(), cookie.format());
    }

    #[test]
    fn test_all_attributes() {
        let expires = Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap();
        let mut cookie = Cookie::new("id", "a3fWa");
        cookie
            .same_site(SameSite::Strict)
            .path("/docs")
            .domain("example.com")
            .max_age(2592000)
            .expires(expires)
            .httponly()
            .secure();
        assert_eq!(
            cookie.format(),
            "id=a3fWa; Expires=Wed, 21 Oct 2015 07:28:00 GMT; Max-Age=2592000; \
             Domain=example.com; Path=/docs; Secure; HttpOnly; SameSite=Strict"
        );
    }

    #[test]
    fn test_latest_write_wins() {
        let mut cookie = Cookie::new("a", "1");
        cookie.domain("a.com").domain("b.com").same_site(SameSite::Strict);
        cookie.same_site(SameSite::None).max_age(10).max_age(-1);
        assert_eq!(cookie.format(), "a=1; Max-Age=-1; Domain=b.com; SameSite=None");
    }

    #[test]
    fn test_max_age_duration_truncates() {
        let mut cookie = Cookie::new("a", "1");
        cookie.max_age_duration(Duration::milliseconds(90_999));
        assert_eq!(cookie.get_max_age(), Some(90));
        assert_eq!(cookie.format(), "a=1; Max-Age=90");
    }

    #[test]
    fn test_format_is_idempotent() {
        let mut cookie = Cookie::new("n", "v");
        cookie.path("/").secure();
        let first = cookie.format();
        assert_eq!(first, cookie.format());
        assert_eq!(first, cookie.to_string());
    }

    #[test]
    fn test_no_escaping_of_values() {
        let mut cookie = Cookie::new("a", "x y;z");
        cookie.path("/has space");
        assert_eq!(cookie.format(), "a=x y;z; Path=/has space");
    }

    #[test]
    fn test_accessors() {
        let mut cookie = Cookie::new("name", String::from("value"));
        cookie.domain("example.org").httponly();
        assert_eq!(cookie.name(), "name");
        assert_eq!(cookie.value(), "value");
        assert_eq!(cookie.get_domain(), "example.org");
        assert_eq!(cookie.get_path(), "");
        assert!(cookie.is_httponly());
        assert!(!cookie.is_secure());
        assert!(cookie.expires_at().is_none());
        assert_eq!(cookie.get_same_site(), None);
    }
}
