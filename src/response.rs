// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use crate::{param::*, util::HtmlBuilder};

use bytes::Bytes;
use chrono::prelude::*;
use log::error;

#[derive(Debug, Clone)]
pub struct Response {
    version: HttpVersion,
    status_code: u16,
    information: String,
    content_type: Option<String>,
    /// 通过原生接口设置的长度，只接受 32 位有符号整数
    content_length: Option<i32>,
    date: DateTime<Utc>,
    server_name: String,
    allow: Option<Vec<HttpRequestMethod>>,
    headers: Vec<(String, String)>,
    content: Option<Bytes>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        Self {
            version: HttpVersion::V1_1,
            status_code: 200,
            information: "OK".to_string(),
            content_type: None,
            content_length: None,
            date: Utc::now(),
            server_name: SERVER_NAME.to_string(),
            allow: None,
            headers: Vec::new(),
            content: None,
        }
    }

    /// 构建状态码对应的错误页面
    pub fn from_status_code(code: u16) -> Self {
        let mut response = Self::new();
        if code == 405 {
            response.allow = Some(ALLOWED_METHODS.to_vec());
        }
        let page = match code {
            400 => HtmlBuilder::from_status_code(
                400,
                Some(r"<h2>噢！</h2><p>服务器无法理解你的请求。</p>"),
            ),
            404 => HtmlBuilder::from_status_code(
                404,
                Some(r"<h2>噢！</h2><p>你指定的网页无法找到。</p>"),
            ),
            405 => HtmlBuilder::from_status_code(
                405,
                Some(r"<h2>噢！</h2><p>日志下载接口仅支持GET方法。</p>"),
            ),
            413 => HtmlBuilder::from_status_code(
                413,
                Some(r"<h2>噢！</h2><p>请求头过大。</p>"),
            ),
            500 => HtmlBuilder::from_status_code(
                500,
                Some(r"<h2>噢！</h2><p>服务器出现了一个内部错误。</p>"),
            ),
            _ => HtmlBuilder::from_status_code(code, None),
        }
        .build();
        response.set_code(code).set_html(&page);
        response
    }

    pub fn set_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self.information = match STATUS_CODES.get(&code) {
            Some(&info) => info.to_string(),
            None => {
                error!("非法的状态码：{}。这条错误说明代码编写出现了错误。", code);
                "Unknown".to_string()
            }
        };
        self
    }

    pub fn set_content_type(&mut self, content_type: &str) -> &mut Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    pub fn set_content_length(&mut self, length: i32) -> &mut Self {
        self.content_length = Some(length);
        self
    }

    /// 追加一个响应头。值中的 CR/LF 会被去掉，避免响应头注入。
    pub fn add_header(&mut self, name: &str, value: &str) -> &mut Self {
        let value: String = value.chars().filter(|c| *c != '\r' && *c != '\n').collect();
        self.headers.push((name.to_string(), value));
        self
    }

    pub fn set_html(&mut self, html: &str) -> &mut Self {
        self.set_content("text/html;charset=utf-8", Bytes::from(html.to_string()))
    }

    pub fn set_json(&mut self, json: Vec<u8>) -> &mut Self {
        self.set_content("application/json", Bytes::from(json))
    }

    fn set_content(&mut self, content_type: &str, content: Bytes) -> &mut Self {
        self.content_type = Some(content_type.to_string());
        // 内存中的页面不会超过 i32 范围
        self.content_length = i32::try_from(content.len()).ok();
        self.content = Some(content);
        self
    }

    /// 序列化状态行与全部响应头（以空行结尾），不包含响应体
    pub fn head_bytes(&self) -> Vec<u8> {
        let version: &str = match self.version {
            HttpVersion::V1_1 => "HTTP/1.1",
        };
        let status_code: &str = &self.status_code.to_string();
        let mut head = [version, " ", status_code, " ", self.information.as_str(), CRLF].concat();
        if let Some(t) = &self.content_type {
            head.push_str(&format!("Content-Type: {}{}", t, CRLF));
        }
        if let Some(len) = self.content_length {
            head.push_str(&format!("Content-Length: {}{}", len, CRLF));
        }
        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}{}", name, value, CRLF));
        }
        head.push_str(&format!("Date: {}{}", format_date(&self.date), CRLF));
        head.push_str(&format!("Server: {}{}", self.server_name, CRLF));
        if let Some(a) = &self.allow {
            let allow_str = a
                .iter()
                .map(|method| method.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            head.push_str(&format!("Allow: {}{}", allow_str, CRLF));
        }
        head.push_str(&format!("Connection: close{}", CRLF));
        head.push_str(CRLF);
        head.into_bytes()
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let mut bytes = self.head_bytes();
        if let Some(c) = &self.content {
            bytes.extend_from_slice(c);
        }
        bytes
    }
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    pub fn content(&self) -> Option<&Bytes> {
        self.content.as_ref()
    }

    /// 按名称（大小写不敏感）查找通过 `add_header` 追加的响应头
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_date(&date), "Fri, 02 Jan 2026 03:04:05 GMT");
    }

    #[test]
    fn test_response_new() {
        let response = Response::new();

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.information(), "OK");
        assert!(response.allow.is_none());
        assert!(response.content().is_none());
    }

    #[test]
    fn test_head_bytes_basic() {
        let response = Response::new();
        let head = String::from_utf8(response.head_bytes()).unwrap();

        assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(head.contains("Server: shaneyale-logserver\r\n"));
        assert!(head.contains("Date: "));
        assert!(head.contains("Connection: close\r\n"));
        assert!(!head.contains("Content-Length"));
        assert!(head.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_head_bytes_download_headers() {
        let mut response = Response::new();
        response
            .set_content_type(OCTET_STREAM)
            .set_content_length(5000)
            .add_header("Content-Disposition", "attachment;filename=master.log");
        let head = String::from_utf8(response.head_bytes()).unwrap();

        assert!(head.contains("Content-Type: application/octet-stream\r\n"));
        assert!(head.contains("Content-Length: 5000\r\n"));
        assert!(head.contains("Content-Disposition: attachment;filename=master.log\r\n"));
    }

    #[test]
    fn test_add_header_strips_crlf() {
        let mut response = Response::new();
        response.add_header("Content-Disposition", "attachment;filename=a\r\nX-Injected: 1");

        assert_eq!(
            response.header("content-disposition"),
            Some("attachment;filename=aX-Injected: 1")
        );
        let head = String::from_utf8(response.head_bytes()).unwrap();
        assert!(!head.contains("\r\nX-Injected"));
    }

    #[test]
    fn test_as_bytes_with_content() {
        let mut response = Response::new();
        response.set_html("Hello");

        let bytes = response.as_bytes();
        let response_str = String::from_utf8_lossy(&bytes);

        assert!(response_str.contains("Content-Type: text/html;charset=utf-8"));
        assert!(response_str.contains("Content-Length: 5"));
        assert!(response_str.ends_with("\r\n\r\nHello"));
    }

    #[test]
    fn test_response_status_code_setter() {
        let mut response = Response::new();
        response.set_code(404);

        assert_eq!(response.status_code(), 404);
        assert_eq!(response.information(), "Not Found");
    }

    #[test]
    fn test_response_unknown_status_code() {
        let mut response = Response::new();
        response.set_code(799);

        assert_eq!(response.status_code(), 799);
        assert_eq!(response.information(), "Unknown");
    }

    #[test]
    fn test_from_status_code_pages() {
        for code in [400, 404, 405, 413, 500] {
            let response = Response::from_status_code(code);
            let bytes = response.as_bytes();
            let response_str = String::from_utf8_lossy(&bytes);
            assert_eq!(response.status_code(), code);
            assert!(response_str.contains("<!DOCTYPE html>"));
        }
    }

    #[test]
    fn test_from_status_code_405_has_allow() {
        let response = Response::from_status_code(405);
        let head = String::from_utf8(response.head_bytes()).unwrap();

        assert!(head.contains("Allow: GET\r\n"));
    }
}
