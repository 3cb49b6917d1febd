// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求处理模块
//!
//! 负责将 TCP 流中读取的原始字节解析为强类型的 `Request` 结构体：
//! 1. 请求行（Request-Line）的解析（方法、目标、版本）。
//! 2. 常用 HTTP 标头（Headers）的提取。
//! 3. 查询字符串（Query String）的解码，下载接口的 `path` 参数即来源于此。

use crate::{exception::Exception, param::*};
use log::error;
use percent_encoding::percent_decode_str;

/// 表示一个完整的 HTTP 请求元数据。
///
/// 下载接口只接受 GET 请求，因此不保存请求体。
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP 请求方法（GET, POST 等）
    method: HttpRequestMethod,
    /// 请求的资源路径（不含查询字符串）
    path: String,
    /// 解码后的查询参数，保持出现顺序
    query: Vec<(String, String)>,
    /// HTTP 协议版本
    version: HttpVersion,
    /// 客户端标识字符串
    user_agent: String,
    /// 客户端接受的内容类型（MIME）
    accept: Option<String>,
}

impl Request {
    /// 从原始字节缓冲区尝试构建 `Request` 实例。
    ///
    /// # 参数
    /// * `buffer` - 从网络 Socket 读取的原始数据。
    /// * `id` - 全局请求 ID，用于在多线程环境下追踪日志。
    ///
    /// # 错误处理
    /// 如果请求格式不符合 HTTP 规范或使用了不支持的方法/版本，将返回相应的 `Exception`。
    pub fn try_from(buffer: &[u8], id: u128) -> Result<Self, Exception> {
        let request_string = match std::str::from_utf8(buffer) {
            Ok(string) => string,
            Err(_) => {
                error!("[ID{}]无法解析HTTP请求", id);
                return Err(Exception::RequestIsNotUtf8);
            }
        };

        // 只关心请求头部分，空行之后的内容忽略
        let head = match request_string.find("\r\n\r\n") {
            Some(end) => &request_string[..end],
            None => request_string,
        };
        let mut request_lines = head.split(CRLF);

        // 解析请求行 (e.g., "GET /downloadLocal?path=master.log HTTP/1.1")
        let first_line = request_lines.next().unwrap_or("");
        let first_line_parts: Vec<&str> = first_line.split(' ').collect();

        if first_line_parts.len() < 3 {
            error!("[ID{}]HTTP请求行格式不正确：{}", id, first_line);
            return Err(Exception::MalformedRequest);
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

        // 考虑到目标中可能包含空格的情况，虽然不规范但通过 join 尝试恢复
        let target = if first_line_parts.len() == 3 {
            first_line_parts[1].to_string()
        } else {
            first_line_parts[1..first_line_parts.len() - 1].join(" ")
        };
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), parse_query(query)),
            None => (target, Vec::new()),
        };

        let mut user_agent = "".to_string();
        let mut accept = None;
        for line in request_lines {
            let (name, value) = match line.split_once(':') {
                Some(pair) => pair,
                None => continue,
            };
            let value = value.trim();
            if name.eq_ignore_ascii_case("user-agent") {
                user_agent = value.to_string();
            } else if name.eq_ignore_ascii_case("accept") {
                accept = Some(value.to_string());
            }
        }

        Ok(Self {
            method,
            path,
            query,
            version,
            user_agent,
            accept,
        })
    }
}

/// 按 `application/x-www-form-urlencoded` 规则解析查询字符串
fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => (decode_component(name), decode_component(value)),
            None => (decode_component(pair), String::new()),
        })
        .collect()
}

fn decode_component(component: &str) -> String {
    let replaced = component.replace('+', " ");
    percent_decode_str(&replaced).decode_utf8_lossy().into_owned()
}

// --- Getter 访问器实现 ---

impl Request {
    /// 获取 HTTP 协议版本
    pub fn version(&self) -> &HttpVersion {
        &self.version
    }

    /// 获取请求路径（不含查询参数）
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 获取请求方法
    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    /// 获取用户代理字符串
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// 获取客户端接受的文件 MIME 类型
    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }

    /// 客户端是否期望 JSON 格式的响应
    pub fn accepts_json(&self) -> bool {
        self.accept().map_or(false, |a| a.contains("application/json"))
    }

    /// 获取指定名称的查询参数。同名参数出现多次时返回第一个。
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}
