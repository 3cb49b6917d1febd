// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! 该模块集中定义日志下载服务使用的常量和协议相关的数据结构，包括：
//! - 路由、查询参数名与日志目录名。
//! - 常见的 HTTP 状态码及其原因短语（Reason Phrase）。
//! - HTTP 方法与版本的强类型枚举。

use lazy_static::lazy_static;
use std::collections::HashMap;

/// 服务器名称标识，用于 HTTP 响应头的 `Server` 字段
pub const SERVER_NAME: &str = "shaneyale-logserver";

/// HTTP 协议规定的换行符（Carriage Return Line Feed）
pub const CRLF: &str = "\r\n";

/// 日志下载接口的路由
pub const DOWNLOAD_ROUTE: &str = "/downloadLocal";

/// 下载接口读取的查询参数名
pub const PATH_PARAM: &str = "path";

/// 安装目录下存放日志的子目录
pub const LOGS_DIR: &str = "logs";

/// 未配置安装目录时使用的默认值
pub const DEFAULT_HOME: &str = "/opt/logserver";

/// 查询参数缺失时使用的根分隔符，经过文件名提取后得到空文件名
pub const ROOT_SEPARATOR: &str = "/";

/// 下载响应使用的通用二进制类型
pub const OCTET_STREAM: &str = "application/octet-stream";

/// 错误页面中“返回日志浏览”链接的地址
pub const BROWSE_LOGS_URL: &str = "./browseLogs";

/// 请求头（请求行 + 各标头）允许的最大字节数
pub const MAX_REQUEST_HEAD: usize = 8192;

lazy_static! {
    /// 下载路由允许的 HTTP 方法列表，用于 405 响应的 `Allow` 头。
    pub static ref ALLOWED_METHODS: Vec<HttpRequestMethod> = vec![HttpRequestMethod::Get];
}

lazy_static! {
    /// HTTP 状态码与其对应的标准原因短语映射表。
    ///
    /// 参考标准：[RFC 9110: HTTP Semantics](https://www.rfc-editor.org/rfc/rfc9110.html)。
    pub static ref STATUS_CODES: HashMap<u16, &'static str> = {
        let mut map = HashMap::new();
        // 2xx: 成功响应 (Successful)
        map.insert(200, "OK");
        map.insert(204, "No Content");

        // 4xx: 客户端错误 (Client Error)
        map.insert(400, "Bad Request");
        map.insert(403, "Forbidden");
        map.insert(404, "Not Found");
        map.insert(405, "Method Not Allowed");
        map.insert(408, "Request Timeout");
        map.insert(413, "Content Too Large");
        map.insert(414, "URI Too Long");

        // 5xx: 服务端错误 (Server Error)
        map.insert(500, "Internal Server Error");
        map.insert(503, "Service Unavailable");
        map.insert(505, "HTTP Version Not Supported");
        map
    };
}

/// 支持的 HTTP 协议版本
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpVersion {
    /// HTTP/1.1 版本
    V1_1,
}

/// 标准 HTTP 请求方法
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpRequestMethod {
    /// 获取资源
    Get,
    /// 获取资源的元数据（不包含响应体）
    Head,
    /// 查询服务器支持的选项
    Options,
    /// 提交数据或执行操作
    Post,
}

use std::fmt;

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpVersion::V1_1 => write!(f, "1.1"),
        }
    }
}

impl fmt::Display for HttpRequestMethod {
    /// 将枚举格式化为 HTTP 标准大写方法名
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpRequestMethod::Get => write!(f, "GET"),
            HttpRequestMethod::Head => write!(f, "HEAD"),
            HttpRequestMethod::Options => write!(f, "OPTIONS"),
            HttpRequestMethod::Post => write!(f, "POST"),
        }
    }
}
