// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了服务器在解析与分发 HTTP 请求时可能遇到的协议级异常。
//!
//! 文件下载过程中的 I/O 错误不在此列：它们以 `std::io::Error` 的形式沿调用链传播，
//! 而“文件不存在”则是 `StreamOutcome::NotFound`，属于正常的处理结果。

use std::fmt;

/// 服务器处理请求过程中发生的异常类型。
///
/// 每个变体都可以通过 [`Exception::status_code`] 映射到返回给客户端的状态码。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Exception {
    /// 客户端发送的请求字节流无法解析为合法的 UTF-8 字符串。
    RequestIsNotUtf8,
    /// 请求行缺少方法、目标或版本中的某一部分。
    MalformedRequest,
    /// 请求头超过了服务器允许的最大长度。
    RequestTooLarge,
    /// 客户端使用了服务器无法识别的 HTTP 方法。
    UnSupportedRequestMethod,
    /// 客户端使用了服务器不支持的 HTTP 协议版本。
    UnsupportedHttpVersion,
    /// 方法可以识别，但当前路由不接受该方法。
    MethodNotAllowed,
    /// 请求的路由不存在。
    RouteNotFound,
}

use Exception::*;

impl Exception {
    /// 该异常对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            RequestIsNotUtf8 | MalformedRequest | UnSupportedRequestMethod
            | UnsupportedHttpVersion => 400,
            RequestTooLarge => 413,
            MethodNotAllowed => 405,
            RouteNotFound => 404,
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestIsNotUtf8 => write!(f, "Request bytes can't be parsed in UTF-8"),
            MalformedRequest => write!(f, "Malformed request line"),
            RequestTooLarge => write!(f, "Request head is too large (413)"),
            UnSupportedRequestMethod => write!(f, "Unsupported request method"),
            UnsupportedHttpVersion => write!(f, "Unsupported HTTP version"),
            MethodNotAllowed => write!(f, "Method not allowed (405)"),
            RouteNotFound => write!(f, "Route not found (404)"),
        }
    }
}

impl std::error::Error for Exception {}
