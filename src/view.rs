// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 错误视图模块
//!
//! 请求的日志文件不存在时，下载流程不会返回任何文件内容，
//! 而是把一份 [`ErrorViewContext`] 交给 [`ErrorView`] 渲染成面向用户的页面。
//! 上下文里只出现用户请求的文件名，不会出现服务器上的真实路径。

use log::error;
use serde_derive::Serialize;

use crate::{param::BROWSE_LOGS_URL, response::Response, util::HtmlBuilder};

/// 渲染错误页面所需的上下文
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorViewContext {
    invalid_path_error: String,
    current_path: String,
    download_log_file: bool,
    viewing_offset: u64,
    base_url: String,
}

impl ErrorViewContext {
    /// 请求的文件在日志目录中不存在
    pub fn for_missing_file(requested: &str) -> Self {
        Self {
            invalid_path_error: format!("Error: Invalid file {}", requested),
            current_path: requested.to_string(),
            download_log_file: true,
            viewing_offset: 0,
            base_url: BROWSE_LOGS_URL.to_string(),
        }
    }

    pub fn invalid_path_error(&self) -> &str {
        &self.invalid_path_error
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn download_log_file(&self) -> bool {
        self.download_log_file
    }

    pub fn viewing_offset(&self) -> u64 {
        self.viewing_offset
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// 错误页面渲染器。状态码与页面内容都由渲染器决定。
#[cfg_attr(test, mockall::automock)]
pub trait ErrorView {
    fn render(&self, context: &ErrorViewContext, accept_json: bool) -> Response;
}

/// 默认渲染器：HTML 页面，客户端要求 JSON 时直接输出上下文
#[derive(Debug, Default, Clone, Copy)]
pub struct ViewFileRenderer;

impl ErrorView for ViewFileRenderer {
    fn render(&self, context: &ErrorViewContext, accept_json: bool) -> Response {
        let mut response = Response::new();
        response.set_code(404);
        if accept_json {
            match serde_json::to_vec(context) {
                Ok(json) => {
                    response.set_json(json);
                    return response;
                }
                Err(e) => error!("无法序列化错误视图上下文：{}，改用HTML页面", e),
            }
        }
        response.set_html(&HtmlBuilder::from_error_view(context).build());
        response
    }
}
