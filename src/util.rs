// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use crate::param::STATUS_CODES;
use crate::view::ErrorViewContext;

pub struct HtmlBuilder {
    title: String,
    css: String,
    script: String,
    body: String,
}

const BASE_CSS: &str = r"
            body {
                width: 35em;
                margin: 0 auto;
                font-family: Tahoma, Verdana, Arial, sans-serif;
            }
            ";

impl HtmlBuilder {
    /// `note` 会原样嵌入页面，调用方负责转义其中的用户输入
    pub fn from_status_code(code: u16, note: Option<&str>) -> Self {
        let title = format!("{}", code);
        let description = match note {
            Some(n) => n,
            None => STATUS_CODES.get(&code).copied().unwrap_or("Unknown"),
        };
        let body = format!(
            r"
            <h1>{}</h1>
            <p>{}</p>
            ",
            code, description
        );
        Self {
            title,
            css: BASE_CSS.to_string(),
            script: "".to_string(),
            body,
        }
    }

    /// 文件下载失败时展示给用户的页面
    pub fn from_error_view(context: &ErrorViewContext) -> Self {
        let current_path = escape_html(context.current_path());
        let body = format!(
            r#"
            <h1>日志文件</h1>
            <p class="error">{}</p>
            <p>当前文件：<code>{}</code>（偏移量 {}）</p>
            <p><a href="{}">返回日志列表</a></p>
            "#,
            escape_html(context.invalid_path_error()),
            current_path,
            context.viewing_offset(),
            escape_html(context.base_url()),
        );
        let css = [
            BASE_CSS,
            r"
            .error {
                color: #b00020;
            }
            ",
        ]
        .concat();
        Self {
            title: format!("日志下载 - {}", current_path),
            css,
            script: "".to_string(),
            body,
        }
    }

    pub fn build(&self) -> String {
        format!(
            r##"<!DOCTYPE html>
            <!-- 本文件由shaneyale的Rust Logserver自动生成 -->
            <html>
                <head>
                    <meta charset="utf-8">
                    <script>{}</script>
                    <title>{}</title>
                    <style>{}</style>
                </head>
                <body>
                {}
                </body>
            </html>"##,
            self.script, self.title, self.css, self.body
        )
    }
}

pub fn format_file_size(size: u64) -> String {
    let units = ["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < units.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.1} {}", size, units[unit_index])
}

/// 转义 HTML 特殊字符，防止用户输入被当作标记解析
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
