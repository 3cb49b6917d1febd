// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 请求路径解析模块
//!
//! 将客户端提交的 `path` 参数收敛为 `<安装目录>/logs/` 下的一个文件。
//!
//! 不可信输入中只有最后一个路径段会被保留，目录部分一律丢弃，
//! 因此无论输入是 `../../etc/passwd` 还是 `/etc/passwd`，
//! 得到的目标都只能是日志目录的直接子项。该模块不检查文件是否存在。

use std::path::{Path, PathBuf};

use crate::param::{LOGS_DIR, ROOT_SEPARATOR};

/// 一次下载请求的输入：原始查询参数与进程级的安装目录
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    raw_path: Option<String>,
    base_directory: PathBuf,
}

impl DownloadRequest {
    pub fn new(raw_path: Option<String>, base_directory: impl Into<PathBuf>) -> Self {
        Self {
            raw_path,
            base_directory: base_directory.into(),
        }
    }

    pub fn raw_path(&self) -> Option<&str> {
        self.raw_path.as_deref()
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn resolve(&self) -> ResolvedTarget {
        resolve(self.raw_path(), self.base_directory())
    }
}

/// 解析后的下载目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    absolute_path: PathBuf,
    file_name: String,
}

impl ResolvedTarget {
    pub fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }

    /// 只包含文件名本身，可能为空
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// 把原始参数解析为日志目录下的目标文件。
///
/// 参数为空或缺失时按根分隔符处理，得到空文件名，后续会被当作“文件不存在”。
pub fn resolve(raw_path: Option<&str>, base_directory: &Path) -> ResolvedTarget {
    let raw = match raw_path {
        Some(p) if !p.is_empty() => p,
        _ => ROOT_SEPARATOR,
    };
    let file_name = basename(raw);
    let absolute_path = base_directory.join(LOGS_DIR).join(&file_name);
    ResolvedTarget {
        absolute_path,
        file_name,
    }
}

/// 取出路径的最后一段，`/` 与 `\` 都视为分隔符。
///
/// `.`、`..` 以及含 NUL 的段不是合法的文件名，返回空字符串。
pub fn basename(raw: &str) -> String {
    let trimmed = raw.trim_end_matches(is_separator);
    let segment = trimmed.rsplit(is_separator).next().unwrap_or("");
    match segment {
        "." | ".." => String::new(),
        s if s.contains('\0') => String::new(),
        s => s.to_string(),
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}
