// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 日志下载处理器
//!
//! 依次执行路径解析与文件传输；文件不存在时改为转交错误视图，不发送任何文件内容。

use std::io;

use log::{info, warn};

use crate::{
    config::Config,
    resolver::DownloadRequest,
    sink::ResponseSink,
    streamer::{FileSource, FileStreamer, StreamOutcome},
    util::format_file_size,
    view::ErrorViewContext,
};

pub struct DownloadHandler<S: FileSource> {
    streamer: FileStreamer<S>,
}

impl<S: FileSource> DownloadHandler<S> {
    pub fn new(source: S, chunk_size: usize) -> Self {
        Self {
            streamer: FileStreamer::new(source, chunk_size),
        }
    }

    pub fn from_config(config: &Config, source: S) -> Self {
        Self::new(source, config.chunk_size())
    }

    /// 处理一次下载请求。
    ///
    /// 返回 `NotFound` 时响应已经由错误视图写出；其余 I/O 错误原样向上传播。
    pub fn handle<R: ResponseSink>(
        &self,
        request: &DownloadRequest,
        sink: &mut R,
        id: u128,
    ) -> io::Result<StreamOutcome> {
        let target = request.resolve();
        let outcome = self.streamer.stream(&target, sink, id)?;
        match &outcome {
            StreamOutcome::Served(total) => {
                info!(
                    "[ID{}]日志{}下载完成，大小: {}",
                    id,
                    target.file_name(),
                    format_file_size(*total)
                );
            }
            StreamOutcome::NotFound(name) => {
                warn!("[ID{}]请求的日志文件\"{}\"不存在，转交错误视图", id, name);
                sink.forward(ErrorViewContext::for_missing_file(name))?;
            }
        }
        Ok(outcome)
    }
}
