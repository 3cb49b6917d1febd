// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 响应输出模块
//!
//! 下载逻辑不直接操作 Socket，而是通过 [`ResponseSink`] 设置响应头、获取响应体通道，
//! 或把请求转交给错误视图。[`HttpResponseSink`] 是面向真实连接的实现，
//! 测试中可以替换为记录调用顺序的桩对象。

use std::{
    io::{self, ErrorKind, Write},
    net::{Shutdown, TcpStream},
    sync::Arc,
};

use log::debug;

use crate::{
    response::Response,
    view::{ErrorView, ErrorViewContext},
};

/// 可以显式关闭的写通道
pub trait WriteChannel: Write {
    fn close(&mut self) -> io::Result<()>;
}

impl WriteChannel for TcpStream {
    /// 关闭写半部，客户端据此得知响应体结束
    fn close(&mut self) -> io::Result<()> {
        match self.shutdown(Shutdown::Write) {
            Err(e) if e.kind() == ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}

impl WriteChannel for Vec<u8> {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// 先 flush 再 close。flush 失败时仍然会 close，返回第一个错误。
pub fn release_channel<W: WriteChannel + ?Sized>(channel: &mut W) -> io::Result<()> {
    let flushed = channel.flush();
    let closed = channel.close();
    flushed.and(closed)
}

/// 下载处理过程面对的响应抽象
pub trait ResponseSink {
    type Body: WriteChannel;

    fn set_content_type(&mut self, content_type: &str);

    /// 原生长度接口，只能表示 32 位有符号整数
    fn set_content_length(&mut self, length: i32);

    fn add_header(&mut self, name: &str, value: &str);

    /// 提交响应头并取得响应体通道，只能调用一次
    fn body(&mut self) -> io::Result<Self::Body>;

    /// 放弃下载，由错误视图生成完整响应
    fn forward(&mut self, context: ErrorViewContext) -> io::Result<()>;
}

/// 基于真实连接的响应实现
pub struct HttpResponseSink<W: WriteChannel> {
    id: u128,
    response: Response,
    channel: Option<W>,
    view: Arc<dyn ErrorView + Send + Sync>,
    accept_json: bool,
}

impl<W: WriteChannel> HttpResponseSink<W> {
    pub fn new(
        channel: W,
        view: Arc<dyn ErrorView + Send + Sync>,
        accept_json: bool,
        id: u128,
    ) -> Self {
        Self {
            id,
            response: Response::new(),
            channel: Some(channel),
            view,
            accept_json,
        }
    }

    /// 已经累积的响应（状态行与响应头）
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// 响应头是否已经写出（或已转交错误视图）
    pub fn is_committed(&self) -> bool {
        self.channel.is_none()
    }

    /// 在尚未提交时以状态码页面结束响应，用于下载过程中的意外错误
    pub fn send_status(&mut self, code: u16) -> io::Result<()> {
        let mut channel = self.take_channel()?;
        self.response = Response::from_status_code(code);
        let written = channel.write_all(&self.response.as_bytes());
        let released = release_channel(&mut channel);
        written.and(released)
    }

    fn take_channel(&mut self) -> io::Result<W> {
        self.channel
            .take()
            .ok_or_else(|| io::Error::new(ErrorKind::Other, "响应已经提交"))
    }
}

impl<W: WriteChannel> ResponseSink for HttpResponseSink<W> {
    type Body = W;

    fn set_content_type(&mut self, content_type: &str) {
        self.response.set_content_type(content_type);
    }

    fn set_content_length(&mut self, length: i32) {
        self.response.set_content_length(length);
    }

    fn add_header(&mut self, name: &str, value: &str) {
        self.response.add_header(name, value);
    }

    fn body(&mut self) -> io::Result<W> {
        let mut channel = self.take_channel()?;
        let head = self.response.head_bytes();
        debug!("[ID{}]发送响应头，长度: {}", self.id, head.len());
        if let Err(e) = channel.write_all(&head) {
            let _ = release_channel(&mut channel);
            return Err(e);
        }
        Ok(channel)
    }

    fn forward(&mut self, context: ErrorViewContext) -> io::Result<()> {
        let mut channel = self.take_channel()?;
        self.response = self.view.render(&context, self.accept_json);
        debug!(
            "[ID{}]转交错误视图，状态码: {}",
            self.id,
            self.response.status_code()
        );
        let written = channel.write_all(&self.response.as_bytes());
        let released = release_channel(&mut channel);
        written.and(released)
    }
}
