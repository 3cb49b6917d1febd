// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 文件流式传输模块
//!
//! 打开解析出的日志文件，设置下载所需的响应头，再按块把文件内容写入响应体。
//!
//! ## 资源释放
//! 读句柄与写通道分别由守卫对象持有，无论复制成功、读写失败还是中途返回，
//! 写通道都会先 flush 再 close，读句柄都会被 close，且各自只关闭一次。
//!
//! ## 长度头
//! 部分响应实现只提供 32 位的长度接口。长度在 `i32` 范围内时走原生接口，
//! 否则以文本形式显式写入 `Content-Length`，保证超过 2GB 的日志不会被截断。

use std::{
    fs::File,
    io::{self, ErrorKind, Read},
    path::Path,
};

use log::{debug, error};

use crate::{
    param::OCTET_STREAM,
    resolver::ResolvedTarget,
    sink::{release_channel, ResponseSink, WriteChannel},
};

/// 一次传输的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// 文件已完整发送，附带发送的字节数
    Served(u64),
    /// 文件不存在，附带用户请求的文件名
    NotFound(String),
}

/// 已打开的文件读句柄
pub trait ReadHandle: Read {
    /// 文件长度（字节）
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn close(&mut self) -> io::Result<()>;
}

/// 文件来源。路径或其中任一目录不存在时返回 `ErrorKind::NotFound`。
pub trait FileSource {
    type Handle: ReadHandle;

    fn open(&self, path: &Path) -> io::Result<Self::Handle>;
}

/// 本地文件系统
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

pub struct LocalFile {
    file: Option<File>,
    len: u64,
}

impl FileSource for LocalFs {
    type Handle = LocalFile;

    fn open(&self, path: &Path) -> io::Result<LocalFile> {
        let file = File::open(path)?;
        let metadata = file.metadata()?;
        // 目录等非普通文件一律按不存在处理，不提供目录浏览
        if !metadata.is_file() {
            return Err(io::Error::new(ErrorKind::NotFound, "不是普通文件"));
        }
        Ok(LocalFile {
            file: Some(file),
            len: metadata.len(),
        })
    }
}

impl Read for LocalFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.file.as_mut() {
            Some(file) => file.read(buf),
            None => Err(io::Error::new(ErrorKind::Other, "文件已关闭")),
        }
    }
}

impl ReadHandle for LocalFile {
    fn len(&self) -> u64 {
        self.len
    }

    fn close(&mut self) -> io::Result<()> {
        drop(self.file.take());
        Ok(())
    }
}

/// 持有读句柄，离开作用域时保证关闭
struct ReadGuard<H: ReadHandle> {
    handle: H,
    closed: bool,
}

impl<H: ReadHandle> ReadGuard<H> {
    fn new(handle: H) -> Self {
        Self {
            handle,
            closed: false,
        }
    }

    fn release(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.handle.close()
    }
}

impl<H: ReadHandle> Drop for ReadGuard<H> {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

/// 持有写通道，离开作用域时保证先 flush 后 close
struct WriteGuard<W: WriteChannel> {
    channel: W,
    closed: bool,
}

impl<W: WriteChannel> WriteGuard<W> {
    fn new(channel: W) -> Self {
        Self {
            channel,
            closed: false,
        }
    }

    fn release(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        release_channel(&mut self.channel)
    }
}

impl<W: WriteChannel> Drop for WriteGuard<W> {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

pub struct FileStreamer<S: FileSource> {
    source: S,
    chunk_size: usize,
}

impl<S: FileSource> FileStreamer<S> {
    pub fn new(source: S, chunk_size: usize) -> Self {
        Self {
            source,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn stream<R: ResponseSink>(
        &self,
        target: &ResolvedTarget,
        sink: &mut R,
        id: u128,
    ) -> io::Result<StreamOutcome> {
        if target.file_name().is_empty() {
            debug!("[ID{}]请求的文件名为空", id);
            return Ok(StreamOutcome::NotFound(String::new()));
        }

        let handle = match self.source.open(target.absolute_path()) {
            Ok(handle) => handle,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("[ID{}]文件{}不存在", id, target.file_name());
                return Ok(StreamOutcome::NotFound(target.file_name().to_string()));
            }
            Err(e) => {
                error!("[ID{}]无法打开文件{}: {}", id, target.file_name(), e);
                return Err(e);
            }
        };
        let mut reader = ReadGuard::new(handle);
        let len = reader.handle.len();

        sink.set_content_type(OCTET_STREAM);
        match i32::try_from(len) {
            Ok(native) => sink.set_content_length(native),
            Err(_) => {
                debug!("[ID{}]文件长度{}超出32位范围，显式写入Content-Length", id, len);
                sink.add_header("Content-Length", &len.to_string());
            }
        }
        sink.add_header(
            "Content-Disposition",
            &format!("attachment;filename={}", target.file_name()),
        );

        let mut writer = WriteGuard::new(sink.body()?);
        debug!("[ID{}]开始流式传输，文件大小: {} bytes", id, len);
        // 响应体严格等于已声明的长度：文件在传输中变长时只发送前 len 字节，变短时报错
        let copied = {
            let mut declared = (&mut reader.handle).take(len);
            copy_chunked(&mut declared, &mut writer.channel, self.chunk_size)
        }
        .and_then(|total| match total < len {
            true => Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("文件在传输中被截断：已发送{}字节，声明{}字节", total, len),
            )),
            false => Ok(total),
        });
        let write_released = writer.release();
        let read_released = reader.release();

        let total = copied.map_err(|e| {
            error!("[ID{}]传输{}失败: {}", id, target.file_name(), e);
            e
        })?;
        write_released?;
        read_released?;
        debug!("[ID{}]流式传输完成，共发送 {} 字节", id, total);
        Ok(StreamOutcome::Served(total))
    }
}

/// 按固定大小的缓冲区把 `reader` 的内容全部写入 `writer`
fn copy_chunked<Rd, Wr>(reader: &mut Rd, writer: &mut Wr, chunk_size: usize) -> io::Result<u64>
where
    Rd: Read + ?Sized,
    Wr: io::Write + ?Sized,
{
    let mut buffer = vec![0u8; chunk_size];
    let mut total = 0u64;
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                writer.write_all(&buffer[..n])?;
                total += n as u64;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}
