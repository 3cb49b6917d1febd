// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 日志下载服务器
//!
//! 基于 Tokio 运行时的多线程服务器，只提供一个接口：
//! `GET /downloadLocal?path=<文件名>`，把 `<home>/logs/` 下的日志文件作为附件下载。
//! - 每个连接一个异步任务，请求头读取带超时与长度上限
//! - 文件传输在阻塞线程池中进行，内存占用与文件大小无关
//! - 文件不存在时返回错误视图页面，而不是文件内容
//! - Ctrl-C 停止接收新连接

use logserver::{
    exception::Exception,
    param::{DOWNLOAD_ROUTE, LOGS_DIR, MAX_REQUEST_HEAD, PATH_PARAM},
    Config, DownloadHandler, DownloadRequest, ErrorView, HttpRequestMethod, HttpResponseSink,
    LocalFs, Request, Response, ViewFileRenderer,
};

use log::{debug, error, info, warn};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    runtime::Builder,
    signal, task,
    time::timeout,
};

use std::{
    net::{Ipv4Addr, SocketAddrV4},
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

/// 读取请求头的最长等待时间，防止慢速连接长期占用任务
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(10);

fn main() {
    // 1. 初始化日志系统：通过外部 YAML 配置级别与输出目的地
    if let Err(e) = log4rs::init_file("config/log4rs.yaml", Default::default()) {
        eprintln!("无法初始化日志系统：{}", e);
    }

    // 2. 加载配置
    let config = Config::from_toml("config/development.toml");
    info!("配置文件已载入");
    info!("日志目录: {}", config.home().join(LOGS_DIR).display());

    // 3. 根据配置文件分配工作线程数
    let runtime = match Builder::new_multi_thread()
        .worker_threads(config.worker_threads())
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("无法创建Tokio运行时：{}", e);
            return;
        }
    };
    runtime.block_on(serve(config));
}

/// 共享给每个连接的只读状态
struct ServerState {
    home: PathBuf,
    handler: DownloadHandler<LocalFs>,
    view: Arc<dyn ErrorView + Send + Sync>,
}

async fn serve(config: Config) {
    let port: u16 = config.port();
    let address = match config.local() {
        true => Ipv4Addr::new(127, 0, 0, 1),
        false => Ipv4Addr::new(0, 0, 0, 0),
    };
    info!("服务端将在{}:{}上监听Socket连接", address, port);
    let socket = SocketAddrV4::new(address, port);

    let listener = match TcpListener::bind(socket).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("无法绑定端口：{}，错误：{}", port, e);
            return;
        }
    };
    info!("端口{}绑定完成", port);

    let state = Arc::new(ServerState {
        home: config.home().to_path_buf(),
        handler: DownloadHandler::from_config(&config, LocalFs),
        view: Arc::new(ViewFileRenderer),
    });
    let active_connection = Arc::new(AtomicUsize::new(0));
    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut id: u128 = 0;

    // 主事件循环：持续接收新连接并分发至 Tokio 线程池
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("收到停机信号，停止接收新连接");
                break;
            }
            accepted = listener.accept() => {
                let (stream, addr) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!("接受连接失败：{}", e);
                        continue;
                    }
                };
                debug!("[ID{}]新的连接：{}", id, addr);

                let state = Arc::clone(&state);
                let active_connection = Arc::clone(&active_connection);
                tokio::spawn(async move {
                    active_connection.fetch_add(1, Ordering::SeqCst);
                    handle_connection(stream, id, state).await;
                    active_connection.fetch_sub(1, Ordering::SeqCst);
                });
                id += 1;
            }
        }
    }

    let remaining = active_connection.load(Ordering::SeqCst);
    if remaining > 0 {
        warn!("退出时仍有{}个活跃连接", remaining);
    }
}

/// # 连接处理器
///
/// 读取并解析请求、执行路由，然后把下载交给阻塞线程处理。
async fn handle_connection(mut stream: TcpStream, id: u128, state: Arc<ServerState>) {
    let start_time = Instant::now();

    let buffer = match timeout(REQUEST_READ_TIMEOUT, read_request_head(&mut stream, id)).await {
        Ok(Ok(Some(buffer))) => buffer,
        Ok(Ok(None)) => return,
        Ok(Err(e)) => {
            warn!("[ID{}]{}", id, e);
            send_status(&mut stream, e.status_code(), id).await;
            return;
        }
        Err(_) => {
            warn!("[ID{}]读取请求头超时", id);
            send_status(&mut stream, 408, id).await;
            return;
        }
    };

    let request = match Request::try_from(&buffer, id) {
        Ok(req) => req,
        Err(e) => {
            warn!("[ID{}]解析HTTP请求失败: {}", id, e);
            send_status(&mut stream, e.status_code(), id).await;
            return;
        }
    };
    debug!("[ID{}]成功解析HTTP请求", id);

    if let Err(e) = route(&request) {
        warn!("[ID{}]请求{} {}无法路由：{}", id, request.method(), request.path(), e);
        send_status(&mut stream, e.status_code(), id).await;
        access_log(&request, id, e.status_code().to_string().as_str());
        return;
    }

    let download = DownloadRequest::new(
        request.query_param(PATH_PARAM).map(str::to_string),
        state.home.as_path(),
    );
    let accept_json = request.accepts_json();

    // 传输过程全部是阻塞 I/O，交给专用线程
    let std_stream = match stream.into_std() {
        Ok(s) => s,
        Err(e) => {
            error!("[ID{}]无法转换TcpStream: {}", id, e);
            return;
        }
    };
    if let Err(e) = std_stream.set_nonblocking(false) {
        error!("[ID{}]无法切换为阻塞模式: {}", id, e);
        return;
    }

    let blocking_state = Arc::clone(&state);
    let result = task::spawn_blocking(move || {
        let mut sink =
            HttpResponseSink::new(std_stream, Arc::clone(&blocking_state.view), accept_json, id);
        let result = blocking_state.handler.handle(&download, &mut sink, id);
        if result.is_err() && !sink.is_committed() {
            if let Err(e) = sink.send_status(500) {
                error!("[ID{}]发送500响应失败: {}", id, e);
            }
        }
        result
    })
    .await;

    match result {
        Ok(Ok(outcome)) => access_log(&request, id, &format!("{:?}", outcome)),
        Ok(Err(e)) => {
            error!("[ID{}]下载失败: {}", id, e);
            access_log(&request, id, "IOFailure");
        }
        Err(e) => error!("[ID{}]下载任务异常终止: {}", id, e),
    }
    debug!(
        "[ID{}]请求处理完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );
}

/// 读取到空行为止的请求头。连接在发送任何数据前关闭时返回 `None`。
async fn read_request_head(stream: &mut TcpStream, id: u128) -> Result<Option<Vec<u8>>, Exception> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(n) => n,
            Err(e) => {
                error!("[ID{}]读取TCPStream时遇到错误: {}", id, e);
                return Ok(None);
            }
        };
        if n == 0 {
            return Ok(if buffer.is_empty() { None } else { Some(buffer) });
        }
        buffer.extend_from_slice(&chunk[..n]);
        if buffer.windows(4).any(|w| w == b"\r\n\r\n") {
            return Ok(Some(buffer));
        }
        if buffer.len() > MAX_REQUEST_HEAD {
            return Err(Exception::RequestTooLarge);
        }
    }
}

/// 只有一个路由：`GET /downloadLocal`
fn route(request: &Request) -> Result<(), Exception> {
    if request.path() != DOWNLOAD_ROUTE {
        return Err(Exception::RouteNotFound);
    }
    if request.method() != HttpRequestMethod::Get {
        return Err(Exception::MethodNotAllowed);
    }
    Ok(())
}

async fn send_status(stream: &mut TcpStream, code: u16, id: u128) {
    let response = Response::from_status_code(code);
    if let Err(e) = stream.write_all(&response.as_bytes()).await {
        error!("[ID{}]发送{}响应失败: {}", id, code, e);
        return;
    }
    let _ = stream.flush().await;
    let _ = stream.shutdown().await;
}

/// 结构化访问日志，便于后期审计
fn access_log(request: &Request, id: u128, outcome: &str) {
    info!(
        "[ID{}] HTTP/{}, {}, {}, {:?}, {}, {}",
        id,
        request.version(),
        request.method(),
        request.path(),
        request.query_param(PATH_PARAM),
        outcome,
        request.user_agent(),
    );
}
