// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Cookie 演示服务器
//!
//! 基于 Tokio 运行时的多线程服务器，用来端到端地演示 Cookie 中间件：
//! - 每个连接读取一个完整的请求头并交给中间件链处理
//! - 处理器读取 `visits` Cookie，加一后通过 `Set-Cookie` 写回
//! - 响应体为本次请求携带的全部 Cookie（JSON）

use cookie_middleware::{
    request::head_end, util::status_page, Config, ContextRegistry, CookieParser, Exception,
    Pipeline, Request, Response, SameSite,
};

use log::{debug, error, info};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    runtime::Builder,
};

use std::{
    net::{Ipv4Addr, SocketAddrV4},
    sync::Arc,
    time::Instant,
};

/// 访问计数 Cookie 的名称
const VISITS: &str = "visits";

fn main() {
    // 1. 初始化日志系统：通过外部 YAML 配置级别与输出目的地
    if let Err(e) = log4rs::init_file("config/log4rs.yaml", Default::default()) {
        eprintln!("无法载入日志配置 config/log4rs.yaml：{}", e);
    }

    // 2. 环境配置加载
    let config = Config::from_toml("config/development.toml");
    info!("配置文件已载入");

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

async fn serve(config: Config) {
    let port = config.port();
    let address = match config.local() {
        true => Ipv4Addr::new(127, 0, 0, 1),
        false => Ipv4Addr::new(0, 0, 0, 0),
    };
    info!("服务端将在{}:{}上监听Socket连接", address, port);

    let listener = match TcpListener::bind(SocketAddrV4::new(address, port)).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("无法绑定端口：{}，错误：{}", port, e);
            return;
        }
    };
    info!("端口{}绑定完成", port);

    let pipeline = Arc::new(Pipeline::new().with(CookieParser::new()));
    let config = Arc::new(config);
    let mut id: u128 = 0;

    loop {
        let (mut stream, addr) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                error!("接受连接失败：{}", e);
                continue;
            }
        };
        debug!("[ID{}]新的连接：{}", id, addr);

        let pipeline = Arc::clone(&pipeline);
        let config = Arc::clone(&config);
        tokio::spawn(async move {
            handle_connection(&mut stream, id, &pipeline, &config).await;
        });
        id += 1;
    }
}

/// # 连接处理器
///
/// 读取并解析请求，经过中间件链生成响应后写回。
async fn handle_connection(stream: &mut TcpStream, id: u128, pipeline: &Pipeline, config: &Config) {
    let mut buffer = vec![0; config.read_buffer_size()];
    let mut n = 0;

    // 一次读取可能只拿到请求头的一部分，持续读取直到遇到空行、缓冲区写满或对端关闭
    while n < buffer.len() && head_end(&buffer[..n]).is_none() {
        match stream.read(&mut buffer[n..]).await {
            Ok(0) => break,
            Ok(read) => n += read,
            Err(e) => {
                error!("[ID{}]读取TCPStream时遇到错误: {}", id, e);
                return;
            }
        }
    }
    if n == 0 {
        return;
    }

    let start_time = Instant::now();

    let mut response = match Request::try_from(&buffer[..n], id) {
        Ok(request) => {
            let mut response = pipeline.handle(&request, &count_visits);
            // 保留中间件写入的标头，只补上错误页面
            if response.status_code() >= 400 && !response.has_body() {
                response.set_body("text/html;charset=utf-8", status_page(response.status_code()));
            }
            info!(
                "[ID{}] {}, {}, {}, {}, {}, {}",
                id,
                request.version(),
                request.path(),
                request.method(),
                response.status_code(),
                response.information(),
                request.user_agent(),
            );
            response
        }
        Err(e) => reject(id, e),
    };

    debug!(
        "[ID{}]HTTP响应构建完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );

    let response_bytes = response.as_bytes();
    if let Err(e) = stream.write_all(&response_bytes).await {
        error!("[ID{}]发送响应失败: {}", id, e);
        return;
    }
    let _ = stream.flush().await;
}

fn reject(id: u128, e: Exception) -> Response {
    error!("[ID{}]解析HTTP请求失败: {}", id, e);
    Response::from_status_code(e.status_code())
}

/// 读取访问次数，加一后写回 Cookie，并以 JSON 返回请求携带的全部 Cookie
fn count_visits(_req: &Request, res: &mut Response, ctx: &mut ContextRegistry) {
    let Some(cookies) = ctx.get_mut::<CookieParser>() else {
        res.set_code(500);
        return;
    };

    let jar: serde_json::Map<String, serde_json::Value> = cookies
        .jar()
        .iter()
        .map(|(name, value)| (name.to_string(), serde_json::Value::from(value)))
        .collect();
    let visits = cookies.get_cookie(VISITS).parse::<u64>().unwrap_or(0) + 1;

    cookies
        .set_cookie(VISITS, visits.to_string())
        .path("/")
        .max_age(3600)
        .httponly()
        .same_site(SameSite::Lax);

    match serde_json::to_vec(&serde_json::json!({ "visits": visits, "cookies": jar })) {
        Ok(body) => {
            res.set_body("application/json", body);
        }
        Err(e) => {
            error!("序列化Cookie列表失败：{}", e);
            res.set_code(500);
        }
    }
}
