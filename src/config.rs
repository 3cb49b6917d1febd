// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use num_cpus;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use log::{error, warn};
use std::fs;
use std::path::Path;

use crate::param::DEFAULT_HOME;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    /// 安装目录，日志位于 `<home>/logs/` 下
    #[serde(default = "default_home")]
    home: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    worker_threads: usize,
    #[serde(default = "default_local")]
    local: bool,
    #[serde(default = "default_chunk_size")]
    chunk_size: usize,
}

fn default_home() -> String {
    DEFAULT_HOME.to_string()
}

fn default_port() -> u16 {
    7878
}

fn default_local() -> bool {
    true
}

fn default_chunk_size() -> usize {
    262144 // 256KB
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            home: default_home(),
            port: default_port(),
            worker_threads: 0,
            local: default_local(),
            chunk_size: default_chunk_size(),
        }
        .normalized()
    }

    /// 从 TOML 文件构建配置。文件缺失或格式错误时回退到默认配置。
    pub fn from_toml(filename: &str) -> Self {
        match fs::read_to_string(filename) {
            Ok(s) => Self::parse(&s),
            Err(e) => {
                warn!("无法读取配置文件{}：{}，使用默认配置", filename, e);
                Config::new()
            }
        }
    }

    pub fn parse(toml_str: &str) -> Self {
        let raw_config: Config = match toml::from_str(toml_str) {
            Ok(t) => t,
            Err(e) => {
                error!("无法成功从配置文件构建配置对象，使用默认配置：{}", e);
                Config::new()
            }
        };
        raw_config.normalized()
    }

    fn normalized(mut self) -> Self {
        if self.worker_threads == 0 {
            self.worker_threads = num_cpus::get();
        }
        if self.chunk_size == 0 {
            warn!("chunk_size被设置为0，这会导致无法传输文件，因此该值将被改为默认值。");
            self.chunk_size = default_chunk_size();
        }
        if self.home.is_empty() {
            warn!("home为空，使用默认安装目录{}", DEFAULT_HOME);
            self.home = default_home();
        }
        self
    }
}

impl Config {
    pub fn home(&self) -> &Path {
        Path::new(&self.home)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn local(&self) -> bool {
        self.local
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}
