use serde_derive::Deserialize;
use serde_derive::Serialize;

use log::{error, warn};
use std::fs::File;
use std::io::prelude::*;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    port: u16,
    worker_threads: usize,
    local: bool,
    #[serde(default = "default_read_buffer_size")]
    read_buffer_size: usize,
}

fn default_read_buffer_size() -> usize {
    8192 // 8KB，足以容纳常见的请求头
}

impl Config {
    pub fn new() -> Self {
        Self {
            port: 7878,
            worker_threads: 0,
            local: true,
            read_buffer_size: default_read_buffer_size(),
        }
    }

    /// 从 TOML 文件读取配置。文件缺失或格式错误时记录日志并退回默认配置。
    pub fn from_toml(filename: &str) -> Self {
        let mut raw_config = match read_file(filename) {
            Some(str_val) => match toml::from_str(&str_val) {
                Ok(t) => t,
                Err(e) => {
                    error!("无法成功从配置文件构建配置对象，使用默认配置：{}", e);
                    Config::new()
                }
            },
            None => Config::new(),
        };
        if raw_config.worker_threads == 0 {
            raw_config.worker_threads = num_cpus::get();
        }
        if raw_config.read_buffer_size == 0 {
            warn!("read_buffer_size被设置为0，该值将被改为{}。", default_read_buffer_size());
            raw_config.read_buffer_size = default_read_buffer_size();
        }
        raw_config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn read_file(filename: &str) -> Option<String> {
    let mut file = match File::open(filename) {
        Ok(f) => f,
        Err(e) => {
            error!("无法打开配置文件{}：{}，使用默认配置", filename, e);
            return None;
        }
    };
    let mut str_val = String::new();
    match file.read_to_string(&mut str_val) {
        Ok(_) => Some(str_val),
        Err(e) => {
            error!("读取配置文件{}失败：{}，使用默认配置", filename, e);
            None
        }
    }
}

impl Config {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn local(&self) -> bool {
        self.local
    }

    pub fn read_buffer_size(&self) -> usize {
        self.read_buffer_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_from_toml() {
        let file = write_config(
            "port = 8080\nworker_threads = 2\nlocal = false\nread_buffer_size = 4096\n",
        );

        let config = Config::from_toml(file.path().to_str().unwrap());

        assert_eq!(config.port(), 8080);
        assert_eq!(config.worker_threads(), 2);
        assert!(!config.local());
        assert_eq!(config.read_buffer_size(), 4096);
    }

    #[test]
    fn test_zero_values_are_replaced() {
        let file = write_config("port = 7878\nworker_threads = 0\nlocal = true\nread_buffer_size = 0\n");

        let config = Config::from_toml(file.path().to_str().unwrap());

        assert_eq!(config.worker_threads(), num_cpus::get());
        assert_eq!(config.read_buffer_size(), 8192);
    }

    #[test]
    fn test_missing_optional_field_uses_default() {
        let file = write_config("port = 9000\nworker_threads = 1\nlocal = true\n");

        let config = Config::from_toml(file.path().to_str().unwrap());

        assert_eq!(config.port(), 9000);
        assert_eq!(config.read_buffer_size(), 8192);
    }

    #[test]
    fn test_invalid_toml_falls_back_to_default() {
        let file = write_config("port = \"not a number\"");

        let config = Config::from_toml(file.path().to_str().unwrap());

        assert_eq!(config.port(), 7878);
        assert!(config.local());
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let config = Config::from_toml(path.to_str().unwrap());

        assert_eq!(config.port(), 7878);
        assert_eq!(config.worker_threads(), num_cpus::get());
    }
}
