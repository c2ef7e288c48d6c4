//! TOML 配置
//!
//! 所有字段都有默认值，不给配置文件时和给一个空文件是一样的
//!
//! ```toml
//! [device]
//! name = "Tablet alone"
//! settle_ms = 1000
//!
//! [axes.pressure]
//! min = 0
//! max = 8191
//!
//! [translator]
//! sync = "flush-pending"
//! announce_proximity = false
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::tablet_driver::SyncPolicy;
use crate::virtual_device::capability::{AxisRange, DEFAULT_NAME};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub device: DeviceConfig,
    pub axes: AxesConfig,
    pub translator: TranslatorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    /// 虚拟设备的名字
    pub name: String,
    /// 创建虚拟设备之后等多久再发第一个事件，给 udev / libinput 留出注册设备的时间。
    /// 不能为 0，`load` 会拒绝
    pub settle_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            settle_ms: 1000,
        }
    }
}

impl DeviceConfig {
    /// 检查解析之后才能发现的取值问题，返回原因
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.settle_ms == 0 {
            return Err("device.settle_ms must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AxesConfig {
    pub x: AxisRange,
    pub y: AxisRange,
    pub pressure: AxisRange,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            x: AxisRange::POSITION,
            y: AxisRange::POSITION,
            pressure: AxisRange::PRESSURE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslatorConfig {
    pub sync: SyncPolicy,
    /// 启动后先报告一次「笔靠近」再报告「笔离开」，让 xinput 能列出这支笔
    pub announce_proximity: bool,
}

impl Config {
    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config
            .device
            .validate()
            .map_err(|reason| Error::ConfigValue {
                path: path.to_path_buf(),
                reason,
            })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
