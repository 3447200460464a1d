use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rebar_core::parameters::{ANCHORAGE_MM, INDENT_MM, MILLIMETERS_PER_UNIT, PITCH_MM};
use rebar_core::{DesignParameters, RebarCatalog};
use serde::Deserialize;
use thiserror::Error;

/// 指定配置文件路径的环境变量。
pub const CONFIG_ENV: &str = "REBAR_CONFIG";

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub design: DesignConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 自动发现配置文件：优先读取环境变量 `REBAR_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_file(PathBuf::from(path));
        }

        let current_dir = env::current_dir().map_err(|source| ConfigError::Context {
            message: "获取当前工作目录失败".to_string(),
            source,
        })?;
        Self::discover_in(&current_dir)
    }

    /// 在指定目录下寻找 `config/default.toml`。
    pub fn discover_in(dir: &Path) -> Result<Self, ConfigError> {
        let default_path = dir.join("config").join("default.toml");
        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，`level` 为 tracing 的 EnvFilter 语法。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 配筋常量，均以毫米给出。
#[derive(Debug, Clone, Deserialize)]
pub struct DesignConfig {
    #[serde(default = "DesignConfig::default_anchorage")]
    pub anchorage_mm: f64,
    #[serde(default = "DesignConfig::default_indent")]
    pub indent_mm: f64,
    #[serde(default = "DesignConfig::default_pitch")]
    pub pitch_mm: f64,
    #[serde(default = "DesignConfig::default_millimeters_per_unit")]
    pub millimeters_per_unit: f64,
    #[serde(default)]
    pub catalog_mm: Option<Vec<u32>>,
}

impl DesignConfig {
    fn default_anchorage() -> f64 {
        ANCHORAGE_MM
    }

    fn default_indent() -> f64 {
        INDENT_MM
    }

    fn default_pitch() -> f64 {
        PITCH_MM
    }

    fn default_millimeters_per_unit() -> f64 {
        MILLIMETERS_PER_UNIT
    }

    /// 换算为图纸单位下的计算参数。
    pub fn to_parameters(&self) -> Result<DesignParameters, ConfigError> {
        let catalog = match &self.catalog_mm {
            Some(lengths) => RebarCatalog::new(lengths.clone())
                .map_err(|err| ConfigError::Invalid(err.to_string()))?,
            None => RebarCatalog::reference(),
        };
        DesignParameters::from_millimeters(
            self.anchorage_mm,
            self.indent_mm,
            self.pitch_mm,
            self.millimeters_per_unit,
            catalog,
        )
        .map_err(|err| ConfigError::Invalid(err.to_string()))
    }
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            anchorage_mm: Self::default_anchorage(),
            indent_mm: Self::default_indent(),
            pitch_mm: Self::default_pitch(),
            millimeters_per_unit: Self::default_millimeters_per_unit(),
            catalog_mm: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "OutputConfig::default_precision")]
    pub precision: usize,
}

impl OutputConfig {
    fn default_precision() -> usize {
        3
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            precision: Self::default_precision(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
    #[error("配筋参数无效: {0}")]
    Invalid(String),
}
