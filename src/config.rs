//! Настройки запуска из переменных окружения

use anyhow::{anyhow, bail, Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_DEVICE: &str = "MATMUL_DEVICE";
pub const ENV_PLATFORM: &str = "MATMUL_PLATFORM";
pub const ENV_LOCAL_SIZE: &str = "MATMUL_LOCAL_SIZE";
pub const ENV_VERIFY: &str = "MATMUL_VERIFY";
pub const ENV_LOG: &str = "MATMUL_LOG";
pub const ENV_OPENCL_LIBRARY: &str = "MATMUL_OPENCL_LIBRARY";

/// Тип устройства OpenCL, на котором выполняется ядро
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceKind {
    #[default]
    Gpu,
    Cpu,
    Accelerator,
    Default,
    All,
}

impl FromStr for DeviceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gpu" => Ok(Self::Gpu),
            "cpu" => Ok(Self::Cpu),
            "accelerator" => Ok(Self::Accelerator),
            "default" => Ok(Self::Default),
            "all" => Ok(Self::All),
            other => Err(anyhow!(
                "unknown device type '{other}' (expected gpu, cpu, accelerator, default or all)"
            )),
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gpu => "GPU",
            Self::Cpu => "CPU",
            Self::Accelerator => "accelerator",
            Self::Default => "default",
            Self::All => "OpenCL",
        };
        f.write_str(name)
    }
}

/// Параметры одного запуска
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub device: DeviceKind,
    pub platform_index: usize,
    /// Сторона рабочей группы; `None` означает геометрию ровно N×N без подсказки
    pub local_size: Option<usize>,
    pub verify: bool,
    pub log_level: log::LevelFilter,
    pub opencl_library: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: DeviceKind::Gpu,
            platform_index: 0,
            local_size: None,
            verify: false,
            log_level: log::LevelFilter::Warn,
            opencl_library: None,
        }
    }
}

impl Config {
    /// Читает настройки из окружения процесса
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Читает настройки через произвольный источник переменных
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get(ENV_DEVICE) {
            config.device = value.parse().with_context(|| format!("invalid {ENV_DEVICE}"))?;
        }
        if let Some(value) = get(ENV_PLATFORM) {
            config.platform_index = value
                .trim()
                .parse()
                .with_context(|| format!("invalid {ENV_PLATFORM} '{value}'"))?;
        }
        if let Some(value) = get(ENV_LOCAL_SIZE) {
            let size: usize = value
                .trim()
                .parse()
                .with_context(|| format!("invalid {ENV_LOCAL_SIZE} '{value}'"))?;
            if size == 0 {
                bail!("{ENV_LOCAL_SIZE} must be a positive integer");
            }
            config.local_size = Some(size);
        }
        if let Some(value) = get(ENV_VERIFY) {
            config.verify = parse_flag(&value).with_context(|| format!("invalid {ENV_VERIFY}"))?;
        }
        if let Some(value) = get(ENV_LOG) {
            config.log_level = value.trim().parse().map_err(|_| {
                anyhow!(
                    "invalid {ENV_LOG} '{value}' \
                     (expected off, error, warn, info, debug or trace)"
                )
            })?;
        }
        config.opencl_library = get(ENV_OPENCL_LIBRARY).map(PathBuf::from);

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("expected a boolean, got '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_select_first_gpu_without_work_group_hint() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.device, DeviceKind::Gpu);
        assert_eq!(config.local_size, None);
        assert!(!config.verify);
    }

    #[test]
    fn all_settings_are_parsed() {
        let config = config_from(&[
            (ENV_DEVICE, "CPU"),
            (ENV_PLATFORM, "2"),
            (ENV_LOCAL_SIZE, "16"),
            (ENV_VERIFY, "yes"),
            (ENV_LOG, "debug"),
            (ENV_OPENCL_LIBRARY, "/opt/ocl/libOpenCL.so"),
        ])
        .unwrap();

        assert_eq!(config.device, DeviceKind::Cpu);
        assert_eq!(config.platform_index, 2);
        assert_eq!(config.local_size, Some(16));
        assert!(config.verify);
        assert_eq!(config.log_level, log::LevelFilter::Debug);
        assert_eq!(config.opencl_library, Some(PathBuf::from("/opt/ocl/libOpenCL.so")));
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let config = config_from(&[(ENV_DEVICE, ""), (ENV_LOCAL_SIZE, "  ")]).unwrap();
        assert_eq!(config.device, DeviceKind::Gpu);
        assert_eq!(config.local_size, None);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(config_from(&[(ENV_DEVICE, "fpga")]).is_err());
        assert!(config_from(&[(ENV_PLATFORM, "-1")]).is_err());
        assert!(config_from(&[(ENV_LOCAL_SIZE, "0")]).is_err());
        assert!(config_from(&[(ENV_VERIFY, "maybe")]).is_err());
        assert!(config_from(&[(ENV_LOG, "loud")]).is_err());
    }

    #[test]
    #[serial]
    fn reads_process_environment() {
        std::env::set_var(ENV_PLATFORM, "1");
        std::env::set_var(ENV_VERIFY, "true");
        let config = Config::from_env();
        std::env::remove_var(ENV_PLATFORM);
        std::env::remove_var(ENV_VERIFY);

        let config = config.unwrap();
        assert_eq!(config.platform_index, 1);
        assert!(config.verify);
    }
}
