use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::model::YoloParams;

pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_MODEL_PATH: &str = "best.onnx";
pub const DEFAULT_UPLOAD_LIMIT: usize = 16 * 1024 * 1024;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("valor no válido para {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
    #[error("valor fuera de rango para {var}: {value} (esperado {expected})")]
    OutOfRange { var: &'static str, value: String, expected: &'static str },
}

/// Configuración del proceso, leída una sola vez de variables de entorno.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub model_path: PathBuf,
    pub yolo: YoloParams,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = YoloParams::default();
        let config = Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            model_path: lookup("MODEL_PATH")
                .filter(|p| !p.trim().is_empty())
                .map_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH), PathBuf::from),
            yolo: YoloParams {
                input_size: parse_or(&lookup, "MODEL_IMGSZ", defaults.input_size)?,
                conf_threshold: parse_or(&lookup, "CONF_THRESHOLD", defaults.conf_threshold)?,
                iou_threshold: parse_or(&lookup, "IOU_THRESHOLD", defaults.iou_threshold)?,
                max_detections: parse_or(&lookup, "MAX_DETECTIONS", defaults.max_detections)?,
            },
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_UPLOAD_LIMIT)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let yolo = &self.yolo;
        if yolo.input_size == 0 {
            return Err(out_of_range("MODEL_IMGSZ", yolo.input_size, "> 0"));
        }
        if !(0.0..=1.0).contains(&yolo.conf_threshold) {
            return Err(out_of_range("CONF_THRESHOLD", yolo.conf_threshold, "0..=1"));
        }
        if !(0.0..=1.0).contains(&yolo.iou_threshold) {
            return Err(out_of_range("IOU_THRESHOLD", yolo.iou_threshold, "0..=1"));
        }
        if yolo.max_detections == 0 {
            return Err(out_of_range("MAX_DETECTIONS", yolo.max_detections, "> 0"));
        }
        if self.max_upload_bytes == 0 {
            return Err(out_of_range("MAX_UPLOAD_BYTES", self.max_upload_bytes, "> 0"));
        }
        Ok(())
    }
}

fn out_of_range(var: &'static str, value: impl ToString, expected: &'static str) -> ConfigError {
    ConfigError::OutOfRange { var, value: value.to_string(), expected }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}
