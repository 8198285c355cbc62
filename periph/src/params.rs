//! Device initialisation parameter strings.
//!
//! An equipment definition ends in a comma-separated parameter string
//! of the form `"path,controllerType,mode"`.  The string is parsed by
//! value; missing fields take the historical defaults (3555
//! controller, ASCII output).
use serde::Serialize;

use crate::device::ConfigError;

/// How printed output is rendered on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutputMode {
    /// Plain text: newlines, form feeds, carriage returns.
    Ascii,
    /// ANSI/ASA carriage control in column one of every line.
    Ansi,
}

/// Which 3000-series controller personality the printer presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControllerModel {
    /// 3152/3256/3659.
    Ct3152,
    /// 3555 (the default).
    Ct3555,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceParams {
    /// Output directory, normalised to end in a separator when
    /// non-empty.
    pub path: String,
    pub controller: ControllerModel,
    pub mode: OutputMode,
}

impl DeviceParams {
    pub fn parse(params: &str) -> Result<DeviceParams, ConfigError> {
        let mut fields = params.split(',').map(str::trim);
        let path = fields.next().unwrap_or("");
        let controller = match fields.next() {
            None | Some("") | Some("3555") => ControllerModel::Ct3555,
            Some("3152") => ControllerModel::Ct3152,
            Some(other) => {
                return Err(ConfigError::UnknownControllerType(other.to_string()));
            }
        };
        // Anything that is not "ansi" means plain ASCII, as it always
        // has.
        let mode = match fields.next().map(str::to_ascii_lowercase).as_deref() {
            Some("ansi") => OutputMode::Ansi,
            _ => OutputMode::Ascii,
        };
        let mut path = path.to_string();
        if !path.is_empty() && !path.ends_with('/') {
            path.push('/');
        }
        Ok(DeviceParams {
            path,
            controller,
            mode,
        })
    }
}
