use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Insufficient permissions to access {}", .path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Device {} does not exist", .path.display())]
    DeviceNotFound { path: PathBuf },

    #[error(transparent)]
    Os(#[from] io::Error),

    #[error("unable to read config {}: {source}", .path.display())]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("invalid config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config {}: {reason}", .path.display())]
    ConfigValue { path: PathBuf, reason: String },

    #[error("virtual tablet descriptor is incomplete: {0}")]
    InvalidDescriptor(String),
}

impl Error {
    /// 按 errno 把打开设备时的错误归类
    pub fn from_io(path: impl AsRef<Path>, err: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::NotFound => Self::DeviceNotFound { path },
            _ => Self::Os(err),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_open_errors() {
        let denied = Error::from_io(
            "/dev/input/event3",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert_eq!(
            denied.to_string(),
            "Insufficient permissions to access /dev/input/event3"
        );

        let missing = Error::from_io("/dev/input/event9", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(missing.to_string(), "Device /dev/input/event9 does not exist");

        let other = Error::from_io("/dev/input/event3", io::Error::other("device busy"));
        assert!(matches!(other, Error::Os(_)));
        assert_eq!(other.to_string(), "device busy");
    }
}
