use crate::error::{LauncherError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// 配置文件的可写守卫
///
/// 游戏的 ini 文件平时是只读的，防止游戏启动时覆盖我们的修改。
/// `acquire` 清除只读属性，守卫被 drop 时（无论保存成功还是中途出错）重新设为只读。
#[derive(Debug)]
pub struct WritableGuard {
    path: PathBuf,
}

impl WritableGuard {
    /// 清除文件的只读属性
    ///
    /// # 参数
    /// * `path` - 配置文件路径，文件不存在时直接返回 FileMissing
    pub fn acquire(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path).map_err(|_| LauncherError::FileMissing(path.to_path_buf()))?;
        if meta.permissions().readonly() {
            set_readonly(path, false).map_err(|source| LauncherError::WriteFailure {
                path: path.to_path_buf(),
                source,
            })?;
            log::debug!("Cleared read-only flag on {}", path.display());
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for WritableGuard {
    fn drop(&mut self) {
        match set_readonly(&self.path, true) {
            Ok(()) => log::debug!("Restored read-only flag on {}", self.path.display()),
            Err(e) => log::error!(
                "Failed to restore read-only flag on {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// 设置或清除只读属性
/// Unix 上只改动写权限位，避免 `set_readonly(false)` 把文件变成所有人可写
#[cfg(unix)]
fn set_readonly(path: &Path, readonly: bool) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    let mode = perms.mode();
    let mode = if readonly { mode & !0o222 } else { mode | 0o200 };
    perms.set_mode(mode);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
#[allow(clippy::permissions_set_readonly_false)]
fn set_readonly(path: &Path, readonly: bool) -> std::io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_readonly(readonly);
    fs::set_permissions(path, perms)
}

/// 文件当前是否只读，文件不存在时返回 None
#[cfg(test)]
pub fn is_readonly(path: &Path) -> Option<bool> {
    fs::metadata(path).ok().map(|m| m.permissions().readonly())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gears_perm_{}_{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("GearCamera.ini");
        fs::write(&path, "FOVAngle=70\n").unwrap();
        path
    }

    fn cleanup(path: &Path) {
        let _ = set_readonly(path, false);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_guard_toggles_and_restores() {
        let path = scratch("toggle");
        set_readonly(&path, true).unwrap();
        assert_eq!(is_readonly(&path), Some(true));

        {
            let _guard = WritableGuard::acquire(&path).unwrap();
            assert_eq!(is_readonly(&path), Some(false));
            fs::write(&path, "FOVAngle=90\n").unwrap();
        }

        assert_eq!(is_readonly(&path), Some(true));
        assert_eq!(fs::read_to_string(&path).unwrap(), "FOVAngle=90\n");
        cleanup(&path);
    }

    #[test]
    fn test_guard_restores_on_error_path() {
        let path = scratch("error");
        set_readonly(&path, true).unwrap();

        let result: Result<()> = (|| {
            let _guard = WritableGuard::acquire(&path)?;
            Err(LauncherError::InvalidResolution("bad".into()))
        })();

        assert!(result.is_err());
        assert_eq!(is_readonly(&path), Some(true));
        cleanup(&path);
    }

    #[test]
    fn test_guard_on_missing_file() {
        let err = WritableGuard::acquire(Path::new("no/such/GearEngine.ini")).unwrap_err();
        assert!(matches!(err, LauncherError::FileMissing(_)));
        assert_eq!(is_readonly(Path::new("no/such/GearEngine.ini")), None);
    }
}
