use crate::error::{LauncherError, Result};
use crate::model::Mode;
use crate::settings::LauncherSettings;
use std::path::Path;
use std::process::{Command, Stdio};

/// 启动指定模式的游戏
///
/// # 返回值
/// * 可执行文件不存在时返回 ExecutableMissing（界面弹窗提示，不退出）
/// * 成功时返回子进程 PID
pub fn launch(settings: &LauncherSettings, mode: Mode) -> Result<u32> {
    launch_executable(mode, settings.exe_path(mode))
}

fn launch_executable(mode: Mode, exe: &Path) -> Result<u32> {
    if !exe.is_file() {
        return Err(LauncherError::ExecutableMissing {
            mode: mode.to_string(),
            path: exe.to_path_buf(),
        });
    }

    log::info!("Launching {} ({})...", mode, exe.display());

    let mut cmd = Command::new(exe);
    // 游戏依赖相对路径加载资源，工作目录设为可执行文件所在目录
    if let Some(dir) = exe.parent().filter(|d| !d.as_os_str().is_empty()) {
        cmd.current_dir(dir);
    }
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    log::debug!("Generated command: {:?}", cmd);

    let child = cmd.spawn().map_err(|source| LauncherError::LaunchFailure {
        path: exe.to_path_buf(),
        source,
    })?;
    log::info!("{} launched with PID {}", mode, child.id());
    Ok(child.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_executable_is_reported() {
        let settings = LauncherSettings {
            exe_path_sp: PathBuf::from("no/such/SP.exe"),
            ..LauncherSettings::default()
        };
        let err = launch(&settings, Mode::Singleplayer).unwrap_err();
        assert!(matches!(err, LauncherError::ExecutableMissing { ref mode, .. } if mode == "Singleplayer"));
        assert!(err.to_string().contains("Singleplayer executable not found"));
    }

    #[test]
    fn test_directory_is_not_an_executable() {
        let err = launch_executable(Mode::Multiplayer, &std::env::temp_dir()).unwrap_err();
        assert!(matches!(err, LauncherError::ExecutableMissing { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_spawns_process() {
        let pid = launch_executable(Mode::Multiplayer, Path::new("/bin/sh")).unwrap();
        assert!(pid > 0);
    }
}
