#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // Release 模式下隐藏控制台窗口

// 声明项目中的模块
mod app;         // 主窗口和选项窗口
mod dialog;      // 消息弹窗
mod error;       // 错误类型
mod ini_file;    // ini 文件的按行读写
mod launch;      // 启动游戏进程
mod model;       // 字段和取值范围
mod patcher;     // 每个模式的配置读写
mod permissions; // 只读属性守卫
mod preview;     // FOV 预览图
mod settings;    // 启动器设置（路径注入）
mod updater;     // 版本检查

use anyhow::Context;
use app::LauncherApp;
use dialog::{NativeDialogs, Notifier};
use eframe::egui;
use settings::LauncherSettings;

/// 程序入口
/// 加载启动器设置，校验主窗口背景图后启动 GUI
fn main() -> anyhow::Result<()> {
    // 默认 info 级别，可用 RUST_LOG 覆盖
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting Gears launcher v{}", env!("CARGO_PKG_VERSION"));

    let notifier = NativeDialogs;

    let settings = match LauncherSettings::load_default() {
        Ok(settings) => settings,
        Err(e) => {
            notifier.error("Error", &e.to_string());
            return Err(e).context("failed to load launcher settings");
        }
    };

    // 主窗口背景图缺失是唯一的致命错误
    let bg_path = settings.asset(app::MAIN_BACKGROUND);
    let background = match app::read_image(&bg_path) {
        Ok(img) => img,
        Err(e) => {
            notifier.error("Error", &format!("Background image not available: {}", e));
            return Err(e).context("cannot start without the main background image");
        }
    };

    // 图标是可选的，读取或解码失败时使用默认图标
    let icon = std::fs::read(settings.asset("icon.png"))
        .ok()
        .and_then(|data| eframe::icon_data::from_png_bytes(&data).ok());

    // 设置原生窗口选项
    let options = eframe::NativeOptions {
        // 配置视口（窗口）属性
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0]) // 初始窗口大小
            .with_min_inner_size([640.0, 480.0]) // 最小尺寸，保证三个按钮和背景可见
            .with_title("Gears of War 3 Launcher") // 窗口标题
            .with_icon(icon.unwrap_or_default()),
        ..Default::default()
    };

    // 启动 eframe 应用程序
    eframe::run_native(
        "Gears of War 3 Launcher", // 应用程序名称
        options,
        // 创建应用实例，背景图在这里上传为纹理
        Box::new(move |cc| Ok(Box::new(LauncherApp::new(cc, settings, background)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start the window: {}", e))
}
