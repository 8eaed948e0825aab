// 在 Windows 上把图标嵌入 exe

fn main() {
    println!("cargo:rerun-if-changed=assets/icon.ico");
    if cfg!(target_os = "windows") && std::path::Path::new("assets/icon.ico").exists() {
        let mut res = winres::WindowsResource::new();
        res.set_icon("assets/icon.ico");
        if let Err(e) = res.compile() {
            println!("cargo:warning=failed to embed icon: {}", e);
        }
    }
}
