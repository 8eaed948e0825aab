use crate::dialog::Notifier;
use crate::error::{LauncherError, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// 请求版本列表的超时时间，请求在界面线程上同步执行
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// 标签接口返回的单个条目，只关心 name 字段
#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
}

/// 版本标签来源
pub trait ReleaseSource {
    fn fetch_tags(&self) -> Result<Vec<String>>;
}

/// 通过 HTTP 获取标签列表（GitHub tags API 格式）
pub struct HttpReleaseSource {
    client: Client,
    url: String,
}

impl HttpReleaseSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl ReleaseSource for HttpReleaseSource {
    fn fetch_tags(&self) -> Result<Vec<String>> {
        log::info!("Fetching version tags from {}", self.url);
        let response = self.client.get(&self.url).send()?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(LauncherError::HttpStatus(status.as_u16()));
        }
        let tags: Vec<Tag> = response.json()?;
        Ok(tags.into_iter().map(|t| t.name).collect())
    }
}

/// 获取可用版本
/// 任何网络错误都会弹窗提示并返回空列表，不会向上传播
pub fn available_versions(source: &dyn ReleaseSource, notifier: &dyn Notifier) -> Vec<String> {
    match source.fetch_tags() {
        Ok(tags) => {
            log::info!("Found {} version(s)", tags.len());
            tags
        }
        Err(e @ LauncherError::HttpStatus(_)) => {
            notifier.error("Error", &format!("Could not fetch versions. {}", e));
            Vec::new()
        }
        Err(e) => {
            notifier.error("Error", &format!("Error while fetching versions: {}", e));
            Vec::new()
        }
    }
}

/// 版本对应的发布页地址
pub fn release_page(releases_url: &str, version: &str) -> String {
    format!("{}/{}", releases_url.trim_end_matches('/'), version)
}

/// 打开选中版本的发布页，由用户下载官方安装包完成更新
/// 不再下载并覆盖正在运行的程序
pub fn open_release(releases_url: &str, version: &str, notifier: &dyn Notifier) {
    let url = release_page(releases_url, version);
    log::info!("Opening release page {}", url);
    match open::that(&url) {
        Ok(()) => notifier.info(
            "Update",
            &format!(
                "The release page for {} was opened in your browser. \
                 Install the release from there and restart the launcher.",
                version
            ),
        ),
        Err(e) => notifier.error("Error", &format!("Could not open {}: {}", url, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::testing::RecordingNotifier;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    struct FixedSource(fn() -> Result<Vec<String>>);

    impl ReleaseSource for FixedSource {
        fn fetch_tags(&self) -> Result<Vec<String>> {
            (self.0)()
        }
    }

    /// 启动一个只应答一次的本地 HTTP 服务
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}/repos/owner/repo/tags", addr)
    }

    #[test]
    fn test_not_found_shows_error_and_returns_empty() {
        let source = FixedSource(|| Err(LauncherError::HttpStatus(404)));
        let notifier = RecordingNotifier::default();

        let versions = available_versions(&source, &notifier);

        assert!(versions.is_empty());
        let errors = notifier.errors.borrow();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("404"));
    }

    #[test]
    fn test_http_source_reports_404() {
        let url = serve_once("HTTP/1.1 404 Not Found", "");
        let source = HttpReleaseSource::new(url).unwrap();
        let notifier = RecordingNotifier::default();

        assert!(available_versions(&source, &notifier).is_empty());
        assert_eq!(notifier.errors.borrow().len(), 1);
    }

    #[test]
    fn test_http_source_parses_tags() {
        let url = serve_once(
            "HTTP/1.1 200 OK",
            r#"[{"name":"v1.2.0","commit":{"sha":"abc"}},{"name":"v1.1.0"}]"#,
        );
        let source = HttpReleaseSource::new(url).unwrap();
        assert_eq!(source.fetch_tags().unwrap(), vec!["v1.2.0", "v1.1.0"]);
    }

    #[test]
    fn test_transport_failure_is_reported() {
        // 绑定后立即释放端口，连接会被拒绝
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let source = HttpReleaseSource::new(format!("http://{}/tags", addr)).unwrap();
        let notifier = RecordingNotifier::default();

        assert!(available_versions(&source, &notifier).is_empty());
        assert!(notifier.errors.borrow()[0].starts_with("Error while fetching versions"));
    }

    #[test]
    fn test_release_page() {
        assert_eq!(
            release_page("https://github.com/o/r/releases/tag/", "v2.0"),
            "https://github.com/o/r/releases/tag/v2.0"
        );
    }
}
