// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

#[cfg(test)]
mod traversal_tests {
    //! # 路径遍历防御测试
    //!
    //! 不论 `path` 参数如何构造，解析结果都只能落在 `<home>/logs/` 目录之内。

    use std::path::{Component, Path};

    use logserver::{resolve, DownloadRequest};
    use proptest::prelude::*;

    const HOME: &str = "/opt/logserver";

    fn assert_confined(raw: &str) {
        let base = Path::new(HOME);
        let logs = base.join("logs");
        let target = resolve(Some(raw), base);

        assert!(
            target.absolute_path().starts_with(&logs),
            "{:?} 逃出了日志目录: {:?}",
            raw,
            target.absolute_path()
        );
        assert!(!target
            .absolute_path()
            .components()
            .any(|c| c == Component::ParentDir));
        assert!(!target.file_name().contains('/'));
        assert!(!target.file_name().contains('\\'));
        if !target.file_name().is_empty() {
            assert_eq!(target.absolute_path().parent(), Some(logs.as_path()));
        }
    }

    #[test]
    fn test_known_attack_vectors() {
        let attacks = [
            "../../../etc/passwd",
            "..\\..\\windows\\win.ini",
            "/etc/shadow",
            "....//....//etc/passwd",
            "logs/../../secret",
            "..",
            ".",
            "../",
            "a/b/..",
            "passwd\0.log",
            "%2e%2e%2fetc%2fpasswd",
        ];
        for attack in attacks {
            assert_confined(attack);
        }
    }

    #[test]
    fn test_attack_names_reduce_to_basename() {
        let base = Path::new(HOME);
        assert_eq!(resolve(Some("../../etc/passwd"), base).file_name(), "passwd");
        assert_eq!(resolve(Some("..\\..\\boot.ini"), base).file_name(), "boot.ini");
        assert_eq!(resolve(Some("a/b/.."), base).file_name(), "");
        assert_eq!(resolve(Some("/"), base).file_name(), "");
    }

    #[test]
    fn test_download_request_uses_own_base() {
        let request = DownloadRequest::new(Some("../x.log".to_string()), "/srv/one");
        let target = request.resolve();

        assert_eq!(target.absolute_path(), Path::new("/srv/one/logs/x.log"));
    }

    proptest! {
        #[test]
        fn prop_any_input_stays_in_logs(raw in any::<String>()) {
            assert_confined(&raw);
        }

        #[test]
        fn prop_separator_heavy_input_stays_in_logs(raw in "[./\\\\a-z]{0,40}") {
            assert_confined(&raw);
        }

        #[test]
        fn prop_plain_names_pass_through(name in "[a-zA-Z0-9_-][a-zA-Z0-9_.-]{0,30}") {
            prop_assume!(name != "." && name != "..");
            let target = resolve(Some(&name), Path::new(HOME));
            prop_assert_eq!(target.file_name(), name.as_str());
        }
    }
}

#[cfg(test)]
mod disclosure_tests {
    //! # 信息泄露测试
    //!
    //! 文件不存在时，响应中既不能出现文件内容，也不能出现服务器上的真实目录。

    use std::{fs, sync::Arc};

    use logserver::{
        DownloadHandler, DownloadRequest, ErrorView, HttpResponseSink, LocalFs, StreamOutcome,
        ViewFileRenderer,
    };

    #[test]
    fn test_passwd_outside_logs_is_not_served() {
        let home = tempfile::tempdir().unwrap();
        fs::create_dir(home.path().join("logs")).unwrap();
        // 日志目录之外放一个“敏感”文件
        fs::write(home.path().join("passwd"), b"root:x:0:0").unwrap();

        let view: Arc<dyn ErrorView + Send + Sync> = Arc::new(ViewFileRenderer);
        let handler = DownloadHandler::new(LocalFs, 1024);
        let mut sink = HttpResponseSink::new(Vec::new(), view, true, 0);
        let request = DownloadRequest::new(Some("../passwd".to_string()), home.path());

        let outcome = handler.handle(&request, &mut sink, 0).unwrap();

        assert_eq!(outcome, StreamOutcome::NotFound("passwd".to_string()));
        assert_eq!(sink.response().status_code(), 404);
        let body = sink.response().content().unwrap();
        let text = String::from_utf8_lossy(body);
        assert!(!text.contains("root:x"));
        assert!(!text.contains(home.path().to_str().unwrap()));
        let value: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(value["invalidPathError"], "Error: Invalid file passwd");
        assert_eq!(value["currentPath"], "passwd");
        assert_eq!(value["downloadLogFile"], true);
        assert_eq!(value["viewingOffset"], 0);
        assert_eq!(value["baseUrl"], "./browseLogs");
    }

    #[test]
    fn test_crlf_in_name_does_not_inject_headers() {
        let home = tempfile::tempdir().unwrap();
        fs::create_dir(home.path().join("logs")).unwrap();
        let name = "a.log\r\nSet-Cookie: x=1";
        fs::write(home.path().join("logs").join(name), b"data").unwrap();

        let view: Arc<dyn ErrorView + Send + Sync> = Arc::new(ViewFileRenderer);
        let handler = DownloadHandler::new(LocalFs, 1024);
        let mut sink = HttpResponseSink::new(Vec::new(), view, false, 1);
        let request = DownloadRequest::new(Some(name.to_string()), home.path());

        let outcome = handler.handle(&request, &mut sink, 1).unwrap();

        assert_eq!(outcome, StreamOutcome::Served(4));
        let disposition = sink.response().header("Content-Disposition").unwrap();
        assert!(!disposition.contains('\r'));
        assert!(!disposition.contains('\n'));
    }
}

#[cfg(test)]
mod live_server_tests {
    //! # 在线服务器攻击测试
    //!
    //! 需要先在 7878 端口启动服务器：`cargo run`，然后执行 `cargo test -- --ignored`。

    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn send_request(request: &[u8]) -> Result<String, String> {
        let mut stream = TcpStream::connect("127.0.0.1:7878")
            .await
            .map_err(|e| e.to_string())?;
        stream.write_all(request).await.map_err(|e| e.to_string())?;

        let mut buffer = vec![0; 4096];
        let n = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut buffer))
            .await
            .map_err(|e| e.to_string())?
            .map_err(|e| e.to_string())?;

        Ok(String::from_utf8_lossy(&buffer[..n]).to_string())
    }

    fn extract_status_code(response: &str) -> u16 {
        response
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|code| code.parse().ok())
            .unwrap_or(0)
    }

    #[tokio::test]
    #[ignore]
    async fn test_path_traversal_via_query() {
        let attacks = [
            "GET /downloadLocal?path=../../etc/passwd HTTP/1.1\r\nHost: localhost\r\n\r\n",
            "GET /downloadLocal?path=%2e%2e%2f%2e%2e%2fetc%2fpasswd HTTP/1.1\r\nHost: localhost\r\n\r\n",
            "GET /downloadLocal?path=..%5c..%5cetc%5cpasswd HTTP/1.1\r\nHost: localhost\r\n\r\n",
        ];

        for attack in attacks {
            let response = send_request(attack.as_bytes())
                .await
                .expect("请确保服务器运行在端口7878");
            assert_eq!(extract_status_code(&response), 404, "{}", attack);
            assert!(!response.contains("root:x"));
        }
    }

    #[tokio::test]
    #[ignore]
    async fn test_oversized_request_head() {
        let long_path = "A".repeat(10000);
        let attack = format!(
            "GET /downloadLocal?path={} HTTP/1.1\r\nHost: localhost\r\n\r\n",
            long_path
        );

        let response = send_request(attack.as_bytes())
            .await
            .expect("请确保服务器运行在端口7878");
        assert_eq!(extract_status_code(&response), 413);
    }

    #[tokio::test]
    #[ignore]
    async fn test_invalid_utf8_request() {
        let attack = b"GET /downloadLocal?path=\xff\xfe HTTP/1.1\r\nHost: localhost\r\n\r\n";

        let response = send_request(attack)
            .await
            .expect("请确保服务器运行在端口7878");
        assert_eq!(extract_status_code(&response), 400);
    }

    #[tokio::test]
    #[ignore]
    async fn test_other_routes_are_not_found() {
        let attack = b"GET /../etc/passwd HTTP/1.1\r\nHost: localhost\r\n\r\n";

        let response = send_request(attack)
            .await
            .expect("请确保服务器运行在端口7878");
        assert_eq!(extract_status_code(&response), 404);
    }

    #[tokio::test]
    #[ignore]
    async fn test_post_is_not_allowed() {
        let attack = b"POST /downloadLocal?path=master.log HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\n\r\n";

        let response = send_request(attack)
            .await
            .expect("请确保服务器运行在端口7878");
        assert_eq!(extract_status_code(&response), 405);
        assert!(response.contains("Allow: GET"));
    }
}
