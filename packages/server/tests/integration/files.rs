use std::time::{Duration, SystemTime};

use crate::common::{TestApp, routes};

fn set_mtime(app: &TestApp, name: &str, secs_ago: u64) {
    let file = std::fs::File::options()
        .write(true)
        .open(app.upload_dir.join(name))
        .unwrap();
    file.set_modified(SystemTime::now() - Duration::from_secs(secs_ago)).unwrap();
}

mod upload {
    use super::*;

    #[tokio::test]
    async fn upload_returns_file_metadata() {
        let app = TestApp::spawn().await;

        let res = app.upload("notes.txt", b"hello lan".to_vec()).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["message"], "File uploaded successfully");
        assert_eq!(res.body["file"]["name"], "notes.txt");
        assert_eq!(res.body["file"]["size_bytes"], 9);
        assert_eq!(res.body["file"]["size"], "9 Bytes");
        assert_eq!(res.body["file"]["extension"], "txt");
        assert!(res.body["file"]["modified"].as_str().is_some());
        assert!(res.body["file"]["created"].as_str().is_some());
    }

    #[tokio::test]
    async fn repeated_uploads_get_numbered_names() {
        let app = TestApp::spawn().await;

        let first = app.upload("x.txt", b"1".to_vec()).await;
        let second = app.upload("x.txt", b"2".to_vec()).await;
        let third = app.upload("x.txt", b"3".to_vec()).await;

        assert_eq!(first.body["file"]["name"], "x.txt");
        assert_eq!(second.body["file"]["name"], "x_1.txt");
        assert_eq!(third.body["file"]["name"], "x_2.txt");
        assert_eq!(app.listed_names().await.len(), 3);
    }

    #[tokio::test]
    async fn extension_check_ignores_case() {
        let app = TestApp::spawn().await;

        assert_eq!(app.upload("a.PNG", b"img".to_vec()).await.status, 200);
        assert_eq!(app.upload("a.png", b"img".to_vec()).await.status, 200);
    }

    #[tokio::test]
    async fn disallowed_extension_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.upload("setup.exe", b"MZ".to_vec()).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.listed_names().await.is_empty());
    }

    #[tokio::test]
    async fn name_without_extension_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.upload("Makefile", b"all:".to_vec()).await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn empty_allow_list_accepts_any_type() {
        let app = TestApp::spawn_with(|c| c.storage.allowed_extensions.clear()).await;

        let res = app.upload("Makefile", b"all:".to_vec()).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["file"]["extension"], "");
    }

    #[tokio::test]
    async fn missing_file_field_is_rejected() {
        let app = TestApp::spawn().await;
        let form = reqwest::multipart::Form::new().text("comment", "no file here");

        let res = app.post_form(form).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn empty_filename_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.upload("", b"data".to_vec()).await;

        assert_eq!(res.status, 400);
        assert!(app.listed_names().await.is_empty());
    }

    #[tokio::test]
    async fn non_multipart_body_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .post(format!("http://{}{}", app.addr, routes::UPLOAD))
            .body("just text")
            .send()
            .await
            .unwrap();

        assert_eq!(res.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn client_path_is_stripped_from_filename() {
        let app = TestApp::spawn().await;

        let res = app.upload("../../outside.txt", b"sneaky".to_vec()).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["file"]["name"], "outside.txt");
        assert!(app.upload_dir.join("outside.txt").exists());
        assert!(!app.root.path().join("outside.txt").exists());
    }

    #[tokio::test]
    async fn oversized_upload_returns_413_and_stores_nothing() {
        let app = TestApp::spawn_with(|c| c.storage.max_upload_size = 1024).await;

        let res = app.upload("big.txt", vec![b'x'; 8 * 1024]).await;

        assert_eq!(res.status, 413);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
        assert!(app.listed_names().await.is_empty());
        let staged = std::fs::read_dir(app.upload_dir.join(".tmp")).unwrap().count();
        assert_eq!(staged, 0);
    }

    #[tokio::test]
    async fn body_over_request_limit_returns_413() {
        let app = TestApp::spawn_with(|c| c.storage.max_upload_size = 1024).await;
        // The padding field is skipped, so only the request body limit can trip.
        let form = reqwest::multipart::Form::new()
            .text("padding", "p".repeat(96 * 1024))
            .part(
                "file",
                reqwest::multipart::Part::bytes(b"tiny".to_vec()).file_name("tiny.txt"),
            );

        let res = app.post_form(form).await;

        assert_eq!(res.status, 413);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
        assert!(app.listed_names().await.is_empty());
    }

    #[tokio::test]
    async fn upload_at_exact_limit_succeeds() {
        let app = TestApp::spawn_with(|c| c.storage.max_upload_size = 1024).await;

        let res = app.upload("edge.txt", vec![b'x'; 1024]).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["file"]["size_bytes"], 1024);
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::FILES).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn listing_is_newest_modified_first() {
        let app = TestApp::spawn().await;
        app.upload("a.txt", b"a".to_vec()).await;
        app.upload("b.txt", b"b".to_vec()).await;
        set_mtime(&app, "a.txt", 20);
        set_mtime(&app, "b.txt", 10);

        assert_eq!(app.listed_names().await, ["b.txt", "a.txt"]);

        set_mtime(&app, "a.txt", 0);

        assert_eq!(app.listed_names().await, ["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn files_added_outside_the_server_are_listed() {
        let app = TestApp::spawn().await;
        std::fs::write(app.upload_dir.join("manual.pdf"), b"%PDF").unwrap();

        assert_eq!(app.listed_names().await, ["manual.pdf"]);
    }

    #[tokio::test]
    async fn hidden_files_are_not_listed() {
        let app = TestApp::spawn().await;
        std::fs::write(app.upload_dir.join(".notes.txt"), b"private").unwrap();
        app.upload("shown.txt", b"public".to_vec()).await;

        assert_eq!(app.listed_names().await, ["shown.txt"]);
        assert!(!app.get(routes::HOME).await.text().contains(".notes.txt"));
    }
}

mod download {
    use super::*;

    #[tokio::test]
    async fn download_returns_exact_bytes() {
        let app = TestApp::spawn().await;
        let data: Vec<u8> = (0..100_000u32).map(|i| (i * 7 % 256) as u8).collect();

        let uploaded = app.upload("data.zip", data.clone()).await;
        let name = uploaded.body["file"]["name"].as_str().unwrap();
        let res = app.get(&routes::download(name)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.bytes, data);
        assert_eq!(res.header("content-type"), "application/zip");
        assert_eq!(res.header("content-length"), "100000");
        assert_eq!(
            res.header("content-disposition"),
            "attachment; filename=\"data.zip\"; filename*=UTF-8''data.zip"
        );
    }

    #[tokio::test]
    async fn download_of_suffixed_name_returns_second_content() {
        let app = TestApp::spawn().await;
        app.upload("x.txt", b"first".to_vec()).await;
        let second = app.upload("x.txt", b"second".to_vec()).await;

        let name = second.body["file"]["name"].as_str().unwrap();
        let res = app.get(&routes::download(name)).await;

        assert_eq!(res.bytes, b"second");
    }

    #[tokio::test]
    async fn unknown_file_is_404() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::download("missing.txt")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let app = TestApp::spawn().await;
        std::fs::write(app.root.path().join("secret.txt"), b"top secret").unwrap();

        for path in ["/download/..%2Fsecret.txt", "/download/..%5Csecret.txt"] {
            let res = app.get(path).await;
            assert!(
                res.status == 400 || res.status == 404,
                "{path} returned {}",
                res.status
            );
            assert_ne!(res.bytes, b"top secret");
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_out_of_store_is_rejected() {
        let app = TestApp::spawn().await;
        let outside = app.root.path().join("secret.txt");
        std::fs::write(&outside, b"top secret").unwrap();
        std::os::unix::fs::symlink(&outside, app.upload_dir.join("link.txt")).unwrap();

        let res = app.get(&routes::download("link.txt")).await;

        assert_eq!(res.status, 400);
        assert_ne!(res.bytes, b"top secret");
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn deleted_file_disappears() {
        let app = TestApp::spawn().await;
        app.upload("x.txt", b"bye".to_vec()).await;

        let res = app.delete(&routes::delete("x.txt")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["message"], "File deleted successfully");
        assert!(app.listed_names().await.is_empty());
        assert_eq!(app.get(&routes::download("x.txt")).await.status, 404);
    }

    #[tokio::test]
    async fn name_with_trailing_space_is_not_trimmed() {
        let app = TestApp::spawn().await;
        app.upload("x.txt", b"keep".to_vec()).await;

        let res = app.delete("/delete/x.txt%20").await;

        assert_eq!(res.status, 404);
        assert_eq!(app.listed_names().await, ["x.txt"]);
        assert_eq!(app.get("/download/x.txt%20").await.status, 404);
    }

    #[tokio::test]
    async fn deleting_unknown_file_is_404() {
        let app = TestApp::spawn().await;

        let res = app.delete(&routes::delete("ghost.txt")).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn delete_cannot_escape_store() {
        let app = TestApp::spawn().await;
        let outside = app.root.path().join("keep.txt");
        std::fs::write(&outside, b"keep").unwrap();

        let res = app.delete("/delete/..%2Fkeep.txt").await;

        assert_eq!(res.status, 400);
        assert!(outside.exists());
    }

    #[tokio::test]
    async fn get_on_delete_route_is_not_allowed() {
        let app = TestApp::spawn().await;
        app.upload("x.txt", b"stay".to_vec()).await;

        let res = app.get(&routes::delete("x.txt")).await;

        assert_eq!(res.status, 405);
        assert_eq!(app.listed_names().await, ["x.txt"]);
    }
}
