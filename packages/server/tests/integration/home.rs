use crate::common::{SHARE_URL, TestApp, routes};

/// Server-rendered placeholder row; the inline script carries the same text.
const EMPTY_ROW: &str = "<td colspan=\"4\">No files yet</td></tr>\n    </tbody>";

#[tokio::test]
async fn home_page_shows_share_url_and_qr() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::HOME).await;

    assert_eq!(res.status, 200);
    assert!(res.header("content-type").starts_with("text/html"));
    let html = res.text();
    assert!(html.contains(SHARE_URL));
    assert!(html.contains("src=\"/static/qr_code.png\""));
    assert!(html.contains(EMPTY_ROW));
}

#[tokio::test]
async fn home_page_lists_uploaded_files() {
    let app = TestApp::spawn().await;
    app.upload("holiday photo.jpg", b"jpeg".to_vec()).await;

    let html = app.get(routes::HOME).await.text();

    assert!(html.contains("holiday_photo.jpg"));
    assert!(html.contains("href=\"/download/holiday_photo.jpg\""));
    assert!(!html.contains(EMPTY_ROW));
}

#[tokio::test]
async fn qr_image_is_served_as_png() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::QR_CODE).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.header("content-type"), "image/png");
    assert_eq!(res.header("cache-control"), "no-cache");
    assert_eq!(&res.bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn missing_static_asset_is_404() {
    let app = TestApp::spawn().await;

    let res = app.get("/static/nothing.png").await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = TestApp::spawn().await;

    assert_eq!(app.get("/nope").await.status, 404);
}
