use std::time::Duration;

use artfetch::{
    config::JobConfig,
    downloader::Job,
    request,
    source::{ApiSource, WorklistSource},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const JPEG_A: &[u8] = b"\xFF\xD8\xFF\xE0fixture-bytes-a\xFF\xD9";
const JPEG_B: &[u8] = b"\xFF\xD8\xFF\xE0fixture-bytes-b\xFF\xD9";

fn test_config(out_dir: &std::path::Path) -> JobConfig {
    let mut config = JobConfig::new(out_dir.to_str().unwrap());
    config.item_delay = Duration::ZERO;
    config
}

fn client() -> reqwest::Client {
    request::new(Duration::from_secs(5)).unwrap()
}

fn envelope(server_uri: &str, last_page: u64) -> String {
    format!(
        r#"{{"data": [
            {{"id": 11, "title": "Virgen de la Merced", "image": {{"large": "{uri}/img/11.jpg"}}}},
            {{"id": 12, "title": "Paisaje: con/rio", "image": {{"large": "{uri}/img/12.jpg"}}}}
        ], "last_page": {last_page}}}"#,
        uri = server_uri,
        last_page = last_page
    )
}

async fn mount_api_page(server: &MockServer, page: &str, body: String, hits: u64) {
    Mock::given(method("GET"))
        .and(path("/api/artworks"))
        .and(query_param("page", page))
        .and(query_param("author_show", "784"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .expect(hits)
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, img_path: &str, bytes: &[u8], hits: u64) {
    Mock::given(method("GET"))
        .and(path(img_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .expect(hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn single_page_job_saves_every_item() {
    let server = MockServer::start().await;
    mount_api_page(&server, "1", envelope(&server.uri(), 1), 1).await;
    mount_image(&server, "/img/11.jpg", JPEG_A, 1).await;
    mount_image(&server, "/img/12.jpg", JPEG_B, 1).await;

    let out = tempfile::tempdir().unwrap();
    let client = client();
    let source = ApiSource::new(client.clone(), server.uri(), 784);
    let mut job = Job::new(source, client, test_config(out.path()));
    job.run().await.unwrap();

    assert_eq!(job.tally().saved(), 2);
    assert_eq!(job.tally().failed().len(), 0);

    // saved bytes are identical to the remote resource
    let bytes = std::fs::read(out.path().join("11_Virgen de la Merced.jpg")).unwrap();
    assert_eq!(bytes, JPEG_A);
    // filename carries no characters illegal on common filesystems
    assert!(out.path().join("12_Paisaje conrio.jpg").exists());
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 2);
}

#[tokio::test]
async fn record_without_image_is_counted_not_written() {
    let server = MockServer::start().await;
    let body = r#"{"data": [{"id": 31, "title": "sin imagen"}], "last_page": 1}"#.to_string();
    mount_api_page(&server, "1", body, 1).await;

    let out = tempfile::tempdir().unwrap();
    let client = client();
    let source = ApiSource::new(client.clone(), server.uri(), 784);
    let mut job = Job::new(source, client, test_config(out.path()));
    job.run().await.unwrap();

    assert_eq!(job.tally().saved(), 0);
    assert_eq!(job.tally().skipped_no_image(), 1);
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn http_404_is_failed_and_job_continues() {
    let server = MockServer::start().await;
    mount_api_page(&server, "1", envelope(&server.uri(), 1), 1).await;
    Mock::given(method("GET"))
        .and(path("/img/11.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_image(&server, "/img/12.jpg", JPEG_B, 1).await;

    let out = tempfile::tempdir().unwrap();
    let client = client();
    let source = ApiSource::new(client.clone(), server.uri(), 784);
    let mut job = Job::new(source, client, test_config(out.path()));
    job.run().await.unwrap();

    assert_eq!(job.tally().saved(), 1);
    assert_eq!(job.tally().failed().len(), 1);
    assert!(job.tally().failed()[0].1.contains("404"));
    // the failed item left no partial file behind
    assert!(!out.path().join("11_Virgen de la Merced.jpg").exists());
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn second_run_skips_existing_without_refetching() {
    let server = MockServer::start().await;
    mount_api_page(&server, "1", envelope(&server.uri(), 1), 2).await;
    // images must be fetched exactly once across both runs
    mount_image(&server, "/img/11.jpg", JPEG_A, 1).await;
    mount_image(&server, "/img/12.jpg", JPEG_B, 1).await;

    let out = tempfile::tempdir().unwrap();
    let client = client();

    let source = ApiSource::new(client.clone(), server.uri(), 784);
    let mut first = Job::new(source, client.clone(), test_config(out.path()));
    first.run().await.unwrap();
    assert_eq!(first.tally().saved(), 2);

    let source = ApiSource::new(client.clone(), server.uri(), 784);
    let mut second = Job::new(source, client, test_config(out.path()));
    second.run().await.unwrap();

    assert_eq!(second.tally().saved(), 0);
    assert_eq!(second.tally().skipped_existing(), 2);
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 2);
}

#[tokio::test]
async fn paginated_api_stops_at_last_page() {
    let server = MockServer::start().await;
    mount_api_page(&server, "1", envelope(&server.uri(), 2), 1).await;
    let page2 = format!(
        r#"{{"data": [{{"id": 21, "title": "Bodegon", "image": {{"large": "{uri}/img/21.jpg"}}}}], "last_page": 2}}"#,
        uri = server.uri()
    );
    mount_api_page(&server, "2", page2, 1).await;
    mount_image(&server, "/img/11.jpg", JPEG_A, 1).await;
    mount_image(&server, "/img/12.jpg", JPEG_B, 1).await;
    mount_image(&server, "/img/21.jpg", JPEG_A, 1).await;

    let out = tempfile::tempdir().unwrap();
    let client = client();
    let source = ApiSource::new(client.clone(), server.uri(), 784);
    let mut job = Job::new(source, client, test_config(out.path()));
    job.run().await.unwrap();

    assert_eq!(job.tally().saved(), 3);
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 3);
}

#[tokio::test]
async fn fatal_page_error_aborts_with_page_index() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/artworks"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let out = tempfile::tempdir().unwrap();
    let client = client();
    let source = ApiSource::new(client.clone(), server.uri(), 784);
    let mut job = Job::new(source, client, test_config(out.path()));
    let err = job.run().await.unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("page 1"), "unexpected error: {message}");
    assert_eq!(job.tally().saved(), 0);
}

#[tokio::test]
async fn malformed_json_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/artworks"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>not json</html>", "text/html"))
        .mount(&server)
        .await;

    let out = tempfile::tempdir().unwrap();
    let client = client();
    let source = ApiSource::new(client.clone(), server.uri(), 784);
    let mut job = Job::new(source, client, test_config(out.path()));
    let err = job.run().await.unwrap_err();
    assert!(format!("{:#}", err).contains("JSON"));
}

#[tokio::test]
async fn worklist_job_resolves_each_painting() {
    let server = MockServer::start().await;
    let list = r#"
        <html><body><ul class="painting-list-text">
          <li><a href="/en/test-artist/uno">Uno</a></li>
          <li><a href="/en/test-artist/dos">Dos</a></li>
        </ul></body></html>"#;
    Mock::given(method("GET"))
        .and(path("/en/test-artist/all-works/text-list"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(list, "text/html"))
        .expect(1)
        .mount(&server)
        .await;
    let painting = format!(
        r#"<div class="wiki-layout-artist-image-wrapper"><img src="{}/images/uno.jpg"></div>"#,
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/en/test-artist/uno"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(painting, "text/html"))
        .mount(&server)
        .await;
    // second painting page renders without the image wrapper
    Mock::given(method("GET"))
        .and(path("/en/test-artist/dos"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html><body></body></html>", "text/html"))
        .mount(&server)
        .await;
    mount_image(&server, "/images/uno.jpg", JPEG_A, 1).await;

    let out = tempfile::tempdir().unwrap();
    let client = client();
    let source = WorklistSource::new(client.clone(), server.uri(), "test-artist");
    let mut job = Job::new(source, client, test_config(out.path()));
    job.run().await.unwrap();

    assert_eq!(job.tally().saved(), 1);
    assert_eq!(job.tally().skipped_no_image(), 1);
    // no id from the work list, so the counter suffix names the file
    assert!(out.path().join("Uno_001.jpg").exists());
}
