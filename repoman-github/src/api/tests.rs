use super::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, token: Option<&str>) -> GitHubApiClient {
    let config = ApiClientConfig::github(token.map(str::to_string)).with_base_url(server.uri());
    GitHubApiClient::new(config).expect("client should build")
}

#[tokio::test]
async fn test_sends_github_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets"))
        .and(header("authorization", "Bearer secret"))
        .and(header("accept", "application/vnd.github+json"))
        .and(header("x-github-api-version", "2022-11-28"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "widgets",
            "private": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let repo = client_for(&server, Some("secret"))
        .get_repository("acme", "widgets")
        .await
        .expect("repository lookup should succeed");

    assert_eq!(repo.name, "widgets");
}

#[tokio::test]
async fn test_unparseable_repository_is_annotated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server, None)
        .get_repository("acme", "widgets")
        .await
        .expect_err("malformed body should fail");

    assert!(matches!(*err, RepomanError::Repository { .. }));
    let context = err.context().expect("parse failure carries context");
    assert_eq!(context.operation.as_deref(), Some("get_repository"));
    assert_eq!(context.metadata.get("owner").map(String::as_str), Some("acme"));
    assert_eq!(context.metadata.get("repo").map(String::as_str), Some("widgets"));
}

#[tokio::test]
async fn test_missing_repository_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;

    let err = client_for(&server, None)
        .get_repository("acme", "ghost")
        .await
        .expect_err("lookup should fail");

    assert!(err.is_not_found());
    let context = err.context().expect("not-found carries context");
    assert_eq!(context.metadata.get("repo").map(String::as_str), Some("ghost"));
    assert_eq!(context.metadata.get("owner").map(String::as_str), Some("acme"));
}

#[tokio::test]
async fn test_status_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/locked"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/throttled"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", "0"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/forbidden"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("token"));

    let err = client.get_repository("acme", "locked").await.unwrap_err();
    assert!(matches!(*err, RepomanError::Authentication { .. }));

    let err = client.get_repository("acme", "throttled").await.unwrap_err();
    match *err {
        RepomanError::RateLimit { retry_after_ms, .. } => assert_eq!(retry_after_ms, Some(0)),
        other => panic!("Expected RateLimit error, got {:?}", other),
    }

    let err = client.get_repository("acme", "forbidden").await.unwrap_err();
    assert!(matches!(*err, RepomanError::Repository { .. }));
}

#[tokio::test]
async fn test_list_org_repositories_follows_link_header() {
    let server = MockServer::start().await;
    let next = format!(
        "<{}/orgs/acme/repos?type=all&per_page=2&page=2>; rel=\"next\"",
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .and(query_param("type", "all"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", next.as_str())
                .set_body_json(json!([{"name": "test-a"}, {"name": "other"}])),
        )
        .mount(&server)
        .await;

    let page = client_for(&server, None)
        .list_repositories(&Owner::organization("acme"), PageRequest::first(2))
        .await
        .expect("listing should succeed");

    let names: Vec<_> = page.items.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["test-a", "other"]);
    assert_eq!(page.next_page, Some(2));
}

#[tokio::test]
async fn test_list_user_repositories_last_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "hello"}])))
        .mount(&server)
        .await;

    let page = client_for(&server, None)
        .list_repositories(&Owner::user("octocat"), PageRequest::first(100))
        .await
        .expect("listing should succeed");

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.next_page, None);
}

#[tokio::test]
async fn test_list_issues_marks_pull_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/issues"))
        .and(query_param("state", "all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"number": 1, "state": "open"},
            {"number": 2, "state": "closed", "pull_request": {"url": "https://example.invalid/pr/2"}}
        ])))
        .mount(&server)
        .await;

    let page = client_for(&server, None)
        .list_issues("acme", "widgets", PageRequest::first(100))
        .await
        .expect("listing should succeed");

    assert_eq!(page.items.len(), 2);
    assert!(!page.items[0].is_pull_request);
    assert!(page.items[1].is_pull_request);
    assert_eq!(page.items[1].state, "closed");
}

#[tokio::test]
async fn test_get_file_returns_sha() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/contents/.github/CODEOWNERS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "path": ".github/CODEOWNERS",
            "sha": "abc123",
            "encoding": "base64",
            "content": "KiBAYWNtZS9j\nb3Jl\n"
        })))
        .mount(&server)
        .await;

    let file = client_for(&server, None)
        .get_file("acme", "widgets", ".github/CODEOWNERS")
        .await
        .expect("read should succeed");

    assert_eq!(file.sha, "abc123");
    assert_eq!(file.path, ".github/CODEOWNERS");
}

#[tokio::test]
async fn test_put_file_create_omits_sha() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/acme/widgets/contents/.github/CODEOWNERS"))
        .and(body_json(json!({
            "message": "Add/Update CODEOWNERS file",
            "content": "KiBAYWNtZS9jb3Jl"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "content": {"sha": "blob1"},
            "commit": {"sha": "commit1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = FileWriteRequest {
        message: "Add/Update CODEOWNERS file".to_string(),
        content: "* @acme/core".to_string(),
        sha: None,
    };
    let commit = client_for(&server, Some("token"))
        .put_file("acme", "widgets", ".github/CODEOWNERS", &request)
        .await
        .expect("write should succeed");

    assert_eq!(commit.commit_sha.as_deref(), Some("commit1"));
    assert_eq!(commit.content_sha.as_deref(), Some("blob1"));
}

#[tokio::test]
async fn test_put_file_update_sends_sha() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/acme/widgets/contents/.github/CODEOWNERS"))
        .and(body_json(json!({
            "message": "Add/Update CODEOWNERS file",
            "content": "KiBAYWNtZS9jb3Jl",
            "sha": "abc123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": {"sha": "blob2"},
            "commit": {"sha": "commit2"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = FileWriteRequest {
        message: "Add/Update CODEOWNERS file".to_string(),
        content: "* @acme/core".to_string(),
        sha: Some("abc123".to_string()),
    };
    let commit = client_for(&server, Some("token"))
        .put_file("acme", "widgets", ".github/CODEOWNERS", &request)
        .await
        .expect("update should succeed");

    assert_eq!(commit.commit_sha.as_deref(), Some("commit2"));
}

#[tokio::test]
async fn test_put_file_conflict_is_repository_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/acme/widgets/contents/.github/CODEOWNERS"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "sha mismatch"})))
        .mount(&server)
        .await;

    let request = FileWriteRequest {
        message: "update".to_string(),
        content: "* @acme/core".to_string(),
        sha: Some("stale".to_string()),
    };
    let err = client_for(&server, Some("token"))
        .put_file("acme", "widgets", ".github/CODEOWNERS", &request)
        .await
        .expect_err("conflict should fail");

    assert!(matches!(*err, RepomanError::Repository { .. }));
    assert!(err.to_string().contains("409"));
}
