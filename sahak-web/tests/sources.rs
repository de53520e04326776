use sahak_common::BROWSER_USER_AGENT;
use sahak_web::history_db::HistoryDbQuery;
use sahak_web::{DocumentSource, EncyKorea, HistoryDb, SourceError, SourceId, SourceOptions, Wikipedia};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RESULT_PAGE: &str = r#"<html><body><ul class="search_list">
  <li><div class="cont">김옥균은 1884년 갑신정변을 일으킨 급진 개화파의 지도자로 근대 국가 수립을 꾀하였다.</div></li>
  <li><div class="cont">우정총국 개국 축하연을 계기로 정변을 일으켰으나 청군의 개입으로 삼일 만에 실패하였다.</div></li>
</ul></body></html>"#;

fn opts(server: &MockServer) -> SourceOptions {
    SourceOptions {
        base_url: Some(format!("{}/", server.uri())),
        timeout: Some(Duration::from_millis(300)),
        user_agent: None,
    }
}

#[tokio::test]
async fn history_db_sends_keyword_and_browser_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/searchResult.do"))
        .and(query_param("searchKeyword", "김옥균"))
        .and(query_param("limit", "20"))
        .and(header("user-agent", BROWSER_USER_AGENT))
        .and(header("referer", "https://db.history.go.kr/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULT_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let db = HistoryDb::with_options(HistoryDbQuery::default(), &opts(&server)).unwrap();
    let snippet = db.snippet("김옥균").await.expect("snippet");

    assert_eq!(snippet.source, SourceId::HistoryDb);
    assert!(snippet.text.starts_with("김옥균은 1884년"));
    assert!(snippet.text.contains("다. 우정총국"));
}

#[tokio::test]
async fn history_db_server_error_is_an_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let db = HistoryDb::with_options(HistoryDbQuery::default(), &opts(&server)).unwrap();
    let err = db.fetch("김옥균").await.unwrap_err();
    assert!(matches!(err, SourceError::Http(_)));
}

#[tokio::test]
async fn history_db_server_error_degrades_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let db = HistoryDb::with_options(HistoryDbQuery::default(), &opts(&server)).unwrap();
    assert_eq!(db.snippet("김옥균").await, None);
}

#[tokio::test]
async fn history_db_timeout_degrades_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(RESULT_PAGE)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let db = HistoryDb::with_options(HistoryDbQuery::default(), &opts(&server)).unwrap();
    assert_eq!(db.snippet("김옥균").await, None);
}

#[tokio::test]
async fn history_db_page_without_fragments_has_no_snippet() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>검색 결과가 없습니다</p>"))
        .mount(&server)
        .await;

    let db = HistoryDb::with_options(HistoryDbQuery::default(), &opts(&server)).unwrap();
    assert_eq!(db.fetch("없는사람").await.unwrap(), None);
}

#[tokio::test]
async fn encykorea_requests_the_encoded_article_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Article/Search/%EC%95%88%EC%A4%91%EA%B7%BC"))
        .and(header("user-agent", "Mozilla/5.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="search_list"><p>안중근</p><p>대한의군 참모중장으로 의거를 일으켰다.</p></div>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let ency = EncyKorea::with_options(&opts(&server)).unwrap();
    let snippet = ency.snippet("안중근").await.expect("snippet");
    assert_eq!(snippet.text, "안중근대한의군 참모중장으로 의거를 일으켰다.");
}

#[tokio::test]
async fn encykorea_not_found_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let ency = EncyKorea::with_options(&opts(&server)).unwrap();
    assert_eq!(ency.snippet("안중근").await, None);
}

#[tokio::test]
async fn wikipedia_returns_text_and_image() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/%EB%82%98%ED%8F%B4%EB%A0%88%EC%98%B9"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="mw-parser-output"><table class="infobox"><tr><td><img src="//upload.wikimedia.org/n.jpg"></td></tr></table><p>프랑스 제1제국의 황제.</p></div>"#,
        ))
        .mount(&server)
        .await;

    let wiki = Wikipedia::with_options(&opts(&server)).unwrap();
    let snippet = wiki.snippet("나폴레옹").await.expect("article");
    assert_eq!(snippet.text, "프랑스 제1제국의 황제.\n");
    assert_eq!(snippet.image_url.as_deref(), Some("https://upload.wikimedia.org/n.jpg"));
}

#[tokio::test]
async fn unreachable_host_is_none() {
    let db = HistoryDb::with_options(
        HistoryDbQuery::default(),
        &SourceOptions {
            base_url: Some("http://127.0.0.1:9/".into()),
            timeout: Some(Duration::from_millis(300)),
            user_agent: None,
        },
    )
    .unwrap();
    assert_eq!(db.snippet("김옥균").await, None);
}
