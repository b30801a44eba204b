//! Transfers against a local mock server

use std::time::Duration;

use pgcurl_easy::{CancellationToken, Code, Easy, Error, InfoString};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Responds with one `name: value` line per request header.
struct EchoHeaders;

impl Respond for EchoHeaders {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut body = String::new();
        for (name, value) in &request.headers {
            body.push_str(name.as_str());
            body.push_str(": ");
            body.push_str(value.to_str().unwrap_or("<binary>"));
            body.push('\n');
        }
        ResponseTemplate::new(200).set_body_string(body)
    }
}

/// Responds with the request method and body.
struct EchoBody;

impl Respond for EchoBody {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut body = format!("{} ", request.method).into_bytes();
        body.extend_from_slice(&request.body);
        ResponseTemplate::new(200).set_body_bytes(body)
    }
}

fn body(easy: &Easy) -> Vec<u8> {
    match easy.info_string("CURLINFO_RESPONSE").unwrap() {
        InfoString::Body(bytes) => bytes.to_vec(),
        InfoString::Metadata(_) => panic!("RESPONSE must be served from the download buffer"),
    }
}

fn body_text(easy: &Easy) -> String {
    String::from_utf8(body(easy)).unwrap()
}

fn perform_code(err: &Error) -> Option<Code> {
    match err {
        Error::Perform { source } => Some(source.code()),
        _ => None,
    }
}

#[rstest]
#[case("CURLOPT_URL", "CURLINFO_RESPONSE_CODE")]
#[case("url", "response_code")]
#[case("CurlOpt_Url", "CurlInfo_Response_Code")]
#[tokio::test]
async fn mixed_case_names_drive_the_same_transfer(#[case] option: &str, #[case] info: &str) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let mut easy = Easy::new();
    easy.set_option_string(option, &format!("{}/ok", server.uri()))
        .unwrap();
    assert!(easy.perform().await.unwrap());
    assert_eq!(easy.info_long(info).unwrap(), 204);
}

#[tokio::test]
async fn appended_header_is_sent() {
    let server = MockServer::start().await;
    Mock::given(path("/echo"))
        .respond_with(EchoHeaders)
        .mount(&server)
        .await;

    let mut easy = Easy::new();
    easy.set_option_string("CURLOPT_URL", &format!("{}/echo", server.uri()))
        .unwrap();
    easy.append_header("X-Test", "1").unwrap();
    easy.perform().await.unwrap();

    assert!(body_text(&easy).lines().any(|l| l == "x-test: 1"));
}

#[tokio::test]
async fn duplicate_headers_are_all_sent() {
    let server = MockServer::start().await;
    Mock::given(path("/echo"))
        .respond_with(EchoHeaders)
        .mount(&server)
        .await;

    let mut easy = Easy::new();
    easy.set_option_string("URL", &format!("{}/echo", server.uri()))
        .unwrap();
    easy.append_header("X-Dup", "a").unwrap();
    easy.append_header("X-Dup", "b").unwrap();
    easy.perform().await.unwrap();

    let lines: Vec<String> = body_text(&easy)
        .lines()
        .filter(|l| l.starts_with("x-dup"))
        .map(str::to_owned)
        .collect();
    assert_eq!(lines, vec!["x-dup: a".to_owned(), "x-dup: b".to_owned()]);
}

#[tokio::test]
async fn reset_stops_sending_earlier_headers() {
    let server = MockServer::start().await;
    Mock::given(path("/echo"))
        .respond_with(EchoHeaders)
        .mount(&server)
        .await;
    let url = format!("{}/echo", server.uri());

    let mut easy = Easy::new();
    easy.set_option_string("URL", &url).unwrap();
    easy.append_header("X-Before", "reset").unwrap();
    easy.perform().await.unwrap();
    assert!(body_text(&easy).contains("x-before: reset"));

    easy.reset();
    easy.set_option_string("URL", &url).unwrap();
    easy.perform().await.unwrap();
    assert!(!body_text(&easy).contains("x-before"));
}

#[tokio::test]
async fn user_agent_option_yields_to_appended_header() {
    let server = MockServer::start().await;
    Mock::given(path("/echo"))
        .respond_with(EchoHeaders)
        .mount(&server)
        .await;

    let mut easy = Easy::new();
    easy.set_option_string("URL", &format!("{}/echo", server.uri()))
        .unwrap();
    easy.set_option_string("USERAGENT", "pgcurl-test/1").unwrap();
    easy.perform().await.unwrap();
    assert!(body_text(&easy).contains("user-agent: pgcurl-test/1"));

    easy.append_header("User-Agent", "override/2").unwrap();
    easy.perform().await.unwrap();
    let text = body_text(&easy);
    assert!(text.contains("user-agent: override/2"));
    assert!(!text.contains("pgcurl-test/1"));
}

#[rstest]
#[case("hello, upload")]
#[case("")]
#[tokio::test]
async fn read_data_uploads_exact_bytes(#[case] payload: &str) {
    let server = MockServer::start().await;
    Mock::given(path("/upload"))
        .respond_with(EchoBody)
        .mount(&server)
        .await;

    let mut easy = Easy::new();
    easy.set_option_string("URL", &format!("{}/upload", server.uri()))
        .unwrap();
    easy.set_option_string("CURLOPT_READDATA", payload).unwrap();
    assert!(easy.perform().await.unwrap());

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].method.as_str(), "PUT");
    assert_eq!(received[0].body, payload.as_bytes());
    assert_eq!(body_text(&easy), format!("PUT {payload}"));
}

#[tokio::test]
async fn post_sends_bound_read_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/form"))
        .respond_with(EchoBody)
        .mount(&server)
        .await;

    let mut easy = Easy::new();
    easy.set_option_string("URL", &format!("{}/form", server.uri()))
        .unwrap();
    easy.set_option_string("READDATA", "a=1&b=2").unwrap();
    easy.set_option_long("POST", 1).unwrap();
    easy.perform().await.unwrap();

    assert_eq!(easy.info_long("RESPONSE_CODE").unwrap(), 200);
    assert_eq!(body_text(&easy), "POST a=1&b=2");
}

#[tokio::test]
async fn repeated_perform_resends_whole_payload() {
    let server = MockServer::start().await;
    Mock::given(path("/again"))
        .respond_with(EchoBody)
        .mount(&server)
        .await;

    let mut easy = Easy::new();
    easy.set_option_string("URL", &format!("{}/again", server.uri()))
        .unwrap();
    easy.set_option_string("READDATA", "same body").unwrap();
    easy.perform().await.unwrap();
    easy.perform().await.unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(received[1].body, b"same body");
    assert_eq!(body_text(&easy), "PUT same body");
}

#[tokio::test]
async fn custom_request_and_nobody_pick_the_verb() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut easy = Easy::new();
    easy.set_option_string("URL", &server.uri()).unwrap();
    easy.set_option_string("CUSTOMREQUEST", "DELETE").unwrap();
    easy.perform().await.unwrap();
    assert_eq!(easy.info_long("RESPONSE_CODE").unwrap(), 202);

    easy.reset();
    easy.set_option_string("URL", &server.uri()).unwrap();
    easy.set_option_long("NOBODY", 1).unwrap();
    easy.perform().await.unwrap();
    assert_eq!(easy.info_long("RESPONSE_CODE").unwrap(), 200);
    assert!(body(&easy).is_empty());
}

#[tokio::test]
async fn not_found_is_a_completed_transfer() {
    let server = MockServer::start().await;
    Mock::given(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such thing"))
        .mount(&server)
        .await;

    let mut easy = Easy::new();
    easy.set_option_string("URL", &format!("{}/missing", server.uri()))
        .unwrap();
    assert!(easy.perform().await.unwrap());
    assert_eq!(easy.info_long("CURLINFO_RESPONSE_CODE").unwrap(), 404);
    assert_eq!(body_text(&easy), "no such thing");
}

#[tokio::test]
async fn response_body_is_byte_exact() {
    let payload: Vec<u8> = vec![0x00, 0xff, b'\r', b'\n', 0x80, b'a', 0x00, b' ', 0xfe];
    let server = MockServer::start().await;
    Mock::given(path("/bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
        .mount(&server)
        .await;

    let mut easy = Easy::new();
    easy.set_option_string("URL", &format!("{}/bin", server.uri()))
        .unwrap();
    easy.perform().await.unwrap();

    assert_eq!(body(&easy), payload);
    assert_eq!(easy.response().unwrap(), payload.as_slice());
}

#[tokio::test]
async fn content_type_is_reported_and_absent_is_none() {
    let server = MockServer::start().await;
    Mock::given(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .mount(&server)
        .await;
    Mock::given(path("/plain"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut easy = Easy::new();
    easy.set_option_string("URL", &format!("{}/json", server.uri()))
        .unwrap();
    easy.perform().await.unwrap();
    assert_eq!(
        easy.info_string("CONTENT_TYPE").unwrap(),
        InfoString::Metadata(Some("application/json"))
    );

    easy.set_option_string("URL", &format!("{}/plain", server.uri()))
        .unwrap();
    easy.perform().await.unwrap();
    assert_eq!(
        easy.info_string("CONTENT_TYPE").unwrap(),
        InfoString::Metadata(None)
    );
}

#[tokio::test]
async fn download_buffer_is_cleared_per_transfer() {
    let server = MockServer::start().await;
    Mock::given(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string("first"))
        .mount(&server)
        .await;
    Mock::given(path("/b"))
        .respond_with(ResponseTemplate::new(200).set_body_string("second"))
        .mount(&server)
        .await;

    let mut easy = Easy::new();
    easy.set_option_string("URL", &format!("{}/a", server.uri()))
        .unwrap();
    easy.perform().await.unwrap();
    easy.set_option_string("URL", &format!("{}/b", server.uri()))
        .unwrap();
    easy.perform().await.unwrap();
    assert_eq!(body_text(&easy), "second");
}

#[tokio::test]
async fn redirects_follow_only_when_asked() {
    let server = MockServer::start().await;
    Mock::given(path("/old"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", format!("{}/new", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&server)
        .await;
    let old = format!("{}/old", server.uri());

    let mut easy = Easy::new();
    easy.set_option_string("URL", &old).unwrap();
    easy.perform().await.unwrap();
    assert_eq!(easy.info_long("RESPONSE_CODE").unwrap(), 302);

    easy.set_option_long("FOLLOWLOCATION", 1).unwrap();
    easy.perform().await.unwrap();
    assert_eq!(easy.info_long("RESPONSE_CODE").unwrap(), 200);
    assert_eq!(body_text(&easy), "moved");

    easy.set_option_long("MAXREDIRS", 0).unwrap();
    let err = easy.perform().await.unwrap_err();
    assert_eq!(perform_code(&err), Some(Code::TooManyRedirects));
}

#[tokio::test]
async fn redirect_to_other_scheme_is_refused() {
    let server = MockServer::start().await;
    Mock::given(path("/ftp"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("Location", "ftp://example.test/file"),
        )
        .mount(&server)
        .await;

    let mut easy = Easy::new();
    easy.set_option_string("URL", &format!("{}/ftp", server.uri()))
        .unwrap();
    easy.set_option_long("FOLLOWLOCATION", 1).unwrap();
    let err = easy.perform().await.unwrap_err();
    assert_eq!(perform_code(&err), Some(Code::UnsupportedProtocol));
}

#[tokio::test]
async fn non_http_url_is_refused() {
    let mut easy = Easy::new();
    easy.set_option_string("URL", "ftp://example.test/file")
        .unwrap();
    let err = easy.perform().await.unwrap_err();
    assert_eq!(perform_code(&err), Some(Code::UnsupportedProtocol));
    assert!(err.to_string().starts_with("easy_perform: Unsupported protocol"));
}

#[tokio::test]
async fn missing_url_fails_perform() {
    let mut easy = Easy::new();
    let err = easy.perform().await.unwrap_err();
    assert_eq!(perform_code(&err), Some(Code::UrlMalformat));
    assert!(easy.has_handle());
}

#[tokio::test]
async fn total_timeout_fails_perform() {
    let server = MockServer::start().await;
    Mock::given(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let mut easy = Easy::new();
    easy.set_option_string("URL", &format!("{}/slow", server.uri()))
        .unwrap();
    easy.set_option_long("TIMEOUT_MS", 100).unwrap();
    let err = easy.perform().await.unwrap_err();
    assert_eq!(perform_code(&err), Some(Code::OperationTimedOut));
}

#[tokio::test]
async fn cancellation_before_response_fails_perform() {
    let server = MockServer::start().await;
    Mock::given(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let mut easy = Easy::new().with_cancellation(token.clone());
    easy.set_option_string("URL", &format!("{}/slow", server.uri()))
        .unwrap();

    let trigger = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });
    let err = easy.perform().await.unwrap_err();
    trigger.await.unwrap();

    assert_eq!(perform_code(&err), Some(Code::AbortedByCallback));
    assert!(body(&easy).is_empty());
    assert_eq!(easy.info_long("RESPONSE_CODE").unwrap(), 0);
}

#[tokio::test]
async fn cancellation_mid_body_fails_instead_of_truncating() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await.unwrap();
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nhello")
            .await
            .unwrap();
        socket.flush().await.unwrap();
        // Hold the connection open with half the body outstanding
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let token = CancellationToken::new();
    let mut easy = Easy::new().with_cancellation(token.clone());
    easy.set_option_string("URL", &format!("http://{addr}/partial"))
        .unwrap();

    let trigger = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        token.cancel();
    });
    let err = easy.perform().await.unwrap_err();
    trigger.await.unwrap();
    server.abort();

    assert_eq!(perform_code(&err), Some(Code::AbortedByCallback));
    // Headers were read, so the abort happened while streaming the body
    assert_eq!(easy.info_long("RESPONSE_CODE").unwrap(), 200);
}

#[tokio::test]
async fn getters_before_any_handle_fail() {
    let easy = Easy::new();
    assert!(matches!(
        easy.info_string("RESPONSE"),
        Err(Error::NoHandle { .. })
    ));
    assert!(matches!(
        easy.info_long("RESPONSE_CODE"),
        Err(Error::NoHandle { .. })
    ));
}

#[tokio::test]
async fn unsupported_names_leave_state_untouched() {
    let server = MockServer::start().await;
    Mock::given(path("/upload"))
        .respond_with(EchoBody)
        .mount(&server)
        .await;

    let mut easy = Easy::new();
    easy.set_option_string("URL", &format!("{}/upload", server.uri()))
        .unwrap();
    easy.set_option_string("READDATA", "kept").unwrap();

    assert!(matches!(
        easy.set_option_string("CURLOPT_COOKIE", "a=b"),
        Err(Error::UnsupportedOption { .. })
    ));
    assert!(matches!(
        easy.set_option_long("CURLOPT_VERBOSE", 1),
        Err(Error::UnsupportedOption { .. })
    ));
    assert!(matches!(
        easy.info_string("CURLINFO_EFFECTIVE_URL"),
        Err(Error::UnsupportedInfo { .. })
    ));

    easy.perform().await.unwrap();
    assert_eq!(body_text(&easy), "PUT kept");
}
