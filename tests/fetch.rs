use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use donation_report::{DonationClient, DonationSource, ErrorClass, ReportError, ReportPeriod, SupporterId};

/// Serves a single HTTP response on a local port and hands back the request head.
fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local port");
    let url = format!("http://{}", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept connection");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
        let mut head = String::new();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).expect("read request") == 0 || line == "\r\n" {
                break;
            }
            head.push_str(&line);
        }
        stream.write_all(response.as_bytes()).expect("write response");
        head
    });

    (url, handle)
}

fn client(url: &str) -> DonationClient {
    DonationClient::new("secret-token", url, Duration::from_secs(5)).expect("client builds")
}

fn january() -> ReportPeriod {
    ReportPeriod::new(2023, 1).unwrap()
}

#[test]
fn fetches_month_with_bearer_token_and_date_range() {
    let (url, server) = serve_once(
        "200 OK",
        r#"[{"supporter_id": 1, "supporter_name": "Ada", "amount": "50", "created_at": "2023-01-05T10:00:00"},
            {"supporter_id": "x", "amount": null}]"#,
    );

    let records = client(&url).fetch(&january()).expect("fetch succeeds");
    let head = server.join().unwrap().to_ascii_lowercase();

    assert!(
        head.starts_with("get /donations?start_date=2023-01-01&end_date=2023-01-31 http/1.1"),
        "unexpected request line: {head}"
    );
    assert!(head.contains("authorization: bearer secret-token"));
    assert!(head.contains("content-type: application/json"));

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].supporter_id, SupporterId::number(1));
    assert_eq!(records[0].amount, 50.0);
    assert_eq!(records[1].supporter_id, SupporterId::text("x"));
    assert_eq!(records[1].amount, 0.0);
}

#[test]
fn leap_february_ends_on_the_29th() {
    let (url, server) = serve_once("200 OK", "[]");
    let period = ReportPeriod::new(2024, 2).unwrap();

    let records = client(&format!("{url}/")).fetch(&period).expect("fetch succeeds");
    let head = server.join().unwrap();

    assert!(records.is_empty());
    assert!(head.contains("start_date=2024-02-01&end_date=2024-02-29"));
}

#[test]
fn non_success_status_is_a_response_error() {
    let (url, server) = serve_once("500 Internal Server Error", r#"{"error": "boom"}"#);

    let err = client(&url).fetch(&january()).unwrap_err();
    server.join().unwrap();

    match &err {
        ReportError::Response { status, body } => {
            assert_eq!(*status, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("expected a response error, got {other:?}"),
    }
    assert_eq!(err.class(), ErrorClass::Api);
}

#[test]
fn non_list_body_is_a_decode_error() {
    let (url, server) = serve_once("200 OK", r#"{"donations": []}"#);

    let err = client(&url).fetch(&january()).unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, ReportError::Decode(_)), "got {err:?}");
    assert_eq!(err.class(), ErrorClass::Api);
}

#[test]
fn unreachable_host_is_a_transport_error() {
    let url = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let err = client(&url).fetch(&january()).unwrap_err();
    match &err {
        ReportError::Transport { url: failed, .. } => assert!(failed.ends_with("/donations")),
        other => panic!("expected a transport error, got {other:?}"),
    }
    assert_eq!(err.class(), ErrorClass::Api);
}
