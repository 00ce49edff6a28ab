use header_check_filter::exchange::{RequestParts, ResponseRecorder};
use header_check_filter::header_check::{PLUGIN_NAME, RUNNER_HEADER};
use header_check_filter::{builtin_registry, ConfiguredFilter, FilterOutcome, RegistryError};
use http::StatusCode;

const CONFIG: &[u8] = br#"{
    "redirect_url": "https://auth.example/login",
    "gateway_base_url": "https://gw.example",
    "call_back_path": "/cb"
}"#;

const LOGIN_REDIRECT: &str =
    "https://auth.example/login?redirect_url=https%3A%2F%2Fgw.example%2Fapi%2Ffoo";

fn configured(raw: &[u8]) -> Box<dyn ConfiguredFilter> {
    builtin_registry()
        .expect("builtin plugins register")
        .configure(PLUGIN_NAME, raw)
        .expect("config parses")
}

fn run(filter: &dyn ConfiguredFilter, request: RequestParts) -> (FilterOutcome, ResponseRecorder) {
    let mut response = ResponseRecorder::new();
    let outcome = filter.filter(&request, &mut response);
    (outcome, response)
}

#[test]
fn valid_token_is_passed() {
    let filter = configured(CONFIG);
    let (outcome, response) = run(
        filter.as_ref(),
        RequestParts::new("/api/foo").with_header("X-TOKEN", "abc123"),
    );

    assert_eq!(outcome, FilterOutcome::Pass);
    assert!(response.header(RUNNER_HEADER).is_some());
    assert_eq!(response.body(), b"pass");
}

#[test]
fn missing_token_is_sent_to_login() {
    let filter = configured(CONFIG);
    let (_, response) = run(filter.as_ref(), RequestParts::new("/api/foo"));

    assert_eq!(response.status(), Some(StatusCode::FOUND));
    assert_eq!(response.header("Location"), Some(LOGIN_REDIRECT));
}

#[test]
fn rejected_token_is_sent_to_login() {
    let filter = configured(CONFIG);
    let (_, response) = run(
        filter.as_ref(),
        RequestParts::new("/api/foo").with_header("X-TOKEN", "invalid-xyz"),
    );

    assert_eq!(response.status(), Some(StatusCode::FOUND));
    assert_eq!(response.header("Location"), Some(LOGIN_REDIRECT));
}

#[test]
fn callback_path_writes_nothing() {
    let filter = configured(CONFIG);
    for token in ["abc123", "invalid-xyz", ""] {
        let (outcome, response) = run(
            filter.as_ref(),
            RequestParts::new("/cb").with_header("X-TOKEN", token),
        );
        assert_eq!(outcome, FilterOutcome::Callback);
        assert!(response.is_untouched());
    }
}

#[test]
fn incomplete_config_writes_nothing() {
    let filter = configured(
        br#"{"redirect_url":"","gateway_base_url":"https://gw.example","call_back_path":"/cb"}"#,
    );
    for path in ["/api/foo", "/cb"] {
        let (outcome, response) = run(
            filter.as_ref(),
            RequestParts::new(path).with_header("X-TOKEN", "abc123"),
        );
        assert_eq!(outcome, FilterOutcome::InvalidConfig);
        assert!(response.is_untouched());
    }
}

#[test]
fn malformed_config_is_rejected() {
    let registry = builtin_registry().unwrap();
    let err = registry
        .configure(PLUGIN_NAME, b"redirect_url=https://auth.example")
        .err()
        .expect("malformed payload must fail");
    assert!(matches!(err, RegistryError::Config { .. }));
}

#[test]
fn one_config_serves_concurrent_requests() {
    let filter = configured(CONFIG);
    std::thread::scope(|scope| {
        for i in 0..8 {
            let filter = filter.as_ref();
            scope.spawn(move || {
                let token = if i % 2 == 0 { "abc123" } else { "invalid" };
                let (outcome, _) = run(
                    filter,
                    RequestParts::new("/api/foo").with_header("X-TOKEN", token),
                );
                if i % 2 == 0 {
                    assert_eq!(outcome, FilterOutcome::Pass);
                } else {
                    assert!(matches!(outcome, FilterOutcome::Redirect { .. }));
                }
            });
        }
    });
}
