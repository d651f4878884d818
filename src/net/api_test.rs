use super::*;

#[test]
fn endpoint_joins_with_single_slash() {
    assert_eq!(endpoint("http://host/api", "/users/login"), "http://host/api/users/login");
    assert_eq!(endpoint("http://host/api/", "users/login"), "http://host/api/users/login");
    assert_eq!(endpoint("http://host/api/", "/bills/"), "http://host/api/bills/");
}

#[test]
fn client_trims_trailing_slash_from_base() {
    let timeouts = HttpTimeouts { request: Duration::from_secs(5), connect: Duration::from_secs(1) };
    let client = BackendClient::new("http://127.0.0.1:5000/api///", timeouts).unwrap();
    assert_eq!(client.base_url(), "http://127.0.0.1:5000/api");
    assert_eq!(client.url("/customers/list"), "http://127.0.0.1:5000/api/customers/list");
}

#[test]
fn classify_401_uses_backend_message() {
    let err = classify_failure(401, r#"{"message":"Wrong password"}"#);
    assert!(matches!(err, ApiError::Unauthorized { ref message } if message == "Wrong password"));
}

#[test]
fn classify_401_without_body_defaults_to_invalid_credentials() {
    let err = classify_failure(401, "");
    assert!(matches!(err, ApiError::Unauthorized { ref message } if message == INVALID_CREDENTIALS));
}

#[test]
fn classify_other_status_keeps_code() {
    let err = classify_failure(500, "<html>oops</html>");
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "request failed: 500");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn classify_blank_message_falls_back() {
    let err = classify_failure(404, r#"{"message":"  "}"#);
    assert!(matches!(err, ApiError::Status { status: 404, ref message } if message == "request failed: 404"));
}

#[test]
fn parse_data_unwraps_envelope() {
    let bills: Option<Vec<Bill>> = parse_data(r#"{"data":[{"billId":"b-1","status":"paid","amount":10}]}"#).unwrap();
    let bills = bills.unwrap();
    assert_eq!(bills.len(), 1);
    assert!(bills[0].is_paid());
}

#[test]
fn parse_data_empty_body_is_none() {
    let parsed: Option<Payment> = parse_data("  ").unwrap();
    assert!(parsed.is_none());
}

#[test]
fn parse_data_missing_data_is_none() {
    let parsed: Option<Vec<Bill>> = parse_data(r#"{"success":true}"#).unwrap();
    assert!(parsed.is_none());
}

#[test]
fn parse_data_null_data_is_none() {
    let parsed: Option<LoginResponse> = parse_data(r#"{"data":null}"#).unwrap();
    assert!(parsed.is_none());
}

#[test]
fn parse_data_empty_body_is_none_for_lists() {
    let parsed: Option<Vec<Customer>> = parse_data("").unwrap();
    assert!(parsed.is_none());
}

#[test]
fn parse_data_login_with_odd_user_keeps_token() {
    let parsed: Option<LoginResponse> = parse_data(
        r#"{"data":{"accessToken":"a.b.c","user":{"fullname":42,"name":"priya","role":"owner"}}}"#,
    )
    .unwrap();
    let login = parsed.unwrap();
    assert_eq!(login.access_token, "a.b.c");
    assert_eq!(login.user.unwrap().display_name(), "priya");
}

#[test]
fn parse_data_bills_with_null_amount() {
    let bills: Vec<Bill> = parse_data(
        r#"{"data":[{"billId":1,"amount":null,"status":"pending"},{"billId":"b-2","amount":300,"status":"paid"}]}"#,
    )
    .unwrap()
    .unwrap();
    assert_eq!(bills.len(), 2);
    assert!(bills[0].amount.abs() < f64::EPSILON);
    assert!(bills[1].is_paid());
}

#[test]
fn parse_data_invalid_json_is_parse_error() {
    let parsed: Result<Option<Vec<Customer>>, _> = parse_data("{not json");
    assert!(matches!(parsed, Err(ApiError::Parse(_))));
}

#[test]
fn parse_data_wrong_shape_is_parse_error() {
    let parsed: Result<Option<Vec<Customer>>, _> = parse_data(r#"{"data":{"name":"not a list"}}"#);
    assert!(matches!(parsed, Err(ApiError::Parse(_))));
}
