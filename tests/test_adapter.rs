mod common;

use common::{ids, scripted_runtime};
use llm_score_adapter::{runtime::Mock, Error, InferenceAdapter, ScoreRequest, ScoreResponse};

const HELLO_REQUEST: &str = r#"{"input_data": {"input_string": "Hello"}}"#;

fn error_message(response: &ScoreResponse) -> &str {
    match response {
        ScoreResponse::Error(message) => message,
        ScoreResponse::Response(text) => panic!("expected an error, got response {text:?}"),
    }
}

#[test]
fn test_valid_request_returns_response() {
    let adapter = InferenceAdapter::with_generator(Mock::new(4));

    let response = adapter.handle(HELLO_REQUEST);

    assert_eq!(
        response,
        ScoreResponse::Response("Hello hello hello hello".to_string())
    );

    let json: serde_json::Value = serde_json::from_str(&response.to_json()).unwrap();
    assert!(json["response"].is_string());
    assert!(json.get("error").is_none());
}

#[test]
fn test_missing_field_names_the_key() {
    let adapter = InferenceAdapter::with_generator(Mock::default());

    let response = adapter.handle(r#"{"input_data": {}}"#);
    assert!(error_message(&response).contains("input_string"), "{response:?}");

    let response = adapter.handle(r#"{"inputs": "Hello"}"#);
    assert!(error_message(&response).contains("input_data"), "{response:?}");
}

#[test]
fn test_wrong_field_type_is_an_error() {
    let adapter = InferenceAdapter::with_generator(Mock::default());

    let response = adapter.handle(r#"{"input_data": {"input_string": 42}}"#);
    assert!(error_message(&response).starts_with("Invalid request"), "{response:?}");
}

#[test]
fn test_malformed_json_is_an_error() {
    let adapter = InferenceAdapter::with_generator(Mock::default());

    let response = adapter.handle("not json");
    assert!(error_message(&response).contains("not valid JSON"), "{response:?}");

    let json: serde_json::Value = serde_json::from_str(&response.to_json()).unwrap();
    assert!(json["error"].is_string());
    assert!(json.get("response").is_none());
}

#[test]
fn test_request_parsing_separates_syntax_from_shape() {
    assert!(matches!(ScoreRequest::from_raw("{"), Err(Error::MalformedRequest(_))));
    assert!(matches!(
        ScoreRequest::from_raw(r#"{"input_data": []}"#),
        Err(Error::InvalidRequest(_))
    ));

    let request =
        ScoreRequest::from_raw(r#"{"input_data": {"input_string": "hi", "extra": 1}, "x": 2}"#)
            .unwrap();
    assert_eq!(request.input_data.input_string, "hi");
}

#[test]
fn test_generation_error_becomes_error_response() {
    let adapter = InferenceAdapter::with_generator(Mock::default());

    let response = adapter.handle(r#"{"input_data": {"input_string": "   "}}"#);
    assert_eq!(error_message(&response), Error::EmptyPrompt.to_string());
}

#[test]
fn test_prompt_at_max_length_becomes_error_response() {
    let adapter = InferenceAdapter::with_generator(Mock::new(2));

    let response = adapter.handle(r#"{"input_data": {"input_string": "Hello there"}}"#);
    assert_eq!(
        error_message(&response),
        Error::PromptTooLong {
            prompt_tokens: 2,
            max_length: 2
        }
        .to_string()
    );

    assert_eq!(
        adapter.handle(HELLO_REQUEST),
        ScoreResponse::Response("Hello hello".to_string())
    );
}

#[test]
fn test_failed_request_leaves_adapter_usable() {
    common::enable_logging();
    let (runtime, handles) = scripted_runtime(vec![ids::WORLD, ids::EOS], 100);
    let adapter = InferenceAdapter::with_generator(runtime);

    assert!(adapter.handle("not json").is_error());
    assert!(adapter.handle(r#"{"input_data": {}}"#).is_error());

    handles.fail_next();
    let response = adapter.handle(HELLO_REQUEST);
    assert!(error_message(&response).contains("scripted failure"));

    handles.panic_next();
    let response = adapter.handle(HELLO_REQUEST);
    assert!(error_message(&response).contains("scripted panic"));

    assert_eq!(
        adapter.handle(HELLO_REQUEST),
        ScoreResponse::Response("hello world".to_string())
    );
}

#[test]
fn test_response_wire_shapes() {
    assert_eq!(
        ScoreResponse::Response("hi".to_string()).to_json(),
        r#"{"response":"hi"}"#
    );
    assert_eq!(
        ScoreResponse::Error("boom".to_string()).to_json(),
        r#"{"error":"boom"}"#
    );
}
