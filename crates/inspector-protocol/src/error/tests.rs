//! Unit tests for protocol error construction and rendering.

use std::io;

use rstest::rstest;

use super::*;

#[rstest]
#[case::missing(ProtocolError::missing_argument("DOM.removeNode", "nodeId: number"), true)]
#[case::wrong_type(
    ProtocolError::invalid_argument_type("DOM.removeNode", "nodeId", ArgType::Number, ArgType::String),
    true
)]
#[case::trailing(ProtocolError::unexpected_argument("Network.enable", 1), true)]
#[case::unknown_domain(ProtocolError::unknown_domain("Timeline"), false)]
#[case::unclassified(ProtocolError::UnclassifiedMessage, false)]
fn classifies_malformed_calls(#[case] error: ProtocolError, #[case] expected: bool) {
    assert_eq!(error.is_malformed_call(), expected);
}

#[test]
fn unknown_domain_and_unimplemented_event_render_distinctly() {
    let domain = ProtocolError::unknown_domain("Timeline").to_string();
    let event = ProtocolError::unimplemented_event("DOM", "childNodeCountUpdated").to_string();

    assert!(domain.contains("non-existing domain 'Timeline'"));
    assert!(event.contains("unimplemented method 'DOM.childNodeCountUpdated'"));
    assert_ne!(
        ProtocolError::unknown_domain("DOM").label(),
        ProtocolError::unimplemented_event("DOM", "x").label()
    );
}

#[test]
fn response_failure_lists_every_entry() {
    let error = ProtocolError::response_failed(7, vec!["first".into(), "second".into()]);
    let message = error.to_string();
    assert!(message.contains("id = 7"));
    assert!(message.contains("first; second"));
}

#[test]
fn invalid_type_names_both_types() {
    let error = ProtocolError::invalid_argument_type(
        "DOM.setAttribute",
        "elementId",
        ArgType::Number,
        ArgType::String,
    );
    assert_eq!(
        error.to_string(),
        "invalid type of argument 'elementId' for 'DOM.setAttribute' call; it should be 'number' but it is 'string'"
    );
}

#[test]
fn io_errors_convert_into_transport_errors() {
    let error = TransportError::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
    assert!(matches!(error, TransportError::Io(_)));
    assert!(error.to_string().contains("gone"));
}

#[test]
fn malformed_message_keeps_json_source() {
    let source = serde_json::from_str::<serde_json::Value>("{").expect_err("truncated json");
    let error = ProtocolError::from_json_error(source);
    assert!(matches!(
        error,
        ProtocolError::MalformedMessage {
            source: Some(_),
            ..
        }
    ));
}
