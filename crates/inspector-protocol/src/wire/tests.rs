//! Unit tests for wire message encoding and classification.

use rstest::rstest;
use serde_json::json;

use super::*;

#[test]
fn outbound_message_uses_wire_field_order() {
    let mut arguments = Map::new();
    arguments.insert("elementId".into(), json!(7));
    arguments.insert("name".into(), json!("class"));
    let message = OutboundMessage::new("DOM", "setAttribute", 3, arguments);

    let text = message.to_text().expect("serialise");

    assert_eq!(
        text,
        r#"{"domain":"DOM","command":"setAttribute","id":3,"arguments":{"elementId":7,"name":"class"}}"#
    );
}

#[test]
fn empty_arguments_serialise_as_object() {
    let text = OutboundMessage::new("Network", "enable", 1, Map::new())
        .to_text()
        .expect("serialise");
    assert_eq!(
        text,
        r#"{"domain":"Network","command":"enable","id":1,"arguments":{}}"#
    );
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[test]
fn classifies_response() {
    let message = InboundMessage::parse(r#"{"requestId":4,"body":{"result":true}}"#)
        .expect("parse response");
    let InboundMessage::Response(response) = message else {
        panic!("expected response");
    };
    assert_eq!(response.request_id, 4);
    assert!(response.error.is_none());
    assert_eq!(response.body.map(Value::Object), Some(json!({"result": true})));
}

#[test]
fn classifies_event_with_ordered_payload() {
    let message = InboundMessage::parse(
        r#"{"type":"event","domain":"DOM","event":"attributeModified","body":{"id":3,"name":"class","value":"x"}}"#,
    )
    .expect("parse event");
    let InboundMessage::Event(event) = message else {
        panic!("expected event");
    };
    assert_eq!(event.domain, "DOM");
    assert_eq!(event.event, "attributeModified");
    assert_eq!(event.payload(), vec![json!(3), json!("class"), json!("x")]);
}

#[test]
fn event_without_body_has_empty_payload() {
    let message = InboundMessage::from_value(json!({
        "type": "event",
        "domain": "Debugger",
        "event": "resumed"
    }))
    .expect("classify");
    assert!(matches!(message, InboundMessage::Event(event) if event.payload().is_empty()));
}

#[test]
fn event_with_null_body_has_empty_payload() {
    let message = InboundMessage::from_value(json!({
        "type": "event",
        "domain": "Debugger",
        "event": "resumed",
        "body": null
    }))
    .expect("classify");
    assert!(matches!(message, InboundMessage::Event(event) if event.payload().is_empty()));
}

#[rstest]
#[case::array_body(json!({"requestId": 2, "body": []}))]
#[case::string_errors(json!({"requestId": 2, "protocolErrors": "boom"}))]
fn response_with_usable_id_keeps_decode_failure(#[case] value: Value) {
    let message = InboundMessage::from_value(value).expect("classify");
    let InboundMessage::Response(response) = message else {
        panic!("expected a response");
    };
    assert_eq!(response.request_id, 2);
    assert!(response.decode_error.is_some());
    assert!(response.body.is_none());
}

#[rstest]
#[case::not_json("{not json")]
#[case::not_object("[1, 2]")]
#[case::bad_request_id(r#"{"requestId":"one"}"#)]
#[case::event_missing_domain(r#"{"type":"event","event":"x"}"#)]
fn rejects_malformed_text(#[case] text: &str) {
    let error = InboundMessage::parse(text).expect_err("malformed");
    assert!(matches!(error, ProtocolError::MalformedMessage { .. }));
}

#[rstest]
#[case::empty(json!({}))]
#[case::other_type(json!({"type": "notification", "domain": "DOM"}))]
fn rejects_unclassified_objects(#[case] value: Value) {
    let error = InboundMessage::from_value(value).expect_err("unclassified");
    assert!(matches!(error, ProtocolError::UnclassifiedMessage));
}

#[rstest]
#[case::absent(json!({"requestId": 1}), None)]
#[case::empty(json!({"requestId": 1, "protocolErrors": []}), None)]
#[case::present(json!({"requestId": 1, "protocolErrors": ["bad"]}), Some(1))]
fn treats_empty_protocol_errors_as_absent(#[case] value: Value, #[case] expected: Option<usize>) {
    let InboundMessage::Response(response) = InboundMessage::from_value(value).expect("classify")
    else {
        panic!("expected response");
    };
    assert_eq!(response.protocol_errors().map(<[String]>::len), expected);
}
