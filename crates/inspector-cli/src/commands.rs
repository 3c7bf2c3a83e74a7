//! Subcommands that work against the command catalog alone.

use std::io::Write;
use std::sync::Arc;

use inspector_config::Config;
use inspector_protocol::{
    Catalog, CommandRegistry, DispatchClient, RecordingSink, Transport, TransportError,
};
use serde_json::Value;
use tracing::debug;

use crate::AppError;

const COMMANDS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::commands");

/// A `Domain.command` pair named on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Method {
    pub(crate) domain: String,
    pub(crate) command: String,
}

impl Method {
    pub(crate) fn parse(text: &str) -> Result<Self, AppError> {
        match text.split_once('.') {
            Some((domain, command))
                if !domain.is_empty() && !command.is_empty() && !command.contains('.') =>
            {
                Ok(Self {
                    domain: domain.to_owned(),
                    command: command.to_owned(),
                })
            }
            _ => Err(AppError::InvalidMethod {
                method: text.to_owned(),
            }),
        }
    }
}

/// Reads a positional argument as a JSON literal, or as a plain string.
pub(crate) fn parse_argument(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

pub(crate) fn parse_arguments(raw: &[String]) -> Vec<Value> {
    raw.iter().map(|argument| parse_argument(argument)).collect()
}

/// Builds the registry from the configured catalog or the embedded one.
pub(crate) fn load_registry(config: &Config) -> Result<Arc<CommandRegistry>, AppError> {
    let registry = match config.catalog_path() {
        Some(path) => {
            debug!(target: COMMANDS_TARGET, %path, "loading external catalog");
            let catalog = Catalog::load(path).map_err(inspector_protocol::RegistryError::from)?;
            CommandRegistry::from_catalog(catalog)?
        }
        None => CommandRegistry::builtin()?,
    };
    Ok(Arc::new(registry))
}

/// Writes one `Domain.command(name: type, ...)` line per command.
pub(crate) fn list_catalog<W: Write>(
    registry: &CommandRegistry,
    domain: Option<&str>,
    stdout: &mut W,
) -> Result<(), AppError> {
    let domains = match domain {
        Some(name) if registry.commands_in(name).is_empty() => {
            return Err(AppError::UnknownDomain {
                domain: name.to_owned(),
            });
        }
        Some(name) => vec![name],
        None => registry.domains(),
    };

    for name in domains {
        for spec in registry.commands_in(name) {
            writeln!(stdout, "{}{}", spec.qualified_name(), spec.signature())?;
        }
    }
    stdout.flush()?;
    Ok(())
}

/// Holds the text of the single message an encode run produces.
#[derive(Debug, Default)]
struct CapturedMessage {
    text: Option<String>,
}

impl Transport for CapturedMessage {
    fn send(&mut self, message: &str) -> Result<(), TransportError> {
        self.text = Some(message.to_owned());
        Ok(())
    }
}

/// Validates a call and prints the message text it would put on the wire.
pub(crate) fn encode<W: Write>(
    registry: Arc<CommandRegistry>,
    method: &Method,
    arguments: Vec<Value>,
    stdout: &mut W,
) -> Result<(), AppError> {
    // Failures surface through the returned error; the sink keeps them off
    // the log.
    let mut client =
        DispatchClient::new(registry, CapturedMessage::default()).with_sink(RecordingSink::new());
    client.call_command(&method.domain, &method.command, arguments)?;
    let text = client
        .transport_mut()
        .text
        .take()
        .ok_or(AppError::MissingReply)?;
    writeln!(stdout, "{text}")?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use inspector_protocol::ProtocolError;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case::number("7", json!(7))]
    #[case::boolean("true", json!(true))]
    #[case::object(r#"{"a":1}"#, json!({"a": 1}))]
    #[case::quoted(r#""id""#, json!("id"))]
    #[case::bare_word("class", json!("class"))]
    #[case::negative("-3", json!(-3))]
    fn parses_arguments_as_json_or_text(#[case] raw: &str, #[case] expected: Value) {
        assert_eq!(parse_argument(raw), expected);
    }

    #[rstest]
    #[case::no_dot("enable")]
    #[case::empty_domain(".enable")]
    #[case::empty_command("Network.")]
    #[case::nested("Network.enable.now")]
    fn rejects_malformed_methods(#[case] text: &str) {
        assert!(matches!(
            Method::parse(text),
            Err(AppError::InvalidMethod { .. })
        ));
    }

    #[test]
    fn lists_a_single_domain() {
        let registry = CommandRegistry::builtin().expect("builtin registry");
        let mut stdout = Vec::new();
        list_catalog(&registry, Some("DOM"), &mut stdout).expect("list");
        let text = String::from_utf8(stdout).expect("utf8");

        assert!(text.lines().all(|line| line.starts_with("DOM.")));
        assert!(text.contains("DOM.setAttribute(elementId: number, name: string, value: string)"));
    }

    #[test]
    fn listing_an_unknown_domain_fails() {
        let registry = CommandRegistry::builtin().expect("builtin registry");
        let error = list_catalog(&registry, Some("Timeline2"), &mut Vec::new())
            .expect_err("unknown domain");
        assert!(matches!(error, AppError::UnknownDomain { .. }));
    }

    #[test]
    fn encodes_first_call_with_id_one() {
        let registry = Arc::new(CommandRegistry::builtin().expect("builtin registry"));
        let method = Method::parse("Network.enable").expect("method");
        let mut stdout = Vec::new();
        encode(registry, &method, Vec::new(), &mut stdout).expect("encode");

        assert_eq!(
            String::from_utf8(stdout).expect("utf8"),
            "{\"domain\":\"Network\",\"command\":\"enable\",\"id\":1,\"arguments\":{}}\n"
        );
    }

    #[test]
    fn encode_surfaces_validation_errors() {
        let registry = Arc::new(CommandRegistry::builtin().expect("builtin registry"));
        let method = Method::parse("DOM.setAttribute").expect("method");
        let error = encode(registry, &method, vec![json!("7")], &mut Vec::new())
            .expect_err("wrong type");
        assert!(matches!(
            error,
            AppError::Protocol(ProtocolError::InvalidArgumentType { .. })
        ));
    }
}
