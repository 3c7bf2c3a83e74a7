//! Runs one call against a spawned backend process.
//!
//! The backend speaks `Content-Length` framed messages over its stdio. Its
//! stdout is read on a helper thread and drained on this thread until the
//! drain barrier behind the call fires.

use std::cell::{Cell, RefCell};
use std::io::{BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use inspector_config::Config;
use inspector_protocol::{
    ClientOptions, CommandRegistry, DispatchClient, FrameReader, FramedWriter, InboundQueue, Reply,
};
use serde_json::Value;
use tracing::debug;

use crate::AppError;
use crate::commands::Method;

const BACKEND_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::backend");

/// Program and arguments used to start the backend.
#[derive(Debug, Clone)]
pub(crate) struct BackendCommand<'a> {
    pub(crate) program: &'a str,
    pub(crate) args: &'a [String],
    pub(crate) dump_messages: bool,
}

/// Sends `method` to a freshly spawned backend and prints the reply body.
pub(crate) fn call<W: Write>(
    config: &Config,
    registry: Arc<CommandRegistry>,
    backend: &BackendCommand<'_>,
    method: &Method,
    arguments: Vec<Value>,
    stdout: &mut W,
) -> Result<(), AppError> {
    let mut child = spawn(backend)?;
    let result = exchange(
        config,
        registry,
        &mut child,
        backend.dump_messages,
        method,
        arguments,
    );

    if let Err(error) = child.kill() {
        debug!(target: BACKEND_TARGET, %error, "backend already exited");
    }
    let status = child.wait().map_err(AppError::Reap)?;
    debug!(target: BACKEND_TARGET, %status, "backend stopped");

    let reply = result?;
    if let Some(error) = reply.error() {
        return Err(AppError::Reply(error.clone()));
    }
    let body = serde_json::to_string_pretty(&Value::Object(reply.into_body()))
        .map_err(AppError::Serialise)?;
    writeln!(stdout, "{body}")?;
    stdout.flush()?;
    Ok(())
}

fn spawn(backend: &BackendCommand<'_>) -> Result<Child, AppError> {
    debug!(
        target: BACKEND_TARGET,
        program = backend.program,
        args = ?backend.args,
        "spawning backend"
    );
    let child = Command::new(backend.program)
        .args(backend.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| AppError::spawn(backend.program, source))?;
    debug!(target: BACKEND_TARGET, pid = child.id(), "backend spawned");
    Ok(child)
}

fn exchange(
    config: &Config,
    registry: Arc<CommandRegistry>,
    child: &mut Child,
    dump_messages: bool,
    method: &Method,
    arguments: Vec<Value>,
) -> Result<Reply, AppError> {
    let stdin: ChildStdin = child
        .stdin
        .take()
        .ok_or(AppError::MissingPipe { stream: "stdin" })?;
    let stdout = child
        .stdout
        .take()
        .ok_or(AppError::MissingPipe { stream: "stdout" })?;

    let (mut queue, _reader) = InboundQueue::spawn(FrameReader::new(BufReader::new(stdout)))
        .map_err(|source| AppError::spawn("inspector-reader", source))?;
    let options = ClientOptions::default().with_dump_messages(dump_messages);
    let mut client = DispatchClient::new(registry, FramedWriter::new(stdin)).with_options(options);

    let reply: Rc<RefCell<Option<Reply>>> = Rc::default();
    let drained = Rc::new(Cell::new(false));

    let slot = Rc::clone(&reply);
    client.call_command_with(&method.domain, &method.command, arguments, move |_, answer| {
        *slot.borrow_mut() = Some(answer);
    })?;
    let flag = Rc::clone(&drained);
    client.drain_barrier(move |_| flag.set(true));

    let timeout = Duration::from_secs(config.response_timeout_secs());
    while !drained.get() {
        queue.deliver_next(&mut client, timeout)?;
    }
    drop(client);

    reply.take().ok_or(AppError::MissingReply)
}
