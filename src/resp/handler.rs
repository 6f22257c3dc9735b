use std::sync::Arc;
use std::time::Duration;

use redis_protocol::resp2::types::OwnedFrame as RespFrame;

use super::utils::{extract_string, extract_timeout, extract_value};
use crate::error::InvalidRequest;
use crate::QueueRegistry;

const COMMANDS: &[&str] = &["PING", "PUT", "GET", "LPUSH", "BRPOP", "COMMAND"];

/// Executes one command frame. Blocking commands only return once they
/// have a value or their timeout elapses; dropping the future abandons the
/// wait without touching the queue.
pub async fn handle_command(frame: RespFrame, registry: Arc<QueueRegistry>) -> RespFrame {
    match dispatch(frame, &registry).await {
        Ok(response) => response,
        Err(err) => {
            tracing::debug!(error = %err, "Rejected command");
            err.into()
        }
    }
}

async fn dispatch(frame: RespFrame, registry: &QueueRegistry) -> Result<RespFrame, InvalidRequest> {
    let cmd = match frame {
        RespFrame::Array(arr) => arr,
        _ => return Err(InvalidRequest::ExpectedArray),
    };

    let command_name = match cmd.first() {
        Some(RespFrame::BulkString(data)) | Some(RespFrame::SimpleString(data)) => {
            String::from_utf8_lossy(data).to_uppercase()
        }
        Some(_) => return Err(InvalidRequest::InvalidCommandFormat),
        None => return Err(InvalidRequest::EmptyCommand),
    };

    match command_name.as_str() {
        "PING" => handle_ping(&cmd),
        "PUT" => handle_put(&cmd, registry).await,
        "GET" => handle_get(&cmd, registry).await,
        "LPUSH" => handle_lpush(&cmd, registry).await,
        "BRPOP" => handle_brpop(&cmd, registry).await,
        "COMMAND" => Ok(handle_command_docs()),
        _ => Err(InvalidRequest::UnknownCommand(command_name)),
    }
}

/// PING [message]
fn handle_ping(cmd: &[RespFrame]) -> Result<RespFrame, InvalidRequest> {
    match cmd.len() {
        1 => Ok(RespFrame::SimpleString(b"PONG".to_vec())),
        2 => Ok(cmd[1].clone()),
        _ => Err(InvalidRequest::WrongArity("ping")),
    }
}

/// PUT queue value
async fn handle_put(cmd: &[RespFrame], registry: &QueueRegistry) -> Result<RespFrame, InvalidRequest> {
    if cmd.len() != 3 {
        return Err(InvalidRequest::WrongArity("put"));
    }

    let queue_name = extract_string(&cmd[1])?;
    let value = extract_value(&cmd[2])?;

    registry.enqueue(&queue_name, value).await;
    Ok(RespFrame::SimpleString(b"OK".to_vec()))
}

/// GET queue [timeout]
///
/// Without a timeout the wait lasts until a value arrives or the client
/// goes away.
async fn handle_get(cmd: &[RespFrame], registry: &QueueRegistry) -> Result<RespFrame, InvalidRequest> {
    let timeout = match cmd.len() {
        2 => None,
        3 => Some(extract_timeout(&cmd[2])?),
        _ => return Err(InvalidRequest::WrongArity("get")),
    };

    let queue_name = extract_string(&cmd[1])?;

    match registry.dequeue_within(&queue_name, timeout).await {
        Some(value) => Ok(RespFrame::BulkString(value.into_bytes())),
        None => Ok(RespFrame::Null),
    }
}

/// LPUSH queue value [value ...]
///
/// Paired with BRPOP this behaves as a FIFO, as in Redis. Values are
/// validated before any is enqueued.
async fn handle_lpush(cmd: &[RespFrame], registry: &QueueRegistry) -> Result<RespFrame, InvalidRequest> {
    if cmd.len() < 3 {
        return Err(InvalidRequest::WrongArity("lpush"));
    }

    let queue_name = extract_string(&cmd[1])?;
    let values = cmd[2..]
        .iter()
        .map(extract_value)
        .collect::<Result<Vec<_>, _>>()?;

    let engine = registry.get_or_create(&queue_name);
    let count = values.len();
    for value in values {
        engine.enqueue(value).await;
    }

    Ok(RespFrame::Integer(count as i64))
}

/// BRPOP queue timeout
///
/// A zero timeout blocks indefinitely.
async fn handle_brpop(cmd: &[RespFrame], registry: &QueueRegistry) -> Result<RespFrame, InvalidRequest> {
    if cmd.len() != 3 {
        return Err(InvalidRequest::WrongArity("brpop"));
    }

    let queue_name = extract_string(&cmd[1])?;
    let timeout = extract_timeout(&cmd[2])?;
    let timeout = (timeout > Duration::ZERO).then_some(timeout);

    match registry.dequeue_within(&queue_name, timeout).await {
        Some(value) => Ok(RespFrame::Array(vec![
            RespFrame::BulkString(queue_name.into_bytes()),
            RespFrame::BulkString(value.into_bytes()),
        ])),
        None => Ok(RespFrame::Null),
    }
}

/// COMMAND - Return supported commands
fn handle_command_docs() -> RespFrame {
    RespFrame::Array(
        COMMANDS
            .iter()
            .map(|name| RespFrame::BulkString(name.as_bytes().to_vec()))
            .collect(),
    )
}
