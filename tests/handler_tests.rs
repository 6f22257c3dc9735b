use std::sync::Arc;
use std::time::{Duration, Instant};

use redis_protocol::resp2::types::OwnedFrame as RespFrame;
use relayq::resp::handle_command;
use relayq::QueueRegistry;

fn command(args: &[&str]) -> RespFrame {
    RespFrame::Array(
        args.iter()
            .map(|arg| RespFrame::BulkString(arg.as_bytes().to_vec()))
            .collect(),
    )
}

fn bulk(s: &str) -> RespFrame {
    RespFrame::BulkString(s.as_bytes().to_vec())
}

fn error(msg: &str) -> RespFrame {
    RespFrame::Error(msg.to_string())
}

async fn call(registry: &Arc<QueueRegistry>, args: &[&str]) -> RespFrame {
    handle_command(command(args), registry.clone()).await
}

#[tokio::test]
async fn test_ping() {
    let registry = Arc::new(QueueRegistry::new());

    assert_eq!(call(&registry, &["PING"]).await, RespFrame::SimpleString(b"PONG".to_vec()));
    assert_eq!(call(&registry, &["PING", "hey"]).await, bulk("hey"));
    assert_eq!(
        call(&registry, &["PING", "a", "b"]).await,
        error("ERR wrong number of arguments for 'ping' command")
    );
}

#[tokio::test]
async fn test_put_then_get() {
    let registry = Arc::new(QueueRegistry::new());

    assert_eq!(
        call(&registry, &["PUT", "x", "hello"]).await,
        RespFrame::SimpleString(b"OK".to_vec())
    );
    assert_eq!(call(&registry, &["GET", "x", "1"]).await, bulk("hello"));
    assert_eq!(call(&registry, &["GET", "x", "0.05"]).await, RespFrame::Null);
}

#[tokio::test]
async fn test_command_names_are_case_insensitive() {
    let registry = Arc::new(QueueRegistry::new());

    call(&registry, &["put", "q", "v"]).await;

    assert_eq!(call(&registry, &["get", "q", "1"]).await, bulk("v"));
}

#[tokio::test]
async fn test_put_rejects_empty_value_before_touching_queues() {
    let registry = Arc::new(QueueRegistry::new());

    assert_eq!(
        call(&registry, &["PUT", "x", ""]).await,
        error("ERR value must not be empty")
    );
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_put_wrong_arity() {
    let registry = Arc::new(QueueRegistry::new());

    assert_eq!(
        call(&registry, &["PUT", "x"]).await,
        error("ERR wrong number of arguments for 'put' command")
    );
}

#[tokio::test]
async fn test_get_times_out_with_nil() {
    let registry = Arc::new(QueueRegistry::new());

    let start = Instant::now();
    let response = call(&registry, &["GET", "y", "1"]).await;

    assert_eq!(response, RespFrame::Null);
    assert!(start.elapsed() >= Duration::from_millis(950));
}

#[tokio::test]
async fn test_get_rejects_bad_timeouts() {
    let registry = Arc::new(QueueRegistry::new());

    assert_eq!(
        call(&registry, &["GET", "y", "soon"]).await,
        error("ERR timeout is not a number of seconds")
    );
    assert_eq!(
        call(&registry, &["GET", "y", "-3"]).await,
        error("ERR timeout must be non-negative")
    );
    assert_eq!(
        call(&registry, &["GET", "y", "1", "2"]).await,
        error("ERR wrong number of arguments for 'get' command")
    );
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_get_without_timeout_waits() {
    let registry = Arc::new(QueueRegistry::new());

    let pending = tokio::time::timeout(Duration::from_millis(100), call(&registry, &["GET", "w"])).await;
    assert!(pending.is_err());

    call(&registry, &["PUT", "w", "later"]).await;

    assert_eq!(call(&registry, &["GET", "w"]).await, bulk("later"));
}

#[tokio::test]
async fn test_lpush_and_brpop_behave_as_fifo() {
    let registry = Arc::new(QueueRegistry::new());

    assert_eq!(
        call(&registry, &["LPUSH", "jobs", "a", "b", "c"]).await,
        RespFrame::Integer(3)
    );
    assert_eq!(call(&registry, &["LPUSH", "jobs", "d"]).await, RespFrame::Integer(1));

    for expected in ["a", "b", "c", "d"] {
        assert_eq!(
            call(&registry, &["BRPOP", "jobs", "1"]).await,
            RespFrame::Array(vec![bulk("jobs"), bulk(expected)])
        );
    }
    assert_eq!(call(&registry, &["BRPOP", "jobs", "0.05"]).await, RespFrame::Null);
}

#[tokio::test]
async fn test_lpush_with_empty_value_enqueues_nothing() {
    let registry = Arc::new(QueueRegistry::new());

    assert_eq!(
        call(&registry, &["LPUSH", "jobs", "a", ""]).await,
        error("ERR value must not be empty")
    );
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_brpop_zero_timeout_blocks() {
    let registry = Arc::new(QueueRegistry::new());

    let pending =
        tokio::time::timeout(Duration::from_millis(100), call(&registry, &["BRPOP", "idle", "0"])).await;
    assert!(pending.is_err());

    call(&registry, &["LPUSH", "idle", "kept"]).await;

    assert_eq!(
        call(&registry, &["BRPOP", "idle", "0"]).await,
        RespFrame::Array(vec![bulk("idle"), bulk("kept")])
    );
}

#[tokio::test]
async fn test_malformed_commands() {
    let registry = Arc::new(QueueRegistry::new());

    assert_eq!(
        handle_command(bulk("PING"), registry.clone()).await,
        error("ERR expected array")
    );
    assert_eq!(
        handle_command(RespFrame::Array(vec![]), registry.clone()).await,
        error("ERR empty command")
    );
    assert_eq!(
        handle_command(RespFrame::Array(vec![RespFrame::Integer(1)]), registry.clone()).await,
        error("ERR invalid command format")
    );
    assert_eq!(
        call(&registry, &["FLUSHALL"]).await,
        error("ERR unknown command 'FLUSHALL'")
    );
}

#[tokio::test]
async fn test_command_lists_supported_commands() {
    let registry = Arc::new(QueueRegistry::new());

    let response = call(&registry, &["COMMAND"]).await;

    let RespFrame::Array(names) = response else {
        panic!("expected array, got {:?}", response);
    };
    for name in ["PING", "PUT", "GET", "LPUSH", "BRPOP", "COMMAND"] {
        assert!(names.contains(&bulk(name)), "missing {}", name);
    }
    assert!(!names.contains(&bulk("RPUSH")));
}

#[tokio::test]
async fn test_rpush_is_not_supported() {
    let registry = Arc::new(QueueRegistry::new());

    // RPUSH with BRPOP is a stack in Redis; only the FIFO pairing is offered.
    assert_eq!(
        call(&registry, &["RPUSH", "jobs", "a"]).await,
        error("ERR unknown command 'RPUSH'")
    );
    assert!(registry.is_empty());
}
