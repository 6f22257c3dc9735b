use std::time::Duration;

use redis_protocol::resp2::types::OwnedFrame as RespFrame;

use crate::error::InvalidRequest;

pub fn extract_string(frame: &RespFrame) -> Result<String, InvalidRequest> {
    match frame {
        RespFrame::BulkString(data) | RespFrame::SimpleString(data) => {
            String::from_utf8(data.clone()).map_err(|_| InvalidRequest::InvalidString)
        }
        _ => Err(InvalidRequest::InvalidString),
    }
}

/// Like [`extract_string`], but rejects the empty string.
pub fn extract_value(frame: &RespFrame) -> Result<String, InvalidRequest> {
    let value = extract_string(frame)?;
    if value.is_empty() {
        return Err(InvalidRequest::EmptyValue);
    }
    Ok(value)
}

/// Parses a timeout in seconds. Whole and fractional seconds are both
/// accepted.
pub fn extract_timeout(frame: &RespFrame) -> Result<Duration, InvalidRequest> {
    let secs = match frame {
        RespFrame::Integer(n) => *n as f64,
        RespFrame::BulkString(data) | RespFrame::SimpleString(data) => {
            std::str::from_utf8(data)
                .ok()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .ok_or(InvalidRequest::InvalidTimeout)?
        }
        _ => return Err(InvalidRequest::InvalidTimeout),
    };

    if !secs.is_finite() {
        return Err(InvalidRequest::InvalidTimeout);
    }
    if secs < 0.0 {
        return Err(InvalidRequest::NegativeTimeout);
    }
    Duration::try_from_secs_f64(secs).map_err(|_| InvalidRequest::InvalidTimeout)
}
