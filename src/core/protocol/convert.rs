// src/core/protocol/convert.rs

//! Small typed converters from [`Value`] to command result types.
//!
//! Per-command decoders are compositions of these; no command handler
//! inspects reply shapes ad hoc.

use super::value::Value;
use crate::core::errors::ClientError;
use bytes::Bytes;

fn unexpected(expected: &str, got: &Value) -> ClientError {
    ClientError::Protocol(format!(
        "unexpected reply shape: expected {expected}, got {}",
        got.kind_name()
    ))
}

/// Expects the `+OK` status reply.
pub fn into_unit(value: Value) -> Result<(), ClientError> {
    match value {
        Value::Ok => Ok(()),
        other => Err(unexpected("OK", &other)),
    }
}

pub fn into_bytes(value: Value) -> Result<Bytes, ClientError> {
    match value {
        Value::String(b) => Ok(b),
        Value::Verbatim(_, b) => Ok(b),
        other => Err(unexpected("string", &other)),
    }
}

pub fn into_string(value: Value) -> Result<String, ClientError> {
    let bytes = into_bytes(value)?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

/// Absent values are `None`; empty strings are values, not signals.
pub fn into_optional_bytes(value: Value) -> Result<Option<Bytes>, ClientError> {
    match value {
        Value::Null => Ok(None),
        other => into_bytes(other).map(Some),
    }
}

pub fn into_optional_string(value: Value) -> Result<Option<String>, ClientError> {
    match value {
        Value::Null => Ok(None),
        other => into_string(other).map(Some),
    }
}

pub fn into_int(value: Value) -> Result<i64, ClientError> {
    match value {
        Value::Int(i) => Ok(i),
        Value::String(b) => std::str::from_utf8(&b)?
            .parse::<i64>()
            .map_err(|_| ClientError::Protocol("non-numeric string reply".to_string())),
        other => Err(unexpected("integer", &other)),
    }
}

pub fn into_optional_int(value: Value) -> Result<Option<i64>, ClientError> {
    match value {
        Value::Null => Ok(None),
        other => into_int(other).map(Some),
    }
}

/// Doubles arrive natively under RESP3 and as decimal bulk strings under
/// RESP2; `inf`/`-inf` spellings are accepted either way.
pub fn into_float(value: Value) -> Result<f64, ClientError> {
    match value {
        Value::Float(f) => Ok(f),
        Value::Int(i) => Ok(i as f64),
        Value::String(b) => parse_float_bytes(&b),
        other => Err(unexpected("double", &other)),
    }
}

pub fn into_optional_float(value: Value) -> Result<Option<f64>, ClientError> {
    match value {
        Value::Null => Ok(None),
        other => into_float(other).map(Some),
    }
}

fn parse_float_bytes(raw: &[u8]) -> Result<f64, ClientError> {
    let s = std::str::from_utf8(raw)?;
    match s {
        "inf" | "+inf" => Ok(f64::INFINITY),
        "-inf" => Ok(f64::NEG_INFINITY),
        other => other
            .parse::<f64>()
            .map_err(|_| ClientError::Protocol(format!("non-numeric double reply {other:?}"))),
    }
}

/// Integer 0/1 replies and RESP3 booleans both decode to `bool`.
pub fn into_bool(value: Value) -> Result<bool, ClientError> {
    match value {
        Value::Bool(b) => Ok(b),
        Value::Int(i) => Ok(i != 0),
        Value::Ok => Ok(true),
        Value::Null => Ok(false),
        other => Err(unexpected("boolean", &other)),
    }
}

pub fn into_array(value: Value) -> Result<Vec<Value>, ClientError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Set(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(unexpected("array", &other)),
    }
}

/// An array where each element converts through `f`.
pub fn into_array_of<T>(
    value: Value,
    f: fn(Value) -> Result<T, ClientError>,
) -> Result<Vec<T>, ClientError> {
    into_array(value)?.into_iter().map(f).collect()
}

pub fn into_bytes_array(value: Value) -> Result<Vec<Bytes>, ClientError> {
    into_array_of(value, into_bytes)
}

pub fn into_string_array(value: Value) -> Result<Vec<String>, ClientError> {
    into_array_of(value, into_string)
}

pub fn into_optional_bytes_array(value: Value) -> Result<Vec<Option<Bytes>>, ClientError> {
    into_array_of(value, into_optional_bytes)
}

pub fn into_bool_array(value: Value) -> Result<Vec<bool>, ClientError> {
    into_array_of(value, into_bool)
}

/// Field-value pairs: a RESP3 map, or a RESP2 flat array of alternating
/// fields and values.
pub fn into_pairs(value: Value) -> Result<Vec<(Bytes, Bytes)>, ClientError> {
    match value {
        Value::Map(entries) => entries
            .into_iter()
            .map(|(k, v)| Ok((into_bytes(k)?, into_bytes(v)?)))
            .collect(),
        Value::Array(items) => {
            if items.len() % 2 != 0 {
                return Err(ClientError::Protocol(
                    "odd-length array where pairs were expected".to_string(),
                ));
            }
            let mut pairs = Vec::with_capacity(items.len() / 2);
            let mut iter = items.into_iter();
            while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
                pairs.push((into_bytes(k)?, into_bytes(v)?));
            }
            Ok(pairs)
        }
        Value::Null => Ok(Vec::new()),
        other => Err(unexpected("map", &other)),
    }
}

/// Members with scores, as produced by `WITHSCORES` variants: a RESP2 flat
/// array of alternating members and scores, or a RESP3 array of two-element
/// arrays.
pub fn into_scored_members(value: Value) -> Result<Vec<(Bytes, f64)>, ClientError> {
    let items = into_array(value)?;
    if let Some(Value::Array(first)) = items.first()
        && first.len() == 2
    {
        return items
            .into_iter()
            .map(|item| {
                let mut pair = into_array(item)?.into_iter();
                match (pair.next(), pair.next()) {
                    (Some(member), Some(score)) => Ok((into_bytes(member)?, into_float(score)?)),
                    _ => Err(ClientError::Protocol(
                        "short member-score pair".to_string(),
                    )),
                }
            })
            .collect();
    }
    if items.len() % 2 != 0 {
        return Err(ClientError::Protocol(
            "odd-length member-score reply".to_string(),
        ));
    }
    let mut scored = Vec::with_capacity(items.len() / 2);
    let mut iter = items.into_iter();
    while let (Some(member), Some(score)) = (iter.next(), iter.next()) {
        scored.push((into_bytes(member)?, into_float(score)?));
    }
    Ok(scored)
}

/// A single popped `(member, score)` as returned by ZPOPMIN/ZPOPMAX with no
/// count: an empty array when the set is missing.
pub fn into_popped_member(value: Value) -> Result<Option<(Bytes, f64)>, ClientError> {
    let mut items = into_array(value)?.into_iter();
    match (items.next(), items.next()) {
        (None, _) => Ok(None),
        (Some(member), Some(score)) => Ok(Some((into_bytes(member)?, into_float(score)?))),
        _ => Err(ClientError::Protocol("short pop reply".to_string())),
    }
}

/// One SCAN page: `[next-cursor, [keys...]]`.
pub fn into_scan_page(value: Value) -> Result<(u64, Vec<Bytes>), ClientError> {
    let mut items = into_array(value)?.into_iter();
    let cursor_raw = items
        .next()
        .ok_or_else(|| ClientError::Protocol("empty scan reply".to_string()))?;
    let cursor = match cursor_raw {
        Value::Int(i) => i as u64,
        Value::String(b) => std::str::from_utf8(&b)?
            .parse::<u64>()
            .map_err(|_| ClientError::Protocol("non-numeric scan cursor".to_string()))?,
        other => return Err(unexpected("scan cursor", &other)),
    };
    let keys = items
        .next()
        .map(into_bytes_array)
        .transpose()?
        .unwrap_or_default();
    Ok((cursor, keys))
}

/// `(longitude, latitude)` coordinate pairs from GEOPOS; missing members are `None`.
pub fn into_geo_positions(value: Value) -> Result<Vec<Option<(f64, f64)>>, ClientError> {
    into_array_of(value, |item| match item {
        Value::Null => Ok(None),
        other => {
            let mut coords = into_array(other)?.into_iter();
            match (coords.next(), coords.next()) {
                (Some(lon), Some(lat)) => Ok(Some((into_float(lon)?, into_float(lat)?))),
                _ => Err(ClientError::Protocol("short GEOPOS entry".to_string())),
            }
        }
    })
}
