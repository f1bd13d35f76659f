// tests/common/mod.rs

//! A minimal in-process RESP server used by the integration tests. It speaks
//! just enough of the protocol to exercise the client runtime: handshake,
//! a handful of data commands, cluster discovery, MOVED redirects, and
//! RESP3 Pub/Sub pushes.

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use peridot::core::cluster::key_hash_slot;
use peridot::core::protocol::{RespCodec, RespFrame};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::Framed;

pub type Store = Arc<Mutex<HashMap<Bytes, Bytes>>>;

type Subscribers = Arc<Mutex<Vec<(Bytes, mpsc::UnboundedSender<RespFrame>)>>>;

/// One advertised `CLUSTER SLOTS` range: `(start, end, addr, node_id)`.
#[derive(Debug, Clone)]
pub struct SlotRange {
    pub start: u16,
    pub end: u16,
    pub addr: SocketAddr,
    pub node_id: String,
}

/// Shared description of the mock fleet, used to answer `CLUSTER SLOTS` and
/// to issue MOVED redirects.
#[derive(Debug, Clone, Default)]
pub struct ClusterSpec {
    /// What `CLUSTER SLOTS` advertises (may deliberately lie to force MOVED).
    pub advertised: Vec<SlotRange>,
    /// Who actually serves each range.
    pub actual: Vec<SlotRange>,
}

pub struct MockNode {
    pub addr: SocketAddr,
    pub store: Store,
}

/// Spawns a mock node. `owned` restricts the slots this node actually
/// serves; keys outside it are answered with MOVED per `spec.actual`.
pub async fn spawn_node(
    owned: Option<(u16, u16)>,
    spec: Arc<Mutex<ClusterSpec>>,
) -> MockNode {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock node");
    let addr = listener.local_addr().expect("mock addr");
    let store: Store = Arc::new(Mutex::new(HashMap::new()));
    let subscribers: Subscribers = Arc::new(Mutex::new(Vec::new()));

    let conn_store = store.clone();
    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(serve_connection(
                socket,
                conn_store.clone(),
                subscribers.clone(),
                owned,
                spec.clone(),
            ));
        }
    });
    MockNode { addr, store }
}

async fn serve_connection(
    socket: TcpStream,
    store: Store,
    subscribers: Subscribers,
    owned: Option<(u16, u16)>,
    spec: Arc<Mutex<ClusterSpec>>,
) {
    let mut framed = Framed::new(socket, RespCodec);
    let (push_tx, mut push_rx) = mpsc::unbounded_channel::<RespFrame>();
    loop {
        tokio::select! {
            incoming = framed.next() => {
                let Some(Ok(frame)) = incoming else { return; };
                let replies = handle_frame(frame, &store, &subscribers, &push_tx, owned, &spec);
                for reply in replies {
                    if framed.send(reply).await.is_err() {
                        return;
                    }
                }
            }
            push = push_rx.recv() => {
                let Some(push) = push else { return; };
                if framed.send(push).await.is_err() {
                    return;
                }
            }
        }
    }
}

fn bulk(bytes: impl Into<Bytes>) -> RespFrame {
    RespFrame::BulkString(bytes.into())
}

fn argv(frame: RespFrame) -> Vec<Bytes> {
    match frame {
        RespFrame::Array(parts) => parts
            .into_iter()
            .filter_map(|part| match part {
                RespFrame::BulkString(b) => Some(b),
                RespFrame::SimpleString(s) => Some(Bytes::from(s)),
                RespFrame::Integer(i) => Some(Bytes::from(i.to_string())),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn moved_for(slot: u16, spec: &Arc<Mutex<ClusterSpec>>) -> RespFrame {
    let spec = spec.lock().unwrap();
    let owner = spec
        .actual
        .iter()
        .find(|range| (range.start..=range.end).contains(&slot));
    match owner {
        Some(range) => RespFrame::Error(format!("MOVED {slot} {}", range.addr)),
        None => RespFrame::Error(format!("CLUSTERDOWN no owner for slot {slot}")),
    }
}

fn serves(owned: Option<(u16, u16)>, slot: u16) -> bool {
    match owned {
        Some((start, end)) => (start..=end).contains(&slot),
        None => true,
    }
}

fn handle_frame(
    frame: RespFrame,
    store: &Store,
    subscribers: &Subscribers,
    push_tx: &mpsc::UnboundedSender<RespFrame>,
    owned: Option<(u16, u16)>,
    spec: &Arc<Mutex<ClusterSpec>>,
) -> Vec<RespFrame> {
    let args = argv(frame);
    let Some(name) = args.first() else {
        return vec![RespFrame::Error("ERR empty command".to_string())];
    };
    let name = name.to_ascii_uppercase();
    match name.as_slice() {
        b"HELLO" => vec![RespFrame::Map(vec![(
            bulk("proto"),
            RespFrame::Integer(3),
        )])],
        b"PING" => vec![RespFrame::SimpleString("PONG".to_string())],
        b"ECHO" => vec![bulk(args[1].clone())],
        b"CLIENT" => vec![RespFrame::SimpleString("OK".to_string())],
        b"SET" => {
            let slot = key_hash_slot(&args[1]);
            if !serves(owned, slot) {
                return vec![moved_for(slot, spec)];
            }
            store.lock().unwrap().insert(args[1].clone(), args[2].clone());
            vec![RespFrame::SimpleString("OK".to_string())]
        }
        b"GET" => {
            let slot = key_hash_slot(&args[1]);
            if !serves(owned, slot) {
                return vec![moved_for(slot, spec)];
            }
            match store.lock().unwrap().get(&args[1]) {
                Some(value) => vec![bulk(value.clone())],
                None => vec![RespFrame::Null],
            }
        }
        b"MGET" => {
            for key in &args[1..] {
                let slot = key_hash_slot(key);
                if !serves(owned, slot) {
                    return vec![moved_for(slot, spec)];
                }
            }
            let store = store.lock().unwrap();
            vec![RespFrame::Array(
                args[1..]
                    .iter()
                    .map(|key| match store.get(key) {
                        Some(value) => bulk(value.clone()),
                        None => RespFrame::Null,
                    })
                    .collect(),
            )]
        }
        b"DEL" => {
            let mut removed = 0;
            let mut store = store.lock().unwrap();
            for key in &args[1..] {
                if store.remove(key).is_some() {
                    removed += 1;
                }
            }
            vec![RespFrame::Integer(removed)]
        }
        b"INCR" | b"INCRBY" => {
            let delta: i64 = if name == b"INCR" {
                1
            } else {
                std::str::from_utf8(&args[2]).unwrap().parse().unwrap()
            };
            let mut store = store.lock().unwrap();
            let current = store
                .get(&args[1])
                .map(|v| std::str::from_utf8(v).unwrap().parse::<i64>().unwrap())
                .unwrap_or(0);
            let next = current + delta;
            store.insert(args[1].clone(), Bytes::from(next.to_string()));
            vec![RespFrame::Integer(next)]
        }
        b"INCRBYFLOAT" => {
            let delta: f64 = std::str::from_utf8(&args[2]).unwrap().parse().unwrap();
            let mut store = store.lock().unwrap();
            let current = store
                .get(&args[1])
                .map(|v| std::str::from_utf8(v).unwrap().parse::<f64>().unwrap())
                .unwrap_or(0.0);
            let next = current + delta;
            store.insert(args[1].clone(), Bytes::from(next.to_string()));
            vec![bulk(next.to_string())]
        }
        b"SCAN" => {
            let store = store.lock().unwrap();
            let keys: Vec<RespFrame> = store.keys().map(|key| bulk(key.clone())).collect();
            vec![RespFrame::Array(vec![
                bulk("0"),
                RespFrame::Array(keys),
            ])]
        }
        b"CLUSTER" => {
            if args.get(1).map(|sub| sub.to_ascii_uppercase()) == Some(b"SLOTS".to_vec()) {
                let spec = spec.lock().unwrap();
                vec![RespFrame::Array(
                    spec.advertised
                        .iter()
                        .map(|range| {
                            RespFrame::Array(vec![
                                RespFrame::Integer(range.start as i64),
                                RespFrame::Integer(range.end as i64),
                                RespFrame::Array(vec![
                                    bulk(range.addr.ip().to_string()),
                                    RespFrame::Integer(range.addr.port() as i64),
                                    bulk(range.node_id.clone()),
                                ]),
                            ])
                        })
                        .collect(),
                )]
            } else {
                vec![RespFrame::Error("ERR unsupported CLUSTER subcommand".to_string())]
            }
        }
        b"SUBSCRIBE" => {
            let mut acks = Vec::new();
            for channel in &args[1..] {
                subscribers
                    .lock()
                    .unwrap()
                    .push((channel.clone(), push_tx.clone()));
                acks.push(RespFrame::Push(vec![
                    bulk("subscribe"),
                    bulk(channel.clone()),
                    RespFrame::Integer(1),
                ]));
            }
            acks
        }
        b"PUBLISH" => {
            let channel = args[1].clone();
            let payload = args[2].clone();
            let mut count = 0;
            for (subscribed, tx) in subscribers.lock().unwrap().iter() {
                if subscribed == &channel
                    && tx
                        .send(RespFrame::Push(vec![
                            bulk("message"),
                            bulk(channel.clone()),
                            bulk(payload.clone()),
                        ]))
                        .is_ok()
                {
                    count += 1;
                }
            }
            vec![RespFrame::Integer(count)]
        }
        b"WATCH" | b"MULTI" => vec![RespFrame::SimpleString("OK".to_string())],
        b"EXEC" => {
            // A sentinel key marks the watched-key-changed case.
            if store.lock().unwrap().contains_key(b"__watch_dirty__".as_slice()) {
                vec![RespFrame::NullArray]
            } else {
                vec![RespFrame::Array(Vec::new())]
            }
        }
        other => vec![RespFrame::Error(format!(
            "ERR unknown command '{}'",
            String::from_utf8_lossy(other)
        ))],
    }
}
