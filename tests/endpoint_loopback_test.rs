//! Black-box tests driving two endpoints connected back to back.

use std::collections::VecDeque;
use std::sync::Arc;

use lokahi_rpc_lib::protocol::jsonrpc::{
    is_request, is_response, CallContext, Endpoint, HandlerError, JsonRpcError,
};
use parking_lot::Mutex;
use serde_json::{json, Value};

type Queue = Arc<Mutex<VecDeque<Value>>>;

fn endpoint() -> (Queue, Endpoint) {
    let queue: Queue = Arc::new(Mutex::new(VecDeque::new()));
    let outbox = Arc::clone(&queue);
    let endpoint = Endpoint::new(move |msg: Value| outbox.lock().push_back(msg));
    (queue, endpoint)
}

/// Moves queued messages between the peers until both queues are empty.
fn settle(a: (&Queue, &Endpoint), b: (&Queue, &Endpoint)) {
    loop {
        let from_a: Vec<Value> = a.0.lock().drain(..).collect();
        let from_b: Vec<Value> = b.0.lock().drain(..).collect();
        if from_a.is_empty() && from_b.is_empty() {
            return;
        }
        for msg in from_a {
            b.1.receive(&msg);
        }
        for msg in from_b {
            a.1.receive(&msg);
        }
    }
}

#[test]
fn test_both_sides_serve_and_call() {
    let (client_out, client) = endpoint();
    let (server_out, server) = endpoint();

    server
        .add_typed("add", |(a, b): (i64, i64), _ctx: &CallContext| Ok(a + b))
        .unwrap();
    client
        .add_no_params("whoami", |_ctx: &CallContext| Ok("client"))
        .unwrap();

    let sum = Arc::new(Mutex::new(None));
    let name = Arc::new(Mutex::new(None));

    let sink = Arc::clone(&sum);
    client
        .send_request_typed(
            "add",
            &(40, 2),
            move |total: i64| *sink.lock() = Some(total),
            |error: JsonRpcError| panic!("add failed: {error}"),
        )
        .unwrap();
    let sink = Arc::clone(&name);
    server.send_request(
        "whoami",
        Value::Null,
        move |who| *sink.lock() = Some(who),
        |error| panic!("whoami failed: {error}"),
    );

    settle((&client_out, &client), (&server_out, &server));

    assert_eq!(*sum.lock(), Some(42));
    assert_eq!(*name.lock(), Some(json!("client")));
    assert_eq!(client.pending_requests(), 0);
    assert_eq!(server.pending_requests(), 0);
}

#[test]
fn test_wire_traffic_is_well_formed() {
    let (client_out, client) = endpoint();
    let (server_out, server) = endpoint();
    server
        .add_typed("fail", |code: i64, _ctx: &CallContext| -> Result<(), HandlerError> {
            Err(JsonRpcError::custom(code, "requested failure").into())
        })
        .unwrap();

    let failures = Arc::new(Mutex::new(Vec::new()));
    for code in [-1, -32000, 42] {
        let sink = Arc::clone(&failures);
        client
            .send_request_typed("fail", &code, |_: Value| {}, move |e| sink.lock().push(e))
            .unwrap();
    }

    for msg in client_out.lock().iter() {
        assert!(is_request(msg), "{msg}");
    }
    let requests: Vec<Value> = client_out.lock().drain(..).collect();
    for msg in &requests {
        server.receive(msg);
    }
    for msg in server_out.lock().iter() {
        assert!(is_response(msg), "{msg}");
    }
    settle((&client_out, &client), (&server_out, &server));

    let codes: Vec<i64> = failures.lock().iter().map(|e| e.code).collect();
    assert_eq!(codes, vec![-1, -32000, 42]);
}
