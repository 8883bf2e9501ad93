//! Line-oriented demo transport.
//!
//! Reads renderer → main envelopes as JSON lines on stdin, answers each with a
//! reply line on stdout, and mirrors every call to renderer listeners as a
//! `call.completed` broadcast.
//!
//! ```text
//! echo '{"id":"1","name":"sum","data":{"a":2,"b":3}}' | cargo run --bin hub_demo
//! ```

use ipc_hub::{
    init_tracing, CallChannel, CallHub, EventChannel, FanoutHub, HubConfig, MainEndpoint,
    MainToRenderer, RendererEndpoint,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Serialize, Deserialize)]
struct SumArgs {
    a: i64,
    b: i64,
}

struct Sum;

impl CallChannel for Sum {
    const NAME: &'static str = "sum";
    type Request = SumArgs;
    type Response = i64;
}

#[derive(Debug, Serialize, Deserialize)]
struct CallCompleted {
    id: String,
    ok: bool,
}

struct CallCompletedEvent;

impl EventChannel for CallCompletedEvent {
    const NAME: &'static str = "call.completed";
    type Payload = CallCompleted;
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("hub demo failed: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let config = HubConfig::from_env();
    init_tracing(&config);

    let calls = CallHub::with_config(&config);
    calls
        .handle_sync::<Sum, _>(|args| Ok(args.a + args.b))
        .map_err(|e| e.to_string())?;
    calls
        .on_sync("echo", |data| Ok(data))
        .map_err(|e| e.to_string())?;

    let events = FanoutHub::with_config(&config);
    events
        .subscribe::<CallCompletedEvent, _>(|event| {
            eprintln!("[renderer] call {} finished (ok: {})", event.id, event.ok);
            Ok(())
        })
        .map_err(|e| e.to_string())?;

    let main = MainEndpoint::new(calls);
    let renderer = RendererEndpoint::new(events);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.map_err(|e| e.to_string())? {
        if line.trim().is_empty() {
            continue;
        }
        let raw = match serde_json::from_str(&line) {
            Ok(raw) => raw,
            Err(e) => {
                eprintln!("skipping malformed line: {e}");
                continue;
            }
        };
        let reply = match main.handle_value(raw).await {
            Ok(reply) => reply,
            Err(e) => {
                eprintln!("skipping envelope: {e}");
                continue;
            }
        };

        let notice = MainToRenderer::new(
            CallCompletedEvent::NAME,
            json!({ "id": reply.id, "ok": reply.is_ok() }),
        );
        renderer.deliver(&notice).map_err(|e| e.to_string())?;

        let out = serde_json::to_string(&reply).map_err(|e| e.to_string())?;
        println!("{out}");
    }
    Ok(())
}
