use dmxp_msgq::{GetFlags, Key, MessageRegistry, MsgFlags, RegistryBuilder};
use sha2::{Digest, Sha256};
use std::env;
use std::sync::Arc;
use std::thread;

const PING: i64 = 1;
const PONG: i64 = 2;

fn hash_hex(i: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("message_{}", i).as_bytes());
    format!("{:x}", hasher.finalize())
}

// Answers every ping with the message number once its hash checks out.
fn responder(registry: Arc<MessageRegistry>, key: Key) -> std::io::Result<usize> {
    let id = registry.get(key, GetFlags::empty())?;
    let mut verified = 0;
    loop {
        let (_, body) = registry.receive_owned(id, 128, PING, MsgFlags::empty())?;
        let text = String::from_utf8_lossy(&body);
        let Some((num, hash)) = text.split_once(':') else {
            eprintln!("Responder: malformed message {:?}", text);
            continue;
        };
        let Ok(num) = num.parse::<usize>() else {
            break;
        };
        if hash_hex(num) == hash {
            verified += 1;
        } else {
            eprintln!("Responder: hash mismatch for message {}", num);
        }
        registry.send(id, PONG, num.to_string().as_bytes(), MsgFlags::empty())?;
    }
    Ok(verified)
}

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <num_messages>", args[0]);
        std::process::exit(1);
    }
    let num_messages: usize = args[1].parse().expect("Invalid number of messages");

    let key = Key::derive(&args[0], b'P')?;
    let registry = Arc::new(RegistryBuilder::new().with_default_max_bytes(1024).build()?);
    let id = registry.get(key, GetFlags::CREATE | GetFlags::mode_bits(0o600))?;
    println!("Ping-pong: queue {} for key {}", id, key);

    println!("Ping-pong: Precomputing {} hashes...", num_messages);
    let hashes: Vec<String> = (0..num_messages).map(hash_hex).collect();

    let worker = {
        let registry = registry.clone();
        thread::spawn(move || responder(registry, key))
    };

    let start = std::time::Instant::now();
    for (i, hash) in hashes.iter().enumerate() {
        let message = format!("{}:{}", i, hash);
        registry.send(id, PING, message.as_bytes(), MsgFlags::empty())?;

        let (_, reply) = registry.receive_owned(id, 32, PONG, MsgFlags::empty())?;
        if reply != i.to_string().as_bytes() {
            eprintln!("Ping-pong: unexpected reply {:?} to {}", String::from_utf8_lossy(&reply), i);
        }
        if (i + 1) % 100 == 0 {
            println!("Round trips: {}", i + 1);
        }
    }
    let elapsed = start.elapsed();

    registry.send(id, PING, b"done:", MsgFlags::empty())?;
    let verified = worker.join().expect("responder panicked")?;
    registry.remove(id)?;

    println!("Ping-pong: {} round trips in {:.2?}", num_messages, elapsed);
    println!(
        "Ping-pong: {:.2} round trips/sec, {} hashes verified",
        num_messages as f64 / elapsed.as_secs_f64(),
        verified
    );
    Ok(())
}
