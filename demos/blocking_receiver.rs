use dmxp_msgq::Core::sched::{Actor, Identity};
use dmxp_msgq::{Errno, GetFlags, Key, MsgFlags, RegistryBuilder};
use std::env;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let to_send: usize = if args.len() > 1 {
        args[1].parse().unwrap_or(5)
    } else {
        5
    };

    let registry = Arc::new(RegistryBuilder::new().build()?);
    let id = registry.get(Key::PRIVATE, GetFlags::mode_bits(0o600))?;

    // Bind this thread so Ctrl+C can interrupt its blocked receive
    let actor = Actor::new(Identity::process());
    actor.attach();
    let for_handler = actor.clone();
    ctrlc::set_handler(move || {
        for_handler.interrupt();
    })
    .expect("Error setting Ctrl+C handler");

    let sender = {
        let registry = registry.clone();
        thread::spawn(move || {
            for i in 0..to_send {
                thread::sleep(Duration::from_millis(500));
                let text = format!("tick {}", i);
                if registry.send(id, 1, text.as_bytes(), MsgFlags::empty()).is_err() {
                    break;
                }
            }
        })
    };

    println!("Blocking Receiver: Waiting on queue {} (Ctrl+C to stop)...", id);

    loop {
        match registry.receive_owned(id, 256, 0, MsgFlags::empty()) {
            Ok((mtype, data)) => {
                println!("Received [type {}]: {}", mtype, String::from_utf8_lossy(&data));
            }
            Err(Errno::Interrupted) => {
                println!("Blocking Receiver: Interrupted");
                break;
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }
    }

    registry.remove(id)?;
    let _ = sender.join();
    Ok(())
}
