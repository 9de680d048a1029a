//! NC session replayer — drives the interaction controller from a recorded
//! session and prints what the backend would receive.
//!
//! ```text
//! nc-replay <session.json>     replay a session file
//! nc-replay -                  read the session from stdin
//! ```
//!
//! Every committed selection is printed as `submit <json>`; the final
//! device projections follow as `projections <json>`. Set `RUST_LOG=debug`
//! to trace gestures.

mod session;

use session::{Session, Step};
use std::io::Read;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let text = match args.get(1).map(|s| s.as_str()) {
        Some("-") => {
            let mut text = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut text) {
                eprintln!("nc-replay error: failed to read stdin: {e}");
                std::process::exit(1);
            }
            text
        }
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("nc-replay error: {path}: {e}");
                std::process::exit(1);
            }
        },
        None => {
            eprintln!("usage: nc-replay <session.json | ->");
            std::process::exit(2);
        }
    };

    let session = match Session::from_json(&text) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("nc-replay error: invalid session: {e}");
            std::process::exit(1);
        }
    };
    let mut controller = match session.controller() {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("nc-replay error: {e}");
            std::process::exit(1);
        }
    };

    log::info!(
        "replaying {} events over {} points",
        session.events.len(),
        controller.field().point_count()
    );

    for (i, event) in session.events.iter().enumerate() {
        match event.to_step() {
            Step::Input(input) => {
                let changed = controller.handle(&input);
                log::debug!("#{i} {input:?} -> changed={changed}");
            }
            Step::Shape(shape) => controller.set_shape(shape),
        }
        for payload in controller.take_submissions() {
            println!("submit {}", payload.to_json());
        }
    }

    println!("status {}", controller.status_text());
    println!("projections {}", controller.device_projections_json());
}
