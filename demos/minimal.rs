//! Minimal headless session example.
//!
//! Wires a toy evaluator through the plugin without any UI. Useful for
//! testing or custom rendering surfaces.
//!
//! Run with: `cargo run --example minimal`

use bevy::prelude::*;
use bevy_repl::prelude::*;

fn main() {
    App::new()
        .add_plugins(MinimalPlugins)
        .add_plugins(ReplPlugin::default())
        .add_systems(Startup, install_evaluator)
        .add_systems(Update, print_outputs)
        .add_systems(Update, send_test_commands.run_if(run_once))
        .run();
}

/// Toy evaluator: doubles any number, fails on everything else.
struct DoublingEvaluator {
    poster: ResponsePoster,
}

impl Evaluator for DoublingEvaluator {
    fn eval(&mut self, command: &str, anchor: EchoId) -> Result<(), EvalError> {
        let n: f64 = command
            .parse()
            .map_err(|_| EvalError::new(format!("not a number: {}", command)))?;
        self.poster
            .post(EvaluatorResponse::info(anchor, Value::number(n * 2.0)));
        Ok(())
    }
}

fn install_evaluator(mut session: ResMut<Session>) {
    let poster = session.poster();
    session.set_evaluator(DoublingEvaluator { poster });

    println!("Session initialized; numbers get doubled, :help lists commands");
}

/// Send some test input programmatically.
fn send_test_commands(mut events: MessageWriter<ReplInputEvent>) {
    println!("\n--- Sending test input ---");

    // Evaluated by the toy backend
    events.write(ReplInputEvent::new("21"));

    // Rejected by the toy backend
    events.write(ReplInputEvent::new("twenty-one"));

    // Built-in commands
    events.write(ReplInputEvent::new(":help"));
    events.write(ReplInputEvent::new(":history"));
}

/// Process and print transcript output events.
fn print_outputs(mut events: MessageReader<ReplOutputEvent>) {
    for event in events.read() {
        let prefix = match event.kind {
            OutputKind::Echo => "[$]",
            OutputKind::Info => "[>]",
            OutputKind::Error => "[ERROR]",
            OutputKind::Log => "[LOG]",
        };
        println!("{} {}", prefix, event.body);
    }
}
