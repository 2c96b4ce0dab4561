/// Keyboard commands read line by line from stdin
use std::io::BufRead;

use log::debug;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    AllowSound,
    DenySound,
    Acknowledge,
    Download,
    Quit,
}

pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "allow" => Some(Command::AllowSound),
        "n" | "no" | "deny" => Some(Command::DenySound),
        "a" | "ack" | "stop" => Some(Command::Acknowledge),
        "d" | "download" => Some(Command::Download),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Forward parsed commands from stdin until EOF or the receiver goes away
///
/// Runs on a plain thread: a blocking stdin read would otherwise hold up
/// runtime shutdown.
pub fn spawn_reader(tx: mpsc::Sender<Command>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    debug!("stdin read failed: {}", e);
                    break;
                }
            };
            match parse_command(&line) {
                Some(command) => {
                    if tx.blocking_send(command).is_err() {
                        break;
                    }
                }
                None => debug!("Unknown command '{}'", line.trim()),
            }
        }
    });
}
