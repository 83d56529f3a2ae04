//! Interactive command shell.
//!
//! Reads lines from stdin and feeds each through the interpreter and
//! dispatcher. `help` and `exit` are handled locally; everything else is a
//! playback command.

use anyhow::Result;
use std::io::{self, BufRead, Write};

use cadenza_core::{dispatch::Dispatcher, remote::RemoteApi, store::CredentialStore};

use crate::output;

const HELP: &str = "\
Commands are free-form text, for example:
  status                     show current playback
  play                       resume playback
  play bohemian rhapsody     search for a track and play it
  play playlist road trip    search for a playlist and play it
  pause                      pause playback
  next / skip                next track
  previous / go back         previous track
  volume 45                  set the volume
  volume up / volume down    nudge the volume

Shell commands:
  help                       show this help
  exit                       leave the shell";

pub async fn run<S, R>(dispatcher: &Dispatcher<S, R>, format: output::Format) -> Result<()>
where
    S: CredentialStore,
    R: RemoteApi,
{
    println!("cadenza shell - type a command, \"help\" for examples, \"exit\" to quit");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let line = line.trim();

        match line {
            "" => continue,
            "exit" | "quit" => break,
            "help" => println!("{}", HELP),
            _ => {
                if let Err(e) = crate::run_command(dispatcher, line, format).await {
                    eprintln!("error: {:#}", e);
                }
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}
