use std::env;
use std::error::Error;

use hnef_core::Move;
use hnef_protocol::{encode_request, parse_server, Command, ServerMessage};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Where to connect: env override or default.
    let addr = env::var("HNEF_CLIENT_ADDR").unwrap_or_else(|_| "127.0.0.1:10000".to_string());

    println!("Connecting to {}...", addr);
    let stream = TcpStream::connect(&addr).await?;
    println!("Connected.");
    println!("Type commands like:");
    println!("  conn alice");
    println!("  move 03000301   (from x=03 y=00 to x=03 y=01)");
    println!("  chat good luck");
    println!("  leave");
    println!("  exit");
    println!("Pings are answered automatically. Type 'quit' to drop the connection.\n");

    let (mut read_stream, mut write_stream) = stream.into_split();

    // Reader task: print server messages, ask the main loop to answer pings.
    let (pong_tx, mut pong_rx) = mpsc::unbounded_channel::<()>();
    let reader = tokio::spawn(async move {
        let mut buf = vec![0u8; 1024];
        loop {
            let n = match read_stream.read(&mut buf).await {
                Ok(0) => {
                    println!("<< connection closed by server");
                    break;
                }
                Ok(n) => n,
                Err(e) => {
                    eprintln!("Read error: {:?}", e);
                    break;
                }
            };

            let text = String::from_utf8_lossy(&buf[..n]);
            for msg in parse_server(&text) {
                match msg {
                    ServerMessage::Ping => {
                        let _ = pong_tx.send(());
                    }
                    ServerMessage::Playfield(digits) => print_playfield(&digits),
                    other => println!("<< {}", other.encode()),
                }
            }
        }
    });

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = stdin.next_line() => {
                let Some(line) = line? else {
                    println!("\nEOF on stdin, exiting client.");
                    break;
                };

                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed.eq_ignore_ascii_case("quit") {
                    println!("Exiting client.");
                    break;
                }

                let command = match parse_command(trimmed) {
                    Some(c) => c,
                    None => {
                        eprintln!("Could not parse line as a command.");
                        continue;
                    }
                };
                let is_exit = command == Command::Exit;

                write_stream.write_all(encode_request(&[command]).as_bytes()).await?;
                if is_exit {
                    break;
                }
            }
            Some(()) = pong_rx.recv() => {
                write_stream.write_all(encode_request(&[Command::Pong]).as_bytes()).await?;
            }
        }
    }

    reader.abort();
    Ok(())
}

fn parse_command(line: &str) -> Option<Command> {
    let (key, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match key {
        "conn" => Command::Connect(rest.to_string()),
        "move" => Command::Move(rest.parse::<Move>().ok()?),
        "chat" => Command::Chat(rest.to_string()),
        "leave" => Command::Leave,
        "exit" => Command::Exit,
        "ping" => Command::Ping,
        _ => return None,
    };
    Some(command)
}

fn print_playfield(digits: &str) {
    println!("<< playfield");
    println!("     0 1 2 3 4 5 6 7 8 9 10");
    for (y, row) in digits.as_bytes().chunks(11).enumerate() {
        let cells: Vec<&str> = row
            .iter()
            .map(|d| match d {
                b'1' => "#",
                b'2' => "X",
                b'3' => "b",
                b'4' => "w",
                b'5' => "K",
                _ => ".",
            })
            .collect();
        println!("  {:>2} {}", y, cells.join(" "));
    }
}
