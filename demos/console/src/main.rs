use std::sync::Arc;

use pugbot::prelude::*;
use pugbot_transport::TransportError;
use tokio::io::{AsyncBufReadExt, BufReader};

// ---------------------------------------------------------------------------
// Chat stand-in
// ---------------------------------------------------------------------------

/// Prints channel messages and whispers to stdout.
struct StdoutNotifier;

fn channel_line(channel: &str, text: &str) -> String {
    format!("[{channel}] {text}")
}

fn whisper_line(nick: &str, text: &str) -> String {
    format!("[-> {nick}] {text}")
}

impl Notifier for StdoutNotifier {
    async fn notify(&self, channel: &str, text: &str) -> Result<(), TransportError> {
        println!("{}", channel_line(channel, text));
        Ok(())
    }

    async fn whisper(&self, nick: &str, text: &str) -> Result<(), TransportError> {
        println!("{}", whisper_line(nick, text));
        Ok(())
    }
}

type Bot = PugBot<TcpConnection, StdoutNotifier>;

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

/// Connects to every configured server and starts its read loops. A
/// server that cannot be reached is skipped.
async fn provision_all(bot: &Arc<Bot>) {
    for server in bot.config().servers.clone() {
        let address = server.address.clone();
        let provisioned = async {
            let socket = LogSocket::bind(&server.listen_address).await?;
            let log_addr = socket.local_addr()?;
            let conn = TcpConnection::connect(&server.address).await?;
            let handle = bot.provision(server, conn, log_addr).await?;
            Ok::<_, PugbotError>((handle, socket))
        };

        match provisioned.await {
            Ok((handle, socket)) => {
                let log_bot = Arc::clone(bot);
                let log_handle = Arc::clone(&handle);
                tokio::spawn(async move {
                    let _ = log_bot.run_log_loop(log_handle, socket).await;
                });
                let reply_bot = Arc::clone(bot);
                tokio::spawn(async move {
                    let _ = reply_bot.run_reply_loop(handle).await;
                });
            }
            Err(e) => tracing::error!(%address, error = %e, "could not provision server"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pugbot::init_tracing()?;

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: pugbot-console <config.json>")?;
    let config = BotConfig::from_json_str(&std::fs::read_to_string(&path)?)?;

    let bot = Arc::new(PugBot::new(config, StdoutNotifier));
    provision_all(&bot).await;
    eprintln!("type lines like: #pug alice !pug de_dust2");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Intent::parse_console(&line) {
            Some(intent) => bot.dispatch(intent).await,
            None if line.trim().is_empty() => {}
            None => eprintln!("unrecognized: {line}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_line_prefixes_channel() {
        assert_eq!(channel_line("#pug", "The PUG is full."), "[#pug] The PUG is full.");
    }

    #[test]
    fn test_whisper_line_names_recipient() {
        assert_eq!(whisper_line("alice", "hi"), "[-> alice] hi");
    }
}
