use crate::arc::PointerKind;
use crate::events::AppEvent;
use async_channel::Sender;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;
use uigeom::Point;

pub const SOCKET_PATH: &str = "/tmp/arcray.sock";

/// Parses one control line: `down|move|up X Y`, `cancel`, `reload` or `quit`.
pub fn parse_command(line: &str) -> Option<AppEvent> {
    let mut parts = line.split_whitespace();
    let word = parts.next()?;
    let kind = match word {
        "cancel" => return Some(AppEvent::Pointer(PointerKind::Cancel, Point::default())),
        "reload" => return Some(AppEvent::ConfigReload),
        "quit" => return Some(AppEvent::Quit),
        _ => word.parse::<PointerKind>().ok()?,
    };
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(AppEvent::Pointer(kind, Point::new(x, y)))
}

pub async fn run_server(tx: Sender<AppEvent>) {
    if std::fs::metadata(SOCKET_PATH).is_ok() {
        let _ = std::fs::remove_file(SOCKET_PATH);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };
    log::info!("Listening for pointer commands on {}", SOCKET_PATH);

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let reader = BufReader::new(&mut stream);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        match parse_command(line.trim()) {
                            Some(event) => {
                                if tx.send(event).await.is_err() {
                                    break;
                                }
                            }
                            None => log::warn!("Ignoring command '{}'", line.trim()),
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert!(matches!(
            parse_command("down 10 20.5"),
            Some(AppEvent::Pointer(PointerKind::Down, p)) if p == Point::new(10.0, 20.5)
        ));
        assert!(matches!(
            parse_command("MOVE -3 4"),
            Some(AppEvent::Pointer(PointerKind::Move, _))
        ));
        assert!(matches!(
            parse_command("cancel"),
            Some(AppEvent::Pointer(PointerKind::Cancel, _))
        ));
        assert!(matches!(parse_command("quit"), Some(AppEvent::Quit)));
        assert!(parse_command("up 1").is_none());
        assert!(parse_command("up 1 2 3").is_none());
        assert!(parse_command("jump 1 2").is_none());
        assert!(parse_command("").is_none());
    }
}
