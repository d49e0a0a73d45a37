use crate::events::AppEvent;
use crate::sys::script::{Swipe, run_script};
use async_channel::Sender;
use std::thread;
use std::time::Duration;
use tokio::runtime::Runtime;

pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Default)]
pub struct ServiceOptions {
    /// Accept pointer commands on the control socket.
    pub socket: bool,
    pub script: Option<Script>,
}

#[derive(Debug, Clone)]
pub struct Script {
    pub swipes: Vec<Swipe>,
    pub pause: Duration,
    pub linger: Duration,
}

pub fn start_background_services(tx: Sender<AppEvent>, options: ServiceOptions) {
    thread::spawn(move || {
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Failed to create Tokio runtime: {}", e);
                let _ = tx.send_blocking(AppEvent::Quit);
                return;
            }
        };

        rt.block_on(async {
            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    run_frame_ticker(tx).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::config::run_async_watcher(tx).await;
                });
            }

            if options.socket {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::sys::server::run_server(tx).await;
                });
            }

            if let Some(script) = options.script {
                let tx = tx.clone();
                tokio::spawn(async move {
                    run_script(tx, script.swipes, script.pause, script.linger).await;
                });
            }

            std::future::pending::<()>().await;
        });
    });
}

async fn run_frame_ticker(tx: Sender<AppEvent>) {
    let mut interval = tokio::time::interval(FRAME_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        // a full channel means the ui loop is behind; skip this frame
        match tx.try_send(AppEvent::Frame) {
            Ok(()) | Err(async_channel::TrySendError::Full(_)) => {}
            Err(async_channel::TrySendError::Closed(_)) => break,
        }
    }
}
