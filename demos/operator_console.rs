//! Interactive operator console driving a [`Session`].
//!
//! Run with: cargo run --example operator_console
//!
//! Keys:
//!   c / p / n   push Chance / Pinch / Normal
//!   s           emergency stop
//!   + / -       intensity up / down by 10
//!   d           toggle demo mode
//!   space       toggle pause
//!   m           toggle mute
//!   k           pair (leave demo mode and connect)
//!   x           disconnect
//!   q / Esc     quit

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind};
use crossterm::terminal;
use cue_remote_ble::{BtleplugHost, Cue, Remote, SendMode, Session, SessionState};
use futures::StreamExt;
use std::io::Write;
use std::sync::Arc;

/// Keeps the terminal in raw mode until dropped.
struct RawMode;

impl RawMode {
    fn enable() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn render(state: &SessionState) {
    let mode = match state.send_mode() {
        SendMode::Demo => "demo",
        SendMode::Live => "live",
        SendMode::Offline => "offline",
    };
    let connection = if state.connection.connected {
        state.connection.device_name.as_str()
    } else {
        "-"
    };

    print!(
        "\r\x1b[2K[{}] device: {} | cue: {} ({}) | intensity: {}{}{}{}",
        mode,
        connection,
        state.cue,
        state.last_cue_at.format("%H:%M:%S"),
        state.intensity,
        if state.paused { " | paused" } else { "" },
        if state.muted { " | muted" } else { "" },
        if state.has_error() {
            format!(" | error: {}", state.error)
        } else {
            String::new()
        },
    );
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cue_remote_ble=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let remote = Arc::new(Remote::new(Arc::new(BtleplugHost::new().await)));
    let session = Session::new(remote);

    if !session.is_supported() {
        println!("Bluetooth is not available; running in demo mode only.");
    }

    let raw_mode = RawMode::enable()?;
    let mut events = EventStream::new();
    render(&session.snapshot());

    while let Some(event) = events.next().await {
        let key = match event? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key,
            _ => continue,
        };

        let intensity = session.snapshot().intensity.percent();

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Char('c') => session.push_cue(Cue::Chance).await,
            KeyCode::Char('p') => session.push_cue(Cue::Pinch).await,
            KeyCode::Char('n') => session.push_cue(Cue::Normal).await,
            KeyCode::Char('s') => session.push_stop().await,
            KeyCode::Char('+') => session.push_intensity(intensity.saturating_add(10)).await,
            KeyCode::Char('-') => session.push_intensity(intensity.saturating_sub(10)).await,
            KeyCode::Char('d') => session.set_demo(!session.snapshot().demo),
            KeyCode::Char(' ') => {
                session.toggle_paused();
            }
            KeyCode::Char('m') => {
                session.toggle_muted();
            }
            KeyCode::Char('k') => session.begin_pairing().await,
            KeyCode::Char('x') => session.disconnect().await,
            _ => {}
        }

        render(&session.snapshot());
    }

    drop(raw_mode);
    println!();
    session.disconnect().await;

    Ok(())
}
