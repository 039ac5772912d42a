//! Terminal surface - the camera, preview and loading screens on a TTY
//!
//! Keys:
//! - camera:  Enter or `c` to capture, `q` to quit
//! - preview: `r` to retake (Ulangi), `u` to use the photo (Gunakan Foto)
//! - loading camera: `q` to give up

use async_trait::async_trait;
use kalori_common::presenter::LOADING_MESSAGE;
use kalori_common::{Alert, BlockReason, Surface, UserAction, View};
use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::spinner::Spinner;

/// Which screen is waiting for input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Camera,
    Preview,
    Blocked,
}

/// Map one line of input to an action on the given screen
pub fn parse_action(screen: Screen, input: &str) -> Option<UserAction> {
    let input = input.trim().to_lowercase();
    match (screen, input.as_str()) {
        (_, "q") | (_, "quit") => Some(UserAction::Quit),
        (Screen::Camera, "") | (Screen::Camera, "c") | (Screen::Camera, "capture") => {
            Some(UserAction::Capture)
        }
        (Screen::Preview, "r") | (Screen::Preview, "retake") | (Screen::Preview, "ulangi") => {
            Some(UserAction::Retake)
        }
        (Screen::Preview, "u") | (Screen::Preview, "use") | (Screen::Preview, "gunakan") => {
            Some(UserAction::Confirm)
        }
        _ => None,
    }
}

fn key_hint(screen: Screen) -> &'static str {
    match screen {
        Screen::Camera => "[Enter/c] capture  [q] quit",
        Screen::Preview => "[r] Ulangi  [u] Gunakan Foto  [q] quit",
        Screen::Blocked => "[q] quit",
    }
}

/// Print an alert as a framed block
pub fn print_alert(alert: &Alert) {
    println!();
    println!("{} {}", "┌".dimmed(), alert.title.bold());
    for line in alert.message.lines() {
        println!("{} {}", "│".dimmed(), line);
    }
    println!("{}", "└".dimmed());
    println!();
}

pub struct TerminalSurface {
    input: Lines<BufReader<Stdin>>,
    camera_label: String,
    screen: Screen,
    spinner: Option<Spinner>,
    last_blocked: Option<BlockReason>,
}

impl TerminalSurface {
    pub fn new(camera_label: impl Into<String>) -> Self {
        Self {
            input: BufReader::new(tokio::io::stdin()).lines(),
            camera_label: camera_label.into(),
            screen: Screen::Blocked,
            spinner: None,
            last_blocked: None,
        }
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop();
        }
    }
}

#[async_trait]
impl Surface for TerminalSurface {
    async fn render(&mut self, view: View<'_>) {
        self.stop_spinner();

        match view {
            View::Blocked(reason) => {
                self.screen = Screen::Blocked;
                // Readiness polling re-renders the same screen
                if self.last_blocked != Some(reason) {
                    println!("{}  {}", "[kalori]".bright_cyan(), reason.message().yellow());
                    if reason == BlockReason::AwaitingCamera {
                        println!("         {}", key_hint(Screen::Blocked).dimmed());
                    }
                    self.last_blocked = Some(reason);
                }
            }
            View::Camera => {
                self.screen = Screen::Camera;
                println!(
                    "{}  {} {}",
                    "[kalori]".bright_cyan(),
                    "Camera".bold(),
                    format!("({})", self.camera_label).dimmed()
                );
                println!("         {}", key_hint(Screen::Camera).dimmed());
            }
            View::Preview(artifact) => {
                self.screen = Screen::Preview;
                println!(
                    "{}  {} {}",
                    "[kalori]".bright_cyan(),
                    "Preview".bold(),
                    artifact.path().display()
                );
                println!("         {}", key_hint(Screen::Preview).dimmed());
            }
            View::Loading => {
                self.spinner = Some(Spinner::new(LOADING_MESSAGE));
            }
        }
    }

    async fn next_action(&mut self) -> Option<UserAction> {
        loop {
            let line = match self.input.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) | Err(_) => return None,
            };
            match parse_action(self.screen, &line) {
                Some(action) => return Some(action),
                None => println!("         {}", key_hint(self.screen).dimmed()),
            }
        }
    }

    async fn alert(&mut self, alert: &Alert) {
        self.stop_spinner();
        print_alert(alert);
    }
}
