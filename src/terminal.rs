//! Line-oriented terminal front-end.
//!
//! Renders the current screen as text on stdout and maps each input line
//! onto a `DiarySession` call. While the heart round runs, a ticker
//! drives the countdown alongside input.

use anyhow::Result;
use chrono::{Local, Timelike};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use couples_diary::config::AppConfig;
use couples_diary::domain::error::DiaryError;
use couples_diary::domain::letter::{Letter, Participant};
use couples_diary::domain::view::{self, ViewState};
use couples_diary::ports::repository::LetterRepository;
use couples_diary::usecases::DiarySession;

/// Drag used by a bare `pull`.
const DEFAULT_PULL: i64 = 150;

/// What the next input line completes.
enum Pending {
    Nothing,
    Title,
    Content { title: String, lines: Vec<String> },
    ConfirmDelete(String),
}

struct Terminal<R: LetterRepository> {
    session: DiarySession<R>,
    pending: Pending,
    name: String,
    tap_threshold: u32,
}

/// Run until `quit` or end of input.
pub async fn run<R: LetterRepository>(session: DiarySession<R>, config: &AppConfig) -> Result<()> {
    let mut terminal = Terminal {
        session,
        pending: Pending::Nothing,
        name: config.diary.name.clone(),
        tap_threshold: config.unlock.tap_threshold,
    };
    let tick = config.unlock.tick();
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    terminal.render();
    loop {
        let in_game = matches!(terminal.session.view(), ViewState::Game { .. });
        tokio::select! {
            biased;
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !terminal.handle(line.trim()).await {
                    break;
                }
                if !in_game && matches!(terminal.session.view(), ViewState::Game { .. }) {
                    ticker.reset();
                }
                terminal.render();
            }
            _ = ticker.tick(), if in_game => {
                terminal.session.tick(tick);
                if !matches!(terminal.session.view(), ViewState::Game { .. }) {
                    terminal.render();
                }
            }
        }
    }

    println!("Goodbye! 💕");
    Ok(())
}

impl<R: LetterRepository> Terminal<R> {
    /// Apply one input line. Returns false to quit.
    async fn handle(&mut self, line: &str) -> bool {
        match line {
            "/quit" => return false,
            "/reset" => {
                self.pending = Pending::Nothing;
                self.session.reset();
                return true;
            }
            _ => {}
        }

        match std::mem::replace(&mut self.pending, Pending::Nothing) {
            Pending::Title => self.handle_title(line),
            Pending::Content { title, lines } => self.handle_content(line, title, lines).await,
            Pending::ConfirmDelete(id) => self.handle_confirm_delete(line, &id).await,
            Pending::Nothing => return self.handle_screen(line).await,
        }
        true
    }

    fn handle_title(&mut self, line: &str) {
        if line == "/cancel" {
            self.session.back();
            return;
        }
        println!("Message (finish with a line containing only '.', or /cancel):");
        self.pending = Pending::Content {
            title: line.to_string(),
            lines: Vec::new(),
        };
    }

    async fn handle_content(&mut self, line: &str, title: String, mut lines: Vec<String>) {
        match line {
            "/cancel" => self.session.back(),
            "." => match self.session.save_letter(&title, &lines.join("\n")).await {
                Ok(_) => println!("✅ Letter saved successfully! 💌"),
                Err(e) => {
                    show_error(&e, "save letter");
                    self.pending = Pending::Title;
                }
            },
            _ => {
                lines.push(line.to_string());
                self.pending = Pending::Content { title, lines };
            }
        }
    }

    async fn handle_confirm_delete(&mut self, line: &str, id: &str) {
        if !line.eq_ignore_ascii_case("y") {
            println!("Kept.");
            return;
        }
        match self.session.delete_letter(id).await {
            Ok(()) => println!("✅ Letter deleted successfully"),
            Err(e) => show_error(&e, "delete letter"),
        }
    }

    async fn handle_screen(&mut self, line: &str) -> bool {
        match self.session.view().clone() {
            ViewState::SelectVisitor => match line {
                "q" => return false,
                _ => match parse_participant(line) {
                    Some(visitor) => self.session.choose_visitor(visitor),
                    None => println!("Pick 1 or 2."),
                },
            },
            ViewState::SelectProfile { .. } => match line {
                "b" => self.session.back(),
                _ => match parse_participant(line) {
                    Some(profile) => self.session.choose_profile(profile).await,
                    None => println!("Pick 1 or 2, or b to go back."),
                },
            },
            ViewState::SelectAction { .. } => match line {
                "r" => self.session.choose_read().await,
                "w" => self.start_writing(),
                "b" => self.session.back(),
                _ => println!("Pick r, w or b."),
            },
            ViewState::Write { .. } => self.handle_title(line),
            ViewState::Letters { .. } => self.handle_letters(line).await,
            ViewState::RibbonPull { .. } => match line.split_whitespace().collect::<Vec<_>>()[..] {
                [] | ["pull"] => {
                    self.session.drag_ribbon(DEFAULT_PULL);
                }
                ["pull", distance] => match distance.parse::<i64>() {
                    Ok(distance) => {
                        if !self.session.drag_ribbon(distance) {
                            println!("Pull harder!");
                        }
                    }
                    Err(_) => println!("Distance must be a number."),
                },
                ["b"] => self.session.back(),
                _ => println!("Type pull, pull <distance> or b."),
            },
            ViewState::Game { .. } => {
                // every typed character is one tap
                for _ in 0..line.chars().count().max(1) {
                    self.session.tap();
                }
            }
            ViewState::Reveal { letter_id, .. } => match line {
                "a" => self.session.play_again(),
                "b" => self.session.back(),
                "d" => self.confirm_delete(letter_id),
                _ => println!("Pick a, b or d."),
            },
        }
        true
    }

    async fn handle_letters(&mut self, line: &str) {
        match line.split_whitespace().collect::<Vec<_>>()[..] {
            ["w"] => self.start_writing(),
            ["r"] => self.session.refresh().await,
            ["b"] => self.session.back(),
            ["d", number] => match self.letter_at(number) {
                Some(id) => self.confirm_delete(id),
                None => println!("No letter {number}."),
            },
            [number] => match self.letter_at(number) {
                Some(id) => {
                    self.session.open_letter(&id);
                }
                None => println!("No letter {number}."),
            },
            _ => println!("Pick a number, d <number>, w, r or b."),
        }
    }

    fn start_writing(&mut self) {
        self.session.choose_write();
        self.pending = Pending::Title;
    }

    fn confirm_delete(&mut self, id: String) {
        println!("❓ Are you sure you want to delete this letter? [y/N]");
        self.pending = Pending::ConfirmDelete(id);
    }

    fn letter_at(&self, number: &str) -> Option<String> {
        let index = number.parse::<usize>().ok()?.checked_sub(1)?;
        self.session.letters().get(index).map(|letter| letter.id.clone())
    }

    fn render(&self) {
        if matches!(
            self.pending,
            Pending::Content { .. } | Pending::ConfirmDelete(_)
        ) {
            return;
        }

        match self.session.view() {
            ViewState::SelectVisitor => {
                println!("\n💖 {} 💖", self.name);
                println!("Who's visiting? [1] 👨 Boyfriend  [2] 👩 Girlfriend  (q to quit)");
            }
            ViewState::SelectProfile { visitor } => {
                let hour = Local::now().hour();
                println!("\n{}, {}!", view::greeting(hour), view::pet_name(*visitor));
                println!("Whose diary? [1] 👨 Boyfriend  [2] 👩 Girlfriend  [b] back");
            }
            ViewState::SelectAction { profile, .. } => {
                println!("\n📖 {profile}'s diary");
                println!("[r] read letters  [w] write a letter  [b] back");
            }
            ViewState::Write { profile, .. } => {
                println!("\n✍️  New letter for {profile}");
                println!("Title (or /cancel):");
            }
            ViewState::Letters { .. } => self.render_letters(),
            ViewState::RibbonPull { .. } => {
                println!("\n🎁 A sealed letter. Pull the ribbon to open it!");
                println!("[pull] or [pull <distance>]  [b] back");
            }
            ViewState::Game { .. } => {
                if let Some(game) = self.session.game() {
                    println!(
                        "❤️  Taps: {}/{}  Time: {:.1}s  Filled: {:.0}%  (type to tap)",
                        game.taps(),
                        self.tap_threshold,
                        game.time_left().as_secs_f64(),
                        game.fill_percentage()
                    );
                }
            }
            ViewState::Reveal { .. } => self.render_reveal(),
        }
    }

    fn render_letters(&self) {
        println!("\n💌 Love Letters");
        let letters = self.session.letters();
        if letters.is_empty() {
            println!("No letters yet. Write the first one! [w]  [b] back");
            return;
        }
        for (index, letter) in letters.iter().enumerate() {
            println!(
                "{:>3}. {}  (from {}, {})",
                index + 1,
                letter.title,
                letter.from,
                format_date(letter)
            );
        }
        println!("[<number>] open  [d <number>] delete  [w] write  [r] refresh  [b] back");
    }

    fn render_reveal(&self) {
        let Some(letter) = self.session.selected_letter() else {
            println!("This letter is gone. [b] back");
            return;
        };
        if let Some(outcome) = self.session.outcome() {
            if outcome.success {
                println!("\n💝 Unlocked! You tapped {} times! Here's your letter:", outcome.taps);
            } else {
                println!(
                    "\n💔 Time's up! You tapped {} times! Here's your letter anyway:",
                    outcome.taps
                );
            }
        }
        println!("\n  {}", letter.title);
        println!("  From: {}", from_label(letter.from));
        println!("  {}\n", format_date(letter));
        for line in letter.content.lines() {
            println!("  {line}");
        }
        println!("\n[a] play again  [b] back to letters  [d] delete");
    }
}

fn parse_participant(line: &str) -> Option<Participant> {
    match line {
        "1" => Some(Participant::Boyfriend),
        "2" => Some(Participant::Girlfriend),
        other => other.parse().ok(),
    }
}

fn from_label(participant: Participant) -> String {
    match participant {
        Participant::Boyfriend => format!("👨 {participant}"),
        Participant::Girlfriend => format!("👩 {participant}"),
    }
}

fn format_date(letter: &Letter) -> String {
    letter
        .date
        .with_timezone(&Local)
        .format("%B %-d, %Y %-I:%M %p")
        .to_string()
}

fn show_error(error: &DiaryError, action: &str) {
    match error {
        DiaryError::Validation { .. } => println!("❌ Please fill in both title and message!"),
        e if e.is_retryable() => {
            println!("❌ Failed to {action}. Please try again. ({e})");
        }
        e => println!("❌ {e}"),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_parse_participant() {
        assert_eq!(parse_participant("1"), Some(Participant::Boyfriend));
        assert_eq!(parse_participant("girlfriend"), Some(Participant::Girlfriend));
        assert_eq!(parse_participant("3"), None);
    }

    #[test]
    fn test_tick_is_positive() {
        let config = AppConfig::default();
        assert!(config.unlock.tick() > Duration::ZERO);
    }
}
