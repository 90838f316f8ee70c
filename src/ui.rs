use crate::error::UiError;
use crate::types::{ExecutionResult, RiskTier};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    style::{style, Color, Stylize},
    terminal,
};
use std::{
    cell::RefCell,
    fs::File,
    io::{self, Read, Stdout, Write},
    os::fd::AsFd,
    process::{Command, Stdio},
};

/// Appended to every choice list. Selecting it means "run nothing".
pub const NONE_OPTION: &str = "Don't run a command";

pub trait Prompter {
    fn confirm(&self, message: &str) -> bool;

    /// `None` is the "don't run anything" sentinel.
    fn choose_one(&self, options: &[String], header: &str) -> Option<String>;

    fn prompt_text(&self, placeholder: &str, is_secret: bool) -> String;
}

/// Prompts through the `gum` helper, falling back to plain line input when it
/// is missing or misbehaves.
pub struct GumPrompter<R, W> {
    program: String,
    input: RefCell<R>,
    output: RefCell<W>,
}

impl GumPrompter<File, Stdout> {
    /// Reads from a duplicate of the stdin descriptor, unbuffered, so whatever
    /// follows an answered line is still there for `gum` or the command run.
    pub fn stdio() -> io::Result<Self> {
        let stdin = File::from(io::stdin().as_fd().try_clone_to_owned()?);
        Ok(Self::with_io("gum", stdin, io::stdout()))
    }
}

impl<R: Read, W: Write> GumPrompter<R, W> {
    pub fn with_io(program: impl Into<String>, input: R, output: W) -> Self {
        Self {
            program: program.into(),
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output.into_inner()
    }

    fn helper(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.stdin(Stdio::inherit()).stderr(Stdio::inherit());
        cmd
    }

    fn spawn_error(&self, e: io::Error) -> UiError {
        if e.kind() == io::ErrorKind::NotFound {
            UiError::HelperMissing(self.program.clone())
        } else {
            UiError::Io(e)
        }
    }

    fn gum_confirm(&self, message: &str) -> Result<bool, UiError> {
        let status = self
            .helper()
            .arg("confirm")
            .arg(message)
            .stdout(Stdio::null())
            .status()
            .map_err(|e| self.spawn_error(e))?;

        match status.code() {
            Some(0) => Ok(true),
            // 1 is "no", 130 is ctrl-c / esc
            Some(1) | Some(130) => Ok(false),
            code => Err(UiError::HelperFailed {
                program: self.program.clone(),
                code,
            }),
        }
    }

    fn gum_choose(&self, options: &[String], header: &str) -> Result<Option<String>, UiError> {
        let output = self
            .helper()
            .arg("choose")
            .arg("--header")
            .arg(header)
            .args(options)
            .arg(NONE_OPTION)
            .stdout(Stdio::piped())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(UiError::HelperFailed {
                program: self.program.clone(),
                code: output.status.code(),
            });
        }

        let selected = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if selected.is_empty() || selected == NONE_OPTION {
            return Ok(None);
        }
        Ok(Some(selected))
    }

    fn gum_input(&self, placeholder: &str, is_secret: bool) -> Result<String, UiError> {
        let mut cmd = self.helper();
        cmd.arg("input").arg("--placeholder").arg(placeholder);
        if is_secret {
            cmd.arg("--password");
        }
        let output = cmd
            .stdout(Stdio::piped())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(UiError::HelperFailed {
                program: self.program.clone(),
                code: output.status.code(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// One byte at a time, stopping at the newline.
    fn read_line(&self) -> io::Result<Option<String>> {
        let mut input = self.input.borrow_mut();
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        let mut read_any = false;
        loop {
            match input.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    read_any = true;
                    if byte[0] == b'\n' {
                        break;
                    }
                    line.push(byte[0]);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        if !read_any {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&line);
        Ok(Some(line.trim_end_matches('\r').to_string()))
    }

    fn say(&self, text: &str) -> io::Result<()> {
        let mut out = self.output.borrow_mut();
        write!(out, "{}", text)?;
        out.flush()
    }

    fn fallback_confirm(&self, message: &str) -> io::Result<bool> {
        self.say(&format!("{} (y/N): ", message))?;
        let answer = self.read_line()?.unwrap_or_default();
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }

    fn fallback_choose(&self, options: &[String], header: &str) -> io::Result<Option<String>> {
        let mut menu = format!("\n{}\n", header);
        for (i, option) in options.iter().enumerate() {
            menu.push_str(&format!("{}. {}\n", i + 1, option));
        }
        menu.push_str(&format!("0. {}\n", NONE_OPTION));
        self.say(&menu)?;

        loop {
            self.say("Choose option: ")?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match line.trim().parse::<usize>() {
                Ok(0) => return Ok(None),
                Ok(n) if n <= options.len() => return Ok(Some(options[n - 1].clone())),
                Ok(_) => self.say("Invalid choice, try again.\n")?,
                Err(_) => self.say("Please enter a number.\n")?,
            }
        }
    }

    fn fallback_input(&self, placeholder: &str, is_secret: bool) -> io::Result<String> {
        if is_secret {
            match read_secret(placeholder) {
                Ok(secret) => return Ok(secret),
                Err(e) => tracing::debug!(error = %e, "no terminal for hidden input"),
            }
        }
        self.say(&format!("{}: ", placeholder))?;
        Ok(self.read_line()?.unwrap_or_default())
    }
}

fn report_fallback(what: &str, err: &UiError) {
    match err {
        UiError::HelperMissing(_) => tracing::debug!(error = %err, "{} falling back to plain input", what),
        _ => tracing::warn!(error = %err, "{} falling back to plain input", what),
    }
}

impl<R: Read, W: Write> Prompter for GumPrompter<R, W> {
    fn confirm(&self, message: &str) -> bool {
        match self.gum_confirm(message) {
            Ok(answer) => answer,
            Err(e) => {
                report_fallback("confirm", &e);
                self.fallback_confirm(message).unwrap_or(false)
            }
        }
    }

    fn choose_one(&self, options: &[String], header: &str) -> Option<String> {
        match self.gum_choose(options, header) {
            Ok(choice) => choice,
            Err(e) => {
                report_fallback("choose", &e);
                self.fallback_choose(options, header).unwrap_or(None)
            }
        }
    }

    fn prompt_text(&self, placeholder: &str, is_secret: bool) -> String {
        match self.gum_input(placeholder, is_secret) {
            Ok(text) => text,
            Err(e) => {
                report_fallback("input", &e);
                self.fallback_input(placeholder, is_secret)
                    .unwrap_or_default()
            }
        }
    }
}

/// Read a line from the terminal without echoing it.
fn read_secret(prompt: &str) -> io::Result<String> {
    eprint!("{}: ", prompt);
    io::stderr().flush()?;

    terminal::enable_raw_mode()?;
    let mut secret = String::new();
    let result = loop {
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Enter => break Ok(()),
                KeyCode::Backspace => {
                    secret.pop();
                }
                KeyCode::Esc => {
                    secret.clear();
                    break Ok(());
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    secret.clear();
                    break Ok(());
                }
                KeyCode::Char(c) => secret.push(c),
                _ => {}
            },
            Ok(_) => {}
            Err(e) => break Err(e),
        }
    };
    terminal::disable_raw_mode().ok();
    eprintln!();

    result.map(|_| secret)
}

// Rendering

fn tier_color(tier: RiskTier) -> Color {
    match tier {
        RiskTier::Safe => Color::Green,
        RiskTier::Sudo => Color::Yellow,
        RiskTier::Dangerous => Color::Red,
        RiskTier::Unknown => Color::Magenta,
    }
}

pub fn print_reply(reply: &str) {
    println!("{}", reply);
}

pub fn print_found(commands: &[String]) {
    println!();
    println!("found {} command(s) in response:", commands.len());
    for (i, cmd) in commands.iter().enumerate() {
        println!("  {}. {}", i + 1, cmd);
    }
}

pub fn print_command_header(command: &str, tier: RiskTier) {
    println!();
    println!("command: {}", style(command).bold());
    println!("classification: {}", style(tier).with(tier_color(tier)));
}

pub fn print_risks(explanation: &str) {
    println!();
    println!("{}", style("risk analysis:").with(Color::Red).bold());
    println!("{}", explanation);
    println!();
}

pub fn print_executing(command: &str) {
    println!();
    println!("executing: {}", command);
}

pub fn print_execution(result: &ExecutionResult) {
    if !result.stdout.is_empty() {
        println!("output:");
        println!("{}", result.stdout.trim_end());
    }
    if !result.stderr.is_empty() {
        println!("{}", style("errors:").with(Color::Yellow));
        println!("{}", result.stderr.trim_end());
    }
    if !result.success() {
        println!("{}", style(format!("exit code {}", result.exit_code)).with(Color::Red));
    }
}

pub fn print_notice(message: &str) {
    println!();
    println!("{}", message);
}
