//! Console front end.
//!
//! A [`Session`] owns the [`Reader`] and is the only place it is mutated.
//! Console lines and narration events arrive as [`SessionEvent`]s on one
//! channel and are handled strictly in order.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    str::FromStr,
    sync::mpsc::Receiver,
};

use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    engine::{Direction, Reader},
    import::DocumentExtractor,
    narration::{NarrationEvent, Narrator},
};

const HELP: &str = "\
Commands:
  play | pause | toggle     start or stop narration at the reading position
  primary | secondary       run the offered resume actions
  next | prev               skip one line of narration
  page+ | page-             browse pages without moving the reading position
  goto N                    show page N
  select N                  anchor the reading position at line N of this page
  open PATH                 load a document
  reset                     unload the document
  status                    show the current page
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play,
    Pause,
    Toggle,
    Primary,
    Secondary,
    SkipLine(Direction),
    SkipPage(Direction),
    Goto(String),
    /// Zero-based line on the viewed page.
    Select(usize),
    Open(PathBuf),
    Reset,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("'{0}' is not a line number")]
    InvalidLine(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let (word, rest) = input
            .split_once(char::is_whitespace)
            .map(|(word, rest)| (word, rest.trim()))
            .unwrap_or((input, ""));
        let argument = |name: &'static str| {
            if rest.is_empty() {
                Err(CommandError::MissingArgument(name))
            } else {
                Ok(rest)
            }
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "play" => Command::Play,
            "pause" | "stop" => Command::Pause,
            "toggle" => Command::Toggle,
            "primary" => Command::Primary,
            "secondary" => Command::Secondary,
            "next" => Command::SkipLine(Direction::Next),
            "prev" | "previous" => Command::SkipLine(Direction::Previous),
            "page+" => Command::SkipPage(Direction::Next),
            "page-" => Command::SkipPage(Direction::Previous),
            "goto" => Command::Goto(argument("goto")?.to_string()),
            "select" => {
                let raw = argument("select")?;
                match raw.parse::<usize>() {
                    Ok(number) if number >= 1 => Command::Select(number - 1),
                    _ => return Err(CommandError::InvalidLine(raw.to_string())),
                }
            }
            "open" => Command::Open(PathBuf::from(argument("open")?)),
            "reset" => Command::Reset,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return Err(CommandError::Unknown(word.to_string())),
        };
        Ok(command)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Input(String),
    Narration(NarrationEvent),
    InputClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<N, E, W> {
    reader: Reader<N>,
    extractor: E,
    out: W,
}

impl<N, E, W> Session<N, E, W>
where
    N: Narrator,
    E: DocumentExtractor,
    W: Write,
{
    pub fn new(reader: Reader<N>, extractor: E, out: W) -> Self {
        Self {
            reader,
            extractor,
            out,
        }
    }

    pub fn reader(&self) -> &Reader<N> {
        &self.reader
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Handle events until `quit` or the end of input.
    pub fn run(&mut self, events: &Receiver<SessionEvent>) -> io::Result<()> {
        writeln!(self.out, "Type 'help' for commands.")?;
        for event in events.iter() {
            if self.handle_event(event)? == Flow::Quit {
                break;
            }
        }
        self.reader.stop();
        info!("Session finished");
        Ok(())
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> io::Result<Flow> {
        match event {
            SessionEvent::Input(line) => {
                if line.trim().is_empty() {
                    return Ok(Flow::Continue);
                }
                match line.parse::<Command>() {
                    Ok(command) => self.handle_command(command),
                    Err(err) => {
                        writeln!(self.out, "{err} (try 'help')")?;
                        Ok(Flow::Continue)
                    }
                }
            }
            SessionEvent::Narration(event) => {
                self.handle_narration(event)?;
                Ok(Flow::Continue)
            }
            SessionEvent::InputClosed => {
                debug!("Console input closed");
                Ok(Flow::Quit)
            }
        }
    }

    pub fn handle_command(&mut self, command: Command) -> io::Result<Flow> {
        debug!("Command: {command:?}");
        match &command {
            Command::Open(path) => {
                self.open(path)?;
                return Ok(Flow::Continue);
            }
            Command::Reset => {
                self.reader.reset();
                writeln!(self.out, "Document closed.")?;
                return Ok(Flow::Continue);
            }
            Command::Help => {
                writeln!(self.out, "{HELP}")?;
                return Ok(Flow::Continue);
            }
            Command::Quit => return Ok(Flow::Quit),
            _ => {}
        }

        if self.reader.document().is_none() {
            writeln!(self.out, "No document loaded. Use 'open PATH'.")?;
            return Ok(Flow::Continue);
        }

        match command {
            Command::Play => self.reader.play(),
            Command::Pause => self.reader.stop(),
            Command::Toggle => self.reader.toggle_playback(),
            Command::Primary => self.reader.press_primary(),
            Command::Secondary => {
                if !self.reader.press_secondary() {
                    writeln!(self.out, "Nothing to do from here.")?;
                }
            }
            Command::SkipLine(direction) => self.reader.skip_line(direction),
            Command::SkipPage(direction) => self.reader.skip_page(direction),
            Command::Goto(input) => {
                if !self.reader.jump_to_page(&input) {
                    writeln!(self.out, "No page '{input}'.")?;
                }
            }
            Command::Select(index) => {
                if !self.reader.select_line(index) {
                    writeln!(self.out, "No line {} on this page.", index + 1)?;
                }
            }
            Command::Status => return self.render_page().map(|()| Flow::Continue),
            Command::Open(_) | Command::Reset | Command::Help | Command::Quit => {}
        }
        self.render_status()?;
        Ok(Flow::Continue)
    }

    /// Load `path`, replacing the current document. A failed import leaves
    /// everything as it was and prints a single notice.
    pub fn open(&mut self, path: &Path) -> io::Result<()> {
        match self.extractor.extract(path) {
            Ok(extraction) => {
                self.reader.load(extraction.into_document());
                if self.reader.document().is_some() {
                    self.render_page()
                } else {
                    writeln!(self.out, "{} has no pages.", path.display())
                }
            }
            Err(err) => {
                warn!("Import of {} failed: {err}", path.display());
                writeln!(self.out, "Could not open {}: {err}", path.display())
            }
        }
    }

    fn handle_narration(&mut self, event: NarrationEvent) -> io::Result<()> {
        let current = self.reader.pending_seq() == Some(event.seq());
        let was_playing = self.reader.is_playing();
        self.reader.on_narration(event.clone());
        if !current {
            return Ok(());
        }

        match event {
            NarrationEvent::Started(_) => {
                let cursor = *self.reader.cursor();
                if let Some(text) = self
                    .reader
                    .document()
                    .and_then(|document| document.line(cursor.read_page, cursor.read_line))
                {
                    writeln!(
                        self.out,
                        "[{}:{}] {text}",
                        cursor.read_page + 1,
                        cursor.read_line + 1
                    )?;
                }
            }
            NarrationEvent::Ended(_) => {
                if was_playing && !self.reader.is_playing() {
                    let finished = self
                        .reader
                        .resume_state()
                        .is_some_and(|state| state.is_end_of_book);
                    if finished {
                        writeln!(self.out, "End of document.")?;
                    } else {
                        writeln!(self.out, "Narration stopped: the next line was not accepted.")?;
                    }
                    self.render_status()?;
                }
            }
            NarrationEvent::Failed { message, .. } => {
                writeln!(self.out, "Narration stopped: {message}")?;
                self.render_status()?;
            }
        }
        Ok(())
    }

    fn render_status(&mut self) -> io::Result<()> {
        let (Some(document), Some(state)) = (self.reader.document(), self.reader.resume_state())
        else {
            return Ok(());
        };
        let cursor = self.reader.cursor();
        write!(
            self.out,
            "page {}/{} | reading {}:{} | {} | primary: {}",
            cursor.view_page + 1,
            document.page_count(),
            cursor.read_page + 1,
            cursor.read_line + 1,
            if cursor.is_playing { "playing" } else { "paused" },
            state.primary.label()
        )?;
        if let Some(secondary) = state.secondary {
            write!(self.out, " | secondary: {}", secondary.label())?;
        }
        writeln!(self.out)
    }

    fn render_page(&mut self) -> io::Result<()> {
        let Some(document) = self.reader.document() else {
            return writeln!(self.out, "No document loaded.");
        };
        let cursor = *self.reader.cursor();
        let info = document.info();
        if let Some(title) = &info.title {
            match &info.author {
                Some(author) => writeln!(self.out, "{title} by {author}")?,
                None => writeln!(self.out, "{title}")?,
            }
        }
        writeln!(
            self.out,
            "-- page {} of {} --",
            cursor.view_page + 1,
            document.page_count()
        )?;

        let lines = document.lines(cursor.view_page);
        if lines.is_empty() {
            writeln!(self.out, "   (blank page)")?;
        }
        let reading_here = cursor.view_page == cursor.read_page;
        for (index, line) in lines.iter().enumerate() {
            let reading = if reading_here && index == cursor.read_line {
                '>'
            } else {
                ' '
            };
            let selected = if cursor.view_selected_line == Some(index) {
                '*'
            } else {
                ' '
            };
            writeln!(self.out, "{reading}{selected}{:>3}. {line}", index + 1)?;
        }
        self.render_status()
    }
}
