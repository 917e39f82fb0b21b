//! Display sinks that receive formatted readings.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossterm::cursor::MoveToColumn;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Where readings end up.
///
/// Both calls are fire-and-forget: a sink that can't deliver drops the
/// update and the sampler carries on.
pub trait DisplaySink: Send + Sync {
    /// Show `text` as the current reading for `target`.
    fn publish(&self, target: &str, text: &str);

    /// Remove whatever is shown for `target`.
    fn clear(&self, target: &str);
}

/// An update delivered through [`Output::Channel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    Published { target: String, text: String },
    Cleared { target: String },
}

/// Latest reading per target, for outputs that redraw everything at once.
#[derive(Debug, Default, Clone)]
pub struct Board {
    readings: Arc<Mutex<BTreeMap<String, String>>>,
}

impl Board {
    fn set(&self, target: &str, text: &str) {
        self.readings
            .lock()
            .insert(target.to_string(), text.to_string());
    }

    fn remove(&self, target: &str) {
        self.readings.lock().remove(target);
    }

    /// All readings on one line, ordered by target.
    pub fn line(&self) -> String {
        self.readings
            .lock()
            .iter()
            .map(|(target, text)| format!("{target}: {text}"))
            .collect::<Vec<_>>()
            .join("  ")
    }

    /// One `target<TAB>text` line per target.
    pub fn lines(&self) -> String {
        self.readings
            .lock()
            .iter()
            .map(|(target, text)| format!("{target}\t{text}\n"))
            .collect()
    }
}

/// Output destination for readings.
///
/// Configure where the sampler should publish readings.
pub enum Output {
    /// Redraw a single status line on stdout.
    Terminal(Board),

    /// Overwrite a text file with one line per target.
    ///
    /// Handy for status bars that read a file.
    File { path: PathBuf, board: Board },

    /// Send readings through a channel.
    ///
    /// Use `Output::channel()` to create this variant and get the receiver.
    Channel(mpsc::Sender<DisplayEvent>),

    /// Any other sink.
    Custom(Arc<dyn DisplaySink>),
}

impl Output {
    /// Create a terminal status line output.
    pub fn terminal() -> Self {
        Output::Terminal(Board::default())
    }

    /// Create a file output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use memwatch_sdk::Output;
    ///
    /// let output = Output::file("/tmp/memwatch.txt");
    /// ```
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Output::File {
            path: path.into(),
            board: Board::default(),
        }
    }

    /// Create a channel output and return both the output and receiver.
    ///
    /// Events are dropped rather than waited on when the channel is full.
    ///
    /// # Example
    ///
    /// ```rust
    /// use memwatch_sdk::Output;
    ///
    /// let (output, mut rx) = Output::channel(16);
    ///
    /// // Later, receive readings
    /// // while let Some(event) = rx.recv().await {
    /// //     println!("{event:?}");
    /// // }
    /// ```
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<DisplayEvent>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Output::Channel(tx), rx)
    }

    /// Wrap a custom sink.
    pub fn custom(sink: impl DisplaySink + 'static) -> Self {
        Output::Custom(Arc::new(sink))
    }

    fn redraw_terminal(board: &Board) {
        if let Err(e) = Self::write_status_line(&mut io::stdout().lock(), board) {
            tracing::debug!("failed to redraw status line: {}", e);
        }
    }

    fn write_status_line(out: &mut impl Write, board: &Board) -> io::Result<()> {
        out.queue(MoveToColumn(0))?
            .queue(Clear(ClearType::CurrentLine))?;
        write!(out, "{}", board.line())?;
        out.flush()
    }

    fn rewrite_file(path: &Path, board: &Board) {
        if let Err(e) = std::fs::write(path, board.lines()) {
            tracing::debug!("failed to write {}: {}", path.display(), e);
        }
    }
}

impl DisplaySink for Output {
    fn publish(&self, target: &str, text: &str) {
        match self {
            Output::Terminal(board) => {
                board.set(target, text);
                Self::redraw_terminal(board);
            }
            Output::File { path, board } => {
                board.set(target, text);
                Self::rewrite_file(path, board);
            }
            Output::Channel(tx) => {
                let _ = tx.try_send(DisplayEvent::Published {
                    target: target.to_string(),
                    text: text.to_string(),
                });
            }
            Output::Custom(sink) => sink.publish(target, text),
        }
    }

    fn clear(&self, target: &str) {
        match self {
            Output::Terminal(board) => {
                board.remove(target);
                Self::redraw_terminal(board);
            }
            Output::File { path, board } => {
                board.remove(target);
                Self::rewrite_file(path, board);
            }
            Output::Channel(tx) => {
                let _ = tx.try_send(DisplayEvent::Cleared {
                    target: target.to_string(),
                });
            }
            Output::Custom(sink) => sink.clear(target),
        }
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Terminal(_) => f.write_str("Terminal"),
            Output::File { path, .. } => f.debug_tuple("File").field(path).finish(),
            Output::Channel(_) => f.write_str("Channel"),
            Output::Custom(_) => f.write_str("Custom"),
        }
    }
}
