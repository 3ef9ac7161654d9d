//! Interactive command loop.
//!
//! Each command is a single word. Arguments are asked for on the following
//! lines, or may be given inline after the word (`ae A B`). Two-name
//! commands split inline arguments on whitespace; one-name commands take
//! the rest of the line verbatim so names with spaces still work.
//!
//! The same loop runs scripts: prompts are suppressed and, unless told to
//! keep going, the first failing command aborts the script.

use crate::config::Config;
use crate::session::{Session, SessionError};
use colored::Colorize;
use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

const YES: &str = "yes";

#[derive(Error, Debug)]
pub enum ReplError {
    #[error("Terminal I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Unexpected command '{0}'")]
    UnknownCommand(String),

    #[error("No {0} given")]
    MissingArgument(&'static str),

    #[error("Script failed at line {line}: {source}")]
    Script {
        line: usize,
        #[source]
        source: Box<ReplError>,
    },
}

impl From<nodeq_graph::GraphError> for ReplError {
    fn from(err: nodeq_graph::GraphError) -> Self {
        Self::Session(err.into())
    }
}

/// Shell commands, keyed by the word the user types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Exit,
    Load,
    Create,
    Save,
    All,
    Children,
    Parents,
    CheckEdge,
    AddEdge,
    DeleteEdge,
    AddNode,
    DeleteNode,
    Stats,
    Help,
}

impl Command {
    pub const ALL: [Command; 14] = [
        Command::Exit,
        Command::Load,
        Command::Create,
        Command::Save,
        Command::All,
        Command::Children,
        Command::Parents,
        Command::CheckEdge,
        Command::AddEdge,
        Command::DeleteEdge,
        Command::AddNode,
        Command::DeleteNode,
        Command::Stats,
        Command::Help,
    ];

    pub fn word(self) -> &'static str {
        match self {
            Self::Exit => "exit",
            Self::Load => "load",
            Self::Create => "create",
            Self::Save => "save",
            Self::All => "all",
            Self::Children => "pe",
            Self::Parents => "pp",
            Self::CheckEdge => "ce",
            Self::AddEdge => "ae",
            Self::DeleteEdge => "de",
            Self::AddNode => "an",
            Self::DeleteNode => "dn",
            Self::Stats => "stats",
            Self::Help => "help",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Exit => "exit",
            Self::Load => "load graph from file",
            Self::Create => "create empty graph",
            Self::Save => "save to file",
            Self::All => "print all nodes",
            Self::Children => "print children of node",
            Self::Parents => "print parents of node",
            Self::CheckEdge => "check if edge (<parent>, <child>) exists",
            Self::AddEdge => "add <child> to <parent> node list",
            Self::DeleteEdge => "remove <child> from <parent> node list",
            Self::AddNode => "create new node",
            Self::DeleteNode => "delete node and its edges",
            Self::Stats => "print node and edge counts",
            Self::Help => "print this list",
        }
    }

    /// How many arguments the command reads.
    fn arity(self) -> usize {
        match self {
            Self::Load
            | Self::Save
            | Self::Children
            | Self::Parents
            | Self::AddNode
            | Self::DeleteNode => 1,
            Self::CheckEdge | Self::AddEdge | Self::DeleteEdge => 2,
            _ => 0,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.word())
    }
}

impl FromStr for Command {
    type Err = ReplError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.word() == s)
            .ok_or_else(|| ReplError::UnknownCommand(s.to_string()))
    }
}

/// What the loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

pub struct Repl<R, W> {
    input: R,
    output: W,
    session: Session,
    config: Config,
    interactive: bool,
    continue_on_error: bool,
    /// Number of input lines consumed so far.
    line_no: usize,
    /// Inline arguments not yet consumed by the current command.
    pending: VecDeque<String>,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    pub fn new(input: R, output: W, config: Config) -> Self {
        Self {
            input,
            output,
            session: Session::new(),
            config,
            interactive: true,
            continue_on_error: false,
            line_no: 0,
            pending: VecDeque::new(),
        }
    }

    /// Switches to script mode: no prompts, and failures abort the run
    /// unless `continue_on_error` is set.
    pub fn scripted(mut self, continue_on_error: bool) -> Self {
        self.interactive = false;
        self.continue_on_error = continue_on_error;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Loads a graph before the loop starts.
    pub fn load_initial(&mut self, path: &Path) -> Result<(), ReplError> {
        self.session.load(path)?;
        self.report_loaded()
    }

    /// Prints an error the same way a failing command would.
    pub fn report(&mut self, err: &ReplError) -> io::Result<()> {
        match err {
            ReplError::UnknownCommand(_) if self.interactive => {
                writeln!(self.output, "{}", "Unexpected command.".yellow())?;
                self.print_commands()
            }
            _ => writeln!(self.output, "{} {}", "error:".red().bold(), err),
        }
    }

    /// Reads and executes commands until `exit` or end of input.
    pub fn run(&mut self) -> Result<(), ReplError> {
        if self.interactive {
            writeln!(self.output, "{}", "Graph query shell started.".green())?;
            self.print_commands()?;
        }

        loop {
            if self.interactive {
                write!(self.output, "{}", self.config.prompt.cyan().bold())?;
                self.output.flush()?;
            }

            let Some(raw) = self.read_line()? else {
                break;
            };
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let started_at = self.line_no;
            match self.dispatch(line) {
                Ok(Control::Continue) => {}
                Ok(Control::Exit) => break,
                Err(ReplError::Io(e)) => return Err(ReplError::Io(e)),
                Err(e) => {
                    debug!("Command at line {} failed: {}", started_at, e);
                    if !self.interactive && !self.continue_on_error {
                        return Err(ReplError::Script {
                            line: started_at,
                            source: Box::new(e),
                        });
                    }
                    self.report(&e)?;
                }
            }
        }

        self.output.flush()?;
        Ok(())
    }

    fn dispatch(&mut self, line: &str) -> Result<Control, ReplError> {
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let command: Command = word.parse()?;

        self.pending.clear();
        if !rest.is_empty() {
            if command.arity() == 1 {
                self.pending.push_back(rest.to_string());
            } else {
                self.pending
                    .extend(rest.split_whitespace().map(str::to_string));
            }
        }

        debug!("Dispatching '{}'", command);
        self.execute(command)
    }

    /// Runs a single command, reading its arguments as needed.
    pub fn execute(&mut self, command: Command) -> Result<Control, ReplError> {
        match command {
            Command::Exit => {
                if self.confirm_discard()? {
                    return Ok(Control::Exit);
                }
            }
            Command::Load => {
                if !self.confirm_discard()? {
                    return Ok(Control::Continue);
                }
                let Some(path) = self.ask("Enter filename:")? else {
                    return Ok(Control::Exit);
                };
                if path.is_empty() {
                    return Err(ReplError::MissingArgument("filename"));
                }
                self.session.load(Path::new(&path))?;
                self.report_loaded()?;
            }
            Command::Create => {
                if self.confirm_discard()? {
                    self.session.create();
                    self.say("Empty graph created.".green())?;
                }
            }
            Command::Save => return self.save(),
            Command::All => {
                let names = self.session.graph()?.get_all_nodes();
                self.print_names(&names)?;
            }
            Command::Children | Command::Parents => {
                self.session.graph()?;
                let Some(name) = self.ask("Enter node name:")? else {
                    return Ok(Control::Exit);
                };
                let graph = self.session.graph()?;
                let (title, names) = if command == Command::Children {
                    ("Children are:", graph.get_children(&name)?)
                } else {
                    ("Parents are:", graph.get_parents(&name)?)
                };
                self.say(title)?;
                self.print_names(&names)?;
            }
            Command::CheckEdge => {
                self.session.graph()?;
                let Some((from, to)) = self.ask_pair()? else {
                    return Ok(Control::Exit);
                };
                if self.session.graph()?.is_edge(&from, &to)? {
                    self.say("Edge exists".green())?;
                } else {
                    self.say("No edge".yellow())?;
                }
            }
            Command::AddEdge => {
                self.session.graph()?;
                let Some((from, to)) = self.ask_pair()? else {
                    return Ok(Control::Exit);
                };
                if self.session.add_edge(&from, &to)? {
                    self.say("Success.".green())?;
                } else {
                    self.say("Edge already exists.".yellow())?;
                }
            }
            Command::DeleteEdge => {
                self.session.graph()?;
                let Some((from, to)) = self.ask_pair()? else {
                    return Ok(Control::Exit);
                };
                if self.session.remove_edge(&from, &to)? {
                    self.say("Edge removed.".green())?;
                } else {
                    self.say("No edge.".yellow())?;
                }
            }
            Command::AddNode => {
                self.session.graph()?;
                let Some(name) = self.ask("Enter new node name:")? else {
                    return Ok(Control::Exit);
                };
                self.session.add_node(&name)?;
                self.say("Success.".green())?;
            }
            Command::DeleteNode => {
                self.session.graph()?;
                let Some(name) = self.ask("Enter node name to delete:")? else {
                    return Ok(Control::Exit);
                };
                self.session.remove_node(&name)?;
                self.say("Node removed.".green())?;
            }
            Command::Stats => {
                let stats = self.session.graph()?.stats();
                self.say(format!(
                    "{} nodes, {} edges ({} self-loops)",
                    stats.node_count, stats.edge_count, stats.self_loops
                ))?;
            }
            Command::Help => self.print_commands()?,
        }

        Ok(Control::Continue)
    }

    fn save(&mut self) -> Result<Control, ReplError> {
        self.session.graph()?;

        let source = self.session.source().map(Path::to_path_buf);
        let question = match &source {
            Some(path) => format!("Enter filename (empty for '{}'):", path.display()),
            None => "Enter filename:".to_string(),
        };
        let Some(answer) = self.ask(&question)? else {
            return Ok(Control::Exit);
        };

        let path = match (answer.is_empty(), source) {
            (false, _) => PathBuf::from(answer),
            (true, Some(source)) => source,
            (true, None) => return Err(ReplError::MissingArgument("filename")),
        };

        if self.config.confirm_overwrite
            && path.exists()
            && !self.confirm(
                "File already exists and will be overwritten. Continue ('yes' or 'no')?",
            )?
        {
            self.say("Not saved.".yellow())?;
            return Ok(Control::Continue);
        }

        self.session.save(&path)?;
        let shown = std::fs::canonicalize(&path).unwrap_or(path);
        self.say(format!("{} {}", "Saved to".green(), shown.display()))?;
        Ok(Control::Continue)
    }

    fn report_loaded(&mut self) -> Result<(), ReplError> {
        let stats = self.session.graph()?.stats();
        self.say(format!(
            "{} ({} nodes, {} edges)",
            "Graph is loaded.".green(),
            stats.node_count,
            stats.edge_count
        ))?;
        Ok(())
    }

    /// Asks before dropping unsaved changes. True means go ahead.
    fn confirm_discard(&mut self) -> io::Result<bool> {
        if !self.config.confirm_discard || !self.session.has_unsaved_changes() {
            return Ok(true);
        }
        self.confirm("You have unsaved changes. Are you sure? ('yes' or 'no')")
    }

    /// Asks a yes/no question. End of input counts as "no".
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        self.prompt(question)?;
        Ok(self.read_line()?.is_some_and(|answer| answer.trim() == YES))
    }

    /// Returns the next argument, from the inline queue or from input.
    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        if let Some(arg) = self.pending.pop_front() {
            return Ok(Some(arg));
        }
        self.prompt(question)?;
        self.read_line()
    }

    fn ask_pair(&mut self) -> io::Result<Option<(String, String)>> {
        if self.pending.len() < 2 {
            self.prompt("Enter parent and child node names divided by Enter:")?;
        }
        let parent = match self.pending.pop_front() {
            Some(arg) => arg,
            None => match self.read_line()? {
                Some(line) => line,
                None => return Ok(None),
            },
        };
        let child = match self.pending.pop_front() {
            Some(arg) => arg,
            None => match self.read_line()? {
                Some(line) => line,
                None => return Ok(None),
            },
        };
        Ok(Some((parent, child)))
    }

    /// Reads one line without its terminator, or `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        Ok(Some(buf))
    }

    fn prompt(&mut self, text: &str) -> io::Result<()> {
        if self.interactive {
            writeln!(self.output, "{}", text)?;
            self.output.flush()?;
        }
        Ok(())
    }

    fn say(&mut self, text: impl fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    fn print_names<'a>(&mut self, names: impl IntoIterator<Item = &'a String>) -> io::Result<()> {
        let mut total = 0;
        for name in names {
            writeln!(self.output, "{}", format!("'{}'", name).cyan())?;
            total += 1;
        }
        writeln!(self.output, "{} total.", total)
    }

    fn print_commands(&mut self) -> io::Result<()> {
        writeln!(self.output, "Available commands:")?;
        writeln!(self.output)?;
        for command in Command::ALL {
            writeln!(
                self.output,
                "  {} - {}",
                format!("{:<6}", command.word()).cyan(),
                command.description()
            )?;
        }
        writeln!(self.output)?;
        writeln!(self.output, "Write your command:")
    }
}
