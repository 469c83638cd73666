//! User actions and their text syntax.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// One user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replace the upload set with these files.
    Upload(Vec<PathBuf>),
    /// Add files to the upload set.
    Add(Vec<PathBuf>),
    /// Extract metadata; all pending uploads when empty.
    Extract(Vec<String>),
    /// Recommend similar paintings; all extracted uploads without
    /// recommendations when empty.
    Recommend(Vec<String>),
    /// List uploads, or show one in detail.
    Show(Option<String>),
    /// Print the running cost.
    Cost,
    /// Write a PDF report.
    Report {
        path: PathBuf,
        compress: bool,
        title: Option<String>,
    },
    /// Set the OpenAI key; prompt for it when absent.
    Key(Option<String>),
    /// Forget uploads, results and cost.
    Reset,
    /// List the commands.
    Help,
    /// Leave the shell.
    Quit,
}

/// Errors from parsing a command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseActionError {
    /// The line was blank.
    #[error("empty command")]
    Empty,
    /// The command word is unknown.
    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),
    /// A quote was opened but never closed.
    #[error("unbalanced quotes")]
    Unbalanced,
    /// Arguments are missing or surplus.
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Help text listing every command.
pub const HELP: &str = "\
Commands:
  upload <file>...                       replace the uploaded images
  add <file>...                          add images to the upload set
  extract [name]...                      extract metadata (default: all pending)
  recommend [name]...                    suggest similar paintings
                                         (default: all extracted without recommendations)
  show [name]                            list uploads or show one in detail
  cost                                   show the estimated API cost
  report <path> [--compress] [--title <text>]  write a PDF report
  key [api-key]                          set the OpenAI API key
  reset                                  clear uploads, results and cost
  help                                   show this help
  quit                                   leave the shell

Quote names that contain spaces: show \"my painting.png\"";

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        // Shell-style words: quotes keep names with spaces together.
        let words = shlex::split(line).ok_or(ParseActionError::Unbalanced)?;
        let (command, args) = words.split_first().ok_or(ParseActionError::Empty)?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let names = || args.iter().map(|arg| arg.to_string()).collect::<Vec<_>>();
        let paths = || args.iter().map(PathBuf::from).collect::<Vec<_>>();
        let optional = |usage: &'static str| match args.as_slice() {
            [] => Ok(None),
            [arg] => Ok(Some(arg.to_string())),
            _ => Err(ParseActionError::Usage(usage)),
        };
        let bare = |action: Self, usage: &'static str| {
            if args.is_empty() {
                Ok(action)
            } else {
                Err(ParseActionError::Usage(usage))
            }
        };

        let action = match command.to_ascii_lowercase().as_str() {
            "upload" | "load" if !args.is_empty() => Self::Upload(paths()),
            "upload" | "load" => return Err(ParseActionError::Usage("upload <file>...")),
            "add" if !args.is_empty() => Self::Add(paths()),
            "add" => return Err(ParseActionError::Usage("add <file>...")),
            "extract" => Self::Extract(names()),
            "recommend" => Self::Recommend(names()),
            "show" | "ls" => Self::Show(optional("show [name]")?),
            "cost" => bare(Self::Cost, "cost")?,
            "report" => parse_report(&args)?,
            "key" => Self::Key(optional("key [api-key]")?),
            "reset" => bare(Self::Reset, "reset")?,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => bare(Self::Quit, "quit")?,
            other => return Err(ParseActionError::Unknown(other.to_string())),
        };

        Ok(action)
    }
}

fn parse_report(args: &[&str]) -> Result<Action, ParseActionError> {
    const USAGE: &str = "report <path> [--compress] [--title <text>]";

    let mut path = None;
    let mut compress = false;
    let mut title = None;

    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match *arg {
            "--compress" => compress = true,
            "--title" => {
                let words: Vec<&str> = args.by_ref().copied().collect();
                if words.is_empty() {
                    return Err(ParseActionError::Usage(USAGE));
                }
                title = Some(words.join(" "));
            }
            other if path.is_none() => path = Some(PathBuf::from(other)),
            _ => return Err(ParseActionError::Usage(USAGE)),
        }
    }

    Ok(Action::Report {
        path: path.ok_or(ParseActionError::Usage(USAGE))?,
        compress,
        title,
    })
}
