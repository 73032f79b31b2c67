//! Module `commands`
//!
//! Defines the FTP commands the control connection understands, their
//! results, and how each maps onto a request classification.

use std::fmt;

use crate::authz::RequestClassification;

/// Represents an FTP command parsed from the client input.
///
/// Commands that require arguments store them as `String` variants.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    User(String),
    Pass(String),
    Quit,
    Noop,
    Syst,
    Type(String),
    Pwd,
    Cwd(String),
    Cdup,
    Retr(String),
    Stor(String),
    Appe(String),
    List(Option<String>),
    Nlst(Option<String>),
    Dele(String),
    Mkd(String),
    Rmd(String),
    Rnfr(String),
    Rnto(String),
    Site(String),
    /// A known verb sent without its required argument.
    MissingArgument(String),
    /// Any verb this server does not recognise.
    Unknown(String),
    /// A blank line.
    Empty,
}

impl Command {
    /// The classification used to authorize this command, or `None` for
    /// session-level commands that touch no file.
    pub fn classification(&self) -> Option<RequestClassification> {
        match self {
            Command::Retr(_) => Some(RequestClassification::Read),
            Command::Stor(_) | Command::Appe(_) => Some(RequestClassification::Write),
            Command::Dele(_) => Some(RequestClassification::Delete),
            Command::Rnfr(_) | Command::Rnto(_) => Some(RequestClassification::Rename),
            Command::Mkd(_) => Some(RequestClassification::CreateDirectory),
            Command::Rmd(_) => Some(RequestClassification::RemoveDirectory),
            Command::List(_) | Command::Nlst(_) => Some(RequestClassification::List),
            Command::Site(_) | Command::Unknown(_) => Some(RequestClassification::Unknown),
            Command::User(_)
            | Command::Pass(_)
            | Command::Quit
            | Command::Noop
            | Command::Syst
            | Command::Type(_)
            | Command::Pwd
            | Command::Cwd(_)
            | Command::Cdup
            | Command::MissingArgument(_)
            | Command::Empty => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::User(u) => write!(f, "USER {}", u),
            Command::Pass(_) => write!(f, "PASS ***"),
            Command::Quit => write!(f, "QUIT"),
            Command::Noop => write!(f, "NOOP"),
            Command::Syst => write!(f, "SYST"),
            Command::Type(t) => write!(f, "TYPE {}", t),
            Command::Pwd => write!(f, "PWD"),
            Command::Cwd(p) => write!(f, "CWD {}", p),
            Command::Cdup => write!(f, "CDUP"),
            Command::Retr(p) => write!(f, "RETR {}", p),
            Command::Stor(p) => write!(f, "STOR {}", p),
            Command::Appe(p) => write!(f, "APPE {}", p),
            Command::List(p) => write!(f, "LIST {}", p.as_deref().unwrap_or("")),
            Command::Nlst(p) => write!(f, "NLST {}", p.as_deref().unwrap_or("")),
            Command::Dele(p) => write!(f, "DELE {}", p),
            Command::Mkd(p) => write!(f, "MKD {}", p),
            Command::Rmd(p) => write!(f, "RMD {}", p),
            Command::Rnfr(p) => write!(f, "RNFR {}", p),
            Command::Rnto(p) => write!(f, "RNTO {}", p),
            Command::Site(a) => write!(f, "SITE {}", a),
            Command::MissingArgument(verb) => write!(f, "{} (missing argument)", verb),
            Command::Unknown(raw) => write!(f, "{}", raw),
            Command::Empty => write!(f, "(empty)"),
        }
    }
}

/// Represents the outcome status of executing a command.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failure(String),
    CloseConnection,
}

/// Struct encapsulating the full result of a command execution.
#[derive(Debug)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: Option<String>,
}

impl CommandResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Success,
            message: Some(message.into()),
        }
    }

    pub fn failure(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Failure(reason.into()),
            message: Some(message.into()),
        }
    }

    pub fn close(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::CloseConnection,
            message: Some(message.into()),
        }
    }
}
