//! Command handlers module.
//!
//! Handles login, then authorizes every file operation against the session
//! user's hook before it is allowed to touch the filesystem.

use log::{info, warn};
use std::path::PathBuf;

use crate::client::Session;
use crate::error::StorageError;
use crate::error::handlers::error_reply;
use crate::protocol::responses::*;
use crate::protocol::{Command, CommandResult};
use crate::server::listener::SessionContext;
use crate::storage::filesystem::{
    create_directory, delete_file, remove_directory, rename_path, require_directory,
};
use crate::storage::{confined_real_path, resolve_virtual_path};

/// Dispatches a received FTP command to its corresponding handler.
pub fn handle_command(
    session: &mut Session,
    command: &Command,
    context: &SessionContext,
) -> CommandResult {
    match command {
        Command::User(username) => handle_cmd_user(session, username, context),
        Command::Pass(password) => handle_cmd_pass(session, password, context),
        Command::Quit => handle_cmd_quit(session, context),
        Command::Empty => CommandResult::failure(
            "Empty command",
            format_response(SYNTAX_ERROR, "Syntax error, command unrecognized"),
        ),
        _ => handle_authenticated(session, command),
    }
}

/// Handles every command that needs a logged-in user.
fn handle_authenticated(session: &mut Session, command: &Command) -> CommandResult {
    let Some(user) = session.user().cloned() else {
        return CommandResult::failure(
            "Not logged in",
            format_response(NOT_LOGGED_IN, "Please login with USER and PASS"),
        );
    };

    if let Some(classification) = command.classification() {
        if !user.authorize(classification).is_allowed() {
            info!(
                "Denied {} ({}) for {}",
                classification,
                command,
                user.username()
            );
            return CommandResult::failure(
                "Permission denied",
                format_response(ACTION_NOT_TAKEN, "Permission denied"),
            );
        }
    }

    match command {
        Command::Noop => CommandResult::success(format_response(OK, "NOOP ok")),
        Command::Syst => CommandResult::success(format_response(SYSTEM_TYPE, "UNIX Type: L8")),
        Command::Type(kind) => {
            CommandResult::success(format_response(OK, &format!("Type set to {}", kind)))
        }
        Command::Pwd => handle_cmd_pwd(session),
        Command::Cwd(path) => handle_cmd_cwd(session, path),
        Command::Cdup => handle_cmd_cwd(session, ".."),
        Command::Retr(_)
        | Command::Stor(_)
        | Command::Appe(_)
        | Command::List(_)
        | Command::Nlst(_) => CommandResult::failure(
            "No data connection",
            format_response(CANT_OPEN_DATA, "Can't open data connection"),
        ),
        Command::Dele(path) => handle_cmd_dele(session, path),
        Command::Mkd(path) => handle_cmd_mkd(session, path),
        Command::Rmd(path) => handle_cmd_rmd(session, path),
        Command::Rnfr(path) => handle_cmd_rnfr(session, path),
        Command::Rnto(path) => handle_cmd_rnto(session, path),
        Command::Site(_) => CommandResult::success(format_response(
            NOT_IMPLEMENTED_SUPERFLUOUS,
            "Command not implemented, superfluous at this site",
        )),
        Command::MissingArgument(verb) => CommandResult::failure(
            "Missing argument",
            format_response(SYNTAX_ERROR_ARGS, &format!("{} requires an argument", verb)),
        ),
        Command::Unknown(_) => CommandResult::failure(
            "Unknown command",
            format_response(NOT_IMPLEMENTED, "Command not implemented"),
        ),
        Command::User(_) | Command::Pass(_) | Command::Quit | Command::Empty => CommandResult::failure(
            "Unexpected command",
            format_response(BAD_SEQUENCE, "Bad sequence of commands"),
        ),
    }
}

/// Handles the QUIT command: logs out the client and signals connection close.
fn handle_cmd_quit(session: &mut Session, context: &SessionContext) -> CommandResult {
    end_login(session, context);
    CommandResult::close(format_response(CLOSING, "Goodbye"))
}

/// Handles the USER command. Any existing login is dropped first.
fn handle_cmd_user(session: &mut Session, username: &str, context: &SessionContext) -> CommandResult {
    end_login(session, context);

    if username.contains(['\r', '\n', '\0']) {
        return CommandResult::failure(
            "Malformed username",
            format_response(NOT_LOGGED_IN, "Invalid username"),
        );
    }

    // Any name is accepted here; credentials are checked at PASS.
    session.set_pending_user(Some(username.to_string()));
    CommandResult::success(format_response(PASSWORD_REQUIRED, "Password required"))
}

/// Handles the PASS command: checks credentials and claims a login slot.
fn handle_cmd_pass(session: &mut Session, password: &str, context: &SessionContext) -> CommandResult {
    let Some(username) = session.pending_user().map(str::to_string) else {
        return CommandResult::failure(
            "Username not provided",
            format_response(BAD_SEQUENCE, "Please enter the username first"),
        );
    };

    let Some(user) = context.users().authenticate(&username, password) else {
        session.set_pending_user(None);
        warn!("Failed login for {}", username);
        return CommandResult::failure(
            "Invalid credentials",
            format_response(NOT_LOGGED_IN, "Login incorrect"),
        );
    };

    if !context.try_acquire_login() {
        warn!(
            "Rejected login for {}: {} sessions already active",
            username,
            context.max_logins()
        );
        return CommandResult::close(format_response(
            SERVICE_UNAVAILABLE,
            "Too many users logged in, try again later",
        ));
    }

    info!("User {} logged in", user.username());
    session.login(user);
    CommandResult::success(format_response(LOGIN_SUCCESS, "Login successful"))
}

fn handle_cmd_pwd(session: &Session) -> CommandResult {
    CommandResult::success(format_response(
        PATH_CREATED,
        &format!("\"{}\" is the current directory", session.current_virtual_path()),
    ))
}

fn handle_cmd_cwd(session: &mut Session, target: &str) -> CommandResult {
    let outcome = resolve(session, target).and_then(|(real, virtual_path)| {
        require_directory(&real, &virtual_path)?;
        Ok(virtual_path)
    });

    match outcome {
        Ok(virtual_path) => {
            let message = format!("Directory changed to {}", virtual_path);
            session.set_current_virtual_path(virtual_path);
            CommandResult::success(format_response(FILE_ACTION_OK, &message))
        }
        Err(e) => storage_failure(e),
    }
}

fn handle_cmd_dele(session: &Session, target: &str) -> CommandResult {
    match resolve(session, target).and_then(|(real, v)| delete_file(&real, &v)) {
        Ok(()) => CommandResult::success(format_response(FILE_ACTION_OK, "File deleted")),
        Err(e) => storage_failure(e),
    }
}

fn handle_cmd_mkd(session: &Session, target: &str) -> CommandResult {
    let outcome = resolve(session, target).and_then(|(real, virtual_path)| {
        create_directory(&real, &virtual_path)?;
        Ok(virtual_path)
    });

    match outcome {
        Ok(virtual_path) => CommandResult::success(format_response(
            PATH_CREATED,
            &format!("\"{}\" created", virtual_path),
        )),
        Err(e) => storage_failure(e),
    }
}

fn handle_cmd_rmd(session: &Session, target: &str) -> CommandResult {
    match resolve(session, target).and_then(|(real, v)| remove_directory(&real, &v)) {
        Ok(()) => CommandResult::success(format_response(FILE_ACTION_OK, "Directory removed")),
        Err(e) => storage_failure(e),
    }
}

fn handle_cmd_rnfr(session: &mut Session, target: &str) -> CommandResult {
    match resolve(session, target) {
        Ok((real, virtual_path)) if real.exists() => {
            session.set_rename_from(real, virtual_path);
            CommandResult::success(format_response(PENDING_FURTHER_INFO, "Ready for RNTO"))
        }
        Ok((_, virtual_path)) => storage_failure(StorageError::FileNotFound(virtual_path)),
        Err(e) => storage_failure(e),
    }
}

fn handle_cmd_rnto(session: &mut Session, target: &str) -> CommandResult {
    let Some((from, _)) = session.take_rename_from() else {
        return CommandResult::failure(
            "RNTO without RNFR",
            format_response(BAD_SEQUENCE, "Bad sequence of commands, send RNFR first"),
        );
    };

    match resolve(session, target).and_then(|(real, v)| rename_path(&from, &real, &v)) {
        Ok(()) => CommandResult::success(format_response(FILE_ACTION_OK, "Rename successful")),
        Err(e) => storage_failure(e),
    }
}

/// Resolves `target` to its real path under the user's home and its virtual path.
fn resolve(session: &Session, target: &str) -> Result<(PathBuf, String), StorageError> {
    let user = session
        .user()
        .ok_or_else(|| StorageError::InvalidPath(target.to_string()))?;
    let virtual_path = resolve_virtual_path(session.current_virtual_path(), target)?;
    let real = confined_real_path(user.home_directory(), &virtual_path)?;
    Ok((real, virtual_path))
}

fn storage_failure(err: StorageError) -> CommandResult {
    CommandResult::failure(err.to_string(), error_reply(&err))
}

/// Logs out a logged-in session and returns its slot.
fn end_login(session: &mut Session, context: &SessionContext) {
    if session.is_logged_in() {
        context.release_login();
    }
    session.logout();
}
