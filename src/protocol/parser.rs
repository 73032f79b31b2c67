use crate::protocol::commands::Command;

/// Parses a raw command line received from a client into the `Command` enum.
///
/// Known verbs missing a required argument become `MissingArgument`.
pub fn parse_command(raw: &str) -> Command {
    let trimmed = raw.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("").to_ascii_uppercase();
    let arg = parts.next().unwrap_or("").trim();

    let required = |build: fn(String) -> Command| {
        if arg.is_empty() {
            Command::MissingArgument(cmd.clone())
        } else {
            build(arg.to_string())
        }
    };
    let optional = (!arg.is_empty()).then(|| arg.to_string());

    if cmd.is_empty() {
        return Command::Empty;
    }

    match cmd.as_str() {
        "USER" => required(Command::User),
        "PASS" => Command::Pass(arg.to_string()),
        "QUIT" => Command::Quit,
        "NOOP" => Command::Noop,
        "SYST" => Command::Syst,
        "TYPE" => required(Command::Type),
        "PWD" | "XPWD" => Command::Pwd,
        "CWD" | "XCWD" => required(Command::Cwd),
        "CDUP" | "XCUP" => Command::Cdup,
        "RETR" => required(Command::Retr),
        "STOR" => required(Command::Stor),
        "APPE" => required(Command::Appe),
        "LIST" => Command::List(optional),
        "NLST" => Command::Nlst(optional),
        "DELE" => required(Command::Dele),
        "MKD" | "XMKD" => required(Command::Mkd),
        "RMD" | "XRMD" => required(Command::Rmd),
        "RNFR" => required(Command::Rnfr),
        "RNTO" => required(Command::Rnto),
        "SITE" => required(Command::Site),
        _ => Command::Unknown(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(parse_command("QUIT\r\n"), Command::Quit);
        assert_eq!(parse_command("noop"), Command::Noop);
        assert_eq!(parse_command("PWD"), Command::Pwd);
        assert_eq!(parse_command("XPWD"), Command::Pwd);
        assert_eq!(parse_command("LIST"), Command::List(None));
    }

    #[test]
    fn test_parse_commands_with_args() {
        assert_eq!(parse_command("USER alice\r\n"), Command::User("alice".into()));
        assert_eq!(parse_command("PASS  two words "), Command::Pass("two words".into()));
        assert_eq!(parse_command("cwd /some/path"), Command::Cwd("/some/path".into()));
        assert_eq!(parse_command("MKD new dir"), Command::Mkd("new dir".into()));
        assert_eq!(parse_command("LIST -la"), Command::List(Some("-la".into())));
        assert_eq!(parse_command("SITE CHMOD 755 x"), Command::Site("CHMOD 755 x".into()));
    }

    #[test]
    fn test_parse_missing_arguments() {
        assert_eq!(parse_command("DELE"), Command::MissingArgument("DELE".into()));
        assert_eq!(parse_command("cwd  "), Command::MissingArgument("CWD".into()));
        assert_eq!(parse_command("PASS"), Command::Pass(String::new()));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse_command("MFMT 20240101 a.txt"), Command::Unknown("MFMT 20240101 a.txt".into()));
    }

    #[test]
    fn test_parse_blank_line() {
        assert_eq!(parse_command(""), Command::Empty);
        assert_eq!(parse_command("   \r\n"), Command::Empty);
    }
}
