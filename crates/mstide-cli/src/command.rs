//! Shell command parsing.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log in, optionally naming the account.
    Login(Option<String>),
    Logout,
    WhoAmI,
    /// Re-check the session with the backend.
    Verify,
    Go(String),
    Routes,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  login [name]   log in (prompts for the password)
  logout         log out
  whoami         show the current session
  verify         re-check the session with the server
  go <path>      open a page, e.g. go /compound/new
  routes         list the pages
  help           show this help
  quit           exit";

impl Command {
    /// Parse one input line. `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let arg = words.next().map(str::to_string);
        if let Some(extra) = words.next() {
            return Err(format!("Unexpected argument '{}'", extra));
        }

        let command = match (verb.to_lowercase().as_str(), arg) {
            ("login" | "signin", name) => Command::Login(name),
            ("logout" | "signout", None) => Command::Logout,
            ("whoami" | "me", None) => Command::WhoAmI,
            ("verify", None) => Command::Verify,
            ("go" | "open", Some(path)) => Command::Go(path),
            ("go" | "open", None) => return Err("Usage: go <path>".to_string()),
            ("routes", None) => Command::Routes,
            ("help" | "?", None) => Command::Help,
            ("quit" | "exit" | "q", None) => Command::Quit,
            (_, Some(arg)) if Self::is_known(verb) => {
                return Err(format!("'{}' takes no argument (got '{}')", verb, arg))
            }
            _ => return Err(format!("Unknown command '{}', try 'help'", verb)),
        };
        Ok(Some(command))
    }

    fn is_known(verb: &str) -> bool {
        matches!(
            verb.to_lowercase().as_str(),
            "logout" | "signout" | "whoami" | "me" | "verify" | "routes" | "help" | "?" | "quit" | "exit" | "q"
        )
    }
}
