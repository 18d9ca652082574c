//! MSTIDE DB shell - an interactive client for the compound and fragment database.
//!
//! The shell keeps one session for its whole lifetime. It checks the
//! session with the backend on start, then lets the user log in and out
//! and open pages; protected pages go through the navigation guard.

mod command;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mstide_core::router::{Navigation, NavigationGuard, RouteTable, Router};
use mstide_core::{ApiClient, Config, SessionState, SessionStore, User};

use command::{Command, HELP};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn load_config() -> Config {
    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };
    if let Ok(base_url) = std::env::var("MSTIDE_BASE_URL") {
        config.base_url = base_url;
    }
    config
}

fn describe(state: &SessionState) -> String {
    match state.user() {
        Some(user) => format!("logged in as {} (id {})", user.login, user.id),
        None => "not logged in".to_string(),
    }
}

/// The user a login attempt signed in, judged from the state around it.
///
/// A rejected login leaves the state as it was, so an unchanged state
/// is never a success even when someone is logged in.
fn signed_in_user(before: &SessionState, after: &SessionState) -> Option<User> {
    if before == after {
        return None;
    }
    after.user().cloned()
}

/// Print `text` and read one line. `None` at end of input.
fn prompt(text: &str) -> Result<Option<String>> {
    print!("{}", text);
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

struct Shell {
    config: Config,
    store: Arc<SessionStore>,
    router: Router,
}

impl Shell {
    fn new(config: Config) -> Result<Self> {
        let api = ApiClient::from_config(&config)?;
        let store = Arc::new(SessionStore::new(api));

        // Prefill the login form from env vars or config
        if let Some(login) = std::env::var("MSTIDE_LOGIN")
            .ok()
            .or_else(|| config.last_login.clone())
        {
            store.credentials().set_login(login);
        }
        if let Ok(password) = std::env::var("MSTIDE_PASSWORD") {
            store.credentials().set_password(password);
        }

        let router = Router::new(RouteTable::standard(), NavigationGuard::new(Arc::clone(&store)));
        Ok(Self {
            config,
            store,
            router,
        })
    }

    fn prompt_text(&self) -> String {
        let who = self
            .store
            .user()
            .map(|u| u.login)
            .unwrap_or_else(|| "guest".to_string());
        let path = self
            .router
            .current()
            .map(|r| r.path.clone())
            .unwrap_or_else(|| "/".to_string());
        format!("{}@mstide:{}> ", who, path)
    }

    /// Returns `false` once the user asked to quit.
    async fn run_command(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Login(name) => {
                self.login(name).await?;
            }
            Command::Logout => {
                self.store.sign_out().await;
                println!("Logged out.");
            }
            Command::WhoAmI => {
                let state = self.store.state();
                println!("{}", describe(&state));
                if let Some(at) = self.store.last_verified_at() {
                    println!("last checked {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
                }
            }
            Command::Verify => {
                self.store.verify_session().await;
                println!("{}", describe(&self.store.state()));
            }
            Command::Go(path) => self.go(&path).await,
            Command::Routes => {
                for route in self.router.routes().routes() {
                    let lock = if route.requires_auth { " (login required)" } else { "" };
                    println!("  {:<22} {}{}", route.pattern, route.title.unwrap_or(""), lock);
                }
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Returns the newly signed-in user, `None` when the login failed.
    async fn login(&mut self, name: Option<String>) -> Result<Option<User>> {
        // Switching accounts: drop the current session so the outcome is unambiguous
        if let Some(current) = self.store.user() {
            println!("Signing out {} first.", current.login);
            self.store.sign_out().await;
        }

        let credentials = self.store.credentials();
        if let Some(name) = name {
            credentials.set_login(name);
        }
        if credentials.login().is_empty() {
            credentials.set_login(prompt("Login: ")?.unwrap_or_default());
        }
        if credentials.snapshot().password.is_empty() {
            credentials.set_password(rpassword::prompt_password("Password: ")?);
        }

        println!("Signing in...");
        let before = self.store.state();
        self.store.sign_in().await;
        // The password is only kept for the one attempt
        credentials.set_password(String::new());

        let user = signed_in_user(&before, &self.store.state());
        match &user {
            Some(user) => {
                println!("Logged in as {}.", user.login);
                self.config.last_login = Some(user.login.clone());
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
            }
            None => println!("Invalid login or password."),
        }
        Ok(user)
    }

    async fn go(&mut self, path: &str) {
        match self.router.navigate(path).await {
            Navigation::Completed {
                route,
                redirected_from,
            } => {
                if let Some(from) = redirected_from {
                    println!("{} requires login, redirected.", from);
                }
                println!("{}", route.window_title());
            }
            Navigation::Blocked { attempted } => println!("Cannot open {}.", attempted),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("MSTIDE DB shell starting");

    let config = load_config();
    info!(base_url = %config.base_url, "Using backend");
    let mut shell = Shell::new(config)?;

    // Rehydrate whatever session the backend still knows about
    shell.store.verify_session().await;
    shell.go("/").await;
    println!("{}", describe(&shell.store.state()));

    let mut changes = shell.store.subscribe();
    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let state = changes.borrow_and_update().clone();
            info!(session = %describe(&state), "Session changed");
        }
    });

    println!("Type 'help' for commands.");
    loop {
        let Some(line) = prompt(&shell.prompt_text())? else {
            println!();
            break;
        };
        match Command::parse(&line) {
            Ok(Some(command)) => {
                if !shell.run_command(command).await? {
                    break;
                }
            }
            Ok(None) => {}
            Err(message) => println!("{}", message),
        }
    }

    info!("MSTIDE DB shell shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn user(id: i64, login: &str) -> User {
        User { id, login: login.to_string() }
    }

    #[test]
    fn test_signed_in_user_fresh_login() {
        let after = SessionState::LoggedIn(user(3, "bob"));
        assert_eq!(signed_in_user(&SessionState::LoggedOut, &after), Some(user(3, "bob")));
    }

    #[test]
    fn test_signed_in_user_unchanged_session_is_failure() {
        let alice = SessionState::LoggedIn(user(7, "alice"));
        assert_eq!(signed_in_user(&alice, &alice), None);
        assert_eq!(signed_in_user(&SessionState::LoggedOut, &SessionState::LoggedOut), None);
    }

    #[test]
    fn test_signed_in_user_switched_account() {
        let before = SessionState::LoggedIn(user(7, "alice"));
        let after = SessionState::LoggedIn(user(3, "bob"));
        assert_eq!(signed_in_user(&before, &after), Some(user(3, "bob")));
    }

    #[tokio::test]
    async fn test_rejected_login_over_existing_session_is_reported_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user/me"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"loggedIn": true, "id": 7, "login": "alice"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/user/login"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/user/logout"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri(), Duration::from_secs(5)).expect("client should build");
        let store = Arc::new(SessionStore::new(api));
        store.verify_session().await;
        assert!(store.is_logged_in());

        let config = Config {
            last_login: Some("alice".to_string()),
            ..Config::default()
        };
        let router = Router::new(RouteTable::standard(), NavigationGuard::new(Arc::clone(&store)));
        let mut shell = Shell {
            config,
            store: Arc::clone(&store),
            router,
        };
        store.credentials().set_password("wrong");

        let result = shell.login(Some("bob".to_string())).await.expect("no prompt needed");

        assert_eq!(result, None);
        assert_eq!(shell.config.last_login.as_deref(), Some("alice"));
        assert_eq!(store.state(), SessionState::LoggedOut);
        assert!(store.credentials().snapshot().password.is_empty());
    }
}
