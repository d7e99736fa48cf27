//! Line-driven interactive front-end over [`App`]

use crate::session::SessionStorage;
use crate::views::App;
use crate::{Error, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const HELP: &str = "\
Commands:
  login <email> <password>     log in
  register <email> <password>  create an account
  toggle                       switch between login and register
  select <address|import_new>  pick a wallet or the import form
  import <private-key>         import a wallet (64 hex characters)
  form                         open the send form
  send <recipient> <amount>    send ether from the selected wallet
  reset                        clear the send form and its result
  logout                       ask to log out
  confirm | cancel             answer the logout prompt
  help                         show this text
  quit                         leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Login { email: String, password: String },
    Register { email: String, password: String },
    Toggle,
    Select(String),
    Import(String),
    Form,
    Send { to: String, amount: String },
    Reset,
    Logout,
    Confirm,
    Cancel,
    Help,
    Quit,
}

impl ShellCommand {
    /// Parse one input line; `Ok(None)` for a blank line
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let usage = |text: &str| Error::Validation(format!("usage: {}", text));
        let command = match (name, args.as_slice()) {
            ("login", [email, password]) => Self::Login {
                email: email.to_string(),
                password: password.to_string(),
            },
            ("login", _) => return Err(usage("login <email> <password>")),
            ("register", [email, password]) => Self::Register {
                email: email.to_string(),
                password: password.to_string(),
            },
            ("register", _) => return Err(usage("register <email> <password>")),
            ("toggle", []) => Self::Toggle,
            ("select", [value]) => Self::Select(value.to_string()),
            ("select", _) => return Err(usage("select <address|import_new>")),
            ("import", [key]) => Self::Import(key.to_string()),
            ("import", _) => return Err(usage("import <private-key>")),
            ("form", []) => Self::Form,
            ("send", [to, amount]) => Self::Send {
                to: to.to_string(),
                amount: amount.to_string(),
            },
            ("send", _) => return Err(usage("send <recipient> <amount>")),
            ("reset", []) => Self::Reset,
            ("logout", []) => Self::Logout,
            ("confirm", []) => Self::Confirm,
            ("cancel", []) => Self::Cancel,
            ("help", _) => Self::Help,
            ("quit" | "exit", _) => Self::Quit,
            _ => {
                return Err(Error::Validation(format!(
                    "unknown command `{}` (try `help`)",
                    line.trim()
                )))
            }
        };
        Ok(Some(command))
    }
}

/// Apply one command; returns `false` once the shell should exit
async fn apply<S: SessionStorage>(app: &mut App<S>, command: ShellCommand) -> Result<bool> {
    match command {
        ShellCommand::Login { email, password } => {
            app.login(&email, &password).await;
        }
        ShellCommand::Register { email, password } => {
            app.register(&email, &password).await;
        }
        ShellCommand::Toggle => app.toggle_auth_mode(),
        ShellCommand::Confirm => {
            let pending = app
                .wallet_mut()
                .map(|view| view.is_logout_pending())
                .unwrap_or(false);
            if pending {
                app.confirm_logout()?;
            }
        }
        ShellCommand::Help | ShellCommand::Quit => {}
        command => {
            let Some(view) = app.wallet_mut() else {
                return Err(Error::Validation("log in first".to_string()));
            };
            match command {
                ShellCommand::Select(value) => view.select(&value).await,
                ShellCommand::Import(key) => view.import(&key).await,
                ShellCommand::Form => view.open_tx_form(),
                ShellCommand::Send { to, amount } => {
                    view.open_tx_form();
                    view.send(&to, &amount).await;
                }
                ShellCommand::Reset => view.reset_form(),
                ShellCommand::Logout => view.request_logout(),
                ShellCommand::Cancel => view.cancel_logout(),
                _ => {}
            }
        }
    }
    Ok(true)
}

/// Read commands from `input` until EOF or `quit`, rendering the active
/// screen to `output` after each one
pub async fn run<S, R, W>(app: &mut App<S>, input: R, mut output: W) -> Result<()>
where
    S: SessionStorage,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(format!("{}\n", app).as_bytes()).await?;
    output.write_all(b"> ").await?;
    output.flush().await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let text = match ShellCommand::parse(&line) {
            Ok(None) => String::new(),
            Ok(Some(ShellCommand::Quit)) => break,
            Ok(Some(ShellCommand::Help)) => format!("{}\n", HELP),
            Ok(Some(command)) => match apply(app, command).await {
                Ok(_) => format!("{}\n", app),
                Err(e) if e.is_transport() => {
                    tracing::error!(error = %e, "Shell command failed");
                    format!("[error] {}\n", e)
                }
                Err(e) => format!("[error] {}\n", e),
            },
            Err(e) => format!("[error] {}\n", e),
        };
        output.write_all(text.as_bytes()).await?;
        output.write_all(b"> ").await?;
        output.flush().await?;
    }
    Ok(())
}
