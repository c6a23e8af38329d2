use std::str::FromStr;

use clap::Args;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing_futures::Instrument;

use crate::cli::describe;
use crate::config::Application;
use crate::core::identity::AuthFlow;
use crate::Result;

const HELP: &str = "\
commands:
  init                              deliver the first auth state
  sign-in EMAIL PASSWORD            sign in
  register EMAIL PASSWORD [NAME]    create an account and sign in
  sign-out                          sign out
  reset EMAIL                       request a password reset
  refresh                           refresh the id token
  go PATH                           navigate
  whoami                            print the session state
  help                              print this message
  quit                              leave";

/// Simulate a browser session: read commands from stdin and navigate
#[derive(Args, Debug)]
pub struct SessionCommand {
    /// Keep the session unknown until `init` is entered
    #[arg(long)]
    defer_init: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Instruction {
    Init,
    SignIn { email: String, password: String },
    Register { email: String, password: String, display_name: Option<String> },
    SignOut,
    Reset { email: String },
    Refresh,
    Go { path: String },
    WhoAmI,
    Help,
    Quit,
}

impl FromStr for Instruction {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let command = words.first().copied().unwrap_or_default();
        let arg = |i: usize, name: &str| {
            words
                .get(i)
                .map(|word| (*word).to_owned())
                .ok_or_else(|| format!("{}: missing {}", command, name))
        };

        let instruction = match command {
            "init" => Instruction::Init,
            "sign-in" | "login" => Instruction::SignIn {
                email: arg(1, "EMAIL")?,
                password: arg(2, "PASSWORD")?,
            },
            "register" => {
                let name = words.get(3..).unwrap_or_default().join(" ");
                Instruction::Register {
                    email: arg(1, "EMAIL")?,
                    password: arg(2, "PASSWORD")?,
                    display_name: (!name.is_empty()).then_some(name),
                }
            }
            "sign-out" | "logout" => Instruction::SignOut,
            "reset" => Instruction::Reset {
                email: arg(1, "EMAIL")?,
            },
            "refresh" => Instruction::Refresh,
            "go" => Instruction::Go {
                path: arg(1, "PATH")?,
            },
            "whoami" => Instruction::WhoAmI,
            "help" | "?" => Instruction::Help,
            "quit" | "exit" => Instruction::Quit,
            other => return Err(format!("unknown command {}, try help", other)),
        };
        Ok(instruction)
    }
}

impl SessionCommand {
    pub async fn run(self, app: &Application) -> Result<()> {
        let watcher = app
            .session
            .handle()
            .log_changes()
            .instrument(tracing::info_span!("session", app = %app.name));
        tokio::spawn(watcher);

        if !self.defer_init {
            app.identity.initialize();
        }

        let stdin = BufReader::new(tokio::io::stdin());
        run_script(app, stdin, tokio::io::stdout()).await
    }
}

// Execute one instruction per input line until quit or end of input.
async fn run_script<R, W>(app: &Application, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let output = match line.parse::<Instruction>() {
            Ok(Instruction::Quit) => break,
            Ok(instruction) => execute(app, instruction).await,
            Err(usage) => usage,
        };
        writer.write_all(output.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

async fn execute(app: &Application, instruction: Instruction) -> String {
    let identity = &app.identity;
    let result = match instruction {
        Instruction::Init => {
            identity.initialize();
            Ok("identity service initialized".to_owned())
        }
        Instruction::SignIn { email, password } => identity
            .sign_in_with_email_and_password(&email, &password)
            .await
            .map(|principal| format!("signed in as {}", principal)),
        Instruction::Register {
            email,
            password,
            display_name,
        } => identity
            .create_user_with_email_and_password(&email, &password, display_name)
            .await
            .map(|principal| format!("registered {}", principal)),
        Instruction::SignOut => identity.sign_out().await.map(|_| "signed out".to_owned()),
        Instruction::Reset { email } => identity
            .send_password_reset_email(&email)
            .await
            .map(|_| format!("password reset sent to {}", email)),
        Instruction::Refresh => {
            identity.refresh_token();
            Ok("token refreshed".to_owned())
        }
        Instruction::Go { path } => app.navigator.navigate(&path).map(|nav| describe(&nav)),
        Instruction::WhoAmI => Ok(app.navigator.session().current().to_string()),
        Instruction::Help => Ok(HELP.to_owned()),
        Instruction::Quit => Ok(String::new()),
    };

    result.unwrap_or_else(|err| format!("error: {}", err))
}
