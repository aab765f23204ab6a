mod commands;
mod config;
mod output;

use crate::commands::{App, CliError};
use crate::config::Config;
use clap::{Parser, Subcommand, ValueEnum};
use hl_core::render::{ListFilter, SortOrder};
use hl_core::types::{
    ChatId, Decision, JobId, ListingKind, RequestId, RequestKind, RequesterSnapshot, Role,
    TargetId,
};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hl", about = "Hire labourers and contractors from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store the tokens issued by the backend, and optionally the profile
    /// attached to hire requests.
    Login {
        #[arg(long)]
        token: String,
        #[arg(long)]
        refresh: Option<String>,
        #[arg(long, value_enum, default_value_t = RoleArg::User)]
        role: RoleArg,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        city: Option<String>,
    },
    Logout,
    /// Send a hire request to a labourer or contractor.
    Hire {
        /// `labour` or `contractor`.
        kind: RequestKind,
        target: TargetId,
        /// Defaults to the name stored at login.
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        message: Option<String>,
    },
    Apply {
        job: JobId,
        #[arg(long)]
        note: Option<String>,
    },
    /// Show the state of every request you sent.
    Sent { kind: RequestKind },
    Received { kind: RequestKind },
    Respond {
        kind: RequestKind,
        id: RequestId,
        decision: Decision,
    },
    /// Keep polling sent requests and print each refresh.
    Watch { kind: RequestKind },
    Browse {
        #[arg(value_enum)]
        listing: ListingArg,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, value_enum, default_value_t = SortArg::Fetched)]
        sort: SortArg,
    },
    Chats,
    Messages { chat: ChatId },
    Send {
        chat: ChatId,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Print the chat opened for an approved request.
    ChatFor { kind: RequestKind, target: TargetId },
}

#[derive(Clone, Copy, ValueEnum)]
enum ListingArg {
    Labours,
    Contractors,
    Jobs,
}

impl From<ListingArg> for ListingKind {
    fn from(arg: ListingArg) -> Self {
        match arg {
            ListingArg::Labours => Self::Labours,
            ListingArg::Contractors => Self::Contractors,
            ListingArg::Jobs => Self::Jobs,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    User,
    Labour,
    Contractor,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::User => Self::User,
            RoleArg::Labour => Self::Labour,
            RoleArg::Contractor => Self::Contractor,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Fetched,
    Title,
    City,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Fetched => Self::AsFetched,
            SortArg::Title => Self::Title,
            SortArg::City => Self::City,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env("HIRELINE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<(), CliError> {
    let app = App::open(Config::load()?)?;
    match command {
        Command::Login {
            token,
            refresh,
            role,
            name,
            phone,
            city,
        } => {
            let profile = name.map(|name| {
                let snapshot = RequesterSnapshot {
                    name,
                    phone,
                    city,
                    photo_url: None,
                };
                (Role::from(role), snapshot)
            });
            app.login(&token, refresh.as_deref(), profile)
        }
        Command::Logout => app.logout(),
        Command::Hire {
            kind,
            target,
            name,
            phone,
            city,
            message,
        } => {
            let requester = RequesterSnapshot {
                name: name.unwrap_or_default(),
                phone,
                city,
                photo_url: None,
            };
            app.hire(kind, &target, requester, message).await
        }
        Command::Apply { job, note } => app.apply(&job, note).await,
        Command::Sent { kind } => app.sent(kind).await,
        Command::Received { kind } => app.received(kind).await,
        Command::Respond { kind, id, decision } => app.respond(kind, &id, decision).await,
        Command::Watch { kind } => app.watch(kind).await,
        Command::Browse {
            listing,
            city,
            category,
            sort,
        } => {
            let filter = ListFilter {
                city,
                category,
                sort: sort.into(),
            };
            app.browse(listing.into(), &filter).await
        }
        Command::Chats => app.chats().await,
        Command::Messages { chat } => app.messages(&chat).await,
        Command::Send { chat, text } => app.send(&chat, &text.join(" ")).await,
        Command::ChatFor { kind, target } => app.chat_for(kind, &target).await,
    }
}
