use crate::config::{Config, ConfigError};
use crate::output;
use hl_client::{HttpApi, HttpConfig};
use hl_core::chat::find_chat_for_request;
use hl_core::directory::{Fetched, ListingSource};
use hl_core::poller::PollOutcome;
use hl_core::render::{ListFilter, render_list};
use hl_core::submitter::{SubmitOutcome, SubmitPayload};
use hl_core::types::{
    ApplyInput, ChatId, Decision, JobId, Listing, ListingKind, RequestId, RequestKind,
    RequesterSnapshot, Role, TargetId, UiStateMap,
};
use hl_core::{
    ApiError, CacheError, ChatService, CoreError, Directory, RequestSubmitter, Responder,
    SessionCache, StatusPoller, UiStateStore,
};
use hl_db::SqliteKvStore;
use hl_events::{AppEvent, EventBus};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("local cache: {0}")]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("not signed in, run `hl login` first")]
    NoSession,
    #[error("no requester name given and no profile stored, pass --name or sign in with one")]
    NoProfile,
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Roles that send hire requests, in lookup order.
const REQUESTER_ROLES: [Role; 2] = [Role::User, Role::Contractor];

/// Services shared by every subcommand.
pub struct App {
    config: Config,
    bus: EventBus,
    cache: SessionCache,
    api: Arc<HttpApi>,
}

impl App {
    pub fn open(config: Config) -> Result<Self, CliError> {
        let bus = EventBus::new(1024);
        let store = SqliteKvStore::open(&config.db_path)?;
        let cache = SessionCache::new(Arc::new(store)).with_bus(bus.clone());
        let http = HttpConfig {
            base_url: config.api_url.clone(),
            timeout: config.timeout(),
        };
        let api = Arc::new(HttpApi::new(&http, cache.clone(), bus.clone())?);
        debug!(api_url = %config.api_url, db_path = %config.db_path, "services ready");
        Ok(Self {
            config,
            bus,
            cache,
            api,
        })
    }

    fn require_session(&self) -> Result<(), CliError> {
        if self.cache.has_session() {
            Ok(())
        } else {
            Err(CliError::NoSession)
        }
    }

    fn poller(&self, kind: RequestKind) -> StatusPoller<HttpApi> {
        StatusPoller::new(Arc::clone(&self.api), kind, UiStateStore::new(), self.bus.clone())
            .with_cache(self.cache.clone())
            .with_interval(self.config.poll_interval())
    }

    pub fn login(
        &self,
        token: &str,
        refresh: Option<&str>,
        profile: Option<(Role, RequesterSnapshot)>,
    ) -> Result<(), CliError> {
        self.cache.set_tokens(token.trim(), refresh.map(str::trim))?;
        if let Some((role, profile)) = profile {
            self.cache.set_profile(role, &profile)?;
        }
        info!("session stored");
        println!("Signed in");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), CliError> {
        self.cache.clear_session()?;
        println!("Signed out");
        Ok(())
    }

    pub async fn hire(
        &self,
        kind: RequestKind,
        target: &TargetId,
        requester: RequesterSnapshot,
        message: Option<String>,
    ) -> Result<(), CliError> {
        self.require_session()?;
        let requester = self.resolve_requester(requester)?;
        let payload = SubmitPayload::Hire { requester, message };
        self.submit(kind, target, payload).await
    }

    /// Completes a requester snapshot from the profile stored at login when
    /// no name was given.
    fn resolve_requester(&self, given: RequesterSnapshot) -> Result<RequesterSnapshot, CliError> {
        if !given.name.trim().is_empty() {
            return Ok(given);
        }
        for role in REQUESTER_ROLES {
            if let Some(stored) = self.cache.profile::<RequesterSnapshot>(role)? {
                return Ok(RequesterSnapshot {
                    name: stored.name,
                    phone: given.phone.or(stored.phone),
                    city: given.city.or(stored.city),
                    photo_url: stored.photo_url,
                });
            }
        }
        Err(CliError::NoProfile)
    }

    pub async fn apply(&self, job: &JobId, note: Option<String>) -> Result<(), CliError> {
        self.require_session()?;
        let payload = SubmitPayload::Application(ApplyInput { cover_note: note });
        let target = TargetId::from(job.clone());
        self.submit(RequestKind::JobApplication, &target, payload).await
    }

    async fn submit(
        &self,
        kind: RequestKind,
        target: &TargetId,
        payload: SubmitPayload,
    ) -> Result<(), CliError> {
        let store = UiStateStore::new();
        let submitter =
            RequestSubmitter::new(Arc::clone(&self.api), kind, store.clone(), self.bus.clone())
                .with_cache(self.cache.clone());
        match submitter.submit(target, payload).await? {
            SubmitOutcome::Submitted(_) => {
                println!(
                    "{target}: {}",
                    output::state_label(store.get(target.as_str()).map(|entry| entry.state))
                );
            }
            SubmitOutcome::Duplicate { message } => {
                println!("{target}: already requested ({message})");
            }
        }
        Ok(())
    }

    /// One poll of the sent requests; falls back to the cached mirror when
    /// the backend cannot be reached.
    async fn current_states(&self, kind: RequestKind) -> UiStateMap {
        let poller = self.poller(kind);
        poller.restore_from_mirror();
        if self.cache.has_session() {
            poller.poll_once().await;
        }
        poller.store().snapshot()
    }

    pub async fn sent(&self, kind: RequestKind) -> Result<(), CliError> {
        self.require_session()?;
        let poller = self.poller(kind);
        if let PollOutcome::Failed { error, .. } = poller.poll_once().await {
            if !poller.restore_from_mirror() {
                return Err(error.into());
            }
            eprintln!("backend unreachable ({error}), showing cached states");
        }
        print!("{}", output::format_states(&poller.store().snapshot()));
        Ok(())
    }

    pub async fn received(&self, kind: RequestKind) -> Result<(), CliError> {
        self.require_session()?;
        let responder = Responder::new(Arc::clone(&self.api), self.bus.clone());
        let records = responder.received(kind).await?;
        print!("{}", output::format_records(&records));
        Ok(())
    }

    pub async fn respond(
        &self,
        kind: RequestKind,
        id: &RequestId,
        decision: Decision,
    ) -> Result<(), CliError> {
        self.require_session()?;
        let responder = Responder::new(Arc::clone(&self.api), self.bus.clone());
        let record = responder.respond(kind, id, decision).await?;
        println!("{id}: {}", record.status.as_str());
        Ok(())
    }

    /// Runs the poller until Ctrl-C, printing the states after every applied
    /// poll.
    pub async fn watch(&self, kind: RequestKind) -> Result<(), CliError> {
        self.require_session()?;
        let poller = self.poller(kind);
        let store = poller.store().clone();
        if poller.restore_from_mirror() {
            print!("{}", output::format_states(&store.snapshot()));
        }
        let mut events = self.bus.subscribe();
        let handle = poller.spawn();
        let topic = kind.topic();
        let mut result = Ok(());

        loop {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => {
                    if let Err(err) = signal {
                        result = Err(err.into());
                    }
                    break;
                }
                received = events.recv() => match received {
                    Ok(record) => match record.body {
                        AppEvent::StatesRefreshed { topic: refreshed, .. } if refreshed == topic => {
                            println!("-- {}", record.at.format("%H:%M:%S"));
                            print!("{}", output::format_states(&store.snapshot()));
                        }
                        AppEvent::SessionExpired => {
                            result = Err(CliError::NoSession);
                            break;
                        }
                        _ => {}
                    },
                    Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                },
            }
        }
        handle.stop().await;
        result
    }

    pub async fn browse(&self, kind: ListingKind, filter: &ListFilter) -> Result<(), CliError> {
        let directory = Directory::new(Arc::clone(&self.api), self.cache.clone());
        let states = self.current_states(kind.request_kind()).await;
        match kind {
            ListingKind::Labours => print_listing(kind, &directory.labours().await, &states, filter),
            ListingKind::Contractors => {
                print_listing(kind, &directory.contractors().await, &states, filter);
            }
            ListingKind::Jobs => print_listing(kind, &directory.jobs().await, &states, filter),
        }
        Ok(())
    }

    pub async fn chats(&self) -> Result<(), CliError> {
        self.require_session()?;
        let chats = ChatService::new(Arc::clone(&self.api)).chats().await?;
        print!("{}", output::format_chats(&chats));
        Ok(())
    }

    pub async fn messages(&self, chat_id: &ChatId) -> Result<(), CliError> {
        self.require_session()?;
        let messages = ChatService::new(Arc::clone(&self.api))
            .messages(chat_id)
            .await?;
        print!("{}", output::format_messages(&messages));
        Ok(())
    }

    pub async fn send(&self, chat_id: &ChatId, text: &str) -> Result<(), CliError> {
        self.require_session()?;
        let sent = ChatService::new(Arc::clone(&self.api))
            .send(chat_id, text)
            .await?;
        print!("{}", output::format_messages(std::slice::from_ref(&sent)));
        Ok(())
    }

    /// Prints the chat that belongs to an approved request for `target`.
    pub async fn chat_for(&self, kind: RequestKind, target: &TargetId) -> Result<(), CliError> {
        self.require_session()?;
        let states = self.current_states(kind).await;
        let Some(entry) = states.get(target.as_str()) else {
            println!("No request for {target}");
            return Ok(());
        };
        let chats = ChatService::new(Arc::clone(&self.api)).chats().await?;
        match find_chat_for_request(&chats, entry, Some(target.as_str())) {
            Some(chat) => println!("{}", chat.id),
            None => println!(
                "{target}: {} (no chat yet)",
                output::state_label(Some(entry.state))
            ),
        }
        Ok(())
    }
}

fn print_listing<L: Listing>(
    kind: ListingKind,
    fetched: &Fetched<L>,
    states: &UiStateMap,
    filter: &ListFilter,
) {
    if fetched.source == ListingSource::Cached {
        eprintln!("showing cached {}", kind.noun());
    }
    print!(
        "{}",
        output::format_cards(&render_list(kind, &fetched.items, states, filter))
    );
}
