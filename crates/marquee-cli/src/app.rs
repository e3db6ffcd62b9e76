use anyhow::{Context, Result};
use catalog_backend::{FirestoreClient, IdentityClient};
use catalog_config::{Config, PathManager, SessionStore};
use catalog_store::{FileStorage, WatchlistStore};

/// Everything a command needs, built once at startup: configuration, the
/// stored session, the two backend clients, and the on-device watchlist
/// store. Commands receive this by reference instead of reaching for
/// globals.
pub struct App {
    pub config: Config,
    pub session: SessionStore,
    pub auth: IdentityClient,
    pub db: FirestoreClient,
    pub watchlist: WatchlistStore<FileStorage>,
}

impl App {
    pub fn bootstrap() -> Result<Self> {
        let paths = PathManager::default();
        paths.ensure_directories()?;

        let config_file = paths.config_file();
        let config = Config::load_from_file(&config_file).with_context(|| {
            format!(
                "could not load {} (run `marquee init` first)",
                config_file.display()
            )
        })?;
        config.validate()?;

        let mut session = SessionStore::new(paths.session_file());
        session.load()?;

        let auth = IdentityClient::new(config.backend.api_key.clone());
        let mut db =
            FirestoreClient::new(&config.backend.project_id, config.backend.api_key.clone());
        db.set_id_token(session.get_id_token().cloned());

        let watchlist = WatchlistStore::new(FileStorage::new(paths.store_dir())?);

        Ok(Self {
            config,
            session,
            auth,
            db,
            watchlist,
        })
    }

    /// The signed-in user's token, or a hint to sign in.
    pub fn require_id_token(&self) -> Result<&str> {
        self.session
            .get_id_token()
            .map(String::as_str)
            .ok_or_else(|| anyhow::anyhow!("not signed in; run `marquee login` or `marquee guest`"))
    }

    pub fn require_uid(&self) -> Result<&str> {
        self.session
            .get_uid()
            .map(String::as_str)
            .ok_or_else(|| anyhow::anyhow!("not signed in; run `marquee login` or `marquee guest`"))
    }
}
