//! Top-level screen switch
//!
//! Owns the session store and decides which screen is active: the auth form
//! while logged out, the wallet view while logged in.

use super::auth::{AuthMode, AuthView};
use super::wallet::WalletView;
use crate::api::WalletApi;
use crate::session::{SessionStorage, SessionStore};
use crate::wallet::{ChainClient, TxJournal};
use crate::Result;
use std::fmt;
use std::sync::Arc;

#[derive(Debug)]
pub enum Screen {
    Auth(AuthView),
    Wallet(WalletView),
}

pub struct App<S: SessionStorage> {
    store: SessionStore<S>,
    api: Arc<dyn WalletApi>,
    chain: Arc<dyn ChainClient>,
    journal: Option<TxJournal>,
    screen: Screen,
}

impl<S: SessionStorage> App<S> {
    /// Restore any persisted session and open the matching screen
    pub async fn start(
        store: SessionStore<S>,
        api: Arc<dyn WalletApi>,
        chain: Arc<dyn ChainClient>,
        journal: Option<TxJournal>,
    ) -> Self {
        let mut app = Self {
            store,
            api,
            chain,
            journal,
            screen: Screen::Auth(AuthView::new()),
        };
        if let Some(token) = app.store.token().map(str::to_owned) {
            app.open_wallet(&token).await;
        }
        app
    }

    async fn open_wallet(&mut self, token: &str) {
        let mut view = WalletView::new(
            self.api.clone(),
            self.chain.clone(),
            token,
            self.journal.clone(),
        );
        view.load().await;
        self.screen = Screen::Wallet(view);
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn is_logged_in(&self) -> bool {
        self.store.is_logged_in()
    }

    /// The wallet view, when logged in
    pub fn wallet_mut(&mut self) -> Option<&mut WalletView> {
        match &mut self.screen {
            Screen::Wallet(view) => Some(view),
            Screen::Auth(_) => None,
        }
    }

    fn auth_mut(&mut self) -> Option<&mut AuthView> {
        match &mut self.screen {
            Screen::Auth(view) => Some(view),
            Screen::Wallet(_) => None,
        }
    }

    /// Submit the login form; on success the session is persisted and the
    /// wallet view loaded. Returns whether the user is now logged in.
    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        let api = self.api.clone();
        let Some(auth) = self.auth_mut() else {
            return true;
        };
        let Some(session) = auth.submit_login(api.as_ref(), email, password).await else {
            return false;
        };

        let token = session.token().to_owned();
        if let Err(e) = self.store.login(session) {
            tracing::error!(error = %e, "Failed to persist session");
            if let Some(auth) = self.auth_mut() {
                auth.login_not_persisted();
            }
            return false;
        }
        if let Some(auth) = self.auth_mut() {
            auth.login_persisted();
        }
        self.open_wallet(&token).await;
        true
    }

    /// Submit the registration form. Returns whether the account was created.
    pub async fn register(&mut self, email: &str, password: &str) -> bool {
        let api = self.api.clone();
        match self.auth_mut() {
            Some(auth) => {
                auth.submit_register(api.as_ref(), email, password).await;
                auth.mode() == AuthMode::Login && auth.error().is_none()
            }
            None => false,
        }
    }

    pub fn toggle_auth_mode(&mut self) {
        if let Some(auth) = self.auth_mut() {
            auth.toggle_mode();
        }
    }

    /// Second step of logout: wipe held secrets, clear the persisted session
    /// and return to the login form
    pub fn confirm_logout(&mut self) -> Result<()> {
        if let Some(view) = self.wallet_mut() {
            view.wipe();
        }
        self.screen = Screen::Auth(AuthView::new());
        self.store.logout()
    }
}

impl<S: SessionStorage> fmt::Display for App<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.screen {
            Screen::Auth(view) => write!(f, "{}", view),
            Screen::Wallet(view) => {
                if let Some(session) = self.store.session() {
                    writeln!(f, "Logged in as {}", session.user().email)?;
                }
                write!(f, "{}", view)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::WalletRecord;
    use crate::session::{
        FileStorage, MemoryStorage, Session, User, UserId, TOKEN_KEY, USER_KEY,
    };
    use crate::Error;
    use crate::views::fakes::{eth, FakeApi, FakeChain, Script, ADDR_A, KEY_A};
    use tokio_test::assert_ok;

    fn alice() -> User {
        User {
            id: UserId::Number(1),
            email: "alice@example.com".to_string(),
        }
    }

    async fn app(
        storage: Arc<MemoryStorage>,
        api: Arc<FakeApi>,
        chain: Arc<FakeChain>,
    ) -> App<Arc<MemoryStorage>> {
        App::start(SessionStore::load(storage), api, chain, None).await
    }

    #[tokio::test]
    async fn starts_on_login_without_session() {
        let storage = Arc::new(MemoryStorage::new());
        let api = Arc::new(FakeApi::default());
        let app = app(storage, api.clone(), Arc::new(FakeChain::default())).await;

        assert!(matches!(app.screen(), Screen::Auth(_)));
        assert!(app.to_string().starts_with("== Login =="));
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn persisted_session_opens_wallet_view() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = SessionStore::load(storage.clone());
        assert_ok!(store.login(Session::new("tok-9", alice())));

        let api = Arc::new(FakeApi::with_wallets(vec![WalletRecord::new(ADDR_A, KEY_A)]));
        let chain = Arc::new(FakeChain::with_balance(ADDR_A, eth(1)));
        let mut app = app(storage, api.clone(), chain).await;

        assert!(app.is_logged_in());
        let view = app.wallet_mut().expect("wallet view");
        assert_eq!(view.wallet_address(), Some(ADDR_A));
        assert_eq!(api.tokens_seen.lock().unwrap().as_slice(), ["tok-9"]);
        assert!(app.to_string().contains("Logged in as alice@example.com"));
    }

    #[tokio::test]
    async fn rejected_login_keeps_storage_empty() {
        let storage = Arc::new(MemoryStorage::new());
        let api = Arc::new(FakeApi::default());
        *api.login.lock().unwrap() = Script::Reply(Err("invalid credentials".to_string()));
        let mut app = app(storage.clone(), api, Arc::new(FakeChain::default())).await;

        let logged_in = app.login("alice@example.com", "wrong").await;

        assert!(!logged_in);
        assert!(matches!(app.screen(), Screen::Auth(_)));
        assert!(app.to_string().contains("[error] invalid credentials"));
        assert_eq!(assert_ok!(storage.get(TOKEN_KEY)), None);
        assert_eq!(assert_ok!(storage.get(USER_KEY)), None);
    }

    #[tokio::test]
    async fn login_persists_session_and_loads_wallets() {
        let storage = Arc::new(MemoryStorage::new());
        let api = Arc::new(FakeApi::default());
        let mut app = app(storage.clone(), api, Arc::new(FakeChain::default())).await;

        assert!(app.login("alice@example.com", "pw").await);

        assert_eq!(assert_ok!(storage.get(TOKEN_KEY)).as_deref(), Some("tok-1"));
        let view = app.wallet_mut().expect("wallet view");
        assert!(view.is_import_mode());
    }

    #[tokio::test]
    async fn register_then_toggle() {
        let storage = Arc::new(MemoryStorage::new());
        let api = Arc::new(FakeApi::default());
        let mut app = app(storage.clone(), api, Arc::new(FakeChain::default())).await;

        app.toggle_auth_mode();
        assert!(app.to_string().starts_with("== Register =="));
        assert!(app.register("bob@example.com", "pw").await);
        assert!(app.to_string().starts_with("== Login =="));
        assert!(!app.is_logged_in());
        assert_eq!(assert_ok!(storage.get(TOKEN_KEY)), None);
    }

    #[tokio::test]
    async fn confirm_logout_clears_everything() {
        let storage = Arc::new(MemoryStorage::new());
        let api = Arc::new(FakeApi::with_wallets(vec![WalletRecord::new(ADDR_A, KEY_A)]));
        let chain = Arc::new(FakeChain::with_balance(ADDR_A, eth(1)));
        let mut app = app(storage.clone(), api, chain).await;
        assert!(app.login("alice@example.com", "pw").await);

        let view = app.wallet_mut().expect("wallet view");
        view.request_logout();
        view.cancel_logout();
        assert!(app.is_logged_in());

        app.wallet_mut().expect("wallet view").request_logout();
        assert_ok!(app.confirm_logout());

        assert!(!app.is_logged_in());
        assert!(app.wallet_mut().is_none());
        assert!(matches!(app.screen(), Screen::Auth(_)));
        assert_eq!(assert_ok!(storage.get(TOKEN_KEY)), None);
        assert_eq!(assert_ok!(storage.get(USER_KEY)), None);
    }

    #[tokio::test]
    async fn corrupt_session_file_does_not_block_login_or_logout() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{garbage").unwrap();

        let api = Arc::new(FakeApi::default());
        let store = SessionStore::load(FileStorage::new(&path));
        let mut app = App::start(store, api, Arc::new(FakeChain::default()), None).await;
        assert!(!app.is_logged_in());

        assert!(app.login("alice@example.com", "pw").await);
        assert_eq!(
            assert_ok!(FileStorage::new(&path).get(TOKEN_KEY)).as_deref(),
            Some("tok-1")
        );

        std::fs::write(&path, "{garbage").unwrap();
        assert_ok!(app.confirm_logout());
        assert!(!app.is_logged_in());
        assert_eq!(assert_ok!(FileStorage::new(&path).get(TOKEN_KEY)), None);
    }

    /// Storage that can be read but never written
    struct ReadOnlyStorage;

    impl SessionStorage for ReadOnlyStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Storage("read-only".to_string()))
        }

        fn clear(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn unpersisted_login_stays_on_auth_screen() {
        let api = Arc::new(FakeApi::default());
        let store = SessionStore::load(ReadOnlyStorage);
        let mut app = App::start(store, api, Arc::new(FakeChain::default()), None).await;

        assert!(!app.login("alice@example.com", "pw").await);

        assert!(!app.is_logged_in());
        let rendered = app.to_string();
        assert!(rendered.contains("[error] Error logging in"));
        assert!(!rendered.contains("Logging you in..."));
        assert!(matches!(app.screen(), Screen::Auth(_)));
    }
}
