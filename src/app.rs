// App state and main event loop.
// Tabs, key dispatch, and the navigation/mutation flows against the server.
//
// Single logical thread: every server call is awaited inline, so its
// continuation runs right here with nothing else interleaved. The pager's
// busy flag is the only mutual exclusion in the system.

use std::io;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::prelude::*;
use tracing::warn;
use url::Url;

use crate::api::types::{AdRequest, EditLinkRequest, NewLinkRequest, ServerConfig};
use crate::api::{ApiClient, ensure_https};
use crate::error::SnipError;
use crate::state::ads::AdFormMode;
use crate::state::expiry::refresh_countdowns;
use crate::state::links::LinkFormMode;
use crate::state::{
    AdForm, AdsTab, Alert, ExpiryScheduler, LinkForm, LinksTab, PAGE_SIZE,
};
use crate::ui;

/// Active tab in the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Links,
    Ads,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Links => "Links",
            Tab::Ads => "Ads",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Tab::Links => Tab::Ads,
            Tab::Ads => Tab::Links,
        }
    }

    pub fn prev(&self) -> Self {
        self.next()
    }
}

/// Password prompt shown until the session is authenticated.
#[derive(Debug, Default)]
pub struct LoginPrompt {
    pub password: String,
    pub error: Option<String>,
}

/// Main application state.
pub struct App {
    pub active_tab: Tab,
    pub links: LinksTab,
    pub ads: AdsTab,
    pub client: ApiClient,
    pub server_config: Option<ServerConfig>,
    /// Public base for rendering full short URLs.
    pub site_url: String,
    pub scheduler: ExpiryScheduler,
    pub login: Option<LoginPrompt>,
    /// Password from the config file, spent on the first login attempt.
    config_password: Option<String>,
    /// A consistency-risking failure; everything stops until a full reload.
    pub fatal: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(client: ApiClient, config_password: Option<String>) -> Self {
        let site_url = client.base_url().as_str().trim_end_matches('/').to_string();
        Self {
            active_tab: Tab::default(),
            links: LinksTab::new(),
            ads: AdsTab::new(),
            client,
            server_config: None,
            site_url,
            scheduler: ExpiryScheduler::new(),
            login: None,
            config_password,
            fatal: None,
            should_quit: false,
        }
    }

    /// Main event loop.
    pub async fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        self.start_session().await;
        while !self.should_quit {
            terminal.draw(|frame| ui::draw(frame, self))?;
            self.arm_scheduler();
            self.handle_events().await?;
            self.drive_expiry();
        }
        Ok(())
    }

    /// Check who we are; load data if the session is already authenticated,
    /// otherwise show the login prompt.
    async fn start_session(&mut self) {
        match self.client.whoami().await {
            Ok(role) if role == "admin" => {
                self.login = None;
                self.load_session().await;
            }
            Ok(_) | Err(SnipError::Unauthorized) => {
                if let Some(password) = self.config_password.take() {
                    match self.client.login(&password).await {
                        Ok(()) => {
                            self.load_session().await;
                            return;
                        }
                        Err(SnipError::Unauthorized) => {
                            self.login = Some(LoginPrompt {
                                password: String::new(),
                                error: Some("Wrong password!".to_string()),
                            });
                            return;
                        }
                        Err(err) => {
                            self.fatal = Some(err.to_string());
                            return;
                        }
                    }
                }
                self.login = Some(LoginPrompt::default());
            }
            Err(err) => self.fatal = Some(err.to_string()),
        }
    }

    async fn load_session(&mut self) {
        match self.client.fetch_config().await {
            Ok(config) => {
                self.site_url = derive_site_url(&config, self.client.base_url());
                self.server_config = Some(config);
            }
            Err(err) => {
                // Degrades to the server address itself as the link base.
                warn!("failed to fetch server config: {err}");
            }
        }
        self.refresh_selectable_ads().await;
        self.reload_active_tab().await;
    }

    /// Throw away the mirror of the active collection and pull a fresh
    /// initial page.
    async fn reload_active_tab(&mut self) {
        let result = match self.active_tab {
            Tab::Links => {
                self.links
                    .pager
                    .load_initial(&mut self.links.cache, &self.client)
                    .await
            }
            Tab::Ads => {
                self.ads
                    .pager
                    .load_initial(&mut self.ads.cache, &self.client)
                    .await
            }
        };
        match result {
            Ok(()) => self.after_data_change(),
            Err(err) => self.fatal = Some(err.to_string()),
        }
    }

    /// Re-clamp the selection and recompute countdown rows after anything
    /// touched the cache or the page cursor.
    fn after_data_change(&mut self) {
        let now = Utc::now();
        match self.active_tab {
            Tab::Links => {
                self.links.reset_selection();
                let visible = self.links.cache.window(self.links.pager.page(), PAGE_SIZE);
                refresh_countdowns(visible, &mut self.links.rows, now);
            }
            Tab::Ads => {
                self.ads.reset_selection();
                let visible = self.ads.cache.window(self.ads.pager.page(), PAGE_SIZE);
                refresh_countdowns(visible, &mut self.ads.rows, now);
            }
        }
    }

    /// Re-arm the countdown refresher whenever the rendered view contains a
    /// countdown that has not run out yet. Once every visible expiry has
    /// passed there is nothing left to update, so the ticks stop.
    fn arm_scheduler(&mut self) {
        let now = Utc::now().timestamp();
        let live = match self.active_tab {
            Tab::Links => self.links.visible().iter().any(|l| l.expiry_time > now),
            Tab::Ads => self.ads.visible().iter().any(|a| a.expiry_time > now),
        };
        if live {
            self.scheduler.arm(Instant::now());
        }
    }

    /// Run the pending countdown tick, chaining the next one only while a
    /// live countdown remains visible.
    fn drive_expiry(&mut self) {
        if !self.scheduler.take_tick(Instant::now()) {
            return;
        }
        let now = Utc::now();
        let any_live = match self.active_tab {
            Tab::Links => {
                let visible = self.links.cache.window(self.links.pager.page(), PAGE_SIZE);
                refresh_countdowns(visible, &mut self.links.rows, now)
            }
            Tab::Ads => {
                let visible = self.ads.cache.window(self.ads.pager.page(), PAGE_SIZE);
                refresh_countdowns(visible, &mut self.ads.rows, now)
            }
        };
        if any_live {
            self.scheduler.arm(Instant::now());
        }
    }

    async fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key).await;
                }
            }
        }
        Ok(())
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        if self.fatal.is_some() {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                KeyCode::Char('r') => {
                    self.fatal = None;
                    self.restart().await;
                }
                _ => {}
            }
            return;
        }
        if self.login.is_some() {
            self.handle_login_key(key).await;
            return;
        }
        match self.active_tab {
            Tab::Links if self.links.form.is_some() => self.handle_link_form_key(key).await,
            Tab::Links if self.links.confirm_delete.is_some() => {
                self.handle_link_confirm_key(key).await
            }
            Tab::Ads if self.ads.form.is_some() => self.handle_ad_form_key(key).await,
            Tab::Ads if self.ads.confirm_delete.is_some() => self.handle_ad_confirm_key(key).await,
            _ => self.handle_browse_key(key).await,
        }
    }

    async fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.switch_tab(self.active_tab.next()).await,
            KeyCode::BackTab => self.switch_tab(self.active_tab.prev()).await,
            KeyCode::Down | KeyCode::Char('j') => match self.active_tab {
                Tab::Links => self.links.select_next(),
                Tab::Ads => self.ads.select_next(),
            },
            KeyCode::Up | KeyCode::Char('k') => match self.active_tab {
                Tab::Links => self.links.select_prev(),
                Tab::Ads => self.ads.select_prev(),
            },
            KeyCode::Right | KeyCode::Char('n') => self.advance_page().await,
            KeyCode::Left | KeyCode::Char('p') => self.retreat_page(),
            KeyCode::Char('r') => self.full_refresh().await,
            KeyCode::Char('c') => self.open_create_form(),
            KeyCode::Char('e') => self.open_edit_form(),
            KeyCode::Char('d') => self.open_delete_confirm(),
            KeyCode::Char('y') => self.copy_short_url(),
            KeyCode::Char('L') => self.logout().await,
            _ => {}
        }
    }

    async fn switch_tab(&mut self, tab: Tab) {
        if tab == self.active_tab {
            return;
        }
        // The mirror only lives while its collection is on screen.
        match self.active_tab {
            Tab::Links => self.links.clear(),
            Tab::Ads => self.ads.clear(),
        }
        self.active_tab = tab;
        self.reload_active_tab().await;
    }

    async fn advance_page(&mut self) {
        let result = match self.active_tab {
            Tab::Links => {
                self.links
                    .pager
                    .advance(&mut self.links.cache, &self.client)
                    .await
            }
            Tab::Ads => {
                self.ads
                    .pager
                    .advance(&mut self.ads.cache, &self.client)
                    .await
            }
        };
        match result {
            Ok(()) => self.after_data_change(),
            Err(err) => self.fatal = Some(err.to_string()),
        }
    }

    fn retreat_page(&mut self) {
        match self.active_tab {
            Tab::Links => self.links.pager.retreat(),
            Tab::Ads => self.ads.pager.retreat(),
        }
        self.after_data_change();
    }

    async fn full_refresh(&mut self) {
        self.refresh_selectable_ads().await;
        self.reload_active_tab().await;
    }

    /// Refresh the selectable ads projection. Failures only degrade labels
    /// to raw ids, so they are logged and otherwise ignored.
    async fn refresh_selectable_ads(&mut self) {
        match self.client.fetch_selectable_ads().await {
            Ok(summaries) => self.links.selectable_ads = summaries,
            Err(err) => warn!("failed to refresh selectable ads: {err}"),
        }
    }

    fn open_create_form(&mut self) {
        match self.active_tab {
            Tab::Links => self.links.form = Some(LinkForm::create()),
            Tab::Ads => self.ads.form = Some(AdForm::create()),
        }
    }

    fn open_edit_form(&mut self) {
        match self.active_tab {
            Tab::Links => {
                let Some(link) = self.links.selected_link() else {
                    return;
                };
                if self.links.controls_locked(link) {
                    return;
                }
                let form = LinkForm::edit(link, &self.links.selectable_ads);
                self.links.form = Some(form);
            }
            Tab::Ads => {
                if let Some(ad) = self.ads.selected_ad() {
                    let form = AdForm::edit(ad);
                    self.ads.form = Some(form);
                }
            }
        }
    }

    fn open_delete_confirm(&mut self) {
        match self.active_tab {
            Tab::Links => {
                let Some(link) = self.links.selected_link() else {
                    return;
                };
                if self.links.controls_locked(link) {
                    return;
                }
                let shortlink = link.shortlink.clone();
                self.links.confirm_delete = Some(shortlink);
            }
            Tab::Ads => {
                if let Some(ad) = self.ads.selected_ad() {
                    let id = ad.id;
                    self.ads.confirm_delete = Some(id);
                }
            }
        }
    }

    /// Surface the full short URL for the selected link. (A terminal cannot
    /// reach the system clipboard portably, so the URL goes into the alert
    /// line for the terminal's own copy mechanism.)
    fn copy_short_url(&mut self) {
        if self.active_tab != Tab::Links {
            return;
        }
        let Some(link) = self.links.selected_link() else {
            return;
        };
        if self.links.controls_locked(link) {
            return;
        }
        let full = format!("{}/{}", self.site_url, link.shortlink);
        self.links.alert = Some(Alert::success(format!("Short URL: {full}")));
    }

    async fn logout(&mut self) {
        if let Err(err) = self.client.logout().await {
            let alert = Alert::error(format!("Logout failed: {err}"));
            match self.active_tab {
                Tab::Links => self.links.alert = Some(alert),
                Tab::Ads => self.ads.alert = Some(alert),
            }
            return;
        }
        self.links.clear();
        self.links.selectable_ads.clear();
        self.ads.clear();
        self.server_config = None;
        self.active_tab = Tab::Links;
        self.login = Some(LoginPrompt::default());
    }

    /// Full reload after a fatal failure: drop everything and start over.
    async fn restart(&mut self) {
        self.links.clear();
        self.links.selectable_ads.clear();
        self.ads.clear();
        self.server_config = None;
        self.active_tab = Tab::Links;
        self.start_session().await;
    }

    async fn handle_login_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.login.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Enter => {
                let password = prompt.password.clone();
                match self.client.login(&password).await {
                    Ok(()) => {
                        self.login = None;
                        self.load_session().await;
                    }
                    Err(SnipError::Unauthorized) => {
                        if let Some(prompt) = self.login.as_mut() {
                            prompt.error = Some("Wrong password!".to_string());
                            prompt.password.clear();
                        }
                    }
                    Err(err) => self.fatal = Some(err.to_string()),
                }
            }
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Backspace => {
                prompt.password.pop();
            }
            KeyCode::Char(c) => prompt.password.push(c),
            _ => {}
        }
    }

    async fn handle_link_form_key(&mut self, key: KeyEvent) {
        let summary_count = self.links.selectable_ads.len();
        match key.code {
            KeyCode::Esc => self.links.form = None,
            KeyCode::Enter => self.submit_link_form().await,
            KeyCode::Tab | KeyCode::Down => {
                if let Some(form) = self.links.form.as_mut() {
                    form.next_field();
                }
            }
            KeyCode::BackTab | KeyCode::Up => {
                if let Some(form) = self.links.form.as_mut() {
                    form.prev_field();
                }
            }
            KeyCode::Left => {
                if let Some(form) = self.links.form.as_mut() {
                    form.cycle(false, summary_count);
                }
            }
            KeyCode::Right | KeyCode::Char(' ') => {
                if let Some(form) = self.links.form.as_mut() {
                    form.cycle(true, summary_count);
                    if key.code == KeyCode::Char(' ') {
                        form.push_char(' ');
                    }
                }
            }
            KeyCode::Backspace => {
                if let Some(form) = self.links.form.as_mut() {
                    form.pop_char();
                }
            }
            KeyCode::Char(c) => {
                if let Some(form) = self.links.form.as_mut() {
                    form.push_char(c);
                }
            }
            _ => {}
        }
    }

    async fn submit_link_form(&mut self) {
        let Some(form) = self.links.form.clone() else {
            return;
        };
        match form.mode {
            LinkFormMode::Create => {
                let payload = NewLinkRequest {
                    shortlink: form.short_code.trim().to_string(),
                    longlink: ensure_https(&form.long_url),
                    expiry_delay: form.expiry_delay(),
                    ad_id: form.ad_id(&self.links.selectable_ads),
                };
                if payload.longlink.is_empty() {
                    self.links.alert = Some(Alert::error("Long URL is required."));
                    return;
                }
                match self.client.create_link(&payload).await {
                    Ok(link) => {
                        let shortlink = link.shortlink.clone();
                        let page = self.links.pager.page();
                        self.links.cache.prepend(link, page, PAGE_SIZE);
                        self.links.pager.reset();
                        self.links.form = None;
                        self.links.list_state.select(Some(0));
                        self.links.alert = Some(Alert::success(format!(
                            "Short URL {}/{} created!",
                            self.site_url, shortlink
                        )));
                        self.after_data_change();
                    }
                    Err(err) => self.on_mutation_error(err),
                }
            }
            LinkFormMode::Edit { ref shortlink } => {
                let payload = EditLinkRequest {
                    shortlink: shortlink.clone(),
                    longlink: ensure_https(&form.long_url),
                    reset_hits: form.reset_hits,
                    ad_id: form.ad_id(&self.links.selectable_ads),
                };
                match self.client.edit_link(&payload).await {
                    Ok(()) => {
                        self.links.cache.update_by_key(shortlink, |link| {
                            link.longlink = payload.longlink.clone();
                            if payload.reset_hits {
                                link.hits = 0;
                            }
                            link.ad_id = payload.ad_id;
                        });
                        self.links.form = None;
                        self.links.alert = Some(Alert::success(format!("Edited {shortlink}.")));
                        self.after_data_change();
                    }
                    Err(err) => self.on_mutation_error(err),
                }
            }
        }
    }

    async fn handle_link_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                let Some(shortlink) = self.links.confirm_delete.take() else {
                    return;
                };
                match self.client.delete_link(&shortlink).await {
                    Ok(()) => {
                        self.links.cache.remove_by_key(&shortlink);
                        self.links.rows.remove(&shortlink);
                        self.links.pager.clamp_after_removal(self.links.cache.len());
                        self.after_data_change();
                    }
                    Err(err) => {
                        self.links.alert = Some(Alert::error(format!(
                            "Unable to delete {shortlink}: {err}"
                        )));
                    }
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => self.links.confirm_delete = None,
            _ => {}
        }
    }

    async fn handle_ad_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.ads.form = None,
            KeyCode::Enter => self.submit_ad_form().await,
            KeyCode::Tab | KeyCode::Down => {
                if let Some(form) = self.ads.form.as_mut() {
                    form.next_field();
                }
            }
            KeyCode::BackTab | KeyCode::Up => {
                if let Some(form) = self.ads.form.as_mut() {
                    form.prev_field();
                }
            }
            KeyCode::Left => {
                if let Some(form) = self.ads.form.as_mut() {
                    form.cycle(false);
                }
            }
            KeyCode::Right => {
                if let Some(form) = self.ads.form.as_mut() {
                    form.cycle(true);
                }
            }
            KeyCode::Backspace => {
                if let Some(form) = self.ads.form.as_mut() {
                    form.pop_char();
                }
            }
            KeyCode::Char(c) => {
                if let Some(form) = self.ads.form.as_mut() {
                    form.push_char(c);
                }
            }
            _ => {}
        }
    }

    async fn submit_ad_form(&mut self) {
        let Some(form) = self.ads.form.clone() else {
            return;
        };
        let payload = AdRequest {
            name: form.name.trim().to_string(),
            image_url: ensure_https(&form.image_url),
            ad_link: ensure_https(&form.ad_link),
            expiry_delay: form.expiry_delay(),
            countdown_seconds: form.countdown_seconds(),
        };
        if payload.name.is_empty() {
            self.ads.alert = Some(Alert::error("Ad name is required."));
            return;
        }
        match form.mode {
            AdFormMode::Create => match self.client.create_ad(&payload).await {
                Ok(ad) => {
                    let page = self.ads.pager.page();
                    self.ads.cache.prepend(ad, page, PAGE_SIZE);
                    self.ads.pager.reset();
                    self.ads.form = None;
                    self.ads.list_state.select(Some(0));
                    self.ads.alert = Some(Alert::success("Ad saved!"));
                    self.after_data_change();
                    self.refresh_selectable_ads().await;
                }
                Err(err) => self.on_ad_mutation_error(err),
            },
            AdFormMode::Edit { id } => match self.client.update_ad(id, &payload).await {
                Ok(updated) => {
                    self.ads.cache.update_by_key(&id, |ad| *ad = updated.clone());
                    self.ads.form = None;
                    self.ads.alert = Some(Alert::success("Ad updated."));
                    self.after_data_change();
                    self.refresh_selectable_ads().await;
                }
                Err(err) => self.on_ad_mutation_error(err),
            },
        }
    }

    async fn handle_ad_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                let Some(id) = self.ads.confirm_delete.take() else {
                    return;
                };
                match self.client.delete_ad(id).await {
                    Ok(()) => {
                        self.ads.cache.remove_by_key(&id);
                        self.ads.rows.remove(&id);
                        self.ads.pager.clamp_after_removal(self.ads.cache.len());
                        self.after_data_change();
                        self.refresh_selectable_ads().await;
                    }
                    Err(err) => {
                        self.ads.alert =
                            Some(Alert::error(format!("Unable to delete ad #{id}: {err}")));
                    }
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => self.ads.confirm_delete = None,
            _ => {}
        }
    }

    /// Create/edit/delete failures leave the cache untouched and show the
    /// server's message; an expired session reopens the login prompt.
    fn on_mutation_error(&mut self, err: SnipError) {
        match err {
            SnipError::Unauthorized => self.login = Some(LoginPrompt::default()),
            SnipError::Rejected(text) => self.links.alert = Some(Alert::error(text)),
            other => self.links.alert = Some(Alert::error(other.to_string())),
        }
    }

    fn on_ad_mutation_error(&mut self, err: SnipError) {
        match err {
            SnipError::Unauthorized => self.login = Some(LoginPrompt::default()),
            SnipError::Rejected(text) => self.ads.alert = Some(Alert::error(text)),
            other => self.ads.alert = Some(Alert::error(other.to_string())),
        }
    }
}

/// Public base URL for short links: the server's advertised site URL when
/// set, the server address itself otherwise.
fn derive_site_url(config: &ServerConfig, base: &Url) -> String {
    match &config.site_url {
        Some(raw) => {
            let cleaned = raw.trim_matches('"').trim_end_matches('/');
            ensure_https(cleaned)
        }
        None => base.as_str().trim_end_matches('/').to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::Links.next(), Tab::Ads);
        assert_eq!(Tab::Ads.next(), Tab::Links);
        assert_eq!(Tab::Links.prev(), Tab::Ads);
    }

    #[test]
    fn test_derive_site_url() {
        let base = Url::parse("https://sn.ip/").unwrap();
        let config = ServerConfig {
            version: "6.2.0".into(),
            site_url: Some("\"https://s.example.com/\"".into()),
            allow_capital_letters: false,
        };
        assert_eq!(derive_site_url(&config, &base), "https://s.example.com");

        let config = ServerConfig {
            version: "6.2.0".into(),
            site_url: Some("s.example.com".into()),
            allow_capital_letters: false,
        };
        assert_eq!(derive_site_url(&config, &base), "https://s.example.com");

        let config = ServerConfig {
            version: "6.2.0".into(),
            site_url: None,
            allow_capital_letters: false,
        };
        assert_eq!(derive_site_url(&config, &base), "https://sn.ip");
    }
}
