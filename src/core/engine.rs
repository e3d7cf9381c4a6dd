//! Per-user conversation engine.
//!
//! Routes inbound text, commands, and button presses through the session
//! state machine, validating every currency against the live rate table
//! and producing localized replies. The only suspension points are the
//! rate cache refresh and the preference store; everything else is
//! pattern matching and map lookups.

use std::sync::Arc;

use tracing::warn;

use crate::domain::{
    AlertId, Comparator, CurrencyCode, HistoryEntry, Language, Theme, UserId, UserProfile,
};
use crate::port::{CallbackData, InlineButton, InlineSuggestion, Keyboard, PreferenceStore, Reply};

use super::cache::RateCache;
use super::command::{parse_command, Command};
use super::expr;
use super::inline;
use super::session::{SessionMap, SessionState};
use super::text::{self, MenuAction};

/// Favorites used when the store cannot be reached; conversions must
/// keep working through storage degradation.
const FALLBACK_FAVORITES: [&str; 3] = ["USD", "EUR", "RUB"];

/// Engine tuning knobs, derived from configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum favorite buttons on the target-currency keyboard.
    pub target_keyboard_limit: usize,
    /// Currencies listed by the rates overview and inline fan-out.
    pub showcase: Vec<CurrencyCode>,
}

/// The per-user conversational state machine.
pub struct ConversationEngine {
    cache: Arc<RateCache>,
    store: Arc<dyn PreferenceStore>,
    sessions: SessionMap,
    config: EngineConfig,
}

impl ConversationEngine {
    #[must_use]
    pub fn new(
        cache: Arc<RateCache>,
        store: Arc<dyn PreferenceStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            cache,
            store,
            sessions: SessionMap::new(),
            config,
        }
    }

    /// Handle an inbound free-text or menu-button message.
    pub async fn handle_text(&self, user: UserId, text_in: &str) -> Reply {
        let input = text_in.trim();
        let profile = self.profile_or_default(user).await;
        let lang = profile.language;

        if input.starts_with('/') {
            return match parse_command(input) {
                Ok(command) => self.dispatch_command(user, &profile, command).await,
                Err(e) => Reply::text(text::bad_command(lang, &e.to_string())),
            };
        }

        if let Some(action) = text::match_menu(input) {
            return match action {
                MenuAction::Convert => self.start_conversion(user, lang),
                MenuAction::Rates => self.rates_overview(lang).await,
                MenuAction::Help => Reply::text(text::help(lang)),
            };
        }

        if text::is_cancel(input) {
            self.sessions.clear(user);
            return self.main_menu(lang);
        }

        match self.sessions.state(user) {
            SessionState::Idle => self.on_idle_text(user, &profile, input).await,
            SessionState::AwaitingAmount => self.on_amount(user, &profile, input).await,
            SessionState::AwaitingTargetCurrency { amount, from } => {
                self.on_target(user, &profile, input, amount, from).await
            }
            SessionState::AwaitingFavoriteSource => {
                self.on_favorite_source(user, &profile, input).await
            }
            SessionState::AwaitingFavoriteTarget { from } => {
                self.on_favorite_target(user, &profile, input, from).await
            }
            SessionState::AwaitingFavoriteAmount { from, to } => {
                self.on_favorite_amount(user, &profile, input, from, to).await
            }
            SessionState::AwaitingCalcExpression => self.on_calc(user, &profile, input).await,
            SessionState::AwaitingAlertCondition => {
                self.on_alert_condition(user, &profile, input).await
            }
        }
    }

    /// Handle an inline button press.
    pub async fn handle_callback(&self, user: UserId, data: CallbackData) -> Reply {
        let profile = self.profile_or_default(user).await;
        let lang = profile.language;

        match data {
            CallbackData::ConvertAgain => self.start_conversion(user, lang),
            CallbackData::Swap { amount, from, to } => {
                self.refresh_if_stale().await;
                match self.cache.convert(amount, &to, &from) {
                    Ok(result) => self.conversion_reply(lang, amount, &to, result, &from),
                    Err(e) => {
                        warn!(user_id = user.0, error = %e, "swap conversion failed");
                        Reply::text(text::rates_unavailable(lang))
                    }
                }
            }
        }
    }

    /// Handle an inline query and return suggestion cards.
    pub async fn handle_inline(&self, query: &str) -> Vec<InlineSuggestion> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        self.refresh_if_stale().await;
        inline::answer(
            query,
            &self.cache.table(),
            self.cache.base(),
            &self.config.showcase,
        )
    }

    async fn dispatch_command(
        &self,
        user: UserId,
        profile: &UserProfile,
        command: Command,
    ) -> Reply {
        let lang = profile.language;
        // A command always abandons whatever dialogue was in progress.
        self.sessions.clear(user);
        match command {
            Command::Start => {
                self.refresh_if_stale().await;
                self.main_menu(lang)
            }
            Command::Help => Reply::text(text::help(lang)),
            Command::Rates => self.rates_overview(lang).await,
            Command::Convert => self.start_conversion(user, lang),
            Command::Favorite => self.start_favorite_flow(user, profile).await,
            Command::Calc => {
                self.sessions
                    .transition(user, SessionState::AwaitingCalcExpression);
                Reply::text(text::ask_calc(lang))
            }
            Command::Alert { args } => {
                if args.is_empty() {
                    self.sessions
                        .transition(user, SessionState::AwaitingAlertCondition);
                    Reply::text(text::ask_alert(lang))
                } else {
                    self.create_alert(user, lang, &args.join(" ")).await
                }
            }
            Command::Alerts => self.list_alerts(user, lang).await,
            Command::Unalert { id } => self.delete_alert(user, lang, AlertId(id)).await,
            Command::History => self.show_history(user, lang).await,
            Command::Favorites => Reply::text(text::favorites_list(lang, &profile.favorites)),
            Command::SetFav { codes } => self.set_favorites(user, lang, &codes).await,
            Command::Lang => self.toggle_language(user, lang).await,
        }
    }

    // --- Direct conversion flow ---

    fn start_conversion(&self, user: UserId, lang: Language) -> Reply {
        // Entering AwaitingAmount discards any prior partial request.
        self.sessions.transition(user, SessionState::AwaitingAmount);
        Reply::text(text::ask_amount(lang))
    }

    async fn on_idle_text(&self, user: UserId, profile: &UserProfile, input: &str) -> Reply {
        // `100 USD` while idle jumps straight to target selection.
        if parse_amount_currency(input).is_some() {
            return self.on_amount(user, profile, input).await;
        }
        Reply::text(text::unknown_text_hint(profile.language))
    }

    async fn on_amount(&self, user: UserId, profile: &UserProfile, input: &str) -> Reply {
        let lang = profile.language;
        let Some((amount, from)) = parse_amount_currency(input) else {
            return Reply::text(text::bad_amount_format(lang));
        };
        self.refresh_if_stale().await;
        if !self.cache.contains(&from) {
            return Reply::text(text::unknown_currency(lang, &from));
        }

        let targets = self.target_candidates(profile, &from);
        self.sessions.transition(
            user,
            SessionState::AwaitingTargetCurrency {
                amount,
                from: from.clone(),
            },
        );
        Reply::with_keyboard(
            text::choose_target(lang, amount, &from),
            options_keyboard(targets, lang),
        )
    }

    async fn on_target(
        &self,
        user: UserId,
        profile: &UserProfile,
        input: &str,
        amount: f64,
        from: CurrencyCode,
    ) -> Reply {
        let lang = profile.language;
        let Some(to) = CurrencyCode::parse(input) else {
            return Reply::text(text::unknown_currency_input(lang, input));
        };
        if !self.cache.contains(&to) {
            return Reply::text(text::unknown_currency(lang, &to));
        }
        self.complete_conversion(user, lang, amount, from, to).await
    }

    // --- Favorite-driven flow ---

    async fn start_favorite_flow(&self, user: UserId, profile: &UserProfile) -> Reply {
        self.refresh_if_stale().await;
        self.sessions
            .transition(user, SessionState::AwaitingFavoriteSource);
        Reply::with_keyboard(
            text::ask_favorite_source(profile.language),
            options_keyboard(profile.favorites.clone(), profile.language),
        )
    }

    async fn on_favorite_source(
        &self,
        user: UserId,
        profile: &UserProfile,
        input: &str,
    ) -> Reply {
        let lang = profile.language;
        let Some(from) = CurrencyCode::parse(input) else {
            return Reply::text(text::unknown_currency_input(lang, input));
        };
        if !self.cache.contains(&from) {
            return Reply::text(text::unknown_currency(lang, &from));
        }

        let targets: Vec<CurrencyCode> = profile
            .favorites
            .iter()
            .filter(|c| **c != from)
            .cloned()
            .collect();
        self.sessions.transition(
            user,
            SessionState::AwaitingFavoriteTarget { from: from.clone() },
        );
        Reply::with_keyboard(
            text::ask_favorite_target(lang, &from),
            options_keyboard(targets, lang),
        )
    }

    async fn on_favorite_target(
        &self,
        user: UserId,
        profile: &UserProfile,
        input: &str,
        from: CurrencyCode,
    ) -> Reply {
        let lang = profile.language;
        let Some(to) = CurrencyCode::parse(input) else {
            return Reply::text(text::unknown_currency_input(lang, input));
        };
        if !self.cache.contains(&to) {
            return Reply::text(text::unknown_currency(lang, &to));
        }
        self.sessions.transition(
            user,
            SessionState::AwaitingFavoriteAmount {
                from: from.clone(),
                to: to.clone(),
            },
        );
        Reply::with_keyboard(
            text::ask_favorite_amount(lang, &from, &to),
            options_keyboard(Vec::new(), lang),
        )
    }

    async fn on_favorite_amount(
        &self,
        user: UserId,
        profile: &UserProfile,
        input: &str,
        from: CurrencyCode,
        to: CurrencyCode,
    ) -> Reply {
        let lang = profile.language;
        let Ok(amount) = input.parse::<f64>() else {
            return Reply::text(text::bad_plain_amount(lang));
        };
        self.refresh_if_stale().await;
        self.complete_conversion(user, lang, amount, from, to).await
    }

    // --- Calc flow ---

    async fn on_calc(&self, user: UserId, profile: &UserProfile, input: &str) -> Reply {
        let lang = profile.language;
        let Some((expression, from, to)) = parse_calc_request(input) else {
            return Reply::text(text::bad_calc_format(lang));
        };
        let amount = match expr::evaluate(&expression) {
            Ok(value) => value,
            Err(e) => return Reply::text(text::bad_expression(lang, &e.to_string())),
        };
        self.refresh_if_stale().await;
        for code in [&from, &to] {
            if !self.cache.contains(code) {
                return Reply::text(text::unknown_currency(lang, code));
            }
        }
        self.complete_conversion(user, lang, amount, from, to).await
    }

    // --- Alerts ---

    async fn on_alert_condition(
        &self,
        user: UserId,
        profile: &UserProfile,
        input: &str,
    ) -> Reply {
        self.create_alert(user, profile.language, input).await
    }

    async fn create_alert(&self, user: UserId, lang: Language, input: &str) -> Reply {
        let Some((currency, comparator, threshold)) = parse_alert_condition(input) else {
            return Reply::text(text::bad_alert_format(lang));
        };
        self.refresh_if_stale().await;
        if !self.cache.contains(&currency) {
            return Reply::text(text::unknown_currency(lang, &currency));
        }

        self.sessions.transition(user, SessionState::Idle);
        match self
            .store
            .insert_alert(user, currency, comparator, threshold)
            .await
        {
            Ok(rule) => Reply::text(text::alert_created(lang, &rule)),
            Err(e) => {
                warn!(user_id = user.0, error = %e, "failed to persist alert rule");
                Reply::text(text::storage_unavailable(lang))
            }
        }
    }

    async fn list_alerts(&self, user: UserId, lang: Language) -> Reply {
        match self.store.list_alerts(user).await {
            Ok(rules) if rules.is_empty() => Reply::text(text::alerts_empty(lang)),
            Ok(rules) => {
                let mut lines = vec![text::alerts_header(lang)];
                lines.extend(rules.iter().map(text::alert_line));
                Reply::text(lines.join("\n"))
            }
            Err(e) => {
                warn!(user_id = user.0, error = %e, "failed to list alert rules");
                Reply::text(text::storage_unavailable(lang))
            }
        }
    }

    async fn delete_alert(&self, user: UserId, lang: Language, id: AlertId) -> Reply {
        match self.store.delete_alert(user, id).await {
            Ok(true) => Reply::text(text::alert_deleted(lang)),
            Ok(false) => Reply::text(text::alert_not_found(lang)),
            Err(e) => {
                warn!(user_id = user.0, error = %e, "failed to delete alert rule");
                Reply::text(text::storage_unavailable(lang))
            }
        }
    }

    // --- Preferences and history ---

    async fn show_history(&self, user: UserId, lang: Language) -> Reply {
        match self.store.history(user).await {
            Ok(entries) if entries.is_empty() => Reply::text(text::history_empty(lang)),
            Ok(entries) => {
                let mut lines = vec![text::history_header(lang)];
                lines.extend(entries.iter().map(text::history_line));
                Reply::text(lines.join("\n"))
            }
            Err(e) => {
                warn!(user_id = user.0, error = %e, "failed to load history");
                Reply::text(text::storage_unavailable(lang))
            }
        }
    }

    async fn set_favorites(&self, user: UserId, lang: Language, codes: &[String]) -> Reply {
        let mut favorites = Vec::with_capacity(codes.len());
        for raw in codes {
            let Some(code) = CurrencyCode::parse(raw) else {
                return Reply::text(text::unknown_currency_input(lang, raw));
            };
            favorites.push(code);
        }
        self.refresh_if_stale().await;
        if let Some(missing) = favorites.iter().find(|c| !self.cache.contains(c)) {
            return Reply::text(text::unknown_currency(lang, missing));
        }

        match self.store.set_favorites(user, favorites.clone()).await {
            Ok(()) => Reply::text(text::favorites_list(lang, &favorites)),
            Err(e) => {
                warn!(user_id = user.0, error = %e, "failed to persist favorites");
                Reply::text(text::storage_unavailable(lang))
            }
        }
    }

    async fn toggle_language(&self, user: UserId, lang: Language) -> Reply {
        let next = lang.toggled();
        if let Err(e) = self.store.set_language(user, next).await {
            warn!(user_id = user.0, error = %e, "failed to persist language");
        }
        Reply::with_keyboard(text::language_set(next), Keyboard::Reply(text::menu_rows(next)))
    }

    // --- Shared pieces ---

    async fn rates_overview(&self, lang: Language) -> Reply {
        self.refresh_if_stale().await;
        let table = self.cache.table();
        if table.is_empty() {
            return Reply::text(text::rates_unavailable(lang));
        }

        let base = self.cache.base();
        let mut lines = vec![text::rates_header(lang, base)];
        for code in &self.config.showcase {
            // Codes the provider no longer supplies are simply omitted.
            if let Some(rate) = table.rate(code) {
                lines.push(text::rate_line(base, code, rate));
            }
        }
        Reply::text(lines.join("\n"))
    }

    /// Finish a collected conversion: convert, record history, reset the
    /// session, and present the result with swap/again buttons.
    async fn complete_conversion(
        &self,
        user: UserId,
        lang: Language,
        amount: f64,
        from: CurrencyCode,
        to: CurrencyCode,
    ) -> Reply {
        let result = match self.cache.convert(amount, &from, &to) {
            Ok(result) => result,
            Err(e) => {
                // A code can vanish from the table between validation and
                // conversion if a refresh happened in between.
                warn!(user_id = user.0, error = %e, "conversion failed after validation");
                return Reply::text(text::rates_unavailable(lang));
            }
        };

        let entry = HistoryEntry {
            from: from.clone(),
            to: to.clone(),
            amount,
            result,
            at: chrono::Utc::now(),
        };
        if let Err(e) = self.store.append_history(user, entry).await {
            // Degraded storage must not break the conversion itself.
            warn!(user_id = user.0, error = %e, "failed to append history entry");
        }

        self.sessions.transition(user, SessionState::Idle);
        self.conversion_reply(lang, amount, &from, result, &to)
    }

    fn conversion_reply(
        &self,
        lang: Language,
        amount: f64,
        from: &CurrencyCode,
        result: f64,
        to: &CurrencyCode,
    ) -> Reply {
        let keyboard = Keyboard::Inline(vec![
            vec![InlineButton::new(
                text::swap_label(lang),
                CallbackData::Swap {
                    amount,
                    from: from.clone(),
                    to: to.clone(),
                },
            )],
            vec![InlineButton::new(
                text::convert_again_label(lang),
                CallbackData::ConvertAgain,
            )],
        ]);
        Reply::with_keyboard(text::conversion_result(amount, from, result, to), keyboard)
    }

    fn main_menu(&self, lang: Language) -> Reply {
        Reply::with_keyboard(text::greeting(lang), Keyboard::Reply(text::menu_rows(lang)))
    }

    /// Favorites minus the source currency, capped for the keyboard.
    fn target_candidates(&self, profile: &UserProfile, from: &CurrencyCode) -> Vec<CurrencyCode> {
        profile
            .favorites
            .iter()
            .filter(|c| *c != from)
            .take(self.config.target_keyboard_limit)
            .cloned()
            .collect()
    }

    async fn refresh_if_stale(&self) {
        if let Err(e) = self.cache.ensure_fresh().await {
            // Keep serving the stale table; the bot stays partially
            // functional through provider outages.
            warn!(error = %e, "rate refresh failed, serving stale data");
        }
    }

    async fn profile_or_default(&self, user: UserId) -> UserProfile {
        match self.store.profile(user).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(user_id = user.0, error = %e, "profile unavailable, using defaults");
                UserProfile {
                    user_id: user,
                    language: Language::default(),
                    theme: Theme::default(),
                    favorites: FALLBACK_FAVORITES
                        .iter()
                        .filter_map(|c| CurrencyCode::parse(c))
                        .collect(),
                }
            }
        }
    }
}

/// Options keyboard: candidate rows of three plus a cancel row.
fn options_keyboard(options: Vec<CurrencyCode>, lang: Language) -> Keyboard {
    let mut rows: Vec<Vec<String>> = options
        .chunks(3)
        .map(|chunk| chunk.iter().map(|c| c.as_str().to_string()).collect())
        .collect();
    rows.push(vec![text::cancel_label(lang).to_string()]);
    Keyboard::Reply(rows)
}

/// Parse `<number><optional whitespace><3-letter code>`, the whole input.
pub(crate) fn parse_amount_currency(input: &str) -> Option<(f64, CurrencyCode)> {
    let digits_end = input
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(input.len());
    let (number, rest) = input.split_at(digits_end);
    if number.is_empty() {
        return None;
    }
    let amount: f64 = number.parse().ok()?;
    let code = CurrencyCode::parse(rest)?;
    Some((amount, code))
}

/// Parse `<expr> <from> to|в <to>`; the expression may contain spaces.
fn parse_calc_request(input: &str) -> Option<(String, CurrencyCode, CurrencyCode)> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    if tokens.len() < 4 {
        return None;
    }
    let to = CurrencyCode::parse(tokens[tokens.len() - 1])?;
    let separator = tokens[tokens.len() - 2].to_lowercase();
    if separator != "to" && separator != "в" {
        return None;
    }
    let from = CurrencyCode::parse(tokens[tokens.len() - 3])?;
    let expression = tokens[..tokens.len() - 3].join(" ");
    Some((expression, from, to))
}

/// Parse `<code> <comparator> <threshold>`.
fn parse_alert_condition(input: &str) -> Option<(CurrencyCode, Comparator, f64)> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let [raw_code, raw_op, raw_threshold] = tokens.as_slice() else {
        return None;
    };
    let code = CurrencyCode::parse(raw_code)?;
    let comparator = Comparator::parse(raw_op)?;
    let threshold: f64 = raw_threshold.parse().ok()?;
    Some((code, comparator, threshold))
}
