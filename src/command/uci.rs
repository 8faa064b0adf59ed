use super::{CommandKind, MatchOutcome};
use crate::protocol::{
    id::ID_KEY, merge_id_line, option_key, parse_option_line, EngineId, OptionTable,
    ProtectionState, RegistrationState, COPYPROTECTION, REGISTRATION, UCIOK,
};

/// `uci`: switch the engine to UCI mode and collect its identity and options.
///
/// Resolves on `uciok`. `copyprotection` and `registration` lines seen
/// along the way are recorded without ending the exchange.
#[derive(Debug, Clone, Default)]
pub struct Uci {
    options: OptionTable,
    registration: RegistrationState,
    copy_protection: ProtectionState,
}

impl Uci {
    /// Options keyed by [`option_key`], plus the `id` record.
    #[must_use]
    pub fn options(&self) -> &OptionTable {
        &self.options
    }

    #[must_use]
    pub fn into_options(self) -> OptionTable {
        self.options
    }

    #[must_use]
    pub fn engine_id(&self) -> Option<&EngineId> {
        self.options.get(ID_KEY).and_then(|record| record.id.as_ref())
    }

    #[must_use]
    pub fn registration(&self) -> RegistrationState {
        self.registration
    }

    #[must_use]
    pub fn copy_protection(&self) -> ProtectionState {
        self.copy_protection
    }
}

impl CommandKind for Uci {
    const NAME: &'static str = "uci";

    fn request_lines(&self) -> Vec<String> {
        vec!["uci".to_string()]
    }

    fn expects_reply(&self) -> bool {
        true
    }

    fn on_send(&mut self) {
        *self = Uci::default();
    }

    fn on_line(&mut self, line: &str) -> MatchOutcome {
        if line.starts_with("id") {
            merge_id_line(&mut self.options, line);
        } else if line.starts_with("option") {
            if let Some(option) = parse_option_line(line) {
                self.options.insert(option_key(&option.name), option);
            }
        } else if line.starts_with(UCIOK) {
            return MatchOutcome::Resolved;
        } else if let Some(state) = RegistrationState::parse(line, COPYPROTECTION) {
            self.copy_protection = state;
        } else if let Some(state) = RegistrationState::parse(line, REGISTRATION) {
            self.registration = state;
        }
        MatchOutcome::Continue
    }
}
