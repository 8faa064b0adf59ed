use super::{CommandKind, MatchOutcome};
use crate::error::ConfigError;
use crate::protocol::{RegistrationState, REGISTRATION};

const LATER: &str = "register later";

/// `register`: postpone registration or register with a name and code.
///
/// Nothing is configured by default; pick one with [`later`](Self::later),
/// [`with_credentials`](Self::with_credentials) or
/// [`set_registration`](Self::set_registration) before sending.
#[derive(Debug, Clone, Default)]
pub struct Register {
    request: Option<String>,
    status: RegistrationState,
}

impl Register {
    /// `register later`
    #[must_use]
    pub fn later() -> Self {
        Register {
            request: Some(LATER.to_string()),
            status: RegistrationState::NotInitiated,
        }
    }

    /// `register name <name> code <code>`. Both must be non-blank.
    pub fn with_credentials(name: &str, code: &str) -> Result<Self, ConfigError> {
        let mut register = Register::default();
        register.set_registration(false, name, code)?;
        Ok(register)
    }

    /// Choose what to send. `name` and `code` are ignored when `later` is
    /// set, otherwise both must be non-blank.
    pub fn set_registration(
        &mut self,
        later: bool,
        name: &str,
        code: &str,
    ) -> Result<(), ConfigError> {
        if later {
            self.request = Some(LATER.to_string());
            return Ok(());
        }
        if name.trim().is_empty() || code.trim().is_empty() {
            return Err(ConfigError::RegistrationArgumentsMissing);
        }
        self.request = Some(format!("register name {name} code {code}"));
        Ok(())
    }

    /// Last status reported by the engine for this exchange.
    #[must_use]
    pub fn status(&self) -> RegistrationState {
        self.status
    }

    fn is_later(&self) -> bool {
        self.request.as_deref() == Some(LATER)
    }
}

impl CommandKind for Register {
    const NAME: &'static str = "register";

    fn request_lines(&self) -> Vec<String> {
        self.request.iter().cloned().collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self.request {
            Some(_) => Ok(()),
            None => Err(ConfigError::RegistrationNotConfigured),
        }
    }

    // Postponing is not acknowledged
    fn expects_reply(&self) -> bool {
        !self.is_later()
    }

    fn on_send(&mut self) {
        self.status = RegistrationState::NotInitiated;
    }

    fn on_line(&mut self, line: &str) -> MatchOutcome {
        let Some(state) = RegistrationState::parse(line, REGISTRATION) else {
            return MatchOutcome::Continue;
        };
        self.status = state;
        if state.is_final() {
            MatchOutcome::Resolved
        } else {
            MatchOutcome::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::command::{Command, Resolution, DEFAULT_RESPONSE_TIMEOUT};
    use crate::engine::scripted::ScriptedEngine;
    use crate::engine::EngineChannel;
    use crate::error::UciError;
    use crate::logging::Logger;
    use crate::protocol::Stream;

    #[test]
    fn test_request_text() {
        assert_eq!(Register::later().request_lines(), vec!["register later"]);
        let register = Register::with_credentials("Stefan MK", "4359874324").expect("valid");
        assert_eq!(
            register.request_lines(),
            vec!["register name Stefan MK code 4359874324"]
        );
    }

    #[test]
    fn test_blank_credentials_rejected() {
        assert_eq!(
            Register::with_credentials("", "x").err(),
            Some(ConfigError::RegistrationArgumentsMissing)
        );
        assert_eq!(
            Register::with_credentials("name", "  ").err(),
            Some(ConfigError::RegistrationArgumentsMissing)
        );
        let mut register = Register::default();
        assert!(register.set_registration(true, "", "").is_ok());
        assert_eq!(register.request_lines(), vec!["register later"]);
    }

    #[test]
    fn test_unconfigured_fails_validation() {
        let register = Register::default();
        assert_eq!(
            register.validate(),
            Err(ConfigError::RegistrationNotConfigured)
        );
        assert!(register.request_lines().is_empty());
    }

    #[test]
    fn test_later_expects_no_reply() {
        assert!(!Register::later().expects_reply());
        assert!(Register::with_credentials("a", "b")
            .expect("valid")
            .expects_reply());
    }

    #[test]
    fn test_only_registration_lines_matter() {
        let mut register = Register::with_credentials("a", "b").expect("valid");
        assert_eq!(register.on_line("info string hi"), MatchOutcome::Continue);
        assert_eq!(register.status(), RegistrationState::NotInitiated);
        assert_eq!(
            register.on_line("registration checking"),
            MatchOutcome::Continue
        );
        assert_eq!(register.status(), RegistrationState::Checking);
        assert_eq!(register.on_line("registration error"), MatchOutcome::Resolved);
        assert_eq!(register.status(), RegistrationState::Error);
    }

    #[test]
    fn test_checking_then_ok_over_channel() {
        let engine = Arc::new(ScriptedEngine::new(|line| {
            if line.starts_with("register name") {
                vec![(Stream::Data, "registration checking".to_string())]
            } else {
                Vec::new()
            }
        }));
        let channel: Arc<dyn EngineChannel> = engine.clone();
        let register = Register::with_credentials("a", "b").expect("valid");
        let cmd = Command::bound(register, &channel, DEFAULT_RESPONSE_TIMEOUT, Logger::nop());

        cmd.send().expect("send");
        assert!(!cmd.response_received());
        assert_eq!(cmd.state().status(), RegistrationState::Checking);

        engine.emit(Stream::Data, "registration ok");
        assert_eq!(cmd.wait(), Resolution::Response);
        assert_eq!(cmd.state().status(), RegistrationState::Ok);
    }

    #[test]
    fn test_unconfigured_send_writes_nothing() {
        let engine = Arc::new(ScriptedEngine::silent());
        let channel: Arc<dyn EngineChannel> = engine.clone();
        let cmd = Command::bound(
            Register::default(),
            &channel,
            Duration::from_secs(1),
            Logger::nop(),
        );
        assert!(matches!(
            cmd.send(),
            Err(UciError::Configuration(ConfigError::RegistrationNotConfigured))
        ));
        assert!(engine.sent().is_empty());
        assert_eq!(cmd.sent_at(), None);
    }
}
