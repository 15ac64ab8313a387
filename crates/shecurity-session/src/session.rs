//! The session controller.
//!
//! [`Session`] owns every piece of user-facing state (contact fields, the
//! latest fix, the ranked assistance points, dispatch state) and changes it
//! only through the operations below. [`SessionHandle`] shares one session
//! between the manual control, the voice trigger and background location
//! refreshes, and refuses a second activation while one is still running.
//! Outcomes the caller did not await directly arrive as [`SessionEvent`]s.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use shecurity_alert::{AlertRequest, AlertTransport};
use shecurity_core::{AppConfig, AssistancePoint, Contact, Position, RankedAssistancePoint};
use shecurity_location::{Fix, LocationError, LocationOptions, LocationProvider};
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::credentials::CredentialCache;
use crate::dispatcher::{ActivationOutcome, DispatchState, Trigger};
use crate::store::StoreError;
use crate::voice::{SpeechError, SpeechRecognizer, VoiceSubscription, VoiceTrigger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub location: LocationOptions,
    pub credential_ttl_hours: u64,
    /// How many assistance points the ranked panel shows.
    pub nearest_limit: usize,
    /// Send the extended body that also carries the contact email.
    pub include_email: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            location: LocationOptions::default(),
            credential_ttl_hours: 24,
            nearest_limit: 5,
            include_email: false,
        }
    }
}

impl From<&AppConfig> for SessionSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            location: LocationOptions::from(&config.location),
            credential_ttl_hours: config.credential_ttl_hours,
            nearest_limit: config.nearest_limit,
            include_email: config.alert_include_email,
        }
    }
}

/// What the presentation layer should show.
///
/// The stations panel reflects the most recent dispatch: a delivery shows
/// it, a failed dispatch or a reset hides it. Activations that send nothing
/// leave it as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionFlags {
    pub contact_entry_visible: bool,
    pub stations_panel_visible: bool,
}

/// User-facing text for a failed location query.
#[must_use]
pub fn location_notice(err: &LocationError) -> String {
    if err.is_capability_missing() {
        "Geolocation is not supported on this device.".to_string()
    } else {
        format!("Error fetching location: {err}")
    }
}

pub struct Session<L, T> {
    locator: Arc<L>,
    transport: T,
    cache: CredentialCache,
    catalog: Vec<AssistancePoint>,
    settings: SessionSettings,
    contact: Contact,
    fix: Option<Fix>,
    ranked: Vec<RankedAssistancePoint>,
    state: DispatchState,
    panel_visible: bool,
}

impl<L, T> Session<L, T>
where
    L: LocationProvider,
    T: AlertTransport,
{
    #[must_use]
    pub fn new(
        locator: Arc<L>,
        transport: T,
        cache: CredentialCache,
        catalog: Vec<AssistancePoint>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            locator,
            transport,
            cache,
            catalog,
            settings,
            contact: Contact::default(),
            fix: None,
            ranked: Vec::new(),
            state: DispatchState::Idle,
            panel_visible: false,
        }
    }

    /// Prefill the contact from the credential cache.
    ///
    /// A cache that cannot be read is treated as empty.
    pub fn start(&mut self) -> SessionFlags {
        self.contact = self.cache.load_contact().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "credential cache unreadable, starting empty");
            Contact::default()
        });
        tracing::debug!(cached = self.contact.is_complete(), "session started");
        self.flags()
    }

    #[must_use]
    pub fn flags(&self) -> SessionFlags {
        SessionFlags {
            contact_entry_visible: !self.contact.is_complete(),
            stations_panel_visible: self.panel_visible,
        }
    }

    #[must_use]
    pub fn contact(&self) -> &Contact {
        &self.contact
    }

    /// Replace the contact fields with user input. Nothing is cached until
    /// an activation accepts them.
    pub fn set_contact(&mut self, contact: Contact) {
        self.contact = contact;
    }

    #[must_use]
    pub fn state(&self) -> DispatchState {
        self.state
    }

    #[must_use]
    pub fn fix(&self) -> Option<Fix> {
        self.fix
    }

    #[must_use]
    pub fn position(&self) -> Option<Position> {
        self.fix.map(|fix| fix.position)
    }

    /// Assistance points ranked against the latest fix, closest first.
    #[must_use]
    pub fn ranked(&self) -> &[RankedAssistancePoint] {
        &self.ranked
    }

    #[must_use]
    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    /// Record a new fix and recompute the ranking from scratch.
    pub fn apply_fix(&mut self, fix: Fix) {
        self.ranked = shecurity_core::rank_nearest(
            fix.position,
            &self.catalog,
            self.settings.nearest_limit,
        );
        self.fix = Some(fix);
    }

    /// Query the location provider once and apply the result.
    ///
    /// # Errors
    ///
    /// Returns the provider's [`LocationError`]. The previous fix, if any, is kept.
    pub async fn refresh_location(&mut self) -> Result<Fix, LocationError> {
        let fix = self
            .locator
            .current_position(self.settings.location)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "location query failed"))?;
        self.apply_fix(fix);
        Ok(fix)
    }

    fn transition(&mut self, to: DispatchState) {
        tracing::debug!(from = %self.state, %to, "dispatch state transition");
        self.state = to;
    }

    /// Run one activation to completion.
    pub async fn activate(&mut self, trigger: Trigger) -> ActivationOutcome {
        let activation_id = Uuid::new_v4();
        tracing::info!(%activation_id, %trigger, "activation received");

        if !self.contact.is_complete() {
            self.transition(DispatchState::AwaitingCredentials);
            tracing::warn!(%activation_id, "activation blocked: contact incomplete");
            return ActivationOutcome::MissingCredentials;
        }

        if let Err(e) = self
            .cache
            .store_contact(&self.contact, self.settings.credential_ttl_hours)
        {
            tracing::warn!(%activation_id, error = %e, "failed to cache contact");
        }

        let Some(fix) = self.fix else {
            self.transition(DispatchState::AwaitingLocation);
            tracing::info!(%activation_id, "activation deferred: no position yet");
            return ActivationOutcome::AwaitingLocation;
        };

        self.transition(DispatchState::Dispatching);
        let request = AlertRequest::new(&self.contact, fix.position, self.settings.include_email);
        tracing::info!(
            %activation_id,
            phone = %self.contact.masked_phone(),
            fix_source = %fix.source,
            "dispatching alert"
        );

        let outcome = match self.transport.send_alert(&request).await {
            Ok(response) => {
                self.transition(DispatchState::Delivered);
                self.panel_visible = true;
                ActivationOutcome::Delivered {
                    message: response.message,
                }
            }
            Err(e) => {
                self.transition(DispatchState::Failed);
                self.panel_visible = false;
                tracing::warn!(%activation_id, error = %e, "alert dispatch failed");
                ActivationOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };
        self.transition(DispatchState::Idle);
        outcome
    }

    /// Forget the contact, hide the panel and return to `Idle`.
    ///
    /// In-memory state is reset even if clearing the cache fails.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the credential cache cannot be cleared.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.contact = Contact::default();
        self.panel_visible = false;
        self.transition(DispatchState::Idle);
        tracing::info!("session reset");
        self.cache.clear()
    }
}

/// Something the user should see that did not come back from a direct call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A voice-triggered activation finished.
    Activation(ActivationOutcome),
    /// A background location refresh failed.
    LocationFailed { notice: String },
}

impl SessionEvent {
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            SessionEvent::Activation(outcome) => outcome.notice(),
            SessionEvent::LocationFailed { notice } => notice.clone(),
        }
    }
}

/// Clears the in-flight flag when the activation ends, even if it is cancelled.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Shared access to one [`Session`].
pub struct SessionHandle<L, T> {
    inner: Arc<Mutex<Session<L, T>>>,
    in_flight: Arc<AtomicBool>,
    locator: Arc<L>,
    options: LocationOptions,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl<L, T> Clone for SessionHandle<L, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            in_flight: Arc::clone(&self.in_flight),
            locator: Arc::clone(&self.locator),
            options: self.options,
            events: self.events.clone(),
        }
    }
}

impl<L, T> SessionHandle<L, T>
where
    L: LocationProvider + 'static,
    T: AlertTransport + 'static,
{
    #[must_use]
    pub fn new(session: Session<L, T>) -> Self {
        let locator = Arc::clone(&session.locator);
        let options = session.settings.location;
        Self {
            inner: Arc::new(Mutex::new(session)),
            in_flight: Arc::new(AtomicBool::new(false)),
            locator,
            options,
            events: None,
        }
    }

    /// Like [`Self::new`], also returning the receiver for voice activation
    /// outcomes and background location failures.
    #[must_use]
    pub fn with_events(session: Session<L, T>) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut handle = Self::new(session);
        handle.events = Some(tx);
        (handle, rx)
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(events) = &self.events {
            if events.send(event).is_err() {
                tracing::debug!("session event receiver dropped");
            }
        }
    }

    /// Activate unless another activation is still running.
    ///
    /// When the outcome is [`ActivationOutcome::AwaitingLocation`] a location
    /// refresh is started in the background. The alert is not re-sent when it
    /// resolves; the user activates again.
    pub async fn activate(&self, trigger: Trigger) -> ActivationOutcome {
        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            tracing::info!(%trigger, "activation ignored: another is in flight");
            return ActivationOutcome::AlreadyInFlight;
        };
        let outcome = self.inner.lock().await.activate(trigger).await;

        if outcome == ActivationOutcome::AwaitingLocation {
            self.spawn_location_refresh();
        }
        outcome
    }

    /// Query the location provider without holding the session, then apply
    /// the fix.
    ///
    /// # Errors
    ///
    /// Returns the provider's [`LocationError`].
    pub async fn refresh_location(&self) -> Result<Fix, LocationError> {
        let fix = self
            .locator
            .current_position(self.options)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "location query failed"))?;
        self.inner.lock().await.apply_fix(fix);
        Ok(fix)
    }

    fn spawn_location_refresh(&self) {
        let handle = self.clone();
        tokio::spawn(async move {
            if let Err(e) = handle.refresh_location().await {
                let notice = location_notice(&e);
                tracing::warn!(%notice, "background location refresh failed");
                handle.emit(SessionEvent::LocationFailed { notice });
            }
        });
    }

    /// Run `f` with exclusive access to the session.
    pub async fn with_session<R>(&self, f: impl FnOnce(&mut Session<L, T>) -> R) -> R {
        let mut session = self.inner.lock().await;
        f(&mut session)
    }

    pub async fn flags(&self) -> SessionFlags {
        self.inner.lock().await.flags()
    }

    /// Reset the session, waiting for any in-flight activation to finish first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the credential cache cannot be cleared.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.inner.lock().await.reset()
    }

    /// Route keyword matches from `recognizer` into [`Self::activate`].
    ///
    /// Each outcome is sent as [`SessionEvent::Activation`] when the handle
    /// was built with [`Self::with_events`].
    ///
    /// # Errors
    ///
    /// Returns [`SpeechError::Unavailable`] if the recognizer cannot start.
    pub fn listen<R>(
        &self,
        recognizer: &R,
        language: &str,
    ) -> Result<VoiceSubscription, SpeechError>
    where
        R: SpeechRecognizer + ?Sized,
    {
        let handle = self.clone();
        VoiceTrigger::spawn(recognizer, language, move |_utterance| {
            let handle = handle.clone();
            async move {
                let outcome = handle.activate(Trigger::Voice).await;
                tracing::info!(notice = %outcome.notice(), "voice activation finished");
                handle.emit(SessionEvent::Activation(outcome));
            }
        })
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
