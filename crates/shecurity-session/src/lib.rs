pub mod credentials;
pub mod dispatcher;
pub mod session;
pub mod store;
pub mod voice;

pub use credentials::{CachedCredential, CredentialCache, CredentialKey};
pub use dispatcher::{ActivationOutcome, DispatchState, Trigger};
pub use session::{
    location_notice, Session, SessionEvent, SessionFlags, SessionHandle, SessionSettings,
};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use voice::{
    matches_keyword, LineRecognizer, SpeechError, SpeechRecognizer, VoiceSubscription,
    VoiceTrigger, KEYWORDS,
};
