//! Alert, voice listening and credential cache command handlers.
//!
//! Each handler builds a fresh session from config, so the credential cache
//! file is the only state carried between invocations.

use shecurity_core::{location_link, AppConfig, Position};
use shecurity_session::{
    location_notice, ActivationOutcome, LineRecognizer, SessionHandle, Trigger, KEYWORDS,
};

use crate::context::{self, CliSession};
use crate::location::print_ranked;
use crate::ContactArgs;

/// Start a session, apply contact overrides and try to resolve a position.
///
/// A location failure is reported but not fatal; activation will then stop
/// at `AwaitingLocation`.
async fn prepare(
    config: &AppConfig,
    overrides: ContactArgs,
    device: Option<Position>,
) -> anyhow::Result<(CliSession, Option<String>)> {
    let mut session = context::session(config, device)?;
    let flags = session.start();

    let mut contact = session.contact().clone();
    if let Some(phone) = overrides.phone {
        contact.phone = phone;
    }
    if let Some(email) = overrides.email {
        contact.email = email;
    }
    if flags.contact_entry_visible && !contact.is_complete() {
        tracing::info!("no cached contact; pass --phone and --email");
    }
    session.set_contact(contact);

    let location_failure = match session.refresh_location().await {
        Ok(_) => None,
        Err(e) => Some(location_notice(&e)),
    };
    Ok((session, location_failure))
}

fn report_delivery(session: &CliSession, message: &str) {
    println!("{message}");
    if let Some(position) = session.position() {
        println!("location: {}", location_link(position));
        if session.flags().stations_panel_visible {
            println!();
            print_ranked(position, session.ranked());
        }
    }
}

/// Send one alert.
///
/// # Errors
///
/// Returns an error if setup fails or the alert was not delivered.
pub(crate) async fn run_alert(
    config: &AppConfig,
    contact: ContactArgs,
    device: Option<Position>,
) -> anyhow::Result<()> {
    let (mut session, location_failure) = prepare(config, contact, device).await?;

    match session.activate(Trigger::Manual).await {
        ActivationOutcome::Delivered { message } => {
            report_delivery(&session, &message);
            Ok(())
        }
        ActivationOutcome::AwaitingLocation => anyhow::bail!(
            location_failure.unwrap_or_else(|| ActivationOutcome::AwaitingLocation.notice())
        ),
        outcome => anyhow::bail!(outcome.notice()),
    }
}

/// Listen for keywords on stdin until it closes or ctrl-c is pressed.
///
/// Each activation outcome and background location failure is printed as it
/// arrives.
///
/// # Errors
///
/// Returns an error if setup fails or the recognizer cannot start.
pub(crate) async fn run_listen(
    config: &AppConfig,
    contact: ContactArgs,
    device: Option<Position>,
) -> anyhow::Result<()> {
    let (session, location_failure) = prepare(config, contact, device).await?;
    if let Some(notice) = location_failure {
        eprintln!("{notice}");
    }
    let (handle, mut events) = SessionHandle::with_events(session);

    let recognizer = LineRecognizer::new(tokio::io::BufReader::new(tokio::io::stdin()));
    let subscription = handle.listen(&recognizer, &config.speech_language)?;
    eprintln!(
        "listening for \"{}\" on stdin ({}); ctrl-c to stop",
        KEYWORDS.join("\", \""),
        config.speech_language
    );

    let finished = subscription.finished();
    tokio::pin!(finished);
    loop {
        tokio::select! {
            () = &mut finished => {
                tracing::info!("transcript input closed");
                break;
            }
            Some(event) = events.recv() => println!("{}", event.notice()),
            result = tokio::signal::ctrl_c() => {
                result?;
                tracing::info!("interrupted");
                break;
            }
        }
    }
    while let Ok(event) = events.try_recv() {
        println!("{}", event.notice());
    }

    let flags = handle.flags().await;
    if flags.stations_panel_visible {
        handle
            .with_session(|session| {
                if let Some(position) = session.position() {
                    print_ranked(position, session.ranked());
                }
            })
            .await;
    }
    Ok(())
}

/// Print the cached contact (phone masked) and where things are configured.
///
/// # Errors
///
/// Returns an error if the credential cache cannot be read.
pub(crate) fn run_status(config: &AppConfig) -> anyhow::Result<()> {
    let contact = context::credential_cache(config).load_contact()?;
    let or_unset = |value: String| {
        if value.is_empty() {
            "(not cached)".to_string()
        } else {
            value
        }
    };

    println!("environment:     {}", config.env);
    println!("phone:           {}", or_unset(contact.masked_phone()));
    println!("email:           {}", or_unset(contact.email));
    println!("alert endpoint:  {}", config.alert_url);
    println!("stations file:   {}", config.stations_path.display());
    println!("state file:      {}", config.state_path.display());
    println!("credential ttl:  {}h", config.credential_ttl_hours);
    println!(
        "location:        {}",
        match (
            config.location.device_position.is_some(),
            config.location.geoip_url.is_some()
        ) {
            (true, true) => "device fix, network estimate",
            (true, false) => "device fix",
            (false, true) => "network estimate",
            (false, false) => "unavailable",
        }
    );
    Ok(())
}

/// Clear the cached contact.
///
/// # Errors
///
/// Returns an error if the cache cannot be cleared.
pub(crate) fn run_reset(config: &AppConfig) -> anyhow::Result<()> {
    context::credential_cache(config).clear()?;
    println!("cached contact cleared");
    Ok(())
}
