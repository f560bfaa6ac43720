//! Non-interactive command-line modes.
//!
//! These run the same gate operations as the TUI against a headless view
//! model and print the resulting notice.

use std::io::{self, Write};

use anyhow::Result;

use sessiongate_core::gate::GateDecision;
use sessiongate_core::{BackendKind, Config, Credentials, NoticeKind, SessionGate, View, ViewModel};

/// Prompt for credentials and log in.
pub async fn login(mut config: Config) -> Result<()> {
    let mut gate = SessionGate::from_config(&config)?;
    let mut view = ViewModel::new(&config);

    if gate.backend_kind() == BackendKind::Simulated {
        eprintln!("Note: the simulated backend starts with no accounts; use the TUI to sign up first.");
    }

    let username = prompt_username(config.last_username.as_deref())?;
    let password = rpassword::prompt_password("Password: ")?;

    eprintln!("\nAuthenticating...");
    gate.login(&mut view, Credentials::new(username.clone(), password))
        .await?;

    print_notice(&view);
    if view.view == View::Dashboard {
        if let Some(ref message) = view.welcome {
            println!("{}", message);
        }
        config.last_username = Some(username);
        if let Err(e) = config.save() {
            tracing::warn!(error = %e, "Failed to save config");
        }
        Ok(())
    } else {
        Err(anyhow::anyhow!("Login failed"))
    }
}

/// Remove stored tokens.
pub fn logout(config: &Config) -> Result<()> {
    let mut gate = SessionGate::from_config(config)?;
    let mut view = ViewModel::new(config);
    gate.logout(&mut view)?;
    println!("Logged out.");
    Ok(())
}

/// Check the stored session against the dashboard endpoint.
pub async fn status(config: &Config) -> Result<()> {
    let mut gate = SessionGate::from_config(config)?;
    let mut view = ViewModel::new(config);

    match gate.check_session(&mut view).await? {
        GateDecision::Proceed => {
            println!("Logged in.");
            if let Some(ref message) = view.welcome {
                println!("{}", message);
            }
        }
        GateDecision::RedirectToLogin => println!("Not logged in."),
    }
    Ok(())
}

fn prompt_username(default: Option<&str>) -> Result<String> {
    match default {
        Some(last) => print!("Username [{}]: ", last),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match default {
        Some(last) if input.is_empty() => last.to_string(),
        _ => input.to_string(),
    })
}

fn print_notice(view: &ViewModel) {
    if let Some(notice) = view.notice() {
        match notice.kind {
            NoticeKind::Error => eprintln!("Error: {}", notice.text),
            NoticeKind::Success | NoticeKind::Info => eprintln!("{}", notice.text),
        }
    }
}
