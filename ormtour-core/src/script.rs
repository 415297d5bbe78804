//! The tutorial's action sequence and the runners that replay it against
//! one or more engines.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::blocking::BlockingStore;
use crate::engine::{redact_url, Engine};
use crate::error::{Result, TourError};
use crate::models::Snapshot;
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Init,
    ReadAll,
    CreateUsers,
    CreateUsersWithEmails,
    UpdateEricAge,
    DeleteAll,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Init,
        Action::ReadAll,
        Action::CreateUsers,
        Action::CreateUsersWithEmails,
        Action::UpdateEricAge,
        Action::DeleteAll,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::Init => "init",
            Action::ReadAll => "read_all",
            Action::CreateUsers => "create_users",
            Action::CreateUsersWithEmails => "create_users_with_emails",
            Action::UpdateEricAge => "update_eric_age",
            Action::DeleteAll => "delete_all",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = TourError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().replace('-', "_");
        Action::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = Action::ALL.iter().map(|a| a.name()).collect();
                TourError::config(format!(
                    "unknown action '{s}' (expected one of: {})",
                    known.join(", ")
                ))
            })
    }
}

/// Sequence run against every engine when no actions are given.
pub const DEFAULT_SCRIPT: &[Action] = &[
    Action::Init,
    Action::ReadAll,
    Action::CreateUsers,
    Action::ReadAll,
    Action::DeleteAll,
    Action::ReadAll,
    Action::CreateUsersWithEmails,
    Action::ReadAll,
    Action::UpdateEricAge,
    Action::ReadAll,
    Action::DeleteAll,
    Action::ReadAll,
];

/// What an action produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Created(Vec<i64>),
    Read(Snapshot),
    Affected(u64),
}

/// Print people, then emails, indented, then a blank line.
pub fn write_snapshot<W: Write>(out: &mut W, snapshot: &Snapshot) -> std::io::Result<()> {
    for person in &snapshot.people {
        writeln!(out, "    {person}")?;
    }
    for email in &snapshot.emails {
        writeln!(out, "    {email}")?;
    }
    writeln!(out)
}

fn report<W: Write>(out: &mut W, outcome: &Outcome) -> std::io::Result<()> {
    match outcome {
        Outcome::Read(snapshot) => write_snapshot(out, snapshot),
        _ => Ok(()),
    }
}

pub async fn apply(store: &Store, action: Action) -> Result<Outcome> {
    Ok(match action {
        Action::Init => {
            store.init().await?;
            Outcome::Done
        }
        Action::ReadAll => Outcome::Read(store.read_all().await?),
        Action::CreateUsers => Outcome::Created(store.create_users().await?),
        Action::CreateUsersWithEmails => {
            Outcome::Created(store.create_users_with_emails().await?)
        }
        Action::UpdateEricAge => Outcome::Affected(store.update_eric_age().await?),
        Action::DeleteAll => Outcome::Affected(store.delete_all().await?),
    })
}

pub fn apply_blocking(store: &BlockingStore, action: Action) -> Result<Outcome> {
    Ok(match action {
        Action::Init => {
            store.init()?;
            Outcome::Done
        }
        Action::ReadAll => Outcome::Read(store.read_all()?),
        Action::CreateUsers => Outcome::Created(store.create_users()?),
        Action::CreateUsersWithEmails => Outcome::Created(store.create_users_with_emails()?),
        Action::UpdateEricAge => Outcome::Affected(store.update_eric_age()?),
        Action::DeleteAll => Outcome::Affected(store.delete_all()?),
    })
}

/// Run `actions` in order, printing each action's name before it runs.
pub async fn run_actions<W: Write>(store: &Store, actions: &[Action], out: &mut W) -> Result<()> {
    for &action in actions {
        writeln!(out, "`{action}`:")?;
        let outcome = apply(store, action).await?;
        report(out, &outcome)?;
    }
    Ok(())
}

pub fn run_actions_blocking<W: Write>(
    store: &BlockingStore,
    actions: &[Action],
    out: &mut W,
) -> Result<()> {
    for &action in actions {
        writeln!(out, "`{action}`:")?;
        let outcome = apply_blocking(store, action)?;
        report(out, &outcome)?;
    }
    Ok(())
}

/// Result of replaying the script on one engine.
#[derive(Debug)]
pub struct EngineReport {
    /// URL with the password redacted
    pub url: String,
    pub engine: Option<Engine>,
    pub error: Option<TourError>,
}

impl EngineReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<EngineReport>,
}

impl RunSummary {
    pub fn failures(&self) -> impl Iterator<Item = &EngineReport> {
        self.reports.iter().filter(|r| !r.succeeded())
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Replay `actions` on each URL in order.
///
/// A failing engine is logged and recorded; the run moves on to the next
/// engine unless `fail_fast` is set, in which case the error is returned.
pub async fn run_engines<W: Write>(
    urls: &[String],
    actions: &[Action],
    fail_fast: bool,
    out: &mut W,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for url in urls {
        let shown = redact_url(url);
        info!(url = %shown, actions = actions.len(), "running script");

        let engine = Engine::from_url(url).ok();
        let result = match Store::connect(url).await {
            Ok(store) => {
                let result = run_actions(&store, actions, out).await;
                store.close().await;
                result
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => summary.reports.push(EngineReport {
                url: shown,
                engine,
                error: None,
            }),
            Err(err) if fail_fast => return Err(err),
            Err(err) => {
                warn!(url = %shown, error = %err, "engine failed, continuing");
                summary.reports.push(EngineReport {
                    url: shown,
                    engine,
                    error: Some(err),
                });
            }
        }
    }

    Ok(summary)
}

/// Same as [`run_engines`], through [`BlockingStore`].
pub fn run_engines_blocking<W: Write>(
    urls: &[String],
    actions: &[Action],
    fail_fast: bool,
    out: &mut W,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for url in urls {
        let shown = redact_url(url);
        info!(url = %shown, actions = actions.len(), "running script (sync)");

        let engine = Engine::from_url(url).ok();
        let result = BlockingStore::connect(url).and_then(|store| {
            let result = run_actions_blocking(&store, actions, out);
            store.close();
            result
        });

        match result {
            Ok(()) => summary.reports.push(EngineReport {
                url: shown,
                engine,
                error: None,
            }),
            Err(err) if fail_fast => return Err(err),
            Err(err) => {
                warn!(url = %shown, error = %err, "engine failed, continuing");
                summary.reports.push(EngineReport {
                    url: shown,
                    engine,
                    error: Some(err),
                });
            }
        }
    }

    Ok(summary)
}
