pub mod blocking;
pub mod config;
pub mod engine;
pub mod error;
pub mod migrate;
pub mod models;
pub mod script;
pub mod store;

pub use blocking::BlockingStore;
pub use config::{load_dotenv, TourConfig};
pub use engine::{connect, redact_url, Engine};
pub use error::{Result, TourError};
pub use migrate::{Revision, Target};
pub use models::{Email, NewEmail, NewPerson, Person, Snapshot};
pub use script::{Action, RunSummary, DEFAULT_SCRIPT};
pub use store::Store;
