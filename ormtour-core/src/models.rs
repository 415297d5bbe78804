//! Row types for the `person` and `email` tables.
//!
//! Display output follows the tutorial's repr style, e.g.
//! `Person(id=1, name=Brian, age=19, emails=[])`.

use std::fmt;

use serde::Serialize;
use sqlx::FromRow;

/// A person row, with its emails attached after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub age: i32,
    #[sqlx(skip)]
    pub emails: Vec<Email>,
}

/// An email row owned by a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Email {
    pub id: i64,
    pub address: String,
    pub person_id: i64,
}

/// Person to insert; the id comes from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub name: String,
    pub age: i32,
    pub emails: Vec<NewEmail>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmail {
    pub address: String,
}

impl NewPerson {
    pub fn new(name: impl Into<String>, age: i32) -> Self {
        Self {
            name: name.into(),
            age,
            emails: Vec::new(),
        }
    }

    /// Attach an email address (builder style).
    pub fn with_email(mut self, address: impl Into<String>) -> Self {
        self.emails.push(NewEmail {
            address: address.into(),
        });
        self
    }
}

/// Everything `read_all` returns: people with emails, plus the raw email list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub people: Vec<Person>,
    pub emails: Vec<Email>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.people.is_empty() && self.emails.is_empty()
    }

    pub fn person(&self, name: &str) -> Option<&Person> {
        self.people.iter().find(|p| p.name == name)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Email(id={}, address={})", self.id, self.address)
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Person(id={}, name={}, age={}, emails=[",
            self.id, self.name, self.age
        )?;
        for (i, email) in self.emails.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{email}")?;
        }
        f.write_str("])")
    }
}

/// Brian and Mary, no emails.
pub fn users() -> Vec<NewPerson> {
    vec![NewPerson::new("Brian", 19), NewPerson::new("Mary", 24)]
}

/// jack, eric and lucy with their addresses.
pub fn users_with_emails() -> Vec<NewPerson> {
    vec![
        NewPerson::new("jack", 22).with_email("jack@google.com"),
        NewPerson::new("eric", 24)
            .with_email("eric@google.com")
            .with_email("eric@yahoo.com"),
        NewPerson::new("lucy", 31).with_email("lucy@yahoo.com"),
    ]
}
