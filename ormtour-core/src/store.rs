//! Async CRUD actions over the `person` and `email` tables.
//!
//! Every action opens a transaction and commits it at the end, so a failed
//! action leaves the database untouched.

use std::collections::HashMap;

use sqlx::AnyPool;
use tracing::{debug, info};

use crate::engine::{self, Bind, Engine};
use crate::error::Result;
use crate::models::{self, Email, NewPerson, Person, Snapshot};

/// Store bound to one database engine.
#[derive(Debug, Clone)]
pub struct Store {
    engine: Engine,
    pool: AnyPool,
}

impl Store {
    pub fn new(engine: Engine, pool: AnyPool) -> Self {
        Self { engine, pool }
    }

    /// Connect to `url` and wrap the pool.
    pub async fn connect(url: &str) -> Result<Self> {
        let (engine, pool) = engine::connect(url).await?;
        Ok(Self::new(engine, pool))
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Close the pool, waiting for checked-out connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Create all tables, skipping the ones that already exist.
    pub async fn init(&self) -> Result<()> {
        let person = format!(
            "CREATE TABLE IF NOT EXISTS person (\
             {id}, \
             name VARCHAR(30), \
             age INTEGER)",
            id = self.engine.id_column()
        );
        let email = format!(
            "CREATE TABLE IF NOT EXISTS email (\
             {id}, \
             address VARCHAR(60) NOT NULL, \
             person_id BIGINT NOT NULL, \
             FOREIGN KEY (person_id) REFERENCES person(id))",
            id = self.engine.id_column()
        );

        let mut tx = self.pool.begin().await?;
        sqlx::query(&person).execute(&mut *tx).await?;
        sqlx::query(&email).execute(&mut *tx).await?;
        tx.commit().await?;

        info!(engine = %self.engine, "tables ready");
        Ok(())
    }

    /// Insert people and their emails in one transaction.
    ///
    /// Returns the generated person ids in input order.
    pub async fn create_people(&self, people: &[NewPerson]) -> Result<Vec<i64>> {
        let insert_person = "INSERT INTO person (name, age) VALUES (?, ?)";
        let insert_email = "INSERT INTO email (address, person_id) VALUES (?, ?)";

        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(people.len());
        for person in people {
            let person_id = self
                .engine
                .insert_returning_id(
                    &mut *tx,
                    insert_person,
                    &[Bind::Text(&person.name), Bind::Int(person.age)],
                )
                .await?;
            for email in &person.emails {
                self.engine
                    .insert_returning_id(
                        &mut *tx,
                        insert_email,
                        &[Bind::Text(&email.address), Bind::BigInt(person_id)],
                    )
                    .await?;
            }
            ids.push(person_id);
        }
        tx.commit().await?;

        debug!(engine = %self.engine, count = ids.len(), "people created");
        Ok(ids)
    }

    pub async fn create_users(&self) -> Result<Vec<i64>> {
        self.create_people(&models::users()).await
    }

    pub async fn create_users_with_emails(&self) -> Result<Vec<i64>> {
        self.create_people(&models::users_with_emails()).await
    }

    /// Load every person with their emails, plus every email.
    ///
    /// Two queries total; emails are grouped in memory rather than fetched
    /// per person.
    pub async fn read_all(&self) -> Result<Snapshot> {
        let mut tx = self.pool.begin().await?;
        let mut people: Vec<Person> =
            sqlx::query_as("SELECT id, name, age FROM person ORDER BY id")
                .fetch_all(&mut *tx)
                .await?;
        let emails: Vec<Email> =
            sqlx::query_as("SELECT id, address, person_id FROM email ORDER BY id")
                .fetch_all(&mut *tx)
                .await?;
        tx.commit().await?;

        let mut by_person: HashMap<i64, Vec<Email>> = HashMap::new();
        for email in &emails {
            by_person
                .entry(email.person_id)
                .or_default()
                .push(email.clone());
        }
        for person in &mut people {
            person.emails = by_person.remove(&person.id).unwrap_or_default();
        }

        Ok(Snapshot { people, emails })
    }

    /// Add one year to everyone named `name`. Returns rows affected.
    pub async fn increment_age(&self, name: &str) -> Result<u64> {
        let sql = self
            .engine
            .sql("UPDATE person SET age = age + 1 WHERE name = ?");

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(&sql).bind(name).execute(&mut *tx).await?;
        tx.commit().await?;

        Ok(result.rows_affected())
    }

    pub async fn update_eric_age(&self) -> Result<u64> {
        self.increment_age("eric").await
    }

    /// Delete all emails, then all people. Returns total rows deleted.
    pub async fn delete_all(&self) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let emails = sqlx::query("DELETE FROM email").execute(&mut *tx).await?;
        let people = sqlx::query("DELETE FROM person").execute(&mut *tx).await?;
        tx.commit().await?;

        Ok(emails.rows_affected() + people.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> Store {
        let store = Store::connect("sqlite::memory:")
            .await
            .expect("sqlite store");
        store.init().await.expect("init failed");
        store
    }

    async fn insert_orphan_email(store: &Store) -> sqlx::Result<()> {
        let insert = store
            .engine()
            .sql("INSERT INTO email (address, person_id) VALUES (?, ?)");
        sqlx::query(&insert)
            .bind("nobody@example.com")
            .bind(999_999_i64)
            .execute(store.pool())
            .await
            .map(|_| ())
    }

    #[tokio::test]
    async fn email_requires_existing_person() {
        let store = memory_store().await;
        assert!(insert_orphan_email(&store).await.is_err());
        assert!(store.read_all().await.unwrap().emails.is_empty());
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let store = memory_store().await;
        store.init().await.expect("second init should skip existing tables");
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_then_read_returns_inserted() {
        let store = memory_store().await;
        let ids = store.create_users().await.unwrap();
        assert_eq!(ids.len(), 2);

        let snapshot = store.read_all().await.unwrap();
        let names: Vec<_> = snapshot.people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Brian", "Mary"]);
        assert_eq!(snapshot.person("Brian").unwrap().age, 19);
        assert_eq!(snapshot.person("Mary").unwrap().id, ids[1]);
        assert!(snapshot.emails.is_empty());
    }

    #[tokio::test]
    async fn emails_attach_to_their_owner() {
        let store = memory_store().await;
        store.create_users_with_emails().await.unwrap();

        let snapshot = store.read_all().await.unwrap();
        assert_eq!(snapshot.people.len(), 3);
        assert_eq!(snapshot.emails.len(), 4);

        let eric = snapshot.person("eric").unwrap();
        let addresses: Vec<_> = eric.emails.iter().map(|e| e.address.as_str()).collect();
        assert_eq!(addresses, vec!["eric@google.com", "eric@yahoo.com"]);
        assert!(eric.emails.iter().all(|e| e.person_id == eric.id));
    }

    #[tokio::test]
    async fn update_eric_age_increments_once() {
        let store = memory_store().await;
        store.create_users_with_emails().await.unwrap();

        assert_eq!(store.update_eric_age().await.unwrap(), 1);
        let snapshot = store.read_all().await.unwrap();
        assert_eq!(snapshot.person("eric").unwrap().age, 25);
        assert_eq!(snapshot.person("jack").unwrap().age, 22);
    }

    #[tokio::test]
    async fn update_without_match_touches_nothing() {
        let store = memory_store().await;
        store.create_users().await.unwrap();
        assert_eq!(store.update_eric_age().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_all_removes_emails_and_people() {
        let store = memory_store().await;
        store.create_users_with_emails().await.unwrap();

        assert_eq!(store.delete_all().await.unwrap(), 7);
        assert!(store.read_all().await.unwrap().is_empty());
        assert_eq!(store.delete_all().await.unwrap(), 0);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn postgres_round_trip() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let store = Store::connect(&url).await.expect("connect failed");
        store.init().await.unwrap();
        store.delete_all().await.unwrap();

        store.create_users_with_emails().await.unwrap();
        store.update_eric_age().await.unwrap();
        let snapshot = store.read_all().await.unwrap();
        assert_eq!(snapshot.person("eric").unwrap().age, 25);

        store.delete_all().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn mysql_round_trip() {
        let url = std::env::var("MYSQL_URL").expect("MYSQL_URL required");
        let store = Store::connect(&url).await.expect("connect failed");
        store.init().await.unwrap();
        store.delete_all().await.unwrap();

        let ids = store.create_users_with_emails().await.unwrap();
        assert_eq!(ids.len(), 3);
        let snapshot = store.read_all().await.unwrap();
        assert_eq!(snapshot.emails.len(), 4);
        assert!(insert_orphan_email(&store).await.is_err());

        store.delete_all().await.unwrap();
    }
}
