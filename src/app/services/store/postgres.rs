//! PostgreSQL observation store
//!
//! A [`PgBulkInsert`] streams rows into `COPY ... FROM STDIN` inside the open
//! transaction. Appended rows are encoded in COPY text format and shipped in
//! chunks of [`COPY_CHUNK_SIZE`] bytes, so at most a few chunks are held in
//! memory whatever the size of the load. The COPY is owned by a writer task
//! that also owns the transaction; [`flush`](BulkInsert::flush) ends the COPY
//! and hands the transaction back for commit or rollback.
//!
//! The server only answers a COPY when it is finished, so constraint
//! violations such as a duplicate `s_no` are reported by `flush`.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use std::fmt::Write as _;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{BulkInsert, ObservationStore, StoreResult};
use crate::app::models::{CountryTotals, Observation};
use crate::config::DatabaseConfig;
use crate::constants::{OBSERVATION_COLUMNS, OBSERVATIONS_TABLE};
use crate::error::StoreError;
use crate::{Error, Result};

/// Timestamp layout accepted by PostgreSQL text input
const COPY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Encoded bytes collected before a chunk is sent to the server
pub const COPY_CHUNK_SIZE: usize = 64 * 1024;

/// Chunks queued between the channel and its writer task
const COPY_QUEUE_DEPTH: usize = 4;

/// Observation store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgObservationStore {
    pool: PgPool,
    chunk_size: usize,
}

impl PgObservationStore {
    /// Connect and verify the account with one round trip
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!(
            "Connecting to PostgreSQL at {}:{}/{}",
            config.host, config.port, config.db_name
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(config.connect_options())
            .await
            .map_err(|e| Error::database("Failed to connect to database", e))?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(|e| Error::database("Database ping failed", e))?;

        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            chunk_size: COPY_CHUNK_SIZE,
        }
    }

    /// Override the COPY chunk size
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes.max(1);
        self
    }
}

#[async_trait]
impl ObservationStore for PgObservationStore {
    async fn begin_bulk_insert(&self) -> StoreResult<Box<dyn BulkInsert>> {
        let tx = self.pool.begin().await?;
        debug!("Opened bulk insert transaction on {}", OBSERVATIONS_TABLE);
        Ok(Box::new(PgBulkInsert {
            state: CopyState::Idle(tx),
            buffer: CopyBuffer::new(self.chunk_size),
            pending_rows: 0,
        }))
    }

    async fn top_confirmed(
        &self,
        observation_date: NaiveDateTime,
        limit: i64,
    ) -> StoreResult<Vec<CountryTotals>> {
        let rows: Vec<(Option<String>, Option<f64>, Option<f64>, Option<f64>)> =
            sqlx::query_as(&top_confirmed_statement())
                .bind(observation_date)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(country, confirmed, deaths, recovered)| CountryTotals {
                country_region: country.unwrap_or_default(),
                confirmed: confirmed.unwrap_or_default(),
                deaths: deaths.unwrap_or_default(),
                recovered: recovered.unwrap_or_default(),
            })
            .collect())
    }
}

/// Encodes rows and releases them in chunks of at least `chunk_size` bytes
#[derive(Debug)]
pub struct CopyBuffer {
    text: String,
    chunk_size: usize,
}

impl CopyBuffer {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            text: String::new(),
            chunk_size,
        }
    }

    /// Encode one row; returns a chunk once enough bytes have accumulated
    pub fn push(&mut self, observation: &Observation) -> Option<Vec<u8>> {
        encode_copy_row(&mut self.text, observation);
        if self.text.len() >= self.chunk_size {
            Some(self.take())
        } else {
            None
        }
    }

    /// Drain everything buffered so far
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.text).into_bytes()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

type WriterOutcome = (Transaction<'static, Postgres>, StoreResult<u64>);

/// Task streaming chunks into one COPY on the transaction it owns
struct CopyWriter {
    chunks: mpsc::Sender<Vec<u8>>,
    task: JoinHandle<WriterOutcome>,
}

impl CopyWriter {
    fn spawn(mut tx: Transaction<'static, Postgres>) -> Self {
        let (chunks, mut queue) = mpsc::channel(COPY_QUEUE_DEPTH);
        let task = tokio::spawn(async move {
            let result = stream_copy(&mut tx, &mut queue).await;
            (tx, result)
        });
        Self { chunks, task }
    }
}

async fn stream_copy(
    tx: &mut Transaction<'static, Postgres>,
    queue: &mut mpsc::Receiver<Vec<u8>>,
) -> StoreResult<u64> {
    let mut copy = tx.copy_in_raw(&copy_statement()).await?;
    while let Some(chunk) = queue.recv().await {
        let sent = copy.send(chunk).await.map(|_| ());
        if let Err(e) = sent {
            let _ = copy.abort("client failed to stream rows").await;
            return Err(e.into());
        }
    }
    Ok(copy.finish().await?)
}

enum CopyState {
    /// Transaction open, no COPY in progress
    Idle(Transaction<'static, Postgres>),
    Streaming(CopyWriter),
    /// A COPY failed; the transaction can only be rolled back
    Failed(Transaction<'static, Postgres>, String),
    /// The writer task was lost together with its transaction
    Closed,
}

/// Streaming COPY channel bound to one transaction
pub struct PgBulkInsert {
    state: CopyState,
    buffer: CopyBuffer,
    pending_rows: usize,
}

impl PgBulkInsert {
    /// Send one chunk, starting the COPY if needed
    async fn send_chunk(&mut self, chunk: Vec<u8>) -> StoreResult<()> {
        match std::mem::replace(&mut self.state, CopyState::Closed) {
            CopyState::Idle(tx) => self.state = CopyState::Streaming(CopyWriter::spawn(tx)),
            CopyState::Failed(tx, reason) => {
                self.state = CopyState::Failed(tx, reason.clone());
                return Err(StoreError::backend(format!("COPY already failed: {}", reason)));
            }
            CopyState::Closed => {
                return Err(StoreError::backend("bulk insert channel is closed"));
            }
            streaming @ CopyState::Streaming(_) => self.state = streaming,
        }

        let CopyState::Streaming(writer) = &self.state else {
            return Err(StoreError::backend("bulk insert channel is closed"));
        };
        if writer.chunks.send(chunk).await.is_err() {
            // The writer only stops early on error; its outcome says why
            return match self.join_writer().await {
                Err(e) => Err(e),
                Ok(_) => Err(StoreError::backend("COPY stream closed early")),
            };
        }
        Ok(())
    }

    /// End the running COPY, if any, and take the transaction back
    async fn join_writer(&mut self) -> StoreResult<u64> {
        let writer = match std::mem::replace(&mut self.state, CopyState::Closed) {
            CopyState::Streaming(writer) => writer,
            other => {
                self.state = other;
                return Ok(0);
            }
        };

        drop(writer.chunks);
        let (tx, result) = writer.task.await.map_err(|e| {
            StoreError::backend(format!("COPY writer task failed: {}", e))
        })?;

        match result {
            Ok(rows) => {
                self.state = CopyState::Idle(tx);
                Ok(rows)
            }
            Err(e) => {
                self.state = CopyState::Failed(tx, e.to_string());
                Err(e)
            }
        }
    }
}

#[async_trait]
impl BulkInsert for PgBulkInsert {
    async fn append(&mut self, observation: &Observation) -> StoreResult<()> {
        if let CopyState::Failed(_, reason) = &self.state {
            return Err(StoreError::backend(format!("COPY already failed: {}", reason)));
        }

        self.pending_rows += 1;
        match self.buffer.push(observation) {
            Some(chunk) => self.send_chunk(chunk).await,
            None => Ok(()),
        }
    }

    async fn flush(&mut self) -> StoreResult<()> {
        if let CopyState::Failed(_, reason) = &self.state {
            return Err(StoreError::backend(format!("COPY already failed: {}", reason)));
        }
        if self.pending_rows == 0 {
            return Ok(());
        }

        if !self.buffer.is_empty() {
            let chunk = self.buffer.take();
            self.send_chunk(chunk).await?;
        }
        let rows = self.join_writer().await?;

        debug!("COPY wrote {} of {} appended rows", rows, self.pending_rows);
        self.pending_rows = 0;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let mut this = *self;
        if this.pending_rows > 0 {
            return Err(StoreError::backend(format!(
                "{} rows appended but never flushed",
                this.pending_rows
            )));
        }

        match std::mem::replace(&mut this.state, CopyState::Closed) {
            CopyState::Idle(tx) => {
                tx.commit().await?;
                Ok(())
            }
            CopyState::Failed(_, reason) => Err(StoreError::backend(format!(
                "cannot commit after failed COPY: {}",
                reason
            ))),
            CopyState::Streaming(_) | CopyState::Closed => {
                Err(StoreError::backend("bulk insert channel is closed"))
            }
        }
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        let mut this = *self;
        if let Err(e) = this.join_writer().await {
            warn!("COPY failed while rolling back: {}", e);
        }

        match std::mem::replace(&mut this.state, CopyState::Closed) {
            CopyState::Idle(tx) | CopyState::Failed(tx, _) => {
                tx.rollback().await?;
                Ok(())
            }
            CopyState::Streaming(_) | CopyState::Closed => Ok(()),
        }
    }
}

/// `COPY covid_observations (s_no, ...) FROM STDIN`
pub fn copy_statement() -> String {
    format!(
        "COPY {} ({}) FROM STDIN",
        OBSERVATIONS_TABLE,
        OBSERVATION_COLUMNS.join(", ")
    )
}

pub fn top_confirmed_statement() -> String {
    format!(
        "SELECT country_region, SUM(confirmed)::float8 AS c, SUM(deaths)::float8 AS d, \
         SUM(recovered)::float8 AS r FROM {} WHERE observation_date = $1 \
         GROUP BY country_region ORDER BY c DESC LIMIT $2",
        OBSERVATIONS_TABLE
    )
}

/// Append one observation as a COPY text-format line
pub fn encode_copy_row(buffer: &mut String, observation: &Observation) {
    let _ = write!(
        buffer,
        "{}\t{}\t",
        observation.s_no,
        observation.observation_date.format(COPY_TIMESTAMP_FORMAT)
    );
    escape_copy_text(buffer, &observation.province_state);
    buffer.push('\t');
    escape_copy_text(buffer, &observation.country_region);
    let _ = writeln!(
        buffer,
        "\t{}\t{}\t{}\t{}",
        observation.last_update.format(COPY_TIMESTAMP_FORMAT),
        copy_float(observation.confirmed),
        copy_float(observation.deaths),
        copy_float(observation.recovered)
    );
}

fn escape_copy_text(buffer: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '\\' => buffer.push_str("\\\\"),
            '\t' => buffer.push_str("\\t"),
            '\n' => buffer.push_str("\\n"),
            '\r' => buffer.push_str("\\r"),
            other => buffer.push(other),
        }
    }
}

fn copy_float(value: f32) -> String {
    if value.is_infinite() {
        let literal = if value > 0.0 { "Infinity" } else { "-Infinity" };
        literal.to_string()
    } else {
        value.to_string()
    }
}
