//! MySQL implementation of the call gateway.

use std::str::FromStr;

use sqlx::mysql::{MySqlArguments, MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Connection, MySql, Row as _, TypeInfo};

use crate::config::DbConfig;
use crate::gateway::{call_statement, validate_procedure_name, CallGateway};
use crate::value::{Param, Row, SqlValue};
use error::GatewayError;

/// Call gateway backed by a MySQL server.
///
/// Holds only the configuration; a fresh connection is opened for each call
/// and closed before the call returns.
#[derive(Debug, Clone)]
pub struct MySqlGateway {
    config: DbConfig,
}

impl MySqlGateway {
    pub fn new(config: DbConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Check that the store is reachable.
    pub async fn health_check(&self) -> Result<(), GatewayError> {
        let result = async {
            let mut conn = self.connect().await?;
            let ping = sqlx::query("SELECT 1").execute(&mut conn).await;
            release(conn).await;
            ping.map(|_| ()).map_err(map_sqlx_error)
        }
        .await;

        if let Err(e) = &result {
            tracing::error!("Health check failed: {}", e);
        }
        result
    }

    async fn connect(&self) -> Result<MySqlConnection, GatewayError> {
        let options =
            MySqlConnectOptions::from_str(&self.config.connection_string).map_err(map_sqlx_error)?;

        tokio::time::timeout(
            self.config.connect_timeout(),
            MySqlConnection::connect_with(&options),
        )
        .await
        .map_err(|_| {
            GatewayError::Store(format!(
                "connection timed out after {}s",
                self.config.connect_timeout_secs
            ))
        })?
        .map_err(map_sqlx_error)
    }

    async fn query_rows(&self, procedure: &str, params: &[Param]) -> Result<Vec<Row>, GatewayError> {
        validate_procedure_name(procedure)?;
        let statement = call_statement(procedure, params.len());

        let mut conn = self.connect().await?;
        let fetched = bind_params(sqlx::query(&statement), params)
            .fetch_all(&mut conn)
            .await;
        release(conn).await;

        fetched
            .map_err(map_sqlx_error)?
            .iter()
            .map(decode_row)
            .collect()
    }

    async fn affect_rows(&self, procedure: &str, params: &[Param]) -> Result<u64, GatewayError> {
        validate_procedure_name(procedure)?;
        let statement = call_statement(procedure, params.len());

        let mut conn = self.connect().await?;
        let executed = bind_params(sqlx::query(&statement), params)
            .execute(&mut conn)
            .await;
        release(conn).await;

        executed
            .map(|done| done.rows_affected())
            .map_err(map_sqlx_error)
    }
}

impl CallGateway for MySqlGateway {
    async fn execute_query(
        &self,
        procedure: &str,
        params: &[Param],
    ) -> Result<Vec<Row>, GatewayError> {
        tracing::debug!("Calling {} with {} parameter(s)", procedure, params.len());
        self.query_rows(procedure, params)
            .await
            .inspect_err(|e| log_failure(procedure, e))
    }

    async fn execute_effect(&self, procedure: &str, params: &[Param]) -> Result<u64, GatewayError> {
        tracing::debug!("Calling {} with {} parameter(s)", procedure, params.len());
        self.affect_rows(procedure, params)
            .await
            .inspect_err(|e| log_failure(procedure, e))
    }
}

fn log_failure(procedure: &str, err: &GatewayError) {
    tracing::error!(code = err.code(), "Call to {} failed: {}", procedure, err);
}

async fn release(conn: MySqlConnection) {
    if let Err(e) = conn.close().await {
        tracing::warn!("Failed to close database connection cleanly: {}", e);
    }
}

fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &'q [Param],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match &param.value {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Decimal(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.as_str()),
            SqlValue::Timestamp(v) => query.bind(*v),
        };
    }
    query
}

/// Server-side and transport failures are store errors; the rest
/// (configuration, decoding, type mismatches) are unexpected.
fn map_sqlx_error(err: sqlx::Error) -> GatewayError {
    match &err {
        sqlx::Error::Database(_)
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => GatewayError::Store(err.to_string()),
        _ => GatewayError::Unexpected(err.to_string()),
    }
}

fn decode_row(row: &MySqlRow) -> Result<Row, GatewayError> {
    let mut decoded = Row::new();
    for column in row.columns() {
        let value = decode_column(row, column.ordinal(), column.type_info().name())?;
        decoded.push(column.name(), value);
    }
    Ok(decoded)
}

fn decode_column(row: &MySqlRow, index: usize, type_name: &str) -> Result<SqlValue, GatewayError> {
    let decode_err = |e: sqlx::Error| GatewayError::Unexpected(e.to_string());

    let value = match type_name {
        "NULL" => SqlValue::Null,
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .map_err(decode_err)?
            .map_or(SqlValue::Null, SqlValue::Int),
        name if name.ends_with("UNSIGNED") => {
            match row.try_get::<Option<u64>, _>(index).map_err(decode_err)? {
                Some(v) => SqlValue::Int(i64::try_from(v).map_err(|_| {
                    GatewayError::Unexpected(format!("column {} overflows i64", index))
                })?),
                None => SqlValue::Null,
            }
        }
        "DECIMAL" => row
            .try_get::<Option<rust_decimal::Decimal>, _>(index)
            .map_err(decode_err)?
            .map_or(SqlValue::Null, SqlValue::Decimal),
        "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" => row
            .try_get::<Option<String>, _>(index)
            .map_err(decode_err)?
            .map_or(SqlValue::Null, SqlValue::Text),
        "DATETIME" | "TIMESTAMP" => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(index)
            .map_err(decode_err)?
            .map_or(SqlValue::Null, SqlValue::Timestamp),
        other => {
            return Err(GatewayError::Unexpected(format!(
                "unsupported column type {} at index {}",
                other, index
            )))
        }
    };
    Ok(value)
}
