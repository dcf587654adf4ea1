//! In-memory store
//!
//! A [`CallGateway`] that emulates the tracker's stored procedures without a
//! database server. Used by the tests and by the binary's `--in-memory` mode.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDateTime, Utc};
use db::{validate_procedure_name, CallGateway, GatewayError, Param, Row, SqlValue};
use rust_decimal::Decimal;

use crate::models::ProductRecord;
use crate::schema::{columns, params, Procedure};

#[derive(Debug, Default)]
struct StoreState {
    users: HashMap<String, String>,
    products: Vec<ProductRecord>,
    next_id: i64,
    fail_next: Option<GatewayError>,
    calls: Vec<String>,
}

/// Rows and affected count produced by one emulated call
#[derive(Debug, Default)]
struct Outcome {
    rows: Vec<Row>,
    affected: u64,
}

impl Outcome {
    fn rows(rows: Vec<Row>) -> Self {
        Self { rows, affected: 0 }
    }

    fn affected(affected: u64) -> Self {
        Self {
            rows: Vec::new(),
            affected,
        }
    }
}

/// In-memory stand-in for the procedure store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call fail with `error` instead of running.
    pub fn fail_next(&self, error: GatewayError) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_next = Some(error);
        }
    }

    /// Names of the procedures called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|state| state.calls.clone())
            .unwrap_or_default()
    }

    /// Stored credential hash for a user, if registered.
    pub fn password_hash(&self, username: &str) -> Option<String> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.users.get(username).cloned())
    }

    /// Snapshot of the product table.
    pub fn products(&self) -> Vec<ProductRecord> {
        self.state
            .lock()
            .map(|state| state.products.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, GatewayError> {
        self.state
            .lock()
            .map_err(|_| GatewayError::Unexpected("in-memory store lock poisoned".to_string()))
    }

    fn call(&self, procedure: &str, bound: &[Param]) -> Result<Outcome, GatewayError> {
        validate_procedure_name(procedure)?;

        let mut guard = self.lock()?;
        let state = &mut *guard;
        state.calls.push(procedure.to_string());
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }

        let procedure = Procedure::from_name(procedure).ok_or_else(|| {
            GatewayError::Store(format!("PROCEDURE inventory.{} does not exist", procedure))
        })?;
        let args = Args::new(procedure, bound)?;

        match procedure {
            Procedure::RegisterUser => {
                let username = args.text(params::USERNAME)?;
                if state.users.contains_key(username) {
                    return Err(GatewayError::Store(format!(
                        "Duplicate entry '{}' for key 'Users.Username'",
                        username
                    )));
                }
                let hash = args.text(params::PASSWORD_HASH)?;
                state.users.insert(username.to_string(), hash.to_string());
                Ok(Outcome::affected(1))
            }
            Procedure::LoginUser => {
                let username = args.text(params::USERNAME)?;
                let rows = state
                    .users
                    .get(username)
                    .map(|hash| {
                        Row::new()
                            .with(params::USERNAME, username)
                            .with(columns::PASSWORD_HASH, hash.as_str())
                    })
                    .into_iter()
                    .collect();
                Ok(Outcome::rows(rows))
            }
            Procedure::AddProduct => {
                let name = args.text(params::PRODUCT_NAME)?;
                let quantity = args.int(params::QUANTITY)?;
                let price = args.decimal(params::PRICE)?;

                // Existing names accumulate quantity; price is left as stored.
                if let Some(existing) = state.products.iter_mut().find(|p| p.name == name) {
                    existing.quantity = quantity_column(existing.quantity.checked_add(quantity))?;
                } else {
                    let quantity = quantity_column(Some(quantity))?;
                    state.next_id += 1;
                    let product = ProductRecord {
                        id: state.next_id,
                        name: name.to_string(),
                        quantity,
                        price,
                        created_at: now(),
                    };
                    state.products.push(product);
                }
                Ok(Outcome::affected(1))
            }
            Procedure::DisplayAllProducts => {
                Ok(Outcome::rows(state.products.iter().map(product_row).collect()))
            }
            Procedure::FindProduct => {
                let name = args.text(params::PRODUCT_NAME)?;
                Ok(Outcome::rows(
                    state
                        .products
                        .iter()
                        .filter(|p| p.name == name)
                        .map(product_row)
                        .collect(),
                ))
            }
            Procedure::DeleteProduct => {
                let name = args.text(params::PRODUCT_NAME)?;
                let before = state.products.len();
                state.products.retain(|p| p.name != name);
                Ok(Outcome::affected((before - state.products.len()) as u64))
            }
        }
    }
}

impl CallGateway for InMemoryStore {
    async fn execute_query(
        &self,
        procedure: &str,
        params: &[Param],
    ) -> Result<Vec<Row>, GatewayError> {
        tracing::debug!("Calling {} with {} parameter(s)", procedure, params.len());
        self.call(procedure, params)
            .map(|outcome| outcome.rows)
            .inspect_err(|e| {
                tracing::error!(code = e.code(), "Call to {} failed: {}", procedure, e)
            })
    }

    async fn execute_effect(&self, procedure: &str, params: &[Param]) -> Result<u64, GatewayError> {
        tracing::debug!("Calling {} with {} parameter(s)", procedure, params.len());
        self.call(procedure, params)
            .map(|outcome| outcome.affected)
            .inspect_err(|e| {
                tracing::error!(code = e.code(), "Call to {} failed: {}", procedure, e)
            })
    }
}

/// Bound arguments checked against the procedure's signature.
struct Args<'a> {
    procedure: Procedure,
    bound: &'a [Param],
}

impl<'a> Args<'a> {
    fn new(procedure: Procedure, bound: &'a [Param]) -> Result<Self, GatewayError> {
        let expected: &[&str] = match procedure {
            Procedure::RegisterUser => &[params::USERNAME, params::PASSWORD_HASH],
            Procedure::LoginUser => &[params::USERNAME],
            Procedure::AddProduct => &[params::PRODUCT_NAME, params::QUANTITY, params::PRICE],
            Procedure::DisplayAllProducts => &[],
            Procedure::FindProduct | Procedure::DeleteProduct => &[params::PRODUCT_NAME],
        };

        let matches = bound.len() == expected.len()
            && bound.iter().zip(expected).all(|(p, name)| p.name == *name);
        if !matches {
            return Err(GatewayError::Store(format!(
                "Incorrect number of arguments for PROCEDURE inventory.{}; expected {}, got {}",
                procedure.name(),
                expected.len(),
                bound.len()
            )));
        }
        Ok(Self { procedure, bound })
    }

    fn value(&self, name: &str) -> Result<&'a SqlValue, GatewayError> {
        self.bound
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
            .ok_or_else(|| {
                GatewayError::Store(format!(
                    "missing argument {} for {}",
                    name,
                    self.procedure.name()
                ))
            })
    }

    fn mismatch(&self, name: &str, found: &SqlValue) -> GatewayError {
        GatewayError::Store(format!(
            "Incorrect {} value for argument {} of {}",
            found.kind(),
            name,
            self.procedure.name()
        ))
    }

    fn text(&self, name: &str) -> Result<&'a str, GatewayError> {
        match self.value(name)? {
            SqlValue::Text(v) => Ok(v.as_str()),
            other => Err(self.mismatch(name, other)),
        }
    }

    fn int(&self, name: &str) -> Result<i64, GatewayError> {
        match self.value(name)? {
            SqlValue::Int(v) => Ok(*v),
            other => Err(self.mismatch(name, other)),
        }
    }

    fn decimal(&self, name: &str) -> Result<Decimal, GatewayError> {
        match self.value(name)? {
            SqlValue::Decimal(v) => Ok(*v),
            SqlValue::Int(v) => Ok(Decimal::from(*v)),
            other => Err(self.mismatch(name, other)),
        }
    }
}

fn product_row(product: &ProductRecord) -> Row {
    Row::new()
        .with(columns::PRODUCT_ID, product.id)
        .with(columns::PRODUCT_NAME, product.name.as_str())
        .with(columns::QUANTITY, product.quantity)
        .with(columns::PRICE, product.price)
        .with(columns::CREATED_AT, product.created_at)
}

/// `Quantity` is an `INT` column.
fn quantity_column(quantity: Option<i64>) -> Result<i64, GatewayError> {
    quantity
        .filter(|q| i32::try_from(*q).is_ok())
        .ok_or_else(|| GatewayError::Store("Out of range value for column 'Quantity'".to_string()))
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}
