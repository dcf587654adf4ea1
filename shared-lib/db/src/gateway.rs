//! The call gateway contract.

use std::sync::Arc;

use error::GatewayError;

use crate::value::{Param, Row};

/// Gateway for named stored-procedure calls.
///
/// `execute_query` returns the tabular result of the call, `execute_effect`
/// the number of rows it affected. Implementations hold no connection
/// between calls and log every failure before returning it.
#[allow(async_fn_in_trait)]
pub trait CallGateway: Send + Sync {
    /// Call a procedure that returns rows.
    async fn execute_query(&self, procedure: &str, params: &[Param])
        -> Result<Vec<Row>, GatewayError>;

    /// Call a procedure for its effect and return the affected-row count.
    async fn execute_effect(&self, procedure: &str, params: &[Param]) -> Result<u64, GatewayError>;
}

impl<G: CallGateway> CallGateway for Arc<G> {
    async fn execute_query(
        &self,
        procedure: &str,
        params: &[Param],
    ) -> Result<Vec<Row>, GatewayError> {
        (**self).execute_query(procedure, params).await
    }

    async fn execute_effect(&self, procedure: &str, params: &[Param]) -> Result<u64, GatewayError> {
        (**self).execute_effect(procedure, params).await
    }
}

/// Reject procedure names that are not plain identifiers.
///
/// The name is the only part of a call that is written into the statement
/// text, so it must never carry anything but `[A-Za-z0-9_]`.
pub fn validate_procedure_name(procedure: &str) -> Result<(), GatewayError> {
    let valid = !procedure.is_empty()
        && !procedure.starts_with(|c: char| c.is_ascii_digit())
        && procedure
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(GatewayError::Unexpected(format!(
            "invalid procedure name: {:?}",
            procedure
        )))
    }
}

/// Build the `CALL` statement for a procedure with `arity` placeholders.
pub fn call_statement(procedure: &str, arity: usize) -> String {
    let placeholders = vec!["?"; arity].join(", ");
    format!("CALL {}({})", procedure, placeholders)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_statement() {
        assert_eq!(call_statement("sp_DisplayAllProducts", 0), "CALL sp_DisplayAllProducts()");
        assert_eq!(call_statement("sp_AddProduct", 3), "CALL sp_AddProduct(?, ?, ?)");
    }

    #[test]
    fn test_validate_procedure_name() {
        assert!(validate_procedure_name("sp_FindProduct").is_ok());
        assert!(validate_procedure_name("").is_err());
        assert!(validate_procedure_name("1proc").is_err());
        assert!(validate_procedure_name("sp_x(); DROP TABLE Products; --").is_err());
        assert!(validate_procedure_name("inventory.sp_FindProduct").is_err());
    }
}
