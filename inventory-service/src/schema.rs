//! Store contract
//!
//! Procedure names, parameter names and result columns shared with the
//! database (see `sql/schema.sql`), plus typed call structs so callers never
//! assemble parameter lists by hand.

use db::{CallGateway, GatewayError, Param, Row};
use rust_decimal::Decimal;

/// Stored procedures the tracker calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Procedure {
    RegisterUser,
    LoginUser,
    AddProduct,
    DisplayAllProducts,
    FindProduct,
    DeleteProduct,
}

impl Procedure {
    pub const ALL: [Procedure; 6] = [
        Procedure::RegisterUser,
        Procedure::LoginUser,
        Procedure::AddProduct,
        Procedure::DisplayAllProducts,
        Procedure::FindProduct,
        Procedure::DeleteProduct,
    ];

    /// Name of the procedure on the server
    pub const fn name(self) -> &'static str {
        match self {
            Procedure::RegisterUser => "sp_RegisterUser",
            Procedure::LoginUser => "sp_LoginUser",
            Procedure::AddProduct => "sp_AddProduct",
            Procedure::DisplayAllProducts => "sp_DisplayAllProducts",
            Procedure::FindProduct => "sp_FindProduct",
            Procedure::DeleteProduct => "sp_DeleteProduct",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

/// Parameter names.
pub mod params {
    pub const USERNAME: &str = "Username";
    pub const PASSWORD_HASH: &str = "PasswordHash";
    pub const PRODUCT_NAME: &str = "ProductName";
    pub const QUANTITY: &str = "Quantity";
    pub const PRICE: &str = "Price";
}

/// Result column names.
pub mod columns {
    pub const PASSWORD_HASH: &str = "PasswordHash";
    pub const PRODUCT_ID: &str = "ProductId";
    pub const PRODUCT_NAME: &str = "ProductName";
    pub const QUANTITY: &str = "Quantity";
    pub const PRICE: &str = "Price";
    pub const CREATED_AT: &str = "CreatedAt";
}

/// A typed call to one stored procedure.
pub trait ProcedureCall {
    const PROCEDURE: Procedure;

    /// Parameter bindings, in declaration order.
    fn params(&self) -> Vec<Param>;
}

/// Run a row-returning call.
pub async fn query<G, C>(gateway: &G, call: &C) -> Result<Vec<Row>, GatewayError>
where
    G: CallGateway,
    C: ProcedureCall,
{
    gateway
        .execute_query(C::PROCEDURE.name(), &call.params())
        .await
}

/// Run an effect call and return the affected-row count.
pub async fn effect<G, C>(gateway: &G, call: &C) -> Result<u64, GatewayError>
where
    G: CallGateway,
    C: ProcedureCall,
{
    gateway
        .execute_effect(C::PROCEDURE.name(), &call.params())
        .await
}

/// `sp_RegisterUser(Username, PasswordHash)`
#[derive(Debug)]
pub struct RegisterUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
}

impl ProcedureCall for RegisterUser<'_> {
    const PROCEDURE: Procedure = Procedure::RegisterUser;

    fn params(&self) -> Vec<Param> {
        vec![
            Param::new(params::USERNAME, self.username),
            Param::new(params::PASSWORD_HASH, self.password_hash),
        ]
    }
}

/// `sp_LoginUser(Username)`, returns at least `PasswordHash`
#[derive(Debug)]
pub struct LoginUser<'a> {
    pub username: &'a str,
}

impl ProcedureCall for LoginUser<'_> {
    const PROCEDURE: Procedure = Procedure::LoginUser;

    fn params(&self) -> Vec<Param> {
        vec![Param::new(params::USERNAME, self.username)]
    }
}

/// `sp_AddProduct(ProductName, Quantity, Price)`
#[derive(Debug)]
pub struct AddProduct<'a> {
    pub name: &'a str,
    pub quantity: i64,
    pub price: Decimal,
}

impl ProcedureCall for AddProduct<'_> {
    const PROCEDURE: Procedure = Procedure::AddProduct;

    fn params(&self) -> Vec<Param> {
        vec![
            Param::new(params::PRODUCT_NAME, self.name),
            Param::new(params::QUANTITY, self.quantity),
            Param::new(params::PRICE, self.price),
        ]
    }
}

/// `sp_DisplayAllProducts()`
#[derive(Debug)]
pub struct DisplayAllProducts;

impl ProcedureCall for DisplayAllProducts {
    const PROCEDURE: Procedure = Procedure::DisplayAllProducts;

    fn params(&self) -> Vec<Param> {
        Vec::new()
    }
}

/// `sp_FindProduct(ProductName)`
#[derive(Debug)]
pub struct FindProduct<'a> {
    pub name: &'a str,
}

impl ProcedureCall for FindProduct<'_> {
    const PROCEDURE: Procedure = Procedure::FindProduct;

    fn params(&self) -> Vec<Param> {
        vec![Param::new(params::PRODUCT_NAME, self.name)]
    }
}

/// `sp_DeleteProduct(ProductName)`
#[derive(Debug)]
pub struct DeleteProduct<'a> {
    pub name: &'a str,
}

impl ProcedureCall for DeleteProduct<'_> {
    const PROCEDURE: Procedure = Procedure::DeleteProduct;

    fn params(&self) -> Vec<Param> {
        vec![Param::new(params::PRODUCT_NAME, self.name)]
    }
}
