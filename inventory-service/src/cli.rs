//! Interactive menu
//!
//! Line-oriented menu over any reader/writer pair. Anonymous users may
//! register or log in; authenticated users get the inventory operations.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use auth::{validate_password, CredentialVerifier};
use db::CallGateway;
use error::{AppError, AuthError};
use rust_decimal::Decimal;

use crate::inventory::InventoryService;
use crate::models::{DeleteOutcome, ProductRecord};
use crate::session::SessionService;

const DIVIDER: &str =
    "--------------------------------------------------------------------------------------";

/// Menu options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Register,
    Login,
    Add,
    List,
    Find,
    Delete,
    Logout,
    Exit,
}

impl Choice {
    /// Parse a menu selection, honouring which options the user can see.
    pub fn parse(input: &str, authenticated: bool) -> Option<Self> {
        let choice = match input.trim() {
            "1" => Choice::Register,
            "2" => Choice::Login,
            "3" => Choice::Add,
            "4" => Choice::List,
            "5" => Choice::Find,
            "6" => Choice::Delete,
            "7" => Choice::Logout,
            "8" => Choice::Exit,
            _ => return None,
        };
        let visible = match choice {
            Choice::Register | Choice::Login => !authenticated,
            Choice::Exit => true,
            _ => authenticated,
        };
        visible.then_some(choice)
    }
}

/// The interactive menu loop
pub struct Menu<G, V, R, W> {
    inventory: InventoryService<G>,
    session: SessionService<G, V>,
    input: R,
    output: W,
}

impl<G, V, R, W> Menu<G, V, R, W>
where
    G: CallGateway,
    V: CredentialVerifier,
    R: BufRead,
    W: Write,
{
    pub fn new(
        inventory: InventoryService<G>,
        session: SessionService<G, V>,
        input: R,
        output: W,
    ) -> Self {
        Self {
            inventory,
            session,
            input,
            output,
        }
    }

    /// Run until the user exits or input ends.
    pub async fn run(&mut self) -> io::Result<()> {
        loop {
            self.print_menu()?;
            let Some(line) = self.read_line()? else {
                break;
            };

            match Choice::parse(&line, self.session.session().is_authenticated()) {
                Some(Choice::Register) => self.register().await?,
                Some(Choice::Login) => self.login().await?,
                Some(Choice::Add) => self.add_product().await?,
                Some(Choice::List) => self.list_products().await?,
                Some(Choice::Find) => self.find_product().await?,
                Some(Choice::Delete) => self.delete_product().await?,
                Some(Choice::Logout) => self.logout()?,
                Some(Choice::Exit) => break,
                None => writeln!(self.output, "Invalid choice. Please try again.")?,
            }
        }

        writeln!(
            self.output,
            "Thank you for using the Inventory Management Application!"
        )
    }

    /// Give back the output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "Welcome to the Inventory Management Application!")?;
        writeln!(self.output, "Please choose an option:")?;
        if self.session.session().is_authenticated() {
            writeln!(self.output, "3. Add Product to Inventory")?;
            writeln!(self.output, "4. Display All Products")?;
            writeln!(self.output, "5. Find a Product")?;
            writeln!(self.output, "6. Delete a Product")?;
            writeln!(self.output, "7. Logout")?;
        } else {
            writeln!(self.output, "1. Register")?;
            writeln!(self.output, "2. Login")?;
        }
        writeln!(self.output, "8. Exit")
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        writeln!(self.output, "{}", text)?;
        self.read_line()
    }

    /// Prompt for a non-blank product name.
    fn prompt_name(&mut self, text: &str) -> io::Result<Option<String>> {
        let Some(name) = self.prompt(text)? else {
            return Ok(None);
        };
        if name.trim().is_empty() {
            writeln!(self.output, "Product name cannot be empty.")?;
            return Ok(None);
        }
        Ok(Some(name.trim().to_string()))
    }

    async fn register(&mut self) -> io::Result<()> {
        let Some(username) = self.prompt("Enter a username:")? else {
            return Ok(());
        };
        let username = username.trim();

        let password = loop {
            let Some(password) = self.prompt("Enter a password:")? else {
                return Ok(());
            };
            match validate_password(&password) {
                Ok(()) => break password,
                Err(AuthError::WeakPassword(_)) => writeln!(
                    self.output,
                    "Password must be at least 8 characters long, contain at least one uppercase letter, and one number."
                )?,
                Err(e) => writeln!(self.output, "{}", e)?,
            }
        };

        match self.session.register(username, &password).await {
            Ok(()) => writeln!(self.output, "User registered successfully!"),
            Err(e) => writeln!(self.output, "Registration failed: {}", e),
        }
    }

    async fn login(&mut self) -> io::Result<()> {
        let Some(username) = self.prompt("Enter your username:")? else {
            return Ok(());
        };
        let username = username.trim().to_string();
        let Some(password) = self.prompt("Enter your password:")? else {
            return Ok(());
        };

        match self.session.login(&username, &password).await {
            Ok(()) => writeln!(self.output, "Welcome, {}. Login successful!", username),
            Err(AppError::Auth(AuthError::InvalidCredentials)) => {
                writeln!(self.output, "Invalid credentials. Please try again.")
            }
            Err(e) if e.is_store_failure() => {
                writeln!(self.output, "Login unavailable, please retry later: {}", e)
            }
            Err(e) => writeln!(self.output, "Login failed: {}", e),
        }
    }

    fn logout(&mut self) -> io::Result<()> {
        match self.session.logout() {
            Some(username) => writeln!(self.output, "User {} has logged out.", username),
            None => writeln!(self.output, "{}", self.session.current_identity_display()),
        }
    }

    async fn add_product(&mut self) -> io::Result<()> {
        let Some(name) = self.prompt_name("Enter the product name:")? else {
            return Ok(());
        };

        let Some(quantity) = self.prompt("Enter the quantity:")? else {
            return Ok(());
        };
        let Ok(quantity) = quantity.trim().parse::<i64>() else {
            return writeln!(self.output, "Invalid quantity. Please enter a valid number.");
        };

        let Some(price) = self.prompt("Enter the price:")? else {
            return Ok(());
        };
        let Ok(price) = Decimal::from_str(price.trim()) else {
            return writeln!(self.output, "Invalid price. Please enter a valid number.");
        };

        match self.inventory.add_product(&name, quantity, price).await {
            Ok(_) => writeln!(
                self.output,
                "{} units of '{}' added to inventory.",
                quantity, name
            ),
            Err(e) => writeln!(self.output, "Could not add product: {}", e),
        }
    }

    async fn list_products(&mut self) -> io::Result<()> {
        match self.inventory.list_products().await {
            Ok(products) if products.is_empty() => {
                writeln!(self.output, "No products in the inventory.")
            }
            Ok(products) => {
                writeln!(self.output, "Products in Inventory:")?;
                render_products(&mut self.output, &products)
            }
            Err(e) => writeln!(self.output, "Could not list products: {}", e),
        }
    }

    async fn find_product(&mut self) -> io::Result<()> {
        let Some(name) = self.prompt_name("Enter the product name to find:")? else {
            return Ok(());
        };

        match self.inventory.find_product(&name).await {
            Ok(Some(product)) => {
                writeln!(self.output, "Found Product:")?;
                render_products(&mut self.output, std::slice::from_ref(&product))
            }
            Ok(None) => writeln!(self.output, "Product '{}' not found in inventory.", name),
            Err(e) => writeln!(self.output, "Could not find product: {}", e),
        }
    }

    async fn delete_product(&mut self) -> io::Result<()> {
        let Some(name) = self.prompt_name("Enter the product name to delete:")? else {
            return Ok(());
        };

        match self.inventory.delete_product(&name).await {
            Ok(DeleteOutcome::Deleted(_)) => writeln!(
                self.output,
                "Product '{}' has been deleted from the inventory.",
                name
            ),
            Ok(DeleteOutcome::NotFound) => {
                writeln!(self.output, "Product '{}' not found in inventory.", name)
            }
            Err(e) => writeln!(self.output, "Could not delete product: {}", e),
        }
    }
}

/// Write products as a fixed-width table.
pub fn render_products<W: Write>(out: &mut W, products: &[ProductRecord]) -> io::Result<()> {
    writeln!(out, "{}", DIVIDER)?;
    writeln!(
        out,
        "| {:<10} | {:<20} | {:<10} | {:<10} | {:<20} |",
        "ID", "Name", "Quantity", "Price", "Created At"
    )?;
    writeln!(out, "{}", DIVIDER)?;
    for product in products {
        writeln!(
            out,
            "| {:<10} | {:<20} | {:<10} | {:<10} | {:<20} |",
            product.id,
            product.name,
            product.quantity,
            format!("{:.2}", product.price),
            product.created_at.format("%Y-%m-%d %H:%M:%S").to_string()
        )?;
    }
    writeln!(out, "{}", DIVIDER)
}
