use bigdecimal::{BigDecimal, Zero};

use crate::domain::catalog;
use crate::domain::errors::DomainError;
use crate::domain::order::{CartLine, Product, ProductId};
use crate::domain::pricing::{compute_totals, OrderTotals};
use crate::domain::session::Session;

/// What a cart does with a line whose quantity or price is out of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidLinePolicy {
    /// Refuse the line and report it to the caller.
    Reject,
    /// Skip the line without complaint.
    Drop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    pub name: String,
    /// Largest quantity accepted in a single add.
    pub max_quantity: i32,
    pub invalid_lines: InvalidLinePolicy,
}

impl CartConfig {
    /// Pharmacy basket: up to 50 units per add, bad lines are flagged.
    pub fn pharmacy() -> Self {
        Self {
            name: "pharmacy-cart".to_string(),
            max_quantity: 50,
            invalid_lines: InvalidLinePolicy::Reject,
        }
    }

    /// Warehouse supply list: up to 500 units per add, bad lines are dropped.
    pub fn supply() -> Self {
        Self {
            name: "supply-list".to_string(),
            max_quantity: 500,
            invalid_lines: InvalidLinePolicy::Drop,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockStatus {
    pub label: String,
    pub in_stock: bool,
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProductListing {
    pub product: Product,
    pub status: StockStatus,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub reference: String,
    pub message: String,
    pub totals: OrderTotals,
    pub delivery_days: Option<u32>,
}

/// The parts of a cart that differ between the pharmacy basket and the
/// warehouse supply list.
pub trait CartStrategy {
    fn fetch_products(&self) -> Result<Vec<Product>, DomainError>;

    fn stock_status(&self, product: &Product) -> StockStatus;

    fn discount_percent(&self, _session: &Session) -> Result<BigDecimal, DomainError> {
        Ok(BigDecimal::zero())
    }

    fn complete(
        &self,
        session: &Session,
        lines: &[CartLine],
        totals: &OrderTotals,
    ) -> Result<Completion, DomainError>;
}

pub struct Cart<S> {
    strategy: S,
    config: CartConfig,
    lines: Vec<CartLine>,
}

impl<S: CartStrategy> Cart<S> {
    pub fn new(strategy: S, config: CartConfig) -> Self {
        Self {
            strategy,
            config,
            lines: Vec::new(),
        }
    }

    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn products(&self) -> Result<Vec<Product>, DomainError> {
        self.strategy.fetch_products()
    }

    pub fn listings(&self) -> Result<Vec<ProductListing>, DomainError> {
        Ok(self
            .strategy
            .fetch_products()?
            .into_iter()
            .map(|product| {
                let status = self.strategy.stock_status(&product);
                ProductListing { product, status }
            })
            .collect())
    }

    /// Listings whose product name matches `query`, best match first.
    pub fn search(&self, query: &str) -> Result<Vec<ProductListing>, DomainError> {
        Ok(catalog::search(self.listings()?, query, |l| l.product.name.as_str()))
    }

    /// Adds `quantity` units of `product`, merging with an existing line.
    ///
    /// Returns `Ok(false)` when the line was dropped under
    /// [`InvalidLinePolicy::Drop`].
    pub fn add(&mut self, product: &Product, quantity: i32) -> Result<bool, DomainError> {
        if let Some(problem) = self.line_problem(product, quantity) {
            return match self.config.invalid_lines {
                InvalidLinePolicy::Reject => Err(DomainError::InvalidInput(problem)),
                InvalidLinePolicy::Drop => {
                    log::debug!("{}: dropping line, {}", self.config.name, problem);
                    Ok(false)
                }
            };
        }

        match self.lines.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine {
                product_id: product.id,
                quantity,
                unit_price: product.unit_price.clone(),
            }),
        }
        Ok(true)
    }

    pub fn add_from_catalog(
        &mut self,
        catalog: &[Product],
        product_id: ProductId,
        quantity: i32,
    ) -> Result<bool, DomainError> {
        let product = catalog
            .iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown product {product_id}")))?;
        self.add(product, quantity)
    }

    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    pub fn totals(&self, session: &Session) -> Result<OrderTotals, DomainError> {
        let percent = self.strategy.discount_percent(session)?;
        Ok(compute_totals(&self.lines, &percent))
    }

    /// Hands the cart to the strategy. The cart is emptied only when the
    /// strategy succeeds.
    pub fn complete(&mut self, session: &Session) -> Result<Completion, DomainError> {
        if self.lines.is_empty() {
            return Err(DomainError::EmptyOrder);
        }
        let totals = self.totals(session)?;
        if totals.base_total <= BigDecimal::zero() {
            return Err(DomainError::EmptyOrder);
        }

        let completion = self.strategy.complete(session, &self.lines, &totals)?;
        log::info!(
            "{}: {} completed for '{}' ({} lines)",
            self.config.name,
            completion.reference,
            session.user,
            self.lines.len()
        );
        self.lines.clear();
        Ok(completion)
    }

    fn line_problem(&self, product: &Product, quantity: i32) -> Option<String> {
        if quantity < 1 || quantity > self.config.max_quantity {
            return Some(format!(
                "quantity {quantity} for product {} must be between 1 and {}",
                product.id, self.config.max_quantity
            ));
        }
        if product.unit_price <= BigDecimal::zero() {
            return Some(format!("product {} has no valid price", product.id));
        }
        None
    }
}
