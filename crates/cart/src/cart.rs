use serde::{Deserialize, Serialize};

use shopkit_core::{DomainError, DomainResult, Entity, RecordId};

/// Smallest quantity a cart line may carry.
pub const QUANTITY_MIN: u32 = 1;
/// Largest quantity a cart line may carry (matches the quantity selector).
pub const QUANTITY_MAX: u32 = 10;

/// Product identifier as known to the catalog (the cart does not resolve it).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub RecordId);

impl ProductId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Cart line identifier, minted when the line enters the cart.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(pub RecordId);

impl LineItemId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for LineItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// One product/size/color/quantity entry in the cart.
///
/// The persisted cart is exactly a JSON array of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub product_id: ProductId,
    pub name: String,
    /// Price in smallest currency unit (e.g., cents). Immutable once added.
    pub unit_price_cents: u64,
    pub quantity: u32,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl LineItem {
    /// Check the line invariants (quantity range).
    pub fn validate(&self) -> DomainResult<()> {
        validate_quantity(self.quantity)
    }

    /// Two lines are the same shelf pick when product, size and color match.
    fn same_variant(&self, other: &NewLineItem) -> bool {
        self.product_id == other.product_id
            && self.size == other.size
            && self.color == other.color
    }
}

impl Entity for LineItem {
    type Id = LineItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Payload for adding a product to the cart (the line id is minted on add).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price_cents: u64,
    pub quantity: u32,
    pub size: Option<String>,
    pub color: Option<String>,
}

fn validate_quantity(quantity: u32) -> DomainResult<()> {
    if !(QUANTITY_MIN..=QUANTITY_MAX).contains(&quantity) {
        return Err(DomainError::validation(format!(
            "quantity must be between {QUANTITY_MIN} and {QUANTITY_MAX}"
        )));
    }
    Ok(())
}

/// The session shopping cart: an owned list of line items.
///
/// State machine: Empty → NonEmpty (on add) → Empty (on remove-last-item),
/// with no other states. All mutations are synchronous and validated; the
/// cart never holds a line that violates its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Rebuild a cart from previously persisted lines.
    ///
    /// Every line must satisfy the cart invariants and line ids must be
    /// unique; a stored payload that parses but violates them is treated the
    /// same as unparsable storage by the caller.
    pub fn try_from_items(items: Vec<LineItem>) -> DomainResult<Self> {
        for item in &items {
            item.validate()?;
        }
        for (i, item) in items.iter().enumerate() {
            if items[..i].iter().any(|prior| prior.id == item.id) {
                return Err(DomainError::invariant(format!(
                    "duplicate cart line id {}",
                    item.id
                )));
            }
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Add a product to the cart.
    ///
    /// Adding the same product/size/color again merges onto the existing
    /// line: quantities add up and saturate at [`QUANTITY_MAX`]. A merge that
    /// carries a different unit price is rejected; the unit price is
    /// immutable once a line exists (remove and re-add to reprice).
    pub fn add(&mut self, new_item: NewLineItem) -> DomainResult<LineItemId> {
        validate_quantity(new_item.quantity)?;

        if let Some(existing) = self.items.iter_mut().find(|i| i.same_variant(&new_item)) {
            if existing.unit_price_cents != new_item.unit_price_cents {
                return Err(DomainError::invariant(
                    "unit price is immutable once a line exists; remove and re-add to reprice",
                ));
            }
            existing.quantity = existing
                .quantity
                .saturating_add(new_item.quantity)
                .min(QUANTITY_MAX);
            return Ok(existing.id);
        }

        let id = LineItemId::new(RecordId::new());
        self.items.push(LineItem {
            id,
            product_id: new_item.product_id,
            name: new_item.name,
            unit_price_cents: new_item.unit_price_cents,
            quantity: new_item.quantity,
            size: new_item.size,
            color: new_item.color,
        });
        Ok(id)
    }

    /// Change the quantity of an existing line.
    pub fn set_quantity(&mut self, id: LineItemId, quantity: u32) -> DomainResult<()> {
        validate_quantity(quantity)?;

        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(DomainError::not_found)?;
        item.quantity = quantity;
        Ok(())
    }

    /// Remove a line from the cart.
    pub fn remove(&mut self, id: LineItemId) -> DomainResult<()> {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        if self.items.len() == before {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    /// Drop all lines (order placement empties the cart in one step).
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }
}
