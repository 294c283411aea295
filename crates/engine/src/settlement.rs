//! Checkout settlement: turns a validated cart into the amounts that get
//! persisted.
//!
//! The amounts fall into two tiers:
//!
//! - **recomputed**: `change_amount` and every line `total_price`. The engine
//!   derives these and never stores a client value for them.
//! - **pass-through**: `subtotal`, `tax_amount`, `discount_amount`,
//!   `total_amount`. Stored exactly as submitted.
//!
//! The pass-through tier is not reconciled against the cart, so a client can
//! submit a subtotal/total pair that disagrees with its own lines.
//! [`Settlement::inconsistencies`] reports such disagreements for logging; it
//! never rejects them.

use crate::{EngineError, Money, NewTransactionCmd, ResultEngine};

/// Header amounts accepted as submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassThrough {
    pub subtotal: Money,
    pub tax_amount: Money,
    pub discount_amount: Money,
    pub total_amount: Money,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub pass_through: PassThrough,
    pub payment_received: Money,
    /// `payment_received - total_amount`; negative when underpaid.
    pub change_amount: Money,
    /// `quantity × unit_price` for each cart line, in cart order.
    pub line_totals: Vec<Money>,
}

/// A disagreement inside the pass-through tier, or an underpayment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inconsistency {
    SubtotalMismatch { declared: Money, computed: Money },
    TotalMismatch { declared: Money, expected: Money },
    Underpaid { shortfall: Money },
}

/// Rejects carts and amounts that violate their sign constraints.
pub fn validate(cmd: &NewTransactionCmd) -> ResultEngine<()> {
    if cmd.items.is_empty() {
        return Err(EngineError::validation("items must not be empty"));
    }
    for (index, line) in cmd.items.iter().enumerate() {
        if line.quantity <= 0 {
            return Err(EngineError::Validation(format!(
                "items[{index}].quantity must be > 0"
            )));
        }
        if !line.unit_price.is_positive() {
            return Err(EngineError::Validation(format!(
                "items[{index}].unit_price must be > 0"
            )));
        }
    }
    if !cmd.subtotal.is_positive() {
        return Err(EngineError::validation("subtotal must be > 0"));
    }
    if cmd.tax_amount.is_negative() {
        return Err(EngineError::validation("tax_amount must be >= 0"));
    }
    if cmd.discount_amount.is_negative() {
        return Err(EngineError::validation("discount_amount must be >= 0"));
    }
    if !cmd.total_amount.is_positive() {
        return Err(EngineError::validation("total_amount must be > 0"));
    }
    if !cmd.payment_received.is_positive() {
        return Err(EngineError::validation("payment_received must be > 0"));
    }
    Ok(())
}

/// Validates `cmd` and computes the recomputed tier.
pub fn settle(cmd: &NewTransactionCmd) -> ResultEngine<Settlement> {
    validate(cmd)?;

    let line_totals = cmd
        .items
        .iter()
        .enumerate()
        .map(|(index, line)| {
            line.unit_price.times(line.quantity).ok_or_else(|| {
                EngineError::Validation(format!("items[{index}] total is too large"))
            })
        })
        .collect::<ResultEngine<Vec<_>>>()?;

    let change_amount = cmd
        .payment_received
        .checked_sub(cmd.total_amount)
        .ok_or_else(|| EngineError::validation("payment_received is out of range"))?;

    Ok(Settlement {
        pass_through: PassThrough {
            subtotal: cmd.subtotal,
            tax_amount: cmd.tax_amount,
            discount_amount: cmd.discount_amount,
            total_amount: cmd.total_amount,
        },
        payment_received: cmd.payment_received,
        change_amount,
        line_totals,
    })
}

impl Settlement {
    pub fn inconsistencies(&self) -> Vec<Inconsistency> {
        let mut out = Vec::new();
        let computed: Option<Money> = self
            .line_totals
            .iter()
            .try_fold(Money::ZERO, |acc, total| acc.checked_add(*total));
        let pass = self.pass_through;

        if let Some(computed) = computed
            && computed != pass.subtotal
        {
            out.push(Inconsistency::SubtotalMismatch {
                declared: pass.subtotal,
                computed,
            });
        }

        let expected = pass
            .subtotal
            .checked_add(pass.tax_amount)
            .and_then(|v| v.checked_sub(pass.discount_amount));
        if let Some(expected) = expected
            && expected != pass.total_amount
        {
            out.push(Inconsistency::TotalMismatch {
                declared: pass.total_amount,
                expected,
            });
        }

        if let Some(shortfall) = self
            .change_amount
            .checked_neg()
            .filter(|_| self.change_amount.is_negative())
        {
            out.push(Inconsistency::Underpaid { shortfall });
        }
        out
    }
}
