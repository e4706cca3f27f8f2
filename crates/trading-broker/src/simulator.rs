//! In-process order simulator over a single-symbol account.

use rust_decimal::Decimal;
use tracing::{info, warn};
use trading_core::error::{BrokerError, LedgerError};
use trading_core::types::{
    Account, ExecutionReport, Fill, FillKind, Position, PositionSide, POSITION_EPSILON,
};
use uuid::Uuid;

/// Commission settings.
///
/// The rate is always carried so it can be validated and reported, but it is
/// only charged when `apply` is set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CommissionPolicy {
    pub rate: Decimal,
    pub apply: bool,
}

impl CommissionPolicy {
    pub fn charge(&self, fill: &Fill, quantity: Decimal) -> Result<Decimal, LedgerError> {
        if !self.apply {
            return Ok(Decimal::ZERO);
        }
        quantity
            .checked_mul(fill.price)
            .and_then(|notional| notional.checked_mul(self.rate))
            .ok_or_else(|| LedgerError::InvalidQuantity {
                quantity,
                reason: format!("commission on {} at {} overflows", quantity, fill.price),
            })
    }
}

/// How a fill request would be applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Reduce the open position by `amount` (already clamped to its size).
    Close { amount: Decimal },
    Open(PositionSide),
    Extend(PositionSide),
    Reject(String),
}

/// Simulated execution against an [`Account`].
///
/// Every call to [`execute`](Self::execute) mints a fresh order id, including
/// calls that end up rejected. State changes only on success.
#[derive(Debug, Clone)]
pub struct OrderSimulator {
    account: Account,
    commission: CommissionPolicy,
}

impl OrderSimulator {
    /// Create a simulator with a flat position and `initial_balance`.
    pub fn new(symbol: impl Into<String>, initial_balance: Decimal) -> Self {
        Self {
            account: Account::new(symbol, initial_balance),
            commission: CommissionPolicy::default(),
        }
    }

    /// Set the commission policy.
    pub fn with_commission(mut self, rate: Decimal, apply: bool) -> Self {
        self.commission = CommissionPolicy { rate, apply };
        self
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn position(&self) -> &Position {
        &self.account.position
    }

    pub fn balance(&self) -> Decimal {
        self.account.balance
    }

    pub fn symbol(&self) -> &str {
        &self.account.position.symbol
    }

    /// Decide how `fill` applies to the current position.
    pub fn classify(&self, fill: &Fill) -> Classification {
        let position = &self.account.position;

        if fill.symbol != position.symbol {
            return Classification::Reject(format!(
                "account trades {}, not {}",
                position.symbol, fill.symbol
            ));
        }
        if fill.quantity <= Decimal::ZERO || fill.price <= Decimal::ZERO {
            return Classification::Reject(format!(
                "quantity {} and price {} must be positive",
                fill.quantity, fill.price
            ));
        }

        let fill_side = PositionSide::from_fill_side(fill.side);
        let open = position.size > POSITION_EPSILON;

        if open && position.side.is_opposite(fill.side) {
            Classification::Close {
                amount: fill.quantity.min(position.size),
            }
        } else if !open {
            Classification::Open(fill_side)
        } else if position.side == fill_side {
            Classification::Extend(fill_side)
        } else {
            Classification::Reject(format!(
                "size {} recorded with side {}",
                position.size, position.side
            ))
        }
    }

    /// Apply `fill` to the account.
    ///
    /// Returns [`BrokerError::RejectedFill`] for the reject branch and
    /// [`BrokerError::InvalidState`] if the ledger refuses a transition the
    /// classifier allowed or the arithmetic overflows.
    pub fn execute(&mut self, fill: &Fill) -> Result<ExecutionReport, BrokerError> {
        let order_id = Uuid::new_v4().to_string();

        // Staged so a failure anywhere leaves the account untouched.
        let mut position = self.account.position.clone();
        let (kind, filled_quantity, pnl) = match self.classify(fill) {
            Classification::Close { amount } => {
                let pnl = position.apply_close(amount, fill.price)?;
                let full = position.is_flat();
                (FillKind::Close { full }, amount, pnl)
            }
            Classification::Open(side) => {
                position.apply_open(fill.quantity, side, fill.price)?;
                (FillKind::Open, fill.quantity, Decimal::ZERO)
            }
            Classification::Extend(side) => {
                position.apply_extend(side, fill.quantity, fill.price)?;
                (FillKind::Extend, fill.quantity, Decimal::ZERO)
            }
            Classification::Reject(reason) => {
                warn!(
                    order_id = %order_id,
                    side = %fill.side,
                    quantity = %fill.quantity,
                    position_side = %self.account.position.side,
                    position_size = %self.account.position.size,
                    "Fill rejected: {}",
                    reason
                );
                return Err(BrokerError::RejectedFill {
                    order_id,
                    side: fill.side,
                    quantity: fill.quantity,
                    position_side: self.account.position.side,
                    position_size: self.account.position.size,
                    reason,
                });
            }
        };

        let commission = self.commission.charge(fill, filled_quantity)?;
        let balance = self
            .account
            .balance
            .checked_add(pnl)
            .and_then(|b| b.checked_sub(commission))
            .ok_or_else(|| LedgerError::InvalidQuantity {
                quantity: filled_quantity,
                reason: format!("balance update by {} overflows", pnl),
            })?;
        self.account.position = position;
        self.account.balance = balance;

        info!(
            order_id = %order_id,
            symbol = %fill.symbol,
            side = %fill.side,
            quantity = %filled_quantity,
            price = %fill.price,
            pnl = %pnl,
            balance = %self.account.balance,
            "Simulated {:?} fill",
            kind
        );

        Ok(ExecutionReport {
            order_id,
            kind,
            filled_quantity,
            pnl,
            commission,
            balance_after: self.account.balance,
        })
    }
}
