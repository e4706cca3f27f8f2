//! Position ledger and simulated account.
//!
//! The ledger functions are the only code that mutates a [`Position`]. They
//! enforce `size > 0 <=> side != Flat` and leave the position untouched when
//! they return an error.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Side;
use crate::error::LedgerError;

/// Sizes at or below this are treated as flat.
pub const POSITION_EPSILON: Decimal = dec!(0.000000001);

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
    #[default]
    Flat,
}

impl PositionSide {
    /// Side a position ends up on when opened by a fill of `side`.
    pub fn from_fill_side(side: Side) -> Self {
        match side {
            Side::Buy => PositionSide::Long,
            Side::Sell => PositionSide::Short,
        }
    }

    /// Order side that reduces this position. `None` when flat.
    pub fn closing_side(&self) -> Option<Side> {
        match self {
            PositionSide::Long => Some(Side::Sell),
            PositionSide::Short => Some(Side::Buy),
            PositionSide::Flat => None,
        }
    }

    /// Whether a fill of `side` works against this position.
    pub fn is_opposite(&self, side: Side) -> bool {
        self.closing_side() == Some(side)
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
            PositionSide::Flat => write!(f, "FLAT"),
        }
    }
}

/// The single position held for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub size: Decimal,
    pub side: PositionSide,
    /// Average entry price; `None` while flat.
    pub entry_price: Option<Decimal>,
}

impl Position {
    pub fn flat(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            size: Decimal::ZERO,
            side: PositionSide::Flat,
            entry_price: None,
        }
    }

    /// Read-only snapshot of `(size, side, entry_price)`.
    pub fn current(&self) -> (Decimal, PositionSide, Option<Decimal>) {
        (self.size, self.side, self.entry_price)
    }

    pub fn is_flat(&self) -> bool {
        self.size <= POSITION_EPSILON
    }

    /// Close `close_amount` at `exit_price`, returning realized PnL.
    pub fn apply_close(
        &mut self,
        close_amount: Decimal,
        exit_price: Decimal,
    ) -> Result<Decimal, LedgerError> {
        if self.size.is_zero() {
            return Err(LedgerError::InvalidState(format!(
                "cannot close {}: no open position",
                self.symbol
            )));
        }
        if close_amount <= Decimal::ZERO || close_amount > self.size {
            return Err(LedgerError::InvalidQuantity {
                quantity: close_amount,
                reason: format!("close amount must be in (0, {}]", self.size),
            });
        }
        let entry = self.entry_price.ok_or_else(|| {
            LedgerError::InvalidState(format!(
                "{} position of size {} has no entry price",
                self.side, self.size
            ))
        })?;

        let per_unit = match self.side {
            PositionSide::Long => exit_price - entry,
            PositionSide::Short => entry - exit_price,
            PositionSide::Flat => {
                return Err(LedgerError::InvalidState(format!(
                    "size {} recorded on a flat position",
                    self.size
                )))
            }
        };
        let pnl = per_unit
            .checked_mul(close_amount)
            .ok_or_else(|| overflow(close_amount, "realized pnl"))?;

        let remaining = self.size - close_amount;
        if remaining <= POSITION_EPSILON {
            self.size = Decimal::ZERO;
            self.side = PositionSide::Flat;
            self.entry_price = None;
        } else {
            self.size = remaining;
        }

        Ok(pnl)
    }

    /// Open a new position from flat.
    pub fn apply_open(
        &mut self,
        quantity: Decimal,
        side: PositionSide,
        entry_price: Decimal,
    ) -> Result<(), LedgerError> {
        if !self.is_flat() || self.side != PositionSide::Flat {
            return Err(LedgerError::InvalidState(format!(
                "cannot open {}: already {} {}",
                side, self.side, self.size
            )));
        }
        if side == PositionSide::Flat {
            return Err(LedgerError::InvalidState("cannot open a FLAT position".into()));
        }
        if quantity <= Decimal::ZERO {
            return Err(LedgerError::InvalidQuantity {
                quantity,
                reason: "open quantity must be positive".into(),
            });
        }

        self.size = quantity;
        self.side = side;
        self.entry_price = Some(entry_price);
        Ok(())
    }

    /// Add to an existing position, re-weighting the entry price.
    pub fn apply_extend(
        &mut self,
        side: PositionSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<(), LedgerError> {
        if self.size.is_zero() || self.side == PositionSide::Flat {
            return Err(LedgerError::InvalidState(format!(
                "cannot extend {}: no open position",
                self.symbol
            )));
        }
        if side != self.side {
            return Err(LedgerError::InvalidState(format!(
                "cannot extend {} position with {}",
                self.side, side
            )));
        }
        if quantity <= Decimal::ZERO {
            return Err(LedgerError::InvalidQuantity {
                quantity,
                reason: "extend quantity must be positive".into(),
            });
        }
        let entry = self.entry_price.ok_or_else(|| {
            LedgerError::InvalidState(format!("{} position has no entry price", self.side))
        })?;

        let new_size = self
            .size
            .checked_add(quantity)
            .ok_or_else(|| overflow(quantity, "position size"))?;
        let weighted = self
            .size
            .checked_mul(entry)
            .zip(quantity.checked_mul(price))
            .and_then(|(held, added)| held.checked_add(added))
            .and_then(|cost| cost.checked_div(new_size))
            .ok_or_else(|| overflow(quantity, "average entry price"))?;

        self.entry_price = Some(weighted);
        self.size = new_size;
        Ok(())
    }

    /// Mark-to-market PnL of the open size at `mark`.
    pub fn unrealized_pnl(&self, mark: Decimal) -> Decimal {
        match (self.side, self.entry_price) {
            (PositionSide::Long, Some(entry)) => (mark - entry).saturating_mul(self.size),
            (PositionSide::Short, Some(entry)) => (entry - mark).saturating_mul(self.size),
            _ => Decimal::ZERO,
        }
    }
}

/// Simulated account: a balance plus the one position it trades.
///
/// Owned by a single run. It is not synchronized; wrap it if more than one
/// task needs to touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub balance: Decimal,
    pub position: Position,
}

impl Account {
    pub fn new(symbol: impl Into<String>, balance: Decimal) -> Self {
        Self {
            balance,
            position: Position::flat(symbol),
        }
    }

    /// Balance plus unrealized PnL at `mark`.
    pub fn equity(&self, mark: Decimal) -> Decimal {
        self.balance
            .saturating_add(self.position.unrealized_pnl(mark))
    }
}

fn overflow(quantity: Decimal, what: &str) -> LedgerError {
    LedgerError::InvalidQuantity {
        quantity,
        reason: format!("{} overflows the decimal range", what),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long(size: Decimal, entry: Decimal) -> Position {
        let mut p = Position::flat("BTCUSDT");
        p.apply_open(size, PositionSide::Long, entry).unwrap();
        p
    }

    fn short(size: Decimal, entry: Decimal) -> Position {
        let mut p = Position::flat("BTCUSDT");
        p.apply_open(size, PositionSide::Short, entry).unwrap();
        p
    }

    #[test]
    fn test_extend_weights_entry_price() {
        let mut p = long(dec!(1), dec!(100));
        p.apply_extend(PositionSide::Long, dec!(1), dec!(200)).unwrap();

        assert_eq!(p.size, dec!(2));
        assert_eq!(p.entry_price, Some(dec!(150)));
        assert_eq!(p.side, PositionSide::Long);
    }

    #[test]
    fn test_close_pnl_sign() {
        let mut l = long(dec!(2), dec!(100));
        assert_eq!(l.apply_close(dec!(2), dec!(110)).unwrap(), dec!(20));
        assert!(l.is_flat());
        assert_eq!(l.side, PositionSide::Flat);
        assert_eq!(l.entry_price, None);

        let mut s = short(dec!(2), dec!(100));
        assert_eq!(s.apply_close(dec!(2), dec!(110)).unwrap(), dec!(-20));
        assert_eq!(s.current(), (Decimal::ZERO, PositionSide::Flat, None));
    }

    #[test]
    fn test_partial_close_keeps_side_and_entry() {
        let mut p = short(dec!(3), dec!(50));
        let pnl = p.apply_close(dec!(1), dec!(40)).unwrap();

        assert_eq!(pnl, dec!(10));
        assert_eq!(p.current(), (dec!(2), PositionSide::Short, Some(dec!(50))));
    }

    #[test]
    fn test_dust_remainder_goes_flat() {
        let mut p = long(dec!(1.0000000005), dec!(10));
        p.apply_close(dec!(1), dec!(10)).unwrap();

        assert!(p.size.is_zero());
        assert_eq!(p.side, PositionSide::Flat);
    }

    #[test]
    fn test_close_on_flat_is_invalid_state() {
        let mut p = Position::flat("BTCUSDT");
        let err = p.apply_close(dec!(1), dec!(100)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidState(_)));
    }

    #[test]
    fn test_close_more_than_size_is_rejected_without_mutation() {
        let mut p = long(dec!(1), dec!(100));
        let before = p.clone();
        assert!(p.apply_close(dec!(2), dec!(100)).is_err());
        assert!(p.apply_close(dec!(0), dec!(100)).is_err());
        assert_eq!(p, before);
    }

    #[test]
    fn test_open_requires_flat() {
        let mut p = long(dec!(1), dec!(100));
        let err = p.apply_open(dec!(1), PositionSide::Short, dec!(90)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidState(_)));
        assert_eq!(p.side, PositionSide::Long);
    }

    #[test]
    fn test_extend_side_mismatch_and_flat() {
        let mut p = long(dec!(1), dec!(100));
        assert!(p.apply_extend(PositionSide::Short, dec!(1), dec!(100)).is_err());

        let mut flat = Position::flat("BTCUSDT");
        assert!(flat.apply_extend(PositionSide::Long, dec!(1), dec!(100)).is_err());
    }

    #[test]
    fn test_account_equity_marks_position() {
        let mut account = Account::new("BTCUSDT", dec!(1000));
        account
            .position
            .apply_open(dec!(2), PositionSide::Short, dec!(100))
            .unwrap();

        assert_eq!(account.equity(dec!(90)), dec!(1020));
        assert_eq!(account.equity(dec!(100)), dec!(1000));
    }

    #[test]
    fn test_overflowing_close_errors_without_mutation() {
        let mut p = long(dec!(1000000000), dec!(100000000000000000000));
        let before = p.clone();

        let err = p
            .apply_close(dec!(1000000000), dec!(200000000000000000000))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidQuantity { .. }));
        assert_eq!(p, before);
    }

    #[test]
    fn test_overflowing_extend_errors_without_mutation() {
        let mut p = long(dec!(1000000000), dec!(100000000000000000000));
        let before = p.clone();

        let err = p
            .apply_extend(
                PositionSide::Long,
                dec!(1000000000),
                dec!(100000000000000000000),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidQuantity { .. }));
        assert_eq!(p, before);
    }

    #[test]
    fn test_position_side_helpers() {
        assert_eq!(PositionSide::from_fill_side(Side::Sell), PositionSide::Short);
        assert_eq!(PositionSide::Long.closing_side(), Some(Side::Sell));
        assert!(PositionSide::Short.is_opposite(Side::Buy));
        assert!(!PositionSide::Flat.is_opposite(Side::Buy));
    }
}
