//! Trains and train types.

use super::{PeriodId, TrainId, TrainTypeId};

/// A commercial train category with its fare factor.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainType {
    pub id: TrainTypeId,
    /// Display name, e.g. "TGV" or "TER".
    pub name: String,
    /// Fare per traveled kilometer, currency-agnostic.
    pub km_price: f64,
}

impl TrainType {
    /// Creates a new train type.
    pub fn new(id: TrainTypeId, name: impl Into<String>, km_price: f64) -> Self {
        Self {
            id,
            name: name.into(),
            km_price,
        }
    }
}

/// One scheduled train.
///
/// `number` is the commercial number printed on boards; it is NOT unique
/// (SNCF GTFS exports reuse numbers), `id` is. A train without a period is
/// treated as running every day of the year, a fallback for malformed
/// source data rather than a business rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Train {
    pub id: TrainId,
    /// Commercial train number.
    pub number: u32,
    /// Service calendar; `None` means "runs daily" (defective upstream data).
    pub period: Option<PeriodId>,
    pub train_type: TrainTypeId,
    /// Total passenger capacity, shared across all segments.
    pub capacity: u32,
}

impl Train {
    /// Creates a new train.
    pub fn new(
        id: TrainId,
        number: u32,
        period: Option<PeriodId>,
        train_type: TrainTypeId,
        capacity: u32,
    ) -> Self {
        Self {
            id,
            number,
            period,
            train_type,
            capacity,
        }
    }
}
