//! Domain model for a bill and the billing arithmetic.

use chrono::{DateTime, Utc};

/// A generated rent + electricity bill.
///
/// Bills are append-only: once generated they are never deleted or
/// regenerated, and the only mutation is the one-way `paid` transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Bill {
    pub id: i64,
    pub tenant_id: i64,
    pub month: u32,
    pub year: i32,
    pub start_reading: i64,
    pub end_reading: i64,
    pub units: i64,
    pub light_bill: f64,
    pub total: f64,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

impl Bill {
    pub fn to_dto(&self) -> shared::Bill {
        shared::Bill {
            id: self.id,
            tenant_id: self.tenant_id,
            month: self.month,
            year: self.year,
            start_reading: self.start_reading,
            end_reading: self.end_reading,
            units: self.units,
            light_bill: self.light_bill,
            total: self.total,
            paid: self.paid,
            created_at: self.created_at.to_rfc3339(),
        }
    }
}

/// A bill record ready for insertion; `paid` starts false and the id is
/// assigned by storage.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBill {
    pub tenant_id: i64,
    pub month: u32,
    pub year: i32,
    pub start_reading: i64,
    pub end_reading: i64,
    pub units: i64,
    pub light_bill: f64,
    pub total: f64,
    pub created_at: DateTime<Utc>,
}

/// A bill joined with its owning tenant's current name, room and rent.
///
/// `tenant_rent` is the rent on the tenant row *now*, not the rent in effect
/// when the bill was generated; reports deliberately aggregate the current
/// value.
#[derive(Debug, Clone, PartialEq)]
pub struct BillRow {
    pub bill: Bill,
    pub tenant_name: String,
    pub room: Option<String>,
    pub tenant_rent: i64,
}

impl BillRow {
    pub fn to_dto(&self) -> shared::BillRow {
        shared::BillRow {
            bill: self.bill.to_dto(),
            tenant_name: self.tenant_name.clone(),
            room: self.room.clone(),
            tenant_rent: self.tenant_rent,
        }
    }
}

/// Round a monetary amount to 2 decimal places (half away from zero).
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// The electricity charge for a consumed unit count at a tenant's rate.
pub fn light_bill(units: i64, rate_per_unit: f64) -> f64 {
    round2(units as f64 * rate_per_unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(400.0), 400.0);
        assert_eq!(round2(123.456), 123.46);
        assert_eq!(round2(123.454), 123.45);
        assert_eq!(round2(0.005), 0.01);
    }

    #[test]
    fn test_light_bill_whole_rate() {
        assert_eq!(light_bill(50, 8.0), 400.0);
        assert_eq!(light_bill(0, 8.0), 0.0);
    }

    #[test]
    fn test_light_bill_fractional_rate() {
        // 7 units at 7.33 = 51.31
        assert_eq!(light_bill(7, 7.33), 51.31);
        // 3 units at 8.25 = 24.75, no rounding needed
        assert_eq!(light_bill(3, 8.25), 24.75);
        // 1 unit at 7.333 rounds down to 7.33
        assert_eq!(light_bill(1, 7.333), 7.33);
    }
}
