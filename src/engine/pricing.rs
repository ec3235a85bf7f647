use rust_decimal::Decimal;

use crate::limits::{MAX_LABEL_LEN, MAX_LINE_ITEMS};
use crate::model::*;
use crate::observability::QUOTES_TOTAL;

use super::BookingError;

/// Price a stay: `nightly_rate * nights`, replaced by `manual_override` when
/// given, plus every extra line item. Pure; any negative input rejects the
/// whole quote. The override has no upper/lower bound besides `>= 0`.
pub fn quote(
    nightly_rate: Decimal,
    nights: i64,
    manual_override: Option<Decimal>,
    extras: &[LineItem],
) -> Result<PriceQuote, BookingError> {
    if nightly_rate < Decimal::ZERO {
        return Err(BookingError::NegativeAmount("nightly rate"));
    }
    if nights < 0 {
        return Err(BookingError::NegativeAmount("nights"));
    }
    if let Some(price) = manual_override
        && price < Decimal::ZERO
    {
        return Err(BookingError::NegativeAmount("manual price"));
    }
    if extras.len() > MAX_LINE_ITEMS {
        return Err(BookingError::LimitExceeded("too many line items"));
    }
    for item in extras {
        if item.amount < Decimal::ZERO {
            return Err(BookingError::NegativeAmount("line item"));
        }
        if item.label.len() > MAX_LABEL_LEN {
            return Err(BookingError::LimitExceeded("line item label too long"));
        }
    }

    let computed_total = nightly_rate
        .checked_mul(Decimal::from(nights))
        .ok_or(BookingError::LimitExceeded("price overflow"))?;
    let extras_total = extras
        .iter()
        .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.amount))
        .ok_or(BookingError::LimitExceeded("price overflow"))?;
    let effective_total = manual_override
        .unwrap_or(computed_total)
        .checked_add(extras_total)
        .ok_or(BookingError::LimitExceeded("price overflow"))?;

    metrics::counter!(QUOTES_TOTAL).increment(1);
    Ok(PriceQuote {
        nights,
        nightly_rate,
        computed_total,
        manual_override,
        extras: extras.to_vec(),
        extras_total,
        effective_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn nights_times_rate() {
        let q = quote(dec(1000), 3, None, &[]).unwrap();
        assert_eq!(q.computed_total, dec(3000));
        assert_eq!(q.effective_total, dec(3000));
        assert!(!q.is_overridden());
    }

    #[test]
    fn manual_override_replaces_but_keeps_computed() {
        let q = quote(dec(1000), 3, Some(dec(2500)), &[]).unwrap();
        assert_eq!(q.computed_total, dec(3000));
        assert_eq!(q.effective_total, dec(2500));
        assert_eq!(q.base_total(), dec(2500));
        assert!(q.is_overridden());
    }

    #[test]
    fn override_may_exceed_computed() {
        let q = quote(dec(1000), 3, Some(dec(5000)), &[]).unwrap();
        assert_eq!(q.effective_total, dec(5000));
    }

    #[test]
    fn extras_are_added_on_top() {
        let q = quote(dec(1000), 3, None, &[LineItem::new("breakfast", dec(200))]).unwrap();
        assert_eq!(q.extras_total, dec(200));
        assert_eq!(q.effective_total, dec(3200));

        let q = quote(
            dec(1000),
            3,
            Some(dec(2500)),
            &[
                LineItem::new("breakfast", dec(200)),
                LineItem::new("transfer", Decimal::new(7550, 2)),
            ],
        )
        .unwrap();
        assert_eq!(q.effective_total, Decimal::new(277550, 2));
        assert_eq!(q.extras.len(), 2);
    }

    #[test]
    fn free_and_zero_night_stays() {
        assert_eq!(quote(Decimal::ZERO, 4, None, &[]).unwrap().effective_total, Decimal::ZERO);
        assert_eq!(quote(dec(1500), 0, None, &[]).unwrap().effective_total, Decimal::ZERO);
        let waived = quote(dec(1500), 3, Some(Decimal::ZERO), &[]).unwrap();
        assert_eq!(waived.effective_total, Decimal::ZERO);
    }

    #[test]
    fn fractional_rate() {
        let q = quote(Decimal::new(99999, 2), 2, None, &[]).unwrap();
        assert_eq!(q.computed_total, Decimal::new(199998, 2));
    }

    #[test]
    fn negatives_rejected() {
        assert_eq!(
            quote(dec(-100), 3, None, &[]),
            Err(BookingError::NegativeAmount("nightly rate"))
        );
        assert_eq!(quote(dec(100), -3, None, &[]), Err(BookingError::NegativeAmount("nights")));
        assert_eq!(
            quote(dec(100), 3, Some(dec(-1)), &[]),
            Err(BookingError::NegativeAmount("manual price"))
        );
        assert_eq!(
            quote(dec(100), 3, None, &[LineItem::new("refund", dec(-50))]),
            Err(BookingError::NegativeAmount("line item"))
        );
    }

    #[test]
    fn line_item_limits() {
        let many: Vec<_> = (0..=MAX_LINE_ITEMS)
            .map(|i| LineItem::new(format!("x{i}"), dec(1)))
            .collect();
        assert_eq!(
            quote(dec(1), 1, None, &many),
            Err(BookingError::LimitExceeded("too many line items"))
        );
        let long = [LineItem::new("x".repeat(MAX_LABEL_LEN + 1), dec(1))];
        assert_eq!(
            quote(dec(1), 1, None, &long),
            Err(BookingError::LimitExceeded("line item label too long"))
        );
    }
}
