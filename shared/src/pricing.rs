//! Discounts, vouchers and payment amounts
//!
//! A booking total is computed in a fixed order: package price, minus the
//! promo code discount, minus whatever the gift card balance covers.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorCode};
use crate::models::{DiscountType, GiftCard, GiftCardStatus, PromoCode};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round to cents, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

impl PromoCode {
    /// Checks state and validity window only.
    pub fn check_usable(&self, now: i64) -> Result<(), AppError> {
        if !self.is_active {
            return Err(AppError::new(ErrorCode::PromoCodeInactive).with_detail("code", self.code.clone()));
        }
        if let Some(from) = self.valid_from
            && now < from
        {
            return Err(AppError::new(ErrorCode::PromoCodeNotYetValid).with_detail("valid_from", from));
        }
        if let Some(until) = self.valid_until
            && now >= until
        {
            return Err(AppError::new(ErrorCode::PromoCodeExpired).with_detail("valid_until", until));
        }
        if let Some(max) = self.max_uses
            && self.used_count >= max
        {
            return Err(AppError::new(ErrorCode::PromoCodeExhausted).with_detail("max_uses", max));
        }
        Ok(())
    }

    /// Discount this code grants on `subtotal`, never more than the subtotal.
    pub fn evaluate(&self, subtotal: Decimal, now: i64) -> Result<Decimal, AppError> {
        self.check_usable(now)?;
        if let Some(min) = self.min_order_amount
            && subtotal < min
        {
            return Err(AppError::new(ErrorCode::PromoCodeMinimumNotMet)
                .with_detail("min_order_amount", min.to_string()));
        }
        let raw = match self.discount_type {
            DiscountType::Percentage => subtotal * self.discount_value / HUNDRED,
            DiscountType::FixedAmount => self.discount_value,
        };
        Ok(round_money(raw.max(Decimal::ZERO).min(subtotal)))
    }
}

impl GiftCard {
    pub fn redeemable(&self, now: i64) -> Result<(), AppError> {
        match self.status {
            GiftCardStatus::Active => {}
            GiftCardStatus::Expired => return Err(AppError::new(ErrorCode::GiftCardExpired)),
            GiftCardStatus::Redeemed => return Err(AppError::new(ErrorCode::GiftCardDepleted)),
            GiftCardStatus::PendingPayment | GiftCardStatus::Cancelled => {
                return Err(AppError::new(ErrorCode::GiftCardInactive).with_detail("status", self.status.as_str()));
            }
        }
        if now >= self.expires_at {
            return Err(AppError::new(ErrorCode::GiftCardExpired).with_detail("expires_at", self.expires_at));
        }
        if self.balance <= Decimal::ZERO {
            return Err(AppError::new(ErrorCode::GiftCardDepleted));
        }
        Ok(())
    }
}

/// Split `amount_due` against a gift card balance: `(applied, remaining_balance)`.
pub fn apply_gift_card(balance: Decimal, amount_due: Decimal) -> (Decimal, Decimal) {
    let applied = balance.min(amount_due).max(Decimal::ZERO);
    (applied, balance - applied)
}

/// Price breakdown shown before booking and stored with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub subtotal: Decimal,
    pub promo_discount: Decimal,
    pub gift_card_applied: Decimal,
    pub total: Decimal,
}

pub fn quote(
    subtotal: Decimal,
    promo: Option<&PromoCode>,
    gift_card: Option<&GiftCard>,
    now: i64,
) -> Result<Quote, AppError> {
    if subtotal < Decimal::ZERO {
        return Err(AppError::new(ErrorCode::PaymentInvalidAmount));
    }
    let promo_discount = match promo {
        Some(p) => p.evaluate(subtotal, now)?,
        None => Decimal::ZERO,
    };
    let after_promo = subtotal - promo_discount;
    let gift_card_applied = match gift_card {
        Some(card) => {
            card.redeemable(now)?;
            apply_gift_card(card.balance, after_promo).0
        }
        None => Decimal::ZERO,
    };
    Ok(Quote {
        subtotal,
        promo_discount,
        gift_card_applied,
        total: after_promo - gift_card_applied,
    })
}

/// Session price for a challenge recipient.
pub fn challenge_price(price: Decimal, discount_percent: i32) -> Decimal {
    let percent = Decimal::from(discount_percent.clamp(0, 100));
    round_money(price * (HUNDRED - percent) / HUNDRED)
}

/// Amount in the currency's minor unit (grosze / cents) for the payment provider.
pub fn to_minor_units(amount: Decimal) -> Result<i64, AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::new(ErrorCode::PaymentInvalidAmount).with_detail("amount", amount.to_string()));
    }
    round_money(amount * HUNDRED)
        .to_i64()
        .ok_or_else(|| AppError::new(ErrorCode::PaymentInvalidAmount).with_detail("amount", amount.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn promo(discount_type: DiscountType, value: &str) -> PromoCode {
        PromoCode {
            id: 1,
            code: "SPRING".to_string(),
            description: None,
            discount_type,
            discount_value: d(value),
            min_order_amount: None,
            max_uses: None,
            used_count: 0,
            valid_from: None,
            valid_until: None,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn card(balance: &str) -> GiftCard {
        GiftCard {
            id: 2,
            code: "GC-ABCD-EFGH".to_string(),
            initial_amount: d("500"),
            balance: d(balance),
            purchaser_name: "Anna".to_string(),
            purchaser_email: "anna@example.com".to_string(),
            recipient_name: None,
            recipient_email: None,
            message: None,
            status: GiftCardStatus::Active,
            expires_at: NOW + 1_000,
            payment_session_id: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn percentage_discount() {
        let p = promo(DiscountType::Percentage, "15");
        assert_eq!(p.evaluate(d("400"), NOW).unwrap(), d("60"));
        assert_eq!(p.evaluate(d("99.99"), NOW).unwrap(), d("15.00"));
    }

    #[test]
    fn fixed_discount_capped_at_subtotal() {
        let p = promo(DiscountType::FixedAmount, "100");
        assert_eq!(p.evaluate(d("250"), NOW).unwrap(), d("100"));
        assert_eq!(p.evaluate(d("80"), NOW).unwrap(), d("80"));
    }

    #[test]
    fn promo_rejections_have_distinct_codes() {
        let mut p = promo(DiscountType::Percentage, "10");
        p.is_active = false;
        assert_eq!(p.evaluate(d("100"), NOW).unwrap_err().code, ErrorCode::PromoCodeInactive);

        let mut p = promo(DiscountType::Percentage, "10");
        p.valid_from = Some(NOW + 1);
        assert_eq!(p.evaluate(d("100"), NOW).unwrap_err().code, ErrorCode::PromoCodeNotYetValid);

        let mut p = promo(DiscountType::Percentage, "10");
        p.valid_until = Some(NOW);
        assert_eq!(p.evaluate(d("100"), NOW).unwrap_err().code, ErrorCode::PromoCodeExpired);

        let mut p = promo(DiscountType::Percentage, "10");
        p.max_uses = Some(3);
        p.used_count = 3;
        assert_eq!(p.evaluate(d("100"), NOW).unwrap_err().code, ErrorCode::PromoCodeExhausted);

        let mut p = promo(DiscountType::Percentage, "10");
        p.min_order_amount = Some(d("300"));
        assert_eq!(p.evaluate(d("299.99"), NOW).unwrap_err().code, ErrorCode::PromoCodeMinimumNotMet);
        assert!(p.evaluate(d("300"), NOW).is_ok());
    }

    #[test]
    fn gift_card_states() {
        assert!(card("50").redeemable(NOW).is_ok());
        assert_eq!(card("0").redeemable(NOW).unwrap_err().code, ErrorCode::GiftCardDepleted);

        let mut c = card("50");
        c.expires_at = NOW;
        assert_eq!(c.redeemable(NOW).unwrap_err().code, ErrorCode::GiftCardExpired);

        let mut c = card("50");
        c.status = GiftCardStatus::PendingPayment;
        assert_eq!(c.redeemable(NOW).unwrap_err().code, ErrorCode::GiftCardInactive);
    }

    #[test]
    fn gift_card_split() {
        assert_eq!(apply_gift_card(d("100"), d("40")), (d("40"), d("60")));
        assert_eq!(apply_gift_card(d("100"), d("250")), (d("100"), d("0")));
    }

    #[test]
    fn quote_applies_promo_before_gift_card() {
        let p = promo(DiscountType::Percentage, "20");
        let c = card("100");
        let q = quote(d("400"), Some(&p), Some(&c), NOW).unwrap();
        assert_eq!(q.promo_discount, d("80"));
        assert_eq!(q.gift_card_applied, d("100"));
        assert_eq!(q.total, d("220"));
    }

    #[test]
    fn quote_gift_card_covers_everything() {
        let c = card("500");
        let q = quote(d("350"), None, Some(&c), NOW).unwrap();
        assert_eq!(q.gift_card_applied, d("350"));
        assert_eq!(q.total, Decimal::ZERO);
    }

    #[test]
    fn challenge_discount() {
        assert_eq!(challenge_price(d("400"), 25), d("300"));
        assert_eq!(challenge_price(d("400"), 150), Decimal::ZERO);
        assert_eq!(challenge_price(d("400"), -5), d("400"));
    }

    #[test]
    fn minor_units() {
        assert_eq!(to_minor_units(d("199.99")).unwrap(), 19999);
        assert_eq!(to_minor_units(d("50")).unwrap(), 5000);
        assert!(to_minor_units(Decimal::ZERO).is_err());
    }
}
