//! Share allocation.
//!
//! A [`Share`] is one participant's slice of an expense item, given either as
//! a fixed value in the item's currency or as a percentage of the item. The
//! caller's input is resolved once into a [`ShareInput`]; the share's
//! `computed_value` is always expressed in base currency.
//!
//! A stored `percent` is always authoritative. An older `value` kept next to a
//! newer `percent` is a record only, and a share that holds a percent refuses
//! a value-only update, so the two fields never disagree about
//! `computed_value`. [`ShareBasis`] records which of the two is in effect.

use std::str::FromStr;

use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    CurrencyCode, EngineError, Money, RateMap, ResultEngine, to_base,
    util::{model_percent, parse_uuid},
};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareBasis {
    Fixed,
    Percent,
}

impl ShareBasis {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Percent => "percent",
        }
    }
}

impl TryFrom<&str> for ShareBasis {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "fixed" => Ok(Self::Fixed),
            "percent" => Ok(Self::Percent),
            other => Err(EngineError::InvalidShare(format!(
                "invalid share basis: {other}"
            ))),
        }
    }
}

/// The authoritative input of a share.
///
/// # Examples
///
/// ```rust
/// use engine::{Money, ShareInput};
/// use rust_decimal::Decimal;
///
/// let input = ShareInput::resolve(None, Some(Decimal::new(125, 1))).unwrap();
/// assert_eq!(input, ShareInput::Percentage(Decimal::new(125, 1)));
///
/// assert!(ShareInput::resolve(None, None).is_err());
/// assert!(ShareInput::resolve(Some(Money::from_minor(500)), Some(Decimal::TEN)).is_err());
/// assert!(ShareInput::resolve(None, Some(Decimal::new(101, 0))).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShareInput {
    /// A fixed amount in the item's currency.
    Fixed(Money),
    /// A percentage of the item, `0..=100`.
    Percentage(Decimal),
}

impl ShareInput {
    /// Resolves raw request fields: exactly one of them must be present.
    pub fn resolve(value: Option<Money>, percent: Option<Decimal>) -> ResultEngine<Self> {
        match (value, percent) {
            (None, None) => Err(EngineError::InvalidShare(
                "either value or percent is required".to_string(),
            )),
            (Some(_), Some(_)) => Err(EngineError::InvalidShare(
                "provide either value or percent, not both".to_string(),
            )),
            (Some(value), None) => {
                validate_value(value)?;
                Ok(Self::Fixed(value))
            }
            (None, Some(percent)) => {
                validate_percent(percent)?;
                Ok(Self::Percentage(percent))
            }
        }
    }

    #[must_use]
    pub fn basis(self) -> ShareBasis {
        match self {
            Self::Fixed(_) => ShareBasis::Fixed,
            Self::Percentage(_) => ShareBasis::Percent,
        }
    }

    /// Base-currency value of this input for an item of `item_amount` in
    /// `item_currency`.
    #[must_use]
    pub fn compute(self, item_currency: CurrencyCode, item_amount: Money, rates: &RateMap) -> Money {
        match self {
            Self::Percentage(percent) => {
                let item_base = to_base(item_currency, item_amount, rates);
                Money::round2(item_base.amount() * percent / HUNDRED)
            }
            Self::Fixed(value) => to_base(item_currency, value, rates),
        }
    }

    /// Reconstructs the authoritative input from stored fields: `percent`
    /// when present, otherwise `value`.
    #[must_use]
    pub fn from_stored(value: Option<Money>, percent: Option<Decimal>) -> Option<Self> {
        match (value, percent) {
            (_, Some(percent)) => Some(Self::Percentage(percent)),
            (Some(value), None) => Some(Self::Fixed(value)),
            (None, None) => None,
        }
    }
}

fn validate_percent(percent: Decimal) -> ResultEngine<()> {
    if percent < Decimal::ZERO || percent > HUNDRED {
        return Err(EngineError::InvalidShare(
            "percent must be between 0 and 100".to_string(),
        ));
    }
    Ok(())
}

fn validate_value(value: Money) -> ResultEngine<()> {
    if value.is_negative() {
        return Err(EngineError::InvalidShare(
            "value must be >= 0".to_string(),
        ));
    }
    Ok(())
}

/// Partial update of a share. Exactly one field must be supplied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SharePatch {
    pub value: Option<Money>,
    pub percent: Option<Decimal>,
}

impl SharePatch {
    pub fn input(self) -> ResultEngine<ShareInput> {
        ShareInput::resolve(self.value, self.percent)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub id: Uuid,
    pub item_id: Uuid,
    pub participant_id: String,
    /// Fixed value in the item's currency, if one was ever supplied.
    pub value: Option<Money>,
    /// Percentage of the item, if one was ever supplied.
    pub percent: Option<Decimal>,
    pub basis: Option<ShareBasis>,
    /// Value in base currency.
    pub computed_value: Money,
}

impl Share {
    pub(crate) fn new(
        item_id: Uuid,
        participant_id: String,
        input: ShareInput,
        computed_value: Money,
    ) -> Self {
        let (value, percent) = match input {
            ShareInput::Fixed(value) => (Some(value), None),
            ShareInput::Percentage(percent) => (None, Some(percent)),
        };
        Self {
            id: Uuid::new_v4(),
            item_id,
            participant_id,
            value,
            percent,
            basis: Some(input.basis()),
            computed_value,
        }
    }

    #[must_use]
    pub fn input(&self) -> Option<ShareInput> {
        ShareInput::from_stored(self.value, self.percent)
    }

    /// Applies a partial update: the supplied field is stored, the other field
    /// keeps its previous value.
    ///
    /// A share that holds a percent only accepts a new percent, since a
    /// stored percent always decides `computed_value`.
    pub(crate) fn apply(&mut self, input: ShareInput) -> ResultEngine<()> {
        match input {
            ShareInput::Fixed(_) if self.percent.is_some() => {
                return Err(EngineError::InvalidShare(
                    "share is allocated by percent, update its percent instead".to_string(),
                ));
            }
            ShareInput::Fixed(value) => self.value = Some(value),
            ShareInput::Percentage(percent) => self.percent = Some(percent),
        }
        self.basis = self.input().map(ShareInput::basis);
        Ok(())
    }

    /// Recomputes `computed_value` for the item's current amount and currency.
    ///
    /// Returns `false` when the share has no usable input and was left as is.
    pub(crate) fn recompute(
        &mut self,
        item_currency: CurrencyCode,
        item_amount: Money,
        rates: &RateMap,
    ) -> bool {
        match self.input() {
            Some(input) => {
                self.computed_value = input.compute(item_currency, item_amount, rates);
                true
            }
            None => false,
        }
    }
}

/// Part of an item (in base currency) not covered by its shares.
pub fn allocation_gap<I>(item_base: Money, computed_values: I) -> Money
where
    I: IntoIterator<Item = Money>,
{
    item_base - computed_values.into_iter().sum::<Money>()
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "shares")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub item_id: String,
    pub participant_id: String,
    pub value_minor: Option<i64>,
    pub percent: Option<String>,
    pub basis: Option<String>,
    pub computed_value_minor: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Items,
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Share> for ActiveModel {
    type Error = EngineError;

    fn try_from(share: &Share) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(share.id.to_string()),
            item_id: ActiveValue::Set(share.item_id.to_string()),
            participant_id: ActiveValue::Set(share.participant_id.clone()),
            value_minor: ActiveValue::Set(share.value.map(Money::minor).transpose()?),
            percent: ActiveValue::Set(share.percent.map(|p| p.normalize().to_string())),
            basis: ActiveValue::Set(share.basis.map(|b| b.as_str().to_string())),
            computed_value_minor: ActiveValue::Set(Some(share.computed_value.minor()?)),
        })
    }
}

impl TryFrom<Model> for Share {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "share")?,
            item_id: parse_uuid(&model.item_id, "item")?,
            participant_id: model.participant_id,
            value: model.value_minor.map(Money::from_minor),
            percent: model_percent(model.percent.as_deref())?,
            basis: model
                .basis
                .as_deref()
                .map(ShareBasis::try_from)
                .transpose()?,
            computed_value: model
                .computed_value_minor
                .map(Money::from_minor)
                .unwrap_or(Money::ZERO),
        })
    }
}

/// Parses a percent supplied as text (`"12.5"`, `"12,5"`).
pub fn parse_percent(raw: &str) -> ResultEngine<Decimal> {
    Decimal::from_str(&raw.trim().replace(',', "."))
        .map_err(|_| EngineError::InvalidShare(format!("invalid percent: {raw}")))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn thb() -> CurrencyCode {
        CurrencyCode::BASE
    }

    #[test]
    fn percent_share_rounds_half_up() {
        let rates = RateMap::base();
        let third = ShareInput::Percentage(dec!(33.333));
        assert_eq!(
            third.compute(thb(), Money::from_minor(10_000), &rates),
            Money::round2(dec!(33.33))
        );

        let eighth = ShareInput::Percentage(dec!(12.5));
        let value = eighth.compute(thb(), Money::from_minor(20_000), &rates);
        assert_eq!(value.to_string(), "25.00");
    }

    #[test]
    fn percent_share_uses_item_amount_in_base() {
        let usd = CurrencyCode::try_from("USD").unwrap();
        let rates = RateMap::from_iter([(usd, dec!(36.25))]);
        let half = ShareInput::Percentage(dec!(50));
        assert_eq!(
            half.compute(usd, Money::from_minor(1000), &rates),
            Money::round2(dec!(181.25))
        );
    }

    #[test]
    fn fixed_share_converts_item_currency() {
        let jpy = CurrencyCode::try_from("JPY").unwrap();
        let rates = RateMap::from_iter([(jpy, dec!(0.245))]);
        let fixed = ShareInput::Fixed(Money::from_minor(50_000));
        assert_eq!(
            fixed.compute(jpy, Money::from_minor(100_000), &rates),
            Money::round2(dec!(122.50))
        );
    }

    #[test]
    fn resolve_validates_bounds() {
        assert!(ShareInput::resolve(None, Some(dec!(0))).is_ok());
        assert!(ShareInput::resolve(None, Some(dec!(100))).is_ok());
        assert_eq!(
            ShareInput::resolve(None, Some(dec!(-0.01))),
            Err(EngineError::InvalidShare(
                "percent must be between 0 and 100".to_string()
            ))
        );
        assert!(ShareInput::resolve(None, Some(dec!(100.01))).is_err());
        assert!(ShareInput::resolve(Some(Money::from_minor(-1)), None).is_err());
    }

    #[test]
    fn patch_keeps_the_other_field() {
        let mut share = Share::new(
            Uuid::new_v4(),
            "bob".to_string(),
            ShareInput::Fixed(Money::from_minor(500)),
            Money::from_minor(500),
        );

        share.apply(ShareInput::Fixed(Money::from_minor(700))).unwrap();
        assert_eq!(share.input(), Some(ShareInput::Fixed(Money::from_minor(700))));

        share.apply(ShareInput::Percentage(dec!(20))).unwrap();
        assert_eq!(share.value, Some(Money::from_minor(700)));
        assert_eq!(share.percent, Some(dec!(20)));
        assert_eq!(share.basis, Some(ShareBasis::Percent));
        assert_eq!(share.input(), Some(ShareInput::Percentage(dec!(20))));
    }

    #[test]
    fn percent_share_refuses_value_update() {
        let rates = RateMap::base();
        let mut share = Share::new(
            Uuid::new_v4(),
            "bob".to_string(),
            ShareInput::Percentage(dec!(10)),
            Money::from_minor(1_000),
        );

        assert!(matches!(
            share.apply(ShareInput::Fixed(Money::from_minor(500))),
            Err(EngineError::InvalidShare(_))
        ));
        assert_eq!(share.value, None);
        assert!(share.recompute(thb(), Money::from_minor(10_000), &rates));
        assert_eq!(share.computed_value, Money::from_minor(1_000));
    }

    #[test]
    fn stored_percent_always_wins() {
        let input = ShareInput::from_stored(Some(Money::from_minor(100)), Some(dec!(5)));
        assert_eq!(input, Some(ShareInput::Percentage(dec!(5))));
        assert_eq!(ShareInput::from_stored(None, None), None);
        assert_eq!(
            ShareInput::from_stored(Some(Money::from_minor(1)), None),
            Some(ShareInput::Fixed(Money::from_minor(1)))
        );

        // a row whose recorded basis disagrees with its fields
        let mut share = Share::new(
            Uuid::new_v4(),
            "bob".to_string(),
            ShareInput::Percentage(dec!(10)),
            Money::ZERO,
        );
        share.value = Some(Money::from_minor(500));
        share.basis = Some(ShareBasis::Fixed);
        assert!(share.recompute(thb(), Money::from_minor(10_000), &RateMap::base()));
        assert_eq!(share.computed_value, Money::from_minor(1_000));
    }

    #[test]
    fn gap_reports_unallocated_part() {
        let gap = allocation_gap(
            Money::from_minor(10_000),
            [Money::from_minor(1_000), Money::from_minor(500)],
        );
        assert_eq!(gap, Money::from_minor(8_500));
    }

    #[test]
    fn percent_text_accepts_comma() {
        assert_eq!(parse_percent("12,5").unwrap(), dec!(12.5));
        assert!(parse_percent("abc").is_err());
    }
}
