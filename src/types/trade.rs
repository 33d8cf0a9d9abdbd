use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TradeId = i64;

pub const DEFAULT_LIST_LIMIT: usize = 100;
pub const MAX_LIST_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Stocks,
    Options,
    Forex,
    Futures,
    Commodities,
    Indices,
    PrivateEquity,
    RealEstate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

/// Client-editable part of a trade. Only the fields that matter for
/// `asset_class` are expected to be set; the rest stay `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeFields {
    pub asset_class: AssetClass,
    pub instrument: String,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub entry_price: Option<Decimal>,
    #[serde(default)]
    pub exit_price: Option<Decimal>,

    // Stocks
    #[serde(default)]
    pub shares: Option<Decimal>,

    // Forex
    #[serde(default)]
    pub lots: Option<Decimal>,
    #[serde(default)]
    pub pip_value: Option<Decimal>,

    // Futures, commodities, indices
    #[serde(default)]
    pub contracts: Option<Decimal>,
    #[serde(default)]
    pub contract_size: Option<Decimal>,
    #[serde(default)]
    pub point_value: Option<Decimal>,
    #[serde(default)]
    pub tick_size: Option<Decimal>,
    #[serde(default)]
    pub tick_value: Option<Decimal>,

    // Options
    #[serde(default)]
    pub option_type: Option<OptionType>,
    #[serde(default)]
    pub strike: Option<Decimal>,
    #[serde(default)]
    pub expiry: Option<NaiveDate>,
    #[serde(default)]
    pub premium: Option<Decimal>,
    #[serde(default)]
    pub exit_premium: Option<Decimal>,

    // Private equity / VC
    #[serde(default)]
    pub investment_amount: Option<Decimal>,
    #[serde(default)]
    pub equity_pct: Option<Decimal>,
    #[serde(default)]
    pub valuation: Option<Decimal>,
    #[serde(default)]
    pub exit_valuation: Option<Decimal>,
    #[serde(default)]
    pub deal_status: Option<String>,

    // Real estate
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub purchase_price: Option<Decimal>,
    #[serde(default)]
    pub current_value: Option<Decimal>,
    #[serde(default)]
    pub generates_rent: Option<bool>,
    #[serde(default)]
    pub monthly_rent: Option<Decimal>,
    #[serde(default)]
    pub monthly_expenses: Option<Decimal>,

    pub date_opened: DateTime<Utc>,
    #[serde(default)]
    pub date_closed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pnl: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub rating: Option<i16>,
}

impl TradeFields {
    /// Minimal row: everything optional left empty.
    pub fn new(asset_class: AssetClass, instrument: impl Into<String>, date_opened: DateTime<Utc>) -> Self {
        Self {
            asset_class,
            instrument: instrument.into(),
            direction: None,
            entry_price: None,
            exit_price: None,
            shares: None,
            lots: None,
            pip_value: None,
            contracts: None,
            contract_size: None,
            point_value: None,
            tick_size: None,
            tick_value: None,
            option_type: None,
            strike: None,
            expiry: None,
            premium: None,
            exit_premium: None,
            investment_amount: None,
            equity_pct: None,
            valuation: None,
            exit_valuation: None,
            deal_status: None,
            property_type: None,
            purchase_price: None,
            current_value: None,
            generates_rent: None,
            monthly_rent: None,
            monthly_expenses: None,
            date_opened,
            date_closed: None,
            pnl: None,
            notes: None,
            tags: Vec::new(),
            emotion: None,
            rating: None,
        }
    }
}

/// A stored trade. `created_at`/`updated_at` are server-maintained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub fields: TradeFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query for listing the requester's trades.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TradeFilter {
    #[serde(default)]
    pub asset_class: Option<AssetClass>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl TradeFilter {
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT)
    }
}
