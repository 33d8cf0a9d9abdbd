//! Trade persistence: owner-scoped insert, read, list, replace, delete.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgConnection, Postgres};
use uuid::Uuid;

use crate::types::trade::{AssetClass, Direction, OptionType, Trade, TradeFields, TradeId};

/// Editable columns, bound as $2.. in this order by `bind_fields`.
const FIELD_COLUMNS: [&str; 36] = [
    "asset_class",
    "instrument",
    "direction",
    "entry_price",
    "exit_price",
    "shares",
    "lots",
    "pip_value",
    "contracts",
    "contract_size",
    "point_value",
    "tick_size",
    "tick_value",
    "option_type",
    "strike",
    "expiry",
    "premium",
    "exit_premium",
    "investment_amount",
    "equity_pct",
    "valuation",
    "exit_valuation",
    "deal_status",
    "property_type",
    "purchase_price",
    "current_value",
    "generates_rent",
    "monthly_rent",
    "monthly_expenses",
    "date_opened",
    "date_closed",
    "pnl",
    "notes",
    "tags",
    "emotion",
    "rating",
];

fn trade_columns() -> String {
    format!("id, user_id, {}, created_at, updated_at", FIELD_COLUMNS.join(", "))
}

fn asset_class_to_str(ac: AssetClass) -> &'static str {
    match ac {
        AssetClass::Stocks => "stocks",
        AssetClass::Options => "options",
        AssetClass::Forex => "forex",
        AssetClass::Futures => "futures",
        AssetClass::Commodities => "commodities",
        AssetClass::Indices => "indices",
        AssetClass::PrivateEquity => "private_equity",
        AssetClass::RealEstate => "real_estate",
    }
}

fn str_to_asset_class(s: &str) -> Option<AssetClass> {
    match s {
        "stocks" => Some(AssetClass::Stocks),
        "options" => Some(AssetClass::Options),
        "forex" => Some(AssetClass::Forex),
        "futures" => Some(AssetClass::Futures),
        "commodities" => Some(AssetClass::Commodities),
        "indices" => Some(AssetClass::Indices),
        "private_equity" => Some(AssetClass::PrivateEquity),
        "real_estate" => Some(AssetClass::RealEstate),
        _ => None,
    }
}

fn direction_to_str(d: Direction) -> &'static str {
    match d {
        Direction::Long => "long",
        Direction::Short => "short",
    }
}

fn str_to_direction(s: &str) -> Option<Direction> {
    match s {
        "long" => Some(Direction::Long),
        "short" => Some(Direction::Short),
        _ => None,
    }
}

fn option_type_to_str(ot: OptionType) -> &'static str {
    match ot {
        OptionType::Call => "call",
        OptionType::Put => "put",
    }
}

fn str_to_option_type(s: &str) -> Option<OptionType> {
    match s {
        "call" => Some(OptionType::Call),
        "put" => Some(OptionType::Put),
        _ => None,
    }
}

#[derive(Debug, FromRow)]
pub struct TradeRow {
    pub id: i64,
    pub user_id: Uuid,
    pub asset_class: String,
    pub instrument: String,
    pub direction: Option<String>,
    pub entry_price: Option<Decimal>,
    pub exit_price: Option<Decimal>,
    pub shares: Option<Decimal>,
    pub lots: Option<Decimal>,
    pub pip_value: Option<Decimal>,
    pub contracts: Option<Decimal>,
    pub contract_size: Option<Decimal>,
    pub point_value: Option<Decimal>,
    pub tick_size: Option<Decimal>,
    pub tick_value: Option<Decimal>,
    pub option_type: Option<String>,
    pub strike: Option<Decimal>,
    pub expiry: Option<NaiveDate>,
    pub premium: Option<Decimal>,
    pub exit_premium: Option<Decimal>,
    pub investment_amount: Option<Decimal>,
    pub equity_pct: Option<Decimal>,
    pub valuation: Option<Decimal>,
    pub exit_valuation: Option<Decimal>,
    pub deal_status: Option<String>,
    pub property_type: Option<String>,
    pub purchase_price: Option<Decimal>,
    pub current_value: Option<Decimal>,
    pub generates_rent: Option<bool>,
    pub monthly_rent: Option<Decimal>,
    pub monthly_expenses: Option<Decimal>,
    pub date_opened: DateTime<Utc>,
    pub date_closed: Option<DateTime<Utc>>,
    pub pnl: Option<Decimal>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub emotion: Option<String>,
    pub rating: Option<i16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn unknown_value(id: TradeId, column: &str, value: &str) -> sqlx::Error {
    sqlx::Error::Decode(format!("trade {id}: unknown {column} {value:?}").into())
}

/// Convert a row to a `Trade`. An enum column holding an unknown value is a
/// decode error.
pub fn trade_row_to_trade(row: TradeRow) -> Result<Trade, sqlx::Error> {
    let asset_class = str_to_asset_class(&row.asset_class)
        .ok_or_else(|| unknown_value(row.id, "asset_class", &row.asset_class))?;
    let direction = match row.direction.as_deref() {
        Some(s) => Some(str_to_direction(s).ok_or_else(|| unknown_value(row.id, "direction", s))?),
        None => None,
    };
    let option_type = match row.option_type.as_deref() {
        Some(s) => Some(str_to_option_type(s).ok_or_else(|| unknown_value(row.id, "option_type", s))?),
        None => None,
    };
    Ok(Trade {
        id: row.id,
        user_id: row.user_id,
        fields: TradeFields {
            asset_class,
            instrument: row.instrument,
            direction,
            entry_price: row.entry_price,
            exit_price: row.exit_price,
            shares: row.shares,
            lots: row.lots,
            pip_value: row.pip_value,
            contracts: row.contracts,
            contract_size: row.contract_size,
            point_value: row.point_value,
            tick_size: row.tick_size,
            tick_value: row.tick_value,
            option_type,
            strike: row.strike,
            expiry: row.expiry,
            premium: row.premium,
            exit_premium: row.exit_premium,
            investment_amount: row.investment_amount,
            equity_pct: row.equity_pct,
            valuation: row.valuation,
            exit_valuation: row.exit_valuation,
            deal_status: row.deal_status,
            property_type: row.property_type,
            purchase_price: row.purchase_price,
            current_value: row.current_value,
            generates_rent: row.generates_rent,
            monthly_rent: row.monthly_rent,
            monthly_expenses: row.monthly_expenses,
            date_opened: row.date_opened,
            date_closed: row.date_closed,
            pnl: row.pnl,
            notes: row.notes,
            tags: row.tags,
            emotion: row.emotion,
            rating: row.rating,
        },
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

type TradeQuery<'q> = QueryAs<'q, Postgres, TradeRow, PgArguments>;

/// Bind `FIELD_COLUMNS` in order.
fn bind_fields<'q>(query: TradeQuery<'q>, f: &'q TradeFields) -> TradeQuery<'q> {
    query
        .bind(asset_class_to_str(f.asset_class))
        .bind(f.instrument.as_str())
        .bind(f.direction.map(direction_to_str))
        .bind(f.entry_price)
        .bind(f.exit_price)
        .bind(f.shares)
        .bind(f.lots)
        .bind(f.pip_value)
        .bind(f.contracts)
        .bind(f.contract_size)
        .bind(f.point_value)
        .bind(f.tick_size)
        .bind(f.tick_value)
        .bind(f.option_type.map(option_type_to_str))
        .bind(f.strike)
        .bind(f.expiry)
        .bind(f.premium)
        .bind(f.exit_premium)
        .bind(f.investment_amount)
        .bind(f.equity_pct)
        .bind(f.valuation)
        .bind(f.exit_valuation)
        .bind(f.deal_status.as_deref())
        .bind(f.property_type.as_deref())
        .bind(f.purchase_price)
        .bind(f.current_value)
        .bind(f.generates_rent)
        .bind(f.monthly_rent)
        .bind(f.monthly_expenses)
        .bind(f.date_opened)
        .bind(f.date_closed)
        .bind(f.pnl)
        .bind(f.notes.as_deref())
        .bind(f.tags.as_slice())
        .bind(f.emotion.as_deref())
        .bind(f.rating)
}

/// Insert a trade for `user_id`; the id comes from the sequence.
pub async fn insert_trade(conn: &mut PgConnection, user_id: Uuid, fields: &TradeFields) -> Result<TradeRow, sqlx::Error> {
    let placeholders: Vec<String> = (0..FIELD_COLUMNS.len()).map(|i| format!("${}", i + 2)).collect();
    let sql = format!(
        "INSERT INTO trades (user_id, {}) VALUES ($1, {}) RETURNING {}",
        FIELD_COLUMNS.join(", "),
        placeholders.join(", "),
        trade_columns()
    );
    bind_fields(sqlx::query_as::<_, TradeRow>(&sql).bind(user_id), fields)
        .fetch_one(conn)
        .await
}

/// Read a trade owned by `user_id`.
pub async fn get_trade(conn: &mut PgConnection, id: TradeId, user_id: Uuid) -> Result<Option<TradeRow>, sqlx::Error> {
    let sql = format!("SELECT {} FROM trades WHERE id = $1 AND user_id = $2", trade_columns());
    sqlx::query_as::<_, TradeRow>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(conn)
        .await
}

/// List trades for a user, optional asset class, newest `date_opened` first.
pub async fn list_trades_for_user(
    conn: &mut PgConnection,
    user_id: Uuid,
    asset_class: Option<AssetClass>,
    limit: usize,
) -> Result<Vec<TradeRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM trades WHERE user_id = $1 AND ($2::text IS NULL OR asset_class = $2) \
         ORDER BY date_opened DESC, id DESC LIMIT $3",
        trade_columns()
    );
    sqlx::query_as::<_, TradeRow>(&sql)
        .bind(user_id)
        .bind(asset_class.map(asset_class_to_str))
        .bind(limit as i64)
        .fetch_all(conn)
        .await
}

/// Replace the editable fields of a trade owned by `user_id`.
/// `updated_at` is set by the `handle_updated_at` trigger.
pub async fn update_trade(
    conn: &mut PgConnection,
    id: TradeId,
    user_id: Uuid,
    fields: &TradeFields,
) -> Result<Option<TradeRow>, sqlx::Error> {
    let assignments: Vec<String> = FIELD_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{col} = ${}", i + 2))
        .collect();
    let sql = format!(
        "UPDATE trades SET {} WHERE id = ${} AND user_id = $1 RETURNING {}",
        assignments.join(", "),
        FIELD_COLUMNS.len() + 2,
        trade_columns()
    );
    bind_fields(sqlx::query_as::<_, TradeRow>(&sql).bind(user_id), fields)
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Delete a trade owned by `user_id`. Returns rows affected.
pub async fn delete_trade(conn: &mut PgConnection, id: TradeId, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM trades WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
