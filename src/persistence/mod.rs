//! Database layer: pool, migrations, owner-scoped transactions, and access
//! for auth subjects, profiles and trades.

mod constraints;
mod pool;
mod profiles;
mod subjects;
mod trades;

pub use constraints::map_db_error;
pub use pool::{begin_as, create_pool_and_migrate, run_migrations};
pub use profiles::{
    get_profile, insert_profile, profile_exists, profile_row_to_profile,
    update_profile, username_available, ProfileRow,
};
pub use sqlx::PgPool;
pub use subjects::{delete_subject, insert_subject, provision_from_subject};
pub use trades::{
    delete_trade, get_trade, insert_trade, list_trades_for_user, trade_row_to_trade, update_trade,
    TradeRow,
};
