//! Repository modules for database access
//!
//! Each repository comes as a trait plus a SQL implementation over `DbClient`.

pub mod audience;
pub mod audience_sql;
pub mod delivery_log;
pub mod delivery_log_sql;
pub mod device_token;
pub mod device_token_sql;
pub mod factory;
mod row;

pub use audience::AudienceRepository;
pub use audience_sql::SqlAudienceRepository;
pub use delivery_log::DeliveryLogRepository;
pub use delivery_log_sql::SqlDeliveryLogRepository;
pub use device_token::DeviceTokenRepository;
pub use device_token_sql::SqlDeviceTokenRepository;
pub use factory::SqlRepositoryFactory;
