//! This file serves as the root for all SeaORM entity modules.
//! Taxes, obligations and installments share the same recurrence columns
//! (see [`recurrence`]) so the engine can treat them uniformly.

pub mod app_setting;
pub mod client;
pub mod installment;
pub mod obligation;
pub mod recurrence;
pub mod tax;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::app_setting::Entity as AppSetting;
    pub use super::client::Entity as Client;
    pub use super::installment::Entity as Installment;
    pub use super::obligation::Entity as Obligation;
    pub use super::tax::Entity as Tax;
}
