pub mod action;
pub mod inspector;
pub mod matcher;
pub mod publisher;
pub mod rotation;

#[cfg(test)]
pub(crate) mod fake;

pub use crate::domain::model::{Certificate, RenewalRequest};
pub use crate::domain::ports::{CloudApi, ConfigProvider, Storage};
pub use crate::utils::error::Result;
