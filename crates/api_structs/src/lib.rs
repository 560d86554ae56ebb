mod settings;
mod status;

pub mod dtos {
    pub use crate::settings::dtos::*;
}

pub use crate::settings::api::*;
pub use crate::status::api::*;
