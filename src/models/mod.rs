mod areas;
mod auth;
mod condominium;
mod reservations;
mod settings;
mod visitors;

pub use areas::*;
pub use auth::*;
pub use condominium::*;
pub use reservations::*;
pub use settings::*;
pub use visitors::*;
