pub mod route;

pub use route::{Route, RouteError};
