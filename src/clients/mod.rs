//! Type-safe wrappers around [`ResourceClient`](actor_framework::ResourceClient), and
//! the traits the orchestrator depends on instead of concrete clients.

pub mod order_client;
pub mod product_client;
pub mod traits;
pub mod user_client;

pub use order_client::*;
pub use product_client::*;
pub use traits::*;
pub use user_client::*;
