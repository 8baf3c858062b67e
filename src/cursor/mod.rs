//! Module for the result of executing SQL on a server.
//!
//! A [ResultCursor] is a lazy, forward-only sequence of [Row]s produced by
//! [crate::server::Server::execute]. It owns the [RowSource] handed out by the
//! driver, pulls the first row when it is built so an empty result is known up
//! front, and pulls the next row each time the buffered one is handed out.
//!
//! ```text
//! for database in server.execute("SHOW DATABASES", Params::None, "")? {
//!     println!("{}", database?.get("Database")?);
//! }
//! ```
//!
//! For statements returning a single value, the cursor itself can be read with
//! [ResultCursor::scalar] and [ResultCursor::get].
//!
mod structs;
mod functions;

pub use structs::*;
pub use functions::*;
