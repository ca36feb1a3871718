//! Async client for the Shishutsukan expense-tracking API.
//!
//! # Overview
//! Adds, lists and deletes expenses and genres over HTTP+JSON. Responses are
//! decoded into typed models, and every failure (bad URL, transport failure,
//! non-2xx status, malformed body, application-level rejection) is reported
//! as a `ShishutsukanError` variant.
//!
//! # Design
//! - `ShishutsukanClient` holds only a base URL and a `Transport`; it is
//!   immutable after construction and safe to share across tasks.
//! - Each operation is split into `build_*` (produces an `HttpRequest`) and
//!   `parse_*` (consumes an `HttpResponse`), so the I/O boundary is explicit
//!   and both halves are testable without a server.
//! - `ReqwestTransport` is the default transport; anything implementing
//!   `Transport` can replace it.
//!
//! ```no_run
//! # async fn demo() -> shishutsukan_core::Result<()> {
//! use shishutsukan_core::{Expense, ShishutsukanClient};
//!
//! let client = ShishutsukanClient::from_url_str("http://localhost:8000")?;
//! client.add_expense(&Expense::new("2025-01-15", "食費", 1000)).await?;
//! for expense in client.get_expenses().await? {
//!     println!("{} {} {}", expense.date, expense.genre, expense.amount);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::ShishutsukanClient;
pub use error::{BoxError, Result, ShishutsukanError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport, TransportError};
pub use types::{ApiMessage, Expense, ExpenseWithId, Genre, GenreWithId};
