//! The API endpoint URIs.

/// The root path, which acknowledges that the server is up.
pub const ROOT: &str = "/";
/// Pages of transactions.
pub const TRANSACTION: &str = "/transaction";
/// Pages of transactions, same as [TRANSACTION].
pub const TRANSACTIONS: &str = "/transactions";
