//! The API endpoints URIs.

/// The root route which shows the dashboard.
pub const ROOT: &str = "/";
/// The route the dashboard form posts new transactions to.
pub const TRANSACTIONS_FORM: &str = "/transactions";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to list transactions or create a single transaction.
pub const TRANSACTIONS_API: &str = "/api/transaction";
/// The route to create many transactions in one request.
pub const BULK_TRANSACTIONS_API: &str = "/api/transaction/bulk";
/// The route clients probe to check whether the server is reachable.
pub const HEALTH: &str = "/api/health";
