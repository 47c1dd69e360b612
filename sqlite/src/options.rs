//! Per-call options shared by every operation.

/// Options recognized by schema and data operations.
///
/// `filter` and `order_by` are raw SQL expressions inserted verbatim into
/// generated statements. They must come from application code, never from
/// end-user input.
///
/// # Examples
///
/// ```
/// use docstore_sqlite::QueryOptions;
///
/// let opts = QueryOptions::new()
///     .filter("category = 'guides'")
///     .order_by("title")
///     .limit(20);
/// assert_eq!(opts.limit, Some(20));
/// assert!(!opts.dry_run);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// `WHERE` expression for reads.
    pub filter: Option<String>,
    /// `ORDER BY` expression for reads.
    pub order_by: Option<String>,
    /// Row cap for reads. Zero means no cap.
    pub limit: Option<u64>,
    /// Render the statement without executing anything.
    pub dry_run: bool,
    /// Suppress audit events for this call.
    pub silent: bool,
    /// Skip the confirmation gate on destructive operations.
    pub force: bool,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, expr: impl Into<String>) -> Self {
        self.filter = Some(expr.into());
        self
    }

    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order_by = Some(expr.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }
}
