//! Filtered, paginated list queries
//!
//! A list endpoint needs two statements with identical filters: the page of
//! rows and the total count. [`PaginatedQuery`] builds both side by side so
//! they cannot drift apart.

use sqlx::{postgres::PgRow, Encode, FromRow, PgConnection, Postgres, QueryBuilder, Type};

use crate::error::DatabaseResult;

/// Default and maximum page sizes
pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

/// A normalized page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u32,
    per_page: u32,
}

impl Page {
    /// Clamps the page to at least 1 and the size to `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn new(number: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            number: number.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    #[must_use]
    pub fn number(self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn per_page(self) -> u32 {
        self.per_page
    }

    #[must_use]
    pub fn offset(self) -> i64 {
        i64::from(self.number.saturating_sub(1)) * i64::from(self.per_page)
    }

    /// Total pages for `total` rows; an empty result still has one page.
    #[must_use]
    pub fn total_pages(self, total: i64) -> u32 {
        if total <= 0 {
            return 1;
        }
        let per_page = i64::from(self.per_page);
        let pages = (total + per_page - 1) / per_page;
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Paginated query builder for consistent query construction
///
/// Both base statements must end in a `WHERE` clause so filters can be
/// appended with `AND`:
///
/// ```rust,ignore
/// let mut query = PaginatedQuery::new(
///     "SELECT id, name FROM facilities WHERE 1=1",
///     "SELECT COUNT(*) FROM facilities WHERE 1=1",
/// );
/// query
///     .filter_ilike("name", filter.name.as_deref())
///     .order_by("name", "ASC")
///     .paginate(page);
///
/// let (facilities, total) = query.fetch_page::<Facility>(conn).await?;
/// ```
pub struct PaginatedQuery<'a> {
    rows: QueryBuilder<'a, Postgres>,
    count: QueryBuilder<'a, Postgres>,
    page: Page,
}

impl<'a> PaginatedQuery<'a> {
    pub fn new(select_sql: &str, count_sql: &str) -> Self {
        Self {
            rows: QueryBuilder::new(select_sql),
            count: QueryBuilder::new(count_sql),
            page: Page::default(),
        }
    }

    /// Add an equality filter (only if value is Some)
    pub fn filter_eq<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'a + Encode<'a, Postgres> + Type<Postgres> + Send + Clone,
    {
        if let Some(val) = value {
            self.push_condition(column, " = ", val);
        }
        self
    }

    /// Case-insensitive substring filter (only if value is Some)
    pub fn filter_ilike(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        if let Some(val) = value {
            self.push_condition(column, " ILIKE ", format!("%{val}%"));
        }
        self
    }

    /// Lower bound, inclusive
    pub fn filter_gte<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'a + Encode<'a, Postgres> + Type<Postgres> + Send + Clone,
    {
        if let Some(val) = value {
            self.push_condition(column, " >= ", val);
        }
        self
    }

    /// Upper bound, inclusive
    pub fn filter_lte<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'a + Encode<'a, Postgres> + Type<Postgres> + Send + Clone,
    {
        if let Some(val) = value {
            self.push_condition(column, " <= ", val);
        }
        self
    }

    fn push_condition<T>(&mut self, column: &str, operator: &str, value: T)
    where
        T: 'a + Encode<'a, Postgres> + Type<Postgres> + Send + Clone,
    {
        for builder in [&mut self.rows, &mut self.count] {
            builder.push(" AND ").push(column).push(operator);
        }
        self.rows.push_bind(value.clone());
        self.count.push_bind(value);
    }

    /// Add ORDER BY clause
    pub fn order_by(&mut self, column: &str, direction: &str) -> &mut Self {
        self.rows.push(format!(" ORDER BY {column} {direction}"));
        self
    }

    /// Apply pagination
    pub fn paginate(&mut self, page: Page) -> &mut Self {
        self.page = page;
        self.rows.push(" LIMIT ");
        self.rows.push_bind(i64::from(page.per_page()));
        self.rows.push(" OFFSET ");
        self.rows.push_bind(page.offset());
        self
    }

    #[must_use]
    pub fn page(&self) -> Page {
        self.page
    }

    /// SQL of the row statement, for logging and tests.
    #[must_use]
    pub fn sql(&self) -> &str {
        self.rows.sql()
    }

    #[must_use]
    pub fn count_sql(&self) -> &str {
        self.count.sql()
    }

    /// Runs both statements and returns the page of rows with the total.
    ///
    /// # Errors
    ///
    /// Fails when either statement fails.
    pub async fn fetch_page<T>(&mut self, conn: &mut PgConnection) -> DatabaseResult<(Vec<T>, i64)>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let total: i64 = self.count.build_query_scalar().fetch_one(&mut *conn).await?;
        let rows = self.rows.build_query_as::<T>().fetch_all(&mut *conn).await?;
        Ok((rows, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_clamping() {
        let page = Page::new(None, None);
        assert_eq!(page.number(), 1);
        assert_eq!(page.per_page(), 10);

        let page = Page::new(Some(0), Some(500));
        assert_eq!(page.number(), 1);
        assert_eq!(page.per_page(), 100);

        assert_eq!(Page::new(Some(2), Some(0)).per_page(), 1);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(Page::new(Some(3), Some(10)).offset(), 20);
        assert_eq!(Page::new(Some(1), Some(25)).offset(), 0);
    }

    #[test]
    fn test_total_pages() {
        let page = Page::new(Some(1), Some(20));
        assert_eq!(page.total_pages(100), 5);
        assert_eq!(page.total_pages(101), 6);
        assert_eq!(page.total_pages(0), 1);
    }

    #[test]
    fn test_filters_apply_to_both_statements() {
        let mut query = PaginatedQuery::new(
            "SELECT id FROM patients WHERE 1=1",
            "SELECT COUNT(*) FROM patients WHERE 1=1",
        );
        query
            .filter_ilike("name", Some("silva"))
            .filter_eq("cpf", None::<String>)
            .filter_eq("health_plan", Some("Unimed".to_string()))
            .order_by("name", "ASC")
            .paginate(Page::new(Some(2), Some(10)));

        assert_eq!(
            query.sql(),
            "SELECT id FROM patients WHERE 1=1 AND name ILIKE $1 AND health_plan = $2 \
             ORDER BY name ASC LIMIT $3 OFFSET $4"
        );
        assert_eq!(
            query.count_sql(),
            "SELECT COUNT(*) FROM patients WHERE 1=1 AND name ILIKE $1 AND health_plan = $2"
        );
        assert_eq!(query.page().number(), 2);
    }
}
