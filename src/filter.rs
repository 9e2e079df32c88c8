//! Filter, sort and paging options for listing leads.
//!
//! Filters are plain values. Start one with [`Filter::and`] or [`Filter::or`] on a
//! [`Field`], finish it with an operator, and collect them into [`ListOptions`]:
//!
//! ```
//! use leadsdb::{Field, Filter, ListOptions, SortOrder};
//!
//! let options = ListOptions::builder()
//!     .filter(Filter::and(Field::City).eq("Berlin"))
//!     .filter(Filter::or(Field::Rating).gte(4))
//!     .sort(Field::CreatedAt, SortOrder::Desc)
//!     .limit(50)
//!     .build();
//!
//! assert_eq!(options.filters()[0].to_string(), "and.eq.city.Berlin");
//! assert_eq!(options.filters()[1].to_string(), "or.gte.rating.4");
//! ```

use std::borrow::Cow;
use std::fmt;

/// How a filter combines with the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    And,
    Or,
}

impl Logic {
    fn as_str(&self) -> &'static str {
        match self {
            Logic::And => "and",
            Logic::Or => "or",
        }
    }
}

/// A lead field usable for filtering and sorting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Name,
    City,
    Country,
    State,
    Category,
    Source,
    Email,
    Phone,
    Website,
    Rating,
    ReviewCount,
    Tags,
    /// Geographical position, used with the location operators.
    Location,
    CreatedAt,
    UpdatedAt,
    /// A custom attribute, addressed as `attr:<name>`.
    Attr(String),
}

impl Field {
    /// Wire name of the field.
    pub fn as_str(&self) -> Cow<'_, str> {
        let name = match self {
            Field::Name => "name",
            Field::City => "city",
            Field::Country => "country",
            Field::State => "state",
            Field::Category => "category",
            Field::Source => "source",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Website => "website",
            Field::Rating => "rating",
            Field::ReviewCount => "review_count",
            Field::Tags => "tags",
            Field::Location => "location",
            Field::CreatedAt => "created_at",
            Field::UpdatedAt => "updated_at",
            Field::Attr(name) => return Cow::Owned(format!("attr:{}", name)),
        };
        Cow::Borrowed(name)
    }
}

/// Filter operators understood by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Contains,
    NotContains,
    IsEmpty,
    IsNotEmpty,
    Gt,
    Gte,
    Lt,
    Lte,
    ArrayContains,
    ArrayNotContains,
    ArrayEmpty,
    ArrayNotEmpty,
    WithinRadius,
    IsSet,
    IsNotSet,
}

impl Operator {
    /// Wire name of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::IsEmpty => "is_empty",
            Operator::IsNotEmpty => "is_not_empty",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::ArrayContains => "array_contains",
            Operator::ArrayNotContains => "array_not_contains",
            Operator::ArrayEmpty => "array_empty",
            Operator::ArrayNotEmpty => "array_not_empty",
            Operator::WithinRadius => "within_radius",
            Operator::IsSet => "is_set",
            Operator::IsNotSet => "is_not_set",
        }
    }
}

/// A value a filter can compare against.
///
/// Numbers are written in their shortest form, so `4.0` encodes as `4`. Floats
/// whose decimal exponent falls outside `-4..6` switch to exponent notation with a
/// signed two-digit exponent (`1e+21`, `1.5e-07`). `NaN` and the infinities are
/// sent as `NaN`, `+Inf` and `-Inf`; the server rejects them as values.
pub trait FilterValue {
    /// The value as it appears after the last `.` of an encoded filter.
    fn encode(&self) -> String;
}

impl FilterValue for str {
    fn encode(&self) -> String {
        self.to_string()
    }
}

impl FilterValue for String {
    fn encode(&self) -> String {
        self.clone()
    }
}

impl<T: FilterValue + ?Sized> FilterValue for &T {
    fn encode(&self) -> String {
        (**self).encode()
    }
}

impl FilterValue for f64 {
    fn encode(&self) -> String {
        format_number(*self)
    }
}

macro_rules! integer_filter_value {
    ($($t:ty),*) => {
        $(impl FilterValue for $t {
            fn encode(&self) -> String {
                self.to_string()
            }
        })*
    };
}

integer_filter_value!(i32, i64, u32, u64, usize);

fn format_number(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }

    // `{:e}` yields the shortest round-tripping digits, e.g. `1.5e-7`.
    let scientific = format!("{:e}", v);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = match exponent.parse() {
        Ok(exponent) => exponent,
        Err(_) => return scientific,
    };

    if (-4..6).contains(&exponent) {
        // Display never uses an exponent and drops a trailing ".0".
        format!("{}", v)
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.unsigned_abs())
    }
}

/// One filter condition, encoded as `logic.operator.field[.value]`.
///
/// The `.value` segment is left out for value-less operators and for empty values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    logic: Logic,
    operator: Operator,
    field: Field,
    value: Option<String>,
}

impl Filter {
    /// Starts a filter that must hold together with the others.
    pub fn and(field: Field) -> Condition {
        Condition {
            logic: Logic::And,
            field,
        }
    }

    /// Starts a filter that may hold instead of the others.
    pub fn or(field: Field) -> Condition {
        Condition {
            logic: Logic::Or,
            field,
        }
    }

    /// How this filter combines with the others.
    pub fn logic(&self) -> Logic {
        self.logic
    }

    /// The comparison applied.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The field compared.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// The encoded comparison value, `None` when there is nothing to send.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.logic.as_str(),
            self.operator.as_str(),
            self.field.as_str()
        )?;
        if let Some(value) = &self.value {
            write!(f, ".{}", value)?;
        }
        Ok(())
    }
}

/// A field and its logic, waiting for an operator.
#[derive(Debug, Clone)]
pub struct Condition {
    logic: Logic,
    field: Field,
}

impl Condition {
    fn finish(self, operator: Operator, value: Option<String>) -> Filter {
        Filter {
            logic: self.logic,
            operator,
            field: self.field,
            value,
        }
    }

    fn with(self, operator: Operator, value: impl FilterValue) -> Filter {
        let value = Some(value.encode()).filter(|v| !v.is_empty());
        self.finish(operator, value)
    }

    /// Field equals `value`.
    pub fn eq(self, value: impl FilterValue) -> Filter {
        self.with(Operator::Eq, value)
    }

    /// Field differs from `value`.
    pub fn neq(self, value: impl FilterValue) -> Filter {
        self.with(Operator::Neq, value)
    }

    /// Field contains `value` as a substring.
    pub fn contains(self, value: impl FilterValue) -> Filter {
        self.with(Operator::Contains, value)
    }

    /// Field does not contain `value`.
    pub fn not_contains(self, value: impl FilterValue) -> Filter {
        self.with(Operator::NotContains, value)
    }

    /// Field is an empty string.
    pub fn is_empty(self) -> Filter {
        self.finish(Operator::IsEmpty, None)
    }

    /// Field is a non-empty string.
    pub fn is_not_empty(self) -> Filter {
        self.finish(Operator::IsNotEmpty, None)
    }

    /// Field is greater than `value`.
    pub fn gt(self, value: impl FilterValue) -> Filter {
        self.with(Operator::Gt, value)
    }

    /// Field is greater than or equal to `value`.
    pub fn gte(self, value: impl FilterValue) -> Filter {
        self.with(Operator::Gte, value)
    }

    /// Field is less than `value`.
    pub fn lt(self, value: impl FilterValue) -> Filter {
        self.with(Operator::Lt, value)
    }

    /// Field is less than or equal to `value`.
    pub fn lte(self, value: impl FilterValue) -> Filter {
        self.with(Operator::Lte, value)
    }

    /// List membership, for [`Field::Tags`].
    pub fn array_contains(self, value: impl FilterValue) -> Filter {
        self.with(Operator::ArrayContains, value)
    }

    /// The list field lacks `value`.
    pub fn array_not_contains(self, value: impl FilterValue) -> Filter {
        self.with(Operator::ArrayNotContains, value)
    }

    /// The list field has no entries.
    pub fn array_empty(self) -> Filter {
        self.finish(Operator::ArrayEmpty, None)
    }

    /// The list field has at least one entry.
    pub fn array_not_empty(self) -> Filter {
        self.finish(Operator::ArrayNotEmpty, None)
    }

    /// Leads within `km` kilometres of (`lat`, `lon`). Always targets [`Field::Location`].
    pub fn within_radius(self, lat: f64, lon: f64, km: f64) -> Filter {
        let value = format!(
            "{},{},{}",
            format_number(lat),
            format_number(lon),
            format_number(km)
        );
        Condition {
            field: Field::Location,
            ..self
        }
        .finish(Operator::WithinRadius, Some(value))
    }

    /// Field holds any value, including an empty one.
    pub fn is_set(self) -> Filter {
        self.finish(Operator::IsSet, None)
    }

    /// Field was never given a value.
    pub fn is_not_set(self) -> Filter {
        self.finish(Operator::IsNotSet, None)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Wire name, `ASC` or `DESC`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Immutable options for a list call or a paged iteration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    limit: Option<u32>,
    cursor: Option<String>,
    sort: Option<(Field, SortOrder)>,
    filters: Vec<Filter>,
}

impl ListOptions {
    /// Creates a builder with no limit, cursor, sort or filters.
    pub fn builder() -> ListOptionsBuilder {
        ListOptionsBuilder::default()
    }

    /// Page size, `None` for the server default.
    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Position to resume listing from.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Sort field and direction.
    pub fn sort(&self) -> Option<&(Field, SortOrder)> {
        self.sort.as_ref()
    }

    /// Filters in the order they are sent.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Returns a copy of these options positioned at `cursor`.
    pub fn with_cursor(&self, cursor: impl Into<String>) -> Self {
        Self {
            cursor: Some(cursor.into()),
            ..self.clone()
        }
    }

    /// Encodes the options as query parameters, `filter` repeated once per filter.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(cursor) = self.cursor.as_deref().filter(|c| !c.is_empty()) {
            params.push(("cursor".to_string(), cursor.to_string()));
        }
        if let Some((field, order)) = &self.sort {
            params.push(("sort_by".to_string(), field.as_str().into_owned()));
            params.push(("sort_order".to_string(), order.as_str().to_string()));
        }
        for filter in &self.filters {
            params.push(("filter".to_string(), filter.to_string()));
        }

        params
    }
}

/// Builder for [`ListOptions`].
#[derive(Debug, Default)]
pub struct ListOptionsBuilder {
    options: ListOptions,
}

impl ListOptionsBuilder {
    /// Maximum number of leads per page. Zero means the server default.
    pub fn limit(mut self, limit: u32) -> Self {
        self.options.limit = Some(limit);
        self
    }

    /// Start listing from a cursor returned by an earlier page.
    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.options.cursor = Some(cursor.into());
        self
    }

    /// Sort by `field` in `order`.
    pub fn sort(mut self, field: Field, order: SortOrder) -> Self {
        self.options.sort = Some((field, order));
        self
    }

    /// Adds a filter. Filters are sent in the order they were added.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.options.filters.push(filter);
        self
    }

    /// Adds several filters at once.
    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.options.filters.extend(filters);
        self
    }

    pub fn build(self) -> ListOptions {
        self.options
    }
}
