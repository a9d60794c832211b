use thiserror::Error;

/// Maximum number of row-failure messages surfaced to the user.
pub const MAX_RENDERED_FAILURES: usize = 10;

/// Classifies a single field-level validation violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Empty or absent value in a required column.
    Missing,
    /// Value cannot be converted to the expected type.
    TypeMismatch,
    /// Numeric value violates the non-negativity constraint.
    Negative,
    /// Any other rule violation.
    Other,
}

/// A single field-level validation failure, tied to one input row and column.
///
/// Row numbers are 1-based data-row positions (header excluded). Failures are
/// immutable once created and compare by `(row, column)` so reports come out
/// in a deterministic order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    pub row: usize,
    pub column: &'static str,
    pub raw_value: String,
    pub kind: FailureKind,
}

impl RowFailure {
    pub fn new(row: usize, column: &'static str, raw_value: &str, kind: FailureKind) -> Self {
        Self {
            row,
            column,
            raw_value: raw_value.to_string(),
            kind,
        }
    }

    /// Renders the user-facing message for this failure.
    #[must_use]
    pub fn message(&self) -> String {
        match self.kind {
            FailureKind::Missing => format!(
                "Row {}: required field '{}' is missing or empty.",
                self.row, self.column
            ),
            FailureKind::TypeMismatch => format!(
                "Row {}: invalid value '{}' in column '{}' — incorrect type.",
                self.row, self.raw_value, self.column
            ),
            FailureKind::Negative => format!(
                "Row {}: invalid value '{}' in column '{}' — negative.",
                self.row, self.raw_value, self.column
            ),
            FailureKind::Other => format!(
                "Row {}: validation error in column '{}': {}",
                self.row, self.column, self.raw_value
            ),
        }
    }
}

/// Renders the missing-column error body.
///
/// `columns` must already be sorted alphabetically; [`crate::schema::validate`]
/// guarantees that.
#[must_use]
pub fn missing_columns_message(columns: &[String]) -> String {
    format!(
        "[ERROR] Missing required column(s): {}. \
         Ensure the CSV headers match the expected schema.",
        columns.join(", ")
    )
}

/// Renders the row-failure error body: a stable header, at most
/// [`MAX_RENDERED_FAILURES`] messages, and a `...` marker when more failures
/// exist than were rendered.
///
/// `failures` must already be sorted by `(row, column)`. An empty failure set
/// renders a generic message rather than an empty body.
#[must_use]
pub fn row_failures_message(failures: &[RowFailure]) -> String {
    let messages: Vec<String> = failures
        .iter()
        .take(MAX_RENDERED_FAILURES)
        .map(RowFailure::message)
        .collect();
    if messages.is_empty() {
        return "[ERROR] Validation failed, but no reportable field errors were produced."
            .to_string();
    }
    let mut body = format!("[ERROR] Data validation failed:\n{}", messages.join("\n"));
    if failures.len() > MAX_RENDERED_FAILURES {
        body.push_str("\n...");
    }
    body
}

/// Fatal errors raised by the validation-and-aggregation pipeline.
///
/// Every variant halts the run; there is no partial success. The CLI boundary
/// maps these to a non-zero exit status.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The input file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Neither the preferred nor the fallback encoding could decode the file.
    #[error("failed to decode '{path}': not valid utf-8 or windows-1252")]
    Undecodable { path: String },

    /// The file decoded but is not well-formed delimited data.
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// One or more required columns are absent from the header.
    #[error("{}", missing_columns_message(.0))]
    MissingColumns(Vec<String>),

    /// One or more rows failed field-level validation.
    #[error("{}", row_failures_message(.0))]
    RowFailures(Vec<RowFailure>),

    /// A cast failed after schema validation had passed. Validation should
    /// normalize every field, so this only fires on arithmetic overflow.
    #[error("failed to parse fields: {0}")]
    Coercion(String),
}
