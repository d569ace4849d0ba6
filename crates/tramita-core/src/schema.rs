/// Arrow schema definitions for the proposal report.
pub mod report {
    use arrow::datatypes::{DataType, Field, Schema, TimeUnit};

    /// One report column: internal key plus the label shown to readers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Column {
        pub key: &'static str,
        pub label: &'static str,
    }

    const fn col(key: &'static str, label: &'static str) -> Column {
        Column { key, label }
    }

    pub const ID: Column = col("id", "Proposal ID");
    pub const KIND: Column = col("kind", "Type");
    pub const NUMBER: Column = col("number", "Number");
    pub const YEAR: Column = col("year", "Year");
    pub const AUTHOR: Column = col("author", "Author");
    pub const SUMMARY: Column = col("summary", "Summary");
    pub const LAST_ACTION_AT: Column = col("last_action_at", "Last action date");
    pub const LAST_ACTION: Column = col("last_action", "Last action");
    pub const CURRENT_STATUS: Column = col("current_status", "Current status");
    pub const LAST_DISPATCH: Column = col("last_dispatch", "Last dispatch");
    pub const LAST_REVIEW: Column = col("last_review", "Last review decision");
    pub const HISTORY: Column = col("history", "Procedural history");
    pub const RELATED: Column = col("related", "Related proposals");

    /// Report columns in display order.
    pub const COLUMNS: [Column; 13] = [
        ID,
        KIND,
        NUMBER,
        YEAR,
        AUTHOR,
        SUMMARY,
        LAST_ACTION_AT,
        LAST_ACTION,
        CURRENT_STATUS,
        LAST_DISPATCH,
        LAST_REVIEW,
        HISTORY,
        RELATED,
    ];

    fn data_type(column: &Column) -> DataType {
        match column.key {
            "id" | "number" | "year" => DataType::Int64,
            "last_action_at" => DataType::Timestamp(TimeUnit::Second, None),
            _ => DataType::Utf8,
        }
    }

    fn nullable(column: &Column) -> bool {
        !matches!(column.key, "id" | "number" | "year" | "kind")
    }

    /// Schema keyed by internal column names, used while the report is assembled.
    pub fn keyed_schema() -> Schema {
        Schema::new(
            COLUMNS
                .iter()
                .map(|c| Field::new(c.key, data_type(c), nullable(c)))
                .collect::<Vec<_>>(),
        )
    }

    /// Schema with display labels, as handed to the view and the CSV export.
    pub fn labelled_schema() -> Schema {
        Schema::new(
            COLUMNS
                .iter()
                .map(|c| Field::new(c.label, data_type(c), nullable(c)))
                .collect::<Vec<_>>(),
        )
    }
}
